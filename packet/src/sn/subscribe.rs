//! SUBSCRIBE, SUBACK, UNSUBSCRIBE and UNSUBACK.

use std::fmt;

use bytes::{BufMut, BytesMut};

use super::flags::{Flags, TopicIdType};
use super::topic::{Topic, TopicId};
use crate::codec::{Reader, write_u16};
use crate::error::Result;

/// Flags, message id and topic, shared by SUBSCRIBE and UNSUBSCRIBE.
macro_rules! topic_request_packet {
    ($(#[$doc:meta])* $name:ident, $type_name:literal, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Default)]
        pub struct $name {
            /// The topic id type must agree with `topic`.
            pub flags: Flags,
            pub msg_id: u16,
            pub topic: Topic,
        }

        impl $name {
            /// Request with a full topic name.
            pub fn new(msg_id: u16, topic_name: impl Into<String>) -> Self {
                Self {
                    flags: Flags::default(),
                    msg_id,
                    topic: Topic::name(topic_name),
                }
            }

            /// Request with a predefined topic id.
            pub fn predefined(msg_id: u16, topic_id: u16) -> Self {
                Self {
                    flags: Flags::default().with_topic_id_type(TopicIdType::Predefined),
                    msg_id,
                    topic: Topic::Id(TopicId::Id(topic_id)),
                }
            }

            /// Request with a short topic name; `None` unless it is two bytes.
            pub fn short(msg_id: u16, topic_name: &str) -> Option<Self> {
                TopicId::short(topic_name).map(|topic_id| Self {
                    flags: Flags::default().with_topic_id_type(TopicIdType::Short),
                    msg_id,
                    topic: Topic::Id(topic_id),
                })
            }

            pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
                let mut reader = Reader::new(buf);
                let flags = Flags::decode(reader.read_u8()?);
                let msg_id = reader.read_u16()?;
                let topic = Topic::read(&mut reader, flags.topic_id_type)?;
                reader.finish($type_name)?;
                Ok(Self { flags, msg_id, topic })
            }

            pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
                let mut topic = BytesMut::new();
                self.topic.write(&mut topic, self.flags.topic_id_type)?;

                buf.put_u8(self.flags.encode());
                write_u16(buf, self.msg_id);
                buf.put_slice(&topic);
                Ok(())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!($label, ": q{}, m{}, {} {}"),
                    self.flags.qos, self.msg_id, self.flags.topic_id_type, self.topic
                )
            }
        }
    };
}

topic_request_packet!(
    /// SUBSCRIBE packet.
    Subscribe, "SUBSCRIBE", "Subscribe"
);
topic_request_packet!(
    /// UNSUBSCRIBE packet.
    Unsubscribe, "UNSUBSCRIBE", "Unsubscribe"
);

/// SUBACK packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubAck {
    /// Only QoS is meaningful.
    pub flags: Flags,
    /// Must agree with `flags.topic_id_type`.
    pub topic_id: TopicId,
    pub msg_id: u16,
    pub return_code: u8,
}

impl SubAck {
    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        let flags = Flags::decode(reader.read_u8()?);
        let topic_id = TopicId::decode(reader.read_u16()?, flags.topic_id_type);
        let msg_id = reader.read_u16()?;
        let return_code = reader.read_u8()?;
        reader.finish("SUBACK")?;
        Ok(SubAck {
            flags,
            topic_id,
            msg_id,
            return_code,
        })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        let topic_id = self.topic_id.encode(self.flags.topic_id_type)?;
        buf.put_u8(self.flags.encode());
        write_u16(buf, topic_id);
        write_u16(buf, self.msg_id);
        buf.put_u8(self.return_code);
        Ok(())
    }
}

impl fmt::Display for SubAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Suback: q{}, m{}, topic_id={}, rc=0x{:02X}",
            self.flags.qos, self.msg_id, self.topic_id, self.return_code
        )
    }
}

msg_id_packet!(
    /// UNSUBACK packet.
    UnsubAck, "UNSUBACK", "Unsuback"
);
