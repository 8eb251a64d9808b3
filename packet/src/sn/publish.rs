//! Topic registration and publishing.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use super::flags::{Flags, TopicIdType};
use super::topic::TopicId;
use crate::codec::{Reader, write_u16};
use crate::error::Result;

/// REGISTER packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Register {
    /// Zero when sent by a client; assigned id when sent by a gateway.
    pub topic_id: u16,
    pub msg_id: u16,
    pub topic_name: String,
}

impl Register {
    pub fn new(topic_id: u16, msg_id: u16, topic_name: impl Into<String>) -> Self {
        Self {
            topic_id,
            msg_id,
            topic_name: topic_name.into(),
        }
    }

    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        let topic_id = reader.read_u16()?;
        let msg_id = reader.read_u16()?;
        let topic_name = reader.read_rest_string()?;
        Ok(Register {
            topic_id,
            msg_id,
            topic_name,
        })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        write_u16(buf, self.topic_id);
        write_u16(buf, self.msg_id);
        buf.put_slice(self.topic_name.as_bytes());
        Ok(())
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Register: topic_id=0x{:04X}, m{}, '{}'",
            self.topic_id, self.msg_id, self.topic_name
        )
    }
}

/// Topic id, message id and return code, shared by REGACK and PUBACK.
macro_rules! topic_ack_packet {
    ($(#[$doc:meta])* $name:ident, $type_name:literal, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name {
            pub topic_id: u16,
            pub msg_id: u16,
            pub return_code: u8,
        }

        impl $name {
            pub fn new(topic_id: u16, msg_id: u16, return_code: u8) -> Self {
                Self {
                    topic_id,
                    msg_id,
                    return_code,
                }
            }

            pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
                let mut reader = Reader::new(buf);
                let topic_id = reader.read_u16()?;
                let msg_id = reader.read_u16()?;
                let return_code = reader.read_u8()?;
                reader.finish($type_name)?;
                Ok(Self {
                    topic_id,
                    msg_id,
                    return_code,
                })
            }

            pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
                write_u16(buf, self.topic_id);
                write_u16(buf, self.msg_id);
                buf.put_u8(self.return_code);
                Ok(())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!($label, ": topic_id=0x{:04X}, m{}, rc=0x{:02X}"),
                    self.topic_id, self.msg_id, self.return_code
                )
            }
        }
    };
}

topic_ack_packet!(
    /// REGACK packet.
    RegAck, "REGACK", "Regack"
);
topic_ack_packet!(
    /// PUBACK packet.
    PubAck, "PUBACK", "Puback"
);

/// PUBLISH packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Publish {
    pub flags: Flags,
    /// Must agree with `flags.topic_id_type`.
    pub topic_id: TopicId,
    pub msg_id: u16,
    pub data: Bytes,
}

impl Publish {
    pub fn new(topic_id: TopicId, data: impl Into<Bytes>) -> Self {
        let topic_id_type = match topic_id {
            TopicId::Short(_) => TopicIdType::Short,
            TopicId::Id(_) => TopicIdType::Normal,
        };
        Self {
            flags: Flags::default().with_topic_id_type(topic_id_type),
            topic_id,
            msg_id: 0,
            data: data.into(),
        }
    }

    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        let flags = Flags::decode(reader.read_u8()?);
        let topic_id = TopicId::decode(reader.read_u16()?, flags.topic_id_type);
        let msg_id = reader.read_u16()?;
        let data = Bytes::copy_from_slice(reader.rest());
        Ok(Publish {
            flags,
            topic_id,
            msg_id,
            data,
        })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        let topic_id = self.topic_id.encode(self.flags.topic_id_type)?;
        buf.put_u8(self.flags.encode());
        write_u16(buf, topic_id);
        write_u16(buf, self.msg_id);
        buf.put_slice(&self.data);
        Ok(())
    }
}

impl fmt::Display for Publish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Publish: d{}, q{}, r{}, m{}, {} {}, {} bytes",
            u8::from(self.flags.dup),
            self.flags.qos,
            u8::from(self.flags.retain),
            self.msg_id,
            self.flags.topic_id_type,
            self.topic_id,
            self.data.len()
        )
    }
}

msg_id_packet!(
    /// PUBREC packet.
    PubRec, "PUBREC", "Pubrec"
);
msg_id_packet!(
    /// PUBREL packet.
    PubRel, "PUBREL", "Pubrel"
);
msg_id_packet!(
    /// PUBCOMP packet.
    PubComp, "PUBCOMP", "Pubcomp"
);
