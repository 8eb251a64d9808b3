//! Will negotiation: WILLTOPIC, WILLMSG, their updates and responses.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use super::flags::Flags;
use crate::codec::Reader;
use crate::error::Result;

/// WILLTOPIC packet.
///
/// Without a topic name the body is empty, which clears the will.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WillTopic {
    /// Only QoS and retain are meaningful.
    pub flags: Flags,
    pub topic_name: Option<String>,
}

impl WillTopic {
    pub fn new(topic_name: impl Into<String>) -> Self {
        Self {
            topic_name: Some(topic_name.into()),
            ..Default::default()
        }
    }

    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        if reader.is_empty() {
            return Ok(WillTopic::default());
        }
        let flags = Flags::decode(reader.read_u8()?);
        let topic_name = if reader.is_empty() {
            None
        } else {
            Some(reader.read_rest_string()?)
        };
        Ok(WillTopic { flags, topic_name })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        write_will_topic(buf, &self.flags, self.topic_name.as_deref());
        Ok(())
    }
}

impl fmt::Display for WillTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_will_topic(f, "Willtopic", &self.flags, self.topic_name.as_deref())
    }
}

/// WILLTOPICUPD packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WillTopicUpd {
    pub flags: Flags,
    pub topic_name: Option<String>,
}

impl WillTopicUpd {
    pub fn new(topic_name: impl Into<String>) -> Self {
        Self {
            topic_name: Some(topic_name.into()),
            ..Default::default()
        }
    }

    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        // A lone flags byte carries no topic and is ignored.
        if buf.len() <= 1 {
            return Ok(WillTopicUpd::default());
        }
        let mut reader = Reader::new(buf);
        let flags = Flags::decode(reader.read_u8()?);
        let topic_name = Some(reader.read_rest_string()?);
        Ok(WillTopicUpd { flags, topic_name })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        write_will_topic(buf, &self.flags, self.topic_name.as_deref());
        Ok(())
    }
}

impl fmt::Display for WillTopicUpd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_will_topic(f, "Willtopicupd", &self.flags, self.topic_name.as_deref())
    }
}

fn write_will_topic(buf: &mut BytesMut, flags: &Flags, topic_name: Option<&str>) {
    match topic_name {
        Some(name) if !name.is_empty() => {
            buf.put_u8(flags.encode());
            buf.put_slice(name.as_bytes());
        }
        _ => {}
    }
}

fn fmt_will_topic(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    flags: &Flags,
    topic_name: Option<&str>,
) -> fmt::Result {
    match topic_name {
        Some(name) => write!(
            f,
            "{}: q{}, r{}, '{}'",
            label,
            flags.qos,
            u8::from(flags.retain),
            name
        ),
        None => write!(f, "{}", label),
    }
}

/// WILLMSG packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WillMsg {
    pub data: Bytes,
}

/// WILLMSGUPD packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WillMsgUpd {
    pub data: Bytes,
}

macro_rules! will_message {
    ($name:ident, $label:literal) => {
        impl $name {
            pub fn new(data: impl Into<Bytes>) -> Self {
                Self { data: data.into() }
            }

            pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
                Ok(Self {
                    data: Bytes::copy_from_slice(buf),
                })
            }

            pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
                buf.put_slice(&self.data);
                Ok(())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, ": {} bytes"), self.data.len())
            }
        }
    };
}

will_message!(WillMsg, "Willmsg");
will_message!(WillMsgUpd, "Willmsgupd");

return_code_packet!(
    /// WILLTOPICRESP packet.
    WillTopicResp, "WILLTOPICRESP", "Willtopicresp"
);
return_code_packet!(
    /// WILLMSGRESP packet.
    WillMsgResp, "WILLMSGRESP", "Willmsgresp"
);
