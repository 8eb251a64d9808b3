//! Topic references.

use std::fmt;

use bytes::{BufMut, BytesMut};

use super::flags::TopicIdType;
use crate::codec::Reader;
use crate::error::{Error, Result};

/// Two-byte topic name, sent in place of a topic id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShortTopic(pub [u8; 2]);

impl ShortTopic {
    /// Build from a two-byte name; `None` for any other length.
    pub fn new(name: &str) -> Option<Self> {
        <[u8; 2]>::try_from(name.as_bytes()).ok().map(ShortTopic)
    }

    /// The same two bytes read as a big-endian integer.
    pub fn as_u16(self) -> u16 {
        u16::from_be_bytes(self.0)
    }

    pub fn from_u16(value: u16) -> Self {
        ShortTopic(value.to_be_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }
}

impl fmt::Display for ShortTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Topic reference in the fixed 2-byte topic id position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicId {
    /// Registered or predefined topic id.
    Id(u16),
    /// Short topic name.
    Short(ShortTopic),
}

impl Default for TopicId {
    fn default() -> Self {
        TopicId::Id(0)
    }
}

impl TopicId {
    /// Short topic from a two-character name.
    pub fn short(name: &str) -> Option<Self> {
        ShortTopic::new(name).map(TopicId::Short)
    }

    /// Wire value of the id, whichever form it is held in.
    pub fn as_u16(&self) -> u16 {
        match self {
            TopicId::Id(id) => *id,
            TopicId::Short(short) => short.as_u16(),
        }
    }

    pub(crate) fn decode(value: u16, topic_id_type: TopicIdType) -> Self {
        match topic_id_type {
            TopicIdType::Short => TopicId::Short(ShortTopic::from_u16(value)),
            _ => TopicId::Id(value),
        }
    }

    /// Wire value, checked against the topic id type it is sent with.
    pub(crate) fn encode(&self, topic_id_type: TopicIdType) -> Result<u16> {
        match (topic_id_type, self) {
            (TopicIdType::Short, TopicId::Short(short)) => Ok(short.as_u16()),
            (TopicIdType::Short, TopicId::Id(_)) => Err(Error::TopicIdType {
                expected: "a String",
                topic_id_type: topic_id_type.name(),
            }),
            (_, TopicId::Id(id)) => Ok(*id),
            (_, TopicId::Short(_)) => Err(Error::TopicIdType {
                expected: "an Integer",
                topic_id_type: topic_id_type.name(),
            }),
        }
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicId::Id(id) => write!(f, "0x{:04X}", id),
            TopicId::Short(short) => write!(f, "'{}'", short),
        }
    }
}

/// Topic in SUBSCRIBE and UNSUBSCRIBE: a full name or an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Topic name, sent with topic id type normal.
    ///
    /// A two-byte name also encodes under topic id type short, but it
    /// always decodes as `Id(TopicId::Short(..))`.
    Name(String),
    /// Predefined id or short name.
    Id(TopicId),
}

impl Default for Topic {
    fn default() -> Self {
        Topic::Name(String::new())
    }
}

impl Topic {
    pub fn name(name: impl Into<String>) -> Self {
        Topic::Name(name.into())
    }

    /// Topic name, if this is a full or short name.
    pub fn topic_name(&self) -> Option<String> {
        match self {
            Topic::Name(name) => Some(name.clone()),
            Topic::Id(TopicId::Short(short)) => Some(short.to_string()),
            Topic::Id(TopicId::Id(_)) => None,
        }
    }

    /// Read the topic that fills the rest of the body.
    pub(crate) fn read(reader: &mut Reader<'_>, topic_id_type: TopicIdType) -> Result<Self> {
        match topic_id_type {
            TopicIdType::Normal => reader.read_rest_string().map(Topic::Name),
            TopicIdType::Short => {
                let bytes = reader.read_bytes(2)?;
                Ok(Topic::Id(TopicId::Short(ShortTopic([bytes[0], bytes[1]]))))
            }
            TopicIdType::Predefined | TopicIdType::Reserved => {
                reader.read_u16().map(|id| Topic::Id(TopicId::Id(id)))
            }
        }
    }

    pub(crate) fn write(&self, buf: &mut BytesMut, topic_id_type: TopicIdType) -> Result<()> {
        match (topic_id_type, self) {
            (TopicIdType::Normal, Topic::Name(name)) => {
                buf.put_slice(name.as_bytes());
                Ok(())
            }
            (TopicIdType::Normal, Topic::Id(_)) => Err(Error::TopicIdType {
                expected: "a String",
                topic_id_type: topic_id_type.name(),
            }),
            (TopicIdType::Short, Topic::Name(name)) => {
                let short = ShortTopic::new(name).ok_or(Error::TopicIdType {
                    expected: "a 2-byte String",
                    topic_id_type: topic_id_type.name(),
                })?;
                buf.put_slice(short.as_bytes());
                Ok(())
            }
            (_, Topic::Id(topic_id)) => {
                buf.put_u16(topic_id.encode(topic_id_type)?);
                Ok(())
            }
            (_, Topic::Name(_)) => Err(Error::TopicIdType {
                expected: "an Integer",
                topic_id_type: topic_id_type.name(),
            }),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Name(name) => write!(f, "'{}'", name),
            Topic::Id(topic_id) => fmt::Display::fmt(topic_id, f),
        }
    }
}
