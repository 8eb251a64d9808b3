//! MQTT-SN flags byte.
//!
//! ```text
//! bit  7    6-5   4       3     2            1-0
//!      DUP  QoS   RETAIN  WILL  CLEAN_SESSION TOPIC_ID_TYPE
//! ```

use std::fmt;

use crate::error::{Error, Result};

const DUP: u8 = 0x80;
const QOS_MASK: u8 = 0x60;
const QOS_SHIFT: u8 = 5;
const RETAIN: u8 = 0x10;
const WILL: u8 = 0x08;
const CLEAN_SESSION: u8 = 0x04;
const TOPIC_ID_TYPE_MASK: u8 = 0x03;

/// MQTT-SN Quality of Service level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum QoS {
    /// QoS -1: publish without a connection, no acknowledgement.
    NoConnection,
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl QoS {
    /// Signed QoS level, -1 to 2.
    pub fn as_i8(self) -> i8 {
        match self {
            QoS::NoConnection => -1,
            QoS::AtMostOnce => 0,
            QoS::AtLeastOnce => 1,
            QoS::ExactlyOnce => 2,
        }
    }

    pub fn from_i8(level: i8) -> Result<Self> {
        match level {
            -1 => Ok(QoS::NoConnection),
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            other => Err(Error::InvalidQoS(other as u8)),
        }
    }

    fn bits(self) -> u8 {
        match self {
            QoS::AtMostOnce => 0b00,
            QoS::AtLeastOnce => 0b01,
            QoS::ExactlyOnce => 0b10,
            QoS::NoConnection => 0b11,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => QoS::AtMostOnce,
            0b01 => QoS::AtLeastOnce,
            0b10 => QoS::ExactlyOnce,
            _ => QoS::NoConnection,
        }
    }
}

impl fmt::Display for QoS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

/// How a topic is referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum TopicIdType {
    /// Topic id registered with REGISTER, or a topic name in SUBSCRIBE.
    #[default]
    Normal,
    /// Topic id agreed in advance between client and gateway.
    Predefined,
    /// Two-character topic name.
    Short,
    /// Bit pattern 3. Carries an integer topic id.
    Reserved,
}

impl TopicIdType {
    pub fn name(self) -> &'static str {
        match self {
            TopicIdType::Normal => "normal",
            TopicIdType::Predefined => "predefined",
            TopicIdType::Short => "short",
            TopicIdType::Reserved => "reserved",
        }
    }

    fn bits(self) -> u8 {
        match self {
            TopicIdType::Normal => 0b00,
            TopicIdType::Predefined => 0b01,
            TopicIdType::Short => 0b10,
            TopicIdType::Reserved => 0b11,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & TOPIC_ID_TYPE_MASK {
            0b00 => TopicIdType::Normal,
            0b01 => TopicIdType::Predefined,
            0b10 => TopicIdType::Short,
            _ => TopicIdType::Reserved,
        }
    }
}

impl fmt::Display for TopicIdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decomposed MQTT-SN flags byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Flags {
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
    /// Ask the gateway to prompt for the will topic and message.
    pub will: bool,
    pub clean_session: bool,
    pub topic_id_type: TopicIdType,
}

impl Flags {
    pub fn decode(byte: u8) -> Self {
        Self {
            dup: byte & DUP != 0,
            qos: QoS::from_bits((byte & QOS_MASK) >> QOS_SHIFT),
            retain: byte & RETAIN != 0,
            will: byte & WILL != 0,
            clean_session: byte & CLEAN_SESSION != 0,
            topic_id_type: TopicIdType::from_bits(byte),
        }
    }

    pub fn encode(&self) -> u8 {
        let mut byte = self.qos.bits() << QOS_SHIFT;
        if self.dup {
            byte |= DUP;
        }
        if self.retain {
            byte |= RETAIN;
        }
        if self.will {
            byte |= WILL;
        }
        if self.clean_session {
            byte |= CLEAN_SESSION;
        }
        byte | self.topic_id_type.bits()
    }

    pub fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }

    pub fn with_topic_id_type(mut self, topic_id_type: TopicIdType) -> Self {
        self.topic_id_type = topic_id_type;
        self
    }

    pub fn with_retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }

    pub fn with_dup(mut self, dup: bool) -> Self {
        self.dup = dup;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qos_bits() {
        assert_eq!(Flags::decode(0x60).qos, QoS::NoConnection);
        assert_eq!(Flags::decode(0x60).qos.as_i8(), -1);
        assert_eq!(Flags::decode(0x20).qos, QoS::AtLeastOnce);
        assert_eq!(Flags::decode(0x40).qos, QoS::ExactlyOnce);
        assert_eq!(Flags::default().with_qos(QoS::NoConnection).encode(), 0x60);
        assert_eq!(QoS::from_i8(-1).unwrap(), QoS::NoConnection);
        assert!(QoS::from_i8(3).is_err());
    }

    #[test]
    fn test_flag_bits() {
        let flags = Flags::decode(0b1001_1110);
        assert!(flags.dup);
        assert_eq!(flags.qos, QoS::AtMostOnce);
        assert!(flags.retain);
        assert!(flags.will);
        assert!(flags.clean_session);
        assert_eq!(flags.topic_id_type, TopicIdType::Short);
        assert_eq!(flags.encode(), 0b1001_1110);
    }

    #[test]
    fn test_topic_id_type_bits() {
        for (byte, topic_id_type) in [
            (0x00, TopicIdType::Normal),
            (0x01, TopicIdType::Predefined),
            (0x02, TopicIdType::Short),
            (0x03, TopicIdType::Reserved),
        ] {
            let flags = Flags::decode(byte);
            assert_eq!(flags.topic_id_type, topic_id_type);
            assert_eq!(flags.encode(), byte);
        }
        assert_eq!(TopicIdType::Predefined.to_string(), "predefined");
    }
}
