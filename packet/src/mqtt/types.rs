//! Common types for MQTT packets.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// MQTT protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolVersion {
    /// MQTT 3.1.0 ("MQIsdp", level 3)
    #[default]
    V310,
    /// MQTT 3.1.1 ("MQTT", level 4)
    V311,
}

impl ProtocolVersion {
    /// Protocol name carried in CONNECT.
    pub fn protocol_name(self) -> &'static str {
        match self {
            ProtocolVersion::V310 => "MQIsdp",
            ProtocolVersion::V311 => "MQTT",
        }
    }

    /// Protocol level carried in CONNECT.
    pub fn protocol_level(self) -> u8 {
        match self {
            ProtocolVersion::V310 => 3,
            ProtocolVersion::V311 => 4,
        }
    }

    /// Infer the version from the CONNECT protocol name and level.
    pub fn from_name_level(name: &str, level: u8) -> Result<Self> {
        match (name, level) {
            ("MQIsdp", 3) => Ok(ProtocolVersion::V310),
            ("MQTT", 4) => Ok(ProtocolVersion::V311),
            _ => Err(Error::UnsupportedProtocol {
                name: name.to_string(),
                level,
            }),
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::V310 => write!(f, "3.1.0"),
            ProtocolVersion::V311 => write!(f, "3.1.1"),
        }
    }
}

impl FromStr for ProtocolVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "3.1.0" | "3.1" => Ok(ProtocolVersion::V310),
            "3.1.1" => Ok(ProtocolVersion::V311),
            other => Err(Error::UnsupportedVersion(other.to_string())),
        }
    }
}

/// Quality of Service level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub enum QoS {
    /// At most once delivery.
    #[default]
    AtMostOnce = 0,
    /// At least once delivery.
    AtLeastOnce = 1,
    /// Exactly once delivery.
    ExactlyOnce = 2,
}

impl TryFrom<u8> for QoS {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            other => Err(Error::InvalidQoS(other)),
        }
    }
}

impl From<QoS> for u8 {
    fn from(qos: QoS) -> u8 {
        qos as u8
    }
}

impl fmt::Display for QoS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}
