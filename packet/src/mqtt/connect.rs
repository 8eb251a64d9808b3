//! CONNECT and CONNACK.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use super::types::{ProtocolVersion, QoS};
use crate::codec::{Reader, write_binary, write_string, write_u16};
use crate::error::{Error, Result};

/// Client identifier length limits for MQTT 3.1.0.
const CLIENT_ID_MIN: usize = 1;
const CLIENT_ID_MAX: usize = 23;

mod flags {
    pub const CLEAN_SESSION: u8 = 0x02;
    pub const WILL: u8 = 0x04;
    pub const WILL_QOS_SHIFT: u8 = 3;
    pub const WILL_QOS_MASK: u8 = 0x18;
    pub const WILL_RETAIN: u8 = 0x20;
    pub const PASSWORD: u8 = 0x40;
    pub const USERNAME: u8 = 0x80;
}

/// CONNECT packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connect {
    /// Protocol version, which selects the protocol name and level.
    pub version: ProtocolVersion,
    pub client_id: String,
    pub clean_session: bool,
    /// Keep alive interval in seconds.
    pub keep_alive: u16,
    pub will: Option<Will>,
    pub username: Option<String>,
    pub password: Option<Bytes>,
}

/// Last Will and Testament.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Will {
    pub topic: String,
    pub payload: Bytes,
    pub qos: QoS,
    pub retain: bool,
}

impl Will {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            ..Default::default()
        }
    }

    pub fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }

    pub fn with_retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }
}

impl Default for Connect {
    fn default() -> Self {
        Self {
            version: ProtocolVersion::default(),
            client_id: String::new(),
            clean_session: true,
            keep_alive: 15,
            will: None,
            username: None,
            password: None,
        }
    }
}

impl Connect {
    /// Create a CONNECT with default settings.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: ProtocolVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_keep_alive(mut self, seconds: u16) -> Self {
        self.keep_alive = seconds;
        self
    }

    pub fn with_clean_session(mut self, clean: bool) -> Self {
        self.clean_session = clean;
        self
    }

    pub fn with_will(mut self, will: Will) -> Self {
        self.will = Some(will);
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<Bytes>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn protocol_name(&self) -> &'static str {
        self.version.protocol_name()
    }

    pub fn protocol_level(&self) -> u8 {
        self.version.protocol_level()
    }

    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);

        let name = reader.read_string()?;
        let level = reader.read_u8()?;
        let version = ProtocolVersion::from_name_level(&name, level)?;

        let connect_flags = reader.read_u8()?;
        let keep_alive = reader.read_u16()?;
        let client_id = reader.read_string()?;

        let will = if connect_flags & flags::WILL != 0 {
            let qos = (connect_flags & flags::WILL_QOS_MASK) >> flags::WILL_QOS_SHIFT;
            let topic = reader.read_string()?;
            let payload = reader.read_binary()?;
            Some(Will {
                topic,
                payload,
                qos: QoS::try_from(qos)?,
                retain: connect_flags & flags::WILL_RETAIN != 0,
            })
        } else {
            None
        };

        // A set flag with nothing left is read as absent.
        let username = if connect_flags & flags::USERNAME != 0 && !reader.is_empty() {
            Some(reader.read_string()?)
        } else {
            None
        };
        let password = if connect_flags & flags::PASSWORD != 0 && !reader.is_empty() {
            Some(reader.read_binary()?)
        } else {
            None
        };

        Ok(Connect {
            version,
            client_id,
            clean_session: connect_flags & flags::CLEAN_SESSION != 0,
            keep_alive,
            will,
            username,
            password,
        })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        if self.version == ProtocolVersion::V310 {
            let len = self.client_id.len();
            if !(CLIENT_ID_MIN..=CLIENT_ID_MAX).contains(&len) {
                return Err(Error::ClientIdLength {
                    len,
                    min: CLIENT_ID_MIN,
                    max: CLIENT_ID_MAX,
                });
            }
        }

        write_string(buf, self.protocol_name())?;
        buf.put_u8(self.protocol_level());
        buf.put_u8(self.connect_flags());
        write_u16(buf, self.keep_alive);
        write_string(buf, &self.client_id)?;

        if let Some(ref will) = self.will {
            write_string(buf, &will.topic)?;
            write_binary(buf, &will.payload)?;
        }
        if let Some(ref username) = self.username {
            write_string(buf, username)?;
        }
        if let Some(ref password) = self.password {
            write_binary(buf, password)?;
        }

        Ok(())
    }

    fn connect_flags(&self) -> u8 {
        let mut byte = 0;
        if self.clean_session {
            byte |= flags::CLEAN_SESSION;
        }
        if let Some(ref will) = self.will {
            byte |= flags::WILL;
            byte |= (will.qos as u8) << flags::WILL_QOS_SHIFT;
            if will.retain {
                byte |= flags::WILL_RETAIN;
            }
        }
        if self.password.is_some() {
            byte |= flags::PASSWORD;
        }
        if self.username.is_some() {
            byte |= flags::USERNAME;
        }
        byte
    }
}

impl fmt::Display for Connect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connect: keep_alive={}", self.keep_alive)?;
        if self.clean_session {
            write!(f, ", clean")?;
        }
        write!(f, ", client_id='{}'", self.client_id)?;
        if let Some(ref username) = self.username {
            write!(f, ", username='{}'", username)?;
        }
        if self.password.is_some() {
            write!(f, ", password=...")?;
        }
        Ok(())
    }
}

// ============================================================================
// CONNACK
// ============================================================================

/// CONNACK packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnAck {
    pub session_present: bool,
    pub return_code: u8,
}

impl ConnAck {
    pub fn new(return_code: u8, session_present: bool) -> Self {
        Self {
            session_present,
            return_code,
        }
    }

    /// Human-readable description of the return code.
    pub fn return_message(&self) -> String {
        match self.return_code {
            0x00 => "Connection Accepted".to_string(),
            0x01 => "Connection refused: unacceptable protocol version".to_string(),
            0x02 => "Connection refused: client identifier rejected".to_string(),
            0x03 => "Connection refused: server unavailable".to_string(),
            0x04 => "Connection refused: bad user name or password".to_string(),
            0x05 => "Connection refused: not authorised".to_string(),
            code => format!("Connection refused: error code {}", code),
        }
    }

    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);

        let ack_flags = reader.read_u8()?;
        if ack_flags & 0xFE != 0 {
            return Err(Error::InvalidConnAckFlags);
        }
        let return_code = reader.read_u8()?;
        reader.finish("CONNACK")?;

        Ok(ConnAck {
            session_present: ack_flags & 0x01 != 0,
            return_code,
        })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u8(u8::from(self.session_present));
        buf.put_u8(self.return_code);
        Ok(())
    }
}

impl fmt::Display for ConnAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connack: 0x{:02X}", self.return_code)
    }
}
