//! Session packets: CONNECT, CONNACK, PINGREQ and DISCONNECT.

use std::fmt;

use bytes::{BufMut, BytesMut};

use super::flags::Flags;
use crate::codec::{Reader, write_u16};
use crate::error::{Error, Result};

/// Only protocol id defined by MQTT-SN 1.2.
const PROTOCOL_ID: u8 = 0x01;

const CLIENT_ID_MIN: usize = 1;
const CLIENT_ID_MAX: usize = 23;

/// CONNECT packet.
///
/// Only the will and clean-session bits of `flags` are meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connect {
    pub flags: Flags,
    /// Keep alive interval in seconds.
    pub keep_alive: u16,
    pub client_id: String,
}

impl Default for Connect {
    fn default() -> Self {
        Self {
            flags: Flags {
                clean_session: true,
                ..Default::default()
            },
            keep_alive: 15,
            client_id: String::new(),
        }
    }
}

impl Connect {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Default::default()
        }
    }

    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        let flags = Flags::decode(reader.read_u8()?);
        let protocol_id = reader.read_u8()?;
        if protocol_id != PROTOCOL_ID {
            return Err(Error::UnsupportedProtocolId(protocol_id));
        }
        let keep_alive = reader.read_u16()?;
        let client_id = reader.read_rest_string()?;

        Ok(Connect {
            flags,
            keep_alive,
            client_id,
        })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        let len = self.client_id.len();
        if !(CLIENT_ID_MIN..=CLIENT_ID_MAX).contains(&len) {
            return Err(Error::ClientIdLength {
                len,
                min: CLIENT_ID_MIN,
                max: CLIENT_ID_MAX,
            });
        }

        buf.put_u8(self.flags.encode());
        buf.put_u8(PROTOCOL_ID);
        write_u16(buf, self.keep_alive);
        buf.put_slice(self.client_id.as_bytes());
        Ok(())
    }
}

impl fmt::Display for Connect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connect: keep_alive={}", self.keep_alive)?;
        if self.flags.clean_session {
            write!(f, ", clean")?;
        }
        if self.flags.will {
            write!(f, ", will")?;
        }
        write!(f, ", client_id='{}'", self.client_id)
    }
}

return_code_packet!(
    /// CONNACK packet.
    ConnAck, "CONNACK", "Connack"
);

impl ConnAck {
    /// Human-readable description of the return code.
    pub fn return_message(&self) -> String {
        match self.return_code {
            0x00 => "Accepted".to_string(),
            0x01 => "Rejected: congestion".to_string(),
            0x02 => "Rejected: invalid topic ID".to_string(),
            0x03 => "Rejected: not supported".to_string(),
            code => format!("Rejected: error code {}", code),
        }
    }
}

/// PINGREQ packet.
///
/// A sleeping client includes its client id to wake up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PingReq {
    pub client_id: Option<String>,
}

impl PingReq {
    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        let client_id = if reader.is_empty() {
            None
        } else {
            Some(reader.read_rest_string()?)
        };
        Ok(PingReq { client_id })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        if let Some(ref client_id) = self.client_id {
            buf.put_slice(client_id.as_bytes());
        }
        Ok(())
    }
}

impl fmt::Display for PingReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.client_id {
            Some(ref client_id) => write!(f, "Pingreq: client_id='{}'", client_id),
            None => write!(f, "Pingreq"),
        }
    }
}

/// DISCONNECT packet.
///
/// A duration asks the gateway to treat the client as asleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Disconnect {
    pub duration: Option<u16>,
}

impl Disconnect {
    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        if reader.is_empty() {
            return Ok(Disconnect { duration: None });
        }
        let duration = reader.read_u16()?;
        reader.finish("DISCONNECT")?;
        Ok(Disconnect {
            duration: Some(duration),
        })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        // Zero is sent as no duration at all.
        match self.duration {
            Some(duration) if duration != 0 => write_u16(buf, duration),
            _ => {}
        }
        Ok(())
    }
}

impl fmt::Display for Disconnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.duration {
            Some(duration) => write!(f, "Disconnect: duration={}", duration),
            None => write!(f, "Disconnect"),
        }
    }
}
