//! PUBLISH.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use super::types::QoS;
use crate::codec::{Reader, write_string, write_u16};
use crate::error::{Error, Result};

/// PUBLISH packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Publish {
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
    pub topic: String,
    /// Packet identifier, only on the wire when QoS is not 0.
    pub pkid: u16,
    pub payload: Bytes,
}

impl Publish {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            ..Default::default()
        }
    }

    pub fn with_qos(mut self, qos: QoS, pkid: u16) -> Self {
        self.qos = qos;
        self.pkid = pkid;
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

    /// Fixed header flags: retain, QoS low bit, QoS high bit, dup.
    pub(crate) fn header_flags(&self) -> [bool; 4] {
        let qos = self.qos as u8;
        [self.retain, qos & 0x01 != 0, qos & 0x02 != 0, self.dup]
    }

    /// Reject header flags that no PUBLISH may carry.
    pub(crate) fn validate_flags(flags: [bool; 4]) -> Result<()> {
        let qos = u8::from(flags[1]) | (u8::from(flags[2]) << 1);
        if qos == 3 {
            return Err(Error::InvalidQoS(3));
        }
        if qos == 0 && flags[3] {
            return Err(Error::DupWithoutQoS);
        }
        Ok(())
    }

    /// Decode a body; `flags` must already be validated.
    pub(crate) fn read_body(flags: [bool; 4], buf: &[u8]) -> Result<Self> {
        let qos = QoS::try_from(u8::from(flags[1]) | (u8::from(flags[2]) << 1))?;

        let mut reader = Reader::new(buf);
        let topic = reader.read_string()?;
        let pkid = if qos != QoS::AtMostOnce {
            reader.read_u16()?
        } else {
            0
        };
        let payload = Bytes::copy_from_slice(reader.rest());

        Ok(Publish {
            dup: flags[3],
            qos,
            retain: flags[0],
            topic,
            pkid,
            payload,
        })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        if self.topic.is_empty() {
            return Err(Error::MissingField("topic"));
        }

        write_string(buf, &self.topic)?;
        if self.qos != QoS::AtMostOnce {
            write_u16(buf, self.pkid);
        }
        buf.put_slice(&self.payload);
        Ok(())
    }

    fn payload_summary(&self) -> String {
        let printable = self.payload.iter().all(|b| (b' '..=b'~').contains(b));
        if self.payload.len() < 16 && printable {
            format!("'{}'", String::from_utf8_lossy(&self.payload))
        } else {
            format!("... ({} bytes)", self.payload.len())
        }
    }
}

impl fmt::Display for Publish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Publish: d{}, q{}, r{}, m{}, '{}', {}",
            u8::from(self.dup),
            self.qos,
            u8::from(self.retain),
            self.pkid,
            self.topic,
            self.payload_summary()
        )
    }
}
