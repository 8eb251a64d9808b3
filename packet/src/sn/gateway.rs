//! Gateway discovery: ADVERTISE, SEARCHGW and GWINFO.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{Reader, write_u16};
use crate::error::Result;

/// ADVERTISE packet, broadcast periodically by a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Advertise {
    pub gateway_id: u8,
    /// Seconds until the next ADVERTISE.
    pub duration: u16,
}

impl Advertise {
    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        let gateway_id = reader.read_u8()?;
        let duration = reader.read_u16()?;
        reader.finish("ADVERTISE")?;
        Ok(Advertise { gateway_id, duration })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u8(self.gateway_id);
        write_u16(buf, self.duration);
        Ok(())
    }
}

impl fmt::Display for Advertise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Advertise: gateway_id={}, duration={}", self.gateway_id, self.duration)
    }
}

/// SEARCHGW packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchGw {
    /// Broadcast radius in hops.
    pub radius: u8,
}

impl Default for SearchGw {
    fn default() -> Self {
        Self { radius: 1 }
    }
}

impl SearchGw {
    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        let radius = reader.read_u8()?;
        reader.finish("SEARCHGW")?;
        Ok(SearchGw { radius })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u8(self.radius);
        Ok(())
    }
}

impl fmt::Display for SearchGw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Searchgw: radius={}", self.radius)
    }
}

/// GWINFO packet.
///
/// The address is only present when a client answers on behalf of a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GwInfo {
    pub gateway_id: u8,
    pub gateway_address: Option<Bytes>,
}

impl GwInfo {
    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        let gateway_id = reader.read_u8()?;
        let gateway_address = if reader.is_empty() {
            None
        } else {
            Some(Bytes::copy_from_slice(reader.rest()))
        };
        Ok(GwInfo {
            gateway_id,
            gateway_address,
        })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u8(self.gateway_id);
        if let Some(ref address) = self.gateway_address {
            buf.put_slice(address);
        }
        Ok(())
    }
}

impl fmt::Display for GwInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gwinfo: gateway_id={}", self.gateway_id)?;
        if let Some(ref address) = self.gateway_address {
            write!(f, ", gateway_address={:?}", address)?;
        }
        Ok(())
    }
}
