//! MQTT 3.1.0 / 3.1.1 packets.
//!
//! Every packet starts with a fixed header: one byte holding the packet type
//! (high nibble) and four flag bits (low nibble), then the remaining length
//! as a variable-length integer, then exactly that many body bytes.
//!
//! ```
//! use mqtt_packet::mqtt::{Packet, Publish};
//!
//! let packet = Packet::Publish(Publish::new("test", "hello world"));
//! let bytes = packet.to_bytes()?;
//! assert_eq!(&bytes[..2], b"\x30\x11");
//!
//! let parsed = Packet::parse(&bytes)?;
//! assert_eq!(parsed, packet);
//! # Ok::<(), mqtt_packet::Error>(())
//! ```

mod ack;
mod connect;
mod publish;
mod subscribe;
mod types;

use std::fmt;
use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::codec::{
    INITIAL_BODY_CAPACITY, MAX_REMAINING_LENGTH, bits_to_byte, read_byte, read_variable_int,
    read_variable_int_from, variable_int_len, write_variable_int,
};
use crate::config::CodecConfig;
use crate::error::{Error, Result};

pub use ack::{PubAck, PubComp, PubRec, PubRel, UnsubAck};
pub use connect::{ConnAck, Connect, Will};
pub use publish::Publish;
pub use subscribe::{SubAck, Subscribe, SubscribeFilter, Unsubscribe};
pub use types::{ProtocolVersion, QoS};

/// Header flags required on PUBREL, SUBSCRIBE and UNSUBSCRIBE.
const RESERVED_FLAGS: [bool; 4] = [false, true, false, false];

/// MQTT control packet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    Connect = 1,
    ConnAck = 2,
    Publish = 3,
    PubAck = 4,
    PubRec = 5,
    PubRel = 6,
    PubComp = 7,
    Subscribe = 8,
    SubAck = 9,
    Unsubscribe = 10,
    UnsubAck = 11,
    PingReq = 12,
    PingResp = 13,
    Disconnect = 14,
}

impl PacketType {
    /// Upper-case type name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            PacketType::Connect => "CONNECT",
            PacketType::ConnAck => "CONNACK",
            PacketType::Publish => "PUBLISH",
            PacketType::PubAck => "PUBACK",
            PacketType::PubRec => "PUBREC",
            PacketType::PubRel => "PUBREL",
            PacketType::PubComp => "PUBCOMP",
            PacketType::Subscribe => "SUBSCRIBE",
            PacketType::SubAck => "SUBACK",
            PacketType::Unsubscribe => "UNSUBSCRIBE",
            PacketType::UnsubAck => "UNSUBACK",
            PacketType::PingReq => "PINGREQ",
            PacketType::PingResp => "PINGRESP",
            PacketType::Disconnect => "DISCONNECT",
        }
    }

    /// Check the fixed header flags for this packet type.
    pub fn validate_flags(self, flags: [bool; 4]) -> Result<()> {
        let valid = match self {
            PacketType::Publish => return Publish::validate_flags(flags),
            PacketType::PubRel | PacketType::Subscribe | PacketType::Unsubscribe => {
                flags == RESERVED_FLAGS
            }
            _ => flags == [false; 4],
        };
        if valid {
            Ok(())
        } else {
            Err(Error::InvalidFlags(self.name()))
        }
    }
}

impl TryFrom<u8> for PacketType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        let packet_type = match value {
            1 => PacketType::Connect,
            2 => PacketType::ConnAck,
            3 => PacketType::Publish,
            4 => PacketType::PubAck,
            5 => PacketType::PubRec,
            6 => PacketType::PubRel,
            7 => PacketType::PubComp,
            8 => PacketType::Subscribe,
            9 => PacketType::SubAck,
            10 => PacketType::Unsubscribe,
            11 => PacketType::UnsubAck,
            12 => PacketType::PingReq,
            13 => PacketType::PingResp,
            14 => PacketType::Disconnect,
            other => return Err(Error::InvalidPacketType(other)),
        };
        Ok(packet_type)
    }
}

/// Decoded fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeader {
    pub packet_type: PacketType,
    /// Flag bits, index 0 being the least significant.
    pub flags: [bool; 4],
    /// Declared body length.
    pub remaining_length: u32,
    /// Bytes taken by the header itself.
    pub header_length: usize,
}

impl FixedHeader {
    /// Parse a fixed header from the front of `buf`.
    ///
    /// The type and flags are checked; the body is not.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < 2 {
            return Err(Error::TooShort);
        }

        let (packet_type, flags) = split_first_byte(buf[0])?;
        let (remaining_length, var_len) = read_variable_int(&buf[1..])?;

        Ok(FixedHeader {
            packet_type,
            flags,
            remaining_length,
            header_length: 1 + var_len,
        })
    }
}

pub(crate) fn split_first_byte(byte: u8) -> Result<(PacketType, [bool; 4])> {
    let packet_type = PacketType::try_from(byte >> 4)?;
    let flags = [byte & 0x01 != 0, byte & 0x02 != 0, byte & 0x04 != 0, byte & 0x08 != 0];
    packet_type.validate_flags(flags)?;
    Ok((packet_type, flags))
}

/// MQTT 3.1.0 / 3.1.1 packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Connect(Connect),
    ConnAck(ConnAck),
    Publish(Publish),
    PubAck(PubAck),
    PubRec(PubRec),
    PubRel(PubRel),
    PubComp(PubComp),
    Subscribe(Subscribe),
    SubAck(SubAck),
    Unsubscribe(Unsubscribe),
    UnsubAck(UnsubAck),
    PingReq,
    PingResp,
    Disconnect,
}

// ============================================================================
// Packet parsing
// ============================================================================

impl Packet {
    /// Parse one complete packet from a buffer.
    ///
    /// The buffer must hold exactly the fixed header and the declared body.
    pub fn parse(buf: &[u8]) -> Result<Packet> {
        Self::parse_with(buf, &CodecConfig::default())
    }

    /// Parse one complete packet, applying the limits in `config`.
    pub fn parse_with(buf: &[u8], config: &CodecConfig) -> Result<Packet> {
        let header = FixedHeader::parse(buf)?;
        let declared = header.remaining_length as usize;
        config.check_size(header.header_length + declared)?;

        let body = &buf[header.header_length..];
        if body.len() != declared {
            return Err(Error::BodyLengthMismatch {
                actual: body.len(),
                declared,
            });
        }

        Self::parse_body(header.packet_type, header.flags, body)
    }

    /// Read one packet from a blocking byte source.
    pub fn read<R: Read>(reader: &mut R) -> Result<Packet> {
        Self::read_with(reader, &CodecConfig::default())
    }

    /// Read one packet from a blocking byte source, applying the limits in `config`.
    pub fn read_with<R: Read>(reader: &mut R, config: &CodecConfig) -> Result<Packet> {
        let (packet_type, flags) = split_first_byte(read_byte(reader)?)?;
        let declared = read_variable_int_from(reader)? as usize;
        config.check_size(1 + variable_int_len(declared as u32) + declared)?;

        let mut body = Vec::with_capacity(declared.min(INITIAL_BODY_CAPACITY));
        reader.by_ref().take(declared as u64).read_to_end(&mut body)?;
        if body.len() != declared {
            debug!(
                packet_type = packet_type.name(),
                declared,
                actual = body.len(),
                "short read of packet body"
            );
            return Err(Error::BodyLengthMismatch {
                actual: body.len(),
                declared,
            });
        }

        Self::parse_body(packet_type, flags, &body)
    }

    /// Decode a body whose header has already been read and checked.
    pub(crate) fn parse_body(
        packet_type: PacketType,
        flags: [bool; 4],
        body: &[u8],
    ) -> Result<Packet> {
        let packet = match packet_type {
            PacketType::Connect => Packet::Connect(Connect::read_body(body)?),
            PacketType::ConnAck => Packet::ConnAck(ConnAck::read_body(body)?),
            PacketType::Publish => Packet::Publish(Publish::read_body(flags, body)?),
            PacketType::PubAck => Packet::PubAck(PubAck::read_body(body)?),
            PacketType::PubRec => Packet::PubRec(PubRec::read_body(body)?),
            PacketType::PubRel => Packet::PubRel(PubRel::read_body(body)?),
            PacketType::PubComp => Packet::PubComp(PubComp::read_body(body)?),
            PacketType::Subscribe => Packet::Subscribe(Subscribe::read_body(body)?),
            PacketType::SubAck => Packet::SubAck(SubAck::read_body(body)?),
            PacketType::Unsubscribe => Packet::Unsubscribe(Unsubscribe::read_body(body)?),
            PacketType::UnsubAck => Packet::UnsubAck(UnsubAck::read_body(body)?),
            PacketType::PingReq | PacketType::PingResp | PacketType::Disconnect => {
                if !body.is_empty() {
                    return Err(Error::ExtraBytes(packet_type.name()));
                }
                match packet_type {
                    PacketType::PingReq => Packet::PingReq,
                    PacketType::PingResp => Packet::PingResp,
                    _ => Packet::Disconnect,
                }
            }
        };

        trace!(packet_type = packet_type.name(), body_len = body.len(), "decoded packet");
        Ok(packet)
    }
}

// ============================================================================
// Packet encoding
// ============================================================================

impl Packet {
    /// Append the encoded packet to `buf`.
    ///
    /// On error nothing is appended.
    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        let mut body = BytesMut::new();
        self.write_body(&mut body)?;

        if body.len() > MAX_REMAINING_LENGTH as usize {
            return Err(Error::BodyTooLarge {
                size: body.len(),
                max: MAX_REMAINING_LENGTH as usize,
            });
        }

        let flags = self.flags();
        let first_byte = ((self.packet_type() as u8) << 4) | bits_to_byte(&flags);

        buf.reserve(1 + variable_int_len(body.len() as u32) + body.len());
        buf.put_u8(first_byte);
        write_variable_int(buf, body.len() as u32)?;
        buf.put_slice(&body);

        trace!(packet_type = self.type_name(), body_len = body.len(), "encoded packet");
        Ok(())
    }

    /// Encode the packet into a new buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Encode the packet and write it to a blocking sink.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        match self {
            Packet::Connect(p) => p.write_body(buf),
            Packet::ConnAck(p) => p.write_body(buf),
            Packet::Publish(p) => p.write_body(buf),
            Packet::PubAck(p) => p.write_body(buf),
            Packet::PubRec(p) => p.write_body(buf),
            Packet::PubRel(p) => p.write_body(buf),
            Packet::PubComp(p) => p.write_body(buf),
            Packet::Subscribe(p) => p.write_body(buf),
            Packet::SubAck(p) => p.write_body(buf),
            Packet::Unsubscribe(p) => p.write_body(buf),
            Packet::UnsubAck(p) => p.write_body(buf),
            Packet::PingReq | Packet::PingResp | Packet::Disconnect => Ok(()),
        }
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl Packet {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Connect(_) => PacketType::Connect,
            Packet::ConnAck(_) => PacketType::ConnAck,
            Packet::Publish(_) => PacketType::Publish,
            Packet::PubAck(_) => PacketType::PubAck,
            Packet::PubRec(_) => PacketType::PubRec,
            Packet::PubRel(_) => PacketType::PubRel,
            Packet::PubComp(_) => PacketType::PubComp,
            Packet::Subscribe(_) => PacketType::Subscribe,
            Packet::SubAck(_) => PacketType::SubAck,
            Packet::Unsubscribe(_) => PacketType::Unsubscribe,
            Packet::UnsubAck(_) => PacketType::UnsubAck,
            Packet::PingReq => PacketType::PingReq,
            Packet::PingResp => PacketType::PingResp,
            Packet::Disconnect => PacketType::Disconnect,
        }
    }

    /// Numeric packet type.
    pub fn type_id(&self) -> u8 {
        self.packet_type() as u8
    }

    pub fn type_name(&self) -> &'static str {
        self.packet_type().name()
    }

    /// Fixed header flags this packet is encoded with.
    pub fn flags(&self) -> [bool; 4] {
        match self {
            Packet::Publish(p) => p.header_flags(),
            Packet::PubRel(_) | Packet::Subscribe(_) | Packet::Unsubscribe(_) => RESERVED_FLAGS,
            _ => [false; 4],
        }
    }

    /// Packet identifier, for the types that carry one.
    pub fn pkid(&self) -> Option<u16> {
        match self {
            Packet::Publish(p) if p.qos != QoS::AtMostOnce => Some(p.pkid),
            Packet::PubAck(p) => Some(p.pkid),
            Packet::PubRec(p) => Some(p.pkid),
            Packet::PubRel(p) => Some(p.pkid),
            Packet::PubComp(p) => Some(p.pkid),
            Packet::Subscribe(p) => Some(p.pkid),
            Packet::SubAck(p) => Some(p.pkid),
            Packet::Unsubscribe(p) => Some(p.pkid),
            Packet::UnsubAck(p) => Some(p.pkid),
            _ => None,
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::Connect(p) => fmt::Display::fmt(p, f),
            Packet::ConnAck(p) => fmt::Display::fmt(p, f),
            Packet::Publish(p) => fmt::Display::fmt(p, f),
            Packet::PubAck(p) => fmt::Display::fmt(p, f),
            Packet::PubRec(p) => fmt::Display::fmt(p, f),
            Packet::PubRel(p) => fmt::Display::fmt(p, f),
            Packet::PubComp(p) => fmt::Display::fmt(p, f),
            Packet::Subscribe(p) => fmt::Display::fmt(p, f),
            Packet::SubAck(p) => fmt::Display::fmt(p, f),
            Packet::Unsubscribe(p) => fmt::Display::fmt(p, f),
            Packet::UnsubAck(p) => fmt::Display::fmt(p, f),
            Packet::PingReq => write!(f, "Pingreq"),
            Packet::PingResp => write!(f, "Pingresp"),
            Packet::Disconnect => write!(f, "Disconnect"),
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Packet {
                fn from(p: $variant) -> Self {
                    Packet::$variant(p)
                }
            }
        )*
    };
}

impl_from_variant!(
    Connect, ConnAck, Publish, PubAck, PubRec, PubRel, PubComp, Subscribe, SubAck, Unsubscribe,
    UnsubAck,
);
