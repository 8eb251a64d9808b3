//! MQTT-SN 1.2 packets.
//!
//! The header is the total packet length followed by the packet type. A
//! length that does not fit in one byte is sent as `0x01` followed by a
//! 16-bit length:
//!
//! ```text
//! body <= 253:   [total_len] [type] body...
//! body >  253:   [0x01] [total_len_hi] [total_len_lo] [type] body...
//! ```
//!
//! The length counts the header itself and must match the packet exactly.

use std::fmt;
use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::codec::{INITIAL_BODY_CAPACITY, read_byte};
use crate::config::CodecConfig;
use crate::error::{Error, Result};

/// Single return code byte: CONNACK, WILLTOPICRESP and WILLMSGRESP.
macro_rules! return_code_packet {
    ($(#[$doc:meta])* $name:ident, $type_name:literal, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name {
            pub return_code: u8,
        }

        impl $name {
            pub fn new(return_code: u8) -> Self {
                Self { return_code }
            }

            pub(crate) fn read_body(buf: &[u8]) -> $crate::Result<Self> {
                let mut reader = $crate::codec::Reader::new(buf);
                let return_code = reader.read_u8()?;
                reader.finish($type_name)?;
                Ok(Self { return_code })
            }

            pub(crate) fn write_body(&self, buf: &mut ::bytes::BytesMut) -> $crate::Result<()> {
                ::bytes::BufMut::put_u8(buf, self.return_code);
                Ok(())
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!($label, ": 0x{:02X}"), self.return_code)
            }
        }
    };
}

/// Message id only: PUBREC, PUBREL, PUBCOMP and UNSUBACK.
macro_rules! msg_id_packet {
    ($(#[$doc:meta])* $name:ident, $type_name:literal, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name {
            pub msg_id: u16,
        }

        impl $name {
            pub fn new(msg_id: u16) -> Self {
                Self { msg_id }
            }

            pub(crate) fn read_body(buf: &[u8]) -> $crate::Result<Self> {
                let mut reader = $crate::codec::Reader::new(buf);
                let msg_id = reader.read_u16()?;
                reader.finish($type_name)?;
                Ok(Self { msg_id })
            }

            pub(crate) fn write_body(&self, buf: &mut ::bytes::BytesMut) -> $crate::Result<()> {
                $crate::codec::write_u16(buf, self.msg_id);
                Ok(())
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!($label, ": m{}"), self.msg_id)
            }
        }
    };
}

mod connect;
mod flags;
mod gateway;
mod publish;
mod subscribe;
mod topic;
mod will;

pub use connect::{ConnAck, Connect, Disconnect, PingReq};
pub use flags::{Flags, QoS, TopicIdType};
pub use gateway::{Advertise, GwInfo, SearchGw};
pub use publish::{PubAck, PubComp, PubRec, PubRel, Publish, RegAck, Register};
pub use subscribe::{SubAck, Subscribe, UnsubAck, Unsubscribe};
pub use topic::{ShortTopic, Topic, TopicId};
pub use will::{WillMsg, WillMsgResp, WillMsgUpd, WillTopic, WillTopicResp, WillTopicUpd};

/// Largest body that fits the 3-byte length header.
pub const MAX_BODY_LENGTH: usize = 65_531;

/// Largest body that fits the 1-byte length header.
const SHORT_BODY_MAX: usize = 253;

/// Marks the 3-byte length header.
const LONG_LENGTH_MARKER: u8 = 0x01;

/// MQTT-SN packet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    Advertise = 0x00,
    SearchGw = 0x01,
    GwInfo = 0x02,
    Connect = 0x04,
    ConnAck = 0x05,
    WillTopicReq = 0x06,
    WillTopic = 0x07,
    WillMsgReq = 0x08,
    WillMsg = 0x09,
    Register = 0x0A,
    RegAck = 0x0B,
    Publish = 0x0C,
    PubAck = 0x0D,
    PubComp = 0x0E,
    PubRec = 0x0F,
    PubRel = 0x10,
    Subscribe = 0x12,
    SubAck = 0x13,
    Unsubscribe = 0x14,
    UnsubAck = 0x15,
    PingReq = 0x16,
    PingResp = 0x17,
    Disconnect = 0x18,
    WillTopicUpd = 0x1A,
    WillTopicResp = 0x1B,
    WillMsgUpd = 0x1C,
    WillMsgResp = 0x1D,
}

impl PacketType {
    pub fn name(self) -> &'static str {
        match self {
            PacketType::Advertise => "ADVERTISE",
            PacketType::SearchGw => "SEARCHGW",
            PacketType::GwInfo => "GWINFO",
            PacketType::Connect => "CONNECT",
            PacketType::ConnAck => "CONNACK",
            PacketType::WillTopicReq => "WILLTOPICREQ",
            PacketType::WillTopic => "WILLTOPIC",
            PacketType::WillMsgReq => "WILLMSGREQ",
            PacketType::WillMsg => "WILLMSG",
            PacketType::Register => "REGISTER",
            PacketType::RegAck => "REGACK",
            PacketType::Publish => "PUBLISH",
            PacketType::PubAck => "PUBACK",
            PacketType::PubComp => "PUBCOMP",
            PacketType::PubRec => "PUBREC",
            PacketType::PubRel => "PUBREL",
            PacketType::Subscribe => "SUBSCRIBE",
            PacketType::SubAck => "SUBACK",
            PacketType::Unsubscribe => "UNSUBSCRIBE",
            PacketType::UnsubAck => "UNSUBACK",
            PacketType::PingReq => "PINGREQ",
            PacketType::PingResp => "PINGRESP",
            PacketType::Disconnect => "DISCONNECT",
            PacketType::WillTopicUpd => "WILLTOPICUPD",
            PacketType::WillTopicResp => "WILLTOPICRESP",
            PacketType::WillMsgUpd => "WILLMSGUPD",
            PacketType::WillMsgResp => "WILLMSGRESP",
        }
    }
}

impl TryFrom<u8> for PacketType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        let packet_type = match value {
            0x00 => PacketType::Advertise,
            0x01 => PacketType::SearchGw,
            0x02 => PacketType::GwInfo,
            0x04 => PacketType::Connect,
            0x05 => PacketType::ConnAck,
            0x06 => PacketType::WillTopicReq,
            0x07 => PacketType::WillTopic,
            0x08 => PacketType::WillMsgReq,
            0x09 => PacketType::WillMsg,
            0x0A => PacketType::Register,
            0x0B => PacketType::RegAck,
            0x0C => PacketType::Publish,
            0x0D => PacketType::PubAck,
            0x0E => PacketType::PubComp,
            0x0F => PacketType::PubRec,
            0x10 => PacketType::PubRel,
            0x12 => PacketType::Subscribe,
            0x13 => PacketType::SubAck,
            0x14 => PacketType::Unsubscribe,
            0x15 => PacketType::UnsubAck,
            0x16 => PacketType::PingReq,
            0x17 => PacketType::PingResp,
            0x18 => PacketType::Disconnect,
            0x1A => PacketType::WillTopicUpd,
            0x1B => PacketType::WillTopicResp,
            0x1C => PacketType::WillMsgUpd,
            0x1D => PacketType::WillMsgResp,
            other => return Err(Error::InvalidPacketType(other)),
        };
        Ok(packet_type)
    }
}

/// MQTT-SN packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Advertise(Advertise),
    SearchGw(SearchGw),
    GwInfo(GwInfo),
    Connect(Connect),
    ConnAck(ConnAck),
    WillTopicReq,
    WillTopic(WillTopic),
    WillMsgReq,
    WillMsg(WillMsg),
    Register(Register),
    RegAck(RegAck),
    Publish(Publish),
    PubAck(PubAck),
    PubComp(PubComp),
    PubRec(PubRec),
    PubRel(PubRel),
    Subscribe(Subscribe),
    SubAck(SubAck),
    Unsubscribe(Unsubscribe),
    UnsubAck(UnsubAck),
    PingReq(PingReq),
    PingResp,
    Disconnect(Disconnect),
    WillTopicUpd(WillTopicUpd),
    WillTopicResp(WillTopicResp),
    WillMsgUpd(WillMsgUpd),
    WillMsgResp(WillMsgResp),
}

// ============================================================================
// Packet parsing
// ============================================================================

impl Packet {
    /// Parse one complete packet; the length header must match `buf.len()`.
    pub fn parse(buf: &[u8]) -> Result<Packet> {
        Self::parse_with(buf, &CodecConfig::default())
    }

    /// Parse one complete packet, applying the limits in `config`.
    pub fn parse_with(buf: &[u8], config: &CodecConfig) -> Result<Packet> {
        if buf.len() < 2 {
            return Err(Error::TooShort);
        }

        let (declared, header_len) = if buf[0] == LONG_LENGTH_MARKER {
            if buf.len() < 4 {
                return Err(Error::Incomplete {
                    needed: 4 - buf.len(),
                });
            }
            (u16::from_be_bytes([buf[1], buf[2]]) as usize, 4)
        } else {
            (buf[0] as usize, 2)
        };

        if declared != buf.len() {
            return Err(Error::LengthMismatch {
                actual: buf.len(),
                declared,
            });
        }
        config.check_size(declared)?;

        let packet_type = PacketType::try_from(buf[header_len - 1])?;
        Self::parse_body(packet_type, &buf[header_len..])
    }

    /// Read one packet from a blocking byte source.
    pub fn read<R: Read>(reader: &mut R) -> Result<Packet> {
        Self::read_with(reader, &CodecConfig::default())
    }

    /// Read one packet from a blocking byte source, applying the limits in `config`.
    pub fn read_with<R: Read>(reader: &mut R, config: &CodecConfig) -> Result<Packet> {
        let first = read_byte(reader)?;
        let (declared, header_len) = if first == LONG_LENGTH_MARKER {
            let hi = read_byte(reader)?;
            let lo = read_byte(reader)?;
            (u16::from_be_bytes([hi, lo]) as usize, 4)
        } else {
            (first as usize, 2)
        };

        if declared < header_len {
            return Err(Error::LengthMismatch {
                actual: header_len,
                declared,
            });
        }
        config.check_size(declared)?;

        let packet_type = PacketType::try_from(read_byte(reader)?)?;

        let body_len = declared - header_len;
        let mut body = Vec::with_capacity(body_len.min(INITIAL_BODY_CAPACITY));
        reader.by_ref().take(body_len as u64).read_to_end(&mut body)?;
        if body.len() != body_len {
            debug!(
                packet_type = packet_type.name(),
                declared,
                actual = header_len + body.len(),
                "short read of packet body"
            );
            return Err(Error::LengthMismatch {
                actual: header_len + body.len(),
                declared,
            });
        }

        Self::parse_body(packet_type, &body)
    }

    /// Decode a body whose header has already been read.
    pub fn parse_body(packet_type: PacketType, body: &[u8]) -> Result<Packet> {
        let packet = match packet_type {
            PacketType::Advertise => Packet::Advertise(Advertise::read_body(body)?),
            PacketType::SearchGw => Packet::SearchGw(SearchGw::read_body(body)?),
            PacketType::GwInfo => Packet::GwInfo(GwInfo::read_body(body)?),
            PacketType::Connect => Packet::Connect(Connect::read_body(body)?),
            PacketType::ConnAck => Packet::ConnAck(ConnAck::read_body(body)?),
            PacketType::WillTopic => Packet::WillTopic(WillTopic::read_body(body)?),
            PacketType::WillMsg => Packet::WillMsg(WillMsg::read_body(body)?),
            PacketType::Register => Packet::Register(Register::read_body(body)?),
            PacketType::RegAck => Packet::RegAck(RegAck::read_body(body)?),
            PacketType::Publish => Packet::Publish(Publish::read_body(body)?),
            PacketType::PubAck => Packet::PubAck(PubAck::read_body(body)?),
            PacketType::PubComp => Packet::PubComp(PubComp::read_body(body)?),
            PacketType::PubRec => Packet::PubRec(PubRec::read_body(body)?),
            PacketType::PubRel => Packet::PubRel(PubRel::read_body(body)?),
            PacketType::Subscribe => Packet::Subscribe(Subscribe::read_body(body)?),
            PacketType::SubAck => Packet::SubAck(SubAck::read_body(body)?),
            PacketType::Unsubscribe => Packet::Unsubscribe(Unsubscribe::read_body(body)?),
            PacketType::UnsubAck => Packet::UnsubAck(UnsubAck::read_body(body)?),
            PacketType::PingReq => Packet::PingReq(PingReq::read_body(body)?),
            PacketType::Disconnect => Packet::Disconnect(Disconnect::read_body(body)?),
            PacketType::WillTopicUpd => Packet::WillTopicUpd(WillTopicUpd::read_body(body)?),
            PacketType::WillTopicResp => Packet::WillTopicResp(WillTopicResp::read_body(body)?),
            PacketType::WillMsgUpd => Packet::WillMsgUpd(WillMsgUpd::read_body(body)?),
            PacketType::WillMsgResp => Packet::WillMsgResp(WillMsgResp::read_body(body)?),
            PacketType::WillTopicReq | PacketType::WillMsgReq | PacketType::PingResp => {
                if !body.is_empty() {
                    return Err(Error::ExtraBytes(packet_type.name()));
                }
                match packet_type {
                    PacketType::WillTopicReq => Packet::WillTopicReq,
                    PacketType::WillMsgReq => Packet::WillMsgReq,
                    _ => Packet::PingResp,
                }
            }
        };

        trace!(packet_type = packet_type.name(), body_len = body.len(), "decoded sn packet");
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

        let body_len = body.len();
        if body_len > MAX_BODY_LENGTH {
            return Err(Error::BodyTooLarge {
                size: body_len,
                max: MAX_BODY_LENGTH,
            });
        }

        if body_len > SHORT_BODY_MAX {
            buf.reserve(4 + body_len);
            buf.put_u8(LONG_LENGTH_MARKER);
            buf.put_u16((body_len + 4) as u16);
        } else {
            buf.reserve(2 + body_len);
            buf.put_u8((body_len + 2) as u8);
        }
        buf.put_u8(self.type_id());
        buf.put_slice(&body);

        trace!(packet_type = self.type_name(), body_len, "encoded sn packet");
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
            Packet::Advertise(p) => p.write_body(buf),
            Packet::SearchGw(p) => p.write_body(buf),
            Packet::GwInfo(p) => p.write_body(buf),
            Packet::Connect(p) => p.write_body(buf),
            Packet::ConnAck(p) => p.write_body(buf),
            Packet::WillTopic(p) => p.write_body(buf),
            Packet::WillMsg(p) => p.write_body(buf),
            Packet::Register(p) => p.write_body(buf),
            Packet::RegAck(p) => p.write_body(buf),
            Packet::Publish(p) => p.write_body(buf),
            Packet::PubAck(p) => p.write_body(buf),
            Packet::PubComp(p) => p.write_body(buf),
            Packet::PubRec(p) => p.write_body(buf),
            Packet::PubRel(p) => p.write_body(buf),
            Packet::Subscribe(p) => p.write_body(buf),
            Packet::SubAck(p) => p.write_body(buf),
            Packet::Unsubscribe(p) => p.write_body(buf),
            Packet::UnsubAck(p) => p.write_body(buf),
            Packet::PingReq(p) => p.write_body(buf),
            Packet::Disconnect(p) => p.write_body(buf),
            Packet::WillTopicUpd(p) => p.write_body(buf),
            Packet::WillTopicResp(p) => p.write_body(buf),
            Packet::WillMsgUpd(p) => p.write_body(buf),
            Packet::WillMsgResp(p) => p.write_body(buf),
            Packet::WillTopicReq | Packet::WillMsgReq | Packet::PingResp => Ok(()),
        }
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl Packet {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Advertise(_) => PacketType::Advertise,
            Packet::SearchGw(_) => PacketType::SearchGw,
            Packet::GwInfo(_) => PacketType::GwInfo,
            Packet::Connect(_) => PacketType::Connect,
            Packet::ConnAck(_) => PacketType::ConnAck,
            Packet::WillTopicReq => PacketType::WillTopicReq,
            Packet::WillTopic(_) => PacketType::WillTopic,
            Packet::WillMsgReq => PacketType::WillMsgReq,
            Packet::WillMsg(_) => PacketType::WillMsg,
            Packet::Register(_) => PacketType::Register,
            Packet::RegAck(_) => PacketType::RegAck,
            Packet::Publish(_) => PacketType::Publish,
            Packet::PubAck(_) => PacketType::PubAck,
            Packet::PubComp(_) => PacketType::PubComp,
            Packet::PubRec(_) => PacketType::PubRec,
            Packet::PubRel(_) => PacketType::PubRel,
            Packet::Subscribe(_) => PacketType::Subscribe,
            Packet::SubAck(_) => PacketType::SubAck,
            Packet::Unsubscribe(_) => PacketType::Unsubscribe,
            Packet::UnsubAck(_) => PacketType::UnsubAck,
            Packet::PingReq(_) => PacketType::PingReq,
            Packet::PingResp => PacketType::PingResp,
            Packet::Disconnect(_) => PacketType::Disconnect,
            Packet::WillTopicUpd(_) => PacketType::WillTopicUpd,
            Packet::WillTopicResp(_) => PacketType::WillTopicResp,
            Packet::WillMsgUpd(_) => PacketType::WillMsgUpd,
            Packet::WillMsgResp(_) => PacketType::WillMsgResp,
        }
    }

    /// Numeric packet type.
    pub fn type_id(&self) -> u8 {
        self.packet_type() as u8
    }

    pub fn type_name(&self) -> &'static str {
        self.packet_type().name()
    }

    /// Flags byte fields, for the types that carry one.
    pub fn flags(&self) -> Option<&Flags> {
        match self {
            Packet::Connect(p) => Some(&p.flags),
            Packet::Publish(p) => Some(&p.flags),
            Packet::Subscribe(p) => Some(&p.flags),
            Packet::Unsubscribe(p) => Some(&p.flags),
            Packet::SubAck(p) => Some(&p.flags),
            Packet::WillTopic(p) => Some(&p.flags),
            Packet::WillTopicUpd(p) => Some(&p.flags),
            _ => None,
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::Advertise(p) => fmt::Display::fmt(p, f),
            Packet::SearchGw(p) => fmt::Display::fmt(p, f),
            Packet::GwInfo(p) => fmt::Display::fmt(p, f),
            Packet::Connect(p) => fmt::Display::fmt(p, f),
            Packet::ConnAck(p) => fmt::Display::fmt(p, f),
            Packet::WillTopicReq => write!(f, "Willtopicreq"),
            Packet::WillTopic(p) => fmt::Display::fmt(p, f),
            Packet::WillMsgReq => write!(f, "Willmsgreq"),
            Packet::WillMsg(p) => fmt::Display::fmt(p, f),
            Packet::Register(p) => fmt::Display::fmt(p, f),
            Packet::RegAck(p) => fmt::Display::fmt(p, f),
            Packet::Publish(p) => fmt::Display::fmt(p, f),
            Packet::PubAck(p) => fmt::Display::fmt(p, f),
            Packet::PubComp(p) => fmt::Display::fmt(p, f),
            Packet::PubRec(p) => fmt::Display::fmt(p, f),
            Packet::PubRel(p) => fmt::Display::fmt(p, f),
            Packet::Subscribe(p) => fmt::Display::fmt(p, f),
            Packet::SubAck(p) => fmt::Display::fmt(p, f),
            Packet::Unsubscribe(p) => fmt::Display::fmt(p, f),
            Packet::UnsubAck(p) => fmt::Display::fmt(p, f),
            Packet::PingReq(p) => fmt::Display::fmt(p, f),
            Packet::PingResp => write!(f, "Pingresp"),
            Packet::Disconnect(p) => fmt::Display::fmt(p, f),
            Packet::WillTopicUpd(p) => fmt::Display::fmt(p, f),
            Packet::WillTopicResp(p) => fmt::Display::fmt(p, f),
            Packet::WillMsgUpd(p) => fmt::Display::fmt(p, f),
            Packet::WillMsgResp(p) => fmt::Display::fmt(p, f),
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
    Advertise,
    SearchGw,
    GwInfo,
    Connect,
    ConnAck,
    WillTopic,
    WillMsg,
    Register,
    RegAck,
    Publish,
    PubAck,
    PubComp,
    PubRec,
    PubRel,
    Subscribe,
    SubAck,
    Unsubscribe,
    UnsubAck,
    PingReq,
    Disconnect,
    WillTopicUpd,
    WillTopicResp,
    WillMsgUpd,
    WillMsgResp,
);
