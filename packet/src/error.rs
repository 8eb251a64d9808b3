//! Error types for mqtt-packet.

use std::io;

/// Result type alias for mqtt-packet.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for packet encoding and decoding.
///
/// Decode failures describe malformed input and never leave a partially
/// built packet behind. Encode failures describe a packet that cannot be
/// represented on the wire.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error from the underlying reader or writer.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// End of input while reading a header byte.
    #[error("failed to read byte from socket")]
    UnexpectedEof,

    /// Unknown numeric packet type.
    #[error("invalid packet type identifier: {0}")]
    InvalidPacketType(u8),

    /// Buffer too short to hold a fixed header.
    #[error("invalid packet: less than 2 bytes long")]
    TooShort,

    /// Remaining length ran past the end of the input.
    #[error("the packet length header is incomplete")]
    IncompleteLength,

    /// Remaining length needs more than four bytes.
    #[error("failed to parse packet - remaining length is longer than four bytes")]
    MalformedLength,

    /// Body length differs from the declared remaining length.
    #[error(
        "failed to parse packet - input buffer ({actual}) is not the same as the body length header ({declared})"
    )]
    BodyLengthMismatch { actual: usize, declared: usize },

    /// Total length of an MQTT-SN packet differs from its length header.
    #[error("length of packet ({actual}) is not the same as the length header ({declared})")]
    LengthMismatch { actual: usize, declared: usize },

    /// Fixed header flags are not valid for the packet type.
    #[error("invalid flags in {0} packet header")]
    InvalidFlags(&'static str),

    /// QoS value outside the allowed range.
    #[error("invalid QoS value: {0}")]
    InvalidQoS(u8),

    /// DUP flag set on a QoS 0 PUBLISH.
    #[error("DUP cannot be set for QoS 0")]
    DupWithoutQoS,

    /// Reserved bits set in the CONNACK acknowledge flags.
    #[error("invalid flags in CONNACK variable header")]
    InvalidConnAckFlags,

    /// Trailing bytes after a fixed-layout body.
    #[error("extra bytes at end of {0} packet")]
    ExtraBytes(&'static str),

    /// Unknown protocol name and level in CONNECT.
    #[error("unsupported protocol: {name}/{level}")]
    UnsupportedProtocol { name: String, level: u8 },

    /// Unknown protocol id in an MQTT-SN CONNECT.
    #[error("unsupported protocol ID number: {0}")]
    UnsupportedProtocolId(u8),

    /// Unknown protocol version string.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(String),

    /// A field runs past the end of the body.
    #[error("incomplete packet: need {needed} more bytes")]
    Incomplete { needed: usize },

    /// A string field is not valid UTF-8.
    #[error("invalid utf-8 in string field")]
    InvalidUtf8,

    /// Declared packet size exceeds the configured limit.
    #[error("packet too large: {size} bytes exceeds limit of {max}")]
    PacketTooLarge { size: usize, max: usize },

    /// A required field is empty.
    #[error("no {0} specified")]
    MissingField(&'static str),

    /// Client identifier length outside the allowed range.
    #[error("invalid client identifier length: {len} (must be {min}-{max} bytes)")]
    ClientIdLength { len: usize, min: usize, max: usize },

    /// Length-prefixed field longer than 65535 bytes.
    #[error("field too long for a 16-bit length prefix: {0} bytes")]
    ValueTooLarge(usize),

    /// Body does not fit the length header.
    #[error("error serialising packet: body is more than {max} bytes ({size})")]
    BodyTooLarge { size: usize, max: usize },

    /// Topic id variant does not match the topic id type.
    #[error("topic_id must be {expected} for type {topic_id_type}")]
    TopicIdType {
        expected: &'static str,
        topic_id_type: &'static str,
    },
}
