//! Bit-exact packet codec for MQTT 3.1.0 / 3.1.1 and MQTT-SN 1.2.
//!
//! Packets are plain values. Each family has a closed [`mqtt::Packet`] or
//! [`sn::Packet`] enum that parses from a complete buffer, reads from a
//! blocking byte source, and encodes back to the same bytes.
//!
//! ## Components
//!
//! - [`mqtt`]: MQTT packets with the fixed header and variable-length remaining length
//! - [`sn`]: MQTT-SN packets with the 1- or 3-byte length header
//! - [`codec`]: Variable-length integers and big-endian field primitives
//! - [`CodecConfig`]: Read-side packet size limit
//! - `stream`: Async read/write over tokio streams (feature `tokio`)
//!
//! ## Example
//!
//! ```
//! use mqtt_packet::sn::{self, TopicId};
//!
//! let packet = sn::Packet::Publish(sn::Publish::new(TopicId::Id(1), "Hello World"));
//! let bytes = packet.to_bytes()?;
//! assert_eq!(&bytes[..], b"\x12\x0C\x00\x00\x01\x00\x00Hello World");
//!
//! assert_eq!(sn::Packet::parse(&bytes)?, packet);
//! # Ok::<(), mqtt_packet::Error>(())
//! ```

pub mod codec;
mod config;
mod error;
pub mod mqtt;
pub mod sn;
#[cfg(feature = "tokio")]
pub mod stream;

pub use config::{CodecConfig, MAX_PACKET_SIZE};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
