//! Async packet I/O over tokio streams.
//!
//! Each call reads or writes exactly one packet. Reads pull the header a byte
//! at a time and then the declared body, so nothing past the packet is
//! consumed from the stream.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::codec::{INITIAL_BODY_CAPACITY, read_variable_int};
use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::{mqtt, sn};

// ============================================================================
// MQTT
// ============================================================================

/// Read a single MQTT packet from an async reader.
pub async fn read_packet<R: AsyncRead + Unpin>(
    reader: &mut R,
    config: &CodecConfig,
) -> Result<mqtt::Packet> {
    let (packet_type, flags) = mqtt::split_first_byte(read_byte(reader).await?)?;

    let mut length = [0u8; 4];
    let mut length_len = 0;
    while length_len < length.len() {
        let byte = read_byte(reader).await?;
        length[length_len] = byte;
        length_len += 1;
        if byte & 0x80 == 0 {
            break;
        }
    }
    let (declared, _) = read_variable_int(&length[..length_len])?;
    let declared = declared as usize;
    config.check_size(1 + length_len + declared)?;

    let body = read_body(reader, declared).await?;
    if body.len() != declared {
        debug!(
            packet_type = packet_type.name(),
            declared,
            actual = body.len(),
            "stream closed inside packet body"
        );
        return Err(Error::BodyLengthMismatch {
            actual: body.len(),
            declared,
        });
    }

    mqtt::Packet::parse_body(packet_type, flags, &body)
}

/// Write a single MQTT packet to an async writer.
pub async fn write_packet<W: AsyncWrite + Unpin>(
    writer: &mut W,
    packet: &mqtt::Packet,
) -> Result<()> {
    let mut buf = BytesMut::new();
    packet.encode(&mut buf)?;
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

// ============================================================================
// MQTT-SN
// ============================================================================

/// Read a single MQTT-SN packet from an async reader.
pub async fn read_sn_packet<R: AsyncRead + Unpin>(
    reader: &mut R,
    config: &CodecConfig,
) -> Result<sn::Packet> {
    let first = read_byte(reader).await?;
    let (declared, header_len) = if first == 0x01 {
        let hi = read_byte(reader).await?;
        let lo = read_byte(reader).await?;
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

    let packet_type = sn::PacketType::try_from(read_byte(reader).await?)?;

    let body_len = declared - header_len;
    let body = read_body(reader, body_len).await?;
    if body.len() != body_len {
        debug!(
            packet_type = packet_type.name(),
            declared,
            actual = header_len + body.len(),
            "stream closed inside packet body"
        );
        return Err(Error::LengthMismatch {
            actual: header_len + body.len(),
            declared,
        });
    }

    sn::Packet::parse_body(packet_type, &body)
}

/// Write a single MQTT-SN packet to an async writer.
pub async fn write_sn_packet<W: AsyncWrite + Unpin>(
    writer: &mut W,
    packet: &sn::Packet,
) -> Result<()> {
    let mut buf = BytesMut::new();
    packet.encode(&mut buf)?;
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

async fn read_byte<R: AsyncRead + Unpin>(reader: &mut R) -> Result<u8> {
    match reader.read_u8().await {
        Ok(byte) => Ok(byte),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(Error::UnexpectedEof),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Read up to `len` bytes; fewer means the stream ended.
async fn read_body<R: AsyncRead + Unpin>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(len.min(INITIAL_BODY_CAPACITY));
    (&mut *reader).take(len as u64).read_to_end(&mut body).await?;
    Ok(body)
}
