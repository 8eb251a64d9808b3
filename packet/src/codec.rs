//! Primitive field encoding and decoding.
//!
//! Both packet families build their bodies from the same primitives:
//! big-endian 16-bit integers, 16-bit length-prefixed strings and byte runs,
//! single-byte bit arrays and raw byte runs. MQTT additionally uses the
//! variable-length remaining-length integer.
//!
//! Decoding goes through [`Reader`], a cursor over an immutable slice.
//! Encoding appends to a [`BytesMut`].

use std::io::Read;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Largest value a four-byte remaining length can hold.
pub const MAX_REMAINING_LENGTH: u32 = 268_435_455;

/// Upper bound on the buffer reserved up front for a declared body.
pub(crate) const INITIAL_BODY_CAPACITY: usize = 8 * 1024;

// ============================================================================
// Remaining length
// ============================================================================

/// Read a variable-length integer (remaining length encoding).
///
/// Returns `(value, bytes_consumed)`.
pub fn read_variable_int(buf: &[u8]) -> Result<(u32, usize)> {
    let mut multiplier = 1u32;
    let mut value = 0u32;

    for (i, &byte) in buf.iter().enumerate() {
        value += (byte & 0x7F) as u32 * multiplier;

        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        if i == 3 {
            return Err(Error::MalformedLength);
        }

        multiplier *= 128;
    }

    Err(Error::IncompleteLength)
}

/// Read a variable-length integer one byte at a time from a reader.
pub fn read_variable_int_from<R: Read>(reader: &mut R) -> Result<u32> {
    let mut multiplier = 1u32;
    let mut value = 0u32;

    for i in 0..4 {
        let byte = read_byte(reader)?;
        value += (byte & 0x7F) as u32 * multiplier;

        if byte & 0x80 == 0 {
            return Ok(value);
        }
        if i == 3 {
            break;
        }
        multiplier *= 128;
    }

    Err(Error::MalformedLength)
}

/// Write a variable-length integer.
pub fn write_variable_int(buf: &mut BytesMut, mut value: u32) -> Result<()> {
    if value > MAX_REMAINING_LENGTH {
        return Err(Error::BodyTooLarge {
            size: value as usize,
            max: MAX_REMAINING_LENGTH as usize,
        });
    }

    loop {
        let mut byte = (value % 128) as u8;
        value /= 128;

        if value > 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);

        if value == 0 {
            return Ok(());
        }
    }
}

/// Calculate the number of bytes needed for a variable-length integer.
pub const fn variable_int_len(value: u32) -> usize {
    if value < 128 {
        1
    } else if value < 128 * 128 {
        2
    } else if value < 128 * 128 * 128 {
        3
    } else {
        4
    }
}

/// Read exactly one byte, mapping end of input to [`Error::UnexpectedEof`].
pub(crate) fn read_byte<R: Read>(reader: &mut R) -> Result<u8> {
    let mut byte = [0u8; 1];
    match reader.read_exact(&mut byte) {
        Ok(()) => Ok(byte[0]),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(Error::UnexpectedEof),
        Err(e) => Err(Error::Io(e)),
    }
}

// ============================================================================
// Bit arrays
// ============================================================================

/// Unpack a byte into eight flags, index 0 being the least significant bit.
pub fn byte_to_bits(byte: u8) -> [bool; 8] {
    let mut bits = [false; 8];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = byte & (1 << i) != 0;
    }
    bits
}

/// Pack flags into a byte, index 0 being the least significant bit.
pub fn bits_to_byte(bits: &[bool]) -> u8 {
    bits.iter()
        .take(8)
        .enumerate()
        .fold(0u8, |acc, (i, &set)| if set { acc | (1 << i) } else { acc })
}

// ============================================================================
// Reader
// ============================================================================

/// Cursor over a packet body.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::Incomplete {
                needed: n - self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a 2-byte big-endian u16.
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read one byte as eight flags.
    pub fn read_bits(&mut self) -> Result<[bool; 8]> {
        self.read_u8().map(byte_to_bits)
    }

    /// Read a UTF-8 string (2-byte length prefix + data).
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| Error::InvalidUtf8)
    }

    /// Read binary data (2-byte length prefix + data).
    pub fn read_binary(&mut self) -> Result<Bytes> {
        let len = self.read_u16()? as usize;
        self.read_bytes(len).map(Bytes::copy_from_slice)
    }

    /// Consume everything left as a UTF-8 string.
    pub fn read_rest_string(&mut self) -> Result<String> {
        std::str::from_utf8(self.rest())
            .map(str::to_string)
            .map_err(|_| Error::InvalidUtf8)
    }

    /// Consume everything left.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = &self.buf[self.pos..];
        self.pos = self.buf.len();
        rest
    }

    /// Fail if any bytes remain after a fixed-layout body.
    pub fn finish(&self, type_name: &'static str) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::ExtraBytes(type_name))
        }
    }
}

// ============================================================================
// Writers
// ============================================================================

/// Write a 2-byte big-endian u16.
pub fn write_u16(buf: &mut BytesMut, value: u16) {
    buf.put_u16(value);
}

/// Write binary data (2-byte length prefix + data).
pub fn write_binary(buf: &mut BytesMut, data: &[u8]) -> Result<()> {
    let len = u16::try_from(data.len()).map_err(|_| Error::ValueTooLarge(data.len()))?;
    buf.put_u16(len);
    buf.put_slice(data);
    Ok(())
}

/// Write a UTF-8 string (2-byte length prefix + data).
pub fn write_string(buf: &mut BytesMut, s: &str) -> Result<()> {
    write_binary(buf, s.as_bytes())
}
