//! Codec configuration.

use crate::codec::MAX_REMAINING_LENGTH;

/// Largest packet the MQTT fixed header can describe: one type byte, four
/// length bytes and a full body.
pub const MAX_PACKET_SIZE: usize = 1 + 4 + MAX_REMAINING_LENGTH as usize;

/// Limits applied when reading packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Largest total packet size (header + body) accepted on read.
    ///
    /// A packet whose length header declares more than this is rejected
    /// before any body byte is read.
    pub max_packet_size: usize,
}

impl CodecConfig {
    /// Create a config with the protocol maximum packet size.
    pub fn new() -> Self {
        Self {
            max_packet_size: MAX_PACKET_SIZE,
        }
    }

    /// Set the maximum packet size.
    pub fn with_max_packet_size(mut self, size: usize) -> Self {
        self.max_packet_size = size;
        self
    }

    /// Check a declared packet size against the limit.
    pub(crate) fn check_size(&self, size: usize) -> crate::Result<()> {
        if size > self.max_packet_size {
            tracing::debug!(size, max = self.max_packet_size, "packet exceeds size limit");
            return Err(crate::Error::PacketTooLarge {
                size,
                max: self.max_packet_size,
            });
        }
        Ok(())
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_protocol_maximum() {
        let config = CodecConfig::default();
        assert_eq!(config.max_packet_size, 268_435_460);
        assert!(config.check_size(MAX_PACKET_SIZE).is_ok());
    }

    #[test]
    fn test_with_max_packet_size() {
        let config = CodecConfig::new().with_max_packet_size(64);
        assert!(config.check_size(64).is_ok());
        assert!(matches!(
            config.check_size(65),
            Err(crate::Error::PacketTooLarge { size: 65, max: 64 })
        ));
    }
}
