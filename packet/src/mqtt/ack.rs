//! Acknowledgements that carry only a packet identifier.

use std::fmt;

use bytes::BytesMut;

use crate::codec::{Reader, write_u16};
use crate::error::Result;

macro_rules! ack_packet {
    ($(#[$doc:meta])* $name:ident, $type_name:literal, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name {
            pub pkid: u16,
        }

        impl $name {
            pub fn new(pkid: u16) -> Self {
                Self { pkid }
            }

            pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
                let mut reader = Reader::new(buf);
                let pkid = reader.read_u16()?;
                reader.finish($type_name)?;
                Ok(Self { pkid })
            }

            pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
                write_u16(buf, self.pkid);
                Ok(())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, ": 0x{:02X}"), self.pkid)
            }
        }
    };
}

ack_packet!(
    /// PUBACK packet.
    PubAck, "PUBACK", "Puback"
);
ack_packet!(
    /// PUBREC packet.
    PubRec, "PUBREC", "Pubrec"
);
ack_packet!(
    /// PUBREL packet.
    PubRel, "PUBREL", "Pubrel"
);
ack_packet!(
    /// PUBCOMP packet.
    PubComp, "PUBCOMP", "Pubcomp"
);
ack_packet!(
    /// UNSUBACK packet.
    UnsubAck, "UNSUBACK", "Unsuback"
);
