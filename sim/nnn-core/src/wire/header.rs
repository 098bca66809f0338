use super::{BuildError, ParseError, WireReader};
use crate::pdus::{PduCommon, PduType, MAX_LIFETIME_SECS};
use bytes::BufMut;
use std::time::Duration;

/// The number of bytes in the header every PDU starts with.
pub const HEADER_OCTETS: usize = 10;

/// The header every PDU starts with, either one that was parsed or one we are
/// going to serialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Which PDU follows
    pub packet_type: PduType,
    /// The lifetime in seconds
    pub ttl: u16,
    pub version: u16,
    /// The number of bytes in the header and the PDU body. The payload is not
    /// counted.
    pub length: u16,
}

impl Header {
    /// Builds the header for a PDU of `serialized_size` bytes.
    pub(crate) fn for_pdu(
        packet_type: PduType,
        lifetime: Duration,
        version: u16,
        serialized_size: usize,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            packet_type,
            ttl: lifetime
                .as_secs()
                .try_into()
                .map_err(|_| BuildError::OverlyLongLifetime)?,
            version,
            length: serialized_size
                .try_into()
                .map_err(|_| BuildError::OverlyLongPdu(packet_type))?,
        })
    }

    /// Parses a header, checking that it announces a PDU of the `expected`
    /// type. A TTL past [`MAX_LIFETIME_SECS`] is rejected rather than clamped.
    pub fn from_reader(reader: &mut WireReader, expected: PduType) -> Result<Self, ParseError> {
        let tts = ParseError::TooShort(expected);

        let packet_id = reader.next_u32_be().ok_or(tts)?;
        if packet_id != expected.as_u32() {
            Err(ParseError::WrongPacketType {
                expected,
                found: packet_id,
            })?
        }
        let ttl = reader.next_u16_be().ok_or(tts)?;
        if u64::from(ttl) > MAX_LIFETIME_SECS {
            Err(ParseError::LifetimeOutOfRange(expected))?
        }
        let version = reader.next_u16_be().ok_or(tts)?;
        let length = reader.next_u16_be().ok_or(tts)?;

        Ok(Self {
            packet_type: expected,
            ttl,
            version,
            length,
        })
    }

    /// Reads the packet type a buffer starts with, without consuming it.
    pub fn peek_packet_type(reader: &WireReader) -> Result<PduType, ParseError> {
        let packet_id = reader.peek_u32_be().ok_or(ParseError::HeaderTooShort)?;
        PduType::try_from(packet_id).map_err(ParseError::UnknownPacketType)
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.put_u32(self.packet_type.as_u32());
        out.put_u16(self.ttl);
        out.put_u16(self.version);
        out.put_u16(self.length);
    }

    pub(crate) fn common(&self) -> PduCommon {
        PduCommon::from_header(Duration::from_secs(self.ttl.into()), self.version)
    }
}
