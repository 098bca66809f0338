//! Byte-exact encodings of the NNN PDUs.
//!
//! Every PDU is a 10 byte [`Header`] followed by a type-specific body and,
//! for the data PDUs, the payload. All integers are big endian. The header's
//! length field counts the header and the body but not the payload, which
//! simply runs to the end of the buffer.
//!
//! [`WireFormat`] is implemented for each PDU type. Code that does not know
//! what it is holding uses [`Pdu::to_wire`] and [`Pdu::from_wire`] instead.

use crate::{
    logging::{pdu_event, Direction},
    pdus::{for_each_pdu, NnnPdu, Pdu, PduError, PduType},
};
use bytes::Bytes;
use thiserror::Error as ThisError;

mod buffer;
pub use buffer::WireReader;

mod header;
pub use header::{Header, HEADER_OCTETS};

mod fields;

mod data;
mod en;
mod inf;
mod mdo;

/// Conversion of a PDU to and from its wire encoding.
///
/// Implementors describe their body. The provided methods add the header,
/// the payload, the self-checks every decoded PDU goes through, and the wire
/// cache.
pub trait WireFormat: NnnPdu + Sized {
    /// The number of bytes in the body, after the header.
    fn body_size(&self) -> usize;

    /// Appends the body to `out`.
    fn write_body(&self, out: &mut Vec<u8>) -> Result<(), BuildError>;

    /// Parses a body that follows `header`.
    fn read_body(header: &Header, reader: &mut WireReader) -> Result<Self, ParseError>;

    /// The payload sent after the body, for PDUs that carry one.
    fn payload(&self) -> Option<&Bytes> {
        None
    }

    /// Takes bytes found after the body as the payload. PDUs that carry no
    /// payload reject them.
    fn attach_payload(&mut self, payload: Bytes) -> Result<(), ParseError> {
        Err(ParseError::TrailingBytes {
            pdu: Self::PACKET_TYPE,
            count: payload.len(),
        })
    }

    /// The number of bytes in the header and the body.
    fn serialized_size(&self) -> usize {
        HEADER_OCTETS + self.body_size()
    }

    /// Appends the header and the body to `out`. On error `out` is left as
    /// it was.
    fn serialize(&self, out: &mut Vec<u8>) -> Result<(), BuildError> {
        let header = Header::for_pdu(
            Self::PACKET_TYPE,
            self.lifetime(),
            self.version(),
            self.serialized_size(),
        )?;
        let start = out.len();
        header.write(out);
        self.write_body(out).map_err(|e| {
            out.truncate(start);
            e
        })
    }

    /// Parses a header and a body, returning the PDU and the number of bytes
    /// read. Whatever follows the body is left in `reader`.
    fn deserialize(reader: &mut WireReader) -> Result<(Self, usize), ParseError> {
        let start = reader.position();
        let header = Header::from_reader(reader, Self::PACKET_TYPE)?;
        let pdu = Self::read_body(&header, reader)?;
        let consumed = reader.position() - start;

        if header.length as usize != consumed {
            Err(ParseError::LengthMismatch {
                pdu: Self::PACKET_TYPE,
                declared: header.length,
                consumed,
            })?
        }
        if pdu.serialized_size() != consumed {
            Err(ParseError::SizeMismatch {
                pdu: Self::PACKET_TYPE,
                computed: pdu.serialized_size(),
                consumed,
            })?
        }
        Ok((pdu, consumed))
    }

    /// The complete encoding including any payload.
    ///
    /// The result is cached, so calling this again before changing the PDU
    /// returns the same buffer.
    fn to_wire(&self) -> Result<Bytes, BuildError> {
        if let Some(wire) = self.wire() {
            pdu_event(Direction::Encoded, Self::PACKET_TYPE, wire.len(), true);
            return Ok(wire);
        }
        let payload = self.payload();
        let mut out =
            Vec::with_capacity(self.serialized_size() + payload.map_or(0, |payload| payload.len()));
        self.serialize(&mut out)?;
        if let Some(payload) = payload {
            out.extend_from_slice(payload);
        }
        let wire = Bytes::from(out);
        self.common().wire.fill(wire.clone());
        pdu_event(Direction::Encoded, Self::PACKET_TYPE, wire.len(), false);
        Ok(wire)
    }

    /// Parses a complete encoding. Bytes after the body become the payload,
    /// and `wire` is kept as the PDU's cached encoding.
    fn from_wire(wire: Bytes) -> Result<Self, ParseError> {
        let mut reader = WireReader::new(wire.clone());
        let (mut pdu, _) = Self::deserialize(&mut reader)?;
        if reader.remaining() > 0 {
            pdu.attach_payload(reader.into_rest())?;
        }
        pdu_event(Direction::Decoded, Self::PACKET_TYPE, wire.len(), false);
        pdu.set_wire(wire);
        Ok(pdu)
    }
}

impl Pdu {
    /// See [`WireFormat::serialized_size`].
    pub fn serialized_size(&self) -> usize {
        for_each_pdu!(self, pdu => pdu.serialized_size())
    }

    /// See [`WireFormat::to_wire`].
    pub fn to_wire(&self) -> Result<Bytes, BuildError> {
        for_each_pdu!(self, pdu => pdu.to_wire())
    }

    /// Parses whichever PDU `wire` holds, based on its packet type.
    pub fn from_wire(wire: Bytes) -> Result<Self, ParseError> {
        let len = wire.len();
        let result = Self::dispatch(wire);
        if let Err(e) = &result {
            tracing::error!("Dropping malformed PDU of {} bytes: {}", len, e);
        }
        result
    }

    fn dispatch(wire: Bytes) -> Result<Self, ParseError> {
        let packet_type = Header::peek_packet_type(&WireReader::new(wire.clone()))?;
        Ok(match packet_type {
            PduType::Do => Pdu::Do(WireFormat::from_wire(wire)?),
            PduType::So => Pdu::So(WireFormat::from_wire(wire)?),
            PduType::Du => Pdu::Du(WireFormat::from_wire(wire)?),
            PduType::Nullp => Pdu::Nullp(WireFormat::from_wire(wire)?),
            PduType::Mdo => Pdu::Mdo(WireFormat::from_wire(wire)?),
            PduType::En => Pdu::En(WireFormat::from_wire(wire)?),
            PduType::Aen => Pdu::Aen(WireFormat::from_wire(wire)?),
            PduType::Oen => Pdu::Oen(WireFormat::from_wire(wire)?),
            PduType::Ren => Pdu::Ren(WireFormat::from_wire(wire)?),
            PduType::Den => Pdu::Den(WireFormat::from_wire(wire)?),
            PduType::Inf => Pdu::Inf(WireFormat::from_wire(wire)?),
        })
    }
}

#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("Too few bytes to constitute a PDU header")]
    HeaderTooShort,
    #[error("Too few bytes to constitute a {0} PDU")]
    TooShort(PduType),
    #[error("Expected a {expected} PDU but found packet type {found}")]
    WrongPacketType { expected: PduType, found: u32 },
    #[error("Unknown packet type {0}")]
    UnknownPacketType(u32),
    #[error("The {pdu} header declares {declared} bytes but {consumed} were read")]
    LengthMismatch {
        pdu: PduType,
        declared: u16,
        consumed: usize,
    },
    #[error("The parsed {pdu} PDU would encode to {computed} bytes but {consumed} were read")]
    SizeMismatch {
        pdu: PduType,
        computed: usize,
        consumed: usize,
    },
    #[error("The {pdu} destination counts disagree with the destinations listed")]
    CountMismatch { pdu: PduType },
    #[error("{count} bytes follow a {pdu} PDU, which carries no payload")]
    TrailingBytes { pdu: PduType, count: usize },
    #[error("A PoA in the {0} PDU is longer than any address kind allows")]
    OverlyLongPoa(PduType),
    #[error("The {0} PDU carries a lifetime or lease of 65535 seconds or more")]
    LifetimeOutOfRange(PduType),
}

#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    MissingName(#[from] PduError),
    #[error("The {0} PDU only carries 48-bit MAC PoAs")]
    UnsupportedPoa(PduType),
    #[error("A name in the {0} PDU has too many labels")]
    OverlyLongName(PduType),
    #[error("A label in the {0} PDU is too long")]
    OverlyLongLabel(PduType),
    #[error("A list in the {0} PDU has too many entries")]
    OverlyLongList(PduType),
    #[error("The {0} PDU is longer than its length field can describe")]
    OverlyLongPdu(PduType),
    #[error("The lifetime does not fit in the TTL field")]
    OverlyLongLifetime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdus::{Do, EnFamily, Nullp};
    use std::time::Duration;
    use tracing_test::traced_test;

    #[test]
    fn payload_follows_the_body() -> anyhow::Result<()> {
        let mut pdu = Nullp::new();
        pdu.set_payload(Bytes::from_static(b"hi"));
        let wire = pdu.to_wire()?;
        assert_eq!(&wire[..], &[0, 0, 0, 0, 0, 2, 0, 1, 0, 12, 0, 1, b'h', b'i']);
        assert_eq!(pdu.serialized_size(), 12);

        let parsed = Nullp::from_wire(wire.clone())?;
        assert_eq!(parsed, pdu);
        assert_eq!(parsed.wire(), Some(wire));
        Ok(())
    }

    #[test]
    fn to_wire_is_cached_until_a_setter_runs() -> anyhow::Result<()> {
        let mut pdu = Do::new();
        pdu.set_name("a.b".parse()?);
        let first = pdu.to_wire()?;
        let second = pdu.to_wire()?;
        assert_eq!(first.as_ptr(), second.as_ptr());

        pdu.set_lifetime(Duration::from_secs(30));
        let third = pdu.to_wire()?;
        assert_ne!(first, third);
        Ok(())
    }

    #[test]
    fn missing_name_fails_to_build() {
        assert_eq!(
            Do::new().to_wire(),
            Err(BuildError::MissingName(PduError::MissingName {
                pdu: PduType::Do,
                field: "destination"
            }))
        );
    }

    #[test]
    fn payloadless_pdus_reject_trailing_bytes() -> anyhow::Result<()> {
        let mut en = crate::pdus::En::new();
        en.add_poa("01:02:03:04:05:06".parse()?);
        let mut wire = en.to_wire()?.to_vec();
        wire.push(0xff);
        assert_eq!(
            crate::pdus::En::from_wire(Bytes::from(wire)),
            Err(ParseError::TrailingBytes {
                pdu: PduType::En,
                count: 1
            })
        );
        Ok(())
    }

    #[test]
    fn length_field_is_checked() -> anyhow::Result<()> {
        let mut pdu = Do::new();
        pdu.set_name("a".parse()?);
        let mut wire = pdu.to_wire()?.to_vec();
        wire[9] += 1;
        assert_eq!(
            Do::from_wire(Bytes::from(wire)),
            Err(ParseError::LengthMismatch {
                pdu: PduType::Do,
                declared: 18,
                consumed: 17
            })
        );
        Ok(())
    }

    #[test]
    #[traced_test]
    fn malformed_input_is_logged() {
        let result = Pdu::from_wire(Bytes::from_static(&[0, 0, 0, 42, 0, 0, 0, 0, 0, 10]));
        assert_eq!(result, Err(ParseError::UnknownPacketType(42)));
        assert!(logs_contain("Dropping malformed PDU of 10 bytes"));
    }
}
