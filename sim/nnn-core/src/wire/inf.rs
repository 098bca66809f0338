use super::{
    fields::{name_size, read_name, write_name, EMPTY_NAME_OCTETS},
    BuildError, Header, ParseError, WireFormat, WireReader,
};
use crate::pdus::{Inf, PduType};
use bytes::BufMut;
use std::time::Duration;

impl WireFormat for Inf {
    fn body_size(&self) -> usize {
        8 + self.old_name().map_or(EMPTY_NAME_OCTETS, name_size)
            + self.new_name().map_or(EMPTY_NAME_OCTETS, name_size)
    }

    fn write_body(&self, out: &mut Vec<u8>) -> Result<(), BuildError> {
        out.put_u64(self.remaining_lease().as_secs());
        write_name(out, self.old_name()?, PduType::Inf)?;
        write_name(out, self.new_name()?, PduType::Inf)
    }

    fn read_body(header: &Header, reader: &mut WireReader) -> Result<Self, ParseError> {
        const TS: ParseError = ParseError::TooShort(PduType::Inf);
        let remaining_lease = reader.next_u64_be().ok_or(TS)?;
        let old_name = read_name(reader, PduType::Inf)?;
        let new_name = read_name(reader, PduType::Inf)?;
        Ok(Inf::from_parts(
            header.common(),
            Duration::from_secs(remaining_lease),
            old_name,
            new_name,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdus::{NnnPdu, PduError};

    #[test]
    fn round_trip() -> anyhow::Result<()> {
        let mut pdu = Inf::new();
        pdu.set_old_name("a.b.c".parse()?);
        pdu.set_new_name("d.e".parse()?);
        pdu.set_remaining_lease(Duration::from_secs(1 << 40));
        let parsed = Inf::from_wire(pdu.to_wire()?)?;
        assert_eq!(parsed, pdu);
        assert_eq!(parsed.remaining_lease(), Duration::from_secs(1 << 40));
        assert!(parsed.wire().is_some());
        Ok(())
    }

    #[test]
    fn needs_both_names() -> anyhow::Result<()> {
        let mut pdu = Inf::new();
        pdu.set_old_name("a".parse()?);
        assert_eq!(
            pdu.to_wire(),
            Err(BuildError::MissingName(PduError::MissingName {
                pdu: PduType::Inf,
                field: "new"
            }))
        );
        Ok(())
    }
}
