use super::{
    fields::{name_size, read_name, write_name},
    BuildError, Header, ParseError, WireFormat, WireReader,
};
use crate::{
    name::Name,
    pdus::{Mdo, PduType},
};
use bytes::{BufMut, Bytes};
use std::collections::BTreeMap;

fn count(n: usize) -> Result<u16, BuildError> {
    n.try_into()
        .map_err(|_| BuildError::OverlyLongList(PduType::Mdo))
}

impl WireFormat for Mdo {
    fn body_size(&self) -> usize {
        6 + self
            .sectors()
            .map(|(sector, addresses)| {
                2 + name_size(sector) + addresses.iter().map(name_size).sum::<usize>()
            })
            .sum::<usize>()
    }

    fn write_body(&self, out: &mut Vec<u8>) -> Result<(), BuildError> {
        out.put_u16(self.payload_type());
        out.put_u16(count(self.num_total_destinations())?);
        out.put_u16(count(self.num_distinct_destinations())?);
        for (sector, addresses) in self.sectors() {
            out.put_u16(count(addresses.len())?);
            write_name(out, sector, PduType::Mdo)?;
            for address in addresses {
                write_name(out, address, PduType::Mdo)?;
            }
        }
        Ok(())
    }

    fn read_body(header: &Header, reader: &mut WireReader) -> Result<Self, ParseError> {
        const TS: ParseError = ParseError::TooShort(PduType::Mdo);
        let payload_type = reader.next_u16_be().ok_or(TS)?;
        let total = reader.next_u16_be().ok_or(TS)?;
        let distinct = reader.next_u16_be().ok_or(TS)?;

        let mut sectors: BTreeMap<Name, Vec<Name>> = BTreeMap::new();
        let mut listed = 0usize;
        for _ in 0..distinct {
            let in_sector = reader.next_u16_be().ok_or(TS)?;
            let sector = read_name(reader, PduType::Mdo)?;
            let addresses = sectors.entry(sector).or_default();
            for _ in 0..in_sector {
                addresses.push(read_name(reader, PduType::Mdo)?);
            }
            listed += usize::from(in_sector);
        }
        if listed != usize::from(total) || sectors.len() != usize::from(distinct) {
            Err(ParseError::CountMismatch { pdu: PduType::Mdo })?
        }
        Ok(Mdo::from_parts(header.common(), payload_type, sectors))
    }

    fn payload(&self) -> Option<&Bytes> {
        Some(Mdo::payload(self))
    }

    fn attach_payload(&mut self, payload: Bytes) -> Result<(), ParseError> {
        self.set_payload(payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    #[test]
    fn layout() -> anyhow::Result<()> {
        let mut pdu = Mdo::new();
        pdu.add_destinations(&[name("s.a"), name("s.b")]);
        let wire = pdu.to_wire()?;
        assert_eq!(
            &wire[10..],
            &[
                0, 1, // payload type
                0, 2, // total
                0, 1, // distinct
                0, 2, 0, 1, 0, 1, b's', // sector with two addresses
                0, 1, 0, 1, b'a', // first address
                0, 1, 0, 1, b'b', // second address
            ]
        );
        Ok(())
    }

    #[test]
    fn repeated_sector_is_rejected() {
        let mut out = vec![];
        Header::for_pdu(PduType::Mdo, std::time::Duration::ZERO, 1, 40)
            .unwrap()
            .write(&mut out);
        out.extend_from_slice(&[0, 1, 0, 2, 0, 2]);
        // Sector "s" listed twice with one address each
        for address in [b'a', b'b'] {
            out.extend_from_slice(&[0, 1, 0, 1, 0, 1, b's', 0, 1, 0, 1, address]);
        }
        assert_eq!(
            Mdo::from_wire(Bytes::from(out)),
            Err(ParseError::CountMismatch { pdu: PduType::Mdo })
        );
    }

    #[test]
    fn counts_must_match_listing() {
        let mut out = vec![];
        Header::for_pdu(PduType::Mdo, std::time::Duration::ZERO, 1, 16)
            .unwrap()
            .write(&mut out);
        // Claims three destinations but lists none
        out.extend_from_slice(&[0, 1, 0, 3, 0, 0]);
        assert_eq!(
            Mdo::from_wire(Bytes::from(out)),
            Err(ParseError::CountMismatch { pdu: PduType::Mdo })
        );
    }
}
