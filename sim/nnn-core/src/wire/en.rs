//! Codecs for the enrollment family.
//!
//! EN, REN and OEN send their PoAs in the fixed six byte form, while AEN and
//! DEN use the general form.

use super::{
    fields::{
        name_size, poa_list_size, read_name, read_poa_list, write_name, write_poa_list, PoaForm,
        EMPTY_NAME_OCTETS,
    },
    BuildError, Header, ParseError, WireFormat, WireReader,
};
use crate::pdus::{Aen, Den, En, EnFamily, Oen, PduType, Ren, MAX_LIFETIME_SECS};
use bytes::BufMut;
use std::time::Duration;

impl WireFormat for En {
    fn body_size(&self) -> usize {
        poa_list_size(self.poa_list(), PoaForm::Fixed)
    }

    fn write_body(&self, out: &mut Vec<u8>) -> Result<(), BuildError> {
        write_poa_list(out, self.poa_list(), PoaForm::Fixed, PduType::En)
    }

    fn read_body(header: &Header, reader: &mut WireReader) -> Result<Self, ParseError> {
        let poas = read_poa_list(reader, PoaForm::Fixed, PduType::En)?;
        Ok(En::from_parts(header.common(), poas))
    }
}

impl WireFormat for Aen {
    fn body_size(&self) -> usize {
        poa_list_size(self.poa_list(), PoaForm::General)
            + 8
            + self.name().map_or(EMPTY_NAME_OCTETS, name_size)
    }

    fn write_body(&self, out: &mut Vec<u8>) -> Result<(), BuildError> {
        write_poa_list(out, self.poa_list(), PoaForm::General, PduType::Aen)?;
        out.put_u64(self.lease().as_secs());
        write_name(out, self.name()?, PduType::Aen)
    }

    fn read_body(header: &Header, reader: &mut WireReader) -> Result<Self, ParseError> {
        const TS: ParseError = ParseError::TooShort(PduType::Aen);
        let poas = read_poa_list(reader, PoaForm::General, PduType::Aen)?;
        let lease = reader.next_u64_be().ok_or(TS)?;
        let name = read_name(reader, PduType::Aen)?;
        Ok(Aen::from_parts(
            header.common(),
            poas,
            Duration::from_secs(lease),
            name,
        ))
    }
}

impl WireFormat for Den {
    fn body_size(&self) -> usize {
        poa_list_size(self.poa_list(), PoaForm::General)
            + self.name().map_or(EMPTY_NAME_OCTETS, name_size)
    }

    fn write_body(&self, out: &mut Vec<u8>) -> Result<(), BuildError> {
        write_poa_list(out, self.poa_list(), PoaForm::General, PduType::Den)?;
        write_name(out, self.name()?, PduType::Den)
    }

    fn read_body(header: &Header, reader: &mut WireReader) -> Result<Self, ParseError> {
        let poas = read_poa_list(reader, PoaForm::General, PduType::Den)?;
        let name = read_name(reader, PduType::Den)?;
        Ok(Den::from_parts(header.common(), poas, name))
    }
}

impl WireFormat for Oen {
    fn body_size(&self) -> usize {
        poa_list_size(self.poa_list(), PoaForm::Fixed)
            + 8
            + self.name().map_or(EMPTY_NAME_OCTETS, name_size)
            + poa_list_size(self.personal_list(), PoaForm::Fixed)
            + self.src_name().map_or(EMPTY_NAME_OCTETS, name_size)
    }

    fn write_body(&self, out: &mut Vec<u8>) -> Result<(), BuildError> {
        write_poa_list(out, self.poa_list(), PoaForm::Fixed, PduType::Oen)?;
        out.put_u64(self.lease().as_secs());
        write_name(out, self.name()?, PduType::Oen)?;
        write_poa_list(out, self.personal_list(), PoaForm::Fixed, PduType::Oen)?;
        write_name(out, self.src_name()?, PduType::Oen)
    }

    fn read_body(header: &Header, reader: &mut WireReader) -> Result<Self, ParseError> {
        const TS: ParseError = ParseError::TooShort(PduType::Oen);
        let poas = read_poa_list(reader, PoaForm::Fixed, PduType::Oen)?;
        let lease = reader.next_u64_be().ok_or(TS)?;
        let name = read_name(reader, PduType::Oen)?;
        let personal = read_poa_list(reader, PoaForm::Fixed, PduType::Oen)?;
        let src_name = read_name(reader, PduType::Oen)?;
        Ok(Oen::from_parts(
            header.common(),
            poas,
            Duration::from_secs(lease),
            name,
            personal,
            src_name,
        ))
    }
}

impl WireFormat for Ren {
    fn body_size(&self) -> usize {
        poa_list_size(self.poa_list(), PoaForm::Fixed)
            + 2
            + self.name().map_or(EMPTY_NAME_OCTETS, name_size)
    }

    fn write_body(&self, out: &mut Vec<u8>) -> Result<(), BuildError> {
        write_poa_list(out, self.poa_list(), PoaForm::Fixed, PduType::Ren)?;
        // The setter keeps the lease within 16 bits
        out.put_u16(self.remaining_lease().as_secs() as u16);
        write_name(out, self.name()?, PduType::Ren)
    }

    fn read_body(header: &Header, reader: &mut WireReader) -> Result<Self, ParseError> {
        const TS: ParseError = ParseError::TooShort(PduType::Ren);
        let poas = read_poa_list(reader, PoaForm::Fixed, PduType::Ren)?;
        let remaining_lease = reader.next_u16_be().ok_or(TS)?;
        if u64::from(remaining_lease) > MAX_LIFETIME_SECS {
            Err(ParseError::LifetimeOutOfRange(PduType::Ren))?
        }
        let name = read_name(reader, PduType::Ren)?;
        Ok(Ren::from_parts(
            header.common(),
            poas,
            Duration::from_secs(remaining_lease.into()),
            name,
        ))
    }
}
