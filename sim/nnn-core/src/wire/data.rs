use super::{
    fields::{name_size, read_name, write_name, EMPTY_NAME_OCTETS},
    BuildError, Header, ParseError, WireFormat, WireReader,
};
use crate::pdus::{Do, Du, Nullp, PduType, So};
use bytes::{BufMut, Bytes};

impl WireFormat for Do {
    fn body_size(&self) -> usize {
        2 + self.name().map_or(EMPTY_NAME_OCTETS, name_size)
    }

    fn write_body(&self, out: &mut Vec<u8>) -> Result<(), BuildError> {
        out.put_u16(self.payload_type());
        write_name(out, self.name()?, PduType::Do)
    }

    fn read_body(header: &Header, reader: &mut WireReader) -> Result<Self, ParseError> {
        const TS: ParseError = ParseError::TooShort(PduType::Do);
        let payload_type = reader.next_u16_be().ok_or(TS)?;
        let name = read_name(reader, PduType::Do)?;
        Ok(Do::from_parts(header.common(), payload_type, name))
    }

    fn payload(&self) -> Option<&Bytes> {
        Some(Do::payload(self))
    }

    fn attach_payload(&mut self, payload: Bytes) -> Result<(), ParseError> {
        self.set_payload(payload);
        Ok(())
    }
}

impl WireFormat for So {
    fn body_size(&self) -> usize {
        2 + self.name().map_or(EMPTY_NAME_OCTETS, name_size)
    }

    fn write_body(&self, out: &mut Vec<u8>) -> Result<(), BuildError> {
        out.put_u16(self.payload_type());
        write_name(out, self.name()?, PduType::So)
    }

    fn read_body(header: &Header, reader: &mut WireReader) -> Result<Self, ParseError> {
        const TS: ParseError = ParseError::TooShort(PduType::So);
        let payload_type = reader.next_u16_be().ok_or(TS)?;
        let name = read_name(reader, PduType::So)?;
        Ok(So::from_parts(header.common(), payload_type, name))
    }

    fn payload(&self) -> Option<&Bytes> {
        Some(So::payload(self))
    }

    fn attach_payload(&mut self, payload: Bytes) -> Result<(), ParseError> {
        self.set_payload(payload);
        Ok(())
    }
}

impl WireFormat for Du {
    fn body_size(&self) -> usize {
        2 + self.src_name().map_or(EMPTY_NAME_OCTETS, name_size)
            + self.dst_name().map_or(EMPTY_NAME_OCTETS, name_size)
    }

    fn write_body(&self, out: &mut Vec<u8>) -> Result<(), BuildError> {
        out.put_u16(self.payload_type());
        write_name(out, self.src_name()?, PduType::Du)?;
        write_name(out, self.dst_name()?, PduType::Du)
    }

    fn read_body(header: &Header, reader: &mut WireReader) -> Result<Self, ParseError> {
        const TS: ParseError = ParseError::TooShort(PduType::Du);
        let payload_type = reader.next_u16_be().ok_or(TS)?;
        let src_name = read_name(reader, PduType::Du)?;
        let dst_name = read_name(reader, PduType::Du)?;
        Ok(Du::from_parts(header.common(), payload_type, src_name, dst_name))
    }

    fn payload(&self) -> Option<&Bytes> {
        Some(Du::payload(self))
    }

    fn attach_payload(&mut self, payload: Bytes) -> Result<(), ParseError> {
        self.set_payload(payload);
        Ok(())
    }
}

impl WireFormat for Nullp {
    fn body_size(&self) -> usize {
        2
    }

    fn write_body(&self, out: &mut Vec<u8>) -> Result<(), BuildError> {
        out.put_u16(self.payload_type());
        Ok(())
    }

    fn read_body(header: &Header, reader: &mut WireReader) -> Result<Self, ParseError> {
        const TS: ParseError = ParseError::TooShort(PduType::Nullp);
        let payload_type = reader.next_u16_be().ok_or(TS)?;
        Ok(Nullp::from_parts(header.common(), payload_type))
    }

    fn payload(&self) -> Option<&Bytes> {
        Some(Nullp::payload(self))
    }

    fn attach_payload(&mut self, payload: Bytes) -> Result<(), ParseError> {
        self.set_payload(payload);
        Ok(())
    }
}
