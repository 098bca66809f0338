//! Encodings of the field types several PDUs share: names, PoAs and PoA
//! lists.

use super::{BuildError, ParseError, WireReader};
use crate::{
    address::Address,
    name::{Label, Name},
    pdus::{PduType, PoaList},
};
use bytes::BufMut;

/// The number of bytes in an encoded name with no labels.
pub(crate) const EMPTY_NAME_OCTETS: usize = 2;

/// The number of bytes `name` takes on the wire: a label count, then a length
/// and the bytes of each label.
pub(crate) fn name_size(name: &Name) -> usize {
    EMPTY_NAME_OCTETS + name.labels().map(|label| 2 + label.len()).sum::<usize>()
}

pub(crate) fn write_name(out: &mut Vec<u8>, name: &Name, pdu: PduType) -> Result<(), BuildError> {
    let count: u16 = name
        .len()
        .try_into()
        .map_err(|_| BuildError::OverlyLongName(pdu))?;
    out.put_u16(count);
    for label in name.labels() {
        let len: u16 = label
            .len()
            .try_into()
            .map_err(|_| BuildError::OverlyLongLabel(pdu))?;
        out.put_u16(len);
        out.put_slice(label.as_bytes());
    }
    Ok(())
}

pub(crate) fn read_name(reader: &mut WireReader, pdu: PduType) -> Result<Name, ParseError> {
    let tts = ParseError::TooShort(pdu);
    let count = reader.next_u16_be().ok_or(tts)?;
    let mut labels = Vec::with_capacity(count.min(64).into());
    for _ in 0..count {
        let len = reader.next_u16_be().ok_or(tts)?;
        let bytes = reader.next_bytes(len.into()).ok_or(tts)?;
        labels.push(Label::new(bytes));
    }
    Ok(Name::from_labels(labels))
}

/// How the PoAs of a list are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PoaForm {
    /// Six bytes of 48-bit MAC address. Other kinds cannot be sent.
    Fixed,
    /// A kind byte, a length byte, then the address bytes.
    General,
}

impl PoaForm {
    fn poa_size(self, poa: &Address) -> usize {
        match self {
            PoaForm::Fixed => Address::MAC48_SIZE,
            PoaForm::General => 2 + poa.len(),
        }
    }

    fn write_poa(self, out: &mut Vec<u8>, poa: &Address, pdu: PduType) -> Result<(), BuildError> {
        match self {
            PoaForm::Fixed => {
                let octets = poa.to_mac48().ok_or(BuildError::UnsupportedPoa(pdu))?;
                out.put_slice(&octets);
            }
            PoaForm::General => {
                out.put_u8(poa.kind());
                // Address lengths are bounded well below u8::MAX
                out.put_u8(poa.len() as u8);
                out.put_slice(poa.as_bytes());
            }
        }
        Ok(())
    }

    fn read_poa(self, reader: &mut WireReader, pdu: PduType) -> Result<Address, ParseError> {
        let tts = ParseError::TooShort(pdu);
        match self {
            PoaForm::Fixed => Ok(Address::mac48(reader.next_n().ok_or(tts)?)),
            PoaForm::General => {
                let kind = reader.next_u8().ok_or(tts)?;
                let len = reader.next_u8().ok_or(tts)?;
                let bytes = reader.next_bytes(len.into()).ok_or(tts)?;
                Address::new(kind, bytes.to_vec()).map_err(|_| ParseError::OverlyLongPoa(pdu))
            }
        }
    }
}

/// The number of bytes `list` takes on the wire: type and count, then each
/// PoA.
pub(crate) fn poa_list_size(list: &PoaList, form: PoaForm) -> usize {
    4 + list.iter().map(|poa| form.poa_size(poa)).sum::<usize>()
}

pub(crate) fn write_poa_list(
    out: &mut Vec<u8>,
    list: &PoaList,
    form: PoaForm,
    pdu: PduType,
) -> Result<(), BuildError> {
    let count: u16 = list
        .len()
        .try_into()
        .map_err(|_| BuildError::OverlyLongList(pdu))?;
    out.put_u16(list.poa_type());
    out.put_u16(count);
    for poa in list.iter() {
        form.write_poa(out, poa, pdu)?;
    }
    Ok(())
}

pub(crate) fn read_poa_list(
    reader: &mut WireReader,
    form: PoaForm,
    pdu: PduType,
) -> Result<PoaList, ParseError> {
    let tts = ParseError::TooShort(pdu);
    let poa_type = reader.next_u16_be().ok_or(tts)?;
    let count = reader.next_u16_be().ok_or(tts)?;
    let mut poas = Vec::with_capacity(count.min(64).into());
    for _ in 0..count {
        poas.push(form.read_poa(reader, pdu)?);
    }
    Ok(PoaList::from_parts(poa_type, poas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn name_layout() -> anyhow::Result<()> {
        let name: Name = "ae.3".parse()?;
        let mut out = vec![];
        write_name(&mut out, &name, PduType::Do)?;
        assert_eq!(out, [0, 2, 0, 2, b'a', b'e', 0, 1, b'3']);
        assert_eq!(name_size(&name), out.len());

        let mut reader = WireReader::new(Bytes::from(out));
        assert_eq!(read_name(&mut reader, PduType::Do)?, name);
        assert_eq!(reader.remaining(), 0);
        Ok(())
    }

    #[test]
    fn empty_name_is_just_a_count() -> anyhow::Result<()> {
        let mut out = vec![];
        write_name(&mut out, &Name::empty(), PduType::Do)?;
        assert_eq!(out, [0, 0]);
        assert_eq!(name_size(&Name::empty()), EMPTY_NAME_OCTETS);
        Ok(())
    }

    #[test]
    fn truncated_name() {
        let mut reader = WireReader::new(Bytes::from_static(&[0, 1, 0, 5, b'a']));
        assert_eq!(
            read_name(&mut reader, PduType::Inf),
            Err(ParseError::TooShort(PduType::Inf))
        );
    }

    #[test]
    fn fixed_form_only_sends_mac48() -> anyhow::Result<()> {
        let list = PoaList::from_parts(1, vec![Address::new(9, vec![1, 2])?]);
        let mut out = vec![];
        assert_eq!(
            write_poa_list(&mut out, &list, PoaForm::Fixed, PduType::En),
            Err(BuildError::UnsupportedPoa(PduType::En))
        );

        let mut out = vec![];
        write_poa_list(&mut out, &list, PoaForm::General, PduType::Aen)?;
        assert_eq!(out, [0, 1, 0, 1, 9, 2, 1, 2]);
        assert_eq!(poa_list_size(&list, PoaForm::General), out.len());

        let mut reader = WireReader::new(Bytes::from(out));
        assert_eq!(read_poa_list(&mut reader, PoaForm::General, PduType::Aen)?, list);
        Ok(())
    }

    #[test]
    fn fixed_form_layout() -> anyhow::Result<()> {
        let list = PoaList::from_parts(1, vec!["01:b2:03:04:05:06".parse()?]);
        let mut out = vec![];
        write_poa_list(&mut out, &list, PoaForm::Fixed, PduType::Ren)?;
        assert_eq!(out, [0, 1, 0, 1, 0x01, 0xb2, 3, 4, 5, 6]);
        assert_eq!(poa_list_size(&list, PoaForm::Fixed), out.len());
        Ok(())
    }
}
