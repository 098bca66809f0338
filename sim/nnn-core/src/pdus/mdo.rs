use super::{fmt_common, payload_type, NnnPdu, PduCommon, PduType};
use crate::{config::PduDefaults, name::Name};
use bytes::Bytes;
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
};

/// Data sent to several destinations at once.
///
/// Destinations are grouped by the sector they live in, so a copy of the PDU
/// only has to travel once towards each sector. The counts sent on the wire
/// are derived from the grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mdo {
    common: PduCommon,
    payload_type: u16,
    /// Sector name to the last labels of the destinations in it.
    sectors: BTreeMap<Name, Vec<Name>>,
    payload: Bytes,
}

impl Mdo {
    pub fn new() -> Self {
        Self::with_defaults(PduDefaults::default())
    }

    pub fn with_defaults(defaults: PduDefaults) -> Self {
        Self {
            common: PduCommon::new(defaults),
            payload_type: payload_type::DATA,
            sectors: BTreeMap::new(),
            payload: Bytes::new(),
        }
    }

    pub(crate) fn from_parts(
        common: PduCommon,
        payload_type: u16,
        sectors: BTreeMap<Name, Vec<Name>>,
    ) -> Self {
        Self {
            common,
            payload_type,
            sectors,
            payload: Bytes::new(),
        }
    }

    /// Adds `destination` under its sector. Adding the same destination twice
    /// sends it two copies.
    pub fn add_destination(&mut self, destination: &Name) {
        self.sectors
            .entry(destination.sector_name())
            .or_default()
            .push(destination.last_label());
        self.common.wire.clear();
    }

    /// Adds every destination in `destinations`.
    pub fn add_destinations<'a>(&mut self, destinations: impl IntoIterator<Item = &'a Name>) {
        for destination in destinations {
            self.add_destination(destination);
        }
    }

    /// The sectors in name order, each with the last labels of its
    /// destinations in the order they were added.
    pub fn sectors(&self) -> impl ExactSizeIterator<Item = (&Name, &[Name])> + '_ {
        self.sectors
            .iter()
            .map(|(sector, addresses)| (sector, addresses.as_slice()))
    }

    /// The full name of every destination.
    pub fn destinations(&self) -> impl Iterator<Item = Name> + '_ {
        self.sectors.iter().flat_map(|(sector, addresses)| {
            addresses.iter().map(move |address| sector.concat(address))
        })
    }

    pub fn num_total_destinations(&self) -> usize {
        self.sectors.values().map(Vec::len).sum()
    }

    pub fn num_distinct_destinations(&self) -> usize {
        self.sectors.len()
    }

    pub fn payload_type(&self) -> u16 {
        self.payload_type
    }

    pub fn set_payload_type(&mut self, payload_type: u16) {
        self.payload_type = payload_type;
        self.common.wire.clear();
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: Bytes) {
        self.payload = payload;
        self.common.wire.clear();
    }
}

impl Default for Mdo {
    fn default() -> Self {
        Self::new()
    }
}

impl NnnPdu for Mdo {
    const PACKET_TYPE: PduType = PduType::Mdo;

    fn common(&self) -> &PduCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PduCommon {
        &mut self.common
    }
}

impl Display for Mdo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_common(f, Self::PACKET_TYPE, &self.common)?;
        write!(
            f,
            " payload_type={} total={} distinct={} sectors=[",
            self.payload_type,
            self.num_total_destinations(),
            self.num_distinct_destinations()
        )?;
        for (i, (sector, addresses)) in self.sectors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {{", sector)?;
            for (j, address) in addresses.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", address)?;
            }
            write!(f, "}}")?;
        }
        write!(f, "] payload={}B", self.payload.len())
    }
}
