//! The enrollment family: EN, AEN, OEN, REN and DEN.
//!
//! All of them carry a list of the points of attachment a node is reachable
//! at, and all of them manipulate it the same way through [`EnFamily`].

use super::{check_lifetime, fmt_common, required, NnnPdu, OptName, PduCommon, PduError, PduType};
use crate::{address::Address, config::PduDefaults, name::Name};
use std::{
    fmt::{self, Display, Formatter},
    time::Duration,
};

/// A typed list of points of attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoaList {
    poa_type: u16,
    poas: Vec<Address>,
}

impl PoaList {
    pub fn new(poa_type: u16) -> Self {
        Self {
            poa_type,
            poas: Vec::new(),
        }
    }

    pub(crate) fn from_parts(poa_type: u16, poas: Vec<Address>) -> Self {
        Self { poa_type, poas }
    }

    /// The kind of address the list advertises.
    pub fn poa_type(&self) -> u16 {
        self.poa_type
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.poas
    }

    pub fn len(&self) -> usize {
        self.poas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poas.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Address> {
        self.poas.iter()
    }
}

impl Default for PoaList {
    fn default() -> Self {
        Self::new(Address::MAC48_KIND as u16)
    }
}

impl Display for PoaList {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "poa_type={} poas=[", self.poa_type)?;
        for (i, poa) in self.poas.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", poa)?;
        }
        write!(f, "]")
    }
}

/// PoA list handling shared by the enrollment PDUs.
pub trait EnFamily: NnnPdu {
    #[doc(hidden)]
    fn poa_list(&self) -> &PoaList;

    #[doc(hidden)]
    fn poa_list_mut(&mut self) -> &mut PoaList;

    fn poa_type(&self) -> u16 {
        self.poa_list().poa_type
    }

    fn set_poa_type(&mut self, poa_type: u16) {
        self.poa_list_mut().poa_type = poa_type;
        self.common_mut().wire.clear();
    }

    /// The advertised PoAs, in the order they were added.
    fn poas(&self) -> &[Address] {
        &self.poa_list().poas
    }

    fn num_poas(&self) -> usize {
        self.poa_list().len()
    }

    /// Appends a PoA. Duplicates are kept.
    fn add_poa(&mut self, poa: Address) {
        self.poa_list_mut().poas.push(poa);
        self.common_mut().wire.clear();
    }

    /// Appends every PoA in `poas`, in order. Duplicates are kept.
    fn add_poas(&mut self, poas: impl IntoIterator<Item = Address>)
    where
        Self: Sized,
    {
        self.poa_list_mut().poas.extend(poas);
        self.common_mut().wire.clear();
    }
}

macro_rules! impl_en_family {
    ($pdu:ident, $tag:expr) => {
        impl NnnPdu for $pdu {
            const PACKET_TYPE: PduType = $tag;

            fn common(&self) -> &PduCommon {
                &self.common
            }

            fn common_mut(&mut self) -> &mut PduCommon {
                &mut self.common
            }
        }

        impl EnFamily for $pdu {
            fn poa_list(&self) -> &PoaList {
                &self.poas
            }

            fn poa_list_mut(&mut self) -> &mut PoaList {
                &mut self.poas
            }
        }

        impl Default for $pdu {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

/// A request to enroll into the network, sent by a node that has no name yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct En {
    common: PduCommon,
    poas: PoaList,
}

impl En {
    pub fn new() -> Self {
        Self::with_defaults(PduDefaults::default())
    }

    pub fn with_defaults(defaults: PduDefaults) -> Self {
        Self {
            common: PduCommon::new(defaults),
            poas: PoaList::default(),
        }
    }

    pub(crate) fn from_parts(common: PduCommon, poas: PoaList) -> Self {
        Self { common, poas }
    }
}

impl_en_family!(En, PduType::En);

impl Display for En {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_common(f, Self::PACKET_TYPE, &self.common)?;
        write!(f, " {}", self.poas)
    }
}

/// Grants an enrolling node its name for the length of a lease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aen {
    common: PduCommon,
    poas: PoaList,
    lease: Duration,
    name: Option<Name>,
}

impl Aen {
    pub fn new() -> Self {
        Self::with_defaults(PduDefaults::default())
    }

    pub fn with_defaults(defaults: PduDefaults) -> Self {
        Self {
            common: PduCommon::new(defaults),
            poas: PoaList::default(),
            lease: Duration::ZERO,
            name: None,
        }
    }

    pub(crate) fn from_parts(common: PduCommon, poas: PoaList, lease: Duration, name: Name) -> Self {
        Self {
            common,
            poas,
            lease,
            name: Some(name),
        }
    }

    /// How long the granted name stays valid. Sent in whole seconds.
    pub fn lease(&self) -> Duration {
        self.lease
    }

    pub fn set_lease(&mut self, lease: Duration) {
        self.lease = lease;
        self.common.wire.clear();
    }

    /// The granted name.
    pub fn name(&self) -> Result<&Name, PduError> {
        required(&self.name, PduType::Aen, "granted")
    }

    pub fn set_name(&mut self, name: Name) {
        self.name = Some(name);
        self.common.wire.clear();
    }
}

impl_en_family!(Aen, PduType::Aen);

impl Display for Aen {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_common(f, Self::PACKET_TYPE, &self.common)?;
        write!(
            f,
            " {} lease={} name={}",
            self.poas,
            self.lease.as_secs(),
            OptName(&self.name)
        )
    }
}

/// Tells the network that a name is being given up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Den {
    common: PduCommon,
    poas: PoaList,
    name: Option<Name>,
}

impl Den {
    pub fn new() -> Self {
        Self::with_defaults(PduDefaults::default())
    }

    pub fn with_defaults(defaults: PduDefaults) -> Self {
        Self {
            common: PduCommon::new(defaults),
            poas: PoaList::default(),
            name: None,
        }
    }

    pub(crate) fn from_parts(common: PduCommon, poas: PoaList, name: Name) -> Self {
        Self {
            common,
            poas,
            name: Some(name),
        }
    }

    /// The name being given up.
    pub fn name(&self) -> Result<&Name, PduError> {
        required(&self.name, PduType::Den, "departing")
    }

    pub fn set_name(&mut self, name: Name) {
        self.name = Some(name);
        self.common.wire.clear();
    }
}

impl_en_family!(Den, PduType::Den);

impl Display for Den {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_common(f, Self::PACKET_TYPE, &self.common)?;
        write!(f, " {} name={}", self.poas, OptName(&self.name))
    }
}

/// Offers a name to a node that is about to move into a new sector.
///
/// Besides the usual PoA list, an OEN carries the moving node's personal PoAs
/// and the name of the node that made the offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Oen {
    common: PduCommon,
    poas: PoaList,
    lease: Duration,
    name: Option<Name>,
    personal: PoaList,
    src_name: Option<Name>,
}

impl Oen {
    pub fn new() -> Self {
        Self::with_defaults(PduDefaults::default())
    }

    pub fn with_defaults(defaults: PduDefaults) -> Self {
        Self {
            common: PduCommon::new(defaults),
            poas: PoaList::default(),
            lease: Duration::ZERO,
            name: None,
            personal: PoaList::default(),
            src_name: None,
        }
    }

    pub(crate) fn from_parts(
        common: PduCommon,
        poas: PoaList,
        lease: Duration,
        name: Name,
        personal: PoaList,
        src_name: Name,
    ) -> Self {
        Self {
            common,
            poas,
            lease,
            name: Some(name),
            personal,
            src_name: Some(src_name),
        }
    }

    pub fn lease(&self) -> Duration {
        self.lease
    }

    pub fn set_lease(&mut self, lease: Duration) {
        self.lease = lease;
        self.common.wire.clear();
    }

    /// The offered name.
    pub fn name(&self) -> Result<&Name, PduError> {
        required(&self.name, PduType::Oen, "offered")
    }

    pub fn set_name(&mut self, name: Name) {
        self.name = Some(name);
        self.common.wire.clear();
    }

    /// The name of the node making the offer.
    pub fn src_name(&self) -> Result<&Name, PduError> {
        required(&self.src_name, PduType::Oen, "source")
    }

    pub fn set_src_name(&mut self, name: Name) {
        self.src_name = Some(name);
        self.common.wire.clear();
    }

    pub fn personal_poa_type(&self) -> u16 {
        self.personal.poa_type
    }

    pub fn set_personal_poa_type(&mut self, poa_type: u16) {
        self.personal.poa_type = poa_type;
        self.common.wire.clear();
    }

    pub fn personal_poas(&self) -> &[Address] {
        &self.personal.poas
    }

    pub fn add_personal_poa(&mut self, poa: Address) {
        self.personal.poas.push(poa);
        self.common.wire.clear();
    }

    pub fn add_personal_poas(&mut self, poas: impl IntoIterator<Item = Address>) {
        self.personal.poas.extend(poas);
        self.common.wire.clear();
    }

    pub(crate) fn personal_list(&self) -> &PoaList {
        &self.personal
    }
}

impl_en_family!(Oen, PduType::Oen);

impl Display for Oen {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_common(f, Self::PACKET_TYPE, &self.common)?;
        write!(
            f,
            " {} lease={} name={} personal {} src={}",
            self.poas,
            self.lease.as_secs(),
            OptName(&self.name),
            self.personal,
            OptName(&self.src_name)
        )
    }
}

/// Asks for a name to be renewed before its lease runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ren {
    common: PduCommon,
    poas: PoaList,
    remaining_lease: Duration,
    name: Option<Name>,
}

impl Ren {
    pub fn new() -> Self {
        Self::with_defaults(PduDefaults::default())
    }

    pub fn with_defaults(defaults: PduDefaults) -> Self {
        Self {
            common: PduCommon::new(defaults),
            poas: PoaList::default(),
            remaining_lease: Duration::ZERO,
            name: None,
        }
    }

    pub(crate) fn from_parts(
        common: PduCommon,
        poas: PoaList,
        remaining_lease: Duration,
        name: Name,
    ) -> Self {
        Self {
            common,
            poas,
            remaining_lease,
            name: Some(name),
        }
    }

    pub fn remaining_lease(&self) -> Duration {
        self.remaining_lease
    }

    /// Sets the time left on the lease.
    ///
    /// # Panics
    ///
    /// Panics if the lease does not fit in the 16-bit field, like
    /// [`NnnPdu::set_lifetime`].
    pub fn set_remaining_lease(&mut self, remaining_lease: Duration) {
        check_lifetime(remaining_lease);
        self.remaining_lease = remaining_lease;
        self.common.wire.clear();
    }

    /// The name to renew.
    pub fn name(&self) -> Result<&Name, PduError> {
        required(&self.name, PduType::Ren, "renewed")
    }

    pub fn set_name(&mut self, name: Name) {
        self.name = Some(name);
        self.common.wire.clear();
    }
}

impl_en_family!(Ren, PduType::Ren);

impl Display for Ren {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_common(f, Self::PACKET_TYPE, &self.common)?;
        write!(
            f,
            " {} remaining_lease={} name={}",
            self.poas,
            self.remaining_lease.as_secs(),
            OptName(&self.name)
        )
    }
}
