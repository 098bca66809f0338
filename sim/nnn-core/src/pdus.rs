//! The NNN protocol data units.
//!
//! Every PDU type is its own struct implementing [`NnnPdu`], which carries the
//! fields all PDUs share: lifetime, protocol version, and a cache of the PDU's
//! last wire encoding. [`Pdu`] is the sum over all of them, for code that
//! handles whatever arrives on a face.
//!
//! | PDU     | carries |
//! |---------|---------|
//! | [`Do`]  | data routed to a destination name |
//! | [`So`]  | data stamped with its source name |
//! | [`Du`]  | data with both source and destination names |
//! | [`Nullp`] | data without NNN addressing |
//! | [`Mdo`] | data routed to many destinations, grouped by sector |
//! | [`En`]  | a request to enroll into the network |
//! | [`Aen`] | an acknowledgement granting an enrolled name |
//! | [`Oen`] | an offer of a name to a node that is moving |
//! | [`Ren`] | a request to renew a name |
//! | [`Den`] | notice that a name is being given up |
//! | [`Inf`] | notice that a node moved from one name to another |

use bytes::Bytes;
use std::{
    fmt::{self, Display, Formatter},
    sync::OnceLock,
    time::Duration,
};
use thiserror::Error as ThisError;

use crate::{config::PduDefaults, name::Name};

mod data;
pub use data::{Do, Du, Nullp, So};

mod en;
pub use en::{Aen, Den, En, EnFamily, Oen, PoaList, Ren};

mod mdo;
pub use mdo::Mdo;

mod inf;
pub use inf::Inf;

/// The packet-type tag each PDU carries at the front of its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum PduType {
    Nullp = 0,
    So = 1,
    Do = 2,
    En = 3,
    Aen = 4,
    Ren = 5,
    Den = 6,
    Inf = 7,
    Oen = 8,
    Du = 10,
    Mdo = 11,
}

impl PduType {
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for PduType {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Nullp,
            1 => Self::So,
            2 => Self::Do,
            3 => Self::En,
            4 => Self::Aen,
            5 => Self::Ren,
            6 => Self::Den,
            7 => Self::Inf,
            8 => Self::Oen,
            10 => Self::Du,
            11 => Self::Mdo,
            other => return Err(other),
        })
    }
}

impl Display for PduType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Nullp => "NULLp",
            Self::So => "SO",
            Self::Do => "DO",
            Self::En => "EN",
            Self::Aen => "AEN",
            Self::Ren => "REN",
            Self::Den => "DEN",
            Self::Inf => "INF",
            Self::Oen => "OEN",
            Self::Du => "DU",
            Self::Mdo => "MDO",
        };
        write!(f, "{}", tag)
    }
}

/// Well-known values of the payload type field carried by data PDUs.
pub mod payload_type {
    /// The payload is another NNN PDU.
    pub const NNN: u16 = 0;
    /// The payload is an application data packet.
    pub const DATA: u16 = 1;
    /// The payload is an ICN interest or data packet.
    pub const ICN: u16 = 2;
}

/// The memoised wire encoding of a PDU.
///
/// Filled by the first `to_wire` call (or by `from_wire`) and cleared by every
/// setter. Cloning a PDU does not clone its cache; see
/// [`NnnPdu::clone_with_wire`].
#[derive(Debug, Default)]
pub(crate) struct WireCache(OnceLock<Bytes>);

impl WireCache {
    pub(crate) fn get(&self) -> Option<Bytes> {
        self.0.get().cloned()
    }

    /// Stores `wire` unless a value is already cached.
    pub(crate) fn fill(&self, wire: Bytes) {
        let _ = self.0.set(wire);
    }

    pub(crate) fn replace(&mut self, wire: Bytes) {
        self.0 = OnceLock::from(wire);
    }

    pub(crate) fn clear(&mut self) {
        self.0 = OnceLock::new();
    }
}

impl Clone for WireCache {
    fn clone(&self) -> Self {
        Self::default()
    }
}

// The cache never takes part in comparisons: two PDUs with equal fields are
// equal whether or not either has been encoded yet.
impl PartialEq for WireCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for WireCache {}

/// The fields every PDU has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduCommon {
    lifetime: Duration,
    version: u16,
    pub(crate) wire: WireCache,
}

impl PduCommon {
    pub(crate) fn new(defaults: PduDefaults) -> Self {
        check_lifetime(defaults.lifetime);
        Self {
            lifetime: defaults.lifetime,
            version: defaults.version,
            wire: WireCache::default(),
        }
    }

    pub(crate) fn from_header(lifetime: Duration, version: u16) -> Self {
        Self {
            lifetime,
            version,
            wire: WireCache::default(),
        }
    }
}

impl Default for PduCommon {
    fn default() -> Self {
        Self::new(PduDefaults::default())
    }
}

/// The largest number of whole seconds a 16-bit lifetime field carries.
pub const MAX_LIFETIME_SECS: u64 = u16::MAX as u64 - 1;

pub(crate) fn check_lifetime(lifetime: Duration) {
    assert!(
        lifetime.as_secs() <= MAX_LIFETIME_SECS,
        "A lifetime of {:?} does not fit in a 16-bit field",
        lifetime
    );
}

/// Behavior shared by every PDU type.
pub trait NnnPdu {
    /// The tag this PDU type carries on the wire.
    const PACKET_TYPE: PduType;

    #[doc(hidden)]
    fn common(&self) -> &PduCommon;

    #[doc(hidden)]
    fn common_mut(&mut self) -> &mut PduCommon;

    fn packet_type(&self) -> PduType {
        Self::PACKET_TYPE
    }

    /// How long the PDU may live in the network. Sent in whole seconds.
    fn lifetime(&self) -> Duration {
        self.common().lifetime
    }

    /// Sets the lifetime.
    ///
    /// # Panics
    ///
    /// Panics if the lifetime exceeds [`MAX_LIFETIME_SECS`] whole seconds.
    fn set_lifetime(&mut self, lifetime: Duration) {
        check_lifetime(lifetime);
        let common = self.common_mut();
        common.lifetime = lifetime;
        common.wire.clear();
    }

    fn version(&self) -> u16 {
        self.common().version
    }

    fn set_version(&mut self, version: u16) {
        let common = self.common_mut();
        common.version = version;
        common.wire.clear();
    }

    /// The cached wire encoding, if the PDU has one.
    fn wire(&self) -> Option<Bytes> {
        self.common().wire.get()
    }

    /// Replaces the cached wire encoding.
    fn set_wire(&mut self, wire: Bytes) {
        self.common_mut().wire.replace(wire);
    }

    /// Clones the PDU together with its cached wire encoding.
    fn clone_with_wire(&self) -> Self
    where
        Self: Clone,
    {
        let mut copy = self.clone();
        if let Some(wire) = self.wire() {
            copy.set_wire(wire);
        }
        copy
    }
}

#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
pub enum PduError {
    #[error("The {pdu} PDU has no {field} name set")]
    MissingName { pdu: PduType, field: &'static str },
}

pub(crate) fn required<'a>(
    name: &'a Option<Name>,
    pdu: PduType,
    field: &'static str,
) -> Result<&'a Name, PduError> {
    name.as_ref().ok_or(PduError::MissingName { pdu, field })
}

/// Writes the fields shared by every PDU's text dump.
pub(crate) fn fmt_common(f: &mut Formatter<'_>, pdu: PduType, common: &PduCommon) -> fmt::Result {
    write!(
        f,
        "{} ttl={} version={}",
        pdu,
        common.lifetime.as_secs(),
        common.version
    )
}

pub(crate) struct OptName<'a>(pub &'a Option<Name>);

impl Display for OptName<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "<unset>"),
        }
    }
}

/// Any NNN PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pdu {
    Do(Do),
    So(So),
    Du(Du),
    Nullp(Nullp),
    Mdo(Mdo),
    En(En),
    Aen(Aen),
    Oen(Oen),
    Ren(Ren),
    Den(Den),
    Inf(Inf),
}

macro_rules! for_each_pdu {
    ($pdu:expr, $inner:ident => $body:expr) => {
        match $pdu {
            Pdu::Do($inner) => $body,
            Pdu::So($inner) => $body,
            Pdu::Du($inner) => $body,
            Pdu::Nullp($inner) => $body,
            Pdu::Mdo($inner) => $body,
            Pdu::En($inner) => $body,
            Pdu::Aen($inner) => $body,
            Pdu::Oen($inner) => $body,
            Pdu::Ren($inner) => $body,
            Pdu::Den($inner) => $body,
            Pdu::Inf($inner) => $body,
        }
    };
}
pub(crate) use for_each_pdu;

impl Pdu {
    pub fn packet_type(&self) -> PduType {
        for_each_pdu!(self, pdu => pdu.packet_type())
    }

    pub fn lifetime(&self) -> Duration {
        for_each_pdu!(self, pdu => pdu.lifetime())
    }

    pub fn version(&self) -> u16 {
        for_each_pdu!(self, pdu => pdu.version())
    }

    pub fn wire(&self) -> Option<Bytes> {
        for_each_pdu!(self, pdu => pdu.wire())
    }

    /// The name a forwarding decision is made on: the destination of data
    /// PDUs and the subject name of the control PDUs. `None` for PDUs without
    /// one (NULLp, MDO, EN) or whose name is unset.
    pub fn forwarding_name(&self) -> Option<&Name> {
        match self {
            Pdu::Do(pdu) => pdu.name().ok(),
            Pdu::So(pdu) => pdu.name().ok(),
            Pdu::Du(pdu) => pdu.dst_name().ok(),
            Pdu::Aen(pdu) => pdu.name().ok(),
            Pdu::Oen(pdu) => pdu.name().ok(),
            Pdu::Ren(pdu) => pdu.name().ok(),
            Pdu::Den(pdu) => pdu.name().ok(),
            Pdu::Inf(pdu) => pdu.new_name().ok(),
            Pdu::Nullp(_) | Pdu::Mdo(_) | Pdu::En(_) => None,
        }
    }
}

impl Display for Pdu {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for_each_pdu!(self, pdu => Display::fmt(pdu, f))
    }
}

macro_rules! impl_from_pdu {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Pdu {
                fn from(pdu: $variant) -> Self {
                    Pdu::$variant(pdu)
                }
            }
        )*
    };
}

impl_from_pdu!(Do, So, Du, Nullp, Mdo, En, Aen, Oen, Ren, Den, Inf);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_types_round_trip_through_u32() {
        for pdu in [
            PduType::Nullp,
            PduType::So,
            PduType::Do,
            PduType::En,
            PduType::Aen,
            PduType::Ren,
            PduType::Den,
            PduType::Inf,
            PduType::Oen,
            PduType::Du,
            PduType::Mdo,
        ] {
            assert_eq!(PduType::try_from(pdu.as_u32()), Ok(pdu));
        }
        assert_eq!(PduType::try_from(9), Err(9));
    }

    #[test]
    fn setters_clear_the_cache() {
        let mut pdu = Do::new();
        pdu.set_wire(Bytes::from_static(b"stale"));
        assert!(pdu.wire().is_some());
        pdu.set_version(7);
        assert!(pdu.wire().is_none());

        pdu.set_wire(Bytes::from_static(b"stale"));
        pdu.set_lifetime(Duration::from_secs(20));
        assert!(pdu.wire().is_none());
    }

    #[test]
    fn clone_drops_cache_unless_forwarded() {
        let mut pdu = Do::new();
        pdu.set_wire(Bytes::from_static(b"wire"));
        assert!(pdu.clone().wire().is_none());
        assert_eq!(pdu.clone_with_wire().wire(), Some(Bytes::from_static(b"wire")));
        assert_eq!(pdu.clone(), pdu);
    }

    #[test]
    #[should_panic]
    fn lifetime_must_fit_ttl_field() {
        let mut pdu = Do::new();
        pdu.set_lifetime(Duration::from_secs(65535));
    }

    #[test]
    fn missing_names_are_errors() {
        let pdu = Do::new();
        assert_eq!(
            pdu.name(),
            Err(PduError::MissingName {
                pdu: PduType::Do,
                field: "destination"
            })
        );
        assert_eq!(Pdu::from(pdu).forwarding_name(), None);
    }
}
