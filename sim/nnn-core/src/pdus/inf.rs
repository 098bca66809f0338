use super::{fmt_common, required, NnnPdu, OptName, PduCommon, PduError, PduType};
use crate::{config::PduDefaults, name::Name};
use std::{
    fmt::{self, Display, Formatter},
    time::Duration,
};

/// Tells the nodes along a path that a node moved from its old name to a new
/// one, so traffic for the old name can be redirected while its lease lasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inf {
    common: PduCommon,
    remaining_lease: Duration,
    old_name: Option<Name>,
    new_name: Option<Name>,
}

impl Inf {
    pub fn new() -> Self {
        Self::with_defaults(PduDefaults::default())
    }

    pub fn with_defaults(defaults: PduDefaults) -> Self {
        Self {
            common: PduCommon::new(defaults),
            remaining_lease: Duration::ZERO,
            old_name: None,
            new_name: None,
        }
    }

    pub(crate) fn from_parts(
        common: PduCommon,
        remaining_lease: Duration,
        old_name: Name,
        new_name: Name,
    ) -> Self {
        Self {
            common,
            remaining_lease,
            old_name: Some(old_name),
            new_name: Some(new_name),
        }
    }

    /// How much longer the old name stays valid.
    pub fn remaining_lease(&self) -> Duration {
        self.remaining_lease
    }

    pub fn set_remaining_lease(&mut self, remaining_lease: Duration) {
        self.remaining_lease = remaining_lease;
        self.common.wire.clear();
    }

    pub fn old_name(&self) -> Result<&Name, PduError> {
        required(&self.old_name, PduType::Inf, "old")
    }

    pub fn set_old_name(&mut self, name: Name) {
        self.old_name = Some(name);
        self.common.wire.clear();
    }

    pub fn new_name(&self) -> Result<&Name, PduError> {
        required(&self.new_name, PduType::Inf, "new")
    }

    pub fn set_new_name(&mut self, name: Name) {
        self.new_name = Some(name);
        self.common.wire.clear();
    }
}

impl Default for Inf {
    fn default() -> Self {
        Self::new()
    }
}

impl NnnPdu for Inf {
    const PACKET_TYPE: PduType = PduType::Inf;

    fn common(&self) -> &PduCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PduCommon {
        &mut self.common
    }
}

impl Display for Inf {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_common(f, Self::PACKET_TYPE, &self.common)?;
        write!(
            f,
            " remaining_lease={} old={} new={}",
            self.remaining_lease.as_secs(),
            OptName(&self.old_name),
            OptName(&self.new_name)
        )
    }
}
