//! The PDUs that carry data: DO, SO, DU and NULLp.

use super::{fmt_common, payload_type, required, NnnPdu, OptName, PduCommon, PduError, PduType};
use crate::{config::PduDefaults, name::Name};
use bytes::Bytes;
use std::fmt::{self, Display, Formatter};

fn fmt_payload(f: &mut Formatter<'_>, payload_type: u16, payload: &Bytes) -> fmt::Result {
    write!(f, " payload_type={} payload={}B", payload_type, payload.len())
}

/// Data routed towards a destination name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Do {
    common: PduCommon,
    payload_type: u16,
    name: Option<Name>,
    payload: Bytes,
}

impl Do {
    pub fn new() -> Self {
        Self::with_defaults(PduDefaults::default())
    }

    pub fn with_defaults(defaults: PduDefaults) -> Self {
        Self {
            common: PduCommon::new(defaults),
            payload_type: payload_type::DATA,
            name: None,
            payload: Bytes::new(),
        }
    }

    pub(crate) fn from_parts(common: PduCommon, payload_type: u16, name: Name) -> Self {
        Self {
            common,
            payload_type,
            name: Some(name),
            payload: Bytes::new(),
        }
    }

    /// The destination name.
    pub fn name(&self) -> Result<&Name, PduError> {
        required(&self.name, PduType::Do, "destination")
    }

    pub fn set_name(&mut self, name: Name) {
        self.name = Some(name);
        self.common.wire.clear();
    }

    pub fn payload_type(&self) -> u16 {
        self.payload_type
    }

    pub fn set_payload_type(&mut self, payload_type: u16) {
        self.payload_type = payload_type;
        self.common.wire.clear();
    }

    /// The carried payload. Empty when there is none.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: Bytes) {
        self.payload = payload;
        self.common.wire.clear();
    }
}

impl Default for Do {
    fn default() -> Self {
        Self::new()
    }
}

impl NnnPdu for Do {
    const PACKET_TYPE: PduType = PduType::Do;

    fn common(&self) -> &PduCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PduCommon {
        &mut self.common
    }
}

impl Display for Do {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_common(f, Self::PACKET_TYPE, &self.common)?;
        write!(f, " payload_type={} name={}", self.payload_type, OptName(&self.name))?;
        write!(f, " payload={}B", self.payload.len())
    }
}

/// Data stamped with the name of the node that sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct So {
    common: PduCommon,
    payload_type: u16,
    name: Option<Name>,
    payload: Bytes,
}

impl So {
    pub fn new() -> Self {
        Self::with_defaults(PduDefaults::default())
    }

    pub fn with_defaults(defaults: PduDefaults) -> Self {
        Self {
            common: PduCommon::new(defaults),
            payload_type: payload_type::DATA,
            name: None,
            payload: Bytes::new(),
        }
    }

    pub(crate) fn from_parts(common: PduCommon, payload_type: u16, name: Name) -> Self {
        Self {
            common,
            payload_type,
            name: Some(name),
            payload: Bytes::new(),
        }
    }

    /// The source name.
    pub fn name(&self) -> Result<&Name, PduError> {
        required(&self.name, PduType::So, "source")
    }

    pub fn set_name(&mut self, name: Name) {
        self.name = Some(name);
        self.common.wire.clear();
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

impl Default for So {
    fn default() -> Self {
        Self::new()
    }
}

impl NnnPdu for So {
    const PACKET_TYPE: PduType = PduType::So;

    fn common(&self) -> &PduCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PduCommon {
        &mut self.common
    }
}

impl Display for So {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_common(f, Self::PACKET_TYPE, &self.common)?;
        write!(f, " payload_type={} name={}", self.payload_type, OptName(&self.name))?;
        write!(f, " payload={}B", self.payload.len())
    }
}

/// Data carrying both the source and the destination name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Du {
    common: PduCommon,
    payload_type: u16,
    src_name: Option<Name>,
    dst_name: Option<Name>,
    payload: Bytes,
}

impl Du {
    pub fn new() -> Self {
        Self::with_defaults(PduDefaults::default())
    }

    pub fn with_defaults(defaults: PduDefaults) -> Self {
        Self {
            common: PduCommon::new(defaults),
            payload_type: payload_type::DATA,
            src_name: None,
            dst_name: None,
            payload: Bytes::new(),
        }
    }

    pub(crate) fn from_parts(
        common: PduCommon,
        payload_type: u16,
        src_name: Name,
        dst_name: Name,
    ) -> Self {
        Self {
            common,
            payload_type,
            src_name: Some(src_name),
            dst_name: Some(dst_name),
            payload: Bytes::new(),
        }
    }

    pub fn src_name(&self) -> Result<&Name, PduError> {
        required(&self.src_name, PduType::Du, "source")
    }

    pub fn set_src_name(&mut self, name: Name) {
        self.src_name = Some(name);
        self.common.wire.clear();
    }

    pub fn dst_name(&self) -> Result<&Name, PduError> {
        required(&self.dst_name, PduType::Du, "destination")
    }

    pub fn set_dst_name(&mut self, name: Name) {
        self.dst_name = Some(name);
        self.common.wire.clear();
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

impl Default for Du {
    fn default() -> Self {
        Self::new()
    }
}

impl NnnPdu for Du {
    const PACKET_TYPE: PduType = PduType::Du;

    fn common(&self) -> &PduCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PduCommon {
        &mut self.common
    }
}

impl Display for Du {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_common(f, Self::PACKET_TYPE, &self.common)?;
        write!(
            f,
            " payload_type={} src={} dst={}",
            self.payload_type,
            OptName(&self.src_name),
            OptName(&self.dst_name)
        )?;
        write!(f, " payload={}B", self.payload.len())
    }
}

/// Data with no NNN addressing at all, passed through as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nullp {
    common: PduCommon,
    payload_type: u16,
    payload: Bytes,
}

impl Nullp {
    pub fn new() -> Self {
        Self::with_defaults(PduDefaults::default())
    }

    pub fn with_defaults(defaults: PduDefaults) -> Self {
        Self {
            common: PduCommon::new(defaults),
            payload_type: payload_type::DATA,
            payload: Bytes::new(),
        }
    }

    pub(crate) fn from_parts(common: PduCommon, payload_type: u16) -> Self {
        Self {
            common,
            payload_type,
            payload: Bytes::new(),
        }
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

impl Default for Nullp {
    fn default() -> Self {
        Self::new()
    }
}

impl NnnPdu for Nullp {
    const PACKET_TYPE: PduType = PduType::Nullp;

    fn common(&self) -> &PduCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut PduCommon {
        &mut self.common
    }
}

impl Display for Nullp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_common(f, Self::PACKET_TYPE, &self.common)?;
        fmt_payload(f, self.payload_type, &self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn prints_fields_in_wire_order() {
        let mut pdu = Du::new();
        pdu.set_src_name("a.b".parse().unwrap());
        pdu.set_dst_name("c.d".parse().unwrap());
        pdu.set_payload(Bytes::from_static(b"hello"));
        pdu.set_lifetime(Duration::from_secs(5));
        assert_eq!(
            pdu.to_string(),
            "DU ttl=5 version=1 payload_type=1 src=a.b dst=c.d payload=5B"
        );
    }

    #[test]
    fn unset_names_print_as_unset() {
        assert_eq!(
            So::new().to_string(),
            "SO ttl=2 version=1 payload_type=1 name=<unset> payload=0B"
        );
    }

    #[test]
    fn defaults_apply() {
        let defaults = PduDefaults::default()
            .with_lifetime(Duration::from_secs(9))
            .with_version(3);
        let pdu = Nullp::with_defaults(defaults);
        assert_eq!(pdu.lifetime(), Duration::from_secs(9));
        assert_eq!(pdu.version(), 3);
    }
}
