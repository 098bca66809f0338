//! Point-of-attachment addresses.
//!
//! A PoA is the link-layer address a node can be reached at. Most PoAs in a
//! simulation are 48-bit MAC addresses, but the general form can carry any
//! address type of up to [`Address::MAX_SIZE`] bytes tagged with a kind byte.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};
use thiserror::Error as ThisError;

/// A link-layer address tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    kind: u8,
    bytes: Vec<u8>,
}

impl Address {
    /// The largest number of address bytes any kind may use.
    pub const MAX_SIZE: usize = 20;
    /// The kind byte of a 48-bit MAC address.
    pub const MAC48_KIND: u8 = 1;
    /// The number of bytes in a 48-bit MAC address.
    pub const MAC48_SIZE: usize = 6;

    /// Creates an address of the given kind.
    pub fn new(kind: u8, bytes: impl Into<Vec<u8>>) -> Result<Self, AddressError> {
        let bytes = bytes.into();
        if bytes.len() > Self::MAX_SIZE {
            Err(AddressError::TooLong(bytes.len()))?
        }
        Ok(Self { kind, bytes })
    }

    /// Creates a 48-bit MAC address.
    pub fn mac48(octets: [u8; 6]) -> Self {
        Self {
            kind: Self::MAC48_KIND,
            bytes: octets.to_vec(),
        }
    }

    /// Creates a 48-bit MAC address from the low 48 bits of `mac`.
    pub fn from_u48(mac: u64) -> Self {
        let mut octets = [0; 6];
        octets.copy_from_slice(&mac.to_be_bytes()[2..8]);
        Self::mac48(octets)
    }

    pub fn kind(&self) -> u8 {
        self.kind
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether this is a 48-bit MAC address.
    pub fn is_mac48(&self) -> bool {
        self.kind == Self::MAC48_KIND && self.bytes.len() == Self::MAC48_SIZE
    }

    /// The six octets of a 48-bit MAC address, or `None` for other kinds.
    pub fn to_mac48(&self) -> Option<[u8; 6]> {
        if !self.is_mac48() {
            return None;
        }
        let mut octets = [0; 6];
        octets.copy_from_slice(&self.bytes);
        Some(octets)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.is_mac48() {
            write!(f, "{:02x}-{:02x}-", self.kind, self.bytes.len())?;
        }
        let mut octets = self.bytes.iter();
        if let Some(first) = octets.next() {
            write!(f, "{:02x}", first)?;
            for octet in octets {
                write!(f, ":{:02x}", octet)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Parses a 48-bit MAC address such as `01:B2:03:04:05:06`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or(AddressError::Malformed)?;
            if part.len() != 2 {
                Err(AddressError::Malformed)?
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| AddressError::Malformed)?;
        }
        if parts.next().is_some() {
            Err(AddressError::Malformed)?
        }
        Ok(Self::mac48(octets))
    }
}

#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    #[error("An address of {0} bytes exceeds the {max} byte limit", max = Address::MAX_SIZE)]
    TooLong(usize),
    #[error("Expected a MAC address of the form 01:23:45:67:89:ab")]
    Malformed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mac48() {
        let address: Address = "01:B2:03:04:05:06".parse().unwrap();
        assert!(address.is_mac48());
        assert_eq!(address.to_mac48(), Some([0x01, 0xb2, 0x03, 0x04, 0x05, 0x06]));
        assert_eq!(address.to_string(), "01:b2:03:04:05:06");
    }

    #[test]
    fn rejects_malformed_mac48() {
        assert_eq!("01:02:03".parse::<Address>(), Err(AddressError::Malformed));
        assert_eq!(
            "01:02:03:04:05:06:07".parse::<Address>(),
            Err(AddressError::Malformed)
        );
        assert_eq!("0g:02:03:04:05:06".parse::<Address>(), Err(AddressError::Malformed));
    }

    #[test]
    fn u48_matches_octets() {
        assert_eq!(
            Address::from_u48(0x0000_01b2_0304_0506),
            "01:b2:03:04:05:06".parse().unwrap()
        );
    }

    #[test]
    fn general_form() {
        let address = Address::new(7, vec![0xaa, 0xbb]).unwrap();
        assert!(!address.is_mac48());
        assert_eq!(address.to_mac48(), None);
        assert_eq!(address.to_string(), "07-02-aa:bb");
        assert_eq!(Address::new(7, vec![0; 21]), Err(AddressError::TooLong(21)));
    }
}
