//! Hierarchical names.
//!
//! A [`Name`] is an ordered list of opaque [`Label`]s with the most general
//! label first, written with dots between labels: `ae.34.24` is the name
//! `24` inside the sector `ae.34`.

use bytes::Bytes;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};
use thiserror::Error as ThisError;

/// A single opaque label of a [`Name`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(Bytes);

impl Label {
    /// Creates a label from raw bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// The label's bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The number of bytes in the label.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the label has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl Label {
    /// Parses one label of the dotted text form. `0x` followed by an even
    /// number of hex digits is a binary label, anything else is taken as is.
    fn parse(part: &str) -> Self {
        match part.strip_prefix("0x").and_then(decode_hex) {
            Some(bytes) => Self(Bytes::from(bytes)),
            None => Self::from(part),
        }
    }
}

fn decode_hex(digits: &str) -> Option<Vec<u8>> {
    if digits.is_empty() || digits.len() % 2 != 0 {
        return None;
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok())
        .collect()
}

/// Printable labels print as text. Any other label, and any label that would
/// read as hex, prints as `0x` and its bytes in hex.
impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let printable = self.0.iter().all(|b| b.is_ascii_graphic() && *b != b'.');
        if printable && !self.0.starts_with(b"0x") {
            write!(f, "{}", String::from_utf8_lossy(&self.0))
        } else {
            write!(f, "0x")?;
            for b in self.0.iter() {
                write!(f, "{:02x}", b)?;
            }
            Ok(())
        }
    }
}

/// A structured NNN name.
///
/// Names are values: nothing mutates a name in place once it is built. New
/// names come from [`concat`](Self::concat), [`sector_name`](Self::sector_name)
/// and friends. Names order lexicographically over their labels, so a name
/// sorts directly before every name it is a prefix of.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name {
    labels: Vec<Label>,
}

impl Name {
    /// The name with no labels.
    pub const fn empty() -> Self {
        Self { labels: Vec::new() }
    }

    /// Creates a name from its labels, most general first.
    pub fn from_labels(labels: impl IntoIterator<Item = impl Into<Label>>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Gets the label at `index`.
    pub fn label(&self, index: usize) -> Result<&Label, NameError> {
        self.labels.get(index).ok_or(NameError::IndexOutOfRange {
            index,
            len: self.labels.len(),
        })
    }

    /// Iterates over the labels, most general first.
    pub fn labels(&self) -> impl ExactSizeIterator<Item = &Label> + '_ {
        self.labels.iter()
    }

    pub(crate) fn as_slice(&self) -> &[Label] {
        &self.labels
    }

    /// The number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn is_one_label(&self) -> bool {
        self.labels.len() == 1
    }

    /// Returns a new name made of this name's labels followed by `other`'s.
    pub fn concat(&self, other: &Name) -> Name {
        let mut labels = Vec::with_capacity(self.len() + other.len());
        labels.extend_from_slice(&self.labels);
        labels.extend_from_slice(&other.labels);
        Name { labels }
    }

    /// Every label except the last. This is the sector the name lives in.
    pub fn sector_name(&self) -> Name {
        match self.labels.split_last() {
            Some((_, sector)) => Name {
                labels: sector.to_vec(),
            },
            None => Name::empty(),
        }
    }

    /// The last label on its own, as a one-label name.
    pub fn last_label(&self) -> Name {
        Name {
            labels: self.labels.last().cloned().into_iter().collect(),
        }
    }

    /// Whether this name's labels are an initial run of `other`'s. Every name
    /// is a prefix of itself.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        other.labels.starts_with(&self.labels)
    }

    /// The dotted text form, identical to [`Display`].
    pub fn to_canonical_form(&self) -> String {
        self.to_string()
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut labels = self.labels.iter();
        if let Some(first) = labels.next() {
            write!(f, "{}", first)?;
            for label in labels {
                write!(f, ".{}", label)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Name {
    type Err = NameError;

    /// Parses the dotted text form, the inverse of [`Display`]. The empty
    /// string is the empty name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Name::empty());
        }
        let mut labels = Vec::new();
        for part in s.split('.') {
            if part.is_empty() {
                Err(NameError::EmptyLabel)?
            }
            labels.push(Label::parse(part));
        }
        Ok(Self { labels })
    }
}

#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    #[error("Label index {index} is out of range for a name with {len} labels")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Names cannot contain empty labels")]
    EmptyLabel,
}
