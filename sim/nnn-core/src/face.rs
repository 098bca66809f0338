use std::fmt::{self, Display, Formatter};

/// A handle to one of a node's faces.
///
/// Faces themselves belong to the simulator. The protocol core only needs to
/// tell them apart, so it works with their ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceId(pub u32);

impl From<u32> for FaceId {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

impl Display for FaceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "face {}", self.0)
    }
}
