use super::trie::NodeId;
use crate::{face::FaceId, name::Name};

/// A face an entry's name can be reached through, and what it costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceMetric {
    pub face: FaceId,
    /// The routing cost. Lower is better.
    pub metric: i32,
}

/// The forwarding state for one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: Name,
    /// Kept sorted by metric, then by face
    faces: Vec<FaceMetric>,
    valid: bool,
    node: NodeId,
    /// Insertion order, for eviction
    pub(super) seq: u64,
}

impl Entry {
    pub(super) fn new(name: Name, node: NodeId, seq: u64) -> Self {
        Self {
            name,
            faces: vec![],
            valid: true,
            node,
            seq,
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The faces leading towards the name, cheapest first.
    pub fn faces(&self) -> &[FaceMetric] {
        &self.faces
    }

    /// The cheapest face.
    pub fn best_face(&self) -> Option<FaceId> {
        self.faces.first().map(|f| f.face)
    }

    pub fn has_face(&self, face: FaceId) -> bool {
        self.faces.iter().any(|f| f.face == face)
    }

    /// Whether the entry is still believed to be correct. See
    /// [`Nnst::invalidate_all`](super::Nnst::invalidate_all).
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The position of the entry in its table.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Adds `face` or updates its metric. Returns whether the face is new.
    pub(super) fn add_face(&mut self, face: FaceId, metric: i32) -> bool {
        let existed = self.remove_face(face);
        let at = self
            .faces
            .partition_point(|f| (f.metric, f.face) < (metric, face));
        self.faces.insert(at, FaceMetric { face, metric });
        !existed
    }

    /// Removes `face`. Returns whether it was there.
    pub(super) fn remove_face(&mut self, face: FaceId) -> bool {
        let before = self.faces.len();
        self.faces.retain(|f| f.face != face);
        self.faces.len() != before
    }

    pub(super) fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_sort_by_metric() {
        let mut entry = Entry::new("a".parse().unwrap(), NodeId::default(), 0);
        assert!(entry.add_face(FaceId(1), 10));
        assert!(entry.add_face(FaceId(2), 5));
        assert!(entry.add_face(FaceId(3), 5));
        assert_eq!(entry.best_face(), Some(FaceId(2)));

        assert!(!entry.add_face(FaceId(2), 20));
        let order: Vec<_> = entry.faces().iter().map(|f| f.face.0).collect();
        assert_eq!(order, [3, 1, 2]);

        assert!(entry.remove_face(FaceId(3)));
        assert!(!entry.remove_face(FaceId(3)));
        assert!(entry.has_face(FaceId(1)));
        assert!(!entry.has_face(FaceId(3)));
    }
}
