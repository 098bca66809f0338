//! The NNST, the name-keyed forwarding table of an NNN node.
//!
//! Each [`Entry`] maps a name to the faces it can be reached through. Lookups
//! either match a name exactly ([`Nnst::find`]) or find the longest stored
//! prefix of it ([`Nnst::closest_sector`]), which is how a PDU addressed to a
//! node inside a known sector finds its way there.
//!
//! A [`ForwardingStrategy`] is told whenever an entry appears or is about to
//! disappear, so it can keep per-entry state of its own.

use crate::{
    config::{NnstConfig, Policy},
    face::FaceId,
    logging::nnst_event,
    name::Name,
};
use std::collections::BTreeMap;

mod entry;
pub use entry::{Entry, FaceMetric};

mod trie;
pub use trie::NodeId;
use trie::Trie;

/// Hooks a forwarding strategy uses to follow changes to the table.
pub trait ForwardingStrategy {
    /// Called after a new entry is added.
    fn on_entry_added(&mut self, _entry: &Entry) {}

    /// Called before an entry is removed, while it is still in the table.
    fn on_entry_will_be_removed(&mut self, _entry: &Entry) {}
}

/// A strategy that ignores every change.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStrategy;

impl ForwardingStrategy for NullStrategy {}

/// A name-keyed forwarding table.
#[derive(Debug)]
pub struct Nnst<S: ForwardingStrategy = NullStrategy> {
    /// The node the table belongs to, for logging
    node: u64,
    config: NnstConfig,
    strategy: S,
    trie: Trie<Entry>,
    /// Entries by insertion sequence, oldest first
    order: BTreeMap<u64, NodeId>,
    next_seq: u64,
}

impl Nnst<NullStrategy> {
    /// Creates an unbounded table without a strategy.
    pub fn without_strategy(node: u64) -> Self {
        Self::new(node, NnstConfig::default(), NullStrategy)
    }
}

impl<S: ForwardingStrategy> Nnst<S> {
    pub fn new(node: u64, config: NnstConfig, strategy: S) -> Self {
        Self {
            node,
            config,
            strategy,
            trie: Trie::new(),
            order: BTreeMap::new(),
            next_seq: 0,
        }
    }

    pub fn config(&self) -> &NnstConfig {
        &self.config
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    /// The number of entries in the table.
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.len() == 0
    }

    /// The entry for exactly `name`.
    pub fn find(&self, name: &Name) -> Option<&Entry> {
        let id = self.trie.find(name.as_slice())?;
        self.trie.value(id)
    }

    /// The entry with the longest name that is a prefix of `name`, including
    /// `name` itself.
    pub fn closest_sector(&self, name: &Name) -> Option<&Entry> {
        let id = self.trie.longest_prefix(name.as_slice())?;
        self.trie.value(id)
    }

    /// The entry at `position`, if it is still in the table.
    pub fn get(&self, position: NodeId) -> Option<&Entry> {
        self.trie.value(position)
    }

    /// Adds `face` with `metric` to the entry for `name`, creating the entry if
    /// needed. An existing face has its metric updated. Either way the entry is
    /// marked valid.
    pub fn add(&mut self, name: Name, face: FaceId, metric: i32) -> &Entry {
        let id = self.trie.insert(name.as_slice());
        match self.trie.value_mut(id) {
            Some(entry) => {
                entry.add_face(face, metric);
                entry.set_valid(true);
                nnst_event(self.node, "update", entry.name(), entry.faces().len());
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                let mut entry = Entry::new(name, id, seq);
                entry.add_face(face, metric);
                nnst_event(self.node, "add", entry.name(), 1);
                self.trie.set_value(id, entry);
                self.order.insert(seq, id);
                if let Some(entry) = self.trie.value(id) {
                    self.strategy.on_entry_added(entry);
                }
                self.evict_over_limit(id);
            }
        }
        self.trie.value(id).expect("the entry was just added")
    }

    /// Evicts the oldest entries while the table holds more than the policy
    /// allows. `keep` is never evicted.
    fn evict_over_limit(&mut self, keep: NodeId) {
        let Policy::Fifo { max_entries } = self.config.policy else {
            return;
        };
        while self.len() > max_entries.max(1) {
            let oldest = self
                .order
                .values()
                .copied()
                .find(|&id| id != keep);
            match oldest {
                Some(id) => {
                    self.remove_at(id, "evict");
                }
                None => break,
            }
        }
    }

    fn remove_at(&mut self, id: NodeId, operation: &'static str) -> Option<Entry> {
        self.strategy.on_entry_will_be_removed(self.trie.value(id)?);
        let entry = self.trie.remove_value(id)?;
        self.order.remove(&entry.seq);
        nnst_event(self.node, operation, entry.name(), entry.faces().len());
        Some(entry)
    }

    /// Removes the entry for exactly `name`.
    pub fn remove(&mut self, name: &Name) -> Option<Entry> {
        let id = self.trie.find(name.as_slice())?;
        self.remove_at(id, "remove")
    }

    /// Removes `face` from every entry. Entries left without faces are
    /// removed.
    pub fn remove_face(&mut self, face: FaceId) {
        // Removals merge nodes and reshuffle sibling maps, so walk a snapshot
        // of the positions. Entries keep their ids while they live.
        let positions: Vec<NodeId> = self.positions().collect();
        for id in positions {
            let Some(entry) = self.trie.value_mut(id) else {
                continue;
            };
            if entry.remove_face(face) && entry.faces().is_empty() {
                self.remove_at(id, "remove");
            }
        }
    }

    fn positions(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.begin(), move |&id| self.next(Some(id)))
    }

    /// Marks every entry invalid without removing any. Adding a face to an
    /// entry makes it valid again.
    pub fn invalidate_all(&mut self) {
        let mut position = self.begin();
        while let Some(id) = position {
            if let Some(entry) = self.trie.value_mut(id) {
                entry.set_valid(false);
            }
            position = self.next(Some(id));
        }
    }

    /// The position of the first entry, or [`end`](Self::end) if the table is
    /// empty. Entries come in an unspecified but stable order.
    pub fn begin(&self) -> Option<NodeId> {
        self.trie.first()
    }

    /// The position after `position`. `next(end())` is `end()`.
    pub fn next(&self, position: Option<NodeId>) -> Option<NodeId> {
        self.trie.next(position?)
    }

    /// The position past the last entry.
    pub fn end(&self) -> Option<NodeId> {
        None
    }

    /// Iterates over every entry.
    pub fn iter(&self) -> Iter<'_, S> {
        Iter {
            table: self,
            position: self.begin(),
        }
    }
}

impl<'a, S: ForwardingStrategy> IntoIterator for &'a Nnst<S> {
    type Item = &'a Entry;
    type IntoIter = Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a, S: ForwardingStrategy> {
    table: &'a Nnst<S>,
    position: Option<NodeId>,
}

impl<'a, S: ForwardingStrategy> Iterator for Iter<'a, S> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.position?;
        self.position = self.table.next(Some(id));
        self.table.get(id)
    }
}
