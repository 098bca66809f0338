//! A compressed trie over label sequences, stored in an arena.
//!
//! Each node holds the run of labels on the edge from its parent, so chains of
//! nodes without values collapse into a single edge. Nodes are addressed by
//! [`NodeId`]. A node that holds a value keeps its id until that value is
//! removed, however the rest of the trie is restructured around it.

use crate::name::Label;
use rustc_hash::FxHashMap;

/// The arena index of a trie node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

#[derive(Debug, Clone)]
struct Node<T> {
    /// The labels between the parent and this node. Empty only for the root.
    edge: Vec<Label>,
    parent: Option<NodeId>,
    /// Children keyed by the first label of their edge
    children: FxHashMap<Label, NodeId>,
    value: Option<T>,
}

impl<T> Node<T> {
    fn new(edge: Vec<Label>, parent: Option<NodeId>) -> Self {
        Self {
            edge,
            parent,
            children: FxHashMap::default(),
            value: None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Trie<T> {
    nodes: Vec<Option<Node<T>>>,
    free: Vec<NodeId>,
    len: usize,
}

impl<T> Trie<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::new(vec![], None))],
            free: vec![],
            len: 0,
        }
    }

    /// The number of nodes holding a value.
    pub fn len(&self) -> usize {
        self.len
    }

    fn get_node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id.0)?.as_ref()
    }

    fn node(&self, id: NodeId) -> &Node<T> {
        self.get_node(id).expect("trie links only point at live nodes")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        self.nodes[id.0]
            .as_mut()
            .expect("trie links only point at live nodes")
    }

    fn alloc(&mut self, node: Node<T>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.nodes[id.0] = None;
        self.free.push(id);
    }

    pub fn value(&self, id: NodeId) -> Option<&T> {
        self.get_node(id)?.value.as_ref()
    }

    pub fn value_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id.0)?.as_mut()?.value.as_mut()
    }

    /// The node at exactly `key`, if there is one.
    pub fn find(&self, key: &[Label]) -> Option<NodeId> {
        let mut current = ROOT;
        let mut rest = key;
        while let Some(first) = rest.first() {
            let child = *self.node(current).children.get(first)?;
            let edge = &self.node(child).edge;
            if !rest.starts_with(edge) {
                return None;
            }
            rest = &rest[edge.len()..];
            current = child;
        }
        Some(current)
    }

    /// The node holding a value whose key is the longest prefix of `key`.
    pub fn longest_prefix(&self, key: &[Label]) -> Option<NodeId> {
        let mut current = ROOT;
        let mut best = self.node(ROOT).value.as_ref().map(|_| ROOT);
        let mut rest = key;
        while let Some(first) = rest.first() {
            let Some(&child) = self.node(current).children.get(first) else {
                break;
            };
            let node = self.node(child);
            if !rest.starts_with(&node.edge) {
                break;
            }
            rest = &rest[node.edge.len()..];
            current = child;
            if node.value.is_some() {
                best = Some(child);
            }
        }
        best
    }

    /// Finds the node at exactly `key`, creating it and splitting edges as
    /// needed.
    pub fn insert(&mut self, key: &[Label]) -> NodeId {
        let mut current = ROOT;
        let mut rest = key;
        while let Some(first) = rest.first() {
            let Some(&child) = self.node(current).children.get(first) else {
                let leaf = self.alloc(Node::new(rest.to_vec(), Some(current)));
                self.node_mut(current).children.insert(first.clone(), leaf);
                return leaf;
            };

            let edge = &self.node(child).edge;
            let common = edge
                .iter()
                .zip(rest)
                .take_while(|(a, b)| a == b)
                .count();
            if common < edge.len() {
                // Put a new node where the key leaves the edge. The child keeps
                // its id and hangs below the new node with the rest of its edge.
                let lower = edge[common..].to_vec();
                let upper = edge[..common].to_vec();
                let middle = self.alloc(Node::new(upper, Some(current)));
                self.node_mut(middle).children.insert(lower[0].clone(), child);
                let child_node = self.node_mut(child);
                child_node.edge = lower;
                child_node.parent = Some(middle);
                self.node_mut(current).children.insert(first.clone(), middle);
                rest = &rest[common..];
                current = middle;
            } else {
                rest = &rest[common..];
                current = child;
            }
        }
        current
    }

    /// Stores `value` at node `id`, returning the previous value.
    pub fn set_value(&mut self, id: NodeId, value: T) -> Option<T> {
        let old = self.node_mut(id).value.replace(value);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    /// Takes the value out of node `id` and prunes nodes left without a
    /// purpose.
    pub fn remove_value(&mut self, id: NodeId) -> Option<T> {
        let value = self.nodes.get_mut(id.0)?.as_mut()?.value.take()?;
        self.len -= 1;
        self.compact(id);
        Some(value)
    }

    /// Removes `id` if it holds no value and has no children, and merges it
    /// into its child if it holds no value and has only one.
    fn compact(&mut self, id: NodeId) {
        let node = self.node(id);
        let Some(parent) = node.parent else {
            return;
        };
        if node.value.is_some() {
            return;
        }
        match node.children.len() {
            0 => {
                let first = node.edge[0].clone();
                self.node_mut(parent).children.remove(&first);
                self.release(id);
                self.compact(parent);
            }
            1 => {
                // The child absorbs this node's edge, so that a child holding a
                // value keeps its id.
                let first = node.edge[0].clone();
                let mut edge = node.edge.clone();
                let child = *node.children.values().next().expect("one child");
                let child_node = self.node_mut(child);
                edge.append(&mut child_node.edge);
                child_node.edge = edge;
                child_node.parent = Some(parent);
                self.node_mut(parent).children.insert(first, child);
                self.release(id);
            }
            _ => {}
        }
    }

    /// The node after `id` in a preorder walk over every node.
    fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(&child) = self.node(id).children.values().next() {
            return Some(child);
        }
        let mut current = id;
        loop {
            let parent = self.node(current).parent?;
            let mut siblings = self
                .node(parent)
                .children
                .values()
                .skip_while(|&&sibling| sibling != current);
            siblings.next();
            if let Some(&sibling) = siblings.next() {
                return Some(sibling);
            }
            current = parent;
        }
    }

    /// The first node in preorder that holds a value.
    pub fn first(&self) -> Option<NodeId> {
        if self.node(ROOT).value.is_some() {
            Some(ROOT)
        } else {
            self.next(ROOT)
        }
    }

    /// The node holding a value that follows `id` in preorder. `None` at the
    /// end, or if `id` is not a live node.
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?;
        let mut current = self.successor(id)?;
        while self.node(current).value.is_none() {
            current = self.successor(current)?;
        }
        Some(current)
    }

    /// The number of arena slots in use, values or not.
    #[cfg(test)]
    fn live_nodes(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_some()).count()
    }
}

impl<T> Default for Trie<T> {
    fn default() -> Self {
        Self::new()
    }
}
