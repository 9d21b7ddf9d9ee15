//! Byte-compressed trie with per-node method masks.
//!
//! Nodes live in an arena and refer to each other by index. Literal children
//! are kept in two parallel arrays: `indices` holds the first byte of each
//! child's label, `children` the child ids. A node has at most one wildcard
//! child, whose label starts with the marker byte.

mod conflict;
mod find;
mod insert;

pub(crate) use insert::InsertError;

use crate::method::{flag, MethodMask};
use crate::pattern::MARKER;

pub(crate) type NodeId = usize;

pub(crate) const ROOT: NodeId = 0;

/// A route registered at a node, for one method bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Terminal {
    pub(crate) bit: u8,
    /// Index of the route in the table's route list.
    pub(crate) route: usize,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct Node {
    pub(crate) label: Vec<u8>,
    pub(crate) indices: Vec<u8>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) wildcard: Option<NodeId>,
    /// Methods with a route at this node or anywhere beneath it.
    pub(crate) mask: MethodMask,
    pub(crate) terminals: Vec<Terminal>,
}

impl Node {
    fn leaf(label: &[u8], mask: MethodMask) -> Self {
        Self {
            label: label.to_vec(),
            mask,
            ..Self::default()
        }
    }

    /// Literal child whose label starts with `byte`.
    pub(crate) fn literal(&self, byte: u8) -> Option<NodeId> {
        self.indices
            .iter()
            .position(|&b| b == byte)
            .map(|i| self.children[i])
    }

    /// Route registered here for `bit`.
    pub(crate) fn terminal(&self, bit: u8) -> Option<usize> {
        self.terminals
            .iter()
            .find(|t| t.bit == bit)
            .map(|t| t.route)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Trie {
    nodes: Vec<Node>,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Link `child` under `parent`, keyed by the first byte of its label.
    fn attach(&mut self, parent: NodeId, child: NodeId) {
        let first = self.nodes[child].label[0];
        let parent = &mut self.nodes[parent];
        if first == MARKER {
            parent.wildcard = Some(child);
        } else {
            parent.indices.push(first);
            parent.children.push(child);
        }
    }

    /// The route at `id` for the exact method, else for the wildcard method.
    pub(crate) fn resolve(&self, id: NodeId, exact: Option<u8>, any: Option<u8>) -> Option<usize> {
        let node = &self.nodes[id];
        exact
            .and_then(|bit| node.terminal(bit))
            .or_else(|| any.and_then(|bit| node.terminal(bit)))
    }

    /// Every terminal under `id` (inclusive) whose bit is in `mask`.
    pub(crate) fn terminals_under(&self, id: NodeId, mask: MethodMask, out: &mut Vec<Terminal>) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.mask & mask == 0 {
                continue;
            }
            out.extend(node.terminals.iter().filter(|t| flag(t.bit) & mask != 0));
            stack.extend(node.wildcard);
            stack.extend(node.children.iter().rev());
        }
    }
}
