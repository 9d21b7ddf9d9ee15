use super::{NodeId, Trie, ROOT};
use crate::captures::Spans;
use crate::method::{flag, MethodMask};
use crate::pattern::{MARKER, SEPARATOR};

impl Trie {
    /// Walk `path` from the root, following only children whose mask
    /// intersects `mask`.
    ///
    /// Returns the node where the path is exhausted exactly at the end of an
    /// edge. Wildcard captures are appended to `spans` as they are consumed,
    /// so a failed walk still leaves whatever it captured on the way.
    ///
    /// A wildcard segment may be empty. When the path runs out at a node with
    /// no route for `mask`, a reachable wildcard child labelled exactly `*`
    /// matches with an empty capture, the same as when that wildcard is still
    /// fused into its parent's label.
    pub(crate) fn find(&self, mask: MethodMask, path: &[u8], spans: &mut Spans) -> Option<NodeId> {
        let mut current = ROOT;
        let mut pos = 0;

        while pos < path.len() {
            let node = &self.nodes[current];
            let reachable = |id: &NodeId| self.nodes[*id].mask & mask != 0;

            let next = node
                .literal(path[pos])
                .filter(reachable)
                .or_else(|| node.wildcard.filter(reachable))?;

            pos = self.consume(next, path, pos, spans)?;
            current = next;
        }

        if !self.has_route(current, mask) {
            let trailing = self.nodes[current]
                .wildcard
                .filter(|&id| self.nodes[id].mask & mask != 0 && self.nodes[id].label == [MARKER]);
            if let Some(wildcard) = trailing {
                if spans.push(path.len(), path.len()) {
                    return Some(wildcard);
                }
            }
        }

        Some(current)
    }

    fn has_route(&self, id: NodeId, mask: MethodMask) -> bool {
        self.nodes[id]
            .terminals
            .iter()
            .any(|t| flag(t.bit) & mask != 0)
    }

    /// Match the label of `id` against `path` starting at `pos`. Returns the
    /// position just past the label.
    fn consume(&self, id: NodeId, path: &[u8], mut pos: usize, spans: &mut Spans) -> Option<usize> {
        for &byte in &self.nodes[id].label {
            if byte == MARKER {
                let start = pos;
                pos += path[pos..]
                    .iter()
                    .position(|&b| b == SEPARATOR)
                    .unwrap_or(path.len() - pos);
                if !spans.push(start, pos) {
                    return None;
                }
            } else if path.get(pos) == Some(&byte) {
                pos += 1;
            } else {
                return None;
            }
        }
        Some(pos)
    }
}
