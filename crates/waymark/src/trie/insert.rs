use super::{Node, NodeId, Terminal, Trie, ROOT};
use crate::method::flag;

/// Why a normalized path could not be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InsertError {
    /// The node already holds a route for this method.
    Duplicate { existing: usize },
    /// A wildcard child and a literal sibling now share a method. Lists every
    /// terminal on both sides for the shared methods.
    Conflict(Vec<Terminal>),
}

/// Which slot of its parent a child occupies.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Literal(usize),
    Wildcard,
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

impl Trie {
    /// Register `route` for method `bit` at the normalized `path`.
    ///
    /// Every node on the way down gets `bit` added to its mask, and every
    /// branch point on the way is re-checked for wildcard/literal overlap.
    pub(crate) fn insert(&mut self, path: &[u8], bit: u8, route: usize) -> Result<(), InsertError> {
        let mask = flag(bit);
        let mut visited = vec![ROOT];
        let mut current = ROOT;
        let mut rest = path;

        self.nodes[ROOT].mask |= mask;

        while !rest.is_empty() {
            let Some((slot, child)) = self.slot_for(current, rest[0]) else {
                let leaf = self.push(Node::leaf(rest, mask));
                self.attach(current, leaf);
                visited.push(leaf);
                current = leaf;
                break;
            };

            let label_len = self.nodes[child].label.len();
            let common = common_prefix(&self.nodes[child].label, rest);

            if common < label_len {
                let branch = self.split(current, slot, child, common);
                self.nodes[branch].mask |= mask;
                visited.push(branch);
                current = branch;
            } else {
                self.nodes[child].mask |= mask;
                visited.push(child);
                current = child;
            }
            rest = &rest[common..];
        }

        if let Some(existing) = self.nodes[current].terminal(bit) {
            return Err(InsertError::Duplicate { existing });
        }
        self.nodes[current].terminals.push(Terminal { bit, route });

        for id in visited {
            self.check_branch(id)?;
        }
        Ok(())
    }

    /// The child of `parent` an edge starting with `byte` would follow.
    fn slot_for(&self, parent: NodeId, byte: u8) -> Option<(Slot, NodeId)> {
        let node = &self.nodes[parent];
        if byte == crate::pattern::MARKER {
            return node.wildcard.map(|id| (Slot::Wildcard, id));
        }
        node.indices
            .iter()
            .position(|&b| b == byte)
            .map(|i| (Slot::Literal(i), node.children[i]))
    }

    /// Split `child` after `at` bytes of its label.
    ///
    /// A new branch node holding the shared prefix takes the child's slot in
    /// `parent`, and only then is the child's label cut down to the suffix and
    /// re-attached beneath the branch. The branch keeps the child's first byte,
    /// so the parent's index entry stays valid throughout.
    fn split(&mut self, parent: NodeId, slot: Slot, child: NodeId, at: usize) -> NodeId {
        let prefix = self.nodes[child].label[..at].to_vec();
        let branch = self.push(Node {
            label: prefix,
            mask: self.nodes[child].mask,
            ..Node::default()
        });

        match slot {
            Slot::Literal(i) => self.nodes[parent].children[i] = branch,
            Slot::Wildcard => self.nodes[parent].wildcard = Some(branch),
        }

        self.nodes[child].label.drain(..at);
        self.attach(branch, child);
        branch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(trie: &Trie, id: NodeId) -> Vec<String> {
        let node = trie.node(id);
        let mut out: Vec<String> = node
            .children
            .iter()
            .chain(node.wildcard.iter())
            .map(|&c| String::from_utf8_lossy(&trie.node(c).label).into_owned())
            .collect();
        out.sort();
        out
    }

    #[test]
    fn first_route_becomes_a_single_edge() {
        let mut trie = Trie::new();
        trie.insert(b"/users/*", 0, 0).unwrap();

        assert_eq!(labels(&trie, ROOT), vec!["/users/*"]);
        assert_eq!(trie.len(), 2);
    }

    #[test]
    fn diverging_route_splits_the_edge() {
        let mut trie = Trie::new();
        trie.insert(b"/users", 0, 0).unwrap();
        trie.insert(b"/uploads", 0, 1).unwrap();

        assert_eq!(labels(&trie, ROOT), vec!["/u"]);
        let branch = trie.node(ROOT).literal(b'/').unwrap();
        assert_eq!(labels(&trie, branch), vec!["ploads", "sers"]);
        assert!(trie.node(branch).terminals.is_empty());
    }

    #[test]
    fn prefix_route_terminates_on_split_node() {
        let mut trie = Trie::new();
        trie.insert(b"/users/all", 0, 0).unwrap();
        trie.insert(b"/users", 1, 1).unwrap();

        let branch = trie.node(ROOT).literal(b'/').unwrap();
        assert_eq!(trie.node(branch).label, b"/users");
        assert_eq!(trie.node(branch).terminal(1), Some(1));
        assert_eq!(labels(&trie, branch), vec!["/all"]);
    }

    #[test]
    fn masks_cover_descendants() {
        let mut trie = Trie::new();
        trie.insert(b"/a/b", 0, 0).unwrap();
        trie.insert(b"/a/c", 1, 1).unwrap();
        trie.insert(b"/a", 2, 2).unwrap();

        assert_eq!(trie.node(ROOT).mask, 0b111);
        let a = trie.node(ROOT).literal(b'/').unwrap();
        assert_eq!(trie.node(a).mask, 0b111);
        let slash = trie.node(a).literal(b'/').unwrap();
        assert_eq!(trie.node(slash).mask, 0b011);
        let b = trie.node(slash).literal(b'b').unwrap();
        assert_eq!(trie.node(b).mask, 0b001);
    }

    #[test]
    fn wildcard_suffix_moves_into_wildcard_slot() {
        let mut trie = Trie::new();
        trie.insert(b"/*/x", 0, 0).unwrap();
        trie.insert(b"/", 0, 1).unwrap();

        let root_child = trie.node(ROOT).literal(b'/').unwrap();
        let node = trie.node(root_child);
        assert_eq!(node.label, b"/");
        assert!(node.children.is_empty());
        let w = node.wildcard.unwrap();
        assert_eq!(trie.node(w).label, b"*/x");
    }

    #[test]
    fn same_method_twice_is_a_duplicate() {
        let mut trie = Trie::new();
        trie.insert(b"/a", 0, 0).unwrap();
        trie.insert(b"/a", 1, 1).unwrap();
        assert_eq!(
            trie.insert(b"/a", 0, 2),
            Err(InsertError::Duplicate { existing: 0 })
        );
    }

    #[test]
    fn splits_inside_multibyte_characters() {
        let mut trie = Trie::new();
        trie.insert("/é".as_bytes(), 0, 0).unwrap();
        trie.insert("/è".as_bytes(), 0, 1).unwrap();
        assert_eq!(trie.node(trie.node(ROOT).literal(b'/').unwrap()).children.len(), 2);
    }
}
