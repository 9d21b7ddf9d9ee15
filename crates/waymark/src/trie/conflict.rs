use super::{InsertError, NodeId, Trie};

impl Trie {
    /// Reject a branch whose wildcard child shares a method with any literal
    /// sibling.
    ///
    /// Matching commits to the literal child without backtracking, so a
    /// request for a shared method could be claimed by either side.
    pub(super) fn check_branch(&self, id: NodeId) -> Result<(), InsertError> {
        let node = &self.nodes[id];
        let Some(wildcard) = node.wildcard else {
            return Ok(());
        };
        let wildcard_mask = self.nodes[wildcard].mask;

        let mut shared_any = 0;
        let mut clashes = Vec::new();
        for &literal in &node.children {
            let shared = wildcard_mask & self.nodes[literal].mask;
            if shared != 0 {
                self.terminals_under(literal, shared, &mut clashes);
                shared_any |= shared;
            }
        }

        if shared_any == 0 {
            return Ok(());
        }
        self.terminals_under(wildcard, shared_any, &mut clashes);
        Err(InsertError::Conflict(clashes))
    }
}
