//! Finger Table
//!
//! Entry `i` approximates the successor of `own + 2^i`. Entry 0 mirrors the
//! successor and is written by ring state, never by FixFingers.

use crate::domain::{ChordError, Key, KeySpace, RemoteNode};

/// Routing shortcuts of a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerTable {
    entries: Vec<Option<RemoteNode>>,
}

impl FingerTable {
    /// Create a table with every slot uninitialized.
    pub fn new(len: usize) -> Self {
        Self {
            entries: vec![None; len],
        }
    }

    /// Create a table with every slot pointing at `node` (solo-ring bootstrap).
    pub fn filled(len: usize, node: &RemoteNode) -> Self {
        Self {
            entries: vec![Some(node.clone()); len],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RemoteNode> {
        self.entries.get(index).and_then(Option::as_ref)
    }

    pub fn entries(&self) -> &[Option<RemoteNode>] {
        &self.entries
    }

    /// Write slot `index`, returning `true` if it now points somewhere new.
    ///
    /// Writes past the end are ignored: a 1-bit key space has no fingers.
    pub fn set(&mut self, index: usize, node: RemoteNode) -> bool {
        match self.entries.get_mut(index) {
            Some(slot) if slot.as_ref() != Some(&node) => {
                *slot = Some(node);
                true
            }
            _ => false,
        }
    }

    /// Point every slot holding `dead` at `replacement`. Returns the count.
    pub fn replace_all(&mut self, dead: &RemoteNode, replacement: &RemoteNode) -> usize {
        let mut replaced = 0;
        for slot in self.entries.iter_mut() {
            if slot.as_ref() == Some(dead) {
                *slot = Some(replacement.clone());
                replaced += 1;
            }
        }
        replaced
    }

    /// First populated slot at index >= 1 that is not `excluded`.
    pub fn first_backup(&self, excluded: &RemoteNode) -> Option<&RemoteNode> {
        self.entries
            .iter()
            .skip(1)
            .flatten()
            .find(|node| *node != excluded)
    }

    /// Highest finger strictly inside `(local, target)`, or `local` if none.
    ///
    /// Scans from the top slot down and fails on the first uninitialized slot
    /// it has to inspect.
    pub fn closest_preceding_node(
        &self,
        space: &KeySpace,
        local: &RemoteNode,
        target: Key,
    ) -> Result<RemoteNode, ChordError> {
        for (index, slot) in self.entries.iter().enumerate().rev() {
            let finger = slot
                .as_ref()
                .ok_or(ChordError::UninitializedFinger { index })?;
            if space.between(finger.key, local.key, target) {
                return Ok(finger.clone());
            }
        }
        Ok(local.clone())
    }
}
