//! # Clipboard
//!
//! Holds deep copies of subtrees between a copy/cut and a paste. Every paste
//! hands out fresh clones with newly generated ids, so the same entry can be
//! pasted repeatedly without id collisions.
//!
//! A cut does not touch the tree. The session deletes the cut sources once a
//! paste has gone through, after which the entry behaves like a copy.

use crate::document::Section;
use stencil_tree::{NodeId, Tree};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardOperation {
    Copy,
    Cut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardEntry {
    /// One independent tree per copied subtree, in selection order
    pub fragments: Vec<Tree>,
    pub operation: ClipboardOperation,
    pub source_ids: Vec<NodeId>,
    pub source_section: Section,
}

#[derive(Debug, Default)]
pub struct Clipboard {
    entry: Option<ClipboardEntry>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the subtrees at `ids`; returns how many were captured
    pub fn copy(&mut self, tree: &Tree, ids: &[NodeId], section: Section) -> usize {
        self.capture(tree, ids, section, ClipboardOperation::Copy)
    }

    /// Like [`Clipboard::copy`], marking the sources for deletion on paste
    pub fn cut(&mut self, tree: &Tree, ids: &[NodeId], section: Section) -> usize {
        self.capture(tree, ids, section, ClipboardOperation::Cut)
    }

    fn capture(
        &mut self,
        tree: &Tree,
        ids: &[NodeId],
        section: Section,
        operation: ClipboardOperation,
    ) -> usize {
        // A node whose ancestor is also selected travels with that ancestor
        let roots: Vec<&NodeId> = ids
            .iter()
            .filter(|id| tree.contains(id))
            .filter(|id| !tree.ancestor_ids(id).iter().any(|a| ids.contains(a)))
            .collect();

        let mut source_ids = Vec::new();
        let mut fragments = Vec::new();
        for id in roots {
            if source_ids.contains(id) {
                continue;
            }
            if let Some(fragment) = tree.extract_subtree(id) {
                fragments.push(fragment);
                source_ids.push(id.clone());
            }
        }

        debug!(?operation, count = fragments.len(), %section, "Captured clipboard entry");
        let count = fragments.len();
        self.entry = (!fragments.is_empty()).then(|| ClipboardEntry {
            fragments,
            operation,
            source_ids,
            source_section: section,
        });
        count
    }

    /// Fresh clones of every fragment, each id replaced by `fresh_id()`
    pub fn get_for_paste<F>(&self, mut fresh_id: F) -> Option<Vec<Tree>>
    where
        F: FnMut() -> NodeId,
    {
        let entry = self.entry.as_ref()?;
        entry
            .fragments
            .iter()
            .map(|fragment| {
                let root = fragment.root_id()?;
                fragment.clone_with_new_ids(root, &mut fresh_id)
            })
            .collect()
    }

    pub fn entry(&self) -> Option<&ClipboardEntry> {
        self.entry.as_ref()
    }

    /// Cut sources still awaiting deletion
    pub fn pending_cut(&self) -> Option<(Section, &[NodeId])> {
        match &self.entry {
            Some(entry) if entry.operation == ClipboardOperation::Cut => {
                Some((entry.source_section, entry.source_ids.as_slice()))
            }
            _ => None,
        }
    }

    /// Turn a pasted cut into a copy so its sources are deleted only once
    pub(crate) fn settle_cut(&mut self) {
        if let Some(entry) = &mut self.entry {
            entry.operation = ClipboardOperation::Copy;
        }
    }

    pub fn has_content(&self) -> bool {
        self.entry.is_some()
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}
