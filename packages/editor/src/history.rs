//! # Undo/Redo History
//!
//! Snapshot-based history for one document.
//!
//! ## Design
//!
//! - Before a successful edit the caller records a full snapshot of the
//!   section being edited, tagged with metadata describing the edit
//! - Undo hands back the most recent snapshot and files the current state
//!   under the redo stack with the same metadata
//! - Redo is the mirror image
//! - New entries clear the redo stack
//! - Batches group a gesture (several edits) into one undo step
//!
//! Snapshots are owned deep copies; nothing handed out aliases the live tree.
//!
//! ## Example
//!
//! ```rust
//! use stencil_editor::{History, HistoryMetadata, Section};
//! use stencil_tree::{ComponentType, Node, Tree};
//!
//! let mut history = History::new();
//! let mut tree = Tree::with_root(Node::new("page", ComponentType::Column));
//!
//! let before = tree.clone();
//! tree.add_component("page", Node::new("title", ComponentType::Text), None)?;
//! history.push_state(&before, HistoryMetadata::new("add_component", Section::Content));
//!
//! let entry = history.undo(&tree).unwrap();
//! assert_eq!(entry.snapshot, before);
//! # Ok::<(), stencil_tree::MutationError>(())
//! ```

use crate::config::DEFAULT_MAX_HISTORY_SIZE;
use crate::document::Section;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use stencil_tree::{ComponentType, NodeId, Tree};
use tracing::debug;

/// What an entry was recorded for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMetadata {
    pub action: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<ComponentType>,
    /// Section the snapshot belongs to
    pub section: Section,
}

impl HistoryMetadata {
    pub fn new(action: impl Into<String>, section: Section) -> Self {
        Self {
            action: action.into(),
            timestamp: Utc::now(),
            node_id: None,
            node_type: None,
            section,
        }
    }

    pub fn with_node(mut self, node_id: impl Into<NodeId>, node_type: Option<ComponentType>) -> Self {
        self.node_id = Some(node_id.into());
        self.node_type = node_type;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub snapshot: Tree,
    pub metadata: HistoryMetadata,
}

/// Undo/redo stacks of snapshots
#[derive(Debug)]
pub struct History {
    /// Most recent last; the oldest entry is evicted past `max_size`
    past: VecDeque<HistoryEntry>,

    /// Most recent last
    future: Vec<HistoryEntry>,

    max_size: usize,

    /// Pre-gesture snapshot while a batch is open
    batch: Option<HistoryEntry>,

    /// Set while an undo/redo result is being written back
    applying: bool,
}

impl History {
    /// Create a history keeping the default number of levels (50)
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_HISTORY_SIZE)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            max_size: max_size.max(1),
            batch: None,
            applying: false,
        }
    }

    /// Record the state before an edit.
    ///
    /// Returns `false` without recording while a batch is open or while an
    /// undo/redo is being applied.
    pub fn push_state(&mut self, snapshot: &Tree, metadata: HistoryMetadata) -> bool {
        if !self.is_recording() {
            return false;
        }
        self.push_entry(HistoryEntry {
            snapshot: snapshot.clone(),
            metadata,
        });
        true
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        debug!(action = %entry.metadata.action, section = %entry.metadata.section, "Recorded history entry");
        self.past.push_back(entry);

        while self.past.len() > self.max_size {
            self.past.pop_front();
        }

        // New action invalidates future
        self.future.clear();
    }

    /// Step back: returns the snapshot to restore and files `current` for redo
    pub fn undo(&mut self, current: &Tree) -> Option<HistoryEntry> {
        let entry = self.past.pop_back()?;
        self.future.push(HistoryEntry {
            snapshot: current.clone(),
            metadata: entry.metadata.clone(),
        });
        debug!(action = %entry.metadata.action, "Undo");
        Some(entry)
    }

    /// Step forward: returns the snapshot to restore and files `current` for undo
    pub fn redo(&mut self, current: &Tree) -> Option<HistoryEntry> {
        let entry = self.future.pop()?;
        self.past.push_back(HistoryEntry {
            snapshot: current.clone(),
            metadata: entry.metadata.clone(),
        });
        while self.past.len() > self.max_size {
            self.past.pop_front();
        }
        debug!(action = %entry.metadata.action, "Redo");
        Some(entry)
    }

    /// Start grouping edits into one undo step.
    ///
    /// `snapshot` is the state before the gesture. Recording is paused until
    /// [`History::end_batch`] or [`History::cancel_batch`]. Opening a batch
    /// while one is open keeps the first snapshot.
    pub fn begin_batch(&mut self, snapshot: &Tree, metadata: HistoryMetadata) {
        if self.batch.is_some() {
            return;
        }
        self.batch = Some(HistoryEntry {
            snapshot: snapshot.clone(),
            metadata,
        });
    }

    /// Close the batch, recording one entry if `current` differs from the
    /// pre-gesture state. Returns whether an entry was recorded.
    pub fn end_batch(&mut self, current: &Tree) -> bool {
        let Some(entry) = self.batch.take() else {
            return false;
        };
        if entry.snapshot == *current {
            debug!(action = %entry.metadata.action, "Batch made no changes");
            return false;
        }
        self.push_entry(entry);
        true
    }

    /// Abandon the batch without recording; returns the pre-gesture entry
    pub fn cancel_batch(&mut self) -> Option<HistoryEntry> {
        self.batch.take()
    }

    pub fn in_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// Section the open batch was started in
    pub fn batch_section(&self) -> Option<Section> {
        self.batch.as_ref().map(|b| b.metadata.section)
    }

    pub fn set_applying(&mut self, applying: bool) {
        self.applying = applying;
    }

    pub fn is_applying(&self) -> bool {
        self.applying
    }

    /// Whether [`History::push_state`] would record
    pub fn is_recording(&self) -> bool {
        self.batch.is_none() && !self.applying
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.past.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Metadata of the entry the next undo would restore
    pub fn peek_undo(&self) -> Option<&HistoryMetadata> {
        self.past.back().map(|entry| &entry.metadata)
    }

    pub fn peek_redo(&self) -> Option<&HistoryMetadata> {
        self.future.last().map(|entry| &entry.metadata)
    }

    /// Clear all undo/redo history, including an open batch
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.batch = None;
        self.applying = false;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
