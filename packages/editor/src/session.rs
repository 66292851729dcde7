//! # Edit Session
//!
//! One editor's view of a document: the document itself, its undo history,
//! the clipboard, the current selection and the id generator for new nodes.
//!
//! Every edit runs against the active section. A successful edit records the
//! section's state from just before the edit; a rejected edit records nothing
//! and leaves the document untouched.
//!
//! ```text
//! Mutation ─▶ EditSession ─▶ Tree (active section)
//!                 │   │
//!                 │   └──▶ History (pre-edit snapshot)
//!                 └──────▶ selection pruned to surviving nodes
//! ```

use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::document::{Document, Section};
use crate::drag_drop::{calculate_insertion_position, validate_drop, DropPosition, InsertionPoint};
use crate::history::{History, HistoryEntry, HistoryMetadata};
use crate::{EditorError, Mutation};
use stencil_tree::{
    ComponentType, IdGenerator, MutationError, MutationResult, Node, NodeId, NodeUpdate,
    Properties, PropertyValue, Tree,
};
use tracing::{debug, info, instrument};

/// Single edit session over one document
#[derive(Debug)]
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    document: Document,
    history: History,
    clipboard: Clipboard,

    /// Selected node ids in the active section, in selection order
    selected_nodes: Vec<NodeId>,

    ids: IdGenerator,
}

/// Outcome of [`EditSession::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Document version after the command
    pub version: u64,

    /// Nodes the command produced or touched
    pub node_ids: Vec<NodeId>,
}

impl EditSession {
    pub fn new(id: impl Into<String>, document: Document) -> Self {
        Self::with_config(id, document, &EditorConfig::default())
    }

    pub fn with_config(id: impl Into<String>, document: Document, config: &EditorConfig) -> Self {
        let id = id.into();
        let ids = match &config.id_seed {
            Some(seed) => IdGenerator::from_seed(seed.clone()),
            None => {
                let name = document
                    .path
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| id.clone());
                IdGenerator::new(&name)
            }
        };

        Self {
            id,
            document,
            history: History::with_max_size(config.max_history_size),
            clipboard: Clipboard::new(),
            selected_nodes: Vec::new(),
            ids,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct access to the document. Edits made here bypass history.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Tree of the active section
    pub fn tree(&self) -> &Tree {
        self.document.tree()
    }

    /// Fresh id unused in the active section
    pub fn new_id(&mut self) -> NodeId {
        let tree = self.document.tree();
        self.ids.next_unused(|id| tree.contains(id))
    }

    // ---- Edits ----

    /// Run `edit` on the active section and record it if it succeeds
    fn record<F>(&mut self, action: &'static str, edit: F) -> Result<NodeId, EditorError>
    where
        F: FnOnce(&mut Tree, &mut IdGenerator) -> MutationResult,
    {
        let section = self.document.active_section();
        let before = self
            .history
            .is_recording()
            .then(|| self.document.tree().clone());

        let node_id = edit(self.document.tree_mut(), &mut self.ids)?;
        self.commit(action, section, before.as_ref(), &node_id);
        Ok(node_id)
    }

    fn commit(&mut self, action: &'static str, section: Section, before: Option<&Tree>, node_id: &str) {
        if let Some(before) = before {
            let node_type = self
                .document
                .section(section)
                .get(node_id)
                .or_else(|| before.get(node_id))
                .map(Node::component);
            let metadata = HistoryMetadata::new(action, section).with_node(node_id, node_type);
            self.history.push_state(before, metadata);
        }
        self.document.touch();
        self.prune_selection();
        debug!(action, node_id, version = self.document.version, "Edit committed");
    }

    /// Install a root in the empty active section
    #[instrument(skip(self, fragment))]
    pub fn insert_root(&mut self, fragment: impl Into<Tree>) -> Result<NodeId, EditorError> {
        let fragment = fragment.into();
        self.record("insert_root", |tree, _| tree.insert_root(fragment))
    }

    #[instrument(skip(self, fragment))]
    pub fn add_component(
        &mut self,
        parent_id: &str,
        fragment: impl Into<Tree>,
        index: Option<usize>,
    ) -> Result<NodeId, EditorError> {
        let fragment = fragment.into();
        self.record("add_component", |tree, _| {
            tree.add_component(parent_id, fragment, index)
        })
    }

    #[instrument(skip(self, fragment))]
    pub fn add_component_as_child(
        &mut self,
        parent_id: &str,
        fragment: impl Into<Tree>,
    ) -> Result<NodeId, EditorError> {
        let fragment = fragment.into();
        self.record("add_component_as_child", |tree, _| {
            tree.add_component_as_child(parent_id, fragment)
        })
    }

    /// Apply a field-level update; a renamed node stays selected under its new id
    #[instrument(skip(self, update))]
    pub fn update_component(&mut self, node_id: &str, update: NodeUpdate) -> Result<NodeId, EditorError> {
        let was_selected = self.selected_nodes.iter().any(|id| id == node_id);
        let final_id = self.record("update_component", |tree, _| {
            tree.update_component(node_id, update)
        })?;
        if was_selected && final_id != node_id && !self.selected_nodes.contains(&final_id) {
            self.selected_nodes.push(final_id.clone());
        }
        Ok(final_id)
    }

    #[instrument(skip(self, value))]
    pub fn update_component_property(
        &mut self,
        node_id: &str,
        key: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<NodeId, EditorError> {
        let value = value.into();
        self.record("update_component_property", |tree, _| {
            tree.update_component_property(node_id, key, value)
        })
    }

    #[instrument(skip(self, properties))]
    pub fn update_component_properties(
        &mut self,
        node_id: &str,
        properties: Properties,
    ) -> Result<NodeId, EditorError> {
        self.record("update_component_properties", |tree, _| {
            tree.update_component_properties(node_id, properties)
        })
    }

    #[instrument(skip(self))]
    pub fn delete_component(&mut self, node_id: &str) -> Result<NodeId, EditorError> {
        self.record("delete_component", |tree, _| tree.delete_component(node_id))
    }

    #[instrument(skip(self))]
    pub fn move_component(
        &mut self,
        node_id: &str,
        new_parent_id: &str,
        index: usize,
    ) -> Result<NodeId, EditorError> {
        self.record("move_component", |tree, _| {
            tree.move_component(node_id, new_parent_id, index)
        })
    }

    #[instrument(skip(self))]
    pub fn duplicate_component(&mut self, node_id: &str) -> Result<NodeId, EditorError> {
        self.record("duplicate_component", |tree, ids| {
            tree.duplicate_component(node_id, ids)
        })
    }

    #[instrument(skip(self))]
    pub fn reorder_component(&mut self, node_id: &str, new_index: usize) -> Result<NodeId, EditorError> {
        self.record("reorder_component", |tree, _| {
            tree.reorder_component(node_id, new_index)
        })
    }

    // ---- Drag and drop ----

    fn resolve_drop(
        &self,
        dragged_type: ComponentType,
        dragged_id: Option<&str>,
        target_id: &str,
        position: DropPosition,
    ) -> Result<InsertionPoint, EditorError> {
        let tree = self.document.tree();
        let validation = validate_drop(tree, dragged_type, dragged_id, target_id);
        if !validation.allows(position) {
            let reason = validation
                .reason
                .unwrap_or_else(|| format!("Cannot drop {} '{}'", position, target_id));
            return Err(EditorError::DropRejected(reason));
        }
        calculate_insertion_position(tree, target_id, position)
            .ok_or_else(|| EditorError::NoInsertionPoint(target_id.to_string()))
    }

    /// Move an existing node to a drop position relative to `target_id`
    #[instrument(skip(self))]
    pub fn drop_node(
        &mut self,
        node_id: &str,
        target_id: &str,
        position: DropPosition,
    ) -> Result<NodeId, EditorError> {
        let tree = self.document.tree();
        let dragged = tree
            .get(node_id)
            .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;
        let point = self.resolve_drop(dragged.component(), Some(node_id), target_id, position)?;

        // The insertion index counts the dragged node; moves detach it first
        let index = match tree.index_in_parent(node_id) {
            Some(current) if dragged.parent_id() == Some(point.parent_id.as_str()) && current < point.index => {
                point.index - 1
            }
            _ => point.index,
        };

        self.record("drop_node", |tree, _| {
            tree.move_component(node_id, &point.parent_id, index)
        })
    }

    /// Insert a new component at a drop position relative to `target_id`
    #[instrument(skip(self, fragment))]
    pub fn drop_new(
        &mut self,
        fragment: impl Into<Tree>,
        target_id: &str,
        position: DropPosition,
    ) -> Result<NodeId, EditorError> {
        let fragment = fragment.into();
        let dragged_type = fragment
            .root()
            .map(Node::component)
            .ok_or(MutationError::EmptyFragment)?;
        let point = self.resolve_drop(dragged_type, None, target_id, position)?;

        self.record("drop_new", |tree, _| {
            tree.add_component(&point.parent_id, fragment, Some(point.index))
        })
    }

    // ---- Clipboard ----

    /// Copy subtrees of the active section; returns how many were captured
    pub fn copy(&mut self, node_ids: &[NodeId]) -> usize {
        let section = self.document.active_section();
        self.clipboard.copy(self.document.tree(), node_ids, section)
    }

    /// Mark subtrees for moving; they are removed when the paste succeeds
    pub fn cut(&mut self, node_ids: &[NodeId]) -> usize {
        let section = self.document.active_section();
        self.clipboard.cut(self.document.tree(), node_ids, section)
    }

    /// Paste the clipboard under `parent_id`, consecutively from `index`.
    ///
    /// Either every fragment lands or none does. Pasting a cut deletes its
    /// sources; within the same section that is part of the same undo step.
    #[instrument(skip(self))]
    pub fn paste(&mut self, parent_id: &str, index: Option<usize>) -> Result<Vec<NodeId>, EditorError> {
        let section = self.document.active_section();

        if let Some((cut_section, sources)) = self.clipboard.pending_cut() {
            let tree = self.document.tree();
            let ancestors = tree.ancestor_ids(parent_id);
            if cut_section == section
                && sources
                    .iter()
                    .any(|source| source == parent_id || ancestors.contains(source))
            {
                return Err(EditorError::PasteIntoCutSource(parent_id.to_string()));
            }
        }

        let fragments = {
            let tree = self.document.tree();
            let ids = &mut self.ids;
            self.clipboard
                .get_for_paste(|| ids.next_unused(|id| tree.contains(id)))
                .ok_or(EditorError::ClipboardEmpty)?
        };

        let before = self.document.tree().clone();
        let mut pasted = Vec::with_capacity(fragments.len());
        let mut at = index;
        for fragment in fragments {
            match self.document.tree_mut().add_component(parent_id, fragment, at) {
                Ok(id) => {
                    pasted.push(id);
                    at = at.map(|i| i + 1);
                }
                Err(e) => {
                    *self.document.tree_mut() = before;
                    return Err(e.into());
                }
            }
        }

        let mut other_section = None;
        if let Some((cut_section, sources)) = self.clipboard.pending_cut() {
            let sources = sources.to_vec();
            if cut_section == section {
                remove_all(self.document.tree_mut(), &sources);
            } else {
                other_section = Some((cut_section, sources));
            }
            self.clipboard.settle_cut();
        }

        let first = pasted.first().cloned().unwrap_or_default();
        let recorded = self.history.is_recording().then_some(&before);
        self.commit("paste", section, recorded, &first);

        if let Some((cut_section, sources)) = other_section {
            let before = self.document.section(cut_section).clone();
            remove_all(self.document.section_mut(cut_section), &sources);
            let metadata = HistoryMetadata::new("cut", cut_section);
            self.history.push_state(&before, metadata);
            self.document.touch();
        }

        info!(count = pasted.len(), parent_id, "Pasted");
        Ok(pasted)
    }

    // ---- History ----

    /// Undo the most recent edit; returns whether anything was undone.
    ///
    /// An open gesture is closed first, so undo reverts it as a whole.
    #[instrument(skip(self))]
    pub fn undo(&mut self) -> bool {
        if self.history.is_applying() {
            return false;
        }
        self.end_gesture();

        let Some(section) = self.history.peek_undo().map(|m| m.section) else {
            return false;
        };
        let Some(entry) = self.history.undo(self.document.section(section)) else {
            return false;
        };
        self.restore(entry);
        true
    }

    /// Redo the most recently undone edit
    #[instrument(skip(self))]
    pub fn redo(&mut self) -> bool {
        if self.history.is_applying() {
            return false;
        }
        self.end_gesture();

        let Some(section) = self.history.peek_redo().map(|m| m.section) else {
            return false;
        };
        let Some(entry) = self.history.redo(self.document.section(section)) else {
            return false;
        };
        self.restore(entry);
        true
    }

    fn restore(&mut self, entry: HistoryEntry) {
        self.history.set_applying(true);
        self.document
            .replace_section(entry.metadata.section, entry.snapshot);
        self.history.set_applying(false);
        self.prune_selection();
    }

    /// Group the following edits into one undo step
    pub fn begin_gesture(&mut self, action: impl Into<String>) {
        let section = self.document.active_section();
        self.history
            .begin_batch(self.document.tree(), HistoryMetadata::new(action, section));
    }

    /// Close the open gesture; returns whether it was recorded
    pub fn end_gesture(&mut self) -> bool {
        let Some(section) = self.history.batch_section() else {
            return false;
        };
        self.history.end_batch(self.document.section(section))
    }

    /// Abandon the open gesture and revert its edits
    pub fn cancel_gesture(&mut self) -> bool {
        let Some(entry) = self.history.cancel_batch() else {
            return false;
        };
        if *self.document.section(entry.metadata.section) != entry.snapshot {
            self.restore(entry);
        }
        true
    }

    // ---- Selection ----

    /// Replace the selection, keeping only ids present in the active section
    pub fn select(&mut self, node_ids: Vec<NodeId>) {
        let tree = self.document.tree();
        let mut selected: Vec<NodeId> = Vec::with_capacity(node_ids.len());
        for id in node_ids {
            if tree.contains(&id) && !selected.contains(&id) {
                selected.push(id);
            }
        }
        self.selected_nodes = selected;
    }

    pub fn selected_nodes(&self) -> &[NodeId] {
        &self.selected_nodes
    }

    pub fn clear_selection(&mut self) {
        self.selected_nodes.clear();
    }

    fn prune_selection(&mut self) {
        let tree = self.document.tree();
        self.selected_nodes.retain(|id| tree.contains(id));
    }

    /// Switch sections. An open gesture is closed and the selection pruned.
    pub fn set_active_section(&mut self, section: Section) {
        self.end_gesture();
        self.document.set_active_section(section);
        self.prune_selection();
    }

    // ---- Queries ----

    /// Every id in the active section in document order
    pub fn all_node_ids(&self) -> Vec<NodeId> {
        let tree = self.document.tree();
        match tree.root_id() {
            Some(root) => std::iter::once(root.to_string())
                .chain(tree.descendant_ids(root))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn has_node(&self, node_id: &str) -> bool {
        self.document.tree().contains(node_id)
    }

    pub fn get_component(&self, node_id: &str) -> Option<&Node> {
        self.document.tree().get(node_id)
    }

    pub fn get_children(&self, node_id: &str) -> Vec<&Node> {
        self.document.tree().children(node_id).unwrap_or_default()
    }

    // ---- Commands ----

    /// Run a serialized edit command
    #[instrument(skip(self, mutation), fields(op = mutation.name()))]
    pub fn apply(&mut self, mutation: Mutation) -> Result<Applied, EditorError> {
        let node_ids = match mutation {
            Mutation::InsertRoot { node } => vec![self.insert_root(Tree::from_shape(&node)?)?],
            Mutation::AddComponent {
                parent_id,
                node,
                index,
            } => vec![self.add_component(&parent_id, Tree::from_shape(&node)?, index)?],
            Mutation::AddComponentAsChild { parent_id, node } => {
                vec![self.add_component_as_child(&parent_id, Tree::from_shape(&node)?)?]
            }
            Mutation::UpdateComponent { node_id, update } => {
                vec![self.update_component(&node_id, update)?]
            }
            Mutation::UpdateProperty {
                node_id,
                key,
                value,
            } => vec![self.update_component_property(&node_id, &key, value)?],
            Mutation::UpdateProperties {
                node_id,
                properties,
            } => vec![self.update_component_properties(&node_id, properties)?],
            Mutation::DeleteComponent { node_id } => vec![self.delete_component(&node_id)?],
            Mutation::MoveComponent {
                node_id,
                new_parent_id,
                index,
            } => vec![self.move_component(&node_id, &new_parent_id, index)?],
            Mutation::DuplicateComponent { node_id } => vec![self.duplicate_component(&node_id)?],
            Mutation::ReorderComponent { node_id, new_index } => {
                vec![self.reorder_component(&node_id, new_index)?]
            }
            Mutation::DropNode {
                node_id,
                target_id,
                position,
            } => vec![self.drop_node(&node_id, &target_id, position)?],
            Mutation::DropNew {
                node,
                target_id,
                position,
            } => vec![self.drop_new(Tree::from_shape(&node)?, &target_id, position)?],
            Mutation::Copy { node_ids } => {
                self.copy(&node_ids);
                self.clipboard_sources()
            }
            Mutation::Cut { node_ids } => {
                self.cut(&node_ids);
                self.clipboard_sources()
            }
            Mutation::Paste { parent_id, index } => self.paste(&parent_id, index)?,
            Mutation::Select { node_ids } => {
                self.select(node_ids);
                self.selected_nodes.clone()
            }
            Mutation::SetActiveSection { section } => {
                self.set_active_section(section);
                Vec::new()
            }
            Mutation::BeginGesture { action } => {
                self.begin_gesture(action);
                Vec::new()
            }
            Mutation::EndGesture => {
                self.end_gesture();
                Vec::new()
            }
            Mutation::CancelGesture => {
                self.cancel_gesture();
                Vec::new()
            }
            Mutation::Undo => {
                self.undo();
                Vec::new()
            }
            Mutation::Redo => {
                self.redo();
                Vec::new()
            }
        };

        Ok(Applied {
            version: self.document.version,
            node_ids,
        })
    }

    fn clipboard_sources(&self) -> Vec<NodeId> {
        self.clipboard
            .entry()
            .map(|entry| entry.source_ids.clone())
            .unwrap_or_default()
    }
}

/// Delete every id still present; ids inside an already deleted subtree are skipped
fn remove_all(tree: &mut Tree, ids: &[NodeId]) {
    for id in ids {
        if tree.contains(id) {
            let _ = tree.delete_component(id);
        }
    }
}
