//! # Tree mutations
//!
//! Structural and configuration edits on a single [`Tree`].
//!
//! ## Semantics
//!
//! - Every operation validates completely before it changes anything, so a
//!   rejected call leaves the tree exactly as it was.
//! - Success returns the id of the node the operation was about (the new id
//!   for inserts and duplicates).
//! - Moves relink the existing node; nothing is cloned. Duplicates and pastes
//!   clone with fresh ids.
//! - A wrapper holds its child in a single slot. Inserting into a wrapper
//!   through [`Tree::add_component`] fills that slot and fails once it is
//!   occupied.

use crate::component::ComponentType;
use crate::error::{MutationError, MutationResult, TreeViolation};
use crate::id_generator::IdGenerator;
use crate::node::{NodeId, RepeatBinding, Slot};
use crate::tree::Tree;
use crate::value::{Properties, PropertyValue, Style};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::ops::ControlFlow;
use tracing::{debug, warn};

/// Field-level update for [`Tree::update_component`]
///
/// `None` leaves a field untouched. For optional node fields,
/// `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,

    /// Must match the current type if given; types are immutable
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub style: Option<Option<Style>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub visible: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub repeat: Option<Option<RepeatBinding>>,
}

/// Distinguish an explicit `null` (clear) from an absent key (keep)
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn log_rejection(op: &'static str, id: &str, error: &MutationError) {
    warn!(op, node_id = %id, error = %error, "Mutation rejected");
}

impl Tree {
    /// Install `fragment` as the root of an empty tree
    pub fn insert_root(&mut self, fragment: impl Into<Tree>) -> MutationResult {
        let fragment = fragment.into();
        if !self.is_empty() {
            return Err(MutationError::RootOccupied);
        }
        let Some(root) = fragment.root_id().map(str::to_string) else {
            return Err(MutationError::EmptyFragment);
        };

        *self = fragment;
        debug!(node_id = %root, "Inserted root");
        Ok(root)
    }

    /// Check that `parent_id` can take one more child of `child_type`
    pub fn can_add_child(&self, parent_id: &str, child_type: ComponentType) -> Result<(), MutationError> {
        let parent = self
            .get(parent_id)
            .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;

        match parent.slot() {
            Slot::Leaf => Err(MutationError::LeafParent(parent_id.to_string())),
            Slot::Wrapper { child: Some(_) } => {
                Err(MutationError::WrapperOccupied(parent_id.to_string()))
            }
            Slot::Wrapper { child: None } | Slot::Container { .. } => {
                if child_type.accepts_parent(parent.component()) {
                    Ok(())
                } else {
                    Err(MutationError::ParentTypeNotAllowed {
                        child: child_type,
                        parent: parent.component(),
                    })
                }
            }
        }
    }

    /// Check that `node_id` can be relocated under `new_parent_id`
    pub fn can_move(&self, node_id: &str, new_parent_id: &str) -> Result<(), MutationError> {
        let node = self
            .get(node_id)
            .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;
        if !self.contains(new_parent_id) {
            return Err(MutationError::ParentNotFound(new_parent_id.to_string()));
        }
        if node.parent_id().is_none() {
            return Err(MutationError::CannotMoveRoot);
        }
        if self.would_create_cycle(node_id, new_parent_id) {
            return Err(MutationError::CycleDetected {
                node_id: node_id.to_string(),
                parent_id: new_parent_id.to_string(),
            });
        }

        // Moving within the same wrapper frees the slot before refilling it
        if node.parent_id() == Some(new_parent_id)
            && self.get(new_parent_id).map(|p| p.component().is_wrapper()) == Some(true)
        {
            return Ok(());
        }

        self.can_add_child(new_parent_id, node.component())
    }

    /// Insert a detached node or subtree under `parent_id`.
    ///
    /// Containers insert at `index` (clamped, default append); wrappers take
    /// the fragment as their single child.
    pub fn add_component(
        &mut self,
        parent_id: &str,
        fragment: impl Into<Tree>,
        index: Option<usize>,
    ) -> MutationResult {
        let fragment = fragment.into();
        let result = self.check_insert(parent_id, &fragment);
        if let Err(e) = &result {
            log_rejection("add_component", parent_id, e);
        }
        let root = result?;

        self.absorb(fragment);
        self.link(parent_id, &root, index);
        debug!(node_id = %root, parent_id, "Added component");
        Ok(root)
    }

    /// Attach a detached node or subtree as the single child of a wrapper
    pub fn add_component_as_child(&mut self, parent_id: &str, fragment: impl Into<Tree>) -> MutationResult {
        let is_wrapper = self
            .get(parent_id)
            .map(|parent| parent.component().is_wrapper())
            .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;
        if !is_wrapper {
            return Err(MutationError::NotAWrapper(parent_id.to_string()));
        }
        self.add_component(parent_id, fragment, None)
    }

    fn check_insert(&self, parent_id: &str, fragment: &Tree) -> MutationResult {
        let root = fragment.root().ok_or(MutationError::EmptyFragment)?;
        self.can_add_child(parent_id, root.component())?;
        if let Some(taken) = fragment.ids().find(|id| self.contains(id)) {
            return Err(MutationError::DuplicateId(taken.to_string()));
        }
        Ok(root.id().to_string())
    }

    /// Apply a field-level update to an existing node
    pub fn update_component(&mut self, id: &str, update: NodeUpdate) -> MutationResult {
        let node = self
            .get(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;

        if let Some(component) = update.component {
            if component != node.component() {
                let err = MutationError::TypeChange(id.to_string());
                log_rejection("update_component", id, &err);
                return Err(err);
            }
        }
        if let Some(new_id) = update.id.as_deref() {
            if new_id != id && self.contains(new_id) {
                let err = MutationError::DuplicateId(new_id.to_string());
                log_rejection("update_component", id, &err);
                return Err(err);
            }
        }

        let Some(node) = self.node_mut(id) else {
            return Err(MutationError::NodeNotFound(id.to_string()));
        };
        if let Some(properties) = update.properties {
            node.properties = properties;
        }
        if let Some(style) = update.style {
            node.style = style;
        }
        if let Some(visible) = update.visible {
            node.visible = visible;
        }
        if let Some(repeat) = update.repeat {
            node.repeat = repeat;
        }

        let final_id = match update.id {
            Some(new_id) if new_id != id => {
                self.rename(id, &new_id);
                new_id
            }
            _ => id.to_string(),
        };
        debug!(node_id = %final_id, "Updated component");
        Ok(final_id)
    }

    /// Re-key a node and every reference to it. `new_id` must be unused.
    fn rename(&mut self, old_id: &str, new_id: &str) {
        let (mut nodes, mut root) = std::mem::take(self).into_parts();
        let Some(mut node) = nodes.remove(old_id) else {
            *self = Tree::from_parts(nodes, root);
            return;
        };
        node.id = new_id.to_string();

        if let Some(parent) = node.parent.as_deref().and_then(|p| nodes.get_mut(p)) {
            match &mut parent.slot {
                Slot::Leaf => {}
                Slot::Wrapper { child } => *child = Some(new_id.to_string()),
                Slot::Container { children } => {
                    for child in children.iter_mut().filter(|c| c.as_str() == old_id) {
                        *child = new_id.to_string();
                    }
                }
            }
        }
        for child in node.slot.ids() {
            if let Some(child) = nodes.get_mut(child) {
                child.parent = Some(new_id.to_string());
            }
        }
        if root.as_deref() == Some(old_id) {
            root = Some(new_id.to_string());
        }

        nodes.insert(new_id.to_string(), node);
        *self = Tree::from_parts(nodes, root);
    }

    /// Set a single property
    pub fn update_component_property(
        &mut self,
        id: &str,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> MutationResult {
        let node = self
            .node_mut(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;
        node.properties.insert(key.into(), value.into());
        Ok(id.to_string())
    }

    /// Shallow-merge `properties` into the node's property map
    pub fn update_component_properties(&mut self, id: &str, properties: Properties) -> MutationResult {
        let node = self
            .node_mut(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;
        node.properties.extend(properties);
        Ok(id.to_string())
    }

    /// Remove a node and its subtree; deleting the root clears the tree
    pub fn delete_component(&mut self, id: &str) -> MutationResult {
        if !self.contains(id) {
            let err = MutationError::NodeNotFound(id.to_string());
            log_rejection("delete_component", id, &err);
            return Err(err);
        }

        if self.root_id() == Some(id) {
            self.clear();
            debug!(node_id = %id, "Deleted root, tree cleared");
            return Ok(id.to_string());
        }

        self.unlink(id);
        let removed = self.remove_subtree(id);
        debug!(node_id = %id, removed, "Deleted component");
        Ok(id.to_string())
    }

    /// Relocate `id` under `new_parent_id` at `index` (clamped)
    ///
    /// `index` refers to the parent's children after `id` has been detached.
    pub fn move_component(&mut self, id: &str, new_parent_id: &str, index: usize) -> MutationResult {
        if let Err(e) = self.can_move(id, new_parent_id) {
            log_rejection("move_component", id, &e);
            return Err(e);
        }

        self.unlink(id);
        self.link(new_parent_id, id, Some(index));
        debug!(node_id = %id, new_parent_id, index, "Moved component");
        Ok(id.to_string())
    }

    /// Clone the subtree at `id` with fresh ids and insert it right after the
    /// original. Returns the id of the clone's root.
    pub fn duplicate_component(&mut self, id: &str, ids: &mut IdGenerator) -> MutationResult {
        let node = self
            .get(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;
        let Some(parent_id) = node.parent_id().map(str::to_string) else {
            let err = MutationError::CannotDuplicateRoot;
            log_rejection("duplicate_component", id, &err);
            return Err(err);
        };
        if !self.get(&parent_id).is_some_and(|p| p.component().is_container()) {
            let err = MutationError::NotAContainer(id.to_string());
            log_rejection("duplicate_component", id, &err);
            return Err(err);
        }
        let index = self
            .index_in_parent(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;

        let taken: HashSet<&str> = self.ids().collect();
        let clone = self
            .clone_with_new_ids(id, || ids.next_unused(|candidate| taken.contains(candidate)))
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;
        let Some(clone_id) = clone.root_id().map(str::to_string) else {
            return Err(MutationError::EmptyFragment);
        };
        drop(taken);

        self.absorb(clone);
        self.link(&parent_id, &clone_id, Some(index + 1));
        debug!(node_id = %id, clone_id = %clone_id, "Duplicated component");
        Ok(clone_id)
    }

    /// Move `id` to `new_index` within its container parent
    pub fn reorder_component(&mut self, id: &str, new_index: usize) -> MutationResult {
        let result = self.check_reorder(id, new_index);
        if let Err(e) = &result {
            log_rejection("reorder_component", id, e);
        }
        let parent_id = result?;

        self.unlink(id);
        self.link(&parent_id, id, Some(new_index));
        debug!(node_id = %id, new_index, "Reordered component");
        Ok(id.to_string())
    }

    fn check_reorder(&self, id: &str, new_index: usize) -> Result<NodeId, MutationError> {
        let node = self
            .get(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;
        let parent_id = node.parent_id().ok_or(MutationError::CannotReorderRoot)?;
        let parent = self
            .get(parent_id)
            .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;
        let Slot::Container { children } = parent.slot() else {
            return Err(MutationError::NotAContainer(id.to_string()));
        };
        if new_index >= children.len() {
            return Err(MutationError::IndexOutOfRange {
                index: new_index,
                len: children.len(),
            });
        }
        Ok(parent_id.to_string())
    }

    /// Full consistency scan. Advisory: mutations never call it.
    ///
    /// Reports the first violation found and repairs nothing.
    pub fn validate_tree(&self) -> Result<(), TreeViolation> {
        if let Some(duplicate) = self.find_duplicate_ids().into_iter().next() {
            return Err(TreeViolation::DuplicateId(duplicate));
        }

        let Some(root_id) = self.root_id() else {
            return match self.ids().next() {
                Some(orphan) => Err(TreeViolation::Unreachable(orphan.to_string())),
                None => Ok(()),
            };
        };
        let root = self
            .get(root_id)
            .ok_or_else(|| TreeViolation::MissingRoot(root_id.to_string()))?;
        if root.parent_id().is_some() {
            return Err(TreeViolation::RootHasParent(root_id.to_string()));
        }

        for node in self.nodes().values() {
            if node.kind() != node.component().kind() {
                return Err(TreeViolation::KindMismatch {
                    id: node.id().to_string(),
                    component: node.component(),
                    found: node.kind(),
                });
            }
            if self.ancestor_ids(node.id()).iter().any(|a| a == node.id()) {
                return Err(TreeViolation::Cycle(node.id().to_string()));
            }
            for child_id in node.child_ids() {
                let child = self.get(child_id).ok_or_else(|| TreeViolation::DanglingChild {
                    parent_id: node.id().to_string(),
                    child_id: child_id.clone(),
                })?;
                if child.parent_id() != Some(node.id()) {
                    return Err(TreeViolation::BrokenParentLink {
                        parent_id: node.id().to_string(),
                        child_id: child_id.clone(),
                    });
                }
                if !child.component().accepts_parent(node.component()) {
                    return Err(TreeViolation::ParentTypeNotAllowed {
                        id: child_id.clone(),
                        child: child.component(),
                        parent: node.component(),
                    });
                }
            }
        }

        let mut reachable = HashSet::new();
        self.traverse(|visit| {
            reachable.insert(visit.node.id().to_string());
            ControlFlow::Continue(())
        });
        if let Some(orphan) = self.ids().find(|id| !reachable.contains(*id)) {
            return Err(TreeViolation::Unreachable(orphan.to_string()));
        }

        Ok(())
    }
}
