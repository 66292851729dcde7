//! # Tree arena
//!
//! A [`Tree`] owns every node of one document section in a flat map keyed by
//! id. Parent/child relations are id references, so relinking a node is a
//! constant-time update and a node can never be shared between two trees.
//!
//! Structural fields of [`Node`] are crate-private: outside this crate the
//! tree can only change shape through the mutation engine
//! ([`crate::mutations`]), which validates before touching anything.

use crate::node::{Node, NodeId, Slot};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    nodes: HashMap<NodeId, Node>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree with a single root node
    pub fn with_root(node: Node) -> Self {
        Self::from(node)
    }

    pub fn root_id(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref().and_then(|id| self.nodes.get(id))
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's configuration fields
    ///
    /// Structural fields are not reachable through `&mut Node`, so this
    /// cannot break tree invariants.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// All ids in arbitrary order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Direct children of `parent_id` in order
    pub fn children(&self, parent_id: &str) -> Option<Vec<&Node>> {
        let parent = self.nodes.get(parent_id)?;
        Some(
            parent
                .child_ids()
                .iter()
                .filter_map(|id| self.nodes.get(id))
                .collect(),
        )
    }

    /// Position of `id` inside its parent's slot
    pub fn index_in_parent(&self, id: &str) -> Option<usize> {
        let parent_id = self.nodes.get(id)?.parent.as_deref()?;
        self.nodes
            .get(parent_id)?
            .child_ids()
            .iter()
            .position(|child| child == id)
    }

    /// Deep copy of the subtree rooted at `id` as an independent tree
    pub fn extract_subtree(&self, id: &str) -> Option<Tree> {
        if !self.contains(id) {
            return None;
        }

        let mut nodes = HashMap::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            stack.extend(node.child_ids().iter().cloned());
            nodes.insert(current, node.clone());
        }

        if let Some(root) = nodes.get_mut(id) {
            root.parent = None;
        }

        Some(Tree {
            nodes,
            root: Some(id.to_string()),
        })
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn nodes(&self) -> &HashMap<NodeId, Node> {
        &self.nodes
    }

    pub(crate) fn from_parts(nodes: HashMap<NodeId, Node>, root: Option<NodeId>) -> Self {
        Self { nodes, root }
    }

    pub(crate) fn into_parts(self) -> (HashMap<NodeId, Node>, Option<NodeId>) {
        (self.nodes, self.root)
    }

    pub(crate) fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    /// Unlink `id` from its parent's slot and return its former index.
    ///
    /// The node stays in the arena; callers either relink or remove it.
    pub(crate) fn unlink(&mut self, id: &str) -> Option<usize> {
        let parent_id = self.nodes.get_mut(id)?.parent.take()?;
        let parent = self.nodes.get_mut(&parent_id)?;

        match &mut parent.slot {
            Slot::Leaf => None,
            Slot::Wrapper { child } => {
                if child.as_deref() == Some(id) {
                    *child = None;
                    Some(0)
                } else {
                    None
                }
            }
            Slot::Container { children } => {
                let index = children.iter().position(|c| c == id)?;
                children.remove(index);
                Some(index)
            }
        }
    }

    /// Link an unattached arena node under `parent_id`.
    ///
    /// Container indices are clamped to the child count. Callers validate
    /// capacity first; a full wrapper or a leaf parent is left untouched.
    pub(crate) fn link(&mut self, parent_id: &str, id: &str, index: Option<usize>) -> bool {
        let Some(parent) = self.nodes.get_mut(parent_id) else {
            return false;
        };

        let linked = match &mut parent.slot {
            Slot::Leaf => false,
            Slot::Wrapper { child } => {
                if child.is_some() {
                    false
                } else {
                    *child = Some(id.to_string());
                    true
                }
            }
            Slot::Container { children } => {
                let at = index.unwrap_or(children.len()).min(children.len());
                children.insert(at, id.to_string());
                true
            }
        };

        if linked {
            if let Some(node) = self.nodes.get_mut(id) {
                node.parent = Some(parent_id.to_string());
            }
        }
        linked
    }

    /// Move every node of `fragment` into this arena without linking its root
    pub(crate) fn absorb(&mut self, fragment: Tree) -> Option<NodeId> {
        let (nodes, root) = fragment.into_parts();
        self.nodes.extend(nodes);
        root
    }

    /// Remove `id` and all of its descendants from the arena
    pub(crate) fn remove_subtree(&mut self, id: &str) -> usize {
        let mut removed = 0;
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.child_ids().iter().cloned());
                removed += 1;
            }
        }
        removed
    }
}

impl From<Node> for Tree {
    /// Wrap a node as a single-node tree, dropping any structural links it
    /// carried from another tree.
    fn from(mut node: Node) -> Self {
        node.parent = None;
        node.slot = Slot::for_kind(node.component.kind());

        let id = node.id.clone();
        let mut nodes = HashMap::new();
        nodes.insert(id.clone(), node);
        Tree {
            nodes,
            root: Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComponentType;

    fn column_with_two_texts() -> Tree {
        let mut tree = Tree::with_root(Node::new("col", ComponentType::Column));
        tree.absorb(Tree::from(Node::new("a", ComponentType::Text)));
        tree.absorb(Tree::from(Node::new("b", ComponentType::Text)));
        assert!(tree.link("col", "a", None));
        assert!(tree.link("col", "b", None));
        tree
    }

    #[test]
    fn test_link_and_unlink() {
        let mut tree = column_with_two_texts();
        assert_eq!(tree.root().unwrap().child_ids(), ["a", "b"]);
        assert_eq!(tree.get("b").unwrap().parent_id(), Some("col"));

        assert_eq!(tree.unlink("a"), Some(0));
        assert_eq!(tree.root().unwrap().child_ids(), ["b"]);
        assert_eq!(tree.get("a").unwrap().parent_id(), None);
    }

    #[test]
    fn test_link_refuses_full_wrapper() {
        let mut tree = Tree::with_root(Node::new("link", ComponentType::Hyperlink));
        tree.absorb(Tree::from(Node::new("a", ComponentType::Text)));
        tree.absorb(Tree::from(Node::new("b", ComponentType::Text)));

        assert!(tree.link("link", "a", None));
        assert!(!tree.link("link", "b", None));
        assert_eq!(tree.root().unwrap().wrapped_child(), Some("a"));
    }

    #[test]
    fn test_extract_subtree_is_independent() {
        let mut tree = column_with_two_texts();
        let copy = tree.extract_subtree("col").unwrap();

        tree.get_mut("a")
            .unwrap()
            .properties
            .insert("content".into(), "changed".into());

        assert_eq!(copy.len(), 3);
        assert!(copy.get("a").unwrap().properties.is_empty());
    }

    #[test]
    fn test_from_node_drops_links() {
        let tree = column_with_two_texts();
        let root = tree.root().unwrap().clone();

        let single = Tree::from(root);
        assert_eq!(single.len(), 1);
        assert!(single.root().unwrap().child_ids().is_empty());
    }

    #[test]
    fn test_remove_subtree_counts_nodes() {
        let mut tree = column_with_two_texts();
        assert_eq!(tree.remove_subtree("col"), 3);
        assert_eq!(tree.len(), 0);
    }
}
