//! # Tree traversal
//!
//! Tree-wide queries. These are the only routines that walk a whole tree;
//! the mutation engine, drop validation and the editor build on them instead
//! of walking slots themselves.
//!
//! Traversal is depth-first pre-order. A wrapper's single child is visited
//! like a one-element child list, at index 0.

use crate::node::{Node, NodeId, Slot};
use crate::tree::Tree;
use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;

/// One step of a traversal
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub node: &'a Node,
    /// Child indices from the root down to `node`
    pub path: &'a [usize],
    pub parent_id: Option<&'a str>,
    /// Root is at depth 0
    pub depth: usize,
}

impl Tree {
    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.get(id)
    }

    pub fn find_parent(&self, id: &str) -> Option<&Node> {
        let parent_id = self.get(id)?.parent_id()?;
        self.get(parent_id)
    }

    /// Index path from the root to `id`; empty for the root itself
    pub fn find_path(&self, id: &str) -> Option<Vec<usize>> {
        if !self.contains(id) {
            return None;
        }

        let mut path = Vec::new();
        let mut current = id;
        let mut steps = 0;
        while let Some(parent_id) = self.get(current)?.parent_id() {
            path.push(self.index_in_parent(current)?);
            current = parent_id;
            steps += 1;
            if steps > self.len() {
                return None;
            }
        }

        if Some(current) != self.root_id() {
            return None;
        }
        path.reverse();
        Some(path)
    }

    /// Walk the tree from the root; the visitor may break to stop early
    pub fn traverse<'a, F>(&'a self, mut visitor: F)
    where
        F: FnMut(Visit<'_>) -> ControlFlow<()>,
    {
        let Some(root) = self.root_id() else {
            return;
        };
        let mut seen = HashSet::new();
        let mut stack: Vec<(&'a str, Vec<usize>, Option<&'a str>, usize)> =
            vec![(root, Vec::new(), None, 0)];

        while let Some((id, path, parent_id, depth)) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(node) = self.get(id) else {
                continue;
            };

            let step = visitor(Visit {
                node,
                path: &path,
                parent_id,
                depth,
            });
            if step.is_break() {
                return;
            }

            for (index, child) in node.child_ids().iter().enumerate().rev() {
                let mut child_path = path.clone();
                child_path.push(index);
                stack.push((child.as_str(), child_path, Some(node.id()), depth + 1));
            }
        }
    }

    /// Ancestor ids of `id`, nearest first, ending with the root
    pub fn ancestor_ids(&self, id: &str) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.get(id).and_then(Node::parent_id);
        while let Some(parent_id) = current {
            if ancestors.len() > self.len() {
                break;
            }
            ancestors.push(parent_id.to_string());
            current = self.get(parent_id).and_then(Node::parent_id);
        }
        ancestors
    }

    /// Descendant ids of `id` in pre-order, excluding `id` itself
    pub fn descendant_ids(&self, id: &str) -> Vec<NodeId> {
        let mut descendants = Vec::new();
        let Some(node) = self.get(id) else {
            return descendants;
        };

        let mut seen = HashSet::new();
        let mut stack: Vec<&str> = node.child_ids().iter().rev().map(String::as_str).collect();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(child) = self.get(current) {
                descendants.push(current.to_string());
                stack.extend(child.child_ids().iter().rev().map(String::as_str));
            }
        }
        descendants
    }

    /// Number of nodes reachable from the root
    pub fn count_nodes(&self) -> usize {
        let mut count = 0;
        self.traverse(|_| {
            count += 1;
            ControlFlow::Continue(())
        });
        count
    }

    /// Number of levels; 0 for an empty tree, 1 for a lone root
    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        self.traverse(|visit| {
            deepest = deepest.max(visit.depth + 1);
            ControlFlow::Continue(())
        });
        deepest
    }

    /// True iff attaching `node_id` under `candidate_parent_id` would make a
    /// node its own ancestor
    pub fn would_create_cycle(&self, node_id: &str, candidate_parent_id: &str) -> bool {
        node_id == candidate_parent_id
            || self
                .ancestor_ids(candidate_parent_id)
                .iter()
                .any(|ancestor| ancestor == node_id)
    }

    /// Ids referenced more than once by the root pointer or any slot
    pub fn find_duplicate_ids(&self) -> Vec<NodeId> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        if let Some(root) = self.root_id() {
            *counts.entry(root).or_default() += 1;
        }
        for node in self.nodes().values() {
            for child in node.child_ids() {
                *counts.entry(child.as_str()).or_default() += 1;
            }
        }

        let mut duplicates: Vec<NodeId> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(id, _)| id.to_string())
            .collect();
        duplicates.sort();
        duplicates
    }

    /// Deep clone of the subtree at `id` where every node gets a fresh id
    ///
    /// Structure, types, properties, style, visibility and repeat bindings
    /// are preserved; only ids change.
    pub fn clone_with_new_ids<F>(&self, id: &str, mut fresh_id: F) -> Option<Tree>
    where
        F: FnMut() -> NodeId,
    {
        let subtree = self.extract_subtree(id)?;

        let mut mapping: HashMap<NodeId, NodeId> = HashMap::new();
        for old in std::iter::once(id.to_string()).chain(subtree.descendant_ids(id)) {
            mapping.insert(old, fresh_id());
        }
        let remap = |old: &str| mapping.get(old).cloned().unwrap_or_else(|| old.to_string());

        let (nodes, root) = subtree.into_parts();
        let mut remapped = HashMap::with_capacity(nodes.len());
        for (_, mut node) in nodes {
            node.id = remap(&node.id);
            node.parent = node.parent.as_deref().map(remap);
            match &mut node.slot {
                Slot::Leaf => {}
                Slot::Wrapper { child } => {
                    *child = child.as_deref().map(remap);
                }
                Slot::Container { children } => {
                    for child in children.iter_mut() {
                        *child = remap(child);
                    }
                }
            }
            remapped.insert(node.id.clone(), node);
        }

        Some(Tree::from_parts(remapped, root.as_deref().map(remap)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComponentType, IdGenerator};

    /// col
    /// ├── a (text)
    /// └── card (wrapper)
    ///     └── b (text)
    fn sample() -> Tree {
        let mut tree = Tree::with_root(Node::new("col", ComponentType::Column));
        tree.add_component("col", Node::new("a", ComponentType::Text), None)
            .unwrap();
        tree.add_component("col", Node::new("card", ComponentType::Card), None)
            .unwrap();
        tree.add_component("card", Node::new("b", ComponentType::Text), None)
            .unwrap();
        tree
    }

    #[test]
    fn test_traverse_is_preorder() {
        let tree = sample();
        let mut seen = Vec::new();
        tree.traverse(|visit| {
            seen.push((
                visit.node.id().to_string(),
                visit.path.to_vec(),
                visit.parent_id.map(str::to_string),
                visit.depth,
            ));
            ControlFlow::Continue(())
        });

        assert_eq!(
            seen,
            vec![
                ("col".to_string(), vec![], None, 0),
                ("a".to_string(), vec![0], Some("col".to_string()), 1),
                ("card".to_string(), vec![1], Some("col".to_string()), 1),
                ("b".to_string(), vec![1, 0], Some("card".to_string()), 2),
            ]
        );
    }

    #[test]
    fn test_traverse_stops_early() {
        let tree = sample();
        let mut visited = 0;
        tree.traverse(|visit| {
            visited += 1;
            if visit.node.id() == "a" {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(visited, 2);
    }

    #[test]
    fn test_find_helpers() {
        let tree = sample();
        assert_eq!(tree.find_parent("b").map(Node::id), Some("card"));
        assert!(tree.find_parent("col").is_none());
        assert_eq!(tree.find_path("b"), Some(vec![1, 0]));
        assert_eq!(tree.find_path("col"), Some(vec![]));
        assert_eq!(tree.find_path("missing"), None);
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let tree = sample();
        assert_eq!(tree.ancestor_ids("b"), vec!["card", "col"]);
        assert_eq!(tree.descendant_ids("col"), vec!["a", "card", "b"]);
        assert!(tree.descendant_ids("a").is_empty());
    }

    #[test]
    fn test_counts() {
        let tree = sample();
        assert_eq!(tree.count_nodes(), 4);
        assert_eq!(tree.max_depth(), 3);
        assert_eq!(Tree::new().max_depth(), 0);
    }

    #[test]
    fn test_would_create_cycle() {
        let tree = sample();
        assert!(tree.would_create_cycle("col", "col"));
        assert!(tree.would_create_cycle("col", "b"));
        assert!(tree.would_create_cycle("card", "b"));
        assert!(!tree.would_create_cycle("a", "card"));
    }

    #[test]
    fn test_no_duplicates_in_consistent_tree() {
        assert!(sample().find_duplicate_ids().is_empty());
    }

    #[test]
    fn test_clone_with_new_ids() {
        let tree = sample();
        let mut ids = IdGenerator::from_seed("copy");
        let clone = tree.clone_with_new_ids("card", || ids.new_id()).unwrap();

        assert_eq!(clone.len(), 2);
        assert!(clone.ids().all(|id| !tree.contains(id)));

        let root = clone.root().unwrap();
        assert_eq!(root.component(), ComponentType::Card);
        let child = clone.get(root.wrapped_child().unwrap()).unwrap();
        assert_eq!(child.component(), ComponentType::Text);
        assert_eq!(child.parent_id(), Some(root.id()));
    }
}
