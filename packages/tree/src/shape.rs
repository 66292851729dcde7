//! # Snapshot shape
//!
//! The nested, serializable form of a tree used for persistence and for
//! exchange with the rendering collaborator:
//!
//! ```json
//! { "id": "n1", "type": "column", "properties": {},
//!   "children": [ { "id": "n2", "type": "text", "properties": { "content": "Hi" } } ] }
//! ```
//!
//! Optional fields are omitted rather than written as `null`. Containers
//! always write `children` (possibly empty); wrappers write `child` only when
//! it is occupied; leaves write neither.

use crate::component::NodeKind;
use crate::error::LoadError;
use crate::node::{Node, RepeatBinding, Slot};
use crate::tree::Tree;
use crate::value::{Properties, Style};
use crate::ComponentType;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeShape {
    pub id: String,
    #[serde(rename = "type")]
    pub component: ComponentType,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeShape>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<Box<NodeShape>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_as: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_index: Option<String>,
}

impl NodeShape {
    pub fn new(id: impl Into<String>, component: ComponentType) -> Self {
        Self {
            id: id.into(),
            component,
            properties: Properties::new(),
            style: None,
            children: component.is_container().then(Vec::new),
            child: None,
            visible: None,
            repeat_for: None,
            repeat_as: None,
            repeat_index: None,
        }
    }

    /// Nested children in order, whichever field holds them
    pub fn nested(&self) -> impl Iterator<Item = &NodeShape> {
        self.children
            .iter()
            .flatten()
            .chain(self.child.as_deref())
    }

    /// Ids occurring more than once anywhere in the shape
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut stack = vec![self];
        while let Some(shape) = stack.pop() {
            *counts.entry(shape.id.as_str()).or_default() += 1;
            stack.extend(shape.nested());
        }

        let mut duplicates: Vec<String> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(id, _)| id.to_string())
            .collect();
        duplicates.sort();
        duplicates
    }
}

impl Tree {
    /// Build a tree from its nested shape.
    ///
    /// A wrapper given a one-element `children` list is normalized to its
    /// single-child slot.
    pub fn from_shape(shape: &NodeShape) -> Result<Tree, LoadError> {
        let mut seen = HashSet::new();
        let mut nodes = HashMap::new();
        let mut stack: Vec<(&NodeShape, Option<&str>)> = vec![(shape, None)];

        while let Some((current, parent)) = stack.pop() {
            if !seen.insert(current.id.as_str()) {
                return Err(LoadError::DuplicateId(current.id.clone()));
            }

            let nested: Vec<&NodeShape> = current.nested().collect();
            let child_ids: Vec<String> = nested.iter().map(|c| c.id.clone()).collect();
            let slot = match current.component.kind() {
                NodeKind::Leaf => {
                    if !nested.is_empty() {
                        return Err(LoadError::LeafWithChildren(current.id.clone()));
                    }
                    Slot::Leaf
                }
                NodeKind::Wrapper => {
                    if nested.len() > 1 {
                        return Err(LoadError::WrapperOverflow(current.id.clone()));
                    }
                    Slot::Wrapper {
                        child: child_ids.into_iter().next(),
                    }
                }
                NodeKind::Container => {
                    if current.child.is_some() {
                        return Err(LoadError::ContainerWithChild(current.id.clone()));
                    }
                    Slot::Container {
                        children: child_ids,
                    }
                }
            };

            let mut node = Node::new(current.id.clone(), current.component);
            node.parent = parent.map(str::to_string);
            node.slot = slot;
            node.properties = current.properties.clone();
            node.style = current.style.clone();
            node.visible = current.visible.clone();
            if current.repeat_for.is_some()
                || current.repeat_as.is_some()
                || current.repeat_index.is_some()
            {
                node.repeat = Some(RepeatBinding {
                    repeat_for: current.repeat_for.clone(),
                    repeat_as: current.repeat_as.clone(),
                    repeat_index: current.repeat_index.clone(),
                });
            }
            nodes.insert(current.id.clone(), node);

            for child in nested.into_iter().rev() {
                stack.push((child, Some(current.id.as_str())));
            }
        }

        Ok(Tree::from_parts(nodes, Some(shape.id.clone())))
    }

    /// Nested shape of the whole tree; `None` when the tree is empty
    pub fn to_shape(&self) -> Option<NodeShape> {
        self.shape_of(self.root_id()?)
    }

    /// Nested shape of the subtree at `id`
    pub fn shape_of(&self, id: &str) -> Option<NodeShape> {
        let node = self.get(id)?;
        let repeat = node.repeat.clone().unwrap_or_default();

        let (children, child) = match node.slot() {
            Slot::Leaf => (None, None),
            Slot::Wrapper { child } => {
                let child = match child {
                    Some(child_id) => Some(Box::new(self.shape_of(child_id)?)),
                    None => None,
                };
                (None, child)
            }
            Slot::Container { children } => {
                let shapes = children
                    .iter()
                    .map(|child_id| self.shape_of(child_id))
                    .collect::<Option<Vec<_>>>()?;
                (Some(shapes), None)
            }
        };

        Some(NodeShape {
            id: node.id().to_string(),
            component: node.component(),
            properties: node.properties.clone(),
            style: node.style.clone(),
            children,
            child,
            visible: node.visible.clone(),
            repeat_for: repeat.repeat_for,
            repeat_as: repeat.repeat_as,
            repeat_index: repeat.repeat_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVOICE: &str = r#"{
        "id": "page",
        "type": "column",
        "properties": {"gap": 8},
        "style": {"padding": "12px"},
        "children": [
            {"id": "title", "type": "text", "properties": {"content": "Invoice", "bold": true}},
            {"id": "link", "type": "hyperlink", "properties": {"href": "https://example.com"},
             "child": {"id": "logo", "type": "image", "properties": {"src": "logo.png"}}},
            {"id": "lines", "type": "list", "properties": {}, "children": [],
             "repeatFor": "{{ invoice.lines }}", "repeatAs": "line", "visible": "{{ invoice.lines.length }}"}
        ]
    }"#;

    #[test]
    fn test_load_and_save_round_trip() {
        let shape: NodeShape = serde_json::from_str(INVOICE).unwrap();
        let tree = Tree::from_shape(&shape).unwrap();

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.get("link").unwrap().wrapped_child(), Some("logo"));
        assert_eq!(
            tree.get("lines").unwrap().repeat.as_ref().and_then(|r| r.repeat_as.as_deref()),
            Some("line")
        );

        let saved = tree.to_shape().unwrap();
        assert_eq!(saved, shape);

        let original: serde_json::Value = serde_json::from_str(INVOICE).unwrap();
        assert_eq!(serde_json::to_value(&saved).unwrap(), original);
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let shape = NodeShape::new("t", ComponentType::Text);
        let json = serde_json::to_string(&shape).unwrap();
        assert_eq!(json, r#"{"id":"t","type":"text","properties":{}}"#);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut shape = NodeShape::new("root", ComponentType::Row);
        shape.children = Some(vec![
            NodeShape::new("same", ComponentType::Text),
            NodeShape::new("same", ComponentType::Text),
        ]);

        assert_eq!(shape.duplicate_ids(), vec!["same"]);
        assert_eq!(
            Tree::from_shape(&shape),
            Err(LoadError::DuplicateId("same".to_string()))
        );
    }

    #[test]
    fn test_structural_violations_are_rejected() {
        let mut leaf = NodeShape::new("t", ComponentType::Text);
        leaf.children = Some(vec![NodeShape::new("x", ComponentType::Text)]);
        assert_eq!(
            Tree::from_shape(&leaf),
            Err(LoadError::LeafWithChildren("t".to_string()))
        );

        let mut wrapper = NodeShape::new("w", ComponentType::Card);
        wrapper.children = Some(vec![NodeShape::new("a", ComponentType::Text)]);
        wrapper.child = Some(Box::new(NodeShape::new("b", ComponentType::Text)));
        assert_eq!(
            Tree::from_shape(&wrapper),
            Err(LoadError::WrapperOverflow("w".to_string()))
        );

        let mut container = NodeShape::new("c", ComponentType::Row);
        container.child = Some(Box::new(NodeShape::new("b", ComponentType::Text)));
        assert_eq!(
            Tree::from_shape(&container),
            Err(LoadError::ContainerWithChild("c".to_string()))
        );
    }

    #[test]
    fn test_wrapper_children_list_is_normalized() {
        let mut wrapper = NodeShape::new("w", ComponentType::Padding);
        wrapper.children = Some(vec![NodeShape::new("a", ComponentType::Text)]);

        let tree = Tree::from_shape(&wrapper).unwrap();
        assert_eq!(tree.root().unwrap().wrapped_child(), Some("a"));

        let saved = tree.to_shape().unwrap();
        assert!(saved.children.is_none());
        assert_eq!(saved.child.map(|c| c.id), Some("a".to_string()));
    }
}
