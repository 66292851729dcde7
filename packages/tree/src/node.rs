//! # Nodes
//!
//! A node is stored in a [`Tree`](crate::Tree) arena. Structural links are
//! id references: the parent keeps its children in its [`Slot`], the child
//! keeps a back-reference to its parent. The slot variant is chosen from the
//! component type when the node is constructed and never changes, so a leaf
//! can never acquire children and a wrapper can never hold a list.

use crate::component::{ComponentType, NodeKind};
use crate::value::{Properties, PropertyValue, Style};
use serde::{Deserialize, Serialize};

pub type NodeId = String;

/// List-repetition binding, evaluated by the rendering collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatBinding {
    pub repeat_for: Option<String>,
    pub repeat_as: Option<String>,
    pub repeat_index: Option<String>,
}

/// Child storage, one variant per [`NodeKind`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Leaf,
    Wrapper { child: Option<NodeId> },
    Container { children: Vec<NodeId> },
}

impl Slot {
    pub(crate) fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Leaf => Slot::Leaf,
            NodeKind::Wrapper => Slot::Wrapper { child: None },
            NodeKind::Container => Slot::Container {
                children: Vec::new(),
            },
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Slot::Leaf => NodeKind::Leaf,
            Slot::Wrapper { .. } => NodeKind::Wrapper,
            Slot::Container { .. } => NodeKind::Container,
        }
    }

    /// Child ids in traversal order
    pub fn ids(&self) -> &[NodeId] {
        match self {
            Slot::Leaf => &[],
            Slot::Wrapper { child } => child.as_slice(),
            Slot::Container { children } => children,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) component: ComponentType,
    pub(crate) parent: Option<NodeId>,
    pub(crate) slot: Slot,

    pub properties: Properties,
    pub style: Option<Style>,
    /// Conditional-visibility expression
    pub visible: Option<String>,
    pub repeat: Option<RepeatBinding>,
}

impl Node {
    /// Create a detached node with an empty slot matching the component kind
    pub fn new(id: impl Into<NodeId>, component: ComponentType) -> Self {
        Self {
            id: id.into(),
            component,
            parent: None,
            slot: Slot::for_kind(component.kind()),
            properties: Properties::new(),
            style: None,
            visible: None,
            repeat: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.style
            .get_or_insert_with(Style::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_visible(mut self, expression: impl Into<String>) -> Self {
        self.visible = Some(expression.into());
        self
    }

    pub fn with_repeat(mut self, repeat: RepeatBinding) -> Self {
        self.repeat = Some(repeat);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn component(&self) -> ComponentType {
        self.component
    }

    pub fn kind(&self) -> NodeKind {
        self.slot.kind()
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    /// Ordered child ids (empty for leaves and empty wrappers)
    pub fn child_ids(&self) -> &[NodeId] {
        self.slot.ids()
    }

    /// The single attached child of a wrapper
    pub fn wrapped_child(&self) -> Option<&str> {
        match &self.slot {
            Slot::Wrapper { child } => child.as_deref(),
            _ => None,
        }
    }

    /// Whether the node can take another child right now
    pub fn has_room(&self) -> bool {
        match &self.slot {
            Slot::Leaf => false,
            Slot::Wrapper { child } => child.is_none(),
            Slot::Container { .. } => true,
        }
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}
