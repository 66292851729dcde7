//! # Edit Commands
//!
//! Serializable form of every edit a session accepts. Commands are what a
//! client or a script sends; [`crate::EditSession::apply`] runs them.
//!
//! ```json
//! { "op": "move_component", "node_id": "title", "new_parent_id": "body", "index": 0 }
//! ```

use crate::document::Section;
use crate::drag_drop::DropPosition;
use serde::{Deserialize, Serialize};
use stencil_tree::{NodeId, NodeShape, NodeUpdate, Properties, PropertyValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Install a root in the empty active section
    InsertRoot { node: NodeShape },

    AddComponent {
        parent_id: NodeId,
        node: NodeShape,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    AddComponentAsChild { parent_id: NodeId, node: NodeShape },

    UpdateComponent { node_id: NodeId, update: NodeUpdate },

    UpdateProperty {
        node_id: NodeId,
        key: String,
        value: PropertyValue,
    },

    UpdateProperties {
        node_id: NodeId,
        properties: Properties,
    },

    DeleteComponent { node_id: NodeId },

    MoveComponent {
        node_id: NodeId,
        new_parent_id: NodeId,
        index: usize,
    },

    DuplicateComponent { node_id: NodeId },

    ReorderComponent { node_id: NodeId, new_index: usize },

    /// Drag an existing node onto a target
    DropNode {
        node_id: NodeId,
        target_id: NodeId,
        position: DropPosition,
    },

    /// Drag a new component in from outside the tree
    DropNew {
        node: NodeShape,
        target_id: NodeId,
        position: DropPosition,
    },

    Copy { node_ids: Vec<NodeId> },

    Cut { node_ids: Vec<NodeId> },

    Paste {
        parent_id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    Select { node_ids: Vec<NodeId> },

    SetActiveSection { section: Section },

    BeginGesture { action: String },

    EndGesture,

    CancelGesture,

    Undo,

    Redo,
}

impl Mutation {
    /// Command name as written in `op`
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertRoot { .. } => "insert_root",
            Mutation::AddComponent { .. } => "add_component",
            Mutation::AddComponentAsChild { .. } => "add_component_as_child",
            Mutation::UpdateComponent { .. } => "update_component",
            Mutation::UpdateProperty { .. } => "update_property",
            Mutation::UpdateProperties { .. } => "update_properties",
            Mutation::DeleteComponent { .. } => "delete_component",
            Mutation::MoveComponent { .. } => "move_component",
            Mutation::DuplicateComponent { .. } => "duplicate_component",
            Mutation::ReorderComponent { .. } => "reorder_component",
            Mutation::DropNode { .. } => "drop_node",
            Mutation::DropNew { .. } => "drop_new",
            Mutation::Copy { .. } => "copy",
            Mutation::Cut { .. } => "cut",
            Mutation::Paste { .. } => "paste",
            Mutation::Select { .. } => "select",
            Mutation::SetActiveSection { .. } => "set_active_section",
            Mutation::BeginGesture { .. } => "begin_gesture",
            Mutation::EndGesture => "end_gesture",
            Mutation::CancelGesture => "cancel_gesture",
            Mutation::Undo => "undo",
            Mutation::Redo => "redo",
        }
    }
}
