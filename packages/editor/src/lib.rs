//! # Stencil Editor
//!
//! Editing engine for print templates built on `stencil-tree`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ tree: nodes, traversal, validated mutations │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + edit session   │
//! │  - Load/save header, content, footer        │
//! │  - Snapshot undo/redo with gestures         │
//! │  - Clipboard with fresh ids on paste        │
//! │  - Drag-and-drop placement and validation   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ renderer (outside this crate): shapes → UI  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **One tree per section**: header, content and footer never share nodes
//! 2. **Validate, then mutate**: a rejected edit changes nothing
//! 3. **Snapshots, not inverses**: history stores the state before each edit
//!
//! ## Usage
//!
//! ```rust
//! use stencil_editor::{Document, DropPosition, EditSession};
//! use stencil_tree::{ComponentType, Node};
//!
//! let mut session = EditSession::new("local", Document::new());
//! session.insert_root(Node::new("page", ComponentType::Column))?;
//! session.add_component("page", Node::new("title", ComponentType::Text), None)?;
//! session.drop_new(Node::new("logo", ComponentType::Image), "title", DropPosition::Before)?;
//!
//! assert_eq!(session.all_node_ids(), vec!["page", "logo", "title"]);
//!
//! session.undo();
//! assert!(!session.has_node("logo"));
//! # Ok::<(), stencil_editor::EditorError>(())
//! ```

mod clipboard;
mod config;
mod document;
mod drag_drop;
mod errors;
mod history;
mod mutations;
mod session;

pub use clipboard::{Clipboard, ClipboardEntry, ClipboardOperation};
pub use config::{EditorConfig, DEFAULT_MAX_HISTORY_SIZE};
pub use document::{Document, DocumentShape, Section};
pub use drag_drop::{
    calculate_insertion_position, drop_zone, drop_zone_along, validate_drop, Axis, DropPosition,
    DropValidation, DropZone, InsertionPoint, Point, Rect,
};
pub use errors::EditorError;
pub use history::{History, HistoryEntry, HistoryMetadata};
pub use mutations::Mutation;
pub use session::{Applied, EditSession};
