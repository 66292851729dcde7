//! # Stencil Tree
//!
//! Document tree engine for print templates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ component / node: type tags, kinds, slots   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ tree + traverse: id-keyed arena, queries    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ mutations: validated, atomic edits          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ shape: nested JSON form for load/save       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//!
//! After every successful mutation:
//!
//! 1. Ids are unique within a tree (the arena is keyed by id).
//! 2. Leaves have no children, wrappers at most one, containers an ordered
//!    list. The [`Slot`] variant is fixed by the component type.
//! 3. No node is its own ancestor.
//!
//! ## Usage
//!
//! ```rust
//! use stencil_tree::{ComponentType, Node, Tree};
//!
//! let mut tree = Tree::with_root(Node::new("page", ComponentType::Column));
//! tree.add_component("page", Node::new("title", ComponentType::Text), None)?;
//! tree.update_component_property("title", "content", "Invoice")?;
//!
//! assert_eq!(tree.find_path("title"), Some(vec![0]));
//! # Ok::<(), stencil_tree::MutationError>(())
//! ```

pub mod component;
pub mod error;
pub mod id_generator;
pub mod mutations;
pub mod node;
pub mod shape;
pub mod traverse;
pub mod tree;
pub mod value;

pub use component::{ComponentType, NodeKind};
pub use error::{LoadError, MutationError, MutationResult, TreeViolation};
pub use id_generator::{document_seed, IdGenerator};
pub use mutations::NodeUpdate;
pub use node::{Node, NodeId, RepeatBinding, Slot};
pub use shape::NodeShape;
pub use traverse::Visit;
pub use tree::Tree;
pub use value::{Properties, PropertyValue, Style};
