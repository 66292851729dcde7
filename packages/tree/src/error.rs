use crate::component::ComponentType;
use crate::node::NodeId;
use thiserror::Error;

/// Outcome of a tree mutation: the affected node id on success
pub type MutationResult = Result<NodeId, MutationError>;

/// Rejection reasons for mutations. A rejected mutation never changes the tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Cannot add children to leaf component '{0}'")]
    LeafParent(String),

    #[error("Wrapper '{0}' already has a child")]
    WrapperOccupied(String),

    #[error("Component '{0}' is not a wrapper")]
    NotAWrapper(String),

    #[error("Parent of '{0}' is not a container")]
    NotAContainer(String),

    #[error("A {child} cannot be placed inside a {parent}")]
    ParentTypeNotAllowed {
        child: ComponentType,
        parent: ComponentType,
    },

    #[error("Moving '{node_id}' into '{parent_id}' would create a cycle")]
    CycleDetected { node_id: String, parent_id: String },

    #[error("Cannot move the root component")]
    CannotMoveRoot,

    #[error("Cannot duplicate the root component")]
    CannotDuplicateRoot,

    #[error("Cannot reorder the root component")]
    CannotReorderRoot,

    #[error("Index {index} is out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Cannot change the type of '{0}'")]
    TypeChange(String),

    #[error("Tree already has a root")]
    RootOccupied,

    #[error("Nothing to insert: the fragment is empty")]
    EmptyFragment,
}

/// First structural violation found by a full-tree scan
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeViolation {
    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Root '{0}' is missing from the tree")]
    MissingRoot(String),

    #[error("Root '{0}' has a parent")]
    RootHasParent(String),

    #[error("Node '{parent_id}' references missing child '{child_id}'")]
    DanglingChild { parent_id: String, child_id: String },

    #[error("Node '{child_id}' does not point back to its parent '{parent_id}'")]
    BrokenParentLink { parent_id: String, child_id: String },

    #[error("Node '{0}' is not reachable from the root")]
    Unreachable(String),

    #[error("Node '{0}' is its own ancestor")]
    Cycle(String),

    #[error("Node '{id}' has a {found:?} slot but its type is {component}")]
    KindMismatch {
        id: String,
        component: ComponentType,
        found: crate::NodeKind,
    },

    #[error("A {child} cannot be placed inside a {parent} (node '{id}')")]
    ParentTypeNotAllowed {
        id: String,
        child: ComponentType,
        parent: ComponentType,
    },
}

/// Errors turning a snapshot shape into a tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Leaf component '{0}' cannot have children")]
    LeafWithChildren(String),

    #[error("Wrapper component '{0}' can hold at most one child")]
    WrapperOverflow(String),

    #[error("Container component '{0}' cannot use the single-child field")]
    ContainerWithChild(String),

    #[error("Invalid document JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Json(e.to_string())
    }
}
