//! Error types for the editor

use crate::document::Section;
use stencil_tree::{LoadError, MutationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Drop rejected: {0}")]
    DropRejected(String),

    #[error("No insertion point for '{0}'")]
    NoInsertionPoint(String),

    #[error("Clipboard is empty")]
    ClipboardEmpty,

    #[error("Cannot paste into '{0}': it is being cut")]
    PasteIntoCutSource(String),

    #[error("The {0} section is empty")]
    EmptySection(Section),

    #[error("No gesture in progress")]
    NoGesture,

    #[error("Document is not file-backed")]
    NotFileBacked,
}
