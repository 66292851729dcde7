//! # Document Handle
//!
//! A print template is a forest of up to three independent trees (header,
//! content, footer) plus free-form page settings. Edits go to the active
//! section unless a section is named explicitly.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Edit (active section) → Save
//!   ↓            ↓                 ↓
//! JSON     Tree mutations        JSON
//! ```
//!
//! Keys other than `header`, `content` and `footer` are page settings and
//! are written back exactly as they were read.

use crate::EditorError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use stencil_tree::{NodeShape, Tree};
use tracing::{debug, info};

/// One of the three trees of a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Header,
    #[default]
    Content,
    Footer,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Header, Section::Content, Section::Footer];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Header => "header",
            Section::Content => "content",
            Section::Footer => "footer",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-disk form of a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<NodeShape>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<NodeShape>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<NodeShape>,

    /// Everything else (page size, margins, data bindings, ...)
    #[serde(flatten)]
    pub page_settings: Map<String, Value>,
}

/// Editable print template
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Backing file, if the document was loaded from or saved to disk
    pub path: Option<PathBuf>,

    /// Current version number (increments on each successful edit)
    pub version: u64,

    header: Tree,
    content: Tree,
    footer: Tree,
    page_settings: Map<String, Value>,
    active: Section,
    dirty: bool,
}

impl Document {
    /// Empty document with the content section active
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_shape(shape: &DocumentShape) -> Result<Self, EditorError> {
        let load = |section: &Option<NodeShape>| -> Result<Tree, EditorError> {
            match section {
                Some(shape) => Ok(Tree::from_shape(shape)?),
                None => Ok(Tree::new()),
            }
        };

        Ok(Self {
            header: load(&shape.header)?,
            content: load(&shape.content)?,
            footer: load(&shape.footer)?,
            page_settings: shape.page_settings.clone(),
            ..Self::default()
        })
    }

    pub fn from_json(source: &str) -> Result<Self, EditorError> {
        let shape: DocumentShape = serde_json::from_str(source)?;
        Self::from_shape(&shape)
    }

    /// Load document from file (file-backed)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let mut document = Self::from_json(&source)?;
        document.path = Some(path.to_path_buf());

        info!(
            path = %path.display(),
            nodes = document.node_count(),
            "Loaded document"
        );
        Ok(document)
    }

    /// Save to the backing file
    pub fn save(&mut self) -> Result<(), EditorError> {
        let path = self.path.clone().ok_or(EditorError::NotFileBacked)?;
        self.write_to(&path)
    }

    /// Save to `path` and make it the backing file
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), EditorError> {
        let path = path.into();
        self.write_to(&path)?;
        self.path = Some(path);
        Ok(())
    }

    fn write_to(&mut self, path: &Path) -> Result<(), EditorError> {
        std::fs::write(path, self.to_json()?)?;
        self.dirty = false;
        info!(path = %path.display(), version = self.version, "Saved document");
        Ok(())
    }

    pub fn to_shape(&self) -> DocumentShape {
        DocumentShape {
            header: self.header.to_shape(),
            content: self.content.to_shape(),
            footer: self.footer.to_shape(),
            page_settings: self.page_settings.clone(),
        }
    }

    /// Pretty-printed JSON form
    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(&self.to_shape())?)
    }

    pub fn section(&self, section: Section) -> &Tree {
        match section {
            Section::Header => &self.header,
            Section::Content => &self.content,
            Section::Footer => &self.footer,
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut Tree {
        match section {
            Section::Header => &mut self.header,
            Section::Content => &mut self.content,
            Section::Footer => &mut self.footer,
        }
    }

    /// Tree of the active section
    pub fn tree(&self) -> &Tree {
        self.section(self.active)
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        self.section_mut(self.active)
    }

    pub fn active_section(&self) -> Section {
        self.active
    }

    pub fn set_active_section(&mut self, section: Section) {
        if self.active != section {
            debug!(from = %self.active, to = %section, "Switched active section");
            self.active = section;
        }
    }

    /// Swap in a whole tree for `section`, returning the previous one
    pub fn replace_section(&mut self, section: Section, tree: Tree) -> Tree {
        let previous = std::mem::replace(self.section_mut(section), tree);
        self.touch();
        previous
    }

    /// Section holding `id`, checking the active section first
    pub fn section_of(&self, id: &str) -> Option<Section> {
        std::iter::once(self.active)
            .chain(Section::ALL.into_iter().filter(|s| *s != self.active))
            .find(|section| self.section(*section).contains(id))
    }

    pub fn page_settings(&self) -> &Map<String, Value> {
        &self.page_settings
    }

    pub fn page_settings_mut(&mut self) -> &mut Map<String, Value> {
        self.dirty = true;
        &mut self.page_settings
    }

    /// Nodes across all sections
    pub fn node_count(&self) -> usize {
        Section::ALL.iter().map(|s| self.section(*s).len()).sum()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record a successful edit
    pub(crate) fn touch(&mut self) {
        self.version += 1;
        self.dirty = true;
    }

    /// Drop every section and the page settings; the active section resets to content
    pub fn clear(&mut self) {
        for section in Section::ALL {
            self.section_mut(section).clear();
        }
        self.page_settings.clear();
        self.active = Section::Content;
        self.touch();
    }
}
