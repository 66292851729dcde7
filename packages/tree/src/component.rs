//! # Component types
//!
//! The closed set of component type tags and the structural class each one
//! belongs to. Everything above this module reasons about structure through
//! [`NodeKind`]. The one per-type rule is the parent allow-list for table
//! parts ([`ComponentType::allowed_parents`]).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural capability of a node, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Accepts no children
    Leaf,
    /// Accepts at most one child
    Wrapper,
    /// Accepts an ordered list of children
    Container,
}

/// Component type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    // Leaves
    Text,
    Image,
    Barcode,
    QrCode,
    Divider,
    Spacer,
    PageNumber,
    Chart,

    // Wrappers
    Hyperlink,
    Padding,
    Card,
    Align,
    TableCell,

    // Containers
    Row,
    Column,
    Stack,
    Grid,
    List,
    Table,
    TableRow,
}

impl ComponentType {
    pub const ALL: [ComponentType; 20] = [
        ComponentType::Text,
        ComponentType::Image,
        ComponentType::Barcode,
        ComponentType::QrCode,
        ComponentType::Divider,
        ComponentType::Spacer,
        ComponentType::PageNumber,
        ComponentType::Chart,
        ComponentType::Hyperlink,
        ComponentType::Padding,
        ComponentType::Card,
        ComponentType::Align,
        ComponentType::TableCell,
        ComponentType::Row,
        ComponentType::Column,
        ComponentType::Stack,
        ComponentType::Grid,
        ComponentType::List,
        ComponentType::Table,
        ComponentType::TableRow,
    ];

    pub fn kind(self) -> NodeKind {
        use ComponentType::*;

        match self {
            Text | Image | Barcode | QrCode | Divider | Spacer | PageNumber | Chart => {
                NodeKind::Leaf
            }
            Hyperlink | Padding | Card | Align | TableCell => NodeKind::Wrapper,
            Row | Column | Stack | Grid | List | Table | TableRow => NodeKind::Container,
        }
    }

    pub fn is_container(self) -> bool {
        self.kind() == NodeKind::Container
    }

    pub fn is_wrapper(self) -> bool {
        self.kind() == NodeKind::Wrapper
    }

    pub fn is_leaf(self) -> bool {
        self.kind() == NodeKind::Leaf
    }

    /// Parent types this component may be placed under.
    ///
    /// `None` means any parent able to hold children is acceptable.
    pub fn allowed_parents(self) -> Option<&'static [ComponentType]> {
        match self {
            ComponentType::TableRow => Some(&[ComponentType::Table]),
            ComponentType::TableCell => Some(&[ComponentType::TableRow]),
            _ => None,
        }
    }

    /// Whether `self` may be placed directly under `parent`
    pub fn accepts_parent(self, parent: ComponentType) -> bool {
        match self.allowed_parents() {
            Some(allowed) => allowed.contains(&parent),
            None => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        use ComponentType::*;

        match self {
            Text => "text",
            Image => "image",
            Barcode => "barcode",
            QrCode => "qr_code",
            Divider => "divider",
            Spacer => "spacer",
            PageNumber => "page_number",
            Chart => "chart",
            Hyperlink => "hyperlink",
            Padding => "padding",
            Card => "card",
            Align => "align",
            TableCell => "table_cell",
            Row => "row",
            Column => "column",
            Stack => "stack",
            Grid => "grid",
            List => "list",
            Table => "table",
            TableRow => "table_row",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates_are_exclusive() {
        for ty in ComponentType::ALL {
            let hits = [ty.is_leaf(), ty.is_wrapper(), ty.is_container()]
                .iter()
                .filter(|hit| **hit)
                .count();
            assert_eq!(hits, 1, "{} must belong to exactly one kind", ty);
        }
    }

    #[test]
    fn test_kinds() {
        assert!(ComponentType::Text.is_leaf());
        assert!(ComponentType::Hyperlink.is_wrapper());
        assert!(ComponentType::Row.is_container());
        assert!(ComponentType::TableRow.is_container());
        assert!(ComponentType::TableCell.is_wrapper());
    }

    #[test]
    fn test_allowed_parents() {
        assert!(ComponentType::TableRow.accepts_parent(ComponentType::Table));
        assert!(!ComponentType::TableRow.accepts_parent(ComponentType::Column));
        assert!(ComponentType::TableCell.accepts_parent(ComponentType::TableRow));
        assert!(ComponentType::Text.accepts_parent(ComponentType::Card));
    }

    #[test]
    fn test_serde_names_match_display() {
        for ty in ComponentType::ALL {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
        }
    }
}
