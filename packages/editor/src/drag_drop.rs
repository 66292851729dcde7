//! # Drag-and-Drop Placement
//!
//! Turns a pointer over a rendered component into a concrete edit:
//!
//! ```text
//! pointer + bounds ──drop_zone──▶ DropZone
//!                                    │
//! tree + target ──validate_drop──▶ DropValidation (legal positions)
//!                                    │
//! tree + target + position ──calculate_insertion_position──▶ InsertionPoint
//! ```
//!
//! Every function here is pure; applying the result is the session's job.
//!
//! ## Zones
//!
//! Along the layout axis a container target is split 25% / 50% / 25% into
//! before / inside / after. Any other target is split 50% / 50% into before /
//! after.

use serde::{Deserialize, Serialize};
use std::fmt;
use stencil_tree::{ComponentType, NodeId, NodeKind, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rendered bounds of a component
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Offset of `point` along `axis` as a fraction of the extent, clamped to 0..=1
    fn fraction_along(&self, point: Point, axis: Axis) -> f64 {
        let (start, extent, at) = match axis {
            Axis::Vertical => (self.y, self.height, point.y),
            Axis::Horizontal => (self.x, self.width, point.x),
        };
        if extent <= 0.0 || !extent.is_finite() {
            return 0.5;
        }
        ((at - start) / extent).clamp(0.0, 1.0)
    }
}

/// Direction in which siblings are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

/// Zone of the target the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropZone {
    Before,
    Inside,
    After,
}

/// Where a dropped component goes relative to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
    Inside,
    Start,
    End,
}

impl DropPosition {
    pub const ALL: [DropPosition; 5] = [
        DropPosition::Before,
        DropPosition::After,
        DropPosition::Inside,
        DropPosition::Start,
        DropPosition::End,
    ];

    /// Positions that place the dragged node into the target
    pub fn is_inward(self) -> bool {
        matches!(
            self,
            DropPosition::Inside | DropPosition::Start | DropPosition::End
        )
    }
}

impl From<DropZone> for DropPosition {
    fn from(zone: DropZone) -> Self {
        match zone {
            DropZone::Before => DropPosition::Before,
            DropZone::Inside => DropPosition::Inside,
            DropZone::After => DropPosition::After,
        }
    }
}

impl fmt::Display for DropPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DropPosition::Before => "before",
            DropPosition::After => "after",
            DropPosition::Inside => "inside",
            DropPosition::Start => "start",
            DropPosition::End => "end",
        };
        f.write_str(name)
    }
}

/// Zone for a vertically laid out target
pub fn drop_zone(target: Rect, pointer: Point, is_container_target: bool) -> DropZone {
    drop_zone_along(target, pointer, is_container_target, Axis::Vertical)
}

pub fn drop_zone_along(
    target: Rect,
    pointer: Point,
    is_container_target: bool,
    axis: Axis,
) -> DropZone {
    let fraction = target.fraction_along(pointer, axis);

    if is_container_target {
        if fraction < 0.25 {
            DropZone::Before
        } else if fraction > 0.75 {
            DropZone::After
        } else {
            DropZone::Inside
        }
    } else if fraction < 0.5 {
        DropZone::Before
    } else {
        DropZone::After
    }
}

/// Parent and index a drop resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertionPoint {
    pub parent_id: NodeId,
    pub index: usize,
    pub position: DropPosition,
}

/// Resolve a drop relative to `target_id` into a parent and index.
///
/// `inside` on a leaf or an occupied wrapper falls back to `after`.
/// `before`/`after` on the root become `start`/`end` inside it when the root
/// is a container. Returns `None` when nothing sensible exists.
pub fn calculate_insertion_position(
    tree: &Tree,
    target_id: &str,
    position: DropPosition,
) -> Option<InsertionPoint> {
    let target = tree.get(target_id)?;

    if position.is_inward() {
        match target.kind() {
            NodeKind::Container => {
                let index = match position {
                    DropPosition::Start => 0,
                    _ => target.child_ids().len(),
                };
                return Some(InsertionPoint {
                    parent_id: target_id.to_string(),
                    index,
                    position,
                });
            }
            NodeKind::Wrapper if target.has_room() => {
                return Some(InsertionPoint {
                    parent_id: target_id.to_string(),
                    index: 0,
                    position: DropPosition::Inside,
                });
            }
            _ => return calculate_insertion_position(tree, target_id, DropPosition::After),
        }
    }

    match target.parent_id() {
        Some(parent_id) => {
            let index = tree.index_in_parent(target_id)?;
            let index = match position {
                DropPosition::Before => index,
                _ => index + 1,
            };
            Some(InsertionPoint {
                parent_id: parent_id.to_string(),
                index,
                position,
            })
        }
        None if target.kind() == NodeKind::Container => {
            let (index, position) = match position {
                DropPosition::Before => (0, DropPosition::Start),
                _ => (target.child_ids().len(), DropPosition::End),
            };
            Some(InsertionPoint {
                parent_id: target_id.to_string(),
                index,
                position,
            })
        }
        None => None,
    }
}

/// Which positions are legal for a drop onto one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropValidation {
    pub can_drop: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub valid_positions: Vec<DropPosition>,
    pub restricted_positions: Vec<DropPosition>,
}

impl DropValidation {
    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            can_drop: false,
            reason: Some(reason.into()),
            valid_positions: Vec::new(),
            restricted_positions: DropPosition::ALL.to_vec(),
        }
    }

    fn allowing(valid: &[DropPosition]) -> Self {
        Self {
            can_drop: true,
            reason: None,
            valid_positions: valid.to_vec(),
            restricted_positions: DropPosition::ALL
                .into_iter()
                .filter(|p| !valid.contains(p))
                .collect(),
        }
    }

    pub fn allows(&self, position: DropPosition) -> bool {
        self.can_drop && self.valid_positions.contains(&position)
    }

    fn restrict(&mut self, positions: &[DropPosition], reason: impl Into<String>) {
        if !positions.iter().any(|p| self.valid_positions.contains(p)) {
            return;
        }
        self.valid_positions.retain(|p| !positions.contains(p));
        for position in positions {
            if !self.restricted_positions.contains(position) {
                self.restricted_positions.push(*position);
            }
        }
        if self.valid_positions.is_empty() {
            self.can_drop = false;
            self.reason = Some(reason.into());
        }
    }
}

const INWARD: [DropPosition; 3] = [DropPosition::Inside, DropPosition::Start, DropPosition::End];
const BESIDE: [DropPosition; 2] = [DropPosition::Before, DropPosition::After];

/// Decide which positions a drop of `dragged_type` onto `target_id` may use.
///
/// `dragged_node_id` is the node being moved, or `None` for a new component
/// dragged in from outside the tree. Rules apply in order and the first
/// outright rejection wins:
///
/// 1. parent allow-list of the dragged type
/// 2. dropping onto itself
/// 3. dropping into its own subtree
/// 4. leaf target: before/after only
/// 5. wrapper target: before/after, plus inside while the slot is empty
/// 6. container target: all positions
pub fn validate_drop(
    tree: &Tree,
    dragged_type: ComponentType,
    dragged_node_id: Option<&str>,
    target_id: &str,
) -> DropValidation {
    let Some(target) = tree.get(target_id) else {
        return DropValidation::rejected(format!("Target '{}' not found", target_id));
    };
    let parent = target.parent_id().and_then(|id| tree.get(id));

    // Before/after on the root land inside the root itself
    let sibling_parent = match parent {
        Some(parent) => Some(parent),
        None if target.kind() == NodeKind::Container => Some(target),
        None => None,
    };

    let mut restricted_by_parent: Vec<DropPosition> = Vec::new();
    if let Some(allowed) = dragged_type.allowed_parents() {
        let inside_ok = dragged_type.accepts_parent(target.component());
        let beside_ok = sibling_parent
            .map(|p| dragged_type.accepts_parent(p.component()))
            .unwrap_or(false);

        if !inside_ok && !beside_ok {
            return DropValidation::rejected(allow_list_reason(dragged_type, allowed));
        }
        if !inside_ok {
            restricted_by_parent.extend(INWARD);
        }
        if !beside_ok {
            restricted_by_parent.extend(BESIDE);
        }
    }

    if let Some(dragged_id) = dragged_node_id {
        if dragged_id == target_id {
            return DropValidation::rejected("Cannot drop a component onto itself");
        }
        if tree.would_create_cycle(dragged_id, target_id) {
            return DropValidation::rejected("Cannot drop a component into its own descendant");
        }
    }

    let mut validation = match target.kind() {
        NodeKind::Leaf => DropValidation::allowing(&BESIDE),
        NodeKind::Wrapper if target.has_room() => DropValidation::allowing(&[
            DropPosition::Before,
            DropPosition::After,
            DropPosition::Inside,
        ]),
        NodeKind::Wrapper => DropValidation::allowing(&BESIDE),
        NodeKind::Container => DropValidation::allowing(&DropPosition::ALL),
    };

    if sibling_parent.is_none() {
        validation.restrict(&BESIDE, "Cannot place a component beside the root");
    } else if parent.map(|p| p.kind()) == Some(NodeKind::Wrapper) {
        validation.restrict(&BESIDE, "The parent wrapper holds a single child");
    }

    if let Some(allowed) = dragged_type.allowed_parents() {
        validation.restrict(&restricted_by_parent, allow_list_reason(dragged_type, allowed));
    }

    validation
}

fn allow_list_reason(dragged_type: ComponentType, allowed: &[ComponentType]) -> String {
    let names: Vec<&str> = allowed.iter().map(|c| c.as_str()).collect();
    format!(
        "A {} can only be placed inside: {}",
        dragged_type,
        names.join(", ")
    )
}
