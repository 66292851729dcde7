//! Property-based tests for session history.
//!
//! Random edit sequences are run through a session, then:
//!
//! 1. Undoing every step restores the starting tree exactly.
//! 2. Redoing every step restores the final tree exactly.
//! 3. Rejected edits never add history entries.

use proptest::prelude::*;
use stencil_editor::{Document, EditSession, EditorConfig};
use stencil_tree::{ComponentType, Node, Tree};

#[derive(Debug, Clone)]
enum Edit {
    Add { parent: usize, component: usize },
    Move { node: usize, parent: usize, index: usize },
    Delete { node: usize },
    Duplicate { node: usize },
    SetProperty { node: usize, value: i64 },
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..32, 0usize..ComponentType::ALL.len())
            .prop_map(|(parent, component)| Edit::Add { parent, component }),
        (0usize..32, 0usize..32, 0usize..4)
            .prop_map(|(node, parent, index)| Edit::Move { node, parent, index }),
        (0usize..32).prop_map(|node| Edit::Delete { node }),
        (0usize..32).prop_map(|node| Edit::Duplicate { node }),
        (0usize..32, any::<i64>()).prop_map(|(node, value)| Edit::SetProperty { node, value }),
    ]
}

fn pick(tree: &Tree, n: usize) -> Option<String> {
    let mut ids: Vec<&str> = tree.ids().collect();
    if ids.is_empty() {
        return None;
    }
    ids.sort();
    Some(ids[n % ids.len()].to_string())
}

/// Returns whether the session accepted the edit
fn run(session: &mut EditSession, edit: &Edit) -> bool {
    let tree = session.tree();
    match edit {
        Edit::Add { parent, component } => {
            let Some(parent) = pick(tree, *parent) else {
                return false;
            };
            let id = session.new_id();
            let node = Node::new(id, ComponentType::ALL[*component]);
            session.add_component(&parent, node, None).is_ok()
        }
        Edit::Move { node, parent, index } => {
            let (Some(node), Some(parent)) = (pick(tree, *node), pick(tree, *parent)) else {
                return false;
            };
            session.move_component(&node, &parent, *index).is_ok()
        }
        Edit::Delete { node } => {
            let Some(node) = pick(tree, *node) else {
                return false;
            };
            if tree.root_id() == Some(node.as_str()) {
                return false;
            }
            session.delete_component(&node).is_ok()
        }
        Edit::Duplicate { node } => {
            let Some(node) = pick(tree, *node) else {
                return false;
            };
            session.duplicate_component(&node).is_ok()
        }
        Edit::SetProperty { node, value } => {
            let Some(node) = pick(tree, *node) else {
                return false;
            };
            session.update_component_property(&node, "value", *value).is_ok()
        }
    }
}

fn session() -> EditSession {
    let mut doc = Document::new();
    doc.tree_mut()
        .insert_root(Node::new("root", ComponentType::Column))
        .unwrap();
    let config = EditorConfig {
        max_history_size: 1000,
        id_seed: Some("p".to_string()),
    };
    EditSession::with_config("prop", doc, &config)
}

proptest! {
    #[test]
    fn undo_all_then_redo_all(edits in prop::collection::vec(edit_strategy(), 1..40)) {
        let mut session = session();
        let start = session.tree().clone();

        let mut accepted = 0;
        for edit in &edits {
            let levels = session.history().undo_levels();
            if run(&mut session, edit) {
                accepted += 1;
            } else {
                prop_assert_eq!(session.history().undo_levels(), levels, "rejected {:?} was recorded", edit);
            }
        }
        prop_assert_eq!(session.history().undo_levels(), accepted);
        let end = session.tree().clone();

        while session.undo() {}
        prop_assert_eq!(session.tree(), &start);

        while session.redo() {}
        prop_assert_eq!(session.tree(), &end);
        prop_assert_eq!(session.tree().validate_tree(), Ok(()));
    }
}
