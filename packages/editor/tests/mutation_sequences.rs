//! Edit sequences through a session
//!
//! This tests:
//! - Undo/redo round trips and redo invalidation
//! - History cap eviction
//! - Gestures (batched edits)
//! - Copy/cut/paste with fresh ids
//! - Serialized command scripts

use stencil_editor::{Document, EditSession, EditorConfig, EditorError, Mutation, Section};
use stencil_tree::{ComponentType, MutationError, Node, Tree};

/// page (column)
/// ├── header (row)
/// │   ├── logo (image)
/// │   └── title (text)
/// ├── frame (card)
/// └── body (column)
fn session() -> EditSession {
    let mut tree = Tree::with_root(Node::new("page", ComponentType::Column));
    tree.add_component("page", Node::new("header", ComponentType::Row), None)
        .unwrap();
    tree.add_component("header", Node::new("logo", ComponentType::Image), None)
        .unwrap();
    tree.add_component("header", Node::new("title", ComponentType::Text), None)
        .unwrap();
    tree.add_component("page", Node::new("frame", ComponentType::Card), None)
        .unwrap();
    tree.add_component("page", Node::new("body", ComponentType::Column), None)
        .unwrap();

    let mut doc = Document::new();
    doc.replace_section(Section::Content, tree);
    let config = EditorConfig {
        id_seed: Some("t".to_string()),
        ..EditorConfig::default()
    };
    EditSession::with_config("test", doc, &config)
}

fn children(session: &EditSession, id: &str) -> Vec<String> {
    session
        .get_children(id)
        .iter()
        .map(|n| n.id().to_string())
        .collect()
}

#[test]
fn test_undo_redo_round_trip() {
    let mut session = session();
    let original = session.tree().clone();

    session.move_component("title", "body", 0).unwrap();
    let moved = session.tree().clone();

    assert!(session.undo());
    assert_eq!(session.tree(), &original);
    assert!(session.history().can_redo());

    assert!(session.redo());
    assert_eq!(session.tree(), &moved);
    assert!(!session.history().can_redo());
}

#[test]
fn test_new_edit_clears_redo() {
    let mut session = session();
    session.delete_component("logo").unwrap();
    session.undo();
    assert_eq!(session.history().redo_levels(), 1);

    session.update_component_property("title", "content", "Hi").unwrap();
    assert_eq!(session.history().redo_levels(), 0);
    assert!(!session.redo());
}

#[test]
fn test_history_cap_evicts_oldest() {
    let mut doc = Document::new();
    doc.tree_mut()
        .insert_root(Node::new("page", ComponentType::Column))
        .unwrap();
    let config = EditorConfig {
        max_history_size: 3,
        id_seed: None,
    };
    let mut session = EditSession::with_config("test", doc, &config);

    for i in 0..5 {
        session
            .add_component("page", Node::new(format!("t{}", i), ComponentType::Text), None)
            .unwrap();
    }
    assert_eq!(session.history().undo_levels(), 3);

    while session.undo() {}
    // The first two additions fell off the end of history
    assert_eq!(children(&session, "page"), vec!["t0", "t1"]);
}

#[test]
fn test_undo_does_not_record() {
    let mut session = session();
    session.delete_component("logo").unwrap();
    session.undo();
    assert_eq!(session.history().undo_levels(), 0);
    assert_eq!(session.history().redo_levels(), 1);
}

#[test]
fn test_gesture_is_one_undo_step() {
    let mut session = session();
    let original = session.tree().clone();

    session.begin_gesture("drag");
    session.move_component("title", "body", 0).unwrap();
    session.move_component("title", "frame", 0).unwrap();
    session.move_component("logo", "body", 0).unwrap();
    assert!(session.end_gesture());

    assert_eq!(session.history().undo_levels(), 1);
    assert_eq!(session.history().peek_undo().map(|m| m.action.as_str()), Some("drag"));

    session.undo();
    assert_eq!(session.tree(), &original);
}

#[test]
fn test_cancelled_gesture_reverts() {
    let mut session = session();
    let original = session.tree().clone();

    session.begin_gesture("drag");
    session.move_component("title", "body", 0).unwrap();
    assert!(session.cancel_gesture());

    assert_eq!(session.tree(), &original);
    assert!(!session.history().can_undo());
}

#[test]
fn test_undo_closes_open_gesture() {
    let mut session = session();
    let original = session.tree().clone();

    session.begin_gesture("drag");
    session.move_component("title", "body", 0).unwrap();
    assert!(session.undo());
    assert_eq!(session.tree(), &original);
    assert!(!session.history().in_batch());
}

#[test]
fn test_paste_twice_gives_distinct_ids() {
    let mut session = session();
    assert_eq!(session.copy(&["header".to_string()]), 1);

    let first = session.paste("body", None).unwrap();
    let second = session.paste("body", None).unwrap();

    assert_eq!(first.len(), 1);
    assert_ne!(first, second);
    assert_ne!(first[0], "header");
    assert_eq!(children(&session, "body"), vec![first[0].clone(), second[0].clone()]);
    assert_eq!(session.tree().len(), 12);
    assert!(session.tree().find_duplicate_ids().is_empty());
    assert_eq!(session.tree().validate_tree(), Ok(()));
}

#[test]
fn test_cut_paste_moves_in_one_step() {
    let mut session = session();
    let original = session.tree().clone();

    session.cut(&["logo".to_string()]);
    assert!(session.has_node("logo"));

    let pasted = session.paste("body", Some(0)).unwrap();
    assert!(!session.has_node("logo"));
    assert_eq!(children(&session, "body"), pasted);
    assert_eq!(children(&session, "header"), vec!["title"]);

    // A second paste behaves like a copy
    session.paste("body", None).unwrap();
    assert_eq!(session.get_children("body").len(), 2);

    session.undo();
    session.undo();
    assert_eq!(session.tree(), &original);
}

#[test]
fn test_paste_into_cut_source_is_rejected() {
    let mut session = session();
    session.cut(&["header".to_string()]);

    let err = session.paste("header", None).unwrap_err();
    assert!(matches!(err, EditorError::PasteIntoCutSource(_)));
    assert!(session.has_node("header"));
}

#[test]
fn test_paste_is_atomic() {
    let mut session = session();
    let original = session.tree().clone();
    session.copy(&["logo".to_string(), "title".to_string()]);

    // The card takes the first fragment but not the second
    let err = session.paste("frame", None).unwrap_err();
    assert!(matches!(
        err,
        EditorError::Mutation(MutationError::WrapperOccupied(_))
    ));
    assert_eq!(session.tree(), &original);
    assert!(!session.history().can_undo());
}

#[test]
fn test_paste_with_empty_clipboard() {
    let mut session = session();
    assert!(matches!(
        session.paste("body", None),
        Err(EditorError::ClipboardEmpty)
    ));
}

#[test]
fn test_cut_across_sections_removes_source() {
    let mut session = session();
    session.cut(&["title".to_string()]);

    session.set_active_section(Section::Footer);
    let pasted = session
        .insert_root(Node::new("foot", ComponentType::Row))
        .and_then(|_| session.paste("foot", None))
        .unwrap();

    assert_eq!(pasted.len(), 1);
    assert!(!session.document().section(Section::Content).contains("title"));

    // The source removal is its own step
    assert!(session.undo());
    assert!(session.document().section(Section::Content).contains("title"));
}

#[test]
fn test_duplicate_in_session() {
    let mut session = session();
    let clone_id = session.duplicate_component("header").unwrap();

    assert_eq!(
        children(&session, "page"),
        vec!["header".to_string(), clone_id.clone(), "frame".to_string(), "body".to_string()]
    );
    assert!(clone_id.starts_with("t-"));
    assert_eq!(
        session.history().peek_undo().and_then(|m| m.node_type),
        Some(ComponentType::Row)
    );
}

#[test]
fn test_command_script() {
    let mut session = session();
    let script = r#"[
        {"op": "add_component", "parent_id": "body", "node": {"id": "total", "type": "text"}},
        {"op": "update_property", "node_id": "total", "key": "content", "value": "{{ invoice.total }}"},
        {"op": "add_component_as_child", "parent_id": "frame", "node": {"id": "note", "type": "text"}},
        {"op": "drop_node", "node_id": "logo", "target_id": "total", "position": "after"},
        {"op": "reorder_component", "node_id": "logo", "new_index": 0},
        {"op": "select", "node_ids": ["logo", "total"]},
        {"op": "delete_component", "node_id": "total"},
        {"op": "undo"}
    ]"#;
    let commands: Vec<Mutation> = serde_json::from_str(script).unwrap();

    let mut last = None;
    for command in commands {
        last = Some(session.apply(command).unwrap());
    }

    assert_eq!(children(&session, "body"), vec!["logo", "total"]);
    assert_eq!(session.get_component("frame").unwrap().wrapped_child(), Some("note"));
    assert_eq!(session.selected_nodes(), ["logo"]);
    assert_eq!(last.map(|a| a.version), Some(session.document().version));
}

#[test]
fn test_failed_command_reports_error() {
    let mut session = session();
    let command = Mutation::MoveComponent {
        node_id: "page".to_string(),
        new_parent_id: "body".to_string(),
        index: 0,
    };
    let err = session.apply(command).unwrap_err();
    assert_eq!(err.to_string(), "Mutation error: Cannot move the root component");
}
