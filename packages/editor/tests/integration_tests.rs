//! Integration tests for the editor crate

use stencil_editor::{Document, EditSession, EditorError, Section};
use stencil_tree::{ComponentType, Node};

const TEMPLATE: &str = r#"{
    "pageSize": "A4",
    "orientation": "portrait",
    "margins": {"top": 24, "right": 16, "bottom": 24, "left": 16},
    "header": {
        "id": "header", "type": "row", "properties": {},
        "children": [
            {"id": "logo", "type": "image", "properties": {"src": "logo.png", "width": 120}}
        ]
    },
    "content": {
        "id": "page", "type": "column", "properties": {"gap": 8},
        "children": [
            {"id": "title", "type": "text", "properties": {"content": "Invoice {{ invoice.number }}"}},
            {"id": "lines", "type": "table", "properties": {}, "children": [
                {"id": "line", "type": "table_row", "properties": {},
                 "repeatFor": "{{ invoice.lines }}", "repeatAs": "line",
                 "children": [
                    {"id": "cell", "type": "table_cell", "properties": {},
                     "child": {"id": "amount", "type": "text", "properties": {"content": "{{ line.amount }}"}}}
                 ]}
            ]}
        ]
    },
    "footer": {
        "id": "footer", "type": "align", "properties": {"alignment": "center"},
        "child": {"id": "number", "type": "page_number", "properties": {}}
    }
}"#;

#[test]
fn test_document_lifecycle() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("invoice.json");
    std::fs::write(&path, TEMPLATE)?;

    let doc = Document::load(&path)?;
    assert_eq!(doc.version, 0);
    assert!(!doc.is_dirty());
    assert_eq!(doc.node_count(), 10);

    let mut session = EditSession::new("test-client", doc);
    session.update_component_property("title", "bold", true)?;
    assert!(session.document().is_dirty());

    let mut doc = session.into_document();
    doc.save()?;
    assert!(!doc.is_dirty());

    let reloaded = Document::load(&path)?;
    let title = reloaded.section(Section::Content).get("title").unwrap();
    assert_eq!(title.property("bold").and_then(|v| v.as_bool()), Some(true));
    Ok(())
}

#[test]
fn test_round_trip_is_lossless() -> anyhow::Result<()> {
    let doc = Document::from_json(TEMPLATE)?;
    let saved: serde_json::Value = serde_json::from_str(&doc.to_json()?)?;
    let original: serde_json::Value = serde_json::from_str(TEMPLATE)?;
    assert_eq!(saved, original);
    Ok(())
}

#[test]
fn test_sections_are_independent() -> anyhow::Result<()> {
    let mut session = EditSession::new("test-client", Document::from_json(TEMPLATE)?);

    session.set_active_section(Section::Header);
    session.add_component("header", Node::new("date", ComponentType::Text), None)?;
    session.set_active_section(Section::Content);
    session.delete_component("title")?;

    let doc = session.document();
    assert!(doc.section(Section::Header).contains("date"));
    assert!(!doc.section(Section::Content).contains("date"));
    assert!(!doc.section(Section::Content).contains("title"));

    // Undo walks back across sections in order
    assert!(session.undo());
    assert!(session.document().section(Section::Content).contains("title"));
    assert!(session.undo());
    assert!(!session.document().section(Section::Header).contains("date"));
    assert!(!session.undo());
    Ok(())
}

#[test]
fn test_active_section_scopes_queries() -> anyhow::Result<()> {
    let mut session = EditSession::new("test-client", Document::from_json(TEMPLATE)?);
    session.set_active_section(Section::Footer);

    // "title" lives in content; the footer tree does not see it
    assert!(!session.has_node("title"));
    session.move_component("number", "footer", 0)?;
    assert_eq!(session.all_node_ids(), vec!["footer", "number"]);
    Ok(())
}

#[test]
fn test_invalid_documents_are_rejected() {
    let leaf_with_children = r#"{"content": {"id": "t", "type": "text", "children": [{"id": "x", "type": "text"}]}}"#;
    assert!(matches!(
        Document::from_json(leaf_with_children),
        Err(EditorError::Load(_))
    ));

    let duplicate = r#"{"content": {"id": "a", "type": "row", "children": [
        {"id": "x", "type": "text"}, {"id": "x", "type": "text"}
    ]}}"#;
    assert!(matches!(Document::from_json(duplicate), Err(EditorError::Load(_))));

    assert!(matches!(
        Document::from_json("{not json"),
        Err(EditorError::Json(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = Document::load("/definitely/not/here.json");
    assert!(matches!(result, Err(EditorError::Io(_))));
}
