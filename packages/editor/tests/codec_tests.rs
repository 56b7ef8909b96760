use coursekit_editor::{
    violations, Command, Document, EditSession, EditorConfig, EditorError, NodeKind,
    EMPTY_DOCUMENT_JSON,
};
use serde_json::{json, Value};

fn authored_document() -> Document {
    let config = EditorConfig::sequential("rt");
    let mut session = EditSession::new("codec", Document::new(&config), &config);
    for command in [
        Command::InsertText("Intro".to_string()),
        Command::InsertMcq,
        Command::InsertText(" Pick one".to_string()),
        Command::KeyEnter { ctrl: true },
        Command::InsertText(" A".to_string()),
        Command::AddMcqOption,
        Command::InsertText("C".to_string()),
        Command::InsertCollapsible,
        Command::InsertText("More".to_string()),
    ] {
        session.dispatch(command);
    }
    let mcq = session.document.blocks()[1];
    let options = session.document.tree().children(mcq)[1];
    let option = session.document.tree().children(options)[2];
    session.dispatch(Command::SetMcqOptionChecked {
        option,
        checked: true,
    });
    let container = session.document.blocks()[2];
    session.dispatch(Command::ToggleCollapsible { container });
    session.document
}

fn as_value(json: &str) -> Value {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_round_trip_is_stable() {
    let doc = authored_document();
    let exported = doc.to_json().unwrap();

    let reimported = Document::from_json(&exported, &EditorConfig::sequential("other")).unwrap();
    assert_eq!(as_value(&reimported.to_json().unwrap()), as_value(&exported));
    assert!(violations(reimported.tree()).is_empty());
}

#[test]
fn test_exported_shape() {
    let doc = authored_document();
    let value = as_value(&doc.to_json().unwrap());
    let blocks = value["root"]["children"].as_array().unwrap();
    assert_eq!(blocks.len(), 3);

    let mcq = &blocks[1];
    assert_eq!(mcq["type"], "mcq-container");
    let parts: Vec<&str> = mcq["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["type"].as_str().unwrap())
        .collect();
    assert_eq!(parts, ["mcq-question", "mcq-options-container", "explanation"]);
    let options = mcq["children"][1]["children"].as_array().unwrap();
    assert_eq!(options.len(), 3);
    assert_eq!(options[2]["checked"], true);

    let section = &blocks[2];
    assert_eq!(section["type"], "collapsible-container");
    assert_eq!(section["open"], false);
    assert!(section["blockId"].is_string());
}

#[test]
fn test_failed_import_leaves_document_untouched() {
    let mut doc = authored_document();
    let before = doc.to_json().unwrap();
    let version = doc.version();

    let bad = r#"{"root":{"type":"root","version":1,"children":[
        {"type":"paragraph","version":1,"children":[]},
        {"type":"mcq-option","version":1,"children":[]}
    ]}}"#;
    assert!(doc.import_json(bad).is_err());
    assert_eq!(doc.to_json().unwrap(), before);
    assert_eq!(doc.version(), version);

    let err = Document::from_json("not json", &EditorConfig::default()).unwrap_err();
    assert!(matches!(err, EditorError::Codec(_)));
}

#[test]
fn test_incomplete_question_is_repaired_on_import() {
    let payload = json!({
        "root": { "type": "root", "version": 1, "children": [
            { "type": "mcq-container", "version": 1, "blockId": "q-1", "children": [
                { "type": "mcq-question", "version": 1, "blockId": "q-2", "children": [
                    { "type": "paragraph", "version": 1, "children": [
                        { "type": "text", "version": 1, "text": "Legacy?" }
                    ]}
                ]},
                { "type": "mcq-options-container", "version": 1, "children": [
                    { "type": "mcq-option", "version": 1, "checked": true, "children": [] }
                ]}
            ]}
        ]}
    });
    let doc = Document::from_json(&payload.to_string(), &EditorConfig::sequential("fix")).unwrap();
    let tree = doc.tree();
    assert!(violations(tree).is_empty());

    let mcq = doc.blocks()[0];
    assert_eq!(tree.block_id(mcq).map(|b| b.as_str()), Some("q-1"));
    let kinds: Vec<_> = tree.children(mcq).iter().map(|c| tree.kind(*c)).collect();
    assert_eq!(
        kinds,
        [
            Some(NodeKind::McqQuestion),
            Some(NodeKind::McqOptions),
            Some(NodeKind::McqExplanation)
        ]
    );
    assert_eq!(tree.text_content(tree.children(mcq)[0]), "Legacy?");
    assert!(tree.child_count(tree.children(mcq)[1]) >= 2);
    assert!(tree
        .descendants(tree.root())
        .iter()
        .filter(|k| tree.kind(**k).is_some_and(|k| k.is_trackable()))
        .all(|k| tree.block_id(*k).is_some()));
}

#[test]
fn test_empty_document_payload() {
    let doc = Document::from_json(EMPTY_DOCUMENT_JSON, &EditorConfig::sequential("e")).unwrap();
    assert_eq!(doc.blocks().len(), 1);
    assert_eq!(doc.tree().kind(doc.blocks()[0]), Some(NodeKind::Paragraph));
}
