//! Shared fixtures for beaverdam-core integration tests

use beaverdam_core::{
    FieldRegistry, FieldSelector, Projection, ResultTable, SelectionEngine, Value,
};

/// Parse a JSON literal into a document
pub fn doc(json: &str) -> Value {
    serde_json::from_str(json).unwrap_or_else(|e| panic!("bad fixture {json}: {e}"))
}

/// Registry for the music fixtures
pub fn music_registry() -> FieldRegistry {
    FieldRegistry::from_pairs([
        ("title", "info.title"),
        ("genre", "info.music.genre"),
        ("tags", "info.tags"),
    ])
    .expect("fixture registry")
}

pub fn music_projection() -> Projection {
    music_registry()
        .projection(FieldSelector::All)
        .expect("fixture projection")
}

/// Three albums: jazz, rock, jazz
pub fn music_documents() -> Vec<(String, Value)> {
    vec![
        (
            "d1".into(),
            doc(r#"{"info": {"title": "Kind of Blue", "music": {"genre": "jazz"}, "tags": ["modal", "studio"]}}"#),
        ),
        (
            "d2".into(),
            doc(r#"{"info": {"title": "Paranoid", "music": {"genre": "rock"}, "tags": ["studio"]}}"#),
        ),
        (
            "d3".into(),
            doc(r#"{"info": {"title": "Live at Birdland", "music": {"genre": "jazz"}, "tags": ["live"]}}"#),
        ),
    ]
}

pub fn music_engine() -> SelectionEngine {
    SelectionEngine::new(ResultTable::from_query(music_documents(), &music_projection()))
}

/// Ids of the visible rows, in table order
pub fn visible_ids(engine: &SelectionEngine) -> Vec<String> {
    engine.visible_rows().iter().map(|r| r.id.clone()).collect()
}
