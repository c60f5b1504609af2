//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};

use dynarepo_core::{
    AccessPlan, ConditionSet, KeySchema, MemoryStore, PlanError, Planner, PlannerConfig,
    Projection,
};

/// Playlist: hash `userName`, range `playlistName`, composite id
/// `playlistId`, one global and one local-style index.
pub fn playlist_schema() -> KeySchema {
    KeySchema::builder("userName")
        .range_key("playlistName")
        .index("DisplayName-index", "displayName", None)
        .index("User-Created-index", "userName", Some("created"))
        .composite_id("playlistId")
        .attribute_name("displayName", "display_name")
        .build()
        .unwrap()
}

/// User: hash-only `id` with indexes sharing the `name` hash key.
pub fn user_schema() -> KeySchema {
    KeySchema::builder("id")
        .index("Name-PostCode-index", "name", Some("postCode"))
        .index("Name-JoinYear-index", "name", Some("joinYear"))
        .build()
        .unwrap()
}

/// [`user_schema`] plus an exact `name` index declared last.
pub fn user_schema_with_name_index() -> KeySchema {
    KeySchema::builder("id")
        .index("Name-PostCode-index", "name", Some("postCode"))
        .index("Name-JoinYear-index", "name", Some("joinYear"))
        .index("Name-index", "name", None)
        .build()
        .unwrap()
}

/// Plan with scans enabled for both terminals.
pub fn plan(
    schema: &KeySchema,
    set: &ConditionSet,
    projection: Projection,
) -> Result<AccessPlan, PlanError> {
    let config = PlannerConfig::with_scans();
    Planner::new(schema, &config).plan(set, projection)
}

pub fn playlists() -> Vec<Value> {
    vec![
        json!({"userName": "alice", "playlistName": "commute", "display_name": "Commute", "created": 300, "rating": 4}),
        json!({"userName": "alice", "playlistName": "gym", "display_name": "Workout", "created": 100, "rating": 5}),
        json!({"userName": "alice", "playlistName": "road trip", "display_name": "Road", "created": 200, "rating": 3}),
        json!({"userName": "bob", "playlistName": "road trip", "display_name": "Road", "created": 150, "rating": 2}),
        json!({"userName": "carol", "playlistName": "focus", "display_name": "Focus", "created": 50, "rating": 5}),
    ]
}

pub fn playlist_store(schema: &KeySchema) -> MemoryStore {
    MemoryStore::for_schema(schema).with_items(playlists())
}
