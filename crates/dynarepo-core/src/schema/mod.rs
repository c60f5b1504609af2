//! Key schema: the primary key and secondary indexes of one entity type.
//!
//! A [`KeySchema`] is built once per entity type (with [`KeySchema::builder`]
//! or deserialized from JSON) and is read-only afterwards. Planning code
//! consumes it through the [`KeySchemaProvider`] and
//! [`AttributeNameResolver`] traits.

mod provider;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

pub use provider::{AttributeNameResolver, KeySchemaProvider};

/// A secondary index: a name plus its own hash key and optional range key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    pub hash_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_key: Option<String>,
}

impl IndexDefinition {
    pub fn new(name: impl Into<String>, hash_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash_key: hash_key.into(),
            range_key: None,
        }
    }

    pub fn with_range_key(mut self, range_key: impl Into<String>) -> Self {
        self.range_key = Some(range_key.into());
        self
    }

    /// Whether `property` is this index's hash or range key.
    pub fn has_key(&self, property: &str) -> bool {
        self.hash_key == property || self.range_key.as_deref() == Some(property)
    }
}

/// Static description of an entity type's keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "KeySchemaBuilder")]
pub struct KeySchema {
    hash_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    range_key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    indexes: Vec<IndexDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    composite_ids: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attribute_names: BTreeMap<String, String>,
}

impl KeySchema {
    pub fn builder(hash_key: impl Into<String>) -> KeySchemaBuilder {
        KeySchemaBuilder {
            hash_key: hash_key.into(),
            range_key: None,
            indexes: Vec::new(),
            composite_ids: Vec::new(),
            attribute_names: BTreeMap::new(),
        }
    }

    /// Whether the entity has a range key.
    pub fn is_range_aware(&self) -> bool {
        self.range_key.is_some()
    }

    pub fn composite_ids(&self) -> &[String] {
        &self.composite_ids
    }
}

impl KeySchemaProvider for KeySchema {
    fn hash_key_property(&self) -> &str {
        &self.hash_key
    }

    fn range_key_property(&self) -> Option<&str> {
        self.range_key.as_deref()
    }

    fn indexes(&self) -> &[IndexDefinition] {
        &self.indexes
    }

    fn is_composite_id_property(&self, property: &str) -> bool {
        self.composite_ids.iter().any(|p| p == property)
    }

    /// Reads the hash and range components as fields of a JSON object named
    /// after the key properties. Missing or null fields decompose to `None`.
    fn decompose(&self, value: &Value) -> (Option<Value>, Option<Value>) {
        let field = |name: &str| value.get(name).filter(|v| !v.is_null()).cloned();
        let hash = field(self.hash_key.as_str());
        let range = self.range_key.as_deref().and_then(field);
        (hash, range)
    }
}

impl AttributeNameResolver for KeySchema {
    fn overridden_name(&self, property: &str) -> Option<&str> {
        self.attribute_names.get(property).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// KeySchemaBuilder
// ---------------------------------------------------------------------------

/// Builder for a [`KeySchema`]; also the serde representation it is
/// validated from.
#[derive(Debug, Clone, Deserialize)]
pub struct KeySchemaBuilder {
    hash_key: String,
    #[serde(default)]
    range_key: Option<String>,
    #[serde(default)]
    indexes: Vec<IndexDefinition>,
    #[serde(default)]
    composite_ids: Vec<String>,
    #[serde(default)]
    attribute_names: BTreeMap<String, String>,
}

impl KeySchemaBuilder {
    pub fn range_key(mut self, name: impl Into<String>) -> Self {
        self.range_key = Some(name.into());
        self
    }

    /// Declare a secondary index. Declaration order is preserved and used as
    /// the default tie-break during index selection.
    pub fn index(mut self, name: &str, hash_key: &str, range_key: Option<&str>) -> Self {
        let index = IndexDefinition::new(name, hash_key);
        self.indexes.push(match range_key {
            Some(range_key) => index.with_range_key(range_key),
            None => index,
        });
        self
    }

    /// Declare a composite identifier property that decomposes into the
    /// primary hash and range values.
    pub fn composite_id(mut self, property: &str) -> Self {
        self.composite_ids.push(property.to_string());
        self
    }

    /// Store `property` under a different attribute name.
    pub fn attribute_name(mut self, property: &str, attribute: &str) -> Self {
        self.attribute_names
            .insert(property.to_string(), attribute.to_string());
        self
    }

    pub fn build(self) -> Result<KeySchema, SchemaError> {
        if self.hash_key.is_empty() {
            return Err(SchemaError::MissingHashKey);
        }
        if self.range_key.as_deref() == Some(self.hash_key.as_str()) {
            return Err(SchemaError::RangeKeyIsHashKey(self.hash_key));
        }

        for (i, index) in self.indexes.iter().enumerate() {
            if index.name.is_empty() {
                return Err(SchemaError::EmptyIndexName);
            }
            if self.indexes[..i].iter().any(|other| other.name == index.name) {
                return Err(SchemaError::DuplicateIndex(index.name.clone()));
            }
            if index.range_key.as_deref() == Some(index.hash_key.as_str()) {
                return Err(SchemaError::IndexKeyConflict {
                    index: index.name.clone(),
                    property: index.hash_key.clone(),
                });
            }
        }

        if let Some(id) = self
            .composite_ids
            .iter()
            .find(|p| **p == self.hash_key || self.range_key.as_ref() == Some(*p))
        {
            return Err(SchemaError::CompositeIdIsKey(id.clone()));
        }

        Ok(KeySchema {
            hash_key: self.hash_key,
            range_key: self.range_key,
            indexes: self.indexes,
            composite_ids: self.composite_ids,
            attribute_names: self.attribute_names,
        })
    }
}

impl TryFrom<KeySchemaBuilder> for KeySchema {
    type Error = SchemaError;

    fn try_from(builder: KeySchemaBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Helper: the playlist schema used across the planning tests.
    fn playlist_schema() -> KeySchema {
        KeySchema::builder("userName")
            .range_key("playlistName")
            .index("DisplayName-index", "displayName", None)
            .index("User-Created-index", "userName", Some("created"))
            .composite_id("playlistId")
            .attribute_name("displayName", "display_name")
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_valid_schema() {
        let schema = playlist_schema();
        assert_eq!(schema.hash_key_property(), "userName");
        assert_eq!(schema.range_key_property(), Some("playlistName"));
        assert!(schema.is_range_aware());
        assert_eq!(schema.indexes().len(), 2);
        assert!(schema.is_composite_id_property("playlistId"));
        assert!(!schema.is_composite_id_property("userName"));
    }

    #[test]
    fn test_build_rejects_invalid() {
        assert_eq!(
            KeySchema::builder("").build().unwrap_err(),
            SchemaError::MissingHashKey
        );
        assert_eq!(
            KeySchema::builder("id").range_key("id").build().unwrap_err(),
            SchemaError::RangeKeyIsHashKey("id".to_string())
        );
        assert_eq!(
            KeySchema::builder("id")
                .index("a", "x", None)
                .index("a", "y", None)
                .build()
                .unwrap_err(),
            SchemaError::DuplicateIndex("a".to_string())
        );
        assert_eq!(
            KeySchema::builder("id")
                .index("", "x", None)
                .build()
                .unwrap_err(),
            SchemaError::EmptyIndexName
        );
        assert!(matches!(
            KeySchema::builder("id").index("a", "x", Some("x")).build(),
            Err(SchemaError::IndexKeyConflict { .. })
        ));
        assert_eq!(
            KeySchema::builder("id").composite_id("id").build().unwrap_err(),
            SchemaError::CompositeIdIsKey("id".to_string())
        );
    }

    #[test]
    fn test_indexes_for_property_in_declared_order() {
        let schema = KeySchema::builder("id")
            .index("Name-PostCode-index", "name", Some("postCode"))
            .index("Name-JoinYear-index", "name", Some("joinYear"))
            .index("Id-PostCode-index", "id", Some("postCode"))
            .build()
            .unwrap();

        let names: Vec<&str> = schema
            .indexes_for("postCode")
            .map(|idx| idx.name.as_str())
            .collect();
        assert_eq!(names, vec!["Name-PostCode-index", "Id-PostCode-index"]);

        assert!(schema.is_index_hash_key_property("name"));
        assert!(schema.is_index_hash_key_property("id"));
        assert!(!schema.is_index_hash_key_property("postCode"));
        assert!(schema.is_index_range_key_property("postCode"));
        assert!(schema.is_index_range_key_property("joinYear"));
        assert!(!schema.is_index_range_key_property("name"));
        assert_eq!(schema.indexes_for("missing").count(), 0);
    }

    #[test]
    fn test_property_can_be_hash_and_range_of_different_indexes() {
        let schema = KeySchema::builder("id")
            .index("A-B", "a", Some("b"))
            .index("B-C", "b", Some("c"))
            .build()
            .unwrap();
        assert!(schema.is_index_hash_key_property("b"));
        assert!(schema.is_index_range_key_property("b"));
        assert_eq!(schema.indexes_for("b").count(), 2);
    }

    #[test]
    fn test_decompose_composite_value() {
        let schema = playlist_schema();
        let (hash, range) =
            schema.decompose(&json!({"userName": "alice", "playlistName": "road trip"}));
        assert_eq!(hash, Some(json!("alice")));
        assert_eq!(range, Some(json!("road trip")));

        let (hash, range) =
            schema.decompose(&json!({"playlistName": "road trip", "userName": null}));
        assert_eq!(hash, None);
        assert_eq!(range, Some(json!("road trip")));

        assert_eq!(schema.decompose(&json!("not an object")), (None, None));
    }

    #[test]
    fn test_attribute_name_override() {
        let schema = playlist_schema();
        assert_eq!(schema.overridden_name("displayName"), Some("display_name"));
        assert_eq!(schema.attribute_name("displayName"), "display_name");
        assert_eq!(schema.overridden_name("userName"), None);
        assert_eq!(schema.attribute_name("userName"), "userName");
    }

    #[test]
    fn test_deserialize_validates() {
        let schema: KeySchema = serde_json::from_value(json!({
            "hash_key": "id",
            "indexes": [{"name": "Name-index", "hash_key": "name"}],
            "attribute_names": {"name": "full_name"}
        }))
        .unwrap();
        assert_eq!(schema.index("Name-index").unwrap().hash_key, "name");
        assert_eq!(schema.attribute_name("name"), "full_name");

        let bad = serde_json::from_value::<KeySchema>(json!({"hash_key": "id", "range_key": "id"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_serialize_round_trips_through_validation() {
        let schema = playlist_schema();
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["hash_key"], "userName");
        let back: KeySchema = serde_json::from_value(value).unwrap();
        assert_eq!(back, schema);
    }
}
