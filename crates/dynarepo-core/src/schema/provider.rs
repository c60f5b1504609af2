//! Collaborator traits consumed by the criteria builder, planner, and
//! request assembler.

use serde_json::Value;

use super::IndexDefinition;

/// Read-only access to an entity's key layout.
pub trait KeySchemaProvider {
    fn hash_key_property(&self) -> &str;

    fn range_key_property(&self) -> Option<&str>;

    /// Secondary indexes in declaration order.
    fn indexes(&self) -> &[IndexDefinition];

    fn is_composite_id_property(&self, property: &str) -> bool;

    /// Split a composite identifier value into its hash and range components.
    fn decompose(&self, value: &Value) -> (Option<Value>, Option<Value>);

    fn is_hash_key_property(&self, property: &str) -> bool {
        self.hash_key_property() == property
    }

    fn is_range_key_property(&self, property: &str) -> bool {
        self.range_key_property() == Some(property)
    }

    fn index(&self, name: &str) -> Option<&IndexDefinition> {
        self.indexes().iter().find(|idx| idx.name == name)
    }

    /// Every index using `property` as hash or range key, in declaration order.
    fn indexes_for<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a IndexDefinition> {
        self.indexes().iter().filter(move |idx| idx.has_key(property))
    }

    fn is_index_hash_key_property(&self, property: &str) -> bool {
        self.indexes().iter().any(|idx| idx.hash_key == property)
    }

    fn is_index_range_key_property(&self, property: &str) -> bool {
        self.indexes()
            .iter()
            .any(|idx| idx.range_key.as_deref() == Some(property))
    }
}

/// Maps logical property names to stored attribute names.
pub trait AttributeNameResolver {
    fn overridden_name(&self, property: &str) -> Option<&str>;

    fn attribute_name<'a>(&'a self, property: &'a str) -> &'a str {
        self.overridden_name(property).unwrap_or(property)
    }
}
