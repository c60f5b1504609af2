//! Criteria: per-invocation accumulator that binds conditions to key roles.
//!
//! Equality on the primary hash or range property binds that key value.
//! Everything else lands in the residual conditions, keyed by property and
//! kept in first-seen order. The planner reads the accumulated state through
//! the predicates below.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::trace;

use crate::config::IndexOrder;
use crate::error::PlanError;
use crate::schema::{IndexDefinition, KeySchemaProvider};
use crate::types::{Condition, Operator, Sort};

/// Where an index key condition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// A bound primary hash or range value.
    Bound,
    /// A residual condition on the index key property.
    Residual,
}

/// A secondary index that can serve the accumulated conditions, together
/// with the key conditions it would use.
#[derive(Debug, Clone)]
pub struct IndexMatch<'s> {
    pub index: &'s IndexDefinition,
    pub hash_condition: Condition,
    pub hash_source: KeySource,
    pub range_condition: Option<(Condition, KeySource)>,
}

impl IndexMatch<'_> {
    /// Whether `property`'s residual conditions were consumed as key conditions.
    fn consumes_residual(&self, property: &str) -> bool {
        (self.hash_source == KeySource::Residual && self.index.hash_key == property)
            || matches!(
                &self.range_condition,
                Some((cond, KeySource::Residual)) if cond.property() == property
            )
    }

    /// Whether the bound primary value of `property` was consumed as a key.
    fn consumes_bound(&self, property: &str) -> bool {
        (self.hash_source == KeySource::Bound && self.index.hash_key == property)
            || matches!(
                &self.range_condition,
                Some((cond, KeySource::Bound)) if cond.property() == property
            )
    }
}

/// Condition accumulator for one query invocation.
///
/// Borrows the key schema read-only and is discarded after planning.
#[derive(Debug, Clone)]
pub struct Criteria<'s, S: KeySchemaProvider + ?Sized> {
    schema: &'s S,
    hash_key_value: Option<Value>,
    range_key_value: Option<Value>,
    residual: Vec<(String, Vec<Condition>)>,
}

impl<'s, S: KeySchemaProvider + ?Sized> Criteria<'s, S> {
    pub fn new(schema: &'s S) -> Self {
        Self {
            schema,
            hash_key_value: None,
            range_key_value: None,
            residual: Vec::new(),
        }
    }

    /// Accumulate every condition of `conditions` in order.
    pub fn with_conditions<'c>(
        mut self,
        conditions: impl IntoIterator<Item = &'c Condition>,
    ) -> Result<Self, PlanError> {
        for condition in conditions {
            self.with_condition(condition)?;
        }
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Binding
    // -----------------------------------------------------------------------

    /// Route one condition to the equality binder, the composite-id
    /// decomposer, or the residual conditions.
    pub fn with_condition(&mut self, condition: &Condition) -> Result<&mut Self, PlanError> {
        let property = condition.property();
        if let Some(value) = condition.equality_value() {
            return self.with_property_equals(property, value.clone());
        }
        if self.schema.is_composite_id_property(property) {
            if !condition.operator().is_composite_id_operator() {
                return Err(PlanError::AmbiguousCompositeIdentifier {
                    property: property.to_string(),
                    operator: condition.operator(),
                });
            }
            return self.with_composite_id_condition(condition);
        }
        Ok(self.with_property_condition(condition.clone()))
    }

    /// Bind an equality on `property`.
    ///
    /// The primary hash and range properties bind their key value (a second,
    /// different value is kept as a residual `EQ`). A composite-id property
    /// binds each non-null component it decomposes into, and is rejected when
    /// it decomposes into none. Any other property becomes a residual `EQ`.
    pub fn with_property_equals(
        &mut self,
        property: &str,
        value: Value,
    ) -> Result<&mut Self, PlanError> {
        let schema = self.schema;
        let is_hash = schema.is_hash_key_property(property);
        let is_range = schema.is_range_key_property(property);
        let is_composite = schema.is_composite_id_property(property);

        if value.is_null() && (is_hash || is_range || is_composite) {
            return Err(PlanError::NullKeyValue(property.to_string()));
        }

        if is_composite {
            let (hash, range) = schema.decompose(&value);
            trace!(
                property,
                hash = hash.is_some(),
                range = range.is_some(),
                "decomposed composite id"
            );
            let range = range.zip(schema.range_key_property());
            if hash.is_none() && range.is_none() {
                return Err(PlanError::InvalidCompositeIdentifier(property.to_string()));
            }
            if let Some(hash) = hash {
                self.with_property_equals(schema.hash_key_property(), hash)?;
            }
            if let Some((range, range_property)) = range {
                self.with_property_equals(range_property, range)?;
            }
            return Ok(self);
        }

        let slot = if is_hash {
            &mut self.hash_key_value
        } else if is_range {
            &mut self.range_key_value
        } else {
            return Ok(self.with_property_condition(Condition::eq(property, value)));
        };
        match slot.as_ref().map(|bound| *bound == value) {
            None => {
                trace!(property, "bound key value");
                *slot = Some(value);
            }
            Some(true) => {}
            Some(false) => {
                self.with_property_condition(Condition::eq(property, value));
            }
        }
        Ok(self)
    }

    /// Record a condition as residual.
    pub fn with_property_condition(&mut self, condition: Condition) -> &mut Self {
        trace!(
            property = condition.property(),
            operator = %condition.operator(),
            "residual condition"
        );
        match self
            .residual
            .iter_mut()
            .find(|(p, _)| p == condition.property())
        {
            Some((_, conditions)) => conditions.push(condition),
            None => self
                .residual
                .push((condition.property().to_string(), vec![condition])),
        }
        self
    }

    /// `CONTAINS` / `BEGINS_WITH` on a composite id: one residual condition
    /// per non-null component, with the same operator.
    fn with_composite_id_condition(
        &mut self,
        condition: &Condition,
    ) -> Result<&mut Self, PlanError> {
        let schema = self.schema;
        let Some(value) = condition.values().first() else {
            return Ok(self);
        };
        if value.is_null() {
            return Err(PlanError::NullKeyValue(condition.property().to_string()));
        }
        let (hash, range) = schema.decompose(value);
        let components = [
            (Some(schema.hash_key_property()), hash),
            (schema.range_key_property(), range),
        ];
        let mut derived = Vec::with_capacity(2);
        for (property, component) in components {
            if let (Some(property), Some(component)) = (property, component) {
                let component = Condition::new(property, condition.operator(), vec![component])
                    .map_err(|_| PlanError::AmbiguousCompositeIdentifier {
                        property: condition.property().to_string(),
                        operator: condition.operator(),
                    })?;
                derived.push(component);
            }
        }
        if derived.is_empty() {
            return Err(PlanError::InvalidCompositeIdentifier(
                condition.property().to_string(),
            ));
        }
        for component in derived {
            self.with_property_condition(component);
        }
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn schema(&self) -> &'s S {
        self.schema
    }

    pub fn hash_key_value(&self) -> Option<&Value> {
        self.hash_key_value.as_ref()
    }

    pub fn range_key_value(&self) -> Option<&Value> {
        self.range_key_value.as_ref()
    }

    /// Residual conditions grouped by property, in first-seen order.
    pub fn residual_conditions(&self) -> &[(String, Vec<Condition>)] {
        &self.residual
    }

    pub fn residual_conditions_for(&self, property: &str) -> &[Condition] {
        self.residual
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, conditions)| conditions.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_residual_conditions(&self) -> bool {
        !self.residual.is_empty()
    }

    /// The bound primary key values as `EQ` conditions, hash first.
    pub fn bound_key_conditions(&self) -> Vec<Condition> {
        let mut conditions = Vec::with_capacity(2);
        if let Some(hash) = &self.hash_key_value {
            conditions.push(Condition::eq(self.schema.hash_key_property(), hash.clone()));
        }
        if let (Some(range), Some(property)) =
            (&self.range_key_value, self.schema.range_key_property())
        {
            conditions.push(Condition::eq(property, range.clone()));
        }
        conditions
    }

    // -----------------------------------------------------------------------
    // Predicates
    // -----------------------------------------------------------------------

    pub fn is_hash_key_specified(&self) -> bool {
        self.hash_key_value.is_some()
    }

    pub fn is_range_key_specified(&self) -> bool {
        self.range_key_value.is_some()
    }

    pub fn is_only_hash_key_specified(&self) -> bool {
        self.is_hash_key_specified() && !self.is_range_key_specified() && self.residual.is_empty()
    }

    /// Hash (and range, for a range-aware entity) bound with nothing else.
    pub fn is_applicable_for_load(&self) -> bool {
        if self.has_residual_conditions() || !self.is_hash_key_specified() {
            return false;
        }
        self.schema.range_key_property().is_none() || self.is_range_key_specified()
    }

    /// Exactly one residual condition, on the primary range property or on
    /// an index range property, with no range value bound.
    pub fn is_only_single_residual_on_range_or_index_range(&self) -> bool {
        if self.is_range_key_specified() {
            return false;
        }
        match self.residual.as_slice() {
            [(property, conditions)] if conditions.len() == 1 => {
                self.schema.is_range_key_property(property)
                    || self.schema.is_index_range_key_property(property)
            }
            _ => false,
        }
    }

    /// The single residual condition, when there is exactly one.
    pub fn single_residual_condition(&self) -> Option<&Condition> {
        match self.residual.as_slice() {
            [(_, conditions)] if conditions.len() == 1 => conditions.first(),
            _ => None,
        }
    }

    /// Every residual condition on a primary or index range property uses a
    /// key-legal operator.
    pub fn key_operators_permitted_for_query(&self) -> bool {
        self.residual
            .iter()
            .filter(|(property, _)| {
                self.schema.is_range_key_property(property)
                    || self.schema.is_index_range_key_property(property)
            })
            .flat_map(|(_, conditions)| conditions)
            .all(|condition| condition.operator().is_key_operator())
    }

    /// Primary-key Query: only the hash bound, or the hash bound plus one
    /// key-legal residual condition on the range or an index range property.
    pub fn is_applicable_for_query(&self) -> bool {
        self.is_only_hash_key_specified()
            || (self.is_hash_key_specified()
                && self.is_only_single_residual_on_range_or_index_range()
                && self.key_operators_permitted_for_query())
    }

    /// Some index hash property has an equality binding: a bound primary
    /// hash/range value, or a residual `EQ` condition.
    pub fn has_index_hash_key_equal_condition(&self) -> bool {
        let bound = self.bound_properties();
        let residual_eq = self.residual.iter().filter_map(|(property, conditions)| {
            conditions
                .iter()
                .any(|c| c.operator() == Operator::Eq)
                .then_some(property.as_str())
        });
        bound
            .into_iter()
            .chain(residual_eq)
            .any(|property| self.schema.is_index_hash_key_property(property))
    }

    /// Some index range property has a condition of any operator, or a
    /// bound primary value.
    pub fn has_index_range_key_condition(&self) -> bool {
        self.bound_properties()
            .into_iter()
            .chain(self.residual.iter().map(|(p, _)| p.as_str()))
            .any(|property| self.schema.is_index_range_key_property(property))
    }

    pub fn is_applicable_for_global_secondary_index(&self) -> bool {
        !self.index_candidates(IndexOrder::Declared).is_empty()
    }

    /// Name of the index the planner would query, if any.
    pub fn global_secondary_index_name(
        &self,
        order: IndexOrder,
        sort: Option<&Sort>,
    ) -> Option<&'s str> {
        self.select_index(order, sort)
            .map(|found| found.index.name.as_str())
    }

    // -----------------------------------------------------------------------
    // Index matching
    // -----------------------------------------------------------------------

    /// Properties with a bound primary key value.
    fn bound_properties(&self) -> Vec<&'s str> {
        let mut properties = Vec::with_capacity(2);
        if self.hash_key_value.is_some() {
            properties.push(self.schema.hash_key_property());
        }
        if self.range_key_value.is_some()
            && let Some(range) = self.schema.range_key_property()
        {
            properties.push(range);
        }
        properties
    }

    fn bound_value(&self, property: &str) -> Option<&Value> {
        if self.schema.is_hash_key_property(property) {
            self.hash_key_value.as_ref()
        } else if self.schema.is_range_key_property(property) {
            self.range_key_value.as_ref()
        } else {
            None
        }
    }

    /// Residual properties plus bound primary key properties.
    fn condition_properties(&self) -> BTreeSet<&str> {
        self.residual
            .iter()
            .map(|(p, _)| p.as_str())
            .chain(self.bound_properties())
            .collect()
    }

    /// Try to serve the accumulated conditions from `index`.
    ///
    /// The index hash property needs an equality binding. When residual
    /// conditions target the index range property there must be exactly one,
    /// with a key-legal operator.
    pub fn match_index(&self, index: &'s IndexDefinition) -> Option<IndexMatch<'s>> {
        let (hash_condition, hash_source) = match self.bound_value(&index.hash_key) {
            Some(value) => (
                Condition::eq(index.hash_key.as_str(), value.clone()),
                KeySource::Bound,
            ),
            None => match self.residual_conditions_for(&index.hash_key) {
                [only] if only.operator() == Operator::Eq => (only.clone(), KeySource::Residual),
                _ => return None,
            },
        };

        let range_condition = match index.range_key.as_deref() {
            None => None,
            Some(range) => match self.bound_value(range) {
                Some(value) => Some((Condition::eq(range, value.clone()), KeySource::Bound)),
                None => match self.residual_conditions_for(range) {
                    [] => None,
                    [only] if only.operator().is_key_operator() => {
                        Some((only.clone(), KeySource::Residual))
                    }
                    _ => return None,
                },
            },
        };

        Some(IndexMatch {
            index,
            hash_condition,
            hash_source,
            range_condition,
        })
    }

    /// Every index that can serve the conditions, in `order`.
    pub fn index_candidates(&self, order: IndexOrder) -> Vec<IndexMatch<'s>> {
        let mut indexes: Vec<&'s IndexDefinition> = self.schema.indexes().iter().collect();
        if order == IndexOrder::Lexicographic {
            indexes.sort_by(|a, b| a.name.cmp(&b.name));
        }
        indexes
            .into_iter()
            .filter_map(|index| self.match_index(index))
            .collect()
    }

    /// Pick one candidate index.
    ///
    /// An index whose range key is the sort target comes first. Then an index
    /// whose key set equals the condition properties wins, then one whose key
    /// set covers them, then any candidate, preferring the one whose keys
    /// cover the most condition properties. Remaining ties follow `order`.
    pub fn select_index(&self, order: IndexOrder, sort: Option<&Sort>) -> Option<IndexMatch<'s>> {
        let wanted = self.condition_properties();
        let sort_target = sort.map(|s| s.property.as_str());

        let rank = |found: &IndexMatch<'_>| {
            let index = found.index;
            let keys: BTreeSet<&str> = std::iter::once(index.hash_key.as_str())
                .chain(index.range_key.as_deref())
                .collect();
            let tier = if keys == wanted {
                0
            } else if keys.is_superset(&wanted) {
                1
            } else {
                2
            };
            let covered = keys.intersection(&wanted).count();
            let sorted = sort_target.is_some() && index.range_key.as_deref() == sort_target;
            (!sorted, tier, std::cmp::Reverse(covered))
        };

        // min_by_key keeps the first of equal keys, preserving `order`.
        self.index_candidates(order).into_iter().min_by_key(rank)
    }

    /// Conditions left over after `found` consumed its key conditions:
    /// unconsumed bound key values as `EQ` first, then residuals.
    pub fn filters_after(&self, found: &IndexMatch<'_>) -> Vec<Condition> {
        let bound = self
            .bound_key_conditions()
            .into_iter()
            .filter(|c| !found.consumes_bound(c.property()));
        let residual = self
            .residual
            .iter()
            .filter(|(property, _)| !found.consumes_residual(property))
            .flat_map(|(_, conditions)| conditions.iter().cloned());
        bound.chain(residual).collect()
    }

    /// All residual conditions flattened in insertion order.
    pub fn residual_filters(&self) -> Vec<Condition> {
        self.residual
            .iter()
            .flat_map(|(_, conditions)| conditions.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::KeySchema;
    use serde_json::json;

    fn playlist_schema() -> KeySchema {
        KeySchema::builder("userName")
            .range_key("playlistName")
            .index("DisplayName-index", "displayName", None)
            .index("User-Created-index", "userName", Some("created"))
            .composite_id("playlistId")
            .build()
            .unwrap()
    }

    fn user_schema() -> KeySchema {
        KeySchema::builder("id")
            .index("Name-PostCode-index", "name", Some("postCode"))
            .index("Name-JoinYear-index", "name", Some("joinYear"))
            .build()
            .unwrap()
    }

    // -----------------------------------------------------------------------
    // Binding
    // -----------------------------------------------------------------------

    #[test]
    fn test_equals_binds_primary_keys() {
        let schema = playlist_schema();
        let mut criteria = Criteria::new(&schema);
        criteria.with_property_equals("userName", json!("alice")).unwrap();
        criteria
            .with_property_equals("playlistName", json!("road trip"))
            .unwrap();
        criteria.with_property_equals("displayName", json!("Road")).unwrap();

        assert_eq!(criteria.hash_key_value(), Some(&json!("alice")));
        assert_eq!(criteria.range_key_value(), Some(&json!("road trip")));
        assert_eq!(criteria.residual_conditions().len(), 1);
        assert_eq!(
            criteria.residual_conditions_for("displayName"),
            &[Condition::eq("displayName", "Road")]
        );
    }

    #[test]
    fn test_second_different_hash_value_is_residual() {
        let schema = playlist_schema();
        let mut criteria = Criteria::new(&schema);
        criteria.with_property_equals("userName", json!("alice")).unwrap();
        criteria.with_property_equals("userName", json!("alice")).unwrap();
        assert!(!criteria.has_residual_conditions());

        criteria.with_property_equals("userName", json!("bob")).unwrap();
        assert_eq!(criteria.hash_key_value(), Some(&json!("alice")));
        assert_eq!(criteria.residual_conditions_for("userName").len(), 1);
    }

    #[test]
    fn test_null_key_value_rejected() {
        let schema = playlist_schema();
        let mut criteria = Criteria::new(&schema);
        for property in ["userName", "playlistName", "playlistId"] {
            let err = criteria
                .with_property_equals(property, Value::Null)
                .unwrap_err();
            assert_eq!(err, PlanError::NullKeyValue(property.to_string()));
        }
        criteria.with_property_equals("displayName", Value::Null).unwrap();
        assert_eq!(criteria.residual_conditions().len(), 1);
    }

    #[test]
    fn test_non_equality_is_residual() {
        let schema = playlist_schema();
        let set = crate::types::ConditionSet::new()
            .eq("userName", "alice")
            .begins_with("playlistName", "road");
        let criteria = Criteria::new(&schema)
            .with_conditions(set.conditions())
            .unwrap();
        assert!(criteria.is_hash_key_specified());
        assert!(!criteria.is_range_key_specified());
        assert_eq!(
            criteria.residual_conditions_for("playlistName")[0].operator(),
            Operator::BeginsWith
        );
    }

    // -----------------------------------------------------------------------
    // Composite ids
    // -----------------------------------------------------------------------

    #[test]
    fn test_composite_id_decomposes_to_both_keys() {
        let schema = playlist_schema();
        let mut composite = Criteria::new(&schema);
        composite
            .with_property_equals(
                "playlistId",
                json!({"userName": "alice", "playlistName": "road trip"}),
            )
            .unwrap();

        let mut direct = Criteria::new(&schema);
        direct.with_property_equals("userName", json!("alice")).unwrap();
        direct
            .with_property_equals("playlistName", json!("road trip"))
            .unwrap();

        assert_eq!(composite.hash_key_value(), direct.hash_key_value());
        assert_eq!(composite.range_key_value(), direct.range_key_value());
        assert_eq!(
            composite.residual_conditions(),
            direct.residual_conditions()
        );
        assert!(composite.is_applicable_for_load());
    }

    #[test]
    fn test_composite_id_with_only_range_component() {
        let schema = playlist_schema();
        let mut criteria = Criteria::new(&schema);
        criteria
            .with_property_equals("playlistId", json!({"playlistName": "road trip"}))
            .unwrap();
        assert!(!criteria.is_hash_key_specified());
        assert_eq!(criteria.range_key_value(), Some(&json!("road trip")));
        assert!(!criteria.has_residual_conditions());
    }

    #[test]
    fn test_composite_id_begins_with_decomposes_to_residuals() {
        let schema = playlist_schema();
        let condition = Condition::new(
            "playlistId",
            Operator::BeginsWith,
            vec![json!({"userName": "al", "playlistName": "ro"})],
        )
        .unwrap();
        let mut criteria = Criteria::new(&schema);
        criteria.with_condition(&condition).unwrap();

        assert!(!criteria.is_hash_key_specified());
        let hash = criteria.residual_conditions_for("userName");
        assert_eq!(hash.len(), 1);
        assert_eq!(hash[0].operator(), Operator::BeginsWith);
        assert_eq!(hash[0].values(), &[json!("al")]);
        assert_eq!(
            criteria.residual_conditions_for("playlistName")[0].values(),
            &[json!("ro")]
        );
    }

    #[test]
    fn test_composite_id_without_components_is_rejected() {
        let schema = playlist_schema();
        for value in [json!("road trip"), json!({}), json!({"other": 1})] {
            let err = Criteria::new(&schema)
                .with_property_equals("playlistId", value)
                .unwrap_err();
            assert_eq!(
                err,
                PlanError::InvalidCompositeIdentifier("playlistId".to_string())
            );
        }

        let condition =
            Condition::new("playlistId", Operator::Contains, vec![json!("ro")]).unwrap();
        let mut criteria = Criteria::new(&schema);
        criteria.with_property_equals("userName", json!("alice")).unwrap();
        let err = criteria.with_condition(&condition).unwrap_err();
        assert_eq!(
            err,
            PlanError::InvalidCompositeIdentifier("playlistId".to_string())
        );
        assert!(!criteria.has_residual_conditions());
    }

    #[test]
    fn test_composite_id_other_operator_is_ambiguous() {
        let schema = playlist_schema();
        let condition = Condition::new("playlistId", Operator::Gt, vec![json!({})]).unwrap();
        let err = Criteria::new(&schema).with_condition(&condition).unwrap_err();
        assert_eq!(
            err,
            PlanError::AmbiguousCompositeIdentifier {
                property: "playlistId".to_string(),
                operator: Operator::Gt,
            }
        );
    }

    // -----------------------------------------------------------------------
    // Predicates
    // -----------------------------------------------------------------------

    #[test]
    fn test_load_applicability() {
        let schema = playlist_schema();
        let mut criteria = Criteria::new(&schema);
        criteria.with_property_equals("userName", json!("alice")).unwrap();
        assert!(!criteria.is_applicable_for_load());
        assert!(criteria.is_only_hash_key_specified());
        assert!(criteria.is_applicable_for_query());

        criteria
            .with_property_equals("playlistName", json!("road trip"))
            .unwrap();
        assert!(criteria.is_applicable_for_load());
        assert!(!criteria.is_only_hash_key_specified());

        let hash_only = KeySchema::builder("id").build().unwrap();
        let mut criteria = Criteria::new(&hash_only);
        criteria.with_property_equals("id", json!(7)).unwrap();
        assert!(criteria.is_applicable_for_load());
    }

    #[test]
    fn test_single_residual_on_range() {
        let schema = playlist_schema();
        let mut criteria = Criteria::new(&schema);
        criteria.with_property_equals("userName", json!("alice")).unwrap();
        criteria.with_property_condition(
            Condition::new("created", Operator::Gt, vec![json!(10)]).unwrap(),
        );
        assert!(criteria.is_only_single_residual_on_range_or_index_range());
        assert!(criteria.key_operators_permitted_for_query());
        assert!(criteria.is_applicable_for_query());

        criteria.with_property_condition(
            Condition::new("created", Operator::Contains, vec![json!(1)]).unwrap(),
        );
        assert!(!criteria.is_only_single_residual_on_range_or_index_range());
        assert!(!criteria.key_operators_permitted_for_query());
        assert!(!criteria.is_applicable_for_query());
    }

    #[test]
    fn test_index_key_predicates() {
        let schema = user_schema();
        let mut criteria = Criteria::new(&schema);
        criteria.with_property_equals("name", json!("Alice")).unwrap();
        assert!(criteria.has_index_hash_key_equal_condition());
        assert!(!criteria.has_index_range_key_condition());

        criteria.with_property_condition(
            Condition::new("joinYear", Operator::Ge, vec![json!(2020)]).unwrap(),
        );
        assert!(criteria.has_index_range_key_condition());

        let mut criteria = Criteria::new(&schema);
        criteria.with_property_condition(
            Condition::new("name", Operator::BeginsWith, vec![json!("A")]).unwrap(),
        );
        assert!(!criteria.has_index_hash_key_equal_condition());
        assert!(!criteria.is_applicable_for_global_secondary_index());
    }

    // -----------------------------------------------------------------------
    // Index matching
    // -----------------------------------------------------------------------

    #[test]
    fn test_select_index_prefers_covering_match() {
        let schema = user_schema();
        let mut criteria = Criteria::new(&schema);
        criteria.with_property_equals("name", json!("Alice")).unwrap();
        criteria.with_property_condition(
            Condition::new("joinYear", Operator::Gt, vec![json!(2020)]).unwrap(),
        );
        assert_eq!(
            criteria.global_secondary_index_name(IndexOrder::Declared, None),
            Some("Name-JoinYear-index")
        );
    }

    #[test]
    fn test_select_index_falls_back_to_declared_order() {
        let schema = user_schema();
        let mut criteria = Criteria::new(&schema);
        criteria.with_property_equals("name", json!("Alice")).unwrap();
        assert_eq!(
            criteria.global_secondary_index_name(IndexOrder::Declared, None),
            Some("Name-PostCode-index")
        );
        assert_eq!(
            criteria.global_secondary_index_name(IndexOrder::Lexicographic, None),
            Some("Name-JoinYear-index")
        );
        assert_eq!(
            criteria
                .global_secondary_index_name(IndexOrder::Declared, Some(&Sort::asc("joinYear"))),
            Some("Name-JoinYear-index")
        );
    }

    #[test]
    fn test_match_index_rejects_illegal_range_operator() {
        let schema = user_schema();
        let mut criteria = Criteria::new(&schema);
        criteria.with_property_equals("name", json!("Alice")).unwrap();
        criteria.with_property_condition(
            Condition::new("postCode", Operator::In, vec![json!("A"), json!("B")]).unwrap(),
        );
        let names: Vec<&str> = criteria
            .index_candidates(IndexOrder::Declared)
            .iter()
            .map(|m| m.index.name.as_str())
            .collect();
        assert_eq!(names, vec!["Name-JoinYear-index"]);
    }

    #[test]
    fn test_filters_after_index_match() {
        let schema = playlist_schema();
        let mut criteria = Criteria::new(&schema);
        criteria.with_property_equals("userName", json!("alice")).unwrap();
        criteria
            .with_property_equals("playlistName", json!("road trip"))
            .unwrap();
        criteria.with_property_condition(
            Condition::new("created", Operator::Gt, vec![json!(10)]).unwrap(),
        );

        let found = criteria.select_index(IndexOrder::Declared, None).unwrap();
        assert_eq!(found.index.name, "User-Created-index");
        assert_eq!(found.hash_source, KeySource::Bound);
        assert_eq!(
            criteria.filters_after(&found),
            vec![Condition::eq("playlistName", "road trip")]
        );
    }
}
