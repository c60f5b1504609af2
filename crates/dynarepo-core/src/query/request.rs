//! Request assembler: turns an [`AccessPlan`] into the request a store
//! client executes.
//!
//! Assembly is pure. Every property is mapped through the
//! [`AttributeNameResolver`] here, so plans stay in logical property names
//! and requests speak stored attribute names.

use serde::Serialize;
use serde_json::Value;

use crate::query::filter::AttributeCondition;
use crate::query::planner::{AccessPlan, QueryPlan, ScanPlan};
use crate::schema::{AttributeNameResolver, KeySchemaProvider};
use crate::types::{ConditionSet, Direction, Projection, Sort};

/// A key attribute with its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyAttribute {
    pub attribute: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadRequest {
    pub hash_key: KeyAttribute,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_key: Option<KeyAttribute>,
    pub consistent_read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    /// `None` addresses the primary key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    pub hash_key: KeyAttribute,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_key: Option<AttributeCondition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<AttributeCondition>,
    pub scan_index_forward: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    pub consistent_read: bool,
    pub select: Projection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<AttributeCondition>,
    /// Requested ordering; the store does not order scans, the caller may.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    pub select: Projection,
}

/// The request handed to a [`StoreClient`](crate::repository::StoreClient).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum StoreRequest {
    Load(LoadRequest),
    Query(QueryRequest),
    Scan(ScanRequest),
}

/// Builds store requests against one schema's attribute names.
#[derive(Debug)]
pub struct RequestAssembler<'a, S: ?Sized> {
    schema: &'a S,
}

impl<'a, S> RequestAssembler<'a, S>
where
    S: KeySchemaProvider + AttributeNameResolver + ?Sized,
{
    pub fn new(schema: &'a S) -> Self {
        Self { schema }
    }

    /// Assemble the request for `plan`.
    ///
    /// `conditions` supplies the pass-through directives (limit and
    /// consistent read); `projection` selects items or a count.
    pub fn assemble(
        &self,
        plan: &AccessPlan,
        conditions: &ConditionSet,
        projection: Projection,
    ) -> StoreRequest {
        match plan {
            AccessPlan::Load {
                hash_value,
                range_value,
            } => StoreRequest::Load(self.load(hash_value, range_value.as_ref(), conditions)),
            AccessPlan::Query(query) => {
                StoreRequest::Query(self.query(query, conditions, projection))
            }
            AccessPlan::Scan(scan) => StoreRequest::Scan(self.scan(scan, conditions, projection)),
        }
    }

    fn load(
        &self,
        hash_value: &Value,
        range_value: Option<&Value>,
        conditions: &ConditionSet,
    ) -> LoadRequest {
        let hash_key = self.key(self.schema.hash_key_property(), hash_value);
        let range_key = self
            .schema
            .range_key_property()
            .zip(range_value)
            .map(|(property, value)| self.key(property, value));
        LoadRequest {
            hash_key,
            range_key,
            consistent_read: conditions.is_consistent_read(),
        }
    }

    fn query(
        &self,
        plan: &QueryPlan,
        conditions: &ConditionSet,
        projection: Projection,
    ) -> QueryRequest {
        let hash = &plan.hash_condition;
        let hash_value = hash.values().first().cloned().unwrap_or(Value::Null);
        QueryRequest {
            index_name: plan.index_name.clone(),
            hash_key: KeyAttribute {
                attribute: self.attribute(hash.property()),
                value: hash_value,
            },
            range_key: plan
                .range_condition
                .as_ref()
                .map(|c| AttributeCondition::from_condition(c, self.schema)),
            filter: self.filter_block(&plan.filter_conditions),
            scan_index_forward: !matches!(
                plan.sort,
                Some(Sort {
                    direction: Direction::Desc,
                    ..
                })
            ),
            limit: conditions.limit_value(),
            consistent_read: conditions.is_consistent_read(),
            select: projection,
        }
    }

    fn scan(
        &self,
        plan: &ScanPlan,
        conditions: &ConditionSet,
        projection: Projection,
    ) -> ScanRequest {
        ScanRequest {
            filter: self.filter_block(&plan.filter_conditions),
            sort: plan.sort.as_ref().map(|sort| Sort {
                property: self.attribute(&sort.property),
                direction: sort.direction,
            }),
            limit: conditions.limit_value(),
            select: projection,
        }
    }

    fn filter_block(&self, conditions: &[crate::types::Condition]) -> Vec<AttributeCondition> {
        conditions
            .iter()
            .map(|c| AttributeCondition::from_condition(c, self.schema))
            .collect()
    }

    fn key(&self, property: &str, value: &Value) -> KeyAttribute {
        KeyAttribute {
            attribute: self.attribute(property),
            value: value.clone(),
        }
    }

    fn attribute(&self, property: &str) -> String {
        self.schema.attribute_name(property).to_string()
    }
}
