//! Access planner: picks exactly one of Load, Query or Scan.
//!
//! The rules are evaluated in a fixed order and the first that applies wins:
//!
//! 1. **Load**: the full primary key is bound and nothing else was asked.
//! 2. **Primary Query**: only the hash key is bound.
//! 3. **Single residual**: the hash key is bound and the only other
//!    condition targets the primary range key, or the range key of an index
//!    sharing the primary hash key.
//! 4. **Index Query**: some secondary index has an equality binding on its
//!    hash key (see [`Criteria::select_index`]).
//! 5. **Scan**: everything else, if the configuration allows scans.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::query::criteria::Criteria;
use crate::schema::KeySchemaProvider;
use crate::types::{Condition, ConditionSet, Projection, Sort};

/// A Query against the primary key (`index_name == None`) or one index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    pub index_name: Option<String>,
    pub hash_condition: Condition,
    pub range_condition: Option<Condition>,
    pub filter_conditions: Vec<Condition>,
    pub sort: Option<Sort>,
}

/// A full-table scan with post-filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanPlan {
    pub filter_conditions: Vec<Condition>,
    pub sort: Option<Sort>,
}

/// The single physical access path chosen for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AccessPlan {
    Load {
        hash_value: Value,
        range_value: Option<Value>,
    },
    Query(QueryPlan),
    Scan(ScanPlan),
}

impl AccessPlan {
    pub fn mode(&self) -> &'static str {
        match self {
            AccessPlan::Load { .. } => "load",
            AccessPlan::Query(_) => "query",
            AccessPlan::Scan(_) => "scan",
        }
    }

    /// Index addressed by a Query plan, if any.
    pub fn index_name(&self) -> Option<&str> {
        match self {
            AccessPlan::Query(query) => query.index_name.as_deref(),
            _ => None,
        }
    }

    pub fn filter_conditions(&self) -> &[Condition] {
        match self {
            AccessPlan::Load { .. } => &[],
            AccessPlan::Query(query) => &query.filter_conditions,
            AccessPlan::Scan(scan) => &scan.filter_conditions,
        }
    }
}

/// Plans condition sets against one key schema.
///
/// Holds only shared references, so one planner may serve any number of
/// concurrent invocations.
#[derive(Debug)]
pub struct Planner<'a, S: ?Sized> {
    schema: &'a S,
    config: &'a PlannerConfig,
}

impl<S: ?Sized> Clone for Planner<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for Planner<'_, S> {}

impl<'a, S: KeySchemaProvider + ?Sized> Planner<'a, S> {
    pub fn new(schema: &'a S, config: &'a PlannerConfig) -> Self {
        Self { schema, config }
    }

    pub fn schema(&self) -> &'a S {
        self.schema
    }

    pub fn config(&self) -> &'a PlannerConfig {
        self.config
    }

    /// Plan `conditions` for the given terminal.
    ///
    /// `projection` only matters when the result would be a Scan: the item
    /// and count paths are gated by separate configuration switches.
    pub fn plan(
        &self,
        conditions: &ConditionSet,
        projection: Projection,
    ) -> Result<AccessPlan, PlanError> {
        let result = conditions
            .validate()
            .map_err(PlanError::from)
            .and_then(|()| Criteria::new(self.schema).with_conditions(conditions.conditions()))
            .and_then(|criteria| {
                self.plan_criteria(&criteria, conditions.sort_order(), projection)
            });
        match &result {
            Ok(plan) => debug!(
                mode = plan.mode(),
                index = plan.index_name().unwrap_or("-"),
                filters = plan.filter_conditions().len(),
                ?projection,
                "planned access"
            ),
            Err(e) => debug!(error = %e, ?projection, "planning rejected"),
        }
        result
    }

    /// Plan an already accumulated [`Criteria`].
    pub fn plan_criteria(
        &self,
        criteria: &Criteria<'_, S>,
        sort: Option<&Sort>,
        projection: Projection,
    ) -> Result<AccessPlan, PlanError> {
        if criteria.is_applicable_for_load() {
            return Ok(self.load_plan(criteria));
        }
        if let Some(plan) = self.primary_hash_only_plan(criteria, sort)? {
            return Ok(plan);
        }
        if let Some(plan) = self.single_residual_plan(criteria, sort)? {
            return Ok(plan);
        }
        if let Some(plan) = self.index_plan(criteria, sort)? {
            return Ok(plan);
        }
        self.scan_plan(criteria, sort, projection)
    }

    fn load_plan(&self, criteria: &Criteria<'_, S>) -> AccessPlan {
        AccessPlan::Load {
            hash_value: criteria.hash_key_value().cloned().unwrap_or(Value::Null),
            range_value: criteria.range_key_value().cloned(),
        }
    }

    fn primary_hash_only_plan(
        &self,
        criteria: &Criteria<'_, S>,
        sort: Option<&Sort>,
    ) -> Result<Option<AccessPlan>, PlanError> {
        if !criteria.is_only_hash_key_specified() {
            return Ok(None);
        }
        let range_key = self.schema.range_key_property();
        check_sort(sort, range_key)?;
        Ok(Some(AccessPlan::Query(QueryPlan {
            index_name: None,
            hash_condition: self.primary_hash_condition(criteria),
            range_condition: None,
            filter_conditions: Vec::new(),
            sort: sort.cloned(),
        })))
    }

    /// Hash bound plus one residual condition on the primary range key or on
    /// the range key of an index whose hash key is the primary hash key.
    fn single_residual_plan(
        &self,
        criteria: &Criteria<'_, S>,
        sort: Option<&Sort>,
    ) -> Result<Option<AccessPlan>, PlanError> {
        if !criteria.is_hash_key_specified()
            || !criteria.is_only_single_residual_on_range_or_index_range()
        {
            return Ok(None);
        }
        let Some(condition) = criteria.single_residual_condition() else {
            return Ok(None);
        };
        let property = condition.property();
        let illegal = || PlanError::IllegalKeyOperator {
            property: property.to_string(),
            operator: condition.operator(),
        };

        let (index_name, range_key) = if self.schema.is_range_key_property(property) {
            (None, property)
        } else {
            let hash_key = self.schema.hash_key_property();
            let mut local = self
                .ordered_indexes()
                .into_iter()
                .filter(|idx| {
                    idx.hash_key == hash_key && idx.range_key.as_deref() == Some(property)
                });
            match local.next() {
                Some(index) => (Some(index.name.clone()), property),
                None => return Ok(None),
            }
        };

        if !condition.operator().is_key_operator() {
            return Err(illegal());
        }
        check_sort(sort, Some(range_key))?;
        Ok(Some(AccessPlan::Query(QueryPlan {
            index_name,
            hash_condition: self.primary_hash_condition(criteria),
            range_condition: Some(condition.clone()),
            filter_conditions: Vec::new(),
            sort: sort.cloned(),
        })))
    }

    fn index_plan(
        &self,
        criteria: &Criteria<'_, S>,
        sort: Option<&Sort>,
    ) -> Result<Option<AccessPlan>, PlanError> {
        let Some(found) = criteria.select_index(self.config.index_order, sort) else {
            return Ok(None);
        };
        check_sort(sort, found.index.range_key.as_deref())?;
        let filter_conditions = criteria.filters_after(&found);
        Ok(Some(AccessPlan::Query(QueryPlan {
            index_name: Some(found.index.name.clone()),
            hash_condition: found.hash_condition,
            range_condition: found.range_condition.map(|(condition, _)| condition),
            filter_conditions,
            sort: sort.cloned(),
        })))
    }

    /// Bound hash, then bound range, then residuals in insertion order.
    fn scan_plan(
        &self,
        criteria: &Criteria<'_, S>,
        sort: Option<&Sort>,
        projection: Projection,
    ) -> Result<AccessPlan, PlanError> {
        let mut filter_conditions = criteria.bound_key_conditions();
        filter_conditions.extend(criteria.residual_filters());

        if !self.config.allows_scan(projection) {
            let described: Vec<String> = filter_conditions.iter().map(describe).collect();
            return Err(PlanError::UnsupportedAccessPattern(format!(
                "no key or index serves [{}] and scanning is disabled",
                described.join(", ")
            )));
        }
        Ok(AccessPlan::Scan(ScanPlan {
            filter_conditions,
            sort: sort.cloned(),
        }))
    }

    fn primary_hash_condition(&self, criteria: &Criteria<'_, S>) -> Condition {
        Condition::eq(
            self.schema.hash_key_property(),
            criteria.hash_key_value().cloned().unwrap_or(Value::Null),
        )
    }

    fn ordered_indexes(&self) -> Vec<&'a crate::schema::IndexDefinition> {
        let mut indexes: Vec<_> = self.schema.indexes().iter().collect();
        if self.config.index_order == crate::config::IndexOrder::Lexicographic {
            indexes.sort_by(|a, b| a.name.cmp(&b.name));
        }
        indexes
    }
}

/// A Query can only order by the range key it addresses.
fn check_sort(sort: Option<&Sort>, range_key: Option<&str>) -> Result<(), PlanError> {
    match sort {
        Some(sort) if range_key != Some(sort.property.as_str()) => {
            Err(PlanError::IllegalSortTarget {
                property: sort.property.clone(),
                allowed: range_key.map(str::to_string),
            })
        }
        _ => Ok(()),
    }
}

fn describe(condition: &Condition) -> String {
    format!("{} {}", condition.property(), condition.operator())
}
