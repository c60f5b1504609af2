//! Store client seam and the repository that drives it.
//!
//! [`Repository`] runs the planner and the request assembler, then hands the
//! request to a [`StoreClient`]. The item and count entry points share the
//! same plan; only the terminal call differs.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::PlannerConfig;
use crate::error::{Error, Result};
use crate::query::filter::{compare_values, matches_all, resolve_attr};
use crate::query::planner::{AccessPlan, Planner};
use crate::query::request::{
    LoadRequest, QueryRequest, RequestAssembler, ScanRequest, StoreRequest,
};
use crate::schema::{AttributeNameResolver, KeySchemaProvider};
use crate::types::{ConditionSet, Direction, Projection};

/// One page of items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub items: Vec<Value>,
    pub last_evaluated_key: Option<Value>,
}

/// The physical store: executes assembled requests.
pub trait StoreClient {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load(&self, request: &LoadRequest) -> std::result::Result<Option<Value>, Self::Error>;
    fn query(&self, request: &QueryRequest) -> std::result::Result<QueryResult, Self::Error>;
    fn scan(&self, request: &ScanRequest) -> std::result::Result<QueryResult, Self::Error>;
    fn count_query(&self, request: &QueryRequest) -> std::result::Result<u64, Self::Error>;
    fn count_scan(&self, request: &ScanRequest) -> std::result::Result<u64, Self::Error>;
}

/// Finder entry points for one entity type.
pub struct Repository<'a, S: ?Sized, C> {
    schema: &'a S,
    config: &'a PlannerConfig,
    client: C,
}

impl<'a, S, C> Repository<'a, S, C>
where
    S: KeySchemaProvider + AttributeNameResolver + ?Sized,
    C: StoreClient,
{
    pub fn new(schema: &'a S, config: &'a PlannerConfig, client: C) -> Self {
        Self {
            schema,
            config,
            client,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Plan and assemble without executing.
    pub fn prepare(
        &self,
        conditions: &ConditionSet,
        projection: Projection,
    ) -> Result<(AccessPlan, StoreRequest)> {
        let plan = Planner::new(self.schema, self.config).plan(conditions, projection)?;
        let request = RequestAssembler::new(self.schema).assemble(&plan, conditions, projection);
        Ok((plan, request))
    }

    /// Items matching `conditions`.
    pub fn find(&self, conditions: &ConditionSet) -> Result<QueryResult> {
        let (_, request) = self.prepare(conditions, Projection::Items)?;
        debug!(request = ?request, "executing find");
        match request {
            StoreRequest::Load(load) => {
                let item = self.client.load(&load).map_err(Error::store)?;
                Ok(QueryResult {
                    items: item.into_iter().collect(),
                    last_evaluated_key: None,
                })
            }
            StoreRequest::Query(query) => self.client.query(&query).map_err(Error::store),
            StoreRequest::Scan(scan) => self.client.scan(&scan).map_err(Error::store),
        }
    }

    /// Number of items matching `conditions`.
    pub fn count(&self, conditions: &ConditionSet) -> Result<u64> {
        let (_, request) = self.prepare(conditions, Projection::Count)?;
        debug!(request = ?request, "executing count");
        match request {
            StoreRequest::Load(load) => {
                let item = self.client.load(&load).map_err(Error::store)?;
                Ok(u64::from(item.is_some()))
            }
            StoreRequest::Query(query) => self.client.count_query(&query).map_err(Error::store),
            StoreRequest::Scan(scan) => self.client.count_scan(&scan).map_err(Error::store),
        }
    }

    pub fn exists(&self, conditions: &ConditionSet) -> Result<bool> {
        Ok(self.count(conditions)? > 0)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("index not found: {0}")]
    UnknownIndex(String),
}

#[derive(Debug, Clone)]
struct KeyAttributes {
    hash: String,
    range: Option<String>,
}

/// In-memory store over a list of documents. Used for testing.
///
/// Keys and indexes are taken from a schema with attribute names resolved.
/// Queries are ordered by the addressed range attribute; scans are ordered
/// by the requested sort, if any.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    primary: KeyAttributes,
    indexes: Vec<(String, KeyAttributes)>,
    items: Vec<Value>,
}

impl MemoryStore {
    pub fn for_schema<S>(schema: &S) -> Self
    where
        S: KeySchemaProvider + AttributeNameResolver + ?Sized,
    {
        let attrs = |hash: &str, range: Option<&str>| KeyAttributes {
            hash: schema.attribute_name(hash).to_string(),
            range: range.map(|r| schema.attribute_name(r).to_string()),
        };
        Self {
            primary: attrs(schema.hash_key_property(), schema.range_key_property()),
            indexes: schema
                .indexes()
                .iter()
                .map(|idx| (idx.name.clone(), attrs(&idx.hash_key, idx.range_key.as_deref())))
                .collect(),
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = Value>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn put(&mut self, item: Value) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn key_attributes(
        &self,
        index_name: Option<&str>,
    ) -> std::result::Result<&KeyAttributes, MemoryStoreError> {
        match index_name {
            None => Ok(&self.primary),
            Some(name) => self
                .indexes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, attrs)| attrs)
                .ok_or_else(|| MemoryStoreError::UnknownIndex(name.to_string())),
        }
    }

    fn query_matches(
        &self,
        request: &QueryRequest,
    ) -> std::result::Result<Vec<&Value>, MemoryStoreError> {
        let keys = self.key_attributes(request.index_name.as_deref())?;
        let hash = &request.hash_key;
        let mut items: Vec<&Value> = self
            .items
            .iter()
            .filter(|doc| {
                compare_values(resolve_attr(doc, &hash.attribute), &hash.value)
                    == Some(Ordering::Equal)
            })
            .filter(|doc| request.range_key.as_ref().is_none_or(|c| c.matches(doc)))
            .filter(|doc| matches_all(&request.filter, doc))
            .collect();
        if let Some(range) = &keys.range {
            sort_by_attribute(&mut items, range, request.scan_index_forward);
        }
        Ok(items)
    }

    fn scan_matches(&self, request: &ScanRequest) -> Vec<&Value> {
        let mut items: Vec<&Value> = self
            .items
            .iter()
            .filter(|doc| matches_all(&request.filter, doc))
            .collect();
        if let Some(sort) = &request.sort {
            sort_by_attribute(&mut items, &sort.property, sort.direction == Direction::Asc);
        }
        items
    }

    fn page(&self, items: Vec<&Value>, limit: Option<usize>, keys: &KeyAttributes) -> QueryResult {
        let truncated = limit.is_some_and(|n| items.len() > n);
        let items: Vec<Value> = items
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        let last_evaluated_key = match items.last() {
            Some(last) if truncated => {
                let mut key = serde_json::Map::new();
                for attr in std::iter::once(&keys.hash).chain(keys.range.as_ref()) {
                    key.insert(attr.clone(), resolve_attr(last, attr).clone());
                }
                Some(Value::Object(key))
            }
            _ => None,
        };
        QueryResult {
            items,
            last_evaluated_key,
        }
    }
}

fn sort_by_attribute(items: &mut [&Value], attribute: &str, ascending: bool) {
    items.sort_by(|a, b| {
        let ord = compare_values(resolve_attr(a, attribute), resolve_attr(b, attribute))
            .unwrap_or(Ordering::Equal);
        if ascending { ord } else { ord.reverse() }
    });
}

impl StoreClient for MemoryStore {
    type Error = MemoryStoreError;

    fn load(&self, request: &LoadRequest) -> std::result::Result<Option<Value>, Self::Error> {
        let same = |doc: &Value, attribute: &str, value: &Value| {
            compare_values(resolve_attr(doc, attribute), value) == Some(Ordering::Equal)
        };
        Ok(self
            .items
            .iter()
            .find(|&doc| {
                same(doc, &request.hash_key.attribute, &request.hash_key.value)
                    && request
                        .range_key
                        .as_ref()
                        .is_none_or(|range| same(doc, &range.attribute, &range.value))
            })
            .cloned())
    }

    fn query(&self, request: &QueryRequest) -> std::result::Result<QueryResult, Self::Error> {
        let items = self.query_matches(request)?;
        let keys = self.key_attributes(request.index_name.as_deref())?;
        Ok(self.page(items, request.limit, keys))
    }

    fn scan(&self, request: &ScanRequest) -> std::result::Result<QueryResult, Self::Error> {
        let items = self.scan_matches(request);
        Ok(self.page(items, request.limit, &self.primary))
    }

    fn count_query(&self, request: &QueryRequest) -> std::result::Result<u64, Self::Error> {
        let count = self.query_matches(request)?.len();
        Ok(request.limit.map_or(count, |n| count.min(n)) as u64)
    }

    fn count_scan(&self, request: &ScanRequest) -> std::result::Result<u64, Self::Error> {
        let count = self.scan_matches(request).len();
        Ok(request.limit.map_or(count, |n| count.min(n)) as u64)
    }
}
