//! # dynarepo
//!
//! Query-criteria resolution for repositories over DynamoDB-style stores.
//!
//! Callers describe what they want as a [`ConditionSet`]: property
//! conditions plus optional sort, limit and consistent-read directives. The
//! planner resolves it against an entity's [`KeySchema`] into exactly one
//! access path (a direct Load, a Query on the primary key or a secondary
//! index, or a Scan), and the assembler turns that plan into a concrete
//! [`StoreRequest`] with stored attribute names.
//!
//! ## Quick Start
//!
//! ```
//! use dynarepo_core::{ConditionSet, KeySchema, Planner, PlannerConfig, Projection};
//! use dynarepo_core::{AccessPlan, RequestAssembler, StoreRequest};
//!
//! let schema = KeySchema::builder("userName")
//!     .range_key("playlistName")
//!     .index("DisplayName-index", "displayName", None)
//!     .build()
//!     .unwrap();
//! let config = PlannerConfig::default();
//!
//! let conditions = ConditionSet::new().eq("displayName", "Road Trip");
//! let plan = Planner::new(&schema, &config)
//!     .plan(&conditions, Projection::Items)
//!     .unwrap();
//! assert_eq!(plan.index_name(), Some("DisplayName-index"));
//!
//! let request = RequestAssembler::new(&schema).assemble(&plan, &conditions, Projection::Items);
//! assert!(matches!(request, StoreRequest::Query(_)));
//! assert!(matches!(plan, AccessPlan::Query(_)));
//! ```

pub mod config;
pub mod error;
pub mod query;
pub mod repository;
pub mod schema;
pub mod types;

pub use config::{IndexOrder, PlannerConfig};
pub use error::{ConditionError, Error, PlanError, Result, SchemaError};
pub use query::{
    AccessPlan, AttributeCondition, Criteria, KeyAttribute, LoadRequest, Planner, QueryPlan,
    QueryRequest, RequestAssembler, ScanPlan, ScanRequest, StoreRequest,
};
pub use repository::{MemoryStore, MemoryStoreError, QueryResult, Repository, StoreClient};
pub use schema::{AttributeNameResolver, IndexDefinition, KeySchema, KeySchemaProvider};
pub use types::{Condition, ConditionSet, Direction, Operator, Projection, Sort};
