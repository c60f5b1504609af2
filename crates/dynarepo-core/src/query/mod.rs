//! Query resolution: criteria accumulation, access planning, request
//! assembly and filter evaluation.

pub mod criteria;
pub mod filter;
pub mod planner;
pub mod request;

pub use criteria::{Criteria, IndexMatch, KeySource};
pub use filter::{AttributeCondition, matches_all};
pub use planner::{AccessPlan, Planner, QueryPlan, ScanPlan};
pub use request::{
    KeyAttribute, LoadRequest, QueryRequest, RequestAssembler, ScanRequest, StoreRequest,
};
