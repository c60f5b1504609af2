//! Error types for schema construction, condition building, and planning.

use thiserror::Error;

use crate::types::Operator;

/// Top-level error type for dynarepo operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("store error: {0}")]
    Store(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("hash key property must not be empty")]
    MissingHashKey,

    #[error("range key '{0}' is also the hash key")]
    RangeKeyIsHashKey(String),

    #[error("index name must not be empty")]
    EmptyIndexName,

    #[error("index already exists: {0}")]
    DuplicateIndex(String),

    #[error("index '{index}' uses '{property}' as both hash and range key")]
    IndexKeyConflict { index: String, property: String },

    #[error("composite id property '{0}' is also a primary key property")]
    CompositeIdIsKey(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConditionError {
    #[error("operator {operator} takes {expected} value(s), got {actual}")]
    Arity {
        operator: Operator,
        expected: &'static str,
        actual: usize,
    },

    #[error("condition property name must not be empty")]
    EmptyProperty,
}

/// Classified planning failures.
///
/// All of these are deterministic: planning the same conditions against the
/// same schema fails the same way every time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error(transparent)]
    InvalidCondition(#[from] ConditionError),

    #[error("unsupported access pattern: {0}")]
    UnsupportedAccessPattern(String),

    #[error("operator {operator} cannot be used as a key condition on '{property}'")]
    IllegalKeyOperator { property: String, operator: Operator },

    #[error("cannot sort by '{property}': {}", sort_hint(.allowed))]
    IllegalSortTarget {
        property: String,
        allowed: Option<String>,
    },

    #[error(
        "operator {operator} is not supported on composite id '{property}' (only EQ, CONTAINS, BEGINS_WITH)"
    )]
    AmbiguousCompositeIdentifier { property: String, operator: Operator },

    #[error("null value for key property '{0}' is not supported")]
    NullKeyValue(String),

    #[error("composite id '{0}' has no hash or range key component")]
    InvalidCompositeIdentifier(String),
}

fn sort_hint(allowed: &Option<String>) -> String {
    match allowed {
        Some(p) => format!("only sorting by '{p}' is possible"),
        None => "the chosen access path has no sort key".to_string(),
    }
}

impl Error {
    /// Wrap an error raised by a store client.
    pub fn store(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Store(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
