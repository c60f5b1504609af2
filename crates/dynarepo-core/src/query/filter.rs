//! Attribute conditions and their evaluation against JSON documents.
//!
//! An [`AttributeCondition`] is a [`Condition`] after name mapping: it
//! addresses a stored attribute rather than a logical property. Stores that
//! cannot filter server-side (and the in-memory test store) evaluate filter
//! blocks with [`matches_all`].

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::AttributeNameResolver;
use crate::types::{Condition, Operator};

/// `attribute <operator> values`, addressed by stored attribute name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeCondition {
    pub attribute: String,
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,
}

impl AttributeCondition {
    /// Map a logical condition onto its stored attribute name.
    pub fn from_condition<R: AttributeNameResolver + ?Sized>(
        condition: &Condition,
        names: &R,
    ) -> Self {
        Self {
            attribute: names.attribute_name(condition.property()).to_string(),
            operator: condition.operator(),
            values: condition.values().to_vec(),
        }
    }

    /// Evaluate against a document.
    ///
    /// A missing attribute resolves to `null`; comparisons between values of
    /// different types never match.
    pub fn matches(&self, doc: &Value) -> bool {
        let actual = resolve_attr(doc, &self.attribute);
        let first = self.values.first().unwrap_or(&Value::Null);
        match self.operator {
            Operator::Eq => compare_values(actual, first) == Some(Ordering::Equal),
            Operator::Ne => compare_values(actual, first) != Some(Ordering::Equal),
            Operator::Lt => compare_values(actual, first) == Some(Ordering::Less),
            Operator::Le => matches!(
                compare_values(actual, first),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::Gt => compare_values(actual, first) == Some(Ordering::Greater),
            Operator::Ge => matches!(
                compare_values(actual, first),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::Between => match self.values.as_slice() {
                [low, high] => {
                    matches!(
                        compare_values(actual, low),
                        Some(Ordering::Greater | Ordering::Equal)
                    ) && matches!(
                        compare_values(actual, high),
                        Some(Ordering::Less | Ordering::Equal)
                    )
                }
                _ => false,
            },
            Operator::In => self
                .values
                .iter()
                .any(|v| compare_values(actual, v) == Some(Ordering::Equal)),
            Operator::BeginsWith => match (actual, first) {
                (Value::String(s), Value::String(prefix)) => s.starts_with(prefix.as_str()),
                _ => false,
            },
            Operator::Contains => contains(actual, first),
            Operator::NotContains => !actual.is_null() && !contains(actual, first),
            Operator::Null => actual.is_null(),
            Operator::NotNull => !actual.is_null(),
        }
    }
}

/// `true` when every condition matches; an empty block matches everything.
pub fn matches_all(conditions: &[AttributeCondition], doc: &Value) -> bool {
    conditions.iter().all(|condition| condition.matches(doc))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn contains(actual: &Value, search: &Value) -> bool {
    match (actual, search) {
        (Value::String(s), Value::String(needle)) => s.contains(needle.as_str()),
        (Value::Array(arr), item) => arr.contains(item),
        _ => false,
    }
}

/// Resolve a dot-separated attribute path on a document.
///
/// Returns `Value::Null` if any segment is missing.
pub fn resolve_attr<'a>(doc: &'a Value, path: &str) -> &'a Value {
    let mut current = doc;
    for segment in path.split('.') {
        match current.get(segment) {
            Some(v) => current = v,
            None => return &Value::Null,
        }
    }
    current
}

/// Compare two JSON values, returning an ordering if the types are comparable.
///
/// Numbers compare as f64, strings lexicographically, booleans false < true
/// and null equals null. Mismatched types return `None`.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
