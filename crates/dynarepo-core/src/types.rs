//! Core types: operators, conditions, sort directives, and condition sets.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConditionError;

/// A comparison operator, named as the store names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Eq,
    Ne,
    In,
    Le,
    Lt,
    Ge,
    Gt,
    Between,
    NotNull,
    Null,
    Contains,
    NotContains,
    BeginsWith,
}

impl Operator {
    /// Operators a store accepts in a range (sort) key condition.
    pub const KEY_OPERATORS: [Operator; 7] = [
        Operator::Eq,
        Operator::Lt,
        Operator::Le,
        Operator::Gt,
        Operator::Ge,
        Operator::BeginsWith,
        Operator::Between,
    ];

    /// Whether this operator may appear in a range key condition.
    pub fn is_key_operator(self) -> bool {
        Self::KEY_OPERATORS.contains(&self)
    }

    /// Whether this operator is accepted on a composite id property.
    pub fn is_composite_id_operator(self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Contains | Operator::BeginsWith
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::Ne => "NE",
            Operator::In => "IN",
            Operator::Le => "LE",
            Operator::Lt => "LT",
            Operator::Ge => "GE",
            Operator::Gt => "GT",
            Operator::Between => "BETWEEN",
            Operator::NotNull => "NOT_NULL",
            Operator::Null => "NULL",
            Operator::Contains => "CONTAINS",
            Operator::NotContains => "NOT_CONTAINS",
            Operator::BeginsWith => "BEGINS_WITH",
        }
    }

    /// Check that `count` values is a legal arity for this operator.
    fn check_arity(self, count: usize) -> Result<(), ConditionError> {
        let (ok, expected) = match self {
            Operator::Null | Operator::NotNull => (count == 0, "0"),
            Operator::Between => (count == 2, "2"),
            Operator::In => (count >= 1, "at least 1"),
            _ => (count == 1, "1"),
        };
        if ok {
            Ok(())
        } else {
            Err(ConditionError::Arity {
                operator: self,
                expected,
                actual: count,
            })
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of caller intent: `property <operator> values`.
///
/// The value count is checked against the operator on construction, so a
/// `Condition` always has a legal arity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCondition")]
pub struct Condition {
    property: String,
    operator: Operator,
    values: Vec<Value>,
}

#[derive(Deserialize)]
struct RawCondition {
    property: String,
    operator: Operator,
    #[serde(default)]
    values: Vec<Value>,
}

impl TryFrom<RawCondition> for Condition {
    type Error = ConditionError;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        Condition::new(raw.property, raw.operator, raw.values)
    }
}

impl Condition {
    pub fn new(
        property: impl Into<String>,
        operator: Operator,
        values: Vec<Value>,
    ) -> Result<Self, ConditionError> {
        let property = property.into();
        if property.is_empty() {
            return Err(ConditionError::EmptyProperty);
        }
        operator.check_arity(values.len())?;
        Ok(Self {
            property,
            operator,
            values,
        })
    }

    /// `property == value` on a property taken from a validated condition or
    /// key schema.
    pub(crate) fn eq(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            property: property.into(),
            operator: Operator::Eq,
            values: vec![value.into()],
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The single value of an `EQ` condition, if this is one.
    pub fn equality_value(&self) -> Option<&Value> {
        match self.operator {
            Operator::Eq => self.values.first(),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// A requested ordering on one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub property: String,
    #[serde(default)]
    pub direction: Direction,
}

impl Sort {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
        }
    }
}

/// What the terminal store call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    #[default]
    Items,
    Count,
}

/// The full set of conditions for one logical query.
///
/// Built once per invocation and consumed by the planner. The chained
/// builders keep the first invalid condition they are given and report it
/// from [`ConditionSet::validate`], which the planner calls first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionSet {
    #[serde(default)]
    conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sort: Option<Sort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
    #[serde(default)]
    consistent_read: bool,
    #[serde(skip)]
    invalid: Option<ConditionError>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    fn push(mut self, condition: Result<Condition, ConditionError>) -> Self {
        match condition {
            Ok(condition) => self.conditions.push(condition),
            Err(err) => {
                self.invalid.get_or_insert(err);
            }
        }
        self
    }

    fn single(self, property: &str, operator: Operator, value: Value) -> Self {
        self.push(Condition::new(property, operator, vec![value]))
    }

    pub fn eq(self, property: &str, value: impl Into<Value>) -> Self {
        self.single(property, Operator::Eq, value.into())
    }

    pub fn ne(self, property: &str, value: impl Into<Value>) -> Self {
        self.single(property, Operator::Ne, value.into())
    }

    pub fn lt(self, property: &str, value: impl Into<Value>) -> Self {
        self.single(property, Operator::Lt, value.into())
    }

    pub fn le(self, property: &str, value: impl Into<Value>) -> Self {
        self.single(property, Operator::Le, value.into())
    }

    pub fn gt(self, property: &str, value: impl Into<Value>) -> Self {
        self.single(property, Operator::Gt, value.into())
    }

    pub fn ge(self, property: &str, value: impl Into<Value>) -> Self {
        self.single(property, Operator::Ge, value.into())
    }

    pub fn begins_with(self, property: &str, prefix: impl Into<String>) -> Self {
        self.single(property, Operator::BeginsWith, Value::String(prefix.into()))
    }

    pub fn contains(self, property: &str, value: impl Into<Value>) -> Self {
        self.single(property, Operator::Contains, value.into())
    }

    pub fn between(self, property: &str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        let condition = Condition::new(property, Operator::Between, vec![low.into(), high.into()]);
        self.push(condition)
    }

    /// `property IN (values...)`; fails on an empty list.
    pub fn in_values(self, property: &str, values: Vec<Value>) -> Result<Self, ConditionError> {
        Ok(self.condition(Condition::new(property, Operator::In, values)?))
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.consistent_read = consistent;
        self
    }

    /// The first condition the chained builders rejected, if any.
    pub fn validate(&self) -> Result<(), ConditionError> {
        match &self.invalid {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn sort_order(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    pub fn is_consistent_read(&self) -> bool {
        self.consistent_read
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_operators() {
        for op in Operator::KEY_OPERATORS {
            assert!(op.is_key_operator());
        }
        assert!(!Operator::Contains.is_key_operator());
        assert!(!Operator::In.is_key_operator());
        assert!(!Operator::Ne.is_key_operator());
    }

    #[test]
    fn test_condition_arity() {
        assert!(Condition::new("a", Operator::Eq, vec![json!(1)]).is_ok());
        assert!(Condition::new("a", Operator::Null, vec![]).is_ok());
        assert!(Condition::new("a", Operator::In, vec![json!(1), json!(2), json!(3)]).is_ok());

        let err = Condition::new("a", Operator::Between, vec![json!(1)]).unwrap_err();
        assert_eq!(
            err,
            ConditionError::Arity {
                operator: Operator::Between,
                expected: "2",
                actual: 1
            }
        );
        assert!(Condition::new("a", Operator::In, vec![]).is_err());
        assert!(Condition::new("a", Operator::NotNull, vec![json!(1)]).is_err());
        assert_eq!(
            Condition::new("", Operator::Eq, vec![json!(1)]).unwrap_err(),
            ConditionError::EmptyProperty
        );
    }

    #[test]
    fn test_condition_deserialize_checks_arity() {
        let ok: Condition = serde_json::from_value(
            json!({"property": "age", "operator": "BETWEEN", "values": [1, 9]}),
        )
        .unwrap();
        assert_eq!(ok.operator(), Operator::Between);

        let bad = serde_json::from_value::<Condition>(
            json!({"property": "age", "operator": "GT", "values": []}),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_operator_serde_names() {
        assert_eq!(serde_json::to_value(Operator::BeginsWith).unwrap(), json!("BEGINS_WITH"));
        assert_eq!(serde_json::to_value(Operator::NotNull).unwrap(), json!("NOT_NULL"));
        let op: Operator = serde_json::from_value(json!("NOT_CONTAINS")).unwrap();
        assert_eq!(op, Operator::NotContains);
        assert_eq!(Operator::Ge.to_string(), "GE");
    }

    #[test]
    fn test_condition_set_builder() {
        let set = ConditionSet::new()
            .eq("userName", "alice")
            .between("age", 20, 30)
            .sort(Sort::desc("age"))
            .limit(5);
        assert_eq!(set.conditions().len(), 2);
        assert_eq!(set.conditions()[1].values(), &[json!(20), json!(30)]);
        assert_eq!(set.sort_order().unwrap().direction, Direction::Desc);
        assert_eq!(set.limit_value(), Some(5));
        assert!(!set.is_consistent_read());
        assert!(ConditionSet::new().in_values("tag", vec![]).is_err());
        assert_eq!(set.validate(), Ok(()));
    }

    #[test]
    fn test_condition_set_keeps_first_invalid_condition() {
        let set = ConditionSet::new()
            .eq("", 1)
            .gt("age", 3)
            .between("", 1, 2);
        assert_eq!(set.conditions().len(), 1);
        assert_eq!(set.conditions()[0].property(), "age");
        assert_eq!(set.validate(), Err(ConditionError::EmptyProperty));
    }

    #[test]
    fn test_condition_set_deserialize_defaults() {
        let set: ConditionSet = serde_json::from_value(json!({
            "conditions": [{"property": "name", "operator": "EQ", "values": ["x"]}],
            "sort": {"property": "joinYear"}
        }))
        .unwrap();
        assert_eq!(set.sort_order().unwrap().direction, Direction::Asc);
        assert_eq!(set.limit_value(), None);
    }
}
