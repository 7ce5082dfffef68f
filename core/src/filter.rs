//! Structured where-clause predicates.
//!
//! A [`WhereClause`] maps field names to a [`Condition`]: either a literal
//! boolean (boolean fields only) or an object of operator to operand. It is
//! checked against the schema once by [`WhereClause::compile`]; the resulting
//! [`Predicate`] is a pure, order-preserving filter.

use crate::document::{Document, FieldValue};
use crate::error::{Error, Result};
use crate::schema::{FieldType, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Literal(bool),
    Ops(BTreeMap<String, Value>),
}

impl Condition {
    pub fn is(value: bool) -> Self { Condition::Literal(value) }

    /// Single-operator condition, e.g. `Condition::op("gte", 1800)`.
    pub fn op(name: &str, operand: impl Into<Value>) -> Self {
        Condition::Ops(BTreeMap::from([(name.to_string(), operand.into())]))
    }

    /// Add another operator to an operator condition.
    pub fn with(self, name: &str, operand: impl Into<Value>) -> Self {
        match self {
            Condition::Ops(mut ops) => {
                ops.insert(name.to_string(), operand.into());
                Condition::Ops(ops)
            }
            Condition::Literal(_) => Condition::op(name, operand),
        }
    }

    pub fn lt(v: f64) -> Self { Self::op("lt", v) }
    pub fn lte(v: f64) -> Self { Self::op("lte", v) }
    pub fn gt(v: f64) -> Self { Self::op("gt", v) }
    pub fn gte(v: f64) -> Self { Self::op("gte", v) }
    pub fn between(lo: f64, hi: f64) -> Self { Self::op("bt", vec![lo, hi]) }
    pub fn eq(v: impl Into<Value>) -> Self { Self::op("eq", v) }
    pub fn contains(s: &str) -> Self { Self::op("inc", s) }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WhereClause(BTreeMap<String, Condition>);

impl WhereClause {
    pub fn new() -> Self { Self::default() }

    pub fn field(mut self, name: impl Into<String>, condition: Condition) -> Self {
        self.0.insert(name.into(), condition);
        self
    }

    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::config(format!("malformed where clause: {e}")))
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Validate every condition against the schema.
    pub fn compile(&self, schema: &Schema) -> Result<Predicate> {
        let mut checks = Vec::new();
        for (field, condition) in &self.0 {
            let field_type = schema.require(field)?;
            match (field_type, condition) {
                (FieldType::Boolean, Condition::Literal(b)) => checks.push((field.clone(), Check::Bool(*b))),
                (FieldType::Boolean, Condition::Ops(_)) => {
                    return Err(Error::mismatch(field, "boolean fields only accept a literal true or false"))
                }
                (other, Condition::Literal(_)) => {
                    return Err(Error::mismatch(field, format!("boolean literal used on a {other} field")))
                }
                (_, Condition::Ops(ops)) if ops.is_empty() => {
                    return Err(Error::config(format!("condition on field '{field}' names no operator")))
                }
                (field_type, Condition::Ops(ops)) => {
                    for (name, operand) in ops {
                        checks.push((field.clone(), compile_op(field, field_type, name, operand)?));
                    }
                }
            }
        }
        Ok(Predicate { checks })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Lt,
    Lte,
    Gt,
    Gte,
    Between,
    Eq,
    Includes,
}

impl Operator {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "bt" => Operator::Between,
            "eq" => Operator::Eq,
            "inc" => Operator::Includes,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Check {
    Lt(f64),
    Lte(f64),
    Gt(f64),
    Gte(f64),
    Between(f64, f64),
    NumEq(f64),
    StrEq(String),
    Includes(String),
    Bool(bool),
}

impl Check {
    fn matches(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (Check::Lt(x), FieldValue::Num(v)) => v < x,
            (Check::Lte(x), FieldValue::Num(v)) => v <= x,
            (Check::Gt(x), FieldValue::Num(v)) => v > x,
            (Check::Gte(x), FieldValue::Num(v)) => v >= x,
            (Check::Between(lo, hi), FieldValue::Num(v)) => lo <= v && v <= hi,
            (Check::NumEq(x), FieldValue::Num(v)) => v == x,
            (Check::StrEq(s), FieldValue::Str(v)) => v == s,
            (Check::Includes(s), FieldValue::Str(v)) => v.contains(s.as_str()),
            (Check::Bool(b), FieldValue::Bool(v)) => v == b,
            _ => false,
        }
    }
}

fn compile_op(field: &str, field_type: FieldType, name: &str, operand: &Value) -> Result<Check> {
    let op = Operator::parse(name)
        .ok_or_else(|| Error::config(format!("unsupported operator '{name}' on field '{field}'")))?;
    let number = || {
        operand
            .as_f64()
            .ok_or_else(|| Error::mismatch(field, format!("operator '{name}' expects a number, got {operand}")))
    };
    let string = || {
        operand
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::mismatch(field, format!("operator '{name}' expects a string, got {operand}")))
    };
    match (field_type, op) {
        (FieldType::Number, Operator::Lt) => Ok(Check::Lt(number()?)),
        (FieldType::Number, Operator::Lte) => Ok(Check::Lte(number()?)),
        (FieldType::Number, Operator::Gt) => Ok(Check::Gt(number()?)),
        (FieldType::Number, Operator::Gte) => Ok(Check::Gte(number()?)),
        (FieldType::Number, Operator::Eq) => Ok(Check::NumEq(number()?)),
        (FieldType::Number, Operator::Between) => {
            let bounds = operand.as_array().filter(|a| a.len() == 2);
            match bounds.map(|a| (a[0].as_f64(), a[1].as_f64())) {
                Some((Some(lo), Some(hi))) if lo <= hi => Ok(Check::Between(lo, hi)),
                Some((Some(_), Some(_))) => {
                    Err(Error::config(format!("'bt' on field '{field}' has its lower bound above the upper bound")))
                }
                _ => Err(Error::config(format!("'bt' on field '{field}' expects [min, max], got {operand}"))),
            }
        }
        (FieldType::String, Operator::Eq) => Ok(Check::StrEq(string()?)),
        (FieldType::String, Operator::Includes) => Ok(Check::Includes(string()?)),
        (field_type, _) => Err(Error::mismatch(field, format!("operator '{name}' is not supported on {field_type} fields"))),
    }
}

/// A where-clause validated against a schema. All checks must pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    checks: Vec<(String, Check)>,
}

impl Predicate {
    pub fn matches(&self, doc: &Document) -> bool {
        self.checks
            .iter()
            .all(|(field, check)| doc.get(field).is_some_and(|value| check.matches(value)))
    }

    /// Keep the matching documents, preserving their order.
    pub fn filter<'a>(&self, docs: impl IntoIterator<Item = &'a Document>) -> Vec<&'a Document> {
        docs.into_iter().filter(|doc| self.matches(doc)).collect()
    }
}
