use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// A leaf value stored in a document field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Num(f64),
    Str(String),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "boolean",
            FieldValue::Num(_) => "number",
            FieldValue::Str(_) => "string",
        }
    }

    fn from_json(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(FieldValue::Bool(b)),
            Value::String(s) => Ok(FieldValue::Str(s)),
            Value::Number(n) => n
                .as_f64()
                .map(FieldValue::Num)
                .ok_or_else(|| Error::Validation(format!("field '{field}' holds an unrepresentable number"))),
            other => Err(Error::Validation(format!(
                "field '{field}' must be a string, number or boolean, got {other}"
            ))),
        }
    }
}

// Numbers compare by value; -0.0 equals 0.0 and NaN equals NaN so that
// structural identity stays reflexive.
impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Str(a), FieldValue::Str(b)) => a == b,
            (FieldValue::Num(a), FieldValue::Num(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::Bool(b) => b.hash(state),
            FieldValue::Str(s) => s.hash(state),
            FieldValue::Num(n) => canonical_bits(*n).hash(state),
        }
    }
}

fn canonical_bits(n: f64) -> u64 {
    if n == 0.0 {
        0.0f64.to_bits()
    } else if n.is_nan() {
        f64::NAN.to_bits()
    } else {
        n.to_bits()
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self { FieldValue::Str(v.to_string()) }
}
impl From<String> for FieldValue {
    fn from(v: String) -> Self { FieldValue::Str(v) }
}
impl From<f64> for FieldValue {
    fn from(v: f64) -> Self { FieldValue::Num(v) }
}
impl From<i32> for FieldValue {
    fn from(v: i32) -> Self { FieldValue::Num(f64::from(v)) }
}
impl From<u32> for FieldValue {
    fn from(v: u32) -> Self { FieldValue::Num(f64::from(v)) }
}
impl From<i64> for FieldValue {
    fn from(v: i64) -> Self { FieldValue::Num(v as f64) }
}
impl From<bool> for FieldValue {
    fn from(v: bool) -> Self { FieldValue::Bool(v) }
}

/// A record of field name to leaf value.
///
/// Keys are kept sorted, so two documents are equal (and hash equally) exactly
/// when their full key/value sets match, regardless of construction order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(BTreeMap<String, FieldValue>);

impl Document {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> { self.0.get(field) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Build a document from a JSON object whose values are string, number or boolean leaves.
    pub fn from_json(value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => return Err(Error::Validation(format!("document must be a JSON object, got {other}"))),
        };
        let mut doc = Document::new();
        for (field, v) in map {
            let leaf = FieldValue::from_json(&field, v)?;
            doc.0.insert(field, leaf);
        }
        Ok(doc)
    }

    /// Inverse of [`Document::from_json`]. Non-finite numbers have no JSON form.
    pub fn to_json(&self) -> Result<Value> {
        let mut map = serde_json::Map::with_capacity(self.0.len());
        for (field, value) in &self.0 {
            let leaf = match value {
                FieldValue::Bool(b) => Value::Bool(*b),
                FieldValue::Str(s) => Value::String(s.clone()),
                FieldValue::Num(n) => serde_json::Number::from_f64(*n)
                    .map(Value::Number)
                    .ok_or_else(|| Error::Validation(format!("field '{field}' holds {n}, which JSON cannot represent")))?,
            };
            map.insert(field.clone(), leaf);
        }
        Ok(Value::Object(map))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Document(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
