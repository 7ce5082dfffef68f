use crate::document::{Document, FieldValue};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const MIN_WEIGHT: f64 = 1.0;
pub const MAX_WEIGHT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
}

impl FieldType {
    pub fn matches(self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (FieldType::String, FieldValue::Str(_))
                | (FieldType::Number, FieldValue::Num(_))
                | (FieldType::Boolean, FieldValue::Bool(_))
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// Ordered mapping of field name to type tag. Declaration order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<(String, FieldType)>,
}

impl Schema {
    pub fn new() -> Self { Self::default() }

    /// Builder-style declaration. Re-declaring a name replaces its type in place.
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = field_type,
            None => self.fields.push((name, field_type)),
        }
        self
    }

    /// Parse a JSON object of `field -> "string" | "number" | "boolean"`.
    pub fn from_json(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::config("schema must be an object of field name to type"))?;
        if map.is_empty() {
            return Err(Error::config("schema must declare at least one field"));
        }
        let mut schema = Schema::new();
        for (name, tag) in map {
            let field_type: FieldType = serde_json::from_value(tag.clone()).map_err(|_| {
                Error::config(format!("field '{name}' has unsupported type {tag}; expected string, number or boolean"))
            })?;
            schema = schema.field(name.clone(), field_type);
        }
        Ok(schema)
    }

    pub fn get(&self, name: &str) -> Option<FieldType> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| *t)
    }

    pub fn contains(&self, name: &str) -> bool { self.get(name).is_some() }

    /// Same as [`Schema::get`] but reports unknown names as an error.
    pub fn require(&self, name: &str) -> Result<FieldType> {
        self.get(name).ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(n, t)| (n.as_str(), *t))
    }

    pub fn len(&self) -> usize { self.fields.len() }
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    /// Every declared field must be present with a matching runtime type.
    /// Extra fields are allowed.
    pub fn validate(&self, doc: &Document) -> Result<()> {
        for (name, field_type) in self.iter() {
            match doc.get(name) {
                None => return Err(Error::Validation(format!("missing field '{name}'"))),
                Some(value) if !field_type.matches(value) => {
                    return Err(Error::Validation(format!(
                        "field '{name}' should be {field_type}, got {}",
                        value.type_name()
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// A schema field together with its scoring weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    weight: f64,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self { name: name.into(), field_type, weight: MIN_WEIGHT }
    }

    pub fn weight(&self) -> f64 { self.weight }

    /// Assign a weight, clamped into `[MIN_WEIGHT, MAX_WEIGHT]`. Returns the applied value.
    pub fn set_weight(&mut self, weight: f64) -> Result<f64> {
        self.weight = clamp_weight(&self.name, weight)?;
        Ok(self.weight)
    }
}

/// Out-of-range weights are clamped with a warning; only NaN is rejected.
pub(crate) fn clamp_weight(field: &str, weight: f64) -> Result<f64> {
    if weight.is_nan() {
        return Err(Error::config(format!("weight for field '{field}' is not a number")));
    }
    if weight > MAX_WEIGHT {
        tracing::warn!(field, weight, max = MAX_WEIGHT, "field weight too high, clamping");
        Ok(MAX_WEIGHT)
    } else if weight < MIN_WEIGHT {
        tracing::warn!(field, weight, min = MIN_WEIGHT, "field weight too low, clamping");
        Ok(MIN_WEIGHT)
    } else {
        Ok(weight)
    }
}
