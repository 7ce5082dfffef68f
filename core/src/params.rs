use crate::error::{Error, Result};
use crate::filter::{Condition, Predicate, WhereClause};
use crate::schema::{Field, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

const SCORE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Post-filter on the final score. Every bound must lie strictly inside (0, 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<f64>,
}

impl ScoreFilter {
    fn validate(&self) -> Result<()> {
        for (name, bound) in [("gt", self.gt), ("lt", self.lt), ("eq", self.eq)] {
            if let Some(b) = bound {
                if !(b > 0.0 && b < 1.0) {
                    return Err(Error::config(format!("score bound '{name}' must lie strictly between 0 and 1, got {b}")));
                }
            }
        }
        Ok(())
    }

    pub fn accepts(&self, score: f64) -> bool {
        self.gt.map_or(true, |b| score > b)
            && self.lt.map_or(true, |b| score < b)
            && self.eq.map_or(true, |b| (score - b).abs() < SCORE_EPSILON)
    }
}

/// Optional search parameters: `fields`, `where`, `score` and `ignore`.
///
/// Serializes canonically (sorted maps, omitted empties), which the engine
/// relies on for its query cache key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchParams {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldParams>,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<WhereClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreFilter>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub ignore: BTreeSet<String>,
}

impl SearchParams {
    pub fn new() -> Self { Self::default() }

    /// Parse from JSON. Unknown keys anywhere in the structure are configuration errors.
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::config(format!("invalid search parameters: {e}")))
    }

    pub fn weight(mut self, field: impl Into<String>, weight: f64) -> Self {
        self.fields.insert(field.into(), FieldParams { weight: Some(weight) });
        self
    }

    pub fn filter(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.filter = Some(self.filter.take().unwrap_or_default().field(field, condition));
        self
    }

    pub fn ignore(mut self, field: impl Into<String>) -> Self {
        self.ignore.insert(field.into());
        self
    }

    pub fn score_gt(mut self, bound: f64) -> Self {
        self.score.get_or_insert_with(ScoreFilter::default).gt = Some(bound);
        self
    }

    pub fn score_lt(mut self, bound: f64) -> Self {
        self.score.get_or_insert_with(ScoreFilter::default).lt = Some(bound);
        self
    }

    pub fn score_eq(mut self, bound: f64) -> Self {
        self.score.get_or_insert_with(ScoreFilter::default).eq = Some(bound);
        self
    }

    /// Validate against the schema and layer weight overrides on top of `base`.
    pub(crate) fn resolve(&self, schema: &Schema, base: &[Field]) -> Result<QueryPlan> {
        let mut fields = base.to_vec();
        for (name, params) in &self.fields {
            schema.require(name)?;
            if let (Some(weight), Some(field)) = (params.weight, fields.iter_mut().find(|f| f.name == *name)) {
                field.set_weight(weight)?;
            }
        }
        for name in &self.ignore {
            schema.require(name)?;
        }
        let filter = match &self.filter {
            Some(clause) if !clause.is_empty() => Some(clause.compile(schema)?),
            _ => None,
        };
        let score = self.score.unwrap_or_default();
        score.validate()?;
        Ok(QueryPlan { fields, filter, score, ignore: self.ignore.clone() })
    }
}

/// Validated, schema-bound form of [`SearchParams`] for one search.
#[derive(Debug, Clone)]
pub(crate) struct QueryPlan {
    pub fields: Vec<Field>,
    pub filter: Option<Predicate>,
    pub score: ScoreFilter,
    pub ignore: BTreeSet<String>,
}
