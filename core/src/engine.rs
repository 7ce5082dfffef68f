//! The search engine: owns the documents, the inverted index and every cache.

use crate::cache::{CacheStats, Memo};
use crate::config::{schema_from_config, EngineOptions, Strictness};
use crate::document::{Document, FieldValue};
use crate::error::{Error, Result};
use crate::filter::WhereClause;
use crate::fuzzy::FuzzyMatcher;
use crate::index::{DocId, InvertedIndex};
use crate::params::{QueryPlan, SearchParams};
use crate::schema::{Field, FieldType, Schema};
use crate::score::{PreparedQuery, ScoringEngine};
use crate::store::DocumentStore;
use crate::tokenizer::Analyzer;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A scored document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub score: f64,
    pub document: Document,
}

#[derive(Debug, Clone)]
pub struct SearchResults {
    pub elapsed: Duration,
    pub count: usize,
    pub hits: Vec<Hit>,
    schema: Arc<Schema>,
}

impl SearchResults {
    /// Stable lexicographic re-sort on a string field.
    pub fn sort_by_field(&mut self, field: &str) -> Result<&[Hit]> {
        if self.schema.require(field)? != FieldType::String {
            return Err(Error::config(format!("invalid field '{field}': only string fields can be sorted")));
        }
        self.hits.sort_by(|a, b| {
            let a = a.document.get(field).and_then(FieldValue::as_str);
            let b = b.document.get(field).and_then(FieldValue::as_str);
            a.cmp(&b)
        });
        Ok(&self.hits)
    }

    pub fn is_empty(&self) -> bool { self.hits.is_empty() }

    pub fn documents(&self) -> impl Iterator<Item = &Document> { self.hits.iter().map(|h| &h.document) }
}

/// Counts from a batch insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub inserted: usize,
    /// Positions (within the batch) of documents that failed validation.
    pub rejected: Vec<usize>,
}

#[derive(Serialize)]
struct CacheKey<'a> {
    query: &'a str,
    parameters: &'a SearchParams,
}

pub struct SearchEngine {
    schema: Arc<Schema>,
    fields: Vec<Field>,
    options: EngineOptions,
    store: DocumentStore,
    index: InvertedIndex,
    analyzer: Analyzer,
    fuzzy: FuzzyMatcher,
    query_cache: Memo<String, Arc<[Hit]>>,
}

/// Construction.
impl SearchEngine {
    pub fn new(schema: Schema) -> Result<Self> { Self::with_options(schema, EngineOptions::default()) }

    pub fn with_options(schema: Schema, options: EngineOptions) -> Result<Self> {
        if schema.is_empty() {
            return Err(Error::config("schema must declare at least one field"));
        }
        let options = options.normalized();
        let fields = schema.iter().map(|(name, ty)| Field::new(name, ty)).collect();
        Ok(Self {
            schema: Arc::new(schema),
            fields,
            store: DocumentStore::new(),
            index: InvertedIndex::new(),
            analyzer: Analyzer::new(options.cache.normalize, options.cache.stem),
            fuzzy: FuzzyMatcher::new(options.fuzzy_threshold, options.cache.distance),
            query_cache: Memo::new(options.cache.query),
            options,
        })
    }

    /// Build from the JSON constructor value `{"schema": {...}}`.
    pub fn from_config(config: &Value) -> Result<Self> { Self::new(schema_from_config(config)?) }

    pub fn from_config_with_options(config: &Value, options: EngineOptions) -> Result<Self> {
        Self::with_options(schema_from_config(config)?, options)
    }
}

/// Accessors.
impl SearchEngine {
    pub fn schema(&self) -> &Schema { &self.schema }
    pub fn options(&self) -> &EngineOptions { &self.options }
    pub fn fields(&self) -> &[Field] { &self.fields }
    pub fn index(&self) -> &InvertedIndex { &self.index }
    pub fn len(&self) -> usize { self.store.len() }
    pub fn is_empty(&self) -> bool { self.store.is_empty() }
    pub fn contains(&self, doc: &Document) -> bool { self.store.contains(doc) }
    pub fn documents(&self) -> impl Iterator<Item = &Document> { self.store.documents() }

    /// Persistently set a field's scoring weight, clamped to `[1, 5]`.
    pub fn set_field_weight(&mut self, field: &str, weight: f64) -> Result<f64> {
        self.schema.require(field)?;
        let slot = self
            .fields
            .iter_mut()
            .find(|f| f.name == field)
            .ok_or_else(|| Error::UnknownField(field.to_string()))?;
        let applied = slot.set_weight(weight)?;
        // cached rankings were computed with the old weight
        self.query_cache.clear();
        Ok(applied)
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            query: self.query_cache.stats(),
            distance: self.fuzzy.memo().stats(),
            normalize: self.analyzer.normalize_memo().stats(),
            stem: self.analyzer.stem_memo().stats(),
        }
    }

    pub fn clear_query_cache(&self) { self.query_cache.clear(); }
}

/// Mutation operations.
impl SearchEngine {
    /// Validate and index one document. Returns `Ok(false)` when a lenient
    /// engine skipped an invalid document.
    pub fn insert(&mut self, doc: Document) -> Result<bool> {
        match self.schema.validate(&doc) {
            Ok(()) => {
                self.index_document(doc)?;
                Ok(true)
            }
            Err(err) => self.reject(err, None).map(|()| false),
        }
    }

    pub fn insert_json(&mut self, value: Value) -> Result<bool> {
        match Document::from_json(value) {
            Ok(doc) => self.insert(doc),
            Err(err) => self.reject(err, None).map(|()| false),
        }
    }

    /// Insert in chunks of `batch_size`. A strict engine stops at the first
    /// invalid document; everything before it stays inserted.
    pub fn insert_batch(&mut self, docs: impl IntoIterator<Item = Document>) -> Result<BatchReport> {
        self.insert_chunked(docs.into_iter().map(Ok).collect())
    }

    pub fn insert_json_batch(&mut self, values: impl IntoIterator<Item = Value>) -> Result<BatchReport> {
        self.insert_chunked(values.into_iter().map(Document::from_json).collect())
    }

    fn insert_chunked(&mut self, docs: Vec<Result<Document>>) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        let mut docs = docs.into_iter().enumerate().peekable();
        while docs.peek().is_some() {
            for (pos, doc) in docs.by_ref().take(self.options.batch_size) {
                match doc.and_then(|d| self.schema.validate(&d).map(|()| d)) {
                    Ok(doc) => {
                        self.index_document(doc)?;
                        report.inserted += 1;
                    }
                    Err(err) => {
                        self.reject(err, Some(pos))?;
                        report.rejected.push(pos);
                    }
                }
            }
        }
        tracing::info!(
            inserted = report.inserted,
            rejected = report.rejected.len(),
            num_docs = self.store.len(),
            num_terms = self.index.term_count(),
            "batch insert complete"
        );
        Ok(report)
    }

    fn reject(&self, err: Error, position: Option<usize>) -> Result<()> {
        match self.options.strictness {
            Strictness::Strict => Err(err),
            Strictness::Lenient => {
                tracing::warn!(error = %err, ?position, "skipping document that does not match schema");
                Ok(())
            }
        }
    }

    fn index_document(&mut self, doc: Document) -> Result<()> {
        let terms = if self.store.contains(&doc) { Vec::new() } else { self.document_terms(&doc) };
        let placement = self.store.push(doc)?;
        if placement.is_new {
            for term in terms {
                self.index.add(term, placement.canonical);
            }
        }
        self.invalidate();
        Ok(())
    }

    fn document_terms(&self, doc: &Document) -> Vec<String> {
        self.schema
            .iter()
            .filter(|(_, ty)| *ty == FieldType::String)
            .filter_map(|(name, _)| doc.get(name).and_then(FieldValue::as_str))
            .flat_map(|text| self.analyzer.index_terms(text))
            .collect()
    }

    /// Remove every stored copy of `doc`. Returns how many copies went away;
    /// unknown documents are a no-op.
    pub fn remove(&mut self, doc: &Document) -> usize {
        let Some((canonical, copies)) = self.store.remove(doc) else {
            return 0;
        };
        let terms = self.index.remove_doc(canonical);
        tracing::debug!(doc_id = canonical, copies, terms, "removed document");
        self.invalidate();
        copies
    }

    pub fn remove_batch<'a>(&mut self, docs: impl IntoIterator<Item = &'a Document>) -> usize {
        let docs: Vec<&Document> = docs.into_iter().collect();
        let mut removed = 0;
        for chunk in docs.chunks(self.options.batch_size) {
            removed += chunk.iter().map(|doc| self.remove(doc)).sum::<usize>();
        }
        removed
    }

    /// Remove the live documents selected by `clause`.
    pub fn remove_where(&mut self, clause: &WhereClause) -> Result<usize> {
        let predicate = clause.compile(&self.schema)?;
        let selected: Vec<Document> = {
            let mut seen = HashSet::new();
            predicate
                .filter(self.store.documents())
                .into_iter()
                .filter(|doc| seen.insert(*doc))
                .cloned()
                .collect()
        };
        Ok(self.remove_batch(&selected))
    }

    fn invalidate(&self) {
        if self.options.invalidate_on_write {
            self.query_cache.clear();
        }
    }
}

/// Search operations.
impl SearchEngine {
    pub fn search(&self, query: &str, params: Option<&SearchParams>) -> Result<SearchResults> {
        let start = Instant::now();
        let default = SearchParams::default();
        let params = params.unwrap_or(&default);
        let plan = params.resolve(&self.schema, &self.fields)?;

        let key = serde_json::to_string(&CacheKey { query, parameters: params })
            .map_err(|e| Error::config(format!("search parameters are not serializable: {e}")))?;
        let ranked = match self.query_cache.get(key.as_str()) {
            Some(hits) => {
                tracing::debug!(query, "query cache hit");
                hits
            }
            None => {
                tracing::debug!(query, "query cache miss");
                let hits: Arc<[Hit]> = self.rank(query, &plan).into();
                self.query_cache.insert(key, Arc::clone(&hits));
                hits
            }
        };

        let hits: Vec<Hit> = ranked.iter().filter(|h| plan.score.accepts(h.score)).cloned().collect();
        Ok(SearchResults { elapsed: start.elapsed(), count: hits.len(), hits, schema: Arc::clone(&self.schema) })
    }

    /// Retrieve, filter, score, sort and dedupe.
    fn rank(&self, query: &str, plan: &QueryPlan) -> Vec<Hit> {
        let terms = self.analyzer.query_terms(query);
        let candidates = self.candidates(&terms);
        let docs: Vec<&Document> = candidates.iter().filter_map(|id| self.store.get(*id)).collect();
        let docs = match &plan.filter {
            Some(predicate) => predicate.filter(docs),
            None => docs,
        };
        tracing::debug!(query, terms = terms.len(), candidates = docs.len(), "scoring candidates");

        let prepared = PreparedQuery::new(query, &self.analyzer);
        let scorer = ScoringEngine::new(&self.analyzer, &self.fuzzy);
        let mut scored: Vec<(f64, &Document)> = docs
            .into_iter()
            .map(|doc| (scorer.score(doc, &prepared, &plan.fields, &plan.ignore), doc))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        // stable: equal scores keep candidate order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut seen = HashSet::new();
        scored
            .into_iter()
            .filter(|(_, doc)| seen.insert(*doc))
            .map(|(score, doc)| Hit { score, document: doc.clone() })
            .collect()
    }

    /// Union of the postings of every indexed term that fuzzy-matches a query
    /// term, in document id order.
    fn candidates(&self, terms: &[String]) -> BTreeSet<DocId> {
        let mut out = BTreeSet::new();
        for term in terms {
            for (indexed, ids) in self.index.iter() {
                if self.fuzzy.is_match(term, indexed) {
                    out.extend(ids.iter().copied());
                }
            }
        }
        out
    }
}
