//! Embeddable in-memory full-text search over schema-typed documents.
//!
//! Documents are validated against a [`Schema`], their string fields are
//! normalized, stemmed and added to an [`InvertedIndex`], and queries are
//! answered by fuzzy term retrieval, optional [`WhereClause`] filtering and
//! field-weighted scoring in `[0, 1]`.
//!
//! ```no_run
//! use fieldsift::{Document, FieldType, Schema, SearchEngine, SearchParams};
//!
//! let schema = Schema::new().field("title", FieldType::String).field("year", FieldType::Number);
//! let mut engine = SearchEngine::new(schema)?;
//! engine.insert(Document::new().with("title", "A Tale of Two Cities").with("year", 1859))?;
//! let results = engine.search("tale cities", Some(&SearchParams::new().weight("title", 5.0)))?;
//! assert_eq!(results.count, 1);
//! # Ok::<(), fieldsift::Error>(())
//! ```

pub mod cache;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod filter;
pub mod fuzzy;
pub mod index;
pub mod params;
pub mod schema;
pub mod score;
pub mod stemmer;
pub mod store;
pub mod tokenizer;

pub use cache::{CacheStats, MemoStats};
pub use config::{CacheSizes, EngineOptions, Strictness};
pub use document::{Document, FieldValue};
pub use engine::{BatchReport, Hit, SearchEngine, SearchResults};
pub use error::{Error, Result};
pub use filter::{Condition, Predicate, WhereClause};
pub use fuzzy::{levenshtein, FuzzyMatcher};
pub use index::{DocId, InvertedIndex};
pub use params::{FieldParams, ScoreFilter, SearchParams};
pub use schema::{Field, FieldType, Schema};
pub use stemmer::stem;
pub use tokenizer::sanitize;
