use std::collections::{BTreeSet, HashMap};

pub type DocId = u32;

/// Stemmed term -> ids of the documents containing it.
///
/// Ids point into the [`DocumentStore`](crate::store::DocumentStore) arena.
/// A term whose postings become empty is removed.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, BTreeSet<DocId>>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, term: impl Into<String>, doc_id: DocId) {
        self.postings.entry(term.into()).or_default().insert(doc_id);
    }

    /// Drop `doc_id` from every postings set, pruning emptied terms.
    /// Returns the number of terms that referenced it.
    pub fn remove_doc(&mut self, doc_id: DocId) -> usize {
        let mut touched = 0;
        self.postings.retain(|_, ids| {
            if ids.remove(&doc_id) {
                touched += 1;
            }
            !ids.is_empty()
        });
        touched
    }

    pub fn postings(&self, term: &str) -> Option<&BTreeSet<DocId>> { self.postings.get(term) }

    pub fn contains_term(&self, term: &str) -> bool { self.postings.contains_key(term) }

    pub fn terms(&self) -> impl Iterator<Item = &str> { self.postings.keys().map(String::as_str) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<DocId>)> {
        self.postings.iter().map(|(t, ids)| (t.as_str(), ids))
    }

    pub fn term_count(&self) -> usize { self.postings.len() }
    pub fn is_empty(&self) -> bool { self.postings.is_empty() }
}
