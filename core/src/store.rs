use crate::document::Document;
use crate::error::{Error, Result};
use crate::index::DocId;
use std::collections::HashMap;

/// Arena of inserted documents.
///
/// Structurally equal documents share one canonical id (the first copy's),
/// which is the id the inverted index refers to. Further copies still occupy
/// their own slot so that `len` counts every insert. Ids are never reused.
#[derive(Debug, Default)]
pub struct DocumentStore {
    slots: Vec<Option<Document>>,
    copies: HashMap<Document, Vec<DocId>>,
    live: usize,
}

/// Outcome of [`DocumentStore::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Id the index should use for this document.
    pub canonical: DocId,
    /// True when no structurally equal document was present.
    pub is_new: bool,
}

impl DocumentStore {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, doc: Document) -> Result<Placement> {
        let id = next_id(self.slots.len())?;
        let ids = self.copies.entry(doc.clone()).or_default();
        ids.push(id);
        let placement = Placement { canonical: ids[0], is_new: ids.len() == 1 };
        self.slots.push(Some(doc));
        self.live += 1;
        Ok(placement)
    }

    /// Remove every copy equal to `doc`. Returns the canonical id and how many
    /// copies were dropped, or `None` if nothing matched.
    pub fn remove(&mut self, doc: &Document) -> Option<(DocId, usize)> {
        let ids = self.copies.remove(doc)?;
        for id in &ids {
            if let Some(slot) = self.slots.get_mut(*id as usize) {
                *slot = None;
            }
        }
        self.live -= ids.len();
        Some((ids[0], ids.len()))
    }

    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.slots.get(id as usize).and_then(Option::as_ref)
    }

    pub fn contains(&self, doc: &Document) -> bool { self.copies.contains_key(doc) }

    /// Live documents in insertion order, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = (DocId, &Document)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|doc| (i as DocId, doc)))
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> { self.iter().map(|(_, d)| d) }

    pub fn len(&self) -> usize { self.live }
    pub fn is_empty(&self) -> bool { self.live == 0 }
}

fn next_id(slots: usize) -> Result<DocId> {
    DocId::try_from(slots).map_err(|_| Error::Capacity(format!("document store is full at {slots} slots")))
}
