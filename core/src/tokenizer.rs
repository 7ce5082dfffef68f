use crate::cache::Memo;
use crate::stemmer::stem;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "the","a","and","of","in","to","is","you","that","it","he","was","for","on","are","as",
            "with","his","they","at","be","this","from","i","have","or","by","one","had","not","but",
            "what","all","were","we","when","your","can","said","there","use","an","each","which",
            "she","do","how","their","if","will","up","other","about","out","many","then","them",
            "these","so","some","her","would","make","like","him","into","time","has","look","two",
            "more","write","go","see","number","no","way","could","people","my","than","first",
            "water","been","call","who","oil","its","now","find","long","down","day","did","get",
            "come","made","may","part"
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// NFKC-normalize, lowercase, and drop every character that is neither a word
/// character nor whitespace.
pub fn sanitize(text: &str) -> String {
    let lowered = text.nfkc().collect::<String>().to_lowercase();
    NON_WORD.replace_all(&lowered, "").into_owned()
}

/// Whitespace split without empty pieces.
pub fn split_terms(text: &str) -> impl Iterator<Item = &str> { text.split_whitespace() }

/// Uncached term extraction: sanitize, split and stem.
pub fn tokenize(text: &str) -> Vec<String> {
    split_terms(&sanitize(text)).map(stem).collect()
}

/// Text pipeline with memoized normalization and stemming.
pub struct Analyzer {
    normalized: Memo<String, String>,
    stems: Memo<String, String>,
}

impl Analyzer {
    pub fn new(normalize_capacity: usize, stem_capacity: usize) -> Self {
        Self { normalized: Memo::new(normalize_capacity), stems: Memo::new(stem_capacity) }
    }

    pub fn sanitize(&self, text: &str) -> String {
        self.normalized.get_or_insert_with(text, || sanitize(text))
    }

    pub fn stem(&self, token: &str) -> String {
        self.stems.get_or_insert_with(token, || stem(token))
    }

    /// Terms a string field contributes to the inverted index.
    pub fn index_terms(&self, text: &str) -> Vec<String> {
        let clean = self.sanitize(text);
        split_terms(&clean).map(|t| self.stem(t)).collect()
    }

    /// Terms used for relevance scoring: like [`Analyzer::index_terms`] with stopwords removed.
    pub fn scoring_terms(&self, text: &str) -> Vec<String> {
        let clean = self.sanitize(text);
        split_terms(&clean).filter(|t| !is_stopword(t)).map(|t| self.stem(t)).collect()
    }

    /// Query terms for candidate retrieval: lowercase, split, then sanitize and
    /// stem each word. Words that sanitize to nothing are dropped.
    pub fn query_terms(&self, query: &str) -> Vec<String> {
        query
            .to_lowercase()
            .split_whitespace()
            .map(|word| self.sanitize(word))
            .filter(|word| !word.is_empty())
            .flat_map(|word| split_terms(&word).map(|t| self.stem(t)).collect::<Vec<_>>())
            .collect()
    }

    pub(crate) fn normalize_memo(&self) -> &Memo<String, String> { &self.normalized }
    pub(crate) fn stem_memo(&self) -> &Memo<String, String> { &self.stems }
}
