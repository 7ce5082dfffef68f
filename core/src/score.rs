use crate::document::{Document, FieldValue};
use crate::fuzzy::FuzzyMatcher;
use crate::schema::Field;
use crate::tokenizer::Analyzer;
use std::collections::{BTreeSet, HashSet};

/// A query broken down once per search for every field type the scorer handles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedQuery {
    /// Sanitized, stopword-free, stemmed terms for string fields.
    pub terms: Vec<String>,
    /// Query words that read as finite numbers.
    pub numbers: Vec<f64>,
    /// Query words that are literally `true` or `false`, ignoring case.
    pub booleans: Vec<bool>,
}

impl PreparedQuery {
    pub fn new(query: &str, analyzer: &Analyzer) -> Self {
        let lowered = query.to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();
        let terms = analyzer.scoring_terms(&lowered);
        let mut numbers = Vec::new();
        let mut booleans = Vec::new();
        for word in words {
            let clean = analyzer.sanitize(word);
            let number = word.parse::<f64>().ok().or_else(|| clean.parse::<f64>().ok());
            if let Some(n) = number.filter(|n| n.is_finite()) {
                numbers.push(n);
            }
            match word {
                "true" => booleans.push(true),
                "false" => booleans.push(false),
                _ => {}
            }
        }
        Self { terms, numbers, booleans }
    }
}

/// Field-weighted relevance in `[0, 1]`.
pub struct ScoringEngine<'a> {
    analyzer: &'a Analyzer,
    fuzzy: &'a FuzzyMatcher,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(analyzer: &'a Analyzer, fuzzy: &'a FuzzyMatcher) -> Self { Self { analyzer, fuzzy } }

    /// Weighted mean of per-field scores over the fields that are present on
    /// the document and not ignored. Absent fields count toward neither sum.
    pub fn score(&self, doc: &Document, query: &PreparedQuery, fields: &[Field], ignore: &BTreeSet<String>) -> f64 {
        let mut total_score = 0.0;
        let mut total_weight = 0.0;
        for field in fields {
            if ignore.contains(&field.name) {
                continue;
            }
            let Some(value) = doc.get(&field.name) else { continue };
            let weight = field.weight();
            total_score += self.field_score(value, query) * weight;
            total_weight += weight;
        }
        if total_weight == 0.0 {
            return 0.0;
        }
        (total_score / total_weight).clamp(0.0, 1.0)
    }

    fn field_score(&self, value: &FieldValue, query: &PreparedQuery) -> f64 {
        match value {
            FieldValue::Str(text) => self.text_score(text, &query.terms),
            FieldValue::Num(n) => indicator(query.numbers.iter().any(|q| q == n)),
            FieldValue::Bool(b) => indicator(query.booleans.contains(b)),
        }
    }

    /// 1.0 on an exact term-sequence match, otherwise the share of query terms
    /// found verbatim or within the fuzzy threshold.
    pub fn text_score(&self, text: &str, query_terms: &[String]) -> f64 {
        if query_terms.is_empty() {
            return 0.0;
        }
        let field_terms = self.analyzer.scoring_terms(text);
        if field_terms == query_terms {
            return 1.0;
        }
        let present: HashSet<&str> = field_terms.iter().map(String::as_str).collect();
        let matched = query_terms
            .iter()
            .filter(|q| present.contains(q.as_str()) || field_terms.iter().any(|f| self.fuzzy.is_match(q, f)))
            .count();
        matched as f64 / query_terms.len() as f64
    }
}

fn indicator(hit: bool) -> f64 {
    if hit {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn fixtures() -> (Analyzer, FuzzyMatcher) { (Analyzer::new(64, 64), FuzzyMatcher::default()) }

    fn fields(weights: &[(&str, FieldType, f64)]) -> Vec<Field> {
        weights
            .iter()
            .map(|(name, ty, w)| {
                let mut f = Field::new(*name, *ty);
                f.set_weight(*w).unwrap();
                f
            })
            .collect()
    }

    #[test]
    fn exact_match_scores_one() {
        let (analyzer, fuzzy) = fixtures();
        let scorer = ScoringEngine::new(&analyzer, &fuzzy);
        let doc = Document::new().with("title", "A Tale of Two Cities");
        let q = PreparedQuery::new("tale cities", &analyzer);
        let f = fields(&[("title", FieldType::String, 1.0)]);
        assert_eq!(scorer.score(&doc, &q, &f, &BTreeSet::new()), 1.0);
    }

    #[test]
    fn weights_blend_field_scores() {
        let (analyzer, fuzzy) = fixtures();
        let scorer = ScoringEngine::new(&analyzer, &fuzzy);
        let doc = Document::new().with("title", "A Tale of Two Cities").with("year", 1859);
        let q = PreparedQuery::new("tale cities", &analyzer);
        let f = fields(&[("title", FieldType::String, 5.0), ("year", FieldType::Number, 1.0)]);
        let s = scorer.score(&doc, &q, &f, &BTreeSet::new());
        assert!((s - 5.0 / 6.0).abs() < 1e-12);

        let ignore = BTreeSet::from(["year".to_string()]);
        assert_eq!(scorer.score(&doc, &q, &f, &ignore), 1.0);
    }

    #[test]
    fn partial_and_fuzzy_terms() {
        let (analyzer, fuzzy) = fixtures();
        let scorer = ScoringEngine::new(&analyzer, &fuzzy);
        let q = PreparedQuery::new("tael dickens", &analyzer);
        // "tael" is within the threshold of "tal"; "dickens" matches nothing
        assert_eq!(scorer.text_score("A Tale of Two Cities", &q.terms), 0.5);
    }

    #[test]
    fn numbers_and_booleans() {
        let (analyzer, fuzzy) = fixtures();
        let scorer = ScoringEngine::new(&analyzer, &fuzzy);
        let doc = Document::new().with("year", 1859).with("read", true);
        let f = fields(&[("year", FieldType::Number, 1.0), ("read", FieldType::Boolean, 1.0)]);
        let none = BTreeSet::new();
        assert_eq!(scorer.score(&doc, &PreparedQuery::new("1859 TRUE", &analyzer), &f, &none), 1.0);
        assert_eq!(scorer.score(&doc, &PreparedQuery::new("1859 false", &analyzer), &f, &none), 0.5);
        assert_eq!(scorer.score(&doc, &PreparedQuery::new("nothing", &analyzer), &f, &none), 0.0);
        // punctuation around a boolean word keeps it from counting
        assert_eq!(scorer.score(&doc, &PreparedQuery::new("1859 true!", &analyzer), &f, &none), 0.5);
        assert!(PreparedQuery::new("\"false\"", &analyzer).booleans.is_empty());
    }

    #[test]
    fn absent_or_ignored_fields_do_not_count() {
        let (analyzer, fuzzy) = fixtures();
        let scorer = ScoringEngine::new(&analyzer, &fuzzy);
        let doc = Document::new().with("title", "Emma");
        let f = fields(&[("title", FieldType::String, 1.0), ("year", FieldType::Number, 5.0)]);
        let q = PreparedQuery::new("emma", &analyzer);
        assert_eq!(scorer.score(&doc, &q, &f, &BTreeSet::new()), 1.0);
        let all = BTreeSet::from(["title".to_string(), "year".to_string()]);
        assert_eq!(scorer.score(&doc, &q, &f, &all), 0.0);
    }

    #[test]
    fn stopword_only_query_scores_zero() {
        let (analyzer, fuzzy) = fixtures();
        let scorer = ScoringEngine::new(&analyzer, &fuzzy);
        let q = PreparedQuery::new("the of", &analyzer);
        assert_eq!(scorer.text_score("The", &q.terms), 0.0);
    }
}
