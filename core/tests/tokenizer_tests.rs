use fieldsift::tokenizer::{is_stopword, tokenize, Analyzer};
use fieldsift::{sanitize, stem};

#[test]
fn it_normalizes_and_stems() {
    let words = tokenize("Running Runners RUN! The café's menu.");
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    // punctuation goes, accents stay
    assert!(words.contains(&"café".to_string()));
    assert!(words.contains(&"runn".to_string()));
    assert!(words.iter().all(|w| w.chars().all(|c| c.is_alphanumeric() || c == '_')));
}

#[test]
fn it_filters_stopwords_for_scoring_only() {
    let analyzer = Analyzer::new(32, 32);
    let scoring = analyzer.scoring_terms("The quick brown fox and the lazy dog");
    assert!(!scoring.contains(&"the".to_string()));
    assert!(!scoring.contains(&"and".to_string()));
    assert_eq!(scoring.len(), 5);
    let indexed = analyzer.index_terms("The quick brown fox and the lazy dog");
    assert_eq!(indexed.len(), 8);
    assert!(is_stopword("water"));
    assert!(!is_stopword("fox"));
}

#[test]
fn sanitize_keeps_word_characters_and_whitespace() {
    assert_eq!(sanitize("It's 9:30, O'Brien_Jr!"), "its 930 obrien_jr");
    assert_eq!(sanitize("tabs\tand\nnewlines"), "tabs\tand\nnewlines");
}

#[test]
fn analyzer_matches_uncached_pipeline() {
    let analyzer = Analyzer::new(4, 4);
    for text in ["Hopping filing relational", "Generalization of nations", "A Tale of Two Cities"] {
        assert_eq!(analyzer.index_terms(text), tokenize(text));
        // second pass is served from the caches
        assert_eq!(analyzer.index_terms(text), tokenize(text));
    }
    assert_eq!(analyzer.stem("RUNNING"), stem("running"));
}
