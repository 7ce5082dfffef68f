use fieldsift::{
    Condition, Document, EngineOptions, Error, FieldType, Schema, SearchEngine, SearchParams, WhereClause,
};
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn book(title: &str, year: i32) -> Document { Document::new().with("title", title).with("year", year) }

fn books() -> SearchEngine {
    init_tracing();
    let schema = Schema::new().field("title", FieldType::String).field("year", FieldType::Number);
    SearchEngine::new(schema).unwrap()
}

#[test]
fn weighted_title_match() -> anyhow::Result<()> {
    let mut engine = books();
    engine.insert(book("A Tale of Two Cities", 1859))?;
    let results = engine.search("tale cities", Some(&SearchParams::new().weight("title", 5.0)))?;
    assert_eq!(results.count, 1);
    assert!((results.hits[0].score - 5.0 / 6.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn unmatched_query_returns_nothing() -> anyhow::Result<()> {
    let mut engine = books();
    engine.insert(book("A Tale of Two Cities", 1859))?;
    let results = engine.search("nonexistentword", None)?;
    assert_eq!(results.count, 0);
    assert!(results.is_empty());
    Ok(())
}

#[test]
fn number_fields_score_numeric_query_words() -> anyhow::Result<()> {
    let mut engine = books();
    engine.insert(book("A Tale of Two Cities", 1859))?;
    let results = engine.search("tale 1859", None)?;
    assert_eq!(results.count, 1);
    assert!((results.hits[0].score - 0.75).abs() < 1e-9);
    Ok(())
}

#[test]
fn between_filter_excludes_out_of_range() -> anyhow::Result<()> {
    let mut engine = books();
    engine.insert_batch([book("The Old House", 1750), book("Bleak House", 1853), book("House of Leaves", 2000)])?;
    let params = SearchParams::new().filter("year", Condition::between(1800.0, 1900.0));
    let results = engine.search("house", Some(&params))?;
    let titles: Vec<&str> = results.documents().filter_map(|d| d.get("title").and_then(|v| v.as_str())).collect();
    assert_eq!(titles, ["Bleak House"]);

    let params = SearchParams::from_json(json!({"where": {"year": {"bt": [1900, 1800]}}}))?;
    assert!(matches!(engine.search("house", Some(&params)), Err(Error::Config(_))));
    Ok(())
}

#[test]
fn lte_filter_keeps_documents_up_to_the_bound() -> anyhow::Result<()> {
    let mut engine = books();
    engine.insert_batch([book("The Old House", 1750), book("Bleak House", 1853), book("House of Leaves", 2000)])?;
    let params = SearchParams::from_json(json!({"where": {"year": {"lte": 1853}}}))?;
    let results = engine.search("house", Some(&params))?;
    let years: Vec<f64> = results.documents().filter_map(|d| d.get("year").and_then(|v| v.as_f64())).collect();
    assert_eq!(years, [1750.0, 1853.0]);

    let exact = SearchParams::from_json(json!({"where": {"year": {"eq": 2000}}}))?;
    assert_eq!(engine.search("house", Some(&exact))?.count, 1);
    Ok(())
}

#[test]
fn oversized_weight_is_clamped() -> anyhow::Result<()> {
    let mut engine = books();
    engine.insert(book("A Tale of Two Cities", 1859))?;
    let clamped = engine.search("tale cities", Some(&SearchParams::new().weight("title", 10.0)))?;
    let max = engine.search("tale cities", Some(&SearchParams::new().weight("title", 5.0)))?;
    assert_eq!(clamped.hits[0].score, max.hits[0].score);
    // overrides do not stick
    assert_eq!(engine.fields()[0].weight(), 1.0);
    Ok(())
}

#[test]
fn persistent_weights() -> anyhow::Result<()> {
    let mut engine = books();
    engine.insert(book("A Tale of Two Cities", 1859))?;
    assert_eq!(engine.search("tale cities", None)?.hits[0].score, 0.5);
    assert_eq!(engine.set_field_weight("title", 10.0)?, 5.0);
    assert!((engine.search("tale cities", None)?.hits[0].score - 5.0 / 6.0).abs() < 1e-9);
    assert!(matches!(engine.set_field_weight("pages", 2.0), Err(Error::UnknownField(_))));
    Ok(())
}

#[test]
fn removed_documents_leave_the_index() -> anyhow::Result<()> {
    let mut engine = books();
    let tale = book("A Tale of Two Cities", 1859);
    engine.insert(tale.clone())?;
    engine.insert(book("Emma", 1815))?;
    assert_eq!(engine.remove(&tale), 1);
    assert_eq!(engine.search("tale cities", None)?.count, 0);
    assert!(!engine.index().contains_term("tal"));
    assert!(!engine.index().contains_term("citss"));
    assert!(engine.index().contains_term("emma"));
    assert_eq!(engine.len(), 1);
    Ok(())
}

#[test]
fn removing_unknown_document_is_a_noop() -> anyhow::Result<()> {
    let mut engine = books();
    engine.insert(book("Emma", 1815))?;
    let terms = engine.index().term_count();
    assert_eq!(engine.remove(&book("Emma", 1816)), 0);
    assert_eq!(engine.len(), 1);
    assert_eq!(engine.index().term_count(), terms);
    Ok(())
}

#[test]
fn lenient_batches_skip_invalid_documents() -> anyhow::Result<()> {
    let mut engine = books();
    let report = engine.insert_json_batch([
        json!({"title": "Emma", "year": 1815}),
        json!({"title": 5, "year": 1816}),
        json!({"title": "Persuasion"}),
        json!({"title": "Dracula", "year": 1897, "author": "Stoker"}),
    ])?;
    assert_eq!(report.inserted, 2);
    assert_eq!(report.rejected, [1, 2]);
    assert_eq!(engine.len(), 2);
    assert!(!engine.insert_json(json!({"title": "Emma"}))?);
    Ok(())
}

#[test]
fn strict_batches_stop_at_first_invalid_document() {
    init_tracing();
    let schema = Schema::new().field("title", FieldType::String).field("year", FieldType::Number);
    let mut engine =
        SearchEngine::with_options(schema, EngineOptions::default().strict().with_batch_size(1)).unwrap();
    let bad = Document::new().with("title", "Emma").with("year", "1815");
    let err = engine.insert_batch([book("Persuasion", 1817), bad, book("Dracula", 1897)]).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(engine.len(), 1);
    assert!(engine.insert_json(json!({"year": 1815})).is_err());
}

#[test]
fn configuration_errors() {
    assert!(SearchEngine::from_config(&json!({"schema": {"title": "string", "read": "boolean"}})).is_ok());
    for bad in [
        json!({"schema": {"title": "text"}}),
        json!({"schema": {}}),
        json!({"fields": {"title": "string"}}),
        json!("title"),
    ] {
        let err = SearchEngine::from_config(&bad).err().map(|e| e.is_config());
        assert_eq!(err, Some(true), "{bad}");
    }
}

#[test]
fn invalid_parameters() -> anyhow::Result<()> {
    let mut engine = books();
    engine.insert(book("Emma", 1815))?;
    assert!(matches!(SearchParams::from_json(json!({"limit": 3})), Err(Error::Config(_))));
    let unknown = SearchParams::new().filter("pages", Condition::gt(100.0));
    assert!(matches!(engine.search("emma", Some(&unknown)), Err(Error::UnknownField(_))));
    let ignored = SearchParams::new().ignore("pages");
    assert!(matches!(engine.search("emma", Some(&ignored)), Err(Error::UnknownField(_))));
    let mismatch = SearchParams::new().filter("year", Condition::contains("18"));
    assert!(matches!(engine.search("emma", Some(&mismatch)), Err(Error::TypeMismatch { .. })));
    Ok(())
}

#[test]
fn boolean_and_string_conditions() -> anyhow::Result<()> {
    let mut engine = SearchEngine::from_config(&json!({"schema": {"title": "string", "read": "boolean"}}))?;
    engine.insert(Document::new().with("title", "Persuasion").with("read", true))?;
    engine.insert(Document::new().with("title", "Persuasion Abridged").with("read", false))?;

    let read = SearchParams::from_json(json!({"where": {"read": true}}))?;
    assert_eq!(engine.search("persuasion", Some(&read))?.count, 1);

    let abridged = SearchParams::new().filter("title", Condition::contains("Abridged"));
    assert_eq!(engine.search("persuasion", Some(&abridged))?.count, 1);
    // substring match is case-sensitive
    let lower = SearchParams::new().filter("title", Condition::contains("abridged"));
    assert_eq!(engine.search("persuasion", Some(&lower))?.count, 0);

    let wrong = SearchParams::from_json(json!({"where": {"read": {"eq": true}}}))?;
    assert!(matches!(engine.search("persuasion", Some(&wrong)), Err(Error::TypeMismatch { .. })));
    Ok(())
}

#[test]
fn sort_by_string_field() -> anyhow::Result<()> {
    let mut engine = books();
    engine.insert_batch([book("Zebra Tales", 1900), book("Apple Tales", 1901), book("Mango Tales", 1902)])?;
    let mut results = engine.search("tales", Some(&SearchParams::new().ignore("year")))?;
    let titles = |r: &fieldsift::SearchResults| -> Vec<String> {
        r.documents().filter_map(|d| d.get("title").and_then(|v| v.as_str()).map(str::to_string)).collect()
    };
    assert_eq!(titles(&results), ["Zebra Tales", "Apple Tales", "Mango Tales"]);
    results.sort_by_field("title")?;
    assert_eq!(titles(&results), ["Apple Tales", "Mango Tales", "Zebra Tales"]);
    assert!(matches!(results.sort_by_field("year"), Err(Error::Config(_))));
    assert!(matches!(results.sort_by_field("pages"), Err(Error::UnknownField(_))));
    Ok(())
}

#[test]
fn score_post_filter() -> anyhow::Result<()> {
    let mut engine = books();
    engine.insert(book("A Tale of Two Cities", 1859))?;
    let base = SearchParams::new().weight("title", 5.0);
    assert_eq!(engine.search("tale cities", Some(&base.clone().score_gt(0.9)))?.count, 0);
    assert_eq!(engine.search("tale cities", Some(&base.clone().score_lt(0.9)))?.count, 1);
    assert!(engine.search("tale cities", Some(&base.score_gt(1.0))).is_err());
    Ok(())
}

#[test]
fn writes_invalidate_cached_queries() -> anyhow::Result<()> {
    let mut engine = books();
    engine.insert(book("A Tale of Two Cities", 1859))?;
    assert_eq!(engine.search("tale", None)?.count, 1);
    engine.insert(book("Tale of Woe", 1900))?;
    assert_eq!(engine.search("tale", None)?.count, 2);
    Ok(())
}

#[test]
fn stale_results_can_be_kept() -> anyhow::Result<()> {
    init_tracing();
    let schema = Schema::new().field("title", FieldType::String).field("year", FieldType::Number);
    let mut engine = SearchEngine::with_options(schema, EngineOptions::default().keep_stale_results())?;
    engine.insert(book("A Tale of Two Cities", 1859))?;
    assert_eq!(engine.search("tale", None)?.count, 1);
    engine.insert(book("Tale of Woe", 1900))?;
    assert_eq!(engine.search("tale", None)?.count, 1);
    engine.clear_query_cache();
    assert_eq!(engine.search("tale", None)?.count, 2);
    Ok(())
}

#[test]
fn remove_where_then_search() -> anyhow::Result<()> {
    let mut engine = books();
    engine.insert_batch([book("Bleak House", 1853), book("House of Leaves", 2000)])?;
    let clause = WhereClause::from_json(json!({"year": {"gte": 1900}}))?;
    assert_eq!(engine.remove_where(&clause)?, 1);
    let titles: Vec<String> = engine
        .search("house", None)?
        .documents()
        .filter_map(|d| d.get("title").and_then(|v| v.as_str()).map(str::to_string))
        .collect();
    assert_eq!(titles, ["Bleak House"]);
    Ok(())
}
