use vectorsearch::reflect::{FieldValue, HostHandle, RecordBlob, RecordType, TypeRef};
use vectorsearch::vector_store::{DistanceMetric, Payload, PayloadKind, QueryFilter, VectorStore};
use vectorsearch::VectorSearchError;

fn item_type() -> TypeRef {
    RecordType::builder("FItem")
        .int32("level")
        .text("title", 16)
        .build()
}

fn mixed_store() -> VectorStore {
    let mut store = VectorStore::new();
    store.add_text(vec![1.0, 0.0], "a", "catX").unwrap();
    store.add_text(vec![0.0, 1.0], "b", "catY").unwrap();
    store
        .add_host_reference(vec![0.9, 0.1], HostHandle::new(5).unwrap(), "catX")
        .unwrap();

    let sword = RecordBlob::new(item_type())
        .with("level", 3)
        .and_then(|b| b.with("title", "Sword"))
        .unwrap();
    store.add(vec![0.5, 0.5], sword, "catZ").unwrap();
    store
}

#[test]
fn test_top_n_text_example() {
    let mut store = VectorStore::new();
    store.add_text(vec![1.0, 0.0], "a", "catX").unwrap();
    store.add_text(vec![0.0, 1.0], "b", "catY").unwrap();

    let filter = QueryFilter::new().with_payload_kind(PayloadKind::Text);
    let hits = store.top_n(&[1.0, 0.0], 1, &filter);

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].payload.as_ref().and_then(Payload::as_text), Some("a"));
    assert_eq!(hits[0].score, 0.0);
    assert_eq!(store.top_n_texts(&[1.0, 0.0], 1, &[]), vec!["a".to_string()]);
}

#[test]
fn test_results_are_sorted_best_first_for_every_metric() {
    let mut store = mixed_store();
    let query = [1.0, 0.2];

    for metric in DistanceMetric::ALL {
        store.set_distance_metric(metric);
        let hits = store.top_n(&query, 10, &QueryFilter::new());
        assert_eq!(hits.len(), store.len());

        for pair in hits.windows(2) {
            if metric.is_similarity() {
                assert!(pair[0].score >= pair[1].score, "{metric}: {hits:?}");
            } else {
                assert!(pair[0].score <= pair[1].score, "{metric}: {hits:?}");
            }
        }
    }
}

#[test]
fn test_n_larger_than_candidates_returns_all_candidates() {
    let store = mixed_store();

    let texts = store.top_n_texts(&[0.0, 1.0], 50, &[]);
    assert_eq!(texts, vec!["b".to_string(), "a".to_string()]);

    assert!(store.top_n(&[0.0, 1.0], 0, &QueryFilter::new()).is_empty());
}

#[test]
fn test_ties_keep_insertion_order() {
    let mut store = VectorStore::new();
    store.add_text(vec![1.0, 1.0], "first", "").unwrap();
    store.add_text(vec![1.0, 1.0], "second", "").unwrap();
    store.add_text(vec![1.0, 1.0], "third", "").unwrap();

    let texts = store.top_n_texts(&[0.0, 0.0], 3, &[]);
    assert_eq!(texts, vec!["first", "second", "third"]);
}

#[test]
fn test_category_and_kind_filters() {
    let store = mixed_store();
    let query = [1.0, 0.0];

    let in_x = store.top_n(&query, 10, &QueryFilter::new().with_category("catX"));
    assert_eq!(in_x.len(), 2);
    assert!(in_x.iter().all(|hit| hit.category == "catX"));

    let texts_in_y = store.top_n_texts(&query, 10, &["catY".to_string()]);
    assert_eq!(texts_in_y, vec!["b".to_string()]);

    let handles = store.top_n_host_references(&query, 10, &[]);
    assert_eq!(handles, vec![HostHandle::new(5).unwrap()]);

    let none = store.top_n(&query, 10, &QueryFilter::new().with_category("missing"));
    assert!(none.is_empty());
}

#[test]
fn test_top_n_records_returns_independent_copies() {
    let ty = item_type();
    let store = mixed_store();

    let mut records = store.top_n_records(&[0.5, 0.5], 5, ty.as_ref(), &[]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("title").unwrap(), FieldValue::Text("Sword".into()));

    records[0].set("level", 99).unwrap();
    let again = store.top_n_records(&[0.5, 0.5], 5, ty.as_ref(), &[]);
    assert_eq!(again[0].get("level").unwrap(), FieldValue::Int32(3));

    let other = RecordType::builder("FOther").int32("x").build();
    assert!(store.top_n_records(&[0.5, 0.5], 5, other.as_ref(), &[]).is_empty());
}

#[test]
fn test_query_of_other_dimension_has_no_candidates() {
    let store = mixed_store();
    assert!(store.top_n(&[1.0, 0.0, 0.0], 10, &QueryFilter::new()).is_empty());
}

#[test]
fn test_add_rejects_dimension_mismatch() {
    let mut store = mixed_store();
    let before = store.len();

    let err = store.add_text(vec![1.0, 2.0, 3.0], "c", "").unwrap_err();
    assert!(matches!(
        err,
        VectorSearchError::DimensionMismatch {
            expected: 2,
            actual: 3
        }
    ));
    assert!(matches!(
        store.add_text(Vec::new(), "empty", "").unwrap_err(),
        VectorSearchError::InvalidArgument { .. }
    ));
    assert_eq!(store.len(), before);
    assert!(store.has_consistent_dimension());
}

#[test]
fn test_stats_and_categories() {
    let store = mixed_store();
    let stats = store.stats();

    assert_eq!(stats.total_entries, 4);
    assert_eq!(stats.text_count, 2);
    assert_eq!(stats.host_reference_count, 1);
    assert_eq!(stats.record_count, 1);
    assert_eq!(stats.empty_payload_count, 0);
    assert_eq!(stats.dimension, 2);
    assert_eq!(stats.category_counts.get("catX"), Some(&2));
    assert_eq!(stats.categories, vec!["catX", "catY", "catZ"]);

    assert_eq!(store.unique_categories(), vec!["catX", "catY", "catZ"]);
    assert_eq!(store.entry_count_for_category("catX"), 2);
    assert_eq!(store.entries(&["catZ".to_string()]).len(), 1);
}

#[test]
fn test_normalize_produces_unit_vectors() {
    let mut store = VectorStore::new();
    store.add_text(vec![3.0, 4.0], "a", "").unwrap();
    store.add_text(vec![0.0, 0.0], "zero", "").unwrap();

    store.normalize();

    let first = &store.records()[0].embedding;
    assert!((first[0] - 0.6).abs() < 1e-6);
    assert!((first[1] - 0.8).abs() < 1e-6);
    assert_eq!(store.records()[1].embedding, vec![0.0, 0.0]);
}

#[test]
fn test_clear_resets_dimension() {
    let mut store = mixed_store();
    store.clear();

    assert!(store.is_empty());
    assert_eq!(store.dimension(), 0);
    store.add_text(vec![1.0, 2.0, 3.0], "wider", "").unwrap();
    assert_eq!(store.dimension(), 3);
}
