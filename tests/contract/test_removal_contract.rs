use vectorsearch::vector_store::{DistanceMetric, VectorStore};
use vectorsearch::VectorSearchError;

fn texts(store: &VectorStore) -> Vec<String> {
    store
        .iter()
        .filter_map(|r| r.payload.as_ref().and_then(|p| p.as_text()).map(str::to_string))
        .collect()
}

fn store_with(metric: DistanceMetric) -> VectorStore {
    let mut store = VectorStore::with_metric(metric);
    store.add_text(vec![1.0, 0.0], "a", "").unwrap();
    store.add_text(vec![0.0, 1.0], "b", "").unwrap();
    store.add_text(vec![1.0, 0.0], "a-again", "").unwrap();
    store.add_text(vec![1.1, 0.0], "near-a", "").unwrap();
    store
}

#[test]
fn test_exact_match_removes_first_only() {
    let mut store = store_with(DistanceMetric::Euclidean);

    assert!(store.remove(&[1.0, 0.0], false, 0.0).unwrap());
    assert_eq!(texts(&store), vec!["b", "a-again", "near-a"]);
}

#[test]
fn test_no_match_reports_false_and_leaves_store_unchanged() {
    let mut store = store_with(DistanceMetric::Euclidean);
    let before = texts(&store);

    assert!(!store.remove(&[5.0, 5.0], true, 0.0).unwrap());
    assert!(!store.remove(&[5.0, 5.0, 5.0], false, 100.0).unwrap());
    assert!(!store.remove(&[5.0, 5.0, 5.0], true, f32::MAX).unwrap());
    assert!(!store.remove(&[5.0], true, f32::INFINITY).unwrap());
    assert_eq!(texts(&store), before);
}

#[test]
fn test_remove_all_exact_matches() {
    let mut store = store_with(DistanceMetric::Euclidean);

    assert!(store.remove(&[1.0, 0.0], true, 0.0).unwrap());
    assert_eq!(texts(&store), vec!["b", "near-a"]);
}

#[test]
fn test_range_uses_active_metric() {
    let mut store = store_with(DistanceMetric::Euclidean);
    assert!(store.remove(&[1.0, 0.0], true, 0.2).unwrap());
    assert_eq!(texts(&store), vec!["b"]);

    // Under Manhattan [1.1, 0] is 0.1 away but [0, 1] is 2 away.
    let mut store = store_with(DistanceMetric::Manhattan);
    assert!(store.remove(&[1.0, 0.0], true, 1.5).unwrap());
    assert_eq!(texts(&store), vec!["b"]);

    // Cosine distance ignores magnitude.
    let mut store = store_with(DistanceMetric::Cosine);
    assert!(store.remove(&[7.0, 0.0], true, 0.01).unwrap());
    assert_eq!(texts(&store), vec!["b"]);
}

#[test]
fn test_range_removal_without_all_takes_first_in_insertion_order() {
    let mut store = store_with(DistanceMetric::Euclidean);

    assert!(store.remove(&[1.05, 0.0], false, 0.2).unwrap());
    assert_eq!(texts(&store), vec!["b", "a-again", "near-a"]);
}

#[test]
fn test_negative_range_behaves_as_exact_match() {
    let mut store = store_with(DistanceMetric::Euclidean);

    assert!(!store.remove(&[1.05, 0.0], true, -3.0).unwrap());
    assert_eq!(store.len(), 4);

    assert!(store.remove(&[0.0, 1.0], true, -3.0).unwrap());
    assert_eq!(texts(&store), vec!["a", "a-again", "near-a"]);
}

#[test]
fn test_removed_set_is_independent_of_scan_direction() {
    let mut forward = store_with(DistanceMetric::Euclidean);
    forward.remove(&[1.0, 0.0], true, 0.2).unwrap();

    let mut repeated = store_with(DistanceMetric::Euclidean);
    while repeated.remove(&[1.0, 0.0], false, 0.2).unwrap() {}

    assert_eq!(texts(&forward), texts(&repeated));
}

#[test]
fn test_empty_target_is_rejected() {
    let mut store = store_with(DistanceMetric::Euclidean);

    let err = store.remove(&[], true, 1.0).unwrap_err();
    assert!(matches!(err, VectorSearchError::InvalidArgument { .. }));
    assert_eq!(store.len(), 4);
}

#[test]
fn test_remove_by_id_and_clear() {
    let mut store = store_with(DistanceMetric::Euclidean);
    let id = store.records()[1].id;

    let removed = store.remove_by_id(id).unwrap();
    assert_eq!(removed.payload.as_ref().and_then(|p| p.as_text()), Some("b"));
    assert!(store.remove_by_id(id).is_none());

    store.clear();
    assert!(store.is_empty());
    assert!(!store.remove(&[1.0, 0.0], true, 10.0).unwrap());
}
