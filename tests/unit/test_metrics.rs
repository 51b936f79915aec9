use std::cmp::Ordering;

use vectorsearch::vector_store::{l2_norm, DistanceMetric, MISMATCH_SENTINEL};

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn test_known_values() {
    assert!(approx_eq(DistanceMetric::Euclidean.distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0));
    assert!(approx_eq(DistanceMetric::Manhattan.distance(&[1.0, 2.0], &[4.0, 6.0]), 7.0));
    assert!(approx_eq(DistanceMetric::DotProduct.distance(&[1.0, 2.0], &[3.0, 4.0]), 11.0));
    assert!(approx_eq(DistanceMetric::Cosine.distance(&[1.0, 0.0], &[0.0, 1.0]), 1.0));
    assert!(approx_eq(DistanceMetric::Cosine.distance(&[2.0, 0.0], &[5.0, 0.0]), 0.0));
}

#[test]
fn test_zero_vectors() {
    assert_eq!(DistanceMetric::Euclidean.distance(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    assert_eq!(DistanceMetric::Cosine.distance(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    assert_eq!(DistanceMetric::Cosine.distance(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
}

#[test]
fn test_unequal_lengths_yield_sentinel() {
    assert_eq!(MISMATCH_SENTINEL, f32::INFINITY);
    for metric in DistanceMetric::ALL {
        assert_eq!(metric.distance(&[1.0, 2.0], &[1.0, 2.0, 3.0]), MISMATCH_SENTINEL);
        assert_eq!(metric.score(&[1.0], &[1.0, 2.0]), MISMATCH_SENTINEL);
    }
}

#[test]
fn test_cosine_score_is_similarity() {
    let metric = DistanceMetric::Cosine;
    assert!(approx_eq(metric.score(&[1.0, 0.0], &[3.0, 0.0]), 1.0));
    assert!(approx_eq(metric.score(&[1.0, 0.0], &[-1.0, 0.0]), -1.0));
}

#[test]
fn test_compare_orders_best_first() {
    assert_eq!(DistanceMetric::Euclidean.compare(0.5, 2.0), Ordering::Less);
    assert_eq!(DistanceMetric::Manhattan.compare(2.0, 0.5), Ordering::Greater);
    assert_eq!(DistanceMetric::Cosine.compare(0.9, 0.1), Ordering::Less);
    assert_eq!(DistanceMetric::DotProduct.compare(1.0, 11.0), Ordering::Greater);
    assert_eq!(DistanceMetric::DotProduct.compare(3.0, 3.0), Ordering::Equal);
}

#[test]
fn test_parse_and_display() {
    for metric in DistanceMetric::ALL {
        assert_eq!(metric.to_string().parse::<DistanceMetric>().unwrap(), metric);
    }
    assert_eq!("L2".parse::<DistanceMetric>().unwrap(), DistanceMetric::Euclidean);
    assert_eq!("dot".parse::<DistanceMetric>().unwrap(), DistanceMetric::DotProduct);
    assert!("hamming".parse::<DistanceMetric>().is_err());
    assert_eq!(DistanceMetric::default(), DistanceMetric::Euclidean);
}

#[test]
fn test_serde_names() {
    let json = serde_json::to_string(&DistanceMetric::DotProduct).unwrap();
    assert_eq!(json, "\"dotproduct\"");

    let parsed: DistanceMetric = serde_json::from_str("\"dot_product\"").unwrap();
    assert_eq!(parsed, DistanceMetric::DotProduct);
}

#[test]
fn test_l2_norm() {
    assert!(approx_eq(l2_norm(&[3.0, 4.0]), 5.0));
    assert_eq!(l2_norm(&[]), 0.0);
}
