//! Distance and similarity metrics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Score returned for vectors of unequal length: infinitely dissimilar.
pub const MISMATCH_SENTINEL: f32 = f32::INFINITY;

/// Metric used for ranking and ranged removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// sqrt(Σ(uᵢ−vᵢ)²), lower is better.
    #[default]
    Euclidean,
    /// Σ|uᵢ−vᵢ|, lower is better.
    Manhattan,
    /// 1 − cos(u, v) as a distance; ranked by cosine similarity, higher is better.
    Cosine,
    /// u·v, a similarity score, higher is better.
    #[serde(alias = "dot_product", alias = "dot")]
    DotProduct,
}

impl DistanceMetric {
    pub const ALL: [DistanceMetric; 4] = [
        DistanceMetric::Euclidean,
        DistanceMetric::Manhattan,
        DistanceMetric::Cosine,
        DistanceMetric::DotProduct,
    ];

    /// Raw metric value between two vectors.
    ///
    /// Cosine yields the cosine distance (0 when either vector has zero norm) and
    /// DotProduct yields the dot product. Unequal lengths yield [`MISMATCH_SENTINEL`].
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return MISMATCH_SENTINEL;
        }

        match self {
            DistanceMetric::Euclidean => euclidean(a, b),
            DistanceMetric::Manhattan => manhattan(a, b),
            DistanceMetric::Cosine => cosine_distance(a, b),
            DistanceMetric::DotProduct => dot(a, b),
        }
    }

    /// Score used for ranking: distance for distance metrics, similarity otherwise.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Cosine if a.len() == b.len() => 1.0 - cosine_distance(a, b),
            _ => self.distance(a, b),
        }
    }

    /// Whether higher scores rank first.
    pub fn is_similarity(&self) -> bool {
        matches!(self, DistanceMetric::Cosine | DistanceMetric::DotProduct)
    }

    /// Ordering of two scores, best first.
    pub fn compare(&self, a: f32, b: f32) -> std::cmp::Ordering {
        if self.is_similarity() {
            b.total_cmp(&a)
        } else {
            a.total_cmp(&b)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::DotProduct => "dotproduct",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            "manhattan" | "l1" => Ok(DistanceMetric::Manhattan),
            "cosine" => Ok(DistanceMetric::Cosine),
            "dotproduct" | "dot_product" | "dot" => Ok(DistanceMetric::DotProduct),
            other => Err(format!(
                "Unknown distance metric '{other}'. Valid metrics: euclidean, manhattan, cosine, dotproduct"
            )),
        }
    }
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

fn manhattan(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a_sq, mut norm_b_sq) = (0.0f32, 0.0f32, 0.0f32);
    for (&x, &y) in a.iter().zip(b) {
        dot += x * y;
        norm_a_sq += x * x;
        norm_b_sq += y * y;
    }

    if norm_a_sq == 0.0 || norm_b_sq == 0.0 {
        return 0.0;
    }
    1.0 - dot / (norm_a_sq.sqrt() * norm_b_sq.sqrt())
}

/// L2 norm of a vector.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
