//! In-memory vector store with brute-force ranked retrieval.

use std::collections::BTreeMap;

use uuid::Uuid;

use super::metric::{l2_norm, DistanceMetric};
use super::models::{
    Payload, PayloadKind, QueryFilter, SearchHit, VectorRecord, VectorStoreStats,
};
use crate::error::{Result, VectorSearchError};
use crate::reflect::{HostHandle, RecordBlob, TypeDescriptor, TypeRef};

/// Ordered collection of embeddings and their payloads.
///
/// The store exclusively owns every record. Payloads handed in by value are moved
/// in; record bytes borrowed from the caller are deep-copied. All embeddings share
/// one dimension: an insert whose length disagrees with the stored records is
/// rejected with [`VectorSearchError::DimensionMismatch`].
#[derive(Debug, Default)]
pub struct VectorStore {
    records: Vec<VectorRecord>,
    metric: DistanceMetric,
}

impl VectorStore {
    /// Create an empty store using the default (Euclidean) metric.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metric(metric: DistanceMetric) -> Self {
        Self {
            records: Vec::new(),
            metric,
        }
    }

    /// Append a record, returning its id.
    pub fn add(
        &mut self,
        embedding: Vec<f32>,
        payload: impl Into<Payload>,
        category: impl Into<String>,
    ) -> Result<Uuid> {
        self.insert(VectorRecord::new(embedding, payload.into(), category))
    }

    pub fn add_text(
        &mut self,
        embedding: Vec<f32>,
        text: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Uuid> {
        self.add(embedding, Payload::Text(text.into()), category)
    }

    pub fn add_host_reference(
        &mut self,
        embedding: Vec<f32>,
        handle: HostHandle,
        category: impl Into<String>,
    ) -> Result<Uuid> {
        self.add(embedding, Payload::from(handle), category)
    }

    /// Append a record whose payload is a deep copy of caller-owned record bytes.
    pub fn add_record(
        &mut self,
        embedding: Vec<f32>,
        ty: TypeRef,
        bytes: &[u8],
        category: impl Into<String>,
    ) -> Result<Uuid> {
        self.check_dimension(&embedding)?;
        let blob = RecordBlob::from_bytes(ty, bytes)?;
        self.insert(VectorRecord::new(embedding, Payload::RecordBlob(blob), category))
    }

    /// Append a fully built record, keeping its id.
    pub fn insert(&mut self, record: VectorRecord) -> Result<Uuid> {
        self.check_dimension(&record.embedding)?;

        let id = record.id;
        tracing::debug!(
            id = %id,
            kind = ?record.payload_kind(),
            category = %record.category,
            "adding vector record"
        );
        self.records.push(record);
        Ok(id)
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<()> {
        if embedding.is_empty() {
            return Err(VectorSearchError::invalid_argument("embedding is empty"));
        }
        if let Some(index) = embedding.iter().position(|x| !x.is_finite()) {
            let err = VectorSearchError::invalid_argument(format!(
                "embedding component {index} is not finite"
            ));
            tracing::warn!(error = %err, "rejecting record");
            return Err(err);
        }
        match self.records.first() {
            Some(first) if first.embedding.len() != embedding.len() => {
                let err =
                    VectorSearchError::dimension_mismatch(first.embedding.len(), embedding.len());
                tracing::warn!(error = %err, "rejecting record");
                Err(err)
            }
            _ => Ok(()),
        }
    }

    /// Remove records matching `target`.
    ///
    /// A record matches when its embedding equals `target` exactly, or when `range > 0`
    /// and its distance to `target` under the active metric is at most `range`. Records
    /// of another dimension never match. A
    /// negative range counts as 0. With `remove_all == false` only the first match in
    /// insertion order is removed. Returns whether anything was removed.
    pub fn remove(&mut self, target: &[f32], remove_all: bool, range: f32) -> Result<bool> {
        if target.is_empty() {
            let err = VectorSearchError::invalid_argument("cannot remove by an empty vector");
            tracing::error!(error = %err, "remove rejected");
            return Err(err);
        }

        let range = if range > 0.0 { range } else { 0.0 };
        let metric = self.metric;
        let qualifies = |record: &VectorRecord| {
            record.embedding.len() == target.len()
                && (record.embedding.as_slice() == target
                    || (range > 0.0 && metric.distance(&record.embedding, target) <= range))
        };

        let removed = if remove_all {
            let before = self.records.len();
            self.records.retain(|record| !qualifies(record));
            before - self.records.len()
        } else {
            match self.records.iter().position(qualifies) {
                Some(index) => {
                    self.records.remove(index);
                    1
                }
                None => 0,
            }
        };

        tracing::debug!(removed, remove_all, range, "removed vector records");
        Ok(removed > 0)
    }

    /// Remove the record with `id`, returning it.
    pub fn remove_by_id(&mut self, id: Uuid) -> Option<VectorRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        tracing::debug!(id = %id, "removing vector record");
        Some(self.records.remove(index))
    }

    pub fn clear(&mut self) {
        tracing::debug!(count = self.records.len(), "clearing vector store");
        self.records.clear();
    }

    /// Candidate indices with scores, best first; ties keep insertion order.
    fn rank(&self, query: &[f32], filter: &QueryFilter) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| filter.matches(record, query.len()))
            .map(|(index, record)| (index, self.metric.score(query, &record.embedding)))
            .collect();

        // `sort_by` is stable.
        scored.sort_by(|a, b| self.metric.compare(a.1, b.1));
        scored
    }

    /// The `n` best records for `query`. `n == 0` yields no hits.
    pub fn top_n(&self, query: &[f32], n: usize, filter: &QueryFilter) -> Vec<SearchHit> {
        if n == 0 {
            return Vec::new();
        }

        self.rank(query, filter)
            .into_iter()
            .take(n)
            .map(|(index, score)| SearchHit::from_record(&self.records[index], score))
            .collect()
    }

    pub fn top_n_texts(&self, query: &[f32], n: usize, categories: &[String]) -> Vec<String> {
        let filter = QueryFilter::new()
            .with_payload_kind(PayloadKind::Text)
            .with_categories(categories.iter().cloned());

        self.rank(query, &filter)
            .into_iter()
            .take(n)
            .filter_map(|(index, _)| {
                self.records[index]
                    .payload
                    .as_ref()
                    .and_then(Payload::as_text)
                    .map(str::to_string)
            })
            .collect()
    }

    /// Best host references; records whose reference is null are skipped.
    pub fn top_n_host_references(
        &self,
        query: &[f32],
        n: usize,
        categories: &[String],
    ) -> Vec<HostHandle> {
        let filter = QueryFilter::new()
            .with_payload_kind(PayloadKind::HostReference)
            .with_categories(categories.iter().cloned());

        self.rank(query, &filter)
            .into_iter()
            .take(n)
            .filter_map(|(index, _)| {
                self.records[index]
                    .payload
                    .as_ref()
                    .and_then(Payload::as_host_reference)
            })
            .collect()
    }

    /// Deep copies of the best record blobs of type `ty`.
    ///
    /// Ranking runs over every record blob; blobs of another type inside the top
    /// `n` are skipped.
    pub fn top_n_records(
        &self,
        query: &[f32],
        n: usize,
        ty: &dyn TypeDescriptor,
        categories: &[String],
    ) -> Vec<RecordBlob> {
        let filter = QueryFilter::new()
            .with_payload_kind(PayloadKind::RecordBlob)
            .with_categories(categories.iter().cloned());

        let mut results = Vec::new();
        for (index, _) in self.rank(query, &filter).into_iter().take(n) {
            let Some(blob) = self.records[index].payload.as_ref().and_then(Payload::as_record)
            else {
                continue;
            };
            let copied = blob
                .extract_as(ty)
                .and_then(|bytes| RecordBlob::from_owned(blob.record_type().clone(), bytes));
            match copied {
                Ok(copy) => results.push(copy),
                Err(e) => tracing::warn!(
                    id = %self.records[index].id,
                    error = %e,
                    "skipping record of another type"
                ),
            }
        }
        results
    }

    /// Every record in the given categories (all when empty), in insertion order,
    /// with a score of 0.
    pub fn entries(&self, categories: &[String]) -> Vec<SearchHit> {
        self.records
            .iter()
            .filter(|r| categories.is_empty() || categories.contains(&r.category))
            .map(|r| SearchHit::from_record(r, 0.0))
            .collect()
    }

    pub fn entries_for_category(&self, category: &str) -> Vec<&VectorRecord> {
        self.records.iter().filter(|r| r.category == category).collect()
    }

    pub fn entry_count_for_category(&self, category: &str) -> usize {
        self.records.iter().filter(|r| r.category == category).count()
    }

    /// Sorted, de-duplicated, non-empty categories.
    pub fn unique_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .records
            .iter()
            .filter(|r| !r.category.is_empty())
            .map(|r| r.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn get(&self, id: Uuid) -> Option<&VectorRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn set_category(&mut self, id: Uuid, category: impl Into<String>) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.category = category.into();
                true
            }
            None => false,
        }
    }

    pub fn set_metadata(
        &mut self,
        id: Uuid,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.metadata.insert(key.into(), value.into());
                true
            }
            None => false,
        }
    }

    pub fn records(&self) -> &[VectorRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &VectorRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> VectorStoreStats {
        let mut stats = VectorStoreStats {
            total_entries: self.records.len(),
            dimension: self.dimension(),
            ..Default::default()
        };
        let mut category_counts: BTreeMap<String, usize> = BTreeMap::new();

        for record in &self.records {
            match record.payload_kind() {
                Some(PayloadKind::Text) => stats.text_count += 1,
                Some(PayloadKind::HostReference) => stats.host_reference_count += 1,
                Some(PayloadKind::RecordBlob) => stats.record_count += 1,
                None => stats.empty_payload_count += 1,
            }
            let count = category_counts.entry(record.category.clone()).or_insert(0);
            if *count == 0 {
                stats.categories.push(record.category.clone());
            }
            *count += 1;
        }

        stats.category_counts = category_counts;
        stats
    }

    /// L2-normalize every embedding in place; zero vectors are left as they are.
    pub fn normalize(&mut self) {
        let mut skipped = 0usize;
        for record in &mut self.records {
            let norm = l2_norm(&record.embedding);
            if norm > 0.0 {
                record.embedding.iter_mut().for_each(|x| *x /= norm);
            } else {
                skipped += 1;
            }
        }
        tracing::debug!(count = self.records.len(), skipped, "normalized embeddings");
    }

    /// Embedding length of the first record, or 0 when empty.
    pub fn dimension(&self) -> usize {
        self.records.first().map_or(0, |r| r.embedding.len())
    }

    pub fn has_consistent_dimension(&self) -> bool {
        let dimension = self.dimension();
        self.records.iter().all(|r| r.embedding.len() == dimension)
    }

    pub fn distance_metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn set_distance_metric(&mut self, metric: DistanceMetric) {
        tracing::debug!(from = %self.metric, to = %metric, "switching distance metric");
        self.metric = metric;
    }

    /// Raw metric value between two vectors under the active metric.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        self.metric.distance(a, b)
    }
}
