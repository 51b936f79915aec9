use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::{self, Config};
use crate::persistence::StoreSnapshot;
use crate::reflect::{InMemoryHostResolver, InMemoryTypeRegistry};
use crate::vector_store::{DistanceMetric, Payload, PayloadKind, QueryFilter, VectorStore};

const DEFAULT_LIMIT: usize = 5;

/// A store file opened for one command.
///
/// The CLI knows no host record types, so record-blob payloads whose type cannot
/// be resolved are dropped on load. Saving such a store would lose them for good,
/// so [`StoreFile::save`] refuses.
struct StoreFile {
    path: PathBuf,
    snapshot: StoreSnapshot,
    store: VectorStore,
    resolver: InMemoryHostResolver,
    dropped_payloads: usize,
}

impl StoreFile {
    fn open(path: PathBuf) -> Result<Self> {
        let snapshot = StoreSnapshot::load_from_file(&path)
            .with_context(|| format!("Failed to open store file: {}", path.display()))?;

        // Host paths are interned so they survive a load/save cycle unchanged.
        let mut resolver = InMemoryHostResolver::new();
        for entry in snapshot.entries() {
            for host_path in entry.object_path.iter().chain(entry.struct_refs.values()) {
                resolver.register(host_path.as_str());
            }
        }

        let store = snapshot.to_store(&InMemoryTypeRegistry::new(), &resolver);
        let persisted_payloads = snapshot
            .entries()
            .iter()
            .filter(|e| e.entry_type.is_some())
            .count();
        let loaded_payloads = store.iter().filter(|r| r.payload.is_some()).count();

        Ok(Self {
            path,
            snapshot,
            store,
            resolver,
            dropped_payloads: persisted_payloads.saturating_sub(loaded_payloads),
        })
    }

    fn save(&mut self) -> Result<()> {
        if self.dropped_payloads > 0 {
            anyhow::bail!(
                "{} record payload(s) in {} use types unknown to this tool; refusing to rewrite the file",
                self.dropped_payloads,
                self.path.display()
            );
        }

        self.snapshot.capture(&self.store, &self.resolver);
        self.snapshot
            .save_to_file(&self.path)
            .with_context(|| format!("Failed to save store file: {}", self.path.display()))
    }
}

fn store_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let config = Config::load()?;
    config::resolve_store_path(explicit, &config).context(
        "No store file given. Pass --store, set VECTORSEARCH_STORE, or run `vectorsearch config set default-path <file>`",
    )
}

fn open(explicit: Option<PathBuf>) -> Result<StoreFile> {
    StoreFile::open(store_path(explicit)?)
}

/// Parse a comma- or whitespace-separated embedding.
pub fn parse_vector(value: &str) -> Result<Vec<f32>> {
    let embedding = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f32>()
                .with_context(|| format!("Invalid vector component: {part}"))
        })
        .collect::<Result<Vec<_>>>()?;

    if embedding.is_empty() {
        anyhow::bail!("Vector must contain at least one component");
    }
    Ok(embedding)
}

fn parse_metric(value: &str) -> Result<DistanceMetric> {
    value.parse().map_err(|e: String| anyhow::anyhow!(e))
}

fn parse_kind(value: &str) -> Result<PayloadKind> {
    match value.to_lowercase().replace('-', "_").as_str() {
        "text" => Ok(PayloadKind::Text),
        "host_reference" | "reference" => Ok(PayloadKind::HostReference),
        "record_blob" | "record" => Ok(PayloadKind::RecordBlob),
        other => anyhow::bail!(
            "Unknown payload kind '{other}'. Valid kinds: text, host_reference, record_blob"
        ),
    }
}

#[cfg(feature = "reqwest")]
async fn embed_text(text: &str) -> Result<Vec<f32>> {
    use crate::embedding::{EmbeddingConfig, EmbeddingProvider, OpenAiEmbeddingClient};

    let config = Config::load()?;
    let client = OpenAiEmbeddingClient::new(EmbeddingConfig::from_config(&config))
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    client
        .embed(text)
        .await
        .map_err(|e| anyhow::anyhow!("{} ({e})", e.user_message()))
}

#[cfg(not(feature = "reqwest"))]
async fn embed_text(_text: &str) -> Result<Vec<f32>> {
    anyhow::bail!("Built without an embedding client; pass --vector")
}

fn describe_payload(payload: Option<&Payload>) -> String {
    match payload {
        Some(Payload::Text(text)) => format!("text: {text}"),
        Some(Payload::HostReference(Some(handle))) => format!("host reference {handle}"),
        Some(Payload::HostReference(None)) => "host reference (unresolved)".to_string(),
        Some(Payload::RecordBlob(blob)) => {
            format!("record {} ({} bytes)", blob.type_name(), blob.as_bytes().len())
        }
        None => "(no payload)".to_string(),
    }
}

fn display_category(category: &str) -> &str {
    if category.is_empty() {
        "(none)"
    } else {
        category
    }
}

pub fn handle_init_command(
    store: Option<PathBuf>,
    name: Option<String>,
    description: Option<String>,
    metric: Option<String>,
    force: bool,
) -> Result<()> {
    let config = Config::load()?;
    let path = store_path(store)?;
    if path.exists() && !force {
        anyhow::bail!(
            "Store file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    let metric = match metric {
        Some(m) => parse_metric(&m)?,
        None => config.store.default_metric,
    };
    let name = name.unwrap_or_else(|| file_stem(&path));

    let mut snapshot =
        StoreSnapshot::from_store(name, &VectorStore::with_metric(metric), &InMemoryHostResolver::new());
    if let Some(description) = description {
        snapshot.set_description(description);
    }
    snapshot.save_to_file(&path)?;

    println!("✓ Created store {} ({})", path.display(), metric);
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string())
}

pub fn handle_stats_command(store: Option<PathBuf>, json: bool) -> Result<()> {
    let file = open(store)?;
    let stats = file.store.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let doc = file.snapshot.document();
    println!("Store: {}", file.snapshot.name());
    if !file.snapshot.description().is_empty() {
        println!("  Description: {}", file.snapshot.description());
    }
    println!("  File: {}", file.path.display());
    println!("  Created: {}", doc.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Modified: {}", doc.modified_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Metric: {}", file.store.distance_metric());
    println!("  Dimension: {}", stats.dimension);
    println!(
        "  Consistent dimension: {}",
        if file.store.has_consistent_dimension() { "yes" } else { "no" }
    );
    println!();
    println!("Entries: {}", stats.total_entries);
    println!("  Text: {}", stats.text_count);
    println!("  Host references: {}", stats.host_reference_count);
    println!("  Records: {}", stats.record_count);
    if stats.empty_payload_count > 0 {
        println!("  Without payload: {}", stats.empty_payload_count);
    }

    if !stats.categories.is_empty() {
        println!();
        println!("Categories:");
        for category in &stats.categories {
            let count = stats.category_counts.get(category).copied().unwrap_or(0);
            println!("  {}: {}", display_category(category), count);
        }
    }

    Ok(())
}

pub async fn handle_add_command(
    store: Option<PathBuf>,
    text: String,
    category: String,
    vector: Option<String>,
) -> Result<()> {
    let mut file = open(store)?;
    let embedding = match vector {
        Some(v) => parse_vector(&v)?,
        None => embed_text(&text).await?,
    };

    let id = file.store.add_text(embedding, text, category)?;
    file.save()?;

    println!("✓ Added record {id}");
    Ok(())
}

pub async fn handle_query_command(
    store: Option<PathBuf>,
    text: Option<String>,
    vector: Option<String>,
    limit: Option<usize>,
    categories: Vec<String>,
    kind: Option<String>,
) -> Result<()> {
    let file = open(store)?;
    let query = match (vector, text) {
        (Some(v), _) => parse_vector(&v)?,
        (None, Some(t)) => embed_text(&t).await?,
        (None, None) => anyhow::bail!("Provide query text or --vector"),
    };

    let mut filter = QueryFilter::new().with_categories(categories);
    if let Some(kind) = kind {
        filter = filter.with_payload_kind(parse_kind(&kind)?);
    }

    let hits = file
        .store
        .top_n(&query, limit.unwrap_or(DEFAULT_LIMIT), &filter);

    if hits.is_empty() {
        println!("No matching records.");
        return Ok(());
    }

    let label = if file.store.distance_metric().is_similarity() {
        "similarity"
    } else {
        "distance"
    };
    println!("Results ({}, {}):", file.store.distance_metric(), label);
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{:>3}. [{:.4}] {}",
            rank + 1,
            hit.score,
            describe_payload(hit.payload.as_ref())
        );
        println!("     id: {}  category: {}", hit.id, display_category(&hit.category));
    }

    Ok(())
}

pub fn handle_remove_command(
    store: Option<PathBuf>,
    vector: Option<String>,
    id: Option<String>,
    all: bool,
    range: f32,
) -> Result<()> {
    let mut file = open(store)?;

    let removed = match (vector, id) {
        (Some(v), _) => {
            let target = parse_vector(&v)?;
            let before = file.store.len();
            file.store.remove(&target, all, range)?;
            before - file.store.len()
        }
        (None, Some(id)) => {
            let id = Uuid::parse_str(&id).with_context(|| format!("Invalid record id: {id}"))?;
            usize::from(file.store.remove_by_id(id).is_some())
        }
        (None, None) => anyhow::bail!("Provide --vector or --id"),
    };

    if removed == 0 {
        println!("No matching records.");
        return Ok(());
    }

    file.save()?;
    println!("✓ Removed {removed} record(s)");
    Ok(())
}

pub fn handle_list_command(store: Option<PathBuf>, categories: Vec<String>) -> Result<()> {
    let file = open(store)?;
    let entries = file.store.entries(&categories);

    println!("Records: {}", entries.len());
    for entry in &entries {
        println!(
            "  {}  [{}] dim={}  {}",
            entry.id,
            display_category(&entry.category),
            entry.embedding.len(),
            describe_payload(entry.payload.as_ref())
        );
    }

    Ok(())
}

pub fn handle_normalize_command(store: Option<PathBuf>) -> Result<()> {
    let mut file = open(store)?;
    file.store.normalize();
    file.save()?;

    println!("✓ Normalized {} embedding(s)", file.store.len());
    Ok(())
}

pub fn handle_metric_command(store: Option<PathBuf>, metric: Option<String>) -> Result<()> {
    let mut file = open(store)?;

    match metric {
        None => println!("{}", file.store.distance_metric()),
        Some(m) => {
            let metric = parse_metric(&m)?;
            file.store.set_distance_metric(metric);
            file.save()?;
            println!("✓ Distance metric set to {metric}");
        }
    }

    Ok(())
}

pub fn handle_clear_command(store: Option<PathBuf>) -> Result<()> {
    let mut file = open(store)?;
    let count = file.store.len();
    file.store.clear();
    // Clearing discards unknown payloads too, so nothing is lost by rewriting.
    file.dropped_payloads = 0;
    file.save()?;

    println!("✓ Cleared {count} record(s)");
    Ok(())
}
