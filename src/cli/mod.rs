pub mod config;
pub mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;

#[derive(Parser)]
#[command(name = "vectorsearch")]
#[command(about = "Embeddable vector similarity store")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Store file (defaults to $VECTORSEARCH_STORE or the configured default path)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty store file
    Init {
        /// Store name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,
        /// Store description
        #[arg(short, long)]
        description: Option<String>,
        /// Distance metric (euclidean, manhattan, cosine, dotproduct)
        #[arg(short, long)]
        metric: Option<String>,
        /// Overwrite an existing store file
        #[arg(short, long)]
        force: bool,
    },
    /// Show store statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a text record
    Add {
        /// Text payload
        text: String,
        /// Category of the record
        #[arg(short, long, default_value = "")]
        category: String,
        /// Comma-separated embedding; fetched from the embedding provider when omitted
        #[arg(short, long)]
        vector: Option<String>,
    },
    /// Rank records against a query
    Query {
        /// Query text, embedded through the provider unless --vector is given
        text: Option<String>,
        /// Comma-separated query embedding
        #[arg(short, long)]
        vector: Option<String>,
        /// Number of results (default: 5)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Restrict to categories (repeatable)
        #[arg(short, long)]
        category: Vec<String>,
        /// Restrict to a payload kind (text, host_reference, record_blob)
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// Remove records by embedding or id
    Remove {
        /// Comma-separated embedding to match
        #[arg(short, long, conflicts_with = "id")]
        vector: Option<String>,
        /// Record id
        #[arg(long)]
        id: Option<String>,
        /// Remove every match instead of the first
        #[arg(short, long)]
        all: bool,
        /// Also remove records within this distance
        #[arg(short, long, default_value_t = 0.0)]
        range: f32,
    },
    /// List records, optionally by category
    List {
        /// Restrict to categories (repeatable)
        #[arg(short, long)]
        category: Vec<String>,
    },
    /// L2-normalize every embedding
    Normalize,
    /// Show or change the distance metric
    Metric {
        /// New metric (euclidean, manhattan, cosine, dotproduct)
        metric: Option<String>,
    },
    /// Remove every record
    Clear,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Get a config value
    Get {
        /// Config key (default-metric, default-path, embedding-endpoint, embedding-model, api-key)
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Reset a config value to its default
    Unset {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Print the config file path
    Path,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let rt = Runtime::new()?;
        let store_path = self.store;

        rt.block_on(async {
            match self.command {
                Commands::Init {
                    name,
                    description,
                    metric,
                    force,
                } => store::handle_init_command(store_path, name, description, metric, force),
                Commands::Stats { json } => store::handle_stats_command(store_path, json),
                Commands::Add {
                    text,
                    category,
                    vector,
                } => store::handle_add_command(store_path, text, category, vector).await,
                Commands::Query {
                    text,
                    vector,
                    limit,
                    category,
                    kind,
                } => {
                    store::handle_query_command(store_path, text, vector, limit, category, kind)
                        .await
                }
                Commands::Remove {
                    vector,
                    id,
                    all,
                    range,
                } => store::handle_remove_command(store_path, vector, id, all, range),
                Commands::List { category } => store::handle_list_command(store_path, category),
                Commands::Normalize => store::handle_normalize_command(store_path),
                Commands::Metric { metric } => store::handle_metric_command(store_path, metric),
                Commands::Clear => store::handle_clear_command(store_path),
                Commands::Config { command } => match command {
                    ConfigCommands::Get { key } => config::handle_get_command(key),
                    ConfigCommands::Set { key, value } => config::handle_set_command(key, value),
                    ConfigCommands::Unset { key } => config::handle_unset_command(key),
                    ConfigCommands::List => config::handle_list_command(),
                    ConfigCommands::Path => config::handle_path_command(),
                },
            }
        })
    }
}
