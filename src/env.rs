//! Environment variable constants used throughout the crate
//!
//! This module centralizes all environment variable names to ensure consistency
//! and make it easier to manage configuration across the codebase.

/// Logging configuration
pub mod logging {
    /// Log level configuration (e.g., "debug", "info", "warn", "error")
    pub const LOG_LEVEL: &str = "VECTORSEARCH_LOG_LEVEL";

    /// Log file path for file-based logging
    pub const LOG_FILE: &str = "VECTORSEARCH_LOG_FILE";

    /// Disable colored output (follows the NO_COLOR standard)
    pub const NO_COLOR: &str = "NO_COLOR";
}

/// External API configuration
pub mod apis {
    /// API key for the embedding provider
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

    /// Override for the embedding endpoint URL
    pub const EMBEDDING_ENDPOINT: &str = "VECTORSEARCH_EMBEDDING_ENDPOINT";

    /// Override for the embedding model name
    pub const EMBEDDING_MODEL: &str = "VECTORSEARCH_EMBEDDING_MODEL";
}

/// Store defaults
pub mod store {
    /// Path of the store file used when the CLI is not given one
    pub const STORE_PATH: &str = "VECTORSEARCH_STORE";
}
