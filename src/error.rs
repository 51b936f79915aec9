use thiserror::Error;

/// Error types for the vector search core
#[derive(Error, Debug)]
pub enum VectorSearchError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Dimension mismatch: store holds {expected}-dimensional embeddings, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Type resolution failed: {type_name}")]
    TypeResolution { type_name: String },

    #[error("Format error: {message}")]
    Format { message: String },

    #[error("Reference resolution failed: {path}")]
    ReferenceResolution { path: String },

    #[error("Type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Unknown field: {field}")]
    UnknownField { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Embedding provider error: {message}")]
    Embedding { message: String },
}

impl VectorSearchError {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create a type resolution error
    pub fn type_resolution<S: Into<String>>(type_name: S) -> Self {
        Self::TypeResolution {
            type_name: type_name.into(),
        }
    }

    /// Create a format error
    pub fn format<S: Into<String>>(message: S) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create a reference resolution error
    pub fn reference_resolution<S: Into<String>>(path: S) -> Self {
        Self::ReferenceResolution { path: path.into() }
    }

    /// Create a type mismatch error
    pub fn type_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field<S: Into<String>>(field: S) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an embedding provider error
    pub fn embedding<S: Into<String>>(message: S) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Whether the failure is scoped to a single record or field.
    ///
    /// Recoverable failures are logged and skipped by batch operations; everything
    /// else aborts the operation and reaches the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VectorSearchError::TypeResolution { .. }
                | VectorSearchError::ReferenceResolution { .. }
                | VectorSearchError::TypeMismatch { .. }
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            VectorSearchError::InvalidArgument { .. } => "invalid_argument",
            VectorSearchError::DimensionMismatch { .. } => "dimension",
            VectorSearchError::TypeResolution { .. } => "type_resolution",
            VectorSearchError::Format { .. } => "format",
            VectorSearchError::ReferenceResolution { .. } => "reference_resolution",
            VectorSearchError::TypeMismatch { .. } => "type_mismatch",
            VectorSearchError::UnknownField { .. } => "unknown_field",
            VectorSearchError::Io(_) => "io",
            VectorSearchError::Json(_) => "json",
            VectorSearchError::InvalidConfig { .. } => "config",
            VectorSearchError::NotFound { .. } => "not_found",
            VectorSearchError::Embedding { .. } => "embedding",
        }
    }
}

/// Result type alias for the vector search core
pub type Result<T> = std::result::Result<T, VectorSearchError>;
