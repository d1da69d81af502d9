//! Error types for tabrecon operations

use std::ops::Range;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReconError>;

/// Coarse classification callers use to tell misconfiguration apart from
/// a comparison that ran into bad data or a resource ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Data,
    Resource,
    Io,
}

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("No common columns between source {source_columns:?} and target {target_columns:?}")]
    NoCommonColumns {
        source_columns: Vec<String>,
        target_columns: Vec<String>,
    },

    #[error("Key columns not found: {requested:?}")]
    KeyColumnsNotFound { requested: Vec<String> },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Resource limit exceeded: {0}")]
    Resource(#[from] ResourceError),

    #[error("Chunk {chunk_index} (rows {}..{}) failed: {source}", .rows.start, .rows.end)]
    ChunkFailed {
        chunk_index: usize,
        rows: Range<usize>,
        #[source]
        source: Box<ReconError>,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0:#}")]
    Generic(#[from] anyhow::Error),
}

/// Malformed input the engine refuses to reconcile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("{side} dataset has columns {first:?} and {second:?} that collide case-insensitively")]
    AmbiguousColumn {
        side: String,
        first: String,
        second: String,
    },
}

/// A window or key group larger than the caller allowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("chunk holds {rows} rows, ceiling is {limit}")]
    ChunkTooLarge { rows: usize, limit: usize },

    #[error("key {key} has {rows} rows on one side, ceiling is {limit}")]
    KeyFanoutTooLarge { key: String, rows: usize, limit: usize },
}

impl ReconError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    pub fn chunk_failed(chunk_index: usize, rows: Range<usize>, source: ReconError) -> Self {
        Self::ChunkFailed {
            chunk_index,
            rows,
            source: Box::new(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoCommonColumns { .. }
            | Self::KeyColumnsNotFound { .. }
            | Self::Config { .. }
            | Self::InvalidInput { .. } => ErrorKind::Configuration,
            Self::Data(_) | Self::Json(_) | Self::Csv(_) => ErrorKind::Data,
            Self::Resource(_) => ErrorKind::Resource,
            Self::ChunkFailed { source, .. } => source.kind(),
            Self::Io(_) => ErrorKind::Io,
            Self::Generic(e) => e
                .downcast_ref::<ReconError>()
                .map_or(ErrorKind::Io, ReconError::kind),
        }
    }

    /// True when nothing was compared because the inputs or options were unusable.
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
