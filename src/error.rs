//! Error types for schema parsing, engine operations and session scripts.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn JSON text into a [`Schema`](crate::Schema).
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Not JSON, not an object, or `definition` missing / malformed.
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field '{name}': start must be >= 1, got {start}")]
    InvalidStart { name: String, start: i64 },

    #[error("field '{name}': end must be -1 or >= start ({start}), got {end}")]
    InvalidBounds { name: String, start: i64, end: i64 },
}

/// Failure of a [`RecordFilterEngine`](crate::RecordFilterEngine) operation.
///
/// The engine keeps its previous state whenever one of these is returned.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("field index {index} out of range (schema has {field_count} fields)")]
    UnknownField { index: usize, field_count: usize },

    #[error("no field named '{0}' in schema")]
    UnknownFieldName(String),
}

/// A malformed line in a session script.
#[derive(Debug, Error, PartialEq)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    /// 1-based line number in the script text.
    pub line: usize,
    pub message: String,
}
