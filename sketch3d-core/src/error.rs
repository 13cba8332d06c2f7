//! Error types surfaced by the core
use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading persistence records or scene documents.
///
/// Unknown type tags are not an error: they yield no shape and the caller
/// decides what to do about it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    #[error("field `{field}` should be {expected}")]
    FieldType {
        field: String,
        expected: &'static str,
    },

    #[error("field `{field}` must be a finite number")]
    NonFinite { field: String },

    #[error("field `{field}` holds an unrecognised color `{value}`")]
    InvalidColor { field: String, value: String },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// Failures while loading a [`ViewerConfig`](crate::config::ViewerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
}
