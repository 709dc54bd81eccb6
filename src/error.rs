use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("{class}: required field '{field}' is missing")]
    MissingField {
        class: &'static str,
        field: &'static str,
    },

    #[error("{class}.{field}: invalid value {value}: expected {constraint}")]
    Validation {
        class: &'static str,
        field: &'static str,
        value: String,
        constraint: String,
    },

    #[error("duplicate key '{key}' in {collection}")]
    DuplicateKey {
        collection: &'static str,
        key: String,
    },

    #[error("'{key}' not found in {collection}")]
    NotFound {
        collection: &'static str,
        key: String,
    },

    #[error("malformed document {path:?}: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
