//! Error types for VLB.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level result type for VLB operations.
pub type Result<T> = std::result::Result<T, VlbError>;

/// Top-level error type for VLB.
#[derive(Debug, Error)]
pub enum VlbError {
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("vault error: {0}")]
    Vault(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors raised when a vault snapshot breaks its own invariants.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("concept '{concept}' references unknown document '{path}'")]
    DanglingConcept { concept: String, path: String },

    #[error("tag '{tag}' references unknown document '{path}'")]
    DanglingTag { tag: String, path: String },

    #[error("link graph has an entry for unknown document '{0}'")]
    DanglingLinkSource(String),
}

impl From<serde_json::Error> for VlbError {
    fn from(err: serde_json::Error) -> Self {
        VlbError::Serialization(err.to_string())
    }
}
