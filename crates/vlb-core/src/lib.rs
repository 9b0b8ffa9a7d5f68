//! # vlb-core
//!
//! Core types for the VLB link builder.
//!
//! This crate defines the data passed between the pipeline stages:
//! - [`NoteRecord`] - per-file metadata produced by the analyzer
//! - [`VaultSnapshot`] - the analyzer's output, with concept/tag/link indices
//! - [`Suggestion`], [`Reason`], [`Confidence`] - the suggester's output
//! - [`StrategyName`] / [`StrategyProfile`] - suggestion thresholds
//! - [`LinkFormat`] - how the applier renders links
//! - Error hierarchy ([`VlbError`], [`SnapshotError`])
//! - Front-matter parsing ([`frontmatter`])

pub mod document;
pub mod error;
pub mod frontmatter;
pub mod link;
pub mod snapshot;
pub mod suggestion;

pub use document::{Heading, NoteRecord};
pub use error::{Result, SnapshotError, VlbError};
pub use link::LinkFormat;
pub use snapshot::{VaultSnapshot, VaultStats};
pub use suggestion::{
    Confidence, Reason, ReasonKind, StrategyKind, StrategyName, StrategyProfile, Suggestion,
    SuggestionMap,
};
