//! # vlb-vault
//!
//! File system side of VLB. The vault directory is the source of truth:
//! [`scan`] reads it into a [`vlb_core::VaultSnapshot`], and [`apply`]
//! writes accepted link suggestions back into the notes.
//!
//! [`insert`] holds the pure text transformations used by the applier.

pub mod apply;
pub mod insert;
pub mod scan;

pub use apply::{ApplyOptions, ApplyReport, FileChange, LinkApplier};
pub use insert::{Placement, RELATED_NOTES_HEADING};
pub use scan::{analyze_vault, ScanOptions};
