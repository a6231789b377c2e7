//! Artifact persistence and file handling.
//!
//! # Storage Layout
//!
//! ```text
//! ~/.musical-artifacts/
//! └── catalog.sqlite3     # Licenses, artifacts, mirrors, taggings
//! ```
//!
//! - `store`: SQLite store that evaluates search queries
//! - `catalog`: JSON catalog files for import/export
//! - `content`: Digests of local files
//! - `format`: Effective file format resolution

pub mod catalog;
pub mod content;
pub mod format;
pub mod store;

pub use catalog::{Catalog, ImportSummary};
pub use content::{digest, LocalFile};
pub use format::{resolve_effective_format, EffectiveFormat, FormatSource, ResolutionPolicy};
pub use store::{ArtifactStore, StoreError, TagCount};
