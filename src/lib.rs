//! musical-artifacts - Catalog of downloadable music production artifacts
//!
//! Drumkits, patterns, songs, presets and soundfonts are cataloged with
//! their author, license, tags, compatible software and file formats.
//!
//! # Architecture
//!
//! Searching is built from composable, immutable queries:
//! - Each facet (tags, software, license, format, hash, text) narrows a query
//! - Facets chain; a multi-facet search is the intersection of its facets
//! - The SQLite store evaluates the finished query in one statement
//!
//! The Hydrogen feed narrows the catalog to Hydrogen-compatible artifacts,
//! classifies them as drumkits, patterns or songs, and renders XML.
//!
//! # Modules
//!
//! - `domain`: Data structures (Artifact, License)
//! - `search`: Facet parsing, queries and searches
//! - `library`: Persistence, catalog files, file formats
//! - `hydrogen`: Classification and the Hydrogen feed
//! - `config`: Configuration and site settings
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Create the catalog and load some artifacts
//! musical-artifacts init
//! musical-artifacts import artifacts.json
//!
//! # Search
//! musical-artifacts search --tags "synth, preset" --license "by, public"
//!
//! # Hydrogen feed
//! musical-artifacts hydrogen --format xml
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod hydrogen;
pub mod library;
pub mod search;

// Re-export main types at crate root for convenience
pub use config::{ResolvedConfig, Settings};
pub use domain::{Artifact, License, NewArtifact, StoredFile};
pub use hydrogen::{Category, FeedError, HydrogenFeed, OutputFormat};
pub use library::{ArtifactStore, StoreError};
pub use search::{ArtifactQuery, SearchParams};
