//! Domain types for the artifact catalog.
//!
//! This module contains the core data structures:
//! - Artifact: A cataloged, downloadable file and its metadata
//! - License: Reference data artifacts point at

pub mod artifact;
pub mod license;

// Re-export commonly used types
pub use artifact::{Artifact, NewArtifact, StoredFile};
pub use license::License;
