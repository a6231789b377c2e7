//! Catalog files for bulk import and export.
//!
//! A catalog file is a JSON document holding licenses and artifacts. Import
//! loads it into an [`ArtifactStore`]; export writes the whole store back
//! out in the same shape.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::domain::{Artifact, License, NewArtifact};
use crate::search::ArtifactQuery;

use super::store::{ArtifactStore, StoreError};

/// Catalog file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalog format version
    pub version: u32,

    #[serde(default)]
    pub licenses: Vec<License>,

    #[serde(default)]
    pub artifacts: Vec<NewArtifact>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub licenses_added: usize,
    pub artifacts_added: usize,

    /// Artifacts skipped because their license is unknown
    pub skipped: Vec<String>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            version: 1,
            licenses: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// Load a catalog file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path.as_ref()).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the catalog file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Snapshot every license and artifact in the store
    pub fn export(store: &ArtifactStore) -> Result<Self, StoreError> {
        Ok(Self {
            version: 1,
            licenses: store.licenses()?,
            artifacts: store
                .fetch(&ArtifactQuery::all())?
                .iter()
                .map(NewArtifact::from)
                .collect(),
        })
    }

    /// Load licenses, then artifacts, into the store.
    ///
    /// Artifacts referencing an unknown license are skipped; any other
    /// failure aborts the import.
    pub fn import_into(&self, store: &mut ArtifactStore) -> Result<ImportSummary, StoreError> {
        let mut summary = ImportSummary::default();

        for license in &self.licenses {
            if store.add_license(license)? {
                summary.licenses_added += 1;
            }
        }

        for artifact in &self.artifacts {
            match store.insert(artifact) {
                Ok(_) => summary.artifacts_added += 1,
                Err(StoreError::UnknownLicense(code)) => {
                    warn!("Skipping '{}': unknown license '{}'", artifact.name, code);
                    summary.skipped.push(artifact.name.clone());
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Imported {} licenses and {} artifacts ({} skipped)",
            summary.licenses_added,
            summary.artifacts_added,
            summary.skipped.len()
        );

        Ok(summary)
    }
}

impl From<&Artifact> for NewArtifact {
    fn from(artifact: &Artifact) -> Self {
        Self {
            name: artifact.name.clone(),
            author: artifact.author.clone(),
            description: artifact.description.clone(),
            license: artifact.license.short_name.clone(),
            file: artifact.file.as_ref().map(|f| f.file_name.clone()),
            mirrors: artifact.mirrors.clone(),
            file_format_list: artifact.file_format_list.clone(),
            tag_list: artifact.tag_list.clone(),
            software_list: artifact.software_list.clone(),
            file_hash: artifact.file_hash.clone(),
        }
    }
}
