//! Local file content.
//!
//! Uploaded files are identified by the SHA-256 digest of their bytes, which
//! is what `artifacts_with_hash` searches match against.

use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::fs;

/// Lowercase hex SHA-256 digest of `bytes`
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// A local file about to be attached to an artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// File name as it will be stored (no directories)
    pub file_name: String,

    /// Digest of the file's bytes
    pub file_hash: String,

    pub size_bytes: u64,
}

impl LocalFile {
    /// Read a file from disk and compute its digest
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Not a file path: {}", path.display()))?
            .to_string();

        let bytes = fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Ok(Self {
            file_name,
            file_hash: digest(&bytes),
            size_bytes: bytes.len() as u64,
        })
    }
}
