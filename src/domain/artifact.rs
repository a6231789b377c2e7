//! Cataloged artifacts.
//!
//! An artifact is a downloadable file (drumkit, soundfont, preset, ...) plus
//! the metadata used to find it: tags, compatible software, declared file
//! formats, license and an optional content digest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::license::License;

/// A cataloged artifact as read back from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Store-assigned identifier
    pub id: i64,

    /// Display name (not unique)
    pub name: String,

    pub author: String,

    #[serde(default)]
    pub description: String,

    /// Locally stored file, if one was uploaded
    #[serde(default)]
    pub file: Option<StoredFile>,

    /// External download locations, in preference order
    #[serde(default)]
    pub mirrors: Vec<String>,

    /// Declared formats (lowercase extensions such as `sf2`, `h2drumkit`)
    #[serde(default)]
    pub file_format_list: Vec<String>,

    /// Free-form tags
    #[serde(default)]
    pub tag_list: Vec<String>,

    /// Compatible software identifiers (`hydrogen`, `timidity`, ...)
    #[serde(default)]
    pub software_list: Vec<String>,

    /// Content digest of the stored file
    #[serde(default)]
    pub file_hash: Option<String>,

    pub license: License,

    pub created_at: DateTime<Utc>,
}

impl Artifact {
    /// Whether the artifact lists `software` among its compatible applications
    pub fn supports(&self, software: &str) -> bool {
        self.software_list
            .iter()
            .any(|s| s.eq_ignore_ascii_case(software))
    }

    /// Whether the artifact declares `format` in its format list
    pub fn declares_format(&self, format: &str) -> bool {
        self.file_format_list
            .iter()
            .any(|f| f.trim().eq_ignore_ascii_case(format))
    }
}

/// A file kept in local storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Original file name, including the extension
    pub file_name: String,
}

impl StoredFile {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Lowercase extension of the file name, if it has one
    pub fn extension(&self) -> Option<String> {
        crate::library::format::extension_of(&self.file_name)
    }
}

/// An artifact that has not been stored yet.
///
/// The license is referenced by short code and resolved by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArtifact {
    pub name: String,

    pub author: String,

    #[serde(default)]
    pub description: String,

    /// Short code of the license (`by`, `by-sa`, `public`, ...)
    pub license: String,

    /// Name of the uploaded file
    #[serde(default)]
    pub file: Option<String>,

    #[serde(default)]
    pub mirrors: Vec<String>,

    #[serde(default)]
    pub file_format_list: Vec<String>,

    #[serde(default)]
    pub tag_list: Vec<String>,

    #[serde(default)]
    pub software_list: Vec<String>,

    #[serde(default)]
    pub file_hash: Option<String>,
}

impl NewArtifact {
    /// Create a new artifact with the required fields
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        license: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            license: license.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach a locally stored file
    pub fn with_file(mut self, file_name: impl Into<String>) -> Self {
        self.file = Some(file_name.into());
        self
    }

    /// Add a mirror URL
    pub fn with_mirror(mut self, url: impl Into<String>) -> Self {
        self.mirrors.push(url.into());
        self
    }

    /// Add multiple tags
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tag_list.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Add compatible software identifiers
    pub fn with_software(mut self, software: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.software_list
            .extend(software.into_iter().map(Into::into));
        self
    }

    /// Add declared file formats
    pub fn with_file_formats(
        mut self,
        formats: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.file_format_list
            .extend(formats.into_iter().map(Into::into));
        self
    }

    pub fn with_file_hash(mut self, hash: impl Into<String>) -> Self {
        self.file_hash = Some(hash.into());
        self
    }

    /// Declared formats as they will be stored.
    ///
    /// Entries are trimmed and lowercased. An artifact with a local file and
    /// no declarations is declared as the file's extension.
    pub fn effective_format_list(&self) -> Vec<String> {
        let mut formats: Vec<String> = Vec::new();
        for format in &self.file_format_list {
            let format = format.trim().to_lowercase();
            if !format.is_empty() && !formats.contains(&format) {
                formats.push(format);
            }
        }

        if formats.is_empty() {
            if let Some(ext) = self
                .file
                .as_deref()
                .and_then(crate::library::format::extension_of)
            {
                formats.push(ext);
            }
        }

        formats
    }
}
