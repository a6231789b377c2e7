//! The Hydrogen drumkit feed.
//!
//! Hydrogen's sound library browser downloads a single XML document listing
//! every drumkit, pattern and song available from a server. The feed lists
//! each Hydrogen-compatible artifact with a backed Hydrogen file format,
//! grouped by category, sorted by name, one entry per name.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Settings;
use crate::domain::Artifact;
use crate::library::{ArtifactStore, FormatSource, StoreError};
use crate::search::{artifacts_app_tagged_with, ArtifactQuery};

use super::classify::{classify, Category, Classification, HYDROGEN};

/// Errors that can occur while producing the feed
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Unsupported format: '{0}'")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Output formats the feed can be rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xml,
}

impl OutputFormat {
    /// Match a requested format against the supported ones.
    ///
    /// Surrounding whitespace is ignored (clients send `xml%20`); anything
    /// other than `xml` is rejected.
    pub fn negotiate(requested: &str) -> Result<Self, FeedError> {
        match requested.trim() {
            "xml" => Ok(OutputFormat::Xml),
            _ => Err(FeedError::UnsupportedFormat(requested.to_string())),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Xml => "application/xml",
        }
    }
}

/// One entry in the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: i64,
    pub name: String,
    pub author: String,
    /// Display name of the license
    pub license: String,
    pub info: String,
    /// Where Hydrogen downloads the file from
    pub url: String,
}

impl FeedItem {
    fn new(artifact: &Artifact, classification: &Classification, settings: &Settings) -> Self {
        let url = match (&classification.format.source, &classification.format.mirror) {
            (FormatSource::DeclaredMirror | FormatSource::Mirror, Some(mirror)) => mirror.clone(),
            _ => format!("{}/artifacts/{}/download", settings.base_url(), artifact.id),
        };

        Self {
            id: artifact.id,
            name: artifact.name.clone(),
            author: artifact.author.clone(),
            license: artifact.license.name.clone(),
            info: artifact.description.clone(),
            url,
        }
    }
}

/// Feed entries grouped by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydrogenFeed {
    pub drumkits: Vec<FeedItem>,
    pub patterns: Vec<FeedItem>,
    pub songs: Vec<FeedItem>,
}

impl HydrogenFeed {
    /// Entries of one category
    pub fn get(&self, category: Category) -> &[FeedItem] {
        match category {
            Category::Drumkit => &self.drumkits,
            Category::Pattern => &self.patterns,
            Category::Song => &self.songs,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Vec<FeedItem> {
        match category {
            Category::Drumkit => &mut self.drumkits,
            Category::Pattern => &mut self.patterns,
            Category::Song => &mut self.songs,
        }
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.drumkits.len() + self.patterns.len() + self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the feed in `format`
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Xml => super::xml::render(self),
        }
    }
}

/// Build the feed from candidate artifacts.
///
/// Artifacts that don't classify are left out. Within a category entries
/// are sorted by name; of several artifacts sharing a name only the first
/// in input order is kept.
pub fn assemble(artifacts: &[Artifact], settings: &Settings) -> HydrogenFeed {
    let mut feed = HydrogenFeed::default();

    for artifact in artifacts {
        match classify(artifact) {
            Some(classification) => {
                let item = FeedItem::new(artifact, &classification, settings);
                feed.get_mut(classification.category).push(item);
            }
            None => debug!("Excluding '{}' ({}) from feed", artifact.name, artifact.id),
        }
    }

    for category in Category::ALL {
        let items = feed.get_mut(category);
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items.dedup_by(|later, earlier| later.name == earlier.name);
    }

    feed
}

/// Produce the feed for a request.
///
/// The requested format is negotiated first, so an unsupported format fails
/// before the store is touched.
pub fn hydrogen_feed(
    store: &ArtifactStore,
    settings: &Settings,
    requested_format: &str,
) -> Result<(OutputFormat, HydrogenFeed), FeedError> {
    let format = OutputFormat::negotiate(requested_format)?;

    let candidates = artifacts_app_tagged_with(&ArtifactQuery::all(), Some(HYDROGEN));
    let artifacts = store.fetch(&candidates)?;
    let feed = assemble(&artifacts, settings);

    info!(
        "Hydrogen feed: {} drumkits, {} patterns, {} songs ({} candidates)",
        feed.drumkits.len(),
        feed.patterns.len(),
        feed.songs.len(),
        artifacts.len()
    );

    Ok((format, feed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{License, StoredFile};
    use chrono::Utc;

    fn artifact(id: i64, name: &str) -> Artifact {
        Artifact {
            id,
            name: name.to_string(),
            author: format!("Author {}", id),
            description: String::new(),
            file: None,
            mirrors: Vec::new(),
            file_format_list: Vec::new(),
            tag_list: Vec::new(),
            software_list: vec![HYDROGEN.to_string()],
            file_hash: None,
            license: License::new("by", "Attribution"),
            created_at: Utc::now(),
        }
    }

    fn with_file(mut a: Artifact, file_name: &str) -> Artifact {
        a.file = Some(StoredFile::new(file_name));
        a
    }

    #[test]
    fn test_negotiate() {
        assert_eq!(OutputFormat::negotiate("xml").unwrap(), OutputFormat::Xml);
        assert_eq!(OutputFormat::negotiate("xml ").unwrap(), OutputFormat::Xml);
        assert_eq!(OutputFormat::negotiate("xml  ").unwrap(), OutputFormat::Xml);

        for rejected in ["json", "html", "", "  ", "xmlx", "x ml"] {
            let result = OutputFormat::negotiate(rejected);
            assert!(
                matches!(result, Err(FeedError::UnsupportedFormat(ref f)) if f == rejected),
                "{:?} should be rejected",
                rejected
            );
        }
    }

    #[test]
    fn test_assemble_partitions_and_sorts() {
        let artifacts = vec![
            with_file(artifact(1, "Zeta kit"), "z.h2drumkit"),
            with_file(artifact(2, "Alpha kit"), "a.h2drumkit"),
            with_file(artifact(3, "Groove"), "g.h2pattern"),
            with_file(artifact(4, "Tune"), "t.h2song"),
            with_file(artifact(5, "Archive"), "a.zip"),
        ];

        let feed = assemble(&artifacts, &Settings::default());

        let names: Vec<_> = feed.drumkits.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha kit", "Zeta kit"]);
        assert_eq!(feed.patterns.len(), 1);
        assert_eq!(feed.songs.len(), 1);
        assert_eq!(feed.len(), 4);
    }

    #[test]
    fn test_assemble_dedups_by_name() {
        let artifacts = vec![
            with_file(artifact(1, "Same"), "one.h2drumkit"),
            with_file(artifact(2, "Same"), "two.h2drumkit"),
            with_file(artifact(3, "Same"), "three.h2song"),
        ];

        let feed = assemble(&artifacts, &Settings::default());

        assert_eq!(feed.drumkits.len(), 1);
        assert_eq!(feed.drumkits[0].id, 1);
        // Dedup is per category
        assert_eq!(feed.songs.len(), 1);
    }

    #[test]
    fn test_item_urls() {
        let mut mirrored = artifact(7, "Mirrored");
        mirrored.mirrors = vec!["https://hydrogen-mirrors.com/mykit.h2drumkit".to_string()];
        mirrored.file_format_list = vec!["h2drumkit".to_string()];
        let local = with_file(artifact(8, "Local"), "local.h2drumkit");

        let settings = Settings {
            hostname: "musical-artifacts.com".to_string(),
            ..Default::default()
        };
        let feed = assemble(&[mirrored, local], &settings);

        assert_eq!(feed.drumkits[0].name, "Local");
        assert_eq!(
            feed.drumkits[0].url,
            "https://musical-artifacts.com/artifacts/8/download"
        );
        assert_eq!(
            feed.drumkits[1].url,
            "https://hydrogen-mirrors.com/mykit.h2drumkit"
        );
    }

    #[test]
    fn test_item_carries_license_name() {
        let feed = assemble(
            &[with_file(artifact(1, "Kit"), "kit.h2drumkit")],
            &Settings::default(),
        );
        assert_eq!(feed.drumkits[0].license, "Attribution");
        assert_eq!(feed.drumkits[0].author, "Author 1");
    }
}
