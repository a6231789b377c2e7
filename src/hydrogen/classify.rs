//! Hydrogen file classification.
//!
//! Hydrogen distinguishes three kinds of shareable file by extension:
//! drumkits (`.h2drumkit`), patterns (`.h2pattern`) and songs (`.h2song`).

use serde::{Deserialize, Serialize};

use crate::domain::Artifact;
use crate::library::format::{resolve_effective_format, EffectiveFormat, ResolutionPolicy};

/// Software identifier an artifact must list to appear in the feed
pub const HYDROGEN: &str = "hydrogen";

/// Policy used to decide an artifact's format for the feed
pub const FEED_POLICY: ResolutionPolicy = ResolutionPolicy::CORROBORATED;

/// Feed category of a Hydrogen file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Drumkit,
    Pattern,
    Song,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Drumkit, Category::Pattern, Category::Song];

    /// Category for a lowercase extension
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim() {
            "h2drumkit" => Some(Category::Drumkit),
            "h2pattern" => Some(Category::Pattern),
            "h2song" => Some(Category::Song),
            _ => None,
        }
    }

    /// Element name used in the feed
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Drumkit => "drumkit",
            Category::Pattern => "pattern",
            Category::Song => "song",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An artifact's category together with the evidence for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub format: EffectiveFormat,
}

/// Classify an artifact for the feed.
///
/// Returns `None` when the artifact isn't Hydrogen-compatible, has no
/// backed format, or its format isn't one of the three Hydrogen formats.
pub fn classify(artifact: &Artifact) -> Option<Classification> {
    if !artifact.supports(HYDROGEN) {
        return None;
    }

    let format = resolve_effective_format(artifact, FEED_POLICY)?;
    let category = Category::from_extension(&format.extension)?;

    Some(Classification { category, format })
}
