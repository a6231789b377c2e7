//! License reference data.

use serde::{Deserialize, Serialize};

/// A license an artifact can be distributed under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct License {
    /// Unique short code (`by`, `by-sa`, `public`, ...)
    pub short_name: String,

    /// Human-readable name
    pub name: String,
}

impl License {
    pub fn new(short_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            name: name.into(),
        }
    }

    /// Licenses seeded into a fresh catalog
    pub fn defaults() -> Vec<License> {
        [
            ("by", "Creative Commons Attribution 4.0"),
            ("by-sa", "Creative Commons Attribution-ShareAlike 4.0"),
            ("by-nc", "Creative Commons Attribution-NonCommercial 4.0"),
            ("by-nc-sa", "Creative Commons Attribution-NonCommercial-ShareAlike 4.0"),
            ("cc0", "Creative Commons Zero 1.0"),
            ("public", "Public Domain"),
            ("gpl", "GNU General Public License"),
            ("copyright", "All rights reserved"),
        ]
        .into_iter()
        .map(|(short_name, name)| License::new(short_name, name))
        .collect()
    }
}

impl std::fmt::Display for License {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
