//! Effective file format resolution.
//!
//! An artifact can carry format evidence in three places: the name of its
//! locally stored file, the URLs of its mirrors, and its declared format
//! list. A [`ResolutionPolicy`] is the ordered list of sources consulted;
//! the first source that yields an extension wins.

use serde::{Deserialize, Serialize};

use crate::domain::Artifact;

/// Where a piece of format evidence came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatSource {
    /// Extension of the locally stored file
    LocalFile,

    /// Extension of the first mirror URL that has one
    Mirror,

    /// Extension of the first mirror URL that is also a declared format
    DeclaredMirror,

    /// First entry of the declared format list
    Declared,
}

/// Ordered list of sources to consult
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionPolicy(&'static [FormatSource]);

impl ResolutionPolicy {
    /// Any evidence counts, a bare declaration included
    pub const CATALOG: ResolutionPolicy = ResolutionPolicy(&[
        FormatSource::LocalFile,
        FormatSource::Mirror,
        FormatSource::Declared,
    ]);

    /// Requires a file to back the format: either a stored file, or a
    /// mirror whose extension matches a declared format.
    pub const CORROBORATED: ResolutionPolicy =
        ResolutionPolicy(&[FormatSource::LocalFile, FormatSource::DeclaredMirror]);

    pub fn sources(&self) -> &'static [FormatSource] {
        self.0
    }
}

/// The format an artifact resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveFormat {
    /// Lowercase extension without the leading dot
    pub extension: String,

    pub source: FormatSource,

    /// Mirror URL that supplied the extension, for mirror sources
    pub mirror: Option<String>,
}

/// Resolve the effective format of an artifact under `policy`.
///
/// Returns `None` when no source in the policy yields an extension.
pub fn resolve_effective_format(
    artifact: &Artifact,
    policy: ResolutionPolicy,
) -> Option<EffectiveFormat> {
    policy
        .sources()
        .iter()
        .find_map(|source| resolve_from(artifact, *source))
}

fn resolve_from(artifact: &Artifact, source: FormatSource) -> Option<EffectiveFormat> {
    match source {
        FormatSource::LocalFile => artifact
            .file
            .as_ref()
            .and_then(|file| file.extension())
            .map(|extension| EffectiveFormat {
                extension,
                source,
                mirror: None,
            }),
        FormatSource::Mirror => artifact.mirrors.iter().find_map(|url| {
            extension_of_url(url).map(|extension| EffectiveFormat {
                extension,
                source,
                mirror: Some(url.trim().to_string()),
            })
        }),
        FormatSource::DeclaredMirror => artifact.mirrors.iter().find_map(|url| {
            extension_of_url(url)
                .filter(|ext| artifact.declares_format(ext))
                .map(|extension| EffectiveFormat {
                    extension,
                    source,
                    mirror: Some(url.trim().to_string()),
                })
        }),
        FormatSource::Declared => artifact
            .file_format_list
            .iter()
            .map(|f| f.trim().to_lowercase())
            .find(|f| !f.is_empty())
            .map(|extension| EffectiveFormat {
                extension,
                source,
                mirror: None,
            }),
    }
}

/// Lowercase extension of a file name or path.
///
/// Only the last path segment is considered. Hidden files without a further
/// dot (`.hydrogen`) have no extension.
pub fn extension_of(path: &str) -> Option<String> {
    let name = path.trim().rsplit(['/', '\\']).next()?;
    let (stem, ext) = name.rsplit_once('.')?;
    let ext = ext.trim();

    if stem.is_empty() || ext.is_empty() {
        return None;
    }

    Some(ext.to_lowercase())
}

/// Lowercase extension of the path component of a URL.
///
/// Query strings and fragments are ignored. A URL without a path
/// (`https://example.com`) has no extension.
pub fn extension_of_url(url: &str) -> Option<String> {
    let url = url.trim();
    let url = url.split(['?', '#']).next().unwrap_or(url);

    let path = match url.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, path)| path)?,
        None => url,
    };

    extension_of(path)
}
