//! Faceted artifact searches.
//!
//! Each facet function takes a base query and a raw, comma-separated facet
//! string and returns a narrowed query. Facets compose by chaining: the
//! output of one is the base of the next, so a multi-facet search is the
//! intersection of its facets.
//!
//! Within a facet the tokens combine differently depending on the facet:
//!
//! | Facet | Tokens combine with |
//! |-------|---------------------|
//! | tags, software | AND |
//! | license, file format, hash, metadata | OR |
//!
//! Empty or absent input leaves the base untouched, and narrowing the void
//! query yields the void query.

use serde::{Deserialize, Serialize};

use crate::library::{ArtifactStore, StoreError, TagCount};

use super::facet::FacetTokens;
use super::query::{ArtifactQuery, Predicate, TagContext};

/// How many tags [`recent_tags`] returns when no limit is given
pub const RECENT_TAGS_LIMIT: usize = 20;

fn narrow(
    scope: &ArtifactQuery,
    raw: Option<&str>,
    predicate: impl FnOnce(Vec<String>) -> Predicate,
) -> ArtifactQuery {
    if scope.is_none() {
        return scope.clone();
    }

    let tokens = FacetTokens::parse(raw);
    if tokens.is_empty() {
        return scope.clone();
    }

    scope.and(predicate(tokens.into_vec()))
}

/// Artifacts tagged with every given tag
pub fn artifacts_tagged_with(scope: &ArtifactQuery, tags: Option<&str>) -> ArtifactQuery {
    narrow(scope, tags, |tags| Predicate::TaggedWithAll {
        context: TagContext::Tags,
        tags,
    })
}

/// Artifacts compatible with every given application
pub fn artifacts_app_tagged_with(scope: &ArtifactQuery, apps: Option<&str>) -> ArtifactQuery {
    narrow(scope, apps, |tags| Predicate::TaggedWithAll {
        context: TagContext::Software,
        tags,
    })
}

/// Artifacts under any of the given license short codes
pub fn artifacts_licensed_as(scope: &ArtifactQuery, licenses: Option<&str>) -> ArtifactQuery {
    narrow(scope, licenses, Predicate::LicensedAs)
}

/// Artifacts declaring any of the given file formats
pub fn artifacts_with_file_format(scope: &ArtifactQuery, formats: Option<&str>) -> ArtifactQuery {
    narrow(scope, formats, |formats| Predicate::TaggedWithAny {
        context: TagContext::FileFormats,
        tags: formats.into_iter().map(|f| f.to_lowercase()).collect(),
    })
}

/// Artifacts whose file hash is exactly one of the given values
pub fn artifacts_with_hash(scope: &ArtifactQuery, hashes: Option<&str>) -> ArtifactQuery {
    narrow(scope, hashes, Predicate::HashIn)
}

/// Artifacts whose name, description or author contains any of the terms.
///
/// Matching is a case-insensitive substring test. This is provisional: it is
/// the simplest useful behavior until ranking requirements exist.
pub fn artifacts_by_metadata(scope: &ArtifactQuery, terms: Option<&str>) -> ArtifactQuery {
    narrow(scope, terms, Predicate::MetadataContains)
}

/// A multi-facet search request.
///
/// Field names follow the request parameters of the public search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub tags: Option<String>,

    #[serde(default)]
    pub apps: Option<String>,

    #[serde(default)]
    pub license: Option<String>,

    #[serde(default)]
    pub formats: Option<String>,

    #[serde(default)]
    pub hash: Option<String>,

    /// Free text matched against name, description and author
    #[serde(default)]
    pub q: Option<String>,
}

impl SearchParams {
    /// Narrow `scope` by every facet in the request
    pub fn apply(&self, scope: &ArtifactQuery) -> ArtifactQuery {
        let query = artifacts_by_metadata(scope, self.q.as_deref());
        let query = artifacts_tagged_with(&query, self.tags.as_deref());
        let query = artifacts_app_tagged_with(&query, self.apps.as_deref());
        let query = artifacts_licensed_as(&query, self.license.as_deref());
        let query = artifacts_with_file_format(&query, self.formats.as_deref());
        artifacts_with_hash(&query, self.hash.as_deref())
    }

    /// Whether any facet carries a value
    pub fn is_empty(&self) -> bool {
        self.apply(&ArtifactQuery::all()).predicates().is_empty()
    }
}

/// Tags in use, optionally only those containing `filter`
pub fn tags(store: &ArtifactStore, filter: Option<&str>) -> Result<Vec<TagCount>, StoreError> {
    store.tag_counts(TagContext::Tags, clean_filter(filter))
}

/// Software identifiers in use, optionally only those containing `filter`
pub fn app_tags(store: &ArtifactStore, filter: Option<&str>) -> Result<Vec<TagCount>, StoreError> {
    store.tag_counts(TagContext::Software, clean_filter(filter))
}

/// The most recently applied tags, newest first
pub fn recent_tags(store: &ArtifactStore, limit: Option<usize>) -> Result<Vec<String>, StoreError> {
    store.recent_tags(TagContext::Tags, limit.unwrap_or(RECENT_TAGS_LIMIT))
}

fn clean_filter(filter: Option<&str>) -> Option<&str> {
    filter.map(str::trim).filter(|f| !f.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    type Facet = fn(&ArtifactQuery, Option<&str>) -> ArtifactQuery;

    const FACETS: [Facet; 6] = [
        artifacts_tagged_with,
        artifacts_app_tagged_with,
        artifacts_licensed_as,
        artifacts_with_file_format,
        artifacts_with_hash,
        artifacts_by_metadata,
    ];

    #[test]
    fn test_empty_input_is_identity() {
        let scope = ArtifactQuery::all().and(Predicate::LicensedAs(vec!["by".to_string()]));

        for facet in FACETS {
            assert_eq!(facet(&scope, None), scope);
            assert_eq!(facet(&scope, Some("")), scope);
            assert_eq!(facet(&scope, Some(" , ")), scope);
        }
    }

    #[test]
    fn test_void_scope_is_absorbing() {
        let none = ArtifactQuery::none();

        for facet in FACETS {
            assert_eq!(facet(&none, None), none);
            assert_eq!(facet(&none, Some("")), none);
            assert_eq!(facet(&none, Some("guitar")), none);
        }
    }

    #[test]
    fn test_tags_are_conjunctive() {
        let query = artifacts_tagged_with(&ArtifactQuery::all(), Some("synth, preset"));
        assert_eq!(
            query.predicates(),
            &[Predicate::TaggedWithAll {
                context: TagContext::Tags,
                tags: vec!["synth".to_string(), "preset".to_string()],
            }]
        );
    }

    #[test]
    fn test_formats_are_disjunctive_and_lowercased() {
        let query = artifacts_with_file_format(&ArtifactQuery::all(), Some("ZIP, rar"));
        assert_eq!(
            query.predicates(),
            &[Predicate::TaggedWithAny {
                context: TagContext::FileFormats,
                tags: vec!["zip".to_string(), "rar".to_string()],
            }]
        );
    }

    #[test]
    fn test_search_params_chain_facets() {
        let params = SearchParams {
            tags: Some("drums".to_string()),
            license: Some("by, by-sa".to_string()),
            hash: Some("".to_string()),
            ..Default::default()
        };

        let query = params.apply(&ArtifactQuery::all());
        assert_eq!(query.predicates().len(), 2);
        assert!(!params.is_empty());
        assert!(SearchParams::default().is_empty());
    }

    #[test]
    fn test_search_params_deserialize() {
        let params: SearchParams =
            serde_json::from_str(r#"{"apps": "hydrogen", "q": "kit"}"#).unwrap();
        assert_eq!(params.apps.as_deref(), Some("hydrogen"));
        assert_eq!(params.q.as_deref(), Some("kit"));
        assert_eq!(params.tags, None);
    }

    #[test]
    fn test_clean_filter() {
        assert_eq!(clean_filter(None), None);
        assert_eq!(clean_filter(Some("  ")), None);
        assert_eq!(clean_filter(Some(" syn ")), Some("syn"));
    }
}
