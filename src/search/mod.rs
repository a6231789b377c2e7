//! Faceted search over the artifact catalog.
//!
//! - `facet`: Parsing of comma-separated facet input
//! - `query`: Immutable, composable query values
//! - `searches`: One narrowing function per facet, plus tag listings

pub mod facet;
pub mod query;
pub mod searches;

pub use facet::FacetTokens;
pub use query::{ArtifactQuery, Predicate, SqlFilter, TagContext};
pub use searches::{
    app_tags, artifacts_app_tagged_with, artifacts_by_metadata, artifacts_licensed_as,
    artifacts_tagged_with, artifacts_with_file_format, artifacts_with_hash, recent_tags, tags,
    SearchParams, RECENT_TAGS_LIMIT,
};
