//! Composable artifact queries.
//!
//! An [`ArtifactQuery`] is a base scope (every artifact, or none) plus a
//! list of predicates that all have to hold. Queries are values: narrowing
//! one returns a new query and leaves the original untouched. The store
//! evaluates a query once, as a single SQL statement.

use serde::{Deserialize, Serialize};

/// Which tag list a tagging belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagContext {
    /// Free-form tags (`tag_list`)
    Tags,

    /// Compatible software (`software_list`)
    Software,

    /// Declared file formats (`file_format_list`)
    FileFormats,
}

impl TagContext {
    /// Value stored in the `taggings.context` column
    pub fn as_str(&self) -> &'static str {
        match self {
            TagContext::Tags => "tags",
            TagContext::Software => "software",
            TagContext::FileFormats => "file_formats",
        }
    }
}

impl std::fmt::Display for TagContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single restriction on the artifact collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Tagged with every one of the tags in the context
    TaggedWithAll {
        context: TagContext,
        tags: Vec<String>,
    },

    /// Tagged with at least one of the tags in the context
    TaggedWithAny {
        context: TagContext,
        tags: Vec<String>,
    },

    /// License short code is one of the codes
    LicensedAs(Vec<String>),

    /// File hash equals one of the values
    HashIn(Vec<String>),

    /// Name, description or author contains one of the terms
    MetadataContains(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    All,
    Void,
}

/// An immutable, composable query over the artifact collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactQuery {
    scope: Scope,
    predicates: Vec<Predicate>,
}

impl Default for ArtifactQuery {
    fn default() -> Self {
        Self::all()
    }
}

impl ArtifactQuery {
    /// Every artifact
    pub fn all() -> Self {
        Self {
            scope: Scope::All,
            predicates: Vec::new(),
        }
    }

    /// The empty result; narrowing it always yields itself
    pub fn none() -> Self {
        Self {
            scope: Scope::Void,
            predicates: Vec::new(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.scope == Scope::Void
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// A new query that additionally requires `predicate`
    pub fn and(&self, predicate: Predicate) -> Self {
        if self.is_none() {
            return self.clone();
        }

        let mut narrowed = self.clone();
        narrowed.predicates.push(predicate);
        narrowed
    }

    /// Render the `WHERE` clause and its positional parameters.
    ///
    /// The artifacts table is expected to be aliased `a`. Returns `None` for
    /// the void query, which never reaches the database.
    pub fn to_sql(&self) -> Option<SqlFilter> {
        if self.is_none() {
            return None;
        }

        let mut filter = SqlFilter::default();
        for predicate in &self.predicates {
            predicate.push_sql(&mut filter);
        }
        Some(filter)
    }
}

impl Predicate {
    fn push_sql(&self, filter: &mut SqlFilter) {
        match self {
            Predicate::TaggedWithAll { context, tags } => {
                for tag in tags {
                    filter.clauses.push(
                        "a.id IN (SELECT artifact_id FROM taggings WHERE context = ? AND tag = ?)"
                            .to_string(),
                    );
                    filter.params.push(context.as_str().to_string());
                    filter.params.push(tag.clone());
                }
            }
            Predicate::TaggedWithAny { context, tags } => {
                filter.clauses.push(format!(
                    "a.id IN (SELECT artifact_id FROM taggings WHERE context = ? AND tag IN ({}))",
                    placeholders(tags.len())
                ));
                filter.params.push(context.as_str().to_string());
                filter.params.extend(tags.iter().cloned());
            }
            Predicate::LicensedAs(codes) => {
                filter
                    .clauses
                    .push(format!("l.short_name IN ({})", placeholders(codes.len())));
                filter.params.extend(codes.iter().cloned());
            }
            Predicate::HashIn(hashes) => {
                filter
                    .clauses
                    .push(format!("a.file_hash IN ({})", placeholders(hashes.len())));
                filter.params.extend(hashes.iter().cloned());
            }
            Predicate::MetadataContains(terms) => {
                let alternatives: Vec<&str> = terms
                    .iter()
                    .map(|_| {
                        "(instr(lower(a.name), lower(?)) > 0 \
                         OR instr(lower(a.description), lower(?)) > 0 \
                         OR instr(lower(a.author), lower(?)) > 0)"
                    })
                    .collect();
                filter.clauses.push(format!("({})", alternatives.join(" OR ")));
                for term in terms {
                    filter.params.extend([term.clone(), term.clone(), term.clone()]);
                }
            }
        }
    }
}

/// A rendered `WHERE` clause
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlFilter {
    /// Conditions joined with `AND`
    pub clauses: Vec<String>,

    /// Positional parameters, in clause order
    pub params: Vec<String>,
}

impl SqlFilter {
    /// `WHERE ...`, or an empty string when nothing restricts the query
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_has_no_where_clause() {
        let filter = ArtifactQuery::all().to_sql().unwrap();
        assert_eq!(filter.where_clause(), "");
        assert!(filter.params.is_empty());
    }

    #[test]
    fn test_none_absorbs_predicates() {
        let query = ArtifactQuery::none().and(Predicate::LicensedAs(vec!["by".to_string()]));
        assert!(query.is_none());
        assert!(query.predicates().is_empty());
        assert_eq!(query.to_sql(), None);
    }

    #[test]
    fn test_and_does_not_mutate_base() {
        let base = ArtifactQuery::all();
        let narrowed = base.and(Predicate::HashIn(vec!["abc".to_string()]));

        assert!(base.predicates().is_empty());
        assert_eq!(narrowed.predicates().len(), 1);
    }

    #[test]
    fn test_tagged_with_all_emits_one_clause_per_tag() {
        let query = ArtifactQuery::all().and(Predicate::TaggedWithAll {
            context: TagContext::Tags,
            tags: vec!["synth".to_string(), "preset".to_string()],
        });
        let filter = query.to_sql().unwrap();

        assert_eq!(filter.clauses.len(), 2);
        assert_eq!(filter.params, vec!["tags", "synth", "tags", "preset"]);
    }

    #[test]
    fn test_tagged_with_any_emits_in_list() {
        let query = ArtifactQuery::all().and(Predicate::TaggedWithAny {
            context: TagContext::FileFormats,
            tags: vec!["zip".to_string(), "rar".to_string()],
        });
        let filter = query.to_sql().unwrap();

        assert_eq!(filter.clauses.len(), 1);
        assert!(filter.clauses[0].contains("tag IN (?, ?)"));
        assert_eq!(filter.params, vec!["file_formats", "zip", "rar"]);
    }

    #[test]
    fn test_metadata_binds_each_term_three_times() {
        let query = ArtifactQuery::all().and(Predicate::MetadataContains(vec![
            "drum".to_string(),
            "ziggy".to_string(),
        ]));
        let filter = query.to_sql().unwrap();

        assert_eq!(filter.clauses.len(), 1);
        assert_eq!(filter.params.len(), 6);
        assert_eq!(filter.clauses[0].matches('?').count(), 6);
    }

    #[test]
    fn test_where_clause_joins_with_and() {
        let query = ArtifactQuery::all()
            .and(Predicate::LicensedAs(vec!["by".to_string()]))
            .and(Predicate::HashIn(vec!["01011001".to_string()]));
        let filter = query.to_sql().unwrap();

        assert_eq!(
            filter.where_clause(),
            "WHERE l.short_name IN (?) AND a.file_hash IN (?)"
        );
    }
}
