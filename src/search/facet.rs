//! Facet input parsing.
//!
//! Every facet accepts a single comma-separated string (`"synth, preset"`).
//! Parsing yields the trimmed, non-empty tokens in first-seen order.

use serde::{Deserialize, Serialize};

/// Normalized tokens of one facet input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetTokens(Vec<String>);

impl FacetTokens {
    /// Parse a raw facet string. Absent input yields no tokens.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut tokens: Vec<String> = Vec::new();

        for token in raw.unwrap_or_default().split(',') {
            let token = token.trim();
            if !token.is_empty() && !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
            }
        }

        Self(tokens)
    }

    /// No tokens: the facet does not filter
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for FacetTokens {
    fn from(raw: &str) -> Self {
        Self::parse(Some(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_splits() {
        let tokens = FacetTokens::parse(Some(" synth,  preset ,tone"));
        assert_eq!(tokens.into_vec(), vec!["synth", "preset", "tone"]);
    }

    #[test]
    fn test_parse_empty_and_absent() {
        assert!(FacetTokens::parse(None).is_empty());
        assert!(FacetTokens::parse(Some("")).is_empty());
        assert!(FacetTokens::parse(Some("   ")).is_empty());
        assert!(FacetTokens::parse(Some(" , ,, ")).is_empty());
    }

    #[test]
    fn test_parse_drops_duplicates() {
        let tokens = FacetTokens::from("drums, samples, drums");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.iter().collect::<Vec<_>>(), vec!["drums", "samples"]);
    }
}
