//! Range-filter query over content tags.
//!
//! A content item matches when, for every facet, at least one of its tags lies
//! inside the facet's interval: AND across facets, OR across each facet's subtree.

use serde::{Deserialize, Serialize};

use crate::record::{TagRecord, TagSpan};

/// Default number of content items per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A facet filter plus paging, captured at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetQuery {
    pub facets: Vec<TagSpan>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Default for FacetQuery {
    fn default() -> Self {
        Self {
            facets: Vec::new(),
            limit: Some(DEFAULT_PAGE_SIZE),
            offset: None,
        }
    }
}

impl FacetQuery {
    /// One facet per tag. Callers pass an already reduced selection.
    pub fn from_tags<'a, I>(tags: I) -> Self
    where
        I: IntoIterator<Item = &'a TagRecord>,
    {
        Self {
            facets: tags.into_iter().map(TagRecord::span).collect(),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: Option<u32>) -> Self {
        self.offset = offset;
        self
    }

    /// Whether a content item with the given tag intervals passes every facet.
    ///
    /// An empty facet list matches everything.
    pub fn matches(&self, content_tags: &[TagSpan]) -> bool {
        self.facets
            .iter()
            .all(|facet| content_tags.iter().any(|tag| facet.contains(tag)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TagId;

    fn span(lft: i64, rgt: i64) -> TagSpan {
        TagSpan::new(lft, rgt).unwrap()
    }


    #[test]
    fn descendant_tag_matches_ancestor_facet() {
        let systems = FacetQuery {
            facets: vec![span(3, 6)],
            ..FacetQuery::default()
        };
        assert!(systems.matches(&[span(4, 5)]));

        let web = FacetQuery {
            facets: vec![span(1, 2)],
            ..FacetQuery::default()
        };
        assert!(!web.matches(&[span(4, 5)]));
    }

    #[test]
    fn facets_combine_with_and() {
        let query = FacetQuery {
            facets: vec![span(0, 7), span(8, 11)],
            ..FacetQuery::default()
        };
        assert!(query.matches(&[span(4, 5), span(9, 10)]));
        assert!(!query.matches(&[span(4, 5)]));
        assert!(!query.matches(&[]));
    }

    #[test]
    fn no_facets_matches_everything() {
        assert!(FacetQuery::default().matches(&[]));
        assert!(FacetQuery::default().matches(&[span(9, 10)]));
    }

    #[test]
    fn from_tags_uses_intervals_and_default_page() {
        let systems = TagRecord {
            id: TagId::new_v4(),
            name: "Systems".into(),
            depth: 1,
            lft: 3,
            rgt: 6,
        };
        let query = FacetQuery::from_tags([&systems]).with_offset(Some(40));
        assert_eq!(query.facets, vec![span(3, 6)]);
        assert_eq!(query.limit, Some(DEFAULT_PAGE_SIZE));
        assert_eq!(query.offset, Some(40));
    }
}
