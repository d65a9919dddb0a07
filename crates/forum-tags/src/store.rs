use serde::{Deserialize, Serialize};

use crate::error::TagError;
use crate::facet::FacetQuery;
use crate::record::{ContentId, NestedTag, TagId, TagRecord};

/// Counts from one bulk upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Tags absent from the batch and unused by content, deleted
    pub removed: usize,
    /// Tags absent from the batch but still attached to content, moved out of the tree
    pub parked: usize,
}

impl SeedReport {
    /// Whether the upsert left the store exactly as it found it.
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.removed == 0 && self.parked == 0
    }
}

/// Persistent home of the tag records.
pub trait TagStore: Send + Sync {
    /// Every tag, ordered by `lft` ascending.
    fn list_all(&self) -> Result<Vec<TagRecord>, StoreError>;

    /// Look up tags by id. Unknown ids are skipped; result is in `lft` order.
    fn get_many(&self, ids: &[TagId]) -> Result<Vec<TagRecord>, StoreError>;

    /// Replace the stored layout with `tags`, keyed by name, in one transaction.
    ///
    /// Existing rows keep their id and name; `lft`, `rgt` and `depth` are overwritten.
    /// Rows missing from the batch are removed, or parked as disjoint roots when
    /// content still references them, so the stored set stays properly nested.
    fn bulk_upsert_by_name(&self, tags: &[NestedTag]) -> Result<SeedReport, StoreError>;
}

/// Content rows and their tag relations.
pub trait ContentStore: Send + Sync {
    /// Content whose tags satisfy every facet, newest first, excluding quarantined rows.
    fn find_by_tag_facets(&self, query: &FacetQuery) -> Result<Vec<ContentId>, StoreError>;
}

/// Errors from the tag and content stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(#[from] TagError),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_report_noop() {
        assert!(SeedReport {
            unchanged: 4,
            ..SeedReport::default()
        }
        .is_noop());
        assert!(!SeedReport {
            updated: 1,
            unchanged: 3,
            ..SeedReport::default()
        }
        .is_noop());
        assert!(!SeedReport {
            parked: 1,
            ..SeedReport::default()
        }
        .is_noop());
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::NotFound("tag Rust".into());
        assert!(err.to_string().contains("Not found"));

        let err = StoreError::from(TagError::DuplicateName("Rust".into()));
        assert!(err.to_string().contains("Rust"));
    }
}
