//! Seeding the tag store from a source name tree.

use forum_tags::{build, check_unique_names, NameTree, SeedReport, StoreError, TagStore};

/// Build the nested set for `tree` and upsert it by name.
///
/// A unique-constraint conflict during the upsert means another seeder got
/// there first; it is logged and reported as an empty report rather than
/// failing startup, since nothing was compared. A tree that repeats a name is rejected before the store is touched.
pub fn seed_tags(store: &dyn TagStore, tree: &NameTree) -> Result<SeedReport, StoreError> {
    let tags = build(tree);
    check_unique_names(&tags)?;

    match store.bulk_upsert_by_name(&tags) {
        Ok(report) => {
            tracing::info!(
                inserted = report.inserted,
                updated = report.updated,
                unchanged = report.unchanged,
                removed = report.removed,
                parked = report.parked,
                "Seeded tag taxonomy"
            );
            Ok(report)
        }
        Err(StoreError::AlreadyExists(what)) => {
            tracing::warn!("Database already seeded ({} exists), skipping", what);
            Ok(SeedReport::default())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite_store::SqliteForumStore;
    use forum_tags::{NestedTag, TagError, TagId, TagRecord};

    fn taxonomy() -> NameTree {
        NameTree::from_json(r#"{"Programming": {"Web": {}, "Systems": {"Rust": {}}}}"#).unwrap()
    }

    /// A store that always loses the seeding race.
    struct ConflictingStore;

    impl TagStore for ConflictingStore {
        fn list_all(&self) -> Result<Vec<TagRecord>, StoreError> {
            Ok(Vec::new())
        }

        fn get_many(&self, _ids: &[TagId]) -> Result<Vec<TagRecord>, StoreError> {
            Ok(Vec::new())
        }

        fn bulk_upsert_by_name(&self, tags: &[NestedTag]) -> Result<SeedReport, StoreError> {
            Err(StoreError::AlreadyExists(format!("tag {}", tags[0].name)))
        }
    }

    #[test]
    fn seeding_twice_is_a_noop() {
        let store = SqliteForumStore::open_in_memory().unwrap();
        let first = seed_tags(&store, &taxonomy()).unwrap();
        assert_eq!(first.inserted, 4);

        let before = store.list_all().unwrap();
        let second = seed_tags(&store, &taxonomy()).unwrap();
        assert!(second.is_noop());
        assert_eq!(store.list_all().unwrap(), before);
    }

    #[test]
    fn conflict_is_swallowed() {
        let report = seed_tags(&ConflictingStore, &taxonomy()).unwrap();
        assert_eq!(report, SeedReport::default());
    }

    #[test]
    fn duplicate_names_rejected_before_upsert() {
        let store = SqliteForumStore::open_in_memory().unwrap();
        let tree = NameTree::from_json(r#"{"A": {"Rust": {}}, "B": {"Rust": {}}}"#).unwrap();
        let err = seed_tags(&store, &tree).unwrap_err();
        assert!(matches!(err, StoreError::Validation(TagError::DuplicateName(ref n)) if n == "Rust"));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn empty_tree_seeds_nothing() {
        let store = SqliteForumStore::open_in_memory().unwrap();
        let report = seed_tags(&store, &NameTree::new()).unwrap();
        assert_eq!(report, SeedReport::default());
    }
}
