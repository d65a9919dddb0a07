//! Async facade over the stores for request handlers.

use std::sync::Arc;

use forum_tags::{
    reduce, ContentId, ContentStore, FacetQuery, SearchSubmission, StoreError, TagId, TagRecord,
    TagStore,
};

/// Runs taxonomy lookups and facet queries off the async executor.
///
/// Each query is issued against a snapshot taken before the call, so later
/// selector edits cannot leak into an in-flight request.
pub struct TaxonomyService<S> {
    store: Arc<S>,
}

impl<S> Clone for TaxonomyService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> TaxonomyService<S>
where
    S: TagStore + ContentStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Every tag in `lft` order, for populating a selector.
    pub async fn tags(&self) -> Result<Vec<TagRecord>, StoreError> {
        let store = Arc::clone(&self.store);
        run_blocking(move || store.list_all()).await
    }

    /// Run one facet query as a single awaited unit.
    pub async fn find_content(&self, snapshot: FacetQuery) -> Result<Vec<ContentId>, StoreError> {
        let store = Arc::clone(&self.store);
        run_blocking(move || store.find_by_tag_facets(&snapshot)).await
    }

    /// Resolve a submitted search to content ids.
    ///
    /// Ids the store does not know are dropped with a warning; the rest are
    /// reduced before becoming facets.
    pub async fn resolve_submission(
        &self,
        submission: SearchSubmission,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<ContentId>, StoreError> {
        let store = Arc::clone(&self.store);
        run_blocking(move || {
            let tags = store.get_many(&submission.tag_ids)?;
            let missing = unknown_ids(&submission.tag_ids, &tags);
            if !missing.is_empty() {
                tracing::warn!("Ignoring unknown tag ids: {}", missing.join(", "));
            }

            let reduced = reduce(&tags)?;
            let query = FacetQuery::from_tags(&reduced)
                .with_limit(limit)
                .with_offset(offset);
            store.find_by_tag_facets(&query)
        })
        .await
    }
}

/// Requested ids with no matching tag, each reported once.
fn unknown_ids(requested: &[TagId], found: &[TagRecord]) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for id in requested {
        let text = id.to_string();
        if !found.iter().any(|t| t.id == *id) && !missing.contains(&text) {
            missing.push(text);
        }
    }
    missing
}

async fn run_blocking<T, F>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Storage(format!("blocking task: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_tags;
    use crate::sqlite_store::SqliteForumStore;
    use chrono::Utc;
    use forum_tags::{NameTree, TagSelector};

    fn service() -> TaxonomyService<SqliteForumStore> {
        let store = SqliteForumStore::open_in_memory().unwrap();
        let tree =
            NameTree::from_json(r#"{"Programming": {"Web": {}, "Systems": {"Rust": {}}}}"#)
                .unwrap();
        seed_tags(&store, &tree).unwrap();
        TaxonomyService::new(Arc::new(store))
    }

    fn id_of(tags: &[TagRecord], name: &str) -> TagId {
        tags.iter().find(|t| t.name == name).unwrap().id
    }

    #[tokio::test]
    async fn selector_snapshot_drives_query() {
        let service = service();
        let tags = service.tags().await.unwrap();
        let post = ContentId::new_v4();
        service.store().insert_content(post, Utc::now()).unwrap();
        service.store().tag_content(post, id_of(&tags, "Rust")).unwrap();

        let mut selector = TagSelector::new(tags.clone()).unwrap();
        selector.select(id_of(&tags, "Systems"));
        let snapshot = selector.snapshot();

        // Edits after submission do not affect the in-flight query.
        selector.reset();
        selector.select(id_of(&tags, "Web"));

        assert_eq!(service.find_content(snapshot).await.unwrap(), vec![post]);
        assert!(service.find_content(selector.snapshot()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn submission_is_reduced_and_unknown_ids_dropped() {
        let service = service();
        let tags = service.tags().await.unwrap();
        let web_post = ContentId::new_v4();
        service.store().insert_content(web_post, Utc::now()).unwrap();
        service.store().tag_content(web_post, id_of(&tags, "Web")).unwrap();

        let submission = SearchSubmission {
            query: String::new(),
            tag_ids: vec![
                id_of(&tags, "Rust"),
                id_of(&tags, "Programming"),
                TagId::new_v4(),
            ],
        };
        let found = service
            .resolve_submission(submission, Some(20), None)
            .await
            .unwrap();
        assert_eq!(found, vec![web_post]);
    }

    #[test]
    fn repeated_known_ids_are_not_reported_missing() {
        let tags = vec![TagRecord {
            id: TagId::new_v4(),
            name: "Rust".into(),
            depth: 0,
            lft: 0,
            rgt: 1,
        }];
        let rust = tags[0].id;
        assert!(unknown_ids(&[rust, rust], &tags).is_empty());

        let ghost = TagId::new_v4();
        assert_eq!(unknown_ids(&[ghost, rust, ghost], &tags), vec![ghost.to_string()]);
    }
}
