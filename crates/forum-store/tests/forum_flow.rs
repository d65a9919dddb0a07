//! End-to-end flow: seed the sample taxonomy, pick tags interactively, filter posts.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use forum_store::{seed_tags, SqliteForumStore, TaxonomyService};
use forum_tags::{
    ContentId, FocusList, NameTree, NavItem, NavKey, SelectorAction, TagRecord, TagSelector,
    TagStore, TagTree,
};

const SAMPLE: &str = include_str!("../../../data/tags.json");

fn seeded_service() -> TaxonomyService<SqliteForumStore> {
    let store = SqliteForumStore::open_in_memory().unwrap();
    seed_tags(&store, &NameTree::from_json(SAMPLE).unwrap()).unwrap();
    TaxonomyService::new(Arc::new(store))
}

fn post(service: &TaxonomyService<SqliteForumStore>, tags: &[TagRecord], minutes: i64) -> ContentId {
    let id = ContentId::new_v4();
    let created = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes);
    service.store().insert_content(id, created).unwrap();
    for tag in tags {
        service.store().tag_content(id, tag.id).unwrap();
    }
    id
}

#[test]
fn sample_taxonomy_round_trips() {
    let store = SqliteForumStore::open_in_memory().unwrap();
    let source = NameTree::from_json(SAMPLE).unwrap();
    let report = seed_tags(&store, &source).unwrap();
    assert_eq!(report.inserted, source.node_count());

    let tree = TagTree::from_records(store.list_all().unwrap()).unwrap();
    assert_eq!(tree.to_name_tree(), source);
    assert!(seed_tags(&store, &source).unwrap().is_noop());
}

#[tokio::test]
async fn keyboard_selection_filters_posts() {
    let service = seeded_service();
    let tags = service.tags().await.unwrap();
    let hierarchy = TagTree::from_records(tags.clone()).unwrap();
    let rust = hierarchy.by_name("Rust").unwrap().clone();
    let frontend = hierarchy.by_name("Frontend").unwrap().clone();
    let meetups = hierarchy.by_name("Meetups").unwrap().clone();

    let rust_meetup = post(&service, &[rust.clone(), meetups.clone()], 0);
    let frontend_post = post(&service, &[frontend], 1);
    let _meetup_only = post(&service, &[meetups], 2);

    let mut selector = TagSelector::new(tags).unwrap();

    // Type "sys", arrow down to "Systems" and press Enter.
    selector.set_query("sys");
    let options: Vec<NavItem<SelectorAction>> = selector
        .visible()
        .into_iter()
        .map(|v| NavItem {
            action: v.select,
            enabled: !v.disabled,
        })
        .collect();
    let mut focus = FocusList::new(options);
    assert_eq!(focus.items().len(), 2); // Programming > Systems
    focus.handle_key(NavKey::Down);
    let action = *focus.handle_key(NavKey::Enter).unwrap();
    selector.apply(action);

    let selected: Vec<&str> = selector.selected().iter().map(|s| s.tag.name.as_str()).collect();
    assert_eq!(selected, vec!["Systems"]);

    // Rust is now covered by Systems and no longer offered.
    selector.set_query("rust");
    assert!(selector.candidates().is_empty());

    // Programming or any descendant matches everything but the meetup-only post.
    let mut broad = TagSelector::new(service.tags().await.unwrap()).unwrap();
    broad.select(hierarchy.by_name("Programming").unwrap().id);
    assert_eq!(
        service.find_content(broad.snapshot()).await.unwrap(),
        vec![frontend_post, rust_meetup]
    );

    // Systems AND Events narrows to the one post tagged in both subtrees.
    selector.select(hierarchy.by_name("Events").unwrap().id);
    assert_eq!(
        service.find_content(selector.snapshot()).await.unwrap(),
        vec![rust_meetup]
    );

    // The same selection travels through a query string.
    let submission = selector.submission();
    let parsed = forum_tags::SearchSubmission::from_query_string(&submission.to_query_string()).unwrap();
    assert_eq!(
        service.resolve_submission(parsed, None, None).await.unwrap(),
        vec![rust_meetup]
    );
}
