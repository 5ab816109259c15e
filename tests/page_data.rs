use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, json};
use tokio::sync::Barrier;

use folio::application::content::{Category, ContentError};
use folio::application::page::{PageData, PageDataService};
use folio::cache::CacheAside;
use folio::domain::entities::BioSection;
use folio::infra::cache_warmer::CacheWarmer;

mod support;

use support::{
    FakeDocuments, FlakyStore, content_service_with_timeout, memory_cache, page_service, portfolio,
};

#[tokio::test]
async fn assembles_every_category() {
    let documents = Arc::new(portfolio());
    let page = page_service(documents, CacheAside::disabled());

    let data = page.try_page_data().await.expect("page data");

    assert_eq!(
        data.bio_sections,
        vec![BioSection {
            id: "b1".to_string(),
            icon: "👋".to_string(),
            title: "Hello".to_string(),
            content: "...".to_string(),
            extra: Map::new(),
        }]
    );
    assert_eq!(data.journey_data.len(), 1);
    assert_eq!(data.journey_data[0].tech, vec!["rust", "postgres"]);
    assert_eq!(data.achievements[0].items[0].year, "2022");
    assert!(data.achievements[0].items[0].highlight);
}

#[tokio::test]
async fn projects_are_sorted_by_title() {
    let page = page_service(Arc::new(portfolio()), CacheAside::disabled());

    let data = page.page_data().await;
    let titles: Vec<_> = data.projects.iter().map(|p| p.title.as_str()).collect();

    assert_eq!(titles, ["Atlas", "Zephyr"]);
    assert_eq!(
        data.projects[0].live_link.as_deref(),
        Some("https://atlas.example.com")
    );
    assert_eq!(data.projects[0].github_link, None);
}

#[tokio::test]
async fn tech_stack_is_keyed_by_id() {
    let page = page_service(Arc::new(portfolio()), CacheAside::disabled());

    let data = page.page_data().await;

    let mut keys: Vec<_> = data.tech_stack.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, ["be", "fe"]);
    assert_eq!(data.tech_stack["fe"].title, "Frontend");
    assert_eq!(data.tech_stack["be"].techs[0].name, "Rust");
    assert_eq!(data.tech_stack["be"].id, "be");
}

#[tokio::test]
async fn one_failing_category_discards_the_whole_snapshot() {
    let documents = Arc::new(portfolio().failing("achievements"));
    let page = page_service(documents.clone(), CacheAside::disabled());

    let snapshot = page.snapshot().await;

    assert!(snapshot.degraded);
    assert_eq!(snapshot.data, PageData::default());
    assert!(snapshot.data.is_empty());
}

#[tokio::test]
async fn try_page_data_reports_the_failing_collection() {
    let documents = Arc::new(portfolio().failing("projects"));
    let page = page_service(documents, CacheAside::disabled());

    let err = page.try_page_data().await.expect_err("projects fail");

    assert!(matches!(err, ContentError::Repo { collection: "projects", .. }));
}

#[tokio::test]
async fn total_backend_failure_yields_default_shape() {
    let mut documents = FakeDocuments::new();
    for category in Category::ALL {
        documents = documents.failing(category.collection());
    }
    let page = page_service(Arc::new(documents), CacheAside::disabled());

    let value = serde_json::to_value(page.page_data().await).expect("serializes");

    assert_eq!(
        value,
        json!({
            "bioSections": [],
            "journeyData": [],
            "techStack": {},
            "achievements": [],
            "projects": []
        })
    );
}

#[tokio::test]
async fn malformed_document_fails_the_aggregation() {
    let documents = Arc::new(portfolio().with("bio", vec![json!({"_id": "b1", "title": 7})]));
    let page = page_service(documents, CacheAside::disabled());

    let err = page.try_page_data().await.expect_err("mapping fails");
    assert!(matches!(err, ContentError::Mapping { collection: "bio", .. }));
    assert!(page.page_data().await.is_empty());
}

#[tokio::test]
async fn editorial_variations_still_render_the_page() {
    let documents = Arc::new(portfolio().with(
        "achievements",
        vec![json!({
            "_id": "a1",
            "title": "Awards",
            "icon": "trophy",
            "color": "gold",
            "featured": true,
            "items": [{
                "title": "Hackathon",
                "subtitle": "First place",
                "description": "Won",
                "year": 2022
            }]
        })],
    ));
    let (store, cache) = memory_cache();
    let page = page_service(documents, cache);

    let first = page.page_data().await;
    assert!(!first.is_empty());
    assert_eq!(store.len(), 5);
    assert_eq!(first.achievements[0].items[0].year, json!(2022));
    assert_eq!(first.achievements[0].extra.get("featured"), Some(&json!(true)));

    let cached = page.page_data().await;
    assert_eq!(cached, first);
}

#[tokio::test]
async fn stalled_producer_times_out_into_default() {
    let documents = Arc::new(portfolio().stalled("journey"));
    let content = content_service_with_timeout(
        documents,
        CacheAside::disabled(),
        Duration::from_millis(250),
    );
    let page = PageDataService::new(content);

    let err = page.try_page_data().await.expect_err("journey stalls");
    assert!(matches!(
        err,
        ContentError::Timeout {
            collection: "journey",
            timeout_ms: 250
        }
    ));

    let snapshot = page.snapshot().await;
    assert!(snapshot.degraded);
    assert!(snapshot.data.is_empty());
}

#[tokio::test]
async fn silent_cache_does_not_stall_the_page() {
    let store = Arc::new(FlakyStore::new());
    store.hang(true);
    let cache = CacheAside::new(store.clone(), Duration::from_secs(60))
        .with_operation_timeout(Duration::from_millis(50));
    let page = page_service(Arc::new(portfolio()), cache);

    let snapshot = tokio::time::timeout(Duration::from_secs(5), page.snapshot())
        .await
        .expect("page answers without the cache");

    assert!(!snapshot.degraded);
    assert_eq!(snapshot.data.projects.len(), 2);
    assert_eq!(store.reads(), Category::ALL.len());
}

#[tokio::test]
async fn categories_are_fetched_concurrently() {
    // Each read waits until all five are in flight; sequential fetching would hang.
    let barrier = Arc::new(Barrier::new(Category::ALL.len()));
    let documents = Arc::new(portfolio().gated(barrier));
    let page = page_service(documents.clone(), CacheAside::disabled());

    let data = tokio::time::timeout(Duration::from_secs(5), page.try_page_data())
        .await
        .expect("five reads overlap")
        .expect("page data");

    assert!(!data.is_empty());
    for category in Category::ALL {
        assert_eq!(documents.calls(category.collection()), 1);
    }
}

#[tokio::test]
async fn repeat_aggregation_is_served_from_cache() {
    let documents = Arc::new(portfolio());
    let (store, cache) = memory_cache();
    let page = page_service(documents.clone(), cache);

    let first = page.page_data().await;
    let second = page.page_data().await;

    assert_eq!(first, second);
    assert_eq!(documents.total_calls(), Category::ALL.len());
    assert_eq!(store.len(), Category::ALL.len());
    assert!(store.lookup("folio:bio").is_some());
    assert!(store.lookup("folio:techstack").is_some());
}

#[tokio::test]
async fn failed_category_is_never_cached() {
    let documents = Arc::new(portfolio().failing("bio"));
    let (store, cache) = memory_cache();
    let page = page_service(documents.clone(), cache);

    assert!(page.page_data().await.is_empty());
    assert!(store.lookup("folio:bio").is_none());

    page.page_data().await;
    assert_eq!(documents.calls("bio"), 2);
}

#[tokio::test]
async fn warmer_fills_every_cache_key() {
    let documents = Arc::new(portfolio());
    let (store, cache) = memory_cache();
    let page = Arc::new(page_service(documents.clone(), cache));

    let summary = CacheWarmer::new(page.clone()).warm().await.expect("warm");

    assert_eq!(summary.bio_sections, 1);
    assert_eq!(summary.tech_categories, 2);
    assert_eq!(summary.projects, 2);
    for category in Category::ALL {
        let key = page.content().cache_key(category);
        assert!(store.lookup(key.as_str()).is_some(), "{category} not warmed");
    }

    page.page_data().await;
    assert_eq!(documents.total_calls(), Category::ALL.len());
}

#[tokio::test]
async fn warmer_surfaces_failures() {
    let documents = Arc::new(portfolio().failing("techstack"));
    let (_, cache) = memory_cache();
    let page = Arc::new(page_service(documents, cache));

    let result = CacheWarmer::new(page).warm().await;
    assert!(result.is_err());
}
