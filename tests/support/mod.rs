//! In-memory fakes shared by the integration tests.
#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Barrier;

use folio::application::content::{ContentService, Producers};
use folio::application::page::PageDataService;
use folio::application::repos::{DocumentsRepo, RepoError};
use folio::cache::{CacheAside, CacheConfig, CacheStore, CacheStoreError, MemoryStore};
use folio::domain::documents::RawDocument;

pub const PRODUCER_TIMEOUT: Duration = Duration::from_secs(5);

/// Document store backed by JSON fixtures, with per-collection failure and
/// call counting.
#[derive(Default)]
pub struct FakeDocuments {
    collections: HashMap<String, Vec<Value>>,
    failing: HashSet<String>,
    stalled: HashSet<String>,
    ping_fails: bool,
    barrier: Option<Arc<Barrier>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, collection: &str, documents: Vec<Value>) -> Self {
        self.collections.insert(collection.to_string(), documents);
        self
    }

    /// Reads of `collection` fail with a persistence error.
    pub fn failing(mut self, collection: &str) -> Self {
        self.failing.insert(collection.to_string());
        self
    }

    /// Reads of `collection` never complete.
    pub fn stalled(mut self, collection: &str) -> Self {
        self.stalled.insert(collection.to_string());
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.ping_fails = true;
        self
    }

    /// Every read waits on `barrier` before answering.
    pub fn gated(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub fn calls(&self, collection: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .get(collection)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().expect("calls lock").values().sum()
    }
}

#[async_trait]
impl DocumentsRepo for FakeDocuments {
    async fn list_documents(
        &self,
        collection: &str,
        sort_by: Option<&str>,
    ) -> Result<Vec<RawDocument>, RepoError> {
        *self
            .calls
            .lock()
            .expect("calls lock")
            .entry(collection.to_string())
            .or_default() += 1;

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if self.stalled.contains(collection) {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(collection) {
            return Err(RepoError::from_persistence(format!(
                "connection refused while reading {collection}"
            )));
        }

        let mut documents = self
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default();
        if let Some(field) = sort_by {
            documents.sort_by(|a, b| {
                let left = a.get(field).and_then(Value::as_str).unwrap_or_default();
                let right = b.get(field).and_then(Value::as_str).unwrap_or_default();
                left.cmp(right)
            });
        }

        documents
            .into_iter()
            .map(|value| {
                RawDocument::from_value(value).map_err(|err| RepoError::integrity(err.to_string()))
            })
            .collect()
    }

    async fn ping(&self) -> Result<(), RepoError> {
        if self.ping_fails {
            Err(RepoError::from_persistence("connection refused"))
        } else {
            Ok(())
        }
    }
}

/// Cache store whose reads and writes can be switched to fail or to hang.
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    hang: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(&CacheConfig::default()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            hang: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Every call accepts the request and never answers.
    pub fn hang(&self, hang: bool) {
        self.hang.store(hang, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

#[async_trait]
impl CacheStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheStoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheStoreError::Unavailable("connection refused".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheStoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheStoreError::Unavailable("connection refused".into()));
        }
        self.inner.set(key, value, ttl).await
    }
}

/// One document per category, plus a second project to exercise sorting.
pub fn portfolio() -> FakeDocuments {
    FakeDocuments::new()
        .with(
            "bio",
            vec![json!({
                "_id": "b1",
                "icon": "👋",
                "title": "Hello",
                "content": "..."
            })],
        )
        .with(
            "journey",
            vec![json!({
                "_id": "j1",
                "date": "2021",
                "title": "Engineer",
                "subtitle": "Acme",
                "description": "Built things",
                "icon": "briefcase",
                "tech": ["rust", "postgres"]
            })],
        )
        .with(
            "techstack",
            vec![
                json!({
                    "_id": "fe",
                    "title": "Frontend",
                    "icon": "layout",
                    "color": "blue",
                    "techs": [{"name": "TypeScript", "level": 80, "icon": "ts"}]
                }),
                json!({
                    "_id": "be",
                    "title": "Backend",
                    "icon": "server",
                    "color": "green",
                    "techs": [{"name": "Rust", "level": 90, "icon": "rust"}]
                }),
            ],
        )
        .with(
            "achievements",
            vec![json!({
                "_id": "a1",
                "title": "Awards",
                "icon": "trophy",
                "color": "gold",
                "items": [{
                    "title": "Hackathon",
                    "subtitle": "First place",
                    "description": "Won",
                    "year": "2022",
                    "highlight": true
                }]
            })],
        )
        .with(
            "projects",
            vec![
                json!({
                    "_id": "p2",
                    "title": "Zephyr",
                    "description": "Weather",
                    "technologies": [{"name": "Rust", "icon": "rust"}],
                    "githubLink": "https://example.com/zephyr",
                    "codeSnippet": "fn main() {}",
                    "mockupImage": "zephyr.png"
                }),
                json!({
                    "_id": "p1",
                    "title": "Atlas",
                    "description": "Maps",
                    "technologies": [],
                    "liveLink": "https://atlas.example.com",
                    "codeSnippet": "",
                    "mockupImage": "atlas.png"
                }),
            ],
        )
}

pub fn content_service(documents: Arc<dyn DocumentsRepo>, cache: CacheAside) -> ContentService {
    content_service_with_timeout(documents, cache, PRODUCER_TIMEOUT)
}

pub fn content_service_with_timeout(
    documents: Arc<dyn DocumentsRepo>,
    cache: CacheAside,
    timeout: Duration,
) -> ContentService {
    ContentService::new(Producers::new(documents), cache, "folio", timeout)
        .expect("non-empty key prefix")
}

pub fn page_service(documents: Arc<dyn DocumentsRepo>, cache: CacheAside) -> PageDataService {
    PageDataService::new(content_service(documents, cache))
}

pub fn memory_cache() -> (Arc<MemoryStore>, CacheAside) {
    let config = CacheConfig::default();
    let store = Arc::new(MemoryStore::new(&config));
    let cache = CacheAside::new(store.clone(), config.default_ttl);
    (store, cache)
}
