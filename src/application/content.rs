//! Per-category producers and their cached front.
//!
//! [`Producers`] read one collection each and map the documents into
//! entities; they know nothing about caching. [`ContentService`] wraps every
//! producer in the cache-aside accessor under its own key, with a deadline on
//! the producer call.

use std::{collections::HashMap, fmt, future::Future, sync::Arc, time::Duration};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::time::timeout;

use crate::application::repos::{DocumentsRepo, RepoError};
use crate::cache::{CacheAside, CacheKey, EmptyKeyError};
use crate::domain::documents::{Document, map_document};
use crate::domain::entities::{Achievement, BioSection, JourneyEntry, Project, TechCategory};
use crate::domain::error::DomainError;

/// The five content collections behind the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Bio,
    Journey,
    TechStack,
    Achievements,
    Projects,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Bio,
        Category::Journey,
        Category::TechStack,
        Category::Achievements,
        Category::Projects,
    ];

    /// Collection the category is stored in; also its cache key name.
    pub fn collection(self) -> &'static str {
        match self {
            Category::Bio => "bio",
            Category::Journey => "journey",
            Category::TechStack => "techstack",
            Category::Achievements => "achievements",
            Category::Projects => "projects",
        }
    }

    pub fn sort_field(self) -> Option<&'static str> {
        match self {
            Category::Projects => Some("title"),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read collection `{collection}`: {source}")]
    Repo {
        collection: &'static str,
        #[source]
        source: RepoError,
    },
    #[error("document `{id}` in `{collection}` could not be mapped: {source}")]
    Mapping {
        collection: &'static str,
        id: String,
        #[source]
        source: DomainError,
    },
    #[error("reading `{collection}` exceeded {timeout_ms} ms")]
    Timeout {
        collection: &'static str,
        timeout_ms: u64,
    },
}

impl ContentError {
    pub fn collection(&self) -> &'static str {
        match self {
            ContentError::Repo { collection, .. }
            | ContentError::Mapping { collection, .. }
            | ContentError::Timeout { collection, .. } => collection,
        }
    }
}

/// Stateless fetch-and-map operations, one per category.
#[derive(Clone)]
pub struct Producers {
    documents: Arc<dyn DocumentsRepo>,
}

impl Producers {
    pub fn new(documents: Arc<dyn DocumentsRepo>) -> Self {
        Self { documents }
    }

    pub async fn bio_sections(&self) -> Result<Vec<BioSection>, ContentError> {
        self.load(Category::Bio).await
    }

    pub async fn journey(&self) -> Result<Vec<JourneyEntry>, ContentError> {
        self.load(Category::Journey).await
    }

    pub async fn tech_categories(&self) -> Result<Vec<TechCategory>, ContentError> {
        self.load(Category::TechStack).await
    }

    pub async fn achievements(&self) -> Result<Vec<Achievement>, ContentError> {
        self.load(Category::Achievements).await
    }

    pub async fn projects(&self) -> Result<Vec<Project>, ContentError> {
        self.load(Category::Projects).await
    }

    async fn load<T: Document>(&self, category: Category) -> Result<Vec<T>, ContentError> {
        let collection = category.collection();
        let documents = self
            .documents
            .list_documents(collection, category.sort_field())
            .await
            .map_err(|source| ContentError::Repo { collection, source })?;

        documents
            .into_iter()
            .map(|document| {
                let id = document.id().to_string();
                map_document(document).map_err(|source| ContentError::Mapping {
                    collection,
                    id,
                    source,
                })
            })
            .collect()
    }
}

/// Cached access to every category.
#[derive(Clone)]
pub struct ContentService {
    producers: Producers,
    cache: CacheAside,
    keys: Arc<HashMap<Category, CacheKey>>,
    producer_timeout: Duration,
}

impl ContentService {
    pub fn new(
        producers: Producers,
        cache: CacheAside,
        key_prefix: &str,
        producer_timeout: Duration,
    ) -> Result<Self, EmptyKeyError> {
        let keys = Category::ALL
            .into_iter()
            .map(|category| {
                CacheKey::namespaced(key_prefix, category.collection()).map(|key| (category, key))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self {
            producers,
            cache,
            keys: Arc::new(keys),
            producer_timeout,
        })
    }

    /// Whether reads go through a cache store at all.
    pub fn is_cached(&self) -> bool {
        self.cache.is_enabled()
    }

    pub fn cache_key(&self, category: Category) -> &CacheKey {
        &self.keys[&category]
    }

    pub async fn bio_sections(&self) -> Result<Vec<BioSection>, ContentError> {
        self.cached(Category::Bio, || self.producers.bio_sections())
            .await
    }

    pub async fn journey(&self) -> Result<Vec<JourneyEntry>, ContentError> {
        self.cached(Category::Journey, || self.producers.journey())
            .await
    }

    pub async fn tech_categories(&self) -> Result<Vec<TechCategory>, ContentError> {
        self.cached(Category::TechStack, || self.producers.tech_categories())
            .await
    }

    /// Tech categories keyed by id for direct lookup.
    pub async fn tech_stack(&self) -> Result<HashMap<String, TechCategory>, ContentError> {
        self.tech_categories().await.map(index_by_id)
    }

    pub async fn achievements(&self) -> Result<Vec<Achievement>, ContentError> {
        self.cached(Category::Achievements, || self.producers.achievements())
            .await
    }

    pub async fn projects(&self) -> Result<Vec<Project>, ContentError> {
        self.cached(Category::Projects, || self.producers.projects())
            .await
    }

    async fn cached<T, F, Fut>(&self, category: Category, producer: F) -> Result<T, ContentError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ContentError>>,
    {
        let deadline = self.producer_timeout;
        let bounded = move || async move {
            match timeout(deadline, producer()).await {
                Ok(result) => result,
                Err(_) => Err(ContentError::Timeout {
                    collection: category.collection(),
                    timeout_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                }),
            }
        };

        self.cache
            .get_with_default_ttl(self.cache_key(category), bounded)
            .await
    }
}

/// Re-key tech categories by their id.
pub fn index_by_id(categories: Vec<TechCategory>) -> HashMap<String, TechCategory> {
    categories
        .into_iter()
        .map(|category| (category.id.clone(), category))
        .collect()
}
