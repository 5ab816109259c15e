//! Content import from a TOML archive.
//!
//! The archive holds one array of tables per collection, each table being a
//! stored document with its `_id`:
//!
//! ```toml
//! [[bio]]
//! _id = "b1"
//! icon = "👋"
//! title = "Hello"
//! content = "..."
//! ```

use std::{collections::HashSet, path::Path};

use serde::Deserialize;
use thiserror::Error;
use tokio::fs;

use crate::application::content::Category;
use crate::application::repos::{DocumentsWriteRepo, NewDocument, RepoError};
use crate::domain::documents::RawDocument;
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read archive: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid archive: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("document #{index} in `{collection}` is invalid: {source}")]
    Document {
        collection: &'static str,
        index: usize,
        #[source]
        source: DomainError,
    },
    #[error("duplicate id `{id}` in `{collection}`")]
    DuplicateId { collection: &'static str, id: String },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ContentArchive {
    bio: Vec<toml::Table>,
    journey: Vec<toml::Table>,
    techstack: Vec<toml::Table>,
    achievements: Vec<toml::Table>,
    projects: Vec<toml::Table>,
}

impl ContentArchive {
    fn collection(&self, category: Category) -> &[toml::Table] {
        match category {
            Category::Bio => &self.bio,
            Category::Journey => &self.journey,
            Category::TechStack => &self.techstack,
            Category::Achievements => &self.achievements,
            Category::Projects => &self.projects,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub documents: u64,
}

/// Parse an archive into documents, checking identities per collection.
pub fn parse_archive(text: &str) -> Result<Vec<NewDocument>, ImportError> {
    let archive: ContentArchive = toml::from_str(text)?;
    let mut documents = Vec::new();

    for category in Category::ALL {
        let collection = category.collection();
        let mut seen = HashSet::new();

        for (index, table) in archive.collection(category).iter().enumerate() {
            let value = serde_json::to_value(table).map_err(|err| ImportError::Document {
                collection,
                index,
                source: DomainError::shape(collection, err.to_string()),
            })?;
            let document =
                RawDocument::from_value(value).map_err(|source| ImportError::Document {
                    collection,
                    index,
                    source,
                })?;

            if !seen.insert(document.id().to_string()) {
                return Err(ImportError::DuplicateId {
                    collection,
                    id: document.id().to_string(),
                });
            }

            documents.push(NewDocument {
                collection: collection.to_string(),
                document,
            });
        }
    }

    Ok(documents)
}

/// Import the archive at `path`, upserting every document in one transaction.
pub async fn import_content(
    repo: &dyn DocumentsWriteRepo,
    path: &Path,
) -> Result<ImportSummary, ImportError> {
    let text = fs::read_to_string(path).await?;
    let documents = parse_archive(&text)?;
    let written = repo.upsert_documents(&documents).await?;
    Ok(ImportSummary { documents: written })
}
