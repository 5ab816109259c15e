//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::documents::RawDocument;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }
}

/// A document bound for a named collection.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub collection: String,
    pub document: RawDocument,
}

/// Read side of the document store: every document of one collection.
#[async_trait]
pub trait DocumentsRepo: Send + Sync {
    /// Read all documents in `collection`, ascending by the top-level field
    /// `sort_by` when given and in insertion order otherwise.
    async fn list_documents(
        &self,
        collection: &str,
        sort_by: Option<&str>,
    ) -> Result<Vec<RawDocument>, RepoError>;

    /// Cheap round trip used by health checks.
    async fn ping(&self) -> Result<(), RepoError>;
}

#[async_trait]
pub trait DocumentsWriteRepo: Send + Sync {
    /// Insert or replace every document atomically; returns the number written.
    async fn upsert_documents(&self, documents: &[NewDocument]) -> Result<u64, RepoError>;
}
