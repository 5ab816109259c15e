use async_trait::async_trait;
use serde_json::Value;
use sqlx::{query, query_as, types::Json};

use crate::{
    application::repos::{DocumentsRepo, DocumentsWriteRepo, NewDocument, RepoError},
    domain::documents::RawDocument,
};

use super::{PostgresRepositories, map_sqlx_error};

const LIST_DOCUMENTS_SQL: &str = "SELECT id, body FROM documents \
    WHERE collection = $1 \
    ORDER BY created_at, id";

const LIST_DOCUMENTS_SORTED_SQL: &str = "SELECT id, body FROM documents \
    WHERE collection = $1 \
    ORDER BY body ->> $2, created_at, id";

const UPSERT_DOCUMENT_SQL: &str = "INSERT INTO documents (collection, id, body) \
    VALUES ($1, $2, $3) \
    ON CONFLICT (collection, id) DO UPDATE \
    SET body = EXCLUDED.body, updated_at = now()";

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    body: Json<Value>,
}

impl DocumentRow {
    fn into_document(self, collection: &str) -> Result<RawDocument, RepoError> {
        let DocumentRow { id, body } = self;
        let Value::Object(fields) = body.0 else {
            return Err(RepoError::integrity(format!(
                "document `{id}` in `{collection}` is not an object"
            )));
        };

        RawDocument::new(id, fields).map_err(|err| {
            RepoError::integrity(format!("malformed document in `{collection}`: {err}"))
        })
    }
}

#[async_trait]
impl DocumentsRepo for PostgresRepositories {
    async fn list_documents(
        &self,
        collection: &str,
        sort_by: Option<&str>,
    ) -> Result<Vec<RawDocument>, RepoError> {
        let rows = match sort_by {
            Some(field) => {
                query_as::<_, DocumentRow>(LIST_DOCUMENTS_SORTED_SQL)
                    .bind(collection)
                    .bind(field)
                    .fetch_all(self.pool())
                    .await
            }
            None => {
                query_as::<_, DocumentRow>(LIST_DOCUMENTS_SQL)
                    .bind(collection)
                    .fetch_all(self.pool())
                    .await
            }
        }
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| row.into_document(collection))
            .collect()
    }

    async fn ping(&self) -> Result<(), RepoError> {
        self.health_check().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl DocumentsWriteRepo for PostgresRepositories {
    async fn upsert_documents(&self, documents: &[NewDocument]) -> Result<u64, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;
        let mut written = 0;

        for new in documents {
            let result = query(UPSERT_DOCUMENT_SQL)
                .bind(new.collection.as_str())
                .bind(new.document.id())
                .bind(Json(new.document.fields()))
                .execute(tx.as_mut())
                .await
                .map_err(map_sqlx_error)?;
            written += result.rows_affected();
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(written)
    }
}
