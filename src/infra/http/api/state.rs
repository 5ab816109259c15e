use std::{sync::Arc, time::Duration};

use axum::http::{HeaderValue, header::CACHE_CONTROL};
use axum::response::{IntoResponse, Response};

use crate::application::content::ContentService;
use crate::application::page::PageDataService;
use crate::application::repos::DocumentsRepo;

#[derive(Clone)]
pub struct ApiState {
    pub content: Arc<ContentService>,
    pub page: Arc<PageDataService>,
    pub documents: Arc<dyn DocumentsRepo>,
    /// How long clients may reuse a successful response.
    pub revalidate: Duration,
}

impl ApiState {
    pub fn new(
        page: Arc<PageDataService>,
        documents: Arc<dyn DocumentsRepo>,
        revalidate: Duration,
    ) -> Self {
        Self {
            content: Arc::new(page.content().clone()),
            page,
            documents,
            revalidate,
        }
    }

    pub fn cache_control(&self) -> HeaderValue {
        let value = format!("public, max-age={}", self.revalidate.as_secs());
        HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
    }

    pub fn cacheable(&self, body: impl IntoResponse) -> Response {
        let mut response = body.into_response();
        response
            .headers_mut()
            .insert(CACHE_CONTROL, self.cache_control());
        response
    }
}
