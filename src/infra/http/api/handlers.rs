use std::collections::HashMap;

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, header::CACHE_CONTROL},
    response::{IntoResponse, Response},
};

use crate::domain::entities::{Achievement, BioSection, JourneyEntry, Project, TechCategory};

use super::{ApiState, error::ApiError};

type ApiResult<T> = Result<T, ApiError>;

pub async fn bio(State(state): State<ApiState>) -> ApiResult<Response> {
    let sections: Vec<BioSection> = state.content.bio_sections().await?;
    Ok(state.cacheable(Json(sections)))
}

pub async fn journey(State(state): State<ApiState>) -> ApiResult<Response> {
    let entries: Vec<JourneyEntry> = state.content.journey().await?;
    Ok(state.cacheable(Json(entries)))
}

pub async fn tech_stack(State(state): State<ApiState>) -> ApiResult<Response> {
    let stack: HashMap<String, TechCategory> = state.content.tech_stack().await?;
    Ok(state.cacheable(Json(stack)))
}

pub async fn achievements(State(state): State<ApiState>) -> ApiResult<Response> {
    let achievements: Vec<Achievement> = state.content.achievements().await?;
    Ok(state.cacheable(Json(achievements)))
}

pub async fn projects(State(state): State<ApiState>) -> ApiResult<Response> {
    let projects: Vec<Project> = state.content.projects().await?;
    Ok(state.cacheable(Json(projects)))
}

/// Always 200. A degraded snapshot is served empty and must not be reused.
pub async fn page(State(state): State<ApiState>) -> Response {
    let snapshot = state.page.snapshot().await;
    if snapshot.degraded {
        let mut response = Json(snapshot.data).into_response();
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        return response;
    }
    state.cacheable(Json(snapshot.data))
}
