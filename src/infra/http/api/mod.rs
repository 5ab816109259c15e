pub mod error;
pub mod handlers;
pub mod state;

pub use state::ApiState;

use axum::{Router, routing::get};

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/bio", get(handlers::bio))
        .route("/api/journey", get(handlers::journey))
        .route("/api/techstack", get(handlers::tech_stack))
        .route("/api/achievements", get(handlers::achievements))
        .route("/api/projects", get(handlers::projects))
        .route("/api/page", get(handlers::page))
        .with_state(state)
}
