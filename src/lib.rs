use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod client_ip;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod llm;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod store;
pub mod worker;

use handlers::*;
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/authors", get(authors_handler))
        .route("/api/authors/count", get(authors_count_handler))
        .route("/api/projects", get(projects_handler))
        .route("/api/projects/count", get(projects_count_handler))
        .route("/api/education", get(education_handler))
        .route("/api/education/count", get(education_count_handler))
        .route("/api/resumes", get(resumes_handler))
        .route("/api/resumes/count", get(resumes_count_handler))
        .route("/api/search", get(search_handler))
        .route("/api/chatbot", post(chatbot_handler))
        .layer(cors)
        .with_state(state)
}
