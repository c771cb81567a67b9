use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use crate::error::AppError;
use crate::models::SearchResults;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, AppError> {
    let query = params
        .q
        .filter(|q| !q.is_empty())
        .ok_or(AppError::MissingParameter("q"))?;

    let results = state.store.search_all(&query).await?;

    info!(route = "/api/search", status = "SUCCESS", hits = results.total(), "Search served");
    Ok(Json(results))
}
