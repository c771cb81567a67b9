use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::guard::InputRejection;
use crate::llm::LlmError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Rate limit exceeded. Please wait before making another request.")]
    RateLimited,

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputRejection),

    #[error("Invalid JSON request")]
    MalformedPayload,

    #[error("Query parameter '{0}' is required")]
    MissingParameter(&'static str),

    #[error("No {0} found")]
    NotFound(&'static str),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Chatbot error: {0}")]
    Llm(#[from] LlmError),

    #[error("Chatbot worker unavailable")]
    WorkerUnavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::InvalidInput(_)
            | AppError::MalformedPayload
            | AppError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Store(_) | AppError::WorkerUnavailable | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// Building the prompt context is local work, not an upstream failure
impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(format!("failed to build context: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
