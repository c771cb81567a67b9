use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use crate::client_ip::ClientId;
use crate::error::AppError;
use crate::guard;
use crate::metrics::{CHAT_LATENCY, CHAT_REQUESTS, INVALID_INPUT, RATE_LIMITED};
use crate::models::{ChatJob, ChatRequest, ChatResponse};
use crate::state::AppState;

const ROUTE: &str = "/api/chatbot";

pub const UNAVAILABLE: &str =
    "Sorry, the chatbot is currently unavailable. Please ensure OPENAI_API_KEY is configured.";

// Governor first, then decoding, then the guard. Rejected attempts still
// spend quota.
pub async fn chatbot_handler(
    State(state): State<Arc<AppState>>,
    ClientId(client): ClientId,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    CHAT_REQUESTS.inc();
    let model = state.model();

    if !state.governor.is_allowed(&client) {
        RATE_LIMITED.inc();
        warn!(route = ROUTE, status = "RATE_LIMITED", %client, model, "Rate limit exceeded");
        return Err(AppError::RateLimited);
    }

    let Json(request) = payload.map_err(|e| {
        warn!(route = ROUTE, status = "BAD_REQUEST", %client, model, error = %e, "Could not decode chatbot request");
        AppError::MalformedPayload
    })?;

    if let Err(reason) = guard::validate(&request.query) {
        INVALID_INPUT.inc();
        warn!(route = ROUTE, status = "INVALID_INPUT", %client, model, %reason, "Invalid chatbot input");
        return Err(reason.into());
    }

    info!(route = ROUTE, %client, query = %request.query, "Chatbot request received");

    let Some(chatbot) = &state.chatbot else {
        warn!(route = ROUTE, status = "LLM_DISABLED", %client, "Chatbot disabled, no provider configured");
        return Ok(Json(ChatResponse {
            response: UNAVAILABLE.to_string(),
            query: request.query,
        }));
    };

    let start_time = Instant::now();

    let (response_tx, response_rx) = oneshot::channel();

    let job = ChatJob {
        query: request.query.clone(),
        response_tx,
    };

    chatbot
        .jobs
        .send(job)
        .await
        .map_err(|_| AppError::WorkerUnavailable)?;

    let result = response_rx
        .await
        .map_err(|_| AppError::WorkerUnavailable)?;

    CHAT_LATENCY.observe(start_time.elapsed().as_secs_f64());

    match result {
        Ok(response) => {
            info!(route = ROUTE, status = "SUCCESS", %client, model, "Chatbot response generated");
            Ok(Json(ChatResponse {
                response,
                query: request.query,
            }))
        }
        Err(e) => {
            error!(route = ROUTE, status = "LLM_ERROR", %client, model, error = %e, "Chatbot query failed");
            Err(e)
        }
    }
}
