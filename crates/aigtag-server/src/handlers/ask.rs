//! Text prompt endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info, warn};

use crate::dto::{AskRequest, AskResponse};
use crate::error::AppError;
use crate::ServerState;

/// Parses the body, treating an empty or non-object payload as absent.
fn parse_body(body: &[u8]) -> Result<AskRequest, AppError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|_| AppError::bad_request("No JSON data provided"))?;

    match value.as_object() {
        Some(fields) if !fields.is_empty() => {}
        _ => return Err(AppError::bad_request("No JSON data provided")),
    }

    // Non-string fields count as missing.
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn body_err(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Ask body too large: {}", rejection.body_text());
        AppError::PayloadTooLarge(rejection.body_text())
    } else {
        warn!("Unreadable ask body: {}", rejection.body_text());
        AppError::bad_request("No JSON data provided")
    }
}

/// Answers `user_input` with the template selected by `prompt_id`.
pub async fn ask(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let body = body.map_err(body_err)?;
    let req = parse_body(&body)?;

    let (Some(prompt_id), Some(user_input)) = (
        req.prompt_id.filter(|s| !s.is_empty()),
        req.user_input.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::bad_request("Missing required parameters"));
    };

    let Some(template) = state.templates.lookup(&prompt_id) else {
        warn!("Unknown prompt id: {}", prompt_id);
        return Err(AppError::bad_request("Invalid prompt ID"));
    };

    info!(
        "Ask request (template: {}): {}...",
        template.id,
        user_input.chars().take(50).collect::<String>()
    );

    let result = state
        .llm
        .invoke_text(&template.file_path, &user_input, &state.settings.llm.text_model)
        .await
        .map_err(|e| {
            error!("Error in ask: {}", e);
            AppError::internal()
        })?;

    Ok(Json(AskResponse { result }))
}
