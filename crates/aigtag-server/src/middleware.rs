//! Request guards applied ahead of the handlers.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::services::upload::enforce_size_limit;
use crate::ServerState;

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Rejects file uploads whose declared `Content-Length` is over the ceiling,
/// before any of the body is read.
pub async fn limit_upload_size(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.method() == Method::POST && is_multipart(request.headers()) {
        if let Some(length) = declared_length(request.headers()) {
            enforce_size_limit(length, state.settings.max_content_length)?;
        }
    }
    Ok(next.run(request).await)
}
