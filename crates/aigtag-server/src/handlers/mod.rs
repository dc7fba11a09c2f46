//! HTTP route handlers for the aigtag server.

pub mod ask;
pub mod image;
pub mod options;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
