//! Image analysis endpoint.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use tracing::{error, info, warn};

use crate::dto::AnalyzeResponse;
use crate::error::AppError;
use crate::services::upload::{self, ALLOWED_EXTENSIONS};
use crate::ServerState;

const IMAGE_FIELD: &str = "image";

/// The `image` part of a multipart upload.
struct ImageField {
    filename: String,
    bytes: Vec<u8>,
}

fn multipart_err(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        warn!("Invalid multipart request: {}", e);
        AppError::bad_request("Invalid multipart request")
    }
}

/// Pulls the `image` file part out of the form, ignoring any other fields.
///
/// A part named `image` without a `filename` is a plain form value, not a file.
async fn read_image_field(multipart: &mut Multipart) -> Result<Option<ImageField>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(multipart_err)?;
        return Ok(Some(ImageField {
            filename,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// Uploads an image and returns the model's JSON description of it.
pub async fn analyze(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let Ok(mut multipart) = multipart else {
        warn!("No image file in request");
        return Err(AppError::bad_request("No image file provided"));
    };

    let Some(image) = read_image_field(&mut multipart).await? else {
        warn!("No image file in request");
        return Err(AppError::bad_request("No image file provided"));
    };

    if image.filename.is_empty() {
        warn!("Empty filename");
        return Err(AppError::bad_request("No selected file"));
    }

    let Some(extension) = upload::file_extension(&image.filename)
        .filter(|_| upload::is_allowed_extension(&image.filename, ALLOWED_EXTENSIONS))
    else {
        warn!("Disallowed file type: {}", image.filename);
        return Err(AppError::bad_request("File type not allowed"));
    };

    let temp = upload::persist_upload(&image.bytes, &state.settings.upload_dir, &image.filename)
        .await
        .map_err(|e| {
            error!("File save error: {}", e);
            AppError::Internal("File processing failed".into())
        })?;

    let image_bytes = temp.read().await.map_err(|e| {
        error!("File read error: {}", e);
        AppError::Internal("File processing failed".into())
    })?;

    let answer = state
        .llm
        .invoke_image(
            &image_bytes,
            &extension,
            &state.vision_template,
            &state.settings.llm.vision_model,
        )
        .await
        .map_err(|e| {
            error!("Unexpected error: {}", e);
            AppError::internal()
        })?;

    let result: serde_json::Value = serde_json::from_str(&answer).map_err(|e| {
        error!("Model answer is not JSON ({}): {}", e, answer);
        AppError::internal()
    })?;

    info!(
        "Analyzed {} via {} ({} bytes)",
        image.filename,
        temp.path().display(),
        image_bytes.len()
    );
    Ok(Json(AnalyzeResponse { result }))
}
