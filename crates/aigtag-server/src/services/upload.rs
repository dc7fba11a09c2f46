//! Upload validation and temporary file lifecycle.
//!
//! An accepted upload is written to a uniquely named file and wrapped in a
//! [`TempUpload`] guard. Dropping the guard deletes the file, so every exit
//! path of a handler releases it.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::AppError;

/// Image extensions accepted by the analysis endpoint.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp", "heic",
];

/// Returns the lowercased suffix after the last `.`, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Checks that `filename` has an extension contained in `allowed`.
pub fn is_allowed_extension(filename: &str, allowed: &[&str]) -> bool {
    file_extension(filename).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

/// Rejects a request whose declared length exceeds `max_bytes`.
pub fn enforce_size_limit(declared_content_length: u64, max_bytes: u64) -> Result<(), AppError> {
    if declared_content_length > max_bytes {
        warn!(
            "Upload of {} bytes exceeds limit of {} bytes",
            declared_content_length, max_bytes
        );
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} bytes",
            max_bytes
        )));
    }
    Ok(())
}

/// Reduces a client-supplied filename to a safe single path component.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// A temporary upload on disk, deleted when dropped.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file back into memory.
    pub async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        cleanup(&self.path);
    }
}

/// Writes `bytes` under `destination_dir` with a per-request unique name.
pub async fn persist_upload(
    bytes: &[u8],
    destination_dir: &Path,
    filename: &str,
) -> io::Result<TempUpload> {
    tokio::fs::create_dir_all(destination_dir).await?;

    let safe = secure_filename(filename);
    let name = if safe.is_empty() {
        Uuid::new_v4().simple().to_string()
    } else {
        format!("{}-{}", Uuid::new_v4().simple(), safe)
    };

    // Guard first, so a partial write is removed too.
    let upload = TempUpload {
        path: destination_dir.join(name),
    };
    tokio::fs::write(&upload.path, bytes).await?;
    info!("File saved to: {}", upload.path.display());

    Ok(upload)
}

/// Best-effort removal of a temporary file; failures are only logged.
///
/// Runs synchronously so the file is gone before the response is written.
pub fn cleanup(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => info!("Removed temp file: {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => error!("Error removing temp file {}: {}", path.display(), e),
    }
}
