//! Image MIME inference and data-URI encoding for vision requests.

use base64::Engine;

/// Subtype used when the extension is not in the table.
pub const DEFAULT_IMAGE_SUBTYPE: &str = "jpeg";

/// Maps a file extension (with or without the leading dot, any case) to an image subtype.
pub fn image_subtype(extension: &str) -> &'static str {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "bmp" => "bmp",
        "jpe" | "jpeg" | "jpg" => "jpeg",
        "png" => "png",
        "tif" | "tiff" => "tiff",
        "webp" => "webp",
        "heic" => "heic",
        _ => DEFAULT_IMAGE_SUBTYPE,
    }
}

/// Builds a `data:image/{subtype};base64,{payload}` URI for the given bytes.
pub fn image_data_url(bytes: &[u8], extension: &str) -> String {
    format!(
        "data:image/{};base64,{}",
        image_subtype(extension),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
