use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::gemini::InlineData;

pub const FALLBACK_IMAGE_MIME: &str = "image/png";

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type())
}

/// Extension first, then magic bytes, then `image/png`.
pub fn image_mime_type(path: &Path, bytes: &[u8]) -> &'static str {
    mime_for_path(path)
        .or_else(|| sniff_image_mime(bytes))
        .unwrap_or(FALLBACK_IMAGE_MIME)
}

pub fn read_image(path: &Path) -> Result<InlineData> {
    let data = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    let mime_type = image_mime_type(path, &data).to_string();
    Ok(InlineData { mime_type, data })
}
