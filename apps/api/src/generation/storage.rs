//! Local output storage for generated catalog photos.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use uuid::Uuid;

/// File extension for a generated image's MIME type.
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    }
}

/// `cabide_<number>_<8 hex>.<ext>`; characters outside `[A-Za-z0-9_-]` in the number are dropped.
pub fn output_filename(garment_number: &str, mime_type: &str) -> String {
    let number: String = garment_number
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    let ext = extension_for(mime_type);

    if number.is_empty() {
        format!("cabide_{suffix}.{ext}")
    } else {
        format!("cabide_{number}_{suffix}.{ext}")
    }
}

/// Writes the image into `output_dir`, creating the directory if needed.
pub async fn save_output(
    output_dir: &Path,
    garment_number: &str,
    mime_type: &str,
    data: &[u8],
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create output dir {}", output_dir.display()))?;

    let path = output_dir.join(output_filename(garment_number, mime_type));
    tokio::fs::write(&path, data)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Saved generated image to {}", path.display());
    Ok(path)
}
