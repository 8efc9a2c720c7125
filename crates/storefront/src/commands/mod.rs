pub mod extract;
pub mod generate;
pub mod init;
pub mod prompt;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use storefront_llm::ImagePart;

/// Read product photos given on the command line.
pub fn load_images(paths: &[PathBuf]) -> Result<Vec<ImagePart>> {
    paths
        .iter()
        .map(|path| {
            let mime_type = image_mime_type(path).with_context(|| {
                format!(
                    "Unsupported image type: {} (expected png, jpg, jpeg, webp or gif)",
                    path.display()
                )
            })?;
            let data =
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            tracing::debug!("Attaching {} ({} bytes)", path.display(), data.len());
            Ok(ImagePart::new(mime_type, data))
        })
        .collect()
}

fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
