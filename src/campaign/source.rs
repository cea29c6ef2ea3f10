//! Finding (or generating) the base image for a product

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::generator::{ImageGenerator, product_prompt};
use crate::constants::IMAGE_EXTENSIONS;
use crate::error::CampaignError;

/// True for `.png`, `.jpg` and `.jpeg`, ignoring case.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Image file names in `dir`, sorted. A missing directory is empty.
pub async fn list_images(dir: &Path) -> Result<Vec<String>, CampaignError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(CampaignError::InternalServerError(err.to_string())),
    };

    let mut images = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_image_file(&path) || !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            images.push(name.to_string());
        }
    }
    images.sort();
    Ok(images)
}

/// Returns the first image in `<assets>/<product>/`, or generates one there.
pub async fn get_or_generate(
    assets_dir: &Path,
    product_name: &str,
    target_audience: &str,
    generator: &ImageGenerator,
) -> Result<PathBuf, CampaignError> {
    let product_dir = assets_dir.join(product_name);
    if let Some(existing) = list_images(&product_dir).await?.into_iter().next() {
        debug!("Using existing base image {}", existing);
        return Ok(product_dir.join(existing));
    }

    info!("No base image for {}, generating one", product_name);
    let bytes = generator
        .generate(&product_prompt(product_name, target_audience))
        .await?;

    tokio::fs::create_dir_all(&product_dir).await?;
    let image_path = product_dir.join(format!("generated_{product_name}.png"));
    tokio::fs::write(&image_path, bytes).await?;
    info!("Saved generated base image to {}", image_path.display());
    Ok(image_path)
}
