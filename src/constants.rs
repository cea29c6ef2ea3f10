//! Shared constants/setters for things
//!

use std::sync::LazyLock;

/// Where saved briefs go
pub const UPLOAD_DIR: &str = "./uploads";

/// Where base product images live, one directory per product
pub const ASSETS_DIR: &str = "./assets";

/// Where generated assets go, `<product>/<ratio>/<product>_<ratio>.png`
pub const OUTPUTS_DIR: &str = "./outputs";

/// File extensions accepted as base images and listed as assets
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Image model used when none is configured
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Size requested from the image generator
pub const GENERATED_IMAGE_SIZE: &str = "1024x1024";

/// OpenAI image generation endpoint
pub const OPENAI_IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";

/// Max age (in seconds) for asset cache entries.
pub const ASSET_CACHE_MAX_AGE_SECONDS: u64 = 60 * 5;

/// Stale-while-revalidate window (in seconds) for asset cache entries.
pub const ASSET_CACHE_STALE_WHILE_REVALIDATE_SECONDS: u64 = 60 * 60;

/// Cache-Control value for asset responses.
pub static ASSET_CACHE_CONTROL: LazyLock<String> = LazyLock::new(|| {
    format!(
        "public, max-age={}, stale-while-revalidate={}",
        ASSET_CACHE_MAX_AGE_SECONDS, ASSET_CACHE_STALE_WHILE_REVALIDATE_SECONDS
    )
});

/// Required brief fields, in the order they're checked
pub const REQUIRED_BRIEF_FIELDS: &[&str] = &[
    "product_name",
    "target_region",
    "target_audience",
    "campaign_message",
];
