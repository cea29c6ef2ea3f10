//! Web server: brief uploads and generated asset serving

use std::num::NonZeroU16;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, info, instrument};

use crate::campaign::brief::{CampaignBrief, validate_product_name};
use crate::campaign::generator::ImageGenerator;
use crate::campaign::source::list_images;
use crate::campaign::{self, CampaignResult};
use crate::compositor::font::FontProvider;
use crate::config::AppConfig;
use crate::error::CampaignError;

mod images;

#[derive(Clone)]
pub(crate) struct AppState {
    config: Arc<AppConfig>,
    generator: ImageGenerator,
    fonts: Arc<dyn FontProvider>,
}

impl AppState {
    fn new(config: AppConfig, generator: ImageGenerator, fonts: Arc<dyn FontProvider>) -> Self {
        Self {
            config: Arc::new(config),
            generator,
            fonts,
        }
    }
}

#[derive(Serialize)]
struct UploadResponse {
    success: bool,
    message: &'static str,
    result: CampaignResult,
}

/// One generated file, as listed by `/api/assets/{product}`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct AssetInfo {
    ratio: String,
    filename: String,
    url: String,
    dimensions: String,
}

/// Handles POST /upload: validate, save, process.
#[instrument(level = "info", skip_all)]
async fn upload_brief_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UploadResponse>, CampaignError> {
    let brief = CampaignBrief::from_slice(&body)?;
    validate_product_name(&brief.product_name)?;
    info!("Received brief for {}", brief.product_name);

    brief.save(&state.config.upload_dir).await?;

    let result = campaign::process_campaign(
        &state.config,
        &brief,
        &state.generator,
        state.fonts.clone(),
    )
    .await?;

    Ok(Json(UploadResponse {
        success: true,
        message: "Campaign processed successfully",
        result,
    }))
}

/// Handles GET /assets/{product}/{ratio}/{filename}
async fn serve_asset_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((product, ratio, filename)): Path<(String, String, String)>,
) -> Result<Response, CampaignError> {
    for segment in [&product, &ratio, &filename] {
        if validate_product_name(segment).is_err() {
            return Err(CampaignError::NotFound("Asset not found".to_string()));
        }
    }

    let asset_path = state
        .config
        .product_output_dir(&product)
        .join(&ratio)
        .join(&filename);
    images::asset_response(&asset_path, &headers).await
}

/// Handles GET /api/assets/{product}
async fn assets_info_handler(
    State(state): State<AppState>,
    Path(product): Path<String>,
) -> Result<Json<Value>, CampaignError> {
    validate_product_name(&product)?;
    let product_dir = state.config.product_output_dir(&product);

    let mut assets = Vec::new();
    for ratio in state.config.ratios.iter() {
        for filename in list_images(&product_dir.join(&ratio.name)).await? {
            assets.push(AssetInfo {
                url: format!("/assets/{}/{}/{}", product, ratio.name, filename),
                ratio: ratio.name.clone(),
                filename,
                dimensions: ratio.dimensions(),
            });
        }
    }

    Ok(Json(json!({ "assets": assets })))
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/upload", axum::routing::post(upload_brief_handler))
        .route(
            "/assets/{product}/{ratio}/{filename}",
            axum::routing::get(serve_asset_handler),
        )
        .route(
            "/api/assets/{product}",
            axum::routing::get(assets_info_handler),
        )
}

/// Creates the folders and serves the API until the process is stopped.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    config: AppConfig,
    generator: ImageGenerator,
    fonts: Arc<dyn FontProvider>,
) -> Result<(), anyhow::Error> {
    config.ensure_dirs().await?;
    let app = create_router().with_state(AppState::new(config, generator, fonts));

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {}", err);
    }
    Ok(())
}
