//! Campaign processing: one brief in, one asset per ratio out

pub mod brief;
pub mod generator;
pub mod source;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, instrument};

use crate::compositor::{self, font::FontProvider};
use crate::config::AppConfig;
use crate::error::CampaignError;
use crate::ratio::AspectRatioSpec;
use brief::{CampaignBrief, validate_product_name};
use generator::ImageGenerator;

/// One successfully written asset.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct GeneratedAsset {
    /// ratio identifier
    pub ratio: String,
    /// where the PNG was written
    pub path: PathBuf,
    /// `WIDTHxHEIGHT`
    pub dimensions: String,
}

/// A ratio that couldn't be produced.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct FailedAsset {
    /// ratio identifier
    pub ratio: String,
    /// why it failed
    pub error: String,
}

/// Summary returned to the client.
#[derive(Clone, Debug, Serialize)]
pub struct CampaignResult {
    /// product name from the brief
    pub product: String,
    /// number of assets written
    pub assets_generated: usize,
    /// the written assets, in ratio order
    pub assets: Vec<GeneratedAsset>,
    /// ratios that failed, the others are unaffected
    pub failed: Vec<FailedAsset>,
    /// `success` whenever a base image was found, even if every ratio failed
    pub status: &'static str,
}

/// `<outputs>/<product>/<ratio>/<product>_<ratio>.png`
pub fn asset_path(config: &AppConfig, product: &str, ratio: &str) -> PathBuf {
    config
        .product_output_dir(product)
        .join(ratio)
        .join(format!("{product}_{ratio}.png"))
}

/// Resolves the base image then composes every configured ratio.
#[instrument(level = "info", skip_all, fields(product = %brief.product_name))]
pub async fn process_campaign(
    config: &AppConfig,
    brief: &CampaignBrief,
    generator: &ImageGenerator,
    fonts: Arc<dyn FontProvider>,
) -> Result<CampaignResult, CampaignError> {
    let product = brief.product_name.clone();
    validate_product_name(&product)?;
    tokio::fs::create_dir_all(config.product_output_dir(&product)).await?;

    let base_image = source::get_or_generate(
        &config.assets_dir,
        &product,
        &brief.target_audience,
        generator,
    )
    .await
    .map_err(|err| {
        error!("Base image unavailable for {}: {}", product, err);
        CampaignError::Generation("Failed to generate base image".to_string())
    })?;

    let jobs: Vec<(AspectRatioSpec, PathBuf)> = config
        .ratios
        .iter()
        .map(|ratio| (ratio.clone(), asset_path(config, &product, &ratio.name)))
        .collect();
    let message = brief.campaign_message.clone();

    let outcomes = tokio::task::spawn_blocking(move || {
        render_ratios(&base_image, &message, &jobs, fonts.as_ref())
    })
    .await?;

    let mut assets = Vec::new();
    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(asset) => assets.push(asset),
            Err(failure) => failed.push(failure),
        }
    }
    info!(
        "Generated {} of {} assets for {}",
        assets.len(),
        assets.len() + failed.len(),
        product
    );

    Ok(CampaignResult {
        product,
        assets_generated: assets.len(),
        assets,
        failed,
        status: "success",
    })
}

/// Decodes the base image once and writes each ratio in order.
///
/// Failures are reported per ratio: a base image that won't decode fails
/// every ratio, a write failure only fails its own.
fn render_ratios(
    base_image: &Path,
    message: &str,
    jobs: &[(AspectRatioSpec, PathBuf)],
    fonts: &dyn FontProvider,
) -> Vec<Result<GeneratedAsset, FailedAsset>> {
    let source = match compositor::load_source(base_image) {
        Ok(source) => source,
        Err(err) => {
            error!("Failed to load base image: {}", err);
            return jobs
                .iter()
                .map(|(ratio, _)| {
                    Err(FailedAsset {
                        ratio: ratio.name.clone(),
                        error: err.to_string(),
                    })
                })
                .collect();
        }
    };

    jobs.iter()
        .map(|(ratio, output)| {
            let result = output
                .parent()
                .map_or(Ok(()), std::fs::create_dir_all)
                .map_err(|err| compositor::CompositeError::Io(output.clone(), err))
                .and_then(|()| {
                    compositor::compose_to_file(&source, message, ratio, fonts, output)
                });
            match result {
                Ok(path) => Ok(GeneratedAsset {
                    ratio: ratio.name.clone(),
                    path,
                    dimensions: ratio.dimensions(),
                }),
                Err(err) => {
                    error!("Failed to create {} asset: {}", ratio.name, err);
                    Err(FailedAsset {
                        ratio: ratio.name.clone(),
                        error: err.to_string(),
                    })
                }
            }
        })
        .collect()
}
