//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;
use std::path::PathBuf;

use crate::constants::{ASSETS_DIR, DEFAULT_IMAGE_MODEL, OUTPUTS_DIR, UPLOAD_DIR};
use crate::ratio::AspectRatioSpec;

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "CAMPAIGN_DEBUG")]
    /// Enable debug logging. Env: CAMPAIGN_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "5000", env = "CAMPAIGN_PORT")]
    /// http listener, defaults to `5000`.
    /// Env: CAMPAIGN_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "CAMPAIGN_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: CAMPAIGN_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(long, default_value = UPLOAD_DIR, env = "CAMPAIGN_UPLOAD_DIR")]
    /// Where briefs are saved. Env: CAMPAIGN_UPLOAD_DIR
    pub upload_dir: PathBuf,
    #[clap(long, default_value = ASSETS_DIR, env = "CAMPAIGN_ASSETS_DIR")]
    /// Base product images, `<dir>/<product>/*.png`. Env: CAMPAIGN_ASSETS_DIR
    pub assets_dir: PathBuf,
    #[clap(long, default_value = OUTPUTS_DIR, env = "CAMPAIGN_OUTPUTS_DIR")]
    /// Generated assets. Env: CAMPAIGN_OUTPUTS_DIR
    pub outputs_dir: PathBuf,

    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    /// OpenAI API key, base image generation is disabled without it.
    /// Env: OPENAI_API_KEY
    pub openai_api_key: Option<String>,
    #[clap(long, default_value = DEFAULT_IMAGE_MODEL, env = "CAMPAIGN_IMAGE_MODEL")]
    /// Image model for base images. Env: CAMPAIGN_IMAGE_MODEL
    pub image_model: String,

    #[clap(long, env = "CAMPAIGN_FONT_BOLD")]
    /// Bold font file tried first for overlays. Env: CAMPAIGN_FONT_BOLD
    pub font_bold: Option<PathBuf>,
    #[clap(long, env = "CAMPAIGN_FONT_REGULAR")]
    /// Regular font file tried when no bold face loads. Env: CAMPAIGN_FONT_REGULAR
    pub font_regular: Option<PathBuf>,

    #[clap(long = "ratio", value_name = "NAME=WIDTHxHEIGHT")]
    /// Adds or resizes an output ratio, eg `--ratio 4x5=800x1000`. Repeatable.
    pub ratios: Vec<AspectRatioSpec>,
}
