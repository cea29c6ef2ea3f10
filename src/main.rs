use std::sync::Arc;

use campaign_assets::campaign::generator::ImageGenerator;
use campaign_assets::compositor::font::SystemFonts;
use campaign_assets::config::{AppConfig, setup_logging};
use clap::Parser;
use tracing::{error, info};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = campaign_assets::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let config = AppConfig::from(&cli);
    let generator = ImageGenerator::from_api_key(cli.openai_api_key.clone(), &cli.image_model);
    if matches!(generator, ImageGenerator::Disabled) {
        info!("OPENAI_API_KEY not set, products without a base image will fail");
    }
    let fonts = Arc::new(SystemFonts::new(
        cli.font_bold.clone(),
        cli.font_regular.clone(),
    ));

    if let Err(err) = campaign_assets::web::setup_server(
        &cli.listen_address,
        cli.port,
        config,
        generator,
        fonts,
    )
    .await
    {
        error!("Application error: {}", err);
    }
}
