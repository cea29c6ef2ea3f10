//! Config handling

use std::path::{Path, PathBuf};

use tracing::log::LevelFilter;

use crate::cli::CliOptions;
use crate::constants::{ASSETS_DIR, OUTPUTS_DIR, UPLOAD_DIR};
use crate::ratio::RatioTable;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Folders and output sizes shared by the server and the campaign processor.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// where briefs are saved
    pub upload_dir: PathBuf,
    /// base product images, one directory per product
    pub assets_dir: PathBuf,
    /// generated assets
    pub outputs_dir: PathBuf,
    /// output ratios, in processing order
    pub ratios: RatioTable,
}

impl AppConfig {
    /// Default folders and ratios, rooted at `root`.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            upload_dir: root.join(UPLOAD_DIR),
            assets_dir: root.join(ASSETS_DIR),
            outputs_dir: root.join(OUTPUTS_DIR),
            ratios: RatioTable::default(),
        }
    }

    /// Creates the upload, assets and outputs folders if they're missing.
    pub async fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        for dir in [&self.upload_dir, &self.assets_dir, &self.outputs_dir] {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    /// `<outputs>/<product>`
    pub fn product_output_dir(&self, product: &str) -> PathBuf {
        self.outputs_dir.join(product)
    }

    /// `<assets>/<product>`
    pub fn product_assets_dir(&self, product: &str) -> PathBuf {
        self.assets_dir.join(product)
    }
}

impl From<&CliOptions> for AppConfig {
    fn from(cli: &CliOptions) -> Self {
        let mut ratios = RatioTable::default();
        for spec in &cli.ratios {
            ratios.insert(spec.clone());
        }
        Self {
            upload_dir: cli.upload_dir.clone(),
            assets_dir: cli.assets_dir.clone(),
            outputs_dir: cli.outputs_dir.clone(),
            ratios,
        }
    }
}
