use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use campaign_assets::compositor::{self, font::SystemFonts};
use campaign_assets::config::setup_logging;
use campaign_assets::ratio::{AspectRatioSpec, RatioTable};
use clap::Parser;
use tracing::info;

/// Composite a single campaign asset from a local image.
///
/// Minimal UX:
///   compose_asset shoes.jpg "Summer Sale" 9x16
#[derive(Parser, Debug)]
#[command(name = "compose_asset")]
struct Args {
    /// Source image (PNG or JPEG)
    source: PathBuf,

    /// Message drawn on the asset
    message: String,

    /// A known ratio (1x1, 9x16, 16x9) or NAME=WIDTHxHEIGHT
    #[arg(default_value = "1x1")]
    ratio: String,

    /// Output file, defaults to `<source stem>_<ratio>.png` next to the source
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Bold font file tried first
    #[arg(long, env = "CAMPAIGN_FONT_BOLD")]
    font_bold: Option<PathBuf>,

    /// Regular font file tried when no bold face loads
    #[arg(long, env = "CAMPAIGN_FONT_REGULAR")]
    font_regular: Option<PathBuf>,

    #[arg(long, env = "CAMPAIGN_DEBUG")]
    debug: bool,
}

fn resolve_ratio(arg: &str) -> Result<AspectRatioSpec> {
    if arg.contains('=') {
        return arg
            .parse()
            .with_context(|| format!("Invalid ratio {arg:?}"));
    }
    RatioTable::default()
        .get(arg)
        .cloned()
        .ok_or_else(|| anyhow!("Unknown ratio {arg:?}, use NAME=WIDTHxHEIGHT"))
}

fn default_output(args: &Args, ratio: &AspectRatioSpec) -> PathBuf {
    let stem = args
        .source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asset".to_string());
    args.source
        .with_file_name(format!("{}_{}.png", stem, ratio.name))
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.debug).map_err(|err| anyhow!("Failed to set up logging: {err}"))?;

    let ratio = resolve_ratio(&args.ratio)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args, &ratio));

    let source = compositor::load_source(&args.source)?;
    let fonts = SystemFonts::new(args.font_bold.clone(), args.font_regular.clone());
    let written = compositor::compose_to_file(&source, &args.message, &ratio, &fonts, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Wrote {} ({})", written.display(), ratio.dimensions());
    Ok(())
}
