//! Canvas compositing: background, placement, paste and text overlay.
//!
//! Every call is independent, nothing is cached between canvases.

pub mod background;
pub mod color;
pub mod font;
pub mod placement;
pub mod text;

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use tracing::{debug, instrument};

use crate::ratio::AspectRatioSpec;
use font::FontProvider;
use text::TextLayout;

/// How a ratio places the photo and the message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayoutPolicy {
    /// `1x1`: photo unscaled at the origin, text bottom-right.
    Square,
    /// `9x16`: photo fills the width below the top tenth, text centred low.
    Portrait,
    /// `16x9`: photo fills the height and is centred, text top-left.
    Landscape,
    /// Anything else: photo unscaled at the origin, text placed as for `Square`.
    Fallback,
}

impl LayoutPolicy {
    /// Picks the policy for a ratio identifier. Unknown names never fail.
    pub fn for_ratio(name: &str) -> Self {
        match name {
            "1x1" => Self::Square,
            "9x16" => Self::Portrait,
            "16x9" => Self::Landscape,
            _ => Self::Fallback,
        }
    }
}

/// Errors from loading, encoding or writing a canvas.
#[derive(Debug)]
pub enum CompositeError {
    /// The source image couldn't be read or decoded.
    Decode(PathBuf, image::ImageError),
    /// The finished canvas couldn't be encoded.
    Encode(image::ImageError),
    /// Writing the output failed.
    Io(PathBuf, std::io::Error),
}

impl fmt::Display for CompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(path, err) => write!(f, "Failed to decode {}: {err}", path.display()),
            Self::Encode(err) => write!(f, "Failed to encode canvas: {err}"),
            Self::Io(path, err) => write!(f, "Failed to write {}: {err}", path.display()),
        }
    }
}

impl std::error::Error for CompositeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(_, err) | Self::Encode(err) => Some(err),
            Self::Io(_, err) => Some(err),
        }
    }
}

/// A finished canvas and where the message ended up.
#[derive(Debug)]
pub struct Composition {
    /// the rendered canvas, exactly the ratio's size
    pub canvas: RgbImage,
    /// ink box of the message
    pub text: TextLayout,
}

/// Decodes an image file and normalizes it to 8-bit RGB.
pub fn load_source(path: &Path) -> Result<RgbImage, CompositeError> {
    let image = image::ImageReader::open(path)
        .map_err(|err| CompositeError::Decode(path.to_path_buf(), image::ImageError::IoError(err)))?
        .with_guessed_format()
        .map_err(|err| CompositeError::Decode(path.to_path_buf(), image::ImageError::IoError(err)))?
        .decode()
        .map_err(|err| CompositeError::Decode(path.to_path_buf(), err))?;
    Ok(image.to_rgb8())
}

/// Builds the canvas for one ratio. Pure: the source isn't modified.
#[instrument(level = "debug", skip(source, message, fonts), fields(ratio = %ratio.name))]
pub fn compose(
    source: &RgbImage,
    message: &str,
    ratio: &AspectRatioSpec,
    fonts: &dyn FontProvider,
) -> Composition {
    let (width, height) = ratio.size();
    let policy = LayoutPolicy::for_ratio(&ratio.name);

    let avg = color::average_color(source);
    debug!("average color {:?}", avg);
    let mut canvas = background::gradient_canvas(width, height, avg);

    let scaled = placement::scale_for_canvas(source, policy, width, height);
    let at = placement::paste_position(policy, scaled.width(), scaled.height(), width, height);
    debug!("placing {}x{} at {:?}", scaled.width(), scaled.height(), at);
    placement::paste(&mut canvas, &scaled, at);

    let text = text::overlay_message(&mut canvas, message, policy, fonts);
    Composition { canvas, text }
}

/// Composes and writes a PNG to `output`.
///
/// The file is written next to `output` first and renamed into place, so a
/// failed call never leaves a partial image at `output`.
pub fn compose_to_file(
    source: &RgbImage,
    message: &str,
    ratio: &AspectRatioSpec,
    fonts: &dyn FontProvider,
    output: &Path,
) -> Result<PathBuf, CompositeError> {
    let composition = compose(source, message, ratio, fonts);
    write_png(&composition.canvas, output)?;
    Ok(output.to_path_buf())
}

/// Encodes in memory, writes a sibling temp file, then renames it over `output`.
pub fn write_png(canvas: &RgbImage, output: &Path) -> Result<(), CompositeError> {
    let mut encoded = Cursor::new(Vec::new());
    canvas
        .write_to(&mut encoded, ImageFormat::Png)
        .map_err(CompositeError::Encode)?;

    let mut partial = output.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    if let Err(err) = std::fs::write(&partial, encoded.get_ref()) {
        let _ = std::fs::remove_file(&partial);
        return Err(CompositeError::Io(output.to_path_buf(), err));
    }
    std::fs::rename(&partial, output).map_err(|err| {
        let _ = std::fs::remove_file(&partial);
        CompositeError::Io(output.to_path_buf(), err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use font::BuiltinFonts;
    use image::Rgb;

    fn spec(name: &str, width: u32, height: u32) -> AspectRatioSpec {
        AspectRatioSpec::new(name, width, height).expect("valid ratio")
    }

    #[test]
    fn policy_lookup() {
        assert_eq!(LayoutPolicy::for_ratio("1x1"), LayoutPolicy::Square);
        assert_eq!(LayoutPolicy::for_ratio("9x16"), LayoutPolicy::Portrait);
        assert_eq!(LayoutPolicy::for_ratio("16x9"), LayoutPolicy::Landscape);
        assert_eq!(LayoutPolicy::for_ratio("4x3"), LayoutPolicy::Fallback);
        assert_eq!(LayoutPolicy::for_ratio("1X1"), LayoutPolicy::Fallback);
    }

    #[test]
    fn output_matches_every_default_ratio() {
        let source = RgbImage::from_pixel(300, 200, Rgb([10, 120, 60]));
        for ratio in crate::ratio::RatioTable::default().iter() {
            let composition = compose(&source, "Fresh roast", ratio, &BuiltinFonts);
            assert_eq!(composition.canvas.dimensions(), ratio.size());
        }
    }

    #[test]
    fn square_pastes_source_bit_identical() {
        let source = RgbImage::from_fn(64, 48, |x, y| Rgb([x as u8 * 3, y as u8 * 5, 77]));
        let composition = compose(&source, "", &spec("1x1", 128, 128), &BuiltinFonts);
        for (x, y, pixel) in source.enumerate_pixels() {
            assert_eq!(composition.canvas.get_pixel(x, y), pixel);
        }
        // gradient below the photo
        assert_ne!(composition.canvas.get_pixel(10, 100), source.get_pixel(10, 47));
    }

    #[test]
    fn unknown_ratio_uses_its_own_size() {
        let source = RgbImage::from_pixel(50, 40, Rgb([200, 200, 0]));
        let composition = compose(&source, "Hi", &spec("4x3", 400, 300), &BuiltinFonts);
        assert_eq!(composition.canvas.dimensions(), (400, 300));
        assert_eq!(*composition.canvas.get_pixel(0, 0), Rgb([200, 200, 0]));
        assert_eq!(*composition.canvas.get_pixel(49, 39), Rgb([200, 200, 0]));
        // bottom-right text, like a square canvas
        let text = composition.text;
        assert_eq!(text.x + i64::from(text.width), 380);
        assert_eq!(text.y + i64::from(text.height), 280);
    }

    #[test]
    fn write_png_leaves_no_partial_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("out.png");
        let canvas = RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]));
        write_png(&canvas, &output).expect("write png");
        assert!(output.exists());
        assert!(!dir.path().join("out.png.partial").exists());

        let missing = dir.path().join("missing").join("out.png");
        assert!(matches!(write_png(&canvas, &missing), Err(CompositeError::Io(..))));
        assert!(!missing.exists());
    }

    #[test]
    fn load_source_reports_decode_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").expect("write file");
        assert!(matches!(load_source(&path), Err(CompositeError::Decode(..))));
        assert!(matches!(
            load_source(&dir.path().join("absent.png")),
            Err(CompositeError::Decode(..))
        ));
    }
}
