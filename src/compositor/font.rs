//! Font resolution and glyph rasterization

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use font8x8::{BASIC_FONTS, GREEK_FONTS, LATIN_FONTS, UnicodeFonts};
use tracing::{debug, warn};

/// Built-in glyphs are 8x8 cells.
const BITMAP_CELL: u32 = 8;

/// Places to look for a bold face when none is configured.
const BOLD_FONT_PATHS: &[&str] = &[
    "arialbd.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
];

/// Places to look for a regular face when none is configured.
const REGULAR_FONT_PATHS: &[&str] = &[
    "arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

/// A font at a pixel size, ready to rasterize.
#[derive(Clone, Debug)]
pub enum Face {
    /// TrueType / OpenType outlines.
    Outline {
        /// the loaded font
        font: FontArc,
        /// em size in pixels
        size: u32,
    },
    /// The built-in 8x8 bitmap glyphs, scaled up by an integer factor.
    Bitmap {
        /// nearest-neighbour magnification
        scale: u32,
    },
}

impl Face {
    /// The built-in face, magnified to roughly `size` pixels tall.
    pub fn builtin(size: u32) -> Self {
        Face::Bitmap {
            scale: (size / BITMAP_CELL).max(1),
        }
    }

    /// True for the built-in bitmap face.
    pub fn is_builtin(&self) -> bool {
        matches!(self, Face::Bitmap { .. })
    }

    /// Emits `(x, y, coverage)` for every inked pixel of `text`, relative to a
    /// pen starting at the top-left of the line.
    pub fn rasterize(&self, text: &str, mut emit: impl FnMut(i64, i64, f32)) {
        match self {
            Face::Outline { font, size } => {
                // `size` is the em size, PxScale wants the ascent-to-descent height
                let scale = font
                    .units_per_em()
                    .map(|units| PxScale::from(*size as f32 * font.height_unscaled() / units))
                    .unwrap_or_else(|| PxScale::from(*size as f32));
                let scaled = font.as_scaled(scale);
                let baseline = scaled.ascent();
                let mut cursor = 0.0f32;
                let mut previous: Option<GlyphId> = None;

                for ch in text.chars() {
                    let id = scaled.glyph_id(ch);
                    if let Some(prev) = previous {
                        cursor += scaled.kern(prev, id);
                    }
                    let glyph = id.with_scale_and_position(scale, point(cursor, baseline));
                    cursor += scaled.h_advance(id);
                    previous = Some(id);

                    if let Some(outlined) = scaled.outline_glyph(glyph) {
                        let bounds = outlined.px_bounds();
                        let (left, top) = (bounds.min.x as i64, bounds.min.y as i64);
                        outlined.draw(|gx, gy, coverage| {
                            if coverage > 0.0 {
                                emit(left + i64::from(gx), top + i64::from(gy), coverage);
                            }
                        });
                    }
                }
            }
            Face::Bitmap { scale } => {
                let scale = i64::from(*scale);
                let cell = i64::from(BITMAP_CELL) * scale;
                for (index, ch) in text.chars().enumerate() {
                    let Some(rows) = bitmap_glyph(ch) else {
                        continue;
                    };
                    let origin_x = index as i64 * cell;
                    for (row, bits) in rows.into_iter().enumerate() {
                        for col in 0..BITMAP_CELL {
                            if (bits >> col) & 1 == 0 {
                                continue;
                            }
                            let px = origin_x + i64::from(col) * scale;
                            let py = row as i64 * scale;
                            for dy in 0..scale {
                                for dx in 0..scale {
                                    emit(px + dx, py + dy, 1.0);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Built-in glyph for `ch`: ASCII, then Latin-1, then Greek, then `?`.
fn bitmap_glyph(ch: char) -> Option<[u8; 8]> {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| GREEK_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
}

/// Source of font faces for text overlays.
pub trait FontProvider: Send + Sync {
    /// Returns a face at `size` pixels, or `None` when the variant isn't available.
    fn resolve(&self, bold: bool, size: u32) -> Option<Face>;
}

/// Bold, then regular, then the built-in face. Never fails.
pub fn select_face(provider: &dyn FontProvider, size: u32) -> Face {
    if let Some(face) = provider.resolve(true, size) {
        return face;
    }
    debug!("No bold font available, trying regular");
    if let Some(face) = provider.resolve(false, size) {
        return face;
    }
    debug!("No regular font available, using the built-in face");
    Face::builtin(size)
}

/// Only ever offers the built-in face, handy where output must not depend on the host.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinFonts;

impl FontProvider for BuiltinFonts {
    fn resolve(&self, _bold: bool, _size: u32) -> Option<Face> {
        None
    }
}

/// Loads faces from disk, trying configured paths before the common OS locations.
///
/// Each variant is loaded at most once per provider.
#[derive(Debug, Default)]
pub struct SystemFonts {
    bold_paths: Vec<PathBuf>,
    regular_paths: Vec<PathBuf>,
    bold: OnceLock<Option<FontArc>>,
    regular: OnceLock<Option<FontArc>>,
}

impl SystemFonts {
    /// Searches `bold`/`regular` first (when given), then the default locations.
    pub fn new(bold: Option<PathBuf>, regular: Option<PathBuf>) -> Self {
        let search = |configured: Option<PathBuf>, defaults: &[&str]| {
            configured
                .into_iter()
                .chain(defaults.iter().map(PathBuf::from))
                .collect::<Vec<_>>()
        };
        Self {
            bold_paths: search(bold, BOLD_FONT_PATHS),
            regular_paths: search(regular, REGULAR_FONT_PATHS),
            bold: OnceLock::new(),
            regular: OnceLock::new(),
        }
    }

    /// Only searches the given paths, skipping the OS locations.
    pub fn with_paths(bold_paths: Vec<PathBuf>, regular_paths: Vec<PathBuf>) -> Self {
        Self {
            bold_paths,
            regular_paths,
            bold: OnceLock::new(),
            regular: OnceLock::new(),
        }
    }
}

impl FontProvider for SystemFonts {
    fn resolve(&self, bold: bool, size: u32) -> Option<Face> {
        let (cell, paths) = if bold {
            (&self.bold, &self.bold_paths)
        } else {
            (&self.regular, &self.regular_paths)
        };
        let font = cell.get_or_init(|| paths.iter().find_map(|path| load_font(path)));
        font.as_ref().map(|font| Face::Outline {
            font: font.clone(),
            size,
        })
    }
}

fn load_font(path: &Path) -> Option<FontArc> {
    let data = std::fs::read(path).ok()?;
    match FontArc::try_from_vec(data) {
        Ok(font) => {
            debug!("Loaded font {}", path.display());
            Some(font)
        }
        Err(err) => {
            warn!("Ignoring unreadable font {}: {}", path.display(), err);
            None
        }
    }
}
