//! Message overlay: font sizing, placement, plaque, shadow and fill

use image::{Rgb, RgbImage, Rgba};

use super::LayoutPolicy;
use super::font::{Face, FontProvider, select_face};

/// Space between the ink box and the plaque edge.
pub const PLAQUE_PADDING: i64 = 12;
/// Corner radius of the plaque.
pub const PLAQUE_RADIUS: f32 = 6.0;
/// Distance from the canvas edge for corner-anchored text.
pub const EDGE_MARGIN: i64 = 20;
/// Drop shadow offset, both axes.
pub const SHADOW_OFFSET: i64 = 2;

const PLAQUE_FILL: Rgba<u8> = Rgba([0, 0, 0, 180]);
const SHADOW_FILL: Rgba<u8> = Rgba([0, 0, 0, 120]);
const TEXT_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Tight ink box of the rendered message, in canvas coordinates.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TextLayout {
    /// left edge of the ink
    pub x: i64,
    /// top edge of the ink
    pub y: i64,
    /// ink width
    pub width: u32,
    /// ink height
    pub height: u32,
}

impl TextLayout {
    /// True when the message has no ink at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Inclusive `[left, top, right, bottom]` of the plaque around this box.
    pub fn plaque_bounds(&self) -> [i64; 4] {
        [
            self.x - PLAQUE_PADDING,
            self.y - PLAQUE_PADDING,
            self.x + i64::from(self.width) + PLAQUE_PADDING,
            self.y + i64::from(self.height) + PLAQUE_PADDING,
        ]
    }
}

/// Measured extent of a message, plus where the ink starts relative to the pen.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TextExtent {
    /// ink width
    pub width: u32,
    /// ink height
    pub height: u32,
    /// pen-relative left of the ink
    pub left: i64,
    /// pen-relative top of the ink
    pub top: i64,
}

/// Font size for a canvas: `min(w, h) / 26`, floored per layout.
pub fn font_size(policy: LayoutPolicy, canvas_width: u32, canvas_height: u32) -> u32 {
    let base = canvas_width.min(canvas_height) / 26;
    let minimum = match policy {
        LayoutPolicy::Portrait => 24,
        LayoutPolicy::Landscape => 22,
        LayoutPolicy::Square | LayoutPolicy::Fallback => 26,
    };
    base.max(minimum)
}

/// Tight bounding box of the ink `face` produces for `text`.
pub fn measure(face: &Face, text: &str) -> TextExtent {
    let mut bounds: Option<(i64, i64, i64, i64)> = None;
    face.rasterize(text, |x, y, _| {
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    });

    match bounds {
        None => TextExtent::default(),
        Some((min_x, min_y, max_x, max_y)) => TextExtent {
            width: u32::try_from(max_x - min_x + 1).unwrap_or(u32::MAX),
            height: u32::try_from(max_y - min_y + 1).unwrap_or(u32::MAX),
            left: min_x,
            top: min_y,
        },
    }
}

/// Top-left of the ink box for a measured message.
pub fn text_position(
    policy: LayoutPolicy,
    canvas_width: u32,
    canvas_height: u32,
    text_width: u32,
    text_height: u32,
) -> (i64, i64) {
    let (cw, ch) = (i64::from(canvas_width), i64::from(canvas_height));
    let (tw, th) = (i64::from(text_width), i64::from(text_height));
    match policy {
        LayoutPolicy::Portrait => ((cw - tw).div_euclid(2), (f64::from(canvas_height) * 0.85) as i64),
        LayoutPolicy::Landscape => (EDGE_MARGIN, EDGE_MARGIN),
        LayoutPolicy::Square | LayoutPolicy::Fallback => {
            (cw - tw - EDGE_MARGIN, ch - th - EDGE_MARGIN)
        }
    }
}

/// Draws `message` onto the canvas and returns where its ink landed.
///
/// A message without ink (empty, or only spaces) draws nothing.
pub fn overlay_message(
    canvas: &mut RgbImage,
    message: &str,
    policy: LayoutPolicy,
    fonts: &dyn FontProvider,
) -> TextLayout {
    let (canvas_width, canvas_height) = canvas.dimensions();
    let face = select_face(fonts, font_size(policy, canvas_width, canvas_height));
    let extent = measure(&face, message);
    if extent.width == 0 || extent.height == 0 {
        return TextLayout::default();
    }

    let (x, y) = text_position(policy, canvas_width, canvas_height, extent.width, extent.height);
    let layout = TextLayout {
        x,
        y,
        width: extent.width,
        height: extent.height,
    };

    fill_rounded_rect(canvas, layout.plaque_bounds(), PLAQUE_RADIUS, PLAQUE_FILL);
    draw_text(
        canvas,
        &face,
        message,
        (x - extent.left + SHADOW_OFFSET, y - extent.top + SHADOW_OFFSET),
        SHADOW_FILL,
    );
    draw_text(canvas, &face, message, (x - extent.left, y - extent.top), TEXT_FILL);

    layout
}

/// Rasterizes `text` with its pen at `pen`, blending `color` by glyph coverage.
pub fn draw_text(canvas: &mut RgbImage, face: &Face, text: &str, pen: (i64, i64), color: Rgba<u8>) {
    face.rasterize(text, |x, y, coverage| {
        blend_pixel(canvas, pen.0 + x, pen.1 + y, color, coverage);
    });
}

/// Fills the inclusive box `[left, top, right, bottom]` with rounded corners.
pub fn fill_rounded_rect(canvas: &mut RgbImage, bounds: [i64; 4], radius: f32, color: Rgba<u8>) {
    let [left, top, right, bottom] = bounds;
    if right < left || bottom < top {
        return;
    }
    let (canvas_width, canvas_height) = canvas.dimensions();
    let x_range = left.max(0)..=right.min(i64::from(canvas_width) - 1);
    let y_range = top.max(0)..=bottom.min(i64::from(canvas_height) - 1);

    // pixel centres measured from the box centre
    let half_w = (right - left + 1) as f32 / 2.0;
    let half_h = (bottom - top + 1) as f32 / 2.0;
    let centre_x = left as f32 + half_w;
    let centre_y = top as f32 + half_h;

    for y in y_range {
        for x in x_range.clone() {
            let dx = x as f32 + 0.5 - centre_x;
            let dy = y as f32 + 0.5 - centre_y;
            if rounded_rect_dist(dx, dy, half_w, half_h, radius) <= 0.0 {
                blend_pixel(canvas, x, y, color, 1.0);
            }
        }
    }
}

/// Signed distance from a point to a rounded box centred on the origin.
fn rounded_rect_dist(px: f32, py: f32, half_w: f32, half_h: f32, radius: f32) -> f32 {
    let r = radius.min(half_w).min(half_h);
    let dx = px.abs() - half_w + r;
    let dy = py.abs() - half_h + r;
    (dx.max(0.0).powi(2) + dy.max(0.0).powi(2)).sqrt() + dx.max(dy).min(0.0) - r
}

/// Source-over blend of `color` scaled by `coverage`; ignores off-canvas points.
fn blend_pixel(canvas: &mut RgbImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x >= canvas.width() || y >= canvas.height() {
        return;
    }
    let alpha = f32::from(color.0[3]) / 255.0 * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let Rgb(existing) = *canvas.get_pixel(x, y);
    let mut blended = [0u8; 3];
    for (channel, (src, dst)) in blended.iter_mut().zip(color.0.iter().zip(existing)) {
        let value = f32::from(*src) * alpha + f32::from(dst) * (1.0 - alpha);
        *channel = value.round().clamp(0.0, 255.0) as u8;
    }
    canvas.put_pixel(x, y, Rgb(blended));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::font::BuiltinFonts;

    #[test]
    fn font_size_per_layout() {
        assert_eq!(font_size(LayoutPolicy::Square, 1024, 1024), 39);
        assert_eq!(font_size(LayoutPolicy::Portrait, 576, 1024), 24);
        assert_eq!(font_size(LayoutPolicy::Landscape, 1024, 576), 22);
        assert_eq!(font_size(LayoutPolicy::Square, 200, 200), 26);
        assert_eq!(font_size(LayoutPolicy::Fallback, 300, 300), 26);
        assert_eq!(font_size(LayoutPolicy::Landscape, 2600, 5200), 100);
    }

    #[test]
    fn positions_per_layout() {
        assert_eq!(text_position(LayoutPolicy::Portrait, 576, 1024, 100, 30), (238, 870));
        assert_eq!(text_position(LayoutPolicy::Landscape, 1024, 576, 100, 30), (20, 20));
        assert_eq!(text_position(LayoutPolicy::Square, 1024, 1024, 100, 30), (904, 974));
        assert_eq!(text_position(LayoutPolicy::Fallback, 800, 600, 100, 30), (680, 550));
    }

    #[test]
    fn measure_builtin_face() {
        let face = Face::Bitmap { scale: 1 };
        let extent = measure(&face, "I");
        assert!(extent.width > 0 && extent.width <= 8);
        assert!(extent.height > 0 && extent.height <= 8);
        assert_eq!(measure(&face, ""), TextExtent::default());
    }

    #[test]
    fn empty_message_draws_nothing() {
        let mut canvas = RgbImage::from_pixel(200, 200, Rgb([40, 80, 120]));
        let before = canvas.clone();
        let layout = overlay_message(&mut canvas, "", LayoutPolicy::Square, &BuiltinFonts);
        assert!(layout.is_empty());
        assert_eq!(canvas, before);
    }

    /// Every in-canvas pixel of the padding ring is darkened, apart from the
    /// rounded-off corners, and the pixels just outside the plaque are not.
    fn assert_plaque_ring(canvas: &RgbImage, layout: TextLayout, background: Rgb<u8>) {
        let (width, height) = canvas.dimensions();
        let pixel = |x: i64, y: i64| {
            let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
            (x < width && y < height).then(|| *canvas.get_pixel(x, y))
        };
        let [left, top, right, bottom] = layout.plaque_bounds();
        let ink_right = layout.x + i64::from(layout.width) - 1;
        let ink_bottom = layout.y + i64::from(layout.height) - 1;
        let corner = PLAQUE_RADIUS as i64;

        let mut checked = 0;
        for y in top..=bottom {
            for x in left..=right {
                let in_ink = (layout.x..=ink_right).contains(&x)
                    && (layout.y..=ink_bottom).contains(&y);
                let near_x_edge = x < left + corner || x > right - corner;
                let near_y_edge = y < top + corner || y > bottom - corner;
                if in_ink || (near_x_edge && near_y_edge) {
                    continue;
                }
                if let Some(value) = pixel(x, y) {
                    assert_ne!(value, background, "ring pixel {x},{y} untouched");
                    checked += 1;
                }
            }
        }
        assert!(checked > 0, "no ring pixel on the canvas");

        let middle_y = layout.y + i64::from(layout.height) / 2;
        let middle_x = layout.x + i64::from(layout.width) / 2;
        for (x, y) in [
            (left - 1, middle_y),
            (right + 1, middle_y),
            (middle_x, top - 1),
            (middle_x, bottom + 1),
        ] {
            if let Some(value) = pixel(x, y) {
                assert_eq!(value, background, "outside pixel {x},{y} darkened");
            }
        }
    }

    #[test]
    fn plaque_surrounds_ink_with_padding() {
        let background = Rgb([250, 250, 250]);
        for (policy, width, height) in [
            (LayoutPolicy::Square, 300, 300),
            (LayoutPolicy::Fallback, 100, 100),
            (LayoutPolicy::Portrait, 576, 1024),
            (LayoutPolicy::Landscape, 1024, 576),
        ] {
            let mut canvas = RgbImage::from_pixel(width, height, background);
            let layout = overlay_message(&mut canvas, "SALE", policy, &BuiltinFonts);
            assert!(!layout.is_empty(), "{policy:?}");
            assert_plaque_ring(&canvas, layout, background);
        }
    }

    #[test]
    fn outline_font_ink_stays_in_layout() {
        let path = std::path::Path::new("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf");
        if !path.exists() {
            return;
        }
        let fonts = crate::compositor::font::SystemFonts::with_paths(
            vec![path.to_path_buf()],
            Vec::new(),
        );
        assert!(!select_face(&fonts, 39).is_builtin());

        let background = Rgb([10, 60, 30]);
        for (policy, width, height) in [
            (LayoutPolicy::Square, 1024, 1024),
            (LayoutPolicy::Portrait, 576, 1024),
            (LayoutPolicy::Landscape, 1024, 576),
        ] {
            let mut canvas = RgbImage::from_pixel(width, height, background);
            let layout = overlay_message(&mut canvas, "Summer Sale", policy, &fonts);
            assert!(!layout.is_empty(), "{policy:?}");
            assert_eq!(
                (layout.x, layout.y),
                text_position(policy, width, height, layout.width, layout.height)
            );

            let mut white = 0;
            for (x, y, value) in canvas.enumerate_pixels() {
                if *value == Rgb([255, 255, 255]) {
                    white += 1;
                    let (x, y) = (i64::from(x), i64::from(y));
                    assert!(
                        x >= layout.x
                            && x < layout.x + i64::from(layout.width)
                            && y >= layout.y
                            && y < layout.y + i64::from(layout.height),
                        "{policy:?}: white ink at {x},{y} outside {layout:?}"
                    );
                }
            }
            assert!(white > 0, "{policy:?}");
            assert_plaque_ring(&canvas, layout, background);
        }
    }

    #[test]
    fn rounded_corners_leave_background() {
        let background = Rgb([255, 255, 255]);
        let mut canvas = RgbImage::from_pixel(40, 40, background);
        fill_rounded_rect(&mut canvas, [5, 5, 30, 30], 6.0, Rgba([0, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(5, 5), background);
        assert_eq!(*canvas.get_pixel(30, 30), background);
        assert_eq!(*canvas.get_pixel(5, 18), Rgb([0, 0, 0]));
        assert_eq!(*canvas.get_pixel(18, 30), Rgb([0, 0, 0]));
        assert_eq!(*canvas.get_pixel(4, 18), background);
        assert_eq!(*canvas.get_pixel(31, 18), background);
    }

    #[test]
    fn translucent_fill_blends() {
        let mut canvas = RgbImage::from_pixel(4, 4, Rgb([200, 100, 0]));
        fill_rounded_rect(&mut canvas, [0, 0, 3, 3], 0.0, PLAQUE_FILL);
        // 180/255 black over the base color
        assert_eq!(*canvas.get_pixel(1, 1), Rgb([59, 29, 0]));
    }

    #[test]
    fn text_is_white_over_plaque() {
        let mut canvas = RgbImage::from_pixel(300, 300, Rgb([0, 0, 200]));
        let layout = overlay_message(&mut canvas, "HI", LayoutPolicy::Landscape, &BuiltinFonts);
        assert_eq!((layout.x, layout.y), (20, 20));
        let has_white = (0..layout.height).any(|dy| {
            (0..layout.width).any(|dx| {
                *canvas.get_pixel(20 + dx, 20 + dy) == Rgb([255, 255, 255])
            })
        });
        assert!(has_white);
    }
}
