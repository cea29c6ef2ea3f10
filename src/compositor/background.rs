//! Gradient backgrounds tinted with the source's average color

use image::{Rgb, RgbImage};

use super::color::AverageColor;

/// Brightness of the top row, relative to the sampled color.
const TOP_BRIGHTNESS: f64 = 0.7;
/// How much brightness is added from top to bottom.
const BRIGHTNESS_SPAN: f64 = 0.3;

/// Color of row `y` in a canvas `height` rows tall.
///
/// Scales every channel by `0.7 + (y / height) * 0.3`, truncating and
/// clamping to `0..=255`.
pub fn row_color(avg: AverageColor, y: u32, height: u32) -> Rgb<u8> {
    let factor = if height == 0 {
        0.0
    } else {
        f64::from(y) / f64::from(height)
    };
    let scale = TOP_BRIGHTNESS + factor * BRIGHTNESS_SPAN;
    Rgb(avg
        .channels()
        .map(|channel| (f64::from(channel) * scale).trunc().clamp(0.0, 255.0) as u8))
}

/// Allocates a canvas filled with a vertical gradient, darkest at the top.
pub fn gradient_canvas(width: u32, height: u32, avg: AverageColor) -> RgbImage {
    let mut canvas = RgbImage::new(width, height);
    let row_len = width as usize * 3;
    if row_len == 0 {
        return canvas;
    }
    for (y, row) in canvas.chunks_exact_mut(row_len).enumerate() {
        let Rgb(color) = row_color(avg, y as u32, height);
        for pixel in row.chunks_exact_mut(3) {
            pixel.copy_from_slice(&color);
        }
    }
    canvas
}
