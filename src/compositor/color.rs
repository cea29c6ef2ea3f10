//! Average color sampling

use image::RgbImage;
use image::imageops::{self, FilterType};

/// Side length of the grid the source is shrunk to before averaging.
pub const SAMPLE_GRID: u32 = 50;

/// Mean color of an image, each channel truncated to an integer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AverageColor {
    /// red
    pub r: u8,
    /// green
    pub g: u8,
    /// blue
    pub b: u8,
}

impl AverageColor {
    /// Channels as an array, in RGB order.
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Shrinks the source to a 50x50 grid and averages every channel.
///
/// The source must be non-empty, which holds for anything that decoded.
pub fn average_color(source: &RgbImage) -> AverageColor {
    let sample = imageops::resize(source, SAMPLE_GRID, SAMPLE_GRID, FilterType::CatmullRom);

    let mut sums = [0u64; 3];
    for pixel in sample.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.0) {
            *sum += u64::from(channel);
        }
    }
    let count = u64::from(SAMPLE_GRID * SAMPLE_GRID);
    let [r, g, b] = sums.map(|sum| u8::try_from(sum / count).unwrap_or(u8::MAX));

    AverageColor { r, g, b }
}
