//! Scaling and positioning the source photo on the canvas

use image::RgbImage;
use image::imageops::{self, FilterType};

use super::LayoutPolicy;

/// Where the (possibly scaled) source goes.
///
/// Offsets are signed, a scaled copy wider than the canvas gets a negative `x`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlacementResult {
    /// left edge on the canvas
    pub x: i64,
    /// top edge on the canvas
    pub y: i64,
}

/// Scales the source per the layout policy, borrowing it when no resize happens.
pub fn scale_for_canvas<'a>(
    source: &'a RgbImage,
    policy: LayoutPolicy,
    canvas_width: u32,
    canvas_height: u32,
) -> std::borrow::Cow<'a, RgbImage> {
    use std::borrow::Cow;

    let (width, height) = source.dimensions();
    let target = match policy {
        LayoutPolicy::Portrait => {
            let scale = f64::from(canvas_width) / f64::from(width);
            Some((canvas_width, scaled_side(height, scale)))
        }
        LayoutPolicy::Landscape => {
            let scale = f64::from(canvas_height) / f64::from(height);
            Some((scaled_side(width, scale), canvas_height))
        }
        LayoutPolicy::Square | LayoutPolicy::Fallback => None,
    };

    match target {
        Some((new_width, new_height)) if (new_width, new_height) != (width, height) => Cow::Owned(
            imageops::resize(source, new_width, new_height, FilterType::Lanczos3),
        ),
        _ => Cow::Borrowed(source),
    }
}

/// Paste offset for an already scaled image.
pub fn paste_position(
    policy: LayoutPolicy,
    image_width: u32,
    image_height: u32,
    canvas_width: u32,
    canvas_height: u32,
) -> PlacementResult {
    let centered =
        |canvas: u32, image: u32| (i64::from(canvas) - i64::from(image)).div_euclid(2);
    match policy {
        LayoutPolicy::Portrait => PlacementResult {
            x: centered(canvas_width, image_width),
            y: (f64::from(canvas_height) * 0.1) as i64,
        },
        LayoutPolicy::Landscape => PlacementResult {
            x: centered(canvas_width, image_width),
            y: centered(canvas_height, image_height),
        },
        LayoutPolicy::Square | LayoutPolicy::Fallback => PlacementResult { x: 0, y: 0 },
    }
}

/// Hard-overwrites the canvas under the image footprint, cropping what falls outside.
pub fn paste(canvas: &mut RgbImage, image: &RgbImage, at: PlacementResult) {
    imageops::replace(canvas, image, at.x, at.y);
}

fn scaled_side(side: u32, scale: f64) -> u32 {
    ((f64::from(side) * scale) as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn checker(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 { Rgb([250, 10, 10]) } else { Rgb([10, 10, 250]) }
        })
    }

    #[test]
    fn square_keeps_source_untouched() {
        let source = checker(800, 600);
        let scaled = scale_for_canvas(&source, LayoutPolicy::Square, 1024, 1024);
        assert!(matches!(scaled, std::borrow::Cow::Borrowed(_)));
        assert_eq!(
            paste_position(LayoutPolicy::Square, 800, 600, 1024, 1024),
            PlacementResult { x: 0, y: 0 }
        );
    }

    #[test]
    fn portrait_fits_width_and_sits_below_top() {
        let source = checker(800, 600);
        let scaled = scale_for_canvas(&source, LayoutPolicy::Portrait, 576, 1024);
        assert_eq!(scaled.dimensions(), (576, 432));
        assert_eq!(
            paste_position(LayoutPolicy::Portrait, 576, 432, 576, 1024),
            PlacementResult { x: 0, y: 102 }
        );
    }

    #[test]
    fn landscape_fits_height_and_centers() {
        let source = checker(800, 600);
        let scaled = scale_for_canvas(&source, LayoutPolicy::Landscape, 1024, 576);
        assert_eq!(scaled.dimensions(), (768, 576));
        assert_eq!(
            paste_position(LayoutPolicy::Landscape, 768, 576, 1024, 576),
            PlacementResult { x: 128, y: 0 }
        );
    }

    #[test]
    fn overflowing_images_get_negative_offsets() {
        // a panorama scaled to 576 tall is wider than the canvas
        let source = checker(3000, 1000);
        let scaled = scale_for_canvas(&source, LayoutPolicy::Landscape, 1024, 576);
        assert_eq!(scaled.dimensions(), (1728, 576));
        let at = paste_position(LayoutPolicy::Landscape, 1728, 576, 1024, 576);
        assert_eq!(at, PlacementResult { x: -352, y: 0 });

        // odd differences floor towards negative infinity
        let at = paste_position(LayoutPolicy::Landscape, 1025, 577, 1024, 576);
        assert_eq!(at, PlacementResult { x: -1, y: -1 });
    }

    #[test]
    fn unknown_ratio_falls_back_to_origin() {
        let source = checker(640, 480);
        let scaled = scale_for_canvas(&source, LayoutPolicy::Fallback, 800, 600);
        assert_eq!(scaled.dimensions(), (640, 480));
        assert_eq!(
            paste_position(LayoutPolicy::Fallback, 640, 480, 800, 600),
            PlacementResult { x: 0, y: 0 }
        );
    }

    #[test]
    fn paste_overwrites_and_crops() {
        let mut canvas = RgbImage::from_pixel(10, 10, Rgb([1, 2, 3]));
        let image = RgbImage::from_pixel(6, 6, Rgb([200, 200, 200]));
        paste(&mut canvas, &image, PlacementResult { x: 7, y: -2 });

        assert_eq!(*canvas.get_pixel(7, 0), Rgb([200, 200, 200]));
        assert_eq!(*canvas.get_pixel(9, 3), Rgb([200, 200, 200]));
        assert_eq!(*canvas.get_pixel(9, 4), Rgb([1, 2, 3]));
        assert_eq!(*canvas.get_pixel(6, 0), Rgb([1, 2, 3]));
    }
}
