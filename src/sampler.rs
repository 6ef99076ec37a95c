//! Background color sampling.
//!
//! Estimates the fill color surrounding a region by reading one pixel just
//! outside each corner and averaging. This feeds the erase step: the region
//! is repainted with the sampled color, so text sitting on a flat backdrop
//! disappears cleanly. No inpainting, no texture synthesis.

use image::RgbImage;

use crate::color::Rgb;
use crate::geometry::Region;

/// Distance in pixels between a region corner and its sample point.
pub const SAMPLE_MARGIN: i64 = 5;

/// Estimate the background color around `region`.
///
/// Takes one sample just outside each of the four corners; sample points that
/// fall outside the image are skipped. The result is the channel-wise
/// arithmetic mean of the valid samples, rounded to nearest. When no sample
/// point is valid (e.g. the region spans the whole image), returns `fallback`.
/// Never fails.
pub fn sample_background(image: &RgbImage, region: Region, fallback: Rgb) -> Rgb {
    let left = region.x as i64 - SAMPLE_MARGIN;
    let right = region.right() as i64 + SAMPLE_MARGIN;
    let top = region.y as i64 - SAMPLE_MARGIN;
    let bottom = region.bottom() as i64 + SAMPLE_MARGIN;

    let points = [
        (left, top),
        (right, top),
        (left, bottom),
        (right, bottom),
    ];

    let mut sum = [0u64; 3];
    let mut count = 0u64;

    for (x, y) in points {
        if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
            continue;
        }
        let pixel = image.get_pixel(x as u32, y as u32);
        sum[0] += pixel.0[0] as u64;
        sum[1] += pixel.0[1] as u64;
        sum[2] += pixel.0[2] as u64;
        count += 1;
    }

    if count == 0 {
        return fallback;
    }

    Rgb::new(
        ((sum[0] as f64 / count as f64).round()) as u8,
        ((sum[1] as f64 / count as f64).round()) as u8,
        ((sum[2] as f64 / count as f64).round()) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn solid(width: u32, height: u32, color: Rgb) -> RgbImage {
        RgbImage::from_pixel(width, height, color.into())
    }

    #[test]
    fn test_uniform_background() {
        let image = solid(200, 200, Rgb::new(40, 80, 120));
        let color = sample_background(&image, Region::new(50, 50, 60, 40), Rgb::WHITE);
        assert_eq!(color, Rgb::new(40, 80, 120));
    }

    #[test]
    fn test_channels_in_range_for_interior_regions() {
        let mut image = solid(100, 100, Rgb::new(10, 20, 30));
        image.put_pixel(14, 14, Rgb::new(250, 0, 0).into());
        let color = sample_background(&image, Region::new(19, 19, 30, 30), Rgb::WHITE);
        // One red corner averaged against three dark ones; always a valid byte.
        assert_eq!(color.r, 70);
        assert_eq!(color.g, 15);
        assert_eq!(color.b, 23);
    }

    #[test]
    fn test_fallback_when_region_covers_image() {
        let image = solid(120, 90, Rgb::new(1, 2, 3));
        let color = sample_background(&image, Region::new(0, 0, 120, 90), Rgb::GOLD);
        assert_eq!(color, Rgb::GOLD);
    }

    #[test]
    fn test_partial_corners_averaged() {
        // Region flush with the top-left corner: only the bottom-right sample
        // lands inside the image.
        let image = solid(100, 100, Rgb::new(200, 100, 50));
        let color = sample_background(&image, Region::new(0, 0, 50, 50), Rgb::WHITE);
        assert_eq!(color, Rgb::new(200, 100, 50));
    }

    #[test]
    fn test_mean_is_rounded() {
        let mut image = solid(100, 100, Rgb::new(0, 0, 0));
        // Make two of the four sample points white: mean channel = 127.5 -> 128.
        image.put_pixel(15, 15, Rgb::WHITE.into());
        image.put_pixel(65, 15, Rgb::WHITE.into());
        let color = sample_background(&image, Region::new(20, 20, 40, 40), Rgb::WHITE);
        assert_eq!(color, Rgb::new(128, 128, 128));
    }
}
