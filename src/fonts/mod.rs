//! Text rasterization onto RGB images.
//!
//! Two interchangeable faces:
//!
//! - [`BitmapFace`]: the built-in Spleen bitmap family, scaled to the target
//!   pixel height with nearest-neighbor. Ships with the crate, covers ASCII
//!   and Latin; characters outside its coverage render as box placeholders.
//! - [`TtfFace`]: an arbitrary TTF/OTF loaded at runtime (ab_glyph), for
//!   deployments that need full glyph coverage (e.g. a CJK font matching the
//!   original banner typography).
//!
//! Both draw with a solid foreground color at a caller-chosen pixel height;
//! bold is emulated with a double-strike offset.

mod bitmap;
mod ttf;

pub use bitmap::BitmapFace;
pub use ttf::TtfFace;

use std::path::Path;

use image::RgbImage;

use crate::color::Rgb;
use crate::error::PancartaError;

/// A text face that can measure and draw strings at arbitrary pixel heights.
pub enum Typeface {
    Bitmap(BitmapFace),
    Ttf(TtfFace),
}

impl Typeface {
    /// The zero-asset built-in bitmap face.
    pub fn builtin() -> Typeface {
        Typeface::Bitmap(BitmapFace::new())
    }

    /// Load a TTF/OTF font file from disk.
    pub fn from_ttf_file(path: impl AsRef<Path>) -> Result<Typeface, PancartaError> {
        Ok(Typeface::Ttf(TtfFace::from_file(path)?))
    }

    /// Pixel dimensions of `text` drawn at `px_height`.
    pub fn measure(&self, text: &str, px_height: f32) -> (u32, u32) {
        match self {
            Typeface::Bitmap(face) => face.measure(text, px_height),
            Typeface::Ttf(face) => face.measure(text, px_height),
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    ///
    /// Pixels outside the image are clipped, never panicked on.
    pub fn draw(
        &self,
        image: &mut RgbImage,
        text: &str,
        x: i64,
        y: i64,
        px_height: f32,
        color: Rgb,
        bold: bool,
    ) {
        match self {
            Typeface::Bitmap(face) => face.draw(image, text, x, y, px_height, color, bold),
            Typeface::Ttf(face) => face.draw(image, text, x, y, px_height, color, bold),
        }
    }
}

/// Set a pixel if it falls inside the image.
pub(crate) fn put_pixel_clipped(image: &mut RgbImage, x: i64, y: i64, color: Rgb) {
    if x >= 0 && y >= 0 && x < image.width() as i64 && y < image.height() as i64 {
        image.put_pixel(x as u32, y as u32, color.into());
    }
}

/// Alpha-blend a pixel toward `color` by `coverage` in `[0, 1]`.
pub(crate) fn blend_pixel_clipped(image: &mut RgbImage, x: i64, y: i64, color: Rgb, coverage: f32) {
    if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    let existing = *image.get_pixel(x as u32, y as u32);
    let blend = |bg: u8, fg: u8| -> u8 {
        (bg as f32 * (1.0 - coverage) + fg as f32 * coverage).round() as u8
    };
    image.put_pixel(
        x as u32,
        y as u32,
        image::Rgb([
            blend(existing.0[0], color.r),
            blend(existing.0[1], color.g),
            blend(existing.0[2], color.b),
        ]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_face_draws_ink() {
        let face = Typeface::builtin();
        let mut image = RgbImage::from_pixel(200, 60, Rgb::WHITE.into());
        face.draw(&mut image, "SALE", 4, 4, 32.0, Rgb::DARK_TEXT, false);
        let ink = image
            .pixels()
            .filter(|p| Rgb::from(**p) != Rgb::WHITE)
            .count();
        assert!(ink > 0, "text should leave non-background pixels");
    }

    #[test]
    fn test_measure_scales_with_height() {
        let face = Typeface::builtin();
        let (w24, h24) = face.measure("OFF", 24.0);
        let (w48, h48) = face.measure("OFF", 48.0);
        assert_eq!(h24, 24);
        assert_eq!(h48, 48);
        assert!(w48 > w24);
    }

    #[test]
    fn test_draw_clips_outside_image() {
        let face = Typeface::builtin();
        let mut image = RgbImage::from_pixel(40, 20, Rgb::WHITE.into());
        // Mostly off-canvas on every side; must not panic.
        face.draw(&mut image, "CLIP", -30, -10, 48.0, Rgb::ACCENT, true);
        face.draw(&mut image, "CLIP", 35, 15, 48.0, Rgb::ACCENT, true);
    }

    #[test]
    fn test_blend_pixel() {
        let mut image = RgbImage::from_pixel(2, 2, Rgb::new(0, 0, 0).into());
        blend_pixel_clipped(&mut image, 0, 0, Rgb::WHITE, 0.5);
        assert_eq!(Rgb::from(*image.get_pixel(0, 0)), Rgb::new(128, 128, 128));
        // Out of bounds is a no-op.
        blend_pixel_clipped(&mut image, 5, 5, Rgb::WHITE, 1.0);
    }
}
