//! Built-in bitmap face backed by the Spleen font family.
//!
//! Glyphs come from the PSF2 bitmaps shipped in the `spleen-font` crate and
//! are scaled to the requested pixel height with nearest-neighbor, so the
//! face needs no font assets on disk. Spleen covers ASCII/Latin; characters
//! it lacks render as a box outline so layout stays intact.

use std::collections::HashMap;
use std::sync::Mutex;

use image::RgbImage;
use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};

use crate::color::Rgb;

use super::put_pixel_clipped;

/// Which Spleen bitmap a glyph is sourced from, picked by target height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SourceSize {
    /// 6x12, for targets up to 13px.
    Small,
    /// 8x16, for targets up to 18px.
    Medium,
    /// 12x24, for everything larger.
    Large,
}

impl SourceSize {
    fn for_height(px_height: f32) -> SourceSize {
        if px_height <= 13.0 {
            SourceSize::Small
        } else if px_height <= 18.0 {
            SourceSize::Medium
        } else {
            SourceSize::Large
        }
    }

    fn dimensions(&self) -> (usize, usize) {
        match self {
            SourceSize::Small => (6, 12),
            SourceSize::Medium => (8, 16),
            SourceSize::Large => (12, 24),
        }
    }
}

/// A source glyph bitmap: `width * height` cells of 0 (off) / 1 (on).
#[derive(Debug, Clone)]
struct Glyph {
    width: usize,
    height: usize,
    bits: Vec<u8>,
}

/// Bitmap face with a per-(size, char) glyph cache.
pub struct BitmapFace {
    cache: Mutex<HashMap<(SourceSize, char), Option<Glyph>>>,
}

impl BitmapFace {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Character cell width at a given pixel height (Spleen is 1:2).
    fn char_width(px_height: f32) -> u32 {
        (px_height / 2.0).round().max(1.0) as u32
    }

    pub fn measure(&self, text: &str, px_height: f32) -> (u32, u32) {
        let height = px_height.round().max(1.0) as u32;
        let width = text.chars().count() as u32 * Self::char_width(px_height);
        (width, height)
    }

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
        let source = SourceSize::for_height(px_height);
        let cell_height = px_height.round().max(1.0) as usize;
        let cell_width = Self::char_width(px_height) as usize;

        let mut caret = x;
        for ch in text.chars() {
            match self.glyph(source, ch) {
                Some(glyph) => {
                    self.draw_glyph(image, &glyph, caret, y, cell_width, cell_height, color, bold);
                }
                None => {
                    draw_box(image, caret, y, cell_width, cell_height, color);
                }
            }
            caret += cell_width as i64;
        }
    }

    /// Look up (or rasterize and cache) the source bitmap for a character.
    fn glyph(&self, source: SourceSize, ch: char) -> Option<Glyph> {
        let key = (source, ch);
        let mut cache = self.cache.lock().unwrap();
        if let Some(cached) = cache.get(&key) {
            return cached.clone();
        }

        let (width, height) = source.dimensions();
        let mut font = match source {
            SourceSize::Small => PSF2Font::new(FONT_6X12),
            SourceSize::Medium => PSF2Font::new(FONT_8X16),
            SourceSize::Large => PSF2Font::new(FONT_12X24),
        }
        .unwrap();
        let utf8 = ch.to_string();

        let glyph = font.glyph_for_utf8(utf8.as_bytes()).map(|rows| {
            let mut bits = vec![0u8; width * height];
            for (row_y, row) in rows.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if row_y < height && col_x < width {
                        bits[row_y * width + col_x] = if on { 1 } else { 0 };
                    }
                }
            }
            Glyph {
                width,
                height,
                bits,
            }
        });

        cache.insert(key, glyph.clone());
        glyph
    }

    /// Blit one glyph scaled to the target cell with nearest-neighbor.
    #[allow(clippy::too_many_arguments)]
    fn draw_glyph(
        &self,
        image: &mut RgbImage,
        glyph: &Glyph,
        x: i64,
        y: i64,
        cell_width: usize,
        cell_height: usize,
        color: Rgb,
        bold: bool,
    ) {
        // Double-strike distance grows with the scale so bold stays visible
        // at banner sizes.
        let strike = if bold {
            (cell_height / 24).max(1) as i64
        } else {
            0
        };

        for dy in 0..cell_height {
            for dx in 0..cell_width {
                let sx = dx * glyph.width / cell_width;
                let sy = dy * glyph.height / cell_height;
                if glyph.bits[sy * glyph.width + sx] == 0 {
                    continue;
                }
                put_pixel_clipped(image, x + dx as i64, y + dy as i64, color);
                for offset in 1..=strike {
                    put_pixel_clipped(image, x + dx as i64 + offset, y + dy as i64, color);
                }
            }
        }
    }
}

impl Default for BitmapFace {
    fn default() -> Self {
        Self::new()
    }
}

/// Box outline placeholder for characters the face cannot render.
fn draw_box(image: &mut RgbImage, x: i64, y: i64, width: usize, height: usize, color: Rgb) {
    for dx in 0..width {
        put_pixel_clipped(image, x + dx as i64, y, color);
        put_pixel_clipped(image, x + dx as i64, y + height as i64 - 1, color);
    }
    for dy in 0..height {
        put_pixel_clipped(image, x, y + dy as i64, color);
        put_pixel_clipped(image, x + width as i64 - 1, y + dy as i64, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_size_selection() {
        assert_eq!(SourceSize::for_height(12.0), SourceSize::Small);
        assert_eq!(SourceSize::for_height(16.0), SourceSize::Medium);
        assert_eq!(SourceSize::for_height(48.0), SourceSize::Large);
    }

    #[test]
    fn test_known_glyph_renders() {
        let face = BitmapFace::new();
        let mut image = RgbImage::from_pixel(60, 30, Rgb::WHITE.into());
        face.draw(&mut image, "A", 0, 0, 24.0, Rgb::DARK_TEXT, false);
        let ink = image
            .pixels()
            .filter(|p| Rgb::from(**p) == Rgb::DARK_TEXT)
            .count();
        assert!(ink > 0);
    }

    #[test]
    fn test_missing_glyph_draws_box() {
        let face = BitmapFace::new();
        let mut image = RgbImage::from_pixel(60, 60, Rgb::WHITE.into());
        // Spleen has no CJK coverage; the cell must still be marked.
        face.draw(&mut image, "感", 10, 10, 40.0, Rgb::DARK_TEXT, false);
        // Box outline corners.
        assert_eq!(Rgb::from(*image.get_pixel(10, 10)), Rgb::DARK_TEXT);
        assert_eq!(Rgb::from(*image.get_pixel(29, 49)), Rgb::DARK_TEXT);
    }

    #[test]
    fn test_bold_widens_strokes() {
        let face = BitmapFace::new();
        let mut plain = RgbImage::from_pixel(80, 60, Rgb::WHITE.into());
        let mut bold = RgbImage::from_pixel(80, 60, Rgb::WHITE.into());
        face.draw(&mut plain, "1", 0, 0, 48.0, Rgb::DARK_TEXT, false);
        face.draw(&mut bold, "1", 0, 0, 48.0, Rgb::DARK_TEXT, true);
        let count = |img: &RgbImage| {
            img.pixels()
                .filter(|p| Rgb::from(**p) == Rgb::DARK_TEXT)
                .count()
        };
        assert!(count(&bold) > count(&plain));
    }

    #[test]
    fn test_glyph_cache_hit() {
        let face = BitmapFace::new();
        let a = face.glyph(SourceSize::Large, 'A').unwrap();
        let b = face.glyph(SourceSize::Large, 'A').unwrap();
        assert_eq!(a.bits, b.bits);
        assert_eq!(face.cache.lock().unwrap().len(), 1);
    }
}
