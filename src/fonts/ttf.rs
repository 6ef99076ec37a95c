//! TTF/OTF face rendering via ab_glyph.
//!
//! Renders anti-aliased glyph coverage blended against whatever is already
//! on the canvas. The font file is supplied by the caller at runtime, which
//! is how deployments get full-coverage typography (the built-in bitmap face
//! has no CJK glyphs).

use std::path::Path;

use ab_glyph::{Font, FontArc, ScaleFont};
use image::RgbImage;

use crate::color::Rgb;
use crate::error::PancartaError;

use super::blend_pixel_clipped;

/// A runtime-loaded outline font.
#[derive(Debug)]
pub struct TtfFace {
    font: FontArc,
}

impl TtfFace {
    /// Load a font from a TTF/OTF file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<TtfFace, PancartaError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| PancartaError::Font(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_bytes(bytes)
    }

    /// Load a font from raw TTF/OTF bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<TtfFace, PancartaError> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| PancartaError::Font(format!("Failed to parse font: {}", e)))?;
        Ok(TtfFace { font })
    }

    pub fn measure(&self, text: &str, px_height: f32) -> (u32, u32) {
        let scaled = self.font.as_scaled(px_height);

        let mut width = 0.0f32;
        for ch in text.chars() {
            width += scaled.h_advance(self.font.glyph_id(ch));
        }

        let height = (scaled.ascent() - scaled.descent()).ceil();
        (width.ceil().max(1.0) as u32, height.max(1.0) as u32)
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
        let scaled = self.font.as_scaled(px_height);
        let baseline = scaled.ascent();

        // Layout: accumulate horizontal advances.
        let mut caret = 0.0f32;
        for ch in text.chars() {
            let glyph_id = self.font.glyph_id(ch);
            let glyph = glyph_id
                .with_scale_and_position(px_height, ab_glyph::point(caret, baseline));
            caret += scaled.h_advance(glyph_id);

            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let dx = px as i64 + bounds.min.x as i64;
                let dy = py as i64 + bounds.min.y as i64;
                blend_pixel_clipped(image, x + dx, y + dy, color, coverage);
                if bold {
                    // Single-pixel double strike; outline fonts have no
                    // synthetic weight axis here.
                    blend_pixel_clipped(image, x + dx + 1, y + dy, color, coverage);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_font_bytes_rejected() {
        let err = TtfFace::from_bytes(vec![0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, PancartaError::Font(_)));
    }

    #[test]
    fn test_missing_font_file() {
        let err = TtfFace::from_file("/nonexistent/banner-font.ttf").unwrap_err();
        assert!(matches!(err, PancartaError::Font(_)));
    }
}
