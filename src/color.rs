//! RGB color values and the banner palette.
//!
//! Banners from the source material follow a fixed convention: prices in
//! accent red, body text in near-black or white depending on the background
//! behind it. Brightness uses the ITU-R BT.601 luma weights.

use image::Rgb as ImageRgb;
use serde::{Deserialize, Serialize};

/// An RGB triple, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Accent red used for every price field (`#E60012`).
    pub const ACCENT: Rgb = Rgb::new(0xE6, 0x00, 0x12);

    /// Foreground for text on bright backgrounds (`#333333`).
    pub const DARK_TEXT: Rgb = Rgb::new(0x33, 0x33, 0x33);

    /// Foreground for text on dark backgrounds.
    pub const LIGHT_TEXT: Rgb = Rgb::WHITE;

    /// Default sampler fallback for coordinate-driven edits.
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Gold fallback matching the reference banner's backdrop.
    pub const GOLD: Rgb = Rgb::new(189, 170, 124);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceptual brightness in `[0, 255]`: `0.299r + 0.587g + 0.114b`.
    pub fn brightness(&self) -> f32 {
        (self.r as f32 * 299.0 + self.g as f32 * 587.0 + self.b as f32 * 114.0) / 1000.0
    }

    /// True when text drawn on this background should be dark.
    pub fn is_bright(&self) -> bool {
        self.brightness() > 128.0
    }

    /// Foreground color for non-price text over this background.
    pub fn contrasting_text(&self) -> Rgb {
        if self.is_bright() {
            Rgb::DARK_TEXT
        } else {
            Rgb::LIGHT_TEXT
        }
    }
}

impl From<Rgb> for ImageRgb<u8> {
    fn from(c: Rgb) -> Self {
        ImageRgb([c.r, c.g, c.b])
    }
}

impl From<ImageRgb<u8>> for Rgb {
    fn from(p: ImageRgb<u8>) -> Self {
        Rgb::new(p.0[0], p.0[1], p.0[2])
    }
}
