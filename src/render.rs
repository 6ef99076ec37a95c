//! Region erasure and replacement-text drawing.
//!
//! One call per semantic field: sample the surrounding background, repaint
//! the (padded) region with it, then draw the replacement string with the
//! field's conventions — titles and discounts centered, prices left-aligned
//! in accent red, discounts optionally stacked as a two-line badge.
//!
//! How a region was resolved changes the details: coordinate-driven regions
//! (user or recognition) size text to fit the box, while fixed-ratio regions
//! use fixed point sizes scaled to the image width, matching the reference
//! layout those ratios were tuned against.

use image::RgbImage;
use tracing::debug;

use crate::color::Rgb;
use crate::fonts::Typeface;
use crate::geometry::{Region, SemanticField};
use crate::sampler::sample_background;
use crate::strategy::StrategyKind;

/// Reference width the fixed-ratio point sizes were tuned against.
const REFERENCE_WIDTH: f32 = 1080.0;

/// Fit-to-box font size bounds in pixels.
const MIN_FONT_PX: f32 = 12.0;
const MAX_FONT_PX: f32 = 100.0;

/// Erase `region` and draw `text` in its place. Mutates the working image;
/// the edit is committed immediately, there is no rollback.
pub fn render_field(
    image: &mut RgbImage,
    region: Region,
    field: SemanticField,
    text: &str,
    face: &Typeface,
    origin: StrategyKind,
) {
    let (image_width, image_height) = image.dimensions();
    let Some(region) = region.clipped(image_width, image_height) else {
        return;
    };

    let padded = region
        .inflated(origin.erase_padding())
        .clipped(image_width, image_height)
        .unwrap_or(region);

    let background = sample_background(image, padded, origin.sampler_fallback());
    debug!(
        field = field.name(),
        strategy = origin.label(),
        r = background.r,
        g = background.g,
        b = background.b,
        "erasing region"
    );
    fill_region(image, padded, background);

    let color = if field.is_price() {
        Rgb::ACCENT
    } else {
        background.contrasting_text()
    };

    if origin.fits_to_region() {
        render_fitted(image, region, field, text, face, color, origin);
    } else {
        let scale = image_width as f32 / REFERENCE_WIDTH;
        render_scaled(image, region, field, text, face, color, scale);
    }
}

/// Repaint a rectangle with a solid color.
fn fill_region(image: &mut RgbImage, region: Region, color: Rgb) {
    for y in region.y..region.bottom().min(image.height()) {
        for x in region.x..region.right().min(image.width()) {
            image.put_pixel(x, y, color.into());
        }
    }
}

/// Font size that fits `text` into `region`, clamped to sane banner sizes.
fn fitted_font_size(region: Region, text: &str) -> f32 {
    let len = text.chars().count().max(1) as f32;
    let by_height = region.height as f32 * 0.6;
    let by_width = region.width as f32 / (len * 0.5);
    by_height.min(by_width).clamp(MIN_FONT_PX, MAX_FONT_PX)
}

/// Coordinate-driven path: size text to the region.
fn render_fitted(
    image: &mut RgbImage,
    region: Region,
    field: SemanticField,
    text: &str,
    face: &Typeface,
    color: Rgb,
    origin: StrategyKind,
) {
    let size = fitted_font_size(region, text);
    let cx = region.center_x();
    let cy = region.center_y();

    match field {
        SemanticField::CampaignTitle => {
            draw_centered(image, face, text, cx, cy, size, color);
        }
        SemanticField::DiscountRate => {
            let tokens: Vec<&str> = text.split_whitespace().collect();
            if let [number, unit] = tokens.as_slice() {
                draw_stacked(
                    image,
                    face,
                    number,
                    unit,
                    cx,
                    cy,
                    size,
                    region.height as f32,
                    color,
                );
            } else {
                draw_centered(image, face, text, cx, cy, size, color);
            }
        }
        SemanticField::RegularPrice | SemanticField::HardPrice => {
            let x = region.x as f32 + origin.price_inset() as f32;
            draw_left(image, face, text, x, cy, size, color);
        }
    }
}

/// Fixed-ratio path: fixed point sizes scaled to the image width.
fn render_scaled(
    image: &mut RgbImage,
    region: Region,
    field: SemanticField,
    text: &str,
    face: &Typeface,
    color: Rgb,
    scale: f32,
) {
    let cx = region.center_x();
    let cy = region.center_y();

    match field {
        SemanticField::CampaignTitle => {
            draw_centered(image, face, text, cx, cy, 36.0 * scale, color);
        }
        SemanticField::DiscountRate => {
            let tokens: Vec<&str> = text.split_whitespace().collect();
            if let [number, unit] = tokens.as_slice() {
                draw_stacked(
                    image,
                    face,
                    number,
                    unit,
                    cx,
                    cy,
                    37.0 * scale,
                    region.height as f32,
                    color,
                );
            } else {
                draw_centered(image, face, text, cx, cy, 48.0 * scale, color);
            }
        }
        SemanticField::RegularPrice | SemanticField::HardPrice => {
            draw_left(image, face, text, region.x as f32, cy, 32.0 * scale, color);
        }
    }
}

/// Draw text centered on `(cx, cy)`.
fn draw_centered(
    image: &mut RgbImage,
    face: &Typeface,
    text: &str,
    cx: f32,
    cy: f32,
    size: f32,
    color: Rgb,
) {
    let (width, height) = face.measure(text, size);
    let x = (cx - width as f32 / 2.0).round() as i64;
    let y = (cy - height as f32 / 2.0).round() as i64;
    face.draw(image, text, x, y, size, color, true);
}

/// Draw the two-line discount badge: the number token at 1.3x the base size
/// above the vertical center, the unit token at 0.7x below it, both centered
/// horizontally. Stacking leaves a small gap so the lines never merge, and
/// the base size is capped so the whole badge stays inside `max_height`.
#[allow(clippy::too_many_arguments)]
fn draw_stacked(
    image: &mut RgbImage,
    face: &Typeface,
    number: &str,
    unit: &str,
    cx: f32,
    cy: f32,
    base_size: f32,
    max_height: f32,
    color: Rgb,
) {
    let base_size = base_size.min(max_height * 0.45);
    let number_size = base_size * 1.3;
    let unit_size = base_size * 0.7;
    let gap = (base_size * 0.1).max(2.0);

    let (number_width, number_height) = face.measure(number, number_size);
    let (unit_width, unit_height) = face.measure(unit, unit_size);
    let total = number_height as f32 + gap + unit_height as f32;
    let top = cy - total / 2.0;

    let number_x = (cx - number_width as f32 / 2.0).round() as i64;
    face.draw(image, number, number_x, top.round() as i64, number_size, color, true);

    let unit_x = (cx - unit_width as f32 / 2.0).round() as i64;
    let unit_y = (top + number_height as f32 + gap).round() as i64;
    face.draw(image, unit, unit_x, unit_y, unit_size, color, true);
}

/// Draw text left-aligned at `x`, vertically centered on `cy`.
fn draw_left(
    image: &mut RgbImage,
    face: &Typeface,
    text: &str,
    x: f32,
    cy: f32,
    size: f32,
    color: Rgb,
) {
    let (_, height) = face.measure(text, size);
    let y = (cy - height as f32 / 2.0).round() as i64;
    face.draw(image, text, x.round() as i64, y, size, color, true);
}
