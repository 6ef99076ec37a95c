//! Regions, semantic fields and selection geometry.
//!
//! A [`Region`] is an axis-aligned rectangle in source-image pixel
//! coordinates. The four [`SemanticField`]s are the closed set of text roles
//! an edit can target; every per-field collection in the crate goes through
//! [`FieldRegions`] so that adding a field is a compile-time event, not a
//! string comparison.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A zero-area region counts as unset.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.x as f32 + self.width as f32 / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y as f32 + self.height as f32 / 2.0
    }

    /// Grow the rectangle by `pad` pixels on every side, clamping at zero.
    pub fn inflated(&self, pad: u32) -> Region {
        let x = self.x.saturating_sub(pad);
        let y = self.y.saturating_sub(pad);
        Region {
            x,
            y,
            width: self.width + (self.x - x) + pad,
            height: self.height + (self.y - y) + pad,
        }
    }

    /// Intersect with the image bounds. Returns `None` when nothing is left.
    pub fn clipped(&self, image_width: u32, image_height: u32) -> Option<Region> {
        if self.x >= image_width || self.y >= image_height {
            return None;
        }
        let width = self.width.min(image_width - self.x);
        let height = self.height.min(image_height - self.y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(Region {
            x: self.x,
            y: self.y,
            width,
            height,
        })
    }

    /// Scale by independent width/height ratios, rounding to nearest pixel.
    pub fn scaled(&self, fx: f64, fy: f64) -> Region {
        Region {
            x: (self.x as f64 * fx).round() as u32,
            y: (self.y as f64 * fy).round() as u32,
            width: (self.width as f64 * fx).round() as u32,
            height: (self.height as f64 * fy).round() as u32,
        }
    }
}

/// The closed set of text roles an edit can replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticField {
    #[serde(rename = "campaign")]
    CampaignTitle,
    #[serde(rename = "discount")]
    DiscountRate,
    #[serde(rename = "regularPrice")]
    RegularPrice,
    #[serde(rename = "hardPrice")]
    HardPrice,
}

impl SemanticField {
    /// Fixed processing order: title, discount, regular price, hard price.
    ///
    /// Overlapping regions are painted in this order, so the order itself is
    /// part of the rendering contract.
    pub const ORDER: [SemanticField; 4] = [
        SemanticField::CampaignTitle,
        SemanticField::DiscountRate,
        SemanticField::RegularPrice,
        SemanticField::HardPrice,
    ];

    /// True for the two price fields, which always render in accent red.
    pub fn is_price(&self) -> bool {
        matches!(self, SemanticField::RegularPrice | SemanticField::HardPrice)
    }

    /// Wire/display name, matching the stored template key.
    pub fn name(&self) -> &'static str {
        match self {
            SemanticField::CampaignTitle => "campaign",
            SemanticField::DiscountRate => "discount",
            SemanticField::RegularPrice => "regularPrice",
            SemanticField::HardPrice => "hardPrice",
        }
    }

    /// The field selected after this one in the selection workflow, wrapping.
    pub fn next(&self) -> SemanticField {
        match self {
            SemanticField::CampaignTitle => SemanticField::DiscountRate,
            SemanticField::DiscountRate => SemanticField::RegularPrice,
            SemanticField::RegularPrice => SemanticField::HardPrice,
            SemanticField::HardPrice => SemanticField::CampaignTitle,
        }
    }
}

/// Per-field region assignment. Absent fields are skipped on render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRegions {
    #[serde(default)]
    pub campaign: Option<Region>,
    #[serde(default)]
    pub discount: Option<Region>,
    #[serde(default, rename = "regularPrice")]
    pub regular_price: Option<Region>,
    #[serde(default, rename = "hardPrice")]
    pub hard_price: Option<Region>,
}

impl FieldRegions {
    pub fn get(&self, field: SemanticField) -> Option<Region> {
        match field {
            SemanticField::CampaignTitle => self.campaign,
            SemanticField::DiscountRate => self.discount,
            SemanticField::RegularPrice => self.regular_price,
            SemanticField::HardPrice => self.hard_price,
        }
    }

    pub fn set(&mut self, field: SemanticField, region: Option<Region>) {
        let slot = match field {
            SemanticField::CampaignTitle => &mut self.campaign,
            SemanticField::DiscountRate => &mut self.discount,
            SemanticField::RegularPrice => &mut self.regular_price,
            SemanticField::HardPrice => &mut self.hard_price,
        };
        *slot = region;
    }

    /// Iterate all four fields in processing order.
    pub fn iter(&self) -> impl Iterator<Item = (SemanticField, Option<Region>)> + '_ {
        SemanticField::ORDER.iter().map(|&f| (f, self.get(f)))
    }

    /// Fields that currently have a usable (non-empty) region.
    pub fn resolved_fields(&self) -> Vec<SemanticField> {
        self.iter()
            .filter(|(_, r)| r.is_some_and(|r| !r.is_empty()))
            .map(|(f, _)| f)
            .collect()
    }

    /// True when every field has a usable region.
    pub fn is_complete(&self) -> bool {
        self.resolved_fields().len() == SemanticField::ORDER.len()
    }

    /// True when no field has a usable region.
    pub fn is_unset(&self) -> bool {
        self.resolved_fields().is_empty()
    }
}

/// Minimum selection size accepted from a drag, in image pixels.
pub const MIN_SELECTION: u32 = 10;

/// Maps between display coordinates (a scaled-down on-screen preview) and
/// natural image coordinates.
///
/// The preview fits the image into a maximum display width and never scales
/// up, so `scale <= 1`.
#[derive(Debug, Clone, Copy)]
pub struct DisplayMapping {
    scale: f64,
}

impl DisplayMapping {
    /// Fit an image into `max_display_width` columns.
    pub fn fit(image_width: u32, max_display_width: u32) -> Self {
        let scale = if image_width == 0 {
            1.0
        } else {
            (max_display_width as f64 / image_width as f64).min(1.0)
        };
        Self { scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Display-space point to image-space point.
    pub fn to_image(&self, x: f64, y: f64) -> (f64, f64) {
        (x / self.scale, y / self.scale)
    }

    /// Image-space point to display-space point.
    pub fn to_display(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale, y * self.scale)
    }
}

/// Normalize a drag gesture (two display-space corners) into an image-space
/// region, rejecting selections under [`MIN_SELECTION`] in either dimension.
pub fn selection_from_drag(
    mapping: DisplayMapping,
    start: (f64, f64),
    end: (f64, f64),
) -> Option<Region> {
    let (sx, sy) = mapping.to_image(start.0, start.1);
    let (ex, ey) = mapping.to_image(end.0, end.1);

    let x = sx.min(ex).max(0.0);
    let y = sy.min(ey).max(0.0);
    let width = (ex - sx).abs();
    let height = (ey - sy).abs();

    let region = Region {
        x: x.round() as u32,
        y: y.round() as u32,
        width: width.round() as u32,
        height: height.round() as u32,
    };

    if region.width > MIN_SELECTION && region.height > MIN_SELECTION {
        Some(region)
    } else {
        None
    }
}
