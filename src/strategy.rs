//! Coordinate resolution strategies.
//!
//! Three interchangeable ways to answer "where are the text fields in this
//! image": caller-supplied rectangles, a text-recognition pass fed through
//! the classifier, and a fixed-ratio layout assumption. The orchestrator
//! tries them in that priority order; which strategy resolved a region also
//! decides how the renderer sizes and pads the replacement text.

use async_trait::async_trait;
use image::RgbImage;
use std::sync::Arc;
use tracing::debug;

use crate::classify::{ClassifierOptions, classify};
use crate::color::Rgb;
use crate::error::PancartaError;
use crate::geometry::{FieldRegions, Region, SemanticField};
use crate::recognize::TextRecognizer;

/// Provenance of a resolved region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Manually drawn rectangles; authoritative, highest precision.
    UserSpecified,
    /// Boxes recognized in the image and classified heuristically.
    Recognition,
    /// Fractional offsets of the image dimensions; last resort.
    FixedRatio,
}

impl StrategyKind {
    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::UserSpecified => "user",
            StrategyKind::Recognition => "recognition",
            StrategyKind::FixedRatio => "fixed-ratio",
        }
    }

    /// Pixels added around the region before erasing. Recognition boxes hug
    /// the glyphs, so they get the widest margin; fixed-ratio areas already
    /// include their own slack.
    pub(crate) fn erase_padding(&self) -> u32 {
        match self {
            StrategyKind::UserSpecified => 5,
            StrategyKind::Recognition => 10,
            StrategyKind::FixedRatio => 0,
        }
    }

    /// Sampler fallback color when no surrounding pixel is readable.
    pub(crate) fn sampler_fallback(&self) -> Rgb {
        match self {
            StrategyKind::UserSpecified => Rgb::WHITE,
            StrategyKind::Recognition | StrategyKind::FixedRatio => Rgb::GOLD,
        }
    }

    /// Left inset for price text within its region.
    pub(crate) fn price_inset(&self) -> u32 {
        match self {
            StrategyKind::FixedRatio => 0,
            _ => 10,
        }
    }

    /// Whether text is sized to fit the region (coordinate-driven paths) or
    /// by fixed point sizes scaled to the image width (fixed-ratio path).
    pub(crate) fn fits_to_region(&self) -> bool {
        !matches!(self, StrategyKind::FixedRatio)
    }
}

/// A resolved region together with the strategy that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRegion {
    pub region: Region,
    pub origin: StrategyKind,
}

/// Per-field resolution result.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    campaign: Option<ResolvedRegion>,
    discount: Option<ResolvedRegion>,
    regular_price: Option<ResolvedRegion>,
    hard_price: Option<ResolvedRegion>,
}

impl Resolution {
    pub fn get(&self, field: SemanticField) -> Option<ResolvedRegion> {
        match field {
            SemanticField::CampaignTitle => self.campaign,
            SemanticField::DiscountRate => self.discount,
            SemanticField::RegularPrice => self.regular_price,
            SemanticField::HardPrice => self.hard_price,
        }
    }

    pub fn set(&mut self, field: SemanticField, resolved: ResolvedRegion) {
        let slot = match field {
            SemanticField::CampaignTitle => &mut self.campaign,
            SemanticField::DiscountRate => &mut self.discount,
            SemanticField::RegularPrice => &mut self.regular_price,
            SemanticField::HardPrice => &mut self.hard_price,
        };
        *slot = Some(resolved);
    }

    /// Fields still without a region, in processing order.
    pub fn missing_fields(&self) -> Vec<SemanticField> {
        SemanticField::ORDER
            .iter()
            .copied()
            .filter(|&f| self.get(f).is_none())
            .collect()
    }

    /// Absorb `regions` for the listed fields, tagging them with `origin`.
    /// Empty regions are ignored (the field stays skipped).
    pub fn absorb(&mut self, fields: &[SemanticField], regions: &FieldRegions, origin: StrategyKind) {
        for &field in fields {
            if let Some(region) = regions.get(field)
                && !region.is_empty()
            {
                self.set(field, ResolvedRegion { region, origin });
            }
        }
    }
}

/// The common capability: resolve regions for one image.
#[async_trait]
pub trait RegionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Produce a per-field region map. Fields left `None` are skipped by the
    /// renderer. An error means the strategy as a whole produced nothing
    /// usable and the orchestrator should fall back.
    async fn resolve(&self, image: &RgbImage) -> Result<FieldRegions, PancartaError>;
}

/// Pass-through of caller-supplied rectangles.
pub struct UserSpecified {
    regions: FieldRegions,
}

impl UserSpecified {
    pub fn new(regions: FieldRegions) -> Self {
        Self { regions }
    }
}

#[async_trait]
impl RegionStrategy for UserSpecified {
    fn kind(&self) -> StrategyKind {
        StrategyKind::UserSpecified
    }

    async fn resolve(&self, _image: &RgbImage) -> Result<FieldRegions, PancartaError> {
        let mut regions = self.regions.clone();
        // Zero-area selections count as unset.
        for field in SemanticField::ORDER {
            if regions.get(field).is_some_and(|r| r.is_empty()) {
                regions.set(field, None);
            }
        }
        Ok(regions)
    }
}

/// Recognition pass fed through the target classifier.
pub struct RecognitionBased {
    recognizer: Arc<dyn TextRecognizer>,
    discount_rate: u32,
    options: ClassifierOptions,
}

impl RecognitionBased {
    pub fn new(
        recognizer: Arc<dyn TextRecognizer>,
        discount_rate: u32,
        options: ClassifierOptions,
    ) -> Self {
        Self {
            recognizer,
            discount_rate,
            options,
        }
    }
}

#[async_trait]
impl RegionStrategy for RecognitionBased {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Recognition
    }

    async fn resolve(&self, image: &RgbImage) -> Result<FieldRegions, PancartaError> {
        let fragments = self.recognizer.recognize(image).await?;
        if fragments.is_empty() {
            return Err(PancartaError::Recognition(
                "recognizer returned no fragments".to_string(),
            ));
        }
        debug!(count = fragments.len(), "recognition fragments");
        Ok(classify(&fragments, self.discount_rate, &self.options))
    }
}

/// Hard-coded layout assumption tuned to the reference banner design.
pub struct FixedRatio;

impl FixedRatio {
    /// Region fractions: (x, y, width, height) as shares of the image size.
    const FRACTIONS: [(SemanticField, [f64; 4]); 4] = [
        (SemanticField::CampaignTitle, [0.15, 0.08, 0.70, 0.10]),
        (SemanticField::DiscountRate, [0.18, 0.35, 0.15, 0.08]),
        (SemanticField::RegularPrice, [0.48, 0.61, 0.15, 0.05]),
        (SemanticField::HardPrice, [0.48, 0.78, 0.15, 0.05]),
    ];

    /// Compute all four regions for an image size. Never fails, never `None`.
    pub fn regions(image_width: u32, image_height: u32) -> FieldRegions {
        let w = image_width as f64;
        let h = image_height as f64;
        let mut regions = FieldRegions::default();
        for (field, [fx, fy, fw, fh]) in Self::FRACTIONS {
            regions.set(
                field,
                Some(Region {
                    x: (w * fx).round() as u32,
                    y: (h * fy).round() as u32,
                    width: (w * fw).round() as u32,
                    height: (h * fh).round() as u32,
                }),
            );
        }
        regions
    }
}

#[async_trait]
impl RegionStrategy for FixedRatio {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FixedRatio
    }

    async fn resolve(&self, image: &RgbImage) -> Result<FieldRegions, PancartaError> {
        Ok(Self::regions(image.width(), image.height()))
    }
}
