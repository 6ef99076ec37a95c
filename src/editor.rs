//! Edit orchestration.
//!
//! One [`Editor::edit`] call takes a decoded banner, the replacement values
//! and optional user-drawn regions, resolves a region per semantic field by
//! strategy priority (user > recognition > fixed-ratio), then erases and
//! redraws each resolved field in fixed order. Batches run strictly one
//! image at a time; each image's outcome is reported independently.

use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::classify::ClassifierOptions;
use crate::error::PancartaError;
use crate::fonts::Typeface;
use crate::geometry::{FieldRegions, SemanticField};
use crate::pricing::{discounted_price, format_discount, format_yen, HARD_LIST_PRICE, REGULAR_LIST_PRICE};
use crate::recognize::TextRecognizer;
use crate::render::render_field;
use crate::resolve::{encode_png, load_image, png_data_uri, ImageSource};
use crate::strategy::{
    FixedRatio, RecognitionBased, RegionStrategy, Resolution, StrategyKind, UserSpecified,
};

/// Replacement values for one edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditValues {
    pub campaign_title: String,
    pub discount_rate: u32,
    /// Sale price of the regular model, in yen.
    pub regular_price: u64,
    /// Sale price of the hard model, in yen.
    pub hard_price: u64,
}

impl EditValues {
    /// Derive both sale prices from the catalog list prices.
    pub fn from_discount(campaign_title: impl Into<String>, discount_rate: u32) -> Self {
        Self {
            campaign_title: campaign_title.into(),
            discount_rate,
            regular_price: discounted_price(REGULAR_LIST_PRICE, discount_rate),
            hard_price: discounted_price(HARD_LIST_PRICE, discount_rate),
        }
    }

    /// The formatted string drawn for a field.
    pub fn replacement_text(&self, field: SemanticField) -> String {
        match field {
            SemanticField::CampaignTitle => self.campaign_title.clone(),
            SemanticField::DiscountRate => format_discount(self.discount_rate),
            SemanticField::RegularPrice => format_yen(self.regular_price),
            SemanticField::HardPrice => format_yen(self.hard_price),
        }
    }
}

/// The finished raster.
#[derive(Debug, Clone)]
pub struct EditedImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl EditedImage {
    /// The PNG wrapped as a data URI, the form the surrounding UI consumes.
    pub fn data_uri(&self) -> String {
        png_data_uri(&self.png)
    }
}

/// Top-level entry point for banner edits.
pub struct Editor {
    recognizer: Arc<dyn TextRecognizer>,
    face: Typeface,
    classifier: ClassifierOptions,
    client: reqwest::Client,
}

impl Editor {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            recognizer,
            face: Typeface::builtin(),
            classifier: ClassifierOptions::default(),
            client: reqwest::Client::new(),
        }
    }

    /// Replace the built-in bitmap face (e.g. with a runtime-loaded CJK TTF).
    pub fn with_face(mut self, face: Typeface) -> Self {
        self.face = face;
        self
    }

    pub fn with_classifier_options(mut self, options: ClassifierOptions) -> Self {
        self.classifier = options;
        self
    }

    /// Load, edit and encode a single image source.
    pub async fn edit_source(
        &self,
        source: &ImageSource,
        values: &EditValues,
        user_regions: Option<&FieldRegions>,
    ) -> Result<EditedImage, PancartaError> {
        let image = load_image(source, &self.client).await?;
        self.edit(&image, values, user_regions).await
    }

    /// Edit an already-decoded raster.
    ///
    /// The input is never mutated; all painting happens on a working copy.
    /// Fields without a resolved region are left untouched, not errors.
    pub async fn edit(
        &self,
        image: &RgbImage,
        values: &EditValues,
        user_regions: Option<&FieldRegions>,
    ) -> Result<EditedImage, PancartaError> {
        let mut working = image.clone();
        let resolution = self.resolve_regions(&working, values, user_regions).await;

        for field in SemanticField::ORDER {
            match resolution.get(field) {
                Some(resolved) => {
                    let text = values.replacement_text(field);
                    info!(
                        field = field.name(),
                        strategy = resolved.origin.label(),
                        text = %text,
                        "replacing field"
                    );
                    render_field(
                        &mut working,
                        resolved.region,
                        field,
                        &text,
                        &self.face,
                        resolved.origin,
                    );
                }
                None => debug!(field = field.name(), "no region resolved, skipping"),
            }
        }

        let png = encode_png(&working)?;
        Ok(EditedImage {
            width: working.width(),
            height: working.height(),
            png,
        })
    }

    /// Edit several sources one at a time, reporting each outcome
    /// independently. The sequential loop is intentional: it is the
    /// backpressure on the external recognition service.
    pub async fn edit_batch(
        &self,
        sources: &[ImageSource],
        values: &EditValues,
        user_regions: Option<&FieldRegions>,
    ) -> Vec<Result<EditedImage, PancartaError>> {
        let mut results = Vec::with_capacity(sources.len());
        for source in sources {
            let result = self.edit_source(source, values, user_regions).await;
            if let Err(e) = &result {
                warn!(source = %source.describe(), error = %e, "batch item failed");
            }
            results.push(result);
        }
        results
    }

    /// Resolve a region per field by strategy priority.
    ///
    /// User-supplied regions are authoritative for the fields they cover.
    /// Remaining fields go through recognition; if the whole recognition
    /// pass yields nothing usable, they land on the fixed-ratio layout.
    /// When the user covered all four fields the recognizer is never
    /// invoked.
    async fn resolve_regions(
        &self,
        image: &RgbImage,
        values: &EditValues,
        user_regions: Option<&FieldRegions>,
    ) -> Resolution {
        let mut resolution = Resolution::default();

        if let Some(user) = user_regions {
            let strategy = UserSpecified::new(user.clone());
            if let Ok(regions) = strategy.resolve(image).await {
                resolution.absorb(&SemanticField::ORDER, &regions, StrategyKind::UserSpecified);
            }
        }

        let missing = resolution.missing_fields();
        if missing.is_empty() {
            return resolution;
        }

        let recognition = RecognitionBased::new(
            self.recognizer.clone(),
            values.discount_rate,
            self.classifier.clone(),
        );
        match recognition.resolve(image).await {
            Ok(regions) => {
                resolution.absorb(&missing, &regions, StrategyKind::Recognition);
            }
            Err(e) => {
                warn!(error = %e, "recognition unavailable, using fixed-ratio layout");
                if let Ok(regions) = FixedRatio.resolve(image).await {
                    resolution.absorb(&missing, &regions, StrategyKind::FixedRatio);
                }
            }
        }

        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_values_from_discount() {
        let values = EditValues::from_discount("春の大セール", 30);
        assert_eq!(values.regular_price, 3_080);
        assert_eq!(values.hard_price, 3_465);
    }

    #[test]
    fn test_replacement_text_per_field() {
        let values = EditValues::from_discount("春の大セール", 30);
        assert_eq!(
            values.replacement_text(SemanticField::CampaignTitle),
            "春の大セール"
        );
        assert_eq!(
            values.replacement_text(SemanticField::DiscountRate),
            "30% OFF"
        );
        assert_eq!(
            values.replacement_text(SemanticField::RegularPrice),
            "¥3,080"
        );
        assert_eq!(values.replacement_text(SemanticField::HardPrice), "¥3,465");
    }
}
