//! Heuristic classification of recognized text fragments.
//!
//! Assigns each [`TextFragment`] produced by the recognition collaborator to
//! at most one [`SemanticField`], using position and content heuristics tuned
//! to the reference banner layout. The heuristics are deliberately simple:
//! substring and shape checks, no language model, no layout analysis.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{FieldRegions, Region, SemanticField};

/// A piece of text recognized in the source image.
///
/// Read-only observation from the external recognition collaborator; the
/// bounding box is in source-image pixel coordinates and confidence is a
/// percentage in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    #[serde(flatten)]
    pub region: Region,
    pub confidence: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, region: Region, confidence: f32) -> Self {
        Self {
            text: text.into(),
            region,
            confidence,
        }
    }
}

/// What to do when several price-like fragments land in the same bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep the first fragment seen per bucket (recognition order).
    #[default]
    FirstWins,
    /// Let later fragments overwrite earlier ones, reproducing the source's
    /// append-then-paint-over order where the last match ends up on top.
    LastWins,
}

/// Tuning knobs for [`classify`].
#[derive(Debug, Clone)]
pub struct ClassifierOptions {
    pub duplicate_policy: DuplicatePolicy,
    /// Discard fragments below this confidence before matching. `None`
    /// (default) matches confidence-blind, like the source.
    pub confidence_floor: Option<f32>,
    /// A title candidate must start above this y coordinate.
    pub title_max_y: u32,
    /// A title candidate must be at least this wide.
    pub title_min_width: u32,
    /// Price fragments above this y coordinate go to the regular-price
    /// bucket, the rest to the hard-price bucket.
    pub price_split_y: u32,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            confidence_floor: None,
            title_max_y: 200,
            title_min_width: 200,
            price_split_y: 400,
        }
    }
}

/// Tokens that mark a fragment as the campaign title.
const CAMPAIGN_KEYWORDS: [&str; 3] = ["キャンペーン", "限定", "感謝"];

/// Literal price strings from the reference banner family.
const KNOWN_PRICES: [&str; 4] = ["4,400", "4,950", "3,520", "3,960"];

/// Confidence above which fragments are logged for diagnostics.
const DIAGNOSTIC_CONFIDENCE: f32 = 60.0;

/// Assign fragments to semantic fields.
///
/// Title and discount go to the first qualifying fragment in recognition
/// order. Price-like fragments are split into an upper and a lower bucket at
/// `price_split_y`; within a bucket the duplicate policy decides which match
/// survives. Fragments never map to more than one field slot per call, and
/// an empty input yields an empty mapping.
pub fn classify(
    fragments: &[TextFragment],
    current_discount_rate: u32,
    options: &ClassifierOptions,
) -> FieldRegions {
    let mut targets = FieldRegions::default();

    for fragment in fragments {
        if fragment.confidence > DIAGNOSTIC_CONFIDENCE {
            debug!(
                text = %fragment.text,
                x = fragment.region.x,
                y = fragment.region.y,
                confidence = fragment.confidence,
                "recognized fragment"
            );
        }
    }

    let discount_token = current_discount_rate.to_string();

    for fragment in fragments {
        if let Some(floor) = options.confidence_floor
            && fragment.confidence < floor
        {
            continue;
        }

        if targets.campaign.is_none() && is_campaign_title(fragment, options) {
            targets.campaign = Some(fragment.region);
            continue;
        }

        if targets.discount.is_none() && is_discount(&fragment.text, &discount_token) {
            targets.discount = Some(fragment.region);
            continue;
        }

        if looks_like_price(&fragment.text) {
            let slot = if fragment.region.y < options.price_split_y {
                SemanticField::RegularPrice
            } else {
                SemanticField::HardPrice
            };
            let keep = match options.duplicate_policy {
                DuplicatePolicy::FirstWins => targets.get(slot).is_none(),
                DuplicatePolicy::LastWins => true,
            };
            if keep {
                targets.set(slot, Some(fragment.region));
            }
        }
    }

    targets
}

fn is_campaign_title(fragment: &TextFragment, options: &ClassifierOptions) -> bool {
    fragment.region.y < options.title_max_y
        && fragment.region.width > options.title_min_width
        && CAMPAIGN_KEYWORDS.iter().any(|k| fragment.text.contains(k))
}

fn is_discount(text: &str, discount_token: &str) -> bool {
    text.contains('%') || text.contains("OFF") || text.contains(discount_token)
}

/// Price shape: a digit run (commas allowed) ending in 円, a ¥-prefixed digit
/// run, or one of the known literal prices.
fn looks_like_price(text: &str) -> bool {
    if KNOWN_PRICES.iter().any(|p| text.contains(p)) {
        return true;
    }

    let chars: Vec<char> = text.chars().collect();
    for (i, &ch) in chars.iter().enumerate() {
        if ch == '円' && i > 0 {
            // Walk back over the digit/comma run and require at least one digit.
            let mut j = i;
            let mut digits = false;
            while j > 0 {
                let prev = chars[j - 1];
                if prev.is_ascii_digit() {
                    digits = true;
                    j -= 1;
                } else if prev == ',' {
                    j -= 1;
                } else {
                    break;
                }
            }
            if digits {
                return true;
            }
        }
        if (ch == '¥' || ch == '￥') && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
            return true;
        }
    }

    false
}
