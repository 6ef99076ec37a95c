//! Price arithmetic and replacement-text formatting.
//!
//! The catalog the reference banners advertise has two models with fixed
//! tax-included list prices; the campaign workflow takes a discount rate and
//! derives the sale prices from those.

/// Tax-included list price of the regular model, in yen.
pub const REGULAR_LIST_PRICE: u64 = 4_400;

/// Tax-included list price of the hard model, in yen.
pub const HARD_LIST_PRICE: u64 = 4_950;

/// Sale price after applying a percentage discount, rounded to the nearest
/// yen (half up, like `Math.round`).
pub fn discounted_price(original: u64, rate: u32) -> u64 {
    let rate = rate.min(100) as u64;
    (original * (100 - rate) + 50) / 100
}

/// Format an amount with thousands separators and a yen sign: `¥3,080`.
pub fn format_yen(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("¥{}", grouped)
}

/// Discount badge text: `30% OFF`. The space makes it split into the
/// two-line stacked badge when rendered.
pub fn format_discount(rate: u32) -> String {
    format!("{}% OFF", rate)
}

/// Preset campaign titles offered by the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignKind {
    Thanksgiving,
    Marathon,
    Custom(String),
    Default,
}

impl CampaignKind {
    /// Resolve a campaign type selection plus optional custom name, the way
    /// the upload form does.
    pub fn from_selection(kind: Option<&str>, custom_name: Option<&str>) -> CampaignKind {
        match kind {
            Some("custom") => match custom_name {
                Some(name) if !name.trim().is_empty() => {
                    CampaignKind::Custom(name.trim().to_string())
                }
                _ => CampaignKind::Default,
            },
            Some("thanksgiving") => CampaignKind::Thanksgiving,
            Some("marathon") => CampaignKind::Marathon,
            _ => CampaignKind::Default,
        }
    }

    /// The banner title for this campaign.
    pub fn title(&self) -> String {
        match self {
            CampaignKind::Thanksgiving => "大感謝祭 限定キャンペーン".to_string(),
            CampaignKind::Marathon => "お買い物マラソン限定キャンペーン".to_string(),
            CampaignKind::Custom(name) => name.clone(),
            CampaignKind::Default => "限定キャンペーン".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_discounted_price() {
        assert_eq!(discounted_price(REGULAR_LIST_PRICE, 30), 3_080);
        assert_eq!(discounted_price(HARD_LIST_PRICE, 30), 3_465);
        assert_eq!(discounted_price(REGULAR_LIST_PRICE, 20), 3_520);
        assert_eq!(discounted_price(HARD_LIST_PRICE, 20), 3_960);
        assert_eq!(discounted_price(1000, 0), 1000);
        assert_eq!(discounted_price(1000, 100), 0);
    }

    #[test]
    fn test_rounding_half_up() {
        // 999 * 0.85 = 849.15 -> 849; 999 * 0.15 discount
        assert_eq!(discounted_price(999, 15), 849);
        // 150 * 0.67 = 100.5 -> 101
        assert_eq!(discounted_price(150, 33), 101);
    }

    #[test]
    fn test_format_yen() {
        assert_eq!(format_yen(0), "¥0");
        assert_eq!(format_yen(980), "¥980");
        assert_eq!(format_yen(3_080), "¥3,080");
        assert_eq!(format_yen(1_234_567), "¥1,234,567");
    }

    #[test]
    fn test_format_discount_splits_in_two() {
        let text = format_discount(30);
        assert_eq!(text, "30% OFF");
        assert_eq!(text.split_whitespace().count(), 2);
    }

    #[test]
    fn test_campaign_selection() {
        assert_eq!(
            CampaignKind::from_selection(Some("thanksgiving"), None).title(),
            "大感謝祭 限定キャンペーン"
        );
        assert_eq!(
            CampaignKind::from_selection(Some("custom"), Some("春の大セール")).title(),
            "春の大セール"
        );
        // Custom without a name falls back to the default title.
        assert_eq!(
            CampaignKind::from_selection(Some("custom"), Some("  ")).title(),
            "限定キャンペーン"
        );
        assert_eq!(
            CampaignKind::from_selection(None, None).title(),
            "限定キャンペーン"
        );
    }
}
