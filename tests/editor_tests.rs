//! # End-to-End Editor Tests
//!
//! Drive the full edit pipeline on synthetic rasters and check the
//! orchestration contract: strategy priority, fallback behavior, pixel
//! containment and output encoding. Recognition is stubbed with counting
//! collaborators so tests can assert exactly when it runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use image::RgbImage;

use pancarta::classify::TextFragment;
use pancarta::editor::{EditValues, Editor};
use pancarta::error::PancartaError;
use pancarta::geometry::{FieldRegions, Region, SemanticField};
use pancarta::Rgb;
use pancarta::recognize::TextRecognizer;
use pancarta::resolve::{ImageSource, encode_png};
use pancarta::strategy::FixedRatio;

/// Recognizer stub that counts invocations and returns canned fragments.
struct CountingRecognizer {
    calls: AtomicUsize,
    fragments: Vec<TextFragment>,
}

impl CountingRecognizer {
    fn new(fragments: Vec<TextFragment>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fragments,
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextRecognizer for CountingRecognizer {
    async fn recognize(&self, _image: &RgbImage) -> Result<Vec<TextFragment>, PancartaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.fragments.clone())
    }
}

/// Recognizer stub that fails like an unreachable service.
struct FailingRecognizer;

#[async_trait]
impl TextRecognizer for FailingRecognizer {
    async fn recognize(&self, _image: &RgbImage) -> Result<Vec<TextFragment>, PancartaError> {
        Err(PancartaError::Recognition("service unreachable".to_string()))
    }
}

fn white_banner(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb::WHITE.into())
}

/// Four non-overlapping regions sized generously for their text.
fn full_user_regions() -> FieldRegions {
    let mut regions = FieldRegions::default();
    regions.set(SemanticField::CampaignTitle, Some(Region::new(400, 60, 400, 80)));
    regions.set(SemanticField::DiscountRate, Some(Region::new(200, 280, 220, 200)));
    regions.set(SemanticField::RegularPrice, Some(Region::new(700, 550, 220, 60)));
    regions.set(SemanticField::HardPrice, Some(Region::new(700, 650, 220, 60)));
    regions
}

fn sample_values() -> EditValues {
    EditValues {
        campaign_title: "Spring Sale".to_string(),
        discount_rate: 30,
        regular_price: 3_080,
        hard_price: 3_465,
    }
}

fn region_contains(region: Region, x: u32, y: u32) -> bool {
    x >= region.x && x < region.right() && y >= region.y && y < region.bottom()
}

/// Pixels of `edited` that differ from `original`.
fn diff_pixels(original: &RgbImage, edited: &RgbImage) -> Vec<(u32, u32)> {
    let mut diffs = Vec::new();
    for y in 0..original.height() {
        for x in 0..original.width() {
            if original.get_pixel(x, y) != edited.get_pixel(x, y) {
                diffs.push((x, y));
            }
        }
    }
    diffs
}

#[tokio::test]
async fn test_user_regions_never_invoke_recognition() {
    let recognizer = CountingRecognizer::new(vec![TextFragment::new(
        "20% OFF",
        Region::new(10, 250, 80, 20),
        90.0,
    )]);
    let editor = Editor::new(recognizer.clone());
    let banner = white_banner(1200, 800);

    let edited = editor
        .edit(&banner, &sample_values(), Some(&full_user_regions()))
        .await
        .unwrap();

    assert_eq!(recognizer.call_count(), 0);
    assert!(!edited.png.is_empty());
}

#[tokio::test]
async fn test_partial_user_regions_fall_through_to_recognition() {
    let recognizer = CountingRecognizer::new(vec![TextFragment::new(
        "30% OFF",
        Region::new(210, 300, 120, 60),
        88.0,
    )]);
    let editor = Editor::new(recognizer.clone());
    let banner = white_banner(1200, 800);

    let mut partial = FieldRegions::default();
    partial.set(SemanticField::CampaignTitle, Some(Region::new(400, 60, 400, 80)));

    editor
        .edit(&banner, &sample_values(), Some(&partial))
        .await
        .unwrap();

    assert_eq!(recognizer.call_count(), 1);
}

#[tokio::test]
async fn test_zero_fragments_fall_back_to_fixed_ratio() {
    let recognizer = CountingRecognizer::new(vec![]);
    let editor = Editor::new(recognizer.clone());
    let banner = white_banner(1200, 800);

    let edited = editor.edit(&banner, &sample_values(), None).await.unwrap();
    assert_eq!(recognizer.call_count(), 1);

    let output = image::load_from_memory(&edited.png).unwrap().to_rgb8();
    let fixed = FixedRatio::regions(1200, 800);
    let rects: Vec<Region> = SemanticField::ORDER
        .iter()
        .map(|&f| fixed.get(f).unwrap())
        .collect();

    let diffs = diff_pixels(&banner, &output);
    assert!(!diffs.is_empty(), "fallback edit must draw something");
    for &(x, y) in &diffs {
        assert!(
            rects.iter().any(|&r| region_contains(r, x, y)),
            "pixel ({}, {}) changed outside every fixed-ratio rectangle",
            x,
            y
        );
    }
    // Every field's rectangle received ink.
    for &rect in &rects {
        assert!(
            diffs.iter().any(|&(x, y)| region_contains(rect, x, y)),
            "no ink inside fixed-ratio rectangle {:?}",
            rect
        );
    }
}

#[tokio::test]
async fn test_recognition_failure_also_falls_back() {
    let editor = Editor::new(Arc::new(FailingRecognizer));
    let banner = white_banner(1080, 1080);

    let edited = editor.edit(&banner, &sample_values(), None).await.unwrap();
    let output = image::load_from_memory(&edited.png).unwrap().to_rgb8();
    assert!(!diff_pixels(&banner, &output).is_empty());
}

#[tokio::test]
async fn test_recognized_fragments_drive_the_edit() {
    let recognizer = CountingRecognizer::new(vec![TextFragment::new(
        "20% OFF",
        Region::new(100, 250, 80, 20),
        90.0,
    )]);
    let editor = Editor::new(recognizer.clone());
    let banner = white_banner(800, 600);

    let mut values = sample_values();
    values.discount_rate = 20;
    let edited = editor.edit(&banner, &values, None).await.unwrap();
    assert_eq!(recognizer.call_count(), 1);

    let output = image::load_from_memory(&edited.png).unwrap().to_rgb8();
    let diffs = diff_pixels(&banner, &output);
    assert!(!diffs.is_empty());

    // Recognition succeeded, so unmapped fields are skipped (no fixed-ratio
    // layout): every changed pixel stays inside the erased discount area.
    let erased = Region::new(100, 250, 80, 20).inflated(10);
    for &(x, y) in &diffs {
        assert!(
            region_contains(erased, x, y),
            "pixel ({}, {}) changed outside the recognized discount area",
            x,
            y
        );
    }
}

#[tokio::test]
async fn test_output_dimensions_survive_round_trip() {
    let editor = Editor::new(CountingRecognizer::new(vec![]));
    let banner = white_banner(1234, 567);

    let edited = editor.edit(&banner, &sample_values(), None).await.unwrap();
    assert_eq!((edited.width, edited.height), (1234, 567));

    let decoded = image::load_from_memory(&edited.png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1234, 567));
}

#[tokio::test]
async fn test_pixels_outside_user_regions_untouched() {
    let editor = Editor::new(CountingRecognizer::new(vec![]));
    let banner = white_banner(1200, 800);
    let regions = full_user_regions();

    let edited = editor
        .edit(&banner, &sample_values(), Some(&regions))
        .await
        .unwrap();
    let output = image::load_from_memory(&edited.png).unwrap().to_rgb8();

    let rects: Vec<Region> = SemanticField::ORDER
        .iter()
        .map(|&f| regions.get(f).unwrap())
        .collect();
    let diffs = diff_pixels(&banner, &output);
    assert!(!diffs.is_empty());
    for &(x, y) in &diffs {
        assert!(
            rects.iter().any(|&r| region_contains(r, x, y)),
            "pixel ({}, {}) changed outside every user region",
            x,
            y
        );
    }
    for &rect in &rects {
        assert!(
            diffs.iter().any(|&(x, y)| region_contains(rect, x, y)),
            "no ink inside user region {:?}",
            rect
        );
    }
}

#[tokio::test]
async fn test_discount_renders_two_stacked_lines() {
    let editor = Editor::new(CountingRecognizer::new(vec![]));
    let banner = white_banner(1200, 800);
    let regions = full_user_regions();
    let discount = regions.get(SemanticField::DiscountRate).unwrap();

    let edited = editor
        .edit(&banner, &sample_values(), Some(&regions))
        .await
        .unwrap();
    let output = image::load_from_memory(&edited.png).unwrap().to_rgb8();

    // Collect rows of the discount region containing ink; two stacked lines
    // show up as two bands separated by at least one blank row.
    let mut ink_rows = Vec::new();
    for y in discount.y..discount.bottom() {
        let has_ink = (discount.x..discount.right())
            .any(|x| Rgb::from(*output.get_pixel(x, y)) != Rgb::WHITE);
        if has_ink {
            ink_rows.push(y);
        }
    }
    assert!(!ink_rows.is_empty());
    let gaps = ink_rows.windows(2).filter(|w| w[1] - w[0] > 1).count();
    assert!(gaps >= 1, "discount badge should render as two lines");
}

#[tokio::test]
async fn test_user_region_edit_is_idempotent() {
    let editor = Editor::new(CountingRecognizer::new(vec![]));
    let banner = white_banner(1200, 800);
    let regions = full_user_regions();
    let values = sample_values();

    let first = editor.edit(&banner, &values, Some(&regions)).await.unwrap();
    let first_image = image::load_from_memory(&first.png).unwrap().to_rgb8();
    let second = editor
        .edit(&first_image, &values, Some(&regions))
        .await
        .unwrap();

    assert_eq!(first.png, second.png);
}

#[tokio::test]
async fn test_edit_source_accepts_data_uri() {
    let editor = Editor::new(CountingRecognizer::new(vec![]));
    let banner = white_banner(320, 240);
    let png = encode_png(&banner).unwrap();
    let uri = pancarta::resolve::png_data_uri(&png);

    let edited = editor
        .edit_source(&ImageSource::parse(&uri), &sample_values(), None)
        .await
        .unwrap();
    assert_eq!((edited.width, edited.height), (320, 240));
    assert!(edited.data_uri().starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_batch_reports_failures_per_image() {
    let editor = Editor::new(CountingRecognizer::new(vec![]));
    let good = ImageSource::Bytes(encode_png(&white_banner(64, 64)).unwrap());
    let bad = ImageSource::Bytes(vec![0u8; 12]);

    let results = editor
        .edit_batch(
            &[good, bad, ImageSource::Bytes(encode_png(&white_banner(32, 32)).unwrap())],
            &sample_values(),
            Some(&full_user_regions()),
        )
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(PancartaError::Decode(_))));
    assert!(results[2].is_ok());
}

#[tokio::test]
async fn test_decode_failure_is_fatal() {
    let editor = Editor::new(CountingRecognizer::new(vec![]));
    let err = editor
        .edit_source(&ImageSource::Bytes(vec![1, 2, 3]), &sample_values(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, PancartaError::Decode(_)));
}
