//! # Pancarta - Banner Text Replacement Library
//!
//! Pancarta rewrites the text regions of promotional banner rasters while
//! leaving the rest of the artwork untouched. Given a banner and four
//! semantic values (campaign title, discount rate, two sale prices) it:
//!
//! - **Locates** each field's rectangle: user-drawn coordinates, an external
//!   text-recognition pass, or a fixed-ratio layout fallback
//! - **Erases** the original text with a background color sampled around the
//!   region (solid fill, no inpainting)
//! - **Redraws** the replacement text with the banner's conventions: bold,
//!   size-to-fit, prices in accent red, discounts as a stacked badge
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use pancarta::{Editor, EditValues, NullRecognizer};
//! use pancarta::resolve::ImageSource;
//!
//! # async fn run() -> Result<(), pancarta::PancartaError> {
//! let editor = Editor::new(Arc::new(NullRecognizer));
//! let values = EditValues::from_discount("春の大セール", 30);
//!
//! let source = ImageSource::parse("banners/summer.png");
//! let edited = editor.edit_source(&source, &values, None).await?;
//! std::fs::write("out.png", &edited.png)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`editor`] | Edit orchestration and batch processing |
//! | [`strategy`] | Coordinate resolution strategies |
//! | [`classify`] | Text-fragment to field classification |
//! | [`sampler`] | Background color sampling |
//! | [`render`] | Region erasure and text drawing |
//! | [`fonts`] | Bitmap and TTF text faces |
//! | [`recognize`] | Text-recognition collaborator boundary |
//! | [`template`] | Named coordinate templates and persistence |
//! | [`pricing`] | Price arithmetic and formatting |
//! | [`resolve`] | Input decoding and PNG/data-URI output |
//! | [`error`] | Error types |
//!
//! Recognition-driven edits are not idempotent: once the original text has
//! been erased, a second pass has nothing to recognize and lands on the
//! fixed-ratio fallback. User-specified and fixed-ratio edits are.

pub mod classify;
pub mod color;
pub mod editor;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod pricing;
pub mod recognize;
pub mod render;
pub mod resolve;
pub mod sampler;
pub mod strategy;
pub mod template;

// Re-exports for convenience
pub use color::Rgb;
pub use editor::{EditValues, EditedImage, Editor};
pub use error::PancartaError;
pub use geometry::{FieldRegions, Region, SemanticField};
pub use recognize::{HttpRecognizer, NullRecognizer, TextRecognizer};
pub use template::{CoordinateTemplate, JsonFileStore, MemoryStore, TemplateStore};
