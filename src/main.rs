//! # Pancarta CLI
//!
//! Command-line interface for banner text replacement.
//!
//! ## Usage
//!
//! ```bash
//! # Edit one banner, deriving sale prices from a 30% discount
//! pancarta edit banner.png --discount 30 --campaign thanksgiving -o out.png
//!
//! # Edit with user-drawn regions from a JSON file
//! pancarta edit banner.png --discount 30 --regions regions.json -o out.png
//!
//! # Edit with a saved coordinate template
//! pancarta edit banner.png --discount 30 --template spring -o out.png
//!
//! # Edit a batch of banners into a directory
//! pancarta batch a.png b.png c.png --discount 25 --out-dir edited/
//!
//! # Show the derived sale prices
//! pancarta prices --discount 30
//!
//! # Manage coordinate templates
//! pancarta template list
//! pancarta template export -o backup.json
//! pancarta template import backup.json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use pancarta::editor::{EditValues, Editor};
use pancarta::error::PancartaError;
use pancarta::fonts::Typeface;
use pancarta::geometry::FieldRegions;
use pancarta::pricing::{
    self, CampaignKind, HARD_LIST_PRICE, REGULAR_LIST_PRICE, discounted_price,
};
use pancarta::recognize::{HttpRecognizer, NullRecognizer, TextRecognizer};
use pancarta::resolve::ImageSource;
use pancarta::template::{JsonFileStore, TemplateStore};

/// Pancarta - banner text replacement utility
#[derive(Parser, Debug)]
#[command(name = "pancarta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Edit a single banner image
    Edit {
        /// Input image: file path, http(s) URL, or base64 data URI
        image: String,

        /// Output PNG path
        #[arg(short, long, default_value = "edited.png")]
        out: PathBuf,

        /// Discount rate in percent (0-100)
        #[arg(long)]
        discount: u32,

        /// Campaign preset: thanksgiving, marathon
        #[arg(long)]
        campaign: Option<String>,

        /// Custom campaign title (overrides --campaign)
        #[arg(long)]
        title: Option<String>,

        /// Explicit regular-model sale price (default: derived from list price)
        #[arg(long)]
        regular_price: Option<u64>,

        /// Explicit hard-model sale price (default: derived from list price)
        #[arg(long)]
        hard_price: Option<u64>,

        /// JSON file with user-drawn field regions
        #[arg(long, value_name = "FILE")]
        regions: Option<PathBuf>,

        /// Use a saved coordinate template by name
        #[arg(long, value_name = "NAME")]
        template: Option<String>,

        /// Rescale template regions to this image's size
        #[arg(long)]
        rescale: bool,

        /// Text-recognition service endpoint (omit to skip recognition)
        #[arg(long, value_name = "URL")]
        recognizer: Option<String>,

        /// Recognition language pair
        #[arg(long, default_value = "jpn+eng")]
        languages: String,

        /// TTF/OTF font for replacement text (default: built-in bitmap face)
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,

        /// Template store path
        #[arg(long, default_value = "templates.json")]
        store: PathBuf,
    },

    /// Edit several banners with the same values, one output per input
    Batch {
        /// Input images: file paths, URLs, or data URIs
        images: Vec<String>,

        /// Output directory
        #[arg(long, default_value = "edited")]
        out_dir: PathBuf,

        /// Discount rate in percent (0-100)
        #[arg(long)]
        discount: u32,

        /// Campaign preset: thanksgiving, marathon
        #[arg(long)]
        campaign: Option<String>,

        /// Custom campaign title (overrides --campaign)
        #[arg(long)]
        title: Option<String>,

        /// Text-recognition service endpoint (omit to skip recognition)
        #[arg(long, value_name = "URL")]
        recognizer: Option<String>,

        /// TTF/OTF font for replacement text
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,
    },

    /// Print the sale prices derived from a discount rate
    Prices {
        /// Discount rate in percent (0-100)
        #[arg(long)]
        discount: u32,
    },

    /// Manage saved coordinate templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,

        /// Template store path
        #[arg(long, default_value = "templates.json")]
        store: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum TemplateAction {
    /// List saved templates
    List,
    /// Show one template as JSON
    Show { name: String },
    /// Delete a template
    Delete { name: String },
    /// Export every template as one JSON document
    Export {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Import templates from an exported JSON document (overwrites on name collision)
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), PancartaError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Edit {
            image,
            out,
            discount,
            campaign,
            title,
            regular_price,
            hard_price,
            regions,
            template,
            rescale,
            recognizer,
            languages,
            font,
            store,
        } => {
            if discount > 100 {
                return Err(PancartaError::InvalidInput(
                    "discount rate must be between 0 and 100".to_string(),
                ));
            }

            let values = build_values(discount, campaign, title, regular_price, hard_price);
            let editor = build_editor(recognizer, Some(languages), font)?;

            let source = ImageSource::parse(&image);
            let user_regions =
                load_user_regions(regions, template, rescale, &store, &source).await?;

            let edited = editor
                .edit_source(&source, &values, user_regions.as_ref())
                .await?;
            std::fs::write(&out, &edited.png)?;
            println!(
                "Edited {}x{} banner written to {}",
                edited.width,
                edited.height,
                out.display()
            );
        }

        Commands::Batch {
            images,
            out_dir,
            discount,
            campaign,
            title,
            recognizer,
            font,
        } => {
            if images.is_empty() {
                return Err(PancartaError::InvalidInput(
                    "at least one input image is required".to_string(),
                ));
            }

            let values = build_values(discount, campaign, title, None, None);
            let editor = build_editor(recognizer, None, font)?;
            std::fs::create_dir_all(&out_dir)?;

            let sources: Vec<ImageSource> =
                images.iter().map(|s| ImageSource::parse(s)).collect();
            let results = editor.edit_batch(&sources, &values, None).await;

            let mut failures = 0usize;
            for (i, (source, result)) in sources.iter().zip(results).enumerate() {
                match result {
                    Ok(edited) => {
                        let path = out_dir.join(format!("banner_{}.png", i + 1));
                        std::fs::write(&path, &edited.png)?;
                        println!("{} -> {}", source.describe(), path.display());
                    }
                    Err(e) => {
                        failures += 1;
                        eprintln!("{}: {}", source.describe(), e);
                    }
                }
            }
            println!(
                "Done: {} edited, {} failed",
                sources.len() - failures,
                failures
            );
        }

        Commands::Prices { discount } => {
            if discount > 100 {
                return Err(PancartaError::InvalidInput(
                    "discount rate must be between 0 and 100".to_string(),
                ));
            }
            println!("Discount: {}%", discount);
            println!(
                "Regular: {} -> {}",
                pricing::format_yen(REGULAR_LIST_PRICE),
                pricing::format_yen(discounted_price(REGULAR_LIST_PRICE, discount))
            );
            println!(
                "Hard:    {} -> {}",
                pricing::format_yen(HARD_LIST_PRICE),
                pricing::format_yen(discounted_price(HARD_LIST_PRICE, discount))
            );
        }

        Commands::Template { action, store } => {
            let mut store = JsonFileStore::open(&store)?;
            match action {
                TemplateAction::List => {
                    let templates = store.list()?;
                    if templates.is_empty() {
                        println!("No saved templates");
                    }
                    for t in templates {
                        println!(
                            "{}  {}x{}  updated {}",
                            t.name,
                            t.image_width,
                            t.image_height,
                            t.updated_at.format("%Y-%m-%d %H:%M")
                        );
                    }
                }
                TemplateAction::Show { name } => {
                    let template = store.get(&name)?.ok_or_else(|| {
                        PancartaError::Template(format!("no template named '{}'", name))
                    })?;
                    let json = serde_json::to_string_pretty(&template)
                        .map_err(|e| PancartaError::Template(e.to_string()))?;
                    println!("{}", json);
                }
                TemplateAction::Delete { name } => {
                    if store.delete(&name)? {
                        println!("Deleted '{}'", name);
                    } else {
                        println!("No template named '{}'", name);
                    }
                }
                TemplateAction::Export { out } => {
                    let json = store.export_json()?;
                    match out {
                        Some(path) => {
                            std::fs::write(&path, json)?;
                            println!("Exported to {}", path.display());
                        }
                        None => println!("{}", json),
                    }
                }
                TemplateAction::Import { file } => {
                    let json = std::fs::read_to_string(&file)?;
                    let count = store.import_json(&json)?;
                    println!("Imported {} template(s)", count);
                }
            }
        }
    }

    Ok(())
}

/// Assemble edit values from CLI flags: explicit title beats the preset,
/// explicit prices beat the derived ones.
fn build_values(
    discount: u32,
    campaign: Option<String>,
    title: Option<String>,
    regular_price: Option<u64>,
    hard_price: Option<u64>,
) -> EditValues {
    let campaign_title = match title {
        Some(custom) => CampaignKind::Custom(custom).title(),
        None => CampaignKind::from_selection(campaign.as_deref(), None).title(),
    };

    let mut values = EditValues::from_discount(campaign_title, discount);
    if let Some(price) = regular_price {
        values.regular_price = price;
    }
    if let Some(price) = hard_price {
        values.hard_price = price;
    }
    values
}

/// Build an editor with the chosen recognizer and face.
fn build_editor(
    recognizer: Option<String>,
    languages: Option<String>,
    font: Option<PathBuf>,
) -> Result<Editor, PancartaError> {
    let recognizer: Arc<dyn TextRecognizer> = match recognizer {
        Some(endpoint) => {
            let mut http = HttpRecognizer::new(endpoint)?;
            if let Some(languages) = languages {
                http = http.with_languages(languages);
            }
            Arc::new(http)
        }
        None => Arc::new(NullRecognizer),
    };

    let mut editor = Editor::new(recognizer);
    if let Some(path) = font {
        editor = editor.with_face(Typeface::from_ttf_file(path)?);
    }
    Ok(editor)
}

/// Resolve user regions from an explicit regions file or a saved template.
async fn load_user_regions(
    regions: Option<PathBuf>,
    template: Option<String>,
    rescale: bool,
    store_path: &Path,
    source: &ImageSource,
) -> Result<Option<FieldRegions>, PancartaError> {
    if let Some(path) = regions {
        let json = std::fs::read_to_string(&path)?;
        let parsed: FieldRegions = serde_json::from_str(&json)
            .map_err(|e| PancartaError::Template(format!("invalid regions file: {}", e)))?;
        return Ok(Some(parsed));
    }

    let Some(name) = template else {
        return Ok(None);
    };

    let store = JsonFileStore::open(store_path)?;
    let template = store
        .get(&name)?
        .ok_or_else(|| PancartaError::Template(format!("no template named '{}'", name)))?;

    if rescale {
        // Rescaling needs the target dimensions up front.
        let client = reqwest::Client::new();
        let image = pancarta::resolve::load_image(source, &client).await?;
        Ok(Some(template.rescaled_for(image.width(), image.height())))
    } else {
        Ok(Some(template.areas))
    }
}
