//! Coordinate templates: named, persisted field-region layouts.
//!
//! A template records the four field regions a user drew for one banner
//! design, plus the reference image's dimensions. Storage is a small
//! key-value interface so sessions, tests and the CLI can pick in-memory or
//! file-backed persistence; either way it is local, single-user storage.
//!
//! Templates are applied unscaled by default, even to images of a different
//! size — that reproduces the source behavior, warts and all. Callers that
//! want scale correction opt in via [`CoordinateTemplate::rescaled_for`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PancartaError;
use crate::geometry::{FieldRegions, SemanticField};

/// A named mapping of semantic fields to regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateTemplate {
    pub name: String,
    pub areas: FieldRegions,
    #[serde(rename = "imageWidth")]
    pub image_width: u32,
    #[serde(rename = "imageHeight")]
    pub image_height: u32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl CoordinateTemplate {
    pub fn new(
        name: impl Into<String>,
        areas: FieldRegions,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            areas,
            image_width,
            image_height,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fields the template leaves unset, for the pre-save warning.
    pub fn unset_fields(&self) -> Vec<SemanticField> {
        SemanticField::ORDER
            .iter()
            .copied()
            .filter(|&f| self.areas.get(f).is_none_or(|r| r.is_empty()))
            .collect()
    }

    /// Opt-in scale correction: regions scaled by the ratio between the
    /// target image size and the template's reference size.
    pub fn rescaled_for(&self, image_width: u32, image_height: u32) -> FieldRegions {
        if self.image_width == 0 || self.image_height == 0 {
            return self.areas.clone();
        }
        let fx = image_width as f64 / self.image_width as f64;
        let fy = image_height as f64 / self.image_height as f64;

        let mut scaled = FieldRegions::default();
        for (field, region) in self.areas.iter() {
            scaled.set(field, region.map(|r| r.scaled(fx, fy)));
        }
        scaled
    }
}

/// Key-value persistence for coordinate templates, by exact name.
pub trait TemplateStore {
    fn get(&self, name: &str) -> Result<Option<CoordinateTemplate>, PancartaError>;
    fn put(&mut self, template: CoordinateTemplate) -> Result<(), PancartaError>;
    /// Returns whether a template with that name existed.
    fn delete(&mut self, name: &str) -> Result<bool, PancartaError>;
    /// All templates, sorted by name.
    fn list(&self) -> Result<Vec<CoordinateTemplate>, PancartaError>;

    /// Save under a name: keeps the original creation time on overwrite and
    /// stamps the update time.
    fn save(
        &mut self,
        name: &str,
        areas: FieldRegions,
        image_width: u32,
        image_height: u32,
    ) -> Result<CoordinateTemplate, PancartaError> {
        let mut template = CoordinateTemplate::new(name, areas, image_width, image_height);
        if let Some(existing) = self.get(name)? {
            template.created_at = existing.created_at;
        }
        self.put(template.clone())?;
        Ok(template)
    }

    /// Serialize the whole store as one JSON document (name -> template).
    fn export_json(&self) -> Result<String, PancartaError> {
        let map: HashMap<String, CoordinateTemplate> = self
            .list()?
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect();
        serde_json::to_string_pretty(&map)
            .map_err(|e| PancartaError::Template(format!("export failed: {}", e)))
    }

    /// Merge templates from an exported JSON document. Name collisions are
    /// overwritten by the imported entry. Returns how many were imported.
    fn import_json(&mut self, json: &str) -> Result<usize, PancartaError> {
        let imported: HashMap<String, CoordinateTemplate> = serde_json::from_str(json)
            .map_err(|e| PancartaError::Template(format!("invalid template document: {}", e)))?;
        let count = imported.len();
        for (name, mut template) in imported {
            template.name = name;
            self.put(template)?;
        }
        info!(count, "imported templates");
        Ok(count)
    }
}

/// Ephemeral in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    templates: HashMap<String, CoordinateTemplate>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateStore for MemoryStore {
    fn get(&self, name: &str) -> Result<Option<CoordinateTemplate>, PancartaError> {
        Ok(self.templates.get(name).cloned())
    }

    fn put(&mut self, template: CoordinateTemplate) -> Result<(), PancartaError> {
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<bool, PancartaError> {
        Ok(self.templates.remove(name).is_some())
    }

    fn list(&self) -> Result<Vec<CoordinateTemplate>, PancartaError> {
        let mut all: Vec<_> = self.templates.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

/// JSON-file-backed store: the whole map is read on open and rewritten on
/// every mutation. Fine for the handful of templates a single user keeps.
pub struct JsonFileStore {
    path: PathBuf,
    templates: HashMap<String, CoordinateTemplate>,
}

impl JsonFileStore {
    /// Open (or create) a store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PancartaError> {
        let path = path.as_ref().to_path_buf();
        let templates = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| {
                    PancartaError::Template(format!(
                        "corrupt template store {}: {}",
                        path.display(),
                        e
                    ))
                })?
            }
        } else {
            HashMap::new()
        };
        Ok(Self { path, templates })
    }

    fn flush(&self) -> Result<(), PancartaError> {
        let json = serde_json::to_string_pretty(&self.templates)
            .map_err(|e| PancartaError::Template(format!("serialize failed: {}", e)))?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl TemplateStore for JsonFileStore {
    fn get(&self, name: &str) -> Result<Option<CoordinateTemplate>, PancartaError> {
        Ok(self.templates.get(name).cloned())
    }

    fn put(&mut self, template: CoordinateTemplate) -> Result<(), PancartaError> {
        self.templates.insert(template.name.clone(), template);
        self.flush()
    }

    fn delete(&mut self, name: &str) -> Result<bool, PancartaError> {
        let removed = self.templates.remove(name).is_some();
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }

    fn list(&self) -> Result<Vec<CoordinateTemplate>, PancartaError> {
        let mut all: Vec<_> = self.templates.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}
