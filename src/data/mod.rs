//! Raw dataset records and JSON loaders
//!
//! All datasets are loaded once at startup and treated as immutable inputs.

use crate::config::Config;
use crate::error::{Result, SkillGapError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One row of the skill taxonomy table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyRecord {
    pub skill_id: i64,
    pub skill_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// One row of the job/skill co-occurrence table: a job posting tagged with
/// one skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSkillRow {
    pub job_id: String,
    pub job_title: String,
    pub skill: String,
}

/// One course from the learning resource catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub platform: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub category: String,
    /// Text the course is embedded from: its skill list or title + subject.
    pub skill_text: String,
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub subscribers: u64,
    #[serde(default)]
    pub reviews: u64,
    #[serde(default)]
    pub content_hours: f32,
}

fn default_level() -> String {
    "All Levels".to_string()
}

/// One skill demand prediction row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandRecord {
    pub skill_name: String,
    pub predicted_trend: String,
    pub confidence: f32,
    pub growth_rate: f32,
    pub current_demand: u64,
}

/// All raw inputs bundled for engine construction.
pub struct Datasets {
    pub taxonomy: Vec<TaxonomyRecord>,
    pub synonyms: HashMap<String, String>,
    /// Precomputed skill embeddings keyed by skill name. When absent the
    /// engine batch-encodes skill names at startup instead.
    pub embeddings: Option<HashMap<String, Vec<f32>>>,
    pub job_skills: Vec<JobSkillRow>,
    pub courses: Vec<CourseRecord>,
    pub demand: Vec<DemandRecord>,
}

impl Datasets {
    /// Load all datasets from the configured data directory.
    ///
    /// The taxonomy and job/skill tables are required; synonyms, embeddings,
    /// courses, and demand predictions degrade to empty/absent.
    pub fn load(config: &Config) -> Result<Self> {
        let taxonomy = load_json(&config.dataset_path(&config.data.taxonomy_file))?;
        let job_skills = load_json(&config.dataset_path(&config.data.job_skills_file))?;

        let synonyms = load_json_or_default(&config.dataset_path(&config.data.synonyms_file), "synonym table");
        let courses: Vec<CourseRecord> =
            load_json_or_default(&config.dataset_path(&config.data.courses_file), "course catalog");

        let embeddings_path = config.dataset_path(&config.data.embeddings_file);
        let embeddings = if embeddings_path.exists() {
            Some(load_json(&embeddings_path)?)
        } else {
            log::info!("No precomputed skill embeddings at {}; will encode at startup", embeddings_path.display());
            None
        };

        let demand = load_demand(&config.dataset_path(&config.data.demand_file));

        Ok(Self {
            taxonomy,
            synonyms,
            embeddings,
            job_skills,
            courses,
            demand,
        })
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SkillGapError::Dataset(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| SkillGapError::Dataset(format!("Failed to parse {}: {}", path.display(), e)))
}

fn load_json_or_default<T: serde::de::DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    if !path.exists() {
        log::warn!("No {} found at {}", what, path.display());
        return T::default();
    }
    match load_json(path) {
        Ok(value) => value,
        Err(e) => {
            log::error!("Failed to load {}: {}", what, e);
            T::default()
        }
    }
}

/// Load demand predictions, skipping malformed entries.
///
/// A bad row is a missing signal, not a fatal error.
fn load_demand(path: &Path) -> Vec<DemandRecord> {
    if !path.exists() {
        log::warn!("No skill demand predictions found at {}", path.display());
        return Vec::new();
    }

    let raw: Vec<serde_json::Value> = match load_json(path) {
        Ok(rows) => rows,
        Err(e) => {
            log::error!("Failed to load demand predictions: {}", e);
            return Vec::new();
        }
    };

    let total = raw.len();
    let records: Vec<DemandRecord> = raw
        .into_iter()
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect();
    if records.len() < total {
        log::warn!("Skipped {} malformed demand prediction rows", total - records.len());
    }
    records
}
