//! Configuration management for the skill gap engine

use crate::error::{Result, SkillGapError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub matching: MatchingConfig,
    pub roadmap: RoadmapConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
}

/// Locations of the raw datasets, all relative to `data_dir` unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub taxonomy_file: String,
    pub synonyms_file: String,
    pub embeddings_file: String,
    pub job_skills_file: String,
    pub courses_file: String,
    pub demand_file: String,
    pub embedding_model_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum cosine similarity to accept a semantic skill match.
    pub skill_match_threshold: f32,
    /// Minimum cosine similarity to accept a fuzzy job title match.
    pub job_title_threshold: f32,
    /// Titles with fewer distinct jobs than this are dropped from aggregation.
    pub min_jobs_per_title: usize,
    /// Skills mentioned by a smaller fraction of a title's jobs are dropped.
    pub min_skill_ratio: f32,
    /// A requirement profile keeps at most this many skills.
    pub max_profile_skills: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapConfig {
    /// Minimum cosine similarity for a course to be considered at all.
    pub course_min_similarity: f32,
    pub courses_per_skill: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub frequency_weight: f32,
    pub growth_weight: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".skillgap")
            .join("data");

        Self {
            data: DataConfig {
                data_dir,
                taxonomy_file: "skill_taxonomy.json".to_string(),
                synonyms_file: "skill_synonyms.json".to_string(),
                embeddings_file: "skill_embeddings.json".to_string(),
                job_skills_file: "job_skill_mapping.json".to_string(),
                courses_file: "course_catalog.json".to_string(),
                demand_file: "skill_demand_predictions.json".to_string(),
                embedding_model_dir: None,
            },
            matching: MatchingConfig {
                skill_match_threshold: 0.45,
                job_title_threshold: 0.50,
                min_jobs_per_title: 3,
                min_skill_ratio: 0.05,
                max_profile_skills: 30,
            },
            roadmap: RoadmapConfig {
                course_min_similarity: 0.25,
                courses_per_skill: 3,
            },
            scoring: ScoringConfig {
                frequency_weight: 0.6,
                growth_weight: 0.4,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    pub fn load_from(config_path: PathBuf) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| SkillGapError::Configuration(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    fn save_to(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SkillGapError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("skillgap")
            .join("config.toml")
    }

    /// Resolve a dataset file name against the configured data directory.
    pub fn dataset_path(&self, file: &str) -> PathBuf {
        let p = PathBuf::from(file);
        if p.is_absolute() {
            p
        } else {
            self.data.data_dir.join(file)
        }
    }
}
