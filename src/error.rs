//! Error handling for the skill gap engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkillGapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("No matching job title found for: {0}")]
    JobTitleNotFound(String),

    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SkillGapError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for SkillGapError {
    fn from(err: anyhow::Error) -> Self {
        SkillGapError::Dataset(err.to_string())
    }
}
