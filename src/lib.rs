//! Skill gap engine library

pub mod analysis;
pub mod cli;
pub mod config;
pub mod data;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod index;
pub mod output;

pub use config::Config;
pub use engine::SkillGapEngine;
pub use error::{Result, SkillGapError};
