//! skillgap: semantic skill matching, gap analysis, and learning roadmaps

mod analysis;
mod cli;
mod config;
mod data;
mod embedding;
mod engine;
mod error;
mod index;
mod output;

use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use config::{Config, OutputFormat};
use data::Datasets;
use embedding::Model2VecEmbedder;
use engine::SkillGapEngine;
use error::{Result, SkillGapError};
use index::InMemoryIndex;
use log::{error, info};
use output::{ConsoleFormatter, JsonFormatter};
use std::process;
use std::sync::Arc;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let config = match cli.config.clone() {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Execute command
    if let Err(e) = run_command(cli.command, config) {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Extract { text, file, mode, output } => {
            let input = match (text, file) {
                (Some(text), None) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)?,
                _ => {
                    return Err(SkillGapError::InvalidInput(
                        "provide input with --text or --file".to_string(),
                    ))
                }
            };

            let mode = analysis::extractor::ExtractionMode::parse(&mode)
                .ok_or_else(|| SkillGapError::InvalidInput(format!("Invalid mode: {}. Supported: list, text", mode)))?;
            let format = cli::parse_output_format(&output).map_err(SkillGapError::InvalidInput)?;

            info!("Extracting skills from {} characters of input", input.len());
            let engine = build_engine(config.clone())?;
            let matches = engine.extract(&input, mode)?;

            match format {
                OutputFormat::Console => {
                    let formatter = ConsoleFormatter::new(config.output.color_output);
                    print!("{}", formatter.format_matches(&matches));
                }
                OutputFormat::Json => {
                    println!("{}", JsonFormatter::new(true).format(&matches)?);
                }
            }
        }

        Commands::Gap { skills, job, output } => {
            let format = cli::parse_output_format(&output).map_err(SkillGapError::InvalidInput)?;
            let user_skills = split_skills(&skills);

            println!("🔍 Analyzing skill gap for '{}'", job);
            let engine = build_engine(config.clone())?;
            let report = engine.analyze_gap(&user_skills, &job)?;

            match format {
                OutputFormat::Console => {
                    let formatter = ConsoleFormatter::new(config.output.color_output);
                    print!("{}", formatter.format_gap_report(&report));
                }
                OutputFormat::Json => {
                    println!("{}", JsonFormatter::new(true).format(&report)?);
                }
            }
        }

        Commands::Roadmap { skills, job, learning_style, output } => {
            let format = cli::parse_output_format(&output).map_err(SkillGapError::InvalidInput)?;
            let style = match learning_style {
                Some(s) => Some(analysis::roadmap::LearningStyle::parse(&s).ok_or_else(|| {
                    SkillGapError::InvalidInput(format!(
                        "Invalid learning style: {}. Supported: visual, auditory, kinesthetic",
                        s
                    ))
                })?),
                None => None,
            };
            let user_skills = split_skills(&skills);

            println!("🗺️  Building learning roadmap for '{}'", job);
            let engine = build_engine(config.clone())?;
            let report = engine.build_roadmap(&user_skills, &job, style)?;

            match format {
                OutputFormat::Console => {
                    let formatter = ConsoleFormatter::new(config.output.color_output);
                    print!("{}", formatter.format_roadmap(&report));
                }
                OutputFormat::Json => {
                    println!("{}", JsonFormatter::new(true).format(&report)?);
                }
            }
        }

        Commands::Titles { output } => {
            let format = cli::parse_output_format(&output).map_err(SkillGapError::InvalidInput)?;
            let engine = build_engine(config.clone())?;
            let titles = engine.known_job_titles();

            match format {
                OutputFormat::Console => {
                    let formatter = ConsoleFormatter::new(config.output.color_output);
                    print!("{}", formatter.format_titles(&titles));
                }
                OutputFormat::Json => {
                    println!("{}", JsonFormatter::new(true).format(&titles)?);
                }
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                println!("Data Directory: {}", config.data.data_dir.display());
                match &config.data.embedding_model_dir {
                    Some(dir) => println!("Embedding Model: {}", dir.display()),
                    None => println!("Embedding Model: (not configured)"),
                }
                println!("\nMatching:");
                println!("  Skill match threshold: {}", config.matching.skill_match_threshold);
                println!("  Job title threshold: {}", config.matching.job_title_threshold);
                println!("  Min jobs per title: {}", config.matching.min_jobs_per_title);
                println!("  Max profile skills: {}", config.matching.max_profile_skills);
                println!("\nScoring Weights:");
                println!("  Frequency: {:.1}%", config.scoring.frequency_weight * 100.0);
                println!("  Demand growth: {:.1}%", config.scoring.growth_weight * 100.0);
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                let default_config = Config::default();
                default_config.save()?;
                println!("✅ Configuration reset successfully!");
            }
        },
    }

    Ok(())
}

/// Load datasets, the embedding model, and build the engine.
fn build_engine(config: Config) -> Result<SkillGapEngine> {
    let model_dir = config.data.embedding_model_dir.clone().ok_or_else(|| {
        SkillGapError::Configuration(
            "no embedding model configured; set data.embedding_model_dir in config.toml".to_string(),
        )
    })?;

    let embedder = Arc::new(Model2VecEmbedder::new(&model_dir)?);
    let index = Arc::new(InMemoryIndex::new());
    let datasets = Datasets::load(&config)?;

    SkillGapEngine::new(config, datasets, embedder, index)
}

/// Split a comma-separated skill argument; normalization happens in the engine.
fn split_skills(skills: &str) -> Vec<String> {
    skills
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
