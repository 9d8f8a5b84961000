//! CLI interface for the skill gap engine

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skillgap")]
#[command(about = "Semantic skill matching, job gap analysis, and learning roadmaps")]
#[command(long_about = "Extract skills from text, compare them against aggregated job requirements using embeddings, and generate phased learning roadmaps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract canonical skills from a skill list or free text
    Extract {
        /// Input text (skill list or free text)
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// Read input from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Input mode: list, text
        #[arg(short, long, default_value = "list")]
        mode: String,

        /// Output format: console, json
        #[arg(short, long, default_value = "console")]
        output: String,
    },

    /// Analyze the gap between your skills and a target job title
    Gap {
        /// Comma-separated list of your skills
        #[arg(short, long)]
        skills: String,

        /// Target job title
        #[arg(short, long)]
        job: String,

        /// Output format: console, json
        #[arg(short, long, default_value = "console")]
        output: String,
    },

    /// Generate a phased learning roadmap for your skill gaps
    Roadmap {
        /// Comma-separated list of your skills
        #[arg(short, long)]
        skills: String,

        /// Target job title
        #[arg(short, long)]
        job: String,

        /// Learning style: visual, auditory, kinesthetic
        #[arg(short, long)]
        learning_style: Option<String>,

        /// Output format: console, json
        #[arg(short, long, default_value = "console")]
        output: String,
    },

    /// List all known job titles
    Titles {
        /// Output format: console, json
        #[arg(short, long, default_value = "console")]
        output: String,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        _ => Err(format!("Invalid output format: {}. Supported: console, json", format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("console").unwrap(), OutputFormat::Console);
        assert_eq!(parse_output_format("JSON").unwrap(), OutputFormat::Json);
        assert!(parse_output_format("yaml").is_err());
    }

    #[test]
    fn test_cli_parses_gap_command() {
        let cli = Cli::try_parse_from([
            "skillgap", "gap", "--skills", "python, docker", "--job", "backend engineer",
        ])
        .unwrap();
        match cli.command {
            Commands::Gap { skills, job, output } => {
                assert_eq!(skills, "python, docker");
                assert_eq!(job, "backend engineer");
                assert_eq!(output, "console");
            }
            _ => panic!("expected gap command"),
        }
    }

    #[test]
    fn test_extract_text_and_file_conflict() {
        let result = Cli::try_parse_from([
            "skillgap", "extract", "--text", "python", "--file", "cv.txt",
        ]);
        assert!(result.is_err());
    }
}
