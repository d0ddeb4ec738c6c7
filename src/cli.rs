//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::RiskTier;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// LungScan - simulated chest X-ray screening
///
/// Log in, stage an X-ray image, run the simulated analysis and get a
/// risk tier with recommended precautions. The analysis is a randomized
/// placeholder, not a diagnosis.
///
/// Examples:
///   lungscan --image chest.png --email me@example.com --password secret
///   lungscan --image chest.png --signup --name Ada --email ada@example.com --password pw
///   lungscan --image chest.png --email me@example.com --password pw --format json --seed 7
///   lungscan --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// X-ray image to analyze
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub image: Option<PathBuf>,

    /// Account email
    #[arg(short, long, env = "LUNGSCAN_EMAIL", default_value = "")]
    pub email: String,

    /// Account password
    #[arg(short, long, env = "LUNGSCAN_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Create an account instead of logging in
    #[arg(long, requires = "name")]
    pub signup: bool,

    /// Full name for --signup
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Seed for a reproducible simulated result
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .lungscan.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Leave recommended precautions out of the report
    #[arg(long)]
    pub no_recommendations: bool,

    /// Exit with code 2 if the risk tier is at or above this level
    ///
    /// Values: low, medium, high
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<FailOnLevel>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .lungscan.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Risk level for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum FailOnLevel {
    Low,
    Medium,
    High,
}

impl From<FailOnLevel> for RiskTier {
    fn from(level: FailOnLevel) -> Self {
        match level {
            FailOnLevel::Low => RiskTier::Low,
            FailOnLevel::Medium => RiskTier::Medium,
            FailOnLevel::High => RiskTier::High,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref image) = self.image {
            if !image.exists() {
                return Err(format!("Image file does not exist: {}", image.display()));
            }
            if !image.is_file() {
                return Err(format!("Image path is not a file: {}", image.display()));
            }
        }

        if self.email.is_empty() || self.password.is_empty() {
            return Err("Both --email and --password are required".to_string());
        }

        if self.signup && self.name.as_deref().map_or(true, str::is_empty) {
            return Err("--signup requires a non-empty --name".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn make_args(image: PathBuf) -> Args {
        Args {
            image: Some(image),
            email: "me@example.com".to_string(),
            password: "secret".to_string(),
            signup: false,
            name: None,
            output: None,
            format: None,
            seed: None,
            config: None,
            no_recommendations: false,
            fail_on: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_ok() {
        let file = NamedTempFile::new().unwrap();
        let args = make_args(file.path().to_path_buf());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_image() {
        let args = make_args(PathBuf::from("/definitely/not/here.png"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_credentials() {
        let file = NamedTempFile::new().unwrap();
        let mut args = make_args(file.path().to_path_buf());
        args.password = String::new();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_signup_needs_name() {
        let file = NamedTempFile::new().unwrap();
        let mut args = make_args(file.path().to_path_buf());
        args.signup = true;
        assert!(args.validate().is_err());

        args.name = Some("Ada".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let file = NamedTempFile::new().unwrap();
        let mut args = make_args(file.path().to_path_buf());
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let file = NamedTempFile::new().unwrap();
        let mut args = make_args(file.path().to_path_buf());
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_fail_on_maps_to_tier() {
        assert_eq!(RiskTier::from(FailOnLevel::Medium), RiskTier::Medium);
        assert!(RiskTier::from(FailOnLevel::High) > RiskTier::from(FailOnLevel::Low));
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "lungscan",
            "--image",
            "chest.png",
            "--email",
            "a@b.c",
            "--password",
            "pw",
            "--format",
            "json",
            "--fail-on",
            "medium",
        ])
        .unwrap();
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.fail_on, Some(FailOnLevel::Medium));
        assert!(!args.signup);
    }
}
