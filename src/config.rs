//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.lungscan.toml` files.

use crate::cli::OutputFormat;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".lungscan.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Simulated analysis settings.
    #[serde(default)]
    pub simulator: SimulatorSection,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: OutputFormat::default(),
        }
    }
}

fn default_output() -> String {
    "lungscan_report.md".to_string()
}

/// Timing and sampling of simulated runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorSection {
    /// Milliseconds between progress ticks.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Progress added per tick.
    #[serde(default = "default_progress_step")]
    pub progress_step: u8,

    /// Milliseconds from run start until the result.
    #[serde(default = "default_result_delay")]
    pub result_delay_ms: u64,

    /// Fixed seed for reproducible results.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulatorSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            progress_step: default_progress_step(),
            result_delay_ms: default_result_delay(),
            seed: None,
        }
    }
}

fn default_tick_interval() -> u64 {
    200
}

fn default_progress_step() -> u8 {
    10
}

fn default_result_delay() -> u64 {
    2000
}

impl SimulatorSection {
    /// Reject settings the simulator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            bail!("simulator.tick_interval_ms must be at least 1");
        }
        if !(1..=100).contains(&self.progress_step) {
            bail!("simulator.progress_step must be between 1 and 100");
        }
        if self.result_delay_ms == 0 {
            bail!("simulator.result_delay_ms must be at least 1");
        }
        Ok(())
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the recommended precautions.
    #[serde(default = "default_true")]
    pub include_recommendations: bool,

    /// Include the tier presentation classes.
    #[serde(default = "default_true")]
    pub include_presentation: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_recommendations: true,
            include_presentation: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .simulator
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }

        if let Some(seed) = args.seed {
            self.simulator.seed = Some(seed);
        }

        if args.no_recommendations {
            self.report.include_recommendations = false;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
