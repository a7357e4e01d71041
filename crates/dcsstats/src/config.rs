//! Configuration file support for dcsstats.
//!
//! Loads `dcsstats.toml` from the working directory, or from the path given
//! with `--config`. Command line flags override what the file says.

use anyhow::{Context, Result};
use dcsstats_sessions::{LateTerminalPolicy, ReconstructOptions, Source};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration loaded from `dcsstats.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct StatsConfig {
    /// Directory the output files are written to
    pub output_dir: Option<PathBuf>,
    /// Named directories holding session files
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Seconds after a sortie ended in which its end reason can still change
    pub grace_window_secs: Option<i64>,
    /// Handling of terminal events after the grace window
    pub late_terminal: Option<LateTerminalPolicy>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "dcsstats.toml";

impl StatsConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        Self::load_from(&config_path).map(Some)
    }

    /// Load configuration from an explicit path. A missing file is an error.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: StatsConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(config)
    }
}

/// Everything a run needs, after merging file and command line.
#[derive(Debug)]
pub struct Settings {
    pub sources: Vec<Source>,
    pub output_dir: Option<PathBuf>,
    pub options: ReconstructOptions,
}

/// Command line values that take priority over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub sources: Vec<Source>,
    pub grace_window_secs: Option<i64>,
    pub late_terminal: Option<LateTerminalPolicy>,
}

impl Settings {
    /// Output directory, required only when files are written.
    pub fn require_output_dir(&self) -> Result<&Path> {
        self.output_dir.as_deref().with_context(|| {
            format!(
                "No output directory configured. Set output_dir in {} or pass --output-dir",
                CONFIG_FILE_NAME
            )
        })
    }

    /// Merge config and overrides.
    /// Priority: command line > config file > built-in default
    pub fn resolve(config: StatsConfig, overrides: Overrides) -> Result<Self> {
        let sources = if overrides.sources.is_empty() {
            config.sources
        } else {
            overrides.sources
        };
        if sources.is_empty() {
            anyhow::bail!(
                "No sources configured. Add [[sources]] to {} or pass --source NAME=DIR",
                CONFIG_FILE_NAME
            );
        }

        let output_dir = overrides.output_dir.or(config.output_dir);

        let defaults = ReconstructOptions::default();
        let grace_window_secs = overrides
            .grace_window_secs
            .or(config.grace_window_secs)
            .unwrap_or(defaults.grace_window_secs);
        if grace_window_secs < 0 {
            anyhow::bail!("grace window must not be negative, got {}", grace_window_secs);
        }

        let late_terminal = overrides
            .late_terminal
            .or(config.late_terminal)
            .unwrap_or(defaults.late_terminal);

        Ok(Self {
            sources,
            output_dir,
            options: ReconstructOptions {
                grace_window_secs,
                late_terminal,
            },
        })
    }
}

/// Parse a `NAME=DIR` command line source.
pub fn parse_source(s: &str) -> Result<Source, String> {
    match s.split_once('=') {
        Some((name, dir)) if !name.is_empty() && !dir.is_empty() => Ok(Source::new(name, dir)),
        _ => Err(format!("expected NAME=DIR, got '{}'", s)),
    }
}
