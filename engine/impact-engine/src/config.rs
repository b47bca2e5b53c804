//! # Configuration Management
//!
//! Configuration for the Impact Plus engine: data source, filtering, formula
//! weights, report contents and logging. Loaded from a TOML file and then
//! overridden from the environment.

use crate::error::{ImpactError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for the Impact Plus engine
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ImpactConfig {
    /// Input data configuration
    pub data: DataConfig,
    /// Games-played filter configuration
    pub filter: FilterConfig,
    /// Formula coefficients
    pub weights: ImpactWeights,
    /// Report configuration
    pub report: ReportConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    /// Path to the regular season stats CSV
    pub path: PathBuf,

    /// Field delimiter (single byte)
    pub delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("RegularSeasonStats_Cleaned.csv"), delimiter: ',' }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    /// Keep only players with games played >= the league median
    pub median_games: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { median_games: true }
    }
}

/// Coefficients of the Impact Plus formula.
///
/// ```text
/// Playmaking  = assists*AST + turnovers*TOV
/// Defense     = steals*STL + blocks*BLK + fouls*PF
/// Impact Plus = efg*eFG% + playmaking*Playmaking + rebounds*TRB + defense*Defense
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImpactWeights {
    pub efg: f64,
    pub playmaking: f64,
    pub rebounds: f64,
    pub defense: f64,

    pub assists: f64,
    pub turnovers: f64,

    pub steals: f64,
    pub blocks: f64,
    pub fouls: f64,
}

impl Default for ImpactWeights {
    fn default() -> Self {
        Self {
            efg: 0.4,
            playmaking: 0.3,
            rebounds: 0.2,
            defense: 0.1,
            assists: 0.7,
            // Turnovers and fouls are weighted positively on purpose
            turnovers: 0.3,
            steals: 0.4,
            blocks: 0.4,
            fouls: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of players in the top table
    pub top_n: usize,

    /// Number of players in the bottom table
    pub bottom_n: usize,

    /// Player compared in detail against the league average
    pub featured_player: Option<String>,

    /// Row positions (zero-based, filtered table order) to include
    pub positions: Vec<usize>,

    /// Player names to include
    pub names: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            bottom_n: 5,
            featured_player: Some("Kobe Bufkin".to_string()),
            positions: vec![437, 374, 338, 155, 351],
            names: vec!["LeBron James".to_string(), "Kevin Durant".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,

    /// Output format: "compact", "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "compact".to_string() }
    }
}

impl ImpactConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ImpactError::Io { path: path.display().to_string(), source })?;
        toml::from_str(&content)
            .map_err(|e| ImpactError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content =
            toml::to_string_pretty(self).map_err(|e| ImpactError::Config(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|source| ImpactError::Io { path: path.display().to_string(), source })
    }

    /// Load defaults, then apply environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Override fields from `IMPACT_*` environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("IMPACT_DATA_PATH") {
            self.data.path = PathBuf::from(path);
        }

        if let Some(top_n) = lookup("IMPACT_TOP_N") {
            self.report.top_n = parse_count("IMPACT_TOP_N", &top_n)?;
        }

        if let Some(bottom_n) = lookup("IMPACT_BOTTOM_N") {
            self.report.bottom_n = parse_count("IMPACT_BOTTOM_N", &bottom_n)?;
        }

        if let Some(player) = lookup("IMPACT_FEATURED_PLAYER") {
            let player = player.trim().to_string();
            self.report.featured_player = if player.is_empty() { None } else { Some(player) };
        }

        if let Some(level) = lookup("IMPACT_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Delimiter as the single ASCII byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        if !self.data.delimiter.is_ascii() {
            return Err(ImpactError::Config(format!(
                "delimiter '{}' is not a single ASCII byte",
                self.data.delimiter
            )));
        }
        Ok(self.data.delimiter as u8)
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| ImpactError::Config(format!("{key} must be a non-negative integer, got '{value}'")))
}
