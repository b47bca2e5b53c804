//! # Command Line Interface
//!
//! CLI for computing Impact Plus over a season stats export and querying the result.

use crate::config::ImpactConfig;
use crate::engine::{ImpactAnalysis, ImpactEngine};
use crate::error::ImpactError;
use crate::loader;
use crate::models::{ImpactRow, NamedRow, PlayerTable};
use crate::report::{describe_comparison, ImpactReport};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

/// Impact Plus: league-normalized player impact from regular season box scores
#[derive(Parser, Debug)]
#[command(name = "impact-plus")]
#[command(about = "Compute and query Impact Plus for a season of box-score stats")]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Stats CSV (overrides the configured path)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Keep every player instead of filtering at the median games played
    #[arg(long)]
    pub no_filter: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Full report: league averages, scaling factor, featured player, top and bottom tables
    Report {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Compare one player against the league average
    Player {
        /// Player name, exactly as in the data
        name: String,
    },
    /// Best players by Impact Plus
    Top {
        #[arg(short, long, default_value = "5")]
        n: usize,
    },
    /// Worst players by Impact Plus
    Bottom {
        #[arg(short, long, default_value = "5")]
        n: usize,
    },
    /// Rows at zero-based positions of the filtered table
    Rows {
        #[arg(required = true)]
        positions: Vec<usize>,
    },
    /// Every row for the given player names
    Names {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

impl Cli {
    /// File (or defaults), then environment, then command-line flags
    pub fn resolve_config(&self) -> Result<ImpactConfig> {
        let mut config = match &self.config {
            Some(path) => ImpactConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ImpactConfig::default(),
        };
        config.apply_env_overrides()?;

        if let Some(data) = &self.data {
            config.data.path = data.clone();
        }
        if self.no_filter {
            config.filter.median_games = false;
        }

        Ok(config)
    }
}

/// CLI handler
pub struct CliHandler {
    config: ImpactConfig,
    analysis: ImpactAnalysis,
}

impl CliHandler {
    /// Load the configured data file and run the pipeline
    pub fn new(config: ImpactConfig) -> Result<Self> {
        let table = loader::load_table(&config.data.path, config.delimiter_byte()?)
            .with_context(|| format!("Failed to load stats from {}", config.data.path.display()))?;
        Self::from_table(config, &table)
    }

    /// Run the pipeline over an already loaded table
    pub fn from_table(config: ImpactConfig, table: &PlayerTable) -> Result<Self> {
        let analysis = ImpactEngine::new(&config)
            .analyze(table)
            .context("Failed to compute Impact Plus")?;
        info!("Impact Plus computed for {} players", analysis.annotated.len());
        Ok(Self { config, analysis })
    }

    pub fn analysis(&self) -> &ImpactAnalysis {
        &self.analysis
    }

    /// Handle CLI commands
    pub fn handle_command(&self, command: Commands) -> Result<()> {
        let output = self.render_command(command)?;
        print!("{output}");
        Ok(())
    }

    /// Produce the text a command prints
    pub fn render_command(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Report { json } => {
                let report = ImpactReport::build(&self.analysis, &self.config.report);
                if json {
                    Ok(report.to_json()? + "\n")
                } else {
                    Ok(report.render_text())
                }
            }
            Commands::Player { name } => match self.analysis.compare_player(&name) {
                Ok(cmp) => Ok(describe_comparison(&cmp) + "\n"),
                Err(e @ ImpactError::NameNotFound { .. }) => Ok(format!("{e}\n")),
                Err(e) => Err(e.into()),
            },
            Commands::Top { n } => {
                Ok(render_ranked(&format!("Top {n} Players by Impact Plus"), self.analysis.top(n), 1))
            }
            Commands::Bottom { n } => {
                let rows = self.analysis.bottom(n);
                let first_rank = self.analysis.ranking.len() - rows.len() + 1;
                Ok(render_ranked(&format!("Bottom {n} Players by Impact Plus"), rows, first_rank))
            }
            Commands::Rows { positions } => {
                let rows = self.analysis.rows_at(&positions)?;
                Ok(render_rows(&rows))
            }
            Commands::Names { names } => match self.analysis.rows_named(names.as_slice()) {
                Ok(rows) => Ok(render_rows(&rows)),
                Err(e @ ImpactError::NameNotFound { .. }) => Ok(format!("{e}\n")),
                Err(e) => Err(e.into()),
            },
        }
    }
}

fn render_ranked(title: &str, rows: &[ImpactRow], first_rank: usize) -> String {
    let mut out = format!("{title}:\n");
    for (i, row) in rows.iter().enumerate() {
        let _ = writeln!(out, "  {:>4}  {:<28} {:>8.2}", first_rank + i, row.name(), row.impact_plus);
    }
    out
}

fn render_rows(rows: &[&ImpactRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let games = row.stats.games_played.map(|g| g.to_string()).unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "  {:<28} G {:>3}  Impact+ {:>8.2}", row.name(), games, row.impact_plus);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlayerRow;
    use clap::CommandFactory;

    fn create_test_handler() -> CliHandler {
        let rows = vec![
            PlayerRow::new("Nikola Jokic", Some(79), 0.626, 9.0, 3.0, 12.4, 1.4, 0.9, 2.5),
            PlayerRow::new("Kobe Bufkin", Some(17), 0.433, 1.9, 0.8, 1.6, 0.5, 0.2, 1.3),
            PlayerRow::new("Jalen Brunson", Some(77), 0.538, 6.7, 2.4, 3.6, 0.9, 0.2, 1.9),
        ];
        let mut config = ImpactConfig::default();
        config.filter.median_games = false;
        CliHandler::from_table(config, &PlayerTable::new(rows, true)).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::parse_from(["impact-plus", "--data", "stats.csv", "top", "-n", "10"]);
        assert_eq!(cli.data, Some(PathBuf::from("stats.csv")));
        assert_eq!(cli.command, Commands::Top { n: 10 });

        let cli = Cli::parse_from(["impact-plus", "rows", "437", "374"]);
        assert_eq!(cli.command, Commands::Rows { positions: vec![437, 374] });

        assert!(Cli::try_parse_from(["impact-plus", "rows"]).is_err());
    }

    #[test]
    fn test_resolve_config_applies_flags() {
        let cli = Cli::parse_from(["impact-plus", "--no-filter", "-d", "x.csv", "report"]);
        let config = cli.resolve_config().unwrap();
        assert!(!config.filter.median_games);
        assert_eq!(config.data.path, PathBuf::from("x.csv"));
    }

    #[test]
    fn test_player_command() {
        let handler = create_test_handler();

        let out = handler.render_command(Commands::Player { name: "Kobe Bufkin".to_string() }).unwrap();
        assert!(out.contains("worse than the league average"));

        let out = handler.render_command(Commands::Player { name: "Nobody".to_string() }).unwrap();
        assert!(out.contains("not found"));
    }

    #[test]
    fn test_top_and_bottom_commands() {
        let handler = create_test_handler();

        let top = handler.render_command(Commands::Top { n: 1 }).unwrap();
        assert!(top.contains("Nikola Jokic"));

        let bottom = handler.render_command(Commands::Bottom { n: 10 }).unwrap();
        assert_eq!(bottom.lines().count(), 4);
        assert!(bottom.lines().last().unwrap().contains("Kobe Bufkin"));
    }

    #[test]
    fn test_rows_command_out_of_range() {
        let handler = create_test_handler();
        assert!(handler.render_command(Commands::Rows { positions: vec![0, 2] }).is_ok());

        let err = handler.render_command(Commands::Rows { positions: vec![3] }).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_report_json_command() {
        let handler = create_test_handler();
        let out = handler.render_command(Commands::Report { json: true }).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["filtered_rows"], 3);
    }

    #[test]
    fn test_handler_from_csv_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Rk,Player,G,eFG%,TRB,AST,STL,BLK,TOV,PF").unwrap();
        writeln!(file, "1,Nikola Jokic,79,0.626,12.4,9.0,1.4,0.9,3.0,2.5").unwrap();
        writeln!(file, "2,Kobe Bufkin,17,0.433,1.6,1.9,0.5,0.2,0.8,1.3").unwrap();
        writeln!(file, "3,Jalen Brunson,77,0.538,3.6,6.7,0.9,0.2,2.4,1.9").unwrap();

        let mut config = ImpactConfig::default();
        config.data.path = file.path().to_path_buf();

        let handler = CliHandler::new(config).unwrap();
        // Median of 17, 77, 79 is 77
        assert_eq!(handler.analysis().threshold, Some(77.0));
        assert_eq!(handler.analysis().annotated.len(), 2);

        let out = handler.render_command(Commands::Player { name: "Kobe Bufkin".to_string() }).unwrap();
        assert!(out.contains("not found"));
    }
}
