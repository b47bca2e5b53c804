//! # Impact Plus Report
//!
//! The result handed back to callers after a pipeline run. It can be rendered
//! as a plain text listing or serialized as JSON; printing is left to the caller.

use std::fmt::{self, Write as _};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::config::ReportConfig;
use crate::engine::ImpactAnalysis;
use crate::error::Result;
use crate::models::{
    ImpactRow, LeagueAverages, LeagueScores, NamedRow, PlayerComparison, Verdict,
};

/// A row of the top/bottom tables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// 1-based position in the full ranking
    pub rank: usize,
    pub player: String,
    pub games_played: Option<u32>,
    pub impact_plus: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactReport {
    pub generated_at: DateTime<Utc>,
    pub input_rows: usize,
    pub filtered_rows: usize,
    pub games_threshold: Option<f64>,
    pub averages: LeagueAverages,
    pub league: LeagueScores,
    pub normalized_league_impact_plus: f64,
    pub featured: Option<PlayerComparison>,
    pub top: Vec<RankedEntry>,
    pub bottom: Vec<RankedEntry>,
    pub rows_by_position: Vec<ImpactRow>,
    pub rows_by_name: Vec<ImpactRow>,
    /// Lookups that could not be satisfied
    pub notes: Vec<String>,
}

impl ImpactReport {
    /// Assemble a report. Lookup misses are recorded in `notes` rather than failing the report.
    pub fn build(analysis: &ImpactAnalysis, config: &ReportConfig) -> Self {
        let mut notes = Vec::new();

        let featured = config.featured_player.as_deref().and_then(|name| {
            analysis
                .compare_player(name)
                .map_err(|e| record_miss(&mut notes, e))
                .ok()
        });

        let rows_by_position = if config.positions.is_empty() {
            Vec::new()
        } else {
            analysis
                .rows_at(&config.positions)
                .map(|rows| rows.into_iter().cloned().collect::<Vec<_>>())
                .unwrap_or_else(|e| {
                    record_miss(&mut notes, e);
                    Vec::new()
                })
        };

        let rows_by_name = if config.names.is_empty() {
            Vec::new()
        } else {
            analysis
                .rows_named(config.names.as_slice())
                .map(|rows| rows.into_iter().cloned().collect::<Vec<_>>())
                .unwrap_or_else(|e| {
                    record_miss(&mut notes, e);
                    Vec::new()
                })
        };

        let total = analysis.ranking.len();
        let top = ranked_entries(analysis.top(config.top_n), 1);
        let bottom_rows = analysis.bottom(config.bottom_n);
        let bottom = ranked_entries(bottom_rows, total - bottom_rows.len() + 1);

        Self {
            generated_at: Utc::now(),
            input_rows: analysis.input_rows,
            filtered_rows: analysis.annotated.len(),
            games_threshold: analysis.threshold,
            averages: analysis.averages,
            league: analysis.league,
            normalized_league_impact_plus: analysis.league.normalized_impact_plus(),
            featured,
            top,
            bottom,
            rows_by_position,
            rows_by_name,
            notes,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable listing of the whole report
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> fmt::Result {
        match self.games_threshold {
            Some(t) => writeln!(
                out,
                "Players with >= {t} games played: {} of {}",
                self.filtered_rows, self.input_rows
            )?,
            None => writeln!(out, "Players (no games filter): {}", self.filtered_rows)?,
        }
        writeln!(out)?;

        let a = &self.averages;
        writeln!(out, "League averages")?;
        writeln!(out, "  eFG%  {:>8.3}", a.effective_field_goal_pct)?;
        writeln!(out, "  AST   {:>8.2}", a.assists)?;
        writeln!(out, "  TOV   {:>8.2}", a.turnovers)?;
        writeln!(out, "  TRB   {:>8.2}", a.total_rebounds)?;
        writeln!(out, "  STL   {:>8.2}", a.steals)?;
        writeln!(out, "  BLK   {:>8.2}", a.blocks)?;
        writeln!(out, "  PF    {:>8.2}", a.personal_fouls)?;
        writeln!(out)?;

        writeln!(out, "League Average Playmaking Score: {:.2}", self.league.playmaking)?;
        writeln!(out, "League Average Defensive Score: {:.2}", self.league.defense)?;
        writeln!(out, "League Raw Impact Plus: {:.2}", self.league.raw_impact_plus)?;
        writeln!(out, "Scaling Factor: {:.2}", self.league.scaling_factor)?;
        writeln!(
            out,
            "Normalized League Average Impact Plus: {:.2}",
            self.normalized_league_impact_plus
        )?;

        if let Some(cmp) = &self.featured {
            writeln!(out)?;
            writeln!(out, "{}", describe_comparison(cmp))?;
        }

        write_ranked(out, &format!("Top {} Players by Impact Plus", self.top.len()), &self.top)?;
        write_ranked(
            out,
            &format!("Bottom {} Players by Impact Plus", self.bottom.len()),
            &self.bottom,
        )?;

        if !self.rows_by_position.is_empty() {
            write_rows(out, "Rows by position", &self.rows_by_position)?;
        }
        if !self.rows_by_name.is_empty() {
            write_rows(out, "Rows by name", &self.rows_by_name)?;
        }

        if !self.notes.is_empty() {
            writeln!(out)?;
            writeln!(out, "Notes")?;
            for note in &self.notes {
                writeln!(out, "  - {note}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for ImpactReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_text())
    }
}

/// Two-line summary of a player against the league average
pub fn describe_comparison(cmp: &PlayerComparison) -> String {
    let headline = format!("{}'s Impact Plus (normalized) is: {:.2}", cmp.player, cmp.impact_plus);
    let verdict = match cmp.verdict {
        Verdict::Above => {
            format!("{} is {:.2}% better than the league average.", cmp.player, cmp.difference)
        }
        Verdict::Below => {
            format!("{} is {:.2}% worse than the league average.", cmp.player, cmp.difference)
        }
        Verdict::AtAverage => format!("{} is performing at the league average.", cmp.player),
        Verdict::Undetermined => {
            format!("{} has missing stats; no comparison is possible.", cmp.player)
        }
    };
    format!("{headline}\n{verdict}")
}

fn record_miss(notes: &mut Vec<String>, error: crate::error::ImpactError) {
    warn!("{}", error);
    notes.push(error.to_string());
}

fn ranked_entries(rows: &[ImpactRow], first_rank: usize) -> Vec<RankedEntry> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| RankedEntry {
            rank: first_rank + i,
            player: row.name().to_string(),
            games_played: row.stats.games_played,
            impact_plus: row.impact_plus,
        })
        .collect()
}

fn write_ranked(out: &mut String, title: &str, entries: &[RankedEntry]) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{title}:")?;
    for e in entries {
        writeln!(out, "  {:>4}  {:<28} {:>8.2}", e.rank, e.player, e.impact_plus)?;
    }
    Ok(())
}

fn write_rows(out: &mut String, title: &str, rows: &[ImpactRow]) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{title}:")?;
    writeln!(
        out,
        "  {:<28} {:>4} {:>6} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5} {:>8}",
        "Player", "G", "eFG%", "AST", "TOV", "TRB", "STL", "BLK", "PF", "Impact+"
    )?;
    for row in rows {
        let s = &row.stats;
        let games = s.games_played.map(|g| g.to_string()).unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "  {:<28} {:>4} {:>6.3} {:>5.1} {:>5.1} {:>5.1} {:>5.1} {:>5.1} {:>5.1} {:>8.2}",
            s.player,
            games,
            s.effective_field_goal_pct,
            s.assists,
            s.turnovers,
            s.total_rebounds,
            s.steals,
            s.blocks,
            s.personal_fouls,
            row.impact_plus
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImpactConfig;
    use crate::engine::ImpactEngine;
    use crate::models::{PlayerRow, PlayerTable};

    fn create_test_analysis() -> ImpactAnalysis {
        let rows = vec![
            PlayerRow::new("Nikola Jokic", Some(79), 0.626, 9.0, 3.0, 12.4, 1.4, 0.9, 2.5),
            PlayerRow::new("Kobe Bufkin", Some(74), 0.433, 1.9, 0.8, 1.6, 0.5, 0.2, 1.3),
            PlayerRow::new("Jalen Brunson", Some(77), 0.538, 6.7, 2.4, 3.6, 0.9, 0.2, 1.9),
            PlayerRow::new("Luka Doncic", Some(74), 0.587, 9.8, 4.0, 9.2, 1.4, 0.5, 2.1),
            PlayerRow::new("Rim Runner", Some(12), 0.650, 0.9, 0.6, 7.7, 0.4, 1.9, 2.8),
        ];
        let table = PlayerTable::new(rows, true);
        ImpactEngine::new(&ImpactConfig::default()).analyze(&table).unwrap()
    }

    fn report_config() -> ReportConfig {
        ReportConfig {
            top_n: 2,
            bottom_n: 2,
            featured_player: Some("Kobe Bufkin".to_string()),
            positions: vec![0, 2],
            names: vec!["Luka Doncic".to_string()],
        }
    }

    #[test]
    fn test_build_report() {
        let analysis = create_test_analysis();
        let report = ImpactReport::build(&analysis, &report_config());

        assert_eq!(report.input_rows, 5);
        assert_eq!(report.filtered_rows, 4);
        assert_eq!(report.games_threshold, Some(74.0));
        assert!((report.normalized_league_impact_plus - 100.0).abs() < 1e-9);

        assert_eq!(report.top.len(), 2);
        assert_eq!(report.top[0].rank, 1);
        assert_eq!(report.bottom.len(), 2);
        assert_eq!(report.bottom[0].rank, 3);
        assert_eq!(report.bottom[1].rank, 4);
        assert_eq!(report.bottom[1].player, "Kobe Bufkin");

        let featured = report.featured.as_ref().unwrap();
        assert_eq!(featured.verdict, Verdict::Below);

        assert_eq!(report.rows_by_position.len(), 2);
        assert_eq!(report.rows_by_position[1].stats.player, "Jalen Brunson");
        assert_eq!(report.rows_by_name.len(), 1);
        assert!(report.notes.is_empty());
    }

    #[test]
    fn test_lookup_misses_become_notes() {
        let analysis = create_test_analysis();
        let config = ReportConfig {
            featured_player: Some("Rim Runner".to_string()),
            positions: vec![1, 99],
            names: vec!["Nobody".to_string()],
            ..report_config()
        };

        let report = ImpactReport::build(&analysis, &config);
        assert!(report.featured.is_none());
        assert!(report.rows_by_position.is_empty());
        assert!(report.rows_by_name.is_empty());
        assert_eq!(report.notes.len(), 3);
        assert!(report.notes[1].contains("99"));
    }

    #[test]
    fn test_render_text_sections() {
        let report = ImpactReport::build(&create_test_analysis(), &report_config());
        let text = report.render_text();

        assert!(text.contains("Scaling Factor:"));
        assert!(text.contains("Normalized League Average Impact Plus: 100.00"));
        assert!(text.contains("Kobe Bufkin is"));
        assert!(text.contains("worse than the league average."));
        assert!(text.contains("Top 2 Players by Impact Plus:"));
        assert!(text.contains("Bottom 2 Players by Impact Plus:"));
        assert!(text.contains("Rows by position:"));
        assert!(text.contains("Rows by name:"));
        assert_eq!(text, report.to_string());
    }

    #[test]
    fn test_describe_at_average() {
        let cmp = PlayerComparison::new("Mid Wing".to_string(), 100.0, 100.0);
        assert!(describe_comparison(&cmp).ends_with("Mid Wing is performing at the league average."));
    }

    #[test]
    fn test_json_output() {
        let report = ImpactReport::build(&create_test_analysis(), &report_config());
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["filtered_rows"], 4);
        assert_eq!(json["top"][0]["rank"], 1);
        assert_eq!(json["featured"]["verdict"], "Below");
        assert_eq!(json["rows_by_name"][0]["player"], "Luka Doncic");
        assert!(json["rows_by_name"][0]["impact_plus"].is_number());
    }
}
