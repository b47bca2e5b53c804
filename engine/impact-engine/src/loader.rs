//! Regular season stats loader
//!
//! Reads a delimited stats export into a [`PlayerTable`]. The header row is
//! validated once up front; a missing stat column is an error, a missing
//! games-played column only disables the median filter.

use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::error::{ImpactError, Result};
use crate::models::{PlayerRow, PlayerTable};

pub const PLAYER_COLUMN: &str = "Player";
pub const GAMES_COLUMN: &str = "G";

/// Stat columns the formula depends on, in `PlayerRow` field order
pub const STAT_COLUMNS: [&str; 7] = ["eFG%", "AST", "TOV", "TRB", "STL", "BLK", "PF"];

/// Column positions resolved from the header row
#[derive(Debug, Clone)]
struct Schema {
    player: usize,
    games: Option<usize>,
    stats: [usize; 7],
}

impl Schema {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| ImpactError::MissingColumn { column: name.to_string() })
        };

        let player = require(PLAYER_COLUMN)?;
        let mut stats = [0usize; 7];
        for (slot, name) in stats.iter_mut().zip(STAT_COLUMNS) {
            *slot = require(name)?;
        }

        Ok(Self { player, games: find(GAMES_COLUMN), stats })
    }
}

/// Load a stats table from a CSV file
pub fn load_table<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<PlayerTable> {
    let path = path.as_ref();
    info!("Loading player stats from: {:?}", path);

    let file = std::fs::File::open(path)
        .map_err(|source| ImpactError::Io { path: path.display().to_string(), source })?;
    let table = load_table_from_reader(file, delimiter)?;

    info!("Loaded {} players from file", table.len());
    Ok(table)
}

/// Load a stats table from any reader (header row required)
pub fn load_table_from_reader<R: Read>(rdr: R, delimiter: u8) -> Result<PlayerTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let headers = reader.headers()?.clone();
    debug!("Column names: {:?}", headers.iter().collect::<Vec<_>>());

    let schema = Schema::from_headers(&headers)?;
    if schema.games.is_none() {
        warn!("The '{}' (games played) column is not found in the dataset", GAMES_COLUMN);
    }

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        rows.push(parse_row(&record, &schema, i + 1)?);
    }

    Ok(PlayerTable::new(rows, schema.games.is_some()))
}

fn parse_row(record: &StringRecord, schema: &Schema, row: usize) -> Result<PlayerRow> {
    let cell = |idx: usize| record.get(idx).unwrap_or("");

    let games = match schema.games {
        Some(idx) => parse_games(cell(idx), row)?,
        None => None,
    };

    let mut stats = [0.0f64; 7];
    for ((value, &idx), column) in stats.iter_mut().zip(&schema.stats).zip(STAT_COLUMNS) {
        *value = parse_stat(cell(idx), column, row)?;
    }
    let [efg, ast, tov, trb, stl, blk, pf] = stats;

    Ok(PlayerRow::new(cell(schema.player), games, efg, ast, tov, trb, stl, blk, pf))
}

/// Empty cells are missing values and load as NaN
fn parse_stat(raw: &str, column: &str, row: usize) -> Result<f64> {
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse().map_err(|_| invalid(raw, column, row))
}

/// Games played may be exported as "70" or "70.0"
fn parse_games(raw: &str, row: usize) -> Result<Option<u32>> {
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(games) = raw.parse::<u32>() {
        return Ok(Some(games));
    }

    match raw.parse::<f64>() {
        Ok(g) if g >= 0.0 && g.fract() == 0.0 && g <= f64::from(u32::MAX) => Ok(Some(g as u32)),
        _ => Err(invalid(raw, GAMES_COLUMN, row)),
    }
}

fn invalid(raw: &str, column: &str, row: usize) -> ImpactError {
    ImpactError::InvalidValue { row, column: column.to_string(), value: raw.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Rk,Player,Pos,Age,Tm,G,eFG%,TRB,AST,STL,BLK,TOV,PF,PTS";

    #[test]
    fn test_load_basic_rows() {
        let csv_data = format!(
            "{HEADER}\n\
             1,Precious Achiuwa,PF-C,24,TOT,74,0.509,7.2,1.1,0.6,0.9,1.1,1.9,7.6\n\
             2,Bam Adebayo,C,26,MIA,71,0.521,10.4,3.9,1.1,0.9,2.3,2.2,19.3\n"
        );

        let table = load_table_from_reader(csv_data.as_bytes(), b',').unwrap();
        assert!(table.has_games_played);
        assert_eq!(table.len(), 2);

        let bam = &table.rows[1];
        assert_eq!(bam.player, "Bam Adebayo");
        assert_eq!(bam.games_played, Some(71));
        assert_eq!(bam.effective_field_goal_pct, 0.521);
        assert_eq!(bam.total_rebounds, 10.4);
        assert_eq!(bam.assists, 3.9);
        assert_eq!(bam.turnovers, 2.3);
        assert_eq!(bam.personal_fouls, 2.2);
    }

    #[test]
    fn test_missing_stat_column() {
        let csv_data = "Player,G,eFG%,TRB,AST,STL,BLK,PF\nA,10,0.5,1,1,1,1,1\n";
        let err = load_table_from_reader(csv_data.as_bytes(), b',').unwrap_err();
        assert!(matches!(err, ImpactError::MissingColumn { ref column } if column == "TOV"));
    }

    #[test]
    fn test_missing_games_column_is_allowed() {
        let csv_data = "Player,eFG%,TRB,AST,STL,BLK,TOV,PF\nA,0.5,1,1,1,1,1,1\n";
        let table = load_table_from_reader(csv_data.as_bytes(), b',').unwrap();
        assert!(!table.has_games_played);
        assert_eq!(table.rows[0].games_played, None);
    }

    #[test]
    fn test_empty_cells_become_missing() {
        let csv_data = "Player,G,eFG%,TRB,AST,STL,BLK,TOV,PF\nA,,,5,1,1,1,1,1\n";
        let table = load_table_from_reader(csv_data.as_bytes(), b',').unwrap();
        assert_eq!(table.rows[0].games_played, None);
        assert!(table.rows[0].effective_field_goal_pct.is_nan());
        assert_eq!(table.rows[0].total_rebounds, 5.0);
    }

    #[test]
    fn test_invalid_value_names_row_and_column() {
        let csv_data = "Player,G,eFG%,TRB,AST,STL,BLK,TOV,PF\nA,10,0.5,1,1,1,1,1,1\nB,12,0.5,1,lots,1,1,1,1\n";
        let err = load_table_from_reader(csv_data.as_bytes(), b',').unwrap_err();
        match err {
            ImpactError::InvalidValue { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "AST");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_games_as_float() {
        assert_eq!(parse_games("70.0", 1).unwrap(), Some(70));
        assert!(parse_games("70.5", 1).is_err());
        assert!(parse_games("-3", 1).is_err());
    }

    #[test]
    fn test_duplicate_names_are_kept() {
        let csv_data = "Player,G,eFG%,TRB,AST,STL,BLK,TOV,PF\n\
                        Dennis Schroder,51,0.5,2.8,6.0,0.8,0.2,1.9,1.7\n\
                        Dennis Schroder,29,0.5,3.0,5.0,0.9,0.1,1.5,1.9\n";
        let table = load_table_from_reader(csv_data.as_bytes(), b',').unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let csv_data = "Player;G;eFG%;TRB;AST;STL;BLK;TOV;PF\nA;10;0.5;1;2;3;4;5;6\n";
        let table = load_table_from_reader(csv_data.as_bytes(), b';').unwrap();
        assert_eq!(table.rows[0].personal_fouls, 6.0);
    }

    #[test]
    fn test_load_table_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Player,G,eFG%,TRB,AST,STL,BLK,TOV,PF").unwrap();
        writeln!(file, "Kobe Bufkin,17,0.433,1.6,1.9,0.5,0.2,0.8,1.3").unwrap();

        let table = load_table(file.path(), b',').unwrap();
        assert_eq!(table.rows[0].player, "Kobe Bufkin");
    }

    #[test]
    fn test_load_table_missing_file() {
        let err = load_table("/nonexistent/stats.csv", b',').unwrap_err();
        assert!(matches!(err, ImpactError::Io { .. }));
    }
}
