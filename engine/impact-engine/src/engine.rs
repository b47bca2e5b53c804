use std::cmp::Ordering;

use tracing::{debug, info, warn};

use crate::{
    calculator::ImpactCalculator,
    config::ImpactConfig,
    error::{ImpactError, Result},
    models::{
        ImpactRow, LeagueAverages, LeagueScores, NamedRow, PlayerComparison, PlayerRow,
        PlayerTable,
    },
};

/// Normalized Impact Plus of the league-average player
pub const LEAGUE_AVERAGE_IMPACT_PLUS: f64 = 100.0;

/// Rows that survived the games-played filter
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredTable {
    pub rows: Vec<PlayerRow>,
    /// Median games played used as the cutoff, `None` when no filtering happened
    pub threshold: Option<f64>,
}

/// Everything the pipeline derives from one input table
#[derive(Debug, Clone)]
pub struct ImpactAnalysis {
    /// Row count before filtering
    pub input_rows: usize,
    pub threshold: Option<f64>,
    pub averages: LeagueAverages,
    pub league: LeagueScores,
    /// Filtered rows in input order, each with its Impact Plus
    pub annotated: Vec<ImpactRow>,
    /// `annotated` sorted by Impact Plus, best first
    pub ranking: Vec<ImpactRow>,
}

impl ImpactAnalysis {
    pub fn top(&self, n: usize) -> &[ImpactRow] {
        top_n(&self.ranking, n)
    }

    pub fn bottom(&self, n: usize) -> &[ImpactRow] {
        bottom_n(&self.ranking, n)
    }

    /// Compare a player's Impact Plus against the league average (first match by name)
    pub fn compare_player(&self, name: &str) -> Result<PlayerComparison> {
        let row = lookup_first(&self.annotated, name)?;
        Ok(PlayerComparison::new(
            row.stats.player.clone(),
            row.impact_plus,
            self.league.normalized_impact_plus(),
        ))
    }

    /// Rows at zero-based positions of the filtered table
    pub fn rows_at(&self, positions: &[usize]) -> Result<Vec<&ImpactRow>> {
        lookup_by_positions(&self.annotated, positions)
    }

    /// Every row for each requested name
    pub fn rows_named<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&ImpactRow>> {
        lookup_by_names(&self.annotated, names)
    }
}

/// Impact Plus pipeline: filter, league averages, normalization, annotation, ranking
#[derive(Debug, Clone)]
pub struct ImpactEngine {
    calculator: ImpactCalculator,
    filter_by_median_games: bool,
}

impl ImpactEngine {
    pub fn new(config: &ImpactConfig) -> Self {
        Self {
            calculator: ImpactCalculator::new(config.weights),
            filter_by_median_games: config.filter.median_games,
        }
    }

    /// Keep players with games played >= the median over the whole table.
    ///
    /// A table without a games-played column is returned unchanged. Rows with
    /// no games value never pass the cutoff.
    pub fn filter(&self, table: &PlayerTable) -> FilteredTable {
        if !self.filter_by_median_games {
            debug!("Games-played filter disabled, keeping all {} rows", table.len());
            return FilteredTable { rows: table.rows.clone(), threshold: None };
        }

        if !table.has_games_played {
            warn!("Games played column not found, skipping median filter");
            return FilteredTable { rows: table.rows.clone(), threshold: None };
        }

        let threshold = median_games(&table.rows);
        let rows: Vec<PlayerRow> = match threshold {
            Some(t) => table
                .rows
                .iter()
                .filter(|row| row.games_played.is_some_and(|g| f64::from(g) >= t))
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        info!(
            "Filtered to {} of {} players with games played >= {:?}",
            rows.len(),
            table.len(),
            threshold
        );

        FilteredTable { rows, threshold }
    }

    /// Mean of each stat across the filtered rows. NaN cells are skipped.
    pub fn league_averages(&self, rows: &[PlayerRow]) -> Result<LeagueAverages> {
        if rows.is_empty() {
            return Err(ImpactError::EmptyTable(
                "cannot compute league averages over zero rows".to_string(),
            ));
        }

        let averages = LeagueAverages {
            effective_field_goal_pct: mean(rows.iter().map(|r| r.effective_field_goal_pct)),
            assists: mean(rows.iter().map(|r| r.assists)),
            turnovers: mean(rows.iter().map(|r| r.turnovers)),
            total_rebounds: mean(rows.iter().map(|r| r.total_rebounds)),
            steals: mean(rows.iter().map(|r| r.steals)),
            blocks: mean(rows.iter().map(|r| r.blocks)),
            personal_fouls: mean(rows.iter().map(|r| r.personal_fouls)),
        };

        debug!("League averages: {:?}", averages);
        Ok(averages)
    }

    /// League sub-scores and the scaling factor `100 / league raw Impact Plus`
    pub fn league_scores(&self, averages: &LeagueAverages) -> Result<LeagueScores> {
        let playmaking = self.calculator.league_playmaking(averages);
        let defense = self.calculator.league_defense(averages);
        let raw_impact_plus = self.calculator.league_raw_impact_plus(averages);

        if !raw_impact_plus.is_finite() {
            return Err(ImpactError::NonFiniteLeagueImpact { value: raw_impact_plus });
        }
        if raw_impact_plus == 0.0 {
            return Err(ImpactError::DivisionByZero);
        }

        let scaling_factor = LEAGUE_AVERAGE_IMPACT_PLUS / raw_impact_plus;
        info!(
            "League raw Impact Plus {:.4}, scaling factor {:.4}",
            raw_impact_plus, scaling_factor
        );

        Ok(LeagueScores { playmaking, defense, raw_impact_plus, scaling_factor })
    }

    /// Attach `impact_plus = raw * scaling_factor` to every row, in order
    pub fn annotate<'a, I>(&self, rows: I, scaling_factor: f64) -> Vec<ImpactRow>
    where
        I: IntoIterator<Item = &'a PlayerRow>,
    {
        rows.into_iter()
            .map(|stats| ImpactRow {
                impact_plus: self.calculator.raw_impact_plus(stats) * scaling_factor,
                stats: stats.clone(),
            })
            .collect()
    }

    /// Run the whole pipeline over a loaded table
    pub fn analyze(&self, table: &PlayerTable) -> Result<ImpactAnalysis> {
        info!("🏀 Computing Impact Plus for {} players", table.len());

        if table.is_empty() {
            return Err(ImpactError::EmptyTable("input table has no rows".to_string()));
        }

        let filtered = self.filter(table);
        if filtered.rows.is_empty() {
            return Err(ImpactError::EmptyTable(format!(
                "no players left after filtering at {:?} games",
                filtered.threshold
            )));
        }

        let averages = self.league_averages(&filtered.rows)?;
        let league = self.league_scores(&averages)?;
        let annotated = self.annotate(&filtered.rows, league.scaling_factor);
        let ranking = rank(&annotated);

        if let Some(best) = ranking.first() {
            debug!("Top player: {} ({:.2})", best.name(), best.impact_plus);
        }

        Ok(ImpactAnalysis {
            input_rows: table.len(),
            threshold: filtered.threshold,
            averages,
            league,
            annotated,
            ranking,
        })
    }
}

/// Median games played over rows that have a value; even counts average the middle pair
pub fn median_games(rows: &[PlayerRow]) -> Option<f64> {
    let mut games: Vec<u32> = rows.iter().filter_map(|r| r.games_played).collect();
    if games.is_empty() {
        return None;
    }
    games.sort_unstable();

    let mid = games.len() / 2;
    if games.len() % 2 == 0 {
        Some((f64::from(games[mid - 1]) + f64::from(games[mid])) / 2.0)
    } else {
        Some(f64::from(games[mid]))
    }
}

fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Descending by score with NaN last
fn by_impact_desc(a: &ImpactRow, b: &ImpactRow) -> Ordering {
    match (a.impact_plus.is_nan(), b.impact_plus.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.impact_plus.partial_cmp(&a.impact_plus).unwrap_or(Ordering::Equal),
    }
}

/// Stable sort by Impact Plus, highest first. Ties keep their input order.
pub fn rank(rows: &[ImpactRow]) -> Vec<ImpactRow> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(by_impact_desc);
    ranked
}

/// First `n` rows, or all of them when `n` exceeds the length
pub fn top_n<T>(ranked: &[T], n: usize) -> &[T] {
    &ranked[..n.min(ranked.len())]
}

/// Last `n` rows, or all of them when `n` exceeds the length
pub fn bottom_n<T>(ranked: &[T], n: usize) -> &[T] {
    &ranked[ranked.len().saturating_sub(n)..]
}

/// Every row whose player name equals `name`, in table order
pub fn lookup_by_name<'a, T: NamedRow>(rows: &'a [T], name: &str) -> Result<Vec<&'a T>> {
    let matches: Vec<&T> = rows.iter().filter(|row| row.name() == name).collect();
    if matches.is_empty() {
        return Err(ImpactError::NameNotFound { name: name.to_string() });
    }
    if matches.len() > 1 {
        debug!("{} rows share the name '{}'", matches.len(), name);
    }
    Ok(matches)
}

/// First row whose player name equals `name`
pub fn lookup_first<'a, T: NamedRow>(rows: &'a [T], name: &str) -> Result<&'a T> {
    rows.iter()
        .find(|row| row.name() == name)
        .ok_or_else(|| ImpactError::NameNotFound { name: name.to_string() })
}

/// Rows for each name in request order; fails on the first name with no rows
pub fn lookup_by_names<'a, T: NamedRow, S: AsRef<str>>(
    rows: &'a [T],
    names: &[S],
) -> Result<Vec<&'a T>> {
    let mut found = Vec::new();
    for name in names {
        found.extend(lookup_by_name(rows, name.as_ref())?);
    }
    Ok(found)
}

/// Rows at zero-based positions; fails naming the first position past the end
pub fn lookup_by_positions<'a, T>(rows: &'a [T], positions: &[usize]) -> Result<Vec<&'a T>> {
    positions
        .iter()
        .map(|&index| {
            rows.get(index).ok_or(ImpactError::IndexOutOfRange { index, len: rows.len() })
        })
        .collect()
}
