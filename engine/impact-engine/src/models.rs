use serde::Serialize;

/// One player's regular season aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRow {
    /// Player name (not unique: traded players can appear more than once)
    pub player: String,
    /// Games played, `None` when the value or the whole column is missing
    pub games_played: Option<u32>,
    /// eFG%, typically 0.0 to 1.0
    pub effective_field_goal_pct: f64,
    pub assists: f64,
    pub turnovers: f64,
    pub total_rebounds: f64,
    pub steals: f64,
    pub blocks: f64,
    pub personal_fouls: f64,
}

impl PlayerRow {
    /// Create a row with every per-game stat specified
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        player: impl Into<String>,
        games_played: Option<u32>,
        effective_field_goal_pct: f64,
        assists: f64,
        turnovers: f64,
        total_rebounds: f64,
        steals: f64,
        blocks: f64,
        personal_fouls: f64,
    ) -> Self {
        Self {
            player: player.into(),
            games_played,
            effective_field_goal_pct,
            assists,
            turnovers,
            total_rebounds,
            steals,
            blocks,
            personal_fouls,
        }
    }
}

/// Ordered player rows plus the schema facts the pipeline depends on
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerTable {
    pub rows: Vec<PlayerRow>,
    /// Whether the source carried a games-played column
    pub has_games_played: bool,
}

impl PlayerTable {
    pub fn new(rows: Vec<PlayerRow>, has_games_played: bool) -> Self {
        Self { rows, has_games_played }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// League-wide means of each stat over the filtered table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeagueAverages {
    pub effective_field_goal_pct: f64,
    pub assists: f64,
    pub turnovers: f64,
    pub total_rebounds: f64,
    pub steals: f64,
    pub blocks: f64,
    pub personal_fouls: f64,
}

impl LeagueAverages {
    /// The league-average pseudo-player the scaling factor is derived from
    pub fn as_row(&self) -> PlayerRow {
        PlayerRow::new(
            "League Average",
            None,
            self.effective_field_goal_pct,
            self.assists,
            self.turnovers,
            self.total_rebounds,
            self.steals,
            self.blocks,
            self.personal_fouls,
        )
    }
}

/// League sub-scores and the normalization derived from them
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeagueScores {
    pub playmaking: f64,
    pub defense: f64,
    pub raw_impact_plus: f64,
    /// 100 / raw_impact_plus
    pub scaling_factor: f64,
}

impl LeagueScores {
    /// Normalized league-average Impact Plus (100 by construction)
    pub fn normalized_impact_plus(&self) -> f64 {
        self.raw_impact_plus * self.scaling_factor
    }
}

/// A player row annotated with its normalized Impact Plus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactRow {
    #[serde(flatten)]
    pub stats: PlayerRow,
    pub impact_plus: f64,
}

/// Players and their names, the common surface for lookups
pub trait NamedRow {
    fn name(&self) -> &str;
}

impl NamedRow for PlayerRow {
    fn name(&self) -> &str {
        &self.player
    }
}

impl NamedRow for ImpactRow {
    fn name(&self) -> &str {
        &self.stats.player
    }
}

/// Where a player sits relative to the league average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Above,
    Below,
    AtAverage,
    /// The player's score is NaN (missing stats)
    Undetermined,
}

/// One player's normalized Impact Plus against the league average
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerComparison {
    pub player: String,
    pub impact_plus: f64,
    pub league_impact_plus: f64,
    /// Absolute distance from the league average, in Impact Plus points
    pub difference: f64,
    pub verdict: Verdict,
}

impl PlayerComparison {
    pub fn new(player: String, impact_plus: f64, league_impact_plus: f64) -> Self {
        let verdict = if impact_plus.is_nan() || league_impact_plus.is_nan() {
            Verdict::Undetermined
        } else if impact_plus > league_impact_plus {
            Verdict::Above
        } else if impact_plus < league_impact_plus {
            Verdict::Below
        } else {
            Verdict::AtAverage
        };

        Self {
            player,
            impact_plus,
            league_impact_plus,
            difference: (impact_plus - league_impact_plus).abs(),
            verdict,
        }
    }
}
