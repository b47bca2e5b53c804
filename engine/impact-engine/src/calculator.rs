use crate::config::ImpactWeights;
use crate::models::{LeagueAverages, PlayerRow};

/// The Impact Plus formula, parameterized by its weights.
///
/// Every method is a pure linear combination; NaN inputs yield NaN outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpactCalculator {
    weights: ImpactWeights,
}

impl ImpactCalculator {
    /// Create a new calculator
    pub fn new(weights: ImpactWeights) -> Self {
        Self { weights }
    }

    /// Playmaking = 0.7*AST + 0.3*TOV
    ///
    /// Turnovers add to the score rather than subtract from it.
    pub fn playmaking_score(&self, assists: f64, turnovers: f64) -> f64 {
        self.weights.assists * assists + self.weights.turnovers * turnovers
    }

    /// Defense = 0.4*STL + 0.4*BLK + 0.2*PF
    ///
    /// Personal fouls add to the score as well.
    pub fn defensive_score(&self, steals: f64, blocks: f64, personal_fouls: f64) -> f64 {
        self.weights.steals * steals + self.weights.blocks * blocks + self.weights.fouls * personal_fouls
    }

    /// Impact Plus (raw) = 0.4*eFG% + 0.3*Playmaking + 0.2*TRB + 0.1*Defense
    pub fn raw_impact_plus(&self, row: &PlayerRow) -> f64 {
        let playmaking = self.playmaking_score(row.assists, row.turnovers);
        let defense = self.defensive_score(row.steals, row.blocks, row.personal_fouls);

        self.weights.efg * row.effective_field_goal_pct
            + self.weights.playmaking * playmaking
            + self.weights.rebounds * row.total_rebounds
            + self.weights.defense * defense
    }

    /// League playmaking sub-score from the averages
    pub fn league_playmaking(&self, averages: &LeagueAverages) -> f64 {
        self.playmaking_score(averages.assists, averages.turnovers)
    }

    /// League defensive sub-score from the averages
    pub fn league_defense(&self, averages: &LeagueAverages) -> f64 {
        self.defensive_score(averages.steals, averages.blocks, averages.personal_fouls)
    }

    /// Raw Impact Plus of the league-average pseudo-row
    pub fn league_raw_impact_plus(&self, averages: &LeagueAverages) -> f64 {
        self.raw_impact_plus(&averages.as_row())
    }
}
