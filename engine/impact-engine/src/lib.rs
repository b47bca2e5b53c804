//! Impact Plus Engine
//!
//! Computes a league-normalized composite metric ("Impact Plus") from
//! regular season basketball box scores. Players are filtered at the median
//! games played, league averages define a scaling factor that pins the
//! league-average player at 100, and every player is scored and ranked.

pub mod calculator;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;
pub mod report;

pub use calculator::ImpactCalculator;
pub use config::ImpactConfig;
pub use engine::{ImpactAnalysis, ImpactEngine};
pub use error::ImpactError;
pub use models::*;
pub use report::ImpactReport;
