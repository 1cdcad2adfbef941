pub mod advice;
pub mod band;
pub mod components;
pub mod config;
pub mod engine;
pub mod factors;
pub mod validation;

pub use advice::recommendations;
pub use band::{binary_category, BandConfig, ScoreBand};
pub use config::*;
pub use engine::{
    calculate_score, ComponentScores, FactorContribution, ScoreResult, Scorer, WeightedScores,
};
pub use factors::RangeOp;
pub use validation::validate_scoring;
