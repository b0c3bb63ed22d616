pub mod config;
pub mod engine;
pub mod fit;
pub mod validation;

pub use config::{ScoringConfig, Weights};
pub use engine::{score, Component, ProgressScorer, ScoreBreakdown};
pub use fit::{fit, ColumnFit, FitParameters, ScaledRow};
pub use validation::validate_scoring;
