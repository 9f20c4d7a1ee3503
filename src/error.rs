use thiserror::Error;
use uuid::Uuid;

use crate::models::outcome::{Outcome, Scoreline};

/// Errors surfaced by the prediction engine and the desk around it.
///
/// All variants are recoverable; the caller decides how to report them.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid {side} odds {value}: decimal odds must be greater than 1.0")]
    InvalidOdds { side: &'static str, value: f64 },

    #[error("degenerate input: {0}")]
    DegenerateInput(&'static str),

    #[error("prediction {0} is already settled")]
    AlreadySettled(Uuid),

    #[error("unknown team '{0}'")]
    UnknownTeam(String),

    #[error("unknown prediction {0}")]
    UnknownPrediction(Uuid),

    #[error("a team cannot play itself ('{0}')")]
    SameTeam(String),

    #[error("prediction {prediction} is {expected_home} vs {expected_away}, got {home} vs {away}")]
    TeamMismatch {
        prediction: Uuid,
        expected_home: String,
        expected_away: String,
        home: String,
        away: String,
    },

    #[error("scoreline {scoreline} contradicts result {result:?}")]
    ScorelineMismatch { scoreline: Scoreline, result: Outcome },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
