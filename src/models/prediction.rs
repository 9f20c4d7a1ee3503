use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::outcome::Outcome;

/// Decimal (European) odds for the three outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOdds {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl MatchOdds {
    pub fn new(home: f64, draw: f64, away: f64) -> Self {
        Self { home, draw, away }
    }

    pub fn for_outcome(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }
}

/// Probability distribution over {home, draw, away}.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OutcomeProbabilities {
    pub fn for_outcome(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    pub fn total(&self) -> f64 {
        self.home + self.draw + self.away
    }

    /// Argmax with ties resolved home, then away, then draw.
    pub fn most_likely(&self) -> Outcome {
        if self.home >= self.draw.max(self.away) {
            Outcome::Home
        } else if self.away >= self.home.max(self.draw) {
            Outcome::Away
        } else {
            Outcome::Draw
        }
    }
}

/// Intermediate values of a fusion, kept for display and auditing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionDiagnostics {
    pub odds_weight: f64,
    pub form_weight: f64,
    pub form_home: f64,
    pub form_away: f64,
    pub goal_diff_home: f64,
    pub goal_diff_away: f64,
    pub adjust_home: f64,
    pub adjust_away: f64,
    /// Overround-free probabilities before blending.
    pub implied: OutcomeProbabilities,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PredictionState {
    Open,
    Settled {
        result: Outcome,
        gain: Decimal,
        correct: bool,
        settled_at: DateTime<Utc>,
    },
}

/// One fused estimate for a fixture. Immutable apart from the single
/// open -> settled transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: Uuid,
    pub home: String,
    pub away: String,
    pub odds: MatchOdds,
    pub probabilities: OutcomeProbabilities,
    pub predicted: Outcome,
    pub stake: Decimal,
    pub diagnostics: FusionDiagnostics,
    pub created_at: DateTime<Utc>,
    pub state: PredictionState,
}

impl Prediction {
    pub fn is_open(&self) -> bool {
        matches!(self.state, PredictionState::Open)
    }

    pub fn is_settled(&self) -> bool {
        !self.is_open()
    }

    pub fn result(&self) -> Option<Outcome> {
        match self.state {
            PredictionState::Settled { result, .. } => Some(result),
            PredictionState::Open => None,
        }
    }

    pub fn gain(&self) -> Option<Decimal> {
        match self.state {
            PredictionState::Settled { gain, .. } => Some(gain),
            PredictionState::Open => None,
        }
    }

    pub fn correct(&self) -> Option<bool> {
        match self.state {
            PredictionState::Settled { correct, .. } => Some(correct),
            PredictionState::Open => None,
        }
    }

    /// Probability assigned to the predicted outcome.
    pub fn predicted_probability(&self) -> f64 {
        self.probabilities.for_outcome(self.predicted)
    }

    /// Decimal odds of the predicted outcome.
    pub fn predicted_odds(&self) -> f64 {
        self.odds.for_outcome(self.predicted)
    }

    /// Display name of the predicted side ("Draw" for a draw).
    pub fn predicted_name(&self) -> &str {
        match self.predicted {
            Outcome::Home => &self.home,
            Outcome::Away => &self.away,
            Outcome::Draw => "Draw",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probs(home: f64, draw: f64, away: f64) -> OutcomeProbabilities {
        OutcomeProbabilities { home, draw, away }
    }

    #[test]
    fn test_most_likely_argmax() {
        assert_eq!(probs(0.5, 0.3, 0.2).most_likely(), Outcome::Home);
        assert_eq!(probs(0.2, 0.3, 0.5).most_likely(), Outcome::Away);
        assert_eq!(probs(0.3, 0.4, 0.3).most_likely(), Outcome::Draw);
    }

    #[test]
    fn test_most_likely_tie_break() {
        // home wins every tie it is part of, away beats draw
        assert_eq!(probs(0.4, 0.2, 0.4).most_likely(), Outcome::Home);
        assert_eq!(probs(0.4, 0.4, 0.2).most_likely(), Outcome::Home);
        assert_eq!(probs(0.2, 0.4, 0.4).most_likely(), Outcome::Away);
    }

    #[test]
    fn test_state_serializes_tagged() {
        let json = serde_json::to_value(PredictionState::Open).unwrap();
        assert_eq!(json["state"], "open");
    }
}
