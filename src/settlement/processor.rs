use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::config::SettlementConfig;
use crate::error::{EngineError, Result};
use crate::models::outcome::{Outcome, Scoreline};
use crate::models::prediction::{Prediction, PredictionState};
use crate::models::team::Team;

/// How a drawn match is paid when the prediction was not a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawPolicy {
    /// The stake is lost like any other miss.
    Loss,
    /// The stake is returned: gain 0.
    Push,
}

impl FromStr for DrawPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loss" => Ok(DrawPolicy::Loss),
            "push" => Ok(DrawPolicy::Push),
            other => Err(format!("unknown draw policy '{other}'")),
        }
    }
}

/// Everything a settlement changes. Persist all three records together.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub prediction: Prediction,
    pub home: Team,
    pub away: Team,
}

/// Settles predictions against real results.
pub struct SettlementProcessor {
    config: SettlementConfig,
}

impl SettlementProcessor {
    pub fn new(config: SettlementConfig) -> Self {
        Self { config }
    }

    /// Realized gain for a stake on `predicted` at `odds` once `result` is known.
    pub fn gain(&self, predicted: Outcome, result: Outcome, odds: f64, stake: Decimal) -> Decimal {
        if predicted == result {
            let net = Decimal::from_f64_retain(odds - 1.0).unwrap_or(Decimal::ZERO);
            return (stake * net).round_dp(self.config.gain_decimals);
        }
        match (result, self.config.draw_policy) {
            (Outcome::Draw, DrawPolicy::Push) => Decimal::ZERO,
            _ => -stake.round_dp(self.config.gain_decimals),
        }
    }

    /// Settle an open prediction and derive the new team records.
    ///
    /// Returns `AlreadySettled` without touching anything if the prediction
    /// has been settled before.
    pub fn settle(
        &self,
        prediction: &Prediction,
        home: &Team,
        away: &Team,
        result: Outcome,
        scoreline: Option<Scoreline>,
    ) -> Result<Settlement> {
        if prediction.is_settled() {
            return Err(EngineError::AlreadySettled(prediction.id));
        }
        if home.name != prediction.home || away.name != prediction.away {
            return Err(EngineError::TeamMismatch {
                prediction: prediction.id,
                expected_home: prediction.home.clone(),
                expected_away: prediction.away.clone(),
                home: home.name.clone(),
                away: away.name.clone(),
            });
        }
        if let Some(score) = scoreline {
            if score.outcome() != result {
                return Err(EngineError::ScorelineMismatch {
                    scoreline: score,
                    result,
                });
            }
        }

        let correct = prediction.predicted == result;
        // Paid at the price of the side we backed, not the side that won.
        let gain = self.gain(
            prediction.predicted,
            result,
            prediction.predicted_odds(),
            prediction.stake,
        );

        let mut settled = prediction.clone();
        settled.state = PredictionState::Settled {
            result,
            gain,
            correct,
            settled_at: Utc::now(),
        };

        let (home_form, away_form) = result.form_results();
        let mut home = home.clone();
        let mut away = away.clone();
        home.push_result(home_form);
        away.push_result(away_form);

        if let Some(score) = scoreline {
            home.record_goals(score.home, score.away);
            away.record_goals(score.away, score.home);
        }

        tracing::debug!(
            prediction = %prediction.id,
            %result,
            correct,
            %gain,
            "settled"
        );

        Ok(Settlement {
            prediction: settled,
            home,
            away,
        })
    }
}

impl Default for SettlementProcessor {
    fn default() -> Self {
        Self::new(SettlementConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_gain_on_correct_pick() {
        let p = SettlementProcessor::default();
        assert_eq!(p.gain(Outcome::Home, Outcome::Home, 2.0, dec!(10)), dec!(10));
        assert_eq!(p.gain(Outcome::Away, Outcome::Away, 3.35, dec!(10)), dec!(23.50));
    }

    #[test]
    fn test_draw_is_full_loss_by_default() {
        let p = SettlementProcessor::default();
        assert_eq!(p.gain(Outcome::Home, Outcome::Draw, 2.0, dec!(10)), dec!(-10));
        assert_eq!(p.gain(Outcome::Home, Outcome::Away, 2.0, dec!(10)), dec!(-10));
    }

    #[test]
    fn test_draw_push_policy() {
        let p = SettlementProcessor::new(SettlementConfig {
            draw_policy: DrawPolicy::Push,
            ..SettlementConfig::default()
        });
        assert_eq!(p.gain(Outcome::Home, Outcome::Draw, 2.0, dec!(10)), Decimal::ZERO);
        // Only draws push; other misses still lose
        assert_eq!(p.gain(Outcome::Home, Outcome::Away, 2.0, dec!(10)), dec!(-10));
        // A correctly predicted draw still pays
        assert_eq!(p.gain(Outcome::Draw, Outcome::Draw, 3.4, dec!(10)), dec!(24));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("PUSH".parse::<DrawPolicy>(), Ok(DrawPolicy::Push));
        assert!("refund".parse::<DrawPolicy>().is_err());
    }
}
