use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::outcome::Outcome;
use crate::models::prediction::Prediction;
use crate::risk::sizing::{Sizing, StakePolicy};

/// One ranked entry of the staking advisory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advice {
    pub prediction: Prediction,
    pub outcome: Outcome,
    pub probability: f64,
    pub odds: f64,
    pub expected_value: f64,
    /// Full Kelly fraction of bankroll, never negative.
    pub kelly_fraction: f64,
    /// What the configured bankroll/multiplier would put on it.
    pub suggested_stake: Decimal,
}

/// Ranks open predictions by expected value of their predicted side.
pub struct StakingAdvisor {
    policy: StakePolicy,
}

impl StakingAdvisor {
    pub fn new(policy: StakePolicy) -> Self {
        Self { policy }
    }

    pub fn evaluate(&self, prediction: &Prediction) -> Advice {
        let outcome = prediction.predicted;
        let probability = prediction.predicted_probability();
        let odds = prediction.predicted_odds();
        let b = Sizing::payout_odds(odds);
        let fraction = self.policy.kelly_bankroll_fraction(probability, odds);

        Advice {
            prediction: prediction.clone(),
            outcome,
            probability,
            odds,
            expected_value: Sizing::expected_value(probability, b),
            kelly_fraction: Sizing::kelly_fraction(probability, b),
            suggested_stake: Sizing::stake_from_fraction(self.policy.config().bankroll, fraction),
        }
    }

    /// Top `top_n` open predictions, best expected value first. Settled
    /// predictions are ignored; equal EVs keep their input order.
    pub fn advise(&self, predictions: &[Prediction], top_n: usize) -> Vec<Advice> {
        let mut ranked: Vec<Advice> = predictions
            .iter()
            .filter(|p| p.is_open())
            .map(|p| self.evaluate(p))
            .collect();

        ranked.sort_by(|a, b| b.expected_value.total_cmp(&a.expected_value));
        ranked.truncate(top_n);
        ranked
    }
}
