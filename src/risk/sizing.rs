use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::config::StakingConfig;

/// How the stake of a new prediction is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeMode {
    /// Same unit stake on every prediction.
    Fixed,
    /// Fraction of bankroll given by (fractional) Kelly on the predicted side.
    Kelly,
}

impl FromStr for StakeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(StakeMode::Fixed),
            "kelly" => Ok(StakeMode::Kelly),
            other => Err(format!("unknown stake mode '{other}'")),
        }
    }
}

/// Position sizing utilities for decimal-odds bets.
///
/// Implements expected value and Kelly criterion sizing.
pub struct Sizing;

impl Sizing {
    /// Net payout per unit staked: a winning bet at decimal odds `o` returns `o - 1`.
    pub fn payout_odds(decimal_odds: f64) -> f64 {
        if !decimal_odds.is_finite() || decimal_odds <= 1.0 {
            return 0.0;
        }
        decimal_odds - 1.0
    }

    /// Expected profit per unit staked.
    ///
    /// EV = p*b - (1-p)
    pub fn expected_value(win_prob: f64, payout_odds: f64) -> f64 {
        win_prob * payout_odds - (1.0 - win_prob)
    }

    /// Full Kelly fraction, floored at zero.
    ///
    /// f* = (b*p - q) / b
    /// where b = payout odds, p = win probability, q = 1-p
    pub fn kelly_fraction(win_prob: f64, payout_odds: f64) -> f64 {
        if payout_odds <= 0.0 || win_prob <= 0.0 {
            return 0.0;
        }
        if win_prob >= 1.0 {
            return 1.0;
        }

        let lose_prob = 1.0 - win_prob;
        let kelly = (payout_odds * win_prob - lose_prob) / payout_odds;

        kelly.max(0.0)
    }

    /// Fractional Kelly with a hard cap on the bankroll share.
    pub fn fractional_kelly(win_prob: f64, payout_odds: f64, multiplier: f64, cap: f64) -> f64 {
        (Self::kelly_fraction(win_prob, payout_odds) * multiplier).clamp(0.0, cap)
    }

    /// Money amount for a bankroll fraction, rounded to cents.
    pub fn stake_from_fraction(bankroll: Decimal, fraction: f64) -> Decimal {
        let fraction = Decimal::from_f64_retain(fraction).unwrap_or(Decimal::ZERO);
        (bankroll * fraction).round_dp(2).max(Decimal::ZERO)
    }
}

/// Chooses the stake fixed on a prediction at creation time.
#[derive(Debug, Clone)]
pub struct StakePolicy {
    config: StakingConfig,
}

impl StakePolicy {
    pub fn new(config: StakingConfig) -> Self {
        Self { config }
    }

    /// Stake for a bet on a side priced at `decimal_odds` with win probability `win_prob`.
    pub fn stake_for(&self, win_prob: f64, decimal_odds: f64) -> Decimal {
        match self.config.stake_mode {
            StakeMode::Fixed => self.config.fixed_stake,
            StakeMode::Kelly => {
                let fraction = self.kelly_bankroll_fraction(win_prob, decimal_odds);
                Sizing::stake_from_fraction(self.config.bankroll, fraction)
            }
        }
    }

    pub fn kelly_bankroll_fraction(&self, win_prob: f64, decimal_odds: f64) -> f64 {
        Sizing::fractional_kelly(
            win_prob,
            Sizing::payout_odds(decimal_odds),
            self.config.kelly_multiplier,
            self.config.max_bankroll_fraction,
        )
    }

    pub fn config(&self) -> &StakingConfig {
        &self.config
    }
}
