use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::risk::sizing::StakeMode;
use crate::settlement::processor::DrawPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub fusion: FusionConfig,
    pub settlement: SettlementConfig,
    pub staking: StakingConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    pub home_advantage: f64,      // Multiplicative boost on the home side (e.g. 0.08)
    pub odds_weight_floor: f64,   // Market weight when the two sides are priced evenly
    pub odds_weight_ceiling: f64, // Market weight cap for lopsided fixtures
    pub odds_weight_slope: f64,   // Extra market weight per unit of odds ratio above 1
    pub adjustment_scale: f64,    // Scales form/goal-diff edge into roughly +/-15%
    pub form_share: f64,          // Share of the edge coming from form
    pub goal_diff_share: f64,     // Share of the edge coming from goal differential
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementConfig {
    pub draw_policy: DrawPolicy,
    pub gain_decimals: u32, // Gains are rounded to this many decimals (cents)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingConfig {
    pub stake_mode: StakeMode,
    pub fixed_stake: Decimal,
    pub bankroll: Decimal,
    pub kelly_multiplier: f64,      // Fractional Kelly (1.0 = full Kelly)
    pub max_bankroll_fraction: f64, // Hard cap on a single Kelly stake
    pub top_n: usize,               // Size of the staking advisory
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_json: bool,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            home_advantage: 0.08,
            odds_weight_floor: 0.6,
            odds_weight_ceiling: 0.9,
            odds_weight_slope: 0.15,
            adjustment_scale: 0.15,
            form_share: 0.6,
            goal_diff_share: 0.4,
        }
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            draw_policy: DrawPolicy::Loss,
            gain_decimals: 2,
        }
    }
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            stake_mode: StakeMode::Fixed,
            fixed_stake: dec!(10),
            bankroll: dec!(100),
            kelly_multiplier: 1.0,
            max_bankroll_fraction: 0.50,
            top_n: 5,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            log_json: false,
        }
    }
}

/// Parse an env var into `T`, keeping the current value when unset or malformed.
/// Malformed values are reported in `warnings`.
fn env_override<T: FromStr>(key: &str, target: &mut T, warnings: &mut Vec<String>) {
    let Ok(raw) = std::env::var(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *target = value,
        Err(_) => warnings.push(format!("Ignoring {key}={raw:?}: not a valid value")),
    }
}

impl Config {
    /// Load configuration from environment variables (.env file) with defaults.
    ///
    /// Optional env vars:
    ///   PRONO_STAKE_MODE — fixed | kelly (default: fixed)
    ///   PRONO_FIXED_STAKE — unit stake (default: 10)
    ///   PRONO_BANKROLL — bankroll for Kelly staking (default: 100)
    ///   PRONO_KELLY_MULTIPLIER — fractional Kelly (default: 1.0)
    ///   PRONO_DRAW_POLICY — loss | push (default: loss)
    ///   PRONO_TOP_N — advisory length (default: 5)
    ///   PRONO_HOME_ADVANTAGE — home boost (default: 0.08)
    ///   RUST_LOG — log level (default: info)
    ///   PRONO_LOG_JSON — "true" for JSON log lines
    ///
    /// Runs before logging is set up, so rejected values come back as
    /// warnings for the caller to log once the subscriber exists.
    pub fn load_or_default() -> (Self, Vec<String>) {
        let _ = dotenv::dotenv();

        let mut config = Self::default();
        let mut warnings = Vec::new();

        env_override("PRONO_STAKE_MODE", &mut config.staking.stake_mode, &mut warnings);
        env_override("PRONO_FIXED_STAKE", &mut config.staking.fixed_stake, &mut warnings);
        env_override("PRONO_BANKROLL", &mut config.staking.bankroll, &mut warnings);
        env_override("PRONO_KELLY_MULTIPLIER", &mut config.staking.kelly_multiplier, &mut warnings);
        env_override("PRONO_TOP_N", &mut config.staking.top_n, &mut warnings);
        env_override("PRONO_DRAW_POLICY", &mut config.settlement.draw_policy, &mut warnings);
        env_override("PRONO_HOME_ADVANTAGE", &mut config.fusion.home_advantage, &mut warnings);

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.telemetry.log_level = level;
        }
        config.telemetry.log_json = std::env::var("PRONO_LOG_JSON")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        (config, warnings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let f = &self.fusion;
        anyhow::ensure!(
            (0.0..=1.0).contains(&f.odds_weight_floor)
                && (0.0..=1.0).contains(&f.odds_weight_ceiling)
                && f.odds_weight_floor <= f.odds_weight_ceiling,
            "odds weight bounds must satisfy 0 <= floor <= ceiling <= 1"
        );
        anyhow::ensure!(
            (f.form_share + f.goal_diff_share - 1.0).abs() < 1e-9,
            "form_share + goal_diff_share must sum to 1.0"
        );
        anyhow::ensure!(f.home_advantage >= 0.0, "home_advantage must be non-negative");

        let s = &self.staking;
        anyhow::ensure!(s.fixed_stake > Decimal::ZERO, "fixed_stake must be positive");
        anyhow::ensure!(s.bankroll > Decimal::ZERO, "bankroll must be positive");
        anyhow::ensure!(
            s.kelly_multiplier > 0.0 && s.kelly_multiplier <= 1.0,
            "kelly_multiplier must be in (0, 1]"
        );
        anyhow::ensure!(
            s.max_bankroll_fraction > 0.0 && s.max_bankroll_fraction <= 1.0,
            "max_bankroll_fraction must be in (0, 1]"
        );
        anyhow::ensure!(s.top_n >= 1, "top_n must be at least 1");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_weight_bounds() {
        let mut config = Config::default();
        config.fusion.odds_weight_floor = 0.95;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_env_value_is_reported() {
        let mut bankroll = dec!(100);
        let mut warnings = Vec::new();
        std::env::set_var("PRONO_TEST_BANKROLL", "lots");
        env_override("PRONO_TEST_BANKROLL", &mut bankroll, &mut warnings);
        std::env::remove_var("PRONO_TEST_BANKROLL");

        assert_eq!(bankroll, dec!(100));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("PRONO_TEST_BANKROLL"));
    }

    #[test]
    fn test_load_returns_warnings_instead_of_logging() {
        std::env::set_var("PRONO_TOP_N", "many");
        let (config, warnings) = Config::load_or_default();
        std::env::remove_var("PRONO_TOP_N");

        assert_eq!(config.staking.top_n, 5);
        assert!(warnings.iter().any(|w| w.contains("PRONO_TOP_N")));
    }

    #[test]
    fn test_rejects_zero_top_n() {
        let mut config = Config::default();
        config.staking.top_n = 0;
        assert!(config.validate().is_err());
    }
}
