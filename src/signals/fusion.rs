use crate::config::FusionConfig;
use crate::error::{EngineError, Result};
use crate::models::prediction::{FusionDiagnostics, MatchOdds, OutcomeProbabilities};
use crate::models::team::Team;
use crate::signals::form::FormScorer;
use crate::signals::odds::OddsNormalizer;

/// Per-side inputs to the blend, already reduced to scalars.
#[derive(Debug, Clone, Copy)]
pub struct FusionInputs {
    pub odds: MatchOdds,
    pub implied: OutcomeProbabilities,
    pub form_home: f64,
    pub form_away: f64,
    pub goal_diff_home: f64,
    pub goal_diff_away: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct FusionOutput {
    pub probabilities: OutcomeProbabilities,
    pub diagnostics: FusionDiagnostics,
}

/// Fuses the market signal with recent form and goal differential.
///
/// Signals and weights:
///   - Market (normalized odds): 0.6 - 0.9, rising with the home/away odds ratio
///   - Recent form:              1 - market weight (home/away only, never the draw)
///   - Form / goal-diff edge:    multiplicative, roughly +/-15%
///   - Home advantage:           +8% on the home side
pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    /// Full pipeline from stored team records and the book's prices.
    pub fn fuse(&self, home: &Team, away: &Team, odds: MatchOdds) -> Result<FusionOutput> {
        let implied = OddsNormalizer::normalize(&odds)?;
        self.blend(FusionInputs {
            odds,
            implied,
            form_home: FormScorer::score(&home.recent_results),
            form_away: FormScorer::score(&away.recent_results),
            goal_diff_home: home.goal_diff_ratio(),
            goal_diff_away: away.goal_diff_ratio(),
        })
    }

    /// Market weight from the disparity between the two non-draw prices.
    /// The more lopsided the book, the more the market is trusted.
    pub fn odds_weight(&self, odds: &MatchOdds) -> Result<f64> {
        let low = odds.home.min(odds.away);
        if low <= 0.0 {
            return Err(EngineError::DegenerateInput("non-positive odds in disparity ratio"));
        }
        let ratio = odds.home.max(odds.away) / low;
        Ok((self.config.odds_weight_floor + (ratio - 1.0) * self.config.odds_weight_slope)
            .clamp(self.config.odds_weight_floor, self.config.odds_weight_ceiling))
    }

    pub fn blend(&self, inputs: FusionInputs) -> Result<FusionOutput> {
        let c = &self.config;
        let odds_weight = self.odds_weight(&inputs.odds)?;
        let form_weight = 1.0 - odds_weight;

        let edge = |form_for: f64, form_against: f64, gd_for: f64, gd_against: f64| {
            ((form_for - form_against) * c.form_share + (gd_for - gd_against) * c.goal_diff_share)
                * c.adjustment_scale
        };
        let adjust_home = edge(
            inputs.form_home,
            inputs.form_away,
            inputs.goal_diff_home,
            inputs.goal_diff_away,
        );
        let adjust_away = edge(
            inputs.form_away,
            inputs.form_home,
            inputs.goal_diff_away,
            inputs.goal_diff_home,
        );

        let home = (inputs.implied.home * odds_weight + inputs.form_home * form_weight)
            * (1.0 + adjust_home + c.home_advantage);
        let away = (inputs.implied.away * odds_weight + inputs.form_away * form_weight)
            * (1.0 + adjust_away);
        let draw = inputs.implied.draw;

        let total = home + draw + away;
        if !total.is_finite() || total <= 0.0 {
            return Err(EngineError::DegenerateInput("fused probability mass is zero"));
        }

        let probabilities = OutcomeProbabilities {
            home: home / total,
            draw: draw / total,
            away: away / total,
        };
        tracing::trace!(
            odds_weight,
            adjust_home,
            adjust_away,
            p_home = probabilities.home,
            p_draw = probabilities.draw,
            p_away = probabilities.away,
            "fusion"
        );

        Ok(FusionOutput {
            probabilities,
            diagnostics: FusionDiagnostics {
                odds_weight,
                form_weight,
                form_home: inputs.form_home,
                form_away: inputs.form_away,
                goal_diff_home: inputs.goal_diff_home,
                goal_diff_away: inputs.goal_diff_away,
                adjust_home,
                adjust_away,
                implied: inputs.implied,
            },
        })
    }
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::new(FusionConfig::default())
    }
}
