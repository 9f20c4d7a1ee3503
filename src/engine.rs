use chrono::Utc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::models::outcome::{Outcome, Scoreline};
use crate::models::prediction::{MatchOdds, Prediction, PredictionState};
use crate::models::team::Team;
use crate::risk::sizing::StakePolicy;
use crate::risk::staking::{Advice, StakingAdvisor};
use crate::settlement::processor::{Settlement, SettlementProcessor};
use crate::signals::fusion::FusionEngine;

/// The three pure operations callers build on: fuse, settle and advise.
///
/// Holds configuration only. Records come in as arguments and go back out
/// as return values; persisting them is the caller's job.
pub struct PredictionEngine {
    fusion: FusionEngine,
    settlement: SettlementProcessor,
    stake_policy: StakePolicy,
    advisor: StakingAdvisor,
}

impl PredictionEngine {
    pub fn new(config: &Config) -> Self {
        let stake_policy = StakePolicy::new(config.staking.clone());
        Self {
            fusion: FusionEngine::new(config.fusion.clone()),
            settlement: SettlementProcessor::new(config.settlement.clone()),
            advisor: StakingAdvisor::new(stake_policy.clone()),
            stake_policy,
        }
    }

    /// Build an open prediction for `home` vs `away` at the given prices.
    pub fn fuse(&self, home: &Team, away: &Team, odds: MatchOdds) -> Result<Prediction> {
        if home.name == away.name {
            return Err(EngineError::SameTeam(home.name.clone()));
        }

        let fused = self.fusion.fuse(home, away, odds)?;
        let predicted = fused.probabilities.most_likely();
        let stake = self.stake_policy.stake_for(
            fused.probabilities.for_outcome(predicted),
            odds.for_outcome(predicted),
        );

        Ok(Prediction {
            id: Uuid::new_v4(),
            home: home.name.clone(),
            away: away.name.clone(),
            odds,
            probabilities: fused.probabilities,
            predicted,
            stake,
            diagnostics: fused.diagnostics,
            created_at: Utc::now(),
            state: PredictionState::Open,
        })
    }

    pub fn settle(
        &self,
        prediction: &Prediction,
        home: &Team,
        away: &Team,
        result: Outcome,
        scoreline: Option<Scoreline>,
    ) -> Result<Settlement> {
        self.settlement.settle(prediction, home, away, result, scoreline)
    }

    /// `settle` with the two scores given separately. Goals are only
    /// accumulated when both are present.
    pub fn settle_with_scores(
        &self,
        prediction: &Prediction,
        home: &Team,
        away: &Team,
        result: Outcome,
        score_home: Option<u32>,
        score_away: Option<u32>,
    ) -> Result<Settlement> {
        let scoreline = Scoreline::from_parts(score_home, score_away);
        self.settle(prediction, home, away, result, scoreline)
    }

    pub fn advise(&self, predictions: &[Prediction], top_n: usize) -> Vec<Advice> {
        self.advisor.advise(predictions, top_n)
    }
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
