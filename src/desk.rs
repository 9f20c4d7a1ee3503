use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::engine::PredictionEngine;
use crate::error::{EngineError, Result};
use crate::models::outcome::{Outcome, Scoreline};
use crate::models::prediction::{MatchOdds, Prediction};
use crate::models::team::Team;
use crate::risk::staking::Advice;
use crate::store::Store;
use crate::telemetry::performance::{PerformanceReport, PerformanceTracker};

/// Binds the engine to a store for concurrent callers.
///
/// Teams and predictions are locked individually: work on unrelated teams
/// proceeds in parallel, while two settlements touching the same team run
/// one after the other. Resets take the gate exclusively and wait for every
/// in-flight mutation to finish.
pub struct PredictionDesk<S: Store> {
    engine: PredictionEngine,
    store: Arc<S>,
    top_n: usize,
    gate: RwLock<()>,
    team_locks: DashMap<String, Arc<Mutex<()>>>,
    prediction_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl<S: Store> PredictionDesk<S> {
    pub fn new(config: &Config, store: Arc<S>) -> Self {
        Self {
            engine: PredictionEngine::new(config),
            store,
            top_n: config.staking.top_n,
            gate: RwLock::new(()),
            team_locks: DashMap::new(),
            prediction_locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn team_lock(&self, name: &str) -> Arc<Mutex<()>> {
        self.team_locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn prediction_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        self.prediction_locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Lock both teams of a fixture, always in name order.
    async fn lock_pair(&self, a: &str, b: &str) -> Vec<OwnedMutexGuard<()>> {
        let mut names = [a, b];
        names.sort();
        let mut guards = Vec::with_capacity(2);
        guards.push(self.team_lock(names[0]).lock_owned().await);
        if names[0] != names[1] {
            guards.push(self.team_lock(names[1]).lock_owned().await);
        }
        guards
    }

    /// Register a team or replace its record (explicit edit).
    pub async fn register_team(&self, team: Team) -> Result<Team> {
        if team.name.trim().is_empty() {
            return Err(EngineError::UnknownTeam(team.name));
        }
        let _gate = self.gate.read().await;
        let _guard = self.team_lock(&team.name).lock_owned().await;
        let team = Team::with_stats(
            team.name,
            team.recent_results,
            team.goals_scored,
            team.goals_against,
        );
        self.store.put_team(team.clone())?;
        info!(team = %team.name, form = %team.form_string(), "Team registered");
        Ok(team)
    }

    /// Fuse a new prediction for two registered teams and store it open.
    pub async fn open_prediction(&self, home: &str, away: &str, odds: MatchOdds) -> Result<Prediction> {
        if home == away {
            return Err(EngineError::SameTeam(home.to_string()));
        }
        let _gate = self.gate.read().await;
        let _guards = self.lock_pair(home, away).await;

        let home_team = self
            .store
            .team(home)?
            .ok_or_else(|| EngineError::UnknownTeam(home.to_string()))?;
        let away_team = self
            .store
            .team(away)?
            .ok_or_else(|| EngineError::UnknownTeam(away.to_string()))?;

        let prediction = self.engine.fuse(&home_team, &away_team, odds)?;
        self.store.put_prediction(prediction.clone())?;

        info!(
            id = %prediction.id,
            "Prediction stored: {} vs {} -> {} ({:.1}%) stake={}",
            prediction.home,
            prediction.away,
            prediction.predicted_name(),
            prediction.predicted_probability() * 100.0,
            prediction.stake,
        );
        Ok(prediction)
    }

    /// Settle a stored prediction and write it together with both teams.
    ///
    /// Teams missing from the store are created with the default form.
    pub async fn settle(
        &self,
        id: Uuid,
        result: Outcome,
        scoreline: Option<Scoreline>,
    ) -> Result<Prediction> {
        let _gate = self.gate.read().await;
        let _prediction_guard = self.prediction_lock(id).lock_owned().await;
        let settled = self.settle_locked(id, result, scoreline).await;
        // Settled or gone: nothing left to guard
        if matches!(
            settled,
            Ok(_) | Err(EngineError::AlreadySettled(_)) | Err(EngineError::UnknownPrediction(_))
        ) {
            self.prediction_locks.remove(&id);
        }
        settled
    }

    async fn settle_locked(
        &self,
        id: Uuid,
        result: Outcome,
        scoreline: Option<Scoreline>,
    ) -> Result<Prediction> {
        let prediction = self
            .store
            .prediction(id)?
            .ok_or(EngineError::UnknownPrediction(id))?;
        if prediction.is_settled() {
            return Err(EngineError::AlreadySettled(id));
        }

        let _team_guards = self.lock_pair(&prediction.home, &prediction.away).await;
        let home = self.team_or_default(&prediction.home)?;
        let away = self.team_or_default(&prediction.away)?;

        let settlement = self.engine.settle(&prediction, &home, &away, result, scoreline)?;
        self.store.commit_settlement(&settlement)?;

        let settled = settlement.prediction;
        info!(
            id = %settled.id,
            result = %result,
            correct = settled.correct().unwrap_or(false),
            gain = %settled.gain().unwrap_or_default(),
            "Prediction settled: {} vs {}",
            settled.home,
            settled.away,
        );
        Ok(settled)
    }

    fn team_or_default(&self, name: &str) -> Result<Team> {
        if name.trim().is_empty() {
            return Err(EngineError::UnknownTeam(name.to_string()));
        }
        match self.store.team(name)? {
            Some(team) => Ok(team),
            None => {
                warn!(team = %name, "Team missing at settlement, creating with default form");
                Ok(Team::with_default_form(name))
            }
        }
    }

    /// Staking advisory over all open predictions. `None` uses the configured size.
    pub async fn advise(&self, top_n: Option<usize>) -> Result<Vec<Advice>> {
        let predictions = self.store.predictions()?;
        Ok(self
            .engine
            .advise(&predictions, top_n.unwrap_or(self.top_n)))
    }

    /// Remove a prediction. Team records are deliberately left as they are,
    /// even when the prediction was settled.
    pub async fn delete_prediction(&self, id: Uuid) -> Result<Prediction> {
        let _gate = self.gate.read().await;
        let _guard = self.prediction_lock(id).lock_owned().await;
        let removed = self
            .store
            .delete_prediction(id)?
            .ok_or(EngineError::UnknownPrediction(id))?;
        self.prediction_locks.remove(&id);
        info!(id = %id, settled = removed.is_settled(), "Prediction deleted");
        Ok(removed)
    }

    /// Drop the whole prediction history. Teams are untouched.
    pub async fn reset_predictions(&self) -> Result<()> {
        let _gate = self.gate.write().await;
        self.store.clear_predictions()?;
        self.prediction_locks.clear();
        warn!("Prediction history reset");
        Ok(())
    }

    /// Full reset of team records.
    pub async fn reset_teams(&self) -> Result<()> {
        let _gate = self.gate.write().await;
        self.store.clear_teams()?;
        self.team_locks.clear();
        warn!("Team records reset");
        Ok(())
    }

    pub async fn performance(&self) -> Result<PerformanceReport> {
        Ok(PerformanceTracker::report(&self.store.predictions()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::outcome::FormResult::{Draw, Loss, Win};
    use crate::store::InMemoryStore;
    use std::time::Duration;

    async fn desk_with_fixture() -> PredictionDesk<InMemoryStore> {
        let desk = PredictionDesk::new(&Config::default(), Arc::new(InMemoryStore::new()));
        desk.register_team(Team::with_stats("Nantes", vec![Win, Draw, Loss], 0, 0))
            .await
            .unwrap();
        desk.register_team(Team::with_stats("Angers", vec![Loss, Loss, Draw], 0, 0))
            .await
            .unwrap();
        desk
    }

    #[tokio::test]
    async fn test_settled_predictions_release_their_locks() {
        let desk = desk_with_fixture().await;
        for _ in 0..20 {
            let p = desk
                .open_prediction("Nantes", "Angers", MatchOdds::new(1.9, 3.4, 4.2))
                .await
                .unwrap();
            desk.settle(p.id, Outcome::Home, Some(Scoreline::new(1, 0)))
                .await
                .unwrap();
            assert!(desk.settle(p.id, Outcome::Home, None).await.is_err());
        }
        desk.settle(Uuid::new_v4(), Outcome::Draw, None).await.unwrap_err();
        assert!(desk.prediction_locks.is_empty());
    }

    #[tokio::test]
    async fn test_failed_settlement_keeps_lock_until_settled() {
        let desk = desk_with_fixture().await;
        let p = desk
            .open_prediction("Nantes", "Angers", MatchOdds::new(1.9, 3.4, 4.2))
            .await
            .unwrap();

        let err = desk
            .settle(p.id, Outcome::Home, Some(Scoreline::new(0, 2)))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ScorelineMismatch { .. }));
        assert_eq!(desk.prediction_locks.len(), 1);

        desk.settle(p.id, Outcome::Away, Some(Scoreline::new(0, 2)))
            .await
            .unwrap();
        assert!(desk.prediction_locks.is_empty());
    }

    #[tokio::test]
    async fn test_resets_clear_lock_maps() {
        let desk = desk_with_fixture().await;
        let p = desk
            .open_prediction("Nantes", "Angers", MatchOdds::new(1.9, 3.4, 4.2))
            .await
            .unwrap();
        desk.settle(p.id, Outcome::Draw, Some(Scoreline::new(2, 0)))
            .await
            .unwrap_err();
        assert!(!desk.prediction_locks.is_empty());
        assert!(!desk.team_locks.is_empty());

        desk.reset_predictions().await.unwrap();
        assert!(desk.prediction_locks.is_empty());
        desk.reset_teams().await.unwrap();
        assert!(desk.team_locks.is_empty());
    }

    #[tokio::test]
    async fn test_reset_waits_for_in_flight_work() {
        let desk = desk_with_fixture().await;

        let in_flight = desk.gate.read().await;
        let blocked = tokio::time::timeout(Duration::from_millis(50), desk.reset_teams()).await;
        assert!(blocked.is_err());
        assert_eq!(desk.store.teams().unwrap().len(), 2);

        drop(in_flight);
        desk.reset_teams().await.unwrap();
        assert!(desk.store.teams().unwrap().is_empty());
    }
}
