use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::error::StoreError;
use crate::models::prediction::Prediction;
use crate::models::team::Team;
use crate::settlement::processor::Settlement;

/// Serializable image of a store, for persisting or backing it up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub teams: Vec<Team>,
    pub predictions: Vec<Prediction>,
}

/// In-process store keyed by team name and prediction id.
///
/// Writers of a settlement hold the commit lock exclusively so the
/// prediction and both teams become visible together.
#[derive(Default)]
pub struct InMemoryStore {
    teams: DashMap<String, Team>,
    predictions: DashMap<Uuid, Prediction>,
    commit: RwLock<()>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("commit lock poisoned".into())
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let store = Self::new();
        for mut team in snapshot.teams {
            team.cap_form();
            store.teams.insert(team.name.clone(), team);
        }
        for prediction in snapshot.predictions {
            store.predictions.insert(prediction.id, prediction);
        }
        store
    }

    pub fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        Ok(StoreSnapshot {
            teams: self.teams()?,
            predictions: self.predictions()?,
        })
    }
}

impl Store for InMemoryStore {
    fn team(&self, name: &str) -> Result<Option<Team>, StoreError> {
        let _guard = self.commit.read().map_err(poisoned)?;
        Ok(self.teams.get(name).map(|t| t.value().clone()))
    }

    fn put_team(&self, mut team: Team) -> Result<(), StoreError> {
        team.cap_form();
        let _guard = self.commit.read().map_err(poisoned)?;
        self.teams.insert(team.name.clone(), team);
        Ok(())
    }

    fn teams(&self) -> Result<Vec<Team>, StoreError> {
        let _guard = self.commit.read().map_err(poisoned)?;
        let mut teams: Vec<Team> = self.teams.iter().map(|e| e.value().clone()).collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    fn clear_teams(&self) -> Result<(), StoreError> {
        let _guard = self.commit.write().map_err(poisoned)?;
        self.teams.clear();
        Ok(())
    }

    fn prediction(&self, id: Uuid) -> Result<Option<Prediction>, StoreError> {
        let _guard = self.commit.read().map_err(poisoned)?;
        Ok(self.predictions.get(&id).map(|p| p.value().clone()))
    }

    fn put_prediction(&self, prediction: Prediction) -> Result<(), StoreError> {
        let _guard = self.commit.read().map_err(poisoned)?;
        self.predictions.insert(prediction.id, prediction);
        Ok(())
    }

    fn predictions(&self) -> Result<Vec<Prediction>, StoreError> {
        let _guard = self.commit.read().map_err(poisoned)?;
        let mut all: Vec<Prediction> =
            self.predictions.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    fn delete_prediction(&self, id: Uuid) -> Result<Option<Prediction>, StoreError> {
        let _guard = self.commit.read().map_err(poisoned)?;
        Ok(self.predictions.remove(&id).map(|(_, p)| p))
    }

    fn clear_predictions(&self) -> Result<(), StoreError> {
        let _guard = self.commit.write().map_err(poisoned)?;
        self.predictions.clear();
        Ok(())
    }

    fn commit_settlement(&self, settlement: &Settlement) -> Result<(), StoreError> {
        let _guard = self.commit.write().map_err(poisoned)?;
        self.predictions
            .insert(settlement.prediction.id, settlement.prediction.clone());
        self.teams
            .insert(settlement.home.name.clone(), settlement.home.clone());
        self.teams
            .insert(settlement.away.name.clone(), settlement.away.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::outcome::FormResult;

    #[test]
    fn test_snapshot_round_trip_through_json() {
        let store = InMemoryStore::new();
        store
            .put_team(Team::with_stats("Lens", vec![FormResult::Win], 4, 2))
            .unwrap();
        store.put_team(Team::new("Nice")).unwrap();

        let json = serde_json::to_string(&store.snapshot().unwrap()).unwrap();
        let restored = InMemoryStore::from_snapshot(serde_json::from_str(&json).unwrap());

        assert_eq!(restored.teams().unwrap(), store.teams().unwrap());
        assert_eq!(restored.team("Lens").unwrap().unwrap().goals_scored, 4);
    }

    #[test]
    fn test_snapshot_load_caps_form_history() {
        let json = r#"{
            "teams": [{
                "name": "Lorient",
                "recent_results": ["win", "win", "win", "win", "win", "win", "win"],
                "goals_scored": 0,
                "goals_against": 0
            }],
            "predictions": []
        }"#;
        let snapshot: StoreSnapshot = serde_json::from_str(json).unwrap();
        let store = InMemoryStore::from_snapshot(snapshot);
        assert_eq!(store.team("Lorient").unwrap().unwrap().recent_results.len(), 5);
    }

    #[test]
    fn test_put_team_caps_form_history() {
        let store = InMemoryStore::new();
        let mut team = Team::new("Reims");
        team.recent_results = vec![FormResult::Loss; 9];
        store.put_team(team).unwrap();
        assert_eq!(store.team("Reims").unwrap().unwrap().recent_results.len(), 5);
    }

    #[test]
    fn test_teams_sorted_by_name() {
        let store = InMemoryStore::new();
        store.put_team(Team::new("Rennes")).unwrap();
        store.put_team(Team::new("Brest")).unwrap();
        let names: Vec<String> = store.teams().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Brest", "Rennes"]);
    }
}
