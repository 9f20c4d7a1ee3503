use serde::{Deserialize, Deserializer, Serialize};

use super::outcome::FormResult;

/// Number of results kept in a team's rolling form.
pub const FORM_CAPACITY: usize = 5;

/// Form given to a team first seen through a settled prediction.
pub const DEFAULT_FORM: [FormResult; FORM_CAPACITY] = [
    FormResult::Win,
    FormResult::Win,
    FormResult::Draw,
    FormResult::Loss,
    FormResult::Loss,
];

/// Historical performance of one contestant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    /// Most recent first, never longer than `FORM_CAPACITY`.
    #[serde(deserialize_with = "deserialize_form")]
    pub recent_results: Vec<FormResult>,
    pub goals_scored: u32,
    pub goals_against: u32,
}

/// Stored records may predate the window size; keep only the newest entries.
fn deserialize_form<'de, D>(deserializer: D) -> Result<Vec<FormResult>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut results = Vec::<FormResult>::deserialize(deserializer)?;
    results.truncate(FORM_CAPACITY);
    Ok(results)
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recent_results: Vec::new(),
            goals_scored: 0,
            goals_against: 0,
        }
    }

    pub fn with_default_form(name: impl Into<String>) -> Self {
        Self {
            recent_results: DEFAULT_FORM.to_vec(),
            ..Self::new(name)
        }
    }

    /// Registration/edit constructor. Extra history beyond the window is dropped.
    pub fn with_stats(
        name: impl Into<String>,
        mut recent_results: Vec<FormResult>,
        goals_scored: u32,
        goals_against: u32,
    ) -> Self {
        recent_results.truncate(FORM_CAPACITY);
        Self {
            name: name.into(),
            recent_results,
            goals_scored,
            goals_against,
        }
    }

    /// Drop history beyond the window, oldest first.
    pub fn cap_form(&mut self) {
        self.recent_results.truncate(FORM_CAPACITY);
    }

    /// Insert the newest result, dropping the oldest once the window is full.
    pub fn push_result(&mut self, result: FormResult) {
        self.recent_results.insert(0, result);
        self.recent_results.truncate(FORM_CAPACITY);
    }

    pub fn record_goals(&mut self, scored: u32, conceded: u32) {
        self.goals_scored = self.goals_scored.saturating_add(scored);
        self.goals_against = self.goals_against.saturating_add(conceded);
    }

    /// Season goal differential scaled into [-1, 1].
    pub fn goal_diff_ratio(&self) -> f64 {
        let scored = self.goals_scored as f64;
        let conceded = self.goals_against as f64;
        (scored - conceded) / (scored + conceded).max(1.0)
    }

    /// Administrative reset: the only path that lowers goal totals.
    pub fn reset_stats(&mut self) {
        self.recent_results.clear();
        self.goals_scored = 0;
        self.goals_against = 0;
    }

    pub fn form_string(&self) -> String {
        self.recent_results.iter().map(|r| r.symbol()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_drops_oldest() {
        let mut team = Team::with_default_form("PSG");
        team.push_result(FormResult::Draw);
        assert_eq!(team.recent_results.len(), FORM_CAPACITY);
        assert_eq!(team.form_string(), "DWWDL");
    }

    #[test]
    fn test_push_into_short_history() {
        let mut team = Team::new("OL");
        team.push_result(FormResult::Win);
        team.push_result(FormResult::Loss);
        assert_eq!(team.form_string(), "LW");
    }

    #[test]
    fn test_with_stats_truncates() {
        let history = vec![FormResult::Win; 8];
        let team = Team::with_stats("OM", history, 3, 1);
        assert_eq!(team.recent_results.len(), FORM_CAPACITY);
    }

    #[test]
    fn test_deserialize_caps_history() {
        let json = r#"{"name":"OGC","recent_results":["win","win","draw","loss","loss","win","win"],"goals_scored":0,"goals_against":0}"#;
        let team: Team = serde_json::from_str(json).unwrap();
        assert_eq!(team.form_string(), "WWDLL");
    }

    #[test]
    fn test_goal_diff_ratio() {
        assert_eq!(Team::new("A").goal_diff_ratio(), 0.0);
        let team = Team::with_stats("B", vec![], 6, 2);
        assert!((team.goal_diff_ratio() - 0.5).abs() < 1e-12);
        let team = Team::with_stats("C", vec![], 0, 1);
        assert!((team.goal_diff_ratio() + 1.0).abs() < 1e-12);
    }
}
