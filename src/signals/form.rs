use crate::models::outcome::FormResult;
use crate::models::team::FORM_CAPACITY;

/// Recency weights, most recent result first.
const RECENCY_WEIGHTS: [u32; FORM_CAPACITY] = [5, 4, 3, 2, 1];

/// Score returned when there is no history to judge.
pub const NEUTRAL_FORM: f64 = 0.5;

/// Turns a team's recent results into a recency-weighted score in [0, 1].
///
/// Each result is worth its league points (3/1/0), weighted 5..1 from the
/// newest entry, and divided by the best score attainable for that length.
pub struct FormScorer;

impl FormScorer {
    pub fn score(results: &[FormResult]) -> f64 {
        let used = results.len().min(FORM_CAPACITY);
        if used == 0 {
            return NEUTRAL_FORM;
        }

        let weights = &RECENCY_WEIGHTS[..used];
        let weighted: u32 = results
            .iter()
            .zip(weights)
            .map(|(result, w)| result.points() * w)
            .sum();
        let max_attainable = FormResult::Win.points() * weights.iter().sum::<u32>();

        weighted as f64 / max_attainable as f64
    }

    /// Score a free-form history such as `"w, d, l"`. Unrecognised tokens are
    /// skipped and do not consume a weight slot.
    pub fn score_symbols(history: &str) -> f64 {
        Self::score(&Self::parse_history(history))
    }

    pub fn parse_history(history: &str) -> Vec<FormResult> {
        history
            .split([',', ' ', ';'])
            .filter(|token| !token.trim().is_empty())
            .filter_map(|token| token.parse::<FormResult>().ok())
            .take(FORM_CAPACITY)
            .collect()
    }
}
