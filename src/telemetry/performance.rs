use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crate::models::outcome::Outcome;
use crate::models::prediction::Prediction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeBreakdown {
    pub outcome: Outcome,
    pub count: usize,
    /// `None` when nothing was predicted for this outcome.
    pub accuracy_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPerformance {
    pub team: String,
    pub played: usize,
    pub correct: usize,
    pub accuracy_pct: f64,
    pub gain: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub settled: usize,
    pub correct: usize,
    pub accuracy_pct: f64,
    pub total_staked: Decimal,
    pub total_gain: Decimal,
    pub roi_pct: f64,
    pub by_outcome: Vec<OutcomeBreakdown>,
    pub by_team: Vec<TeamPerformance>,
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Accuracy and P&L over settled predictions.
pub struct PerformanceTracker;

impl PerformanceTracker {
    pub fn report(predictions: &[Prediction]) -> PerformanceReport {
        let settled: Vec<&Prediction> = predictions.iter().filter(|p| p.is_settled()).collect();

        let correct = settled.iter().filter(|p| p.correct() == Some(true)).count();
        let total_staked: Decimal = settled.iter().map(|p| p.stake).sum();
        let total_gain: Decimal = settled.iter().filter_map(|p| p.gain()).sum();
        let roi_pct = if total_staked > Decimal::ZERO {
            (total_gain / total_staked * Decimal::from(100))
                .to_string()
                .parse::<f64>()
                .unwrap_or(0.0)
        } else {
            0.0
        };

        let by_outcome = Outcome::ALL
            .iter()
            .map(|&outcome| {
                let picks: Vec<&&Prediction> =
                    settled.iter().filter(|p| p.predicted == outcome).collect();
                let hits = picks.iter().filter(|p| p.correct() == Some(true)).count();
                OutcomeBreakdown {
                    outcome,
                    count: picks.len(),
                    accuracy_pct: (!picks.is_empty()).then(|| pct(hits, picks.len())),
                }
            })
            .collect();

        let mut teams: HashMap<&str, (usize, usize, Decimal)> = HashMap::new();
        for p in &settled {
            let hit = usize::from(p.correct() == Some(true));
            let gain = p.gain().unwrap_or(Decimal::ZERO);
            for name in [p.home.as_str(), p.away.as_str()] {
                let entry = teams.entry(name).or_insert((0, 0, Decimal::ZERO));
                entry.0 += 1;
                entry.1 += hit;
                entry.2 += gain;
            }
        }
        let mut by_team: Vec<TeamPerformance> = teams
            .into_iter()
            .map(|(team, (played, correct, gain))| TeamPerformance {
                team: team.to_string(),
                played,
                correct,
                accuracy_pct: pct(correct, played),
                gain,
            })
            .collect();
        by_team.sort_by(|a, b| {
            b.accuracy_pct
                .total_cmp(&a.accuracy_pct)
                .then_with(|| a.team.cmp(&b.team))
        });

        PerformanceReport {
            settled: settled.len(),
            correct,
            accuracy_pct: pct(correct, settled.len()),
            total_staked,
            total_gain,
            roi_pct,
            by_outcome,
            by_team,
        }
    }
}

impl PerformanceReport {
    /// Print summary to log.
    pub fn log_summary(&self) {
        info!(
            "=== PERFORMANCE === settled={} correct={} accuracy={:.2}% staked={} gain={} roi={:.2}%",
            self.settled,
            self.correct,
            self.accuracy_pct,
            self.total_staked,
            self.total_gain,
            self.roi_pct,
        );

        for row in &self.by_outcome {
            match row.accuracy_pct {
                Some(acc) => info!("  Picks {}: count={} accuracy={:.2}%", row.outcome, row.count, acc),
                None => info!("  Picks {}: count=0", row.outcome),
            }
        }

        for row in &self.by_team {
            info!(
                "  Team {}: played={} correct={} accuracy={:.2}% gain={}",
                row.team, row.played, row.correct, row.accuracy_pct, row.gain
            );
        }
    }
}
