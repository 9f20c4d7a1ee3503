use crate::error::{EngineError, Result};
use crate::models::prediction::{MatchOdds, OutcomeProbabilities};

/// Converts bookmaker decimal odds into margin-free probabilities.
pub struct OddsNormalizer;

impl OddsNormalizer {
    /// Reject odds that cannot come from a real book.
    pub fn validate(odds: &MatchOdds) -> Result<()> {
        for (side, value) in [("home", odds.home), ("draw", odds.draw), ("away", odds.away)] {
            if !value.is_finite() || value <= 1.0 {
                return Err(EngineError::InvalidOdds { side, value });
            }
        }
        Ok(())
    }

    /// Raw implied probabilities `1/odds`, still carrying the overround.
    pub fn implied(odds: &MatchOdds) -> Result<OutcomeProbabilities> {
        Self::validate(odds)?;
        Ok(OutcomeProbabilities {
            home: 1.0 / odds.home,
            draw: 1.0 / odds.draw,
            away: 1.0 / odds.away,
        })
    }

    /// Bookmaker margin: how far the raw implied probabilities exceed 1.0.
    pub fn overround(odds: &MatchOdds) -> Result<f64> {
        Ok(Self::implied(odds)?.total() - 1.0)
    }

    /// Implied probabilities rescaled to sum to exactly 1.0.
    pub fn normalize(odds: &MatchOdds) -> Result<OutcomeProbabilities> {
        let raw = Self::implied(odds)?;
        let total = raw.total();
        if !total.is_finite() || total <= 0.0 {
            return Err(EngineError::DegenerateInput("implied probability mass is zero"));
        }
        Ok(OutcomeProbabilities {
            home: raw.home / total,
            draw: raw.draw / total,
            away: raw.away / total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_sums_to_one() {
        for odds in [
            MatchOdds::new(1.50, 3.50, 4.00),
            MatchOdds::new(1.01, 15.0, 40.0),
            MatchOdds::new(2.90, 3.10, 2.60),
            MatchOdds::new(1000.0, 1.01, 1000.0),
        ] {
            let p = OddsNormalizer::normalize(&odds).unwrap();
            assert!((p.total() - 1.0).abs() < 1e-9, "sum was {}", p.total());
            for v in [p.home, p.draw, p.away] {
                assert!(v > 0.0 && v < 1.0, "component {v} out of (0,1)");
            }
        }
    }

    #[test]
    fn test_normalize_removes_margin() {
        let odds = MatchOdds::new(1.50, 3.50, 4.00);
        let margin = OddsNormalizer::overround(&odds).unwrap();
        assert!((margin - 0.202_381).abs() < 1e-6);

        let p = OddsNormalizer::normalize(&odds).unwrap();
        assert!((p.home - 0.554_455).abs() < 1e-6);
        assert!((p.draw - 0.237_624).abs() < 1e-6);
        assert!((p.away - 0.207_921).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_odds_at_or_below_one() {
        let err = OddsNormalizer::normalize(&MatchOdds::new(1.0, 3.0, 4.0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOdds { side: "home", .. }));

        let err = OddsNormalizer::normalize(&MatchOdds::new(2.0, 3.0, 0.5)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOdds { side: "away", .. }));

        let err = OddsNormalizer::normalize(&MatchOdds::new(2.0, f64::NAN, 3.0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOdds { side: "draw", .. }));
    }
}
