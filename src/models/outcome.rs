use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three 1X2 outcomes of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Home => "home",
            Outcome::Draw => "draw",
            Outcome::Away => "away",
        }
    }

    /// Form entries pushed to (home, away) once this outcome is known.
    pub fn form_results(&self) -> (FormResult, FormResult) {
        match self {
            Outcome::Home => (FormResult::Win, FormResult::Loss),
            Outcome::Draw => (FormResult::Draw, FormResult::Draw),
            Outcome::Away => (FormResult::Loss, FormResult::Win),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" | "1" => Ok(Outcome::Home),
            "draw" | "x" => Ok(Outcome::Draw),
            "away" | "2" => Ok(Outcome::Away),
            other => Err(format!("unrecognised outcome '{other}'")),
        }
    }
}

/// A single entry of a team's recent form, from that team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormResult {
    Win,
    Draw,
    Loss,
}

impl FormResult {
    /// League points for the result.
    pub fn points(&self) -> u32 {
        match self {
            FormResult::Win => 3,
            FormResult::Draw => 1,
            FormResult::Loss => 0,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            FormResult::Win => 'W',
            FormResult::Draw => 'D',
            FormResult::Loss => 'L',
        }
    }
}

impl FromStr for FormResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" | "win" => Ok(FormResult::Win),
            "d" | "draw" => Ok(FormResult::Draw),
            "l" | "loss" => Ok(FormResult::Loss),
            other => Err(format!("unrecognised form symbol '{other}'")),
        }
    }
}

/// Final score of a match, used to accumulate season goal totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreline {
    pub home: u32,
    pub away: u32,
}

impl Scoreline {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    /// Builds a scoreline only when both sides were supplied.
    pub fn from_parts(home: Option<u32>, away: Option<u32>) -> Option<Self> {
        match (home, away) {
            (Some(h), Some(a)) => Some(Self::new(h, a)),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Outcome::Home,
            std::cmp::Ordering::Less => Outcome::Away,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

impl fmt::Display for Scoreline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_symbol_parsing() {
        assert_eq!("W".parse::<FormResult>(), Ok(FormResult::Win));
        assert_eq!(" draw ".parse::<FormResult>(), Ok(FormResult::Draw));
        assert_eq!("l".parse::<FormResult>(), Ok(FormResult::Loss));
        assert!("?".parse::<FormResult>().is_err());
    }

    #[test]
    fn test_outcome_parsing() {
        assert_eq!("Home".parse::<Outcome>(), Ok(Outcome::Home));
        assert_eq!("x".parse::<Outcome>(), Ok(Outcome::Draw));
        assert_eq!("2".parse::<Outcome>(), Ok(Outcome::Away));
        assert!("nul".parse::<Outcome>().is_err());
    }

    #[test]
    fn test_outcome_form_results() {
        assert_eq!(Outcome::Home.form_results(), (FormResult::Win, FormResult::Loss));
        assert_eq!(Outcome::Away.form_results(), (FormResult::Loss, FormResult::Win));
        assert_eq!(Outcome::Draw.form_results(), (FormResult::Draw, FormResult::Draw));
    }

    #[test]
    fn test_scoreline_outcome() {
        assert_eq!(Scoreline::new(2, 1).outcome(), Outcome::Home);
        assert_eq!(Scoreline::new(0, 0).outcome(), Outcome::Draw);
        assert_eq!(Scoreline::new(1, 3).outcome(), Outcome::Away);
        assert_eq!(Scoreline::from_parts(Some(1), None), None);
    }
}
