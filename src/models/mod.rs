pub mod outcome;
pub mod prediction;
pub mod team;
