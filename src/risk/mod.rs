pub mod sizing;
pub mod staking;
