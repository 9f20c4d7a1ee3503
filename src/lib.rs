pub mod config;
pub mod desk;
pub mod engine;
pub mod error;
pub mod models;
pub mod risk;
pub mod settlement;
pub mod signals;
pub mod store;
pub mod telemetry;
