use boostprono::config::Config;
use boostprono::desk::PredictionDesk;
use boostprono::store::{InMemoryStore, StoreSnapshot};

use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info, warn};

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.telemetry.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if config.telemetry.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_snapshot() -> anyhow::Result<StoreSnapshot> {
    let Ok(path) = std::env::var("PRONO_SNAPSHOT") else {
        warn!("PRONO_SNAPSHOT not set, starting from an empty store");
        return Ok(StoreSnapshot::default());
    };
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let snapshot: StoreSnapshot =
        serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;
    info!(
        "Loaded {} teams and {} predictions from {path}",
        snapshot.teams.len(),
        snapshot.predictions.len()
    );
    Ok(snapshot)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads .env before the subscriber so RUST_LOG from the file applies
    let (config, config_warnings) = Config::load_or_default();
    init_tracing(&config);
    for warning in &config_warnings {
        warn!("{warning}");
    }

    info!("================================================");
    info!("  BOOSTPRONO — odds + form match predictor v0.1.0");
    info!("================================================");

    if let Err(e) = config.validate() {
        error!("Config validation failed: {e}");
        return Err(e);
    }
    info!(
        "Staking: mode={:?} fixed={} bankroll={} kelly_mult={} draw_policy={:?}",
        config.staking.stake_mode,
        config.staking.fixed_stake,
        config.staking.bankroll,
        config.staking.kelly_multiplier,
        config.settlement.draw_policy,
    );

    let store = Arc::new(InMemoryStore::from_snapshot(load_snapshot()?));
    let desk = PredictionDesk::new(&config, store);

    let advice = desk.advise(None).await?;
    if advice.is_empty() {
        info!("No open predictions to advise on");
    }
    for (rank, a) in advice.iter().enumerate() {
        info!(
            "#{} {} vs {} -> {} p={:.1}% odds={:.2} EV={:+.3} kelly={:.3} stake={}",
            rank + 1,
            a.prediction.home,
            a.prediction.away,
            a.prediction.predicted_name(),
            a.probability * 100.0,
            a.odds,
            a.expected_value,
            a.kelly_fraction,
            a.suggested_stake,
        );
    }

    desk.performance().await?.log_summary();

    Ok(())
}
