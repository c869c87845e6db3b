use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::{Config, EngineCommand, StdRandom};
use engine::{load_bot_config, Bot, Engine};
use ledger::{FileStore, SessionLedger};
use paper::{PaperExecution, RandomWalkFeed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("info"))
                .context("invalid log filter")?,
        )
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(
        config = %cfg.bot_config_path,
        data_dir = %cfg.data_dir,
        tick_secs = cfg.tick_interval_secs,
        "StakeBot starting"
    );
    let bot_config = load_bot_config(&cfg.bot_config_path);

    // ── Ledger ────────────────────────────────────────────────────────────────
    std::fs::create_dir_all(&cfg.data_dir)
        .with_context(|| format!("cannot create data dir {}", cfg.data_dir))?;
    let ledger = SessionLedger::open(FileStore::new(&cfg.data_dir));

    // ── Simulated collaborators ───────────────────────────────────────────────
    // Each consumer gets its own stream so one seed reproduces a whole run.
    let seed = cfg.rng_seed;
    let derive = |offset: u64| StdRandom::from_seed_opt(seed.map(|s| s.wrapping_add(offset)));
    let market = Arc::new(RandomWalkFeed::new(cfg.feed_start_price, derive(1)));
    let execution = Arc::new(PaperExecution::with_payout(derive(2), bot_config.stake.payout_ratio));
    info!(equity = cfg.paper_equity, seeded = seed.is_some(), "Paper mode: simulated feed and fills");

    // ── Engine ────────────────────────────────────────────────────────────────
    let bot = Bot::new(bot_config, ledger, market, execution, Box::new(derive(0)), cfg.paper_equity);
    let (engine, handle) = Engine::new(bot, Duration::from_secs(cfg.tick_interval_secs));
    let task = tokio::spawn(engine.with_config_path(&cfg.bot_config_path).run());

    if cfg.autostart {
        handle.send(EngineCommand::Start).await;
    }

    info!("Engine started. Waiting for shutdown signal.");
    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    info!("Shutdown signal received");

    handle.send(EngineCommand::Shutdown).await;
    let bot = task.await.context("engine task failed")?;
    let s = bot.snapshot();
    info!(
        orders = s.orders,
        wins = s.wins,
        losses = s.losses,
        draws = s.draws,
        pnl = s.pnl,
        lifetime_pnl = s.lifetime_pnl,
        win_rate = s.win_rate(),
        equity = bot.equity(),
        "Exiting"
    );
    Ok(())
}
