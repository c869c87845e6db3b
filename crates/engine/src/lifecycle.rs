use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use common::EngineCommand;
use ledger::SessionSnapshot;

use crate::bot::{Bot, TickOutcome, TickReport};
use crate::config::load_bot_config;

/// Cloneable handle passed to whoever controls the bot.
#[derive(Clone)]
pub struct EngineHandle {
    command_tx: mpsc::Sender<EngineCommand>,
    snapshot: Arc<RwLock<SessionSnapshot>>,
    last_tick: Arc<RwLock<Option<TickReport>>>,
}

impl EngineHandle {
    pub async fn send(&self, cmd: EngineCommand) {
        if self.command_tx.send(cmd).await.is_err() {
            warn!("Engine is gone, command dropped");
        }
    }

    /// Ledger snapshot as of the last processed tick or command.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn last_tick(&self) -> Option<TickReport> {
        self.last_tick.read().await.clone()
    }
}

/// Drives one `Bot`: ticks on a fixed interval and applies commands between
/// ticks, so at most one cycle is ever in flight.
pub struct Engine {
    bot: Bot,
    tick_interval: Duration,
    config_path: Option<PathBuf>,
    command_rx: mpsc::Receiver<EngineCommand>,
    snapshot: Arc<RwLock<SessionSnapshot>>,
    last_tick: Arc<RwLock<Option<TickReport>>>,
}

impl Engine {
    pub fn new(bot: Bot, tick_interval: Duration) -> (Self, EngineHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let snapshot = Arc::new(RwLock::new(bot.snapshot().clone()));
        let last_tick = Arc::new(RwLock::new(None));

        let handle = EngineHandle {
            command_tx,
            snapshot: snapshot.clone(),
            last_tick: last_tick.clone(),
        };

        let engine = Engine {
            bot,
            tick_interval,
            config_path: None,
            command_rx,
            snapshot,
            last_tick,
        };

        (engine, handle)
    }

    /// File re-read on `EngineCommand::Reload`.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Run until `Shutdown` or until every handle is dropped. Returns the bot
    /// so callers can inspect its final state. Call from `tokio::spawn`.
    pub async fn run(mut self) -> Bot {
        info!(interval = ?self.tick_interval, "Engine initialized. Waiting for Start command.");

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.bot.tick().await;
                    if let TickOutcome::MarketDataFailed(_) | TickOutcome::ExecutionFailed(_) = report.outcome {
                        warn!("Tick skipped after a collaborator failure");
                    }
                    *self.last_tick.write().await = Some(report);
                }

                cmd = self.command_rx.recv() => match cmd {
                    Some(EngineCommand::Shutdown) => {
                        info!("Engine shutting down");
                        if self.bot.is_running() {
                            self.bot.stop(Some("shutdown"));
                        }
                        publish(&self.snapshot, self.bot.snapshot().clone()).await;
                        break;
                    }
                    Some(cmd) => self.apply(cmd),
                    None => {
                        warn!("Engine command channel closed, shutting down");
                        break;
                    }
                },
            }
            publish(&self.snapshot, self.bot.snapshot().clone()).await;
        }

        self.bot
    }

    fn apply(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::Start => {
                self.bot.start(None);
            }
            EngineCommand::Stop => {
                self.bot.stop(None);
            }
            EngineCommand::ResetSession => {
                self.bot.reset_session(None);
            }
            EngineCommand::ResetLifetime => {
                self.bot.reset_lifetime(None);
            }
            EngineCommand::ResetStake => {
                self.bot.reset_stake();
            }
            EngineCommand::AddNote(text) => {
                self.bot.add_note(&text);
            }
            EngineCommand::Reload => match &self.config_path {
                Some(path) => self.bot.reload(load_bot_config(path)),
                None => error!("Reload requested but no config file is configured"),
            },
            // Handled by the run loop.
            EngineCommand::Shutdown => {}
        }
    }
}

/// Holds only the shared slot across the await so `Engine::run` stays `Send`.
async fn publish(slot: &RwLock<SessionSnapshot>, snapshot: SessionSnapshot) {
    *slot.write().await = snapshot;
}
