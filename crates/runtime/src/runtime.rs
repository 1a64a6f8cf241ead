//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command/event channels, and
//! exposes a builder-based API for hosts to run the simulation.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use game_core::{DiscussionScript, GameConfig, GameEngine};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::providers::{IdentityFeed, StaticIdentityFeed, WagerLedger};
use crate::workers::{
    AmbientChatWorker, Cadence, Command, FeedPoller, SettlementWorker, SimulationWorker,
};

pub const DEFAULT_LOGIC_TICK: Duration = Duration::from_secs(1);
pub const DEFAULT_MOVEMENT_TICK: Duration = Duration::from_millis(100);
pub const DEFAULT_AMBIENT_CHAT: Duration = Duration::from_secs(2);
pub const DEFAULT_FEED_POLL: Duration = Duration::from_secs(30);

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_id: String,
    pub game_config: GameConfig,
    pub logic_tick: Duration,
    pub movement_tick: Duration,
    pub ambient_chat_interval: Duration,
    pub feed_poll_interval: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Fixed RNG seed; a random one is drawn when unset.
    pub seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_id: "sim-1".to_owned(),
            game_config: GameConfig::default(),
            logic_tick: DEFAULT_LOGIC_TICK,
            movement_tick: DEFAULT_MOVEMENT_TICK,
            ambient_chat_interval: DEFAULT_AMBIENT_CHAT,
            feed_poll_interval: DEFAULT_FEED_POLL,
            event_buffer_size: 256,
            command_buffer_size: 32,
            seed: None,
        }
    }
}

impl RuntimeConfig {
    pub fn with_game_config(mut self, game_config: GameConfig) -> Self {
        self.game_config = game_config;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_ticks(mut self, logic: Duration, movement: Duration) -> Self {
        self.logic_tick = logic;
        self.movement_tick = movement;
        self
    }
}

/// Main runtime that orchestrates the simulation
///
/// Design: Runtime owns workers and coordinates shutdown.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    shutdown_tx: watch::Sender<bool>,
    sim_worker_handle: JoinHandle<()>,
    background: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Stop both clocks and the background polling, then wait for the workers.
    ///
    /// Ledger calls already in flight are left to finish on their own.
    pub async fn shutdown(self) -> Result<()> {
        // Send only fails once every receiver is gone, i.e. workers already exited.
        let _ = self.shutdown_tx.send(true);
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        for worker in self.background {
            worker.await.map_err(RuntimeError::WorkerJoin)?;
        }

        tracing::info!(target: "runtime", "runtime stopped");
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    feed: Option<Arc<dyn IdentityFeed>>,
    ledger: Option<Arc<dyn WagerLedger>>,
    script: Option<DiscussionScript>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            feed: None,
            ledger: None,
            script: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Source of lobby candidates and ambient chat.
    ///
    /// Defaults to an empty [`StaticIdentityFeed`].
    pub fn identity_feed(mut self, feed: impl IdentityFeed + 'static) -> Self {
        self.feed = Some(Arc::new(feed));
        self
    }

    /// Wager ledger to settle at round boundaries (optional).
    pub fn ledger(mut self, ledger: impl WagerLedger + 'static) -> Self {
        self.ledger = Some(Arc::new(ledger));
        self
    }

    /// Replace the meeting discussion phrases.
    pub fn script(mut self, script: DiscussionScript) -> Self {
        self.script = Some(script);
        self
    }

    /// Build the runtime and start its workers.
    pub async fn build(self) -> Result<Runtime> {
        let config = self.config;
        let seed = config.seed.unwrap_or_else(rand::random);

        let mut engine = GameEngine::seeded(config.game_id.clone(), config.game_config.clone(), seed);
        if let Some(script) = self.script {
            engine = engine.with_script(script);
        }
        let first_round = engine.round().number;

        let feed: Arc<dyn IdentityFeed> = self
            .feed
            .unwrap_or_else(|| Arc::new(StaticIdentityFeed::new()));

        let (command_tx, command_rx) = mpsc::channel::<Command>(config.command_buffer_size);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let event_bus = EventBus::with_capacity(config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let mut background = Vec::new();

        // Subscribe before the simulation starts so no boundary event is missed.
        if let Some(ledger) = self.ledger {
            let settlement =
                SettlementWorker::new(ledger, &event_bus, first_round, shutdown_rx.clone());
            background.push(tokio::spawn(settlement.run()));
        }

        let ambient = AmbientChatWorker::new(
            Arc::clone(&feed),
            event_bus.clone(),
            config.ambient_chat_interval,
            shutdown_rx.clone(),
        );
        background.push(tokio::spawn(ambient.run()));

        let poller = FeedPoller::new(
            Arc::clone(&feed),
            config.feed_poll_interval,
            shutdown_rx.clone(),
        );
        background.push(tokio::spawn(poller.run()));

        let sim_worker = SimulationWorker::new(
            engine,
            feed,
            command_rx,
            event_bus,
            Cadence {
                logic: config.logic_tick,
                movement: config.movement_tick,
            },
            shutdown_rx,
        );
        let sim_worker_handle = tokio::spawn(sim_worker.run());

        tracing::info!(
            target: "runtime",
            game_id = %config.game_id,
            seed,
            "runtime started"
        );

        Ok(Runtime {
            handle,
            shutdown_tx,
            sim_worker_handle,
            background,
        })
    }
}
