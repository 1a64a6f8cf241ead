//! Simulation worker that owns the authoritative [`game_core::GameEngine`].
//!
//! Multiplexes the logic clock, the movement clock and inbound commands on a
//! single task, so every handler runs to completion before the next starts.
//! Engine events are drained after each handler and published to the bus.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Duration, Instant, Interval, MissedTickBehavior};
use tracing::debug;

use game_core::{AgentId, AgentProfile, EngineEvent, GameEngine, PlayerCommand, Snapshot};

use crate::api::{Result, RuntimeError};
use crate::events::{ChatKind, ChatMessage, Event, EventBus};
use crate::providers::IdentityFeed;

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Add an agent to the lobby.
    Join {
        profile: AgentProfile,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Relay a controller command.
    Submit {
        actor: AgentId,
        command: PlayerCommand,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Claim or release external control of an agent.
    SetControl {
        agent: AgentId,
        controlled: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Query the current snapshot (read-only).
    Snapshot { reply: oneshot::Sender<Snapshot> },
}

/// Tick cadences for the simulation loop.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    pub logic: Duration,
    pub movement: Duration,
}

/// Background task that drives the engine.
pub struct SimulationWorker {
    engine: GameEngine,
    feed: Arc<dyn IdentityFeed>,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    cadence: Cadence,
    shutdown: watch::Receiver<bool>,
}

/// First tick one full period from now, so a fresh lobby gets its whole timer.
fn clock(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

impl SimulationWorker {
    /// Creates a new simulation worker.
    pub fn new(
        engine: GameEngine,
        feed: Arc<dyn IdentityFeed>,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        cadence: Cadence,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        tracing::info!(
            target: "runtime::worker",
            game_id = engine.game_id(),
            round = engine.round().number,
            logic_ms = cadence.logic.as_millis() as u64,
            movement_ms = cadence.movement.as_millis() as u64,
            "SimulationWorker initialized"
        );

        Self {
            engine,
            feed,
            command_rx,
            event_bus,
            cadence,
            shutdown,
        }
    }

    /// Main worker loop. Exits on shutdown.
    pub async fn run(mut self) {
        let mut logic = clock(self.cadence.logic);
        let mut movement = clock(self.cadence.movement);
        let mut commands_open = true;

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                cmd = self.command_rx.recv(), if commands_open => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd),
                        None => commands_open = false,
                    }
                }
                _ = logic.tick() => self.handle_logic_tick(),
                _ = movement.tick() => self.handle_movement_tick(),
            }
        }

        debug!(
            target: "runtime::worker",
            round = self.engine.round().number,
            "SimulationWorker stopped"
        );
    }

    fn handle_logic_tick(&mut self) {
        let feed = &self.feed;
        let mut candidates = || feed.pop_candidates(1).pop();
        self.engine.tick_logic(&mut candidates);
        self.flush_events();
    }

    fn handle_movement_tick(&mut self) {
        self.engine.tick_movement();
        self.flush_events();
        self.event_bus
            .publish(Event::Snapshot(Box::new(self.engine.snapshot())));
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Join { profile, reply } => {
                let result = self.engine.join(profile).map_err(RuntimeError::from);
                self.flush_events();
                if reply.send(result).is_err() {
                    debug!("Join reply channel closed (caller dropped)");
                }
            }
            Command::Submit {
                actor,
                command,
                reply,
            } => {
                let result = self.engine.apply(&actor, command).map_err(|rejection| {
                    debug!(
                        target: "runtime::worker",
                        actor = %actor,
                        %rejection,
                        "command rejected"
                    );
                    RuntimeError::from(rejection)
                });
                self.flush_events();
                if reply.send(result).is_err() {
                    debug!("Submit reply channel closed (caller dropped)");
                }
            }
            Command::SetControl {
                agent,
                controlled,
                reply,
            } => {
                let result = if self.engine.set_controlled(&agent, controlled) {
                    debug!(target: "runtime::worker", agent = %agent, controlled, "control changed");
                    Ok(())
                } else {
                    Err(RuntimeError::UnknownAgent(agent))
                };
                if reply.send(result).is_err() {
                    debug!("SetControl reply channel closed (caller dropped)");
                }
            }
            Command::Snapshot { reply } => {
                if reply.send(self.engine.snapshot()).is_err() {
                    debug!("Snapshot reply channel closed (caller dropped)");
                }
            }
        }
    }

    /// Publish every queued engine event, fanning phase changes and meeting
    /// chat out to their own topics.
    fn flush_events(&mut self) {
        for event in self.engine.drain_events() {
            match &event {
                EngineEvent::PhaseChanged { round, phase } => {
                    self.event_bus.publish(Event::Phase {
                        round: *round,
                        phase: *phase,
                    });
                }
                EngineEvent::MeetingChat { sender, content } => {
                    let mut message =
                        ChatMessage::now(sender.as_str(), content.clone(), ChatKind::Meeting);
                    if let Some(agent) = self.engine.agent(sender) {
                        message = message.with_sender_name(agent.name.clone());
                    }
                    self.event_bus.publish(Event::Chat(message));
                }
                _ => {}
            }
            self.event_bus.publish(Event::Game(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Topic;
    use crate::providers::StaticIdentityFeed;
    use game_core::{GameConfig, Phase};

    fn worker_with_engine(engine: GameEngine, bus: &EventBus) -> SimulationWorker {
        let (_command_tx, command_rx) = mpsc::channel(1);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        SimulationWorker::new(
            engine,
            Arc::new(StaticIdentityFeed::new()),
            command_rx,
            bus.clone(),
            Cadence {
                logic: Duration::from_secs(1),
                movement: Duration::from_millis(100),
            },
            shutdown_rx,
        )
    }

    #[test]
    fn meeting_chat_carries_agent_id_and_display_name() {
        let mut engine = GameEngine::seeded("chat", GameConfig::default(), 5);
        for i in 0..4 {
            engine
                .join(AgentProfile::new(format!("agent-{i}"), "Twin"))
                .unwrap();
        }
        let round = engine.round_mut();
        round.phase = Phase::Meeting;
        round.timer = 10;
        round.ledger.start();

        let bus = EventBus::new();
        let mut chat = bus.subscribe(Topic::Chat);
        let mut worker = worker_with_engine(engine, &bus);
        worker.handle_logic_tick();

        match chat.try_recv().unwrap() {
            Event::Chat(message) => {
                assert_eq!(message.kind, ChatKind::Meeting);
                assert!(message.sender.starts_with("agent-"));
                assert_eq!(message.sender_name, "Twin");
                let speaker = AgentId::from(message.sender.as_str());
                assert!(worker.engine.agent(&speaker).is_some());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
