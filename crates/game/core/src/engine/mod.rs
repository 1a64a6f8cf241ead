//! Round orchestration: phase machine, autonomous behaviour and win detection.
//!
//! The [`GameEngine`] is the single writer of the live [`Round`]. A scheduler
//! calls [`tick_logic`](GameEngine::tick_logic) once per second and
//! [`tick_movement`](GameEngine::tick_movement) at the movement cadence,
//! injects [`PlayerCommand`]s through [`apply`](GameEngine::apply), and drains
//! [`EngineEvent`]s after each call.

mod behaviour;
mod commands;
mod discussion;
mod errors;
mod voting;
pub mod win;

#[cfg(test)]
mod tests;

pub use discussion::{DiscussionScript, LineContext};
pub use errors::{CommandRejection, JoinError};
pub use voting::tally;

use crate::config::GameConfig;
use crate::event::EngineEvent;
use crate::map::{Position, RoomId};
use crate::rng::{self, PcgRng, RandomSource};
use crate::snapshot::{SabotageSummary, Snapshot, WageringWindow};
use crate::state::{
    Agent, AgentId, AgentProfile, ChatPacing, MeetingContext, Outcome, Phase, Role, Round,
    WinReason,
};

const LOG_TARGET: &str = "game_core::engine";

/// Supplies lobby candidates pulled from an identity feed.
pub trait CandidateSource {
    fn next_candidate(&mut self) -> Option<AgentProfile>;
}

impl<F> CandidateSource for F
where
    F: FnMut() -> Option<AgentProfile>,
{
    fn next_candidate(&mut self) -> Option<AgentProfile> {
        self()
    }
}

/// Candidate source that never yields anyone.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCandidates;

impl CandidateSource for NoCandidates {
    fn next_candidate(&mut self) -> Option<AgentProfile> {
        None
    }
}

/// Tick-driven simulation of one game lobby, round after round.
pub struct GameEngine<R: RandomSource = PcgRng> {
    game_id: String,
    config: GameConfig,
    rng: R,
    round: Round,
    script: DiscussionScript,
    events: Vec<EngineEvent>,
}

impl GameEngine<PcgRng> {
    /// Engine driven by a [`PcgRng`] seeded with `seed`.
    pub fn seeded(game_id: impl Into<String>, config: GameConfig, seed: u64) -> Self {
        Self::new(game_id, config, PcgRng::new(seed))
    }
}

impl<R: RandomSource> GameEngine<R> {
    /// Create an engine with an open lobby for round 1.
    pub fn new(game_id: impl Into<String>, config: GameConfig, rng: R) -> Self {
        let round = Round::new(1, &config);
        Self {
            game_id: game_id.into(),
            config,
            rng,
            round,
            script: DiscussionScript::default(),
            events: Vec::new(),
        }
    }

    pub fn with_script(mut self, script: DiscussionScript) -> Self {
        self.script = script;
        self
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    /// Mutable access to the live round, for harnesses that need to stage
    /// specific situations.
    pub fn round_mut(&mut self) -> &mut Round {
        &mut self.round
    }

    pub fn phase(&self) -> Phase {
        self.round.phase
    }

    pub fn timer(&self) -> u32 {
        self.round.timer
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.round.agent(id)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.round.outcome
    }

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    // ===== roster =====

    /// Add a candidate to the lobby.
    pub fn join(&mut self, profile: AgentProfile) -> Result<(), JoinError> {
        if self.round.phase != Phase::Lobby {
            return Err(JoinError::WrongPhase {
                phase: self.round.phase,
            });
        }
        if self.round.agents.len() >= self.config.max_players {
            return Err(JoinError::RosterFull {
                capacity: self.config.max_players,
            });
        }
        if self.round.agents.contains_key(&profile.id) {
            return Err(JoinError::Duplicate(profile.id));
        }

        let mut agent = Agent::from_profile(profile);
        // Small jitter so lobby avatars do not stack on one pixel.
        let spawn = RoomId::SPAWN.center();
        agent.position = Position::new(
            spawn.x + self.rng.next_f64() * 4.0 - 2.0,
            spawn.y + self.rng.next_f64() * 4.0 - 2.0,
        );

        tracing::debug!(
            target: LOG_TARGET,
            round = self.round.number,
            agent = %agent.id,
            name = %agent.name,
            "agent joined lobby"
        );
        self.events.push(EngineEvent::AgentJoined {
            agent: agent.id.clone(),
            name: agent.name.clone(),
        });
        self.round.map.spawn(agent.id.clone());
        self.round.map.set_position(&agent.id, agent.position);
        self.round.agents.insert(agent.id.clone(), agent);
        Ok(())
    }

    /// Hand `id` to (or take it back from) an external controller.
    ///
    /// Returns `false` for unknown agents.
    pub fn set_controlled(&mut self, id: &AgentId, controlled: bool) -> bool {
        let Some(agent) = self.round.agents.get_mut(id) else {
            return false;
        };
        agent.controlled = controlled;
        self.round.map.set_controlled(id, controlled);
        true
    }

    // ===== ticks =====

    /// One logic tick (nominally one second).
    ///
    /// A tick that expires the phase timer only performs the transition; the
    /// new phase starts acting on the following tick.
    pub fn tick_logic(&mut self, candidates: &mut impl CandidateSource) {
        self.round.timer = self.round.timer.saturating_sub(1);
        if self.round.timer == 0 {
            self.on_timeout();
            return;
        }

        if self.round.phase == Phase::Lobby {
            self.spawn_from(candidates);
        }

        if self.round.phase == Phase::Action {
            self.action_step();
        }

        if self.round.phase == Phase::Meeting {
            self.discussion_step();
            if self.round.timer == self.config.auto_vote_at {
                self.auto_vote();
            }
        }
    }

    /// One movement tick: walk agents during ACTION and sync the roster.
    pub fn tick_movement(&mut self) {
        if self.round.phase != Phase::Action {
            return;
        }
        self.round.map.tick(&mut self.rng, &self.config);

        let Round { agents, map, .. } = &mut self.round;
        for agent in agents.values_mut().filter(|a| a.alive) {
            agent.position = map.position(&agent.id);
            agent.room = map.room(&agent.id);
        }
    }

    fn on_timeout(&mut self) {
        match self.round.phase {
            Phase::Lobby => {
                if self.round.agents.len() >= self.config.min_players {
                    self.start_game();
                } else {
                    tracing::debug!(
                        target: LOG_TARGET,
                        players = self.round.agents.len(),
                        needed = self.config.min_players,
                        "not enough players, extending lobby"
                    );
                    self.round.timer = self.config.lobby_extension_secs;
                }
            }
            Phase::Action => self.end_game(WinReason::Survival),
            Phase::Meeting => self.resolve_meeting(),
            Phase::Ended => self.reset_round(),
        }
    }

    fn spawn_from(&mut self, candidates: &mut impl CandidateSource) {
        if self.round.agents.len() >= self.config.max_players {
            return;
        }
        if self.round.spawn_cooldown > 0 {
            self.round.spawn_cooldown -= 1;
            return;
        }
        let Some(profile) = candidates.next_candidate() else {
            return;
        };
        if let Err(error) = self.join(profile) {
            tracing::debug!(target: LOG_TARGET, %error, "skipped lobby candidate");
        }
        self.round.spawn_cooldown = self.config.spawn_interval;
    }

    // ===== phase transitions =====

    fn transition(&mut self, phase: Phase) {
        self.round.phase = phase;
        if phase == Phase::Meeting {
            self.round.ledger.start();
        } else {
            self.round.ledger.end();
        }
        tracing::info!(
            target: LOG_TARGET,
            round = self.round.number,
            phase = %phase,
            "phase changed"
        );
        self.events.push(EngineEvent::PhaseChanged {
            round: self.round.number,
            phase,
        });
    }

    fn start_game(&mut self) {
        self.assign_roles();

        let crewmates: Vec<AgentId> = self
            .round
            .agents
            .values()
            .filter(|a| a.role == Role::Crewmate)
            .map(|a| a.id.clone())
            .collect();
        self.round.tasks.assign(
            &mut self.rng,
            &crewmates,
            self.config.tasks_per_crewmate,
            self.config.task_duration_ticks,
        );
        self.round.sabotage.arm(self.config.sabotage_grace_ticks);
        self.round.saved_action_timer = 0;

        self.transition(Phase::Action);
        self.round.timer = self.config.action_secs;

        self.round.wagering_locked = true;
        self.events.push(EngineEvent::WageringLocked {
            round: self.round.number,
        });
        tracing::info!(
            target: LOG_TARGET,
            round = self.round.number,
            players = self.round.agents.len(),
            tasks = self.round.tasks.tally().total,
            "game started"
        );
    }

    fn assign_roles(&mut self) {
        let mut ids: Vec<AgentId> = self.round.agents.keys().cloned().collect();
        rng::shuffle(&mut self.rng, &mut ids);
        let impostors = self.config.impostor_count.min(ids.len());
        for (index, id) in ids.iter().enumerate() {
            if let Some(agent) = self.round.agents.get_mut(id) {
                agent.role = if index < impostors {
                    Role::Impostor
                } else {
                    Role::Crewmate
                };
                agent.kill_cooldown = 0;
            }
        }
    }

    /// Open a meeting, remembering how much ACTION time was left.
    fn open_meeting(&mut self, reporter: AgentId, body: Option<AgentId>) {
        tracing::info!(
            target: LOG_TARGET,
            round = self.round.number,
            reporter = %reporter,
            "emergency meeting"
        );
        self.round.saved_action_timer = self.round.timer;
        self.round.meeting = MeetingContext {
            reporter: Some(reporter),
            body_found: body,
            votes: Default::default(),
        };
        self.round.chat = ChatPacing {
            cooldown: 1,
            count: 0,
        };
        self.transition(Phase::Meeting);
        self.round.timer = self.config.meeting_secs;
    }

    /// Return from a meeting to ACTION with the interrupted time restored.
    fn resume_action(&mut self) {
        self.transition(Phase::Action);
        self.round.timer = if self.round.saved_action_timer > 0 {
            self.round.saved_action_timer
        } else {
            self.config.action_secs
        };
    }

    /// Run the win rules; returns `true` if the round ended.
    fn check_win(&mut self) -> bool {
        match win::evaluate(&self.round) {
            Some(reason) => {
                self.end_game(reason);
                true
            }
            None => self.round.phase == Phase::Ended,
        }
    }

    fn end_game(&mut self, reason: WinReason) {
        if self.round.phase == Phase::Ended {
            return;
        }
        let outcome = Outcome::new(reason);
        tracing::info!(
            target: LOG_TARGET,
            round = self.round.number,
            result = %outcome,
            action_elapsed = self.config.action_secs.saturating_sub(self.round.timer),
            "game ended"
        );
        self.round.outcome = Some(outcome);
        self.round.sabotage.clear();
        self.transition(Phase::Ended);
        self.round.timer = self.config.reset_secs;
        self.events.push(EngineEvent::RoundEnded {
            round: self.round.number,
            outcome,
        });
    }

    fn reset_round(&mut self) {
        self.round.reset(&self.config);
        tracing::info!(target: LOG_TARGET, round = self.round.number, "round reset");
        self.events.push(EngineEvent::PhaseChanged {
            round: self.round.number,
            phase: Phase::Lobby,
        });
        self.events.push(EngineEvent::RoundReset {
            round: self.round.number,
        });
    }

    /// Mark `id` dead and pin it in place. Returns `false` if it was already dead.
    fn kill_agent(&mut self, id: &AgentId) -> bool {
        let Some(agent) = self.round.agents.get_mut(id) else {
            return false;
        };
        if !agent.alive {
            return false;
        }
        agent.alive = false;
        self.round.map.freeze(id);
        true
    }

    // ===== snapshot =====

    pub fn snapshot(&self) -> Snapshot {
        let round = &self.round;
        Snapshot {
            game_id: self.game_id.clone(),
            round: round.number,
            phase: round.phase,
            timer: round.timer,
            agents: round.agents.values().cloned().collect(),
            meeting: round.meeting.clone(),
            winner: round.outcome.map(|o| o.to_string()),
            outcome: round.outcome,
            task_progress: round.tasks.tally(),
            sabotage: round.sabotage.active().map(|s| SabotageSummary {
                name: s.def.name.to_owned(),
                room: s.def.room,
                timer: s.timer,
            }),
            wagering: self.wagering_window(),
        }
    }

    fn wagering_window(&self) -> WageringWindow {
        let timer = self.round.timer;
        let reset = self.config.reset_secs;
        match self.round.phase {
            Phase::Lobby => WageringWindow {
                open: true,
                closes_in: timer,
                opens_in: 0,
            },
            Phase::Action => WageringWindow {
                open: false,
                closes_in: 0,
                opens_in: timer + reset,
            },
            Phase::Meeting => WageringWindow {
                open: false,
                closes_in: 0,
                opens_in: timer + self.round.saved_action_timer + reset,
            },
            Phase::Ended => WageringWindow {
                open: false,
                closes_in: 0,
                opens_in: timer,
            },
        }
    }
}
