//! Validation and application of externally issued commands.
use crate::command::PlayerCommand;
use crate::event::EngineEvent;
use crate::map::Position;
use crate::rng::RandomSource;
use crate::state::{AgentId, Phase, VoteTarget};

use super::{CommandRejection, GameEngine, LOG_TARGET};

impl<R: RandomSource> GameEngine<R> {
    /// Apply `command` on behalf of `actor`.
    ///
    /// A rejected command leaves the round untouched.
    pub fn apply(&mut self, actor: &AgentId, command: PlayerCommand) -> Result<(), CommandRejection> {
        let agent = self
            .round
            .agent(actor)
            .ok_or_else(|| CommandRejection::UnknownAgent(actor.clone()))?;
        if !agent.alive {
            return Err(CommandRejection::DeadActor(actor.clone()));
        }

        let phase = self.round.phase;
        let allowed = match command {
            PlayerCommand::Move { .. } => matches!(phase, Phase::Lobby | Phase::Action),
            PlayerCommand::Kill { .. } => phase == Phase::Action,
            PlayerCommand::Vote { .. } => phase == Phase::Meeting,
        };
        if !allowed {
            return Err(CommandRejection::WrongPhase {
                command: command.name(),
                phase,
            });
        }

        match command {
            PlayerCommand::Move { x, y } => {
                self.move_agent(actor, Position::clamped(x, y));
                Ok(())
            }
            PlayerCommand::Kill { target } => self.manual_kill(actor, &target),
            PlayerCommand::Vote { target } => self.manual_vote(actor, target),
        }
    }

    fn move_agent(&mut self, actor: &AgentId, pos: Position) {
        self.round.map.set_position(actor, pos);
        let room = self.round.map.room(actor);
        if let Some(agent) = self.round.agents.get_mut(actor) {
            agent.position = pos;
            agent.room = room;
        }
    }

    fn manual_kill(&mut self, actor: &AgentId, target: &AgentId) -> Result<(), CommandRejection> {
        let killer = self
            .round
            .agent(actor)
            .ok_or_else(|| CommandRejection::UnknownAgent(actor.clone()))?;
        if !killer.is_impostor() {
            return Err(CommandRejection::NotImpostor(actor.clone()));
        }
        if killer.kill_cooldown > 0 {
            return Err(CommandRejection::OnCooldown {
                remaining: killer.kill_cooldown,
            });
        }
        if target == actor {
            return Err(CommandRejection::SelfTarget);
        }
        let victim = self
            .round
            .agent(target)
            .filter(|v| v.is_live_crewmate())
            .ok_or_else(|| CommandRejection::InvalidTarget(target.clone()))?;
        if victim.room != killer.room {
            return Err(CommandRejection::NotInRoom(target.clone()));
        }

        self.kill_agent(target);
        if let Some(agent) = self.round.agents.get_mut(actor) {
            agent.kill_cooldown = self.config.kill_cooldown_ticks;
        }
        tracing::info!(
            target: LOG_TARGET,
            round = self.round.number,
            killer = %actor,
            victim = %target,
            "manual kill"
        );
        self.events.push(EngineEvent::AgentKilled {
            killer: actor.clone(),
            victim: target.clone(),
            witnessed: false,
        });
        self.check_win();
        Ok(())
    }

    fn manual_vote(&mut self, actor: &AgentId, target: VoteTarget) -> Result<(), CommandRejection> {
        if self.round.ledger.has_voted(actor) {
            return Err(CommandRejection::AlreadyVoted(actor.clone()));
        }
        if let VoteTarget::Agent(id) = &target {
            if id == actor {
                return Err(CommandRejection::SelfTarget);
            }
            if !self.round.agent(id).is_some_and(|a| a.alive) {
                return Err(CommandRejection::InvalidTarget(id.clone()));
            }
        }
        tracing::debug!(
            target: LOG_TARGET,
            voter = %actor,
            ballot = ?target,
            "vote received"
        );
        if self.record_vote(actor.clone(), target) {
            Ok(())
        } else {
            Err(CommandRejection::AlreadyVoted(actor.clone()))
        }
    }
}
