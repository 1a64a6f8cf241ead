//! Autonomous ACTION-phase behaviour: sabotage, kills and task progress.
use crate::event::EngineEvent;
use crate::rng::{self, RandomSource};
use crate::state::{AgentId, Phase, Round, SabotageResolution, WinReason};

use super::{GameEngine, LOG_TARGET};

impl<R: RandomSource> GameEngine<R> {
    /// Sub-steps run in win-priority order; each one stops if an earlier
    /// step ended the round or opened a meeting.
    pub(super) fn action_step(&mut self) {
        self.sabotage_step();
        if self.round.phase == Phase::Action {
            self.kill_step();
        }
        if self.round.phase == Phase::Action {
            self.task_step();
        }
    }

    fn sabotage_step(&mut self) {
        let impostor_alive = self.round.live_impostors() > 0;
        let Round {
            agents, sabotage, ..
        } = &mut self.round;
        let report = sabotage.tick(&mut self.rng, &self.config, impostor_alive, |room| {
            agents
                .values()
                .any(|a| a.is_live_crewmate() && a.room == room)
        });

        if let Some(def) = report.triggered {
            tracing::info!(
                target: LOG_TARGET,
                round = self.round.number,
                sabotage = def.name,
                timer = def.duration_secs,
                "sabotage triggered"
            );
            self.events.push(EngineEvent::SabotageTriggered {
                name: def.name.to_owned(),
                room: def.room,
                timer: def.duration_secs,
            });
        }

        match report.resolution {
            Some(SabotageResolution::Repaired(def)) => {
                tracing::info!(
                    target: LOG_TARGET,
                    round = self.round.number,
                    sabotage = def.name,
                    "sabotage repaired"
                );
                self.events.push(EngineEvent::SabotageRepaired {
                    name: def.name.to_owned(),
                });
            }
            Some(SabotageResolution::Expired(_)) => self.end_game(WinReason::Sabotage),
            None => {}
        }
    }

    fn kill_step(&mut self) {
        let impostors: Vec<AgentId> = self
            .round
            .agents
            .values()
            .filter(|a| a.is_live_impostor())
            .map(|a| a.id.clone())
            .collect();

        for id in impostors {
            if self.round.phase != Phase::Action {
                break;
            }
            let Some(killer) = self.round.agents.get_mut(&id) else {
                continue;
            };
            if killer.kill_cooldown > 0 {
                killer.kill_cooldown -= 1;
                continue;
            }
            if killer.controlled {
                continue;
            }

            let room = killer.room;
            let targets: Vec<AgentId> = self
                .round
                .agents
                .values()
                .filter(|t| t.id != id && t.is_live_crewmate() && t.room == room)
                .map(|t| t.id.clone())
                .collect();
            if targets.is_empty() || !self.rng.chance(self.config.kill_chance) {
                continue;
            }
            let Some(victim) = rng::pick(&mut self.rng, &targets).cloned() else {
                continue;
            };
            self.autonomous_kill(&id, &victim);
        }
    }

    fn autonomous_kill(&mut self, killer: &AgentId, victim: &AgentId) {
        if !self.kill_agent(victim) {
            return;
        }
        if let Some(agent) = self.round.agents.get_mut(killer) {
            agent.kill_cooldown = self.config.kill_cooldown_ticks;
        }
        let witnessed = self.rng.chance(self.config.witness_chance);

        tracing::info!(
            target: LOG_TARGET,
            round = self.round.number,
            killer = %killer,
            victim = %victim,
            witnessed,
            "agent killed"
        );
        self.events.push(EngineEvent::AgentKilled {
            killer: killer.clone(),
            victim: victim.clone(),
            witnessed,
        });

        if self.check_win() {
            return;
        }
        if witnessed {
            self.open_meeting(killer.clone(), Some(victim.clone()));
        }
    }

    fn task_step(&mut self) {
        let workers: Vec<(AgentId, crate::map::RoomId)> = self
            .round
            .tasks
            .assignees()
            .filter_map(|id| self.round.agents.get(id))
            .filter(|a| a.alive)
            .map(|a| (a.id.clone(), a.room))
            .collect();

        for (id, room) in workers {
            if let Some(task) = self.round.tasks.progress(&id, room) {
                tracing::debug!(
                    target: LOG_TARGET,
                    agent = %id,
                    task = task.name,
                    "task completed"
                );
                self.events.push(EngineEvent::TaskCompleted {
                    agent: id,
                    task: task.name.to_owned(),
                });
            }
        }

        if self.round.tasks.all_completed() {
            self.end_game(WinReason::Tasks);
        }
    }
}
