//! Meeting ballots: autonomous voting and resolution.
use std::collections::BTreeMap;

use crate::event::EngineEvent;
use crate::rng::{self, RandomSource};
use crate::state::{AgentId, Role, VoteTarget};

use super::{GameEngine, LOG_TARGET};

/// Count ballots and return the agent to eject, if any.
///
/// Only a strict, unique plurality for an agent ejects; a tie at the top or
/// a skip plurality ejects nobody.
pub fn tally<'a, I>(votes: I) -> Option<AgentId>
where
    I: IntoIterator<Item = &'a VoteTarget>,
{
    let mut counts: BTreeMap<&VoteTarget, usize> = BTreeMap::new();
    for target in votes {
        *counts.entry(target).or_default() += 1;
    }

    let max = counts.values().copied().max()?;
    let mut leaders = counts.into_iter().filter(|&(_, n)| n == max);
    let (leader, _) = leaders.next()?;
    if leaders.next().is_some() {
        return None;
    }
    match leader {
        VoteTarget::Agent(id) => Some(id.clone()),
        VoteTarget::Skip => None,
    }
}

impl<R: RandomSource> GameEngine<R> {
    /// Every living, non-controlled agent casts one ballot.
    pub(super) fn auto_vote(&mut self) {
        let living: Vec<(AgentId, Role)> = self
            .round
            .living()
            .map(|a| (a.id.clone(), a.role))
            .collect();
        let voters: Vec<(AgentId, Role)> = self
            .round
            .living()
            .filter(|a| !a.controlled)
            .map(|a| (a.id.clone(), a.role))
            .collect();
        let impostors: Vec<AgentId> = ids_with_role(&living, Role::Impostor);
        let crewmates: Vec<AgentId> = ids_with_role(&living, Role::Crewmate);

        for (voter, role) in voters {
            let target = match role {
                Role::Impostor => rng::pick(&mut self.rng, &crewmates)
                    .cloned()
                    .map_or(VoteTarget::Skip, VoteTarget::Agent),
                Role::Crewmate => {
                    if !impostors.is_empty()
                        && self.rng.chance(self.config.crew_correct_vote_chance)
                    {
                        rng::pick(&mut self.rng, &impostors)
                            .cloned()
                            .map_or(VoteTarget::Skip, VoteTarget::Agent)
                    } else {
                        let mut options: Vec<VoteTarget> = living
                            .iter()
                            .filter(|(id, _)| *id != voter)
                            .map(|(id, _)| VoteTarget::Agent(id.clone()))
                            .collect();
                        options.push(VoteTarget::Skip);
                        rng::pick(&mut self.rng, &options)
                            .cloned()
                            .unwrap_or(VoteTarget::Skip)
                    }
                }
            };
            self.record_vote(voter, target);
        }
    }

    /// Write a ballot to both the ledger and the meeting context.
    pub(super) fn record_vote(&mut self, voter: AgentId, target: VoteTarget) -> bool {
        if !self.round.ledger.cast_vote(voter.clone(), target.clone()) {
            return false;
        }
        self.round.meeting.votes.insert(voter, target);
        true
    }

    pub(super) fn resolve_meeting(&mut self) {
        match tally(self.round.ledger.votes().values()) {
            Some(id) if self.kill_agent(&id) => {
                tracing::info!(
                    target: LOG_TARGET,
                    round = self.round.number,
                    agent = %id,
                    "agent ejected"
                );
                self.events.push(EngineEvent::AgentEjected { agent: id });
            }
            _ => {
                tracing::info!(target: LOG_TARGET, round = self.round.number, "no one ejected");
                self.events.push(EngineEvent::NoEjection);
            }
        }

        if !self.check_win() {
            self.resume_action();
        }
    }
}

fn ids_with_role(agents: &[(AgentId, Role)], role: Role) -> Vec<AgentId> {
    agents
        .iter()
        .filter(|(_, r)| *r == role)
        .map(|(id, _)| id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(s: &str) -> VoteTarget {
        VoteTarget::Agent(AgentId::from(s))
    }

    #[test]
    fn unique_plurality_is_ejected() {
        let votes = [agent("x"), agent("x"), agent("y")];
        assert_eq!(tally(&votes), Some(AgentId::from("x")));
    }

    #[test]
    fn tie_ejects_nobody() {
        let votes = [agent("x"), agent("y")];
        assert_eq!(tally(&votes), None);
    }

    #[test]
    fn tie_below_the_top_does_not_block() {
        let votes = [agent("x"), agent("x"), agent("x"), agent("y"), agent("z")];
        assert_eq!(tally(&votes), Some(AgentId::from("x")));
    }

    #[test]
    fn skip_plurality_ejects_nobody() {
        let votes = [VoteTarget::Skip, VoteTarget::Skip, agent("x")];
        assert_eq!(tally(&votes), None);
    }

    #[test]
    fn no_votes_no_ejection() {
        assert_eq!(tally(&[] as &[VoteTarget]), None);
    }
}
