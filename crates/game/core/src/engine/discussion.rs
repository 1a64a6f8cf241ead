//! Generated meeting chat and its phrase pools.
//!
//! Templates may contain `{victim}`, `{accused}` and `{room}` placeholders.
use crate::event::EngineEvent;
use crate::map::RoomId;
use crate::rng::{self, RandomSource};
use crate::state::AgentId;

use super::GameEngine;

/// Elapsed fraction of a meeting before accusations give way to reactions.
const EARLY_PHASE: f64 = 0.35;
/// Elapsed fraction after which vote pressure may start.
const LATE_PHASE: f64 = 0.65;
/// Chance a mid-meeting speaker defends themselves instead of reacting.
const DEFENSE_CHANCE: f64 = 0.4;

struct Speaker {
    id: AgentId,
    name: String,
    room: RoomId,
}

impl<R: RandomSource> GameEngine<R> {
    /// Emit at most one meeting line, paced by a short random cooldown.
    pub(super) fn discussion_step(&mut self) {
        let chat = &mut self.round.chat;
        if chat.cooldown > 0 {
            chat.cooldown -= 1;
            return;
        }
        if chat.count >= self.config.meeting_chat_cap {
            return;
        }

        let living: Vec<Speaker> = self
            .round
            .living()
            .map(|a| Speaker {
                id: a.id.clone(),
                name: a.name.clone(),
                room: a.room,
            })
            .collect();
        if living.len() < 2 {
            return;
        }

        let reporter = self.round.meeting.reporter.clone();
        let victim = self
            .round
            .meeting
            .body_found
            .as_ref()
            .and_then(|id| self.round.agent(id))
            .map(|a| a.name.clone());

        let opening = self.round.chat.count == 0;
        let live_reporter = reporter
            .as_ref()
            .and_then(|id| living.iter().find(|s| &s.id == id));

        let line = match live_reporter {
            Some(sender) if opening => {
                let pool = if victim.is_some() {
                    &self.script.report_body
                } else {
                    &self.script.report_no_body
                };
                rng::pick(&mut self.rng, pool).map(|template| {
                    let ctx = LineContext {
                        victim: victim.as_deref(),
                        accused: None,
                        room: "",
                    };
                    (sender.id.clone(), DiscussionScript::render(template, ctx))
                })
            }
            _ => self.open_floor_line(&living, reporter.as_ref(), victim.as_deref()),
        };

        let Some((sender, content)) = line else {
            return;
        };
        self.round.ledger.add_message(sender.clone(), content.clone());
        self.events.push(EngineEvent::MeetingChat { sender, content });
        self.round.chat.count += 1;
        self.round.chat.cooldown = self.rng.range(1, 2);
    }

    /// A line from anyone but the reporter, themed by how far the meeting has run.
    fn open_floor_line(
        &mut self,
        living: &[Speaker],
        reporter: Option<&AgentId>,
        victim: Option<&str>,
    ) -> Option<(AgentId, String)> {
        let others: Vec<&Speaker> = living
            .iter()
            .filter(|s| Some(&s.id) != reporter)
            .collect();
        let sender = if others.is_empty() {
            rng::pick(&mut self.rng, living)?
        } else {
            *rng::pick(&mut self.rng, &others)?
        };

        let targets: Vec<&Speaker> = living.iter().filter(|s| s.id != sender.id).collect();
        let accused = rng::pick(&mut self.rng, &targets).map(|s| s.name.as_str());

        let meeting_secs = f64::from(self.config.meeting_secs.max(1));
        let progress = 1.0 - f64::from(self.round.timer) / meeting_secs;
        let roll = self.rng.next_f64();

        let pool = if progress < EARLY_PHASE && accused.is_some() {
            &self.script.accusations
        } else if progress < LATE_PHASE || roll < 0.5 {
            if self.rng.chance(DEFENSE_CHANCE) && accused.is_some() {
                &self.script.defenses
            } else if accused.is_some() {
                &self.script.reactions
            } else {
                &self.script.filler
            }
        } else {
            &self.script.pressure
        };

        let room = sender.room.to_string();
        let template = rng::pick(&mut self.rng, pool)?;
        let ctx = LineContext {
            victim,
            accused,
            room: &room,
        };
        Some((sender.id.clone(), DiscussionScript::render(template, ctx)))
    }
}

/// Swappable content for the meeting discussion generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscussionScript {
    /// Reporter's opening line when a body was found.
    pub report_body: Vec<String>,
    /// Reporter's opening line without a body.
    pub report_no_body: Vec<String>,
    /// Early meeting: accusations and suspicion.
    pub accusations: Vec<String>,
    /// Mid meeting: the speaker defends themselves or redirects.
    pub defenses: Vec<String>,
    /// Mid meeting: piling on or disagreeing about the accused.
    pub reactions: Vec<String>,
    /// Mid meeting with nobody to talk about.
    pub filler: Vec<String>,
    /// Late meeting: vote pressure.
    pub pressure: Vec<String>,
}

/// Values substituted into a template.
#[derive(Clone, Copy, Debug)]
pub struct LineContext<'a> {
    pub victim: Option<&'a str>,
    pub accused: Option<&'a str>,
    pub room: &'a str,
}

impl DiscussionScript {
    pub fn render(template: &str, ctx: LineContext<'_>) -> String {
        template
            .replace("{victim}", ctx.victim.unwrap_or("the body"))
            .replace("{accused}", ctx.accused.unwrap_or("someone"))
            .replace("{room}", ctx.room)
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

impl Default for DiscussionScript {
    fn default() -> Self {
        Self {
            report_body: lines(&[
                "I found {victim}'s body!",
                "{victim} is dead. I just found them.",
                "Someone killed {victim}. I'm calling meeting.",
                "I was walking by and saw {victim} on the ground.",
            ]),
            report_no_body: lines(&[
                "I called meeting. Something's off.",
                "Something sus is going on, guys.",
                "We need to talk. Now.",
                "I don't trust what's happening here.",
            ]),
            accusations: lines(&[
                "I think it's {accused}.",
                "{accused} was acting weird before this.",
                "Where was {accused} the whole time?",
                "I saw {accused} near {victim}.",
                "{accused} didn't do any tasks, just wandered around.",
                "Doesn't anyone else find {accused} suspicious?",
                "{accused} was alone for way too long.",
                "I have a bad feeling about {accused}.",
            ]),
            defenses: lines(&[
                "I was doing tasks the whole time, check the logs.",
                "I literally just finished wires, I'm not impostor.",
                "Why are we blaming {accused}? Look at the others.",
                "Can we get some actual evidence before voting?",
                "I was in {room} the entire time.",
                "This is taking too long. Someone just pick.",
                "Has anyone actually seen who did it?",
                "I don't have enough info to vote yet.",
            ]),
            reactions: lines(&[
                "Yeah {accused} does seem sus ngl.",
                "I don't think it's {accused} though.",
                "Wait, {accused} was with me earlier.",
                "{accused} could be lying about that.",
                "Let's not rush this. {accused} might be innocent.",
                "Actually {accused} was doing tasks when I checked.",
                "{accused} is clearly trying to deflect.",
                "I dunno, {accused} seemed normal to me.",
            ]),
            filler: lines(&[
                "Can we just focus here?",
                "Someone needs to say something useful.",
                "This is going nowhere...",
            ]),
            pressure: lines(&[
                "We're running out of time, just vote already.",
                "Skip if you're not sure, better than a random vote.",
                "Okay final answer, who is it?",
                "Time's almost up. Vote now or we lose.",
                "I'm going with my gut on this one.",
                "If we skip we're basically giving them the win.",
                "Last chance to change your mind before the vote.",
                "Everyone commit. No more changing.",
            ]),
        }
    }
}
