//! Full seeded rounds driven the way a scheduler would: one logic tick
//! followed by ten movement ticks.
use std::collections::{BTreeSet, VecDeque};

use game_core::{
    AgentProfile, EngineEvent, GameConfig, GameEngine, Phase, ProfileMetadata, Side, WinReason,
};

const MOVEMENT_PER_LOGIC: usize = 10;
const TICK_LIMIT: usize = 5_000;

fn roster() -> VecDeque<AgentProfile> {
    (0..12)
        .map(|i| {
            AgentProfile::new(format!("agent-{i:02}"), format!("Agent {i}")).with_metadata(
                ProfileMetadata {
                    color: Some(format!("#00{i:02}ff")),
                    karma: i64::from(i) * 10,
                    ..ProfileMetadata::default()
                }
                .with_posts([format!("first post by {i}"), format!("second post by {i}")]),
            )
        })
        .collect()
}

/// Run one full round plus its reset and return every event emitted.
fn run_round(seed: u64) -> (GameEngine, Vec<EngineEvent>) {
    let mut engine = GameEngine::seeded("lifecycle", GameConfig::default(), seed);
    let mut queue = roster();
    let mut source = || queue.pop_front();

    let mut events = Vec::new();
    let mut dead = BTreeSet::new();

    for _ in 0..TICK_LIMIT {
        engine.tick_logic(&mut source);
        for _ in 0..MOVEMENT_PER_LOGIC {
            engine.tick_movement();
        }

        let round = engine.round();
        assert!(round.agents.len() <= engine.config().max_players);
        assert!(round.live_impostors() <= engine.config().impostor_count);
        for agent in round.agents.values() {
            if dead.contains(&agent.id) {
                assert!(!agent.alive, "{} came back to life", agent.id);
            }
            if !agent.alive {
                dead.insert(agent.id.clone());
            }
        }
        if round.phase == Phase::Lobby {
            dead.clear();
        }
        if let Some(active) = round.sabotage.active() {
            assert!(round.sabotage.triggered());
            assert!(active.timer <= active.def.duration_secs);
        }

        let drained = engine.drain_events();
        let reset = drained
            .iter()
            .any(|e| matches!(e, EngineEvent::RoundReset { .. }));
        events.extend(drained);
        if reset {
            return (engine, events);
        }
    }
    panic!("round did not finish within {TICK_LIMIT} logic ticks");
}

#[test]
fn seeded_round_runs_to_completion() {
    let (engine, events) = run_round(2024);

    let joined = events
        .iter()
        .filter(|e| matches!(e, EngineEvent::AgentJoined { .. }))
        .count();
    assert_eq!(joined, 10);

    let phases: Vec<Phase> = events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::PhaseChanged { phase, .. } => Some(*phase),
            _ => None,
        })
        .collect();
    assert_eq!(phases.first(), Some(&Phase::Action));
    assert_eq!(phases.last(), Some(&Phase::Lobby));
    assert!(phases.contains(&Phase::Ended));

    let ended: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::RoundEnded { round, outcome } => Some((*round, *outcome)),
            _ => None,
        })
        .collect();
    assert_eq!(ended.len(), 1);
    let (round, outcome) = ended[0];
    assert_eq!(round, 1);
    match outcome.reason {
        WinReason::Sabotage | WinReason::Domination { .. } => {
            assert_eq!(outcome.winner, Side::Impostors)
        }
        WinReason::Elimination | WinReason::Tasks | WinReason::Survival => {
            assert_eq!(outcome.winner, Side::Crewmates)
        }
    }

    assert_eq!(engine.round().number, 2);
    assert_eq!(engine.phase(), Phase::Lobby);
    assert!(engine.round().agents.is_empty());
}

#[test]
fn completed_tasks_never_regress() {
    let mut engine = GameEngine::seeded("tasks", GameConfig::default(), 77);
    let mut queue = roster();
    let mut source = || queue.pop_front();

    let mut last: Option<Vec<(bool, u32)>> = None;
    for _ in 0..TICK_LIMIT {
        engine.tick_logic(&mut source);
        engine.tick_movement();
        if engine.phase() == Phase::Ended {
            break;
        }

        let round = engine.round();
        let slots: Vec<(bool, u32)> = round
            .tasks
            .assignees()
            .flat_map(|id| round.tasks.tasks_for(id))
            .map(|slot| (slot.completed, slot.ticks_remaining))
            .collect();
        if let Some(previous) = &last
            && previous.len() == slots.len()
        {
            for ((was_done, was_left), (done, left)) in previous.iter().zip(&slots) {
                assert!(left <= was_left);
                if *was_done {
                    assert!(*done);
                    assert_eq!(left, was_left);
                }
            }
        }
        last = Some(slots);
    }
}

#[test]
fn same_seed_same_story() {
    let (_, first) = run_round(9);
    let (_, second) = run_round(9);
    assert_eq!(first, second);
}

#[test]
fn snapshot_carries_profile_metadata() {
    let mut engine = GameEngine::seeded("meta", GameConfig::default(), 3);
    let mut queue = roster();
    engine.tick_logic(&mut || queue.pop_front());

    let snapshot = engine.snapshot();
    let agent = snapshot.agent("agent-00").expect("first candidate spawned");
    assert_eq!(agent.name, "Agent 0");
    assert_eq!(agent.metadata.karma, 0);
    assert_eq!(agent.metadata.color.as_deref(), Some("#0000ff"));
    assert_eq!(
        agent.metadata.posts,
        ["first post by 0", "second post by 0"]
    );
    assert!(agent.alive);
    assert_eq!(snapshot.phase, Phase::Lobby);
}
