use std::collections::VecDeque;

use super::*;
use crate::command::PlayerCommand;
use crate::state::{SABOTAGE_POOL, Side, VoteTarget};

fn quiet() -> GameConfig {
    GameConfig::default()
        .with_phase_secs(1, 240, 15, 20)
        .with_kill_chances(0.0, 0.0)
        .with_sabotage(45, 0.0)
}

fn id(s: &str) -> AgentId {
    AgentId::from(s)
}

fn profile(i: usize) -> AgentProfile {
    AgentProfile::new(format!("p{i}"), format!("Player {i}"))
}

fn lobby(players: usize, config: GameConfig) -> GameEngine {
    let mut engine = GameEngine::seeded("test-game", config, 7);
    for i in 0..players {
        engine.join(profile(i)).unwrap();
    }
    engine
}

fn started(players: usize, config: GameConfig) -> GameEngine {
    let mut engine = lobby(players, config);
    engine.tick_logic(&mut NoCandidates);
    assert_eq!(engine.phase(), Phase::Action);
    engine.drain_events();
    engine
}

/// Force roles (`impostors` by id, everyone else crew) and reassign tasks to
/// match.
fn stage_roles(engine: &mut GameEngine, impostors: &[&str]) {
    let config = engine.config().clone();
    let round = engine.round_mut();
    for agent in round.agents.values_mut() {
        agent.role = if impostors.contains(&agent.id.as_str()) {
            Role::Impostor
        } else {
            Role::Crewmate
        };
        agent.kill_cooldown = 0;
    }
    let crew: Vec<AgentId> = round
        .agents
        .values()
        .filter(|a| a.role == Role::Crewmate)
        .map(|a| a.id.clone())
        .collect();
    round.tasks.assign(
        &mut PcgRng::new(99),
        &crew,
        config.tasks_per_crewmate,
        config.task_duration_ticks,
    );
}

fn place(engine: &mut GameEngine, who: &str, room: RoomId) {
    let round = engine.round_mut();
    let agent_id = id(who);
    round.map.set_position(&agent_id, room.center());
    let agent = round.agents.get_mut(&agent_id).unwrap();
    agent.room = room;
    agent.position = room.center();
}

fn mark_dead(engine: &mut GameEngine, who: &str) {
    engine.kill_agent(&id(who));
}

fn chat_events(events: &[EngineEvent]) -> Vec<(AgentId, String)> {
    events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::MeetingChat { sender, content } => Some((sender.clone(), content.clone())),
            _ => None,
        })
        .collect()
}

// ===== lobby =====

#[test]
fn game_starts_with_roles_and_tasks() {
    let mut engine = lobby(4, quiet());
    engine.tick_logic(&mut NoCandidates);

    assert_eq!(engine.phase(), Phase::Action);
    assert_eq!(engine.timer(), 240);
    let round = engine.round();
    let impostors = round.agents.values().filter(|a| a.is_impostor()).count();
    assert_eq!(impostors, 2);

    for agent in round.agents.values() {
        let slots = round.tasks.tasks_for(&agent.id);
        if agent.is_impostor() {
            assert!(slots.is_empty());
        } else {
            assert_eq!(slots.len(), 3);
            assert!(slots.iter().all(|s| s.ticks_remaining == 4 && !s.completed));
        }
    }
    assert!(round.wagering_locked);
    assert_eq!(round.sabotage.grace_ticks(), 45);

    let events = engine.drain_events();
    assert!(events.contains(&EngineEvent::PhaseChanged {
        round: 1,
        phase: Phase::Action
    }));
    assert!(events.contains(&EngineEvent::WageringLocked { round: 1 }));
}

#[test]
fn short_lobby_is_extended() {
    let mut engine = lobby(3, quiet());
    engine.tick_logic(&mut NoCandidates);
    assert_eq!(engine.phase(), Phase::Lobby);
    assert_eq!(engine.timer(), 10);
}

#[test]
fn join_guards() {
    let mut engine = lobby(10, GameConfig::default());
    assert_eq!(
        engine.join(profile(10)),
        Err(JoinError::RosterFull { capacity: 10 })
    );

    let mut engine = lobby(2, GameConfig::default());
    assert_eq!(engine.join(profile(1)), Err(JoinError::Duplicate(id("p1"))));

    let mut engine = started(4, quiet());
    assert_eq!(
        engine.join(profile(9)),
        Err(JoinError::WrongPhase {
            phase: Phase::Action
        })
    );
}

#[test]
fn lobby_spawns_one_candidate_per_interval() {
    let mut engine = GameEngine::seeded("spawn", GameConfig::default(), 1);
    let mut queue: VecDeque<AgentProfile> = (0..5).map(profile).collect();
    let mut source = || queue.pop_front();

    engine.tick_logic(&mut source);
    assert_eq!(engine.round().agents.len(), 1);
    for _ in 0..4 {
        engine.tick_logic(&mut source);
    }
    assert_eq!(engine.round().agents.len(), 1);
    engine.tick_logic(&mut source);
    assert_eq!(engine.round().agents.len(), 2);
}

// ===== kills =====

#[test]
fn kill_leaving_impostor_majority_is_domination() {
    let config = quiet().with_kill_chances(1.0, 0.0);
    let mut engine = started(4, config);
    stage_roles(&mut engine, &["p0", "p1"]);
    mark_dead(&mut engine, "p1");
    mark_dead(&mut engine, "p3");
    place(&mut engine, "p0", RoomId::Admin);
    place(&mut engine, "p2", RoomId::Admin);

    engine.tick_logic(&mut NoCandidates);

    assert!(!engine.agent(&id("p2")).unwrap().alive);
    assert!(engine.round().map.is_frozen(&id("p2")));
    let outcome = engine.outcome().expect("round should be over");
    assert_eq!(outcome.winner, Side::Impostors);
    assert_eq!(
        outcome.reason,
        WinReason::Domination {
            impostors: 1,
            crewmates: 0
        }
    );
    assert!(outcome.to_string().starts_with("Impostors Win (Domination"));
    assert_eq!(engine.phase(), Phase::Ended);
    assert_eq!(engine.timer(), 20);
}

#[test]
fn witnessed_kill_opens_meeting_and_saves_timer() {
    let config = quiet().with_kill_chances(1.0, 1.0);
    let mut engine = started(6, config);
    stage_roles(&mut engine, &["p0", "p1"]);
    place(&mut engine, "p0", RoomId::Admin);
    place(&mut engine, "p2", RoomId::Admin);
    // Keep the other impostor away from everyone.
    place(&mut engine, "p1", RoomId::Hallway);

    engine.tick_logic(&mut NoCandidates);

    assert_eq!(engine.phase(), Phase::Meeting);
    assert_eq!(engine.timer(), 15);
    let round = engine.round();
    assert_eq!(round.saved_action_timer, 239);
    assert_eq!(round.meeting.reporter, Some(id("p0")));
    assert_eq!(round.meeting.body_found, Some(id("p2")));
    assert!(round.ledger.is_active());
    assert_eq!(round.agents[&id("p0")].kill_cooldown, 25);
}

#[test]
fn kill_cooldown_counts_down() {
    let config = quiet().with_kill_chances(1.0, 0.0);
    let mut engine = started(6, config);
    stage_roles(&mut engine, &["p0", "p1"]);
    place(&mut engine, "p1", RoomId::Hallway);
    place(&mut engine, "p0", RoomId::Admin);
    engine.round_mut().agents.get_mut(&id("p0")).unwrap().kill_cooldown = 2;
    place(&mut engine, "p2", RoomId::Admin);

    engine.tick_logic(&mut NoCandidates);
    engine.tick_logic(&mut NoCandidates);
    assert!(engine.agent(&id("p2")).unwrap().alive);
    engine.tick_logic(&mut NoCandidates);
    assert!(!engine.agent(&id("p2")).unwrap().alive);
}

#[test]
fn controlled_impostor_does_not_auto_kill() {
    let config = quiet().with_kill_chances(1.0, 0.0);
    let mut engine = started(6, config);
    stage_roles(&mut engine, &["p0", "p1"]);
    place(&mut engine, "p1", RoomId::Hallway);
    place(&mut engine, "p0", RoomId::Admin);
    place(&mut engine, "p2", RoomId::Admin);
    assert!(engine.set_controlled(&id("p0"), true));

    for _ in 0..5 {
        engine.tick_logic(&mut NoCandidates);
    }
    assert!(engine.agent(&id("p2")).unwrap().alive);
}

// ===== sabotage =====

#[test]
fn sabotage_expiry_wins_before_any_other_check() {
    // Kills are certain, yet the sabotage verdict must land first.
    let config = quiet().with_kill_chances(1.0, 0.0);
    let mut engine = started(6, config);
    stage_roles(&mut engine, &["p0", "p1"]);
    for who in ["p0", "p1", "p2", "p3", "p4", "p5"] {
        place(&mut engine, who, RoomId::Admin);
    }
    let reactor = SABOTAGE_POOL[0];
    engine.round_mut().sabotage.activate(reactor, 1);

    engine.tick_logic(&mut NoCandidates);

    let outcome = engine.outcome().expect("sabotage should end the round");
    assert_eq!(outcome.reason, WinReason::Sabotage);
    assert_eq!(outcome.to_string(), "Impostors Win — Sabotage!");
    assert!(engine.round().agents.values().filter(|a| !a.is_impostor()).all(|a| a.alive));
    assert!(engine.snapshot().sabotage.is_none());
}

#[test]
fn crewmate_in_repair_room_fixes_sabotage() {
    let mut engine = started(6, quiet());
    stage_roles(&mut engine, &["p0", "p1"]);
    let reactor = SABOTAGE_POOL[0];
    place(&mut engine, "p2", reactor.room);
    engine.round_mut().sabotage.activate(reactor, 45);

    for _ in 0..8 {
        engine.tick_logic(&mut NoCandidates);
    }
    assert!(engine.round().sabotage.active().is_none());
    assert!(engine.round().sabotage.triggered());
    assert_eq!(engine.phase(), Phase::Action);
    assert!(
        engine
            .drain_events()
            .contains(&EngineEvent::SabotageRepaired {
                name: reactor.name.to_owned()
            })
    );
}

// ===== tasks =====

#[test]
fn finishing_the_last_task_wins_immediately() {
    let mut engine = started(6, quiet());
    stage_roles(&mut engine, &["p0", "p1"]);

    let round = engine.round_mut();
    let crew: Vec<AgentId> = round.tasks.assignees().cloned().collect();
    for who in &crew {
        for slot in round.tasks.tasks_for_mut(who).unwrap() {
            slot.completed = true;
            slot.ticks_remaining = 0;
        }
    }
    let last = &mut round.tasks.tasks_for_mut(&id("p2")).unwrap()[0];
    last.completed = false;
    last.ticks_remaining = 1;
    let room = last.task.room;
    place(&mut engine, "p2", room);

    engine.tick_logic(&mut NoCandidates);

    let outcome = engine.outcome().expect("tasks should end the round");
    assert_eq!(outcome.reason, WinReason::Tasks);
    assert_eq!(outcome.to_string(), "Crewmates Win — Tasks!");
    let tally = engine.snapshot().task_progress;
    assert_eq!(tally.completed, tally.total);
}

#[test]
fn dead_crewmates_do_not_progress_tasks() {
    let mut engine = started(6, quiet());
    stage_roles(&mut engine, &["p0", "p1"]);
    let room = engine.round().tasks.tasks_for(&id("p2"))[0].task.room;
    place(&mut engine, "p2", room);
    mark_dead(&mut engine, "p2");

    engine.tick_logic(&mut NoCandidates);
    assert_eq!(engine.round().tasks.tasks_for(&id("p2"))[0].ticks_remaining, 4);
}

#[test]
fn action_timeout_is_survival() {
    let config = quiet().with_phase_secs(1, 3, 15, 20);
    let mut engine = started(6, config);
    for _ in 0..3 {
        engine.tick_logic(&mut NoCandidates);
    }
    let outcome = engine.outcome().expect("timer should end the round");
    assert_eq!(outcome.reason, WinReason::Survival);
    assert_eq!(outcome.winner, Side::Crewmates);
    assert_eq!(
        engine.snapshot().winner.as_deref(),
        Some("Crewmates Win — Survived!")
    );
}

// ===== meetings =====

fn meeting_with_controlled_roster(timer: u32) -> GameEngine {
    let mut engine = started(6, quiet());
    stage_roles(&mut engine, &["p0", "p1"]);
    engine.round_mut().timer = timer;
    for i in 0..6 {
        engine.set_controlled(&id(&format!("p{i}")), true);
    }
    engine.open_meeting(id("p0"), None);
    engine.drain_events();
    engine
}

fn vote(engine: &mut GameEngine, voter: &str, target: &str) {
    engine
        .apply(
            &id(voter),
            PlayerCommand::Vote {
                target: VoteTarget::Agent(id(target)),
            },
        )
        .unwrap();
}

#[test]
fn plurality_is_ejected() {
    let mut engine = meeting_with_controlled_roster(200);
    vote(&mut engine, "p2", "p3");
    vote(&mut engine, "p4", "p3");
    vote(&mut engine, "p5", "p0");

    for _ in 0..15 {
        engine.tick_logic(&mut NoCandidates);
    }

    assert!(!engine.agent(&id("p3")).unwrap().alive);
    assert!(engine.round().map.is_frozen(&id("p3")));
    assert_eq!(engine.phase(), Phase::Action);
    assert!(
        engine
            .drain_events()
            .contains(&EngineEvent::AgentEjected { agent: id("p3") })
    );
}

#[test]
fn tie_ejects_nobody_and_restores_saved_timer() {
    let mut engine = meeting_with_controlled_roster(200);
    vote(&mut engine, "p2", "p3");
    vote(&mut engine, "p4", "p0");

    for _ in 0..15 {
        engine.tick_logic(&mut NoCandidates);
    }

    assert_eq!(engine.phase(), Phase::Action);
    assert_eq!(engine.timer(), 200);
    assert!(engine.round().agents.values().all(|a| a.alive));
    assert!(engine.drain_events().contains(&EngineEvent::NoEjection));
    assert!(!engine.round().ledger.is_active());
}

#[test]
fn ejecting_last_impostor_ends_round() {
    let mut engine = meeting_with_controlled_roster(200);
    mark_dead(&mut engine, "p1");
    vote(&mut engine, "p2", "p0");
    vote(&mut engine, "p3", "p0");

    for _ in 0..15 {
        engine.tick_logic(&mut NoCandidates);
    }

    let outcome = engine.outcome().expect("elimination should end the round");
    assert_eq!(outcome.reason, WinReason::Elimination);
    assert_eq!(outcome.to_string(), "Crewmates Win!");
    assert_eq!(engine.phase(), Phase::Ended);
}

#[test]
fn meeting_without_saved_time_restores_full_action() {
    let mut engine = meeting_with_controlled_roster(200);
    engine.round_mut().saved_action_timer = 0;
    for _ in 0..15 {
        engine.tick_logic(&mut NoCandidates);
    }
    assert_eq!(engine.phase(), Phase::Action);
    assert_eq!(engine.timer(), 240);
}

#[test]
fn auto_vote_fires_at_five_seconds() {
    let mut engine = started(6, quiet());
    stage_roles(&mut engine, &["p0", "p1"]);
    engine.set_controlled(&id("p5"), true);
    engine.open_meeting(id("p0"), None);

    for _ in 0..9 {
        engine.tick_logic(&mut NoCandidates);
    }
    assert!(engine.round().ledger.votes().is_empty());

    engine.tick_logic(&mut NoCandidates);
    assert_eq!(engine.timer(), 5);
    let round = engine.round();
    assert_eq!(round.ledger.votes().len(), 5);
    assert_eq!(round.meeting.votes.len(), 5);
    assert!(!round.ledger.has_voted(&id("p5")));
    for impostor in ["p0", "p1"] {
        match &round.ledger.votes()[&id(impostor)] {
            VoteTarget::Agent(target) => assert!(!round.agents[target].is_impostor()),
            VoteTarget::Skip => panic!("impostor skipped with crew alive"),
        }
    }
}

#[test]
fn discussion_opens_with_reporter_and_respects_cap() {
    let mut engine = started(6, quiet());
    stage_roles(&mut engine, &["p0", "p1"]);
    mark_dead(&mut engine, "p3");
    engine.open_meeting(id("p0"), Some(id("p3")));
    engine.drain_events();

    let mut lines = Vec::new();
    for _ in 0..14 {
        engine.tick_logic(&mut NoCandidates);
        lines.extend(chat_events(&engine.drain_events()));
    }

    let (first_sender, first_line) = lines.first().expect("someone should speak");
    assert_eq!(first_sender, &id("p0"));
    assert!(first_line.contains("Player 3"));
    assert!(lines.len() <= 7);
    assert!(lines.iter().skip(1).all(|(sender, _)| sender != &id("p0")));
    assert!(lines.iter().all(|(sender, _)| sender != &id("p3")));
    assert_eq!(engine.round().ledger.messages().len(), lines.len());
}

// ===== commands =====

#[test]
fn move_clamps_and_resolves_room() {
    let mut engine = lobby(4, GameConfig::default());
    engine
        .apply(&id("p0"), PlayerCommand::Move { x: 150.0, y: -5.0 })
        .unwrap();
    let agent = engine.agent(&id("p0")).unwrap();
    assert_eq!(agent.position, Position::new(100.0, 0.0));
    assert_eq!(agent.room, RoomId::Navigation);
    assert_eq!(engine.round().map.room(&id("p0")), RoomId::Navigation);
}

#[test]
fn commands_rejected_outside_their_phase() {
    let mut engine = lobby(4, GameConfig::default());
    assert_eq!(
        engine.apply(&id("p0"), PlayerCommand::Kill { target: id("p1") }),
        Err(CommandRejection::WrongPhase {
            command: "kill",
            phase: Phase::Lobby
        })
    );
    assert!(matches!(
        engine.apply(
            &id("p0"),
            PlayerCommand::Vote {
                target: VoteTarget::Skip
            }
        ),
        Err(CommandRejection::WrongPhase { .. })
    ));
    assert_eq!(
        engine.apply(&id("nobody"), PlayerCommand::Move { x: 1.0, y: 1.0 }),
        Err(CommandRejection::UnknownAgent(id("nobody")))
    );
}

#[test]
fn manual_kill_validation_and_effects() {
    let mut engine = started(6, quiet());
    stage_roles(&mut engine, &["p0", "p1"]);
    place(&mut engine, "p0", RoomId::Admin);
    place(&mut engine, "p2", RoomId::Admin);
    place(&mut engine, "p3", RoomId::Storage);
    place(&mut engine, "p1", RoomId::Admin);

    let kill = |target: &str| PlayerCommand::Kill { target: id(target) };
    assert_eq!(
        engine.apply(&id("p2"), kill("p0")),
        Err(CommandRejection::NotImpostor(id("p2")))
    );
    assert_eq!(
        engine.apply(&id("p0"), kill("p0")),
        Err(CommandRejection::SelfTarget)
    );
    assert_eq!(
        engine.apply(&id("p0"), kill("p1")),
        Err(CommandRejection::InvalidTarget(id("p1")))
    );
    assert_eq!(
        engine.apply(&id("p0"), kill("p3")),
        Err(CommandRejection::NotInRoom(id("p3")))
    );

    engine.apply(&id("p0"), kill("p2")).unwrap();
    assert!(!engine.agent(&id("p2")).unwrap().alive);
    assert!(engine.round().map.is_frozen(&id("p2")));
    assert_eq!(engine.phase(), Phase::Action);
    assert_eq!(
        engine.apply(&id("p0"), kill("p3")),
        Err(CommandRejection::OnCooldown { remaining: 25 })
    );
    assert_eq!(
        engine.apply(&id("p2"), PlayerCommand::Move { x: 1.0, y: 1.0 }),
        Err(CommandRejection::DeadActor(id("p2")))
    );
}

#[test]
fn manual_kill_checks_win() {
    let mut engine = started(4, quiet());
    stage_roles(&mut engine, &["p0", "p1"]);
    mark_dead(&mut engine, "p1");
    mark_dead(&mut engine, "p3");
    place(&mut engine, "p0", RoomId::Admin);
    place(&mut engine, "p2", RoomId::Admin);

    engine
        .apply(&id("p0"), PlayerCommand::Kill { target: id("p2") })
        .unwrap();
    assert_eq!(engine.phase(), Phase::Ended);
    assert_eq!(engine.outcome().map(|o| o.winner), Some(Side::Impostors));
}

#[test]
fn vote_validation() {
    let mut engine = meeting_with_controlled_roster(100);
    mark_dead(&mut engine, "p5");
    let ballot = |target: &str| PlayerCommand::Vote {
        target: VoteTarget::Agent(id(target)),
    };

    assert_eq!(
        engine.apply(&id("p2"), ballot("p2")),
        Err(CommandRejection::SelfTarget)
    );
    assert_eq!(
        engine.apply(&id("p2"), ballot("p5")),
        Err(CommandRejection::InvalidTarget(id("p5")))
    );
    engine
        .apply(
            &id("p2"),
            PlayerCommand::Vote {
                target: VoteTarget::Skip,
            },
        )
        .unwrap();
    assert_eq!(
        engine.apply(&id("p2"), ballot("p3")),
        Err(CommandRejection::AlreadyVoted(id("p2")))
    );
    assert_eq!(
        engine.round().meeting.votes.get(&id("p2")),
        Some(&VoteTarget::Skip)
    );
}

// ===== movement =====

#[test]
fn movement_only_during_action_and_dead_stay_put() {
    let mut engine = lobby(6, quiet());
    let before = engine.round().map.position(&id("p0"));
    for _ in 0..10 {
        engine.tick_movement();
    }
    assert_eq!(engine.round().map.position(&id("p0")), before);

    engine.tick_logic(&mut NoCandidates);
    assert_eq!(engine.phase(), Phase::Action);
    mark_dead(&mut engine, "p5");
    let before: Vec<Position> = engine.round().agents.values().map(|a| a.position).collect();
    for _ in 0..10 {
        engine.tick_movement();
    }

    let round = engine.round();
    assert_eq!(round.agents[&id("p5")].position, before[5]);
    let moved = round
        .agents
        .values()
        .zip(&before)
        .filter(|(a, _)| a.alive)
        .any(|(a, start)| a.position != *start);
    assert!(moved);
    for agent in round.agents.values().filter(|a| a.alive) {
        assert_eq!(agent.position, round.map.position(&agent.id));
        assert_eq!(agent.room, round.map.room(&agent.id));
    }
}

// ===== lifecycle & snapshot =====

#[test]
fn ended_round_resets_to_fresh_lobby() {
    let mut engine = started(4, quiet());
    engine.end_game(WinReason::Survival);
    engine.drain_events();

    for _ in 0..20 {
        engine.tick_logic(&mut NoCandidates);
    }

    assert_eq!(engine.phase(), Phase::Lobby);
    assert_eq!(engine.round().number, 2);
    assert_eq!(engine.timer(), 1);
    assert!(engine.round().agents.is_empty());
    assert!(engine.outcome().is_none());
    assert_eq!(engine.snapshot().task_progress.total, 0);
    let events = engine.drain_events();
    assert!(events.contains(&EngineEvent::RoundReset { round: 2 }));
}

#[test]
fn wagering_window_tracks_phase() {
    let engine = GameEngine::seeded("w", GameConfig::default(), 1);
    let lobby_window = engine.snapshot().wagering;
    assert!(lobby_window.open);
    assert_eq!(lobby_window.closes_in, 60);

    let mut engine = started(6, quiet());
    let action = engine.snapshot().wagering;
    assert!(!action.open);
    assert_eq!(action.opens_in, 240 + 20);

    engine.round_mut().timer = 200;
    engine.open_meeting(id("p0"), None);
    assert_eq!(engine.snapshot().wagering.opens_in, 15 + 200 + 20);

    engine.end_game(WinReason::Survival);
    assert_eq!(engine.snapshot().wagering.opens_in, 20);
}

#[test]
fn snapshot_reflects_round() {
    let mut engine = started(4, quiet());
    let reactor = SABOTAGE_POOL[0];
    engine.round_mut().sabotage.activate(reactor, 30);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.game_id, "test-game");
    assert_eq!(snapshot.round, 1);
    assert_eq!(snapshot.phase, Phase::Action);
    assert_eq!(snapshot.agents.len(), 4);
    assert_eq!(snapshot.task_progress.total, 6);
    assert!(snapshot.winner.is_none());
    let sabotage = snapshot.sabotage.as_ref().expect("sabotage active");
    assert_eq!(sabotage.name, "Reactor Meltdown");
    assert_eq!(sabotage.room, RoomId::EngineRoom);
    assert_eq!(sabotage.timer, 30);
    assert!(snapshot.agent("p0").is_some());
}
