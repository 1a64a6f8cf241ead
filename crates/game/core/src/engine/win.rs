//! Win-condition evaluation.
//!
//! Sabotage expiry is the highest-priority win but is decided inside the
//! sabotage step itself, so it never reaches this function.
use crate::state::{Phase, Round, WinReason};

/// Evaluate the remaining win rules in priority order:
/// domination, elimination, then tasks (ACTION only).
pub fn evaluate(round: &Round) -> Option<WinReason> {
    if round.phase == Phase::Ended {
        return None;
    }

    let impostors = round.live_impostors();
    let crewmates = round.live_crewmates();

    if impostors >= crewmates {
        return Some(WinReason::Domination {
            impostors,
            crewmates,
        });
    }
    if impostors == 0 {
        return Some(WinReason::Elimination);
    }
    if round.phase == Phase::Action && round.tasks.all_completed() {
        return Some(WinReason::Tasks);
    }
    None
}
