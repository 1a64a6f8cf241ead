use std::fmt;

use strum::Display;

/// Team that won a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Crewmates,
    Impostors,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WinReason {
    /// A sabotage countdown reached zero.
    Sabotage,
    /// Live impostors caught up with live crewmates.
    Domination { impostors: usize, crewmates: usize },
    /// Every impostor is dead.
    Elimination,
    /// Every assigned task is complete.
    Tasks,
    /// The ACTION timer ran out.
    Survival,
}

/// Terminal result of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    pub winner: Side,
    pub reason: WinReason,
}

impl Outcome {
    pub fn new(reason: WinReason) -> Self {
        let winner = match reason {
            WinReason::Sabotage | WinReason::Domination { .. } => Side::Impostors,
            WinReason::Elimination | WinReason::Tasks | WinReason::Survival => Side::Crewmates,
        };
        Self { winner, reason }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            WinReason::Sabotage => f.write_str("Impostors Win — Sabotage!"),
            WinReason::Domination {
                impostors,
                crewmates,
            } => write!(f, "Impostors Win (Domination: {impostors}v{crewmates})"),
            WinReason::Elimination => f.write_str("Crewmates Win!"),
            WinReason::Tasks => f.write_str("Crewmates Win — Tasks!"),
            WinReason::Survival => f.write_str("Crewmates Win — Survived!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winner_follows_reason() {
        assert_eq!(Outcome::new(WinReason::Sabotage).winner, Side::Impostors);
        assert_eq!(Outcome::new(WinReason::Survival).winner, Side::Crewmates);
        let dom = Outcome::new(WinReason::Domination {
            impostors: 1,
            crewmates: 1,
        });
        assert_eq!(dom.winner, Side::Impostors);
        assert_eq!(dom.to_string(), "Impostors Win (Domination: 1v1)");
        assert_eq!(
            Outcome::new(WinReason::Sabotage).to_string(),
            "Impostors Win — Sabotage!"
        );
    }
}
