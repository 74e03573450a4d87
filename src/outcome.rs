use serde::{Deserialize, Serialize};

use crate::dataset::MatchRecord;

pub const DRAW_SENTINEL: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Win, Outcome::Draw, Outcome::Loss];

    pub fn complement(self) -> Outcome {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Draw => Outcome::Draw,
            Outcome::Loss => Outcome::Win,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Draw => "Draw",
            Outcome::Loss => "Loss",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Outcome::Win => 0,
            Outcome::Draw => 1,
            Outcome::Loss => 2,
        }
    }
}

/// A winner naming neither the home side nor the draw sentinel counts as a
/// home loss; the away name is not consulted. `load_dataset` rejects rows
/// whose winner names a third team, so normally the fallthrough only sees
/// away wins.
pub fn home_outcome(record: &MatchRecord) -> Outcome {
    if record.winner == record.home {
        Outcome::Win
    } else if record.winner == DRAW_SENTINEL {
        Outcome::Draw
    } else {
        Outcome::Loss
    }
}

pub fn classify(record: &MatchRecord, team: &str) -> Option<Outcome> {
    if record.home == team {
        Some(home_outcome(record))
    } else if record.away == team {
        Some(home_outcome(record).complement())
    } else {
        None
    }
}
