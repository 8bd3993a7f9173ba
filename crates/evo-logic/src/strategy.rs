//! Moves and reactive strategy definitions

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::random::SeededRng;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    Cooperate,
    Defect,
}

/// A reactive strategy: three independent defection probabilities, one per
/// observable situation (opponent cooperated last, opponent defected last,
/// no history yet).
///
/// Strategies are immutable values — players swap them wholesale, never
/// edit parameters in place. Two instances with equal parameters are the
/// same kind for population counting; [`Strategy::label`] derives the
/// counting key.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    after_cooperate: f64,
    after_defect: f64,
    opening: f64,
}

impl Strategy {
    /// Create a strategy from its three defection probabilities.
    ///
    /// Each must lie in [0, 1]; anything else (NaN included) is rejected.
    pub fn new(after_cooperate: f64, after_defect: f64, opening: f64) -> Result<Self, EngineError> {
        for p in [after_cooperate, after_defect, opening] {
            if !(0.0..=1.0).contains(&p) {
                return Err(EngineError::InvalidProbability(p));
            }
        }
        Ok(Self { after_cooperate, after_defect, opening })
    }

    /// Cooperate unconditionally.
    pub fn always_cooperate() -> Self {
        Self { after_cooperate: 0.0, after_defect: 0.0, opening: 0.0 }
    }

    /// Defect unconditionally.
    pub fn always_defect() -> Self {
        Self { after_cooperate: 1.0, after_defect: 1.0, opening: 1.0 }
    }

    /// Open with cooperation, then mirror the opponent's last move.
    pub fn tit_for_tat() -> Self {
        Self { after_cooperate: 0.0, after_defect: 1.0, opening: 0.0 }
    }

    /// Mirror the opponent's last move, but open with defection.
    pub fn suspicious_tit_for_tat() -> Self {
        Self { after_cooperate: 0.0, after_defect: 1.0, opening: 1.0 }
    }

    /// Uniformly random move every round.
    pub fn coin_flip() -> Self {
        Self { after_cooperate: 0.5, after_defect: 0.5, opening: 0.5 }
    }

    /// Decide the next move given the opponent's last move in this match,
    /// or `None` on the opening move.
    pub fn decide(&self, opponent_last: Option<Move>, rng: &mut SeededRng) -> Move {
        let p_defect = match opponent_last {
            None => self.opening,
            Some(Move::Cooperate) => self.after_cooperate,
            Some(Move::Defect) => self.after_defect,
        };

        if rng.next_f64() < p_defect {
            Move::Defect
        } else {
            Move::Cooperate
        }
    }

    /// Identity label shared by every instance with equal parameters.
    /// Population counts key on this.
    pub fn label(&self) -> String {
        format!(
            "reactive({}/{}/{})",
            self.after_cooperate, self.after_defect, self.opening
        )
    }
}
