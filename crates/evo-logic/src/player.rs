//! Players and the strategy-adoption (evolution) step

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::game::MatchOutcome;
use crate::random::SeededRng;
use crate::strategy::{Move, Strategy};

/// Stable integer identity of a player, distinct from its strategy.
///
/// All identity-keyed bookkeeping (rival sets, standings, payoff lookups)
/// keys on this id, never on reference identity.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One entry of a standings snapshot: a player's cumulative payoff and
/// strategy as they stood before any player of the generation evolved.
#[derive(Clone, Copy, Debug)]
pub struct Standing {
    pub payoff: f64,
    pub strategy: Strategy,
}

/// An agent: a current strategy, a lifetime payoff accumulator, and the
/// set of distinct rivals faced so far.
#[derive(Clone, Debug)]
pub struct Player {
    id: PlayerId,
    strategy: Strategy,
    total_payoff: f64,
    rivals: BTreeSet<PlayerId>,
}

impl Player {
    pub fn new(id: PlayerId, strategy: Strategy) -> Self {
        Self {
            id,
            strategy,
            total_payoff: 0.0,
            rivals: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Current strategy. Replaced wholesale by [`Player::evolve`].
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Cumulative mean-payoff total across all matches of the run.
    pub fn total_payoff(&self) -> f64 {
        self.total_payoff
    }

    /// Distinct rivals faced so far.
    pub fn rivals(&self) -> &BTreeSet<PlayerId> {
        &self.rivals
    }

    /// Clear payoff and rival bookkeeping. Runs once at simulation start.
    pub fn reset(&mut self) {
        self.total_payoff = 0.0;
        self.rivals.clear();
    }

    /// Produce the next move by delegating to the current strategy, given
    /// the opponent's last move in the running match (or none yet).
    pub fn decide(&self, opponent_last: Option<Move>, rng: &mut SeededRng) -> Move {
        self.strategy.decide(opponent_last, rng)
    }

    /// Record a finished match: accumulate own mean payoff and remember
    /// the rival. Set semantics — playing the same rival again across
    /// rounds inserts nothing new.
    pub fn record(&mut self, outcome: &MatchOutcome) -> Result<(), EngineError> {
        let mean = outcome
            .mean_for(self.id)
            .ok_or(EngineError::ForeignPlayer(self.id))?;
        let rival = outcome
            .opponent_of(self.id)
            .ok_or(EngineError::ForeignPlayer(self.id))?;

        self.total_payoff += mean;
        self.rivals.insert(rival);
        Ok(())
    }

    /// Adopt the best-performing strategy among self and every distinct
    /// rival faced.
    ///
    /// `standings` is the snapshot taken once per generation before anyone
    /// evolves, so iteration order over the roster cannot affect results.
    /// The candidate pool holds every strategy tied at the top payoff —
    /// the own entry always qualifies, and duplicates are kept when
    /// distinct rivals share one strategy — and the adopted strategy is a
    /// uniform pick from that pool.
    pub fn evolve(
        &mut self,
        standings: &BTreeMap<PlayerId, Standing>,
        rng: &mut SeededRng,
    ) -> Result<(), EngineError> {
        let own = standings.get(&self.id).ok_or(EngineError::MissingRival {
            player: self.id,
            rival: self.id,
        })?;

        let mut top_payoff = own.payoff;
        let mut pool = vec![own.strategy];

        for &rival in &self.rivals {
            let standing = standings.get(&rival).ok_or(EngineError::MissingRival {
                player: self.id,
                rival,
            })?;

            if standing.payoff > top_payoff {
                top_payoff = standing.payoff;
                pool = vec![standing.strategy];
            } else if standing.payoff == top_payoff {
                pool.push(standing.strategy);
            }
        }

        if let Some(&adopted) = rng.pick(&pool) {
            self.strategy = adopted;
        }
        Ok(())
    }
}
