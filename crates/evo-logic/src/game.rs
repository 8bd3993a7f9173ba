//! Match execution engine

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::payoff;
use crate::player::{Player, PlayerId};
use crate::random::SeededRng;
use crate::strategy::Move;

/// Result of a complete match.
///
/// Written once at the end of play and immutable thereafter; both
/// participants' `record` steps read their own mean payoff and discover
/// their opponent through it, then the outcome is discarded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    side_a: PlayerId,
    side_b: PlayerId,
    pub total_a: u32,
    pub total_b: u32,
    pub mean_a: f64,
    pub mean_b: f64,
    pub iterations: u32,
}

impl MatchOutcome {
    /// Mean payoff of the given player, if it took part in this match
    pub fn mean_for(&self, id: PlayerId) -> Option<f64> {
        if id == self.side_a {
            Some(self.mean_a)
        } else if id == self.side_b {
            Some(self.mean_b)
        } else {
            None
        }
    }

    /// The other participant, if the given player took part in this match
    pub fn opponent_of(&self, id: PlayerId) -> Option<PlayerId> {
        if id == self.side_a {
            Some(self.side_b)
        } else if id == self.side_b {
            Some(self.side_a)
        } else {
            None
        }
    }
}

/// Play a full match between two players.
///
/// Each iteration both sides decide simultaneously from the opponent's
/// move history alone — a decision in iteration k never sees the opposing
/// iteration-k move — then both moves are appended. Totals accumulate
/// through the payoff matrix and the means divide by the iteration count.
/// Both players' `record` steps run against the outcome before it is
/// returned.
///
/// # Arguments
/// * `a`, `b` - The two participants
/// * `iterations` - Move exchanges to play; must be at least 1
/// * `rng` - Random source driving both strategies
pub fn run_match(
    a: &mut Player,
    b: &mut Player,
    iterations: u32,
    rng: &mut SeededRng,
) -> Result<MatchOutcome, EngineError> {
    if iterations == 0 {
        return Err(EngineError::InvalidIterations);
    }

    let mut history_a: Vec<Move> = Vec::with_capacity(iterations as usize);
    let mut history_b: Vec<Move> = Vec::with_capacity(iterations as usize);
    let mut total_a = 0u32;
    let mut total_b = 0u32;

    for _ in 0..iterations {
        let move_a = a.decide(history_b.last().copied(), rng);
        let move_b = b.decide(history_a.last().copied(), rng);

        let (score_a, score_b) = payoff(move_a, move_b);
        total_a += score_a as u32;
        total_b += score_b as u32;

        history_a.push(move_a);
        history_b.push(move_b);
    }

    let outcome = MatchOutcome {
        side_a: a.id(),
        side_b: b.id(),
        total_a,
        total_b,
        mean_a: total_a as f64 / iterations as f64,
        mean_b: total_b as f64 / iterations as f64,
        iterations,
    };

    a.record(&outcome)?;
    b.record(&outcome)?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::Strategy;

    fn players(sa: Strategy, sb: Strategy) -> (Player, Player) {
        (Player::new(PlayerId(0), sa), Player::new(PlayerId(1), sb))
    }

    #[test]
    fn test_cooperator_vs_defector() {
        let mut rng = SeededRng::new(42);
        let (mut a, mut b) = players(Strategy::always_cooperate(), Strategy::always_defect());

        let outcome = run_match(&mut a, &mut b, 5, &mut rng).unwrap();

        assert_eq!(outcome.total_a, 0);
        assert_eq!(outcome.total_b, 25);
        assert_eq!(outcome.mean_a, 0.0);
        assert_eq!(outcome.mean_b, 5.0);
    }

    #[test]
    fn test_mutual_cooperation() {
        let mut rng = SeededRng::new(42);
        let (mut a, mut b) = players(Strategy::always_cooperate(), Strategy::always_cooperate());

        let outcome = run_match(&mut a, &mut b, 8, &mut rng).unwrap();

        assert_eq!(outcome.mean_a, 3.0);
        assert_eq!(outcome.mean_b, 3.0);
        assert_eq!(outcome.total_a, 24);
    }

    #[test]
    fn test_mutual_defection() {
        let mut rng = SeededRng::new(42);
        let (mut a, mut b) = players(Strategy::always_defect(), Strategy::always_defect());

        let outcome = run_match(&mut a, &mut b, 5, &mut rng).unwrap();

        assert_eq!(outcome.mean_a, 1.0);
        assert_eq!(outcome.mean_b, 1.0);
    }

    #[test]
    fn test_decisions_never_see_the_current_exchange() {
        // Tit-for-tat against always-defect: the mirror lags one exchange
        // behind, so round 0 is (C, D) and every later round is (D, D).
        let mut rng = SeededRng::new(42);
        let (mut a, mut b) = players(Strategy::tit_for_tat(), Strategy::always_defect());

        let outcome = run_match(&mut a, &mut b, 5, &mut rng).unwrap();

        assert_eq!(outcome.total_a, 4); // 0 + 1*4
        assert_eq!(outcome.total_b, 9); // 5 + 1*4
        assert_eq!(outcome.mean_a, 0.8);
        assert_eq!(outcome.mean_b, 1.8);
    }

    #[test]
    fn test_tit_for_tat_mirror_locks_cooperation() {
        let mut rng = SeededRng::new(42);
        let (mut a, mut b) = players(Strategy::tit_for_tat(), Strategy::tit_for_tat());

        let outcome = run_match(&mut a, &mut b, 20, &mut rng).unwrap();

        assert_eq!(outcome.mean_a, 3.0);
        assert_eq!(outcome.mean_b, 3.0);
    }

    #[test]
    fn test_deterministic_stubs_are_pure() {
        // Two matches with deterministic strategies yield identical payoff
        // maps regardless of rng draws consumed in between.
        let mut rng = SeededRng::new(42);
        let (mut a1, mut b1) = players(Strategy::always_cooperate(), Strategy::always_defect());
        let (mut a2, mut b2) = players(Strategy::always_cooperate(), Strategy::always_defect());

        let first = run_match(&mut a1, &mut b1, 7, &mut rng).unwrap();
        let second = run_match(&mut a2, &mut b2, 7, &mut rng).unwrap();

        assert_eq!(first.mean_a, second.mean_a);
        assert_eq!(first.mean_b, second.mean_b);
        assert_eq!(first.total_a, second.total_a);
        assert_eq!(first.total_b, second.total_b);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let mut rng = SeededRng::new(42);
        let (mut a, mut b) = players(Strategy::always_cooperate(), Strategy::always_cooperate());

        assert_eq!(
            run_match(&mut a, &mut b, 0, &mut rng),
            Err(EngineError::InvalidIterations)
        );
        // Rejected before any bookkeeping happened
        assert_eq!(a.total_payoff(), 0.0);
        assert!(a.rivals().is_empty());
    }

    #[test]
    fn test_payoff_lookup_by_id() {
        let mut rng = SeededRng::new(42);
        let (mut a, mut b) = players(Strategy::always_cooperate(), Strategy::always_defect());

        let outcome = run_match(&mut a, &mut b, 5, &mut rng).unwrap();

        assert_eq!(outcome.mean_for(PlayerId(0)), Some(0.0));
        assert_eq!(outcome.mean_for(PlayerId(1)), Some(5.0));
        assert_eq!(outcome.mean_for(PlayerId(7)), None);
        assert_eq!(outcome.opponent_of(PlayerId(0)), Some(PlayerId(1)));
        assert_eq!(outcome.opponent_of(PlayerId(1)), Some(PlayerId(0)));
        assert_eq!(outcome.opponent_of(PlayerId(7)), None);
    }

    #[test]
    fn test_both_record_steps_ran() {
        let mut rng = SeededRng::new(42);
        let (mut a, mut b) = players(Strategy::always_cooperate(), Strategy::always_defect());

        run_match(&mut a, &mut b, 5, &mut rng).unwrap();

        assert_eq!(a.total_payoff(), 0.0);
        assert_eq!(b.total_payoff(), 5.0);
        assert!(a.rivals().contains(&PlayerId(1)));
        assert!(b.rivals().contains(&PlayerId(0)));
    }
}
