//! Generation driver: pair, play, evolve, tally

use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::game::run_match;
use crate::player::{Player, Standing};
use crate::population::PopulationTracker;
use crate::random::SeededRng;

/// Play one full generation over the roster.
///
/// Shuffles the roster uniformly, partitions it into consecutive disjoint
/// pairs (an odd straggler sits the round out — that is a defined edge
/// case, not an error), and plays every pair's match. Only after all
/// matches finish does every player evolve, against a standings snapshot
/// taken at that point, so evolution sees the round's updated payoffs and
/// never interleaves with match play. The per-generation tally is then
/// appended to `tracker`.
///
/// `on_match` fires once after each completed match; the runner uses it as
/// its progress hook.
///
/// Returns the number of matches played: `floor(len / 2)`.
pub fn run_generation<F>(
    players: &mut [Player],
    iterations: u32,
    rng: &mut SeededRng,
    tracker: &mut PopulationTracker,
    mut on_match: F,
) -> Result<u32, EngineError>
where
    F: FnMut(),
{
    if players.is_empty() {
        return Err(EngineError::EmptyRoster);
    }

    rng.shuffle(players);

    let mut matches = 0u32;
    for pair in players.chunks_exact_mut(2) {
        let (left, right) = pair.split_at_mut(1);
        run_match(&mut left[0], &mut right[0], iterations, rng)?;
        matches += 1;
        on_match();
    }

    // Snapshot payoffs and strategies before anyone evolves: adoption then
    // cannot depend on the order players are visited in.
    let standings: BTreeMap<_, _> = players
        .iter()
        .map(|p| {
            (
                p.id(),
                Standing {
                    payoff: p.total_payoff(),
                    strategy: p.strategy(),
                },
            )
        })
        .collect();

    for player in players.iter_mut() {
        player.evolve(&standings, rng)?;
    }

    tracker.record(players);

    log::debug!(
        "generation done: {} matches over {} players",
        matches,
        players.len()
    );

    Ok(matches)
}
