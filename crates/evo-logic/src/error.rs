//! Engine error taxonomy

use thiserror::Error;

use crate::player::PlayerId;

/// Everything that can fail inside the simulation engine.
///
/// The configuration variants are rejected at the runner/driver boundary
/// before any match is played. The remaining variants are contract
/// violations that abort a run rather than let it produce a corrupt
/// report; none of them is retryable.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EngineError {
    /// Matches must play at least one iteration.
    #[error("per-match iteration count must be at least 1")]
    InvalidIterations,

    /// Pairing needs at least one player.
    #[error("player roster is empty")]
    EmptyRoster,

    /// Every player in a roster must carry a distinct id.
    #[error("duplicate player id {0}")]
    DuplicatePlayer(PlayerId),

    /// Defection probabilities live in [0, 1].
    #[error("defection probability {0} is outside [0, 1]")]
    InvalidProbability(f64),

    /// A payoff lookup for a player that did not take part in the match.
    #[error("player {0} did not take part in this match")]
    ForeignPlayer(PlayerId),

    /// A recorded rival is missing from the standings snapshot.
    #[error("player {player} faced rival {rival} which is missing from the roster")]
    MissingRival { player: PlayerId, rival: PlayerId },

    /// The simulation thread died without producing a result.
    #[error("simulation thread panicked")]
    WorkerFailed,
}
