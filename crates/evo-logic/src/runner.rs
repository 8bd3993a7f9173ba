//! Background simulation runner and its progress contract

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::EngineError;
use crate::generation::run_generation;
use crate::player::Player;
use crate::population::{PopulationReport, PopulationTracker};
use crate::random::SeededRng;

// ── Configuration ────────────────────────────────────────────────────

/// Knobs of one simulation run.
#[derive(Clone, Copy, Debug)]
pub struct SimulationConfig {
    /// Generations to play. Zero is valid: the report then holds only the
    /// initial tally.
    pub rounds: u32,
    /// Move exchanges per match. Must be at least 1.
    pub iterations_per_match: u32,
    /// Seed for the run's random source; a fixed seed reproduces the run.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rounds: 10,
            iterations_per_match: 5,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Total `MatchPlayed` events a run over `population` players emits:
    /// `rounds * floor(population / 2)`.
    pub fn expected_matches(&self, population: usize) -> u64 {
        self.rounds as u64 * (population as u64 / 2)
    }
}

// ── Events & progress ────────────────────────────────────────────────

/// Notifications streamed from the simulation thread.
#[derive(Clone, Debug)]
pub enum SimEvent {
    /// One unit of work (a match) finished.
    MatchPlayed,
    /// The run is over; carries the final report. Fires exactly once,
    /// strictly after the last `MatchPlayed`.
    Finished(PopulationReport),
    /// A contract violation aborted the run; no report was produced.
    Aborted(EngineError),
}

/// Shared monotonically increasing match counter.
///
/// Cloneable; any number of observers may read it concurrently while the
/// simulation thread increments it.
#[derive(Clone, Debug, Default)]
pub struct ProgressCounter(Arc<AtomicU64>);

impl ProgressCounter {
    /// Matches completed so far.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}

// ── Runner ───────────────────────────────────────────────────────────

/// The simulation runner: validates input, takes ownership of the roster
/// for the run's duration, and drives all rounds on one background thread.
pub struct Simulation;

impl Simulation {
    /// Begin an asynchronous run. Returns immediately; every configuration
    /// error is rejected here, before any match is played.
    ///
    /// The roster moves into the runner, so no caller can mutate player
    /// state while the run is in flight. Payoffs and rival sets are reset
    /// before the first round.
    pub fn start(
        mut players: Vec<Player>,
        config: SimulationConfig,
    ) -> Result<SimulationHandle, EngineError> {
        if players.is_empty() {
            return Err(EngineError::EmptyRoster);
        }
        if config.iterations_per_match == 0 {
            return Err(EngineError::InvalidIterations);
        }
        let mut seen = BTreeSet::new();
        for player in &players {
            if !seen.insert(player.id()) {
                return Err(EngineError::DuplicatePlayer(player.id()));
            }
        }

        for player in players.iter_mut() {
            player.reset();
        }

        let (events_tx, events_rx) = mpsc::channel();
        let progress = ProgressCounter::default();
        let cancel = Arc::new(AtomicBool::new(false));

        let thread = {
            let progress = progress.clone();
            let cancel = Arc::clone(&cancel);
            thread::spawn(move || run_to_completion(players, config, events_tx, progress, cancel))
        };

        Ok(SimulationHandle {
            events: events_rx,
            progress,
            cancel,
            thread,
        })
    }
}

/// Handle to a running simulation.
pub struct SimulationHandle {
    events: Receiver<SimEvent>,
    progress: ProgressCounter,
    cancel: Arc<AtomicBool>,
    thread: JoinHandle<Result<PopulationReport, EngineError>>,
}

impl SimulationHandle {
    /// Event stream: one `MatchPlayed` per match, then one terminal event.
    pub fn events(&self) -> &Receiver<SimEvent> {
        &self.events
    }

    /// Read handle on the shared progress counter.
    pub fn progress(&self) -> ProgressCounter {
        self.progress.clone()
    }

    /// Ask the run to stop at the next round boundary. Every completed
    /// round stays fully recorded, so the report is never left short.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Block until the run ends and return the final report.
    pub fn join(self) -> Result<PopulationReport, EngineError> {
        self.thread.join().map_err(|_| EngineError::WorkerFailed)?
    }
}

/// Body of the simulation thread: every round, every match, sequentially.
/// The thread is the sole mutator of player and tracker state; the outside
/// world only sees the counter and the event stream.
fn run_to_completion(
    mut players: Vec<Player>,
    config: SimulationConfig,
    events: Sender<SimEvent>,
    progress: ProgressCounter,
    cancel: Arc<AtomicBool>,
) -> Result<PopulationReport, EngineError> {
    let mut rng = SeededRng::new(config.seed);
    let mut tracker = PopulationTracker::new();
    tracker.record(&players);

    log::info!(
        "simulation started: {} players, {} rounds, {} iterations per match",
        players.len(),
        config.rounds,
        config.iterations_per_match
    );

    for round in 0..config.rounds {
        if cancel.load(Ordering::Acquire) {
            log::info!("simulation cancelled after {} rounds", round);
            break;
        }

        let result = run_generation(
            &mut players,
            config.iterations_per_match,
            &mut rng,
            &mut tracker,
            || {
                progress.bump();
                let _ = events.send(SimEvent::MatchPlayed);
            },
        );

        if let Err(error) = result {
            log::error!("round {} aborted: {}", round, error);
            let _ = events.send(SimEvent::Aborted(error.clone()));
            return Err(error);
        }
    }

    let report = tracker.into_report();
    log::info!(
        "simulation finished: {} rounds completed, {} matches played",
        report.rounds_completed,
        progress.get()
    );
    let _ = events.send(SimEvent::Finished(report.clone()));
    Ok(report)
}
