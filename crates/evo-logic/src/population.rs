//! Per-strategy population bookkeeping across generations

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::player::Player;

/// Final artifact of a run, the one thing handed to downstream consumers:
/// per-strategy-label holder counts, one entry per recorded generation
/// (index 0 = initial population, before any round was played).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationReport {
    /// Rounds that actually completed. Every series below has exactly
    /// `rounds_completed + 1` entries.
    pub rounds_completed: u32,
    /// Strategy label -> holder count per generation.
    pub series: BTreeMap<String, Vec<u32>>,
}

/// Accumulates holder counts generation by generation.
///
/// Invariant: after `n` recordings every known label's series has length
/// exactly `n`. Labels whose holders died out keep receiving zeros, and a
/// label first seen late is backfilled with zeros for the generations
/// before it appeared.
#[derive(Clone, Debug, Default)]
pub struct PopulationTracker {
    series: BTreeMap<String, Vec<u32>>,
    recorded: u32,
}

impl PopulationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generations recorded so far, the initial tally included.
    pub fn recorded(&self) -> u32 {
        self.recorded
    }

    /// Tally the roster's current strategy holders and append one entry to
    /// every known series.
    pub fn record(&mut self, players: &[Player]) {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for player in players {
            *counts.entry(player.strategy().label()).or_insert(0) += 1;
        }

        for (label, count) in counts {
            let series = self.series.entry(label).or_default();
            series.resize(self.recorded as usize, 0);
            series.push(count);
        }

        // Labels with no current holder get a zero this generation
        for series in self.series.values_mut() {
            if series.len() == self.recorded as usize {
                series.push(0);
            }
        }

        self.recorded += 1;
    }

    /// Consume the tracker into the externally consumed report.
    pub fn into_report(self) -> PopulationReport {
        PopulationReport {
            rounds_completed: self.recorded.saturating_sub(1),
            series: self.series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerId;
    use crate::strategy::Strategy;
    use proptest::prelude::*;

    fn roster(strategies: &[Strategy]) -> Vec<Player> {
        strategies
            .iter()
            .enumerate()
            .map(|(i, &s)| Player::new(PlayerId(i as u32), s))
            .collect()
    }

    #[test]
    fn test_initial_tally() {
        let mut tracker = PopulationTracker::new();
        let players = roster(&[
            Strategy::always_cooperate(),
            Strategy::always_cooperate(),
            Strategy::always_defect(),
        ]);

        tracker.record(&players);

        assert_eq!(tracker.recorded(), 1);
        let report = tracker.into_report();
        assert_eq!(report.rounds_completed, 0);
        assert_eq!(
            report.series.get(&Strategy::always_cooperate().label()),
            Some(&vec![2])
        );
        assert_eq!(
            report.series.get(&Strategy::always_defect().label()),
            Some(&vec![1])
        );
    }

    #[test]
    fn test_extinct_label_keeps_trailing_zeros() {
        let mut tracker = PopulationTracker::new();
        tracker.record(&roster(&[
            Strategy::always_cooperate(),
            Strategy::always_defect(),
        ]));
        tracker.record(&roster(&[
            Strategy::always_defect(),
            Strategy::always_defect(),
        ]));
        tracker.record(&roster(&[
            Strategy::always_defect(),
            Strategy::always_defect(),
        ]));

        let report = tracker.into_report();
        assert_eq!(report.rounds_completed, 2);
        assert_eq!(
            report.series.get(&Strategy::always_cooperate().label()),
            Some(&vec![1, 0, 0])
        );
        assert_eq!(
            report.series.get(&Strategy::always_defect().label()),
            Some(&vec![1, 2, 2])
        );
    }

    #[test]
    fn test_late_label_backfilled_with_zeros() {
        let mut tracker = PopulationTracker::new();
        tracker.record(&roster(&[Strategy::always_cooperate()]));
        tracker.record(&roster(&[
            Strategy::always_cooperate(),
            Strategy::tit_for_tat(),
        ]));

        let report = tracker.into_report();
        assert_eq!(
            report.series.get(&Strategy::tit_for_tat().label()),
            Some(&vec![0, 1])
        );
    }

    #[test]
    fn test_empty_tracker_report() {
        let report = PopulationTracker::new().into_report();
        assert_eq!(report.rounds_completed, 0);
        assert!(report.series.is_empty());
    }

    proptest! {
        #[test]
        fn every_series_always_has_one_entry_per_recording(
            rosters in prop::collection::vec(prop::collection::vec(0u8..3, 1..6), 1..8)
        ) {
            let mut tracker = PopulationTracker::new();
            for kinds in &rosters {
                let strategies: Vec<Strategy> = kinds
                    .iter()
                    .map(|k| match k {
                        0 => Strategy::always_cooperate(),
                        1 => Strategy::always_defect(),
                        _ => Strategy::tit_for_tat(),
                    })
                    .collect();
                tracker.record(&roster(&strategies));
            }

            let n = rosters.len();
            prop_assert_eq!(tracker.recorded(), n as u32);
            let report = tracker.into_report();
            prop_assert_eq!(report.rounds_completed, n as u32 - 1);
            for series in report.series.values() {
                prop_assert_eq!(series.len(), n);
            }
        }
    }
}
