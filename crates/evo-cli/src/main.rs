//! Headless simulation runner: build a roster from cohort flags, run the
//! engine on its background thread, stream progress, print the final
//! population report as JSON.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use evo_logic::{Player, PlayerId, SimEvent, Simulation, SimulationConfig, Strategy};

#[derive(Debug, Parser)]
#[command(
    name = "evo",
    about = "Evolutionary Iterated Prisoner's Dilemma simulator"
)]
struct Args {
    /// Cohort of identical players as C,D,I:COUNT — the defection
    /// probabilities after opponent cooperation, after opponent defection,
    /// and on the opening move, plus how many players to seed with them.
    /// Repeatable.
    #[arg(long = "cohort", value_name = "C,D,I:COUNT", required = true)]
    cohorts: Vec<String>,

    /// Generations to play
    #[arg(long, default_value_t = 10)]
    rounds: u32,

    /// Move exchanges per match
    #[arg(long, default_value_t = 5)]
    iterations: u32,

    /// Random seed; the same seed reproduces the run
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn parse_cohort(raw: &str) -> Result<(Strategy, u32)> {
    let (probabilities, count) = raw
        .rsplit_once(':')
        .with_context(|| format!("cohort `{raw}` is missing `:COUNT`"))?;
    let count: u32 = count
        .trim()
        .parse()
        .with_context(|| format!("cohort `{raw}` has a bad count"))?;
    if count == 0 {
        bail!("cohort `{raw}` has a zero count");
    }

    let fields: Vec<&str> = probabilities.split(',').collect();
    let &[c, d, i] = fields.as_slice() else {
        bail!("cohort `{raw}` needs exactly three probabilities");
    };
    let parse_p = |field: &str| -> Result<f64> {
        field
            .trim()
            .parse()
            .with_context(|| format!("cohort `{raw}` has a bad probability `{field}`"))
    };

    let strategy = Strategy::new(parse_p(c)?, parse_p(d)?, parse_p(i)?)?;
    Ok((strategy, count))
}

fn build_roster(cohorts: &[String]) -> Result<Vec<Player>> {
    let mut players = Vec::new();
    let mut next_id = 0u32;
    for raw in cohorts {
        let (strategy, count) = parse_cohort(raw)?;
        for _ in 0..count {
            players.push(Player::new(PlayerId(next_id), strategy));
            next_id += 1;
        }
    }
    Ok(players)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let roster = build_roster(&args.cohorts)?;
    let config = SimulationConfig {
        rounds: args.rounds,
        iterations_per_match: args.iterations,
        seed: args.seed,
    };
    let expected = config.expected_matches(roster.len());
    let checkpoint = (expected / 20).max(1);

    let started = Instant::now();
    let handle = Simulation::start(roster, config)?;
    let progress = handle.progress();

    for event in handle.events().iter() {
        match event {
            SimEvent::MatchPlayed => {
                let done = progress.get();
                if done % checkpoint == 0 {
                    log::info!(
                        "progress: {:>10} / {} matches ({:5.1}%) in {:.2?}",
                        done,
                        expected,
                        done as f64 / expected as f64 * 100.0,
                        started.elapsed(),
                    );
                }
            }
            SimEvent::Finished(report) => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            SimEvent::Aborted(error) => bail!("simulation aborted: {error}"),
        }
    }

    handle.join()?;
    Ok(())
}
