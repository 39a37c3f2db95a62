use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use crowdpick::config::PickerConfig;
use crowdpick::runner::{self, Pacing};
use crowdpick::{Participant, WheelOutcome};
use crowdpick_core::roster::parse_names;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Comma separated participant names
    #[arg(long)]
    participants: Option<String>,

    /// RON file with a list of participants
    #[arg(long, conflicts_with = "participants")]
    roster: Option<PathBuf>,

    /// Configuration file (default: crowdpick.ron if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Session RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of races (or wheel spins) to run
    #[arg(long)]
    races: Option<u32>,

    /// Simulated frames per second
    #[arg(long)]
    fps: Option<f32>,

    /// Pace frames against the wall clock instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Use the spinning wheel instead of the race
    #[arg(long)]
    wheel: bool,

    /// Resolve N races on a fixed roster and print how often each name was picked
    #[arg(long, conflicts_with = "wheel")]
    tally: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut config = PickerConfig::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.runner.seed = seed;
    }
    if let Some(races) = args.races {
        config.runner.races = races;
    }
    if let Some(fps) = args.fps {
        config.runner.fps = fps;
    }
    config.validate()?;

    let participants = participants(&args)?;
    log::info!(
        "Starting crowdpick with {} participants (seed {})",
        participants.len(),
        config.runner.seed
    );

    if let Some(races) = args.tally {
        let counts = runner::tally(&config, participants, races)?;
        for (name, count) in counts {
            let share = 100.0 * f64::from(count) / races.max(1) as f64;
            println!("{:<24} {:>8} {:>6.2}%", name, count, share);
        }
        return Ok(());
    }

    if args.wheel {
        for (spin, outcome) in runner::run_wheel(&config, participants)?.iter().enumerate() {
            match outcome {
                WheelOutcome::Winner { participant, .. } => {
                    println!("Spin {}: {}", spin + 1, participant.display_name())
                }
                WheelOutcome::Tie { first, second } => println!(
                    "Spin {}: tie between {} and {}",
                    spin + 1,
                    first.display_name(),
                    second.display_name()
                ),
            }
        }
        return Ok(());
    }

    let pacing = if args.realtime {
        Pacing::Realtime
    } else {
        Pacing::Fixed
    };
    for report in runner::run_races(&config, participants, pacing)? {
        println!(
            "Race {}: {} ({} frames, {} left)",
            report.race,
            report.chosen.display_name(),
            report.frames,
            report.remaining
        );
    }
    Ok(())
}

fn participants(args: &Args) -> Result<Vec<Participant>> {
    let participants = match (&args.roster, &args.participants) {
        (Some(path), _) => runner::load_roster(path)?,
        (None, Some(list)) => parse_names(list),
        (None, None) => bail!("No participants: pass --participants a,b,c or --roster file.ron"),
    };
    if participants.is_empty() {
        bail!("Participant list is empty");
    }
    Ok(participants)
}
