use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use env_2048::config::SessionConfig;
use env_2048::game;
use env_2048::statistic::Statistic;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "env-2048", version, about = "2048 simulation with replayable episode statistics")]
struct Args {
    /// Number of episodes to collect, loaded ones included
    #[arg(long, default_value_t = 1000)]
    total: usize,

    /// Print a report every this many episodes (0 = once, at --total)
    #[arg(long, alias = "unit", default_value_t = 0)]
    block: usize,

    /// Resume from a statistic file (its total and block replace the flags)
    #[arg(long, value_name = "FILE")]
    load: Option<PathBuf>,

    /// Write the statistic to this file when done
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Print a report over the whole history at the end
    #[arg(long)]
    summary: bool,

    /// Seed for the tile spawner
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// End an episode once the player makes a tile of this exponent (11 = 2048)
    #[arg(long, value_name = "EXP")]
    win_tile: Option<u8>,

    /// Suppress the spinner status line
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let argv: Vec<String> = std::env::args().collect();
    println!("2048-Demo: {}", argv.join(" "));
    println!();

    let config = SessionConfig {
        total: args.total,
        block: args.block,
        seed: args.seed,
        win_tile: args.win_tile,
    };

    let mut stat = match &args.load {
        Some(path) => Statistic::load(path)
            .with_context(|| format!("failed to load statistic from {}", path.display()))?,
        None => config.statistic(),
    };
    info!(total = stat.total(), block = stat.block(), episodes = stat.len(), "session start");

    let mut player = config.player();
    let mut spawner = config.spawner();

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} | Episodes: {pos} | {msg}")?
                .tick_chars("⠁⠃⠇⠧⠷⠿⠻⠟⠯⠷⠧⠇⠃"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };

    let start = Instant::now();
    let mut actions: u64 = 0;
    while !stat.is_finished() {
        let report = game::play_episode(&mut stat, &mut player, &mut spawner)?;
        if let Some(report) = report {
            pb.suspend(|| print!("{report}"));
        }
        actions += stat.episodes().last().map_or(0, |ep| ep.len() as u64);
        let elapsed = start.elapsed().as_secs_f64().max(1e-6);
        pb.set_position(stat.len() as u64);
        pb.set_message(format!("actions/sec: {:.1}", actions as f64 / elapsed));
    }
    pb.finish_and_clear();

    if args.summary {
        print!("{}", stat.summary());
    }

    if let Some(path) = &args.save {
        stat.save(path)
            .with_context(|| format!("failed to save statistic to {}", path.display()))?;
    }

    Ok(())
}
