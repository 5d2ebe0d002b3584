use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use merge_2048::config::Config;
use merge_2048::driver::{AutoPlayer, RunSummary, SimulatedGame, StepOutcome};
use merge_2048::engine as GameEngine;
use merge_2048::expectimax::Expectimax;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "merge-2048", version, about = "Play 2048 with a merge-maximizing expectimax search")]
struct Args {
    /// TOML config file (search weights, depth schedule, play settings)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed for the first game (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Number of independent games to play
    #[arg(short = 'n', long)]
    games: Option<usize>,
    /// Search at this fixed depth instead of the adaptive schedule
    #[arg(short, long)]
    depth: Option<u32>,
    /// Minimum pause between moves in a single game, in milliseconds
    #[arg(long = "delay-ms")]
    delay_ms: Option<u64>,
    /// Stop each game after this many moves
    #[arg(long = "max-moves")]
    max_moves: Option<u64>,
    /// Do not print boards
    #[arg(short, long)]
    quiet: bool,
}

struct GameReport {
    seed: u64,
    summary: RunSummary,
    score: u64,
    highest_tile: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => Config::from_toml(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(games) = args.games {
        cfg.play.games = games.max(1);
    }
    if args.seed.is_some() {
        cfg.play.seed = args.seed;
    }
    if args.depth.is_some() {
        cfg.play.fixed_depth = args.depth;
    }
    if let Some(delay) = args.delay_ms {
        cfg.play.delay_ms = delay;
    }
    if args.max_moves.is_some() {
        cfg.play.max_moves = args.max_moves;
    }

    GameEngine::new();
    let base_seed = cfg.play.seed.unwrap_or_else(rand::random);

    if cfg.play.games == 1 {
        play_single(&cfg, base_seed, args.quiet)
    } else {
        play_batch(&cfg, base_seed)
    }
}

fn play_single(cfg: &Config, seed: u64, quiet: bool) -> anyhow::Result<()> {
    let game = SimulatedGame::new(StdRng::seed_from_u64(seed));
    let policy = Expectimax::with_config(cfg.search.clone());
    let mut player = AutoPlayer::new(game, policy).with_fixed_depth(cfg.play.fixed_depth);
    let delay = Duration::from_millis(cfg.play.delay_ms);
    if !quiet {
        println!("{}", player.host().board());
    }

    let start = Instant::now();
    let mut total_states: u64 = 0;
    let mut peak_states: u64 = 0;
    while cfg.play.max_moves.map_or(true, |max| player.moves() < max) {
        match player.step()? {
            StepOutcome::GameOver => break,
            StepOutcome::Moved { dir, depth } => {
                let stats = player.policy().last_stats();
                total_states = total_states.saturating_add(stats.nodes);
                peak_states = peak_states.max(stats.nodes);
                if !quiet {
                    println!("{dir} (depth {depth})\n{}", player.host().board());
                }
            }
        }
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }

    let game = player.into_host();
    println!(
        "Seed: {}, Moves made: {}, Score: {}, Highest tile: {}, States considered: {}, Max states considered for a move: {}, Elapsed: {:.2?}",
        seed,
        game.moves(),
        game.score(),
        game.highest_tile(),
        total_states,
        peak_states,
        start.elapsed()
    );
    Ok(())
}

fn play_batch(cfg: &Config, base_seed: u64) -> anyhow::Result<()> {
    let games = cfg.play.games;
    info!("playing {} games from seed {}", games, base_seed);
    let pb = ProgressBar::new(games as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} games ({eta})")?
            .progress_chars("=>-"),
    );

    let stop = AtomicBool::new(false);
    let start = Instant::now();
    // Games run in parallel; each search stays single-threaded.
    let reports: Vec<GameReport> = (0..games as u64)
        .into_par_iter()
        .map(|i| -> anyhow::Result<GameReport> {
            let seed = base_seed.wrapping_add(i);
            let game = SimulatedGame::new(StdRng::seed_from_u64(seed));
            let policy = Expectimax::with_config(cfg.search.clone());
            let mut player = AutoPlayer::new(game, policy).with_fixed_depth(cfg.play.fixed_depth);
            let summary = player.run(&stop, Duration::ZERO, cfg.play.max_moves)?;
            let game = player.into_host();
            pb.inc(1);
            Ok(GameReport { seed, summary, score: game.score(), highest_tile: game.highest_tile() })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    pb.finish_and_clear();

    let mean_score = reports.iter().map(|r| r.score as f64).sum::<f64>() / reports.len() as f64;
    let total_moves: u64 = reports.iter().map(|r| r.summary.moves).sum();
    let peak_states = reports.iter().map(|r| r.summary.peak_nodes).max().unwrap_or(0);
    let mut tiles: Vec<u32> = reports.iter().map(|r| r.highest_tile).collect();
    tiles.sort_unstable();
    tiles.dedup();

    println!(
        "Games: {}, Moves: {}, Mean score: {:.1}, Max states for a move: {}, Elapsed: {:.2?}",
        games,
        total_moves,
        mean_score,
        peak_states,
        start.elapsed()
    );
    for tile in tiles.iter().rev() {
        let reached = reports.iter().filter(|r| r.highest_tile >= *tile).count();
        println!("  reached {:>6}: {:>5.1}%", tile, 100.0 * reached as f64 / games as f64);
    }
    if let Some(best) = reports.iter().max_by_key(|r| r.score) {
        println!("Best game: seed {}, score {}, highest tile {}", best.seed, best.score, best.highest_tile);
    }
    Ok(())
}
