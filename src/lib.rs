//! merge-2048: merge-maximizing move search for 2048
//!
//! This crate provides:
//! - A split half-grid `Board` (two `u32`s) with table-driven slides that
//!   report merge count and merge score (`engine` module)
//! - An expectimax search that maximizes expected merge score, with adaptive
//!   depth and an adjacency tie-breaker (`expectimax` module)
//! - A driver that plays any `GameHost` continuously (`driver` module)
//! - TOML configuration for the search and the driver (`config` module)
//!
//! Quick start:
//! ```
//! use merge_2048::engine::{self as GameEngine, Board, Move};
//!
//! // One-time table init (optional, tables are also built on first use)
//! GameEngine::new();
//!
//! // Encode a snapshot of the live board
//! let b = Board::try_from_cells([(0, 0, Some(2)), (1, 0, Some(2)), (3, 3, Some(8))]).unwrap();
//! let out = b.apply(Move::Left);
//! assert_eq!(out.merge_count, 1);
//! assert_eq!(out.board.tile_value(0, 0), 4);
//! ```
//!
//! Full loop (simplest possible)
//! ```
//! use merge_2048::driver::{AutoPlayer, SimulatedGame};
//! use merge_2048::expectimax::Expectimax;
//! use rand::{rngs::StdRng, SeedableRng};
//! use std::sync::atomic::AtomicBool;
//! use std::time::Duration;
//!
//! // 1) A game to play on and a search policy
//! let game = SimulatedGame::new(StdRng::seed_from_u64(123));
//! let mut player = AutoPlayer::new(game, Expectimax::new()).with_fixed_depth(Some(1));
//!
//! // 2) Play a few moves (keep doctests fast)
//! let summary = player.run(&AtomicBool::new(false), Duration::ZERO, Some(4)).unwrap();
//!
//! // 3) Inspect the result
//! assert_eq!(summary.moves, 4);
//! assert!(player.host().score() > 0 || player.host().highest_tile() >= 2);
//! ```
//!
pub mod config;
pub mod driver;
pub mod engine;
pub mod expectimax;
