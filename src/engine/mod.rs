//! Engine module: split half-grid 2048 board, table-driven slides with merge
//! statistics, and the precomputed line tables behind them.
//!
//! - `Board` is the packed 4x4 state (two `u32` half-grids) with useful methods.
//! - `apply_move` returns the slid board plus merge count and merge score.
//! - Tables are built once per process on first use; `new()` forces that early.

mod ops;
pub mod state;
mod tables;

pub(crate) use ops::extract_col;
pub use ops::{apply_move, apply_move_damped, board_score, MoveOutcome, MIRRORED_MERGE_DAMPING};
pub use state::{Board, BoardError, Move, MAX_EXPONENT};
pub use tables::MERGE_SCORE_EXPONENT;

/// Initialize internal precomputed tables on first use.
/// Safe to call multiple times.
pub fn new() {
    tables::init();
}
