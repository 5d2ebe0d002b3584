//! Merge-maximizing expectimax search for 2048.
//!
//! Decision nodes take the best of the legal moves, chance nodes average
//! over every cell a new 2 could spawn in. A move is worth its merge score
//! plus the expected value of what follows; at the search horizon a small
//! adjacency heuristic breaks ties instead.
//!
//! Notes
//! - The engine's lookup and heuristic tables are initialized lazily; the
//!   constructors warm them for you.
//! - The search is deterministic and single-threaded. Each call carries its
//!   own root depth and node counter, so independent `Expectimax` values never
//!   share mutable state.
//!
//! Quick start
//! ```
//! use merge_2048::engine::Board;
//! use merge_2048::expectimax::Expectimax;
//!
//! let b = Board::from_exponents([[1, 1, 0, 0], [0; 4], [0; 4], [0; 4]]);
//! let mut ex = Expectimax::new();
//! let m = ex.choose_move(b, 2);
//! assert!(m.is_some());
//! assert_eq!(ex.best_move(Board::EMPTY), None);
//! ```

use serde::{Deserialize, Serialize};

use crate::engine::{self, Move, MIRRORED_MERGE_DAMPING};

mod depth;
mod heuristic;
mod search;

pub use depth::DepthSchedule;
pub use heuristic::grid_score;
pub use search::{Decision, Expectimax, GAME_OVER_SCORE};

/// Tunable knobs for the search. Defaults are the empirically tuned values.
///
/// - `heuristic_weight`: scale of the adjacency nudge at the search horizon.
/// - `mirrored_damping`: factor applied to Right/Down merge scores.
/// - `depth_cap`: optional hard cap on adaptive depth.
/// - `depth`: free-cell thresholds for adaptive depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub heuristic_weight: f64,
    pub mirrored_damping: f64,
    pub depth_cap: Option<u32>,
    pub depth: DepthSchedule,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            heuristic_weight: 0.005,
            mirrored_damping: MIRRORED_MERGE_DAMPING,
            depth_cap: None,
            depth: DepthSchedule::default(),
        }
    }
}

/// Per-direction score at the root.
///
/// `legal` is false when the move is a no-op for the current board; its
/// `score` is then meaningless and left at 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchEval {
    pub dir: Move,
    pub score: f64,
    pub legal: bool,
}

/// Basic search stats for a single evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub peak_nodes: u64,
}

/// Common helper for constructors to ensure tables are initialized.
fn warm_engine_and_heuristics() {
    // Safe to call multiple times.
    engine::new();
    heuristic::warm();
}
