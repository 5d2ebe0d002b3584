use crate::engine::{apply_move_damped, Board, Move, MoveOutcome};

use super::heuristic::leaf_value;
use super::{warm_engine_and_heuristics, BranchEval, SearchConfig, SearchStats};

/// Score of a decision node with no legal move: the game is over.
pub const GAME_OVER_SCORE: f64 = -1_000_000.0;

/// Outcome of a decision node: the best score and the move reaching it.
///
/// `direction` is `None` only when the board has no legal move, in which case
/// `score` is [`GAME_OVER_SCORE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub score: f64,
    pub direction: Option<Move>,
}

/// State that lives for exactly one top-level search.
struct SearchContext {
    root_depth: u32,
    nodes: u64,
}

/// Single-threaded merge-maximizing expectimax search.
///
/// Constructors warm engine/heuristic tables. Each search call is
/// independent; the instance only keeps its config and the stats of the
/// last call.
pub struct Expectimax {
    cfg: SearchConfig,
    stats: SearchStats,
}

impl Expectimax {
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(cfg: SearchConfig) -> Self {
        warm_engine_and_heuristics();
        Self { cfg, stats: SearchStats::default() }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.cfg
    }

    /// Pick a move searching `depth` decision plies ahead.
    ///
    /// Returns `None` when the board has no legal move.
    ///
    /// ```
    /// use merge_2048::engine::{Board, Move};
    /// use merge_2048::expectimax::Expectimax;
    /// let b = Board::from_exponents([[1, 1, 0, 0], [0; 4], [0; 4], [0; 4]]);
    /// let mut ex = Expectimax::new();
    /// assert_eq!(ex.choose_move(b, 1), Some(Move::Left));
    /// ```
    #[inline]
    pub fn choose_move(&mut self, board: Board, depth: u32) -> Option<Move> {
        self.evaluate(board, depth).direction
    }

    /// Pick a move at the depth the configured schedule gives for `board`.
    #[inline]
    pub fn best_move(&mut self, board: Board) -> Option<Move> {
        let depth = self.depth_for(board);
        self.choose_move(board, depth)
    }

    /// Search depth for `board` under the configured schedule and cap.
    #[inline]
    pub fn depth_for(&self, board: Board) -> u32 {
        self.cfg.depth.depth_for_board(board, self.cfg.depth_cap)
    }

    /// Run the root decision node and return its score and move.
    pub fn evaluate(&mut self, board: Board, depth: u32) -> Decision {
        let mut ctx = SearchContext { root_depth: depth, nodes: 0 };
        let decision = self.decision(&mut ctx, board, depth);
        self.record(&ctx);
        log::debug!(
            "depth {} free {} nodes {} score {:.4} -> {:?}",
            depth,
            board.free_cells(),
            ctx.nodes,
            decision.score,
            decision.direction
        );
        decision
    }

    /// Score every direction at the root.
    ///
    /// Returns a fixed array in search order `[Up, Right, Down, Left]` and marks
    /// no-op moves as `legal=false`.
    pub fn branch_evals(&mut self, board: Board, depth: u32) -> [BranchEval; 4] {
        let mut ctx = SearchContext { root_depth: depth, nodes: 0 };
        let out = Move::ALL.map(|dir| {
            let outcome = apply_move_damped(board, dir, self.cfg.mirrored_damping);
            if outcome.moved(board) {
                let score = self.move_score(&mut ctx, &outcome, depth);
                BranchEval { dir, score, legal: true }
            } else {
                BranchEval { dir, score: 0.0, legal: false }
            }
        });
        self.record(&ctx);
        out
    }

    /// Statistics collected from the last call to [`Self::evaluate`],
    /// [`Self::choose_move`], [`Self::best_move`] or [`Self::branch_evals`].
    #[inline]
    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// Reset accumulated stats to zero.
    #[inline]
    pub fn reset_stats(&mut self) {
        self.stats = SearchStats::default();
    }

    fn record(&mut self, ctx: &SearchContext) {
        self.stats.nodes = ctx.nodes;
        self.stats.peak_nodes = self.stats.peak_nodes.max(ctx.nodes);
    }

    fn decision(&self, ctx: &mut SearchContext, board: Board, remaining: u32) -> Decision {
        ctx.nodes += 1;
        let mut best = Decision { score: f64::NEG_INFINITY, direction: None };
        for dir in Move::ALL {
            let outcome = apply_move_damped(board, dir, self.cfg.mirrored_damping);
            if !outcome.moved(board) {
                continue;
            }
            let score = self.move_score(ctx, &outcome, remaining);
            // `>=`: among equal scores the later direction wins.
            if score >= best.score {
                best = Decision { score, direction: Some(dir) };
            }
        }
        if best.direction.is_none() {
            best.score = GAME_OVER_SCORE;
        }
        best
    }

    fn move_score(&self, ctx: &mut SearchContext, outcome: &MoveOutcome, remaining: u32) -> f64 {
        let future = match self.chance(ctx, outcome.board, remaining.saturating_sub(1)) {
            Some(avg) => avg,
            None => leaf_value(outcome.board, self.cfg.heuristic_weight, ctx.root_depth),
        };
        outcome.merge_score + future
    }

    /// Average decision score over every 2-spawn; `None` past the horizon.
    fn chance(&self, ctx: &mut SearchContext, board: Board, remaining: u32) -> Option<f64> {
        if remaining == 0 {
            return None;
        }
        ctx.nodes += 1;
        let free = board.free_cells();
        if free == 0 {
            return Some(0.0);
        }
        let total: f64 = board.spawns(1).map(|next| self.decision(ctx, next, remaining).score).sum();
        Some(total / f64::from(free))
    }
}

impl Default for Expectimax {
    fn default() -> Self {
        Self::new()
    }
}
