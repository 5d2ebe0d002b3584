//! Continuous play on top of the search.
//!
//! The live board belongs to a [`GameHost`]: the driver only reads a snapshot,
//! asks the search for a move, and hands that move back to the host. Stopping
//! is cooperative and takes effect between moves; a search in flight always
//! runs to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::engine::{Board, BoardError, Move};
use crate::expectimax::Expectimax;

/// The live game the driver plays on.
pub trait GameHost {
    /// Snapshot of every cell as `(x, y, value)`, `None` for empty cells.
    fn cells(&self) -> Vec<(usize, usize, Option<u32>)>;

    /// Apply `dir` to the live board. Returns false when nothing moved.
    fn apply(&mut self, dir: Move) -> bool;
}

#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    #[error("host board could not be encoded: {0}")]
    Board(#[from] BoardError),
    #[error("host rejected {0} although the search found it legal")]
    Rejected(Move),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { dir: Move, depth: u32 },
    GameOver,
}

/// What a call to [`AutoPlayer::run`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub moves: u64,
    pub game_over: bool,
    pub nodes: u64,
    pub peak_nodes: u64,
}

/// Plays a [`GameHost`] one searched move at a time.
pub struct AutoPlayer<H> {
    host: H,
    policy: Expectimax,
    fixed_depth: Option<u32>,
    moves: u64,
}

impl<H: GameHost> AutoPlayer<H> {
    pub fn new(host: H, policy: Expectimax) -> Self {
        Self { host, policy, fixed_depth: None, moves: 0 }
    }

    /// Search every move at `depth` instead of the adaptive schedule.
    pub fn with_fixed_depth(mut self, depth: Option<u32>) -> Self {
        self.fixed_depth = depth;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn policy(&self) -> &Expectimax {
        &self.policy
    }

    /// Moves applied so far.
    pub fn moves(&self) -> u64 {
        self.moves
    }

    /// Encode the host's board, search it and apply the chosen move.
    pub fn step(&mut self) -> Result<StepOutcome, DriverError> {
        let board = Board::try_from_cells(self.host.cells())?;
        let depth = self.fixed_depth.unwrap_or_else(|| self.policy.depth_for(board));
        let Some(dir) = self.policy.choose_move(board, depth) else {
            return Ok(StepOutcome::GameOver);
        };
        if !self.host.apply(dir) {
            return Err(DriverError::Rejected(dir));
        }
        self.moves += 1;
        debug!("move {}: {} at depth {}", self.moves, dir, depth);
        Ok(StepOutcome::Moved { dir, depth })
    }

    /// Step until the game ends, `stop` is raised or `max_moves` moves were
    /// made in this call, pausing at least `min_delay` between moves.
    pub fn run(
        &mut self,
        stop: &AtomicBool,
        min_delay: Duration,
        max_moves: Option<u64>,
    ) -> Result<RunSummary, DriverError> {
        let mut summary = RunSummary::default();
        while !stop.load(Ordering::Relaxed) {
            if max_moves.is_some_and(|max| summary.moves >= max) {
                break;
            }
            match self.step()? {
                StepOutcome::GameOver => {
                    summary.game_over = true;
                    info!("game over after {} moves", self.moves);
                    break;
                }
                StepOutcome::Moved { .. } => {
                    let stats = self.policy.last_stats();
                    summary.moves += 1;
                    summary.nodes = summary.nodes.saturating_add(stats.nodes);
                    summary.peak_nodes = summary.peak_nodes.max(stats.nodes);
                }
            }
            if !min_delay.is_zero() {
                thread::sleep(min_delay);
            }
        }
        Ok(summary)
    }
}

/// In-memory game: spawns a 2 (90%) or 4 (10%) after every move that changed
/// the board, drawing from the supplied RNG.
pub struct SimulatedGame<R> {
    board: Board,
    rng: R,
    moves: u64,
}

impl<R: Rng> SimulatedGame<R> {
    /// Start from an empty board with two random tiles.
    pub fn new(mut rng: R) -> Self {
        let board = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
        Self { board, rng, moves: 0 }
    }

    pub fn from_board(board: Board, rng: R) -> Self {
        Self { board, rng, moves: 0 }
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn score(&self) -> u64 {
        self.board.score()
    }

    pub fn highest_tile(&self) -> u32 {
        self.board.highest_tile()
    }
}

impl<R: Rng> GameHost for SimulatedGame<R> {
    fn cells(&self) -> Vec<(usize, usize, Option<u32>)> {
        self.board.cells().collect()
    }

    fn apply(&mut self, dir: Move) -> bool {
        let moved = self.board.shift(dir);
        if moved == self.board {
            return false;
        }
        self.board = moved.with_random_tile(&mut self.rng);
        self.moves += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    struct ScriptedHost {
        cells: Vec<(usize, usize, Option<u32>)>,
        accept: bool,
        applied: Vec<Move>,
    }

    impl GameHost for ScriptedHost {
        fn cells(&self) -> Vec<(usize, usize, Option<u32>)> {
            self.cells.clone()
        }

        fn apply(&mut self, dir: Move) -> bool {
            self.applied.push(dir);
            self.accept
        }
    }

    fn scripted(cells: Vec<(usize, usize, Option<u32>)>, accept: bool) -> ScriptedHost {
        ScriptedHost { cells, accept, applied: Vec::new() }
    }

    #[test]
    fn step_applies_the_searched_move() {
        let host = scripted(vec![(0, 0, Some(2)), (1, 0, Some(2))], true);
        let mut player = AutoPlayer::new(host, Expectimax::new()).with_fixed_depth(Some(1));
        assert_eq!(player.step().unwrap(), StepOutcome::Moved { dir: Move::Left, depth: 1 });
        assert_eq!(player.host().applied, vec![Move::Left]);
        assert_eq!(player.moves(), 1);
    }

    #[test]
    fn stuck_board_ends_the_game() {
        let cells = Board::from_exponents([[1, 2, 1, 2], [2, 1, 2, 1], [1, 2, 1, 2], [2, 1, 2, 1]])
            .cells()
            .collect();
        let mut player = AutoPlayer::new(scripted(cells, true), Expectimax::new());
        assert_eq!(player.step().unwrap(), StepOutcome::GameOver);
        let summary = player.run(&AtomicBool::new(false), Duration::ZERO, None).unwrap();
        assert!(summary.game_over);
        assert_eq!(summary.moves, 0);
        assert!(player.host().applied.is_empty());
    }

    #[test]
    fn host_errors_surface() {
        let mut player = AutoPlayer::new(scripted(vec![(0, 0, Some(3))], true), Expectimax::new());
        assert!(matches!(player.step(), Err(DriverError::Board(BoardError::InvalidTile { .. }))));

        let mut player = AutoPlayer::new(scripted(vec![(2, 2, Some(2))], false), Expectimax::new());
        assert!(matches!(player.step(), Err(DriverError::Rejected(_))));
    }

    #[test]
    fn raised_stop_flag_prevents_the_next_move() {
        let game = SimulatedGame::new(StdRng::seed_from_u64(3));
        let start = game.board();
        let mut player = AutoPlayer::new(game, Expectimax::new());
        let summary = player.run(&AtomicBool::new(true), Duration::ZERO, None).unwrap();
        assert_eq!(summary, RunSummary::default());
        assert_eq!(player.host().board(), start);
    }

    #[test]
    fn max_moves_bounds_a_run() {
        let game = SimulatedGame::new(StdRng::seed_from_u64(4));
        let mut player = AutoPlayer::new(game, Expectimax::new()).with_fixed_depth(Some(1));
        let summary = player.run(&AtomicBool::new(false), Duration::ZERO, Some(5)).unwrap();
        assert_eq!(summary.moves, 5);
        assert!(!summary.game_over);
        assert_eq!(player.host().moves(), 5);
        assert!(summary.peak_nodes > 0 && summary.nodes >= summary.peak_nodes);
    }

    #[test]
    fn simulated_game_ignores_no_op_moves() {
        let board = Board::from_exponents([[1, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut game = SimulatedGame::from_board(board, StdRng::seed_from_u64(8));
        assert!(!game.apply(Move::Up));
        assert!(!game.apply(Move::Left));
        assert_eq!(game.board(), board);
        assert!(game.apply(Move::Right));
        assert_eq!(game.board().free_cells(), 14);
        assert_eq!(game.moves(), 1);
    }

    #[test]
    fn shallow_game_plays_to_the_end() {
        let game = SimulatedGame::new(StdRng::seed_from_u64(2024));
        let mut player = AutoPlayer::new(game, Expectimax::new()).with_fixed_depth(Some(1));
        let summary = player.run(&AtomicBool::new(false), Duration::ZERO, Some(100_000)).unwrap();
        assert!(summary.game_over);
        let game = player.into_host();
        assert!(game.board().is_game_over());
        assert_eq!(game.moves(), summary.moves);
        assert!(game.highest_tile() >= 16);
    }
}
