use serde::{Deserialize, Serialize};

use crate::engine::Board;

/// Free-cell thresholds that pick the search depth.
///
/// Fuller boards have fewer spawn branches per chance node, so they can
/// afford a deeper search for roughly the same node count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthSchedule {
    /// At or below this many free cells the board counts as crowded.
    pub crowded_free_cells: u32,
    pub crowded_depth: u32,
    /// At or below this many free cells (and above the crowded limit) the board counts as busy.
    pub busy_free_cells: u32,
    pub busy_depth: u32,
    /// Depth for everything roomier than busy.
    pub open_depth: u32,
}

impl Default for DepthSchedule {
    fn default() -> Self {
        Self { crowded_free_cells: 3, crowded_depth: 5, busy_free_cells: 7, busy_depth: 4, open_depth: 3 }
    }
}

impl DepthSchedule {
    /// Depth for a board with `free_cells` empty cells.
    ///
    /// ```
    /// use merge_2048::expectimax::DepthSchedule;
    /// let s = DepthSchedule::default();
    /// assert_eq!(s.depth_for(2), 5);
    /// assert_eq!(s.depth_for(7), 4);
    /// assert_eq!(s.depth_for(14), 3);
    /// ```
    pub fn depth_for(&self, free_cells: u32) -> u32 {
        if free_cells <= self.crowded_free_cells {
            self.crowded_depth
        } else if free_cells <= self.busy_free_cells {
            self.busy_depth
        } else {
            self.open_depth
        }
    }

    /// Depth for `board`, optionally clamped to `cap`.
    pub fn depth_for_board(&self, board: Board, cap: Option<u32>) -> u32 {
        let depth = self.depth_for(board.free_cells());
        match cap {
            Some(cap) => depth.min(cap),
            None => depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive() {
        let s = DepthSchedule::default();
        assert_eq!(s.depth_for(0), 5);
        assert_eq!(s.depth_for(3), 5);
        assert_eq!(s.depth_for(4), 4);
        assert_eq!(s.depth_for(7), 4);
        assert_eq!(s.depth_for(8), 3);
        assert_eq!(s.depth_for(16), 3);
    }

    #[test]
    fn depth_never_shrinks_as_the_board_fills() {
        let s = DepthSchedule::default();
        for free in 1..=16 {
            assert!(s.depth_for(free - 1) >= s.depth_for(free));
        }
    }

    #[test]
    fn cap_clamps_board_depth() {
        let s = DepthSchedule::default();
        let crowded = Board::from_exponents([[1, 2, 3, 4], [5, 6, 7, 8], [1, 2, 3, 4], [5, 6, 0, 0]]);
        assert_eq!(s.depth_for_board(crowded, None), 5);
        assert_eq!(s.depth_for_board(crowded, Some(2)), 2);
        assert_eq!(s.depth_for_board(Board::EMPTY, Some(9)), 3);
    }
}
