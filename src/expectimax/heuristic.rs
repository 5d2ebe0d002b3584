use std::sync::OnceLock;

use crate::engine::{self as GameEngine, Board};

static ADJACENCY_SCORES: OnceLock<Box<[u8]>> = OnceLock::new();

pub(crate) fn warm() {
    let _ = adjacency_scores();
}

fn adjacency_scores() -> &'static [u8] {
    ADJACENCY_SCORES
        .get_or_init(|| {
            let mut v = vec![0u8; 0x1_0000];
            for (i, slot) in v.iter_mut().enumerate() {
                *slot = calc_line_adjacency(i as u16);
            }
            v.into_boxed_slice()
        })
        .as_ref()
}

/// Mergeability of a board: one point for every horizontally or vertically
/// adjacent pair of cells whose exponents differ by exactly one.
///
/// ```
/// use merge_2048::engine::Board;
/// use merge_2048::expectimax::grid_score;
/// let b = Board::from_exponents([[2, 3, 3, 3], [3, 3, 3, 3], [3, 3, 3, 3], [3, 3, 3, 3]]);
/// assert_eq!(grid_score(b), 2);
/// ```
pub fn grid_score(board: Board) -> u32 {
    let scores = adjacency_scores();
    let rows = [board.upper, board.lower]
        .into_iter()
        .flat_map(|half| [half as u16, (half >> 16) as u16]);
    let cols = (0..4).map(|x| GameEngine::extract_col(board, x));
    rows.chain(cols).map(|line| u32::from(scores[line as usize])).sum()
}

/// Leaf fallback: a small depth-scaled nudge towards mergeable boards.
#[inline]
pub(crate) fn leaf_value(board: Board, weight: f64, root_depth: u32) -> f64 {
    weight * f64::from(grid_score(board)) * f64::from(root_depth)
}

fn calc_line_adjacency(line: u16) -> u8 {
    let cells = [0, 1, 2, 3].map(|i| (line >> (4 * i)) & 0xf);
    cells.windows(2).filter(|pair| pair[0].abs_diff(pair[1]) == 1).count() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_score_by_cells(board: Board) -> u32 {
        let cells = board.to_exponents();
        let mut score = 0;
        for y in 0..4 {
            for x in 0..4 {
                let v = cells[y][x];
                if x + 1 < 4 && v.abs_diff(cells[y][x + 1]) == 1 {
                    score += 1;
                }
                if y + 1 < 4 && v.abs_diff(cells[y + 1][x]) == 1 {
                    score += 1;
                }
            }
        }
        score
    }

    #[test]
    fn line_adjacency() {
        assert_eq!(calc_line_adjacency(0x0000), 0);
        assert_eq!(calc_line_adjacency(0x4321), 3);
        assert_eq!(calc_line_adjacency(0x3131), 0);
        assert_eq!(calc_line_adjacency(0x0010), 2);
    }

    #[test]
    fn empty_and_uniform_boards_score_zero() {
        assert_eq!(grid_score(Board::EMPTY), 0);
        assert_eq!(grid_score(Board::from_exponents([[4; 4]; 4])), 0);
    }

    #[test]
    fn table_score_matches_cell_scan() {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(2048);
        for _ in 0..500 {
            let b = Board::from_halves(rng.gen(), rng.gen());
            assert_eq!(grid_score(b), grid_score_by_cells(b), "{b:?}");
        }
    }

    #[test]
    fn staircase_scores_every_pair() {
        let b = Board::from_exponents([[1, 2, 3, 4], [2, 3, 4, 5], [3, 4, 5, 6], [4, 5, 6, 7]]);
        assert_eq!(grid_score(b), 24);
    }

    #[test]
    fn leaf_value_scales_with_depth() {
        let b = Board::from_exponents([[1, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let score = f64::from(grid_score(b));
        assert_eq!(leaf_value(b, 0.005, 0), 0.0);
        assert!((leaf_value(b, 0.005, 4) - 0.02 * score).abs() < 1e-12);
    }
}
