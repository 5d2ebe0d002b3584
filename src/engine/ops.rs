use super::state::{Board, Move};
use super::tables::{get_line_entry, stores, LineMerges};

/// Right and Down merge scores are scaled by this factor relative to Left and Up.
pub const MIRRORED_MERGE_DAMPING: f64 = 0.9;

/// Result of sliding a board in one direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    pub board: Board,
    pub merge_count: u32,
    pub merge_score: f64,
}

impl MoveOutcome {
    /// True when the slide changed `from`; a no-op move is never searched.
    #[inline]
    pub fn moved(&self, from: Board) -> bool {
        self.board != from
    }
}

/// Slide/merge `board` in `dir` with the default damping. No randomness.
#[inline]
pub fn apply_move(board: Board, dir: Move) -> MoveOutcome {
    apply_move_damped(board, dir, MIRRORED_MERGE_DAMPING)
}

/// Slide/merge `board` in `dir`, scaling Right/Down merge scores by `damping`.
pub fn apply_move_damped(board: Board, dir: Move, damping: f64) -> MoveOutcome {
    let s = stores();
    match dir {
        Move::Left => shift_rows(board, &s.to_left, &s.left_merges, 1.0),
        Move::Right => shift_rows(board, &s.to_right, &s.right_merges, damping),
        Move::Up => shift_cols(board, &s.to_top_upper, &s.to_top_lower, &s.left_merges, 1.0),
        Move::Down => shift_cols(board, &s.to_bottom_upper, &s.to_bottom_lower, &s.right_merges, damping),
    }
}

/// Compute the total score for a board.
pub fn board_score(board: Board) -> u64 {
    let table = &stores().score;
    [board.upper, board.lower]
        .into_iter()
        .flat_map(|half| [half as u16, (half >> 16) as u16])
        .map(|row| get_line_entry(table, row))
        .sum()
}

fn shift_rows(board: Board, table: &[u16], merges: &[LineMerges], weight: f64) -> MoveOutcome {
    let mut count = 0;
    let mut score = 0.0;
    let mut shift_half = |half: u32| -> u32 {
        let (lo, hi) = (half as u16, (half >> 16) as u16);
        for row in [lo, hi] {
            let m = get_line_entry(merges, row);
            count += m.count;
            score += m.score;
        }
        u32::from(get_line_entry(table, lo)) | (u32::from(get_line_entry(table, hi)) << 16)
    };
    let upper = shift_half(board.upper);
    let lower = shift_half(board.lower);
    MoveOutcome { board: Board { upper, lower }, merge_count: count, merge_score: score * weight }
}

fn shift_cols(
    board: Board,
    upper_table: &[u32],
    lower_table: &[u32],
    merges: &[LineMerges],
    weight: f64,
) -> MoveOutcome {
    let mut out = Board::EMPTY;
    let mut count = 0;
    let mut score = 0.0;
    for x in 0..4 {
        let col = extract_col(board, x);
        let m = get_line_entry(merges, col);
        count += m.count;
        score += m.score;
        out.upper |= get_line_entry(upper_table, col) << (4 * x);
        out.lower |= get_line_entry(lower_table, col) << (4 * x);
    }
    MoveOutcome { board: out, merge_count: count, merge_score: score * weight }
}

/// Gather column `x` into a line, physical row `y` in nibble `y`.
#[inline]
pub(crate) fn extract_col(board: Board, x: u32) -> u16 {
    let shift = 4 * x;
    let nib = |half: u32, row_shift: u32| (half >> (shift + row_shift)) & 0xf;
    (nib(board.upper, 0) | nib(board.upper, 16) << 4 | nib(board.lower, 0) << 8 | nib(board.lower, 16) << 12)
        as u16
}
