use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ops::{self, MoveOutcome};

/// Largest exponent a nibble can hold (tile value 32768).
pub const MAX_EXPONENT: u8 = 15;

/// A direction to move/merge tiles.
///
/// Declaration order is the search order: Up, Right, Down, Left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Up,
    Right,
    Down,
    Left,
}

impl Move {
    /// All directions in the fixed order the search iterates them.
    pub const ALL: [Move; 4] = [Move::Up, Move::Right, Move::Down, Move::Left];

    /// Position of this direction in [`Move::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "UP",
            Move::Right => "RIGHT",
            Move::Down => "DOWN",
            Move::Left => "LEFT",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("cell ({x}, {y}) is outside the 4x4 grid")]
    OutOfBounds { x: usize, y: usize },
    #[error("tile value {value} at ({x}, {y}) is not a power of two >= 2")]
    InvalidTile { x: usize, y: usize, value: u32 },
    #[error("tile value {value} at ({x}, {y}) does not fit in a 4-bit exponent")]
    TileTooLarge { x: usize, y: usize, value: u32 },
}

/// Packed 4x4 board split into two 32-bit half-grids.
///
/// `upper` holds rows 0 and 1, `lower` holds rows 2 and 3. Each cell is a
/// 4-bit exponent (0 = empty); cell (x, y) sits at bit offset
/// `(y % 2) * 16 + x * 4` of its half.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    pub(crate) upper: u32,
    pub(crate) lower: u32,
}

impl Board {
    /// A constant empty board.
    pub const EMPTY: Board = Board { upper: 0, lower: 0 };

    /// Construct a `Board` from its two raw half-grids.
    #[inline]
    pub fn from_halves(upper: u32, lower: u32) -> Self {
        Board { upper, lower }
    }

    /// The raw `(upper, lower)` half-grids.
    #[inline]
    pub fn halves(self) -> (u32, u32) {
        (self.upper, self.lower)
    }

    /// Build a board from exponents indexed `[y][x]`.
    ///
    /// ```
    /// use merge_2048::engine::Board;
    /// let b = Board::from_exponents([[1, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 11]]);
    /// assert_eq!(b.tile_value(0, 0), 2);
    /// assert_eq!(b.tile_value(3, 3), 2048);
    /// assert_eq!(b.free_cells(), 14);
    /// ```
    pub fn from_exponents(rows: [[u8; 4]; 4]) -> Self {
        let mut board = Board::EMPTY;
        for (y, row) in rows.iter().enumerate() {
            for (x, &exp) in row.iter().enumerate() {
                debug_assert!(exp <= MAX_EXPONENT);
                board = board.with_exponent(x, y, exp);
            }
        }
        board
    }

    /// Encode a snapshot given as `(x, y, value)` triples, `None` meaning empty.
    ///
    /// Cells that are not mentioned stay empty.
    ///
    /// ```
    /// use merge_2048::engine::Board;
    /// let b = Board::try_from_cells([(0, 0, Some(4)), (1, 0, None), (2, 3, Some(8))]).unwrap();
    /// assert_eq!(b.exponent(0, 0), 2);
    /// assert_eq!(b.exponent(2, 3), 3);
    /// assert!(Board::try_from_cells([(0, 0, Some(6))]).is_err());
    /// ```
    pub fn try_from_cells<I>(cells: I) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = (usize, usize, Option<u32>)>,
    {
        let mut board = Board::EMPTY;
        for (x, y, value) in cells {
            if x >= 4 || y >= 4 {
                return Err(BoardError::OutOfBounds { x, y });
            }
            let Some(value) = value else { continue };
            if value < 2 || !value.is_power_of_two() {
                return Err(BoardError::InvalidTile { x, y, value });
            }
            let exp = value.trailing_zeros();
            if exp > u32::from(MAX_EXPONENT) {
                return Err(BoardError::TileTooLarge { x, y, value });
            }
            board = board.with_exponent(x, y, exp as u8);
        }
        Ok(board)
    }

    /// Exponent stored at (x, y), 0 when empty.
    #[inline]
    pub fn exponent(self, x: usize, y: usize) -> u8 {
        let (half, shift) = self.slot(x, y);
        ((half >> shift) & 0xf) as u8
    }

    /// Tile value at (x, y), 0 when empty.
    #[inline]
    pub fn tile_value(self, x: usize, y: usize) -> u32 {
        match self.exponent(x, y) {
            0 => 0,
            exp => 1 << exp,
        }
    }

    /// Return a copy with the nibble at (x, y) replaced by `exp`.
    #[inline]
    pub fn with_exponent(self, x: usize, y: usize, exp: u8) -> Self {
        let shift = cell_shift(x, y);
        let mask = !(0xf_u32 << shift);
        let nibble = u32::from(exp & 0xf) << shift;
        if y < 2 {
            Board { upper: (self.upper & mask) | nibble, ..self }
        } else {
            Board { lower: (self.lower & mask) | nibble, ..self }
        }
    }

    /// Decode into exponents indexed `[y][x]`.
    pub fn to_exponents(self) -> [[u8; 4]; 4] {
        let mut rows = [[0u8; 4]; 4];
        for (y, row) in rows.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = self.exponent(x, y);
            }
        }
        rows
    }

    /// Iterate every cell as `(x, y, value)`, row-major, `None` when empty.
    pub fn cells(self) -> impl Iterator<Item = (usize, usize, Option<u32>)> {
        (0..16).map(move |idx| {
            let (x, y) = (idx % 4, idx / 4);
            let value = self.tile_value(x, y);
            (x, y, (value != 0).then_some(value))
        })
    }

    /// Count the empty cells across both halves.
    #[inline]
    pub fn free_cells(self) -> u32 {
        16 - count_non_empty(self.upper) - count_non_empty(self.lower)
    }

    /// Every board reachable by placing a tile of exponent `exp` on one empty cell.
    ///
    /// Empty cells are visited upper half first, lowest nibble first.
    pub fn spawns(self, exp: u8) -> impl Iterator<Item = Board> {
        let exp = u32::from(exp & 0xf);
        (0..16u32).filter_map(move |slot| {
            let shift = (slot % 8) * 4;
            if slot < 8 {
                ((self.upper >> shift) & 0xf == 0)
                    .then(|| Board { upper: self.upper | (exp << shift), ..self })
            } else {
                ((self.lower >> shift) & 0xf == 0)
                    .then(|| Board { lower: self.lower | (exp << shift), ..self })
            }
        })
    }

    /// Slide/merge in `dir`, returning the new board plus merge statistics.
    ///
    /// ```
    /// use merge_2048::engine::{Board, Move};
    /// let b = Board::from_exponents([[1, 1, 1, 1], [0; 4], [0; 4], [0; 4]]);
    /// let out = b.apply(Move::Left);
    /// assert_eq!(out.merge_count, 2);
    /// assert_eq!(out.board.to_exponents()[0], [2, 2, 0, 0]);
    /// ```
    #[inline]
    pub fn apply(self, dir: Move) -> MoveOutcome {
        ops::apply_move(self, dir)
    }

    /// Return the board resulting from sliding/merging tiles in `dir` (no random insert).
    #[inline]
    pub fn shift(self, dir: Move) -> Self {
        ops::apply_move(self, dir).board
    }

    /// Directions that change the board, in search order.
    pub fn legal_moves(self) -> impl Iterator<Item = Move> {
        Move::ALL.into_iter().filter(move |&dir| self.shift(dir) != self)
    }

    /// Return true if no legal moves remain.
    #[inline]
    pub fn is_game_over(self) -> bool {
        self.legal_moves().next().is_none()
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty slot, using the provided RNG.
    ///
    /// A full board is returned unchanged.
    ///
    /// ```
    /// use merge_2048::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.free_cells(), 14);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let free = self.free_cells();
        if free == 0 {
            return self;
        }
        let index = rng.gen_range(0..free) as usize;
        let exp = if rng.gen_range(0..10) < 9 { 1 } else { 2 };
        self.spawns(exp).nth(index).unwrap_or(self)
    }

    /// Highest tile value on the board (0 for an empty board).
    pub fn highest_tile(self) -> u32 {
        match (0..16).map(|idx| self.exponent(idx % 4, idx / 4)).max() {
            Some(0) | None => 0,
            Some(exp) => 1 << exp,
        }
    }

    /// Sum of all tile values.
    pub fn tile_sum(self) -> u64 {
        self.cells().filter_map(|(_, _, v)| v).map(u64::from).sum()
    }

    /// Conventional game score implied by the tiles on the board.
    #[inline]
    pub fn score(self) -> u64 {
        ops::board_score(self)
    }

    #[inline]
    fn slot(self, x: usize, y: usize) -> (u32, u32) {
        let half = if y < 2 { self.upper } else { self.lower };
        (half, cell_shift(x, y))
    }
}

#[inline]
fn cell_shift(x: usize, y: usize) -> u32 {
    debug_assert!(x < 4 && y < 4);
    ((y % 2) * 16 + x * 4) as u32
}

// Collapse each nibble onto its low bit, then count.
#[inline]
fn count_non_empty(half: u32) -> u32 {
    let mut h = half;
    h |= h >> 1;
    h |= h >> 2;
    (h & 0x1111_1111).count_ones()
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board(upper={:#010x}, lower={:#010x})", self.upper, self.lower)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..4 {
            let row: Vec<String> = (0..4).map(|x| format_val(self.tile_value(x, y))).collect();
            writeln!(f, "{}", row.join("|"))?;
            if y < 3 {
                writeln!(f, "-------------------------------")?;
            }
        }
        Ok(())
    }
}

fn format_val(val: u32) -> String {
    if val == 0 {
        " ".repeat(7)
    } else {
        format!("{val:^7}")
    }
}
