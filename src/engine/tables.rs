use std::sync::OnceLock;

use super::state::MAX_EXPONENT;

/// Merge scores reward each merge with `k^MERGE_SCORE_EXPONENT`, `k` being the
/// exponent of the two tiles before they merged.
pub const MERGE_SCORE_EXPONENT: f64 = 1.2;

const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

/// Merges produced by sliding one line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct LineMerges {
    pub(crate) count: u32,
    pub(crate) score: f64,
}

/// Precomputed lookup tables for all possible 4-cell lines (16-bit packed,
/// cell `i` in bits `4i..4i + 4`).
///
/// Layout:
/// - `to_left[row]` / `to_right[row]`: the row after sliding.
/// - `to_top_*[col]` / `to_bottom_*[col]`: the column after sliding, already
///   spread into half-grid position for column 0 (first cell at bit 0, second
///   at bit 16). Shift left by `4 * x` to place it in column `x`.
/// - `left_merges[line]` / `right_merges[line]`: merge count and score for the
///   line slid towards cell 0 (left, up) or towards cell 3 (right, down).
///
/// Access is via `stores()` which lazily initializes a single global `Stores`
/// on first use. `engine::new()` simply forces init early.
pub(crate) struct Stores {
    pub(crate) to_left: Box<[u16]>,
    pub(crate) to_right: Box<[u16]>,
    pub(crate) to_top_upper: Box<[u32]>,
    pub(crate) to_top_lower: Box<[u32]>,
    pub(crate) to_bottom_upper: Box<[u32]>,
    pub(crate) to_bottom_lower: Box<[u32]>,
    pub(crate) left_merges: Box<[LineMerges]>,
    pub(crate) right_merges: Box<[LineMerges]>,
    pub(crate) score: Box<[u64]>,
}

static STORES: OnceLock<Stores> = OnceLock::new();

/// Ensure lookup tables are initialized.
pub fn init() {
    let _ = stores();
}

#[inline(always)]
pub(crate) fn stores() -> &'static Stores {
    STORES.get_or_init(create_stores)
}

fn create_stores() -> Stores {
    // Allocate on the heap to keep stack frames small during init.
    let mut to_left = vec![0u16; LINE_TABLE_SIZE];
    let mut to_right = vec![0u16; LINE_TABLE_SIZE];
    let mut to_top_upper = vec![0u32; LINE_TABLE_SIZE];
    let mut to_top_lower = vec![0u32; LINE_TABLE_SIZE];
    let mut to_bottom_upper = vec![0u32; LINE_TABLE_SIZE];
    let mut to_bottom_lower = vec![0u32; LINE_TABLE_SIZE];
    let mut left_merges = vec![LineMerges::default(); LINE_TABLE_SIZE];
    let mut right_merges = vec![LineMerges::default(); LINE_TABLE_SIZE];
    let mut score = vec![0u64; LINE_TABLE_SIZE];

    for val in 0..LINE_TABLE_SIZE {
        let line = val as u16;
        let rev = reverse_line(line) as usize;
        let (slid, merges) = slide_left(unpack_line(line));
        let result = pack_line(slid);

        to_left[val] = result;
        left_merges[val] = merges;
        // Sliding right is sliding the mirrored line left.
        to_right[rev] = reverse_line(result);
        right_merges[rev] = merges;

        to_top_upper[val] = spread_pair(slid[0], slid[1]);
        to_top_lower[val] = spread_pair(slid[2], slid[3]);
        // Same trick vertically: the mirrored column slid up, read bottom-first.
        to_bottom_upper[rev] = spread_pair(slid[3], slid[2]);
        to_bottom_lower[rev] = spread_pair(slid[1], slid[0]);

        score[val] = calc_score(line);
    }

    log::debug!("built move tables for {LINE_TABLE_SIZE} lines");

    Stores {
        to_left: to_left.into_boxed_slice(),
        to_right: to_right.into_boxed_slice(),
        to_top_upper: to_top_upper.into_boxed_slice(),
        to_top_lower: to_top_lower.into_boxed_slice(),
        to_bottom_upper: to_bottom_upper.into_boxed_slice(),
        to_bottom_lower: to_bottom_lower.into_boxed_slice(),
        left_merges: left_merges.into_boxed_slice(),
        right_merges: right_merges.into_boxed_slice(),
        score: score.into_boxed_slice(),
    }
}

#[inline(always)]
pub(crate) fn get_line_entry<T: Copy>(table: &[T], idx: u16) -> T {
    debug_assert_eq!(table.len(), LINE_TABLE_SIZE);
    // SAFETY: every table has LINE_TABLE_SIZE entries and idx < 2^16.
    unsafe { *table.get_unchecked(idx as usize) }
}

pub(crate) fn unpack_line(line: u16) -> [u8; 4] {
    [0, 1, 2, 3].map(|i| ((line >> (4 * i)) & 0xf) as u8)
}

pub(crate) fn pack_line(cells: [u8; 4]) -> u16 {
    cells
        .iter()
        .enumerate()
        .fold(0, |acc, (i, &c)| acc | (u16::from(c & 0xf) << (4 * i)))
}

pub(crate) fn reverse_line(line: u16) -> u16 {
    ((line & 0x000f) << 12) | ((line & 0x00f0) << 4) | ((line & 0x0f00) >> 4) | ((line & 0xf000) >> 12)
}

#[inline]
fn spread_pair(first: u8, second: u8) -> u32 {
    u32::from(first) | (u32::from(second) << 16)
}

/// One leftward slide-and-merge pass over a line of exponents.
///
/// Each position pulls in the next nonzero cell to its right while it is
/// empty, then merges with it once if they match. Exponent-15 pairs never
/// merge since the result would not fit in a nibble.
pub(crate) fn slide_left(mut cells: [u8; 4]) -> ([u8; 4], LineMerges) {
    let mut merges = LineMerges::default();
    let mut i = 0;
    while i < 3 {
        let Some(j) = (i + 1..4).find(|&j| cells[j] != 0) else {
            break;
        };
        if cells[i] == 0 {
            cells[i] = cells[j];
            cells[j] = 0;
            continue;
        }
        if cells[i] == cells[j] && cells[i] < MAX_EXPONENT {
            merges.count += 1;
            merges.score += f64::from(cells[i]).powf(MERGE_SCORE_EXPONENT);
            cells[i] += 1;
            cells[j] = 0;
        }
        i += 1;
    }
    (cells, merges)
}

// Credit to Nneonneo: each tile of exponent k >= 2 was built from merges worth
// (k - 1) * 2^k in total.
fn calc_score(line: u16) -> u64 {
    unpack_line(line)
        .iter()
        .filter(|&&k| k >= 2)
        .map(|&k| u64::from(k - 1) << k)
        .sum()
}
