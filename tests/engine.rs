use merge_2048::engine::{self as GameEngine, Board, Move};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn transpose(b: Board) -> Board {
    let rows = b.to_exponents();
    let mut cols = [[0u8; 4]; 4];
    for (y, row) in rows.iter().enumerate() {
        for (x, &exp) in row.iter().enumerate() {
            cols[x][y] = exp;
        }
    }
    Board::from_exponents(cols)
}

fn line_board(row: usize, line: u16) -> Board {
    let mut rows = [[0u8; 4]; 4];
    for x in 0..4 {
        rows[row][x] = ((line >> (4 * x)) & 0xf) as u8;
    }
    Board::from_exponents(rows)
}

#[test]
fn vertical_moves_mirror_horizontal_moves_for_every_line() {
    GameEngine::new();
    for line in 0..=u16::MAX {
        // Row 1 ends up as column 1 after transposing, straddling both halves.
        let b = line_board(1, line);
        let t = transpose(b);
        for (horizontal, vertical) in [(Move::Left, Move::Up), (Move::Right, Move::Down)] {
            let h = b.apply(horizontal);
            let v = t.apply(vertical);
            assert_eq!(transpose(h.board), v.board, "line {line:#06x} {vertical:?}");
            assert_eq!(h.merge_count, v.merge_count);
            assert_eq!(h.merge_score, v.merge_score);
        }
    }
}

#[test]
fn row_scenarios() {
    let out = Board::from_exponents([[1, 1, 1, 1], [0; 4], [0; 4], [0; 4]]).apply(Move::Left);
    assert_eq!(out.board.to_exponents()[0], [2, 2, 0, 0]);
    assert_eq!(out.merge_count, 2);

    let out = Board::from_exponents([[1, 0, 1, 0], [0; 4], [0; 4], [0; 4]]).apply(Move::Left);
    assert_eq!(out.board.to_exponents()[0], [2, 0, 0, 0]);
    assert_eq!(out.merge_count, 1);
}

#[test]
fn each_merge_gains_the_donor_value() {
    let mut rng = StdRng::seed_from_u64(77);
    for _ in 0..2_000 {
        let mut rows = [[0u8; 4]; 4];
        for cell in rows.iter_mut().flatten() {
            *cell = if rng.gen_bool(0.3) { 0 } else { rng.gen_range(1..6) };
        }
        let b = Board::from_exponents(rows);
        for dir in Move::ALL {
            let out = b.apply(dir);
            assert_eq!(out.board.tile_sum(), b.tile_sum(), "{b:?} {dir:?}");
            assert_eq!(out.board.free_cells(), b.free_cells() + out.merge_count, "{b:?} {dir:?}");
            if out.board == b {
                assert_eq!(out.merge_count, 0);
                assert_eq!(out.merge_score, 0.0);
            }
            // The largest-tile value can only grow, and only through merges.
            if out.merge_count == 0 {
                assert_eq!(out.board.highest_tile(), b.highest_tile());
            }
        }
    }
}

#[test]
fn snapshot_round_trips_through_cells() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut b = Board::EMPTY;
    for _ in 0..10 {
        b = b.with_random_tile(&mut rng);
    }
    let cells: Vec<_> = b.cells().collect();
    assert_eq!(cells.len(), 16);
    assert_eq!(Board::try_from_cells(cells).unwrap(), b);
    assert_eq!(b.free_cells(), 6);
}

#[test]
fn game_over_detection() {
    let stuck = Board::from_exponents([[1, 2, 1, 2], [2, 1, 2, 1], [1, 2, 1, 2], [2, 1, 2, 1]]);
    assert!(stuck.is_game_over());
    assert_eq!(stuck.legal_moves().count(), 0);

    let one_merge = Board::from_exponents([[1, 1, 3, 4], [2, 3, 4, 5], [3, 4, 5, 6], [4, 5, 6, 7]]);
    assert!(!one_merge.is_game_over());
    assert_eq!(one_merge.legal_moves().collect::<Vec<_>>(), vec![Move::Right, Move::Left]);
}
