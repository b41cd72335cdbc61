//! Process-wide immutable attack tables.
//!
//! Built once behind a `LazyLock` and forced by `init()` before the first
//! generator call; nothing in the hot path ever initializes lazily.

use std::sync::LazyLock;

use crate::{BitBoard, Piece, Side, Square};

pub static MOVE_TABLES: LazyLock<MoveTables> = LazyLock::new(MoveTables::new);

const NORTH: usize = 0;
const SOUTH: usize = 1;
const EAST: usize = 2;
const WEST: usize = 3;
const NORTHEAST: usize = 4;
const NORTHWEST: usize = 5;
const SOUTHEAST: usize = 6;
const SOUTHWEST: usize = 7;

/// (rank step, file step) per ray direction, indexed as above.
const RAY_STEPS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

const OPPOSITE: [usize; 8] = [
    SOUTH, NORTH, WEST, EAST, SOUTHWEST, SOUTHEAST, NORTHWEST, NORTHEAST,
];

/// Rays scanned away from the origin toward higher square indices use the
/// lsb as the closest blocker, the rest use the msb.
const RAY_FORWARD: [bool; 8] = [true, false, true, false, true, true, false, false];

#[derive(Debug)]
pub struct MoveTables {
    pub knight_attacks: [BitBoard; 64],
    pub king_attacks: [BitBoard; 64],
    pawn_attacks: [[BitBoard; 64]; 2],

    /// Empty-board attacks in each of the eight directions.
    rays: [[BitBoard; 64]; 8],

    /// Empty-board slider attacks (the union of the relevant rays).
    pseudo_rook: [BitBoard; 64],
    pseudo_bishop: [BitBoard; 64],

    /// Squares strictly between two aligned squares; empty if unaligned.
    between: [[BitBoard; 64]; 64],
    /// The full line through two aligned squares (both included); empty if
    /// unaligned.
    line: [[BitBoard; 64]; 64],

    /// Squares ahead of a square on its own and the adjacent files, from
    /// white's point of view. The Racing Kings goal is rank 8 for both
    /// sides, so this is "forward" for either color.
    forward_cone: [BitBoard; 64],
}

impl Default for MoveTables {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveTables {
    pub fn new() -> Self {
        let mut tables = Self {
            knight_attacks: [BitBoard::EMPTY; 64],
            king_attacks: [BitBoard::EMPTY; 64],
            pawn_attacks: [[BitBoard::EMPTY; 64]; 2],
            rays: [[BitBoard::EMPTY; 64]; 8],
            pseudo_rook: [BitBoard::EMPTY; 64],
            pseudo_bishop: [BitBoard::EMPTY; 64],
            between: [[BitBoard::EMPTY; 64]; 64],
            line: [[BitBoard::EMPTY; 64]; 64],
            forward_cone: [BitBoard::EMPTY; 64],
        };

        tables.init_leapers();
        tables.init_pawn_attacks();
        tables.init_rays();
        tables.init_lines();
        tables.init_forward_cones();

        tables
    }

    fn init_leapers(&mut self) {
        const KNIGHT_STEPS: [(i8, i8); 8] = [
            (2, 1),
            (2, -1),
            (-2, 1),
            (-2, -1),
            (1, 2),
            (1, -2),
            (-1, 2),
            (-1, -2),
        ];
        const KING_STEPS: [(i8, i8); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];

        for sq in 0..64 {
            let (rank, file) = ((sq / 8) as i8, (sq % 8) as i8);
            for (dr, df) in KNIGHT_STEPS {
                if let Some(target) = offset_square(rank, file, dr, df) {
                    self.knight_attacks[sq].set(target);
                }
            }
            for (dr, df) in KING_STEPS {
                if let Some(target) = offset_square(rank, file, dr, df) {
                    self.king_attacks[sq].set(target);
                }
            }
        }
    }

    fn init_pawn_attacks(&mut self) {
        for sq in 0..64 {
            let (rank, file) = ((sq / 8) as i8, (sq % 8) as i8);
            for df in [-1, 1] {
                if let Some(target) = offset_square(rank, file, 1, df) {
                    self.pawn_attacks[Side::White.index()][sq].set(target);
                }
                if let Some(target) = offset_square(rank, file, -1, df) {
                    self.pawn_attacks[Side::Black.index()][sq].set(target);
                }
            }
        }
    }

    fn init_rays(&mut self) {
        for sq in 0..64 {
            let (rank, file) = ((sq / 8) as i8, (sq % 8) as i8);
            for (dir, (dr, df)) in RAY_STEPS.iter().enumerate() {
                let (mut r, mut f) = (rank + dr, file + df);
                while (0..8).contains(&r) && (0..8).contains(&f) {
                    self.rays[dir][sq].set((r * 8 + f) as usize);
                    r += dr;
                    f += df;
                }
            }
            self.pseudo_rook[sq] = self.rays[NORTH][sq]
                | self.rays[SOUTH][sq]
                | self.rays[EAST][sq]
                | self.rays[WEST][sq];
            self.pseudo_bishop[sq] = self.rays[NORTHEAST][sq]
                | self.rays[NORTHWEST][sq]
                | self.rays[SOUTHEAST][sq]
                | self.rays[SOUTHWEST][sq];
        }
    }

    fn init_lines(&mut self) {
        for sq in 0..64 {
            for dir in 0..8 {
                let full_line =
                    self.rays[dir][sq] | self.rays[OPPOSITE[dir]][sq] | BitBoard(1 << sq);
                for target in self.rays[dir][sq].iter_bits() {
                    self.line[sq][target] = full_line;
                    self.between[sq][target] =
                        self.rays[dir][sq] & self.rays[OPPOSITE[dir]][target];
                }
            }
        }
    }

    fn init_forward_cones(&mut self) {
        for sq in 0..64usize {
            let (rank, file) = (sq / 8, sq % 8);
            for r in rank + 1..8 {
                for f in file.saturating_sub(1)..=(file + 1).min(7) {
                    self.forward_cone[sq].set(r * 8 + f);
                }
            }
        }
    }

    #[inline(always)]
    fn ray_attacks(&self, dir: usize, from: usize, occupied: BitBoard) -> BitBoard {
        let ray = self.rays[dir][from];
        match (ray & occupied).get_closest_bit(RAY_FORWARD[dir]) {
            None => ray,
            // Keep everything up to and including the first blocker.
            Some(blocker) => ray & !self.rays[dir][blocker as usize],
        }
    }

    #[inline(always)]
    pub fn rook_attacks(&self, from: Square, occupied: BitBoard) -> BitBoard {
        let from = from.index();
        self.ray_attacks(NORTH, from, occupied)
            | self.ray_attacks(SOUTH, from, occupied)
            | self.ray_attacks(EAST, from, occupied)
            | self.ray_attacks(WEST, from, occupied)
    }

    #[inline(always)]
    pub fn bishop_attacks(&self, from: Square, occupied: BitBoard) -> BitBoard {
        let from = from.index();
        self.ray_attacks(NORTHEAST, from, occupied)
            | self.ray_attacks(NORTHWEST, from, occupied)
            | self.ray_attacks(SOUTHEAST, from, occupied)
            | self.ray_attacks(SOUTHWEST, from, occupied)
    }

    #[inline(always)]
    pub fn queen_attacks(&self, from: Square, occupied: BitBoard) -> BitBoard {
        self.rook_attacks(from, occupied) | self.bishop_attacks(from, occupied)
    }

    #[inline(always)]
    pub fn get_pawn_attacks(&self, sq: Square, side: Side) -> BitBoard {
        self.pawn_attacks[side.index()][sq.index()]
    }

    #[inline(always)]
    pub fn get_knight_attacks(&self, sq: Square) -> BitBoard {
        self.knight_attacks[sq.index()]
    }

    #[inline(always)]
    pub fn get_king_attacks(&self, sq: Square) -> BitBoard {
        self.king_attacks[sq.index()]
    }

    /// Empty-board attack set; the sliding-piece equivalent of the leaper
    /// tables. Pawns are excluded on purpose, their pseudo attacks depend on
    /// color.
    #[inline(always)]
    pub fn pseudo_attacks(&self, piece: Piece, sq: Square) -> BitBoard {
        match piece {
            Piece::Knight => self.knight_attacks[sq.index()],
            Piece::King => self.king_attacks[sq.index()],
            Piece::Bishop => self.pseudo_bishop[sq.index()],
            Piece::Rook => self.pseudo_rook[sq.index()],
            Piece::Queen => self.pseudo_rook[sq.index()] | self.pseudo_bishop[sq.index()],
            Piece::Pawn => BitBoard::EMPTY,
        }
    }

    #[inline(always)]
    pub fn between(&self, a: Square, b: Square) -> BitBoard {
        self.between[a.index()][b.index()]
    }

    #[inline(always)]
    pub fn line(&self, a: Square, b: Square) -> BitBoard {
        self.line[a.index()][b.index()]
    }

    #[inline(always)]
    pub fn forward_cone(&self, sq: Square) -> BitBoard {
        self.forward_cone[sq.index()]
    }
}

fn offset_square(rank: i8, file: i8, dr: i8, df: i8) -> Option<usize> {
    let (r, f) = (rank + dr, file + df);
    if (0..8).contains(&r) && (0..8).contains(&f) {
        Some((r * 8 + f) as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn bb_from_squares(squares: &[&str]) -> BitBoard {
        let mut bb = BitBoard::EMPTY;
        for s in squares {
            bb.set(sq(s).index());
        }
        bb
    }

    #[test]
    fn test_knight_attacks_corner() {
        assert_eq!(
            MOVE_TABLES.get_knight_attacks(sq("a1")),
            bb_from_squares(&["b3", "c2"])
        );
    }

    #[test]
    fn test_rook_attacks_with_blockers() {
        let occupied = bb_from_squares(&["d6", "f4", "d2"]);
        let attacks = MOVE_TABLES.rook_attacks(sq("d4"), occupied);
        let expected = bb_from_squares(&["d5", "d6", "d3", "d2", "e4", "f4", "c4", "b4", "a4"]);
        assert_eq!(
            attacks,
            expected,
            "\nExpected:\n{}\nGot:\n{}",
            expected.print_bitboard(),
            attacks.print_bitboard()
        );
    }

    #[test]
    fn test_bishop_attacks_empty_board() {
        let attacks = MOVE_TABLES.bishop_attacks(sq("a1"), BitBoard::EMPTY);
        let expected = bb_from_squares(&["b2", "c3", "d4", "e5", "f6", "g7", "h8"]);
        assert_eq!(attacks, expected);
    }

    #[test]
    fn test_between_and_line() {
        assert_eq!(
            MOVE_TABLES.between(sq("a1"), sq("d4")),
            bb_from_squares(&["b2", "c3"])
        );
        assert!(MOVE_TABLES.between(sq("a1"), sq("b3")).is_empty());
        let line = MOVE_TABLES.line(sq("c3"), sq("e3"));
        assert_eq!(line, BitBoard::RANKS[2]);
        assert!(MOVE_TABLES.line(sq("a1"), sq("c2")).is_empty());
    }

    #[test]
    fn test_pawn_attacks_by_side() {
        assert_eq!(
            MOVE_TABLES.get_pawn_attacks(sq("e4"), Side::White),
            bb_from_squares(&["d5", "f5"])
        );
        assert_eq!(
            MOVE_TABLES.get_pawn_attacks(sq("e4"), Side::Black),
            bb_from_squares(&["d3", "f3"])
        );
        assert_eq!(
            MOVE_TABLES.get_pawn_attacks(sq("a2"), Side::White),
            bb_from_squares(&["b3"])
        );
    }

    #[test]
    fn test_forward_cone() {
        let cone = MOVE_TABLES.forward_cone(sq("g6"));
        let expected = bb_from_squares(&["f7", "g7", "h7", "f8", "g8", "h8"]);
        assert_eq!(cone, expected);
    }
}
