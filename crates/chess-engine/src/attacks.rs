//! Precomputed attack masks.
//!
//! Step pieces (pawns, knights, kings) read their targets straight from a
//! per-square table. Sliding pieces combine one ray mask per direction with
//! the board occupancy: blockers on the ray are smeared outward by repeated
//! shifting, masked back onto the ray and XORed with it, which leaves the
//! squares up to and including the first blocker.

use std::sync::OnceLock;

use chess_core::{Color, Square};

use crate::Bitboard;

/// The eight ray directions a slider can travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// Horizontal and vertical rays.
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// File and rank delta of one step.
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, 1),
            Direction::NorthWest => (-1, 1),
            Direction::SouthEast => (1, -1),
            Direction::SouthWest => (-1, -1),
        }
    }

    /// Change of square index for one step. Positive directions shift left.
    pub const fn index_step(self) -> i32 {
        let (df, dr) = self.delta();
        df as i32 + 8 * dr as i32
    }

    const fn index(self) -> usize {
        self as usize
    }
}

const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Lookup tables shared by move generation and attack detection.
pub struct AttackTables {
    pawn_push: [[Bitboard; 64]; 2],
    pawn_double_push: [[Bitboard; 64]; 2],
    pawn_capture: [[Bitboard; 64]; 2],
    pawn_en_passant: [[Bitboard; 64]; 2],
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    rays: [[Bitboard; 64]; 8],
}

static TABLES: OnceLock<AttackTables> = OnceLock::new();

/// The process-wide tables, built on first use.
pub fn attack_tables() -> &'static AttackTables {
    TABLES.get_or_init(AttackTables::build)
}

impl AttackTables {
    fn build() -> Self {
        let mut tables = AttackTables {
            pawn_push: [[Bitboard::EMPTY; 64]; 2],
            pawn_double_push: [[Bitboard::EMPTY; 64]; 2],
            pawn_capture: [[Bitboard::EMPTY; 64]; 2],
            pawn_en_passant: [[Bitboard::EMPTY; 64]; 2],
            knight: [Bitboard::EMPTY; 64],
            king: [Bitboard::EMPTY; 64],
            rays: [[Bitboard::EMPTY; 64]; 8],
        };

        for index in 0..64u8 {
            let sq = Square::at(index % 8, index / 8);
            let single = Bitboard::from_square(sq);
            let i = sq.index();

            for color in Color::BOTH {
                let c = color.index();
                let forward = match color {
                    Color::White => 1,
                    Color::Black => -1,
                };
                let relative = color.relative_rank(sq.rank());
                // No pawn ever stands on its own back rank or the promotion rank.
                if relative == 0 || relative == 7 {
                    continue;
                }
                tables.pawn_push[c][i] = single.shifted(0, forward);
                if relative == 1 {
                    tables.pawn_double_push[c][i] = single.shifted(0, 2 * forward);
                }
                let capture = single.shifted(1, forward) | single.shifted(-1, forward);
                tables.pawn_capture[c][i] = capture;
                if relative == 4 {
                    tables.pawn_en_passant[c][i] = capture;
                }
            }

            tables.knight[i] = KNIGHT_JUMPS
                .iter()
                .fold(Bitboard::EMPTY, |bb, &(df, dr)| bb | single.shifted(df, dr));

            for dir in Direction::ALL {
                let (df, dr) = dir.delta();
                tables.king[i] |= single.shifted(df, dr);

                let mut ray = Bitboard::EMPTY;
                let mut step = sq.offset(df, dr);
                while let Some(next) = step {
                    ray = ray.with(next);
                    step = next.offset(df, dr);
                }
                tables.rays[dir.index()][i] = ray;
            }
        }

        tables
    }

    /// Square a pawn of `color` on `sq` advances to.
    #[inline]
    pub fn pawn_push(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn_push[color.index()][sq.index()]
    }

    /// Two-square advance target, only defined on the pawn's start rank.
    #[inline]
    pub fn pawn_double_push(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn_double_push[color.index()][sq.index()]
    }

    /// Diagonal squares a pawn of `color` on `sq` attacks.
    #[inline]
    pub fn pawn_capture(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn_capture[color.index()][sq.index()]
    }

    /// Squares where an en-passant capture could land, only defined on the
    /// rank a capturing pawn must stand on.
    #[inline]
    pub fn pawn_en_passant(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn_en_passant[color.index()][sq.index()]
    }

    #[inline]
    pub fn knight(&self, sq: Square) -> Bitboard {
        self.knight[sq.index()]
    }

    #[inline]
    pub fn king(&self, sq: Square) -> Bitboard {
        self.king[sq.index()]
    }

    /// Every square from `sq` to the board edge in `dir`, excluding `sq`.
    #[inline]
    pub fn ray(&self, dir: Direction, sq: Square) -> Bitboard {
        self.rays[dir.index()][sq.index()]
    }

    /// Squares a slider on `sq` reaches in `dir`, up to and including the first
    /// occupied square.
    pub fn ray_reach(&self, dir: Direction, sq: Square, occupied: Bitboard) -> Bitboard {
        let ray = self.ray(dir, sq).0;
        let blockers = ray & occupied.0;
        let step = dir.index_step();
        let shift = step.unsigned_abs();
        // Shadow of the blockers: every ray square strictly beyond one of them.
        let mut shadow = if step > 0 {
            blockers << shift
        } else {
            blockers >> shift
        };
        for k in [1, 2, 4] {
            shadow |= if step > 0 {
                shadow << (shift * k)
            } else {
                shadow >> (shift * k)
            };
        }
        Bitboard((shadow & ray) ^ ray)
    }

    fn slide(&self, dirs: &[Direction], sq: Square, occupied: Bitboard) -> Bitboard {
        dirs.iter()
            .fold(Bitboard::EMPTY, |bb, &dir| bb | self.ray_reach(dir, sq, occupied))
    }

    #[inline]
    pub fn rook(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.slide(&Direction::ORTHOGONAL, sq, occupied)
    }

    #[inline]
    pub fn bishop(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.slide(&Direction::DIAGONAL, sq, occupied)
    }

    #[inline]
    pub fn queen(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.slide(&Direction::ALL, sq, occupied)
    }
}
