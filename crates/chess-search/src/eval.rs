//! Static evaluation of leaf positions.

use chess_core::{Color, Piece, Square};
use chess_engine::{Bitboard, Position};

/// Material value of one pawn.
pub const PAWN_SCORE: i32 = 100;

/// Positional terms stop applying once either side's non-king material, in
/// pawns, drops below this.
pub const ENDGAME_MATERIAL: i32 = 30;

// Masks are written from White's side of the board. Black's pieces are
// mirrored onto them before counting.
const BACK_RANK: Bitboard = Bitboard::rank(0);
const SECOND_RANK: Bitboard = Bitboard::rank(1);
const FOURTH_RANK: Bitboard = Bitboard::rank(3);
const KING_SHELTER: Bitboard = Bitboard(
    Square::A1.bit() | Square::B1.bit() | Square::C1.bit() | Square::G1.bit() | Square::H1.bit(),
);
const KING_HOME: Bitboard = Bitboard::from_square(Square::E1);
const QUEEN_HOME: Bitboard = Bitboard::from_square(Square::D1);
const KNIGHT_OUTPOSTS: Bitboard = Bitboard(0x0000_0000_3C3C_0000);

/// Material plus opening-phase development heuristics.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticEvaluator;

impl StaticEvaluator {
    /// Scores `position` for `color`: positive means `color` is better off.
    pub fn evaluate(&self, position: &Position, color: Color) -> i32 {
        let material = Color::BOTH.map(|c| position.side(c).material());
        let endgame = material.iter().any(|&m| m < ENDGAME_MATERIAL);

        let [white, black] = Color::BOTH.map(|c| {
            let mut score = material[c.index()] * PAWN_SCORE;
            if !endgame {
                score += development(position, c);
            }
            score
        });

        match color {
            Color::White => white - black,
            Color::Black => black - white,
        }
    }
}

fn development(position: &Position, color: Color) -> i32 {
    let pieces = |piece: Piece| {
        let bb = position.pieces(color, piece);
        match color {
            Color::White => bb,
            Color::Black => bb.flip_ranks(),
        }
    };
    let count = |bb: Bitboard| bb.count() as i32;
    let mut score = 0;

    let king = pieces(Piece::King);
    if king.intersects(KING_SHELTER) {
        score += 40;
    } else if !king.intersects(KING_HOME) {
        score -= 40;
    }
    if !king.intersects(BACK_RANK) {
        score -= 20;
        if !king.intersects(SECOND_RANK) {
            score -= 200;
        }
    }

    if (pieces(Piece::Queen) & !QUEEN_HOME).is_not_empty() {
        score -= 60;
    }

    let knights = pieces(Piece::Knight);
    score += 40 * count(knights & KNIGHT_OUTPOSTS);
    score -= 40 * count(knights & BACK_RANK);

    let bishops = pieces(Piece::Bishop);
    score += 40 * count(bishops & FOURTH_RANK);
    score += 30 * count(bishops & !BACK_RANK & !FOURTH_RANK);
    score -= 40 * count(bishops & BACK_RANK);

    let rooks = pieces(Piece::Rook);
    score += 40 * count(rooks & BACK_RANK);
    score -= 40 * count(rooks & !BACK_RANK);

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(fen: &str, color: Color) -> i32 {
        let (position, _) = Position::from_fen(fen).unwrap();
        StaticEvaluator.evaluate(&position, color)
    }

    #[test]
    fn start_position_is_balanced() {
        let position = Position::new_game();
        assert_eq!(StaticEvaluator.evaluate(&position, Color::White), 0);
        assert_eq!(StaticEvaluator.evaluate(&position, Color::Black), 0);
    }

    #[test]
    fn knight_outposts_cover_the_centre() {
        assert_eq!(KNIGHT_OUTPOSTS.count(), 8);
        for sq in [Square::C3, Square::F3, Square::C4, Square::F4] {
            assert!(KNIGHT_OUTPOSTS.contains(sq));
        }
        assert!(!KNIGHT_OUTPOSTS.contains(Square::B3));
        assert!(!KNIGHT_OUTPOSTS.contains(Square::C5));
    }

    #[test]
    fn developing_a_knight_helps() {
        // Nf3: +40 outpost and one knight fewer on the back rank.
        let score = eval(
            "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq - 1 1",
            Color::White,
        );
        assert_eq!(score, 80);
    }

    #[test]
    fn mirrored_moves_score_the_same() {
        let white = eval(
            "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq - 1 1",
            Color::White,
        );
        let black = eval(
            "rnbqkb1r/pppppppp/5n2/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 1 1",
            Color::Black,
        );
        assert_eq!(white, black);
    }

    #[test]
    fn early_queen_and_wandering_king_are_penalised() {
        // Queen on h5.
        let queen_out = eval(
            "rnbqkbnr/pppp1ppp/8/4p2Q/4P3/8/PPPP1PPP/RNB1KBNR b KQkq - 1 2",
            Color::White,
        );
        assert_eq!(queen_out, -60);

        // King on e3: off its home square, off the first two ranks.
        let king_out = eval(
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/4K3/PPPP1PPP/RNBQ1BNR b kq - 1 2",
            Color::White,
        );
        assert_eq!(king_out, -40 - 20 - 200);
    }

    #[test]
    fn castled_king_earns_shelter_bonus() {
        let score = eval(
            "rnbqk2r/pppp1ppp/5n2/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 5 4",
            Color::White,
        );
        // Minor pieces are developed alike, so only the shelter bonus differs.
        assert_eq!(score, 40);
    }

    #[test]
    fn endgame_counts_material_only() {
        // Rook against bare king: White 5 < 30 disables positional terms.
        let score = eval("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", Color::White);
        assert_eq!(score, 500);
        assert_eq!(eval("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", Color::Black), -500);
    }
}
