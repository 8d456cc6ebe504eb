//! Move application.

use chess_core::{CastleSide, Color, Move, MoveEffect, Piece, Square};

use crate::Position;

/// Plays `mv` for `color` on a copy of `position`.
///
/// `mv` must come from the legal move generator for the same position and
/// color; the result is unspecified otherwise, but never panics.
pub fn apply_move(position: &Position, color: Color, mv: &Move) -> (Position, MoveEffect) {
    let them = color.opponent();
    let mut next = *position;
    let mut effect = MoveEffect::quiet(color);

    let en_passant = mv.piece == Piece::Pawn
        && mv.from.file() != mv.to.file()
        && position.en_passant() == Some(mv.to);
    let captured_at = if en_passant {
        // The captured pawn sits beside the mover, not on the target square.
        Some(Square::at(mv.to.file(), mv.from.rank()))
    } else if position.side(them).occupied().contains(mv.to) {
        Some(mv.to)
    } else {
        None
    };

    if let Some(sq) = captured_at {
        if next.remove(them, sq) == Some(Piece::Rook) {
            revoke_if_rook_home(&mut next, them, sq);
        }
        effect.captured_at = Some(sq);
    }

    next.remove(color, mv.from);
    next.put(color, mv.promotion.unwrap_or(mv.piece), mv.to);

    if let Some(side) = mv.castle {
        let (rook_from, rook_to) = (side.rook_from(color), side.rook_to(color));
        next.remove(color, rook_from);
        next.put(color, Piece::Rook, rook_to);
        effect.rook_move = Some((rook_from, rook_to));
    }

    match mv.piece {
        Piece::King => {
            next.revoke_castling(color, CastleSide::King);
            next.revoke_castling(color, CastleSide::Queen);
        }
        Piece::Rook => revoke_if_rook_home(&mut next, color, mv.from),
        _ => {}
    }

    let double_push = mv.piece == Piece::Pawn && mv.from.rank().abs_diff(mv.to.rank()) == 2;
    next.set_en_passant(if double_push {
        Some(Square::at(mv.from.file(), (mv.from.rank() + mv.to.rank()) / 2))
    } else {
        None
    });

    next.set_halfmove_clock(if mv.piece == Piece::Pawn || captured_at.is_some() {
        0
    } else {
        position.halfmove_clock() + 1
    });

    (next, effect)
}

fn revoke_if_rook_home(position: &mut Position, color: Color, sq: Square) {
    for side in [CastleSide::King, CastleSide::Queen] {
        if sq == side.rook_from(color) {
            position.revoke_castling(color, side);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legal_moves_from;

    fn find(position: &Position, from: Square, to: Square) -> Move {
        legal_moves_from(position, from)
            .iter()
            .copied()
            .find(|m| m.to == to)
            .unwrap()
    }

    #[test]
    fn quiet_pawn_push_sets_en_passant_target() {
        let p = Position::new_game();
        let (next, effect) = apply_move(&p, Color::White, &find(&p, Square::E2, Square::E4));
        assert_eq!(effect, MoveEffect::quiet(Color::White));
        assert_eq!(next.piece_at(Square::E4), Some((Color::White, Piece::Pawn)));
        assert_eq!(next.piece_at(Square::E2), None);
        assert_eq!(next.en_passant(), Some(Square::E3));
        assert_eq!(next.halfmove_clock(), 0);

        let (after, _) = apply_move(&next, Color::Black, &find(&next, Square::G8, Square::F6));
        assert_eq!(after.en_passant(), None);
        assert_eq!(after.halfmove_clock(), 1);
    }

    #[test]
    fn capture_strips_every_mask() {
        let (p, c) = Position::from_fen("4k3/8/8/3n4/4P3/8/8/4K3 w - - 3 1").unwrap();
        let mv = find(&p, Square::E4, Square::D5);
        assert!(mv.capture);
        let (next, effect) = apply_move(&p, c, &mv);
        assert_eq!(effect.captured_at, Some(Square::D5));
        assert_eq!(next.pieces(Color::Black, Piece::Knight).count(), 0);
        assert!(!next.side(Color::Black).occupied().contains(Square::D5));
        assert_eq!(next.piece_at(Square::D5), Some((Color::White, Piece::Pawn)));
        assert_eq!(next.halfmove_clock(), 0);
    }

    #[test]
    fn castling_moves_the_rook_and_clears_rights() {
        let (p, c) = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let (next, effect) = apply_move(&p, c, &Move::castling(c, CastleSide::Queen));
        assert_eq!(effect.rook_move, Some((Square::A1, Square::D1)));
        assert_eq!(next.piece_at(Square::C1), Some((Color::White, Piece::King)));
        assert_eq!(next.piece_at(Square::D1), Some((Color::White, Piece::Rook)));
        assert_eq!(next.piece_at(Square::A1), None);
        assert!(!next.can_castle(Color::White, CastleSide::King));
        assert!(!next.can_castle(Color::White, CastleSide::Queen));
        assert!(next.can_castle(Color::Black, CastleSide::King));
    }

    #[test]
    fn rook_moves_and_captures_revoke_one_wing() {
        let (p, c) = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let (next, _) = apply_move(&p, c, &find(&p, Square::H1, Square::H8));
        assert!(!next.can_castle(Color::White, CastleSide::King));
        assert!(next.can_castle(Color::White, CastleSide::Queen));
        assert!(!next.can_castle(Color::Black, CastleSide::King));
        assert!(next.can_castle(Color::Black, CastleSide::Queen));
    }

    #[test]
    fn promotion_replaces_the_pawn() {
        let (p, c) = Position::from_fen("7k/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mv = legal_moves_from(&p, Square::A7)
            .iter()
            .copied()
            .find(|m| m.promotion == Some(Piece::Knight))
            .unwrap();
        let (next, _) = apply_move(&p, c, &mv);
        assert_eq!(next.piece_at(Square::A8), Some((Color::White, Piece::Knight)));
        assert!(next.pieces(Color::White, Piece::Pawn).is_empty());
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let (p, c) = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let (next, effect) = apply_move(&p, c, &find(&p, Square::E5, Square::D6));
        assert_eq!(effect.captured_at, Some(Square::D5));
        assert_eq!(next.piece_at(Square::D5), None);
        assert_eq!(next.piece_at(Square::D6), Some((Color::White, Piece::Pawn)));
        assert!(next.pieces(Color::Black, Piece::Pawn).is_empty());
    }
}
