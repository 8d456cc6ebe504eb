//! Legal move generation.
//!
//! Moves are first generated pseudo-legally per piece kind from the attack
//! tables, then every candidate is applied to a copy of the position and
//! dropped if it leaves the mover's king attacked.

pub mod perft;

use chess_core::{CastleSide, Color, Move, Piece, Square};

use crate::attacks::{attack_tables, AttackTables};
use crate::{apply_move, is_in_check, Bitboard, Position};

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub const MAX_MOVES: usize = 256;

    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn contains(&self, m: &Move) -> bool {
        self.as_slice().contains(m)
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }

    /// Moves `m` to the front, keeping the relative order of the others.
    /// Returns false if `m` is not in the list.
    pub fn move_to_front(&mut self, m: &Move) -> bool {
        match self.as_slice().iter().position(|x| x == m) {
            Some(i) => {
                self.moves[..=i].rotate_right(1);
                true
            }
            None => false,
        }
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl FromIterator<Move> for MoveList {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        let mut list = MoveList::new();
        for m in iter {
            list.push(m);
        }
        list
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// All legal moves for `color`.
pub fn legal_moves(position: &Position, color: Color) -> MoveList {
    let mut moves = MoveList::new();
    let side = position.side(color);
    for piece in Piece::ALL {
        for from in side.pieces(piece) {
            piece_moves(position, color, piece, from, &mut moves);
        }
    }
    retain_legal(position, color, &mut moves);
    moves
}

/// Legal moves of whichever piece stands on `from`. Empty if the square is empty.
pub fn legal_moves_from(position: &Position, from: Square) -> MoveList {
    let mut moves = MoveList::new();
    if let Some((color, piece)) = position.piece_at(from) {
        piece_moves(position, color, piece, from, &mut moves);
        retain_legal(position, color, &mut moves);
    }
    moves
}

/// True if any piece of `attacker` attacks at least one square of `targets`.
pub fn square_attacked_by(position: &Position, targets: Bitboard, attacker: Color) -> bool {
    let tables = attack_tables();
    let occupied = position.occupied();
    let side = position.side(attacker);
    Piece::ALL.into_iter().any(|piece| {
        side.pieces(piece)
            .into_iter()
            .any(|from| attacks_from(tables, piece, attacker, from, occupied).intersects(targets))
    })
}

fn retain_legal(position: &Position, color: Color, moves: &mut MoveList) {
    moves.retain(|m| {
        let (next, _) = apply_move(position, color, m);
        !is_in_check(&next, color)
    });
}

/// Squares a piece attacks. For pawns these are the capture diagonals only.
fn attacks_from(
    tables: &AttackTables,
    piece: Piece,
    color: Color,
    from: Square,
    occupied: Bitboard,
) -> Bitboard {
    match piece {
        Piece::Pawn => tables.pawn_capture(color, from),
        Piece::Knight => tables.knight(from),
        Piece::Bishop => tables.bishop(from, occupied),
        Piece::Rook => tables.rook(from, occupied),
        Piece::Queen => tables.queen(from, occupied),
        Piece::King => tables.king(from),
    }
}

/// Pseudo-legal moves of one piece.
fn piece_moves(position: &Position, color: Color, piece: Piece, from: Square, moves: &mut MoveList) {
    let tables = attack_tables();
    let them = color.opponent();
    let own = position.side(color).occupied();
    // Kings are never captured; a position where that would be possible is
    // already lost for the side to move.
    let victims = position.side(them).occupied() & !position.pieces(them, Piece::King);
    let occupied = position.occupied();

    if piece == Piece::Pawn {
        pawn_moves(tables, position, color, from, victims, moves);
        return;
    }

    let targets = attacks_from(tables, piece, color, from, occupied) & !own;
    for to in targets & !position.side(them).occupied() {
        moves.push(Move::new(from, to, piece));
    }
    for to in targets & victims {
        moves.push(Move::new(from, to, piece).capturing());
    }

    if piece == Piece::King {
        castling_moves(position, color, from, moves);
    }
}

fn pawn_moves(
    tables: &AttackTables,
    position: &Position,
    color: Color,
    from: Square,
    victims: Bitboard,
    moves: &mut MoveList,
) {
    let empty = !position.occupied();

    let push = tables.pawn_push(color, from) & empty;
    for to in push {
        push_pawn_move(color, Move::new(from, to, Piece::Pawn), moves);
        for to in tables.pawn_double_push(color, from) & empty {
            moves.push(Move::new(from, to, Piece::Pawn));
        }
    }

    for to in tables.pawn_capture(color, from) & victims {
        push_pawn_move(color, Move::new(from, to, Piece::Pawn).capturing(), moves);
    }

    for to in tables.pawn_en_passant(color, from) & position.en_passant_mask() {
        moves.push(Move::new(from, to, Piece::Pawn).capturing());
    }
}

/// Pushes a pawn move, expanded into the four promotions on the last rank.
fn push_pawn_move(color: Color, m: Move, moves: &mut MoveList) {
    if m.to.rank() == color.promotion_rank() {
        for piece in Piece::PROMOTIONS {
            moves.push(m.promoting(piece));
        }
    } else {
        moves.push(m);
    }
}

fn castling_moves(position: &Position, color: Color, from: Square, moves: &mut MoveList) {
    let home = color.home_rank();
    if from != Square::at(4, home) {
        return;
    }
    let them = color.opponent();
    let occupied = position.occupied();
    let mask = |files: &[u8]| -> Bitboard {
        files
            .iter()
            .fold(Bitboard::EMPTY, |bb, &f| bb.with(Square::at(f, home)))
    };

    for (side, between, safe) in [
        (CastleSide::King, mask(&[5, 6][..]), mask(&[4, 5, 6][..])),
        (CastleSide::Queen, mask(&[1, 2, 3][..]), mask(&[4, 3, 2][..])),
    ] {
        let rook_home = position
            .pieces(color, Piece::Rook)
            .contains(side.rook_from(color));
        if !position.can_castle(color, side) || !rook_home {
            continue;
        }
        if occupied.intersects(between) || square_attacked_by(position, safe, them) {
            continue;
        }
        moves.push(Move::castling(color, side));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fen(s: &str) -> (Position, Color) {
        Position::from_fen(s).unwrap()
    }

    #[test]
    fn movelist_push_retain_and_reorder() {
        let a = Move::new(Square::E2, Square::E4, Piece::Pawn);
        let b = Move::new(Square::D2, Square::D4, Piece::Pawn);
        let c = Move::new(Square::G1, Square::F3, Piece::Knight);
        let mut list: MoveList = [a, b, c].into_iter().collect();
        assert_eq!(list.len(), 3);

        assert!(list.move_to_front(&c));
        assert_eq!(list.as_slice(), &[c, a, b]);
        assert!(!list.move_to_front(&Move::NULL));

        list.retain(|m| m.piece == Piece::Pawn);
        assert_eq!(list.as_slice(), &[a, b]);
        assert!(MoveList::default().is_empty());
    }

    #[test]
    fn twenty_moves_from_start() {
        let p = Position::new_game();
        assert_eq!(legal_moves(&p, Color::White).len(), 20);
        assert_eq!(legal_moves(&p, Color::Black).len(), 20);
    }

    #[test]
    fn moves_from_a_single_square() {
        let p = Position::new_game();
        let knight = legal_moves_from(&p, Square::G1);
        assert_eq!(knight.len(), 2);
        assert!(knight.iter().all(|m| m.piece == Piece::Knight));
        assert_eq!(legal_moves_from(&p, Square::E2).len(), 2);
        assert!(legal_moves_from(&p, Square::E4).is_empty());
        assert_eq!(legal_moves_from(&p, Square::B8).len(), 2);
    }

    #[test]
    fn attacks_in_start_position() {
        let p = Position::new_game();
        let sq = |s: Square| Bitboard::from_square(s);
        assert!(square_attacked_by(&p, sq(Square::E3), Color::White));
        assert!(square_attacked_by(&p, sq(Square::F3), Color::White));
        assert!(!square_attacked_by(&p, sq(Square::E4), Color::White));
        assert!(square_attacked_by(&p, sq(Square::E6), Color::Black));
        assert!(!square_attacked_by(&p, sq(Square::E5), Color::Black));
        assert!(square_attacked_by(
            &p,
            Bitboard::from_squares(&[Square::E4, Square::H6]),
            Color::Black
        ));
    }

    #[test]
    fn pawn_pushes_do_not_attack() {
        let (p, _) = fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        assert!(!square_attacked_by(&p, Bitboard::from_square(Square::E3), Color::White));
        assert!(square_attacked_by(&p, Bitboard::from_square(Square::D3), Color::White));
    }

    #[test]
    fn castling_both_wings() {
        let (p, c) = fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let castles: Vec<Move> = legal_moves(&p, c)
            .iter()
            .copied()
            .filter(|m| m.castle.is_some())
            .collect();
        assert_eq!(castles.len(), 2);
        assert!(castles.contains(&Move::castling(Color::White, CastleSide::King)));
        assert!(castles.contains(&Move::castling(Color::White, CastleSide::Queen)));
    }

    #[test]
    fn no_castling_through_or_into_check() {
        // Black rook covers f1.
        let (p, c) = fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let moves = legal_moves(&p, c);
        assert!(!moves.contains(&Move::castling(Color::White, CastleSide::King)));
        assert!(moves.contains(&Move::castling(Color::White, CastleSide::Queen)));

        // Black rook covers g1.
        let (p, c) = fen("4k1r1/8/8/8/8/8/8/4K2R w K - 0 1");
        assert!(!legal_moves(&p, c).contains(&Move::castling(Color::White, CastleSide::King)));

        // In check.
        let (p, c) = fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(legal_moves(&p, c).iter().all(|m| m.castle.is_none()));
    }

    #[test]
    fn queenside_needs_b_file_empty_but_not_safe() {
        // b1 attacked but not crossed by the king: castling allowed.
        let (p, c) = fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(legal_moves(&p, c).contains(&Move::castling(Color::White, CastleSide::Queen)));
        // b1 occupied: not allowed.
        let (p, c) = fen("4k3/8/8/8/8/8/8/RN2K3 w Q - 0 1");
        assert!(!legal_moves(&p, c).contains(&Move::castling(Color::White, CastleSide::Queen)));
    }

    #[test]
    fn promotions_expand_to_four() {
        let (p, c) = fen("3r3k/2P5/8/8/8/8/8/4K3 w - - 0 1");
        let promos: Vec<Move> = legal_moves_from(&p, Square::C7).iter().copied().collect();
        assert_eq!(promos.len(), 8);
        assert_eq!(promos.iter().filter(|m| m.capture).count(), 4);
        assert!(promos.iter().all(|m| m.promotion.is_some()));
        assert_eq!(c, Color::White);
    }

    #[test]
    fn en_passant_is_generated_only_for_the_target() {
        let (p, c) = fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        let moves = legal_moves_from(&p, Square::E5);
        let ep = Move::new(Square::E5, Square::D6, Piece::Pawn).capturing();
        assert!(moves.contains(&ep));
        assert_eq!(moves.len(), 2);
        assert_eq!(c, Color::White);

        let (p, _) = fen("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 1");
        assert_eq!(legal_moves_from(&p, Square::E5).len(), 1);
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        let (p, _) = fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(legal_moves_from(&p, Square::E2).is_empty());
    }

    #[test]
    fn enemy_king_is_never_a_target() {
        let (p, _) = fen("R6k/8/8/8/8/8/8/4K3 w - - 0 1");
        assert!(legal_moves(&p, Color::White)
            .iter()
            .all(|m| Some(m.to) != p.king_square(Color::Black)));
    }
}
