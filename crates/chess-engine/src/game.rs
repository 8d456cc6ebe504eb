//! Authoritative game record: current position, side to move and history.

use chess_core::{Color, CoordinateError, Move, MoveEffect, Piece, Square};
use thiserror::Error;

use crate::{
    apply_move, classify, is_in_check, legal_moves, legal_moves_from, FenError, GameState,
    MoveList, Position,
};

/// A committed move together with what it did and the position it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub mv: Move,
    pub effect: MoveEffect,
    pub position: Position,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("the game is over ({0})")]
    GameOver(GameState),

    #[error("illegal move {0}")]
    IllegalMove(Move),
}

/// A game in progress.
///
/// Unlike [`Position`], which is a single board snapshot, `Game` tracks the
/// side to move, the full move history and the resulting game state.
#[derive(Debug, Clone)]
pub struct Game {
    initial: Position,
    initial_to_move: Color,
    position: Position,
    to_move: Color,
    history: Vec<HistoryEntry>,
    state: GameState,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A game from the standard starting layout.
    pub fn new() -> Self {
        Self::from_position(Position::new_game(), Color::White)
    }

    /// A game from an arbitrary position. The state is classified immediately.
    pub fn from_position(position: Position, to_move: Color) -> Self {
        Game {
            initial: position,
            initial_to_move: to_move,
            position,
            to_move,
            history: Vec::new(),
            state: classify(&position, to_move, &[]),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let (position, to_move) = Position::from_fen(fen)?;
        Ok(Self::from_position(position, to_move))
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.to_move
    }

    /// The side to move, or `None` once the game is over.
    pub fn turn(&self) -> Option<Color> {
        (!self.state.is_terminal()).then_some(self.to_move)
    }

    #[inline]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[inline]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The moves played so far, oldest first.
    pub fn moves(&self) -> Vec<Move> {
        self.history.iter().map(|e| e.mv).collect()
    }

    pub fn last_move(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    /// Legal moves for the side to move. Empty once the game is over.
    pub fn legal_moves(&self) -> MoveList {
        if self.state.is_terminal() {
            return MoveList::new();
        }
        legal_moves(&self.position, self.to_move)
    }

    /// Legal moves of the piece on `from`, if it belongs to the side to move.
    pub fn legal_moves_from(&self, from: Square) -> MoveList {
        match self.position.piece_at(from) {
            Some((color, _)) if color == self.to_move && !self.state.is_terminal() => {
                legal_moves_from(&self.position, from)
            }
            _ => MoveList::new(),
        }
    }

    pub fn is_in_check(&self) -> bool {
        is_in_check(&self.position, self.to_move)
    }

    /// Looks up the legal move between two squares.
    ///
    /// A promotion left unspecified is read as a queen promotion.
    pub fn find_move(&self, from: Square, to: Square, promotion: Option<Piece>) -> Option<Move> {
        let wanted = promotion.or(Some(Piece::Queen));
        self.legal_moves_from(from)
            .iter()
            .copied()
            .filter(|m| m.to == to)
            .find(|m| m.promotion.is_none() || m.promotion == wanted)
    }

    /// Validates and, unless `validate_only`, plays a move given by raw
    /// file and rank indices.
    pub fn make_move_at(
        &mut self,
        from: (i32, i32),
        to: (i32, i32),
        promotion: Option<Piece>,
        validate_only: bool,
    ) -> Result<bool, CoordinateError> {
        let from = Square::new(from.0, from.1)?;
        let to = Square::new(to.0, to.1)?;
        self.make_move(from, to, promotion, validate_only)
    }

    /// Validates and, unless `validate_only`, plays the move from `from` to `to`.
    ///
    /// Returns `Ok(false)` without touching the game if there is no piece of
    /// the side to move on `from`, the game is over, or the move is not legal.
    /// Identical squares are a coordinate error.
    pub fn make_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
        validate_only: bool,
    ) -> Result<bool, CoordinateError> {
        if from == to {
            return Err(CoordinateError::SameSquare(from));
        }
        if self.state.is_terminal() {
            return Ok(false);
        }
        match self.position.piece_at(from) {
            Some((color, _)) if color == self.to_move => {}
            _ => return Ok(false),
        }
        if self.position.side(self.to_move).occupied().contains(to) {
            return Ok(false);
        }
        let Some(mv) = self.find_move(from, to, promotion) else {
            return Ok(false);
        };
        if !validate_only {
            self.push(mv);
        }
        Ok(true)
    }

    /// Plays a move produced by the generator or the search.
    pub fn commit(&mut self, mv: Move) -> Result<MoveEffect, GameError> {
        if self.state.is_terminal() {
            return Err(GameError::GameOver(self.state));
        }
        if !legal_moves(&self.position, self.to_move).contains(&mv) {
            return Err(GameError::IllegalMove(mv));
        }
        Ok(self.push(mv))
    }

    fn push(&mut self, mv: Move) -> MoveEffect {
        let (position, effect) = apply_move(&self.position, self.to_move, &mv);
        self.history.push(HistoryEntry {
            mv,
            effect,
            position,
        });
        self.position = position;
        self.to_move = self.to_move.opponent();
        self.state = classify(&self.position, self.to_move, &self.moves());
        effect
    }

    /// Takes back up to `count` moves and returns how many were removed.
    pub fn undo(&mut self, count: usize) -> usize {
        let removed = count.min(self.history.len());
        self.history.truncate(self.history.len() - removed);
        match self.history.last() {
            Some(entry) => {
                self.position = entry.position;
                self.to_move = entry.effect.moved_by.opponent();
            }
            None => {
                self.position = self.initial;
                self.to_move = self.initial_to_move;
            }
        }
        self.state = classify(&self.position, self.to_move, &self.moves());
        removed
    }
}
