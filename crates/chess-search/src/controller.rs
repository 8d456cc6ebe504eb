//! Turn orchestration and notifications.
//!
//! [`GameController`] owns the authoritative [`Game`]. Human moves go straight
//! through it. Computer moves and hints run on a [`Thinker`], and their
//! results are applied only when the owner calls [`GameController::poll`] or
//! [`GameController::wait`], so the game is never touched off the control
//! thread.

use chess_core::{CoordinateError, Move, MoveEffect, Piece, Square};
use chess_engine::{Game, GameError, GameState};
use crossbeam_channel::{unbounded, Receiver, Sender};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::engine::{Engine, SearchEvent, SearchOutcome, SearchRequest};
use crate::thinker::{RequestKind, Thinker};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("a search is already running")]
    AlreadyThinking,

    #[error("the game is over ({0})")]
    GameOver(GameState),

    #[error(transparent)]
    Coordinate(#[from] CoordinateError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("the search thread stopped without a result")]
    SearchLost,
}

/// Notifications for whoever presents the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The computer is examining this root move.
    MoveConsidered(Move),
    MoveCommitted { mv: Move, effect: MoveEffect },
    /// The game state differs from before the last commit or undo.
    StateChanged(GameState),
    HintReady(Move),
    Undone { count: usize },
}

pub struct GameController {
    game: Game,
    engine: Option<Engine>,
    thinking: Option<Thinker>,
    events_tx: Sender<GameEvent>,
    events_rx: Receiver<GameEvent>,
}

impl GameController {
    pub fn new(engine: Engine) -> Self {
        Self::with_game(Game::new(), engine)
    }

    pub fn with_game(game: Game, engine: Engine) -> Self {
        let (events_tx, events_rx) = unbounded();
        GameController {
            game,
            engine: Some(engine),
            thinking: None,
            events_tx,
            events_rx,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// A receiver for [`GameEvent`]s. All receivers share one queue.
    pub fn subscribe(&self) -> Receiver<GameEvent> {
        self.events_rx.clone()
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking.is_some()
    }

    /// Progress of the running search, 0 to 100.
    pub fn progress(&self) -> Option<u8> {
        self.thinking.as_ref().map(|t| t.control().progress())
    }

    /// Plays a move for the side to move.
    ///
    /// `Ok(false)` means the move was refused and nothing changed. With
    /// `validate_only` a legal move is reported but not played.
    pub fn make_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
        validate_only: bool,
    ) -> Result<bool, ControllerError> {
        if self.thinking.is_some() {
            return Err(ControllerError::AlreadyThinking);
        }
        let before = self.game.state();
        let accepted = self.game.make_move(from, to, promotion, validate_only)?;
        if accepted && !validate_only {
            self.announce_commit(before);
        }
        Ok(accepted)
    }

    /// [`make_move`](Self::make_move) from raw file and rank indices.
    pub fn make_move_at(
        &mut self,
        from: (i32, i32),
        to: (i32, i32),
        promotion: Option<Piece>,
        validate_only: bool,
    ) -> Result<bool, ControllerError> {
        let from = Square::new(from.0, from.1)?;
        let to = Square::new(to.0, to.1)?;
        self.make_move(from, to, promotion, validate_only)
    }

    /// Takes back up to `count` moves, aborting any search first. Returns how
    /// many were removed.
    pub fn undo(&mut self, count: usize) -> usize {
        self.cancel();
        let before = self.game.state();
        let removed = self.game.undo(count);
        if removed > 0 {
            info!(removed, "undo");
            self.emit(GameEvent::Undone { count: removed });
            if self.game.state() != before {
                self.emit(GameEvent::StateChanged(self.game.state()));
            }
        }
        removed
    }

    /// Starts choosing a move for the side to move in the background.
    pub fn start_thinking(&mut self) -> Result<(), ControllerError> {
        self.start(RequestKind::Move)
    }

    /// Starts computing a suggestion for the side to move. The game is not
    /// changed; the move arrives as [`GameEvent::HintReady`].
    pub fn request_hint(&mut self) -> Result<(), ControllerError> {
        self.start(RequestKind::Hint)
    }

    /// Aborts the running request. Nothing will be committed for it.
    pub fn request_stop_thinking(&self) {
        if let Some(thinker) = &self.thinking {
            debug!(kind = ?thinker.kind(), "stop requested");
            thinker.control().abort();
        }
    }

    fn start(&mut self, kind: RequestKind) -> Result<(), ControllerError> {
        if self.thinking.is_some() {
            return Err(ControllerError::AlreadyThinking);
        }
        let state = self.game.state();
        if state.is_terminal() {
            return Err(ControllerError::GameOver(state));
        }
        let engine = self.engine.take().ok_or(ControllerError::SearchLost)?;
        debug!(?kind, to_move = %self.game.side_to_move(), "starting search");
        let request = SearchRequest::from_game(&self.game);
        self.thinking = Some(Thinker::spawn(engine, request, kind));
        Ok(())
    }

    /// Handles whatever the background search has sent so far, without
    /// blocking. Returns the outcome once the request has finished.
    pub fn poll(&mut self) -> Result<Option<SearchOutcome>, ControllerError> {
        loop {
            let Some(thinker) = &self.thinking else {
                return Ok(None);
            };
            let event = match thinker.try_event() {
                Ok(Some(event)) => event,
                Ok(None) => return Ok(None),
                Err(_) => return Err(self.lose_search()),
            };
            if let Some(outcome) = self.handle(event)? {
                return Ok(Some(outcome));
            }
        }
    }

    /// Blocks until the running request finishes and returns its outcome.
    /// `None` if nothing was running.
    pub fn wait(&mut self) -> Result<Option<SearchOutcome>, ControllerError> {
        loop {
            let Some(thinker) = &self.thinking else {
                return Ok(None);
            };
            let event = match thinker.next_event() {
                Ok(event) => event,
                Err(_) => return Err(self.lose_search()),
            };
            if let Some(outcome) = self.handle(event)? {
                return Ok(Some(outcome));
            }
        }
    }

    fn handle(&mut self, event: SearchEvent) -> Result<Option<SearchOutcome>, ControllerError> {
        match event {
            SearchEvent::Considered(mv) => {
                self.emit(GameEvent::MoveConsidered(mv));
                Ok(None)
            }
            SearchEvent::Progress(_) => Ok(None),
            SearchEvent::Finished(outcome) => {
                let Some(thinker) = self.thinking.take() else {
                    return Ok(None);
                };
                let kind = thinker.kind();
                let aborted = thinker.control().is_aborted();
                self.engine = Some(thinker.join().ok_or(ControllerError::SearchLost)?);
                if !aborted {
                    self.deliver(kind, outcome)?;
                }
                Ok(Some(outcome))
            }
        }
    }

    fn deliver(&mut self, kind: RequestKind, outcome: SearchOutcome) -> Result<(), ControllerError> {
        let Some(mv) = outcome.chosen() else {
            return Ok(());
        };
        match kind {
            RequestKind::Hint => self.emit(GameEvent::HintReady(mv)),
            RequestKind::Move => {
                let before = self.game.state();
                self.game.commit(mv)?;
                self.announce_commit(before);
            }
        }
        Ok(())
    }

    fn announce_commit(&self, before: GameState) {
        let Some(entry) = self.game.last_move() else {
            return;
        };
        info!(mv = %entry.mv, by = %entry.effect.moved_by, "move committed");
        self.emit(GameEvent::MoveCommitted {
            mv: entry.mv,
            effect: entry.effect,
        });
        let state = self.game.state();
        if state != before {
            info!(%state, "game state changed");
            self.emit(GameEvent::StateChanged(state));
        }
    }

    /// Aborts and joins any running request.
    fn cancel(&mut self) {
        if let Some(thinker) = self.thinking.take() {
            thinker.control().abort();
            match thinker.join() {
                Some(engine) => self.engine = Some(engine),
                None => warn!("search thread panicked"),
            }
        }
    }

    fn lose_search(&mut self) -> ControllerError {
        if let Some(thinker) = self.thinking.take() {
            if let Some(engine) = thinker.join() {
                self.engine = Some(engine);
                return ControllerError::SearchLost;
            }
        }
        warn!("search thread panicked");
        ControllerError::SearchLost
    }

    fn emit(&self, event: GameEvent) {
        // The controller holds a receiver itself, so this cannot fail.
        let _ = self.events_tx.send(event);
    }
}

impl Drop for GameController {
    fn drop(&mut self) {
        self.cancel();
    }
}
