//! The computer player.
//!
//! This crate layers move selection on top of `chess-engine`:
//!
//! - [`StaticEvaluator`] scores leaf positions.
//! - [`Searcher`] runs negamax with alpha-beta pruning to a fixed depth.
//! - [`Engine`] consults the [`OpeningBook`](chess_openings::OpeningBook),
//!   then deepens the search until its depth or time budget runs out.
//! - [`Thinker`] runs an engine request on a background thread.
//! - [`GameController`] owns the game, applies finished searches on the
//!   control thread and publishes [`GameEvent`]s.
//!
//! ```no_run
//! use std::sync::Arc;
//! use chess_openings::OpeningBook;
//! use chess_search::{Difficulty, Engine, GameController, SearchConfig};
//!
//! let book = Arc::new(OpeningBook::builtin().expect("built-in book"));
//! let engine = Engine::new(SearchConfig::for_difficulty(Difficulty::Easy), book);
//! let mut controller = GameController::new(engine);
//! controller.start_thinking().unwrap();
//! let outcome = controller.wait().unwrap();
//! println!("{outcome:?}");
//! ```

mod config;
mod control;
mod controller;
mod engine;
mod eval;
mod search;
mod thinker;

pub use config::{ConfigError, Difficulty, SearchConfig};
pub use control::SearchControl;
pub use controller::{ControllerError, GameController, GameEvent};
pub use engine::{Engine, SearchEvent, SearchOutcome, SearchRequest};
pub use eval::{StaticEvaluator, ENDGAME_MATERIAL, PAWN_SCORE};
pub use search::{
    repeats_shuffle, terminal_score, Cancelled, RootBest, Searcher, INFINITY, MATE_DEPTH_BONUS,
    MATE_SCORE, REPETITION_PENALTY, STALEMATE_SCORE,
};
pub use thinker::{Disconnected, RequestKind, Thinker};
