//! Iterative deepening over the alpha-beta searcher, with the opening book
//! consulted first.

use std::sync::Arc;
use std::time::Instant;

use chess_core::{Color, Move};
use chess_engine::{legal_moves, Game, Position};
use chess_openings::OpeningBook;
use crossbeam_channel::Sender;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::control::{SearchControl, Timer};
use crate::eval::StaticEvaluator;
use crate::search::{RootBest, Searcher};

/// A snapshot of the game for the engine to think about.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub position: Position,
    pub to_move: Color,
    pub history: Vec<Move>,
}

impl SearchRequest {
    pub fn from_game(game: &Game) -> Self {
        SearchRequest {
            position: *game.position(),
            to_move: game.side_to_move(),
            history: game.moves(),
        }
    }
}

/// How a search request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A recorded continuation of the opening book.
    Book(Move),
    /// The best move of the deepest completed iteration.
    Best { mv: Move, score: i32, depth: u32 },
    /// Time ran out before the first iteration completed.
    Fallback(Move),
    /// The side to move has no legal moves.
    NoMoves,
    /// The request was aborted. Nothing may be played.
    Cancelled,
}

impl SearchOutcome {
    /// The move to play, if any.
    pub fn chosen(&self) -> Option<Move> {
        match *self {
            SearchOutcome::Book(mv)
            | SearchOutcome::Best { mv, .. }
            | SearchOutcome::Fallback(mv) => Some(mv),
            SearchOutcome::NoMoves | SearchOutcome::Cancelled => None,
        }
    }
}

/// Messages a running search sends to the control thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent {
    /// A root candidate about to be searched.
    Considered(Move),
    /// Percentage of root candidates examined in the current iteration.
    Progress(u8),
    Finished(SearchOutcome),
}

/// The computer player: configuration, book and the state it carries from
/// one request to the next.
pub struct Engine {
    config: SearchConfig,
    book: Arc<OpeningBook>,
    evaluator: StaticEvaluator,
    rng: StdRng,
    visualize_depth: Option<u32>,
}

impl Engine {
    pub fn new(config: SearchConfig, book: Arc<OpeningBook>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Engine {
            config,
            book,
            evaluator: StaticEvaluator,
            rng,
            visualize_depth: None,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = config;
    }

    /// The first depth whose iteration took longer than the consider
    /// threshold. Root candidates are reported from this depth on.
    pub fn visualize_depth(&self) -> Option<u32> {
        self.visualize_depth
    }

    fn reports_candidates(&self, depth: u32) -> bool {
        match self.visualize_depth {
            Some(threshold) => depth >= threshold,
            None => depth > 2,
        }
    }

    /// Picks a move for the side to move in `request`.
    ///
    /// Runs on the calling thread. `control` may stop or abort it from
    /// elsewhere; an aborted request always ends in
    /// [`SearchOutcome::Cancelled`].
    pub fn think(
        &mut self,
        request: &SearchRequest,
        control: &Arc<SearchControl>,
        events: &Sender<SearchEvent>,
    ) -> SearchOutcome {
        control.set_progress(0);

        if let Some(mv) = self.book_move(request) {
            info!(mv = %mv, "playing book move");
            return if control.wait_unless_aborted(self.config.book_delay()) {
                SearchOutcome::Book(mv)
            } else {
                SearchOutcome::Cancelled
            };
        }

        let mut candidates = legal_moves(&request.position, request.to_move);
        if candidates.is_empty() {
            return SearchOutcome::NoMoves;
        }

        let _timer = self
            .config
            .time_limit()
            .map(|budget| Timer::arm(budget, Arc::clone(control)));
        let evaluator = self.evaluator;
        let mut searcher = Searcher::new(&evaluator, control);
        let started = Instant::now();
        let mut best: Option<(RootBest, u32)> = None;

        for depth in 0..=self.config.depth_ceiling() {
            let report = self.reports_candidates(depth);
            let total = candidates.len();
            let mut last_percent = None;
            let iteration = Instant::now();

            let result = searcher.search_root(
                &request.position,
                request.to_move,
                candidates.as_slice(),
                depth,
                &request.history,
                |i, mv| {
                    if report {
                        let _ = events.send(SearchEvent::Considered(*mv));
                    }
                    let percent = (i * 100 / total) as u8;
                    if last_percent != Some(percent) {
                        last_percent = Some(percent);
                        control.set_progress(percent);
                        let _ = events.send(SearchEvent::Progress(percent));
                    }
                },
            );

            let elapsed = iteration.elapsed();
            if self.visualize_depth.is_none() && elapsed > self.config.consider_threshold() {
                self.visualize_depth = Some(depth);
            }

            match result {
                Ok(Some(found)) => {
                    debug!(
                        depth,
                        score = found.score,
                        best = %found.mv,
                        elapsed_ms = elapsed.as_millis() as u64,
                        nodes = searcher.nodes(),
                        "iteration complete"
                    );
                    candidates.move_to_front(&found.mv);
                    best = Some((found, depth));
                }
                Ok(None) | Err(_) => break,
            }
        }
        control.set_progress(100);

        if control.is_aborted() {
            debug!("search aborted");
            return SearchOutcome::Cancelled;
        }
        let outcome = match best {
            Some((found, depth)) => SearchOutcome::Best {
                mv: found.mv,
                score: found.score,
                depth,
            },
            None => match candidates.iter().next() {
                Some(&mv) => SearchOutcome::Fallback(mv),
                None => SearchOutcome::NoMoves,
            },
        };
        info!(
            outcome = ?outcome,
            nodes = searcher.nodes(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search finished"
        );
        outcome
    }

    /// A random book continuation, if it is legal in the actual position.
    fn book_move(&mut self, request: &SearchRequest) -> Option<Move> {
        let key = self.book.lookup(&request.history, &mut self.rng)?;
        let found = legal_moves(&request.position, request.to_move)
            .iter()
            .find(|mv| key.matches(mv))
            .copied();
        if found.is_none() {
            debug!(%key, "book move is not legal here");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{MoveKey, Square};
    use crossbeam_channel::unbounded;

    fn quick_config() -> SearchConfig {
        SearchConfig {
            depth_limit: 1,
            time_limit_ms: 0,
            book_delay_ms: 0,
            first_move_delay_ms: 0,
            seed: Some(1),
            ..SearchConfig::default()
        }
    }

    fn engine(config: SearchConfig) -> Engine {
        Engine::new(config, Arc::new(OpeningBook::new()))
    }

    fn think(engine: &mut Engine, game: &Game) -> (SearchOutcome, Vec<SearchEvent>) {
        let (tx, rx) = unbounded();
        let control = SearchControl::new();
        let outcome = engine.think(&SearchRequest::from_game(game), &control, &tx);
        drop(tx);
        (outcome, rx.iter().collect())
    }

    #[test]
    fn plays_mate_in_one() {
        let game = Game::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
        let (outcome, _) = think(&mut engine(quick_config()), &game);
        let mv = outcome.chosen().unwrap();
        assert_eq!((mv.from, mv.to), (Square::A1, Square::A8));
        assert!(matches!(outcome, SearchOutcome::Best { depth: 1, .. }));
    }

    #[test]
    fn terminal_position_has_no_moves() {
        let game = Game::from_fen("R5k1/5ppp/8/8/8/8/5PPP/6K1 b - - 1 1").unwrap();
        let (outcome, _) = think(&mut engine(quick_config()), &game);
        assert_eq!(outcome, SearchOutcome::NoMoves);
        assert_eq!(outcome.chosen(), None);
    }

    #[test]
    fn book_moves_come_first() {
        let mut book = OpeningBook::new();
        let e4: MoveKey = "e2e4".parse().unwrap();
        book.insert_line(&[e4]);
        let mut engine = Engine::new(quick_config(), Arc::new(book));
        let (outcome, events) = think(&mut engine, &Game::new());
        match outcome {
            SearchOutcome::Book(mv) => assert!(e4.matches(&mv)),
            other => panic!("expected a book move, got {other:?}"),
        }
        assert!(events.is_empty());
    }

    #[test]
    fn abort_interrupts_the_book_delay() {
        let mut book = OpeningBook::new();
        book.insert_line(&["e2e4".parse().unwrap()]);
        let config = SearchConfig {
            book_delay_ms: 60_000,
            ..quick_config()
        };
        let mut engine = Engine::new(config, Arc::new(book));
        let (tx, _rx) = unbounded();
        let control = SearchControl::new();
        let aborter = {
            let control = Arc::clone(&control);
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(20));
                control.abort();
            })
        };
        let started = Instant::now();
        let outcome = engine.think(&SearchRequest::from_game(&Game::new()), &control, &tx);
        aborter.join().unwrap();
        assert_eq!(outcome, SearchOutcome::Cancelled);
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[test]
    fn illegal_book_moves_are_ignored() {
        let mut book = OpeningBook::new();
        book.insert_line(&["e2e5".parse().unwrap()]);
        let mut engine = Engine::new(quick_config(), Arc::new(book));
        let (outcome, _) = think(&mut engine, &Game::new());
        assert!(matches!(outcome, SearchOutcome::Best { .. }));
    }

    #[test]
    fn progress_is_reported_per_iteration() {
        let (_, events) = think(&mut engine(quick_config()), &Game::new());
        let progress: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                SearchEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect();
        // Two iterations, each starting from zero.
        assert_eq!(progress.iter().filter(|&&p| p == 0).count(), 2);
        assert!(progress.iter().all(|&p| p < 100));
    }

    #[test]
    fn shallow_iterations_are_not_reported() {
        let (_, events) = think(&mut engine(quick_config()), &Game::new());
        assert!(!events
            .iter()
            .any(|e| matches!(e, SearchEvent::Considered(_))));
    }

    #[test]
    fn slow_iterations_set_the_visualize_depth() {
        let config = SearchConfig {
            consider_threshold_ms: 0,
            ..quick_config()
        };
        let mut engine = engine(config);
        let (_, events) = think(&mut engine, &Game::new());
        assert_eq!(engine.visualize_depth(), Some(0));
        // Depth 1 is at or past the visualize depth, so the 20 root moves
        // are reported there.
        let considered = events
            .iter()
            .filter(|e| matches!(e, SearchEvent::Considered(_)))
            .count();
        assert_eq!(considered, 20);
    }

    #[test]
    fn aborted_search_is_cancelled() {
        let game = Game::new();
        let (tx, _rx) = unbounded();
        let control = SearchControl::new();
        control.abort();
        let outcome = engine(quick_config()).think(&SearchRequest::from_game(&game), &control, &tx);
        assert_eq!(outcome, SearchOutcome::Cancelled);
    }

    #[test]
    fn stop_before_first_iteration_falls_back() {
        let game = Game::new();
        let (tx, _rx) = unbounded();
        let control = SearchControl::new();
        control.request_stop();
        let outcome = engine(quick_config()).think(&SearchRequest::from_game(&game), &control, &tx);
        let first = game.legal_moves().iter().next().copied().unwrap();
        assert_eq!(outcome, SearchOutcome::Fallback(first));
    }

    #[test]
    fn timer_bounds_an_unlimited_search() {
        let config = SearchConfig {
            depth_limit: 0,
            time_limit_ms: 200,
            max_depth: 64,
            ..quick_config()
        };
        let started = Instant::now();
        let (outcome, _) = think(&mut engine(config), &Game::new());
        assert!(outcome.chosen().is_some());
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }
}
