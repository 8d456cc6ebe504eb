use std::sync::Arc;

use chess_engine::Game;
use chess_openings::OpeningBook;
use chess_search::{Engine, SearchConfig, SearchControl, SearchOutcome, SearchRequest};

/// Walks every line of `book`, playing each recorded move in a real game.
fn check_lines(book: &OpeningBook, game: &mut Game, lines: &mut usize) {
    let continuations = book.continuations(&game.moves());
    if continuations.is_empty() {
        *lines += 1;
        return;
    }
    for key in continuations {
        let mv = game
            .legal_moves()
            .iter()
            .copied()
            .find(|mv| key.matches(mv))
            .unwrap_or_else(|| panic!("{key} is illegal after {:?}", game.moves()));
        game.commit(mv).unwrap();
        check_lines(book, game, lines);
        game.undo(1);
    }
}

#[test]
fn every_builtin_line_is_legal() {
    let book = OpeningBook::builtin().unwrap();
    let mut lines = 0;
    check_lines(&book, &mut Game::new(), &mut lines);
    assert!(lines > 10);
}

#[test]
fn engine_follows_the_builtin_book() {
    let book = Arc::new(OpeningBook::builtin().unwrap());
    let config = SearchConfig {
        book_delay_ms: 0,
        seed: Some(11),
        depth_limit: 1,
        time_limit_ms: 0,
        ..SearchConfig::default()
    };
    let mut engine = Engine::new(config, Arc::clone(&book));
    let mut game = Game::new();
    let (tx, _rx) = crossbeam_channel::unbounded();

    for _ in 0..4 {
        let expected = book.continuations(&game.moves());
        if expected.is_empty() {
            break;
        }
        let control = SearchControl::new();
        let outcome = engine.think(&SearchRequest::from_game(&game), &control, &tx);
        let SearchOutcome::Book(mv) = outcome else {
            panic!("expected a book move, got {outcome:?}");
        };
        assert!(expected.iter().any(|key| key.matches(&mv)));
        game.commit(mv).unwrap();
    }
}
