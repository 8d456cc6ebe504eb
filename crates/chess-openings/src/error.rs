use thiserror::Error;

/// Errors raised while loading an opening book.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("failed to read opening book: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: invalid move id {id:?}")]
    MoveId { line: usize, id: String },

    #[error("line {line}: <move> element has no id attribute")]
    MissingId { line: usize },

    #[error("line {line}: expected </{expected}>, found </{found}>")]
    MismatchedClose {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("root element must be <moves>, found <{0}>")]
    Root(String),

    #[error("line {line}: unexpected <{name}> element")]
    UnexpectedElement { line: usize, name: String },

    #[error("book ended before <{0}> was closed")]
    Unclosed(String),

    #[error("book has no <moves> element")]
    Empty,
}
