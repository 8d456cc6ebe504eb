//! Opening book lookup.
//!
//! This crate provides the [`OpeningBook`] trie consulted by the computer
//! player before it searches, and the loader for the nested move-element
//! book format. A small book ships with the crate as
//! [`OpeningBook::builtin`].

mod book;
mod error;
mod format;

pub use book::OpeningBook;
pub use error::BookError;
