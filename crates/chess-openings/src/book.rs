//! The opening trie.

use std::path::Path;

use chess_core::{Move, MoveKey};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::format::{parse_move_id, Event, Reader};
use crate::BookError;

const BUILTIN: &str = include_str!("../data/openings.xml");

#[derive(Debug, Clone, Default)]
struct Node {
    children: Vec<(MoveKey, usize)>,
}

/// A tree of known opening lines.
///
/// Each node maps the moves recorded after a sequence to the node for the
/// longer sequence. Read-only once loaded; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct OpeningBook {
    nodes: Vec<Node>,
}

impl Default for OpeningBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OpeningBook {
    /// A book with no lines. Lookups always return `None`.
    pub fn new() -> Self {
        OpeningBook {
            nodes: vec![Node::default()],
        }
    }

    /// The book shipped with the crate.
    pub fn builtin() -> Result<Self, BookError> {
        Self::parse(BUILTIN)
    }

    /// Reads a book file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BookError> {
        let path = path.as_ref();
        let book = Self::parse(&std::fs::read_to_string(path)?)?;
        debug!(path = %path.display(), positions = book.len(), "loaded opening book");
        Ok(book)
    }

    /// Parses book markup.
    pub fn parse(src: &str) -> Result<Self, BookError> {
        let mut book = OpeningBook::new();
        let mut reader = Reader::new(src);

        match reader.next_event()? {
            Some(Event::Open { name, empty, .. }) if name == "moves" => {
                if empty {
                    return book.finish(&mut reader);
                }
            }
            Some(Event::Open { name, .. }) | Some(Event::Close { name, .. }) => {
                return Err(BookError::Root(name));
            }
            None => return Err(BookError::Empty),
        }

        // Trie node of every open <move>, innermost last.
        let mut open = vec![0usize];
        loop {
            let event = reader
                .next_event()?
                .ok_or_else(|| BookError::Unclosed(element_name(open.len()).to_string()))?;
            match event {
                Event::Open {
                    name,
                    id,
                    empty,
                    line,
                } if name == "move" => {
                    let id = id.ok_or(BookError::MissingId { line })?;
                    let key = parse_move_id(&id, line)?;
                    let parent = open.last().copied().unwrap_or(0);
                    let child = book.child_or_insert(parent, key);
                    if !empty {
                        open.push(child);
                    }
                }
                Event::Open { name, line, .. } => {
                    return Err(BookError::UnexpectedElement { line, name });
                }
                Event::Close { name, line } => {
                    let expected = element_name(open.len());
                    if name != expected {
                        return Err(BookError::MismatchedClose {
                            line,
                            expected: expected.to_string(),
                            found: name,
                        });
                    }
                    open.pop();
                    if open.is_empty() {
                        return book.finish(&mut reader);
                    }
                }
            }
        }
    }

    fn finish(self, reader: &mut Reader<'_>) -> Result<Self, BookError> {
        match reader.next_event()? {
            None => Ok(self),
            Some(Event::Open { name, line, .. }) | Some(Event::Close { name, line }) => {
                Err(BookError::UnexpectedElement { line, name })
            }
        }
    }

    fn child(&self, node: usize, key: &MoveKey) -> Option<usize> {
        self.nodes[node]
            .children
            .iter()
            .find(|(k, _)| k == key)
            .map(|&(_, child)| child)
    }

    fn child_or_insert(&mut self, node: usize, key: MoveKey) -> usize {
        if let Some(child) = self.child(node, &key) {
            return child;
        }
        let child = self.nodes.len();
        self.nodes.push(Node::default());
        self.nodes[node].children.push((key, child));
        child
    }

    /// Adds one line of play from the start position.
    pub fn insert_line(&mut self, line: &[MoveKey]) {
        let mut node = 0;
        for &key in line {
            node = self.child_or_insert(node, key);
        }
    }

    /// Number of positions the book knows a continuation for, or has reached.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// The recorded replies after `history`, or an empty list once play has
    /// left the book.
    pub fn continuations(&self, history: &[Move]) -> Vec<MoveKey> {
        self.walk(history)
            .map(|node| self.nodes[node].children.iter().map(|(k, _)| *k).collect())
            .unwrap_or_default()
    }

    /// Picks one recorded reply after `history` uniformly at random.
    pub fn lookup<R: Rng + ?Sized>(&self, history: &[Move], rng: &mut R) -> Option<MoveKey> {
        let node = self.walk(history)?;
        self.nodes[node].children.choose(rng).map(|(k, _)| *k)
    }

    fn walk(&self, history: &[Move]) -> Option<usize> {
        history
            .iter()
            .try_fold(0, |node, mv| self.child(node, &mv.key()))
    }
}

fn element_name(depth: usize) -> &'static str {
    if depth <= 1 {
        "moves"
    } else {
        "move"
    }
}
