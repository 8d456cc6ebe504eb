//! Reader for the nested move-element book format.
//!
//! ```text
//! <moves>
//!   <move id="e2e4">
//!     <move id="e7e5"/>
//!     <move id="c7c5"/>
//!   </move>
//! </moves>
//! ```
//!
//! Each `id` is a move in coordinate notation; nesting expresses the replies.
//! Markup is tokenized by `quick-xml`. Declarations, comments and processing
//! instructions are skipped. Text content is not allowed.

use chess_core::MoveKey;
use quick_xml::events::{BytesStart, Event as XmlEvent};

use crate::BookError;

/// One element event, tagged with the line it ends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Open {
        name: String,
        id: Option<String>,
        empty: bool,
        line: usize,
    },
    Close {
        name: String,
        line: usize,
    },
}

/// Turns book markup into element events.
pub(crate) struct Reader<'a> {
    src: &'a str,
    xml: quick_xml::Reader<&'a [u8]>,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        let mut xml = quick_xml::Reader::from_str(src);
        let config = xml.config_mut();
        config.trim_text(true);
        // Nesting is checked by the book parser so it can name both tags.
        config.check_end_names = false;
        Reader { src, xml }
    }

    /// 1-based line of the reader's current offset.
    fn line(&self) -> usize {
        let offset = usize::try_from(self.xml.buffer_position()).unwrap_or(self.src.len());
        let consumed = self.src.get(..offset).unwrap_or(self.src);
        consumed.matches('\n').count() + 1
    }

    fn syntax(&self, message: impl Into<String>) -> BookError {
        BookError::Syntax {
            line: self.line(),
            message: message.into(),
        }
    }

    /// The next element event, or `None` at the end of input.
    pub(crate) fn next_event(&mut self) -> Result<Option<Event>, BookError> {
        loop {
            let event = match self.xml.read_event() {
                Ok(event) => event,
                Err(err) => return Err(self.syntax(err.to_string())),
            };
            let line = self.line();
            return match event {
                XmlEvent::Start(tag) => self.open(&tag, false, line).map(Some),
                XmlEvent::Empty(tag) => self.open(&tag, true, line).map(Some),
                XmlEvent::End(tag) => Ok(Some(Event::Close {
                    name: self.name(tag.name().as_ref())?,
                    line,
                })),
                XmlEvent::Text(text) if text.iter().all(u8::is_ascii_whitespace) => continue,
                XmlEvent::Text(_) | XmlEvent::CData(_) => {
                    Err(self.syntax("text content is not allowed"))
                }
                XmlEvent::Eof => Ok(None),
                _ => continue,
            };
        }
    }

    fn open(&self, tag: &BytesStart<'_>, empty: bool, line: usize) -> Result<Event, BookError> {
        let name = self.name(tag.name().as_ref())?;
        let id = match tag.try_get_attribute("id") {
            Ok(Some(attr)) => Some(
                attr.unescape_value()
                    .map_err(|err| self.syntax(err.to_string()))?
                    .into_owned(),
            ),
            Ok(None) => None,
            Err(err) => return Err(self.syntax(err.to_string())),
        };
        Ok(Event::Open {
            name,
            id,
            empty,
            line,
        })
    }

    fn name(&self, raw: &[u8]) -> Result<String, BookError> {
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| self.syntax("element name is not valid UTF-8"))
    }
}

/// Parses a move id such as `e2e4` or `e7e8q`.
pub(crate) fn parse_move_id(id: &str, line: usize) -> Result<MoveKey, BookError> {
    id.parse().map_err(|_| BookError::MoveId {
        line,
        id: id.to_string(),
    })
}
