//! Textual codec for persisted satchels.
//!
//! A satchel is stored as a list of single-element string tuples:
//!
//! ```text
//! (("/abs/path/one") ("/abs/path/two"))
//! ```
//!
//! `nil`, `()` and blank input all decode to the empty list.

use std::fmt;

use chumsky::prelude::*;

use crate::domain::model::Entry;

/// Failure to decode persisted satchel text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub offset: usize,
    pub message: String,
}

impl DecodeError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.offset)
    }
}

impl std::error::Error for DecodeError {}

/// Render entries in order. The empty list renders as `nil`.
pub fn encode(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return "nil\n".to_owned();
    }

    let tuples: Vec<String> = entries
        .iter()
        .map(|entry| format!("({})", quote(entry.as_str())))
        .collect();
    format!("({})\n", tuples.join(" "))
}

/// Parse persisted text into entries, preserving order. Duplicates are returned as found.
pub fn decode(input: &str) -> Result<Vec<Entry>, DecodeError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    parser().parse(input).map_err(|errors| {
        errors
            .into_iter()
            .next()
            .map(|err| DecodeError::new(err.span().start, err.to_string()))
            .unwrap_or_else(|| DecodeError::new(0, "unparseable satchel"))
    })
}

fn parser() -> impl Parser<char, Vec<Entry>, Error = Simple<char>> {
    let escape = just('\\').ignore_then(any().map(|ch| match ch {
        'n' => '\n',
        't' => '\t',
        other => other,
    }));

    let string = just('"')
        .ignore_then(
            filter(|ch: &char| !matches!(*ch, '"' | '\\'))
                .or(escape)
                .repeated(),
        )
        .then_ignore(just('"'))
        .collect::<String>()
        .labelled("string");

    let tuple = string
        .padded()
        .delimited_by(just('('), just(')'))
        .map(Entry::new)
        .labelled("(\"path\") tuple");

    let list = tuple
        .padded()
        .repeated()
        .delimited_by(just('('), just(')'));
    let nil = text::keyword("nil").to(Vec::new());

    choice((list, nil)).padded().then_ignore(end())
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if matches!(ch, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
