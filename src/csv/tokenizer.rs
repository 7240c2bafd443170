//! Single-line field tokenizer.
//!
//! Grammar: a field is either a double-quoted run (everything up to the next
//! quote, no escape sequences) or a bare run of non-comma characters. Fields
//! are separated by commas and surrounding whitespace is trimmed. Anything
//! else is rejected so that a single malformed line can abort a whole import.

use super::CsvErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first character of a field; leading whitespace is skipped.
    FieldStart,
    Bare,
    Quoted,
    /// After a closing quote; only whitespace may precede the separator.
    AfterQuote,
}

/// Splits one CSV line into trimmed field values.
pub fn tokenize_line(line: &str) -> Result<Vec<String>, CsvErrorKind> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut state = State::FieldStart;

    for ch in line.chars() {
        state = match (state, ch) {
            (State::FieldStart, ',') => {
                fields.push(String::new());
                State::FieldStart
            }
            (State::FieldStart, '"') => State::Quoted,
            (State::FieldStart, c) if c.is_whitespace() => State::FieldStart,
            (State::FieldStart, c) => {
                current.push(c);
                State::Bare
            }
            (State::Bare, ',') => {
                fields.push(current.trim().to_string());
                current.clear();
                State::FieldStart
            }
            (State::Bare, '"') => return Err(CsvErrorKind::UnexpectedQuote),
            (State::Bare, c) => {
                current.push(c);
                State::Bare
            }
            (State::Quoted, '"') => State::AfterQuote,
            (State::Quoted, c) => {
                current.push(c);
                State::Quoted
            }
            (State::AfterQuote, ',') => {
                fields.push(current.trim().to_string());
                current.clear();
                State::FieldStart
            }
            (State::AfterQuote, c) if c.is_whitespace() => State::AfterQuote,
            (State::AfterQuote, _) => return Err(CsvErrorKind::TrailingCharacters),
        };
    }

    match state {
        State::Quoted => Err(CsvErrorKind::UnterminatedQuote),
        State::FieldStart if fields.is_empty() => Ok(fields),
        _ => {
            fields.push(current.trim().to_string());
            Ok(fields)
        }
    }
}
