//! CSV interchange: export a ledger snapshot and parse an import file into
//! ready-to-append records.
//!
//! Import is all-or-nothing. [`parse`] either returns every record of the file
//! or the first error it met, so callers never see a partial batch.

pub mod tokenizer;

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::currency::fits_minor_units;
use crate::ledger::contribution::parse_positive_amount;
use crate::ledger::{Contribution, Currency, Method};

pub use tokenizer::tokenize_line;

pub const HEADER: [&str; 6] = ["Name", "Method", "Currency", "Amount", "Remark", "Date"];

/// Default file name offered for exports.
pub const EXPORT_FILE_NAME: &str = "contributions.csv";

/// Why a line could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvErrorKind {
    UnterminatedQuote,
    UnexpectedQuote,
    TrailingCharacters,
    MissingField(&'static str),
    EmptyName,
    InvalidMethod(String),
    InvalidCurrency(String),
    InvalidAmount(String),
    InvalidDate(String),
}

impl fmt::Display for CsvErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvErrorKind::UnterminatedQuote => f.write_str("unterminated quoted field"),
            CsvErrorKind::UnexpectedQuote => f.write_str("quote inside an unquoted field"),
            CsvErrorKind::TrailingCharacters => {
                f.write_str("unexpected characters after a closing quote")
            }
            CsvErrorKind::MissingField(column) => write!(f, "missing `{column}` column"),
            CsvErrorKind::EmptyName => f.write_str("name is empty"),
            CsvErrorKind::InvalidMethod(raw) => write!(f, "unknown payment method `{raw}`"),
            CsvErrorKind::InvalidCurrency(raw) => write!(f, "unknown currency `{raw}`"),
            CsvErrorKind::InvalidAmount(raw) => {
                write!(f, "`{raw}` is not a positive amount in whole riel or cents")
            }
            CsvErrorKind::InvalidDate(raw) => write!(f, "`{raw}` is not an RFC 3339 timestamp"),
        }
    }
}

/// First failure of an import, with its 1-based line number in the file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("CSV line {line}: {kind}")]
pub struct CsvError {
    pub line: usize,
    pub kind: CsvErrorKind,
}

/// Serializes the snapshot in insertion order. Every field is quoted; quotes
/// inside values are written as-is.
pub fn export(snapshot: &[Contribution]) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADER.iter().map(|column| column.to_string()));
    for record in snapshot {
        push_row(
            &mut out,
            [
                record.name.clone(),
                record.method.to_string(),
                record.currency.to_string(),
                record.amount.to_string(),
                record.remark.clone(),
                format_timestamp(record.created_at),
            ],
        );
    }
    out
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let quoted: Vec<String> = fields
        .into_iter()
        .map(|value| format!("\"{value}\""))
        .collect();
    out.push_str(&quoted.join(","));
    out.push('\n');
}

/// Normalized absolute timestamp used in the `Date` column.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an import file. The first line is treated as a header and blank lines
/// are skipped. Rows without a `Date` value are stamped with `now`.
pub fn parse(text: &str, now: DateTime<Utc>) -> Result<Vec<Contribution>, CsvError> {
    let mut records = Vec::new();
    for (index, raw_line) in text.split('\n').enumerate().skip(1) {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        if line.trim().is_empty() {
            continue;
        }
        let record = parse_row(line, now).map_err(|kind| CsvError {
            line: index + 1,
            kind,
        })?;
        records.push(record);
    }
    Ok(records)
}

fn parse_row(line: &str, now: DateTime<Utc>) -> Result<Contribution, CsvErrorKind> {
    let fields = tokenize_line(line)?;
    let column = |index: usize| {
        fields
            .get(index)
            .map(String::as_str)
            .ok_or(CsvErrorKind::MissingField(HEADER[index]))
    };

    let name = column(0)?;
    if name.is_empty() {
        return Err(CsvErrorKind::EmptyName);
    }
    let method_raw = column(1)?;
    let method: Method = method_raw
        .parse()
        .map_err(|_| CsvErrorKind::InvalidMethod(method_raw.to_string()))?;
    let currency_raw = column(2)?;
    let currency: Currency = currency_raw
        .parse()
        .map_err(|_| CsvErrorKind::InvalidCurrency(currency_raw.to_string()))?;
    let amount_raw = column(3)?;
    let amount = parse_positive_amount(amount_raw)
        .filter(|amount| fits_minor_units(*amount, currency))
        .ok_or_else(|| CsvErrorKind::InvalidAmount(amount_raw.to_string()))?;
    let remark = fields.get(4).cloned().unwrap_or_default();
    let created_at = match fields.get(5).map(String::as_str) {
        None | Some("") => now,
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|stamp| stamp.with_timezone(&Utc))
            .map_err(|_| CsvErrorKind::InvalidDate(raw.to_string()))?,
    };

    Ok(Contribution {
        id: Uuid::new_v4(),
        name: name.to_string(),
        method,
        currency,
        amount,
        remark,
        created_at,
    })
}
