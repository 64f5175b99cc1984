use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{
    Catalog, CleanedRecord, RawRecord, ACTUAL_PRICE_COLUMN, DISCOUNTED_PRICE_COLUMN,
    DISCOUNT_PERCENTAGE_COLUMN,
};

/// Currency symbol stripped from price cells.
pub const CURRENCY_SYMBOL: char = '₹';
/// Thousands separator stripped from price cells.
pub const THOUSANDS_SEPARATOR: char = ',';
/// Delimiter between levels of the category hierarchy.
pub const CATEGORY_DELIMITER: char = '|';
/// Ratings are read from at most this many leading characters.
pub const RATING_PREFIX_CHARS: usize = 3;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a single field could not be turned into a number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CleanError {
    #[error("{field} is empty")]
    Missing { field: &'static str },

    #[error("{field}: '{text}' is not a number")]
    NotANumber { field: &'static str, text: String },

    #[error("{field}: '{text}' is not finite")]
    NotFinite { field: &'static str, text: String },

    #[error("{field}: '{text}' is negative")]
    Negative { field: &'static str, text: String },
}

/// A record that failed cleaning, identified by its position in the input.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: {source}")]
pub struct RowError {
    pub row: usize,
    #[source]
    pub source: CleanError,
}

/// What to do with a record whose price or discount cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedRowPolicy {
    /// Drop the record, log it and keep it in `Catalog::rejected`.
    #[default]
    Skip,
    /// Abort the whole load on the first malformed record.
    Fail,
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

/// Parse a price such as `₹1,999` into `1999.0`.
///
/// Every currency symbol and thousands separator is removed before parsing.
/// Empty, non-numeric, non-finite and negative values are errors; a price is
/// never coerced to zero.
pub fn parse_price(field: &'static str, text: &str) -> Result<f64, CleanError> {
    let stripped: String = text
        .chars()
        .filter(|&c| c != CURRENCY_SYMBOL && c != THOUSANDS_SEPARATOR)
        .collect();
    let value = parse_number(field, stripped.trim(), text)?;
    if value < 0.0 {
        return Err(CleanError::Negative {
            field,
            text: text.to_string(),
        });
    }
    Ok(value)
}

/// Parse a discount such as `20%` into `20.0`.
pub fn parse_percentage(field: &'static str, text: &str) -> Result<f64, CleanError> {
    let trimmed = text.trim();
    let body = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    parse_number(field, body, text)
}

fn parse_number(field: &'static str, body: &str, original: &str) -> Result<f64, CleanError> {
    if body.is_empty() {
        return Err(CleanError::Missing { field });
    }
    let value: f64 = body.parse().map_err(|_| CleanError::NotANumber {
        field,
        text: original.to_string(),
    })?;
    if !value.is_finite() {
        return Err(CleanError::NotFinite {
            field,
            text: original.to_string(),
        });
    }
    Ok(value)
}

/// Best-effort rating parse.
///
/// Only the first [`RATING_PREFIX_CHARS`] characters are considered, and the
/// whole trimmed window must be a finite number. Anything else is `None`:
/// `"4.2 out of 5"` → `Some(4.2)`, `"4,2"` → `None`, `"|"` → `None`.
pub fn parse_rating(text: &str) -> Option<f64> {
    let window: String = text.chars().take(RATING_PREFIX_CHARS).collect();
    window
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Top level of a pipe-delimited category; the whole string when there is no `|`.
pub fn main_category(category: &str) -> &str {
    category
        .split(CATEGORY_DELIMITER)
        .next()
        .unwrap_or(category)
}

// ---------------------------------------------------------------------------
// Record / set cleaning
// ---------------------------------------------------------------------------

/// Clean a single raw record.
pub fn clean_record(raw: RawRecord) -> Result<CleanedRecord, CleanError> {
    let discounted_price = parse_price(DISCOUNTED_PRICE_COLUMN, &raw.discounted_price)?;
    let actual_price = parse_price(ACTUAL_PRICE_COLUMN, &raw.actual_price)?;
    let discount_percentage =
        parse_percentage(DISCOUNT_PERCENTAGE_COLUMN, &raw.discount_percentage)?;
    let clean_rating = parse_rating(&raw.rating);

    Ok(CleanedRecord {
        main_category: main_category(&raw.category).to_string(),
        category: raw.category,
        discounted_price,
        actual_price,
        discount_percentage,
        clean_rating,
        extra: raw.extra,
    })
}

/// Clean a whole raw record set into a [`Catalog`].
///
/// Records keep their input order. Malformed rows are handled per `policy`:
/// skipped rows are logged and kept in [`Catalog::rejected`].
pub fn load_and_clean(
    raw_records: Vec<RawRecord>,
    policy: MalformedRowPolicy,
) -> Result<Catalog, RowError> {
    let mut records = Vec::with_capacity(raw_records.len());
    let mut rejected = Vec::new();

    for (row, raw) in raw_records.into_iter().enumerate() {
        match clean_record(raw) {
            Ok(rec) => records.push(rec),
            Err(source) => {
                let err = RowError { row, source };
                match policy {
                    MalformedRowPolicy::Fail => return Err(err),
                    MalformedRowPolicy::Skip => {
                        log::warn!("Skipping malformed record: {err}");
                        rejected.push(err);
                    }
                }
            }
        }
    }

    log::debug!(
        "Cleaned {} records ({} rejected)",
        records.len(),
        rejected.len()
    );
    Ok(Catalog::from_records(records, rejected))
}
