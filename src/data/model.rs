use std::collections::{BTreeMap, HashSet};

use super::clean::RowError;

/// Names of the source columns the cleaning step depends on.
pub const CATEGORY_COLUMN: &str = "category";
pub const DISCOUNTED_PRICE_COLUMN: &str = "discounted_price";
pub const ACTUAL_PRICE_COLUMN: &str = "actual_price";
pub const DISCOUNT_PERCENTAGE_COLUMN: &str = "discount_percentage";
pub const RATING_COLUMN: &str = "rating";

pub const REQUIRED_COLUMNS: [&str; 5] = [
    CATEGORY_COLUMN,
    DISCOUNTED_PRICE_COLUMN,
    ACTUAL_PRICE_COLUMN,
    DISCOUNT_PERCENTAGE_COLUMN,
    RATING_COLUMN,
];

// ---------------------------------------------------------------------------
// RawRecord – one row as read from the source table
// ---------------------------------------------------------------------------

/// A catalog row before cleaning. Every field is the cell text as stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    /// Pipe-delimited hierarchy, e.g. `Electronics|Mobiles|Smartphones`.
    pub category: String,
    /// Currency-prefixed, thousands-separated, e.g. `₹1,999`.
    pub discounted_price: String,
    pub actual_price: String,
    /// Percent-suffixed, e.g. `20%`.
    pub discount_percentage: String,
    /// Usually `4.2`, occasionally junk such as `|`.
    pub rating: String,
    /// All other columns, passed through untouched.
    pub extra: BTreeMap<String, String>,
}

impl RawRecord {
    /// Assign a cell by column name. Unknown columns land in `extra`.
    pub fn set_column(&mut self, column: &str, value: String) {
        match column {
            CATEGORY_COLUMN => self.category = value,
            DISCOUNTED_PRICE_COLUMN => self.discounted_price = value,
            ACTUAL_PRICE_COLUMN => self.actual_price = value,
            DISCOUNT_PERCENTAGE_COLUMN => self.discount_percentage = value,
            RATING_COLUMN => self.rating = value,
            other => {
                self.extra.insert(other.to_string(), value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CleanedRecord – a row after numeric / category normalisation
// ---------------------------------------------------------------------------

/// A catalog row with its numeric fields parsed. Never mutated after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    pub category: String,
    /// First segment of `category`.
    pub main_category: String,
    pub discounted_price: f64,
    pub actual_price: f64,
    pub discount_percentage: f64,
    /// `None` when the rating text has no usable leading number.
    pub clean_rating: Option<f64>,
    pub extra: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Catalog – the complete cleaned record set
// ---------------------------------------------------------------------------

/// The cleaned catalog plus the category index used to populate a selector.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Cleaned records in source order.
    pub records: Vec<CleanedRecord>,
    /// Distinct `main_category` values in order of first appearance.
    pub categories: Vec<String>,
    /// Rows excluded during cleaning, with the reason.
    pub rejected: Vec<RowError>,
}

impl Catalog {
    /// Build the category index from the cleaned records.
    pub fn from_records(records: Vec<CleanedRecord>, rejected: Vec<RowError>) -> Self {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut categories = Vec::new();
        for rec in &records {
            if seen.insert(rec.main_category.as_str()) {
                categories.push(rec.main_category.clone());
            }
        }
        Catalog {
            records,
            categories,
            rejected,
        }
    }

    /// Number of cleaned records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
