use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use super::model::CleanedRecord;

/// Selector label meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All Categories";

// ---------------------------------------------------------------------------
// Category selector
// ---------------------------------------------------------------------------

/// Which records a view should contain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategorySelector {
    /// Every record.
    #[default]
    All,
    /// Records whose `main_category` equals this value exactly.
    Category(String),
}

impl CategorySelector {
    /// Whether a record passes this selector.
    pub fn matches(&self, record: &CleanedRecord) -> bool {
        match self {
            CategorySelector::All => true,
            CategorySelector::Category(name) => record.main_category == *name,
        }
    }
}

impl FromStr for CategorySelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_CATEGORIES {
            Ok(CategorySelector::All)
        } else {
            Ok(CategorySelector::Category(s.to_string()))
        }
    }
}

impl fmt::Display for CategorySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategorySelector::All => write!(f, "{ALL_CATEGORIES}"),
            CategorySelector::Category(name) => write!(f, "{name}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Read-only projection of the catalog for one selector.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub selector: CategorySelector,
    pub records: Vec<&'a CleanedRecord>,
}

impl<'a> FilteredView<'a> {
    /// Number of records in the view.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing matched the selector.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CleanedRecord> + '_ {
        self.records.iter().copied()
    }
}

/// Return indices of records that pass the selector.
pub fn filtered_indices(records: &[CleanedRecord], selector: &CategorySelector) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selector.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Select the records of one main category, or all of them.
///
/// An unknown category yields an empty view, never an error.
pub fn filter_by_category<'a>(
    records: &'a [CleanedRecord],
    selector: &CategorySelector,
) -> FilteredView<'a> {
    FilteredView {
        selector: selector.clone(),
        records: records.iter().filter(|rec| selector.matches(rec)).collect(),
    }
}
