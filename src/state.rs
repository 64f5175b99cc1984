use crate::config::Settings;
use crate::data::aggregate::{aggregate, AggregateSummary};
use crate::data::filter::{
    filter_by_category, filtered_indices, CategorySelector, FilteredView, ALL_CATEGORIES,
};
use crate::data::model::Catalog;

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Everything a front-end needs, independent of rendering.
///
/// Owns the cleaned catalog for the life of the process; the catalog is
/// loaded once by the caller and never mutated afterwards.
pub struct DashboardState {
    /// Cleaned catalog.
    catalog: Catalog,

    settings: Settings,

    /// Current category selection.
    pub selector: CategorySelector,

    /// Indices of records passing the current selector (cached).
    pub visible_indices: Vec<usize>,

    /// Statistics for the current selection (cached).
    pub summary: AggregateSummary,
}

impl DashboardState {
    /// Take ownership of a loaded catalog and compute the unfiltered summary.
    pub fn new(catalog: Catalog, settings: Settings) -> Self {
        let selector = CategorySelector::All;
        let visible_indices = (0..catalog.len()).collect();
        let summary = aggregate(
            &filter_by_category(&catalog.records, &selector),
            settings.top_n,
        );
        Self {
            catalog,
            settings,
            selector,
            visible_indices,
            summary,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Selector entries: the "all" sentinel followed by every category.
    pub fn selector_options(&self) -> Vec<String> {
        std::iter::once(ALL_CATEGORIES.to_string())
            .chain(self.catalog.categories.iter().cloned())
            .collect()
    }

    /// Change the selection and recompute the cached view and summary.
    pub fn select(&mut self, selector: CategorySelector) {
        self.selector = selector;
        self.refilter();
    }

    /// The records behind the current selection.
    pub fn view(&self) -> FilteredView<'_> {
        FilteredView {
            selector: self.selector.clone(),
            records: self
                .visible_indices
                .iter()
                .map(|&i| &self.catalog.records[i])
                .collect(),
        }
    }

    /// Recompute `visible_indices` and `summary` after a selection change.
    fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.catalog.records, &self.selector);
        let summary = {
            let view = self.view();
            if view.is_empty() {
                log::warn!("No data available for selected filter: {}", view.selector);
            } else {
                log::debug!(
                    "{} of {} records match {}",
                    view.len(),
                    self.catalog.len(),
                    view.selector
                );
            }
            aggregate(&view, self.settings.top_n)
        };
        self.summary = summary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::NO_DATA_LABEL;
    use crate::data::clean::{load_and_clean, MalformedRowPolicy};
    use crate::data::model::RawRecord;

    fn raw(category: &str, price: &str, rating: &str) -> RawRecord {
        RawRecord {
            category: category.to_string(),
            discounted_price: price.to_string(),
            actual_price: "₹20,000".to_string(),
            discount_percentage: "25%".to_string(),
            rating: rating.to_string(),
            ..Default::default()
        }
    }

    fn state() -> DashboardState {
        let catalog = load_and_clean(
            vec![
                raw("Electronics|Mobiles", "₹12,999", "4.3"),
                raw("Home|Kitchen", "₹349", "4.0"),
                raw("Electronics|Audio", "₹1,499", "|"),
            ],
            MalformedRowPolicy::Fail,
        )
        .unwrap();
        DashboardState::new(catalog, Settings::default())
    }

    #[test]
    fn starts_unfiltered() {
        let st = state();
        assert_eq!(st.selector, CategorySelector::All);
        assert_eq!(st.visible_indices, vec![0, 1, 2]);
        assert_eq!(st.summary.total_count, 3);
        assert_eq!(st.summary.top_category, "Electronics");
        assert_eq!(st.view().len(), st.catalog().len());
    }

    #[test]
    fn selector_options_lead_with_all() {
        assert_eq!(
            state().selector_options(),
            vec!["All Categories", "Electronics", "Home"]
        );
    }

    #[test]
    fn select_recomputes_summary() {
        let mut st = state();
        st.select(CategorySelector::Category("Home".into()));
        assert_eq!(st.visible_indices, vec![1]);
        assert_eq!(st.summary.total_count, 1);
        assert_eq!(st.summary.market_segments.budget, 1);

        st.select(CategorySelector::Category("Garden".into()));
        assert!(st.view().is_empty());
        assert_eq!(st.summary.top_category, NO_DATA_LABEL);
        assert_eq!(st.summary.price_summary, None);

        st.select(CategorySelector::All);
        assert_eq!(st.summary.total_count, 3);
    }
}
