use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::filter::FilteredView;

/// Shown as the top category when a view is empty.
pub const NO_DATA_LABEL: &str = "N/A";
/// Default length of the ranked category lists.
pub const DEFAULT_TOP_N: usize = 5;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPrice {
    pub category: String,
    pub mean_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingBin {
    pub rating: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// The four fixed price ranges. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBand {
    Under500,
    From500To2000,
    From2000To10000,
    Above10000,
}

impl PriceBand {
    pub const ALL: [PriceBand; 4] = [
        PriceBand::Under500,
        PriceBand::From500To2000,
        PriceBand::From2000To10000,
        PriceBand::Above10000,
    ];

    /// Band a discounted price falls into.
    pub fn of(price: f64) -> Self {
        if price < 500.0 {
            PriceBand::Under500
        } else if price < 2000.0 {
            PriceBand::From500To2000
        } else if price < 10000.0 {
            PriceBand::From2000To10000
        } else {
            PriceBand::Above10000
        }
    }

    /// `[lower, upper)`; `upper` is `None` for the open-ended band.
    pub fn bounds(self) -> (f64, Option<f64>) {
        match self {
            PriceBand::Under500 => (0.0, Some(500.0)),
            PriceBand::From500To2000 => (500.0, Some(2000.0)),
            PriceBand::From2000To10000 => (2000.0, Some(10000.0)),
            PriceBand::Above10000 => (10000.0, None),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriceBand::Under500 => "Under ₹500",
            PriceBand::From500To2000 => "₹500-2000",
            PriceBand::From2000To10000 => "₹2000-10000",
            PriceBand::Above10000 => "Above ₹10000",
        }
    }

    fn index(self) -> usize {
        match self {
            PriceBand::Under500 => 0,
            PriceBand::From500To2000 => 1,
            PriceBand::From2000To10000 => 2,
            PriceBand::Above10000 => 3,
        }
    }
}

impl fmt::Display for PriceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBucket {
    pub band: PriceBand,
    pub label: &'static str,
    pub lower: f64,
    pub upper: Option<f64>,
    pub count: usize,
}

/// Record counts per [`PriceBand`], in band order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceRangeBuckets(pub Vec<PriceBucket>);

impl PriceRangeBuckets {
    pub fn count(&self, band: PriceBand) -> usize {
        self.0
            .iter()
            .find(|b| b.band == band)
            .map(|b| b.count)
            .unwrap_or(0)
    }

    /// Sum over all bands; always equals the view size.
    pub fn total(&self) -> usize {
        self.0.iter().map(|b| b.count).sum()
    }

    /// Products under ₹500.
    pub fn budget(&self) -> usize {
        self.count(PriceBand::Under500)
    }

    /// Products at ₹10000 and above.
    pub fn premium(&self) -> usize {
        self.count(PriceBand::Above10000)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketSegments {
    pub budget: usize,
    pub premium: usize,
}

/// Everything a dashboard needs for one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub top_category: String,
    pub total_count: usize,
    pub avg_rating: f64,
    pub top_categories_by_count: Vec<CategoryCount>,
    pub avg_price_by_category: Vec<CategoryPrice>,
    pub rating_histogram: Vec<RatingBin>,
    pub price_range_buckets: PriceRangeBuckets,
    pub market_segments: MarketSegments,
    pub discount_vs_price_pairs: Vec<(f64, f64)>,
    /// `None` for an empty view.
    pub price_summary: Option<PriceSummary>,
    pub category_count: usize,
    pub avg_discount_percentage: f64,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Compute every statistic for a view. Never fails, even on an empty view.
pub fn aggregate(view: &FilteredView<'_>, top_n: usize) -> AggregateSummary {
    let price_range_buckets = price_range_buckets(view);
    debug_assert_eq!(price_range_buckets.total(), view.len());
    let market_segments = MarketSegments {
        budget: price_range_buckets.budget(),
        premium: price_range_buckets.premium(),
    };

    AggregateSummary {
        top_category: top_category(view),
        total_count: view.len(),
        avg_rating: avg_rating(view),
        top_categories_by_count: top_categories_by_count(view, top_n),
        avg_price_by_category: avg_price_by_category(view, top_n),
        rating_histogram: rating_histogram(view),
        price_range_buckets,
        market_segments,
        discount_vs_price_pairs: discount_vs_price_pairs(view),
        price_summary: price_summary(view),
        category_count: category_count(view),
        avg_discount_percentage: avg_discount_percentage(view),
    }
}

/// Most frequent main category; ties go to the alphabetically first name.
pub fn top_category(view: &FilteredView<'_>) -> String {
    ranked_counts(view)
        .into_iter()
        .next()
        .map(|c| c.category)
        .unwrap_or_else(|| NO_DATA_LABEL.to_string())
}

/// Mean of the known ratings, `0.0` when there are none.
pub fn avg_rating(view: &FilteredView<'_>) -> f64 {
    mean(view.iter().filter_map(|r| r.clean_rating)).unwrap_or(0.0)
}

/// The `n` most frequent categories, descending by count.
pub fn top_categories_by_count(view: &FilteredView<'_>, n: usize) -> Vec<CategoryCount> {
    let mut counts = ranked_counts(view);
    counts.truncate(n);
    counts
}

/// The `n` categories with the highest mean discounted price.
pub fn avg_price_by_category(view: &FilteredView<'_>, n: usize) -> Vec<CategoryPrice> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for rec in view.iter() {
        let entry = sums.entry(rec.main_category.as_str()).or_insert((0.0, 0));
        entry.0 += rec.discounted_price;
        entry.1 += 1;
    }

    let mut prices: Vec<CategoryPrice> = sums
        .into_iter()
        .map(|(category, (sum, count))| CategoryPrice {
            category: category.to_string(),
            mean_price: sum / count as f64,
        })
        .collect();
    prices.sort_by(|a, b| {
        b.mean_price
            .total_cmp(&a.mean_price)
            .then_with(|| a.category.cmp(&b.category))
    });
    prices.truncate(n);
    prices
}

/// Count of records per distinct rating, ascending by rating.
pub fn rating_histogram(view: &FilteredView<'_>) -> Vec<RatingBin> {
    let mut ratings: Vec<f64> = view.iter().filter_map(|r| r.clean_rating).collect();
    ratings.sort_by(f64::total_cmp);

    let mut bins: Vec<RatingBin> = Vec::new();
    for rating in ratings {
        match bins.last_mut() {
            Some(bin) if bin.rating.total_cmp(&rating) == Ordering::Equal => bin.count += 1,
            _ => bins.push(RatingBin { rating, count: 1 }),
        }
    }
    bins
}

/// Distribution of discounted prices over the four [`PriceBand`]s.
pub fn price_range_buckets(view: &FilteredView<'_>) -> PriceRangeBuckets {
    let mut counts = [0usize; 4];
    for rec in view.iter() {
        counts[PriceBand::of(rec.discounted_price).index()] += 1;
    }
    PriceRangeBuckets(
        PriceBand::ALL
            .iter()
            .map(|&band| {
                let (lower, upper) = band.bounds();
                PriceBucket {
                    band,
                    label: band.label(),
                    lower,
                    upper,
                    count: counts[band.index()],
                }
            })
            .collect(),
    )
}

/// `(discounted_price, discount_percentage)` for every record where both are finite.
pub fn discount_vs_price_pairs(view: &FilteredView<'_>) -> Vec<(f64, f64)> {
    view.iter()
        .map(|r| (r.discounted_price, r.discount_percentage))
        .filter(|(price, pct)| price.is_finite() && pct.is_finite())
        .collect()
}

/// Min, max and mean discounted price, `None` for an empty view.
pub fn price_summary(view: &FilteredView<'_>) -> Option<PriceSummary> {
    let mean = mean(view.iter().map(|r| r.discounted_price))?;
    let (min, max) = view.iter().map(|r| r.discounted_price).fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), p| (lo.min(p), hi.max(p)),
    );
    Some(PriceSummary { min, max, mean })
}

/// Number of distinct main categories in the view.
pub fn category_count(view: &FilteredView<'_>) -> usize {
    view.iter()
        .map(|r| r.main_category.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Mean discount percentage, `0.0` for an empty view.
pub fn avg_discount_percentage(view: &FilteredView<'_>) -> f64 {
    mean(view.iter().map(|r| r.discount_percentage)).unwrap_or(0.0)
}

/// All categories with their counts, descending by count then ascending by name.
fn ranked_counts(view: &FilteredView<'_>) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for rec in view.iter() {
        *counts.entry(rec.main_category.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    ranked
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::filter::{filter_by_category, CategorySelector};
    use crate::data::model::CleanedRecord;

    fn record(main: &str, price: f64, discount: f64, rating: Option<f64>) -> CleanedRecord {
        CleanedRecord {
            category: format!("{main}|Other"),
            main_category: main.to_string(),
            discounted_price: price,
            actual_price: price * 1.5,
            discount_percentage: discount,
            clean_rating: rating,
            extra: BTreeMap::new(),
        }
    }

    fn catalog() -> Vec<CleanedRecord> {
        vec![
            record("Electronics", 1999.0, 20.0, Some(4.2)),
            record("Electronics", 15000.0, 40.0, Some(4.5)),
            record("Home", 300.0, 60.0, None),
            record("Home", 500.0, 10.0, Some(4.2)),
            record("Books", 199.0, 0.0, Some(3.9)),
            record("Toys", 2000.0, 30.0, Some(4.0)),
            record("Garden", 9999.99, 15.0, Some(4.5)),
            record("Office", 10000.0, 5.0, Some(4.1)),
        ]
    }

    fn all(records: &[CleanedRecord]) -> FilteredView<'_> {
        filter_by_category(records, &CategorySelector::All)
    }

    #[test]
    fn buckets_use_inclusive_lower_bounds() {
        let records = vec![
            record("A", 100.0, 0.0, None),
            record("A", 3000.0, 0.0, None),
        ];
        let buckets = price_range_buckets(&all(&records));
        let counts: Vec<usize> = buckets.0.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 0, 1, 0]);

        let records = catalog();
        let buckets = price_range_buckets(&all(&records));
        assert_eq!(buckets.count(PriceBand::Under500), 2);
        assert_eq!(buckets.count(PriceBand::From500To2000), 2);
        assert_eq!(buckets.count(PriceBand::From2000To10000), 2);
        assert_eq!(buckets.count(PriceBand::Above10000), 2);
        assert_eq!(buckets.total(), records.len());
    }

    #[test]
    fn band_labels_and_bounds() {
        assert_eq!(PriceBand::of(499.99), PriceBand::Under500);
        assert_eq!(PriceBand::of(500.0), PriceBand::From500To2000);
        assert_eq!(PriceBand::Above10000.bounds(), (10000.0, None));
        assert_eq!(PriceBand::Under500.to_string(), "Under ₹500");
    }

    #[test]
    fn top_category_breaks_ties_alphabetically() {
        let records = catalog();
        assert_eq!(top_category(&all(&records)), "Electronics");

        let records = vec![
            record("Toys", 1.0, 0.0, None),
            record("Books", 1.0, 0.0, None),
        ];
        assert_eq!(top_category(&all(&records)), "Books");
    }

    #[test]
    fn ranked_lists_are_capped_and_descending() {
        let records = catalog();
        let view = all(&records);

        let counts = top_categories_by_count(&view, DEFAULT_TOP_N);
        assert_eq!(counts.len(), 5);
        assert_eq!(counts[0].category, "Electronics");
        assert_eq!(counts[1].category, "Home");
        assert_eq!(counts[2].category, "Books");
        assert!(counts.windows(2).all(|w| w[0].count >= w[1].count));

        let prices = avg_price_by_category(&view, DEFAULT_TOP_N);
        assert_eq!(prices.len(), 5);
        assert_eq!(prices[0].category, "Office");
        assert_eq!(prices[1].category, "Garden");
        assert_eq!(prices[2].category, "Electronics");
        assert!((prices[2].mean_price - 8499.5).abs() < 1e-9);
        assert!(prices.windows(2).all(|w| w[0].mean_price >= w[1].mean_price));
    }

    #[test]
    fn equal_mean_prices_rank_by_name() {
        let records = vec![
            record("Zed", 50.0, 0.0, None),
            record("Zed", 150.0, 0.0, None),
            record("Alpha", 100.0, 0.0, None),
            record("Mid", 20.0, 0.0, None),
        ];
        let prices = avg_price_by_category(&all(&records), DEFAULT_TOP_N);
        let names: Vec<&str> = prices.iter().map(|p| p.category.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zed", "Mid"]);
        assert_eq!(prices[0].mean_price, prices[1].mean_price);
    }

    #[test]
    fn pairs_drop_non_finite_members() {
        let records = vec![
            record("A", 100.0, 10.0, None),
            record("A", 200.0, f64::NAN, None),
            record("A", f64::INFINITY, 5.0, None),
        ];
        assert_eq!(discount_vs_price_pairs(&all(&records)), vec![(100.0, 10.0)]);
    }

    #[test]
    fn histogram_skips_null_ratings() {
        let records = catalog();
        let bins = rating_histogram(&all(&records));
        let flat: Vec<(f64, usize)> = bins.iter().map(|b| (b.rating, b.count)).collect();
        assert_eq!(flat, vec![(3.9, 1), (4.0, 1), (4.1, 1), (4.2, 2), (4.5, 2)]);
    }

    #[test]
    fn averages_skip_nulls() {
        let records = vec![
            record("A", 100.0, 10.0, Some(4.0)),
            record("A", 300.0, 30.0, None),
            record("A", 200.0, 20.0, Some(5.0)),
        ];
        let view = all(&records);
        assert_eq!(avg_rating(&view), 4.5);
        assert_eq!(avg_discount_percentage(&view), 20.0);
        assert_eq!(
            price_summary(&view),
            Some(PriceSummary {
                min: 100.0,
                max: 300.0,
                mean: 200.0
            })
        );
        assert_eq!(discount_vs_price_pairs(&view).len(), 3);
    }

    #[test]
    fn all_null_ratings_average_to_zero() {
        let records = vec![record("A", 100.0, 10.0, None)];
        assert_eq!(avg_rating(&all(&records)), 0.0);
    }

    #[test]
    fn empty_view_yields_sentinels() {
        let records = catalog();
        let view = filter_by_category(&records, &CategorySelector::Category("Garage".into()));
        let summary = aggregate(&view, DEFAULT_TOP_N);

        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.top_category, NO_DATA_LABEL);
        assert_eq!(summary.avg_rating, 0.0);
        assert_eq!(summary.avg_discount_percentage, 0.0);
        assert_eq!(summary.price_summary, None);
        assert_eq!(summary.category_count, 0);
        assert!(summary.top_categories_by_count.is_empty());
        assert!(summary.avg_price_by_category.is_empty());
        assert!(summary.rating_histogram.is_empty());
        assert!(summary.discount_vs_price_pairs.is_empty());
        assert_eq!(summary.price_range_buckets.0.len(), 4);
        assert_eq!(summary.price_range_buckets.total(), 0);
    }

    #[test]
    fn filtered_summary_matches_category() {
        let records = catalog();
        let view = filter_by_category(&records, &CategorySelector::Category("Home".into()));
        let summary = aggregate(&view, DEFAULT_TOP_N);

        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.top_category, "Home");
        assert_eq!(summary.category_count, 1);
        assert_eq!(summary.avg_rating, 4.2);
        assert_eq!(summary.market_segments, MarketSegments { budget: 1, premium: 0 });
        assert_eq!(summary.price_range_buckets.total(), summary.total_count);
    }

    #[test]
    fn summary_serializes_bucket_labels() {
        let records = catalog();
        let summary = aggregate(&all(&records), DEFAULT_TOP_N);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["price_range_buckets"][0]["label"], "Under ₹500");
        assert_eq!(json["price_range_buckets"][3]["band"], "above10000");
        assert_eq!(json["total_count"], 8);
    }
}
