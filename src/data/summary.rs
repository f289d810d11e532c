use std::collections::{BTreeMap, BTreeSet};

use super::filter::View;
use super::model::{Country, Measure};

// ---------------------------------------------------------------------------
// Scalar summary (KPI strip)
// ---------------------------------------------------------------------------

/// Aggregates shown above the charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_copies: f64,
    pub total_revenue: f64,
    pub max_per_capita: f64,
    pub total_titles: f64,
    /// Country of the row with the highest revenue.
    pub leading_country: Country,
    /// Year of that row.
    pub leading_year: i32,
}

/// Compute the KPI aggregates of a view; `None` when the view is empty.
///
/// The leader is the first row holding the maximum revenue in view order.
pub fn summarize(view: &View<'_>) -> Option<Summary> {
    let first = view.iter().next()?;

    let mut total_copies = 0.0;
    let mut total_revenue = 0.0;
    let mut total_titles = 0.0;
    let mut max_per_capita = f64::NEG_INFINITY;
    let mut leader = first;

    for r in view.iter() {
        total_copies += r.copies_produced_millions;
        total_revenue += r.revenue_estimate_usd_millions;
        total_titles += r.isbn_titles_registered;
        max_per_capita = max_per_capita.max(r.copies_per_capita);
        // Strict comparison keeps the earliest row on ties; NaN never wins.
        if r.revenue_estimate_usd_millions > leader.revenue_estimate_usd_millions
            || (leader.revenue_estimate_usd_millions.is_nan()
                && !r.revenue_estimate_usd_millions.is_nan())
        {
            leader = r;
        }
    }

    Some(Summary {
        total_copies,
        total_revenue,
        max_per_capita,
        total_titles,
        leading_country: leader.country,
        leading_year: leader.year,
    })
}

// ---------------------------------------------------------------------------
// Country × year pivot (heatmap)
// ---------------------------------------------------------------------------

/// A country × year table of one measure. Absent pairs are gaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pivot {
    /// Row labels, in country order.
    pub countries: Vec<Country>,
    /// Column labels, ascending.
    pub years: Vec<i32>,
    cells: BTreeMap<(Country, i32), f64>,
    duplicates: Vec<(Country, i32)>,
}

impl Pivot {
    /// Mean value for the pair, or `None` for a gap.
    pub fn get(&self, country: Country, year: i32) -> Option<f64> {
        self.cells.get(&(country, year)).copied()
    }

    /// `(country, year)` pairs that appeared on more than one row.
    pub fn duplicates(&self) -> &[(Country, i32)] {
        &self.duplicates
    }

    /// Smallest and largest cell value.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells.values().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Re-index a view by country (rows) and year (columns), averaging the
/// measure over rows that share a pair and ignoring absent values.
pub fn pivot_by_country_year(view: &View<'_>, measure: Measure) -> Pivot {
    let mut sums: BTreeMap<(Country, i32), (f64, usize)> = BTreeMap::new();
    let mut row_counts: BTreeMap<(Country, i32), usize> = BTreeMap::new();
    let mut countries = BTreeSet::new();
    let mut years = BTreeSet::new();

    for r in view.iter() {
        let key = (r.country, r.year);
        countries.insert(r.country);
        years.insert(r.year);
        *row_counts.entry(key).or_default() += 1;
        if let Some(v) = measure.value(r).filter(|v| !v.is_nan()) {
            let slot = sums.entry(key).or_insert((0.0, 0));
            slot.0 += v;
            slot.1 += 1;
        }
    }

    let cells = sums
        .into_iter()
        .map(|(key, (sum, n))| (key, sum / n as f64))
        .collect();
    let duplicates = row_counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(key, _)| key)
        .collect();

    Pivot {
        countries: countries.into_iter().collect(),
        years: years.into_iter().collect(),
        cells,
        duplicates,
    }
}
