use std::collections::{BTreeMap, BTreeSet};

use super::filter::View;
use super::model::{Country, Measure, Record};

/// The comparison slider opens on this year when it is available, since the
/// last covered year only holds estimates.
pub const PREFERRED_COMPARISON_YEAR: i32 = 2024;

// ---------------------------------------------------------------------------
// Per-country time series
// ---------------------------------------------------------------------------

/// `(year, value)` points of one country, sorted by year.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySeries {
    pub country: Country,
    pub points: Vec<[f64; 2]>,
}

/// Split a view into one series per country, skipping absent values.
/// Countries without any value are left out.
pub fn series_by_country(view: &View<'_>, measure: Measure) -> Vec<CountrySeries> {
    let mut grouped: BTreeMap<Country, Vec<[f64; 2]>> = BTreeMap::new();
    for r in view.iter() {
        if let Some(v) = measure.value(r) {
            grouped
                .entry(r.country)
                .or_default()
                .push([r.year as f64, v]);
        }
    }
    grouped
        .into_iter()
        .map(|(country, mut points)| {
            points.sort_by(|a, b| a[0].total_cmp(&b[0]));
            CountrySeries { country, points }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Stacked area bands
// ---------------------------------------------------------------------------

/// One country's slice of a stacked area chart.
#[derive(Debug, Clone, PartialEq)]
pub struct StackBand {
    pub country: Country,
    /// `(year, lower, upper)` triples, sorted by year.
    pub points: Vec<(i32, f64, f64)>,
}

/// Stack the measure per year in country order. Each band starts where the
/// previous country's band ended for that year.
pub fn stacked_by_year(view: &View<'_>, measure: Measure) -> Vec<StackBand> {
    let mut totals: BTreeMap<(i32, Country), f64> = BTreeMap::new();
    for r in view.iter() {
        if let Some(v) = measure.value(r).filter(|v| v.is_finite()) {
            *totals.entry((r.year, r.country)).or_default() += v;
        }
    }

    let mut bands: BTreeMap<Country, Vec<(i32, f64, f64)>> = BTreeMap::new();
    let mut current_year = None;
    let mut running = 0.0;
    // Keys iterate year-major, country-minor.
    for ((year, country), value) in totals {
        if current_year != Some(year) {
            current_year = Some(year);
            running = 0.0;
        }
        bands
            .entry(country)
            .or_default()
            .push((year, running, running + value));
        running += value;
    }

    bands
        .into_iter()
        .map(|(country, points)| StackBand { country, points })
        .collect()
}

// ---------------------------------------------------------------------------
// Point-in-time comparison
// ---------------------------------------------------------------------------

/// Distinct years present in the view, ascending.
pub fn available_years(view: &View<'_>) -> Vec<i32> {
    view.iter()
        .map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Year the comparison slider starts on: the preferred year capped by the
/// latest available one, snapped to a year that actually has data.
pub fn default_comparison_year(years: &[i32]) -> Option<i32> {
    let latest = *years.iter().max()?;
    let target = latest.min(PREFERRED_COMPARISON_YEAR);
    years
        .iter()
        .copied()
        .filter(|&y| y <= target)
        .max()
        .or(Some(latest))
}

/// Closest year in `years` to `year`; the earlier one wins a tie.
pub fn nearest_year(years: &[i32], year: i32) -> Option<i32> {
    years.iter().copied().min_by_key(|y| (y - year).abs())
}

/// Rows of `year`, ordered by ascending revenue so the largest bar ends up
/// on top of a horizontal chart.
pub fn ranking_for_year<'a>(view: &View<'a>, year: i32) -> Vec<&'a Record> {
    let mut rows: Vec<&Record> = view.iter().filter(|r| r.year == year).collect();
    rows.sort_by(|a, b| {
        a.revenue_estimate_usd_millions
            .total_cmp(&b.revenue_estimate_usd_millions)
    });
    rows
}

/// Marker radius with area proportional to `value`; `max_value` maps to
/// `max_radius`.
pub fn bubble_radius(value: f64, max_value: f64, max_radius: f32) -> f32 {
    const MIN_RADIUS: f32 = 2.0;
    if !(max_value > 0.0) || !(value > 0.0) {
        return MIN_RADIUS;
    }
    let r = max_radius * (value / max_value).sqrt() as f32;
    r.clamp(MIN_RADIUS, max_radius)
}

// ---------------------------------------------------------------------------
// Crisis view
// ---------------------------------------------------------------------------

/// A historical disruption attached to a country-year.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalEvent<'a> {
    pub year: i32,
    pub label: &'a str,
}

/// Rows of `country` whose context note carries text.
pub fn historical_events<'a>(view: &View<'a>, country: Country) -> Vec<HistoricalEvent<'a>> {
    view.iter()
        .filter(|r| r.country == country)
        .filter_map(|r| {
            r.event().map(|label| HistoricalEvent {
                year: r.year,
                label,
            })
        })
        .collect()
}

/// Rows where the digital-format share was published.
pub fn digital_view<'a>(view: &View<'a>) -> View<'a> {
    view.retain(|r| r.digital_format_pct.is_some())
}

/// Linear mapping that draws a secondary series on the primary y axis.
///
/// Plot space holds `secondary * factor`; the right-hand axis labels divide
/// by the factor again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualAxis {
    pub factor: f64,
}

impl DualAxis {
    /// Scale so the peaks of both series line up.
    pub fn fit(
        primary: impl IntoIterator<Item = f64>,
        secondary: impl IntoIterator<Item = f64>,
    ) -> Self {
        fn peak(values: impl IntoIterator<Item = f64>) -> f64 {
            values
                .into_iter()
                .filter(|v| v.is_finite())
                .fold(f64::NEG_INFINITY, f64::max)
        }
        let p = peak(primary);
        let s = peak(secondary);
        let factor = if p > 0.0 && s > 0.0 { p / s } else { 1.0 };
        Self { factor }
    }

    pub fn to_plot(&self, secondary_value: f64) -> f64 {
        secondary_value * self.factor
    }

    pub fn to_secondary(&self, plot_value: f64) -> f64 {
        plot_value / self.factor
    }
}

impl Default for DualAxis {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}
