use std::collections::BTreeSet;

use super::model::{Country, Dataset, Record, YearRange};

// ---------------------------------------------------------------------------
// Selection: the two filter dimensions
// ---------------------------------------------------------------------------

/// Year range and country set chosen in the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub years: YearRange,
    pub countries: BTreeSet<Country>,
}

impl Selection {
    pub fn new(years: YearRange, countries: impl IntoIterator<Item = Country>) -> Self {
        Self {
            years,
            countries: countries.into_iter().collect(),
        }
    }

    /// Initialise a selection with every year and every country (show everything).
    pub fn everything(dataset: &Dataset) -> Self {
        Self::new(YearRange::FULL, dataset.countries.iter().copied())
    }

    /// Whether a record passes both dimensions.
    pub fn matches(&self, record: &Record) -> bool {
        self.years.contains(record.year) && self.countries.contains(&record.country)
    }
}

// ---------------------------------------------------------------------------
// View: borrowed, ordered subset of the dataset
// ---------------------------------------------------------------------------

/// A filtered view over dataset rows. Row order follows the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View<'a> {
    rows: Vec<&'a Record>,
}

impl<'a> View<'a> {
    pub fn rows(&self) -> &[&'a Record] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Narrow this view further; used for per-year and per-country panels.
    pub fn retain(&self, pred: impl Fn(&Record) -> bool) -> View<'a> {
        View {
            rows: self.rows.iter().copied().filter(|r| pred(r)).collect(),
        }
    }

    /// Rows sorted by `(country, year)` for the raw-data table.
    pub fn sorted_by_country_year(&self) -> Vec<&'a Record> {
        let mut rows = self.rows.clone();
        rows.sort_by_key(|r| (r.country, r.year));
        rows
    }
}

impl<'a> FromIterator<&'a Record> for View<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Record>>(iter: I) -> Self {
        View {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Return the rows of `records` that pass the selection, in source order.
///
/// An empty country set selects nothing, and so does an inverted year range.
/// Applying the same (or a wider) selection to the result returns it unchanged.
pub fn filter<'a, I>(records: I, selection: &Selection) -> View<'a>
where
    I: IntoIterator<Item = &'a Record>,
{
    if selection.countries.is_empty() {
        return View::default();
    }
    records
        .into_iter()
        .filter(|r| selection.matches(r))
        .collect()
}

/// Return indices of dataset rows passing the selection.
///
/// Cached by the UI state so the view can be rebuilt without re-scanning
/// on every frame.
pub fn filtered_indices(dataset: &Dataset, selection: &Selection) -> Vec<usize> {
    if selection.countries.is_empty() {
        return Vec::new();
    }
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| selection.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// Materialise a view from cached indices.
pub fn view_from_indices<'a>(dataset: &'a Dataset, indices: &[usize]) -> View<'a> {
    indices
        .iter()
        .filter_map(|&i| dataset.records.get(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn sample() -> Dataset {
        let mut rows = Vec::new();
        for year in 2017..=2022 {
            for (i, country) in [Country::Argentina, Country::Mexico, Country::Chile]
                .into_iter()
                .enumerate()
            {
                rows.push(record(country, year, (year - 2000) as f64 * 10.0 + i as f64));
            }
        }
        Dataset::from_records(rows)
    }

    #[test]
    fn keeps_only_matching_rows() {
        let ds = sample();
        let sel = Selection::new(
            YearRange::new(2019, 2020),
            [Country::Argentina, Country::Mexico],
        );
        let view = filter(&ds.records, &sel);
        assert_eq!(view.len(), 4);
        for r in view.iter() {
            assert!([Country::Argentina, Country::Mexico].contains(&r.country));
            assert!((2019..=2020).contains(&r.year));
        }
    }

    #[test]
    fn preserves_source_order() {
        let ds = sample();
        let sel = Selection::everything(&ds);
        let view = filter(&ds.records, &sel);
        let expected: Vec<&Record> = ds.records.iter().collect();
        assert_eq!(view.rows(), expected.as_slice());
    }

    #[test]
    fn empty_country_set_selects_nothing() {
        let ds = sample();
        let sel = Selection::new(YearRange::FULL, Vec::<Country>::new());
        assert!(filter(&ds.records, &sel).is_empty());
        assert!(filtered_indices(&ds, &sel).is_empty());
    }

    #[test]
    fn inverted_range_selects_nothing() {
        let ds = sample();
        let sel = Selection::new(YearRange::new(2021, 2018), Country::ALL);
        assert!(filter(&ds.records, &sel).is_empty());
    }

    #[test]
    fn refiltering_is_idempotent() {
        let ds = sample();
        let sel = Selection::new(YearRange::new(2018, 2021), [Country::Chile, Country::Mexico]);
        let once = filter(&ds.records, &sel);
        let twice = filter(once.iter(), &sel);
        assert_eq!(once, twice);

        let wider = Selection::new(YearRange::FULL, Country::ALL);
        assert_eq!(filter(once.iter(), &wider), once);
    }

    #[test]
    fn indices_agree_with_view() {
        let ds = sample();
        let sel = Selection::new(YearRange::new(2020, 2022), [Country::Argentina]);
        let idx = filtered_indices(&ds, &sel);
        assert_eq!(view_from_indices(&ds, &idx), filter(&ds.records, &sel));
    }

    #[test]
    fn table_order_is_country_then_year() {
        let ds = sample();
        let view = filter(&ds.records, &Selection::everything(&ds));
        let sorted = view.sorted_by_country_year();
        assert_eq!(sorted[0].country, Country::Argentina);
        assert_eq!(sorted[0].year, 2017);
        assert_eq!(sorted.last().map(|r| r.country), Some(Country::Mexico));
        assert_eq!(sorted.last().map(|r| r.year), Some(2022));
    }
}
