use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::path::Path;

use crate::config::Layout;
use crate::data::filter::{filtered_indices, view_from_indices, Selection, View};
use crate::data::loader;
use crate::data::model::{Column, Country, Dataset, YearRange};
use crate::data::series::{available_years, default_comparison_year};

// ---------------------------------------------------------------------------
// Tabs of the tabbed layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Production,
    Revenue,
    Crisis,
    Data,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Production, Tab::Revenue, Tab::Crisis, Tab::Data];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Production => "📦 Production & Titles",
            Tab::Revenue => "💰 Revenue & Economy",
            Tab::Crisis => "🔴 Crises & Trends",
            Tab::Data => "🗂 Data & Download",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Everything the user can change, plus the status line.
#[derive(Debug, Clone)]
pub struct UiState {
    /// Sidebar filters.
    pub selection: Selection,
    pub layout: Layout,
    pub tab: Tab,
    /// Year shown in the point-in-time comparison.
    pub comparison_year: Option<i32>,
    /// Country shown in the historical-events chart.
    pub crisis_country: Option<Country>,
    /// Visible columns of the raw-data table.
    pub table_columns: BTreeSet<Column>,
    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl UiState {
    fn new(layout: Layout) -> Self {
        Self {
            selection: Selection {
                years: YearRange::FULL,
                countries: BTreeSet::new(),
            },
            layout,
            tab: Tab::default(),
            comparison_year: None,
            crisis_country: None,
            table_columns: Column::defaults(),
            status_message: None,
        }
    }
}

/// The full application state, independent of rendering.
///
/// The dataset is written once (startup load, or File → Open when that
/// failed) and only read afterwards.
pub struct AppState {
    dataset: OnceCell<Dataset>,
    /// Indices of rows passing the current selection (cached).
    visible_indices: Vec<usize>,
    pub ui: UiState,
}

impl AppState {
    pub fn new(layout: Layout) -> Self {
        Self {
            dataset: OnceCell::new(),
            visible_indices: Vec::new(),
            ui: UiState::new(layout),
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.get()
    }

    /// Number of rows passing the current filters.
    pub fn visible_len(&self) -> usize {
        self.visible_indices.len()
    }

    /// Load a file into the state. Failures end up in the status line.
    pub fn load(&mut self, path: &Path) {
        if self.dataset.get().is_some() {
            log::warn!("ignoring {}: a dataset is already loaded", path.display());
            self.ui.status_message = Some("A dataset is already loaded.".to_string());
            return;
        }
        match loader::load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows for {} countries from {}",
                    dataset.len(),
                    dataset.countries.len(),
                    path.display()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.ui.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and select everything.
    /// Returns `false` when a dataset was already present.
    pub fn set_dataset(&mut self, dataset: Dataset) -> bool {
        let selection = Selection::everything(&dataset);
        if self.dataset.set(dataset).is_err() {
            return false;
        }
        self.ui.selection = selection;
        self.ui.status_message = None;
        self.refilter();
        true
    }

    /// The current filtered view and the mutable UI state, borrowed together.
    pub fn view_and_ui(&mut self) -> (Option<View<'_>>, &mut UiState) {
        let view = self
            .dataset
            .get()
            .map(|ds| view_from_indices(ds, &self.visible_indices));
        (view, &mut self.ui)
    }

    /// Recompute `visible_indices` after a filter change and keep the
    /// dependent selectors pointing at data that is still visible.
    pub fn refilter(&mut self) {
        let Some(ds) = self.dataset.get() else {
            return;
        };
        self.visible_indices = filtered_indices(ds, &self.ui.selection);
        let view = view_from_indices(ds, &self.visible_indices);

        let years = available_years(&view);
        if !self
            .ui
            .comparison_year
            .is_some_and(|y| years.contains(&y))
        {
            self.ui.comparison_year = default_comparison_year(&years);
        }

        let countries = &self.ui.selection.countries;
        if !self
            .ui
            .crisis_country
            .is_some_and(|c| countries.contains(&c))
        {
            self.ui.crisis_country = countries.iter().next().copied();
        }
    }

    /// Change the year range; the bounds are clamped to the covered years.
    pub fn set_years(&mut self, years: YearRange) {
        let years = years.clamped();
        if years != self.ui.selection.years {
            self.ui.selection.years = years;
            self.refilter();
        }
    }

    /// Toggle a single country in the filter.
    pub fn toggle_country(&mut self, country: Country) {
        let selected = &mut self.ui.selection.countries;
        if !selected.remove(&country) {
            selected.insert(country);
        }
        self.refilter();
    }

    /// Select every country present in the data.
    pub fn select_all_countries(&mut self) {
        if let Some(ds) = self.dataset.get() {
            self.ui.selection.countries = ds.countries.clone();
            self.refilter();
        }
    }

    /// Deselect every country.
    pub fn select_no_countries(&mut self) {
        self.ui.selection.countries.clear();
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn loaded() -> AppState {
        let mut rows = Vec::new();
        for year in [2019, 2020, 2024, 2025] {
            rows.push(record(Country::Argentina, year, 100.0));
            rows.push(record(Country::Mexico, year, 250.0));
        }
        let mut state = AppState::new(Layout::Tabs);
        assert!(state.set_dataset(Dataset::from_records(rows)));
        state
    }

    #[test]
    fn starts_empty() {
        let mut state = AppState::new(Layout::Sections);
        assert!(state.dataset().is_none());
        let (view, ui) = state.view_and_ui();
        assert!(view.is_none());
        assert_eq!(ui.layout, Layout::Sections);
        assert_eq!(ui.table_columns.len(), 8);
    }

    #[test]
    fn loading_selects_everything() {
        let mut state = loaded();
        assert_eq!(state.visible_len(), 8);
        assert_eq!(state.ui.comparison_year, Some(2024));
        assert_eq!(state.ui.crisis_country, Some(Country::Argentina));
        let (view, _) = state.view_and_ui();
        assert_eq!(view.map(|v| v.len()), Some(8));
    }

    #[test]
    fn dataset_is_set_only_once() {
        let mut state = loaded();
        let replacement = Dataset::from_records(vec![record(Country::Peru, 2001, 1.0)]);
        assert!(!state.set_dataset(replacement));
        assert_eq!(state.dataset().map(Dataset::len), Some(8));
    }

    #[test]
    fn failed_load_reports_status() {
        let mut state = AppState::new(Layout::Tabs);
        state.load(Path::new("/nonexistent/data.csv"));
        assert!(state.dataset().is_none());
        assert!(state
            .ui
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Error")));
    }

    #[test]
    fn loads_from_disk_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(
            &path,
            "pais,anio,titulos_registrados_isbn,ejemplares_producidos_millones,\
facturacion_estimada_millones_usd,tirada_promedio_ejemplares,ejemplares_per_capita\n\
Chile,2010,5000,18.0,250.0,2500,1.05\n",
        )
        .unwrap();
        let mut state = AppState::new(Layout::Tabs);
        state.load(&path);
        assert_eq!(state.visible_len(), 1);
        assert_eq!(state.ui.crisis_country, Some(Country::Chile));

        state.load(&path);
        assert_eq!(
            state.ui.status_message.as_deref(),
            Some("A dataset is already loaded.")
        );
    }

    #[test]
    fn deselecting_all_countries_empties_the_view() {
        let mut state = loaded();
        state.select_no_countries();
        assert_eq!(state.visible_len(), 0);
        assert_eq!(state.ui.crisis_country, None);
        assert_eq!(state.ui.comparison_year, None);

        state.select_all_countries();
        assert_eq!(state.visible_len(), 8);
    }

    #[test]
    fn crisis_country_follows_selection() {
        let mut state = loaded();
        state.toggle_country(Country::Argentina);
        assert_eq!(state.visible_len(), 4);
        assert_eq!(state.ui.crisis_country, Some(Country::Mexico));
        state.toggle_country(Country::Argentina);
        assert_eq!(state.ui.crisis_country, Some(Country::Mexico));
    }

    #[test]
    fn comparison_year_resets_when_filtered_out() {
        let mut state = loaded();
        state.set_years(YearRange::new(1990, 2020));
        assert_eq!(state.ui.selection.years, YearRange::new(2000, 2020));
        assert_eq!(state.visible_len(), 4);
        assert_eq!(state.ui.comparison_year, Some(2020));

        state.ui.comparison_year = Some(2019);
        state.set_years(YearRange::new(2000, 2025));
        assert_eq!(state.ui.comparison_year, Some(2019));
    }
}
