use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::config::Layout;
use crate::data::filter::{Selection, View};
use crate::data::model::{Measure, LAST_YEAR};
use crate::data::series::{available_years, default_comparison_year, digital_view, nearest_year};
use crate::data::summary::summarize;
use crate::state::{AppState, Tab, UiState};
use crate::theme;
use crate::ui::plot::{self, Reference};
use crate::ui::{metrics, table};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the dashboard in the layout chosen by the user.
///
/// Every layout draws from the same filtered view; only the arrangement of
/// the sections differs.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    let has_estimates = state.dataset().is_some_and(|ds| ds.has_estimates());
    let (view, ui_state) = state.view_and_ui();
    let Some(view) = view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to begin  (File → Open…)");
        });
        return;
    };

    header(ui, has_estimates);

    if view.is_empty() {
        theme::warning(ui, &empty_view_notice(&ui_state.selection));
        return;
    }
    if let Some(summary) = summarize(&view) {
        metrics::kpi_strip(ui, &summary);
    }
    ui.separator();

    match ui_state.layout {
        Layout::Tabs => tabbed(ui, &view, ui_state),
        Layout::Sections => stacked(ui, &view, ui_state),
        Layout::Minimal => minimal(ui, &view, ui_state),
    }
}

/// Why the view came out empty: no country ticked, or no rows in the years.
fn empty_view_notice(selection: &Selection) -> String {
    if selection.countries.is_empty() {
        "Select at least one country to see the data.".to_string()
    } else {
        format!(
            "No rows for the selected countries between {} and {}. Widen the year range.",
            selection.years.min, selection.years.max
        )
    }
}

fn header(ui: &mut Ui, has_estimates: bool) {
    ui.label(
        RichText::new("📚 Publishing Market of Latin America")
            .size(28.0)
            .strong()
            .color(theme::GOLD),
    );
    ui.label(
        RichText::new("7 countries · 25 years of data · Sources: CAL, CANIEM, CERLALC, CCL, CCdL, BNP, BNB")
            .color(theme::MUTED),
    );
    if has_estimates {
        ui.label(
            RichText::new(format!(
                "⚠ {LAST_YEAR} figures are estimates based on the previous year's trends."
            ))
            .italics()
            .small()
            .color(theme::MUTED),
        );
    }
    ui.separator();
}

fn tabbed(ui: &mut Ui, view: &View<'_>, ui_state: &mut UiState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut ui_state.tab, tab, tab.label());
        }
    });
    ui.separator();
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match ui_state.tab {
            Tab::Production => production(ui, view),
            Tab::Revenue => revenue(ui, view, ui_state),
            Tab::Crisis => crisis(ui, view, ui_state),
            Tab::Data => data(ui, view, ui_state),
        });
}

fn stacked(ui: &mut Ui, view: &View<'_>, ui_state: &mut UiState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            production(ui, view);
            ui.separator();
            revenue(ui, view, ui_state);
            ui.separator();
            crisis(ui, view, ui_state);
            ui.separator();
            data(ui, view, ui_state);
        });
}

fn minimal(ui: &mut Ui, view: &View<'_>, ui_state: &mut UiState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            production(ui, view);
            ui.separator();
            data(ui, view, ui_state);
        });
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn production(ui: &mut Ui, view: &View<'_>) {
    theme::section_heading(ui, "📦 Publishing Output");
    theme::insight(
        ui,
        "Books printed and new titles registered per year. Mexico leads in raw \
         volume thanks to its large state education sector, while Argentina \
         produces the most relative to its population. The stacked area shows \
         each country's share of the regional total.",
    );
    ui.columns(2, |cols: &mut [Ui]| {
        plot::country_lines(
            &mut cols[0],
            "copies_line",
            "Copies produced (millions)",
            view,
            Measure::Copies,
            None,
        );
        plot::country_lines(
            &mut cols[1],
            "titles_line",
            "ISBN titles registered per year",
            view,
            Measure::Titles,
            None,
        );
    });
    plot::stacked_area(
        ui,
        "copies_area",
        "Cumulative regional share of copies (stacked area)",
        view,
        Measure::Copies,
    );
}

fn revenue(ui: &mut Ui, view: &View<'_>, ui_state: &mut UiState) {
    theme::section_heading(ui, "💰 Revenue and the Book Economy");
    theme::insight(
        ui,
        "The money the publishing industry moves. The heatmap shows at a glance \
         which years and countries did best or worst; the bubble chart compares \
         three variables for a single year.",
    );
    ui.columns(2, |cols: &mut [Ui]| {
        plot::grouped_bars(
            &mut cols[0],
            "revenue_bars",
            "Estimated revenue (USD millions)",
            view,
            Measure::Revenue,
        );
        plot::country_lines(
            &mut cols[1],
            "per_capita_line",
            "Copies per inhabitant",
            view,
            Measure::PerCapita,
            Some(Reference {
                y: 1.0,
                label: "1 copy/inhabitant",
            }),
        );
    });
    plot::heatmap(
        ui,
        "revenue_heatmap",
        "Revenue heatmap (USD M) · gold = higher, dark = lower",
        view,
        Measure::Revenue,
    );

    ui.separator();
    ui.label(RichText::new("🏆 Single-year comparison").strong().color(theme::TEAL));
    theme::insight(
        ui,
        "Pick a year to see how the ranking changes. The bubble chart shows \
         revenue (x), copies per capita (y) and ISBN titles (bubble size) at once.",
    );

    let years = available_years(view);
    let (Some(&first), Some(&last)) = (years.first(), years.last()) else {
        return;
    };
    let mut year = ui_state
        .comparison_year
        .or_else(|| default_comparison_year(&years))
        .unwrap_or(last);
    ui.add(egui::Slider::new(&mut year, first..=last).text("comparison year"));
    // Years missing from the view snap to the closest one that has rows.
    let year = nearest_year(&years, year).unwrap_or(last);
    ui_state.comparison_year = Some(year);

    ui.columns(2, |cols: &mut [Ui]| {
        plot::revenue_ranking(&mut cols[0], "revenue_ranking", view, year);
        plot::revenue_bubbles(&mut cols[1], "revenue_bubbles", view, year);
    });
}

fn crisis(ui: &mut Ui, view: &View<'_>, ui_state: &mut UiState) {
    theme::section_heading(ui, "🔴 Crises, Print Runs and Digitalisation");
    theme::insight(
        ui,
        "Three key shifts: how historical events hit production, the structural \
         fall of the average print run (copies printed per title), and the rise \
         of digital books since 2012.",
    );

    let countries: Vec<_> = ui_state.selection.countries.iter().copied().collect();
    if let Some(current) = ui_state.crisis_country {
        egui::ComboBox::from_id_salt("crisis_country")
            .selected_text(current.name())
            .show_ui(ui, |ui: &mut Ui| {
                for country in &countries {
                    ui.selectable_value(&mut ui_state.crisis_country, Some(*country), country.name());
                }
            });
    }
    if let Some(country) = ui_state.crisis_country {
        plot::crisis_history(ui, "crisis_history", view, country);
    }

    ui.separator();
    ui.columns(2, |cols: &mut [Ui]| {
        plot::country_lines(
            &mut cols[0],
            "print_run_line",
            "Average print run per title (copies/title)",
            view,
            Measure::PrintRun,
            None,
        );
        let digital = digital_view(view);
        if digital.is_empty() {
            theme::chart_title(&mut cols[1], "Digital format adoption (%)");
            theme::info(
                &mut cols[1],
                "No digital-format data in the selected period (available from 2012).",
            );
        } else {
            plot::country_lines(
                &mut cols[1],
                "digital_line",
                "Digital format adoption (%)",
                &digital,
                Measure::DigitalPct,
                Some(Reference {
                    y: 25.0,
                    label: "25% maturity threshold",
                }),
            );
        }
    });
}

fn data(ui: &mut Ui, view: &View<'_>, ui_state: &mut UiState) {
    theme::section_heading(ui, "🗂 Full Data and Download");
    theme::insight(
        ui,
        "Browse the raw rows, choose which columns to show, and download the CSV \
         with the sidebar filters applied.",
    );
    table::data_table(ui, view, ui_state);
    ui.separator();
    ui.label(RichText::new("⬇ Download CSV").strong().color(theme::TEAL));
    table::download(ui, view, ui_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Country, YearRange};

    #[test]
    fn empty_notice_names_the_cause() {
        let no_countries = Selection::new(YearRange::FULL, Vec::<Country>::new());
        assert!(empty_view_notice(&no_countries).contains("at least one country"));

        let no_years = Selection::new(YearRange::new(2003, 2004), [Country::Bolivia]);
        let notice = empty_view_notice(&no_years);
        assert!(notice.contains("2003 and 2004"));
        assert!(!notice.contains("at least one country"));
    }
}
