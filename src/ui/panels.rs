use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::country_color;
use crate::config::Layout;
use crate::data::model::{YearRange, FIRST_YEAR, LAST_YEAR};
use crate::state::AppState;
use crate::theme;

// ---------------------------------------------------------------------------
// Left side panel – global filters
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔎 Filters");
    ui.separator();

    let Some(dataset) = state.dataset() else {
        ui.label("No dataset loaded.");
        return;
    };
    // Clone what we need so we can mutate state inside the loop.
    let countries = dataset.countries.clone();
    let coverage = dataset.year_bounds;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year range ----
            ui.strong("📅 Year range");
            if let Some((first, last)) = coverage {
                ui.label(RichText::new(format!("Data covers {first}–{last}")).small().color(theme::MUTED));
            }
            let current = state.ui.selection.years;
            let mut from = current.min;
            let mut to = current.max;
            ui.add(egui::Slider::new(&mut from, FIRST_YEAR..=LAST_YEAR).text("from"));
            ui.add(egui::Slider::new(&mut to, FIRST_YEAR..=LAST_YEAR).text("to"));
            if from != current.min || to != current.max {
                // Dragging one end past the other drags both.
                let range = if from != current.min {
                    YearRange::new(from, to.max(from))
                } else {
                    YearRange::new(from.min(to), to)
                };
                state.set_years(range);
            }
            ui.separator();

            // ---- Countries ----
            let n_selected = state.ui.selection.countries.len();
            ui.strong(format!("🌎 Countries  ({n_selected}/{})", countries.len()));
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_countries();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_countries();
                }
            });
            for country in &countries {
                let mut checked = state.ui.selection.countries.contains(country);
                let text = RichText::new(country.name()).color(country_color(*country));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_country(*country);
                }
            }
            ui.separator();

            ui.label(
                RichText::new("Sources: CAL · CANIEM · CERLALC · CCL · CCdL · BNP · BNB")
                    .small()
                    .color(theme::MUTED),
            );
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let can_open = state.dataset().is_none();
            if ui
                .add_enabled(can_open, egui::Button::new("Open…"))
                .clicked()
            {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.visible_len() > 0, egui::Button::new("Export CSV…"))
                .clicked()
            {
                crate::ui::table::save_view_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label("Layout:");
        for layout in Layout::ALL {
            ui.selectable_value(&mut state.ui.layout, layout, layout.label());
        }

        ui.separator();

        if let Some(ds) = state.dataset() {
            ui.label(format!(
                "{} rows loaded, {} visible",
                ds.len(),
                state.visible_len()
            ));
        }

        if let Some(msg) = &state.ui.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                theme::TEAL
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open publishing market data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}
