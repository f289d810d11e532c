use eframe::egui::{Align, Layout, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::export::{export_file_name, save_csv};
use crate::data::filter::View;
use crate::data::model::Column;
use crate::state::{AppState, UiState};
use crate::theme;

// ---------------------------------------------------------------------------
// Raw-data table
// ---------------------------------------------------------------------------

/// Column picker plus the filtered rows, sorted by country and year.
pub fn data_table(ui: &mut Ui, view: &View<'_>, ui_state: &mut UiState) {
    ui.strong("📊 Columns to show");
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for column in Column::ALL {
            let mut shown = ui_state.table_columns.contains(&column);
            if ui.checkbox(&mut shown, column.header()).changed() {
                if shown {
                    ui_state.table_columns.insert(column);
                } else {
                    ui_state.table_columns.remove(&column);
                }
            }
        }
    });
    ui.add_space(4.0);

    // BTreeSet iteration keeps CSV header order.
    let columns: Vec<Column> = ui_state.table_columns.iter().copied().collect();
    if columns.is_empty() {
        theme::warning(ui, "Select at least one column to show the table.");
        return;
    }

    let rows = view.sorted_by_country_year();
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(TableColumn::auto().at_least(60.0).clip(true), columns.len())
        .min_scrolled_height(0.0)
        .max_scroll_height(450.0)
        .header(22.0, |mut header| {
            for column in &columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(column.header());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let record = rows[row.index()];
                for column in &columns {
                    row.col(|ui: &mut Ui| {
                        let text = column.cell_text(record);
                        if column.is_numeric() {
                            ui.with_layout(Layout::right_to_left(Align::Center), |ui: &mut Ui| {
                                ui.label(text);
                            });
                        } else {
                            ui.label(text);
                        }
                    });
                }
            });
        });
}

// ---------------------------------------------------------------------------
// CSV download
// ---------------------------------------------------------------------------

/// Summary of what the download will contain, and the button that saves it.
pub fn download(ui: &mut Ui, view: &View<'_>, ui_state: &mut UiState) {
    let years = ui_state.selection.years;
    ui.label(format!(
        "The file will hold {} rows for {} country(ies) over {}–{}.",
        view.len(),
        ui_state.selection.countries.len(),
        years.min,
        years.max
    ));
    if ui
        .button(RichText::new("⬇ Download filtered CSV").strong())
        .on_hover_text("Saves the rows that pass the sidebar filters")
        .clicked()
    {
        ui_state.status_message = Some(save_with_dialog(view, ui_state));
    }
}

/// Save the current view through the File menu.
pub fn save_view_dialog(state: &mut AppState) {
    let (view, ui_state) = state.view_and_ui();
    if let Some(view) = view {
        ui_state.status_message = Some(save_with_dialog(&view, ui_state));
    }
}

/// Ask for a destination and write the view there; returns the status line.
fn save_with_dialog(view: &View<'_>, ui_state: &UiState) -> String {
    let file_name = export_file_name(ui_state.selection.years);
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save filtered data")
        .set_file_name(&file_name)
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return "Export cancelled.".to_string();
    };

    match save_csv(view, &path) {
        Ok(rows) => {
            log::info!("Exported {rows} rows to {}", path.display());
            format!("Saved {rows} rows to {}", path.display())
        }
        Err(e) => {
            log::error!("Failed to export CSV: {e:#}");
            format!("Error: {e:#}")
        }
    }
}
