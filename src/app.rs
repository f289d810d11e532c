use eframe::egui;

use crate::config::Config;
use crate::state::AppState;
use crate::theme;
use crate::ui::{layout, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct LibrosApp {
    pub state: AppState,
}

impl LibrosApp {
    /// Apply the dark theme and load the configured dataset.
    ///
    /// A failed load is not fatal: the error shows in the top bar and the
    /// user can pick another file through File → Open.
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        theme::apply(&cc.egui_ctx);
        let mut state = AppState::new(config.layout);
        state.load(&config.data);
        Self { state }
    }
}

impl eframe::App for LibrosApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            layout::dashboard(ui, &mut self.state);
        });
    }
}
