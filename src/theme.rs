use eframe::egui::{self, Color32, RichText, Stroke, Ui};

pub const BG_DARK: Color32 = Color32::from_rgb(0x0f, 0x11, 0x17);
pub const BG_CARD: Color32 = Color32::from_rgb(0x1a, 0x1d, 0x27);
pub const BG_CARD_2: Color32 = Color32::from_rgb(0x22, 0x26, 0x3a);
pub const GOLD: Color32 = Color32::from_rgb(0xf5, 0xc8, 0x42);
pub const CORAL: Color32 = Color32::from_rgb(0xff, 0x6b, 0x6b);
pub const TEAL: Color32 = Color32::from_rgb(0x4e, 0xcd, 0xc4);
pub const TEXT: Color32 = Color32::from_rgb(0xf0, 0xf0, 0xf0);
pub const MUTED: Color32 = Color32::from_rgb(0x88, 0x92, 0xa4);

/// Install the dark palette on the egui context.
pub fn apply(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = BG_CARD;
    visuals.window_fill = BG_CARD;
    visuals.extreme_bg_color = BG_DARK;
    visuals.faint_bg_color = BG_CARD_2;
    visuals.hyperlink_color = TEAL;
    visuals.override_text_color = Some(TEXT);
    visuals.selection.bg_fill = GOLD.gamma_multiply(0.35);
    visuals.selection.stroke = Stroke::new(1.0, GOLD);
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, GOLD.gamma_multiply(0.2));
    ctx.set_visuals(visuals);
}

/// Section heading with the accent colour.
pub fn section_heading(ui: &mut Ui, text: &str) {
    ui.add_space(8.0);
    ui.label(RichText::new(text).heading().color(GOLD));
    ui.add_space(4.0);
}

/// Chart title above a plot.
pub fn chart_title(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).strong().size(15.0).color(TEXT));
}

/// Highlighted explanation box shown at the top of a section.
pub fn insight(ui: &mut Ui, text: &str) {
    egui::Frame::group(ui.style())
        .fill(BG_CARD_2)
        .stroke(Stroke::new(1.0, GOLD.gamma_multiply(0.25)))
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(text).color(Color32::from_gray(0xcc)));
        });
    ui.add_space(6.0);
}

/// Yellow warning line used when a view has nothing to show.
pub fn warning(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(format!("⚠ {text}")).color(GOLD));
}

/// Neutral informational line.
pub fn info(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(format!("ℹ {text}")).color(TEAL));
}
