use eframe::egui::{self, RichText, Stroke, Ui};

use crate::data::summary::Summary;
use crate::theme;

// ---------------------------------------------------------------------------
// KPI strip
// ---------------------------------------------------------------------------

/// Five headline cards above the charts.
pub fn kpi_strip(ui: &mut Ui, summary: &Summary) {
    let cards = [
        (
            "📦 Total copies (M)",
            format_thousands(summary.total_copies),
            None,
        ),
        (
            "💵 Total revenue (USD M)",
            format_thousands(summary.total_revenue),
            None,
        ),
        (
            "📖 ISBN titles",
            format_thousands(summary.total_titles),
            None,
        ),
        (
            "📊 Peak per capita",
            format!("{:.2}", summary.max_per_capita),
            None,
        ),
        (
            "🥇 Leading country",
            summary.leading_country.to_string(),
            Some(format!("Peak in {}", summary.leading_year)),
        ),
    ];

    ui.columns(cards.len(), |cols: &mut [Ui]| {
        for (ui, (label, value, delta)) in cols.iter_mut().zip(cards) {
            card(ui, label, &value, delta.as_deref());
        }
    });
}

fn card(ui: &mut Ui, label: &str, value: &str, delta: Option<&str>) {
    egui::Frame::group(ui.style())
        .fill(theme::BG_CARD_2)
        .stroke(Stroke::new(1.0, theme::GOLD.gamma_multiply(0.2)))
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(label.to_uppercase()).small().color(theme::MUTED));
            ui.label(RichText::new(value).size(24.0).strong().color(theme::GOLD));
            if let Some(delta) = delta {
                ui.label(RichText::new(format!("↑ {delta}")).small().color(theme::TEAL));
            }
        });
}

/// Round to a whole number and group thousands with commas.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1234567.8), "1,234,568");
        assert_eq!(format_thousands(-4321.0), "-4,321");
    }
}
