use std::ops::RangeInclusive;

use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{
    AxisHints, Bar, BarChart, Corner, GridMark, HLine, HPlacement, Legend, Line, LineStyle, Plot,
    PlotPoint, PlotPoints, PlotUi, Points, Polygon, Text, VLine,
};

use crate::color::{country_color, heat_color, normalise, translucent};
use crate::data::filter::{filter, Selection, View};
use crate::data::model::{Country, Measure, YearRange};
use crate::data::series::{
    bubble_radius, historical_events, ranking_for_year, series_by_country, stacked_by_year,
    DualAxis,
};
use crate::data::summary::pivot_by_country_year;
use crate::theme;

const CHART_HEIGHT: f32 = 300.0;
const BUBBLE_MAX_RADIUS: f32 = 30.0;

/// A horizontal reference line drawn across a chart.
pub struct Reference {
    pub y: f64,
    pub label: &'static str,
}

// ---------------------------------------------------------------------------
// Shared plot setup
// ---------------------------------------------------------------------------

fn base_plot<'a>(id: &str, x_label: &str, y_label: &str) -> Plot<'a> {
    Plot::new(id.to_owned())
        .height(CHART_HEIGHT)
        .legend(Legend::default().position(Corner::LeftTop))
        .x_axis_label(x_label.to_owned())
        .y_axis_label(y_label.to_owned())
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
}

fn whole_number(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    if (mark.value - mark.value.round()).abs() < 1e-6 {
        format!("{:.0}", mark.value)
    } else {
        String::new()
    }
}

/// Label axis ticks that fall on an integer index with the matching name.
fn index_labels(names: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        names.get(idx as usize).cloned().unwrap_or_default()
    }
}

fn country_line(plot_ui: &mut PlotUi, country: Country, points: &[[f64; 2]]) {
    let color = country_color(country);
    plot_ui.line(
        Line::new(PlotPoints::from(points.to_vec()))
            .name(country.name())
            .color(color)
            .width(2.0),
    );
    plot_ui.points(
        Points::new(PlotPoints::from(points.to_vec()))
            .name(country.name())
            .color(color)
            .radius(3.0),
    );
}

fn reference_line(plot_ui: &mut PlotUi, reference: &Reference) {
    plot_ui.hline(
        HLine::new(reference.y)
            .name(reference.label)
            .color(Color32::from_white_alpha(64))
            .style(LineStyle::dotted_dense()),
    );
}

// ---------------------------------------------------------------------------
// Line and area charts
// ---------------------------------------------------------------------------

/// One line with markers per country, `measure` against year.
pub fn country_lines(
    ui: &mut Ui,
    id: &str,
    title: &str,
    view: &View<'_>,
    measure: Measure,
    reference: Option<Reference>,
) {
    theme::chart_title(ui, title);
    let series = series_by_country(view, measure);
    base_plot(id, "Year", measure.unit())
        .x_axis_formatter(whole_number)
        .show(ui, |plot_ui| {
            for s in &series {
                country_line(plot_ui, s.country, &s.points);
            }
            if let Some(reference) = &reference {
                reference_line(plot_ui, reference);
            }
        });
}

/// Regional total split by country, stacked in country order.
pub fn stacked_area(ui: &mut Ui, id: &str, title: &str, view: &View<'_>, measure: Measure) {
    theme::chart_title(ui, title);
    let bands = stacked_by_year(view, measure);
    base_plot(id, "Year", measure.unit())
        .x_axis_formatter(whole_number)
        .include_y(0.0)
        .show(ui, |plot_ui| {
            for band in &bands {
                let color = country_color(band.country);
                // Quads between consecutive years; each one is convex.
                for pair in band.points.windows(2) {
                    let (x0, lo0, hi0) = pair[0];
                    let (x1, lo1, hi1) = pair[1];
                    let quad = vec![
                        [x0 as f64, lo0],
                        [x1 as f64, lo1],
                        [x1 as f64, hi1],
                        [x0 as f64, hi0],
                    ];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(quad))
                            .fill_color(translucent(color, 150))
                            .stroke(Stroke::NONE),
                    );
                }
                let upper: Vec<[f64; 2]> = band
                    .points
                    .iter()
                    .map(|&(year, _, hi)| [year as f64, hi])
                    .collect();
                plot_ui.line(
                    Line::new(PlotPoints::from(upper))
                        .name(band.country.name())
                        .color(color)
                        .width(1.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Bars grouped by year, one colour per country.
pub fn grouped_bars(ui: &mut Ui, id: &str, title: &str, view: &View<'_>, measure: Measure) {
    theme::chart_title(ui, title);
    let series = series_by_country(view, measure);
    let n = series.len().max(1) as f64;
    let width = 0.8 / n;
    base_plot(id, "Year", measure.unit())
        .x_axis_formatter(whole_number)
        .include_y(0.0)
        .show(ui, |plot_ui| {
            for (k, s) in series.iter().enumerate() {
                let offset = (k as f64 - (n - 1.0) / 2.0) * width;
                let bars = s
                    .points
                    .iter()
                    .map(|&[year, value]| {
                        Bar::new(year + offset, value)
                            .width(width)
                            .name(format!("{} {year:.0}", s.country))
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(s.country.name())
                        .color(country_color(s.country)),
                );
            }
        });
}

/// Horizontal revenue ranking for one year, smallest at the bottom.
pub fn revenue_ranking(ui: &mut Ui, id: &str, view: &View<'_>, year: i32) {
    theme::chart_title(ui, &format!("Revenue ranking in {year}"));
    let rows = ranking_for_year(view, year);
    let names: Vec<String> = rows.iter().map(|r| r.country.to_string()).collect();
    Plot::new(id.to_owned())
        .height(CHART_HEIGHT)
        .x_axis_label("USD millions")
        .y_axis_formatter(index_labels(names))
        .include_x(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, r) in rows.iter().enumerate() {
                let value = r.revenue_estimate_usd_millions;
                let bar = Bar::new(i as f64, value)
                    .width(0.7)
                    .name(r.country.name());
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .horizontal()
                        .color(country_color(r.country)),
                );
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(value, i as f64),
                        RichText::new(format!("  USD {value:.0}M")).color(Color32::from_gray(0xdd)),
                    )
                    .anchor(Align2::LEFT_CENTER),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

/// Country × year grid of `measure`; gaps stay empty.
pub fn heatmap(ui: &mut Ui, id: &str, title: &str, view: &View<'_>, measure: Measure) {
    theme::chart_title(ui, title);
    let pivot = pivot_by_country_year(view, measure);
    let Some((lo, hi)) = pivot.value_range() else {
        theme::info(ui, "No values to display for the current selection.");
        return;
    };
    if !pivot.duplicates().is_empty() {
        ui.label(
            RichText::new(format!(
                "{} country-year pairs appear more than once; their mean is shown.",
                pivot.duplicates().len()
            ))
            .small()
            .color(theme::MUTED),
        );
    }

    // First country on the top row.
    let n = pivot.countries.len();
    let names: Vec<String> = pivot
        .countries
        .iter()
        .rev()
        .map(|c| c.to_string())
        .collect();

    Plot::new(id.to_owned())
        .height(40.0 + 32.0 * n as f32)
        .x_axis_formatter(whole_number)
        .y_axis_formatter(index_labels(names))
        .show_grid(false)
        .allow_scroll(false)
        .allow_drag(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for (row, &country) in pivot.countries.iter().enumerate() {
                let y = (n - 1 - row) as f64;
                for &year in &pivot.years {
                    let Some(value) = pivot.get(country, year) else {
                        continue;
                    };
                    let x = year as f64;
                    let cell = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(cell))
                            .fill_color(heat_color(normalise(value, lo, hi)))
                            .stroke(Stroke::new(0.5, theme::BG_DARK)),
                    );
                    plot_ui.text(Text::new(
                        PlotPoint::new(x, y),
                        RichText::new(format!("{value:.0}"))
                            .size(9.0)
                            .color(Color32::WHITE),
                    ));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Bubble scatter
// ---------------------------------------------------------------------------

/// Revenue (x) against per-capita copies (y), bubble area by ISBN titles.
pub fn revenue_bubbles(ui: &mut Ui, id: &str, view: &View<'_>, year: i32) {
    theme::chart_title(ui, &format!("Revenue vs. per capita, {year}"));
    let rows = ranking_for_year(view, year);
    let max_titles = rows
        .iter()
        .map(|r| r.isbn_titles_registered)
        .fold(0.0, f64::max);
    base_plot(id, "Revenue (USD M)", "Copies/inhabitant").show(ui, |plot_ui| {
        for r in &rows {
            let at = [r.revenue_estimate_usd_millions, r.copies_per_capita];
            plot_ui.points(
                Points::new(PlotPoints::from(vec![at]))
                    .name(r.country.name())
                    .color(translucent(country_color(r.country), 190))
                    .radius(bubble_radius(
                        r.isbn_titles_registered,
                        max_titles,
                        BUBBLE_MAX_RADIUS,
                    )),
            );
            plot_ui.text(
                Text::new(
                    PlotPoint::new(at[0], at[1]),
                    RichText::new(r.country.name()).color(Color32::from_gray(0xdd)),
                )
                .anchor(Align2::CENTER_BOTTOM),
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Dual-axis history chart
// ---------------------------------------------------------------------------

/// Copies produced (left axis) and revenue (right axis) for one country,
/// with a marker for every historical event.
pub fn crisis_history(ui: &mut Ui, id: &str, view: &View<'_>, country: Country) {
    theme::chart_title(
        ui,
        &format!("{country} · Production and revenue with historical events"),
    );
    let country_view = filter(view.iter(), &Selection::new(YearRange::FULL, [country]));
    let copies = series_by_country(&country_view, Measure::Copies);
    let revenue = series_by_country(&country_view, Measure::Revenue);
    let copies = copies.first().map(|s| s.points.clone()).unwrap_or_default();
    let revenue = revenue.first().map(|s| s.points.clone()).unwrap_or_default();
    let events = historical_events(view, country);

    let axis = DualAxis::fit(
        copies.iter().map(|p| p[1]),
        revenue.iter().map(|p| p[1]),
    );
    let peak = copies.iter().map(|p| p[1]).fold(0.0, f64::max);
    let scaled_revenue: Vec<[f64; 2]> = revenue
        .iter()
        .map(|&[year, v]| [year, axis.to_plot(v)])
        .collect();

    let color = country_color(country);
    Plot::new(id.to_owned())
        .height(CHART_HEIGHT + 60.0)
        .legend(Legend::default().position(Corner::LeftTop))
        .x_axis_formatter(whole_number)
        .custom_y_axes(vec![
            AxisHints::new_y().label("Millions of copies"),
            AxisHints::new_y()
                .label("Revenue (USD M)")
                .placement(HPlacement::Right)
                .formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
                    format!("{:.0}", axis.to_secondary(mark.value))
                }),
        ])
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(copies.clone()))
                    .name("Copies produced")
                    .color(color)
                    .width(3.0)
                    .fill(0.0_f32),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(copies))
                    .name("Copies produced")
                    .color(color)
                    .radius(3.5),
            );
            plot_ui.line(
                Line::new(PlotPoints::from(scaled_revenue))
                    .name("Revenue (USD M)")
                    .color(theme::CORAL)
                    .width(2.0)
                    .style(LineStyle::dashed_loose()),
            );
            for event in &events {
                let x = event.year as f64;
                plot_ui.vline(
                    VLine::new(x)
                        .color(translucent(theme::CORAL, 128))
                        .style(LineStyle::dotted_dense())
                        .width(1.5),
                );
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(x, peak * 0.95),
                        RichText::new(format!("⚡ {}", event.label))
                            .size(10.0)
                            .color(theme::CORAL),
                    )
                    .anchor(Align2::RIGHT_TOP),
                );
            }
        });
}
