use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

use crate::data::model::Country;

// ---------------------------------------------------------------------------
// Country colours
// ---------------------------------------------------------------------------

/// Fixed colour per country so every chart uses the same legend.
pub fn country_color(country: Country) -> Color32 {
    match country {
        Country::Argentina => Color32::from_rgb(0xf5, 0xc8, 0x42),
        Country::Mexico => Color32::from_rgb(0xff, 0x6b, 0x6b),
        Country::Colombia => Color32::from_rgb(0x4e, 0xcd, 0xc4),
        Country::Chile => Color32::from_rgb(0x74, 0xb9, 0xff),
        Country::Peru => Color32::from_rgb(0xa2, 0x9b, 0xfe),
        Country::Ecuador => Color32::from_rgb(0xfd, 0x79, 0xa8),
        Country::Bolivia => Color32::from_rgb(0x55, 0xef, 0xc4),
    }
}

/// Same colour with the given opacity, for filled areas.
pub fn translucent(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

// ---------------------------------------------------------------------------
// Heatmap scale: dark (low) → gold (high)
// ---------------------------------------------------------------------------

const HEAT_STOPS: [(f32, [u8; 3]); 4] = [
    (0.0, [0x1a, 0x1d, 0x27]),
    (0.3, [0x2d, 0x3a, 0x5c]),
    (0.6, [0xc1, 0x7f, 0x24]),
    (1.0, [0xf5, 0xc8, 0x42]),
];

/// Colour for a normalised position `t` in `[0, 1]`, interpolated in linear RGB.
pub fn heat_color(t: f32) -> Color32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let upper = HEAT_STOPS
        .iter()
        .position(|(stop, _)| *stop >= t)
        .unwrap_or(HEAT_STOPS.len() - 1)
        .max(1);
    let (s0, c0) = HEAT_STOPS[upper - 1];
    let (s1, c1) = HEAT_STOPS[upper];
    let local = ((t - s0) / (s1 - s0)).clamp(0.0, 1.0);

    let linear = |c: [u8; 3]| -> LinSrgb {
        Srgb::new(c[0], c[1], c[2]).into_format::<f32>().into_linear()
    };
    let mixed = linear(c0).mix(linear(c1), local);
    let out: Srgb<u8> = Srgb::<f32>::from_linear(mixed).into_format();
    Color32::from_rgb(out.red, out.green, out.blue)
}

/// Position of `value` within `[lo, hi]`, 0.5 when the range is degenerate.
pub fn normalise(value: f64, lo: f64, hi: f64) -> f32 {
    let range = hi - lo;
    if range.abs() < f64::EPSILON {
        0.5
    } else {
        ((value - lo) / range) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_scale_hits_its_end_stops() {
        assert_eq!(heat_color(0.0), Color32::from_rgb(0x1a, 0x1d, 0x27));
        assert_eq!(heat_color(1.0), Color32::from_rgb(0xf5, 0xc8, 0x42));
        assert_eq!(heat_color(-3.0), heat_color(0.0));
        assert_eq!(heat_color(f32::NAN), heat_color(0.0));
    }

    #[test]
    fn heat_scale_brightens_towards_the_top() {
        let low = heat_color(0.2);
        let high = heat_color(0.9);
        assert!(high.r() > low.r());
        assert!(high.g() > low.g());
    }

    #[test]
    fn every_country_has_a_distinct_colour() {
        let mut seen: Vec<Color32> = Country::ALL.iter().map(|&c| country_color(c)).collect();
        seen.sort_by_key(|c| c.to_array());
        seen.dedup();
        assert_eq!(seen.len(), Country::ALL.len());
    }

    #[test]
    fn normalise_handles_flat_ranges() {
        assert_eq!(normalise(5.0, 5.0, 5.0), 0.5);
        assert_eq!(normalise(15.0, 10.0, 20.0), 0.5);
        assert_eq!(normalise(20.0, 10.0, 20.0), 1.0);
    }
}
