use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::AqiCategory;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
/// Used for the per-year trend series.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Continuous ramps for heatmaps
// ---------------------------------------------------------------------------

/// Sequential ramp for concentration heatmaps: dark blue through green to
/// yellow for `t` in [0, 1].
pub fn sequential(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let hue = 250.0 - 190.0 * t; // 250° (blue) → 60° (yellow)
    let lightness = 0.22 + 0.55 * t;
    hsl_to_color32(Hsl::new(hue, 0.85, lightness))
}

/// Diverging ramp for correlation values: blue at -1, white at 0, red at +1.
pub fn diverging(t: f32) -> Color32 {
    let t = t.clamp(-1.0, 1.0);
    if t < 0.0 {
        hsl_to_color32(Hsl::new(222.0, 0.70, 0.95 + 0.48 * t))
    } else {
        hsl_to_color32(Hsl::new(2.0, 0.70, 0.95 - 0.48 * t))
    }
}

/// Neutral cell colour for undefined (NaN) heatmap entries.
pub fn undefined_cell() -> Color32 {
    Color32::from_gray(90)
}

// ---------------------------------------------------------------------------
// AQI category colors
// ---------------------------------------------------------------------------

/// The dashboard's fixed category colours.
pub fn category_color(cat: AqiCategory) -> Color32 {
    match cat {
        AqiCategory::Good => Color32::from_rgb(0, 160, 60),
        AqiCategory::Moderate => Color32::from_rgb(230, 200, 0),
        AqiCategory::UnhealthySensitive => Color32::from_rgb(240, 140, 0),
        AqiCategory::Unhealthy => Color32::from_rgb(210, 40, 40),
        AqiCategory::Hazardous => Color32::from_rgb(130, 50, 160),
    }
}

/// Readable text colour on top of a heatmap cell.
pub fn text_on(cell: Color32) -> Color32 {
    let luma =
        0.299 * cell.r() as f32 + 0.587 * cell.g() as f32 + 0.114 * cell.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_entries() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(5);
        assert_eq!(colors.len(), 5);
        for i in 0..colors.len() {
            for j in (i + 1)..colors.len() {
                assert_ne!(colors[i], colors[j]);
            }
        }
    }

    #[test]
    fn diverging_endpoints_differ_and_center_is_light() {
        let lo = diverging(-1.0);
        let mid = diverging(0.0);
        let hi = diverging(1.0);
        assert_ne!(lo, hi);
        // Near-white at zero correlation.
        assert!(mid.r() > 220 && mid.g() > 220 && mid.b() > 220);
    }

    #[test]
    fn every_category_has_its_own_color() {
        let mut seen = Vec::new();
        for cat in AqiCategory::ALL {
            let c = category_color(cat);
            assert!(!seen.contains(&c));
            seen.push(c);
        }
    }
}
