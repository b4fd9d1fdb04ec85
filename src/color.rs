use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Brand accent used when a builder has no assigned colour.
pub const ACCENT: Color32 = Color32::from_rgb(0, 128, 255);

// ---------------------------------------------------------------------------
// Color mapping: builder → Color32
// ---------------------------------------------------------------------------

/// Assigns each builder a distinct colour for the scatter plot.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map from the (sorted, distinct) builder list.
    pub fn new(builders: &[String]) -> Self {
        let mapping = builders
            .iter()
            .cloned()
            .zip(generate_palette(builders.len()))
            .collect();
        ColorMap { mapping }
    }

    pub fn color_for(&self, builder: &str) -> Color32 {
        self.mapping.get(builder).copied().unwrap_or(ACCENT)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }
}
