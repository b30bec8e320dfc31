use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::analysis::charts::MISSING_LABEL;
use crate::data::model::CategoryColumn;

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

// ---------------------------------------------------------------------------
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of a categorical column to distinct colours.
/// Built from the whole table so a category keeps its colour while the
/// filters change.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: CategoryColumn,
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(column: CategoryColumn, unique_values: &BTreeSet<String>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping = unique_values.iter().cloned().zip(palette).collect();

        ColorMap {
            column,
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Colour for a category; unknown values and `(missing)` are grey.
    pub fn color_for(&self, value: &str) -> Color32 {
        if value == MISSING_LABEL {
            return self.default_color;
        }
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_size() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        assert_ne!(colors[0], colors[2]);
    }

    #[test]
    fn test_color_lookup() {
        let values: BTreeSet<String> = ["gas", "diesel", "hybrid"].iter().map(|s| s.to_string()).collect();
        let map = ColorMap::new(CategoryColumn::Fuel, &values);
        assert_ne!(map.color_for("gas"), map.color_for("diesel"));
        assert_eq!(map.color_for("electric"), Color32::GRAY);
        assert_eq!(map.color_for(MISSING_LABEL), Color32::GRAY);
    }
}
