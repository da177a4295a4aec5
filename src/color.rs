use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Fixed dashboard colours
// ---------------------------------------------------------------------------

/// Bar colour for single-series charts.
pub const ACCENT: Color32 = Color32::from_rgb(0x5F, 0x99, 0xAE);
/// Attrition "Yes" bars.
pub const ATTRITION_YES: Color32 = Color32::from_rgb(0x56, 0x02, 0x1F);
pub const KPI_BORDER: Color32 = Color32::from_rgb(0xAD, 0xB2, 0xD4);
pub const KPI_FILL: Color32 = Color32::from_rgb(0xE7, 0xFB, 0xE6);

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
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Sequential blue scale for correlation cells: -1 → near white, 1 → navy.
pub fn blues(r: f64) -> Color32 {
    let t = ((r.clamp(-1.0, 1.0) + 1.0) / 2.0) as f32;
    let light: LinSrgb = Srgb::new(0.97, 0.98, 1.0).into_linear();
    let dark: LinSrgb = Srgb::new(0.03, 0.19, 0.42).into_linear();
    to_color32(Srgb::from_linear(light.mix(dark, t)))
}

// ---------------------------------------------------------------------------
// Series colours: series name → Color32
// ---------------------------------------------------------------------------

/// Maps series names of one chart to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for a chart's series names.
    ///
    /// A Yes/No attrition pair keeps the dashboard's fixed red/teal scheme;
    /// anything else gets evenly spaced hues.
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let names: Vec<&str> = names.into_iter().collect();
        let is_attrition = !names.is_empty() && names.iter().all(|n| *n == "Yes" || *n == "No");

        let mapping = if is_attrition {
            names
                .iter()
                .map(|n| {
                    let c = if *n == "Yes" { ATTRITION_YES } else { ACCENT };
                    (n.to_string(), c)
                })
                .collect()
        } else if names.len() == 1 {
            names.iter().map(|n| (n.to_string(), ACCENT)).collect()
        } else {
            names
                .iter()
                .zip(generate_palette(names.len()))
                .map(|(n, c)| (n.to_string(), c))
                .collect()
        };

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a series name.
    pub fn color_for(&self, name: &str) -> Color32 {
        self.mapping.get(name).copied().unwrap_or(self.default_color)
    }
}
