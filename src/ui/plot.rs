use std::f32::consts::TAU;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart as PlotBarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, LineStyle, Plot,
    PlotPoints, Points,
};

use crate::charts::{BarChart, BoxChart, ChartResult, DonutChart, Heatmap, HierarchyTable, ScatterChart};
use crate::color::{self, ColorMap};
use crate::data::aggregate::Stat;

const PLOT_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Chart frame: title + inline error
// ---------------------------------------------------------------------------

/// Draw a titled chart, or its error in place of the chart.
pub fn chart_frame<T>(ui: &mut Ui, title: &str, result: &ChartResult<T>, draw: impl FnOnce(&mut Ui, &T)) {
    egui::Frame::group(ui.style())
        .inner_margin(10.0)
        .show(ui, |ui: &mut Ui| {
            ui.label(RichText::new(title).strong().size(16.0));
            match result {
                Ok(chart) => draw(ui, chart),
                Err(e) => {
                    log::warn!("{title} failed: {e}");
                    ui.label(RichText::new(format!("{title} error: {e}")).color(Color32::RED));
                }
            }
        });
}

/// Tick label for a categorical x axis; blank between categories.
fn category_label(categories: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

/// Horizontal offset of series `i` of `n` side-by-side series.
fn group_offset(i: usize, n: usize, width: f64) -> f64 {
    (i as f64 - (n as f64 - 1.0) / 2.0) * width
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

pub fn bar_chart(ui: &mut Ui, id: &str, chart: &BarChart) {
    let colors = ColorMap::new(chart.series.iter().map(|s| s.name.as_str()));
    let n = chart.series.len().max(1);
    let width = 0.8 / n as f64;
    let categories = chart.categories.clone();
    let show_labels = chart.show_category_labels;

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .show_grid(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            if show_labels {
                category_label(&categories, mark.value)
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            for (si, series) in chart.series.iter().enumerate() {
                let offset = group_offset(si, n, width);
                let bars: Vec<Bar> = series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(ci, v)| {
                        Bar::new(ci as f64 + offset, *v)
                            .width(width)
                            .name(&chart.categories[ci])
                    })
                    .collect();
                plot_ui.bar_chart(
                    PlotBarChart::new(bars)
                        .name(&series.name)
                        .color(colors.color_for(&series.name)),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Box plots
// ---------------------------------------------------------------------------

pub fn box_chart(ui: &mut Ui, id: &str, chart: &BoxChart) {
    let colors = ColorMap::new(chart.series.iter().map(|s| s.name.as_str()));
    let n = chart.series.len().max(1);
    let width = 0.8 / n as f64;
    let categories = chart.categories.clone();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .y_axis_label(chart.y_label.clone())
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| category_label(&categories, mark.value))
        .show(ui, |plot_ui| {
            for (si, series) in chart.series.iter().enumerate() {
                let offset = group_offset(si, n, width);
                let boxes: Vec<BoxElem> = series
                    .boxes
                    .iter()
                    .map(|(ci, s)| {
                        BoxElem::new(
                            *ci as f64 + offset,
                            BoxSpread::new(s.min, s.q1, s.median, s.q3, s.max),
                        )
                        .box_width(width * 0.9)
                        .name(&chart.categories[*ci])
                    })
                    .collect();
                plot_ui.box_plot(
                    BoxPlot::new(boxes)
                        .name(&series.name)
                        .color(colors.color_for(&series.name)),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

pub fn scatter_chart(ui: &mut Ui, id: &str, chart: &ScatterChart) {
    let colors = ColorMap::new(chart.series.iter().map(|s| s.name.as_str()));

    Plot::new(id)
        .height(PLOT_HEIGHT * 1.5)
        .legend(Legend::default())
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let points: PlotPoints = series.points.clone().into();
                plot_ui.points(
                    Points::new(points)
                        .radius(3.0)
                        .name(&series.name)
                        .color(colors.color_for(&series.name).gamma_multiply(0.7)),
                );
            }
            if let Some([start, end]) = chart.trend {
                plot_ui.line(
                    Line::new(PlotPoints::from(vec![start, end]))
                        .name("Trend")
                        .color(Color32::GRAY)
                        .style(LineStyle::dashed_loose())
                        .width(2.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Donut (job levels)
// ---------------------------------------------------------------------------

pub fn donut_chart(ui: &mut Ui, chart: &DonutChart) {
    let total = chart.total();
    if total <= 0.0 {
        ui.label("No employees match the current filters.");
        return;
    }
    let palette = color::generate_palette(chart.slices.len());

    ui.horizontal(|ui: &mut Ui| {
        let size = PLOT_HEIGHT.min(ui.available_width() * 0.6);
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(size), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let outer = size * 0.48;
        let inner = outer * 0.5;

        let mut start = -TAU / 4.0;
        for ((_, value), fill) in chart.slices.iter().zip(&palette) {
            let sweep = (*value / total) as f32 * TAU;
            let steps = ((sweep / 0.05).ceil() as usize).max(1);
            for k in 0..steps {
                let a0 = start + sweep * k as f32 / steps as f32;
                let a1 = start + sweep * (k + 1) as f32 / steps as f32;
                let at = |r: f32, a: f32| Pos2::new(center.x + r * a.cos(), center.y + r * a.sin());
                painter.add(Shape::convex_polygon(
                    vec![at(outer, a0), at(outer, a1), at(inner, a1), at(inner, a0)],
                    *fill,
                    Stroke::NONE,
                ));
            }
            let mid = start + sweep / 2.0;
            let r = (outer + inner) / 2.0;
            painter.text(
                Pos2::new(center.x + r * mid.cos(), center.y + r * mid.sin()),
                Align2::CENTER_CENTER,
                format!("{:.0}%", value / total * 100.0),
                FontId::proportional(12.0),
                Color32::BLACK,
            );
            start += sweep;
        }

        ui.vertical(|ui: &mut Ui| {
            ui.strong("Job Levels");
            for ((label, value), fill) in chart.slices.iter().zip(&palette) {
                ui.label(RichText::new(format!("■ {label}  ({value})")).color(*fill));
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Heatmap (correlation)
// ---------------------------------------------------------------------------

pub fn heatmap(ui: &mut Ui, chart: &Heatmap) {
    let n = chart.labels.len();
    let label_width = 130.0;
    let cell = ((ui.available_width() - label_width) / n as f32).clamp(28.0, 80.0);
    let size = Vec2::new(label_width + cell * n as f32, label_width * 0.6 + cell * n as f32);
    let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let origin = rect.min + Vec2::new(label_width, label_width * 0.6);
    let font = FontId::proportional(11.0);

    for (i, label) in chart.labels.iter().enumerate() {
        painter.text(
            Pos2::new(origin.x - 6.0, origin.y + cell * (i as f32 + 0.5)),
            Align2::RIGHT_CENTER,
            label,
            font.clone(),
            ui.visuals().text_color(),
        );
        painter.text(
            Pos2::new(origin.x + cell * (i as f32 + 0.5), origin.y - 6.0),
            Align2::CENTER_BOTTOM,
            abbreviate(label),
            font.clone(),
            ui.visuals().text_color(),
        );
    }

    let mut hovered: Option<(usize, usize)> = None;
    for (i, row) in chart.cells.iter().enumerate() {
        for (j, stat) in row.iter().enumerate() {
            let min = origin + Vec2::new(cell * j as f32, cell * i as f32);
            let cell_rect = egui::Rect::from_min_size(min, Vec2::splat(cell));
            let (fill, text) = match stat {
                Stat::Value(r) => (color::blues(*r), format!("{r:.2}")),
                Stat::NoData => (Color32::LIGHT_GRAY, "–".to_string()),
            };
            painter.rect_filled(cell_rect.shrink(0.5), 0.0, fill);
            let text_color = if stat.value().is_some_and(|r| r > 0.3) {
                Color32::WHITE
            } else {
                Color32::BLACK
            };
            painter.text(cell_rect.center(), Align2::CENTER_CENTER, text, font.clone(), text_color);
            if response
                .hover_pos()
                .is_some_and(|p| cell_rect.contains(p))
            {
                hovered = Some((i, j));
            }
        }
    }

    if let Some((i, j)) = hovered {
        response.on_hover_text(format!(
            "{} × {}: {}",
            chart.labels[i], chart.labels[j], chart.cells[i][j]
        ));
    }
}

fn abbreviate(label: &str) -> String {
    let caps: String = label.chars().filter(|c| c.is_ascii_uppercase()).collect();
    if caps.len() >= 2 {
        caps
    } else {
        label.chars().take(4).collect()
    }
}

// ---------------------------------------------------------------------------
// Hierarchy table
// ---------------------------------------------------------------------------

pub fn hierarchy_table(ui: &mut Ui, chart: &HierarchyTable) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(240.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(70.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong(chart.levels.join(" / "));
            });
            header.col(|ui| {
                ui.strong("Σ EmployeeID");
            });
            header.col(|ui| {
                ui.strong("Rows");
            });
            header.col(|ui| {
                ui.strong("Avg MonthlyIncome");
            });
        })
        .body(|mut body| {
            for node in &chart.nodes {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        let indent = "    ".repeat(node.depth().saturating_sub(1));
                        let text = RichText::new(format!("{indent}{}", node.label()));
                        ui.label(if node.depth() == 1 { text.strong() } else { text });
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.0}", node.value_sum));
                    });
                    row.col(|ui| {
                        ui.label(node.rows.to_string());
                    });
                    row.col(|ui| {
                        let mean = match node.color_mean {
                            Stat::Value(v) => format!("{v:.1}"),
                            Stat::NoData => "–".to_string(),
                        };
                        ui.label(mean);
                    });
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_only_on_integer_ticks() {
        let cats = vec!["Sales".to_string(), "HR".to_string()];
        assert_eq!(category_label(&cats, 0.0), "Sales");
        assert_eq!(category_label(&cats, 1.0), "HR");
        assert_eq!(category_label(&cats, 0.5), "");
        assert_eq!(category_label(&cats, 2.0), "");
        assert_eq!(category_label(&cats, -1.0), "");
    }

    #[test]
    fn grouped_series_are_centred() {
        assert_eq!(group_offset(0, 1, 0.8), 0.0);
        assert_eq!(group_offset(0, 2, 0.4), -0.2);
        assert_eq!(group_offset(1, 2, 0.4), 0.2);
    }

    #[test]
    fn heatmap_labels_abbreviate_camel_case() {
        assert_eq!(abbreviate("MonthlyIncome"), "MI");
        assert_eq!(abbreviate("EmployeeID"), "EID");
        assert_eq!(abbreviate("Age"), "Age");
    }
}
