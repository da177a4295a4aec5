use eframe::egui::{self, Color32, RichText, ScrollArea, Stroke, Ui};

use crate::charts::{self, ScatterSettings};
use crate::color;
use crate::data::aggregate::{KpiSet, Stat};
use crate::data::model::Field;
use crate::state::AppState;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Central panel: KPIs and charts
// ---------------------------------------------------------------------------

/// Render the dashboard for the current filtered view.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(view) = state.view.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to analyse employees  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Employees Data Analysis");
            ui.add_space(8.0);

            if let Some(kpis) = &state.kpis {
                kpi_section(ui, kpis);
            }
            ui.separator();

            if view.is_empty() {
                ui.label(
                    RichText::new("No employees match the current filters.")
                        .color(Color32::from_rgb(0xC0, 0x80, 0x00)),
                );
            }

            ui.columns(2, |cols| {
                plot::chart_frame(
                    &mut cols[0],
                    "Total Employees by Department",
                    &charts::department_chart(&view),
                    |ui, chart| plot::bar_chart(ui, "department_chart", chart),
                );
                plot::chart_frame(
                    &mut cols[1],
                    "Total Employees by Job Role",
                    &charts::job_role_chart(&view),
                    |ui, chart| plot::bar_chart(ui, "job_role_chart", chart),
                );
            });

            ui.columns(2, |cols| {
                plot::chart_frame(
                    &mut cols[0],
                    "Attrition by Department",
                    &charts::attrition_by_department_chart(&view),
                    |ui, chart| plot::bar_chart(ui, "attrition_chart", chart),
                );
                plot::chart_frame(
                    &mut cols[1],
                    "Count of EmployeeID by JobLevel",
                    &charts::job_level_chart(&view),
                    plot::donut_chart,
                );
            });

            plot::chart_frame(
                ui,
                "Feature Correlation Matrix",
                &charts::correlation_chart(&view),
                plot::heatmap,
            );

            ui.add_space(8.0);
            ui.heading("Salary Distribution Analysis");
            ui.columns(2, |cols| {
                plot::chart_frame(
                    &mut cols[0],
                    "Salary Distribution by Department",
                    &charts::salary_distribution_chart(&view),
                    |ui, chart| plot::box_chart(ui, "salary_box", chart),
                );
                plot::chart_frame(
                    &mut cols[1],
                    "Tenure Distribution by Job Role",
                    &charts::tenure_distribution_chart(&view),
                    |ui, chart| plot::box_chart(ui, "tenure_box", chart),
                );
            });

            plot::chart_frame(
                ui,
                "Employee Hierarchy Analysis",
                &charts::hierarchy_table(&view),
                plot::hierarchy_table,
            );

            ui.add_space(8.0);
            ui.heading("Employee Profile Scatter Analysis");
            scatter_controls(ui, &mut state.scatter);
            let scatter = charts::scatter_chart(&view, &state.scatter);
            let title = scatter
                .as_ref()
                .map_or_else(|_| "Scatter".to_string(), |s| s.title.clone());
            plot::chart_frame(ui, &title, &scatter, |ui, chart| {
                plot::scatter_chart(ui, "profile_scatter", chart)
            });
        });
}

// ---------------------------------------------------------------------------
// KPI boxes
// ---------------------------------------------------------------------------

fn kpi_section(ui: &mut Ui, kpis: &KpiSet) {
    let average = |s: Stat| match s {
        Stat::Value(v) => format_thousands(v),
        Stat::NoData => "–".to_string(),
    };
    ui.columns(2, |cols| {
        kpi_box(&mut cols[0], "Total Employees", &format_thousands(kpis.total_employees as f64));
        kpi_box(&mut cols[1], "Average Age", &average(kpis.average_age));
    });
    ui.columns(2, |cols| {
        kpi_box(&mut cols[0], "Loyalty Rate", &format!("{}%", kpis.loyalty_rate));
        kpi_box(&mut cols[1], "Average Salary", &average(kpis.average_salary));
    });
}

fn kpi_box(ui: &mut Ui, label: &str, value: &str) {
    egui::Frame::default()
        .fill(color::KPI_FILL)
        .stroke(Stroke::new(2.0, color::KPI_BORDER))
        .corner_radius(10.0)
        .inner_margin(10.0)
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width() * 0.7);
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(label).size(18.0).strong().color(Color32::from_gray(0x33)));
                ui.label(RichText::new(value).size(22.0).strong().color(color::ACCENT));
            });
        });
    ui.add_space(15.0);
}

/// `1234567.5` → `1,234,567.5`.
fn format_thousands(v: f64) -> String {
    let text = format!("{}", v.abs());
    let (int_part, frac) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), format!(".{f}")),
        None => (text, String::new()),
    };
    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}{frac}")
}

// ---------------------------------------------------------------------------
// Scatter controls
// ---------------------------------------------------------------------------

fn scatter_controls(ui: &mut Ui, settings: &mut ScatterSettings) {
    ui.horizontal(|ui: &mut Ui| {
        axis_combo(ui, "scatter_x", "X-axis", &mut settings.x);
        axis_combo(ui, "scatter_y", "Y-axis", &mut settings.y);

        ui.label("Color by");
        let selected = settings
            .color
            .map_or_else(|| "None".to_string(), |f| f.to_string());
        egui::ComboBox::from_id_salt("scatter_color")
            .selected_text(selected)
            .show_ui(ui, |ui: &mut Ui| {
                for field in Field::COLOR_GROUPS {
                    ui.selectable_value(&mut settings.color, Some(field), field.column());
                }
                ui.selectable_value(&mut settings.color, None, "None");
            });

        ui.checkbox(&mut settings.trendline, "Show trendline");
    });
}

fn axis_combo(ui: &mut Ui, id: &str, label: &str, value: &mut Field) {
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.column())
        .show_ui(ui, |ui: &mut Ui| {
            for field in Field::SCATTER_AXES {
                ui.selectable_value(value, field, field.column());
            }
        });
}
