use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::{CellValue, Field};
use crate::state::{AppState, RangeSlider};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Please Filter Here:");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            warnings(ui, state);

            // ---- Multi-select filters (collapsible) ----
            for field in Field::FILTERABLE {
                let Some(all_values) = dataset.unique_values.get(field.column()) else {
                    continue;
                };

                let n_selected = state
                    .categorical
                    .get(&field)
                    .map_or(0, |s| s.len());
                let header_text = if n_selected == 0 {
                    format!("{field}  (all)")
                } else {
                    format!("{field}  ({n_selected}/{})", all_values.len())
                };

                let mut toggled: Option<CellValue> = None;
                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(field)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("Clear").clicked() {
                            state.clear_filter(field);
                        }
                        for val in all_values {
                            let mut checked = state.is_selected(field, val);
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                toggled = Some(val.clone());
                            }
                        }
                    });
                if let Some(val) = toggled {
                    state.toggle_filter_value(field, &val);
                }
            }

            ui.separator();

            // ---- Range sliders ----
            changed |= range_slider(ui, "Select Job Level:", &mut state.job_level);
            changed |= range_slider(ui, "Select age", &mut state.age);
        });

    if changed {
        state.refilter();
    }
}

/// Two bound sliders over the same domain. Returns whether either moved.
fn range_slider(ui: &mut Ui, label: &str, slider: &mut RangeSlider) -> bool {
    ui.strong(label);
    let domain = slider.domain.0..=slider.domain.1;
    let mut changed = false;
    ui.add_enabled_ui(slider.enabled, |ui: &mut Ui| {
        changed |= ui
            .add(egui::Slider::new(&mut slider.low, domain.clone()).text("min"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut slider.high, domain).text("max"))
            .changed();
    });
    ui.add_space(6.0);
    changed
}

fn warnings(ui: &mut Ui, state: &AppState) {
    for warning in &state.schema_warnings {
        ui.label(RichText::new(format!("⚠ {warning}")).color(Color32::from_rgb(0xC0, 0x80, 0x00)));
    }
    if !state.job_level.enabled {
        ui.label(
            RichText::new("JobLevel data missing - using default values")
                .color(Color32::from_rgb(0xC0, 0x80, 0x00)),
        );
    }
    if !state.age.enabled {
        ui.label(
            RichText::new("Age data missing - using default values")
                .color(Color32::from_rgb(0xC0, 0x80, 0x00)),
        );
    }
    if state.unspecified_levels > 0 {
        ui.label(format!(
            "{} employees have an unrecognised job level (shown as level 1)",
            state.unspecified_levels
        ));
    }
    if let Some(err) = &state.filter_error {
        ui.label(
            RichText::new(format!("Filter ignored: {err}. Showing all employees."))
                .color(Color32::RED),
        );
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!(
                "{} employees loaded, {} selected",
                ds.len(),
                view.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open employee data")
        .add_filter(
            "Supported files",
            &["parquet", "pq", "json", "csv", "xlsx", "xlsm", "xls", "ods"],
        )
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xls", "ods"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
