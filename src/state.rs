use std::collections::{BTreeMap, BTreeSet};

use crate::charts::ScatterSettings;
use crate::config::DashboardConfig;
use crate::data::aggregate::{compute_kpis, KpiSet};
use crate::data::error::{FilterError, SchemaError};
use crate::data::filter::{apply_selection, FilterSelection, FilteredView};
use crate::data::model::{CellValue, Field};
use crate::data::{DatasetHandle, LoadedDataset};

// ---------------------------------------------------------------------------
// Slider state
// ---------------------------------------------------------------------------

/// An integer range slider: its domain and the user's current bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSlider {
    pub domain: (i64, i64),
    pub low: i64,
    pub high: i64,
    /// `false` when the column is missing and the domain is a fallback.
    pub enabled: bool,
}

impl RangeSlider {
    fn new(observed: Option<(f64, f64)>, fallback: (i64, i64)) -> Self {
        let (domain, enabled) = match observed {
            Some((lo, hi)) => ((lo.floor() as i64, hi.ceil() as i64), true),
            None => (fallback, false),
        };
        Self {
            domain,
            low: domain.0,
            high: domain.1,
            enabled,
        }
    }

    fn selection(&self) -> Option<(f64, f64)> {
        self.enabled.then_some((self.low as f64, self.high as f64))
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded base table (None until a file is loaded).
    pub dataset: Option<DatasetHandle>,

    /// Schema problems found at load time.
    pub schema_warnings: Vec<SchemaError>,
    /// Rows whose JobLevel label was not recognised.
    pub unspecified_levels: usize,

    /// Per-field multi-select state; an empty set means "all".
    pub categorical: BTreeMap<Field, BTreeSet<CellValue>>,
    pub job_level: RangeSlider,
    pub age: RangeSlider,

    /// Rows passing the current selection (cached until the next interaction).
    pub view: Option<FilteredView>,
    pub kpis: Option<KpiSet>,

    /// Set when the last selection could not be applied and the view fell
    /// back to the whole table.
    pub filter_error: Option<FilterError>,

    pub scatter: ScatterSettings,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let job_level = RangeSlider::new(None, config.fallback_level_bounds);
        let age = RangeSlider::new(None, config.fallback_age_bounds);
        Self {
            config,
            dataset: None,
            schema_warnings: Vec::new(),
            unspecified_levels: 0,
            categorical: BTreeMap::new(),
            job_level,
            age,
            view: None,
            kpis: None,
            filter_error: None,
            scatter: ScatterSettings::default(),
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset, reset filters and recompute.
    pub fn set_dataset(&mut self, loaded: LoadedDataset) {
        let table = loaded.table;
        self.job_level = RangeSlider::new(
            table.numeric_bounds(Field::JobLevel),
            self.config.fallback_level_bounds,
        );
        self.age = RangeSlider::new(
            table.numeric_bounds(Field::Age),
            self.config.fallback_age_bounds,
        );
        self.categorical.clear();
        self.schema_warnings = loaded.schema_warnings;
        self.unspecified_levels = loaded.normalization.unspecified;

        self.dataset = Some(table);
        self.status_message = None;
        self.refilter();
    }

    /// The selection described by the current widget state.
    pub fn selection(&self) -> FilterSelection {
        let mut selection = self
            .categorical
            .iter()
            .fold(FilterSelection::default(), |sel, (field, values)| {
                sel.with_values(*field, values.iter().cloned())
            });
        if let Some((min, max)) = self.job_level.selection() {
            selection = selection.with_job_level(min, max);
        }
        if let Some((min, max)) = self.age.selection() {
            selection = selection.with_age(min, max);
        }
        selection
    }

    /// Recompute the view and KPIs from the base table.
    ///
    /// A selection that cannot be turned into a predicate falls back to the
    /// unfiltered table; the error is kept for display.
    pub fn refilter(&mut self) {
        let Some(table) = &self.dataset else {
            return;
        };
        let selection = self.selection();
        let view = match apply_selection(table, &selection) {
            Ok(view) => {
                self.filter_error = None;
                view
            }
            Err(e) => {
                log::warn!("Filter rejected, showing all rows: {e}");
                self.filter_error = Some(e);
                FilteredView::all(table)
            }
        };
        log::debug!(
            "{} of {} rows selected ({} categorical filters active)",
            view.len(),
            table.len(),
            selection.active_categorical()
        );
        self.kpis = Some(compute_kpis(&view, &self.config.kpi));
        self.view = Some(view);
    }

    /// Toggle a single value in a field's multi-select.
    pub fn toggle_filter_value(&mut self, field: Field, value: &CellValue) {
        let selected = self.categorical.entry(field).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    /// Drop every selected value of a field (back to "all").
    pub fn clear_filter(&mut self, field: Field) {
        self.categorical.remove(&field);
        self.refilter();
    }

    pub fn is_selected(&self, field: Field, value: &CellValue) -> bool {
        self.categorical
            .get(&field)
            .is_some_and(|s| s.contains(value))
    }

    /// Load a file into the state, reporting failures in the status line.
    pub fn load_path(&mut self, path: &std::path::Path) {
        match crate::data::open_dataset(path) {
            Ok(loaded) => {
                log::info!(
                    "Loaded {} employees with columns {:?}",
                    loaded.table.len(),
                    loaded.table.column_names
                );
                self.set_dataset(loaded);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::level::NormalizationReport;
    use crate::data::testing::{sample_table, table_from};

    fn loaded(table: DatasetHandle) -> LoadedDataset {
        LoadedDataset {
            schema_warnings: table.schema_warnings(),
            table,
            normalization: NormalizationReport::default(),
        }
    }

    fn state_with_sample() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(loaded(sample_table()));
        state
    }

    #[test]
    fn new_dataset_shows_everything() {
        let state = state_with_sample();
        assert_eq!(state.view.as_ref().unwrap().len(), 10);
        assert_eq!(state.job_level.domain, (1, 5));
        assert_eq!(state.age.domain, (22, 52));
        assert!(state.schema_warnings.is_empty());
        assert_eq!(state.kpis.unwrap().total_employees, 55);
    }

    #[test]
    fn selecting_sales_narrows_view_and_kpis() {
        let mut state = state_with_sample();
        state.toggle_filter_value(Field::Department, &"Sales".into());
        assert_eq!(state.view.as_ref().unwrap().len(), 3);
        assert_eq!(state.kpis.unwrap().total_employees, 6);

        state.toggle_filter_value(Field::Department, &"Sales".into());
        assert_eq!(state.view.as_ref().unwrap().len(), 10);
        assert!(!state.is_selected(Field::Department, &"Sales".into()));
    }

    #[test]
    fn inverted_slider_falls_back_to_whole_table() {
        let mut state = state_with_sample();
        state.age.low = 45;
        state.age.high = 30;
        state.refilter();
        assert!(matches!(
            state.filter_error,
            Some(FilterError::InvertedRange { field: Field::Age, .. })
        ));
        assert_eq!(state.view.as_ref().unwrap().len(), 10);

        state.age.high = 52;
        state.refilter();
        assert!(state.filter_error.is_none());
        assert_eq!(state.view.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn missing_age_column_uses_fallback_bounds() {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(loaded(table_from(&[
            &[("EmployeeID", CellValue::Integer(1)), ("Department", "Sales".into())],
            &[("EmployeeID", CellValue::Integer(2)), ("Department", "HR".into())],
        ])));
        assert!(!state.age.enabled);
        assert_eq!(state.age.domain, (18, 65));
        assert_eq!(state.job_level.domain, (1, 5));
        assert!(state.filter_error.is_none());
        assert_eq!(state.view.as_ref().unwrap().len(), 2);
        assert!(state
            .schema_warnings
            .contains(&SchemaError::MissingColumn {
                column: "Age".to_string()
            }));
    }

    #[test]
    fn selection_mirrors_widget_state() {
        let mut state = state_with_sample();
        state.toggle_filter_value(Field::Department, &"Sales".into());
        state.age.low = 25;
        let expected = FilterSelection::default()
            .with_values(Field::Department, ["Sales"])
            .with_job_level(1.0, 5.0)
            .with_age(25.0, 52.0);
        assert_eq!(state.selection(), expected);
    }

    #[test]
    fn disabled_slider_leaves_range_unset() {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(loaded(table_from(&[
            &[("EmployeeID", CellValue::Integer(1)), ("Department", "Sales".into())],
        ])));
        let selection = state.selection();
        assert!(selection.age.is_none());
        assert!(selection.job_level.is_none());
        assert!(selection.categorical.is_empty());
    }

    #[test]
    fn clear_filter_restores_all_rows() {
        let mut state = state_with_sample();
        state.toggle_filter_value(Field::Attrition, &"Yes".into());
        assert_eq!(state.view.as_ref().unwrap().len(), 3);
        state.clear_filter(Field::Attrition);
        assert_eq!(state.view.as_ref().unwrap().len(), 10);
    }
}
