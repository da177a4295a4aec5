/// Data layer: core types, loading, normalisation, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<Employee>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  level    │  JobLevel label → ordinal rank
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ EmployeeTable  │  rows, column index   (shared as DatasetHandle)
///   └───────────────┘
///        │   FilterSelection
///        ▼
///   ┌──────────┐
///   │  filter   │  conjunction of typed predicates → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────────┐
///   │ aggregate / summary  │  KPIs, counts, correlation, distributions
///   └─────────────────────┘
/// ```
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod level;
pub mod loader;
pub mod model;
pub mod summary;

#[cfg(test)]
pub(crate) mod testing;

use error::SchemaError;
use level::NormalizationReport;
use model::EmployeeTable;

/// Read-only handle to the base table, created once per load and passed
/// explicitly into the pipeline.
pub type DatasetHandle = Arc<EmployeeTable>;

/// A freshly loaded and normalised table plus what was found wrong with it.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub table: DatasetHandle,
    pub schema_warnings: Vec<SchemaError>,
    pub normalization: NormalizationReport,
}

/// Load a file, normalise job levels and check the schema.
pub fn open_dataset(path: &Path) -> Result<LoadedDataset> {
    let mut rows = loader::load_file(path)?;
    let normalization = level::normalize_job_levels(&mut rows);
    if normalization.column_present {
        log::info!(
            "JobLevel: {} recognised, {} unspecified",
            normalization.recognised,
            normalization.unspecified
        );
    }
    let table = EmployeeTable::from_rows(rows);

    let schema_warnings = table.schema_warnings();
    for warning in &schema_warnings {
        log::warn!("{}: {warning}", path.display());
    }

    Ok(LoadedDataset {
        table: Arc::new(table),
        schema_warnings,
        normalization,
    })
}
