use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use calamine::{open_workbook_auto, Data, Reader};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Employee};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load employee rows from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one column per field (recommended)
/// * `.json`    – `[{ "EmployeeID": 1, "Department": "Sales", ... }, ...]`
/// * `.csv`     – header row with column names
/// * `.xlsx` / `.xls` / `.ods` – first sheet, header row with column names
pub fn load_file(path: &Path) -> Result<Vec<Employee>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        "xlsx" | "xlsm" | "xls" | "ods" => load_spreadsheet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    if rows.is_empty() {
        bail!("{} contains no employee rows", path.display());
    }
    log::info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "EmployeeID": 1, "Department": "Sales", "JobLevel": "Junior", "Age": 29 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Employee>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            let cells = obj
                .iter()
                .map(|(key, val)| (key.clone(), json_to_cell(val)))
                .collect();
            Ok(Employee::new(cells))
        })
        .collect()
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one employee per record.
/// Cell types are guessed per value; empty cells become nulls.
fn load_csv(path: &Path) -> Result<Vec<Employee>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, found {}",
                headers.len(),
                record.len()
            );
        }

        let cells: BTreeMap<String, CellValue> = headers
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), guess_cell_type(value)))
            .collect();

        rows.push(Employee::new(cells));
    }

    Ok(rows)
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First worksheet of a workbook; the first row holds the column names.
/// Columns with a blank header are skipped.
fn load_spreadsheet(path: &Path) -> Result<Vec<Employee>> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .context("worksheet is empty")?
        .iter()
        .map(|h| h.to_string().trim().to_string())
        .collect();

    let rows = sheet_rows
        .map(|record| {
            let cells = headers
                .iter()
                .zip(record)
                .filter(|(col, _)| !col.is_empty())
                .map(|(col, value)| (col.clone(), sheet_cell(value)))
                .collect();
            Employee::new(cells)
        })
        .collect();
    Ok(rows)
}

/// Workbooks store every number as a float; whole numbers are read back as
/// integers, the way a dataframe reader types an integer column.
fn sheet_cell(value: &Data) -> CellValue {
    match value {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => CellValue::Integer(*f as i64),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Empty | Data::Error(_) => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per employee field.
///
/// Integer, float, boolean and string columns are read; anything else is
/// kept as its debug type name so the column still shows up in the schema.
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<Employee>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let columns: Vec<(String, &Arc<dyn Array>)> = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(f, c)| (f.name().clone(), c))
            .collect();

        for row in 0..batch.num_rows() {
            let cells = columns
                .iter()
                .map(|(name, col)| (name.clone(), extract_cell_value(col, row)))
                .collect();
            rows.push(Employee::new(cells));
        }
    }

    Ok(rows)
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::Float32 => {
            CellValue::Float(col.as_primitive::<Float32Type>().value(row).into())
        }
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => CellValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{Field as ArrowField, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_cells_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "employees.csv",
            "EmployeeID,Department,Age,MonthlyIncome,JobLevel\n\
             1,Sales,29,4800.5,Junior\n\
             2,HR,,3000,\n",
        );
        let rows = load_file(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_column("EmployeeID"), &CellValue::Integer(1));
        assert_eq!(rows[0].get_column("Department"), &CellValue::from("Sales"));
        assert_eq!(rows[0].get_column("MonthlyIncome"), &CellValue::Float(4800.5));
        assert_eq!(rows[1].get_column("Age"), &CellValue::Null);
        assert_eq!(rows[1].get_column("JobLevel"), &CellValue::Null);
    }

    #[test]
    fn json_records_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "employees.json",
            r#"[{"EmployeeID": 7, "Attrition": "No", "Age": 33.0, "Gender": null}]"#,
        );
        let rows = load_file(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_column("EmployeeID"), &CellValue::Integer(7));
        assert_eq!(rows[0].get_column("Age"), &CellValue::Float(33.0));
        assert_eq!(rows[0].get_column("Gender"), &CellValue::Null);
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "bad.json", r#"{"EmployeeID": 1}"#);
        assert!(load_file(&path).is_err());
        let path = write_temp(&dir, "bad_row.json", "[1, 2]");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn parquet_columns_become_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("employees.parquet");
        let schema = Arc::new(Schema::new(vec![
            ArrowField::new("EmployeeID", DataType::Int64, false),
            ArrowField::new("Department", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(StringArray::from(vec![Some("Sales"), None])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let rows = load_file(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get_column("EmployeeID"), &CellValue::Integer(2));
        assert_eq!(rows[0].get_column("Department"), &CellValue::from("Sales"));
        assert_eq!(rows[1].get_column("Department"), &CellValue::Null);
    }

    #[test]
    fn unsupported_extension_and_empty_file_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "employees.txt", "");
        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension"));

        let path = write_temp(&dir, "empty.csv", "EmployeeID,Age\n");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn spreadsheet_cells_are_typed() {
        assert_eq!(sheet_cell(&Data::Float(42.0)), CellValue::Integer(42));
        assert_eq!(sheet_cell(&Data::Float(4800.5)), CellValue::Float(4800.5));
        assert_eq!(sheet_cell(&Data::Int(7)), CellValue::Integer(7));
        assert_eq!(sheet_cell(&Data::String("Sales".into())), CellValue::from("Sales"));
        assert_eq!(sheet_cell(&Data::String("  ".into())), CellValue::Null);
        assert_eq!(sheet_cell(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(sheet_cell(&Data::Empty), CellValue::Null);
    }

    #[test]
    fn corrupt_workbook_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "employees.xlsx", "not a zip archive");
        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("opening workbook"));
    }
}
