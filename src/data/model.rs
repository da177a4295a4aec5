use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::error::SchemaError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the employee table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes a spreadsheet export
/// produces. Used as a key in `BTreeMap` / `BTreeSet`, so it must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl CellValue {
    /// Interpret the value as an `f64`; `None` for text, bools and nulls.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null) || matches!(self, CellValue::Float(v) if v.is_nan())
    }
}

// ---------------------------------------------------------------------------
// Field – the columns the dashboard knows by name
// ---------------------------------------------------------------------------

/// Columns of the employee schema referenced by filters and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    EmployeeId,
    Education,
    Department,
    Attrition,
    JobRole,
    Gender,
    JobLevel,
    Age,
    MonthlyIncome,
    YearsAtCompany,
    TotalWorkingYears,
}

impl Field {
    /// Every column the dashboard expects to find in the source.
    pub const REQUIRED: [Field; 11] = [
        Field::EmployeeId,
        Field::Education,
        Field::Department,
        Field::Attrition,
        Field::JobRole,
        Field::Gender,
        Field::JobLevel,
        Field::Age,
        Field::MonthlyIncome,
        Field::YearsAtCompany,
        Field::TotalWorkingYears,
    ];

    /// Multi-select filters shown in the side panel.
    pub const FILTERABLE: [Field; 3] = [Field::Education, Field::Department, Field::Attrition];

    /// Numeric fields offered as scatter axes.
    pub const SCATTER_AXES: [Field; 4] = [
        Field::Age,
        Field::MonthlyIncome,
        Field::YearsAtCompany,
        Field::TotalWorkingYears,
    ];

    /// Categorical fields offered for scatter colouring.
    pub const COLOR_GROUPS: [Field; 4] = [
        Field::Department,
        Field::JobRole,
        Field::Attrition,
        Field::Gender,
    ];

    /// Column name in the source table.
    pub const fn column(self) -> &'static str {
        match self {
            Field::EmployeeId => "EmployeeID",
            Field::Education => "Education",
            Field::Department => "Department",
            Field::Attrition => "Attrition",
            Field::JobRole => "JobRole",
            Field::Gender => "Gender",
            Field::JobLevel => "JobLevel",
            Field::Age => "Age",
            Field::MonthlyIncome => "MonthlyIncome",
            Field::YearsAtCompany => "YearsAtCompany",
            Field::TotalWorkingYears => "TotalWorkingYears",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Employee – one row of the table
// ---------------------------------------------------------------------------

/// A single employee record: column name → cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Employee {
    pub cells: BTreeMap<String, CellValue>,
}

impl Employee {
    pub fn new(cells: BTreeMap<String, CellValue>) -> Self {
        Self { cells }
    }

    /// Cell for a known field; `Null` when the row lacks the column.
    pub fn get(&self, field: Field) -> &CellValue {
        self.get_column(field.column())
    }

    pub fn get_column(&self, column: &str) -> &CellValue {
        static NULL: CellValue = CellValue::Null;
        self.cells.get(column).unwrap_or(&NULL)
    }

    pub fn number(&self, field: Field) -> Option<f64> {
        self.get(field).as_f64()
    }
}

// ---------------------------------------------------------------------------
// EmployeeTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed column indices.
///
/// Immutable once built: filters produce index lists over it and never
/// touch the rows.
#[derive(Debug, Clone)]
pub struct EmployeeTable {
    /// All employees (rows).
    pub rows: Vec<Employee>,
    /// Ordered list of column names.
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique non-null values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl EmployeeTable {
    /// Build column indices from the loaded rows.
    pub fn from_rows(rows: Vec<Employee>) -> Self {
        let mut column_names_set: BTreeSet<String> = BTreeSet::new();
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();

        for row in &rows {
            for (col, val) in &row.cells {
                column_names_set.insert(col.clone());
                let values = unique_values.entry(col.clone()).or_default();
                if !val.is_null() {
                    values.insert(val.clone());
                }
            }
        }
        let column_names: Vec<String> = column_names_set.into_iter().collect();
        EmployeeTable {
            rows,
            column_names,
            unique_values,
        }
    }

    /// Number of employees.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.

    pub fn has_column(&self, column: &str) -> bool {
        self.unique_values.contains_key(column)
    }

    /// Fail with a schema mismatch when `field` is not a column of the table.
    pub fn require(&self, field: Field) -> Result<(), SchemaError> {
        if self.has_column(field.column()) {
            Ok(())
        } else {
            Err(SchemaError::MissingColumn {
                column: field.column().to_string(),
            })
        }
    }

    /// Like [`require`](Self::require), additionally checking that every
    /// non-null value in the column is a number.
    pub fn require_numeric(&self, field: Field) -> Result<(), SchemaError> {
        self.require(field)?;
        if self.is_numeric_column(field.column()) {
            Ok(())
        } else {
            Err(SchemaError::NotNumeric {
                column: field.column().to_string(),
            })
        }
    }

    /// A column is numeric when it holds at least one value and all its
    /// non-null values are integers or floats.
    pub fn is_numeric_column(&self, column: &str) -> bool {
        self.unique_values
            .get(column)
            .is_some_and(|vals| !vals.is_empty() && vals.iter().all(|v| v.as_f64().is_some()))
    }

    /// Names of all numeric columns, in column order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.column_names
            .iter()
            .filter(|c| self.is_numeric_column(c))
            .cloned()
            .collect()
    }

    /// Observed `(min, max)` of a numeric column; `None` if absent or empty.
    pub fn numeric_bounds(&self, field: Field) -> Option<(f64, f64)> {
        let values = self.unique_values.get(field.column())?;
        values
            .iter()
            .filter_map(CellValue::as_f64)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Check the table against the expected schema.
    ///
    /// Missing columns and duplicated identifiers are reported, not fatal:
    /// the dashboard keeps running with whatever is present.
    pub fn schema_warnings(&self) -> Vec<SchemaError> {
        let mut warnings: Vec<SchemaError> = Field::REQUIRED
            .iter()
            .filter_map(|f| self.require(*f).err())
            .collect();

        if self.has_column(Field::EmployeeId.column()) {
            let mut seen: BTreeMap<&CellValue, usize> = BTreeMap::new();
            for row in &self.rows {
                let id = row.get(Field::EmployeeId);
                if !id.is_null() {
                    *seen.entry(id).or_default() += 1;
                }
            }
            warnings.extend(
                seen.into_iter()
                    .filter(|(_, count)| *count > 1)
                    .map(|(id, count)| SchemaError::DuplicateIdentifier {
                        id: id.to_string(),
                        count,
                    }),
            );
        }
        warnings
    }
}
