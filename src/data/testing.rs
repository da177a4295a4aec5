//! Fixtures shared by the data-layer tests.

use std::sync::Arc;

use super::level::normalize_job_levels;
use super::model::{CellValue, Employee, EmployeeTable};
use super::DatasetHandle;

const COLUMNS: [&str; 11] = [
    "EmployeeID",
    "Department",
    "Attrition",
    "Education",
    "JobRole",
    "Gender",
    "JobLevel",
    "Age",
    "MonthlyIncome",
    "YearsAtCompany",
    "TotalWorkingYears",
];

type Record = (i64, &'static str, &'static str, &'static str, &'static str, &'static str, &'static str, i64, i64, i64, i64);

const RECORDS: [Record; 10] = [
    (1, "Sales", "Yes", "Bachelor", "Sales Executive", "Female", "Junior", 29, 4800, 3, 6),
    (2, "Sales", "No", "Master", "Sales Executive", "Male", "Mid-level", 41, 7200, 8, 15),
    (3, "Sales", "No", "Bachelor", "Sales Representative", "Female", "Entry-level", 24, 2600, 2, 3),
    (4, "Research & Development", "No", "Doctor", "Research Scientist", "Male", "Junior", 35, 5100, 6, 10),
    (5, "Research & Development", "Yes", "Bachelor", "Laboratory Technician", "Male", "Entry-level", 27, 3000, 1, 4),
    (6, "Research & Development", "No", "Master", "Manager", "Female", "Executive", 52, 18000, 20, 28),
    (7, "Research & Development", "No", "Bachelor", "Research Scientist", "Female", "Junior", 33, 4500, 7, 9),
    (8, "Human Resources", "No", "Master", "Human Resources", "Female", "Mid-level", 45, 6200, 12, 20),
    (9, "Human Resources", "Yes", "College", "Human Resources", "Male", "Entry-level", 22, 2100, 0, 1),
    (10, "Research & Development", "No", "Doctor", "Research Director", "Male", "Senior", 48, 14000, 15, 24),
];

/// Ten employees, three of them in Sales with attrition Yes/No/No.
pub(crate) fn sample_table() -> DatasetHandle {
    let mut rows: Vec<Employee> = RECORDS
        .iter()
        .map(|r| {
            let values: [CellValue; 11] = [
                r.0.into(),
                r.1.into(),
                r.2.into(),
                r.3.into(),
                r.4.into(),
                r.5.into(),
                r.6.into(),
                r.7.into(),
                r.8.into(),
                r.9.into(),
                r.10.into(),
            ];
            Employee::new(
                COLUMNS
                    .iter()
                    .map(|c| c.to_string())
                    .zip(values)
                    .collect(),
            )
        })
        .collect();
    normalize_job_levels(&mut rows);
    Arc::new(EmployeeTable::from_rows(rows))
}

/// Build a table from literal rows, without normalisation.
pub(crate) fn table_from(rows: &[&[(&str, CellValue)]]) -> DatasetHandle {
    let rows = rows
        .iter()
        .map(|cells| {
            Employee::new(
                cells
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            )
        })
        .collect();
    Arc::new(EmployeeTable::from_rows(rows))
}
