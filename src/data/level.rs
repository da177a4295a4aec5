//! Job-level normalisation: the categorical `JobLevel` label becomes an
//! ordinal integer column at load time.

use std::fmt;

use super::model::{CellValue, Employee, Field};

/// Ordinal job levels. `Unspecified` covers every label outside the
/// known set (including missing cells) so callers can tell an explicit
/// entry-level employee from an unrecognised one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobLevel {
    EntryLevel,
    Junior,
    MidLevel,
    Senior,
    Executive,
    Unspecified,
}

/// Rank bounds used when the column is absent from the source.
pub const DEFAULT_RANK_BOUNDS: (i64, i64) = (1, 5);

impl JobLevel {
    pub const LABELED: [JobLevel; 5] = [
        JobLevel::EntryLevel,
        JobLevel::Junior,
        JobLevel::MidLevel,
        JobLevel::Senior,
        JobLevel::Executive,
    ];

    /// Exact, case-sensitive match against the source labels.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Entry-level" => JobLevel::EntryLevel,
            "Junior" => JobLevel::Junior,
            "Mid-level" => JobLevel::MidLevel,
            "Senior" => JobLevel::Senior,
            "Executive" => JobLevel::Executive,
            _ => JobLevel::Unspecified,
        }
    }

    pub fn from_cell(cell: &CellValue) -> Self {
        match cell {
            CellValue::String(s) => Self::from_label(s),
            _ => JobLevel::Unspecified,
        }
    }

    /// Ordinal rank; `Unspecified` shares rank 1 with `EntryLevel`.
    pub const fn rank(self) -> i64 {
        match self {
            JobLevel::EntryLevel | JobLevel::Unspecified => 1,
            JobLevel::Junior => 2,
            JobLevel::MidLevel => 3,
            JobLevel::Senior => 4,
            JobLevel::Executive => 5,
        }
    }

    pub const fn label(self) -> Option<&'static str> {
        match self {
            JobLevel::EntryLevel => Some("Entry-level"),
            JobLevel::Junior => Some("Junior"),
            JobLevel::MidLevel => Some("Mid-level"),
            JobLevel::Senior => Some("Senior"),
            JobLevel::Executive => Some("Executive"),
            JobLevel::Unspecified => None,
        }
    }

    /// The labelled level for a rank, used for chart legends.
    pub fn from_rank(rank: i64) -> Option<Self> {
        Self::LABELED.into_iter().find(|l| l.rank() == rank)
    }
}

impl fmt::Display for JobLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().unwrap_or("Unspecified"))
    }
}

/// Outcome of [`normalize_job_levels`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    /// Whether any row carried a `JobLevel` column.
    pub column_present: bool,
    /// Rows mapped from a known label.
    pub recognised: usize,
    /// Rows whose label was missing or unknown.
    pub unspecified: usize,
}

/// Replace every row's `JobLevel` label with its integer rank.
///
/// Runs once, before the table indices are built. Rows of a table with no
/// `JobLevel` column at all are left untouched.
pub fn normalize_job_levels(rows: &mut [Employee]) -> NormalizationReport {
    let column = Field::JobLevel.column();
    let column_present = rows.iter().any(|r| r.cells.contains_key(column));
    let mut report = NormalizationReport {
        column_present,
        ..Default::default()
    };
    if !column_present {
        return report;
    }

    for row in rows.iter_mut() {
        let level = JobLevel::from_cell(row.get(Field::JobLevel));
        if level == JobLevel::Unspecified {
            report.unspecified += 1;
        } else {
            report.recognised += 1;
        }
        row.cells
            .insert(column.to_string(), CellValue::Integer(level.rank()));
    }

    if report.unspecified > 0 {
        log::warn!(
            "{} of {} rows have an unrecognised JobLevel; defaulting them to rank {}",
            report.unspecified,
            rows.len(),
            JobLevel::Unspecified.rank()
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_level(cell: CellValue) -> Employee {
        let mut e = Employee::default();
        e.cells.insert("JobLevel".to_string(), cell);
        e
    }

    #[test]
    fn labels_map_to_ranks() {
        assert_eq!(JobLevel::from_label("Entry-level").rank(), 1);
        assert_eq!(JobLevel::from_label("Junior").rank(), 2);
        assert_eq!(JobLevel::from_label("Mid-level").rank(), 3);
        assert_eq!(JobLevel::from_label("Senior").rank(), 4);
        assert_eq!(JobLevel::from_label("Executive").rank(), 5);
    }

    #[test]
    fn unknown_label_is_unspecified_with_rank_one() {
        let level = JobLevel::from_label("Unknown");
        assert_eq!(level, JobLevel::Unspecified);
        assert_ne!(level, JobLevel::EntryLevel);
        assert_eq!(level.rank(), 1);
        assert_eq!(JobLevel::from_label("senior"), JobLevel::Unspecified);
        assert_eq!(JobLevel::from_cell(&CellValue::Null), JobLevel::Unspecified);
        assert_eq!(JobLevel::from_cell(&CellValue::Integer(3)), JobLevel::Unspecified);
    }

    #[test]
    fn normalisation_replaces_column_and_counts_fallbacks() {
        let mut rows = vec![
            with_level("Senior".into()),
            with_level("Unknown".into()),
            with_level(CellValue::Null),
            Employee::default(),
        ];
        let report = normalize_job_levels(&mut rows);
        assert!(report.column_present);
        assert_eq!(report.recognised, 1);
        assert_eq!(report.unspecified, 3);
        assert_eq!(rows[0].get(Field::JobLevel), &CellValue::Integer(4));
        assert_eq!(rows[1].get(Field::JobLevel), &CellValue::Integer(1));
        assert_eq!(rows[3].get(Field::JobLevel), &CellValue::Integer(1));
    }

    #[test]
    fn absent_column_is_left_alone() {
        let mut rows = vec![Employee::default()];
        let report = normalize_job_levels(&mut rows);
        assert!(!report.column_present);
        assert!(rows[0].cells.is_empty());
    }

    #[test]
    fn rank_round_trips_for_labelled_levels() {
        for level in JobLevel::LABELED {
            assert_eq!(JobLevel::from_rank(level.rank()), Some(level));
        }
        assert_eq!(JobLevel::from_rank(9), None);
    }
}
