use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use super::error::FilterError;
use super::model::{CellValue, Employee, EmployeeTable, Field};
use super::DatasetHandle;

// ---------------------------------------------------------------------------
// Filter selection: what the user picked in the side panel
// ---------------------------------------------------------------------------

/// Closed numeric interval; both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    /// Reject inverted bounds before they can become a predicate.
    pub fn new(field: Field, min: f64, max: f64) -> Result<Self, FilterError> {
        if min > max {
            return Err(FilterError::InvertedRange { field, min, max });
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Per-interaction selection state.
///
/// A categorical field that is absent or has an empty set imposes no
/// constraint ("nothing selected" means "show all"). A numeric range left as
/// `None` defaults to the column's full observed range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub categorical: BTreeMap<Field, BTreeSet<CellValue>>,
    pub job_level: Option<(f64, f64)>,
    pub age: Option<(f64, f64)>,
}

impl FilterSelection {
    pub fn with_values<I>(mut self, field: Field, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<CellValue>,
    {
        self.categorical
            .entry(field)
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_job_level(mut self, min: f64, max: f64) -> Self {
        self.job_level = Some((min, max));
        self
    }

    pub fn with_age(mut self, min: f64, max: f64) -> Self {
        self.age = Some((min, max));
        self
    }

    /// Number of categorical fields with a non-empty selection.
    pub fn active_categorical(&self) -> usize {
        self.categorical.values().filter(|s| !s.is_empty()).count()
    }
}

// ---------------------------------------------------------------------------
// Typed predicates
// ---------------------------------------------------------------------------

/// A row-level test. Displayed in logs as a readable expression.
pub trait RowPredicate: fmt::Display {
    fn matches(&self, row: &Employee) -> bool;
}

/// Row value must be one of `allowed`.
struct MemberOf {
    field: Field,
    allowed: BTreeSet<CellValue>,
}

impl RowPredicate for MemberOf {
    fn matches(&self, row: &Employee) -> bool {
        self.allowed.contains(row.get(self.field))
    }
}

impl fmt::Display for MemberOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.allowed.iter().map(ToString::to_string).collect();
        write!(f, "{} in [{}]", self.field, values.join(", "))
    }
}

/// Row value must be a number inside `range`; nulls never match.
struct WithinRange {
    field: Field,
    range: NumericRange,
}

impl RowPredicate for WithinRange {
    fn matches(&self, row: &Employee) -> bool {
        row.number(self.field)
            .is_some_and(|v| self.range.contains(v))
    }
}

impl fmt::Display for WithinRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <= {} <= {}",
            self.range.min, self.field, self.range.max
        )
    }
}

/// Logical AND of boxed predicates. An empty conjunction matches every row.
#[derive(Default)]
pub struct Conjunction {
    predicates: Vec<Box<dyn RowPredicate>>,
}

impl Conjunction {
    pub fn push(&mut self, predicate: Box<dyn RowPredicate>) {
        self.predicates.push(predicate);
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl RowPredicate for Conjunction {
    fn matches(&self, row: &Employee) -> bool {
        self.predicates.iter().all(|p| p.matches(row))
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.predicates.is_empty() {
            return f.write_str("<all rows>");
        }
        for (i, p) in self.predicates.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "({p})")?;
        }
        Ok(())
    }
}

/// Compose a selection into a single conjunction against `table`'s schema.
///
/// * categorical fields with a non-empty set → membership test
/// * JobLevel / Age → inclusive range, the observed range when unset
///
/// Any field the selection names that the table lacks is a schema error;
/// an unset range on an absent column is skipped (degraded mode).
pub fn build_predicate(
    table: &EmployeeTable,
    selection: &FilterSelection,
) -> Result<Conjunction, FilterError> {
    let mut conjunction = Conjunction::default();

    for (field, allowed) in &selection.categorical {
        if allowed.is_empty() {
            continue;
        }
        table.require(*field)?;
        conjunction.push(Box::new(MemberOf {
            field: *field,
            allowed: allowed.clone(),
        }));
    }

    for (field, chosen) in [
        (Field::JobLevel, selection.job_level),
        (Field::Age, selection.age),
    ] {
        let bounds = match chosen {
            Some(bounds) => {
                table.require_numeric(field)?;
                Some(bounds)
            }
            None => table.numeric_bounds(field),
        };
        if let Some((min, max)) = bounds {
            let range = NumericRange::new(field, min, max)?;
            conjunction.push(Box::new(WithinRange { field, range }));
        }
    }

    Ok(conjunction)
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Rows of the base table that satisfy a selection.
///
/// Holds the shared table handle plus matching row indices; recomputed from
/// the base table on every interaction, never edited in place.
#[derive(Debug, Clone)]
pub struct FilteredView {
    table: DatasetHandle,
    indices: Vec<usize>,
}

impl FilteredView {
    /// Every row of the table.
    pub fn all(table: &DatasetHandle) -> Self {
        Self {
            table: Arc::clone(table),
            indices: (0..table.len()).collect(),
        }
    }

    pub fn table(&self) -> &EmployeeTable {
        &self.table
    }

    /// Indices into the base table, ascending.
    #[cfg(test)]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Employee> + '_ {
        self.indices.iter().map(|&i| &self.table.rows[i])
    }
}

/// Apply a selection to the base table.
pub fn apply_selection(
    table: &DatasetHandle,
    selection: &FilterSelection,
) -> Result<FilteredView, FilterError> {
    let predicate = build_predicate(table, selection)?;
    log::debug!("filter ({} predicates): {predicate}", predicate.len());

    let indices = if predicate.is_empty() {
        (0..table.len()).collect()
    } else {
        table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| predicate.matches(row))
            .map(|(i, _)| i)
            .collect()
    };

    Ok(FilteredView {
        table: Arc::clone(table),
        indices,
    })
}
