//! KPIs and grouped aggregates over a [`FilteredView`].
//!
//! Everything here is a pure function of the view.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use super::error::SchemaError;
use super::filter::FilteredView;
use super::model::{CellValue, Employee, Field};

// ---------------------------------------------------------------------------
// Stat – a number or an explicit "no data" marker
// ---------------------------------------------------------------------------

/// Result of a mean or correlation. `NoData` when the input has nothing to
/// aggregate, instead of NaN or a silent zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stat {
    Value(f64),
    NoData,
}

impl Stat {
    pub fn value(self) -> Option<f64> {
        match self {
            Stat::Value(v) => Some(v),
            Stat::NoData => None,
        }
    }

    fn from_finite(v: f64) -> Self {
        if v.is_finite() {
            Stat::Value(v)
        } else {
            Stat::NoData
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Value(v) => write!(f, "{v}"),
            Stat::NoData => f.write_str("no data"),
        }
    }
}

/// Round to one decimal place the way a decimal `round(x, 1)` does: exact
/// ties go to the even digit, and a product that only looks like a tie after
/// scaling is resolved by the rounding error of the scaling itself.
pub fn round1(v: f64) -> f64 {
    let scaled = v * 10.0;
    let rounded = if scaled.fract().abs() == 0.5 {
        // Exact residual of `v * 10.0`; zero only for a true tie.
        let residual = v.mul_add(10.0, -scaled);
        if residual > 0.0 {
            scaled.ceil()
        } else if residual < 0.0 {
            scaled.floor()
        } else {
            scaled.round_ties_even()
        }
    } else {
        scaled.round()
    };
    rounded / 10.0
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

/// How the "Total Employees" headcount is measured.
///
/// The source dashboard summed `EmployeeID` values instead of counting rows.
/// That behaviour stays the default until product owners decide otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadcountMode {
    #[default]
    IdentifierSum,
    RowCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct KpiOptions {
    pub headcount: HeadcountMode,
    /// Employees with strictly more years at the company count as loyal.
    pub loyalty_threshold_years: f64,
}

impl Default for KpiOptions {
    fn default() -> Self {
        Self {
            headcount: HeadcountMode::default(),
            loyalty_threshold_years: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiSet {
    pub total_employees: i64,
    pub average_age: Stat,
    pub average_salary: Stat,
    /// Percentage, 0 when the headcount is 0.
    pub loyalty_rate: f64,
}

fn headcount<'a>(rows: impl Iterator<Item = &'a Employee>, mode: HeadcountMode) -> i64 {
    match mode {
        HeadcountMode::RowCount => rows.count() as i64,
        HeadcountMode::IdentifierSum => rows
            .filter_map(|r| r.number(Field::EmployeeId))
            .sum::<f64>() as i64,
    }
}

/// Mean of a numeric field over non-null cells, rounded to one decimal.
pub fn rounded_mean(view: &FilteredView, field: Field) -> Stat {
    match mean(view.rows().filter_map(|r| r.number(field))) {
        Stat::Value(v) => Stat::Value(round1(v)),
        Stat::NoData => Stat::NoData,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Stat {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        Stat::NoData
    } else {
        Stat::from_finite(sum / n as f64)
    }
}

pub fn compute_kpis(view: &FilteredView, options: &KpiOptions) -> KpiSet {
    let total_employees = headcount(view.rows(), options.headcount);
    let loyal = headcount(
        view.rows().filter(|r| {
            r.number(Field::YearsAtCompany)
                .is_some_and(|y| y > options.loyalty_threshold_years)
        }),
        options.headcount,
    );
    let loyalty_rate = if total_employees == 0 {
        0.0
    } else {
        round1(loyal as f64 / total_employees as f64 * 100.0)
    };

    KpiSet {
        total_employees,
        average_age: rounded_mean(view, Field::Age),
        average_salary: rounded_mean(view, Field::MonthlyIncome),
        loyalty_rate,
    }
}

// ---------------------------------------------------------------------------
// Grouped counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GroupCount {
    pub key: CellValue,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairCount {
    pub outer: CellValue,
    pub inner: CellValue,
    pub count: usize,
}

/// Rows per distinct value of `field`, most frequent first (ties by value).
/// Null cells are not counted.
pub fn count_by(view: &FilteredView, field: Field) -> Result<Vec<GroupCount>, SchemaError> {
    view.table().require(field)?;
    let mut counts: BTreeMap<&CellValue, usize> = BTreeMap::new();
    for row in view.rows() {
        let key = row.get(field);
        if !key.is_null() {
            *counts.entry(key).or_default() += 1;
        }
    }
    let mut groups: Vec<GroupCount> = counts
        .into_iter()
        .map(|(key, count)| GroupCount {
            key: key.clone(),
            count,
        })
        .collect();
    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    Ok(groups)
}

/// Rows per `(outer, inner)` pair, ordered by key. Pairs with a null side
/// are skipped.
pub fn count_by_pair(
    view: &FilteredView,
    outer: Field,
    inner: Field,
) -> Result<Vec<PairCount>, SchemaError> {
    view.table().require(outer)?;
    view.table().require(inner)?;
    let mut counts: BTreeMap<(&CellValue, &CellValue), usize> = BTreeMap::new();
    for row in view.rows() {
        let (o, i) = (row.get(outer), row.get(inner));
        if !o.is_null() && !i.is_null() {
            *counts.entry((o, i)).or_default() += 1;
        }
    }
    Ok(counts
        .into_iter()
        .map(|((o, i), count)| PairCount {
            outer: o.clone(),
            inner: i.clone(),
            count,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation between every pair of numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()` squared.
    pub cells: Vec<Vec<Stat>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Stat {
        self.cells[row][col]
    }
}

/// Pearson's r over pairwise-complete observations.
pub fn pearson(pairs: &[(f64, f64)]) -> Stat {
    let n = pairs.len();
    if n < 2 {
        return Stat::NoData;
    }
    let nf = n as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / nf;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / nf;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Stat::NoData;
    }
    Stat::from_finite((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Correlation matrix over all numeric columns of the table.
///
/// `None` with fewer than two numeric columns or fewer than two rows.
/// The diagonal is always 1; off-diagonal cells without variance are
/// `NoData`.
pub fn correlation_matrix(view: &FilteredView) -> Option<CorrelationMatrix> {
    let columns = view.table().numeric_columns();
    if columns.len() < 2 || view.len() < 2 {
        return None;
    }

    let values: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|c| view.rows().map(|r| r.get_column(c).as_f64()).collect())
        .collect();

    let k = columns.len();
    let mut cells = vec![vec![Stat::NoData; k]; k];
    for i in 0..k {
        cells[i][i] = Stat::Value(1.0);
        for j in (i + 1)..k {
            let pairs: Vec<(f64, f64)> = values[i]
                .iter()
                .zip(&values[j])
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .collect();
            let r = pearson(&pairs);
            cells[i][j] = r;
            cells[j][i] = r;
        }
    }
    Some(CorrelationMatrix { columns, cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply_selection, FilterSelection};
    use crate::data::testing::{sample_table, table_from};

    fn sales_view() -> FilteredView {
        let table = sample_table();
        let selection = FilterSelection::default().with_values(Field::Department, ["Sales"]);
        apply_selection(&table, &selection).unwrap()
    }

    fn empty_view() -> FilteredView {
        let table = sample_table();
        let selection = FilterSelection::default().with_values(Field::Department, ["Legal"]);
        apply_selection(&table, &selection).unwrap()
    }

    #[test]
    fn kpis_sum_identifiers_by_default() {
        let kpis = compute_kpis(&sales_view(), &KpiOptions::default());
        // ids 1 + 2 + 3; only id 2 has more than five years.
        assert_eq!(kpis.total_employees, 6);
        assert_eq!(kpis.loyalty_rate, 33.3);
        assert_eq!(kpis.average_age, Stat::Value(31.3));
        assert_eq!(kpis.average_salary, Stat::Value(4866.7));
    }

    #[test]
    fn mean_ties_round_to_even() {
        let table = table_from(&[
            &[("EmployeeID", CellValue::Integer(1)), ("Age", CellValue::Integer(30))],
            &[("EmployeeID", CellValue::Integer(2)), ("Age", CellValue::Integer(30))],
            &[("EmployeeID", CellValue::Integer(3)), ("Age", CellValue::Integer(30))],
            &[("EmployeeID", CellValue::Integer(4)), ("Age", CellValue::Integer(31))],
        ]);
        let view = FilteredView::all(&table);
        assert_eq!(rounded_mean(&view, Field::Age), Stat::Value(30.2));
    }

    #[test]
    fn round1_follows_decimal_rounding() {
        assert_eq!(round1(30.25), 30.2);
        assert_eq!(round1(30.75), 30.8);
        assert_eq!(round1(0.25), 0.2);
        assert_eq!(round1(-0.25), -0.2);
        // Stored below the written value.
        assert_eq!(round1(0.15), 0.1);
        // Stored above the written value.
        assert_eq!(round1(30.35), 30.4);
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(4866.666), 4866.7);
    }

    #[test]
    fn kpis_can_count_rows() {
        let options = KpiOptions {
            headcount: HeadcountMode::RowCount,
            ..KpiOptions::default()
        };
        let kpis = compute_kpis(&sales_view(), &options);
        assert_eq!(kpis.total_employees, 3);
        assert_eq!(kpis.loyalty_rate, 33.3);
    }

    #[test]
    fn empty_view_yields_zero_loyalty_and_no_data_means() {
        let view = empty_view();
        assert!(view.is_empty());
        let kpis = compute_kpis(&view, &KpiOptions::default());
        assert_eq!(kpis.total_employees, 0);
        assert_eq!(kpis.loyalty_rate, 0.0);
        assert_eq!(kpis.average_age, Stat::NoData);
        assert_eq!(kpis.average_salary, Stat::NoData);
        assert!(count_by(&view, Field::Department).unwrap().is_empty());
        assert!(correlation_matrix(&view).is_none());
    }

    #[test]
    fn department_attrition_pairs() {
        let view = sales_view();
        assert_eq!(view.len(), 3);
        let pairs = count_by_pair(&view, Field::Department, Field::Attrition).unwrap();
        assert_eq!(
            pairs,
            vec![
                PairCount {
                    outer: "Sales".into(),
                    inner: "No".into(),
                    count: 2
                },
                PairCount {
                    outer: "Sales".into(),
                    inner: "Yes".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn counts_are_ordered_by_frequency() {
        let table = sample_table();
        let view = FilteredView::all(&table);
        let counts = count_by(&view, Field::Department).unwrap();
        let summary: Vec<(String, usize)> =
            counts.iter().map(|g| (g.key.to_string(), g.count)).collect();
        assert_eq!(
            summary,
            vec![
                ("Research & Development".to_string(), 5),
                ("Sales".to_string(), 3),
                ("Human Resources".to_string(), 2),
            ]
        );
        let levels = count_by(&view, Field::JobLevel).unwrap();
        assert_eq!(levels.iter().map(|g| g.count).sum::<usize>(), 10);
        assert_eq!(levels[0].key, CellValue::Integer(1));
    }

    #[test]
    fn grouping_by_missing_field_is_a_schema_error() {
        let table = table_from(&[&[("Department", "Sales".into())]]);
        let view = FilteredView::all(&table);
        assert!(count_by(&view, Field::JobRole).is_err());
        assert!(count_by_pair(&view, Field::Department, Field::Attrition).is_err());
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let table = sample_table();
        let matrix = correlation_matrix(&FilteredView::all(&table)).unwrap();
        assert_eq!(
            matrix.columns,
            vec![
                "Age",
                "EmployeeID",
                "JobLevel",
                "MonthlyIncome",
                "TotalWorkingYears",
                "YearsAtCompany"
            ]
        );
        for i in 0..matrix.columns.len() {
            assert_eq!(matrix.get(i, i), Stat::Value(1.0));
            for j in 0..matrix.columns.len() {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
                if let Stat::Value(r) = matrix.get(i, j) {
                    assert!((-1.0..=1.0).contains(&r));
                }
            }
        }
        // Age and income rise together in the fixture.
        let age_income = matrix.get(0, 3).value().unwrap();
        assert!(age_income > 0.8);
    }

    #[test]
    fn constant_column_has_no_off_diagonal_correlation() {
        let table = table_from(&[
            &[("A", CellValue::Integer(1)), ("B", CellValue::Integer(3))],
            &[("A", CellValue::Integer(2)), ("B", CellValue::Integer(3))],
        ]);
        let matrix = correlation_matrix(&FilteredView::all(&table)).unwrap();
        assert_eq!(matrix.get(0, 1), Stat::NoData);
        assert_eq!(matrix.get(1, 1), Stat::Value(1.0));
    }

    #[test]
    fn pearson_detects_perfect_relationships() {
        assert_eq!(pearson(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]), Stat::Value(1.0));
        assert_eq!(pearson(&[(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]), Stat::Value(-1.0));
        assert_eq!(pearson(&[(1.0, 1.0)]), Stat::NoData);
    }
}
