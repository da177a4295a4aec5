//! Distribution summaries, hierarchy breakdowns and scatter series.

use std::collections::BTreeMap;

use super::aggregate::Stat;
use super::error::SchemaError;
use super::filter::FilteredView;
use super::model::{CellValue, Field};

// ---------------------------------------------------------------------------
// Five-number summaries (box plots)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub count: usize,
}

impl FiveNumberSummary {
    /// `None` for an empty sample.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        Some(Self {
            min: values[0],
            q1: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q3: quantile(&values, 0.75),
            max: values[values.len() - 1],
            count: values.len(),
        })
    }
}

/// Linear-interpolation quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupDistribution {
    pub group: CellValue,
    /// Second grouping level (box colour), when requested.
    pub split: Option<CellValue>,
    pub summary: FiveNumberSummary,
}

/// Summarise `value` per `group` (and optionally per `split` within it).
/// Rows with a null key or a non-numeric value are skipped.
pub fn distribution_by(
    view: &FilteredView,
    value: Field,
    group: Field,
    split: Option<Field>,
) -> Result<Vec<GroupDistribution>, SchemaError> {
    let table = view.table();
    table.require_numeric(value)?;
    table.require(group)?;
    if let Some(split) = split {
        table.require(split)?;
    }

    let mut samples: BTreeMap<(&CellValue, Option<&CellValue>), Vec<f64>> = BTreeMap::new();
    for row in view.rows() {
        let g = row.get(group);
        let s = split.map(|f| row.get(f));
        if g.is_null() || s.is_some_and(CellValue::is_null) {
            continue;
        }
        if let Some(v) = row.number(value) {
            samples.entry((g, s)).or_default().push(v);
        }
    }

    Ok(samples
        .into_iter()
        .filter_map(|((g, s), values)| {
            FiveNumberSummary::from_values(values).map(|summary| GroupDistribution {
                group: g.clone(),
                split: s.cloned(),
                summary,
            })
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Hierarchy breakdown (Department → JobRole → Attrition)
// ---------------------------------------------------------------------------

/// One node of the hierarchy: the key path from the root, the summed
/// value and the mean of the colour field over the node's rows.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    pub path: Vec<CellValue>,
    pub value_sum: f64,
    pub color_mean: Stat,
    pub rows: usize,
}

impl HierarchyNode {
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn label(&self) -> String {
        self.path.last().map(ToString::to_string).unwrap_or_default()
    }
}

/// Aggregate every prefix of `levels`; nodes come out depth-first with each
/// parent before its children.
pub fn hierarchy(
    view: &FilteredView,
    levels: &[Field],
    value: Field,
    color: Field,
) -> Result<Vec<HierarchyNode>, SchemaError> {
    let table = view.table();
    for level in levels {
        table.require(*level)?;
    }
    table.require_numeric(value)?;
    table.require_numeric(color)?;

    #[derive(Default)]
    struct Acc {
        value_sum: f64,
        color_sum: f64,
        color_n: usize,
        rows: usize,
    }

    let mut nodes: BTreeMap<Vec<CellValue>, Acc> = BTreeMap::new();
    for row in view.rows() {
        let path: Vec<CellValue> = levels.iter().map(|f| row.get(*f).clone()).collect();
        if path.iter().any(CellValue::is_null) {
            continue;
        }
        for depth in 1..=path.len() {
            let acc = nodes.entry(path[..depth].to_vec()).or_default();
            acc.value_sum += row.number(value).unwrap_or(0.0);
            if let Some(c) = row.number(color) {
                acc.color_sum += c;
                acc.color_n += 1;
            }
            acc.rows += 1;
        }
    }

    Ok(nodes
        .into_iter()
        .map(|(path, acc)| HierarchyNode {
            path,
            value_sum: acc.value_sum,
            color_mean: if acc.color_n == 0 {
                Stat::NoData
            } else {
                Stat::Value(acc.color_sum / acc.color_n as f64)
            },
            rows: acc.rows,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Scatter series and trendline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterGroup {
    /// `None` when the series is not coloured by any field.
    pub label: Option<CellValue>,
    pub points: Vec<ScatterPoint>,
}

/// Points of `(x, y)` per colour group; rows missing either coordinate are
/// dropped, rows with a null colour key form their own group.
pub fn scatter_series(
    view: &FilteredView,
    x: Field,
    y: Field,
    color: Option<Field>,
) -> Result<Vec<ScatterGroup>, SchemaError> {
    let table = view.table();
    table.require_numeric(x)?;
    table.require_numeric(y)?;
    if let Some(color) = color {
        table.require(color)?;
    }

    let mut groups: BTreeMap<Option<&CellValue>, Vec<ScatterPoint>> = BTreeMap::new();
    for row in view.rows() {
        let (Some(px), Some(py)) = (row.number(x), row.number(y)) else {
            continue;
        };
        groups
            .entry(color.map(|c| row.get(c)))
            .or_default()
            .push(ScatterPoint { x: px, y: py });
    }

    Ok(groups
        .into_iter()
        .map(|(label, points)| ScatterGroup {
            label: label.cloned(),
            points,
        })
        .collect())
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trendline {
    pub slope: f64,
    pub intercept: f64,
}

impl Trendline {
    /// `None` with fewer than two points or no spread in x.
    pub fn fit(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let points: Vec<(f64, f64)> = points.into_iter().collect();
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
        let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
        if sxx == 0.0 {
            return None;
        }
        let sxy: f64 = points
            .iter()
            .map(|p| (p.0 - mean_x) * (p.1 - mean_y))
            .sum();
        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::FilteredView;
    use crate::data::testing::sample_table;

    #[test]
    fn quantiles_interpolate_linearly() {
        let s = FiveNumberSummary::from_values(vec![4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.min, 1.0);
        assert_eq!(s.q1, 1.75);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.q3, 3.25);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.count, 4);
        assert!(FiveNumberSummary::from_values(Vec::new()).is_none());
    }

    #[test]
    fn salary_distribution_by_department_and_attrition() {
        let table = sample_table();
        let view = FilteredView::all(&table);
        let dists = distribution_by(
            &view,
            Field::MonthlyIncome,
            Field::Department,
            Some(Field::Attrition),
        )
        .unwrap();
        // HR/No, HR/Yes, R&D/No, R&D/Yes, Sales/No, Sales/Yes
        assert_eq!(dists.len(), 6);
        let sales_no = dists
            .iter()
            .find(|d| d.group == CellValue::from("Sales") && d.split == Some(CellValue::from("No")))
            .unwrap();
        assert_eq!(sales_no.summary.count, 2);
        assert_eq!(sales_no.summary.median, 4900.0);
    }

    #[test]
    fn distribution_requires_numeric_value() {
        let table = sample_table();
        let view = FilteredView::all(&table);
        assert!(matches!(
            distribution_by(&view, Field::Gender, Field::Department, None),
            Err(SchemaError::NotNumeric { .. })
        ));
    }

    #[test]
    fn hierarchy_sums_identifiers_per_node() {
        let table = sample_table();
        let view = FilteredView::all(&table);
        let nodes = hierarchy(
            &view,
            &[Field::Department, Field::JobRole, Field::Attrition],
            Field::EmployeeId,
            Field::MonthlyIncome,
        )
        .unwrap();

        let sales = nodes
            .iter()
            .find(|n| n.path == vec![CellValue::from("Sales")])
            .unwrap();
        assert_eq!(sales.value_sum, 6.0);
        assert_eq!(sales.rows, 3);
        assert_eq!(sales.color_mean.value().map(|v| v.round()), Some(4867.0));

        // Parents precede their children.
        let sales_pos = nodes.iter().position(|n| n == sales).unwrap();
        let child = &nodes[sales_pos + 1];
        assert_eq!(child.depth(), 2);
        assert_eq!(child.path[0], CellValue::from("Sales"));

        let roots: f64 = nodes
            .iter()
            .filter(|n| n.depth() == 1)
            .map(|n| n.value_sum)
            .sum();
        assert_eq!(roots, 55.0);
    }

    #[test]
    fn scatter_groups_by_colour_field() {
        let table = sample_table();
        let view = FilteredView::all(&table);
        let groups =
            scatter_series(&view, Field::Age, Field::MonthlyIncome, Some(Field::Attrition))
                .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.iter().map(|g| g.points.len()).sum::<usize>(), 10);

        let ungrouped = scatter_series(&view, Field::Age, Field::MonthlyIncome, None).unwrap();
        assert_eq!(ungrouped.len(), 1);
        assert_eq!(ungrouped[0].label, None);
    }

    #[test]
    fn trendline_fits_exact_line() {
        let line = Trendline::fit([(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).unwrap();
        assert_eq!(line.slope, 2.0);
        assert_eq!(line.intercept, 1.0);
        assert_eq!(line.at(10.0), 21.0);
        assert!(Trendline::fit([(1.0, 1.0), (1.0, 2.0)]).is_none());
        assert!(Trendline::fit([(1.0, 1.0)]).is_none());
    }
}
