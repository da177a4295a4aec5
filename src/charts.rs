//! Chart bindings: filtered data → renderer-independent chart descriptions.
//!
//! Every builder returns its own `Result` so one failing chart is reported
//! in place while the others still render.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::data::aggregate::{count_by, count_by_pair, correlation_matrix, Stat};
use crate::data::error::SchemaError;
use crate::data::filter::FilteredView;
use crate::data::level::JobLevel;
use crate::data::model::{CellValue, Field};
use crate::data::summary::{
    distribution_by, hierarchy, scatter_series, FiveNumberSummary, HierarchyNode, Trendline,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    NotEnoughData(&'static str),
}

pub type ChartResult<T> = Result<T, ChartError>;

// ---------------------------------------------------------------------------
// Chart descriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    /// One value per category, aligned with `BarChart::categories`.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
    /// Category labels drawn under the bars.
    pub show_category_labels: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonutChart {
    pub title: String,
    pub slices: Vec<(String, f64)>,
}

impl DonutChart {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|(_, v)| v).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub title: String,
    pub labels: Vec<String>,
    pub cells: Vec<Vec<Stat>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxSeries {
    pub name: String,
    /// `(category index, summary)` pairs.
    pub boxes: Vec<(usize, FiveNumberSummary)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxChart {
    pub title: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<BoxSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ScatterSeries>,
    /// Endpoints of the trendline across the x range.
    pub trend: Option<[[f64; 2]; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyTable {
    pub title: String,
    pub levels: Vec<String>,
    pub nodes: Vec<HierarchyNode>,
}

/// User choices for the scatter section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterSettings {
    pub x: Field,
    pub y: Field,
    pub color: Option<Field>,
    pub trendline: bool,
}

impl Default for ScatterSettings {
    fn default() -> Self {
        Self {
            x: Field::Age,
            y: Field::MonthlyIncome,
            color: Some(Field::Department),
            trendline: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

fn single_series_bar(
    view: &FilteredView,
    field: Field,
    title: &str,
    show_category_labels: bool,
) -> ChartResult<BarChart> {
    let counts = count_by(view, field)?;
    Ok(BarChart {
        title: title.to_string(),
        categories: counts.iter().map(|g| g.key.to_string()).collect(),
        series: vec![BarSeries {
            name: "Total Employees".to_string(),
            values: counts.iter().map(|g| g.count as f64).collect(),
        }],
        show_category_labels,
    })
}

pub fn department_chart(view: &FilteredView) -> ChartResult<BarChart> {
    single_series_bar(view, Field::Department, "Total Employees by Department", true)
}

/// Job role names are long; the bars carry them in hover text only.
pub fn job_role_chart(view: &FilteredView) -> ChartResult<BarChart> {
    single_series_bar(view, Field::JobRole, "Total Employees by Job Role", false)
}

/// Grouped bars: one series per attrition value.
pub fn attrition_by_department_chart(view: &FilteredView) -> ChartResult<BarChart> {
    let pairs = count_by_pair(view, Field::Department, Field::Attrition)?;
    let categories: Vec<CellValue> = pairs
        .iter()
        .map(|p| p.outer.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let statuses: BTreeSet<&CellValue> = pairs.iter().map(|p| &p.inner).collect();

    let series = statuses
        .into_iter()
        .rev()
        .map(|status| BarSeries {
            name: status.to_string(),
            values: categories
                .iter()
                .map(|dept| {
                    pairs
                        .iter()
                        .find(|p| &p.outer == dept && &p.inner == status)
                        .map_or(0.0, |p| p.count as f64)
                })
                .collect(),
        })
        .collect();

    Ok(BarChart {
        title: "Attrition by Department".to_string(),
        categories: categories.iter().map(ToString::to_string).collect(),
        series,
        show_category_labels: true,
    })
}

/// Donut of employees per job level, labelled with the level name.
pub fn job_level_chart(view: &FilteredView) -> ChartResult<DonutChart> {
    let counts = count_by(view, Field::JobLevel)?;
    let slices = counts
        .iter()
        .map(|g| {
            let label = match g.key {
                CellValue::Integer(rank) => JobLevel::from_rank(rank)
                    .map_or_else(|| rank.to_string(), |l| format!("{rank} · {l}")),
                ref other => other.to_string(),
            };
            (label, g.count as f64)
        })
        .collect();
    Ok(DonutChart {
        title: "Count of EmployeeID by JobLevel".to_string(),
        slices,
    })
}

pub fn correlation_chart(view: &FilteredView) -> ChartResult<Heatmap> {
    let matrix = correlation_matrix(view).ok_or(ChartError::NotEnoughData(
        "correlation needs at least two numeric columns and two rows",
    ))?;
    let n = matrix.columns.len();
    let cells = (0..n)
        .map(|i| (0..n).map(|j| matrix.get(i, j)).collect())
        .collect();
    Ok(Heatmap {
        title: "Feature Correlation Matrix".to_string(),
        labels: matrix.columns,
        cells,
    })
}

fn box_chart(
    view: &FilteredView,
    value: Field,
    group: Field,
    split: Field,
    title: &str,
) -> ChartResult<BoxChart> {
    let dists = distribution_by(view, value, group, Some(split))?;
    let categories: Vec<&CellValue> = dists
        .iter()
        .map(|d| &d.group)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let splits: BTreeSet<Option<&CellValue>> = dists.iter().map(|d| d.split.as_ref()).collect();

    let series = splits
        .into_iter()
        .map(|s| BoxSeries {
            name: s.map(ToString::to_string).unwrap_or_default(),
            boxes: dists
                .iter()
                .filter(|d| d.split.as_ref() == s)
                .filter_map(|d| {
                    let idx = categories.iter().position(|c| *c == &d.group)?;
                    Some((idx, d.summary))
                })
                .collect(),
        })
        .collect();

    Ok(BoxChart {
        title: title.to_string(),
        y_label: value.to_string(),
        categories: categories.iter().map(ToString::to_string).collect(),
        series,
    })
}

pub fn salary_distribution_chart(view: &FilteredView) -> ChartResult<BoxChart> {
    box_chart(
        view,
        Field::MonthlyIncome,
        Field::Department,
        Field::Attrition,
        "Salary Distribution by Department",
    )
}

pub fn tenure_distribution_chart(view: &FilteredView) -> ChartResult<BoxChart> {
    box_chart(
        view,
        Field::YearsAtCompany,
        Field::JobRole,
        Field::Gender,
        "Tenure Distribution by Job Role",
    )
}

pub fn hierarchy_table(view: &FilteredView) -> ChartResult<HierarchyTable> {
    let levels = [Field::Department, Field::JobRole, Field::Attrition];
    let nodes = hierarchy(view, &levels, Field::EmployeeId, Field::MonthlyIncome)?;
    Ok(HierarchyTable {
        title: "Employee Hierarchy Analysis".to_string(),
        levels: levels.iter().map(ToString::to_string).collect(),
        nodes,
    })
}

pub fn scatter_chart(view: &FilteredView, settings: &ScatterSettings) -> ChartResult<ScatterChart> {
    let groups = scatter_series(view, settings.x, settings.y, settings.color)?;

    let trend = if settings.trendline {
        let points = groups.iter().flat_map(|g| g.points.iter().map(|p| (p.x, p.y)));
        let (lo, hi) = groups
            .iter()
            .flat_map(|g| g.points.iter().map(|p| p.x))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                (lo.min(x), hi.max(x))
            });
        Trendline::fit(points).map(|line| [[lo, line.at(lo)], [hi, line.at(hi)]])
    } else {
        None
    };

    let series = groups
        .into_iter()
        .map(|g| ScatterSeries {
            name: g
                .label
                .map_or_else(|| settings.y.to_string(), |l| l.to_string()),
            points: g.points.iter().map(|p| [p.x, p.y]).collect(),
        })
        .collect();

    Ok(ScatterChart {
        title: format!("{} vs {} Relationship", settings.y, settings.x),
        x_label: settings.x.to_string(),
        y_label: settings.y.to_string(),
        series,
        trend,
    })
}
