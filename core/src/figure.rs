//! Renderer-agnostic figure descriptions, one per summary table.
//!
//! A chart front end picks a [`TableId`], asks for its figure and draws it.
//! No styling lives here: only titles, series names and data.

use crate::summary::{SummaryTables, TableId, TableView};
use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_TITLE: &str = "Please select an analysis from the dropdown.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Bar,
    Scatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarMode {
    Single,
    Group,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: Option<String>,
    pub kind: SeriesKind,
    pub x: Vec<String>,
    /// None marks an undefined value (for example a mean over no amounts).
    pub y: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureSpec {
    pub table: Option<TableId>,
    pub title: String,
    pub bar_mode: BarMode,
    pub series: Vec<Series>,
}

impl FigureSpec {
    /// Shown before any table has been selected.
    pub fn placeholder() -> Self {
        Self {
            table: None,
            title: PLACEHOLDER_TITLE.into(),
            bar_mode: BarMode::Single,
            series: Vec::new(),
        }
    }

    pub fn has_data(&self) -> bool {
        self.series.iter().any(|s| !s.x.is_empty())
    }
}

fn bar(name: Option<&str>, x: Vec<String>, y: Vec<Option<f64>>) -> Series {
    Series {
        name: name.map(str::to_string),
        kind: SeriesKind::Bar,
        x,
        y,
    }
}

pub fn title(id: TableId) -> &'static str {
    match id {
        TableId::Table1 => "Impact of Validation Checks on Cash Utilization",
        TableId::Table2 => "Failure Rate by Trigger Type",
        TableId::Table3 => "Timing Analysis for Trigger and Validation Activities",
        TableId::Table4 => "Tradeable vs. Non-Tradeable Account Performance",
        TableId::Table5 => "Predictive Modeling for Future Cash Excess",
        TableId::Table6 => "Linking Account Features to Validation Failures",
    }
}

/// Map a selection to its figure. `None` yields the placeholder.
pub fn figure_for(tables: &SummaryTables, selection: Option<TableId>) -> FigureSpec {
    let Some(id) = selection else {
        return FigureSpec::placeholder();
    };

    let (bar_mode, series) = match tables.view(id) {
        TableView::CashUtilization(rows) => {
            let x: Vec<String> = rows.iter().map(|r| r.account_tradeable.to_string()).collect();
            (
                BarMode::Group,
                vec![
                    bar(
                        Some("Average Excess Cash"),
                        x.clone(),
                        rows.iter().map(|r| r.mean_excess_cash).collect(),
                    ),
                    bar(
                        Some("Total Accounts"),
                        x,
                        rows.iter().map(|r| Some(r.record_count as f64)).collect(),
                    ),
                ],
            )
        }
        TableView::TriggerFailures(rows) => {
            let x: Vec<String> = rows.iter().map(|r| r.trigger.clone()).collect();
            (
                BarMode::Group,
                vec![
                    bar(
                        Some("Failure Count"),
                        x.clone(),
                        rows.iter().map(|r| Some(r.failed_count as f64)).collect(),
                    ),
                    bar(
                        Some("Failure Rate (%)"),
                        x,
                        rows.iter().map(|r| r.failure_rate_percentage).collect(),
                    ),
                ],
            )
        }
        TableView::Timing(rows) => (
            BarMode::Single,
            vec![bar(
                Some("Trigger Count"),
                rows.iter().map(|r| r.hour.to_string()).collect(),
                rows.iter().map(|r| Some(r.trigger_count as f64)).collect(),
            )],
        ),
        TableView::AccountPerformance(rows) => {
            let x: Vec<String> = rows.iter().map(|r| r.account_tradeable.to_string()).collect();
            (
                BarMode::Group,
                vec![
                    bar(
                        Some("Average Excess Cash"),
                        x.clone(),
                        rows.iter().map(|r| r.mean_excess_cash).collect(),
                    ),
                    bar(
                        Some("Number of Transactions"),
                        x,
                        rows.iter().map(|r| Some(r.record_count as f64)).collect(),
                    ),
                ],
            )
        }
        TableView::CashExcess(points) => (
            BarMode::Single,
            vec![Series {
                name: None,
                kind: SeriesKind::Scatter,
                x: points
                    .iter()
                    .map(|p| p.run_datetime.format("%Y-%m-%d %H:%M:%S").to_string())
                    .collect(),
                y: points.iter().map(|p| Some(p.excess_cash_amount)).collect(),
            }],
        ),
        TableView::ValidationFailures(rows) => {
            let x: Vec<String> = rows.iter().map(|r| r.validation_category.clone()).collect();
            (
                BarMode::Group,
                vec![
                    bar(
                        Some("Average Excess Cash"),
                        x.clone(),
                        rows.iter().map(|r| r.mean_excess_cash).collect(),
                    ),
                    bar(
                        Some("Count of Failures"),
                        x,
                        rows.iter().map(|r| Some(r.amount_count as f64)).collect(),
                    ),
                ],
            )
        }
    };

    let mut figure = FigureSpec {
        table: Some(id),
        title: title(id).to_string(),
        bar_mode,
        series,
    };
    if !figure.has_data() {
        figure.title = format!("{} (No data)", figure.title);
    }
    figure
}
