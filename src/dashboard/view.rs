//! Dashboard view model
//!
//! Pure projection of a [`StatsSnapshot`] into what the dashboard shows.
//! Nothing here performs I/O; surfaces apply the result.

use crate::stats::StatsSnapshot;
use serde::Serialize;

pub const LABEL_TOTAL: &str = "Total proteins";
pub const LABEL_LABELED: &str = "Labeled proteins";
pub const LABEL_ISOLATED: &str = "Isolated proteins";
pub const LABEL_SIMILARITIES: &str = "Similarity edges";

pub const CATEGORY_LABELED: &str = "Labeled";
pub const CATEGORY_UNLABELED: &str = "Unlabeled";

/// The only message a user sees when statistics cannot be shown
pub const ERROR_MESSAGE: &str = "Unable to load statistics. Please try again later.";

/// One summary block: a number and its fixed caption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryCard {
    pub value: u64,
    pub label: &'static str,
}

/// One bar of the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bar {
    pub category: &'static str,
    pub value: u64,
}

/// Bar chart description handed to a charting surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarChart {
    pub title: &'static str,
    pub bars: Vec<Bar>,
    /// The value axis starts at zero
    pub begin_at_zero: bool,
}

impl BarChart {
    pub fn categories(&self) -> Vec<&'static str> {
        self.bars.iter().map(|b| b.category).collect()
    }

    pub fn values(&self) -> Vec<u64> {
        self.bars.iter().map(|b| b.value).collect()
    }

    /// Largest bar value, zero for an all-zero chart
    pub fn max_value(&self) -> u64 {
        self.bars.iter().map(|b| b.value).max().unwrap_or(0)
    }
}

/// Centered notice replacing the card region on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorNotice {
    pub message: &'static str,
}

/// Everything the dashboard displays after one render attempt
///
/// Cards and chart only exist together, so a surface can never show one
/// without the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardView {
    Ready {
        cards: [SummaryCard; 4],
        chart: BarChart,
    },
    Failed {
        notice: ErrorNotice,
    },
}

impl DashboardView {
    /// Project a snapshot into cards and chart
    pub fn from_snapshot(snapshot: &StatsSnapshot) -> Self {
        let documents = &snapshot.documents;
        let graph = &snapshot.graph;

        let cards = [
            SummaryCard {
                value: documents.total_proteins,
                label: LABEL_TOTAL,
            },
            SummaryCard {
                value: documents.labeled_proteins,
                label: LABEL_LABELED,
            },
            SummaryCard {
                value: graph.isolated_proteins,
                label: LABEL_ISOLATED,
            },
            SummaryCard {
                value: graph.total_similarities,
                label: LABEL_SIMILARITIES,
            },
        ];

        let chart = BarChart {
            title: "Labeling status",
            bars: vec![
                Bar {
                    category: CATEGORY_LABELED,
                    value: documents.labeled_proteins,
                },
                Bar {
                    category: CATEGORY_UNLABELED,
                    value: documents.unlabeled_proteins,
                },
            ],
            begin_at_zero: true,
        };

        DashboardView::Ready { cards, chart }
    }

    /// The generic error state
    pub fn failed() -> Self {
        DashboardView::Failed {
            notice: ErrorNotice {
                message: ERROR_MESSAGE,
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DashboardView::Failed { .. })
    }

    pub fn cards(&self) -> Option<&[SummaryCard; 4]> {
        match self {
            DashboardView::Ready { cards, .. } => Some(cards),
            DashboardView::Failed { .. } => None,
        }
    }

    pub fn chart(&self) -> Option<&BarChart> {
        match self {
            DashboardView::Ready { chart, .. } => Some(chart),
            DashboardView::Failed { .. } => None,
        }
    }

    pub fn notice(&self) -> Option<&ErrorNotice> {
        match self {
            DashboardView::Ready { .. } => None,
            DashboardView::Failed { notice } => Some(notice),
        }
    }
}
