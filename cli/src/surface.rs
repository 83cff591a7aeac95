//! Terminal surface for the dashboard view

use comfy_table::{ContentArrangement, Table};
use protgraph::dashboard::{BarChart, DashboardView, Surface};

/// Width of the longest bar, in characters
const BAR_WIDTH: u64 = 40;

/// Renders cards as a table and the chart as horizontal text bars
#[derive(Debug, Default)]
pub struct TerminalSurface {
    output: String,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}

impl Surface for TerminalSurface {
    fn apply(&mut self, view: &DashboardView) {
        self.output = match view {
            DashboardView::Ready { cards, chart } => {
                let mut table = Table::new();
                table.set_content_arrangement(ContentArrangement::Dynamic);
                table.set_header(cards.iter().map(|c| c.label).collect::<Vec<_>>());
                table.add_row(cards.iter().map(|c| c.value.to_string()).collect::<Vec<_>>());
                format!("{}\n\n{}", table, text_bars(chart))
            }
            DashboardView::Failed { notice } => notice.message.to_string(),
        };
    }
}

fn text_bars(chart: &BarChart) -> String {
    let max = chart.max_value();
    let label_width = chart.categories().iter().map(|c| c.len()).max().unwrap_or(0);

    let mut lines = vec![chart.title.to_string()];
    for bar in &chart.bars {
        let len = if max == 0 {
            0
        } else {
            (bar.value as u128 * BAR_WIDTH as u128 / max as u128) as u64
        };
        lines.push(format!(
            "{:<width$} | {} {}",
            bar.category,
            "█".repeat(len as usize),
            bar.value,
            width = label_width
        ));
    }
    lines.join("\n")
}
