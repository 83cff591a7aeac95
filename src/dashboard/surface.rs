//! Surfaces apply a [`DashboardView`] to something visible

use super::view::{BarChart, DashboardView};
use askama::Template;
use tracing::warn;

/// A place a dashboard view can be drawn on
pub trait Surface {
    /// Replace whatever the surface shows with `view`
    fn apply(&mut self, view: &DashboardView);
}

const CHART_WIDTH: u64 = 420;
const CHART_HEIGHT: u64 = 240;
const CHART_PADDING: u64 = 30;

#[derive(Template)]
#[template(path = "dashboard/cards.html")]
struct CardsFragment<'a> {
    view: &'a DashboardView,
}

/// Position of one bar inside the SVG viewport
struct BarGeometry {
    category: &'static str,
    value: u64,
    x: u64,
    y: u64,
    width: u64,
    height: u64,
    center: u64,
    value_y: u64,
}

#[derive(Template)]
#[template(path = "dashboard/chart.html")]
struct ChartFragment {
    title: &'static str,
    width: u64,
    height: u64,
    padding: u64,
    baseline: u64,
    axis_end: u64,
    label_y: u64,
    bars: Vec<BarGeometry>,
}

impl ChartFragment {
    /// Lay out the bars; heights are scaled against the largest value
    fn layout(chart: &BarChart) -> Self {
        let plot_height = CHART_HEIGHT - 2 * CHART_PADDING;
        let slot = (CHART_WIDTH - 2 * CHART_PADDING) / chart.bars.len().max(1) as u64;
        let bar_width = slot * 3 / 5;
        let max = chart.max_value();
        let baseline = CHART_HEIGHT - CHART_PADDING;

        let bars = chart
            .bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let height = if max == 0 {
                    0
                } else {
                    (bar.value as u128 * plot_height as u128 / max as u128) as u64
                };
                let x = CHART_PADDING + i as u64 * slot + (slot - bar_width) / 2;
                let y = baseline - height;
                BarGeometry {
                    category: bar.category,
                    value: bar.value,
                    x,
                    y,
                    width: bar_width,
                    height,
                    center: x + bar_width / 2,
                    value_y: y.saturating_sub(4),
                }
            })
            .collect();

        ChartFragment {
            title: chart.title,
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            padding: CHART_PADDING,
            baseline,
            axis_end: CHART_WIDTH - CHART_PADDING,
            label_y: baseline + 18,
            bars,
        }
    }
}

fn render_fragment(fragment: &impl Template, name: &str) -> String {
    match fragment.render() {
        Ok(html) => html,
        Err(e) => {
            warn!(fragment = name, error = %e, "Failed to render dashboard fragment");
            String::new()
        }
    }
}

/// Renders the card region and the chart as HTML fragments
#[derive(Debug, Default)]
pub struct HtmlSurface {
    cards: String,
    chart: String,
}

impl HtmlSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Card region markup (cards or the error notice)
    pub fn cards_html(&self) -> &str {
        &self.cards
    }

    /// Chart markup, empty when the view failed
    pub fn chart_html(&self) -> &str {
        &self.chart
    }

    /// Both regions, in page order
    pub fn into_html(self) -> String {
        format!("{}\n{}", self.cards, self.chart)
    }
}

impl Surface for HtmlSurface {
    fn apply(&mut self, view: &DashboardView) {
        self.cards = render_fragment(&CardsFragment { view }, "cards");
        self.chart = match view.chart() {
            Some(chart) => render_fragment(&ChartFragment::layout(chart), "chart"),
            None => String::new(),
        };
    }
}
