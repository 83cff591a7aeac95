//! Statistics dashboard
//!
//! Rendering is split in two:
//! - [`DashboardView::from_snapshot`] is a pure projection of a snapshot into
//!   four summary cards and one bar chart;
//! - a [`Surface`] applies a view (HTML fragments here, a terminal table in the
//!   CLI).
//!
//! [`DashboardRenderer`] glues a [`StatsSource`] to a surface: one fetch, then
//! either the full view or the single error notice.

pub mod renderer;
pub mod source;
pub mod surface;
pub mod view;

pub use renderer::{DashboardRenderer, DEFAULT_FETCH_TIMEOUT};
pub use source::{parse_snapshot, FetchError, FetchResult, StatsSource};
pub use surface::{HtmlSurface, Surface};
pub use view::{Bar, BarChart, DashboardView, ErrorNotice, SummaryCard, ERROR_MESSAGE};
