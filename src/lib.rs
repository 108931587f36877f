//! harvest_dash
//!
//! Filtering, aggregation, and charting engine for harvest-collection records
//! (vehicle, driver, status, area, Buddhist-era timestamp, quota group). Pairs with the
//! `harvest-dash` CLI.
//!
//! ### Features
//! - Discover chartable columns from an untyped record set
//! - Filter by an inclusive date range plus exact per-column values
//! - Aggregate into chart series: per-day or cumulative area, or group-and-sum on any column
//! - Manage a list of independent charts against one shared filter state
//! - Summaries by status, JSON/CSV loading and export, SVG/PNG rendering
//!
//! ### Example
//! ```no_run
//! use harvest_dash::{Dashboard, FilterValue, storage};
//!
//! let records = storage::load_records("harvest.json")?;
//! let mut dash = Dashboard::initialize(records);
//! dash.update_filter("status", FilterValue::Equals("เสร็จสิ้น".into()));
//! for (chart, series) in dash.series_for_all() {
//!     let series = series?;
//!     println!("{}: {} points", chart.title, series.len());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod aggregate;
pub mod columns;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod format;
pub mod layout;
pub mod models;
pub mod registry;
pub mod render;
pub mod stats;
pub mod storage;
pub mod thai_date;

pub use aggregate::{PlotPoint, Series, aggregate};
pub use dashboard::Dashboard;
pub use error::DashError;
pub use filter::{FilterValue, Filters};
pub use models::{
    AggregationType, ChartPatch, ChartSpec, ChartType, ColumnDescriptor, DashboardConfig,
    DateRange, RangeBound, Record, Value,
};
