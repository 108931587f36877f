//! Dashboard layout files: a saved set of charts and filters applied on load.
//!
//! ```json
//! {
//!   "charts": [
//!     { "id": "daily", "xAxis": "datetime", "yAxis": "areaOfField",
//!       "chartType": "line", "title": "Daily area", "aggregationType": "cumulative" }
//!   ],
//!   "filters": { "status": { "equals": "เสร็จสิ้น" }, "driver": "all" },
//!   "dateRange": { "start": "2024-01-01", "end": "2024-01-31" }
//! }
//! ```

use crate::dashboard::Dashboard;
use crate::filter::FilterValue;
use crate::models::{ChartSpec, DateRange, RangeBound};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// When non-empty, replaces the seeded default chart.
    #[serde(default)]
    pub charts: Vec<ChartSpec>,
    #[serde(default)]
    pub filters: IndexMap<String, FilterValue>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
}

impl Layout {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Layout> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open layout {}", path.display()))?;
        serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse layout {}", path.display()))
    }

    /// Apply through the controller's own edits, so a layout obeys the same rules as
    /// interactive changes.
    pub fn apply(&self, dashboard: &mut Dashboard) {
        if !self.charts.is_empty() {
            let seeded: Vec<String> = dashboard.charts().iter().map(|c| c.id.clone()).collect();
            for id in &seeded {
                dashboard.remove_chart(id);
            }
            for chart in &self.charts {
                dashboard.insert_chart(chart.clone());
            }
        }
        for (column, value) in &self.filters {
            dashboard.update_filter(column, value.clone());
        }
        if let Some(range) = self.date_range {
            dashboard.update_date_range_filter(RangeBound::Start, range.start);
            dashboard.update_date_range_filter(RangeBound::End, range.end);
        }
        log::debug!(
            "layout applied: {} charts, {} filters",
            dashboard.charts().len(),
            dashboard.filters().columns.len()
        );
    }
}
