//! Dashboard controller: one configuration value, replaced wholesale on every edit.
//!
//! Each edit is a pure function `DashboardConfig -> DashboardConfig` (the `with_*`
//! methods); [`Dashboard`] holds the dataset and swaps in the result. Filtered records and
//! per-chart series are recomputed from the current configuration on every read, so they
//! cannot drift from it.

use crate::aggregate::{Series, aggregate};
use crate::columns::{discover_columns, filter_options, first_numeric_column, has_column};
use crate::error::DashError;
use crate::filter::{FilterValue, Filters, apply_filters};
use crate::models::{
    AREA_FIELD, AggregationType, ChartPatch, ChartSpec, ChartType, ColumnDescriptor,
    DATETIME_FIELD, DashboardConfig, DateRange, RangeBound, Record, Value,
};
use crate::thai_date::{ParsedDate, parse_thai_date};
use chrono::{Local, NaiveDate};
use indexmap::IndexMap;

const DEFAULT_CHART_TITLE: &str = "พื้นที่เก็บเกี่ยวตามรถตัด";
const NEW_CHART_TITLE: &str = "กราฟใหม่";

impl DashboardConfig {
    /// Append a bar chart over `x_axis` × `y_axis` with a fresh id and a numbered title.
    pub fn with_chart_added(&self, x_axis: &str, y_axis: &str) -> DashboardConfig {
        let n = self.charts.len() + 1;
        self.with_chart_inserted(ChartSpec {
            id: next_chart_id(&self.charts),
            x_axis: x_axis.to_string(),
            y_axis: y_axis.to_string(),
            chart_type: ChartType::Bar,
            title: format!("{NEW_CHART_TITLE} {n}"),
            aggregation_type: AggregationType::Individual,
        })
    }

    /// Append `spec` as given; a colliding id is replaced with a fresh one.
    pub fn with_chart_inserted(&self, mut spec: ChartSpec) -> DashboardConfig {
        if spec.id.is_empty() || self.charts.iter().any(|c| c.id == spec.id) {
            spec.id = next_chart_id(&self.charts);
        }
        let mut charts = self.charts.clone();
        charts.push(spec);
        DashboardConfig {
            filters: self.filters.clone(),
            charts,
        }
    }

    /// Drop the chart with `id`; unknown ids leave the list unchanged.
    pub fn without_chart(&self, id: &str) -> DashboardConfig {
        DashboardConfig {
            filters: self.filters.clone(),
            charts: self.charts.iter().filter(|c| c.id != id).cloned().collect(),
        }
    }

    /// Merge `patch` into the chart with `id`; unknown ids leave the list unchanged.
    pub fn with_chart_updated(&self, id: &str, patch: &ChartPatch) -> DashboardConfig {
        DashboardConfig {
            filters: self.filters.clone(),
            charts: self
                .charts
                .iter()
                .map(|c| if c.id == id { c.merged(patch) } else { c.clone() })
                .collect(),
        }
    }

    pub fn with_filter(&self, column: &str, value: FilterValue) -> DashboardConfig {
        let mut filters = self.filters.clone();
        filters.columns.insert(column.to_string(), value);
        DashboardConfig {
            filters,
            charts: self.charts.clone(),
        }
    }

    /// Set one bound of the date range. `start > end` is accepted and filters everything out.
    pub fn with_date_bound(&self, bound: RangeBound, value: NaiveDate) -> DashboardConfig {
        let mut filters = self.filters.clone();
        match bound {
            RangeBound::Start => filters.date_range.start = value,
            RangeBound::End => filters.date_range.end = value,
        }
        DashboardConfig {
            filters,
            charts: self.charts.clone(),
        }
    }
}

/// `chart{n}` with the smallest `n > len` not already taken.
fn next_chart_id(charts: &[ChartSpec]) -> String {
    let mut n = charts.len() + 1;
    loop {
        let id = format!("chart{n}");
        if !charts.iter().any(|c| c.id == id) {
            return id;
        }
        n += 1;
    }
}

/// Min/max of every parsable `datetime` in `records`.
pub fn date_span(records: &[Record]) -> Option<DateRange> {
    let mut dates = records
        .iter()
        .filter_map(|r| r.get(DATETIME_FIELD).and_then(Value::as_text))
        .filter_map(parse_thai_date)
        .filter_map(ParsedDate::valid);
    let first = dates.next()?;
    let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Some(DateRange { start, end })
}

/// Owns the dataset and the current [`DashboardConfig`].
#[derive(Debug, Clone)]
pub struct Dashboard {
    records: Vec<Record>,
    columns: Vec<ColumnDescriptor>,
    available: Option<DateRange>,
    config: DashboardConfig,
}

impl Dashboard {
    /// Initialize from `records`, using today as the range for a dataset without dates.
    pub fn initialize(records: Vec<Record>) -> Self {
        Self::initialize_on(records, Local::now().date_naive())
    }

    /// Initialize with an explicit fallback day.
    ///
    /// The date filter spans every parsable record date (or `today` alone). With at least
    /// one column, one default bar chart is seeded.
    pub fn initialize_on(records: Vec<Record>, today: NaiveDate) -> Self {
        let columns = discover_columns(&records);
        let available = date_span(&records);
        let range = available.unwrap_or_else(|| DateRange::single_day(today));
        if available.is_none() && !records.is_empty() {
            log::warn!("no parsable record dates; date filter set to {}", today);
        }

        let charts = match default_axes(&records, &columns) {
            Some((x_axis, y_axis)) => vec![ChartSpec {
                id: "chart1".to_string(),
                x_axis,
                y_axis,
                chart_type: ChartType::Bar,
                title: DEFAULT_CHART_TITLE.to_string(),
                aggregation_type: AggregationType::Individual,
            }],
            None => Vec::new(),
        };
        log::info!(
            "dashboard initialized: {} records, {} columns, {} charts",
            records.len(),
            columns.len(),
            charts.len()
        );
        Self {
            records,
            columns,
            available,
            config: DashboardConfig {
                filters: Filters::new(range),
                charts,
            },
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn charts(&self) -> &[ChartSpec] {
        &self.config.charts
    }

    pub fn filters(&self) -> &Filters {
        &self.config.filters
    }

    /// Bounds for a date picker: the parsable date span of the dataset.
    pub fn available_range(&self) -> Option<DateRange> {
        self.available
    }

    pub fn filter_options(&self) -> IndexMap<String, Vec<FilterValue>> {
        filter_options(&self.records, &self.columns)
    }

    /// Append a default chart. Does nothing without records or columns.
    pub fn add_chart(&mut self) {
        let Some((x_axis, y_axis)) = default_axes(&self.records, &self.columns) else {
            log::debug!("add_chart ignored: no columns");
            return;
        };
        self.config = self.config.with_chart_added(&x_axis, &y_axis);
    }

    /// Append a fully specified chart (e.g. from a layout file).
    pub fn insert_chart(&mut self, spec: ChartSpec) {
        self.config = self.config.with_chart_inserted(spec);
    }

    pub fn remove_chart(&mut self, id: &str) {
        self.config = self.config.without_chart(id);
    }

    pub fn update_chart(&mut self, id: &str, patch: &ChartPatch) {
        self.config = self.config.with_chart_updated(id, patch);
    }

    pub fn update_filter(&mut self, column: &str, value: FilterValue) {
        self.config = self.config.with_filter(column, value);
    }

    pub fn update_date_range_filter(&mut self, bound: RangeBound, value: NaiveDate) {
        self.config = self.config.with_date_bound(bound, value);
    }

    /// Records passing the current filters, in dataset order.
    pub fn filtered(&self) -> Vec<&Record> {
        apply_filters(&self.records, &self.config.filters)
    }

    /// Series for the chart with `id`, or `None` if no such chart exists.
    pub fn series(&self, id: &str) -> Option<Result<Series, DashError>> {
        let chart = self.config.charts.iter().find(|c| c.id == id)?;
        let filtered = self.filtered();
        Some(aggregate(&filtered, chart, &self.columns))
    }

    /// Every chart with its series, in chart order. Filtering runs once for all charts.
    pub fn series_for_all(&self) -> Vec<(&ChartSpec, Result<Series, DashError>)> {
        let filtered = self.filtered();
        self.config
            .charts
            .iter()
            .map(|c| (c, aggregate(&filtered, c, &self.columns)))
            .collect()
    }
}

/// Default axes: `datetime` × `areaOfField` when present, else the first column × the first
/// numeric column (or the first column). `None` when there are no columns.
fn default_axes(records: &[Record], columns: &[ColumnDescriptor]) -> Option<(String, String)> {
    let first = columns.first()?;
    let x_axis = if has_column(columns, DATETIME_FIELD) {
        DATETIME_FIELD.to_string()
    } else {
        first.key.clone()
    };
    let y_axis = if has_column(columns, AREA_FIELD) {
        AREA_FIELD.to_string()
    } else {
        first_numeric_column(records, columns)
            .unwrap_or(first)
            .key
            .clone()
    };
    Some((x_axis, y_axis))
}
