use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field holding the combined Buddhist-era date and time, e.g. `"01/01/2567 08:00"`.
pub const DATETIME_FIELD: &str = "datetime";
/// Harvested area in rai; numeric or string-encoded.
pub const AREA_FIELD: &str = "areaOfField";
pub const STATUS_FIELD: &str = "status";

/// One scalar cell of a record.
///
/// Equality is strict: `Number(5.0)` never equals `Text("5")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }
}

impl fmt::Display for Value {
    /// Whole numbers print without a fractional part (`3`, not `3.0`), so numeric
    /// group keys read the same as their string-encoded twins.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

/// A flat harvest-collection entry. Field order is the order the source supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Field names in source order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A field eligible for axis and filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub key: String,
    pub label: String,
}

/// Inclusive calendar-date bounds (Gregorian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Degenerate range covering a single day.
    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }
}

/// Which bound of the date range an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeBound {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Bar,
    Scatter,
}

/// How the date-bucketed area series is accumulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationType {
    /// Per-bucket sum.
    #[default]
    Individual,
    /// Running total across buckets in chronological order.
    Cumulative,
}

/// One user-configured chart.
///
/// `aggregation_type` only matters when `y_axis` is the area field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub id: String,
    pub x_axis: String,
    pub y_axis: String,
    pub chart_type: ChartType,
    pub title: String,
    #[serde(default)]
    pub aggregation_type: AggregationType,
}

/// Field-wise edit of a [`ChartSpec`]; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPatch {
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    pub chart_type: Option<ChartType>,
    pub title: Option<String>,
    pub aggregation_type: Option<AggregationType>,
}

impl ChartSpec {
    /// Returns a copy with every `Some` field of `patch` applied. The id never changes.
    pub fn merged(&self, patch: &ChartPatch) -> ChartSpec {
        ChartSpec {
            id: self.id.clone(),
            x_axis: patch.x_axis.clone().unwrap_or_else(|| self.x_axis.clone()),
            y_axis: patch.y_axis.clone().unwrap_or_else(|| self.y_axis.clone()),
            chart_type: patch.chart_type.unwrap_or(self.chart_type),
            title: patch.title.clone().unwrap_or_else(|| self.title.clone()),
            aggregation_type: patch.aggregation_type.unwrap_or(self.aggregation_type),
        }
    }
}

/// The single state surface of a dashboard: shared filters plus the ordered chart list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub filters: crate::filter::Filters,
    pub charts: Vec<ChartSpec>,
}
