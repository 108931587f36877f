//! Grouping filtered records into chart-ready series.
//!
//! Two paths:
//! - `datetime` × `areaOfField`: bucket by calendar day, order buckets chronologically, and
//!   emit per-day sums or a running total, rounded to 2 decimals.
//! - anything else: group by the raw x value (first-occurrence order) and sum y, unrounded.

use crate::columns::has_column;
use crate::error::DashError;
use crate::models::{
    AREA_FIELD, AggregationType, ChartSpec, ColumnDescriptor, DATETIME_FIELD, Record, Value,
};
use crate::thai_date::parse_thai_date;
use ahash::AHashMap;
use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Output keys of the date-bucketed area series.
pub const DATE_KEY: &str = "date";
pub const AREA_KEY: &str = "area";

/// One plotted point: categorical x label, numeric y.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub x: String,
    pub y: f64,
}

/// Ordered points plus the keys a renderer maps to its axes.
///
/// Serializes as `[{ x_key: x, y_key: y }, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub x_key: String,
    pub y_key: String,
    pub points: Vec<PlotPoint>,
}

impl Series {
    pub fn empty(x_key: impl Into<String>, y_key: impl Into<String>) -> Self {
        Self {
            x_key: x_key.into(),
            y_key: y_key.into(),
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.y).sum()
    }
}

struct PointRef<'a>(&'a Series, &'a PlotPoint);

impl Serialize for PointRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(&self.0.x_key, &self.1.x)?;
        map.serialize_entry(&self.0.y_key, &self.1.y)?;
        map.end()
    }
}

impl Serialize for Series {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.points.len()))?;
        for p in &self.points {
            seq.serialize_element(&PointRef(self, p))?;
        }
        seq.end()
    }
}

/// Coerce a cell to a number for summation.
///
/// Numbers pass through (non-finite ones count as 0). Strings contribute their leading
/// decimal literal (`"12.5 rai"` → 12.5); anything without one contributes 0.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) if n.is_finite() => *n,
        Some(Value::Text(s)) => leading_float(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// A value is numeric-like when it is a number or its whole text parses as a finite float.
pub fn is_numeric_like(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_finite(),
        Value::Text(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
    }
}

/// Round to 2 decimals by the exact stored value, so `1.115` (stored just below) gives `1.11`.
/// Exact halves round away from zero.
pub fn round2(v: f64) -> f64 {
    if !v.is_finite() {
        return v;
    }
    // multiples of 1/8 scale by 100 without error; these are the only exact halves
    if (v * 8.0).fract() == 0.0 {
        return (v * 100.0).round() / 100.0;
    }
    format!("{v:.2}").parse().unwrap_or(v)
}

/// Check that both axes of `chart` name discovered columns.
pub fn validate_chart(chart: &ChartSpec, columns: &[ColumnDescriptor]) -> Result<(), DashError> {
    for axis in [&chart.x_axis, &chart.y_axis] {
        if !has_column(columns, axis) {
            return Err(DashError::UnknownColumn {
                chart_id: chart.id.clone(),
                column: axis.clone(),
            });
        }
    }
    Ok(())
}

/// Aggregate `filtered` for one chart.
///
/// No columns or no records yields an empty series; an axis outside `columns` is a
/// configuration error.
pub fn aggregate(
    filtered: &[&Record],
    chart: &ChartSpec,
    columns: &[ColumnDescriptor],
) -> Result<Series, DashError> {
    let date_path = chart.x_axis == DATETIME_FIELD && chart.y_axis == AREA_FIELD;
    let (x_key, y_key) = if date_path {
        (DATE_KEY, AREA_KEY)
    } else {
        (chart.x_axis.as_str(), chart.y_axis.as_str())
    };
    if columns.is_empty() {
        return Ok(Series::empty(x_key, y_key));
    }
    validate_chart(chart, columns)?;
    if filtered.is_empty() {
        return Ok(Series::empty(x_key, y_key));
    }

    let points = if date_path {
        daily_area(filtered, chart.aggregation_type)
    } else {
        group_sum(filtered, &chart.x_axis, &chart.y_axis)
    };
    log::debug!("chart {}: {} points", chart.id, points.len());
    Ok(Series {
        x_key: x_key.to_string(),
        y_key: y_key.to_string(),
        points,
    })
}

struct DayBucket {
    label: String,
    date: Option<NaiveDate>,
    area: f64,
}

/// Buckets are ordered by parsed date; unparsable bucket labels go last, in
/// first-occurrence order.
fn daily_area(filtered: &[&Record], mode: AggregationType) -> Vec<PlotPoint> {
    let mut index: AHashMap<String, usize> = AHashMap::new();
    let mut buckets: Vec<DayBucket> = Vec::new();
    for record in filtered {
        let stamp = record
            .get(DATETIME_FIELD)
            .map(Value::to_string)
            .unwrap_or_default();
        let label = stamp.split_once(' ').map_or(stamp.as_str(), |(d, _)| d);
        let slot = match index.get(label) {
            Some(&i) => i,
            None => {
                let date = parse_thai_date(label).and_then(|d| d.valid());
                if date.is_none() {
                    log::warn!("unparsable date bucket '{}' sorted last", label);
                }
                buckets.push(DayBucket {
                    label: label.to_string(),
                    date,
                    area: 0.0,
                });
                index.insert(label.to_string(), buckets.len() - 1);
                buckets.len() - 1
            }
        };
        buckets[slot].area += coerce_number(record.get(AREA_FIELD));
    }

    // stable: equal keys keep first-occurrence order
    buckets.sort_by_key(|b| (b.date.is_none(), b.date));

    let mut running = 0.0;
    buckets
        .into_iter()
        .map(|b| {
            let y = match mode {
                AggregationType::Individual => b.area,
                AggregationType::Cumulative => {
                    running += b.area;
                    running
                }
            };
            PlotPoint {
                x: b.label,
                y: round2(y),
            }
        })
        .collect()
}

fn group_sum(filtered: &[&Record], x_axis: &str, y_axis: &str) -> Vec<PlotPoint> {
    let mut index: AHashMap<String, usize> = AHashMap::new();
    let mut points: Vec<PlotPoint> = Vec::new();
    for record in filtered {
        let x = record
            .get(x_axis)
            .map(Value::to_string)
            .unwrap_or_default();
        let y = coerce_number(record.get(y_axis));
        match index.get(&x) {
            Some(&i) => points[i].y += y,
            None => {
                index.insert(x.clone(), points.len());
                points.push(PlotPoint { x, y });
            }
        }
    }
    points
}

/// Longest prefix of `s` (after leading whitespace) that reads as a decimal literal.
fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    // optional exponent, only taken when followed by digits
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
