//! Chart type catalog and the shared colour palette. Both are read-only statics.

use crate::error::DashError;
use crate::models::{AggregationType, ChartType};
use std::str::FromStr;

/// Drawing primitive a chart type maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// Points joined by a line, in series order.
    ConnectedLine,
    /// One bar per point from the zero baseline.
    DiscreteBar,
    /// Unconnected markers.
    PointCloud,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartTypeInfo {
    pub chart_type: ChartType,
    pub key: &'static str,
    pub name: &'static str,
    pub geometry: Geometry,
}

pub static CHART_TYPES: [ChartTypeInfo; 3] = [
    ChartTypeInfo {
        chart_type: ChartType::Line,
        key: "line",
        name: "กราฟเส้น",
        geometry: Geometry::ConnectedLine,
    },
    ChartTypeInfo {
        chart_type: ChartType::Bar,
        key: "bar",
        name: "กราฟแท่ง",
        geometry: Geometry::DiscreteBar,
    },
    ChartTypeInfo {
        chart_type: ChartType::Scatter,
        key: "scatter",
        name: "กราฟกระจาย",
        geometry: Geometry::PointCloud,
    },
];

/// Series colours as (r, g, b), used in order.
pub const PALETTE: [(u8, u8, u8); 8] = [
    (16, 185, 129),  // #10B981
    (59, 130, 246),  // #3B82F6
    (99, 102, 241),  // #6366F1
    (139, 92, 246),  // #8B5CF6
    (236, 72, 153),  // #EC4899
    (244, 63, 94),   // #F43F5E
    (249, 115, 22),  // #F97316
    (234, 179, 8),   // #EAB308
];

#[inline]
pub fn palette_color(idx: usize) -> (u8, u8, u8) {
    PALETTE[idx % PALETTE.len()]
}

/// Look a chart type up by its key (`"line"`, `"bar"`, `"scatter"`, case-insensitive).
pub fn lookup(key: &str) -> Result<&'static ChartTypeInfo, DashError> {
    CHART_TYPES
        .iter()
        .find(|info| info.key.eq_ignore_ascii_case(key.trim()))
        .ok_or_else(|| DashError::UnknownChartType(key.to_string()))
}

pub fn info(chart_type: ChartType) -> &'static ChartTypeInfo {
    match chart_type {
        ChartType::Line => &CHART_TYPES[0],
        ChartType::Bar => &CHART_TYPES[1],
        ChartType::Scatter => &CHART_TYPES[2],
    }
}

impl ChartType {
    pub fn info(self) -> &'static ChartTypeInfo {
        info(self)
    }
}

impl FromStr for ChartType {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(s).map(|info| info.chart_type)
    }
}

impl FromStr for AggregationType {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "individual" => Ok(AggregationType::Individual),
            "cumulative" => Ok(AggregationType::Cumulative),
            _ => Err(DashError::UnknownAggregation(s.to_string())),
        }
    }
}
