use crate::aggregate::coerce_number;
use crate::models::{AREA_FIELD, Record, STATUS_FIELD};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Record count and harvested area for one status value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusSummary {
    pub status: String,
    pub count: usize,
    pub area: f64,
}

/// Overview of a dataset: total area plus a per-status breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub records: usize,
    pub total_area: f64,
    /// Ordered by first occurrence of each status.
    pub by_status: Vec<StatusSummary>,
}

/// Summarize records by status. Area values go through the same coercion as charts.
pub fn summarize(records: &[Record]) -> Summary {
    let mut groups: IndexMap<String, (usize, f64)> = IndexMap::new();
    let mut total_area = 0.0;
    for r in records {
        let area = coerce_number(r.get(AREA_FIELD));
        total_area += area;
        let status = r.get(STATUS_FIELD).map(|v| v.to_string()).unwrap_or_default();
        let entry = groups.entry(status).or_default();
        entry.0 += 1;
        entry.1 += area;
    }

    let by_status = groups
        .into_iter()
        .map(|(status, (count, area))| StatusSummary {
            status,
            count,
            area,
        })
        .collect();
    Summary {
        records: records.len(),
        total_area,
        by_status,
    }
}
