//! Record inclusion: a date-range test AND one equality test per filtered column.

use crate::models::{DATETIME_FIELD, DateRange, Record, Value};
use crate::thai_date::parse_thai_date;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Selection for one column filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterValue {
    /// No constraint on the column.
    All,
    /// Keep records whose value is strictly equal (no number/string coercion).
    Equals(Value),
}

impl FilterValue {
    pub fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            FilterValue::All => true,
            FilterValue::Equals(wanted) => value == Some(wanted),
        }
    }
}

/// Active filters. A column absent from `columns` is unconstrained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub date_range: DateRange,
    #[serde(default)]
    pub columns: IndexMap<String, FilterValue>,
}

impl Filters {
    pub fn new(date_range: DateRange) -> Self {
        Self {
            date_range,
            columns: IndexMap::new(),
        }
    }

    pub fn get(&self, column: &str) -> &FilterValue {
        self.columns.get(column).unwrap_or(&FilterValue::All)
    }
}

/// Whether `record` passes every active filter.
///
/// A record whose `datetime` is missing, empty, or unparsable never passes the date test.
pub fn included(record: &Record, filters: &Filters) -> bool {
    let in_range = record
        .get(DATETIME_FIELD)
        .and_then(Value::as_text)
        .and_then(parse_thai_date)
        .is_some_and(|d| d.within(&filters.date_range));
    in_range
        && filters
            .columns
            .iter()
            .all(|(column, wanted)| wanted.matches(record.get(column)))
}

/// Records passing [`included`], in their original order.
pub fn apply_filters<'a>(records: &'a [Record], filters: &Filters) -> Vec<&'a Record> {
    let kept: Vec<&Record> = records.iter().filter(|r| included(r, filters)).collect();
    log::debug!("filters kept {} of {} records", kept.len(), records.len());
    kept
}
