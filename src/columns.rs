//! Column discovery: which record fields can drive axes and filters.

use crate::aggregate::is_numeric_like;
use crate::filter::FilterValue;
use crate::models::{ColumnDescriptor, DATETIME_FIELD, Record, Value};
use indexmap::IndexMap;

/// Identifier and free-text fields; present on records but never offered as columns.
pub const EXCLUDED_FIELDS: [&str; 3] = ["id", "remark", "fieldNo"];

/// Display labels shown in the dashboard. Unlisted fields keep their raw key.
const COLUMN_LABELS: [(&str, &str); 8] = [
    ("datetime", "วันที่ - เวลา"),
    ("carNo", "รถตัด"),
    ("driver", "คนขับ"),
    ("group", "กลุ่ม"),
    ("status", "สถานะ"),
    ("areaOfField", "พื้นที่ (ไร่)"),
    ("owner", "เจ้าของ"),
    ("quotaGroup", "โควต้า"),
];

pub fn label_for(key: &str) -> &str {
    COLUMN_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(key, |(_, label)| label)
}

/// Discover the selectable columns from the first record's fields, in source order.
///
/// The schema is taken from the first record only; every record of a dataset is
/// expected to expose the same fields. An empty dataset yields no columns.
pub fn discover_columns(records: &[Record]) -> Vec<ColumnDescriptor> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    first
        .keys()
        .filter(|key| !EXCLUDED_FIELDS.contains(key))
        .map(|key| ColumnDescriptor {
            key: key.to_string(),
            label: label_for(key).to_string(),
        })
        .collect()
}

pub fn has_column(columns: &[ColumnDescriptor], key: &str) -> bool {
    columns.iter().any(|c| c.key == key)
}

/// First column whose value on the first record is a number or a numeric string.
///
/// This picks a default y axis, so it needs the whole text to be numeric
/// ([`is_numeric_like`]). Summation instead reads a leading number through
/// [`coerce_number`](crate::aggregate::coerce_number), which would take `"01/01/2567"` as
/// `1` and make every date column look numeric.
pub fn first_numeric_column<'a>(
    records: &[Record],
    columns: &'a [ColumnDescriptor],
) -> Option<&'a ColumnDescriptor> {
    let first = records.first()?;
    columns
        .iter()
        .find(|c| first.get(&c.key).is_some_and(is_numeric_like))
}

/// Choices for each per-column filter: [`FilterValue::All`] followed by every distinct
/// value in first-occurrence order. The datetime column is filtered by range instead and
/// is left out.
pub fn filter_options(
    records: &[Record],
    columns: &[ColumnDescriptor],
) -> IndexMap<String, Vec<FilterValue>> {
    let mut options = IndexMap::new();
    for column in columns.iter().filter(|c| c.key != DATETIME_FIELD) {
        let mut distinct: Vec<&Value> = Vec::new();
        for value in records.iter().filter_map(|r| r.get(&column.key)) {
            if !distinct.contains(&value) {
                distinct.push(value);
            }
        }
        let mut values = Vec::with_capacity(distinct.len() + 1);
        values.push(FilterValue::All);
        values.extend(distinct.into_iter().cloned().map(FilterValue::Equals));
        options.insert(column.key.clone(), values);
    }
    options
}
