use chrono::NaiveDate;
use harvest_dash::filter::{FilterValue, Filters, apply_filters, included};
use harvest_dash::models::{DateRange, Record, Value};

fn rec(datetime: &str, status: &str, area: Value) -> Record {
    [
        ("id", Value::from("x")),
        ("datetime", Value::from(datetime)),
        ("status", Value::from(status)),
        ("areaOfField", area),
    ]
    .into_iter()
    .collect()
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn january() -> Filters {
    Filters::new(DateRange {
        start: ymd(2024, 1, 1),
        end: ymd(2024, 1, 31),
    })
}

fn sample() -> Vec<Record> {
    vec![
        rec("01/01/2567 08:00", "done", Value::from("5")),
        rec("15/01/2567 12:00", "pending", Value::Number(3.0)),
        rec("31/01/2567 23:59", "done", Value::from("2")),
        rec("01/02/2567 00:01", "done", Value::from("1")),
        rec("not-a-date", "done", Value::from("9")),
        rec("", "done", Value::from("9")),
    ]
}

#[test]
fn bounds_are_inclusive() {
    let rows = sample();
    let kept = apply_filters(&rows, &january());
    assert_eq!(kept.len(), 3);
    assert!(included(&rows[0], &january()));
    assert!(included(&rows[2], &january()));
    assert!(!included(&rows[3], &january()));
}

#[test]
fn unparsable_or_missing_dates_are_excluded() {
    let wide = Filters::new(DateRange {
        start: ymd(1, 1, 1),
        end: ymd(9999, 12, 31),
    });
    let rows = sample();
    assert!(!included(&rows[4], &wide));
    assert!(!included(&rows[5], &wide));

    let no_datetime: Record = [("status", Value::from("done"))].into_iter().collect();
    assert!(!included(&no_datetime, &wide));
}

#[test]
fn column_equality_is_strict() {
    let rows = sample();
    let mut f = january();
    f.columns
        .insert("areaOfField".into(), FilterValue::Equals(Value::from("3")));
    assert!(apply_filters(&rows, &f).is_empty());

    f.columns
        .insert("areaOfField".into(), FilterValue::Equals(Value::Number(3.0)));
    let kept = apply_filters(&rows, &f);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].get("status"), Some(&Value::from("pending")));
}

#[test]
fn all_sentinel_and_absent_keys_do_not_constrain() {
    let rows = sample();
    let mut f = january();
    let baseline = apply_filters(&rows, &f).len();
    f.columns.insert("status".into(), FilterValue::All);
    f.columns.insert("driver".into(), FilterValue::All);
    assert_eq!(apply_filters(&rows, &f).len(), baseline);
    assert_eq!(f.get("owner"), &FilterValue::All);
}

#[test]
fn constraints_combine_with_and() {
    let rows = sample();
    let mut f = january();
    f.columns
        .insert("status".into(), FilterValue::Equals(Value::from("done")));
    assert_eq!(apply_filters(&rows, &f).len(), 2);
    f.columns
        .insert("areaOfField".into(), FilterValue::Equals(Value::from("2")));
    assert_eq!(apply_filters(&rows, &f).len(), 1);
}

#[test]
fn filter_on_missing_column_excludes_everything() {
    let rows = sample();
    let mut f = january();
    f.columns
        .insert("driver".into(), FilterValue::Equals(Value::from("Anan")));
    assert!(apply_filters(&rows, &f).is_empty());
}

#[test]
fn inverted_range_yields_nothing() {
    let rows = sample();
    let f = Filters::new(DateRange {
        start: ymd(2024, 1, 31),
        end: ymd(2024, 1, 1),
    });
    assert!(apply_filters(&rows, &f).is_empty());
}

#[test]
fn filtered_count_never_exceeds_input_and_widening_is_monotone() {
    let rows = sample();
    let mut last = 0;
    for end_day in 1..=31 {
        let f = Filters::new(DateRange {
            start: ymd(2024, 1, 1),
            end: ymd(2024, 1, end_day),
        });
        let n = apply_filters(&rows, &f).len();
        assert!(n <= rows.len());
        assert!(n >= last, "narrower range kept more records");
        last = n;
    }
}

#[test]
fn filter_values_serialize_with_explicit_sentinel() {
    let all = serde_json::to_value(FilterValue::All).unwrap();
    assert_eq!(all, serde_json::json!("all"));
    let eq = serde_json::to_value(FilterValue::Equals(Value::from("all"))).unwrap();
    assert_eq!(eq, serde_json::json!({"equals": "all"}));
    let back: FilterValue = serde_json::from_value(eq).unwrap();
    assert_eq!(back, FilterValue::Equals(Value::from("all")));
}
