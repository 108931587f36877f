use chrono::NaiveDate;
use harvest_dash::aggregate::{aggregate, validate_chart};
use harvest_dash::columns::discover_columns;
use harvest_dash::filter::{Filters, apply_filters};
use harvest_dash::models::{AggregationType, ChartSpec, ChartType, DateRange, Record, Value};
use harvest_dash::{DashError, PlotPoint};

fn dated(datetime: &str, area: Value) -> Record {
    [("datetime", Value::from(datetime)), ("areaOfField", area)]
        .into_iter()
        .collect()
}

fn three_days() -> Vec<Record> {
    vec![
        dated("01/01/2567 08:00", Value::from("5")),
        dated("01/01/2567 09:00", Value::from("3")),
        dated("02/01/2567 10:00", Value::from("2")),
    ]
}

fn chart(x: &str, y: &str, agg: AggregationType) -> ChartSpec {
    ChartSpec {
        id: "chart1".into(),
        x_axis: x.into(),
        y_axis: y.into(),
        chart_type: ChartType::Bar,
        title: "t".into(),
        aggregation_type: agg,
    }
}

fn pt(x: &str, y: f64) -> PlotPoint {
    PlotPoint { x: x.into(), y }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn daily_area_individual() {
    let records = three_days();
    let cols = discover_columns(&records);
    let refs: Vec<&Record> = records.iter().collect();
    let s = aggregate(
        &refs,
        &chart("datetime", "areaOfField", AggregationType::Individual),
        &cols,
    )
    .unwrap();
    assert_eq!(s.x_key, "date");
    assert_eq!(s.y_key, "area");
    assert_eq!(s.points, vec![pt("01/01/2567", 8.0), pt("02/01/2567", 2.0)]);
}

#[test]
fn daily_area_cumulative() {
    let records = three_days();
    let cols = discover_columns(&records);
    let refs: Vec<&Record> = records.iter().collect();
    let s = aggregate(
        &refs,
        &chart("datetime", "areaOfField", AggregationType::Cumulative),
        &cols,
    )
    .unwrap();
    assert_eq!(s.points, vec![pt("01/01/2567", 8.0), pt("02/01/2567", 10.0)]);
}

#[test]
fn single_day_range_keeps_only_that_day() {
    let records = three_days();
    let cols = discover_columns(&records);
    let filters = Filters::new(DateRange {
        start: ymd(2024, 1, 2),
        end: ymd(2024, 1, 2),
    });
    let kept = apply_filters(&records, &filters);
    assert_eq!(kept.len(), 1);
    let s = aggregate(
        &kept,
        &chart("datetime", "areaOfField", AggregationType::Individual),
        &cols,
    )
    .unwrap();
    assert_eq!(s.points, vec![pt("02/01/2567", 2.0)]);
}

#[test]
fn generic_group_and_sum() {
    let records: Vec<Record> = [("A", 1.0), ("A", 2.0), ("B", 3.0)]
        .into_iter()
        .map(|(status, area)| {
            [("status", Value::from(status)), ("areaOfField", Value::Number(area))]
                .into_iter()
                .collect()
        })
        .collect();
    let cols = discover_columns(&records);
    let refs: Vec<&Record> = records.iter().collect();
    let s = aggregate(
        &refs,
        &chart("status", "areaOfField", AggregationType::Individual),
        &cols,
    )
    .unwrap();
    assert_eq!(s.x_key, "status");
    assert_eq!(s.y_key, "areaOfField");
    assert_eq!(s.points, vec![pt("A", 3.0), pt("B", 3.0)]);

    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"status": "A", "areaOfField": 3.0},
            {"status": "B", "areaOfField": 3.0}
        ])
    );
}

#[test]
fn buckets_sort_by_calendar_not_text() {
    // as text, 31/12/2566 would sort last
    let records = vec![
        dated("02/02/2567 08:00", Value::from("1")),
        dated("10/01/2567 08:00", Value::from("2")),
        dated("31/12/2566 08:00", Value::from("4")),
    ];
    let cols = discover_columns(&records);
    let refs: Vec<&Record> = records.iter().collect();
    let s = aggregate(
        &refs,
        &chart("datetime", "areaOfField", AggregationType::Cumulative),
        &cols,
    )
    .unwrap();
    assert_eq!(
        s.points,
        vec![
            pt("31/12/2566", 4.0),
            pt("10/01/2567", 6.0),
            pt("02/02/2567", 7.0)
        ]
    );
}

#[test]
fn cumulative_is_monotone_and_ends_at_total() {
    let areas = ["1.111", "0", "2.5", "abc", "7.25", "0.333"];
    let records: Vec<Record> = areas
        .iter()
        .enumerate()
        .map(|(i, a)| dated(&format!("{:02}/03/2567 06:00", i + 1), Value::from(*a)))
        .collect();
    let cols = discover_columns(&records);
    let refs: Vec<&Record> = records.iter().collect();

    let daily = aggregate(
        &refs,
        &chart("datetime", "areaOfField", AggregationType::Individual),
        &cols,
    )
    .unwrap();
    let running = aggregate(
        &refs,
        &chart("datetime", "areaOfField", AggregationType::Cumulative),
        &cols,
    )
    .unwrap();

    assert_eq!(daily.len(), running.len());
    for w in running.points.windows(2) {
        assert!(w[1].y >= w[0].y, "{:?}", running.points);
    }
    let last = running.points.last().unwrap().y;
    assert!((last - daily.total()).abs() < 0.01, "{last} vs {}", daily.total());
}

#[test]
fn generic_path_conserves_mass_and_is_unrounded() {
    let records: Vec<Record> = [("C-1", "1.004"), ("C-2", "2.003"), ("C-1", "x"), ("C-3", "0.001")]
        .into_iter()
        .map(|(car, area)| {
            [("carNo", Value::from(car)), ("areaOfField", Value::from(area))]
                .into_iter()
                .collect()
        })
        .collect();
    let cols = discover_columns(&records);
    let refs: Vec<&Record> = records.iter().collect();
    let s = aggregate(
        &refs,
        &chart("carNo", "areaOfField", AggregationType::Individual),
        &cols,
    )
    .unwrap();
    let xs: Vec<&str> = s.points.iter().map(|p| p.x.as_str()).collect();
    assert_eq!(xs, ["C-1", "C-2", "C-3"]);
    assert!((s.total() - (1.004 + 2.003 + 0.001)).abs() < 1e-12);
    // no rounding outside the date path
    assert_eq!(s.points[2].y, 0.001);
}

#[test]
fn numeric_x_values_group_by_display_text() {
    let records: Vec<Record> = [1.0, 2.0, 1.0]
        .into_iter()
        .map(|g| {
            [("group", Value::Number(g)), ("areaOfField", Value::Number(1.5))]
                .into_iter()
                .collect()
        })
        .collect();
    let cols = discover_columns(&records);
    let refs: Vec<&Record> = records.iter().collect();
    let s = aggregate(
        &refs,
        &chart("group", "areaOfField", AggregationType::Individual),
        &cols,
    )
    .unwrap();
    assert_eq!(s.points, vec![pt("1", 3.0), pt("2", 1.5)]);
}

#[test]
fn empty_inputs_give_empty_series() {
    let records = three_days();
    let cols = discover_columns(&records);
    let spec = chart("datetime", "areaOfField", AggregationType::Individual);

    let s = aggregate(&[], &spec, &cols).unwrap();
    assert!(s.is_empty());

    let refs: Vec<&Record> = records.iter().collect();
    let s = aggregate(&refs, &spec, &[]).unwrap();
    assert!(s.is_empty());
}

#[test]
fn unknown_axis_is_a_configuration_error() {
    let records = three_days();
    let cols = discover_columns(&records);
    let refs: Vec<&Record> = records.iter().collect();
    let spec = chart("datetime", "tonnage", AggregationType::Individual);
    let err = aggregate(&refs, &spec, &cols).unwrap_err();
    assert_eq!(
        err,
        DashError::UnknownColumn {
            chart_id: "chart1".into(),
            column: "tonnage".into()
        }
    );
    // excluded fields are not columns either
    assert!(validate_chart(&chart("id", "areaOfField", AggregationType::Individual), &cols).is_err());
}

#[test]
fn unparsable_bucket_goes_last() {
    let records = vec![
        dated("garbage", Value::from("1")),
        dated("02/01/2567 10:00", Value::from("2")),
        dated("01/01/2567 10:00", Value::from("3")),
    ];
    let cols = discover_columns(&records);
    let refs: Vec<&Record> = records.iter().collect();
    let s = aggregate(
        &refs,
        &chart("datetime", "areaOfField", AggregationType::Individual),
        &cols,
    )
    .unwrap();
    let xs: Vec<&str> = s.points.iter().map(|p| p.x.as_str()).collect();
    assert_eq!(xs, ["01/01/2567", "02/01/2567", "garbage"]);
}

#[test]
fn aggregation_is_repeatable() {
    let records = three_days();
    let cols = discover_columns(&records);
    let refs: Vec<&Record> = records.iter().collect();
    let spec = chart("datetime", "areaOfField", AggregationType::Cumulative);
    assert_eq!(
        aggregate(&refs, &spec, &cols).unwrap(),
        aggregate(&refs, &spec, &cols).unwrap()
    );
}

#[test]
fn daily_totals_round_by_stored_value() {
    let records = vec![
        dated("01/01/2567 08:00", Value::from("1.115")),
        dated("02/01/2567 08:00", Value::from("1.005")),
        dated("03/01/2567 08:00", Value::from("0.125")),
    ];
    let cols = discover_columns(&records);
    let refs: Vec<&Record> = records.iter().collect();
    let s = aggregate(
        &refs,
        &chart("datetime", "areaOfField", AggregationType::Individual),
        &cols,
    )
    .unwrap();
    let ys: Vec<f64> = s.points.iter().map(|p| p.y).collect();
    assert_eq!(ys, [1.11, 1.0, 0.13]);
}
