use harvest_dash::models::Value;
use harvest_dash::storage::{
    load_records, save_dashboard_csv, save_dashboard_json, save_series_csv, save_series_json,
};
use harvest_dash::{PlotPoint, Series};
use std::fs;
use tempfile::tempdir;

fn sample_series() -> Series {
    Series {
        x_key: "carNo".into(),
        y_key: "areaOfField".into(),
        points: vec![
            PlotPoint {
                x: "C-1".into(),
                y: 3.5,
            },
            PlotPoint {
                x: "=HYPERLINK(\"x\")".into(),
                y: 1.0,
            },
        ],
    }
}

#[test]
fn json_records_keep_field_order_and_value_kinds() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("records.json");
    fs::write(
        &path,
        r#"[{"status":"done","datetime":"01/01/2567 08:00","areaOfField":5.5,"carNo":"C-1"}]"#,
    )
    .unwrap();

    let records = load_records(&path).unwrap();
    assert_eq!(records.len(), 1);
    let keys: Vec<&str> = records[0].keys().collect();
    assert_eq!(keys, ["status", "datetime", "areaOfField", "carNo"]);
    assert_eq!(records[0].get("areaOfField"), Some(&Value::Number(5.5)));
    assert_eq!(records[0].get("carNo"), Some(&Value::from("C-1")));
}

#[test]
fn csv_records_are_text() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("records.csv");
    fs::write(
        &path,
        "datetime,carNo,areaOfField\n01/01/2567 08:00,C-1,5\n02/01/2567 09:00,C-2,\n",
    )
    .unwrap();

    let records = load_records(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("areaOfField"), Some(&Value::from("5")));
    assert_eq!(records[1].get("areaOfField"), Some(&Value::from("")));
}

#[test]
fn unsupported_extension_and_nested_json_are_rejected() {
    let tmp = tempdir().unwrap();
    let txt = tmp.path().join("records.txt");
    fs::write(&txt, "").unwrap();
    assert!(load_records(&txt).is_err());

    let nested = tmp.path().join("nested.json");
    fs::write(&nested, r#"[{"status":{"code":1}}]"#).unwrap();
    assert!(load_records(&nested).is_err());

    assert!(load_records(tmp.path().join("missing.json")).is_err());
}

#[test]
fn series_json_uses_the_series_keys() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("series.json");
    save_series_json(&sample_series(), &path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(v[0]["carNo"], "C-1");
    assert_eq!(v[0]["areaOfField"], 3.5);
    assert_eq!(v.as_array().unwrap().len(), 2);
}

#[test]
fn csv_exports_neutralize_formulas() {
    let tmp = tempdir().unwrap();
    let single = tmp.path().join("series.csv");
    save_series_csv(&sample_series(), &single).unwrap();
    let text = fs::read_to_string(&single).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("carNo,areaOfField"));
    assert_eq!(lines.next(), Some("C-1,3.5"));
    let third = lines.next().unwrap();
    assert!(third.starts_with("\"'=HYPERLINK"), "{third}");

    let many = tmp.path().join("dashboard.csv");
    save_dashboard_csv(&[("chart1".to_string(), sample_series())], &many).unwrap();
    let text = fs::read_to_string(&many).unwrap();
    assert!(text.starts_with("chart,x,y\nchart1,C-1,3.5\n"));
    assert!(!text.lines().any(|l| l.contains(",=")));
}

#[test]
fn dashboard_json_is_keyed_by_chart_in_order() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("dashboard.json");
    let charts = vec![
        ("chart2".to_string(), sample_series()),
        ("chart1".to_string(), Series::empty("date", "area")),
    ];
    save_dashboard_json(&charts, &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.find("chart2").unwrap() < text.find("chart1").unwrap());
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["chart2"][0]["carNo"], "C-1");
    assert_eq!(v["chart1"], serde_json::json!([]));
}
