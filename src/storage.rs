use crate::aggregate::Series;
use crate::models::{Record, Value};
use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, WriterBuilder};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Load records, choosing the format from the file extension (`.json` or `.csv`).
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("unsupported input format: '{}' (expected .json or .csv)", other),
    }
}

/// Load a JSON array of flat objects whose values are strings or numbers.
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let records: Vec<Record> = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse {} as an array of flat records", path.display()))?;
    log::info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Load CSV with a header row. Every cell becomes a text value.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    let headers = rdr.headers().context("read csv header")?.clone();
    let mut out = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("csv row {}", i + 1))?;
        out.push(
            headers
                .iter()
                .zip(row.iter())
                .map(|(h, cell)| (h, Value::from(cell)))
                .collect::<Record>(),
        );
    }
    log::info!("loaded {} records from {}", out.len(), path.display());
    Ok(out)
}

/// Save a series as a JSON array of `{ x_key: x, y_key: y }` objects.
pub fn save_series_json<P: AsRef<Path>>(series: &Series, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(series)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save a series as CSV with an `x_key,y_key` header.
pub fn save_series_csv<P: AsRef<Path>>(series: &Series, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record([
        formula_safe(&series.x_key).as_ref(),
        formula_safe(&series.y_key).as_ref(),
    ])?;
    for p in &series.points {
        wtr.write_record([formula_safe(&p.x).as_ref(), p.y.to_string().as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save several named series as one JSON object `{ chart_id: [points...] }`, in order.
pub fn save_dashboard_json<P: AsRef<Path>>(charts: &[(String, Series)], path: P) -> Result<()> {
    let by_id: IndexMap<&str, &Series> = charts.iter().map(|(id, s)| (id.as_str(), s)).collect();
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(&by_id)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save several named series as long-format CSV: `chart,x,y`.
pub fn save_dashboard_csv<P: AsRef<Path>>(charts: &[(String, Series)], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["chart", "x", "y"])?;
    for (id, series) in charts {
        for p in &series.points {
            wtr.write_record([
                formula_safe(id).as_ref(),
                formula_safe(&p.x).as_ref(),
                p.y.to_string().as_str(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Prefix cells a spreadsheet would read as a formula with a single quote.
fn formula_safe(cell: &str) -> Cow<'_, str> {
    if cell.starts_with(['=', '+', '-', '@']) {
        Cow::Owned(format!("'{cell}"))
    } else {
        Cow::Borrowed(cell)
    }
}
