use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use harvest_dash::filter::FilterValue;
use harvest_dash::format::{format_count, format_decimal};
use harvest_dash::layout::Layout;
use harvest_dash::models::{AggregationType, ChartPatch, ChartType, RangeBound, Record, Value};
use harvest_dash::thai_date::{format_thai_date, parse_date_input};
use harvest_dash::{DashError, Dashboard, Series, columns, render, stats, storage};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "harvest-dash",
    version,
    about = "Filter, aggregate, chart & summarize harvest-collection records"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the columns available for axes and filters.
    Columns(InputArgs),
    /// List filter choices per column.
    Options(InputArgs),
    /// Print total area and a per-status breakdown.
    Summary(SummaryArgs),
    /// Build chart series (and optionally export and render them).
    Chart(ChartArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Records file (.json array of flat objects, or .csv with a header row).
    #[arg(short, long)]
    input: PathBuf,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Number formatting locale (en, th, de, fr, ...).
    #[arg(long, default_value = "en")]
    locale: String,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct ChartArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Layout file (JSON) with charts, filters, and date range.
    #[arg(long)]
    layout: Option<PathBuf>,
    /// Range start: YYYY-MM-DD (Gregorian year only, e.g. 2024-01-02) or DD/MM/YYYY
    /// (Buddhist era, e.g. 02/01/2567).
    #[arg(long)]
    from: Option<String>,
    /// Range end: YYYY-MM-DD (Gregorian year only, e.g. 2024-01-02) or DD/MM/YYYY
    /// (Buddhist era, e.g. 02/01/2567).
    #[arg(long)]
    to: Option<String>,
    /// Keep records whose text value equals VALUE (COLUMN=VALUE, repeatable).
    #[arg(long = "filter")]
    filters: Vec<String>,
    /// Keep records whose numeric value equals NUMBER (COLUMN=NUMBER, repeatable).
    #[arg(long = "filter-number")]
    number_filters: Vec<String>,
    /// X axis of the first chart.
    #[arg(long)]
    x: Option<String>,
    /// Y axis of the first chart.
    #[arg(long)]
    y: Option<String>,
    /// Chart type of the first chart (line, bar, scatter).
    #[arg(long = "type")]
    chart_type: Option<String>,
    /// Aggregation of the first chart (individual, cumulative).
    #[arg(long)]
    aggregation: Option<String>,
    /// Add N extra default charts.
    #[arg(long, default_value_t = 0)]
    add: usize,
    /// Save all series to this file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Render each chart into this directory as <chart id>.<ext>.
    #[arg(long)]
    plot_dir: Option<PathBuf>,
    /// Image extension for rendered charts (svg or png).
    #[arg(long, default_value = "svg")]
    plot_ext: String,
    /// Width of rendered charts.
    #[arg(long, default_value_t = render::DEFAULT_WIDTH)]
    width: u32,
    /// Height of rendered charts.
    #[arg(long, default_value_t = render::DEFAULT_HEIGHT)]
    height: u32,
}

fn split_assignment(s: &str) -> Result<(&str, &str), DashError> {
    s.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| DashError::InvalidFilter(format!("'{}', expected COLUMN=VALUE", s)))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Columns(args) => cmd_columns(args),
        Command::Options(args) => cmd_options(args),
        Command::Summary(args) => cmd_summary(args),
        Command::Chart(args) => cmd_chart(args),
    }
}

fn load(args: &InputArgs) -> Result<Vec<Record>> {
    storage::load_records(&args.input)
        .with_context(|| format!("load records from {}", args.input.display()))
}

fn cmd_columns(args: InputArgs) -> Result<()> {
    let records = load(&args)?;
    for c in columns::discover_columns(&records) {
        println!("{}\t{}", c.key, c.label);
    }
    Ok(())
}

fn cmd_options(args: InputArgs) -> Result<()> {
    let records = load(&args)?;
    let cols = columns::discover_columns(&records);
    for (column, values) in columns::filter_options(&records, &cols) {
        let shown: Vec<String> = values
            .iter()
            .map(|v| match v {
                FilterValue::All => "all".to_string(),
                FilterValue::Equals(v) => v.to_string(),
            })
            .collect();
        println!("{}: {}", column, shown.join(" | "));
    }
    Ok(())
}

fn cmd_summary(args: SummaryArgs) -> Result<()> {
    let records = load(&args.input)?;
    let summary = stats::summarize(&records);
    println!(
        "records={}  total_area={}",
        format_count(summary.records, &args.locale),
        format_decimal(summary.total_area, 1, &args.locale)
    );
    for s in &summary.by_status {
        println!(
            "{}  count={}  area={}",
            s.status,
            format_count(s.count, &args.locale),
            format_decimal(s.area, 1, &args.locale)
        );
    }
    Ok(())
}

fn cmd_chart(args: ChartArgs) -> Result<()> {
    let records = load(&args.input)?;
    let mut dash = Dashboard::initialize(records);

    if let Some(path) = args.layout.as_ref() {
        Layout::load(path)?.apply(&mut dash);
    }
    if let Some(s) = args.from.as_deref() {
        dash.update_date_range_filter(RangeBound::Start, parse_date_input(s)?);
    }
    if let Some(s) = args.to.as_deref() {
        dash.update_date_range_filter(RangeBound::End, parse_date_input(s)?);
    }
    for f in &args.filters {
        let (column, value) = split_assignment(f)?;
        dash.update_filter(column, FilterValue::Equals(Value::from(value)));
    }
    for f in &args.number_filters {
        let (column, value) = split_assignment(f)?;
        let n: f64 = value
            .parse()
            .with_context(|| format!("invalid number in filter '{}'", f))?;
        dash.update_filter(column, FilterValue::Equals(Value::Number(n)));
    }

    let patch = ChartPatch {
        x_axis: args.x.clone(),
        y_axis: args.y.clone(),
        chart_type: args
            .chart_type
            .as_deref()
            .map(str::parse::<ChartType>)
            .transpose()?,
        title: None,
        aggregation_type: args
            .aggregation
            .as_deref()
            .map(str::parse::<AggregationType>)
            .transpose()?,
    };
    if patch != ChartPatch::default() {
        match dash.charts().first().map(|c| c.id.clone()) {
            Some(first) => dash.update_chart(&first, &patch),
            None => log::warn!(
                "no chart to apply --x/--y/--type/--aggregation to: the input has no selectable columns"
            ),
        }
    }
    for _ in 0..args.add {
        dash.add_chart();
    }

    let range = dash.filters().date_range;
    eprintln!(
        "{} of {} records between {} and {}",
        dash.filtered().len(),
        dash.records().len(),
        format_thai_date(range.start),
        format_thai_date(range.end)
    );

    let mut exported: Vec<(String, Series)> = Vec::new();
    for (chart, series) in dash.series_for_all() {
        let series = series?;
        println!(
            "[{}] {} ({} × {}, {:?})",
            chart.id, chart.title, chart.x_axis, chart.y_axis, chart.chart_type
        );
        for p in &series.points {
            println!("  {}\t{}", p.x, p.y);
        }
        if let Some(dir) = args.plot_dir.as_ref() {
            if series.is_empty() {
                log::warn!("chart {} has no data; not rendered", chart.id);
            } else {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("create {}", dir.display()))?;
                let path = dir.join(format!("{}.{}", chart.id, args.plot_ext));
                render::render_chart(&series, chart, &path, args.width, args.height)?;
                eprintln!("Wrote plot to {}", path.display());
            }
        }
        exported.push((chart.id.clone(), series));
    }

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("json"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "json" => storage::save_dashboard_json(&exported, path)?,
            "csv" => storage::save_dashboard_csv(&exported, path)?,
            other => bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} series to {}", exported.len(), path.display());
    }

    Ok(())
}
