//! Render one chart's series to **SVG** or **PNG** with plotters.
//!
//! - Geometry comes from the chart registry: line, bars from zero, or markers
//! - X axis is categorical: point `i` sits at `x = i` and is labelled with its x value
//! - First palette colour, chart title as caption
//!
//! Text goes through plotters' `ab_glyph` path, which does not discover OS fonts. A
//! TrueType font is located once per process (`HARVEST_DASH_FONT`, then the user font
//! directory, then common system font directories) and registered as "sans-serif".

use crate::aggregate::Series;
use crate::format::format_decimal;
use crate::models::ChartSpec;
use crate::registry::{Geometry, palette_color};
use anyhow::{Result, anyhow};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_WIDTH: u32 = 1000;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Environment variable naming a `.ttf` file to use for chart text.
pub const FONT_ENV: &str = "HARVEST_DASH_FONT";

const SYSTEM_FONT_DIRS: [&str; 5] = [
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

const PREFERRED_FONTS: [&str; 5] = [
    "DejaVuSans.ttf",
    "LiberationSans-Regular.ttf",
    "NotoSans-Regular.ttf",
    "Arial.ttf",
    "arial.ttf",
];

static FONT: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Register a "sans-serif" font on first use; returns the font file in use.
pub fn ensure_font_registered() -> Result<&'static Path> {
    FONT.get_or_init(register_first_font)
        .as_deref()
        .ok_or_else(|| {
            anyhow!("no TrueType font found for chart text; point {FONT_ENV} at a .ttf file")
        })
}

fn register_first_font() -> Option<PathBuf> {
    for path in font_candidates() {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        // plotters keeps registered fonts for the life of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        if plotters::style::register_font("sans-serif", plotters::style::FontStyle::Normal, bytes)
            .is_ok()
        {
            log::info!("chart font: {}", path.display());
            return Some(path);
        }
        log::warn!("skipping unusable font {}", path.display());
    }
    None
}

fn font_candidates() -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Some(p) = std::env::var_os(FONT_ENV) {
        out.push(PathBuf::from(p));
    }
    let mut roots: Vec<PathBuf> = dirs::font_dir().into_iter().collect();
    roots.extend(SYSTEM_FONT_DIRS.iter().map(PathBuf::from));

    let mut found = Vec::new();
    for root in &roots {
        collect_ttf(root, 0, &mut found);
    }
    let rank = |p: &PathBuf| {
        let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
        PREFERRED_FONTS
            .iter()
            .position(|f| *f == name)
            .unwrap_or(PREFERRED_FONTS.len())
    };
    found.sort_by_key(rank);
    out.extend(found);
    out
}

fn collect_ttf(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > 4 {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_ttf(&path, depth + 1, out);
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ttf"))
        {
            out.push(path);
        }
    }
}

/// Render `series` for `chart` to `out_path`; `.svg` selects the SVG backend, anything
/// else the bitmap backend.
pub fn render_chart<P: AsRef<Path>>(
    series: &Series,
    chart: &ChartSpec,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    if series.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    ensure_font_registered()?;
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, series, chart)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, series, chart)?;
    }
    log::info!("chart {} written to {}", chart.id, out_path.display());
    Ok(())
}

fn draw_chart<DB>(root: DrawingArea<DB, Shift>, series: &Series, chart: &ChartSpec) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let geometry = chart.chart_type.info().geometry;
    let (mut y_min, mut y_max) = (
        series.points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min),
        series.points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max),
    );
    if geometry == Geometry::DiscreteBar {
        y_min = y_min.min(0.0);
        y_max = y_max.max(0.0);
    }
    if (y_max - y_min).abs() < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let headroom = (y_max - y_min) * 0.05;
    y_max += headroom;
    if geometry != Geometry::DiscreteBar || y_min < 0.0 {
        y_min -= headroom;
    }

    let n = series.len();
    let labels: Vec<&str> = series.points.iter().map(|p| p.x.as_str()).collect();
    let x_label_fmt = |x: &f64| {
        let i = x.round();
        if (x - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels
            .get(i as usize)
            .map(|s| s.to_string())
            .unwrap_or_default()
    };
    let y_label_fmt = |v: &f64| {
        let decimals = if v.abs() >= 100.0 { 0 } else { 2 };
        format_decimal(*v, decimals, "en")
    };

    let mut cc = ChartBuilder::on(&root)
        .margin(16)
        .caption(chart.title.as_str(), (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, 80)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    cc.configure_mesh()
        .disable_x_mesh()
        .x_desc(chart.x_axis.as_str())
        .y_desc(chart.y_axis.as_str())
        .x_labels(n.min(12))
        .y_labels(10)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let (r, g, b) = palette_color(0);
    let color = RGBColor(r, g, b);
    let xy: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.y))
        .collect();

    match geometry {
        Geometry::ConnectedLine => {
            cc.draw_series(LineSeries::new(xy.clone(), color.stroke_width(2)))
                .map_err(|e| anyhow!("{:?}", e))?
                .label(series.y_key.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            cc.draw_series(xy.iter().map(|&(x, y)| Circle::new((x, y), 3, color.filled())))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
        Geometry::DiscreteBar => {
            let base = 0f64.clamp(y_min, y_max);
            cc.draw_series(xy.iter().map(|&(x, y)| {
                Rectangle::new([(x - 0.35, base), (x + 0.35, y)], color.filled())
            }))
            .map_err(|e| anyhow!("{:?}", e))?
            .label(series.y_key.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
        }
        Geometry::PointCloud => {
            cc.draw_series(xy.iter().map(|&(x, y)| Circle::new((x, y), 4, color.filled())))
                .map_err(|e| anyhow!("{:?}", e))?
                .label(series.y_key.as_str())
                .legend(move |(x, y)| Circle::new((x + 6, y), 4, color.filled()));
        }
    }

    cc.configure_series_labels()
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.85))
        .label_font((FontFamily::SansSerif, 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
