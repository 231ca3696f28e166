//! Page rendering: every page becomes one standalone SVG image.

use chrono::NaiveDateTime;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use report_core::error::{ReportError, Result};
use report_core::formatting::{format_axis_value, format_tick_label};

use crate::axis::{tick_positions, time_axis, MAX_TICKS};
use crate::document::{ChartPage, Page, Subplot, TitlePage, SUPTITLE_FONT_SIZE};

/// Page width in CSS pixels (18 cm at 96 dpi).
pub const PAGE_WIDTH_PX: u32 = 680;
/// Page height in CSS pixels (27 cm at 96 dpi).
pub const PAGE_HEIGHT_PX: u32 = 1020;

const FONT_FAMILY: &str = "sans-serif";
const TICK_FONT_PX: f64 = 12.0;
const AXIS_DESC_FONT_PX: f64 = 14.0;
const BOTTOM_LABEL_AREA_PX: u32 = 96;
const INNER_LABEL_AREA_PX: u32 = 8;
const Y_LABEL_AREA_PX: u32 = 80;
const LEGEND_SWATCH_PX: i32 = 20;

/// Convert a size in points to CSS pixels.
pub fn pt_to_px(points: f64) -> f64 {
    points * 96.0 / 72.0
}

/// Render `page` to an SVG document.
pub fn render_page(page: &Page) -> Result<String> {
    match page {
        Page::Title(title) => render_title_page(title),
        Page::Chart(chart) => render_chart_page(chart),
    }
}

fn render_error<E: std::fmt::Display>(err: E) -> ReportError {
    ReportError::Render(err.to_string())
}

// ── Title pages ───────────────────────────────────────────────────────────────

fn render_title_page(page: &TitlePage) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (PAGE_WIDTH_PX, PAGE_HEIGHT_PX))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let style = TextStyle::from((FONT_FAMILY, pt_to_px(page.font_size)).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        let centre = ((PAGE_WIDTH_PX / 2) as i32, (PAGE_HEIGHT_PX / 2) as i32);
        root.draw(&Text::new(page.text.as_str(), centre, style))
            .map_err(render_error)?;
        root.present().map_err(render_error)?;
    }
    Ok(svg)
}

// ── Chart pages ───────────────────────────────────────────────────────────────

/// Tick label drawn at 45° after plotters has finished with the page.
#[derive(Debug, Clone, PartialEq)]
struct RotatedLabel {
    x: i32,
    y: i32,
    text: String,
}

fn render_chart_page(page: &ChartPage) -> Result<String> {
    let (start, end) = page
        .time_range()
        .ok_or_else(|| ReportError::Render(format!("chart page {:?} has no data", page.title)))?;
    let axis = time_axis(start, end);

    let mut svg = String::new();
    let mut labels = Vec::new();
    {
        let root = SVGBackend::with_string(&mut svg, (PAGE_WIDTH_PX, PAGE_HEIGHT_PX))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;
        let body = root
            .titled(&page.title, (FONT_FAMILY, pt_to_px(SUPTITLE_FONT_SIZE)))
            .map_err(render_error)?;

        let areas = body.split_evenly((page.subplots.len().max(1), 1));
        let bottom = page.subplots.len().saturating_sub(1);
        for (index, (area, subplot)) in areas.iter().zip(&page.subplots).enumerate() {
            let caption = if index == bottom {
                Some(page.x_label.as_deref())
            } else {
                None
            };
            labels.extend(draw_subplot(area, &axis, subplot, caption)?);
        }
        root.present().map_err(render_error)?;
    }
    Ok(inject_rotated_labels(svg, &labels))
}

/// Draw one subplot. `bottom` is `Some(x caption)` for the lowest subplot,
/// which is the only one that gets tick labels.
fn draw_subplot(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    axis: &RangedDateTime<NaiveDateTime>,
    subplot: &Subplot,
    bottom: Option<Option<&str>>,
) -> Result<Vec<RotatedLabel>> {
    let (y_lo, y_hi) = padded_value_range(subplot.value_range());
    let x_area = if bottom.is_some() {
        BOTTOM_LABEL_AREA_PX
    } else {
        INNER_LABEL_AREA_PX
    };

    let mut chart = ChartBuilder::on(area)
        .margin(8)
        .x_label_area_size(x_area)
        .y_label_area_size(Y_LABEL_AREA_PX)
        .build_cartesian_2d(axis.clone(), y_lo..y_hi)
        .map_err(render_error)?;

    let span = y_hi - y_lo;
    let blank = |_: &NaiveDateTime| String::new();
    let y_format = |v: &f64| format_axis_value(*v, span);
    let mut mesh = chart.configure_mesh();
    mesh.x_labels(MAX_TICKS)
        .x_label_formatter(&blank)
        .y_label_formatter(&y_format)
        .y_labels(8)
        .y_desc(subplot.label.as_str())
        .label_style((FONT_FAMILY, TICK_FONT_PX))
        .axis_desc_style((FONT_FAMILY, AXIS_DESC_FONT_PX));
    if let Some(Some(caption)) = bottom {
        mesh.x_desc(caption);
    }
    mesh.draw().map_err(render_error)?;

    let line_color = subplot.color;
    chart
        .draw_series(LineSeries::new(
            subplot.points.iter().copied(),
            line_color.stroke_width(1),
        ))
        .map_err(render_error)?
        .label(subplot.label.as_str())
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + LEGEND_SWATCH_PX, y)], line_color.stroke_width(2))
        });

    if let Some(average) = &subplot.average {
        let avg_color = average.color;
        chart
            .draw_series(DashedLineSeries::new(
                average.points.iter().copied(),
                8,
                5,
                avg_color.stroke_width(2),
            ))
            .map_err(render_error)?
            .label(average.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + LEGEND_SWATCH_PX, y)], avg_color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font((FONT_FAMILY, TICK_FONT_PX))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(render_error)?;

    if bottom.is_none() {
        return Ok(Vec::new());
    }
    Ok(tick_positions(axis)
        .into_iter()
        .map(|tick| {
            let (x, y) = chart.backend_coord(&(tick, y_lo));
            rotated_label(x, y, tick)
        })
        .collect())
}

fn rotated_label(x: i32, y: i32, tick: NaiveDateTime) -> RotatedLabel {
    RotatedLabel {
        x,
        y: y + 8,
        text: format_tick_label(tick),
    }
}

/// Data range widened by 5% on each side; flat data gets a unit margin.
fn padded_value_range(range: Option<(f64, f64)>) -> (f64, f64) {
    match range {
        None => (-1.0, 1.0),
        Some((lo, hi)) if hi - lo > f64::EPSILON * lo.abs().max(1.0) => {
            let pad = (hi - lo) * 0.05;
            (lo - pad, hi + pad)
        }
        Some((lo, _)) => (lo - 1.0, lo + 1.0),
    }
}

fn inject_rotated_labels(mut svg: String, labels: &[RotatedLabel]) -> String {
    if labels.is_empty() {
        return svg;
    }
    let mut group = String::from("<g class=\"x-ticks\">\n");
    for label in labels {
        group.push_str(&format!(
            r#"<text x="{x}" y="{y}" transform="rotate(-45 {x} {y})" text-anchor="end" dominant-baseline="hanging" font-family="{FONT_FAMILY}" font-size="{TICK_FONT_PX}">{text}</text>"#,
            x = label.x,
            y = label.y,
            text = escape_xml(&label.text),
        ));
        group.push('\n');
    }
    group.push_str("</g>\n");

    match svg.rfind("</svg>") {
        Some(pos) => svg.insert_str(pos, &group),
        None => svg.push_str(&group),
    }
    svg
}

/// Escape the five XML special characters.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
