//! Renders page descriptors to SVG with plotters.
//!
//! This is the only module that touches the drawing backend; sections hand
//! it finished [`Page`] values and the pipeline hands the resulting SVG
//! strings to the document writer.

use chrono::Duration;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use wrapped_core::error::{Result, WrappedError};

use crate::page::{Bar, BarChart, BarOrientation, LineChart, Page, TextPage};

/// Landscape page canvas, 16:9.
pub const PAGE_SIZE: (u32, u32) = (1600, 900);

/// Bar fill used across all bar pages.
const BAR_COLOR: RGBColor = RGBColor(135, 206, 235);

fn render_err<E: std::fmt::Display>(err: E) -> WrappedError {
    WrappedError::Render(err.to_string())
}

/// Render one page descriptor to a standalone SVG document.
pub fn render_page(page: &Page) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, PAGE_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        match page {
            Page::Text(text) => draw_text_page(&root, text)?,
            Page::Bars(bars) => match bars.orientation {
                BarOrientation::Horizontal => draw_horizontal_bars(&root, bars)?,
                BarOrientation::Vertical => draw_vertical_bars(&root, bars)?,
            },
            Page::Lines(lines) => draw_line_chart(&root, lines)?,
        }
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

// ── Text pages ────────────────────────────────────────────────────────────────

fn draw_text_page(root: &DrawingArea<SVGBackend, Shift>, page: &TextPage) -> Result<()> {
    let (width, height) = (PAGE_SIZE.0 as i32, PAGE_SIZE.1 as i32);

    let title_style =
        TextStyle::from(("sans-serif", 56).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
    root.draw(&Text::new(
        page.title.clone(),
        (width / 2, height / 12),
        title_style,
    ))
    .map_err(render_err)?;

    let line_style =
        TextStyle::from(("sans-serif", 30).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
    for (index, line) in page.lines.iter().enumerate() {
        root.draw(&Text::new(
            line.clone(),
            (width / 2, height / 4 + index as i32 * 70),
            line_style.clone(),
        ))
        .map_err(render_err)?;
    }
    Ok(())
}

/// Fallback for chart pages with nothing to plot: caption only.
fn draw_caption_only(root: &DrawingArea<SVGBackend, Shift>, title: &str) -> Result<()> {
    let style =
        TextStyle::from(("sans-serif", 40).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    root.draw(&Text::new(
        title.to_string(),
        (PAGE_SIZE.0 as i32 / 2, PAGE_SIZE.1 as i32 / 2),
        style,
    ))
    .map_err(render_err)
}

// ── Bar pages ─────────────────────────────────────────────────────────────────

fn max_bar_value(bars: &[Bar]) -> f64 {
    bars.iter().map(|b| b.value).fold(0.0, f64::max).max(1e-9)
}

fn draw_horizontal_bars(root: &DrawingArea<SVGBackend, Shift>, page: &BarChart) -> Result<()> {
    if page.bars.is_empty() {
        return draw_caption_only(root, &page.title);
    }
    let max = max_bar_value(&page.bars);
    let count = page.bars.len();

    let mut chart = ChartBuilder::on(root)
        .caption(&page.title, ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(360)
        .build_cartesian_2d(0.0..max * 1.05, (0..count).into_segmented())
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(&page.x_label)
        .y_desc(&page.y_label)
        .y_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(index) | SegmentValue::Exact(index)
                if *index < page.bars.len() =>
            {
                page.bars[*index].label.clone()
            }
            _ => String::new(),
        })
        .label_style(("sans-serif", 18))
        .axis_desc_style(("sans-serif", 24))
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(page.bars.iter().enumerate().map(|(index, bar)| {
            let mut rect = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(index)),
                    (bar.value, SegmentValue::Exact(index + 1)),
                ],
                BAR_COLOR.filled(),
            );
            rect.set_margin(8, 8, 0, 0);
            rect
        }))
        .map_err(render_err)?;

    let label_style =
        TextStyle::from(("sans-serif", 20).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    chart
        .draw_series(page.bars.iter().enumerate().filter_map(|(index, bar)| {
            bar.value_label.as_ref().map(|label| {
                Text::new(
                    label.clone(),
                    (bar.value / 2.0, SegmentValue::CenterOf(index)),
                    label_style.clone(),
                )
            })
        }))
        .map_err(render_err)?;

    Ok(())
}

fn draw_vertical_bars(root: &DrawingArea<SVGBackend, Shift>, page: &BarChart) -> Result<()> {
    if page.bars.is_empty() {
        return draw_caption_only(root, &page.title);
    }
    let max = max_bar_value(&page.bars);
    let count = page.bars.len();

    let mut chart = ChartBuilder::on(root)
        .caption(&page.title, ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(90)
        .y_label_area_size(90)
        .build_cartesian_2d((0..count).into_segmented(), 0.0..max * 1.05)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(&page.x_label)
        .y_desc(&page.y_label)
        .x_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(index) | SegmentValue::Exact(index)
                if *index < page.bars.len() =>
            {
                page.bars[*index].label.clone()
            }
            _ => String::new(),
        })
        .x_labels(count)
        .label_style(("sans-serif", 18))
        .axis_desc_style(("sans-serif", 24))
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(page.bars.iter().enumerate().map(|(index, bar)| {
            let mut rect = Rectangle::new(
                [
                    (SegmentValue::Exact(index), 0.0),
                    (SegmentValue::Exact(index + 1), bar.value),
                ],
                BAR_COLOR.filled(),
            );
            rect.set_margin(0, 0, 6, 6);
            rect
        }))
        .map_err(render_err)?;

    // Centered in-bar labels, rotated like the reference bar charts.
    let label_style = TextStyle::from(
        ("sans-serif", 18)
            .into_font()
            .transform(FontTransform::Rotate270),
    )
    .pos(Pos::new(HPos::Center, VPos::Center));
    chart
        .draw_series(page.bars.iter().enumerate().filter_map(|(index, bar)| {
            bar.value_label.as_ref().map(|label| {
                Text::new(
                    label.clone(),
                    (SegmentValue::CenterOf(index), bar.value / 2.0),
                    label_style.clone(),
                )
            })
        }))
        .map_err(render_err)?;

    Ok(())
}

// ── Line pages ────────────────────────────────────────────────────────────────

fn draw_line_chart(root: &DrawingArea<SVGBackend, Shift>, page: &LineChart) -> Result<()> {
    let all_dates = page.series.iter().flat_map(|s| s.points.iter().map(|(d, _)| *d));
    let Some(min_date) = all_dates.clone().min() else {
        return draw_caption_only(root, &page.title);
    };
    let max_date = all_dates.max().unwrap_or(min_date);
    let span_days = (max_date - min_date).num_days().max(1) as f64;
    let y_max = page
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|(_, v)| *v))
        .fold(0.0, f64::max)
        .max(1e-9);

    let mut chart = ChartBuilder::on(root)
        .caption(&page.title, ("sans-serif", 40))
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(90)
        .build_cartesian_2d(0.0..span_days, 0.0..y_max * 1.05)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(&page.x_label)
        .y_desc(&page.y_label)
        .x_labels(10)
        .x_label_formatter(&|offset| {
            (min_date + Duration::days(offset.round() as i64))
                .format("%Y-%m-%d")
                .to_string()
        })
        .label_style(("sans-serif", 18))
        .axis_desc_style(("sans-serif", 24))
        .draw()
        .map_err(render_err)?;

    for (index, series) in page.series.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();
        let line = chart
            .draw_series(LineSeries::new(
                series
                    .points
                    .iter()
                    .map(|(date, value)| ((*date - min_date).num_days() as f64, *value)),
                color.stroke_width(2),
            ))
            .map_err(render_err)?;
        if page.legend {
            line.label(&series.label).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        }
    }

    if page.legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .label_font(("sans-serif", 20))
            .draw()
            .map_err(render_err)?;
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
