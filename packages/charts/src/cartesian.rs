//! Charts drawn on a two dimensional cartesian grid.
//!
//! Categorical axes place category `i` at coordinate `i` on a
//! `-0.5..n - 0.5` range and map tick positions back to labels.

use crime_eda_analytics_models::{AgeHistogram, Bar, BarOrientation, PeriodCount};
use plotters::prelude::*;

use crate::{Area, ChartError, FONT, truncate_label};

const MARGIN: u32 = 20;
const LABEL_CHARS: usize = 24;
/// Categorical axes with more labels than this draw them rotated.
const ROTATE_AFTER: usize = 8;
/// Upper bound on the number of tick labels along a categorical axis.
const MAX_TICKS: usize = 24;

#[allow(clippy::cast_precision_loss)]
fn position(index: usize) -> f64 {
    index as f64
}

fn category_range(len: usize) -> std::ops::Range<f64> {
    -0.5..position(len) - 0.5
}

/// Headroom above the tallest value so bars and markers do not touch the
/// frame.
fn value_range(max: f64) -> std::ops::Range<f64> {
    if max > 0.0 { 0.0..max * 1.1 } else { 0.0..1.0 }
}

/// Tick label for a categorical axis. Non-integral ticks get no label.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn category_label(labels: &[&str], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels
        .get(rounded as usize)
        .map(|label| truncate_label(label, LABEL_CHARS))
        .unwrap_or_default()
}

fn axis_style(label_count: usize) -> TextStyle<'static> {
    let font = (FONT, 12).into_font();
    if label_count > ROTATE_AFTER {
        TextStyle::from(font.transform(FontTransform::Rotate90))
    } else {
        TextStyle::from(font)
    }
}

/// Draws count bars over the age bins with the density curve on top.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn draw_histogram(
    root: &Area<'_>,
    histogram: &AgeHistogram,
    x_desc: &str,
) -> Result<(), ChartError> {
    let (Some(first), Some(last)) = (histogram.bins.first(), histogram.bins.last()) else {
        return Ok(());
    };

    let tallest = histogram
        .bins
        .iter()
        .map(|bin| bin.count as f64)
        .chain(histogram.density.iter().map(|point| point.value))
        .fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(root)
        .margin(MARGIN)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(first.lower..last.upper, value_range(tallest))?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Count")
        .label_style((FONT, 12))
        .draw()?;

    chart.draw_series(histogram.bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.lower, 0.0), (bin.upper, bin.count as f64)],
            BLUE.mix(0.5).filled(),
        )
    }))?;

    if !histogram.density.is_empty() {
        chart.draw_series(LineSeries::new(
            histogram.density.iter().map(|point| (point.age, point.value)),
            BLUE.stroke_width(2),
        ))?;
    }

    Ok(())
}

/// Draws one marker per period joined by a line, in period order.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn draw_line(
    root: &Area<'_>,
    points: &[PeriodCount],
    x_desc: &str,
    y_desc: &str,
) -> Result<(), ChartError> {
    let labels: Vec<&str> = points.iter().map(|p| p.period.as_str()).collect();
    let tallest = points.iter().map(|p| p.count as f64).fold(0.0, f64::max);
    let formatter = |value: &f64| category_label(&labels, *value);

    let mut chart = ChartBuilder::on(root)
        .margin(MARGIN)
        .x_label_area_size(70)
        .y_label_area_size(60)
        .build_cartesian_2d(category_range(points.len()), value_range(tallest))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(points.len().min(MAX_TICKS))
        .x_label_formatter(&formatter)
        .x_label_style(axis_style(points.len().min(MAX_TICKS)))
        .y_label_style((FONT, 12))
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;

    let coords = || {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| (position(i), p.count as f64))
    };
    chart.draw_series(LineSeries::new(coords(), BLUE.stroke_width(2)))?;
    chart.draw_series(coords().map(|coord| Circle::new(coord, 3, BLUE.filled())))?;

    Ok(())
}

/// Draws one bar per entry. Horizontal charts list the first entry at the
/// top so descending rankings read top-down.
pub(crate) fn draw_bars(
    root: &Area<'_>,
    bars: &[Bar],
    orientation: BarOrientation,
    category_desc: &str,
    value_desc: &str,
) -> Result<(), ChartError> {
    let tallest = bars.iter().map(|bar| bar.value).fold(0.0, f64::max);

    match orientation {
        BarOrientation::Vertical => {
            let labels: Vec<&str> = bars.iter().map(|bar| bar.label.as_str()).collect();
            let formatter = |value: &f64| category_label(&labels, *value);
            let ticks = bars.len().min(MAX_TICKS);

            let mut chart = ChartBuilder::on(root)
                .margin(MARGIN)
                .x_label_area_size(if ticks > ROTATE_AFTER { 150 } else { 50 })
                .y_label_area_size(60)
                .build_cartesian_2d(category_range(bars.len()), value_range(tallest))?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(ticks)
                .x_label_formatter(&formatter)
                .x_label_style(axis_style(ticks))
                .y_label_style((FONT, 12))
                .x_desc(category_desc)
                .y_desc(value_desc)
                .draw()?;

            chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
                let x = position(i);
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, bar.value)], BLUE.mix(0.7).filled())
            }))?;
        }
        BarOrientation::Horizontal => {
            let labels: Vec<&str> = bars.iter().rev().map(|bar| bar.label.as_str()).collect();
            let formatter = |value: &f64| category_label(&labels, *value);
            let ticks = bars.len().min(MAX_TICKS);

            let mut chart = ChartBuilder::on(root)
                .margin(MARGIN)
                .x_label_area_size(50)
                .y_label_area_size(190)
                .build_cartesian_2d(value_range(tallest), category_range(bars.len()))?;

            chart
                .configure_mesh()
                .disable_y_mesh()
                .y_labels(ticks)
                .y_label_formatter(&formatter)
                .label_style((FONT, 12))
                .x_desc(value_desc)
                .y_desc(category_desc)
                .draw()?;

            let last = bars.len().saturating_sub(1);
            chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
                let y = position(last - i);
                Rectangle::new([(0.0, y - 0.4), (bar.value, y + 0.4)], BLUE.mix(0.7).filled())
            }))?;
        }
    }

    Ok(())
}
