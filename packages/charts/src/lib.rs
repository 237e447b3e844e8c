#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! SVG rendering of dashboard panels.
//!
//! Each [`Panel`] becomes one standalone SVG document drawn with the
//! `plotters` SVG backend. Panels without data render a placeholder
//! message instead of an empty or broken chart.

mod cartesian;
mod pie;

use crime_eda_analytics_models::{Dashboard, Panel, PanelData, PanelKind};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;

/// Chart width in pixels.
pub const CHART_WIDTH: u32 = 800;

/// Chart height in pixels.
pub const CHART_HEIGHT: u32 = 420;

/// Message drawn in place of a chart when the selection matches nothing.
pub const EMPTY_PLACEHOLDER: &str = "No data for the current selection";

const FONT: &str = "sans-serif";

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Errors that can occur while drawing a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    /// The drawing backend rejected an operation.
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        Self::Drawing(e.to_string())
    }
}

/// A panel ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPanel {
    /// Which panel this is.
    pub kind: PanelKind,
    /// Subheading shown above the chart.
    pub title: String,
    /// Standalone SVG document.
    pub svg: String,
}

/// Renders one panel to an SVG document.
///
/// # Errors
///
/// Returns [`ChartError`] if `plotters` fails to lay out or draw the chart.
pub fn render_panel(panel: &Panel) -> Result<String, ChartError> {
    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        if panel.data.is_empty() {
            draw_placeholder(&root)?;
        } else {
            match &panel.data {
                PanelData::Pie { slices } => pie::draw_pie(&root, slices)?,
                PanelData::Histogram { histogram, x_desc } => {
                    cartesian::draw_histogram(&root, histogram, x_desc)?;
                }
                PanelData::Line {
                    points,
                    x_desc,
                    y_desc,
                } => cartesian::draw_line(&root, points, x_desc, y_desc)?,
                PanelData::Bars {
                    bars,
                    orientation,
                    category_desc,
                    value_desc,
                } => cartesian::draw_bars(&root, bars, *orientation, category_desc, value_desc)?,
            }
        }

        root.present()?;
    }

    log::trace!("Rendered panel '{}' ({} bytes)", panel.title, svg.len());
    Ok(svg)
}

/// Renders every panel of `dashboard`, in order.
///
/// # Errors
///
/// Returns the first [`ChartError`] encountered.
pub fn render_dashboard(dashboard: &Dashboard) -> Result<Vec<RenderedPanel>, ChartError> {
    dashboard
        .panels
        .iter()
        .map(|panel| {
            Ok(RenderedPanel {
                kind: panel.kind,
                title: panel.title.clone(),
                svg: render_panel(panel)?,
            })
        })
        .collect()
}

fn draw_placeholder(root: &Area<'_>) -> Result<(), ChartError> {
    let (width, height) = root.dim_in_pixel();
    let grey = BLACK.mix(0.6);
    let style = TextStyle::from((FONT, 20).into_font())
        .color(&grey)
        .pos(Pos::new(HPos::Center, VPos::Center));

    #[allow(clippy::cast_possible_wrap)]
    let center = ((width / 2) as i32, (height / 2) as i32);
    root.draw(&Text::new(EMPTY_PLACEHOLDER, center, style))?;
    Ok(())
}

/// Shortens `label` to at most `max_chars` characters for axis display.
fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut short: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}
