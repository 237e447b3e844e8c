use std::f64::consts::{FRAC_PI_2, TAU};

use crime_eda_analytics_models::LabelCount;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::{Area, ChartError, FONT, truncate_label};

/// Arc segments used for a full circle.
const ARC_RESOLUTION: f64 = 180.0;

fn polar(center: (f64, f64), radius: f64, angle: f64) -> (i32, i32) {
    #[allow(clippy::cast_possible_truncation)]
    (
        (radius.mul_add(angle.cos(), center.0)).round() as i32,
        (radius.mul_add(angle.sin(), center.1)).round() as i32,
    )
}

/// Draws `slices` clockwise from twelve o'clock, each labelled with its
/// share of the total to two decimals.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub(crate) fn draw_pie(root: &Area<'_>, slices: &[LabelCount]) -> Result<(), ChartError> {
    let total: u64 = slices.iter().map(|s| s.count).sum();
    if total == 0 {
        return Ok(());
    }

    let (width, height) = root.dim_in_pixel();
    let center = (f64::from(width) / 2.0, f64::from(height) / 2.0);
    let radius = f64::from(width.min(height)) * 0.36;
    let share_style = TextStyle::from((FONT, 13).into_font())
        .color(&WHITE)
        .pos(Pos::new(HPos::Center, VPos::Center));

    let mut start = -FRAC_PI_2;
    for (i, slice) in slices.iter().enumerate() {
        let share = slice.count as f64 / total as f64;
        let sweep = share * TAU;
        let steps = (share * ARC_RESOLUTION).ceil().max(2.0) as usize;

        let mut points = Vec::with_capacity(steps + 2);
        points.push(polar(center, 0.0, 0.0));
        points.extend((0..=steps).map(|step| {
            let angle = sweep.mul_add(step as f64 / steps as f64, start);
            polar(center, radius, angle)
        }));
        root.draw(&Polygon::new(points, Palette99::pick(i).filled()))?;

        let mid = sweep.mul_add(0.5, start);
        root.draw(&Text::new(
            format!("{:.2}%", share * 100.0),
            polar(center, radius * 0.65, mid),
            share_style.clone(),
        ))?;

        let side = if mid.cos() >= 0.0 {
            HPos::Left
        } else {
            HPos::Right
        };
        root.draw(&Text::new(
            truncate_label(&slice.label, 28),
            polar(center, radius * 1.08, mid),
            TextStyle::from((FONT, 14).into_font()).pos(Pos::new(side, VPos::Center)),
        ))?;

        start += sweep;
    }

    Ok(())
}
