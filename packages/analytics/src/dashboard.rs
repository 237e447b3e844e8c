//! Assembles the full dashboard view model for one selection.

use crime_eda_analytics_models::{
    Bar, BarOrientation, DASHBOARD_FOOTER, DASHBOARD_TITLE, Dashboard, FilterSelection, Panel,
    PanelData, PanelKind,
};
use crime_eda_incident_models::{IncidentTable, IncidentView};

use crate::{aggregate, filter};

fn bars(
    entries: impl IntoIterator<Item = impl Into<Bar>>,
    orientation: BarOrientation,
    category_desc: &str,
    value_desc: &str,
) -> PanelData {
    PanelData::Bars {
        bars: entries.into_iter().map(Into::into).collect(),
        orientation,
        category_desc: category_desc.to_string(),
        value_desc: value_desc.to_string(),
    }
}

fn panel_data(kind: PanelKind, base: &IncidentView<'_>, view: &IncidentView<'_>) -> PanelData {
    match kind {
        PanelKind::CategoryDistribution => PanelData::Pie {
            slices: aggregate::category_distribution(base),
        },
        PanelKind::AgeDistribution => PanelData::Histogram {
            histogram: aggregate::age_histogram(view),
            x_desc: "Victim_Age".to_string(),
        },
        PanelKind::MonthlyTrend => PanelData::Line {
            points: aggregate::monthly_trend(view),
            x_desc: "Month_Occurred".to_string(),
            y_desc: "Crimes".to_string(),
        },
        PanelKind::TopWeapons => bars(
            aggregate::top_weapons(view),
            BarOrientation::Horizontal,
            "Weapon_Description",
            "count",
        ),
        PanelKind::SexDistribution => bars(
            aggregate::sex_distribution(view),
            BarOrientation::Vertical,
            "Victim_Sex",
            "count",
        ),
        PanelKind::AgeGroupDistribution => bars(
            aggregate::age_group_distribution(view),
            BarOrientation::Vertical,
            "Age Group",
            "Number of Reportings",
        ),
        PanelKind::DescentDistribution => bars(
            aggregate::descent_distribution(view),
            BarOrientation::Horizontal,
            "Victim_Descent",
            "count",
        ),
        PanelKind::StatusDistribution => bars(
            aggregate::status_distribution(view),
            BarOrientation::Vertical,
            "Status_Description",
            "count",
        ),
        PanelKind::CategoryMonthlyAverage => bars(
            aggregate::category_monthly_average(view),
            BarOrientation::Vertical,
            "Crime_Category",
            "Average Reportings per Month",
        ),
        PanelKind::TimeSegmentDistribution => bars(
            aggregate::time_segment_distribution(view),
            BarOrientation::Vertical,
            "Time_Segment",
            "count",
        ),
        PanelKind::WeaponMonthlyAverage => bars(
            aggregate::weapon_monthly_average(view),
            BarOrientation::Vertical,
            "Weapon_Description",
            "Average Monthly Reportings",
        ),
    }
}

/// Filters `table` by `selection` and computes every panel.
///
/// The crime category panel summarizes the whole table; every other panel
/// summarizes the filtered rows.
#[must_use]
pub fn build_dashboard(table: &IncidentTable, selection: &FilterSelection) -> Dashboard {
    let base = table.view();
    let view = filter::apply_selection(&base, selection);

    log::debug!(
        "Selection matched {} of {} incidents",
        view.len(),
        base.len()
    );

    let panels = PanelKind::all()
        .iter()
        .map(|&kind| Panel::new(kind, panel_data(kind, &base, &view)))
        .collect();

    Dashboard {
        title: DASHBOARD_TITLE.to_string(),
        options: filter::filter_options(table),
        selection: selection.clone(),
        total_rows: base.len() as u64,
        filtered_rows: view.len() as u64,
        panels,
        footer: DASHBOARD_FOOTER.to_string(),
    }
}

/// [`build_dashboard`] with every option selected over the full date span.
#[must_use]
pub fn default_dashboard(table: &IncidentTable) -> Dashboard {
    let selection = FilterSelection::all(&filter::filter_options(table));
    build_dashboard(table, &selection)
}
