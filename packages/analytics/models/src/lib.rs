#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter, aggregation and dashboard view-model types.
//!
//! These are the values that flow from the analytics engine to the chart
//! renderer and the HTTP layer. They serialize to JSON for the
//! `/api/dashboard` endpoint.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Page title.
pub const DASHBOARD_TITLE: &str = "Crime Data EDA Dashboard";

/// Credit line rendered below the panels.
pub const DASHBOARD_FOOTER: &str = "Made by Oorja Gund";

/// Row count for a single label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCount {
    /// Category label.
    pub label: String,
    /// Number of incidents.
    pub count: u64,
}

/// Mean value for a single label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelAverage {
    /// Category label.
    pub label: String,
    /// Average incidents per month.
    pub average: f64,
}

/// A time-series data point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodCount {
    /// Period label (e.g. "2023-01").
    pub period: String,
    /// Incident count in this period.
    pub count: u64,
}

/// One equal-width histogram bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    /// Inclusive lower edge.
    pub lower: f64,
    /// Upper edge (exclusive, except for the last bin).
    pub upper: f64,
    /// Number of values in the bin.
    pub count: u64,
}

/// A point on the smoothed density curve, scaled to histogram counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityPoint {
    /// Age at which the density was evaluated.
    pub age: f64,
    /// Estimated count density.
    pub value: f64,
}

/// Victim age histogram with a kernel density overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeHistogram {
    /// Bins in ascending order. Empty when there are no rows.
    pub bins: Vec<HistogramBin>,
    /// Density curve. Empty when it cannot be estimated.
    pub density: Vec<DensityPoint>,
}

impl AgeHistogram {
    /// Whether there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.iter().all(|bin| bin.count == 0)
    }
}

/// Values a user can pick from in the sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Distinct crime categories, sorted.
    pub categories: Vec<String>,
    /// Distinct weapon descriptions, sorted.
    pub weapons: Vec<String>,
    /// Distinct victim sex codes, sorted.
    pub sexes: Vec<String>,
    /// Earliest occurrence timestamp.
    pub min_date: Option<NaiveDateTime>,
    /// Latest occurrence timestamp.
    pub max_date: Option<NaiveDateTime>,
}

/// The user's current filter choices.
///
/// An empty value list selects nothing. A `None` date bound is open-ended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// Selected crime categories.
    pub categories: Vec<String>,
    /// Selected weapon descriptions.
    pub weapons: Vec<String>,
    /// Selected victim sex codes.
    pub sexes: Vec<String>,
    /// Inclusive lower bound on the occurrence timestamp.
    pub date_from: Option<NaiveDateTime>,
    /// Inclusive upper bound on the occurrence timestamp.
    pub date_to: Option<NaiveDateTime>,
}

impl FilterSelection {
    /// Selects every option over the full date span.
    #[must_use]
    pub fn all(options: &FilterOptions) -> Self {
        Self {
            categories: options.categories.clone(),
            weapons: options.weapons.clone(),
            sexes: options.sexes.clone(),
            date_from: options.min_date,
            date_to: options.max_date,
        }
    }
}

/// The eleven dashboard panels, in display order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PanelKind {
    /// Pie of incidents per crime category (unfiltered).
    CategoryDistribution,
    /// Victim age histogram.
    AgeDistribution,
    /// Incidents per month.
    MonthlyTrend,
    /// Ten most frequent weapons.
    TopWeapons,
    /// Incidents per victim sex.
    SexDistribution,
    /// Incidents per age group.
    AgeGroupDistribution,
    /// Incidents per victim descent.
    DescentDistribution,
    /// Incidents per case status.
    StatusDistribution,
    /// Average monthly incidents per crime category.
    CategoryMonthlyAverage,
    /// Incidents per time segment.
    TimeSegmentDistribution,
    /// Average monthly incidents per weapon, top ten.
    WeaponMonthlyAverage,
}

impl PanelKind {
    /// Returns all panels in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::CategoryDistribution,
            Self::AgeDistribution,
            Self::MonthlyTrend,
            Self::TopWeapons,
            Self::SexDistribution,
            Self::AgeGroupDistribution,
            Self::DescentDistribution,
            Self::StatusDistribution,
            Self::CategoryMonthlyAverage,
            Self::TimeSegmentDistribution,
            Self::WeaponMonthlyAverage,
        ]
    }

    /// The panel's subheading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::CategoryDistribution => "Crime Category Distribution",
            Self::AgeDistribution => "Victim Age Distribution",
            Self::MonthlyTrend => "Monthly Crime Trend",
            Self::TopWeapons => "Top 10 Weapons Used",
            Self::SexDistribution => "Victim Sex Distribution",
            Self::AgeGroupDistribution => "Age Group vs No. of Reportings",
            Self::DescentDistribution => "Victim Descent vs No. of Reportings",
            Self::StatusDistribution => "Status Description vs No. of Reportings",
            Self::CategoryMonthlyAverage => "Crime Category vs Average Monthly Reportings",
            Self::TimeSegmentDistribution => "Time Segments vs No. of Reportings",
            Self::WeaponMonthlyAverage => "Weapon Used vs Average Monthly Reportings",
        }
    }
}

/// Direction bars grow in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarOrientation {
    /// Categories along the x axis, values grow upwards.
    Vertical,
    /// Categories along the y axis, values grow rightwards.
    Horizontal,
}

/// One bar of a bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    /// Category label.
    pub label: String,
    /// Bar length.
    pub value: f64,
}

impl From<LabelCount> for Bar {
    #[allow(clippy::cast_precision_loss)]
    fn from(c: LabelCount) -> Self {
        Self {
            label: c.label,
            value: c.count as f64,
        }
    }
}

impl From<LabelAverage> for Bar {
    fn from(a: LabelAverage) -> Self {
        Self {
            label: a.label,
            value: a.average,
        }
    }
}

/// What a panel draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chart", rename_all = "snake_case")]
pub enum PanelData {
    /// Pie chart with percentage labels.
    Pie {
        /// Slices in drawing order.
        slices: Vec<LabelCount>,
    },
    /// Histogram with a density overlay.
    Histogram {
        /// Histogram data.
        histogram: AgeHistogram,
        /// Value axis description.
        x_desc: String,
    },
    /// Line chart with point markers.
    Line {
        /// Points in chronological order.
        points: Vec<PeriodCount>,
        /// Period axis description.
        x_desc: String,
        /// Value axis description.
        y_desc: String,
    },
    /// Bar chart.
    Bars {
        /// Bars in drawing order.
        bars: Vec<Bar>,
        /// Direction of the bars.
        orientation: BarOrientation,
        /// Category axis description.
        category_desc: String,
        /// Value axis description.
        value_desc: String,
    },
}

impl PanelData {
    /// Whether there is nothing meaningful to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Pie { slices } => slices.iter().all(|s| s.count == 0),
            Self::Histogram { histogram, .. } => histogram.is_empty(),
            Self::Line { points, .. } => points.is_empty(),
            Self::Bars { bars, .. } => bars.iter().all(|b| b.value <= 0.0),
        }
    }
}

/// A single dashboard panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    /// Which panel this is.
    pub kind: PanelKind,
    /// Subheading shown above the chart.
    pub title: String,
    /// Chart content.
    pub data: PanelData,
}

impl Panel {
    /// Creates a panel titled after its kind.
    #[must_use]
    pub fn new(kind: PanelKind, data: PanelData) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            data,
        }
    }
}

/// Everything the page shell needs to render one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Page title.
    pub title: String,
    /// Sidebar options.
    pub options: FilterOptions,
    /// The selection the panels were computed for.
    pub selection: FilterSelection,
    /// Rows in the loaded table.
    pub total_rows: u64,
    /// Rows matching the selection.
    pub filtered_rows: u64,
    /// Panels in display order.
    pub panels: Vec<Panel>,
    /// Footer credit line.
    pub footer: String,
}
