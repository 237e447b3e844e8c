#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident record types shared across the crime EDA dashboard.
//!
//! An [`IncidentTable`] is the normalized, immutable result of loading the
//! incident CSV. Every downstream computation works on an [`IncidentView`],
//! a borrowed subset of the table's records.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Substituted for a missing `Victim_Sex`.
pub const UNKNOWN_SEX: &str = "X";
/// Substituted for a missing `Victim_Descent`.
pub const UNKNOWN_DESCENT: &str = "Unknown";
/// Substituted for a missing `Weapon_Description`.
pub const UNKNOWN_WEAPON: &str = "UNKNOWN";
/// Substituted for a missing `Status_Description`.
pub const UNKNOWN_STATUS: &str = "Unknown";
/// Substituted for a missing `Crime_Category`.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Time-of-day band assigned to an incident.
///
/// The band boundaries are expressed in `HHMM` form while the value they are
/// compared against is the hour of day (0-23). As a result every hour from 1
/// to 23 lands in [`TimeSegment::LateNight`] and hour 0 lands in
/// [`TimeSegment::Unknown`]. The Evening and Night bands also overlap at
/// 1800-1959; Evening wins because it is checked first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum TimeSegment {
    /// 400-759
    #[serde(rename = "Early Morning")]
    #[strum(serialize = "Early Morning")]
    EarlyMorning,
    /// 800-1159
    Morning,
    /// 1200-1559
    Afternoon,
    /// 1600-1959
    Evening,
    /// 1800-2359
    Night,
    /// 1-359
    #[serde(rename = "Late Night")]
    #[strum(serialize = "Late Night")]
    LateNight,
    /// Outside every band, or no occurrence time.
    Unknown,
}

impl TimeSegment {
    /// Segments in display order. [`TimeSegment::Unknown`] is never displayed.
    pub const DISPLAY_ORDER: [Self; 6] = [
        Self::EarlyMorning,
        Self::Morning,
        Self::Afternoon,
        Self::Evening,
        Self::Night,
        Self::LateNight,
    ];

    /// Buckets an hour value using the literal `HHMM` band boundaries.
    #[must_use]
    pub const fn from_hour(hour: Option<u32>) -> Self {
        let Some(hour) = hour else {
            return Self::Unknown;
        };

        match hour {
            400..=759 => Self::EarlyMorning,
            800..=1159 => Self::Morning,
            1200..=1559 => Self::Afternoon,
            1600..=1959 => Self::Evening,
            1800..=2359 => Self::Night,
            1..=359 => Self::LateNight,
            _ => Self::Unknown,
        }
    }
}

/// Victim age bucket.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum AgeGroup {
    /// Ages 0-4
    Infants,
    /// Ages 5-17
    Children,
    /// Ages 18-30
    #[serde(rename = "Young Adults")]
    #[strum(serialize = "Young Adults")]
    YoungAdults,
    /// Ages 31-60
    #[serde(rename = "Middle Aged")]
    #[strum(serialize = "Middle Aged")]
    MiddleAged,
    /// Ages 61-99
    Elderly,
}

impl AgeGroup {
    /// Oldest age that still falls into a bucket.
    pub const MAX_AGE: u32 = 99;

    /// Returns the bucket for `age`, or `None` when the age is above
    /// [`AgeGroup::MAX_AGE`].
    #[must_use]
    pub const fn from_age(age: u32) -> Option<Self> {
        match age {
            0..=4 => Some(Self::Infants),
            5..=17 => Some(Self::Children),
            18..=30 => Some(Self::YoungAdults),
            31..=60 => Some(Self::MiddleAged),
            61..=Self::MAX_AGE => Some(Self::Elderly),
            _ => None,
        }
    }

    /// Returns all variants of this enum, youngest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Infants,
            Self::Children,
            Self::YoungAdults,
            Self::MiddleAged,
            Self::Elderly,
        ]
    }
}

/// Calendar fields derived from an occurrence timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarFields {
    /// Calendar year.
    pub year: Option<i32>,
    /// Month of year (1-12).
    pub month: Option<u32>,
    /// Day of month (1-31).
    pub day: Option<u32>,
    /// Hour of day (0-23).
    pub hour: Option<u32>,
    /// Year-month label, e.g. `"2023-04"`.
    pub month_occurred: Option<String>,
}

impl CalendarFields {
    /// Derives the calendar fields of `occurred`. Every field is `None` when
    /// the timestamp is unknown.
    #[must_use]
    pub fn from_occurred(occurred: Option<NaiveDateTime>) -> Self {
        occurred.map_or_else(Self::default, |dt| Self {
            year: Some(dt.year()),
            month: Some(dt.month()),
            day: Some(dt.day()),
            hour: Some(dt.hour()),
            month_occurred: Some(dt.format("%Y-%m").to_string()),
        })
    }
}

/// One reported crime after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// When the crime occurred, if the source value parsed.
    pub date_occurred: Option<NaiveDateTime>,
    /// When the crime was reported, if the source value parsed.
    pub date_reported: Option<NaiveDateTime>,
    /// Fields derived from `date_occurred`.
    #[serde(flatten)]
    pub calendar: CalendarFields,
    /// Victim age in years.
    pub victim_age: u32,
    /// Victim sex code.
    pub victim_sex: String,
    /// Victim descent code.
    pub victim_descent: String,
    /// Weapon description.
    pub weapon_description: String,
    /// Case status description.
    pub status_description: String,
    /// Crime category.
    pub crime_category: String,
    /// Time-of-day band derived from the occurrence hour.
    pub time_segment: TimeSegment,
}

impl IncidentRecord {
    /// Year-month label of the occurrence date.
    #[must_use]
    pub fn month_occurred(&self) -> Option<&str> {
        self.calendar.month_occurred.as_deref()
    }
}

/// The full, immutable incident table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentTable {
    records: Vec<IncidentRecord>,
}

impl IncidentTable {
    /// Wraps already-normalized records.
    #[must_use]
    pub const fn new(records: Vec<IncidentRecord>) -> Self {
        Self { records }
    }

    /// Returns every record in load order.
    #[must_use]
    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A view over every record.
    #[must_use]
    pub fn view(&self) -> IncidentView<'_> {
        self.records.iter().collect()
    }
}

/// A read-only subset of an [`IncidentTable`], in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentView<'a> {
    rows: Vec<&'a IncidentRecord>,
}

impl<'a> IncidentView<'a> {
    /// Iterates the records of this view.
    pub fn iter(&self) -> impl Iterator<Item = &'a IncidentRecord> + '_ {
        self.rows.iter().copied()
    }

    /// Number of records in the view.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the view holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Narrows this view to the records matching `predicate`.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&IncidentRecord) -> bool) -> Self {
        self.iter().filter(|record| predicate(record)).collect()
    }
}

impl<'a> FromIterator<&'a IncidentRecord> for IncidentView<'a> {
    fn from_iter<I: IntoIterator<Item = &'a IncidentRecord>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
