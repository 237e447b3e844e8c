#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crime EDA dashboard server.
//!
//! The dashboard page and the JSON API share one query format: repeated
//! `category`, `weapon` and `sex` keys, calendar dates in `from`/`to`, and
//! an `applied` marker that distinguishes a submitted form from a first
//! visit.

use chrono::{NaiveDate, NaiveDateTime};
use crime_eda_analytics_models::{FilterOptions, FilterSelection};
use serde::{Deserialize, Serialize};

/// Date format used by the `from` and `to` query parameters.
pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Rows in the loaded dataset.
    pub rows: u64,
}

/// Error body returned alongside non-2xx responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Human readable message.
    pub error: String,
}

/// Filter parameters of a dashboard request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardQuery {
    /// Whether the sidebar form was submitted. When `false` the lists are
    /// ignored and everything is selected.
    pub applied: bool,
    /// Values of every `category` key.
    pub categories: Vec<String>,
    /// Values of every `weapon` key.
    pub weapons: Vec<String>,
    /// Values of every `sex` key.
    pub sexes: Vec<String>,
    /// First day of the date range.
    pub from: Option<NaiveDate>,
    /// Last day of the date range.
    pub to: Option<NaiveDate>,
}

impl DashboardQuery {
    /// Collects a query from decoded `key=value` pairs. Unknown keys and
    /// unparseable dates are ignored.
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();

        for (key, value) in pairs {
            match key.as_ref() {
                "applied" => {
                    let value = value.into();
                    query.applied = matches!(value.as_str(), "1" | "true" | "yes");
                }
                "category" => query.categories.push(value.into()),
                "weapon" => query.weapons.push(value.into()),
                "sex" => query.sexes.push(value.into()),
                "from" => query.from = parse_query_date(&value.into()),
                "to" => query.to = parse_query_date(&value.into()),
                _ => {}
            }
        }

        query
    }

    /// Resolves this query against the options of the loaded table.
    ///
    /// Before the form is applied every option is selected. Missing dates
    /// fall back to the data span. `from` starts at midnight and `to` runs to
    /// the last instant of its day.
    #[must_use]
    pub fn selection(&self, options: &FilterOptions) -> FilterSelection {
        let mut selection = if self.applied {
            FilterSelection {
                categories: self.categories.clone(),
                weapons: self.weapons.clone(),
                sexes: self.sexes.clone(),
                date_from: options.min_date,
                date_to: options.max_date,
            }
        } else {
            FilterSelection::all(options)
        };

        if let Some(from) = self.from.and_then(start_of_day) {
            selection.date_from = Some(from);
        }
        if let Some(to) = self.to.and_then(end_of_day) {
            selection.date_to = Some(to);
        }

        selection
    }
}

/// Parses a `YYYY-MM-DD` query value.
#[must_use]
pub fn parse_query_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), QUERY_DATE_FORMAT).ok()
}

fn start_of_day(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
}

fn end_of_day(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_nano_opt(23, 59, 59, 999_999_999)
}
