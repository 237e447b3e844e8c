#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filtering and aggregation engine for the crime EDA dashboard.
//!
//! [`filter`] turns the sidebar selection into a view over the loaded
//! table, [`aggregate`] computes the summary behind each panel, and
//! [`dashboard::build_dashboard`] ties both together into the view model
//! rendered for every request. Everything here is a pure function of its
//! inputs.

pub mod aggregate;
pub mod dashboard;
pub mod filter;

pub use dashboard::build_dashboard;
pub use filter::{apply, apply_selection, filter_options};
