#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads the incident CSV into an [`IncidentTable`].
//!
//! Loading is tolerant of dirty data: unparseable dates become unknown,
//! negative or missing victim ages drop the row, rows that are identical
//! after parsing are collapsed and missing categorical cells are replaced
//! with sentinels.
//! Only an unreadable file or a missing required column is an error.
//!
//! [`DatasetCache`] memoizes the loaded table for the life of the process
//! (or until the file on disk changes).

pub mod cache;
pub mod parsing;

use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use crime_eda_incident_models::{
    CalendarFields, IncidentRecord, IncidentTable, TimeSegment, UNKNOWN_CATEGORY, UNKNOWN_DESCENT,
    UNKNOWN_SEX, UNKNOWN_STATUS, UNKNOWN_WEAPON,
};
use thiserror::Error;

pub use cache::DatasetCache;

/// Dataset path used when none is configured.
pub const DEFAULT_DATASET_PATH: &str = "train0.csv";

/// Errors that can occur while loading the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset file could not be opened or inspected.
    #[error("Failed to read dataset {}: {source}", path.display())]
    Io {
        /// Path of the dataset file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The CSV could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("Dataset is missing required column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: &'static str,
    },
}

/// Header positions of the columns the dashboard reads.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date_occurred: usize,
    date_reported: usize,
    victim_age: usize,
    victim_sex: usize,
    victim_descent: usize,
    weapon_description: usize,
    status_description: usize,
    crime_category: usize,
}

impl Columns {
    const fn indices(&self) -> [usize; 8] {
        [
            self.date_occurred,
            self.date_reported,
            self.victim_age,
            self.victim_sex,
            self.victim_descent,
            self.weapon_description,
            self.status_description,
            self.crime_category,
        ]
    }

    fn resolve(headers: &csv::StringRecord) -> Result<Self, DatasetError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or(DatasetError::MissingColumn { column })
        };

        Ok(Self {
            date_occurred: find("Date_Occurred")?,
            date_reported: find("Date_Reported")?,
            victim_age: find("Victim_Age")?,
            victim_sex: find("Victim_Sex")?,
            victim_descent: find("Victim_Descent")?,
            weapon_description: find("Weapon_Description")?,
            status_description: find("Status_Description")?,
            crime_category: find("Crime_Category")?,
        })
    }
}

/// Identity of a row for duplicate detection: the parsed values of the
/// columns the dashboard reads plus the raw text of every other column.
/// Blank categorical cells compare equal before any sentinel is applied.
#[derive(Debug, PartialEq, Eq, Hash)]
struct RowKey {
    date_occurred: Option<NaiveDateTime>,
    date_reported: Option<NaiveDateTime>,
    victim_age: u32,
    text: [Option<String>; 5],
    other: Vec<String>,
}

/// Running tallies of what normalization removed.
#[derive(Debug, Default)]
struct LoadStats {
    read: u64,
    invalid_age: u64,
    duplicates: u64,
}

/// Reads and normalizes the dataset at `path`.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] if the file cannot be opened, and
/// [`DatasetError::Csv`] or [`DatasetError::MissingColumn`] if it is not a
/// usable incident CSV.
pub fn load_table(path: &Path) -> Result<IncidentTable, DatasetError> {
    log::info!("Loading incidents from {}", path.display());

    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let table = load_from_reader(file)?;
    log::info!("Loaded {} incidents from {}", table.len(), path.display());
    Ok(table)
}

/// Reads and normalizes an incident CSV from any reader.
///
/// # Errors
///
/// Returns [`DatasetError::Csv`] on malformed CSV and
/// [`DatasetError::MissingColumn`] if a required column is absent.
pub fn load_from_reader<R: Read>(reader: R) -> Result<IncidentTable, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?;
    let columns = Columns::resolve(headers)?;
    let used = columns.indices();
    let other_columns: Vec<usize> = (0..headers.len())
        .filter(|idx| !used.contains(idx))
        .collect();

    let mut stats = LoadStats::default();
    let mut seen: HashSet<RowKey> = HashSet::new();
    let mut records = Vec::new();

    for result in reader.records() {
        let row = result?;
        stats.read += 1;

        let cell = |idx: usize| row.get(idx).unwrap_or("");

        let Some(victim_age) = parsing::parse_victim_age(cell(columns.victim_age)) else {
            stats.invalid_age += 1;
            continue;
        };

        let text = |idx: usize| parsing::non_blank(cell(idx)).map(str::to_owned);

        let date_occurred = parsing::parse_incident_date(cell(columns.date_occurred));
        let date_reported = parsing::parse_incident_date(cell(columns.date_reported));
        let texts = [
            text(columns.victim_sex),
            text(columns.victim_descent),
            text(columns.weapon_description),
            text(columns.status_description),
            text(columns.crime_category),
        ];

        let key = RowKey {
            date_occurred,
            date_reported,
            victim_age,
            text: texts.clone(),
            other: other_columns.iter().map(|&idx| cell(idx).to_owned()).collect(),
        };
        if !seen.insert(key) {
            stats.duplicates += 1;
            continue;
        }

        let [sex, descent, weapon, status, category] = texts;
        let calendar = CalendarFields::from_occurred(date_occurred);
        let time_segment = TimeSegment::from_hour(calendar.hour);

        records.push(IncidentRecord {
            date_occurred,
            date_reported,
            calendar,
            victim_age,
            victim_sex: sex.unwrap_or_else(|| UNKNOWN_SEX.to_owned()),
            victim_descent: descent.unwrap_or_else(|| UNKNOWN_DESCENT.to_owned()),
            weapon_description: weapon.unwrap_or_else(|| UNKNOWN_WEAPON.to_owned()),
            status_description: status.unwrap_or_else(|| UNKNOWN_STATUS.to_owned()),
            crime_category: category.unwrap_or_else(|| UNKNOWN_CATEGORY.to_owned()),
            time_segment,
        });
    }

    log::debug!(
        "Read {} rows: dropped {} with a negative or missing victim age, {} duplicates",
        stats.read,
        stats.invalid_age,
        stats.duplicates,
    );

    Ok(IncidentTable::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Location,Date_Reported,Date_Occurred,Victim_Age,Victim_Sex,Victim_Descent,Weapon_Description,Status_Description,Crime_Category";

    fn load(rows: &[&str]) -> IncidentTable {
        let csv = std::iter::once(HEADER)
            .chain(rows.iter().copied())
            .collect::<Vec<_>>()
            .join("\n");
        load_from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn drops_negative_ages() {
        let table = load(&[
            "A,01/02/2023,01/01/2023 10:00:00 AM,34,M,W,KNIFE,Invest Cont,Violent Crimes",
            "B,01/02/2023,01/01/2023 11:00:00 AM,-1,F,H,KNIFE,Invest Cont,Violent Crimes",
        ]);
        assert_eq!(table.len(), 1);
        assert!(table.records().iter().all(|r| r.victim_age == 34));
    }

    #[test]
    fn drops_rows_without_an_age() {
        let table = load(&[
            "A,01/02/2023,01/01/2023 10:00:00 AM,,M,W,KNIFE,Invest Cont,Violent Crimes",
            "B,01/02/2023,01/01/2023 11:00:00 AM,20,F,H,KNIFE,Invest Cont,Violent Crimes",
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].victim_sex, "F");
    }

    #[test]
    fn collapses_identical_rows() {
        let row = "A,01/02/2023,01/01/2023 10:00:00 AM,34,M,W,KNIFE,Invest Cont,Violent Crimes";
        let table = load(&[row, row]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn unparseable_dates_compare_equal_when_deduplicating() {
        let table = load(&[
            "A,01/02/2023,garbage,34,M,W,KNIFE,Invest Cont,Violent Crimes",
            "A,01/02/2023,n/a,34,M,W,KNIFE,Invest Cont,Violent Crimes",
        ]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn equivalent_ages_and_padding_compare_equal_when_deduplicating() {
        let table = load(&[
            "A,01/02/2023,01/01/2023 10:00:00 AM,34,M,W,KNIFE,Invest Cont,Violent Crimes",
            "A,01/02/2023,01/01/2023 10:00:00 AM,34.0,M,W,KNIFE,Invest Cont,Violent Crimes",
            "A,01/02/2023,01/01/2023 10:00:00 AM,34, M ,W,KNIFE,Invest Cont,Violent Crimes",
            "A,01/02/2023,01/01/2023 10:00:00 AM,34,F,W,KNIFE,Invest Cont,Violent Crimes",
            "A,2023-01-02,01/01/2023 10:00:00 AM,34,F,W,KNIFE,Invest Cont,Violent Crimes",
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].victim_sex, "F");
    }

    #[test]
    fn blank_and_missing_categoricals_compare_equal_when_deduplicating() {
        let table = load(&[
            "A,01/02/2023,01/01/2023 10:00:00 AM,34,M,W,,,",
            "A,01/02/2023,01/01/2023 10:00:00 AM,34,M,W",
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].weapon_description, "UNKNOWN");
    }

    #[test]
    fn huge_ages_are_kept() {
        let table = load(&[
            "A,01/02/2023,01/01/2023 10:00:00 AM,4294967296,M,W,KNIFE,Invest Cont,Violent Crimes",
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].victim_age, u32::MAX);
    }

    #[test]
    fn rows_differing_only_in_unused_columns_are_kept() {
        let table = load(&[
            "A,01/02/2023,01/01/2023 10:00:00 AM,34,M,W,KNIFE,Invest Cont,Violent Crimes",
            "B,01/02/2023,01/01/2023 10:00:00 AM,34,M,W,KNIFE,Invest Cont,Violent Crimes",
        ]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn fills_missing_categoricals_with_sentinels() {
        let table = load(&["A,01/02/2023,01/01/2023 10:00:00 AM,34,,,,,"]);
        let record = &table.records()[0];
        assert_eq!(record.weapon_description, "UNKNOWN");
        assert_eq!(record.victim_sex, "X");
        assert_eq!(record.victim_descent, "Unknown");
        assert_eq!(record.status_description, "Unknown");
        assert_eq!(record.crime_category, "Unknown");
    }

    #[test]
    fn short_rows_are_padded_with_sentinels() {
        let table = load(&["A,01/02/2023,01/01/2023 10:00:00 AM,34,M,W"]);
        let record = &table.records()[0];
        assert_eq!(record.victim_descent, "W");
        assert_eq!(record.weapon_description, "UNKNOWN");
    }

    #[test]
    fn bad_dates_become_unknown_instead_of_failing() {
        let table = load(&["A,garbage,not a date,34,M,W,KNIFE,Invest Cont,Violent Crimes"]);
        let record = &table.records()[0];
        assert!(record.date_occurred.is_none());
        assert!(record.date_reported.is_none());
        assert_eq!(record.calendar, CalendarFields::default());
        assert_eq!(record.time_segment, TimeSegment::Unknown);
    }

    #[test]
    fn derives_calendar_fields() {
        let table = load(&[
            "A,01/02/2023,04/09/2023 05:15:00 PM,34,M,W,KNIFE,Invest Cont,Violent Crimes",
        ]);
        let record = &table.records()[0];
        assert_eq!(record.calendar.year, Some(2023));
        assert_eq!(record.calendar.month, Some(4));
        assert_eq!(record.calendar.day, Some(9));
        assert_eq!(record.calendar.hour, Some(17));
        assert_eq!(record.month_occurred(), Some("2023-04"));
        assert_eq!(record.time_segment, TimeSegment::LateNight);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let csv = "Date_Occurred,Victim_Age\n01/01/2023,34\n";
        let err = load_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn {
                column: "Date_Reported"
            }
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_table(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
        assert!(
            err.to_string()
                .starts_with("Failed to read dataset definitely/not/here.csv: ")
        );
    }
}
