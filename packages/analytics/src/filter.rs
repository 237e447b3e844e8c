//! Sidebar options and row filtering.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDateTime;
use crime_eda_analytics_models::{FilterOptions, FilterSelection};
use crime_eda_incident_models::{IncidentTable, IncidentView};

/// Collects the selectable values of the loaded table: sorted distinct
/// categories, weapons and sexes, plus the occurrence date span.
#[must_use]
pub fn filter_options(table: &IncidentTable) -> FilterOptions {
    let mut categories = BTreeSet::new();
    let mut weapons = BTreeSet::new();
    let mut sexes = BTreeSet::new();
    let mut min_date: Option<NaiveDateTime> = None;
    let mut max_date: Option<NaiveDateTime> = None;

    for record in table.records() {
        categories.insert(record.crime_category.as_str());
        weapons.insert(record.weapon_description.as_str());
        sexes.insert(record.victim_sex.as_str());

        if let Some(dt) = record.date_occurred {
            min_date = Some(min_date.map_or(dt, |m| m.min(dt)));
            max_date = Some(max_date.map_or(dt, |m| m.max(dt)));
        }
    }

    let owned = |set: BTreeSet<&str>| -> Vec<String> {
        set.into_iter().map(str::to_owned).collect()
    };

    FilterOptions {
        categories: owned(categories),
        weapons: owned(weapons),
        sexes: owned(sexes),
        min_date,
        max_date,
    }
}

/// Keeps the rows whose category, weapon and sex are all selected and whose
/// occurrence date lies within `[date_from, date_to]`.
///
/// Empty selections match nothing. A `None` bound is open-ended, but a row
/// without an occurrence date never matches.
#[must_use]
pub fn apply<'a>(
    view: &IncidentView<'a>,
    categories: &[String],
    weapons: &[String],
    sexes: &[String],
    date_from: Option<NaiveDateTime>,
    date_to: Option<NaiveDateTime>,
) -> IncidentView<'a> {
    let categories: HashSet<&str> = categories.iter().map(String::as_str).collect();
    let weapons: HashSet<&str> = weapons.iter().map(String::as_str).collect();
    let sexes: HashSet<&str> = sexes.iter().map(String::as_str).collect();

    view.filter(|record| {
        categories.contains(record.crime_category.as_str())
            && weapons.contains(record.weapon_description.as_str())
            && sexes.contains(record.victim_sex.as_str())
            && record.date_occurred.is_some_and(|dt| {
                date_from.is_none_or(|from| dt >= from) && date_to.is_none_or(|to| dt <= to)
            })
    })
}

/// [`apply`] driven by a [`FilterSelection`].
#[must_use]
pub fn apply_selection<'a>(
    view: &IncidentView<'a>,
    selection: &FilterSelection,
) -> IncidentView<'a> {
    apply(
        view,
        &selection.categories,
        &selection.weapons,
        &selection.sexes,
        selection.date_from,
        selection.date_to,
    )
}

#[cfg(test)]
mod tests {
    use crime_eda_dataset::load_from_reader;

    use super::*;

    const CSV: &str = "Date_Reported,Date_Occurred,Victim_Age,Victim_Sex,Victim_Descent,Weapon_Description,Status_Description,Crime_Category
01/05/2023,01/03/2023 10:00:00 AM,34,M,W,KNIFE,Invest Cont,Violent Crimes
01/06/2023,01/04/2023 11:00:00 PM,20,X,H,,Adult Arrest,Property Crimes
02/02/2023,02/01/2023 09:00:00 AM,51,F,B,UNKNOWN,Invest Cont,Property Crimes
02/02/2023,not a date,19,F,B,KNIFE,Invest Cont,Violent Crimes
";

    fn table() -> IncidentTable {
        load_from_reader(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn options_are_sorted_and_distinct() {
        let options = filter_options(&table());
        assert_eq!(options.categories, vec!["Property Crimes", "Violent Crimes"]);
        assert_eq!(options.weapons, vec!["KNIFE", "UNKNOWN"]);
        assert_eq!(options.sexes, vec!["F", "M", "X"]);
        assert_eq!(options.min_date.unwrap().to_string(), "2023-01-03 10:00:00");
        assert_eq!(options.max_date.unwrap().to_string(), "2023-02-01 09:00:00");
    }

    #[test]
    fn select_all_keeps_every_dated_row() {
        let table = table();
        let selection = FilterSelection::all(&filter_options(&table));
        let view = apply_selection(&table.view(), &selection);
        assert_eq!(view.len(), 3);
        assert!(view.iter().all(|r| r.date_occurred.is_some()));
    }

    #[test]
    fn select_all_is_identity_on_fully_dated_tables() {
        let csv: String = CSV.lines().take(4).map(|l| format!("{l}\n")).collect();
        let table = load_from_reader(csv.as_bytes()).unwrap();
        let selection = FilterSelection::all(&filter_options(&table));
        let view = apply_selection(&table.view(), &selection);
        assert_eq!(view, table.view());
    }

    #[test]
    fn empty_category_selection_matches_nothing() {
        let table = table();
        let mut selection = FilterSelection::all(&filter_options(&table));
        selection.categories.clear();
        assert!(apply_selection(&table.view(), &selection).is_empty());
    }

    #[test]
    fn filters_on_every_dimension() {
        let table = table();
        let mut selection = FilterSelection::all(&filter_options(&table));
        selection.sexes = vec!["X".into()];
        let view = apply_selection(&table.view(), &selection);
        assert_eq!(view.len(), 1);
        assert_eq!(view.iter().next().unwrap().weapon_description, "UNKNOWN");

        let mut selection = FilterSelection::all(&filter_options(&table));
        selection.weapons = vec!["KNIFE".into()];
        selection.categories = vec!["Property Crimes".into()];
        assert!(apply_selection(&table.view(), &selection).is_empty());
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let table = table();
        let options = filter_options(&table);
        let mut selection = FilterSelection::all(&options);
        selection.date_from = options.max_date;
        selection.date_to = options.max_date;
        let view = apply_selection(&table.view(), &selection);
        assert_eq!(view.len(), 1);
        assert_eq!(view.iter().next().unwrap().victim_age, 51);
    }

    #[test]
    fn filtering_leaves_the_base_table_untouched() {
        let table = table();
        let before = table.clone();
        let _ = apply(&table.view(), &[], &[], &[], None, None);
        assert_eq!(table, before);
    }
}
