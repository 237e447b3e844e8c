//! Per-panel summaries of an incident view.
//!
//! Every function here is a pure reduction of an [`IncidentView`]. Results
//! ordered "descending" break ties by ascending label so output is stable
//! across runs.

use std::collections::{BTreeMap, HashMap};

use crime_eda_analytics_models::{
    AgeHistogram, DensityPoint, HistogramBin, LabelAverage, LabelCount, PeriodCount,
};
use crime_eda_incident_models::{AgeGroup, IncidentRecord, IncidentView, TimeSegment};

/// Number of equal-width bins in the age histogram.
pub const AGE_HISTOGRAM_BINS: usize = 30;

/// Number of points the age density curve is evaluated at.
pub const DENSITY_GRID_POINTS: usize = 200;

/// Maximum entries in the "top N" panels.
pub const TOP_N: usize = 10;

fn count_by<'a>(
    view: &IncidentView<'a>,
    key: impl Fn(&'a IncidentRecord) -> &'a str,
) -> HashMap<&'a str, u64> {
    let mut counts = HashMap::new();
    for record in view.iter() {
        *counts.entry(key(record)).or_insert(0) += 1;
    }
    counts
}

fn descending_counts(counts: HashMap<&str, u64>) -> Vec<LabelCount> {
    let mut out: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_owned(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out
}

/// Mean number of rows per month for each label, over the months in which
/// the label occurs at all. Rows without an occurrence month are ignored.
#[allow(clippy::cast_precision_loss)]
fn monthly_average_by<'a>(
    view: &IncidentView<'a>,
    key: impl Fn(&'a IncidentRecord) -> &'a str,
) -> Vec<LabelAverage> {
    let mut per_month: HashMap<&str, HashMap<&str, u64>> = HashMap::new();
    for record in view.iter() {
        let Some(month) = record.month_occurred() else {
            continue;
        };
        *per_month
            .entry(key(record))
            .or_default()
            .entry(month)
            .or_insert(0) += 1;
    }

    let mut out: Vec<LabelAverage> = per_month
        .into_iter()
        .map(|(label, months)| {
            let total: u64 = months.values().sum();
            LabelAverage {
                label: label.to_owned(),
                average: total as f64 / months.len() as f64,
            }
        })
        .collect();
    out.sort_by(|a, b| {
        b.average
            .total_cmp(&a.average)
            .then_with(|| a.label.cmp(&b.label))
    });
    out
}

/// Incidents per crime category, most frequent first.
///
/// The dashboard feeds this the unfiltered table.
#[must_use]
pub fn category_distribution(view: &IncidentView<'_>) -> Vec<LabelCount> {
    descending_counts(count_by(view, |r| r.crime_category.as_str()))
}

/// Victim age histogram with a Gaussian kernel density overlay.
///
/// Bins span `[min_age, max_age]` in [`AGE_HISTOGRAM_BINS`] equal steps; a
/// single distinct age is widened by half a year on each side. The density
/// uses Scott's rule for the bandwidth and is scaled to counts so it
/// overlays the bars. It is left empty for fewer than two rows or when all
/// ages are equal.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn age_histogram(view: &IncidentView<'_>) -> AgeHistogram {
    let mut ages: BTreeMap<u32, u64> = BTreeMap::new();
    for record in view.iter() {
        *ages.entry(record.victim_age).or_insert(0) += 1;
    }

    let (Some((&min, _)), Some((&max, _))) = (ages.first_key_value(), ages.last_key_value())
    else {
        return AgeHistogram::default();
    };

    let (min, max) = (f64::from(min), f64::from(max));
    let (lower, upper) = if max > min {
        (min, max)
    } else {
        (min - 0.5, max + 0.5)
    };
    let width = (upper - lower) / AGE_HISTOGRAM_BINS as f64;

    let mut counts = [0u64; AGE_HISTOGRAM_BINS];
    for (&age, &n) in &ages {
        let idx = ((f64::from(age) - lower) / width) as usize;
        counts[idx.min(AGE_HISTOGRAM_BINS - 1)] += n;
    }

    let bins = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| HistogramBin {
            lower: (i as f64).mul_add(width, lower),
            upper: ((i + 1) as f64).mul_add(width, lower),
            count,
        })
        .collect();

    AgeHistogram {
        bins,
        density: age_density(&ages, min, max, width),
    }
}

#[allow(clippy::cast_precision_loss)]
fn age_density(
    ages: &BTreeMap<u32, u64>,
    min: f64,
    max: f64,
    bin_width: f64,
) -> Vec<DensityPoint> {
    let n: u64 = ages.values().sum();
    if n < 2 || max <= min {
        return Vec::new();
    }
    let n_f = n as f64;

    let mean = ages
        .iter()
        .map(|(&age, &count)| f64::from(age) * count as f64)
        .sum::<f64>()
        / n_f;
    let variance = ages
        .iter()
        .map(|(&age, &count)| (f64::from(age) - mean).powi(2) * count as f64)
        .sum::<f64>()
        / (n_f - 1.0);

    let bandwidth = variance.sqrt() * n_f.powf(-0.2);
    if bandwidth <= 0.0 {
        return Vec::new();
    }

    let norm = 1.0 / (n_f * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let step = (max - min) / (DENSITY_GRID_POINTS - 1) as f64;

    (0..DENSITY_GRID_POINTS)
        .map(|i| {
            let x = (i as f64).mul_add(step, min);
            let density = norm
                * ages
                    .iter()
                    .map(|(&age, &count)| {
                        let z = (x - f64::from(age)) / bandwidth;
                        count as f64 * (-0.5 * z * z).exp()
                    })
                    .sum::<f64>();
            DensityPoint {
                age: x,
                value: density * n_f * bin_width,
            }
        })
        .collect()
}

/// Incidents per occurrence month, in chronological order.
#[must_use]
pub fn monthly_trend(view: &IncidentView<'_>) -> Vec<PeriodCount> {
    let mut months: BTreeMap<&str, u64> = BTreeMap::new();
    for month in view.iter().filter_map(IncidentRecord::month_occurred) {
        *months.entry(month).or_insert(0) += 1;
    }
    months
        .into_iter()
        .map(|(period, count)| PeriodCount {
            period: period.to_owned(),
            count,
        })
        .collect()
}

/// The [`TOP_N`] most frequent weapons.
#[must_use]
pub fn top_weapons(view: &IncidentView<'_>) -> Vec<LabelCount> {
    let mut counts = descending_counts(count_by(view, |r| r.weapon_description.as_str()));
    counts.truncate(TOP_N);
    counts
}

/// Incidents per victim sex, ordered by sex code.
#[must_use]
pub fn sex_distribution(view: &IncidentView<'_>) -> Vec<LabelCount> {
    let mut counts = descending_counts(count_by(view, |r| r.victim_sex.as_str()));
    counts.sort_by(|a, b| a.label.cmp(&b.label));
    counts
}

/// Incidents per [`AgeGroup`], youngest first. Every group is present;
/// ages above [`AgeGroup::MAX_AGE`] are not counted.
#[must_use]
pub fn age_group_distribution(view: &IncidentView<'_>) -> Vec<LabelCount> {
    let mut counts: HashMap<AgeGroup, u64> = HashMap::new();
    for group in view.iter().filter_map(|r| AgeGroup::from_age(r.victim_age)) {
        *counts.entry(group).or_insert(0) += 1;
    }
    AgeGroup::all()
        .iter()
        .map(|group| LabelCount {
            label: group.to_string(),
            count: counts.get(group).copied().unwrap_or(0),
        })
        .collect()
}

/// Incidents per victim descent, most frequent first.
#[must_use]
pub fn descent_distribution(view: &IncidentView<'_>) -> Vec<LabelCount> {
    descending_counts(count_by(view, |r| r.victim_descent.as_str()))
}

/// Incidents per case status, most frequent first.
#[must_use]
pub fn status_distribution(view: &IncidentView<'_>) -> Vec<LabelCount> {
    descending_counts(count_by(view, |r| r.status_description.as_str()))
}

/// Average monthly incidents per crime category, highest first.
#[must_use]
pub fn category_monthly_average(view: &IncidentView<'_>) -> Vec<LabelAverage> {
    monthly_average_by(view, |r| r.crime_category.as_str())
}

/// Incidents per [`TimeSegment`] in display order. Rows whose segment is
/// [`TimeSegment::Unknown`] are not shown.
#[must_use]
pub fn time_segment_distribution(view: &IncidentView<'_>) -> Vec<LabelCount> {
    let mut counts: HashMap<TimeSegment, u64> = HashMap::new();
    for record in view.iter() {
        *counts.entry(record.time_segment).or_insert(0) += 1;
    }
    TimeSegment::DISPLAY_ORDER
        .iter()
        .map(|segment| LabelCount {
            label: segment.to_string(),
            count: counts.get(segment).copied().unwrap_or(0),
        })
        .collect()
}

/// Average monthly incidents per weapon, the [`TOP_N`] highest.
#[must_use]
pub fn weapon_monthly_average(view: &IncidentView<'_>) -> Vec<LabelAverage> {
    let mut averages = monthly_average_by(view, |r| r.weapon_description.as_str());
    averages.truncate(TOP_N);
    averages
}

#[cfg(test)]
mod tests {
    use crime_eda_dataset::load_from_reader;
    use crime_eda_incident_models::IncidentTable;

    use super::*;

    const HEADER: &str = "Date_Reported,Date_Occurred,Victim_Age,Victim_Sex,Victim_Descent,Weapon_Description,Status_Description,Crime_Category";

    fn table(rows: &[String]) -> IncidentTable {
        let csv = std::iter::once(HEADER.to_owned())
            .chain(rows.iter().cloned())
            .collect::<Vec<_>>()
            .join("\n");
        load_from_reader(csv.as_bytes()).unwrap()
    }

    fn row(date: &str, age: u32, sex: &str, weapon: &str, category: &str) -> String {
        format!("{date},{date},{age},{sex},W,{weapon},Invest Cont,{category}")
    }

    #[test]
    fn monthly_trend_orders_months_chronologically() {
        let table = table(&[
            row("2023-02-01 10:00:00", 30, "M", "KNIFE", "Violent"),
            row("2023-01-01 10:00:00", 31, "M", "KNIFE", "Violent"),
            row("2023-01-02 10:00:00", 32, "M", "KNIFE", "Violent"),
            row("2023-02-02 10:00:00", 33, "M", "KNIFE", "Violent"),
            row("2023-01-03 10:00:00", 34, "M", "KNIFE", "Violent"),
        ]);
        let trend = monthly_trend(&table.view());
        let pairs: Vec<_> = trend.iter().map(|p| (p.period.as_str(), p.count)).collect();
        assert_eq!(pairs, vec![("2023-01", 3), ("2023-02", 2)]);
    }

    #[test]
    fn top_weapons_is_truncated_and_descending() {
        let rows: Vec<String> = (0..15u32)
            .flat_map(|w| {
                let weapon = format!("W{w:02}");
                (0..=w).map(move |age| row("2023-01-01 10:00:00", age, "M", &weapon, "V"))
            })
            .collect();
        let table = table(&rows);
        let top = top_weapons(&table.view());

        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
        assert_eq!(top[0].label, "W14");
        assert_eq!(top[0].count, 15);
    }

    #[test]
    fn ties_break_alphabetically() {
        let table = table(&[
            row("2023-01-01 10:00:00", 30, "M", "ROCK", "V"),
            row("2023-01-01 10:00:00", 31, "M", "AXE", "V"),
        ]);
        let labels: Vec<_> = top_weapons(&table.view())
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, vec!["AXE", "ROCK"]);
    }

    #[test]
    fn age_groups_skip_out_of_range_ages() {
        let table = table(&[
            row("2023-01-01 10:00:00", 150, "M", "KNIFE", "V"),
            row("2023-01-01 10:00:00", 3, "M", "KNIFE", "V"),
            row("2023-01-01 10:00:00", 45, "F", "KNIFE", "V"),
        ]);
        let groups = age_group_distribution(&table.view());
        let pairs: Vec<_> = groups.iter().map(|g| (g.label.as_str(), g.count)).collect();
        assert_eq!(
            pairs,
            vec![
                ("Infants", 1),
                ("Children", 0),
                ("Young Adults", 0),
                ("Middle Aged", 1),
                ("Elderly", 0),
            ]
        );
        assert_eq!(groups.iter().map(|g| g.count).sum::<u64>(), 2);
    }

    #[test]
    fn monthly_average_uses_months_where_label_occurs() {
        let table = table(&[
            row("2023-01-01 10:00:00", 30, "M", "KNIFE", "Violent"),
            row("2023-01-02 10:00:00", 31, "M", "KNIFE", "Violent"),
            row("2023-01-03 10:00:00", 32, "M", "KNIFE", "Violent"),
            row("2023-02-01 10:00:00", 33, "M", "KNIFE", "Violent"),
            row("2023-02-01 10:00:00", 34, "M", "GUN", "Property"),
        ]);
        let averages = category_monthly_average(&table.view());
        assert_eq!(averages[0].label, "Violent");
        assert!((averages[0].average - 2.0).abs() < f64::EPSILON);
        assert_eq!(averages[1].label, "Property");
        assert!((averages[1].average - 1.0).abs() < f64::EPSILON);

        let weapons = weapon_monthly_average(&table.view());
        assert_eq!(weapons[0].label, "KNIFE");
        assert!((weapons[0].average - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn time_segments_follow_display_order() {
        let table = table(&[
            row("2023-01-01 10:00:00", 30, "M", "KNIFE", "V"),
            row("2023-01-01 00:30:00", 31, "M", "KNIFE", "V"),
        ]);
        let segments = time_segment_distribution(&table.view());
        let labels: Vec<_> = segments.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Early Morning",
                "Morning",
                "Afternoon",
                "Evening",
                "Night",
                "Late Night"
            ]
        );
        assert_eq!(segments[5].count, 1);
        assert_eq!(segments.iter().map(|s| s.count).sum::<u64>(), 1);
    }

    #[test]
    fn age_histogram_bins_cover_every_row() {
        let rows: Vec<String> = (0..60u32)
            .map(|age| row("2023-01-01 10:00:00", age, "M", "KNIFE", "V"))
            .collect();
        let table = table(&rows);
        let histogram = age_histogram(&table.view());

        assert_eq!(histogram.bins.len(), AGE_HISTOGRAM_BINS);
        assert_eq!(histogram.bins.iter().map(|b| b.count).sum::<u64>(), 60);
        assert!((histogram.bins[0].lower - 0.0).abs() < f64::EPSILON);
        assert!((histogram.bins[AGE_HISTOGRAM_BINS - 1].upper - 59.0).abs() < 1e-9);
        assert_eq!(histogram.density.len(), DENSITY_GRID_POINTS);
        assert!(histogram.density.iter().all(|p| p.value > 0.0));
    }

    #[test]
    fn age_histogram_of_a_single_age() {
        let table = table(&[
            row("2023-01-01 10:00:00", 40, "M", "KNIFE", "V"),
            row("2023-01-02 10:00:00", 40, "F", "KNIFE", "V"),
        ]);
        let histogram = age_histogram(&table.view());
        assert_eq!(histogram.bins.iter().map(|b| b.count).sum::<u64>(), 2);
        assert!(histogram.density.is_empty());
    }

    #[test]
    fn empty_views_produce_empty_summaries() {
        let table = IncidentTable::default();
        let view = table.view();
        assert!(age_histogram(&view).bins.is_empty());
        assert!(monthly_trend(&view).is_empty());
        assert!(top_weapons(&view).is_empty());
        assert!(category_monthly_average(&view).is_empty());
        assert!(age_group_distribution(&view).iter().all(|g| g.count == 0));
    }

    #[test]
    fn sex_distribution_counts_each_code() {
        let table = table(&[
            row("2023-01-01 10:00:00", 30, "M", "KNIFE", "V"),
            row("2023-01-01 11:00:00", 30, "X", "KNIFE", "V"),
            row("2023-01-01 12:00:00", 30, "M", "KNIFE", "V"),
        ]);
        let sexes = sex_distribution(&table.view());
        let pairs: Vec<_> = sexes.iter().map(|s| (s.label.as_str(), s.count)).collect();
        assert_eq!(pairs, vec![("M", 2), ("X", 1)]);
    }
}
