//! Pit-stop durations: parsing, per-race totals and the fast/average/slow split.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::analyzers::types::{CategorySummary, DriverPitTotal, DurationCategory};
use crate::analyzers::utility::quantile_sorted;
use crate::duration::parse_duration;
use crate::records::PitStop;

/// Quantiles that close the fast and average buckets; the slow bucket ends at the maximum.
const CUT_QUANTILES: [f64; 3] = [0.33, 0.66, 1.0];

/// A pit stop whose duration parsed successfully.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedStop {
    pub year: i32,
    pub race_name: String,
    pub driver_name: String,
    pub duration: f64,
    pub finish_position: Option<u32>,
    pub race_completed: bool,
}

/// Parses every duration and drops the stops where parsing failed.
pub fn timed_stops(stops: &[PitStop]) -> Vec<TimedStop> {
    stops
        .iter()
        .filter_map(|stop| {
            let duration = parse_duration(&stop.duration)?;
            Some(TimedStop {
                year: stop.year,
                race_name: stop.race_name.clone(),
                driver_name: stop.driver_name.clone(),
                duration,
                finish_position: stop.finish_position,
                race_completed: stop.race_completed(),
            })
        })
        .collect()
}

/// Distinct race names in order of first appearance.
pub fn race_names(stops: &[TimedStop]) -> Vec<String> {
    let mut seen = HashSet::new();
    stops
        .iter()
        .filter(|s| seen.insert(s.race_name.as_str()))
        .map(|s| s.race_name.clone())
        .collect()
}

/// Seasons in which `race_name` has pit-stop records, ascending.
pub fn race_years(stops: &[TimedStop], race_name: &str) -> Vec<i32> {
    stops
        .iter()
        .filter(|s| s.race_name == race_name)
        .map(|s| s.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Total pit time per classified finisher of one race, fastest first.
pub fn race_pitstop_totals(stops: &[TimedStop], race_name: &str, year: i32) -> Vec<DriverPitTotal> {
    let mut totals: BTreeMap<(&str, u32), (f64, usize)> = BTreeMap::new();

    for stop in stops {
        if stop.race_name != race_name || stop.year != year || !stop.race_completed {
            continue;
        }
        let Some(finish) = stop.finish_position else {
            continue;
        };
        let entry = totals.entry((stop.driver_name.as_str(), finish)).or_default();
        entry.0 += stop.duration;
        entry.1 += 1;
    }

    let mut totals: Vec<DriverPitTotal> = totals
        .into_iter()
        .map(|((driver, finish_position), (total_duration, stops))| DriverPitTotal {
            driver_name: driver.to_string(),
            finish_position,
            total_duration,
            stops,
        })
        .collect();
    totals.sort_by(|a, b| a.total_duration.total_cmp(&b.total_duration));
    totals
}

/// Assigns each value to a [`DurationCategory`].
///
/// The bin edges are `[min, q(0.33), q(0.66), max]` with linear quantiles.
/// Bins are closed on the right and the lowest edge is included. When edges
/// coincide the later bins simply stay empty.
pub fn categorize_durations(values: &[f64]) -> Vec<DurationCategory> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let Some(edges) = CUT_QUANTILES
        .iter()
        .map(|q| quantile_sorted(&sorted, *q))
        .collect::<Option<Vec<f64>>>()
    else {
        return Vec::new();
    };

    values
        .iter()
        .map(|v| {
            if *v <= edges[0] {
                DurationCategory::Fast
            } else if *v <= edges[1] {
                DurationCategory::Average
            } else {
                DurationCategory::Slow
            }
        })
        .collect()
}

/// Count and min/max duration per category, in Fast, Average, Slow order.
pub fn category_summaries(values: &[f64], categories: &[DurationCategory]) -> Vec<CategorySummary> {
    DurationCategory::ALL
        .iter()
        .map(|category| {
            let members: Vec<f64> = values
                .iter()
                .zip(categories)
                .filter(|(_, c)| *c == category)
                .map(|(v, _)| *v)
                .collect();

            let range = members.iter().copied().fold(None, |acc: Option<(f64, f64)>, v| {
                Some(match acc {
                    None => (v, v),
                    Some((lo, hi)) => (lo.min(v), hi.max(v)),
                })
            });

            CategorySummary {
                category: *category,
                count: members.len(),
                range,
            }
        })
        .collect()
}

/// Categorized pit totals of one race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RacePitAnalysis {
    pub race_name: String,
    pub year: i32,
    pub totals: Vec<DriverPitTotal>,
    pub categories: Vec<DurationCategory>,
    pub summaries: Vec<CategorySummary>,
}

pub fn analyze_race(stops: &[TimedStop], race_name: &str, year: i32) -> RacePitAnalysis {
    let totals = race_pitstop_totals(stops, race_name, year);
    let durations: Vec<f64> = totals.iter().map(|t| t.total_duration).collect();
    let categories = categorize_durations(&durations);
    let summaries = category_summaries(&durations, &categories);

    RacePitAnalysis {
        race_name: race_name.to_string(),
        year,
        totals,
        categories,
        summaries,
    }
}

/// A single stop of one driver with its category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizedStop {
    pub year: i32,
    pub race_name: String,
    pub duration: f64,
    pub finish_position: Option<u32>,
    pub category: DurationCategory,
}

/// Every stop of one driver, sorted by duration and categorized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverPitProfile {
    pub driver_name: String,
    pub stops: Vec<CategorizedStop>,
    pub summaries: Vec<CategorySummary>,
}

pub fn driver_profile(stops: &[TimedStop], driver_name: &str) -> DriverPitProfile {
    let mut own: Vec<&TimedStop> = stops.iter().filter(|s| s.driver_name == driver_name).collect();
    own.sort_by(|a, b| a.duration.total_cmp(&b.duration));

    let durations: Vec<f64> = own.iter().map(|s| s.duration).collect();
    let categories = categorize_durations(&durations);
    let summaries = category_summaries(&durations, &categories);

    let stops = own
        .into_iter()
        .zip(categories)
        .map(|(s, category)| CategorizedStop {
            year: s.year,
            race_name: s.race_name.clone(),
            duration: s.duration,
            finish_position: s.finish_position,
            category,
        })
        .collect();

    DriverPitProfile {
        driver_name: driver_name.to_string(),
        stops,
        summaries,
    }
}
