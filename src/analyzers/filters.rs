//! Threshold filters that feed the dropdowns.

use std::collections::{HashMap, HashSet};

use crate::analyzers::pitstops::TimedStop;
use crate::records::RaceResult;

/// Circuits with at least `min_races` recorded result rows.
///
/// The tally runs over the full input. Order is unspecified.
pub fn circuits_with_min_races(rows: &[RaceResult], min_races: usize) -> Vec<String> {
    at_least(rows.iter().map(|r| r.circuit_id.as_str()), min_races)
}

/// Drivers with at least `min_races` recorded result rows. Order is unspecified.
pub fn drivers_with_min_races(rows: &[RaceResult], min_races: usize) -> Vec<String> {
    at_least(rows.iter().map(|r| r.driver_name.as_str()), min_races)
}

/// Drivers that made pit stops in at least `min_seasons` distinct seasons,
/// sorted by name.
pub fn drivers_with_min_seasons(stops: &[TimedStop], min_seasons: usize) -> Vec<String> {
    let mut seasons: HashMap<&str, HashSet<i32>> = HashMap::new();
    for stop in stops {
        seasons.entry(stop.driver_name.as_str()).or_default().insert(stop.year);
    }

    let mut drivers: Vec<String> = seasons
        .into_iter()
        .filter(|(_, years)| years.len() >= min_seasons)
        .map(|(name, _)| name.to_string())
        .collect();
    drivers.sort();
    drivers
}

fn at_least<'a>(keys: impl Iterator<Item = &'a str>, min: usize) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count >= min)
        .map(|(key, _)| key.to_string())
        .collect()
}
