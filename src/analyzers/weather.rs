use std::collections::BTreeMap;

use crate::analyzers::utility::ratio;
use crate::records::{Condition, RaceResult, WeatherOutcome};
use crate::status::StatusCategory;

/// Share of incident, technical and completed outcomes per weather condition.
///
/// Results without a recorded condition (before 2005) are ignored. Conditions
/// without any entry are left out.
pub fn weather_outcome_rates(results: &[RaceResult]) -> Vec<WeatherOutcome> {
    // (entries, incidents, technical, completed)
    let mut counts: BTreeMap<Condition, (usize, usize, usize, usize)> = BTreeMap::new();

    for row in results {
        let Some(condition) = row.condition else {
            continue;
        };
        let entry = counts.entry(condition).or_default();
        entry.0 += 1;
        match row.category() {
            StatusCategory::Incident => entry.1 += 1,
            StatusCategory::TechnicalFailure => entry.2 += 1,
            StatusCategory::Completed => entry.3 += 1,
            StatusCategory::Other => {}
        }
    }

    counts
        .into_iter()
        .map(|(condition, (entries, incidents, technical, completed))| {
            let entries = entries as f64;
            WeatherOutcome {
                condition,
                incidents_ratio: ratio(incidents as f64, entries),
                technical_ratio: ratio(technical as f64, entries),
                completed_ratio: ratio(completed as f64, entries),
            }
        })
        .collect()
}
