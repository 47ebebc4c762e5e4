//! Retirements by circuit, and the per-race outcome table they are built from.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::analyzers::types::{CircuitIncidents, IncidentSummary};
use crate::analyzers::utility::{pct, ratio};
use crate::records::{RaceOutcome, RaceResult};
use crate::status::StatusCategory;

/// Builds one [`RaceOutcome`] per race from individual results.
///
/// Races are keyed by season, circuit and round. Every result row counts as an
/// entrant; every non-completed row counts as a retirement.
pub fn derive_race_outcomes(results: &[RaceResult]) -> Vec<RaceOutcome> {
    let mut races: BTreeMap<(i32, Option<u32>, &str), RaceOutcome> = BTreeMap::new();

    for row in results {
        let race = races
            .entry((row.year, row.round, row.circuit_id.as_str()))
            .or_insert_with(|| RaceOutcome {
                year: row.year,
                circuit_id: row.circuit_id.clone(),
                date: None,
                crashes: 0,
                failures: 0,
                retirements: 0,
                entrants: 0,
            });

        race.entrants += 1;
        let category = row.category();
        if category.is_retirement() {
            race.retirements += 1;
        }
        match category {
            StatusCategory::Incident => race.crashes += 1,
            StatusCategory::TechnicalFailure => race.failures += 1,
            _ => {}
        }
    }

    races.into_values().collect()
}

#[derive(Default)]
struct CircuitTotals {
    races: usize,
    crashes: u32,
    failures: u32,
    retirements: u32,
    entrants: u32,
}

/// Incident statistics per circuit for the seasons in `years`.
///
/// Race counts and sums are taken over every race in the year range; only
/// afterwards are circuits with fewer than `min_race_count` races dropped, so
/// the rates of a qualifying circuit always use its true race count.
/// Per-race rates divide by the race count, per-entrant rates divide by the
/// number of starters and are expressed in percent.
pub fn circuit_incidents(
    races: &[RaceOutcome],
    years: RangeInclusive<i32>,
    min_race_count: usize,
) -> IncidentSummary {
    let mut totals: BTreeMap<&str, CircuitTotals> = BTreeMap::new();

    for race in races.iter().filter(|r| years.contains(&r.year)) {
        let t = totals.entry(race.circuit_id.as_str()).or_default();
        t.races += 1;
        t.crashes += race.crashes;
        t.failures += race.failures;
        t.retirements += race.retirements;
        t.entrants += race.entrants;
    }

    let circuits: Vec<CircuitIncidents> = totals
        .into_iter()
        .map(|(circuit_id, t)| {
            let race_count = t.races as f64;
            let entrants = t.entrants as f64;
            CircuitIncidents {
                circuit_id: circuit_id.to_string(),
                race_count: t.races,
                crashes: t.crashes,
                failures: t.failures,
                retirements: t.retirements,
                entrants: t.entrants,
                crashes_per_race: ratio(t.crashes as f64, race_count),
                failures_per_race: ratio(t.failures as f64, race_count),
                retirements_per_race: ratio(t.retirements as f64, race_count),
                crashes_per_entrant: pct(t.crashes as f64, entrants),
                failures_per_entrant: pct(t.failures as f64, entrants),
                retirements_per_entrant: pct(t.retirements as f64, entrants),
            }
        })
        .filter(|c| c.race_count >= min_race_count)
        .collect();

    if circuits.is_empty() {
        IncidentSummary::NoQualifyingCircuits
    } else {
        IncidentSummary::Circuits(circuits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::grid_finish::tests::result;

    fn race(
        year: i32,
        circuit: &str,
        crashes: u32,
        failures: u32,
        other: u32,
        entrants: u32,
    ) -> RaceOutcome {
        RaceOutcome {
            year,
            circuit_id: circuit.into(),
            date: None,
            crashes,
            failures,
            retirements: crashes + failures + other,
            entrants,
        }
    }

    #[test]
    fn test_zero_incidents_give_zero_rates() {
        let races = vec![race(2010, "monza", 0, 0, 0, 20), race(2011, "monza", 0, 0, 0, 20)];

        let summary = circuit_incidents(&races, 1994..=2024, 1);
        let circuit = &summary.circuits()[0];

        assert_eq!(circuit.race_count, 2);
        assert_eq!(circuit.crashes_per_race, 0.0);
        assert_eq!(circuit.crashes_per_entrant, 0.0);
        assert!(!circuit.crashes_per_entrant.is_nan());
    }

    #[test]
    fn test_rates() {
        let races = vec![race(2010, "spa", 2, 1, 1, 20), race(2011, "spa", 4, 3, 0, 20)];

        let summary = circuit_incidents(&races, 2010..=2011, 1);
        let spa = &summary.circuits()[0];

        assert_eq!(spa.crashes, 6);
        assert_eq!(spa.crashes_per_race, 3.0);
        assert_eq!(spa.failures_per_race, 2.0);
        assert_eq!(spa.retirements_per_race, 5.5);
        assert_eq!(spa.crashes_per_entrant, 15.0);
        assert_eq!(spa.retirements_per_entrant, 27.5);
    }

    #[test]
    fn test_min_race_count_applied_after_aggregation() {
        let races = vec![
            race(2010, "spa", 2, 0, 0, 20),
            race(2011, "spa", 0, 0, 0, 20),
            race(2012, "spa", 1, 0, 0, 20),
            race(2010, "imola", 5, 0, 0, 20),
        ];

        let summary = circuit_incidents(&races, 2010..=2012, 3);

        assert_eq!(summary.circuits().len(), 1);
        let spa = &summary.circuits()[0];
        assert_eq!(spa.circuit_id, "spa");
        assert_eq!(spa.race_count, 3);
        assert_eq!(spa.crashes_per_race, 1.0);
    }

    #[test]
    fn test_year_range_and_empty_result() {
        let races = vec![race(1995, "spa", 2, 0, 0, 20), race(2020, "spa", 1, 0, 0, 20)];

        let summary = circuit_incidents(&races, 2000..=2010, 1);
        assert_eq!(summary, IncidentSummary::NoQualifyingCircuits);
        assert!(summary.is_empty());
        assert!(summary.circuits().is_empty());

        let summary = circuit_incidents(&races, 2019..=2021, 1);
        assert_eq!(summary.circuits()[0].race_count, 1);
    }

    #[test]
    fn test_idempotent() {
        let races = vec![race(2010, "spa", 2, 1, 1, 20), race(2010, "monza", 0, 3, 0, 22)];

        let first = circuit_incidents(&races, 1994..=2024, 1);
        let second = circuit_incidents(&races, 1994..=2024, 1);

        assert_eq!(first, second);
    }

    #[test]
    fn test_derived_outcomes_respect_invariant() {
        let mut rows = vec![
            result("A", 1, Some(1), "Finished"),
            result("B", 2, Some(2), "+1 Lap"),
            result("C", 3, None, "Accident"),
            result("D", 4, None, "Engine"),
            result("E", 5, None, "Disqualified"),
        ];
        let mut other_race = result("A", 1, Some(1), "Finished");
        other_race.round = Some(2);
        other_race.circuit_id = "spa".into();
        rows.push(other_race);

        let outcomes = derive_race_outcomes(&rows);

        assert_eq!(outcomes.len(), 2);
        let monza = outcomes.iter().find(|r| r.circuit_id == "monza").unwrap();
        assert_eq!(monza.entrants, 5);
        assert_eq!(monza.crashes, 1);
        assert_eq!(monza.failures, 1);
        assert_eq!(monza.retirements, 3);
        for race in &outcomes {
            assert!(race.crashes + race.failures <= race.retirements);
            assert!(race.retirements <= race.entrants);
        }
    }
}
