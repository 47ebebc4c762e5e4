use std::collections::BTreeMap;

use crate::analyzers::types::YearlyIncidents;
use crate::analyzers::utility::{pct, ratio};
use crate::records::RaceOutcome;

/// Sums race outcomes per season, oldest season first.
pub fn yearly_incidents(races: &[RaceOutcome]) -> Vec<YearlyIncidents> {
    let mut years: BTreeMap<i32, YearlyIncidents> = BTreeMap::new();

    for race in races {
        let y = years.entry(race.year).or_insert_with(|| YearlyIncidents {
            year: race.year,
            race_count: 0,
            crashes: 0,
            failures: 0,
            retirements: 0,
            entrants: 0,
            retirement_rate: 0.0,
            retirements_per_race: 0.0,
        });
        y.race_count += 1;
        y.crashes += race.crashes;
        y.failures += race.failures;
        y.retirements += race.retirements;
        y.entrants += race.entrants;
    }

    years
        .into_values()
        .map(|mut y| {
            y.retirement_rate = pct(y.retirements as f64, y.entrants as f64);
            y.retirements_per_race = ratio(y.retirements as f64, y.race_count as f64);
            y
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn race(year: i32, retirements: u32, entrants: u32) -> RaceOutcome {
        RaceOutcome {
            year,
            circuit_id: "monza".into(),
            date: None,
            crashes: retirements / 2,
            failures: retirements - retirements / 2,
            retirements,
            entrants,
        }
    }

    #[test]
    fn test_yearly_breakdown() {
        let races = vec![race(2001, 10, 22), race(1999, 4, 20), race(2001, 6, 22)];

        let years = yearly_incidents(&races);

        assert_eq!(years.len(), 2);
        assert_eq!(years[0].year, 1999);
        assert_eq!(years[1].race_count, 2);
        assert_eq!(years[1].retirements, 16);
        assert_eq!(years[1].retirements_per_race, 8.0);
        assert_eq!(years[0].retirement_rate, 20.0);
        assert_eq!(years[1].crashes + years[1].failures, 16);
    }

    #[test]
    fn test_empty_input() {
        assert!(yearly_incidents(&[]).is_empty());
    }
}
