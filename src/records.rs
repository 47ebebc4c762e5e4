//! Typed rows for the CSV sources.
//!
//! Column names are fixed by the exported datasets; a missing required column
//! fails at deserialization time instead of surfacing later as an empty series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::status::{StatusCategory, classify_status};

/// Weather state at race time. Only recorded from the 2005 season onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Condition {
    Dry,
    Mixed,
    Wet,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Dry => "Dry",
            Condition::Mixed => "Mixed",
            Condition::Wet => "Wet",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One driver's result in one race.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RaceResult {
    pub year: i32,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub round: Option<u32>,
    #[serde(default)]
    pub race_name: Option<String>,
    pub circuit_id: String,
    pub driver_name: String,
    /// 0 means a pit-lane start or an unknown grid slot.
    pub grid_position: u32,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub finish_position: Option<u32>,
    pub status: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub condition: Option<Condition>,
}

impl RaceResult {
    pub fn category(&self) -> StatusCategory {
        classify_status(&self.status)
    }

    pub fn is_completed(&self) -> bool {
        self.category() == StatusCategory::Completed
    }
}

/// A single pit stop. `duration` is kept as the raw text from the export and
/// converted with [`crate::duration::parse_duration`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PitStop {
    pub year: i32,
    pub race_name: String,
    pub driver_name: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub stop: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub lap: Option<u32>,
    #[serde(default)]
    pub duration: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub finish_position: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
}

impl PitStop {
    /// A stop counts as part of a completed race when the driver was classified
    /// as finished (including lapped finishers).
    pub fn race_completed(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| classify_status(s) == StatusCategory::Completed)
            .unwrap_or(false)
    }
}

/// Outcome counts for one race, as stored in the categorized race status export.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RaceOutcome {
    pub year: i32,
    pub circuit_id: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "Race Incident/Crash")]
    pub crashes: u32,
    #[serde(rename = "Technical Failure")]
    pub failures: u32,
    #[serde(rename = "Total_Retirements")]
    pub retirements: u32,
    /// Number of cars that started the race.
    #[serde(rename = "Total")]
    pub entrants: u32,
}

impl RaceOutcome {
    /// Crashes and failures are part of the retirements, which cannot exceed
    /// the number of cars that started.
    pub fn is_consistent(&self) -> bool {
        self.crashes.saturating_add(self.failures) <= self.retirements
            && self.retirements <= self.entrants
    }
}

/// Precomputed outcome ratios per weather condition.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeatherOutcome {
    #[serde(rename = "Condition")]
    pub condition: Condition,
    pub incidents_ratio: f64,
    pub technical_ratio: f64,
    pub completed_ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_result_optional_columns() {
        let data = "year,circuit_id,driver_name,grid_position,finish_position,status,condition\n\
                    2010,monza,Fernando Alonso,1,1,Finished,Dry\n\
                    1998,monza,Mika Hakkinen,1,,Brakes,\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<RaceResult> = rdr.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].condition, Some(Condition::Dry));
        assert_eq!(rows[0].finish_position, Some(1));
        assert!(rows[0].is_completed());
        assert_eq!(rows[1].finish_position, None);
        assert_eq!(rows[1].condition, None);
        assert_eq!(rows[1].round, None);
        assert!(!rows[1].is_completed());
    }

    #[test]
    fn test_race_outcome_renamed_columns() {
        let data = "year,circuit_id,date,Race Incident/Crash,Technical Failure,Total_Retirements,Total\n\
                    2001,suzuka,2001-10-14,2,3,6,22\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let row: RaceOutcome = rdr.deserialize().next().unwrap().unwrap();

        assert_eq!(row.crashes, 2);
        assert_eq!(row.failures, 3);
        assert_eq!(row.retirements, 6);
        assert_eq!(row.entrants, 22);
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2001, 10, 14));
    }

    #[test]
    fn test_race_outcome_consistency() {
        let mut row = RaceOutcome {
            year: 2001,
            circuit_id: "suzuka".into(),
            date: None,
            crashes: 2,
            failures: 3,
            retirements: 6,
            entrants: 22,
        };
        assert!(row.is_consistent());

        row.retirements = 4;
        assert!(!row.is_consistent());

        row.retirements = 23;
        assert!(!row.is_consistent());

        row.retirements = 22;
        assert!(row.is_consistent());
    }

    #[test]
    fn test_pit_stop_race_completed() {
        let mut stop = PitStop {
            year: 2020,
            race_name: "Italian Grand Prix".into(),
            driver_name: "Pierre Gasly".into(),
            stop: Some(1),
            lap: Some(20),
            duration: "24.1".into(),
            finish_position: Some(1),
            status: Some("Finished".into()),
        };
        assert!(stop.race_completed());

        stop.status = Some("+1 Lap".into());
        assert!(stop.race_completed());

        stop.status = Some("Engine".into());
        assert!(!stop.race_completed());

        stop.status = None;
        assert!(!stop.race_completed());
    }
}
