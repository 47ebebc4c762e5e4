//! CSV loading and the in-memory [`Dataset`].
//!
//! The dataset is read once by the composition root and only borrowed
//! afterwards. Files ending in `.gz` are decompressed on the fly.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::analyzers::incidents::derive_race_outcomes;
use crate::analyzers::pitstops::{TimedStop, timed_stops};
use crate::analyzers::weather::weather_outcome_rates;
use crate::config::DashboardConfig;
use crate::records::{PitStop, RaceOutcome, RaceResult, WeatherOutcome};

/// Reads every row of a CSV file into `T`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, a required column is
/// missing, or a row cannot be deserialized. The path and 1-based data row
/// are attached to the error.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;

    let is_gzip = path.extension().and_then(|e| e.to_str()) == Some("gz");
    let reader: Box<dyn Read> = if is_gzip {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let rows =
        read_csv_from(reader).with_context(|| format!("failed to load '{}'", path.display()))?;
    debug!(path = %path.display(), rows = rows.len(), gzip = is_gzip, "CSV loaded");
    Ok(rows)
}

/// Reads CSV rows from any reader. Headers and fields are trimmed.
pub fn read_csv_from<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, result) in rdr.deserialize().enumerate() {
        let record: T = result.with_context(|| format!("invalid row {}", index + 1))?;
        rows.push(record);
    }

    Ok(rows)
}

/// All source tables, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub results: Vec<RaceResult>,
    /// `results` restricted to classified finishers.
    pub completed_results: Vec<RaceResult>,
    /// Pit stops with a parseable duration.
    pub pit_stops: Vec<TimedStop>,
    pub race_outcomes: Vec<RaceOutcome>,
    pub weather_outcomes: Vec<WeatherOutcome>,
}

impl Dataset {
    /// Loads every source file named in `config`.
    ///
    /// The categorized race status and weather files are optional: when they
    /// are missing the corresponding tables are derived from the results.
    #[tracing::instrument(skip(config), fields(data_dir = %config.data_dir.display()))]
    pub fn load(config: &DashboardConfig) -> Result<Self> {
        let results: Vec<RaceResult> = read_csv(&config.results_path())?;
        let pit_stops: Vec<PitStop> = read_csv(&config.pitstops_path())?;

        let race_outcomes = load_optional(&config.race_status_path())?;
        let weather_outcomes = load_optional(&config.weather_path())?;

        let dataset = Self::from_parts(results, pit_stops, race_outcomes, weather_outcomes);

        info!(
            results = dataset.results.len(),
            completed = dataset.completed_results.len(),
            pit_stops = dataset.pit_stops.len(),
            races = dataset.race_outcomes.len(),
            conditions = dataset.weather_outcomes.len(),
            "Dataset loaded"
        );

        Ok(dataset)
    }

    /// Assembles a dataset from already-parsed rows, deriving whatever is `None`.
    pub fn from_parts(
        results: Vec<RaceResult>,
        pit_stops: Vec<PitStop>,
        race_outcomes: Option<Vec<RaceOutcome>>,
        weather_outcomes: Option<Vec<WeatherOutcome>>,
    ) -> Self {
        let completed_results = results.iter().filter(|r| r.is_completed()).cloned().collect();

        let raw_stops = pit_stops.len();
        let pit_stops = timed_stops(&pit_stops);
        if pit_stops.len() < raw_stops {
            debug!(
                dropped = raw_stops - pit_stops.len(),
                "Dropped pit stops without a valid duration"
            );
        }

        let race_outcomes = match race_outcomes {
            Some(rows) => consistent_outcomes(rows),
            None => derive_race_outcomes(&results),
        };
        let weather_outcomes = weather_outcomes.unwrap_or_else(|| weather_outcome_rates(&results));

        Self {
            results,
            completed_results,
            pit_stops,
            race_outcomes,
            weather_outcomes,
        }
    }
}

/// Drops race status rows whose counts contradict each other.
fn consistent_outcomes(rows: Vec<RaceOutcome>) -> Vec<RaceOutcome> {
    let (kept, rejected): (Vec<_>, Vec<_>) = rows.into_iter().partition(|r| r.is_consistent());
    for row in &rejected {
        warn!(
            year = row.year,
            circuit = %row.circuit_id,
            crashes = row.crashes,
            failures = row.failures,
            retirements = row.retirements,
            entrants = row.entrants,
            "Dropping race status row with inconsistent counts"
        );
    }
    kept
}

fn load_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    if !path.exists() {
        warn!(path = %path.display(), "Optional source missing, deriving from results");
        return Ok(None);
    }
    read_csv(path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::env;
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;

    const RESULTS: &str = "year,circuit_id,driver_name,grid_position,finish_position,status,condition\n\
                           2010,monza,A,1,1,Finished,Dry\n\
                           2010,monza,B,2,2,Engine,Dry\n";

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_read_csv_from_trims_fields() {
        let data = "year , circuit_id,driver_name,grid_position,finish_position,status\n\
                    2010, monza , A ,1,1, Finished\n";
        let rows: Vec<RaceResult> = read_csv_from(data.as_bytes()).unwrap();
        assert_eq!(rows[0].circuit_id, "monza");
        assert_eq!(rows[0].status, "Finished");
    }

    #[test]
    fn test_missing_required_column_fails() {
        let data = "year,circuit_id,driver_name,finish_position,status\n2010,monza,A,1,Finished\n";
        let result: Result<Vec<RaceResult>> = read_csv_from(data.as_bytes());
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("grid_position"));
    }

    #[test]
    fn test_read_gzip_csv() {
        let path = temp_path("f1_insights_test_results.csv.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(RESULTS.as_bytes()).unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let rows: Vec<RaceResult> = read_csv(&path).unwrap();
        assert_eq!(rows.len(), 2);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_csv_missing_file_mentions_path() {
        let path = temp_path("f1_insights_no_such_file.csv");
        let err = read_csv::<RaceResult>(&path).unwrap_err();
        assert!(err.to_string().contains("f1_insights_no_such_file.csv"));
    }

    #[test]
    fn test_from_parts_derives_missing_tables() {
        let results: Vec<RaceResult> = read_csv_from(RESULTS.as_bytes()).unwrap();
        let stops: Vec<PitStop> = read_csv_from(
            "year,race_name,driver_name,duration,finish_position,status\n\
             2010,Italian Grand Prix,A,22.5,1,Finished\n\
             2010,Italian Grand Prix,B,,2,Engine\n"
                .as_bytes(),
        )
        .unwrap();

        let dataset = Dataset::from_parts(results, stops, None, None);

        assert_eq!(dataset.completed_results.len(), 1);
        assert_eq!(dataset.pit_stops.len(), 1);
        assert_eq!(dataset.race_outcomes.len(), 1);
        assert_eq!(dataset.race_outcomes[0].failures, 1);
        assert_eq!(dataset.weather_outcomes.len(), 1);
    }

    #[test]
    fn test_inconsistent_race_status_rows_dropped() {
        let path = temp_path("f1_insights_test_race_status.csv");
        fs::write(
            &path,
            "year,circuit_id,date,Race Incident/Crash,Technical Failure,Total_Retirements,Total\n\
             2010,monza,2010-09-12,1,1,3,24\n\
             2010,spa,2010-08-29,4,2,3,24\n\
             2010,suzuka,2010-10-10,0,0,30,24\n",
        )
        .unwrap();

        let outcomes: Vec<RaceOutcome> = read_csv(&path).unwrap();
        let dataset = Dataset::from_parts(vec![], vec![], Some(outcomes), Some(vec![]));

        assert_eq!(dataset.race_outcomes.len(), 1);
        assert_eq!(dataset.race_outcomes[0].circuit_id, "monza");

        fs::remove_file(&path).unwrap();
    }
}
