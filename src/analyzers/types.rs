//! Result types produced by the analyzers.

use serde::Serialize;
use std::fmt;

/// Occurrence count of one (grid, finish) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridFinishCell {
    pub grid_position: u32,
    pub finish_position: u32,
    pub count: usize,
}

/// Occurrence count of a single position (grid or finish) for one driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionCount {
    pub position: u32,
    pub count: usize,
}

/// Incident totals and rates for one circuit over a year range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitIncidents {
    pub circuit_id: String,
    pub race_count: usize,
    pub crashes: u32,
    pub failures: u32,
    pub retirements: u32,
    pub entrants: u32,

    pub crashes_per_race: f64,
    pub failures_per_race: f64,
    pub retirements_per_race: f64,

    /// Percent of all entrants at this circuit.
    pub crashes_per_entrant: f64,
    pub failures_per_entrant: f64,
    pub retirements_per_entrant: f64,
}

/// Outcome of the incident-rate calculation.
///
/// An empty result is its own variant so callers cannot hand a zero-row table
/// to a chart builder by accident.
#[derive(Debug, Clone, PartialEq)]
pub enum IncidentSummary {
    NoQualifyingCircuits,
    Circuits(Vec<CircuitIncidents>),
}

impl IncidentSummary {
    pub fn is_empty(&self) -> bool {
        matches!(self, IncidentSummary::NoQualifyingCircuits)
    }

    pub fn circuits(&self) -> &[CircuitIncidents] {
        match self {
            IncidentSummary::NoQualifyingCircuits => &[],
            IncidentSummary::Circuits(rows) => rows,
        }
    }
}

/// Mean finishing position for one starting position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacementPoint {
    pub grid_position: u32,
    pub avg_finish: f64,
    pub races: usize,
}

/// The two average-finish series shown side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementSeries {
    pub all_races: Vec<PlacementPoint>,
    pub completed_races: Vec<PlacementPoint>,
}

/// Mean finishing position of one driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverPlacement {
    pub driver_name: String,
    pub avg_placement: f64,
}

/// Per-season incident totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyIncidents {
    pub year: i32,
    pub race_count: usize,
    pub crashes: u32,
    pub failures: u32,
    pub retirements: u32,
    pub entrants: u32,
    /// Percent of entrants that retired.
    pub retirement_rate: f64,
    pub retirements_per_race: f64,
}

/// Pit-stop speed bucket from the quantile tri-partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DurationCategory {
    Fast,
    Average,
    Slow,
}

impl DurationCategory {
    pub const ALL: [DurationCategory; 3] = [
        DurationCategory::Fast,
        DurationCategory::Average,
        DurationCategory::Slow,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DurationCategory::Fast => "Fast",
            DurationCategory::Average => "Average",
            DurationCategory::Slow => "Slow",
        }
    }
}

impl fmt::Display for DurationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Size and duration range of one category. `range` is `None` when no row fell
/// into the category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: DurationCategory,
    pub count: usize,
    pub range: Option<(f64, f64)>,
}

/// Total pit time of one driver in one race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverPitTotal {
    pub driver_name: String,
    pub finish_position: u32,
    pub total_duration: f64,
    pub stops: usize,
}
