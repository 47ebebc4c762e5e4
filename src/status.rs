//! Classification of free-text race status strings.

use serde::Serialize;
use std::fmt;

/// Outcome bucket for a race entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StatusCategory {
    /// Finished, or lapped but still classified.
    Completed,
    /// Accidents, collisions, spins and other driving incidents.
    Incident,
    /// Mechanical or electrical failure of the car.
    TechnicalFailure,
    /// Everything else (disqualification, withdrawal, unknown strings).
    Other,
}

impl StatusCategory {
    pub fn label(&self) -> &'static str {
        match self {
            StatusCategory::Completed => "Completed",
            StatusCategory::Incident => "Race Incident/Crash",
            StatusCategory::TechnicalFailure => "Technical Failure",
            StatusCategory::Other => "Other",
        }
    }

    pub fn is_retirement(&self) -> bool {
        !matches!(self, StatusCategory::Completed)
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

static INCIDENT_STATUSES: &[&str] = &[
    "accident",
    "collision",
    "collision damage",
    "spun off",
    "damage",
    "debris",
    "fatal accident",
    "puncture",
    "injury",
    "injured",
    "eye injury",
];

static TECHNICAL_STATUSES: &[&str] = &[
    "engine",
    "engine fire",
    "engine misfire",
    "gearbox",
    "transmission",
    "clutch",
    "hydraulics",
    "electrical",
    "electronics",
    "electrical loom",
    "brakes",
    "suspension",
    "steering",
    "throttle",
    "driveshaft",
    "halfshaft",
    "differential",
    "wheel",
    "wheel nut",
    "wheel rim",
    "wheel bearing",
    "tyre",
    "power unit",
    "power loss",
    "turbo",
    "ers",
    "battery",
    "fuel system",
    "fuel pressure",
    "fuel pump",
    "fuel leak",
    "fuel",
    "oil leak",
    "oil pressure",
    "oil line",
    "oil pump",
    "water leak",
    "water pressure",
    "water pump",
    "radiator",
    "cooling system",
    "overheating",
    "exhaust",
    "mechanical",
    "technical",
    "pneumatics",
    "vibrations",
    "alternator",
    "spark plugs",
    "front wing",
    "rear wing",
    "fire",
    "out of fuel",
    "refuelling",
    "undertray",
    "distributor",
    "seat",
    "drivetrain",
    "launch control",
    "handling",
    "brake duct",
];

/// Maps a race status string to its [`StatusCategory`].
///
/// Matching is case-insensitive and ignores surrounding whitespace. Strings that
/// are not recognised map to [`StatusCategory::Other`].
pub fn classify_status(status: &str) -> StatusCategory {
    let normalized = status.trim().to_ascii_lowercase();

    if normalized == "finished" || normalized == "lapped" || is_laps_down(&normalized) {
        return StatusCategory::Completed;
    }

    if INCIDENT_STATUSES.contains(&normalized.as_str()) {
        return StatusCategory::Incident;
    }

    if TECHNICAL_STATUSES.contains(&normalized.as_str()) {
        return StatusCategory::TechnicalFailure;
    }

    StatusCategory::Other
}

/// `+1 Lap`, `+12 Laps`.
fn is_laps_down(status: &str) -> bool {
    let Some(rest) = status.strip_prefix('+') else {
        return false;
    };
    let Some((count, unit)) = rest.split_once(' ') else {
        return false;
    };

    !count.is_empty()
        && count.bytes().all(|b| b.is_ascii_digit())
        && (unit == "lap" || unit == "laps")
}
