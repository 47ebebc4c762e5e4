//! Dashboard configuration.
//!
//! Stored as a JSON object on disk; every field is optional:
//! ```json
//! {
//!   "data_dir": "data",
//!   "results_file": "f1_1994_2024_season_results.csv",
//!   "grid_ceiling": 29
//! }
//! ```
//! `F1_DATA_DIR` in the environment (or `.env`) overrides `data_dir`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub results_file: String,
    pub pitstops_file: String,
    /// Optional; derived from `results_file` when absent on disk.
    pub race_status_file: String,
    /// Optional; derived from `results_file` when absent on disk.
    pub weather_file: String,

    /// Exclusive upper bound on grid positions in the grid/finish matrix.
    pub grid_ceiling: u32,
    /// Highest finish position kept in the grid/finish matrix.
    pub finish_ceiling: u32,
    /// Highest grid position shown in the average-finish-by-grid view.
    pub placement_max_grid: u32,
    /// The circuit heatmap slider value is multiplied by this to get a minimum race count.
    pub circuit_slider_step: u32,
    /// Minimum distinct seasons for a driver to appear in the pit-stop dropdown.
    pub pitstop_min_seasons: usize,

    pub default_circuit: String,
    pub default_driver: String,
    pub default_min_races: usize,
    pub default_circuit_slider: u32,
    pub default_incident_min_races: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            results_file: "f1_1994_2024_season_results.csv".to_string(),
            pitstops_file: "merged_pitstops.csv".to_string(),
            race_status_file: "f1_1994_2024_categorized_by_race_status.csv".to_string(),
            weather_file: "crashes_and_weather.csv".to_string(),
            grid_ceiling: 29,
            finish_ceiling: 22,
            placement_max_grid: 27,
            circuit_slider_step: 20,
            pitstop_min_seasons: 3,
            default_circuit: "silverstone".to_string(),
            default_driver: "Max Verstappen".to_string(),
            default_min_races: 200,
            default_circuit_slider: 15,
            default_incident_min_races: 10,
        }
    }
}

impl DashboardConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid config '{}'", path.display()))?;
        Ok(config)
    }

    /// Loads `path` if given, otherwise the defaults, then applies `F1_DATA_DIR`.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Ok(dir) = std::env::var("F1_DATA_DIR") {
            if !dir.is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }

        Ok(config)
    }

    pub fn results_path(&self) -> PathBuf {
        self.data_dir.join(&self.results_file)
    }

    pub fn pitstops_path(&self) -> PathBuf {
        self.data_dir.join(&self.pitstops_file)
    }

    pub fn race_status_path(&self) -> PathBuf {
        self.data_dir.join(&self.race_status_file)
    }

    pub fn weather_path(&self) -> PathBuf {
        self.data_dir.join(&self.weather_file)
    }
}
