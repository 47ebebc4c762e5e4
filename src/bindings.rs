//! Widget state to chart wiring.
//!
//! Each method takes the values of the widgets a chart listens to and returns
//! everything the host needs to redraw: dropdown options, the value the
//! dropdown should show, the chart, and any info lines. Nothing is cached;
//! every call recomputes from the borrowed [`Dataset`].

use serde::Serialize;
use tracing::debug;

use crate::analyzers::filters::{
    circuits_with_min_races, drivers_with_min_races, drivers_with_min_seasons,
};
use crate::analyzers::grid_finish::{
    GridFinishMatrix, GridFinishOptions, driver_finish_counts, driver_grid_counts,
};
use crate::analyzers::incidents::circuit_incidents;
use crate::analyzers::pitstops::{analyze_race, driver_profile, race_names, race_years};
use crate::analyzers::placement::{average_finish_by_grid, driver_average_placement};
use crate::analyzers::yearly::yearly_incidents;
use crate::charts::grid::{
    capitalize, circuit_heatmap, driver_placements, driver_positions, placement_by_grid,
};
use crate::charts::pitstops::{
    NO_DATA, category_info, driver_category_boxplot, race_category_boxplot, race_pit_totals,
};
use crate::charts::retirements::{
    IncidentMode, average_yearly_retirements, incidents_by_circuit, total_incidents_by_year,
    weather_outcomes, yearly_retirement_rate,
};
use crate::charts::ChartSpec;
use crate::config::DashboardConfig;
use crate::loader::Dataset;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

impl DropdownOption {
    fn plain(value: &str) -> Self {
        Self {
            label: value.to_string(),
            value: value.to_string(),
        }
    }
}

/// Chart plus the dropdown state that goes with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionView {
    pub options: Vec<DropdownOption>,
    pub selected: Option<String>,
    pub chart: ChartSpec,
}

/// Pit-stop charts for one race or one driver, plus their info lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitStopView {
    pub charts: Vec<ChartSpec>,
    pub info: Vec<String>,
}

/// Parameters of the incidents-by-circuit chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncidentParams {
    pub start_year: i32,
    pub end_year: i32,
    pub min_race_count: usize,
    pub mode: IncidentMode,
}

pub struct Dashboard<'a> {
    data: &'a Dataset,
    config: &'a DashboardConfig,
}

impl<'a> Dashboard<'a> {
    pub fn new(data: &'a Dataset, config: &'a DashboardConfig) -> Self {
        Self { data, config }
    }

    pub fn config(&self) -> &DashboardConfig {
        self.config
    }

    pub fn data(&self) -> &Dataset {
        self.data
    }

    /// Drivers with at least `min_races` results, alphabetically.
    pub fn driver_options(&self, min_races: usize) -> Vec<DropdownOption> {
        let mut drivers = drivers_with_min_races(&self.data.results, min_races);
        drivers.sort();
        drivers.iter().map(|d| DropdownOption::plain(d)).collect()
    }

    /// Circuits with at least `min_races` results, alphabetically, labelled capitalized.
    pub fn circuit_options(&self, min_races: usize) -> Vec<DropdownOption> {
        let mut circuits = circuits_with_min_races(&self.data.results, min_races);
        circuits.sort();
        circuits
            .into_iter()
            .map(|c| DropdownOption {
                label: capitalize(&c),
                value: c,
            })
            .collect()
    }

    /// Grid and finish histograms of one driver.
    #[tracing::instrument(skip(self))]
    pub fn driver_positions(&self, driver: &str) -> ChartSpec {
        let grid = driver_grid_counts(&self.data.results, driver);
        let finish = driver_finish_counts(&self.data.results, driver);
        debug!(grid = grid.len(), finish = finish.len(), "Driver positions computed");
        driver_positions(driver, &grid, &finish)
    }

    /// Circuit heatmap. The slider value times `circuit_slider_step` is the
    /// minimum number of results a circuit needs to be offered. A selection
    /// that is no longer offered falls back to the first option, and to
    /// `default_circuit` when there are no options at all.
    #[tracing::instrument(skip(self))]
    pub fn circuit_heatmap(&self, slider_value: u32, selected: Option<&str>) -> SelectionView {
        let min_races = slider_value as usize * self.config.circuit_slider_step as usize;
        let options = self.circuit_options(min_races);

        let selected = match selected {
            Some(s) if options.iter().any(|o| o.value == s) => s.to_string(),
            _ => options
                .first()
                .map(|o| o.value.clone())
                .unwrap_or_else(|| self.config.default_circuit.clone()),
        };

        let grid_options = GridFinishOptions {
            ceiling: self.config.grid_ceiling,
            finish_ceiling: self.config.finish_ceiling,
            completed_only: false,
        };
        let matrix = GridFinishMatrix::build(
            self.data.results.iter().filter(|r| r.circuit_id == selected),
            &grid_options,
        );
        debug!(min_races, cells = matrix.cells.len(), "Heatmap matrix built");

        SelectionView {
            chart: circuit_heatmap(&selected, &matrix),
            options,
            selected: Some(selected),
        }
    }

    /// Average placement per driver for drivers with at least `min_races` results.
    #[tracing::instrument(skip(self))]
    pub fn driver_placements(&self, min_races: usize) -> ChartSpec {
        let eligible = drivers_with_min_races(&self.data.results, min_races);
        let all = driver_average_placement(&self.data.results, min_races);

        // completed-only averages cover the same drivers as the all-races series
        let mut completed = driver_average_placement(&self.data.completed_results, 0);
        completed.retain(|p| eligible.contains(&p.driver_name));

        driver_placements(min_races, &all, &completed)
    }

    /// Average finish by grid position, all races next to completed races.
    pub fn placement_by_grid(&self) -> ChartSpec {
        let series = average_finish_by_grid(
            &self.data.results,
            &self.data.completed_results,
            self.config.placement_max_grid,
        );
        placement_by_grid(&series)
    }

    /// Incidents per circuit over a year range.
    #[tracing::instrument(skip(self))]
    pub fn incidents(&self, params: IncidentParams) -> ChartSpec {
        let summary = circuit_incidents(
            &self.data.race_outcomes,
            params.start_year..=params.end_year,
            params.min_race_count,
        );
        if summary.is_empty() {
            debug!("No circuit meets the race threshold");
        }
        incidents_by_circuit(
            &summary,
            params.start_year,
            params.end_year,
            params.min_race_count,
            params.mode,
        )
    }

    /// First and last season present in the race outcome table.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let years = self.data.race_outcomes.iter().map(|r| r.year);
        let min = years.clone().min()?;
        let max = years.max()?;
        Some((min, max))
    }

    /// Yearly totals, retirement rate and retirements per race.
    pub fn yearly_charts(&self) -> Vec<ChartSpec> {
        let years = yearly_incidents(&self.data.race_outcomes);
        vec![
            total_incidents_by_year(&years),
            yearly_retirement_rate(&years),
            average_yearly_retirements(&years),
        ]
    }

    pub fn weather(&self) -> ChartSpec {
        weather_outcomes(&self.data.weather_outcomes)
    }

    pub fn pit_race_options(&self) -> Vec<DropdownOption> {
        race_names(&self.data.pit_stops)
            .iter()
            .map(|r| DropdownOption::plain(r))
            .collect()
    }

    /// Seasons for the year dropdown of `race_name`, and the default (earliest) one.
    pub fn pit_year_options(&self, race_name: &str) -> (Vec<DropdownOption>, Option<i32>) {
        let years = race_years(&self.data.pit_stops, race_name);
        let options = years
            .iter()
            .map(|y| DropdownOption::plain(&y.to_string()))
            .collect();
        (options, years.first().copied())
    }

    /// Box plot and bar chart of one race, with per-category info lines.
    #[tracing::instrument(skip(self))]
    pub fn pit_race(&self, race_name: Option<&str>, year: Option<i32>) -> PitStopView {
        let (Some(race_name), Some(year)) = (race_name, year) else {
            return PitStopView {
                charts: vec![ChartSpec::placeholder(NO_DATA), ChartSpec::placeholder(NO_DATA)],
                info: vec![NO_DATA.to_string()],
            };
        };

        let analysis = analyze_race(&self.data.pit_stops, race_name, year);
        PitStopView {
            charts: vec![race_category_boxplot(&analysis), race_pit_totals(&analysis)],
            info: category_info(
                "Total drivers",
                analysis.totals.len(),
                "drivers",
                &analysis.summaries,
            ),
        }
    }

    /// Drivers offered in the per-driver pit-stop dropdown.
    pub fn pit_driver_options(&self) -> Vec<DropdownOption> {
        drivers_with_min_seasons(&self.data.pit_stops, self.config.pitstop_min_seasons)
            .iter()
            .map(|d| DropdownOption::plain(d))
            .collect()
    }

    /// Career pit-stop box plot of one driver.
    #[tracing::instrument(skip(self))]
    pub fn pit_driver(&self, driver: &str) -> PitStopView {
        let profile = driver_profile(&self.data.pit_stops, driver);
        PitStopView {
            charts: vec![driver_category_boxplot(&profile)],
            info: category_info("Total races", profile.stops.len(), "races", &profile.summaries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::grid_finish::tests::result;
    use crate::records::{PitStop, RaceResult};

    fn at(circuit: &str, driver: &str, grid: u32, finish: u32) -> RaceResult {
        let mut row = result(driver, grid, Some(finish), "Finished");
        row.circuit_id = circuit.into();
        row
    }

    fn dataset() -> Dataset {
        let mut results = Vec::new();
        for i in 0..3 {
            results.push(at("monza", "Ann", 1 + i, 1 + i));
        }
        results.push(at("spa", "Bob", 2, 5));
        let stops = vec![PitStop {
            year: 2020,
            race_name: "Italian Grand Prix".into(),
            driver_name: "Ann".into(),
            stop: Some(1),
            lap: Some(20),
            duration: "23.5".into(),
            finish_position: Some(1),
            status: Some("Finished".into()),
        }];
        Dataset::from_parts(results, stops, None, None)
    }

    fn config() -> DashboardConfig {
        DashboardConfig {
            circuit_slider_step: 1,
            ..DashboardConfig::default()
        }
    }

    #[test]
    fn test_heatmap_selection_falls_back_to_first_option() {
        let data = dataset();
        let config = config();
        let dashboard = Dashboard::new(&data, &config);

        let view = dashboard.circuit_heatmap(2, Some("spa"));

        assert_eq!(
            view.options,
            vec![DropdownOption {
                label: "Monza".into(),
                value: "monza".into(),
            }]
        );
        assert_eq!(view.selected.as_deref(), Some("monza"));
        assert!(!view.chart.is_placeholder());
    }

    #[test]
    fn test_heatmap_keeps_valid_selection() {
        let data = dataset();
        let config = config();
        let dashboard = Dashboard::new(&data, &config);

        let view = dashboard.circuit_heatmap(1, Some("spa"));

        assert_eq!(view.options.len(), 2);
        assert_eq!(view.selected.as_deref(), Some("spa"));
    }

    #[test]
    fn test_heatmap_without_options_uses_default_circuit() {
        let data = dataset();
        let config = config();
        let dashboard = Dashboard::new(&data, &config);

        let view = dashboard.circuit_heatmap(100, None);

        assert!(view.options.is_empty());
        assert_eq!(view.selected.as_deref(), Some("silverstone"));
        assert!(view.chart.is_placeholder());
    }

    #[test]
    fn test_incidents_placeholder_when_threshold_unmet() {
        let data = dataset();
        let config = config();
        let dashboard = Dashboard::new(&data, &config);

        let chart = dashboard.incidents(IncidentParams {
            start_year: 2010,
            end_year: 2010,
            min_race_count: 5,
            mode: IncidentMode::PerRace,
        });

        assert!(chart.is_placeholder());
    }

    #[test]
    fn test_pit_race_without_selection() {
        let data = dataset();
        let config = config();
        let dashboard = Dashboard::new(&data, &config);

        let view = dashboard.pit_race(Some("Italian Grand Prix"), None);
        assert!(view.charts.iter().all(|c| c.is_placeholder()));

        let (options, default_year) = dashboard.pit_year_options("Italian Grand Prix");
        assert_eq!(options.len(), 1);
        assert_eq!(default_year, Some(2020));

        let view = dashboard.pit_race(Some("Italian Grand Prix"), default_year);
        assert_eq!(view.info[0], "Total drivers: 1");
    }

    #[test]
    fn test_driver_options_sorted() {
        let data = dataset();
        let config = config();
        let dashboard = Dashboard::new(&data, &config);

        let options = dashboard.driver_options(1);
        let names: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Bob"]);
        assert_eq!(dashboard.driver_options(2).len(), 1);
    }
}
