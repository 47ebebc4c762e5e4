//! Serializable page model: which charts and widgets each route shows, with
//! the widgets at their initial values and the charts computed for them.

use serde::Serialize;
use tracing::debug;

use crate::bindings::{Dashboard, DropdownOption, IncidentParams};
use crate::charts::retirements::IncidentMode;
use crate::charts::ChartSpec;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Widget {
    Slider {
        id: String,
        label: String,
        min: u32,
        max: u32,
        step: u32,
        value: u32,
    },
    RangeSlider {
        id: String,
        label: String,
        min: i32,
        max: i32,
        value: [i32; 2],
    },
    Dropdown {
        id: String,
        label: String,
        options: Vec<DropdownOption>,
        value: Option<String>,
    },
}

impl Widget {
    pub fn id(&self) -> &str {
        match self {
            Widget::Slider { id, .. }
            | Widget::RangeSlider { id, .. }
            | Widget::Dropdown { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub heading: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub widgets: Vec<Widget>,
    pub charts: Vec<ChartSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub info: Vec<String>,
}

impl Section {
    fn new(heading: &str) -> Self {
        Self {
            heading: heading.to_string(),
            text: None,
            widgets: Vec::new(),
            charts: Vec::new(),
            info: Vec::new(),
        }
    }

    fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    fn widget(mut self, widget: Widget) -> Self {
        self.widgets.push(widget);
        self
    }

    fn chart(mut self, chart: ChartSpec) -> Self {
        self.charts.push(chart);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub route: String,
    pub title: String,
    pub sections: Vec<Section>,
}

impl Page {
    /// File name used when the page is written to disk, `/` -> `home`.
    pub fn slug(&self) -> String {
        match self.route.trim_matches('/') {
            "" => "home".to_string(),
            route => route.replace('/', "_"),
        }
    }
}

/// Builds every page with its widgets at their initial values.
#[tracing::instrument(skip(dashboard))]
pub fn build_pages(dashboard: &Dashboard) -> Vec<Page> {
    let pages = vec![
        home_page(),
        grid_position_page(dashboard),
        retirements_page(dashboard),
        pit_stops_page(dashboard),
        about_page(dashboard),
    ];
    debug!(pages = pages.len(), "Pages built");
    pages
}

fn home_page() -> Page {
    Page {
        route: "/".to_string(),
        title: "F1 Insights".to_string(),
        sections: vec![Section::new("Research questions").text(
            "How much does grid position decide the result, where and why do cars retire, \
             and does a faster pit crew pay off?",
        )],
    }
}

fn grid_position_page(dashboard: &Dashboard) -> Page {
    let config = dashboard.config();

    let heatmap =
        dashboard.circuit_heatmap(config.default_circuit_slider, Some(&config.default_circuit));
    let heatmap_section = Section::new("Grid and finish position per circuit")
        .widget(Widget::Slider {
            id: "circuit-min-races".to_string(),
            label: format!("Minimum races (x{})", config.circuit_slider_step),
            min: 0,
            max: 50,
            step: 1,
            value: config.default_circuit_slider,
        })
        .widget(Widget::Dropdown {
            id: "circuit".to_string(),
            label: "Circuit".to_string(),
            options: heatmap.options,
            value: heatmap.selected,
        })
        .chart(heatmap.chart);

    let drivers = dashboard.driver_options(config.default_min_races);
    let driver_section = Section::new("Grid and finish positions of a driver")
        .widget(Widget::Slider {
            id: "driver-count".to_string(),
            label: "Minimum races driven".to_string(),
            min: 0,
            max: 400,
            step: 10,
            value: config.default_min_races as u32,
        })
        .widget(Widget::Dropdown {
            id: "driver".to_string(),
            label: "Driver".to_string(),
            options: drivers,
            value: Some(config.default_driver.clone()),
        })
        .chart(dashboard.driver_positions(&config.default_driver));

    let placement_section = Section::new("Average placement")
        .widget(Widget::Slider {
            id: "driver-min-races".to_string(),
            label: "Minimum races driven".to_string(),
            min: 0,
            max: 400,
            step: 10,
            value: config.default_min_races as u32,
        })
        .chart(dashboard.driver_placements(config.default_min_races))
        .chart(dashboard.placement_by_grid());

    Page {
        route: "/grid-position".to_string(),
        title: "Grid position".to_string(),
        sections: vec![heatmap_section, driver_section, placement_section],
    }
}

fn retirements_page(dashboard: &Dashboard) -> Page {
    let config = dashboard.config();
    let (start_year, end_year) = dashboard.year_bounds().unwrap_or((1994, 2024));

    let params = IncidentParams {
        start_year,
        end_year,
        min_race_count: config.default_incident_min_races,
        mode: IncidentMode::default(),
    };
    let circuit_section = Section::new("Incidents per circuit")
        .widget(Widget::RangeSlider {
            id: "incident-years".to_string(),
            label: "Seasons".to_string(),
            min: start_year,
            max: end_year,
            value: [start_year, end_year],
        })
        .widget(Widget::Slider {
            id: "incident-min-races".to_string(),
            label: "Minimum races at circuit".to_string(),
            min: 0,
            max: 30,
            step: 1,
            value: config.default_incident_min_races as u32,
        })
        .widget(Widget::Dropdown {
            id: "incident-mode".to_string(),
            label: "Normalization".to_string(),
            options: [IncidentMode::PerRace, IncidentMode::Rate]
                .iter()
                .map(|m| DropdownOption {
                    label: m.to_string(),
                    value: m.to_string(),
                })
                .collect(),
            value: Some(params.mode.to_string()),
        })
        .chart(dashboard.incidents(params));

    let mut yearly_section = Section::new("Retirements over the years");
    yearly_section.charts = dashboard.yearly_charts();

    let weather_section = Section::new("Weather").chart(dashboard.weather());

    Page {
        route: "/retirements".to_string(),
        title: "Retirements".to_string(),
        sections: vec![circuit_section, yearly_section, weather_section],
    }
}

fn pit_stops_page(dashboard: &Dashboard) -> Page {
    let races = dashboard.pit_race_options();
    let race = races.first().map(|r| r.value.clone());
    let (years, year) = match race.as_deref() {
        Some(race) => dashboard.pit_year_options(race),
        None => (Vec::new(), None),
    };
    let race_view = dashboard.pit_race(race.as_deref(), year);

    let mut race_section = Section::new("Pit stops per race")
        .widget(Widget::Dropdown {
            id: "pit-race".to_string(),
            label: "Race".to_string(),
            options: races,
            value: race,
        })
        .widget(Widget::Dropdown {
            id: "pit-year".to_string(),
            label: "Season".to_string(),
            options: years,
            value: year.map(|y| y.to_string()),
        });
    race_section.charts = race_view.charts;
    race_section.info = race_view.info;

    let drivers = dashboard.pit_driver_options();
    let default_driver = &dashboard.config().default_driver;
    let driver = drivers
        .iter()
        .find(|d| &d.value == default_driver)
        .or_else(|| drivers.first())
        .map(|d| d.value.clone());
    let mut driver_section = Section::new("Pit stops per driver").widget(Widget::Dropdown {
        id: "pit-driver".to_string(),
        label: "Driver".to_string(),
        options: drivers,
        value: driver.clone(),
    });
    if let Some(driver) = driver {
        let view = dashboard.pit_driver(&driver);
        driver_section.charts = view.charts;
        driver_section.info = view.info;
    }

    Page {
        route: "/pit-stops".to_string(),
        title: "Pit stops".to_string(),
        sections: vec![race_section, driver_section],
    }
}

fn about_page(dashboard: &Dashboard) -> Page {
    let data = dashboard.data();
    let config = dashboard.config();
    let sources = Section::new("Sources").text(&format!(
        "{} race results ({}), {} timed pit stops ({}), {} races, {} weather conditions.",
        data.results.len(),
        config.results_file,
        data.pit_stops.len(),
        config.pitstops_file,
        data.race_outcomes.len(),
        data.weather_outcomes.len(),
    ));

    Page {
        route: "/about-data".to_string(),
        title: "About the data".to_string(),
        sections: vec![sources],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::grid_finish::tests::result;
    use crate::config::DashboardConfig;
    use crate::loader::Dataset;
    use crate::records::PitStop;

    #[test]
    fn test_routes() {
        let rows = vec![result("Ann", 1, Some(1), "Finished")];
        let data = Dataset::from_parts(rows, vec![], None, None);
        let config = DashboardConfig::default();
        let dashboard = Dashboard::new(&data, &config);

        let pages = build_pages(&dashboard);
        let routes: Vec<&str> = pages.iter().map(|p| p.route.as_str()).collect();

        assert_eq!(
            routes,
            vec!["/", "/grid-position", "/retirements", "/pit-stops", "/about-data"]
        );
        assert_eq!(pages[0].slug(), "home");
        assert_eq!(pages[1].slug(), "grid-position");
    }

    #[test]
    fn test_widget_defaults_follow_config() {
        let rows = vec![result("Ann", 1, Some(1), "Finished")];
        let data = Dataset::from_parts(rows, vec![], None, None);
        let config = DashboardConfig::default();
        let dashboard = Dashboard::new(&data, &config);

        let pages = build_pages(&dashboard);
        let slider = pages[1].sections[0]
            .widgets
            .iter()
            .find(|w| w.id() == "circuit-min-races");

        assert!(matches!(slider, Some(Widget::Slider { value: 15, .. })));
        // one result cannot reach 15 * 20 races, so the default circuit stays selected
        assert!(matches!(
            &pages[1].sections[0].widgets[1],
            Widget::Dropdown { value: Some(v), .. } if v == "silverstone"
        ));
    }

    #[test]
    fn test_driver_section_has_race_count_slider() {
        let rows = vec![result("Ann", 1, Some(1), "Finished")];
        let data = Dataset::from_parts(rows, vec![], None, None);
        let config = DashboardConfig::default();
        let dashboard = Dashboard::new(&data, &config);

        let pages = build_pages(&dashboard);
        let slider = pages[1].sections[1]
            .widgets
            .iter()
            .find(|w| w.id() == "driver-count");

        assert!(matches!(
            slider,
            Some(Widget::Slider {
                min: 0,
                max: 400,
                step: 10,
                value: 200,
                ..
            })
        ));
    }

    #[test]
    fn test_pit_driver_defaults_to_configured_driver() {
        let stops: Vec<PitStop> = ["Ann", "Bob"]
            .iter()
            .flat_map(|driver| {
                (2018..=2020).map(move |year| PitStop {
                    year,
                    race_name: "Italian Grand Prix".into(),
                    driver_name: driver.to_string(),
                    stop: Some(1),
                    lap: Some(20),
                    duration: "23.5".into(),
                    finish_position: Some(1),
                    status: Some("Finished".into()),
                })
            })
            .collect();
        let data = Dataset::from_parts(vec![], stops, None, None);
        let dropdown_value = |config: &DashboardConfig| {
            let dashboard = Dashboard::new(&data, config);
            match &pit_stops_page(&dashboard).sections[1].widgets[0] {
                Widget::Dropdown { value, .. } => value.clone(),
                _ => None,
            }
        };

        let config = DashboardConfig {
            default_driver: "Bob".to_string(),
            ..DashboardConfig::default()
        };
        assert_eq!(dropdown_value(&config).as_deref(), Some("Bob"));

        // not among the options: first driver instead
        assert_eq!(dropdown_value(&DashboardConfig::default()).as_deref(), Some("Ann"));
    }

    #[test]
    fn test_empty_pit_stops_give_placeholders() {
        let data = Dataset::default();
        let config = DashboardConfig::default();
        let dashboard = Dashboard::new(&data, &config);

        let pages = build_pages(&dashboard);
        let pit = &pages[3];

        assert!(pit.sections[0].charts.iter().all(|c| c.is_placeholder()));
        assert!(pit.sections[1].charts.is_empty());
    }
}
