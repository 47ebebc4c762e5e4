//! Charts for the retirement page.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::analyzers::types::{CircuitIncidents, IncidentSummary, YearlyIncidents};
use crate::charts::{
    Annotation, Axis, BarTrace, ChartSpec, Color, ColorScale, Font, Layout, Legend, Line, Margin,
    Marker, ScatterTrace, Trace,
};
use crate::records::WeatherOutcome;

pub const NO_QUALIFYING_CIRCUITS: &str = "No circuits with enough races in selected period";

/// How the incidents-by-circuit chart normalizes its counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentMode {
    /// Average count per race.
    #[default]
    PerRace,
    /// Percent of all entrants.
    Rate,
}

impl FromStr for IncidentMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per_race" | "per-race" => Ok(IncidentMode::PerRace),
            "rate" | "per_race_driver" => Ok(IncidentMode::Rate),
            other => bail!("unknown incident mode '{other}' (expected per-race or rate)"),
        }
    }
}

impl fmt::Display for IncidentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncidentMode::PerRace => f.write_str("per-race"),
            IncidentMode::Rate => f.write_str("rate"),
        }
    }
}

struct IncidentPanel {
    title: &'static str,
    name: &'static str,
    hover_label: &'static str,
    value: fn(&CircuitIncidents) -> f64,
    scale: [&'static str; 3],
}

const CRASH_SCALE: [&str; 3] = ["orangered", "firebrick", "darkred"];
const FAILURE_SCALE: [&str; 3] = ["deepskyblue", "mediumblue", "darkblue"];
const RETIREMENT_SCALE: [&str; 3] = ["limegreen", "forestgreen", "darkgreen"];

fn panels(mode: IncidentMode) -> [IncidentPanel; 3] {
    match mode {
        IncidentMode::PerRace => [
            IncidentPanel {
                title: "Average Amount of Crashes per Race",
                name: "Crashes",
                hover_label: "Crashes per Race",
                value: |c| c.crashes_per_race,
                scale: CRASH_SCALE,
            },
            IncidentPanel {
                title: "Average Amount of Technical Failures per Race",
                name: "Failures",
                hover_label: "Technical Failures per Race",
                value: |c| c.failures_per_race,
                scale: FAILURE_SCALE,
            },
            IncidentPanel {
                title: "Average Amount of Total Retirements per Race",
                name: "Retirements",
                hover_label: "Total Retirements per Race",
                value: |c| c.retirements_per_race,
                scale: RETIREMENT_SCALE,
            },
        ],
        IncidentMode::Rate => [
            IncidentPanel {
                title: "Average Rate of Crashes in Percent",
                name: "Crashes",
                hover_label: "Crash Rate",
                value: |c| c.crashes_per_entrant,
                scale: CRASH_SCALE,
            },
            IncidentPanel {
                title: "Average Rate of Technical Failures in Percent",
                name: "Failures",
                hover_label: "Technical Failure Rate",
                value: |c| c.failures_per_entrant,
                scale: FAILURE_SCALE,
            },
            IncidentPanel {
                title: "Average Rate of Total Retirements in Percent",
                name: "Retirements",
                hover_label: "Total Retirements Rate",
                value: |c| c.retirements_per_entrant,
                scale: RETIREMENT_SCALE,
            },
        ],
    }
}

/// Three horizontal bar panels (crashes, failures, retirements) per circuit,
/// each sorted ascending by its own metric. Falls back to a placeholder when
/// no circuit qualifies.
pub fn incidents_by_circuit(
    summary: &IncidentSummary,
    start_year: i32,
    end_year: i32,
    min_race_count: usize,
    mode: IncidentMode,
) -> ChartSpec {
    let IncidentSummary::Circuits(circuits) = summary else {
        return ChartSpec::placeholder(NO_QUALIFYING_CIRCUITS);
    };

    let suffix = if mode == IncidentMode::Rate { "%" } else { "" };
    let panels = panels(mode);

    let mut data = Vec::with_capacity(3);
    let mut layout = Layout {
        height: Some(850),
        autosize: Some(true),
        showlegend: Some(false),
        margin: Some(Margin {
            t: 100,
            b: 20,
            l: 50,
            r: 30,
        }),
        ..Layout::titled(format!(
            "Incidents by Circuit ({start_year} - {end_year})\n(Minimum {min_race_count} races)"
        ))
    };

    const DOMAINS: [[f64; 2]; 3] = [[0.0, 0.28], [0.36, 0.64], [0.72, 1.0]];
    const TITLE_X: [f64; 3] = [0.135, 0.49, 0.85];

    for (index, panel) in panels.iter().enumerate() {
        let mut sorted: Vec<&CircuitIncidents> = circuits.iter().collect();
        sorted.sort_by(|a, b| (panel.value)(a).total_cmp(&(panel.value)(b)));

        let values: Vec<f64> = sorted.iter().map(|c| (panel.value)(c)).collect();
        let hovertext = sorted
            .iter()
            .map(|c| {
                format!(
                    "Races: {}<br>{}: {:.2}{}",
                    c.race_count,
                    panel.hover_label,
                    (panel.value)(c),
                    suffix
                )
            })
            .collect();

        let axis_suffix = if index == 0 { String::new() } else { (index + 1).to_string() };
        data.push(Trace::Bar(BarTrace {
            name: Some(panel.name.to_string()),
            x: values.clone().into(),
            y: sorted.iter().map(|c| c.circuit_id.clone()).collect::<Vec<_>>().into(),
            orientation: Some("h".to_string()),
            marker: Some(Marker {
                color: Some(Color::PerPoint(values)),
                colorscale: Some(ColorScale::stops(&[
                    (0.0, panel.scale[0]),
                    (0.5, panel.scale[1]),
                    (1.0, panel.scale[2]),
                ])),
                size: None,
            }),
            hovertext: Some(hovertext),
            hoverinfo: Some("text".to_string()),
            xaxis: Some(format!("x{axis_suffix}")),
            yaxis: Some(format!("y{axis_suffix}")),
            ..BarTrace::default()
        }));

        let x_axis = Axis {
            side: Some("top".to_string()),
            domain: Some(DOMAINS[index]),
            anchor: Some(format!("y{axis_suffix}")),
            ..Axis::default()
        };
        let y_axis = Axis {
            anchor: Some(format!("x{axis_suffix}")),
            ..Axis::default()
        };
        if index == 0 {
            layout.xaxis = Some(x_axis);
            layout.yaxis = Some(y_axis);
        } else {
            layout.subplot_axes.insert(format!("xaxis{axis_suffix}"), x_axis);
            layout.subplot_axes.insert(format!("yaxis{axis_suffix}"), y_axis);
        }

        layout.annotations.push(Annotation {
            text: panel.title.to_string(),
            x: TITLE_X[index],
            y: 1.02,
            font: Some(Font {
                size: 15,
                color: None,
            }),
            ..Annotation::default()
        });
    }

    ChartSpec::new(data, layout)
}

/// Total retirements, incidents and technical failures per season.
pub fn total_incidents_by_year(years: &[YearlyIncidents]) -> ChartSpec {
    let x: Vec<i32> = years.iter().map(|y| y.year).collect();
    let line = |name: &str, values: Vec<u32>| {
        Trace::Scatter(ScatterTrace {
            name: Some(name.to_string()),
            x: x.clone().into(),
            y: values.into(),
            mode: "lines+markers".to_string(),
            line: Some(Line {
                color: None,
                width: Some(3),
            }),
            marker: Some(Marker {
                size: Some(8),
                ..Marker::default()
            }),
            hovertemplate: Some(format!("<b>{name}:</b> %{{y}}<extra></extra>")),
            ..ScatterTrace::default()
        })
    };

    let layout = Layout {
        xaxis: Some(Axis::titled("Year")),
        yaxis: Some(Axis {
            rangemode: Some("tozero".to_string()),
            ..Axis::titled("Total Count")
        }),
        legend: Some(Legend {
            title: Some("Incident Type".to_string()),
            itemclick: Some("toggle".to_string()),
            itemdoubleclick: Some("toggleothers".to_string()),
        }),
        ..Layout::titled(format!("Total Incidents by Year {}", year_span(years)))
    };

    ChartSpec::new(
        vec![
            line("Total Retirements", years.iter().map(|y| y.retirements).collect()),
            line("Incidents/Crashes", years.iter().map(|y| y.crashes).collect()),
            line("Technical Failures", years.iter().map(|y| y.failures).collect()),
        ],
        layout,
    )
}

/// Percent of starters that retired, per season.
pub fn yearly_retirement_rate(years: &[YearlyIncidents]) -> ChartSpec {
    filled_line(
        years,
        years.iter().map(|y| y.retirement_rate).collect(),
        "red",
        "Retirement Rate: %{y:.2f}%<extra></extra>",
        format!("Yearly Retirement Rate in Percent {}", year_span(years)),
        "Percentage of Retired Cars",
    )
}

/// Average number of retirements per race, per season.
pub fn average_yearly_retirements(years: &[YearlyIncidents]) -> ChartSpec {
    filled_line(
        years,
        years.iter().map(|y| y.retirements_per_race).collect(),
        "blue",
        "Retirements per Race: %{y:.2f}<extra></extra>",
        format!("Yearly Average Retirements per Race {}", year_span(years)),
        "Retirements",
    )
}

fn filled_line(
    years: &[YearlyIncidents],
    values: Vec<f64>,
    color: &str,
    hovertemplate: &str,
    title: String,
    y_title: &str,
) -> ChartSpec {
    let trace = Trace::Scatter(ScatterTrace {
        x: years.iter().map(|y| y.year).collect::<Vec<_>>().into(),
        y: values.into(),
        mode: "lines".to_string(),
        fill: Some("tonexty".to_string()),
        line: Some(Line {
            color: Some(color.to_string()),
            width: None,
        }),
        hovertemplate: Some(hovertemplate.to_string()),
        ..ScatterTrace::default()
    });

    let layout = Layout {
        xaxis: Some(Axis::titled("Year")),
        yaxis: Some(Axis::titled(y_title)),
        ..Layout::titled(title)
    };

    ChartSpec::new(vec![trace], layout)
}

fn year_span(years: &[YearlyIncidents]) -> String {
    match (years.first(), years.last()) {
        (Some(first), Some(last)) => format!("({} - {})", first.year, last.year),
        _ => String::new(),
    }
}

/// Grouped bars of outcome rates per weather condition.
pub fn weather_outcomes(rates: &[WeatherOutcome]) -> ChartSpec {
    if rates.is_empty() {
        return ChartSpec::placeholder("No weather data available");
    }

    let conditions: Vec<String> = rates.iter().map(|r| r.condition.to_string()).collect();
    let bars = |name: &str, values: Vec<f64>, color: &str| {
        Trace::Bar(BarTrace {
            name: Some(name.to_string()),
            x: conditions.clone().into(),
            y: values.into(),
            marker: Some(Marker::solid(color)),
            hovertemplate: Some("%{y:.2%}".to_string()),
            ..BarTrace::default()
        })
    };

    let layout = Layout {
        barmode: Some("group".to_string()),
        xaxis: Some(Axis::titled("Weather Condition")),
        yaxis: Some(Axis {
            tickformat: Some(".0%".to_string()),
            ..Axis::titled("Rate")
        }),
        ..Layout::titled("Race Outcome Rates by Weather Condition")
    };

    ChartSpec::new(
        vec![
            bars("Incident Rate", rates.iter().map(|r| r.incidents_ratio).collect(), "lightblue"),
            bars(
                "Technical Failure Rate",
                rates.iter().map(|r| r.technical_ratio).collect(),
                "deepskyblue",
            ),
            bars("Completed Rate", rates.iter().map(|r| r.completed_ratio).collect(), "dodgerblue"),
        ],
        layout,
    )
}
