//! Charts for the grid position page.

use crate::analyzers::grid_finish::GridFinishMatrix;
use crate::analyzers::types::{DriverPlacement, PlacementPoint, PlacementSeries, PositionCount};
use crate::charts::{
    Axis, BarTrace, ChartSpec, ColorScale, HeatmapTrace, Layout, Margin, Marker, ScatterTrace,
    Trace,
};

/// Heatmap of finishing position (rows) against grid position (columns).
pub fn circuit_heatmap(circuit: &str, matrix: &GridFinishMatrix) -> ChartSpec {
    if matrix.is_empty() {
        return ChartSpec::placeholder(&format!("No results recorded for {}", capitalize(circuit)));
    }

    let heatmap = HeatmapTrace {
        x: matrix.grid_positions.clone().into(),
        y: matrix.finish_positions.clone().into(),
        z: matrix.z.clone(),
        colorscale: ColorScale::Named("Reds_r".to_string()),
        texttemplate: Some("%{z}".to_string()),
        hovertemplate: Some(
            "Grid: %{x}<br>Finish: %{y}<br>Count: %{z}<extra></extra>".to_string(),
        ),
    };

    let ticks = |positions: &[u32]| Axis {
        tickmode: Some("array".to_string()),
        tickvals: Some(positions.iter().map(|p| *p as f64).collect()),
        linecolor: Some("white".to_string()),
        ..Axis::default()
    };

    let layout = Layout {
        height: Some(600),
        xaxis: Some(Axis {
            title: Some("Grid position".to_string()),
            ..ticks(&matrix.grid_positions)
        }
        .without_grid()),
        yaxis: Some(Axis {
            title: Some("Finish position".to_string()),
            ..ticks(&matrix.finish_positions)
        }
        .without_grid()),
        ..Layout::titled(format!("Grid/finish position of circuit {}", capitalize(circuit)))
    };

    ChartSpec::new(vec![Trace::Heatmap(heatmap)], layout)
}

/// Side-by-side histograms of a driver's grid and finish positions.
pub fn driver_positions(
    driver: &str,
    grid: &[PositionCount],
    finish: &[PositionCount],
) -> ChartSpec {
    let bars = |name: &str, counts: &[PositionCount], hover: &str| {
        Trace::Bar(BarTrace {
            name: Some(name.to_string()),
            x: counts.iter().map(|c| c.position).collect::<Vec<_>>().into(),
            y: counts.iter().map(|c| c.count).collect::<Vec<_>>().into(),
            hovertemplate: Some(format!("{hover} %{{y}}<extra></extra>")),
            ..BarTrace::default()
        })
    };

    let layout = Layout {
        xaxis: Some(Axis::titled("Position").without_grid()),
        yaxis: Some(Axis::titled("Count").without_grid()),
        ..Layout::titled(format!("All time Grid/Finish Position of {driver}"))
    };

    ChartSpec::new(
        vec![
            bars("grid", grid, "Number of grid positions"),
            bars("finish", finish, "Number of finish positions"),
        ],
        layout,
    )
}

/// Average placement per driver, completed races next to all races.
pub fn driver_placements(
    min_races: usize,
    all_races: &[DriverPlacement],
    completed_races: &[DriverPlacement],
) -> ChartSpec {
    let markers = |name: &str, placements: &[DriverPlacement]| {
        Trace::Scatter(ScatterTrace {
            name: Some(name.to_string()),
            x: placements.iter().map(|p| p.driver_name.clone()).collect::<Vec<_>>().into(),
            y: placements.iter().map(|p| p.avg_placement).collect::<Vec<_>>().into(),
            mode: "markers".to_string(),
            hovertemplate: Some("Average placement: %{y:.2f}<extra></extra>".to_string()),
            ..ScatterTrace::default()
        })
    };

    let layout = Layout {
        xaxis: Some(Axis::titled("Driver").without_grid()),
        yaxis: Some(
            Axis {
                tick0: Some(0.0),
                dtick: Some(2.0),
                range: Some([0.0, 20.0]),
                ..Axis::titled("Avg Placement")
            }
            .without_grid(),
        ),
        margin: Some(Margin {
            t: 50,
            b: 50,
            l: 50,
            r: 50,
        }),
        ..Layout::titled(format!(
            "Average placement of drivers with at least {min_races} races"
        ))
    };

    ChartSpec::new(
        vec![
            markers("Races Completed", completed_races),
            markers("All Races", all_races),
        ],
        layout,
    )
}

/// Mean finishing position by starting position, two lines.
pub fn placement_by_grid(series: &PlacementSeries) -> ChartSpec {
    if series.all_races.is_empty() && series.completed_races.is_empty() {
        return ChartSpec::placeholder("No races recorded for the selected grid positions");
    }

    let line = |name: &str, points: &[PlacementPoint], color: &str| {
        Trace::Scatter(ScatterTrace {
            name: Some(name.to_string()),
            x: points.iter().map(|p| p.grid_position).collect::<Vec<_>>().into(),
            y: points.iter().map(|p| p.avg_finish).collect::<Vec<_>>().into(),
            mode: "lines+markers".to_string(),
            marker: Some(Marker::solid(color)),
            hovertemplate: Some(
                "Grid %{x}<br>Average finish: %{y:.2f}<extra></extra>".to_string(),
            ),
            ..ScatterTrace::default()
        })
    };

    let layout = Layout {
        xaxis: Some(Axis {
            dtick: Some(1.0),
            ..Axis::titled("Grid position")
        }),
        yaxis: Some(Axis {
            rangemode: Some("tozero".to_string()),
            ..Axis::titled("Average finish position")
        }),
        ..Layout::titled("Average finishing position by starting position")
    };

    ChartSpec::new(
        vec![
            line("All Races", &series.all_races, "firebrick"),
            line("Races Completed", &series.completed_races, "deepskyblue"),
        ],
        layout,
    )
}

/// `"silverstone"` -> `"Silverstone"`.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
