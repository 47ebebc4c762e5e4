//! Charts for the pit-stop page.

use crate::analyzers::pitstops::{DriverPitProfile, RacePitAnalysis};
use crate::analyzers::types::{CategorySummary, DurationCategory};
use crate::charts::{
    Axis, BarTrace, BoxTrace, ChartSpec, Color, ColorScale, Layout, Marker, Series, Trace,
};

pub const NO_DATA: &str = "No data available";

fn category_color(category: DurationCategory) -> &'static str {
    match category {
        DurationCategory::Fast => "#00cc96",
        DurationCategory::Average => "#fecb52",
        DurationCategory::Slow => "#ef553b",
    }
}

/// One box per category; categories without rows get no trace.
fn category_boxes(points: &[(DurationCategory, Option<u32>)]) -> Vec<Trace> {
    DurationCategory::ALL
        .iter()
        .filter_map(|category| {
            let finishes: Vec<u32> = points
                .iter()
                .filter(|(c, _)| c == category)
                .filter_map(|(_, finish)| *finish)
                .collect();
            if finishes.is_empty() {
                return None;
            }
            Some(Trace::Box(BoxTrace {
                name: Some(category.label().to_string()),
                x: Some(Series::Labels(vec![category.label().to_string(); finishes.len()])),
                y: finishes.into(),
                marker: Some(Marker::solid(category_color(*category))),
                ..BoxTrace::default()
            }))
        })
        .collect()
}

/// Finishing position per pit-time category for one race.
pub fn race_category_boxplot(analysis: &RacePitAnalysis) -> ChartSpec {
    if analysis.totals.is_empty() {
        return ChartSpec::placeholder(NO_DATA);
    }

    let points: Vec<(DurationCategory, Option<u32>)> = analysis
        .categories
        .iter()
        .zip(&analysis.totals)
        .map(|(c, t)| (*c, Some(t.finish_position)))
        .collect();

    let boxes = category_boxes(&points);
    if boxes.is_empty() {
        return ChartSpec::placeholder(NO_DATA);
    }

    let layout = Layout {
        xaxis: Some(Axis::titled("Pit stop category")),
        yaxis: Some(Axis::titled("Finishing position")),
        ..Layout::titled(format!(
            "Pit stop analysis for {} ({})",
            analysis.race_name, analysis.year
        ))
    };

    ChartSpec::new(boxes, layout)
}

/// Total pit time per driver, colored by finishing position (red for the winner).
pub fn race_pit_totals(analysis: &RacePitAnalysis) -> ChartSpec {
    if analysis.totals.is_empty() {
        return ChartSpec::placeholder(NO_DATA);
    }

    let durations: Vec<f64> = analysis.totals.iter().map(|t| t.total_duration).collect();
    let trace = Trace::Bar(BarTrace {
        x: analysis
            .totals
            .iter()
            .map(|t| t.driver_name.clone())
            .collect::<Vec<_>>()
            .into(),
        y: durations.clone().into(),
        text: Some(durations.into()),
        texttemplate: Some("%{text:.2f}s".to_string()),
        textposition: Some("outside".to_string()),
        marker: Some(Marker {
            color: Some(Color::PerPoint(
                analysis.totals.iter().map(|t| t.finish_position as f64).collect(),
            )),
            colorscale: Some(ColorScale::stops(&[
                (0.0, "rgb(255, 0, 0)"),
                (0.2, "rgb(255, 100, 100)"),
                (0.4, "rgb(255, 150, 150)"),
                (0.6, "rgb(255, 200, 200)"),
                (0.8, "rgb(255, 255, 255)"),
                (1.0, "rgb(255, 255, 255)"),
            ])),
            size: None,
        }),
        hovertemplate: Some("%{x}: %{y:.2f}s<extra></extra>".to_string()),
        ..BarTrace::default()
    });

    let layout = Layout {
        xaxis: Some(Axis::titled("Driver")),
        yaxis: Some(Axis::titled("Total pit stop time (s)")),
        ..Layout::titled(format!(
            "Total pit stop time per driver ({}, {})",
            analysis.race_name, analysis.year
        ))
    };

    ChartSpec::new(vec![trace], layout)
}

/// Finishing position per pit-stop speed category across a driver's career.
pub fn driver_category_boxplot(profile: &DriverPitProfile) -> ChartSpec {
    if profile.stops.is_empty() {
        return ChartSpec::placeholder(NO_DATA);
    }

    let points: Vec<(DurationCategory, Option<u32>)> = profile
        .stops
        .iter()
        .map(|s| (s.category, s.finish_position))
        .collect();

    let boxes = category_boxes(&points);
    if boxes.is_empty() {
        return ChartSpec::placeholder(NO_DATA);
    }

    let layout = Layout {
        xaxis: Some(Axis::titled("Pit stop speed")),
        yaxis: Some(Axis::titled("Finishing position")),
        ..Layout::titled(format!("Pit stop analysis for {}", profile.driver_name))
    };

    ChartSpec::new(boxes, layout)
}

/// Info lines under the pit-stop charts: a total, then count and duration
/// range per category. Empty categories print `n/a` instead of a range.
pub fn category_info(
    total_label: &str,
    total: usize,
    unit: &str,
    summaries: &[CategorySummary],
) -> Vec<String> {
    let mut lines = vec![format!("{total_label}: {total}")];
    for summary in summaries {
        let range = match summary.range {
            Some((lo, hi)) => format!("{lo:.2}s - {hi:.2}s"),
            None => "n/a".to_string(),
        };
        lines.push(format!(
            "{} ({} {}): {}",
            summary.category, summary.count, unit, range
        ));
    }
    lines
}
