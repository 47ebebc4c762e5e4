//! Chart specifications.
//!
//! A [`ChartSpec`] serializes to the `{ "data": [...], "layout": {...} }`
//! figure JSON understood by plotly front ends. Builders live in the
//! submodules, one per dashboard page.

pub mod grid;
pub mod pitstops;
pub mod retirements;

use serde::Serialize;
use std::collections::BTreeMap;

pub const DARK_TEMPLATE: &str = "plotly_dark";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl ChartSpec {
    pub fn new(data: Vec<Trace>, layout: Layout) -> Self {
        Self {
            data,
            layout,
        }
    }

    /// An empty figure with a centered message, shown instead of a chart
    /// whose input has no rows.
    pub fn placeholder(message: &str) -> Self {
        Self {
            data: Vec::new(),
            layout: Layout {
                height: Some(850),
                annotations: vec![Annotation {
                    text: message.to_string(),
                    x: 0.5,
                    y: 0.5,
                    font: Some(Font {
                        size: 20,
                        color: None,
                    }),
                    ..Annotation::default()
                }],
                ..Layout::default()
            },
        }
    }

    /// True for figures built by [`ChartSpec::placeholder`]: no traces, but a message.
    pub fn is_placeholder(&self) -> bool {
        self.data.is_empty() && !self.layout.annotations.is_empty()
    }
}

/// Values for one trace dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Series {
    Integers(Vec<i64>),
    Numbers(Vec<f64>),
    Labels(Vec<String>),
}

impl Default for Series {
    fn default() -> Self {
        Series::Numbers(Vec::new())
    }
}

impl Series {
    pub fn len(&self) -> usize {
        match self {
            Series::Integers(v) => v.len(),
            Series::Numbers(v) => v.len(),
            Series::Labels(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<f64>> for Series {
    fn from(values: Vec<f64>) -> Self {
        Series::Numbers(values)
    }
}

impl From<Vec<String>> for Series {
    fn from(values: Vec<String>) -> Self {
        Series::Labels(values)
    }
}

impl From<Vec<u32>> for Series {
    fn from(values: Vec<u32>) -> Self {
        Series::Integers(values.into_iter().map(i64::from).collect())
    }
}

impl From<Vec<i32>> for Series {
    fn from(values: Vec<i32>) -> Self {
        Series::Integers(values.into_iter().map(i64::from).collect())
    }
}

impl From<Vec<usize>> for Series {
    fn from(values: Vec<usize>) -> Self {
        Series::Integers(values.into_iter().map(|v| v as i64).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Bar(BarTrace),
    Scatter(ScatterTrace),
    Heatmap(HeatmapTrace),
    Box(BoxTrace),
}

impl Trace {
    pub fn name(&self) -> Option<&str> {
        match self {
            Trace::Bar(t) => t.name.as_deref(),
            Trace::Scatter(t) => t.name.as_deref(),
            Trace::Heatmap(_) => None,
            Trace::Box(t) => t.name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BarTrace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: Series,
    pub y: Series,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texttemplate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertext: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverinfo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScatterTrace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: Series,
    pub y: Series,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatmapTrace {
    pub x: Series,
    pub y: Series,
    /// Row-major by `y`; `None` serializes to `null` (an empty cell).
    pub z: Vec<Vec<Option<usize>>>,
    pub colorscale: ColorScale,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texttemplate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoxTrace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Series>,
    pub y: Series,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Color {
    Single(String),
    PerPoint(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorScale {
    Named(String),
    Stops(Vec<(f64, String)>),
}

impl Default for ColorScale {
    fn default() -> Self {
        ColorScale::Named("Reds_r".to_string())
    }
}

impl ColorScale {
    pub fn stops(stops: &[(f64, &str)]) -> Self {
        ColorScale::Stops(stops.iter().map(|(at, c)| (*at, c.to_string())).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<ColorScale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl Marker {
    pub fn solid(color: &str) -> Self {
        Self {
            color: Some(Color::Single(color.to_string())),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Font {
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub xref: String,
    pub yref: String,
    pub x: f64,
    pub y: f64,
    pub showarrow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            text: String::new(),
            xref: "paper".to_string(),
            yref: "paper".to_string(),
            x: 0.5,
            y: 0.5,
            showarrow: false,
            font: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangemode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickmode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickvals: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick0: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtick: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickformat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linecolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

impl Axis {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn without_grid(mut self) -> Self {
        self.showgrid = Some(false);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Margin {
    pub t: u32,
    pub b: u32,
    pub l: u32,
    pub r: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Legend {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itemclick: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itemdoubleclick: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autosize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    /// Additional subplot axes keyed by plotly name (`xaxis2`, `yaxis3`, ...).
    #[serde(flatten)]
    pub subplot_axes: BTreeMap<String, Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            title: None,
            template: DARK_TEMPLATE.to_string(),
            height: None,
            autosize: None,
            xaxis: None,
            yaxis: None,
            subplot_axes: BTreeMap::new(),
            barmode: None,
            showlegend: None,
            legend: None,
            margin: None,
            annotations: Vec::new(),
        }
    }
}

impl Layout {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}
