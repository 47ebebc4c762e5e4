//! Aggregations behind the dashboard charts.
//!
//! Every function here is a pure function of the rows it is given: it takes
//! borrowed tables, never mutates them, and returns freshly built results.

pub mod filters;
pub mod grid_finish;
pub mod incidents;
pub mod pitstops;
pub mod placement;
pub mod types;
pub mod utility;
pub mod weather;
pub mod yearly;
