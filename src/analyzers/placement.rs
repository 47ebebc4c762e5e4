use std::collections::{BTreeMap, HashMap};

use crate::analyzers::filters::drivers_with_min_races;
use crate::analyzers::grid_finish::grid_finish_counts;
use crate::analyzers::types::{DriverPlacement, PlacementPoint, PlacementSeries};
use crate::records::RaceResult;

/// Mean finishing position for every starting position `1..=max_grid`,
/// once over `all` and once over `completed`.
///
/// Starting positions that never occur are left out of the series.
pub fn average_finish_by_grid(
    all: &[RaceResult],
    completed: &[RaceResult],
    max_grid: u32,
) -> PlacementSeries {
    PlacementSeries {
        all_races: mean_finish_per_grid(all, max_grid),
        completed_races: mean_finish_per_grid(completed, max_grid),
    }
}

fn mean_finish_per_grid(rows: &[RaceResult], max_grid: u32) -> Vec<PlacementPoint> {
    // (sum of finish * count, sum of count)
    let mut sums: BTreeMap<u32, (u64, usize)> = BTreeMap::new();
    for cell in grid_finish_counts(rows, max_grid.saturating_add(1)) {
        let entry = sums.entry(cell.grid_position).or_default();
        entry.0 += cell.finish_position as u64 * cell.count as u64;
        entry.1 += cell.count;
    }

    sums.into_iter()
        .filter(|(_, (_, races))| *races > 0)
        .map(|(grid_position, (weighted, races))| PlacementPoint {
            grid_position,
            avg_finish: weighted as f64 / races as f64,
            races,
        })
        .collect()
}

/// Mean finishing position of every driver with at least `min_races` result
/// rows, best first. Drivers without a single classified finish are skipped.
pub fn driver_average_placement(rows: &[RaceResult], min_races: usize) -> Vec<DriverPlacement> {
    let eligible = drivers_with_min_races(rows, min_races);

    let mut finishes: HashMap<&str, (u64, usize)> = HashMap::new();
    for row in rows {
        if let Some(finish) = row.finish_position {
            let entry = finishes.entry(row.driver_name.as_str()).or_default();
            entry.0 += finish as u64;
            entry.1 += 1;
        }
    }

    let mut placements: Vec<DriverPlacement> = eligible
        .into_iter()
        .filter_map(|driver_name| {
            let (sum, count) = *finishes.get(driver_name.as_str())?;
            if count == 0 {
                return None;
            }
            Some(DriverPlacement {
                driver_name,
                avg_placement: sum as f64 / count as f64,
            })
        })
        .collect();

    placements.sort_by(|a, b| {
        a.avg_placement
            .total_cmp(&b.avg_placement)
            .then_with(|| a.driver_name.cmp(&b.driver_name))
    });
    placements
}
