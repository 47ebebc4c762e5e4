//! Grid position to finishing position aggregation.

use std::collections::{BTreeMap, BTreeSet};

use crate::analyzers::types::{GridFinishCell, PositionCount};
use crate::records::RaceResult;

/// Counts finishing positions per starting position.
///
/// Only grid positions `1..ceiling` are considered. Rows without a
/// classified finish position are not counted. Returns one cell per
/// combination that actually occurred, ordered by grid then finish position;
/// zero-count cells are never produced.
pub fn grid_finish_counts<'a, I>(rows: I, ceiling: u32) -> Vec<GridFinishCell>
where
    I: IntoIterator<Item = &'a RaceResult>,
{
    let mut counts: BTreeMap<(u32, u32), usize> = BTreeMap::new();

    for row in rows {
        if row.grid_position < 1 || row.grid_position >= ceiling {
            continue;
        }
        let Some(finish) = row.finish_position else {
            continue;
        };
        *counts.entry((row.grid_position, finish)).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((grid_position, finish_position), count)| GridFinishCell {
            grid_position,
            finish_position,
            count,
        })
        .collect()
}

/// Parameters of the consolidated grid/finish aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridFinishOptions {
    /// Exclusive upper bound on grid positions.
    pub ceiling: u32,
    /// Highest finish position kept in the matrix; anything above is dropped.
    pub finish_ceiling: u32,
    /// Restrict to classified finishers before counting.
    pub completed_only: bool,
}

impl Default for GridFinishOptions {
    fn default() -> Self {
        Self {
            ceiling: 29,
            finish_ceiling: 22,
            completed_only: false,
        }
    }
}

/// Long-form grid/finish counts together with their pivot
/// (finish positions as rows, grid positions as columns).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridFinishMatrix {
    pub cells: Vec<GridFinishCell>,
    pub grid_positions: Vec<u32>,
    pub finish_positions: Vec<u32>,
    /// `z[finish_index][grid_index]`; `None` where the combination never occurred.
    pub z: Vec<Vec<Option<usize>>>,
}

impl GridFinishMatrix {
    pub fn build<'a, I>(rows: I, options: &GridFinishOptions) -> Self
    where
        I: IntoIterator<Item = &'a RaceResult>,
    {
        let rows = rows
            .into_iter()
            .filter(|r| !options.completed_only || r.is_completed())
            .filter(|r| {
                r.finish_position
                    .is_none_or(|finish| finish <= options.finish_ceiling)
            });
        Self::from_cells(grid_finish_counts(rows, options.ceiling))
    }

    pub fn from_cells(cells: Vec<GridFinishCell>) -> Self {
        let grid_positions: Vec<u32> = cells
            .iter()
            .map(|c| c.grid_position)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let finish_positions: Vec<u32> = cells
            .iter()
            .map(|c| c.finish_position)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut z = vec![vec![None; grid_positions.len()]; finish_positions.len()];
        for cell in &cells {
            // both positions come from `cells`, so the searches cannot miss
            if let (Ok(fi), Ok(gi)) = (
                finish_positions.binary_search(&cell.finish_position),
                grid_positions.binary_search(&cell.grid_position),
            ) {
                z[fi][gi] = Some(cell.count);
            }
        }

        Self {
            cells,
            grid_positions,
            finish_positions,
            z,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn count(&self, grid_position: u32, finish_position: u32) -> usize {
        self.cells
            .iter()
            .find(|c| c.grid_position == grid_position && c.finish_position == finish_position)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// Number of counted starts from `grid_position`.
    pub fn starts_from(&self, grid_position: u32) -> usize {
        self.cells
            .iter()
            .filter(|c| c.grid_position == grid_position)
            .map(|c| c.count)
            .sum()
    }
}

/// How often `driver` started from each grid slot. Pit-lane starts (grid 0)
/// are left out.
pub fn driver_grid_counts(rows: &[RaceResult], driver: &str) -> Vec<PositionCount> {
    tally_positions(
        rows.iter()
            .filter(|r| r.driver_name == driver && r.grid_position != 0)
            .map(|r| r.grid_position),
    )
}

/// How often `driver` finished in each position.
pub fn driver_finish_counts(rows: &[RaceResult], driver: &str) -> Vec<PositionCount> {
    tally_positions(
        rows.iter()
            .filter(|r| r.driver_name == driver)
            .filter_map(|r| r.finish_position),
    )
}

fn tally_positions(positions: impl Iterator<Item = u32>) -> Vec<PositionCount> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for position in positions {
        *counts.entry(position).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(position, count)| PositionCount {
            position,
            count,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn result(driver: &str, grid: u32, finish: Option<u32>, status: &str) -> RaceResult {
        RaceResult {
            year: 2010,
            round: Some(1),
            race_name: None,
            circuit_id: "monza".into(),
            driver_name: driver.into(),
            grid_position: grid,
            finish_position: finish,
            status: status.into(),
            condition: None,
        }
    }

    #[test]
    fn test_three_row_scenario() {
        let rows = vec![
            result("A", 1, Some(1), "Finished"),
            result("B", 1, Some(3), "Finished"),
            result("C", 2, Some(1), "Finished"),
        ];

        let cells = grid_finish_counts(&rows, 4);

        assert_eq!(
            cells,
            vec![
                GridFinishCell {
                    grid_position: 1,
                    finish_position: 1,
                    count: 1,
                },
                GridFinishCell {
                    grid_position: 1,
                    finish_position: 3,
                    count: 1,
                },
                GridFinishCell {
                    grid_position: 2,
                    finish_position: 1,
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let rows: Vec<RaceResult> = Vec::new();
        assert!(grid_finish_counts(&rows, 29).is_empty());
        assert!(GridFinishMatrix::build(&rows, &GridFinishOptions::default()).is_empty());
    }

    #[test]
    fn test_counts_are_conserved_per_grid() {
        let mut rows = Vec::new();
        for (i, grid) in [1, 1, 1, 2, 2, 3, 5, 5, 5, 5].iter().enumerate() {
            rows.push(result("X", *grid, Some((i as u32 % 4) + 1), "Finished"));
        }

        let matrix = GridFinishMatrix::build(&rows, &GridFinishOptions::default());

        for grid in [1, 2, 3, 4, 5] {
            let expected = rows.iter().filter(|r| r.grid_position == grid).count();
            assert_eq!(matrix.starts_from(grid), expected);
        }
    }

    #[test]
    fn test_ceiling_and_pit_lane_excluded() {
        let rows = vec![
            result("A", 0, Some(5), "Finished"),
            result("B", 3, Some(2), "Finished"),
            result("C", 4, Some(1), "Finished"),
        ];

        let cells = grid_finish_counts(&rows, 4);

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].grid_position, 3);
    }

    #[test]
    fn test_completed_only_filter() {
        let rows = vec![
            result("A", 1, Some(1), "Finished"),
            result("B", 1, Some(18), "Engine"),
            result("C", 2, Some(4), "+1 Lap"),
        ];
        let options = GridFinishOptions {
            completed_only: true,
            ..GridFinishOptions::default()
        };

        let matrix = GridFinishMatrix::build(&rows, &options);

        assert_eq!(matrix.count(1, 1), 1);
        assert_eq!(matrix.count(1, 18), 0);
        assert_eq!(matrix.count(2, 4), 1);
    }

    #[test]
    fn test_finish_ceiling_bounds_matrix() {
        let rows = vec![
            result("A", 1, Some(1), "Finished"),
            result("B", 1, Some(33), "Finished"),
            result("C", 2, Some(22), "Finished"),
        ];

        let matrix = GridFinishMatrix::build(&rows, &GridFinishOptions::default());

        assert_eq!(matrix.finish_positions, vec![1, 22]);
        assert_eq!(matrix.count(1, 33), 0);
        assert_eq!(matrix.starts_from(1), 1);

        let options = GridFinishOptions {
            finish_ceiling: 40,
            ..GridFinishOptions::default()
        };
        let matrix = GridFinishMatrix::build(&rows, &options);
        assert_eq!(matrix.count(1, 33), 1);
    }

    #[test]
    fn test_pivot_layout() {
        let rows = vec![
            result("A", 1, Some(1), "Finished"),
            result("B", 1, Some(1), "Finished"),
            result("C", 3, Some(2), "Finished"),
        ];

        let matrix = GridFinishMatrix::build(&rows, &GridFinishOptions::default());

        assert_eq!(matrix.grid_positions, vec![1, 3]);
        assert_eq!(matrix.finish_positions, vec![1, 2]);
        assert_eq!(matrix.z, vec![vec![Some(2), None], vec![None, Some(1)]]);
    }

    #[test]
    fn test_driver_histograms() {
        let rows = vec![
            result("A", 0, Some(5), "Finished"),
            result("A", 2, Some(1), "Finished"),
            result("A", 2, None, "Accident"),
            result("B", 1, Some(2), "Finished"),
        ];

        let grid = driver_grid_counts(&rows, "A");
        assert_eq!(
            grid,
            vec![PositionCount {
                position: 2,
                count: 2,
            }]
        );

        let finish = driver_finish_counts(&rows, "A");
        assert_eq!(
            finish,
            vec![
                PositionCount {
                    position: 1,
                    count: 1,
                },
                PositionCount {
                    position: 5,
                    count: 1,
                },
            ]
        );
    }
}
