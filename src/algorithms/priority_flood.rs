/*
This code is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 14/03/2023
Last Modified: 02/05/2025
License: MIT
*/

use super::*;
use crate::structures::{Array2D, FloodFrontier};
use std::collections::VecDeque;
use std::io::Error;

/// Fills all pits and removes all digital dams from a DEM using the original
/// Priority-Flood of Barnes, Lehman and Mulla (2014), which routes every cell
/// through the priority queue.
///
/// The flood starts on the edges of the DEM and works its way inwards, always
/// expanding from the lowest cell that has a path to the edge. A neighbour below
/// the expanding cell is raised to its elevation. Note that the raised elevation
/// of a neighbour, not the elevation of its donor, is what enters the queue; the
/// improved variant below differs on this point and the behaviour of each is kept
/// as published.
///
/// NoData cells are never modified. They enter the queue at the nodata value, so
/// regions of missing data are flooded through rather than walling off the cells
/// behind them.
pub fn original_priority_flood<T: CellValue>(dem: &mut Array2D<T>) -> Result<FloodStats, Error> {
    validate_dimensions(dem)?;
    let rows = dem.rows;
    let columns = dem.columns;
    let nodata = dem.nodata();
    let mut closed: Array2D<i8> = Array2D::new_like(dem, 0, -1)?;
    let mut open: FloodFrontier<T> = FloodFrontier::with_capacity((2 * (rows + columns)) as usize);
    let mut stats = FloodStats::default();

    seed_edge_cells(dem, &mut closed, &mut open);

    while let Some(cell) = open.pop() {
        let (row, col) = (cell.row, cell.column);
        stats.cells_processed += 1;
        let zc = dem[(row, col)];
        for n in 1..9usize {
            let row_n = row + DY[n];
            let col_n = col + DX[n];
            if !dem.is_in_grid(row_n, col_n) {
                continue;
            }
            if closed.get_value(row_n, col_n) == 1 {
                continue;
            }
            closed.set_value(row_n, col_n, 1);

            let zn = dem.get_value(row_n, col_n);
            if zn != nodata && zc != nodata && zn < zc {
                stats.pit_cells += 1;
                dem.set_value(row_n, col_n, zc);
            }
            open.push(row_n, col_n, dem.get_value(row_n, col_n));
        }
    }

    debug_assert_eq!(stats.cells_processed, (rows * columns) as u64);
    Ok(stats)
}

/// Fills all pits and removes all digital dams from a DEM using the improved
/// Priority-Flood of Barnes, Lehman and Mulla (2014).
///
/// The flood starts on the edges of the DEM and works its way inwards using a
/// priority queue to determine the lowest cell which has a path to the edge. The
/// neighbours of this cell are added to the priority queue if they are higher. If
/// they are lower, they are raised to the spill elevation and added to a plain
/// pit queue which is drained ahead of the priority queue. Cells which are higher
/// than a pit being filled are added to the priority queue. In this way, pits are
/// filled without incurring the expense of the priority queue.
pub fn improved_priority_flood<T: CellValue>(dem: &mut Array2D<T>) -> Result<FloodStats, Error> {
    validate_dimensions(dem)?;
    let rows = dem.rows;
    let columns = dem.columns;
    let nodata = dem.nodata();
    let mut closed: Array2D<i8> = Array2D::new_like(dem, 0, -1)?;
    let mut open: FloodFrontier<T> = FloodFrontier::with_capacity((2 * (rows + columns)) as usize);
    let mut pit: VecDeque<(T, isize, isize)> = VecDeque::new();
    let mut stats = FloodStats::default();

    seed_edge_cells(dem, &mut closed, &mut open);

    while !open.is_empty() || !pit.is_empty() {
        let (z, row, col) = match pit.pop_front() {
            Some(cell) => cell,
            None => {
                let cell = open.pop().expect("Error during pop operation.");
                (cell.priority, cell.row, cell.column)
            }
        };
        stats.cells_processed += 1;

        for n in 1..9usize {
            let row_n = row + DY[n];
            let col_n = col + DX[n];
            if !dem.is_in_grid(row_n, col_n) {
                continue;
            }
            if closed.get_value(row_n, col_n) == 1 {
                continue;
            }
            closed.set_value(row_n, col_n, 1);

            let zn = dem.get_value(row_n, col_n);
            if zn == nodata {
                pit.push_back((nodata, row_n, col_n));
            } else if zn <= z && z != nodata {
                if zn < z {
                    stats.pit_cells += 1;
                    dem.set_value(row_n, col_n, z);
                }
                pit.push_back((z, row_n, col_n));
            } else {
                open.push(row_n, col_n, zn);
            }
        }
    }

    debug_assert_eq!(stats.cells_processed, (rows * columns) as u64);
    Ok(stats)
}

/// Assigns every cell an elevation which guarantees drainage: each cell raised
/// out of a pit lands one representable increment above its donor, so the filled
/// surface descends strictly rather than ponding into flats.
///
/// The increment is the true IEEE-754 successor of the donor elevation, not a
/// fixed epsilon. On wide DEMs with little local relief the successor chain can
/// overtake terrain that was never inside the pit; such cells are tallied in
/// `false_pit_cells` and reported, and the run still succeeds. A nonzero count is
/// the signal to re-run on a wider float type.
pub fn priority_flood_epsilon<T: NextAfter>(dem: &mut Array2D<T>) -> Result<FloodStats, Error> {
    validate_dimensions(dem)?;
    let rows = dem.rows;
    let columns = dem.columns;
    let nodata = dem.nodata();
    let mut closed: Array2D<i8> = Array2D::new_like(dem, 0, -1)?;
    let mut open: FloodFrontier<T> = FloodFrontier::with_capacity((2 * (rows + columns)) as usize);
    let mut pit: VecDeque<(T, isize, isize)> = VecDeque::new();
    let mut pit_top: Option<T> = None;
    let mut stats = FloodStats::default();

    seed_edge_cells(dem, &mut closed, &mut open);

    while !open.is_empty() || !pit.is_empty() {
        // Drain the pit queue ahead of the heap, except that when the heap's top
        // ties the front of the pit queue the heap wins; this keeps the frontier
        // from wandering above terrain that drains at the same elevation.
        let (z, row, col);
        let tied = match (open.peek(), pit.front()) {
            (Some(top), Some(front)) => top.priority == front.0,
            _ => false,
        };
        if tied {
            let cell = open.pop().expect("Error during pop operation.");
            z = cell.priority;
            row = cell.row;
            col = cell.column;
            pit_top = None;
        } else if let Some(cell) = pit.pop_front() {
            z = cell.0;
            row = cell.1;
            col = cell.2;
            if pit_top.is_none() {
                let zc = dem.get_value(row, col);
                if zc != nodata {
                    pit_top = Some(zc);
                }
            }
        } else {
            let cell = open.pop().expect("Error during pop operation.");
            z = cell.priority;
            row = cell.row;
            col = cell.column;
            pit_top = None;
        }
        stats.cells_processed += 1;

        for n in 1..9usize {
            let row_n = row + DY[n];
            let col_n = col + DX[n];
            if !dem.is_in_grid(row_n, col_n) {
                continue;
            }
            if closed.get_value(row_n, col_n) == 1 {
                continue;
            }
            closed.set_value(row_n, col_n, 1);

            let zn = dem.get_value(row_n, col_n);
            if zn == nodata {
                pit.push_back((nodata, row_n, col_n));
            } else if z != nodata && zn <= z.next_after_up() {
                if let Some(top) = pit_top {
                    if top < zn && z.next_after_up() >= zn {
                        stats.false_pit_cells += 1;
                    }
                }
                stats.pit_cells += 1;
                dem.set_value(row_n, col_n, z.next_after_up());
                pit.push_back((z.next_after_up(), row_n, col_n));
            } else {
                open.push(row_n, col_n, zn);
            }
        }
    }

    debug_assert_eq!(stats.cells_processed, (rows * columns) as u64);
    Ok(stats)
}

#[cfg(test)]
mod test {
    use super::super::{NextAfter, DX, DY};
    use super::{improved_priority_flood, original_priority_flood, priority_flood_epsilon};
    use crate::structures::Array2D;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    const NODATA: f64 = -32768f64;

    fn grid_from(rows: isize, columns: isize, values: &[f64]) -> Array2D<f64> {
        let mut dem: Array2D<f64> = Array2D::new(rows, columns, 0f64, NODATA).unwrap();
        for row in 0..rows {
            for col in 0..columns {
                dem.set_value(row, col, values[(row * columns + col) as usize]);
            }
        }
        dem
    }

    fn random_grid(rows: isize, columns: isize, seed: u64) -> Array2D<f64> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut dem: Array2D<f64> = Array2D::new(rows, columns, 0f64, NODATA).unwrap();
        for row in 0..rows {
            for col in 0..columns {
                dem.set_value(row, col, rng.gen_range(0..256) as f64);
            }
        }
        dem
    }

    /// Every non-nodata cell must have an 8-connected path of non-increasing
    /// elevation to the grid edge. Verified by growing a region from the edges
    /// in which each newly added cell is at least as high as the cell it was
    /// reached from.
    fn assert_drains(dem: &Array2D<f64>) {
        let nodata = dem.nodata();
        let mut reached: Array2D<i8> = Array2D::new_like(dem, 0, -1).unwrap();
        let mut queue = std::collections::BinaryHeap::new();
        for row in 0..dem.rows {
            for col in 0..dem.columns {
                if dem.is_edge_cell(row, col) {
                    reached.set_value(row, col, 1);
                    // lowest first, so every admissible uphill step is taken
                    queue.push((
                        std::cmp::Reverse(dem.get_value(row, col).to_bits() as i64),
                        row,
                        col,
                    ));
                }
            }
        }
        while let Some((_, row, col)) = queue.pop() {
            let z = dem.get_value(row, col);
            for n in 1..9usize {
                let r = row + DY[n];
                let c = col + DX[n];
                if !dem.is_in_grid(r, c) || reached.get_value(r, c) == 1 {
                    continue;
                }
                let zn = dem.get_value(r, c);
                if zn == nodata || z == nodata || zn >= z {
                    reached.set_value(r, c, 1);
                    queue.push((std::cmp::Reverse(zn.to_bits() as i64), r, c));
                }
            }
        }
        for row in 0..dem.rows {
            for col in 0..dem.columns {
                if dem.get_value(row, col) != nodata {
                    assert_eq!(
                        reached.get_value(row, col),
                        1,
                        "cell ({}, {}) has no descending path to the edge",
                        row,
                        col
                    );
                }
            }
        }
    }

    #[test]
    fn test_single_pit_is_filled() {
        let mut values = vec![10f64; 25];
        values[12] = 5f64; // centre of the 5x5 grid
        let mut dem = grid_from(5, 5, &values);
        let stats = improved_priority_flood(&mut dem).unwrap();
        for row in 0..5 {
            for col in 0..5 {
                assert_eq!(dem.get_value(row, col), 10f64);
            }
        }
        assert_eq!(stats.pit_cells, 1);
        assert_eq!(stats.cells_processed, 25);
    }

    #[test]
    fn test_original_variant_fills_the_same_pit() {
        let mut values = vec![10f64; 25];
        values[12] = 5f64;
        let mut dem = grid_from(5, 5, &values);
        let stats = original_priority_flood(&mut dem).unwrap();
        for row in 0..5 {
            for col in 0..5 {
                assert_eq!(dem.get_value(row, col), 10f64);
            }
        }
        assert_eq!(stats.pit_cells, 1);
    }

    #[test]
    fn test_flat_grid_is_untouched() {
        let mut dem = grid_from(4, 4, &vec![3f64; 16]);
        let before = dem.duplicate();
        let stats = improved_priority_flood(&mut dem).unwrap();
        assert_eq!(dem, before);
        assert_eq!(stats.pit_cells, 0);
    }

    #[test]
    fn test_filled_dem_drains_and_never_loses_elevation() {
        let original = random_grid(40, 33, 42);
        let mut dem = original.duplicate();
        improved_priority_flood(&mut dem).unwrap();
        for row in 0..dem.rows {
            for col in 0..dem.columns {
                assert!(dem.get_value(row, col) >= original.get_value(row, col));
            }
        }
        assert_drains(&dem);
    }

    #[test]
    fn test_filling_is_idempotent() {
        let mut dem = random_grid(30, 30, 7);
        improved_priority_flood(&mut dem).unwrap();
        let once = dem.duplicate();
        improved_priority_flood(&mut dem).unwrap();
        assert_eq!(dem, once);
    }

    #[test]
    fn test_nodata_cells_are_not_modified() {
        let mut values = vec![10f64; 25];
        values[12] = NODATA;
        values[7] = 4f64; // pit neighbouring the hole
        let mut dem = grid_from(5, 5, &values);
        improved_priority_flood(&mut dem).unwrap();
        assert_eq!(dem.get_value(2, 2), NODATA);
        assert_eq!(dem.get_value(1, 2), 10f64);
    }

    #[test]
    fn test_flooding_passes_through_interior_nodata_holes() {
        // a ring of nodata enclosing a block of terrain: the flood must reach the
        // block through the ring, and a low cell touching the ring drains through
        // it rather than being raised
        let mut values = vec![10f64; 49];
        for (row, col) in [(1, 1), (1, 2), (1, 3), (1, 4), (1, 5), (2, 1), (2, 5),
            (3, 1), (3, 5), (4, 1), (4, 5), (5, 1), (5, 2), (5, 3), (5, 4), (5, 5)]
        {
            values[(row * 7 + col) as usize] = NODATA;
        }
        values[2 * 7 + 2] = 2f64; // enclosed cell adjacent to the nodata ring
        let mut dem = grid_from(7, 7, &values);
        let stats = improved_priority_flood(&mut dem).unwrap();
        assert_eq!(stats.cells_processed, 49);
        assert_eq!(stats.pit_cells, 0);
        assert_eq!(dem.get_value(2, 2), 2f64);
        assert_eq!(dem.get_value(3, 3), 10f64);
        assert_eq!(dem.get_value(1, 1), NODATA);
    }

    #[test]
    fn test_epsilon_applies_successor_increment() {
        let mut dem: Array2D<f32> = Array2D::new(3, 3, 2f32, -32768f32).unwrap();
        dem.set_value(1, 1, 1f32);
        let stats = priority_flood_epsilon(&mut dem).unwrap();
        assert_eq!(dem.get_value(1, 1), 2f32.next_after_up());
        for row in 0..3 {
            for col in 0..3 {
                if row != 1 || col != 1 {
                    assert_eq!(dem.get_value(row, col), 2f32);
                }
            }
        }
        assert_eq!(stats.pit_cells, 1);
        assert_eq!(stats.false_pit_cells, 0);
    }

    #[test]
    fn test_epsilon_interior_cells_descend_strictly() {
        let original = random_grid(25, 25, 99);
        let mut dem = original.duplicate();
        priority_flood_epsilon(&mut dem).unwrap();
        for row in 1..dem.rows - 1 {
            for col in 1..dem.columns - 1 {
                let z = dem.get_value(row, col);
                let mut has_lower_neighbour = false;
                for n in 1..9usize {
                    if dem.get_value(row + DY[n], col + DX[n]) < z {
                        has_lower_neighbour = true;
                    }
                }
                assert!(has_lower_neighbour, "cell ({}, {}) is locked in a flat", row, col);
            }
        }
        for row in 0..dem.rows {
            for col in 0..dem.columns {
                assert!(dem.get_value(row, col) >= original.get_value(row, col));
            }
        }
    }

    #[test]
    fn test_single_row_grid_is_handled() {
        let mut dem = grid_from(1, 4, &[1f64, 2f64, 3f64, 4f64]);
        let before = dem.duplicate();
        let stats = improved_priority_flood(&mut dem).unwrap();
        assert_eq!(stats.cells_processed, 4);
        assert_eq!(dem, before);
    }

    #[test]
    fn test_empty_grid_is_rejected() {
        let mut dem: Array2D<f64> = Array2D::new(0, 0, 0f64, NODATA).unwrap();
        assert!(improved_priority_flood(&mut dem).is_err());
        assert!(original_priority_flood(&mut dem).is_err());
        assert!(priority_flood_epsilon(&mut dem).is_err());
    }
}
