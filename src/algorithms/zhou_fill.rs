/*
This code is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 27/06/2023
Last Modified: 02/05/2025
License: MIT
*/

use super::*;
use crate::structures::{Array2D, FloodFrontier};
use std::collections::VecDeque;
use std::io::Error;

/// Fills all pits and removes all digital dams from a DEM using the two-stage
/// variant of Zhou, Sun and Fu (2016). The result is identical, cell for cell,
/// to [`improved_priority_flood`]; the difference is how much work reaches the
/// heap.
///
/// The frontier is seeded with the boundary ring as usual. When the minimum cell
/// surfaces, its neighbours at or below its elevation are raised to it and start
/// a breadth-first spread that floods the whole region reachable at that spill
/// elevation in one pass, queueing only the region's higher rim back onto the
/// heap. Flat or monotonically filled regions therefore cost a plain queue
/// operation per cell rather than a heap operation, and every cell enters the
/// heap at most once.
///
/// Cells of missing terrain join the spread without being modified and their far
/// rim re-enters the heap at its own elevation, so the flood continues on the
/// other side of a hole. The spread queue is drained in discovery order, first
/// in, first out, which keeps the cell-for-cell agreement with the one-queue
/// formulation even where a region touches missing terrain.
pub fn zhou_priority_flood<T: CellValue>(dem: &mut Array2D<T>) -> Result<FloodStats, Error> {
    validate_dimensions(dem)?;
    let rows = dem.rows;
    let columns = dem.columns;
    let nodata = dem.nodata();
    let mut closed: Array2D<i8> = Array2D::new_like(dem, 0, -1)?;
    let mut open: FloodFrontier<T> = FloodFrontier::with_capacity((2 * (rows + columns)) as usize);
    let mut trace: VecDeque<(isize, isize)> = VecDeque::new();
    let mut stats = FloodStats::default();

    seed_edge_cells(dem, &mut closed, &mut open);
    stats.cells_processed = open.len() as u64;

    while let Some(cell) = open.pop() {
        let z = cell.priority;
        spread_from(
            dem,
            &mut closed,
            &mut open,
            &mut trace,
            (cell.row, cell.column),
            z,
            &mut stats,
        );
    }

    debug_assert_eq!(stats.cells_processed, (rows * columns) as u64);
    Ok(stats)
}

/// Sweeps the neighbourhood of a cell taken off the heap, then drains the
/// breadth-first spread it set off. Cells at or below the spill elevation `z`
/// are raised to it and join the spread; cells of missing terrain join the
/// spread unmodified; every other cell is the region's rim and re-enters the
/// heap. The spread stops at closed cells and at the rim.
fn spread_from<T: CellValue>(
    dem: &mut Array2D<T>,
    closed: &mut Array2D<i8>,
    open: &mut FloodFrontier<T>,
    trace: &mut VecDeque<(isize, isize)>,
    start: (isize, isize),
    z: T,
    stats: &mut FloodStats,
) {
    let nodata = dem.nodata();
    let (mut row, mut col) = start;
    loop {
        let zc = dem.get_value(row, col);
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
            stats.cells_processed += 1;

            let zn = dem.get_value(row_n, col_n);
            if zn == nodata {
                trace.push_back((row_n, col_n));
            } else if zn <= z && z != nodata && zc != nodata {
                if zn < z {
                    stats.pit_cells += 1;
                    dem.set_value(row_n, col_n, z);
                }
                trace.push_back((row_n, col_n));
            } else {
                open.push(row_n, col_n, zn);
            }
        }

        match trace.pop_front() {
            Some(next) => {
                row = next.0;
                col = next.1;
            }
            None => break,
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::improved_priority_flood;
    use super::zhou_priority_flood;
    use crate::structures::Array2D;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    const NODATA: f64 = -32768f64;

    #[test]
    fn test_single_pit_is_filled() {
        let mut dem: Array2D<f64> = Array2D::new(5, 5, 10f64, NODATA).unwrap();
        dem.set_value(2, 2, 5f64);
        let stats = zhou_priority_flood(&mut dem).unwrap();
        for row in 0..5 {
            for col in 0..5 {
                assert_eq!(dem.get_value(row, col), 10f64);
            }
        }
        assert_eq!(stats.pit_cells, 1);
        assert_eq!(stats.cells_processed, 25);
    }

    #[test]
    fn test_matches_the_improved_fill_exactly() {
        let mut rng = SmallRng::seed_from_u64(20160604);
        let mut a: Array2D<f64> = Array2D::new(100, 100, 0f64, NODATA).unwrap();
        for row in 0..a.rows {
            for col in 0..a.columns {
                a.set_value(row, col, rng.gen_range(0..256) as f64);
            }
        }
        let mut b = a.duplicate();
        let stats_a = improved_priority_flood(&mut a).unwrap();
        let stats_b = zhou_priority_flood(&mut b).unwrap();
        assert_eq!(a, b);
        assert_eq!(stats_a.pit_cells, stats_b.pit_cells);
    }

    #[test]
    fn test_matches_the_improved_fill_with_nodata_holes() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut a: Array2D<f64> = Array2D::new(40, 40, 0f64, NODATA).unwrap();
        for row in 0..a.rows {
            for col in 0..a.columns {
                if rng.gen_range(0..10) == 0 {
                    a.set_value(row, col, NODATA);
                } else {
                    a.set_value(row, col, rng.gen_range(0..50) as f64);
                }
            }
        }
        let mut b = a.duplicate();
        improved_priority_flood(&mut a).unwrap();
        zhou_priority_flood(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_plateau_spread_closes_every_cell() {
        // a large flat basin inside a rim forces the breadth-first spread path
        let mut dem: Array2D<f64> = Array2D::new(20, 20, 6f64, NODATA).unwrap();
        for row in 5..15 {
            for col in 5..15 {
                dem.set_value(row, col, 2f64);
            }
        }
        let stats = zhou_priority_flood(&mut dem).unwrap();
        assert_eq!(stats.cells_processed, 400);
        assert_eq!(stats.pit_cells, 100);
        for row in 0..20 {
            for col in 0..20 {
                assert_eq!(dem.get_value(row, col), 6f64);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let mut rng = SmallRng::seed_from_u64(77);
        let mut dem: Array2D<f64> = Array2D::new(30, 30, 0f64, NODATA).unwrap();
        for row in 0..dem.rows {
            for col in 0..dem.columns {
                dem.set_value(row, col, rng.gen_range(0..100) as f64);
            }
        }
        zhou_priority_flood(&mut dem).unwrap();
        let once = dem.duplicate();
        zhou_priority_flood(&mut dem).unwrap();
        assert_eq!(dem, once);
    }
}
