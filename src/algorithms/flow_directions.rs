/*
This code is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 21/03/2023
Last Modified: 18/11/2024
License: MIT
*/

use super::*;
use crate::structures::{Array2D, FloodFrontier};
use std::io::Error;

/// Determines D8 flow directions by flooding inwards from the edges of the DEM,
/// after Metz et al. (2011); pits are implicitly carved to their drainage points,
/// so the input grid is read but never modified. Each cell's direction points at
/// the cell that pulled it off the frontier.
///
/// Directions are the values 1..8 in the ring
///
/// ```text
///   2 3 4
///   1 . 5
///   8 7 6
/// ```
///
/// with [`NO_FLOW`] for cells of missing terrain. Border cells point off the
/// grid. Ties in elevation are deterministic: the frontier breaks them first-in,
/// first-out, and each cell sweeps its neighbours cardinals-first, so two runs
/// over the same grid always agree.
pub fn priority_flood_flowdirs<T: CellValue>(
    dem: &Array2D<T>,
) -> Result<(Array2D<i8>, FloodStats), Error> {
    validate_dimensions(dem)?;
    let rows = dem.rows;
    let columns = dem.columns;
    let nodata = dem.nodata();
    let mut flowdirs: Array2D<i8> = Array2D::new_like(dem, NO_FLOW, NO_FLOW)?;
    let mut closed: Array2D<i8> = Array2D::new_like(dem, 0, -1)?;
    let mut open: FloodFrontier<T> = FloodFrontier::with_capacity((2 * (rows + columns)) as usize);
    let mut stats = FloodStats::default();

    seed_edge_cells(dem, &mut closed, &mut open);
    for col in 0..columns {
        flowdirs.set_value(0, col, edge_flow_direction(dem, 0, col));
        if rows > 1 {
            flowdirs.set_value(rows - 1, col, edge_flow_direction(dem, rows - 1, col));
        }
    }
    for row in 1..rows - 1 {
        flowdirs.set_value(row, 0, edge_flow_direction(dem, row, 0));
        if columns > 1 {
            flowdirs.set_value(row, columns - 1, edge_flow_direction(dem, row, columns - 1));
        }
    }

    while let Some(cell) = open.pop() {
        let (row, col) = (cell.row, cell.column);
        stats.cells_processed += 1;
        for i in 0..8usize {
            let n = D8_SWEEP_ORDER[i];
            let row_n = row + DY[n];
            let col_n = col + DX[n];
            if !dem.is_in_grid(row_n, col_n) {
                continue;
            }
            if closed[(row_n, col_n)] == 1 {
                continue;
            }
            closed[(row_n, col_n)] = 1;

            let zn = dem[(row_n, col_n)];
            if zn == nodata {
                flowdirs.set_value(row_n, col_n, NO_FLOW);
            } else {
                flowdirs.set_value(row_n, col_n, INVERSE_FLOW[n]);
            }
            open.push(row_n, col_n, zn);
        }
    }

    debug_assert_eq!(stats.cells_processed, (rows * columns) as u64);
    Ok((flowdirs, stats))
}

/// The direction a border cell flows: off the nearest grid edge, corners along
/// their diagonals, nodata cells nowhere.
fn edge_flow_direction<T: CellValue>(dem: &Array2D<T>, row: isize, col: isize) -> i8 {
    debug_assert!(dem.is_edge_cell(row, col));
    if dem.get_value(row, col) == dem.nodata() {
        return NO_FLOW;
    }
    let last_row = dem.rows - 1;
    let last_col = dem.columns - 1;
    if row == 0 && col == 0 {
        2
    } else if row == last_row && col == 0 {
        8
    } else if row == 0 && col == last_col {
        4
    } else if row == last_row && col == last_col {
        6
    } else if col == 0 {
        1
    } else if col == last_col {
        5
    } else if row == 0 {
        3
    } else {
        7
    }
}

#[cfg(test)]
mod test {
    use super::super::{DX, DY, NO_FLOW};
    use super::priority_flood_flowdirs;
    use crate::structures::Array2D;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    const NODATA: f64 = -32768f64;

    #[test]
    fn test_border_cells_point_off_grid() {
        let dem: Array2D<f64> = Array2D::new(3, 3, 0f64, NODATA).unwrap();
        let (fd, stats) = priority_flood_flowdirs(&dem).unwrap();
        assert_eq!(stats.cells_processed, 9);
        assert_eq!(fd.get_value(0, 0), 2);
        assert_eq!(fd.get_value(0, 2), 4);
        assert_eq!(fd.get_value(2, 0), 8);
        assert_eq!(fd.get_value(2, 2), 6);
        assert_eq!(fd.get_value(0, 1), 3);
        assert_eq!(fd.get_value(1, 0), 1);
        assert_eq!(fd.get_value(1, 2), 5);
        assert_eq!(fd.get_value(2, 1), 7);
    }

    #[test]
    fn test_flat_tie_break_is_deterministic() {
        // all-equal elevations: the centre is claimed by the first seeded corner
        // through its south-east sweep, so it points back north-west
        let dem: Array2D<f64> = Array2D::new(3, 3, 0f64, NODATA).unwrap();
        let (fd1, _) = priority_flood_flowdirs(&dem).unwrap();
        assert_eq!(fd1.get_value(1, 1), 2);
        let (fd2, _) = priority_flood_flowdirs(&dem).unwrap();
        for row in 0..3 {
            for col in 0..3 {
                assert_eq!(fd1.get_value(row, col), fd2.get_value(row, col));
            }
        }
    }

    #[test]
    fn test_nodata_cells_have_no_flow() {
        let mut dem: Array2D<f64> = Array2D::new(5, 5, 10f64, NODATA).unwrap();
        dem.set_value(2, 2, NODATA);
        dem.set_value(0, 3, NODATA);
        let (fd, _) = priority_flood_flowdirs(&dem).unwrap();
        assert_eq!(fd.get_value(2, 2), NO_FLOW);
        assert_eq!(fd.get_value(0, 3), NO_FLOW);
        assert_eq!(dem.get_value(2, 2), NODATA); // input untouched
    }

    #[test]
    fn test_every_cell_flows_to_the_edge() {
        let mut rng = SmallRng::seed_from_u64(1234);
        let mut dem: Array2D<f64> = Array2D::new(20, 27, 0f64, NODATA).unwrap();
        for row in 0..dem.rows {
            for col in 0..dem.columns {
                dem.set_value(row, col, rng.gen_range(0..100) as f64);
            }
        }
        let (fd, _) = priority_flood_flowdirs(&dem).unwrap();
        let max_steps = dem.rows * dem.columns;
        for row in 0..dem.rows {
            for col in 0..dem.columns {
                let (mut r, mut c) = (row, col);
                let mut steps = 0;
                while !dem.is_edge_cell(r, c) {
                    let d = fd.get_value(r, c);
                    assert!(d >= 1 && d <= 8);
                    r += DY[d as usize];
                    c += DX[d as usize];
                    steps += 1;
                    assert!(steps <= max_steps, "flow path from ({}, {}) does not reach the edge", row, col);
                }
                assert!(fd.get_value(r, c) >= 1);
            }
        }
    }
}
