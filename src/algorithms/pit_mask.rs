/*
This code is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 09/05/2023
Last Modified: 18/11/2024
License: MIT
*/

use super::*;
use crate::structures::{Array2D, FloodFrontier};
use std::collections::VecDeque;
use std::io::Error;

/// Flags every cell lying below the spill elevation of its drainage path. The
/// flood expands exactly as in [`improved_priority_flood`], but instead of
/// raising in-pit cells it writes `1` into the output mask, leaving the DEM
/// untouched. Cells outside any pit receive `0`; cells of missing terrain
/// receive [`PIT_MASK_NODATA`].
pub fn pit_mask<T: CellValue>(dem: &Array2D<T>) -> Result<(Array2D<i32>, FloodStats), Error> {
    validate_dimensions(dem)?;
    let rows = dem.rows;
    let columns = dem.columns;
    let nodata = dem.nodata();
    let mut mask: Array2D<i32> = Array2D::new_like(dem, 0, PIT_MASK_NODATA)?;
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
                    mask.set_value(row_n, col_n, 1);
                    stats.pit_cells += 1;
                }
                pit.push_back((z, row_n, col_n));
            } else {
                mask.set_value(row_n, col_n, 0);
                open.push(row_n, col_n, zn);
            }
        }

        if dem.get_value(row, col) == nodata {
            mask.set_value(row, col, PIT_MASK_NODATA);
        }
    }

    debug_assert_eq!(stats.cells_processed, (rows * columns) as u64);
    Ok((mask, stats))
}

#[cfg(test)]
mod test {
    use super::super::PIT_MASK_NODATA;
    use super::pit_mask;
    use crate::structures::Array2D;

    const NODATA: f64 = -32768f64;

    #[test]
    fn test_single_pit_is_flagged() {
        let mut dem: Array2D<f64> = Array2D::new(5, 5, 10f64, NODATA).unwrap();
        dem.set_value(2, 2, 5f64);
        let before = dem.duplicate();
        let (mask, stats) = pit_mask(&dem).unwrap();
        assert_eq!(mask.get_value(2, 2), 1);
        for row in 0..5 {
            for col in 0..5 {
                if row != 2 || col != 2 {
                    assert_eq!(mask.get_value(row, col), 0);
                }
            }
        }
        assert_eq!(stats.pit_cells, 1);
        assert_eq!(dem, before); // elevations are never modified
    }

    #[test]
    fn test_flat_grid_has_no_pits() {
        let dem: Array2D<f64> = Array2D::new(4, 6, 3f64, NODATA).unwrap();
        let (mask, stats) = pit_mask(&dem).unwrap();
        for row in 0..4 {
            for col in 0..6 {
                assert_eq!(mask.get_value(row, col), 0);
            }
        }
        assert_eq!(stats.pit_cells, 0);
    }

    #[test]
    fn test_nodata_cells_are_marked() {
        let mut dem: Array2D<f64> = Array2D::new(5, 5, 10f64, NODATA).unwrap();
        dem.set_value(2, 2, NODATA);
        dem.set_value(0, 0, NODATA); // border nodata too
        let (mask, _) = pit_mask(&dem).unwrap();
        assert_eq!(mask.get_value(2, 2), PIT_MASK_NODATA);
        assert_eq!(mask.get_value(0, 0), PIT_MASK_NODATA);
        assert_eq!(mask.get_value(1, 1), 0);
    }

    #[test]
    fn test_pit_bottom_and_walls() {
        // a two-cell depression draining through a notch of 7 in the border:
        // only the cells strictly below the spill elevation are flagged
        let mut dem: Array2D<f64> = Array2D::new(5, 5, 9f64, NODATA).unwrap();
        dem.set_value(2, 0, 7f64);
        dem.set_value(2, 1, 4f64);
        dem.set_value(2, 2, 6f64);
        let (mask, stats) = pit_mask(&dem).unwrap();
        assert_eq!(mask.get_value(2, 1), 1);
        assert_eq!(mask.get_value(2, 2), 1);
        assert_eq!(mask.get_value(2, 0), 0);
        assert_eq!(mask.get_value(2, 3), 0);
        assert_eq!(stats.pit_cells, 2);
    }
}
