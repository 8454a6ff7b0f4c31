/*
This code is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 09/05/2023
Last Modified: 02/05/2025
License: MIT
*/

use super::*;
use crate::structures::{Array2D, FloodFrontier};
use std::collections::VecDeque;
use std::io::Error;

/// Labels watershed drainage areas, working inwards from the edges of the DEM.
///
/// Labels start out as [`UNLABELLED`]. Whenever an unlabelled cell of valid
/// terrain comes off the frontier it begins a new watershed, taking the next
/// label (numbered upward from 1); cells flooded from a labelled cell take on
/// that cell's label. Every border cell that is not flooded first therefore
/// roots its own watershed, and cells sharing a label drain to a common point.
/// Cells adjacent to interior regions of missing terrain inherit no label from
/// them and root new watersheds of their own when they surface.
///
/// Cells of missing terrain are never labelled. When `alter_elevations` is true
/// the DEM is filled as by [`improved_priority_flood`]; otherwise it is read but
/// left unmodified.
pub fn priority_flood_watersheds<T: CellValue>(
    dem: &mut Array2D<T>,
    alter_elevations: bool,
) -> Result<(Array2D<i32>, FloodStats), Error> {
    validate_dimensions(dem)?;
    let rows = dem.rows;
    let columns = dem.columns;
    let nodata = dem.nodata();
    let mut labels: Array2D<i32> = Array2D::new_like(dem, UNLABELLED, UNLABELLED)?;
    let mut closed: Array2D<i8> = Array2D::new_like(dem, 0, -1)?;
    let mut open: FloodFrontier<T> = FloodFrontier::with_capacity((2 * (rows + columns)) as usize);
    let mut pit: VecDeque<(T, isize, isize)> = VecDeque::new();
    let mut current_label = 1i32;
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

        // an unlabelled cell surfacing here borders the grid edge or a region
        // of missing terrain; it begins a new watershed
        if labels.get_value(row, col) == UNLABELLED && dem.get_value(row, col) != nodata {
            labels.set_value(row, col, current_label);
            current_label += 1;
        }
        let label = labels.get_value(row, col);

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
                continue;
            }
            labels.set_value(row_n, col_n, label);

            if zn <= z && z != nodata {
                if alter_elevations && zn < z {
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
    Ok((labels, stats))
}

#[cfg(test)]
mod test {
    use super::super::UNLABELLED;
    use super::priority_flood_watersheds;
    use crate::algorithms::improved_priority_flood;
    use crate::structures::Array2D;

    const NODATA: f64 = -32768f64;

    #[test]
    fn test_every_valid_cell_is_labelled() {
        let mut dem: Array2D<f64> = Array2D::new(6, 7, 5f64, NODATA).unwrap();
        dem.set_value(3, 3, 1f64);
        dem.set_value(2, 4, 9f64);
        let (labels, stats) = priority_flood_watersheds(&mut dem, false).unwrap();
        assert_eq!(stats.cells_processed, 42);
        for row in 0..6 {
            for col in 0..7 {
                assert!(labels.get_value(row, col) >= 1);
            }
        }
    }

    #[test]
    fn test_border_cells_root_labels_in_pop_order() {
        // on a single ramp row every cell is a border seed, so each roots its
        // own watershed, numbered in order of increasing elevation
        let mut dem: Array2D<f64> = Array2D::new(1, 4, 0f64, NODATA).unwrap();
        for col in 0..4 {
            dem.set_value(0, col, (col + 1) as f64);
        }
        let (labels, _) = priority_flood_watersheds(&mut dem, false).unwrap();
        for col in 0..4 {
            assert_eq!(labels.get_value(0, col), col as i32 + 1);
        }
    }

    #[test]
    fn test_interior_cells_inherit_their_donor_label() {
        // a bowl in the middle of a plateau floods from the lowest border cell,
        // so the whole interior shares that cell's watershed
        let mut dem: Array2D<f64> = Array2D::new(5, 5, 9f64, NODATA).unwrap();
        dem.set_value(2, 0, 3f64);
        dem.set_value(2, 1, 1f64);
        dem.set_value(2, 2, 1f64);
        let (labels, _) = priority_flood_watersheds(&mut dem, false).unwrap();
        let outlet = labels.get_value(2, 0);
        assert!(outlet >= 1);
        assert_eq!(labels.get_value(2, 1), outlet);
        assert_eq!(labels.get_value(2, 2), outlet);
        // the rest of the interior pools at the plateau elevation reached from
        // the same outlet cell
        assert_eq!(labels.get_value(1, 1), outlet);
        assert_eq!(labels.get_value(2, 3), outlet);
        assert_eq!(labels.get_value(3, 3), outlet);
    }

    #[test]
    fn test_nodata_cells_stay_unlabelled() {
        let mut dem: Array2D<f64> = Array2D::new(5, 5, 10f64, NODATA).unwrap();
        dem.set_value(2, 2, NODATA);
        dem.set_value(4, 4, NODATA);
        let (labels, _) = priority_flood_watersheds(&mut dem, false).unwrap();
        assert_eq!(labels.get_value(2, 2), UNLABELLED);
        assert_eq!(labels.get_value(4, 4), UNLABELLED);
        assert!(labels.get_value(1, 1) >= 1);
    }

    #[test]
    fn test_alter_elevations_matches_depression_filling() {
        let mut filled: Array2D<f64> = Array2D::new(6, 6, 8f64, NODATA).unwrap();
        filled.set_value(2, 2, 2f64);
        filled.set_value(3, 3, 4f64);
        let mut labelled = filled.duplicate();
        let mut untouched = filled.duplicate();
        improved_priority_flood(&mut filled).unwrap();
        priority_flood_watersheds(&mut labelled, true).unwrap();
        assert_eq!(labelled, filled);
        let before = untouched.duplicate();
        priority_flood_watersheds(&mut untouched, false).unwrap();
        assert_eq!(untouched, before);
    }
}
