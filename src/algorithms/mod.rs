/*
This code is part of the FloodTools DEM preprocessing library.
Authors: FloodTools developers
Created: 14/03/2023
Last Modified: 02/05/2025
License: MIT
*/

//! Depression-removal algorithms of the Priority-Flood family, after Barnes,
//! Lehman and Mulla (2014), together with the faster two-stage variant of Zhou,
//! Sun and Fu (2016). Each algorithm works on caller-owned [`Array2D`] grids and
//! performs no file I/O; the tool layer is responsible for reading and writing
//! rasters and for reporting the returned counters.

mod flow_directions;
mod pit_mask;
mod priority_flood;
mod watersheds;
mod zhou_fill;

pub use self::flow_directions::priority_flood_flowdirs;
pub use self::pit_mask::pit_mask;
pub use self::priority_flood::improved_priority_flood;
pub use self::priority_flood::original_priority_flood;
pub use self::priority_flood::priority_flood_epsilon;
pub use self::watersheds::priority_flood_watersheds;
pub use self::zhou_fill::zhou_priority_flood;

use crate::structures::{Array2D, FloodFrontier};
use std::io::{Error, ErrorKind};

// D8 neighbour numbering:
//   2 3 4
//   1 . 5
//   8 7 6

/// Column offsets of the D8 neighbours, from a central cell.
pub const DX: [isize; 9] = [0, -1, -1, 0, 1, 1, 1, 0, -1];
/// Row offsets of the D8 neighbours, from a central cell.
pub const DY: [isize; 9] = [0, 0, -1, -1, -1, 0, 1, 1, 1];
/// For each D8 direction, the opposite direction.
pub const INVERSE_FLOW: [i8; 9] = [0, 5, 6, 7, 8, 1, 2, 3, 4];
/// Neighbour visitation order used when flow directions are assigned: the four
/// cardinal directions are swept before the diagonals, so that a cell discovered
/// by several equal-elevation donors in the same sweep takes the cardinal one.
pub const D8_SWEEP_ORDER: [usize; 8] = [1, 3, 5, 7, 2, 4, 6, 8];

/// Flow-direction value of a cell without a defined flow direction.
pub const NO_FLOW: i8 = -1;
/// Pit-mask value marking a cell with no terrain.
pub const PIT_MASK_NODATA: i32 = 3;
/// Watershed label of an unlabelled cell.
pub const UNLABELLED: i32 = -1;

/// The element types an elevation grid may carry. Blanket-implemented for every
/// `Copy + PartialOrd` numeric type; the flood loops are monomorphized over it and
/// never branch on the concrete type.
pub trait CellValue: Copy + PartialOrd + 'static {}

impl<T: Copy + PartialOrd + 'static> CellValue for T {}

/// Floating-point cell types that can produce the IEEE-754 successor of a value,
/// as `nextafter(z, +inf)` does in C. The epsilon-gradient fill is only defined
/// over these.
pub trait NextAfter: CellValue {
    /// The smallest representable value strictly greater than `self`, or `self`
    /// when no such value exists.
    fn next_after_up(self) -> Self;
}

impl NextAfter for f32 {
    fn next_after_up(self) -> f32 {
        if self.is_nan() || (self.is_infinite() && self > 0f32) {
            return self;
        }
        if self == 0f32 {
            return f32::from_bits(1u32);
        }
        if self > 0f32 {
            f32::from_bits(self.to_bits() + 1)
        } else {
            f32::from_bits(self.to_bits() - 1)
        }
    }
}

impl NextAfter for f64 {
    fn next_after_up(self) -> f64 {
        if self.is_nan() || (self.is_infinite() && self > 0f64) {
            return self;
        }
        if self == 0f64 {
            return f64::from_bits(1u64);
        }
        if self > 0f64 {
            f64::from_bits(self.to_bits() + 1)
        } else {
            f64::from_bits(self.to_bits() - 1)
        }
    }
}

/// Counters reported by a flood pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloodStats {
    /// Cells taken off the frontier or the pit queue; equals the cell count of the
    /// grid when a pass completes.
    pub cells_processed: u64,
    /// Cells found below the spill elevation of their drainage path.
    pub pit_cells: u64,
    /// Cells whose raised elevation could not clear the pit they drain through;
    /// nonzero only for the epsilon fill, where it signals that the element type is
    /// too narrow for the DEM's relief.
    pub false_pit_cells: u64,
}

/// Rejects grids with no cells. Degenerate single-row and single-column grids are
/// processed normally; every cell of such a grid is a border cell.
pub(crate) fn validate_dimensions<T: Copy>(dem: &Array2D<T>) -> Result<(), Error> {
    if dem.rows < 1 || dem.columns < 1 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "The input DEM must contain at least one cell.",
        ));
    }
    Ok(())
}

/// Pushes every cell of the outer ring of the grid onto the frontier, at its own
/// elevation, and closes it. Cells are visited top row and bottom row first, then
/// the left and right columns, so that frontier insertion order is reproducible
/// run to run. Each border cell is seeded exactly once, whatever the grid shape.
pub(crate) fn seed_edge_cells<T: CellValue>(
    dem: &Array2D<T>,
    closed: &mut Array2D<i8>,
    frontier: &mut FloodFrontier<T>,
) {
    let rows = dem.rows;
    let columns = dem.columns;
    for col in 0..columns {
        frontier.push(0, col, dem.get_value(0, col));
        closed.set_value(0, col, 1);
        if rows > 1 {
            frontier.push(rows - 1, col, dem.get_value(rows - 1, col));
            closed.set_value(rows - 1, col, 1);
        }
    }
    for row in 1..rows - 1 {
        frontier.push(row, 0, dem.get_value(row, 0));
        closed.set_value(row, 0, 1);
        if columns > 1 {
            frontier.push(row, columns - 1, dem.get_value(row, columns - 1));
            closed.set_value(row, columns - 1, 1);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::structures::Array2D;
    use crate::structures::FloodFrontier;

    #[test]
    fn test_inverse_flow_round_trips() {
        for n in 1..9usize {
            let inv = INVERSE_FLOW[n] as usize;
            assert_eq!(DX[n], -DX[inv]);
            assert_eq!(DY[n], -DY[inv]);
            assert_eq!(INVERSE_FLOW[inv] as usize, n);
        }
    }

    #[test]
    fn test_next_after_up_is_the_ieee_successor() {
        assert_eq!(2.0f32.next_after_up(), f32::from_bits(2.0f32.to_bits() + 1));
        assert!(2.0f32.next_after_up() > 2.0f32);
        assert!((-1.0f32).next_after_up() > -1.0f32);
        assert!(0.0f32.next_after_up() > 0.0f32);
        assert!((-0.0f32).next_after_up() > 0.0f32 - 1e-30f32);
        assert_eq!(f32::INFINITY.next_after_up(), f32::INFINITY);
        assert_eq!(f32::MAX.next_after_up(), f32::INFINITY);
        assert!(10.0f64.next_after_up() > 10.0f64);
        assert_eq!(10.0f64.next_after_up(), f64::from_bits(10.0f64.to_bits() + 1));
    }

    #[test]
    fn test_seed_edge_cells_seeds_the_ring_once() {
        let dem: Array2D<i32> = Array2D::new(4, 5, 7, -999).unwrap();
        let mut closed: Array2D<i8> = Array2D::new_like(&dem, 0, -1).unwrap();
        let mut frontier: FloodFrontier<i32> = FloodFrontier::new();
        seed_edge_cells(&dem, &mut closed, &mut frontier);
        assert_eq!(frontier.len(), 2 * 5 + 2 * (4 - 2));
        for row in 0..4 {
            for col in 0..5 {
                let expected = if dem.is_edge_cell(row, col) { 1 } else { 0 };
                assert_eq!(closed.get_value(row, col), expected);
            }
        }
    }

    #[test]
    fn test_seed_edge_cells_degenerate_grids() {
        // single row: every cell is a border cell, seeded exactly once
        let dem: Array2D<i32> = Array2D::new(1, 4, 0, -999).unwrap();
        let mut closed: Array2D<i8> = Array2D::new_like(&dem, 0, -1).unwrap();
        let mut frontier: FloodFrontier<i32> = FloodFrontier::new();
        seed_edge_cells(&dem, &mut closed, &mut frontier);
        assert_eq!(frontier.len(), 4);

        // single column
        let dem: Array2D<i32> = Array2D::new(4, 1, 0, -999).unwrap();
        let mut closed: Array2D<i8> = Array2D::new_like(&dem, 0, -1).unwrap();
        let mut frontier: FloodFrontier<i32> = FloodFrontier::new();
        seed_edge_cells(&dem, &mut closed, &mut frontier);
        assert_eq!(frontier.len(), 4);
    }
}
