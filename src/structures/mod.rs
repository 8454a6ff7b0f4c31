// private sub-modules defined in other files
mod array2d;
mod grid_cell;

pub use self::array2d::Array2D;
pub use self::grid_cell::FloodFrontier;
pub use self::grid_cell::GridCellZ;
