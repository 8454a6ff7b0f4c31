// private sub-module defined in other files
mod fill_depressions;
mod fill_depressions_epsilon;
mod fill_depressions_original;
mod fill_depressions_zhou;
mod flood_flow_directions;
mod pit_mask;
mod watersheds;

// exports identifiers from private sub-modules in the current module namespace
pub use self::fill_depressions::FillDepressions;
pub use self::fill_depressions_epsilon::FillDepressionsEpsilon;
pub use self::fill_depressions_original::FillDepressionsOriginal;
pub use self::fill_depressions_zhou::FillDepressionsZhou;
pub use self::flood_flow_directions::FloodFlowDirections;
pub use self::pit_mask::PitMask;
pub use self::watersheds::Watersheds;
