//! Cell identity and region geometry
//!
//! A cell is a fixed-size unit of world state addressed by its world name
//! and integer `(x, z)` grid position. Regions are the squares of cells that
//! preload tasks operate on.

mod region;
mod types;

pub use region::{Region, RegionCells};
pub use types::{parse_coordinate, CellError, CellKey, KEY_SEPARATOR};

#[cfg(test)]
mod tests;
