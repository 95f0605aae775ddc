//! Square regions of cells around a center point.

use super::types::{CellError, CellKey};

/// A `(2r+1) × (2r+1)` square of cells centered on a cell.
///
/// Regions are validated on construction, so every coordinate they yield
/// is representable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    center: CellKey,
    radius: u32,
}

impl Region {
    /// Builds the region of the given radius around `center`.
    ///
    /// A radius of 0 covers only the center cell.
    ///
    /// # Errors
    ///
    /// Returns [`CellError::NegativeRadius`] for a negative radius and
    /// [`CellError::CoordinateOverflow`] when an edge of the square would fall
    /// outside the `i32` coordinate range.
    pub fn around(center: CellKey, radius: i32) -> Result<Self, CellError> {
        if radius < 0 {
            return Err(CellError::NegativeRadius(radius));
        }

        let (x, z) = (center.x(), center.z());
        let fits = x.checked_sub(radius).is_some()
            && x.checked_add(radius).is_some()
            && z.checked_sub(radius).is_some()
            && z.checked_add(radius).is_some();
        if !fits {
            return Err(CellError::CoordinateOverflow { x, z, radius });
        }

        Ok(Self {
            center,
            radius: radius as u32,
        })
    }

    #[inline]
    pub fn center(&self) -> &CellKey {
        &self.center
    }

    #[inline]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Number of cells per side (`2r + 1`).
    #[inline]
    pub fn side(&self) -> u64 {
        2 * self.radius as u64 + 1
    }

    /// Total number of cells covered (`(2r + 1)²`).
    #[inline]
    pub fn cell_count(&self) -> u64 {
        self.side() * self.side()
    }

    /// Iterates every cell in the region in row-major order: x ascending,
    /// and for each x, z ascending.
    pub fn cells(&self) -> RegionCells<'_> {
        RegionCells {
            region: self,
            index: 0,
            count: self.cell_count(),
        }
    }
}

/// Iterator over the cells of a [`Region`].
#[derive(Debug, Clone)]
pub struct RegionCells<'a> {
    region: &'a Region,
    index: u64,
    count: u64,
}

impl Iterator for RegionCells<'_> {
    type Item = CellKey;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }

        let side = self.region.side();
        let dx = (self.index / side) as i64;
        let dz = (self.index % side) as i64;
        self.index += 1;

        let center = self.region.center();
        let r = self.region.radius as i64;
        // Construction guarantees these stay within i32.
        let x = (center.x() as i64 - r + dx) as i32;
        let z = (center.z() as i64 - r + dz) as i32;

        Some(center.with_position(x, z))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.index) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RegionCells<'_> {}
