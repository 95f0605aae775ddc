//! Cell type definitions

use std::fmt;
use std::str::FromStr;

/// Separator used by the canonical `world:x:z` key form.
pub const KEY_SEPARATOR: char = ':';

/// Identity of a single cell: the world it belongs to plus its integer
/// `(x, z)` position in that world's cell grid.
///
/// Keys are immutable values. Two keys are equal iff world, x and z all
/// match. Ordering is world first, then x, then z, which is also the order
/// used by every sorted report in this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    world: String,
    x: i32,
    z: i32,
}

impl CellKey {
    /// Creates a key for the cell at `(x, z)` in `world`.
    pub fn new(world: impl Into<String>, x: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            z,
        }
    }

    /// World (spatial domain) this cell belongs to.
    #[inline]
    pub fn world(&self) -> &str {
        &self.world
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn z(&self) -> i32 {
        self.z
    }

    /// Returns a key in the same world at a different position.
    pub fn with_position(&self, x: i32, z: i32) -> Self {
        Self::new(self.world.clone(), x, z)
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.world,
            self.x,
            self.z,
            sep = KEY_SEPARATOR
        )
    }
}

impl FromStr for CellKey {
    type Err = CellError;

    /// Parses the canonical `world:x:z` form.
    ///
    /// The coordinates are taken from the right so world names that contain
    /// the separator still round-trip.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, KEY_SEPARATOR);
        let z = parts.next();
        let x = parts.next();
        let world = parts.next();

        match (world, x, z) {
            (Some(world), Some(x), Some(z)) if !world.is_empty() => {
                let x = parse_coordinate(x)?;
                let z = parse_coordinate(z)?;
                Ok(Self::new(world, x, z))
            }
            _ => Err(CellError::MalformedKey(s.to_string())),
        }
    }
}

/// Parses a single cell coordinate as typed by an operator.
pub fn parse_coordinate(value: &str) -> Result<i32, CellError> {
    value
        .trim()
        .parse()
        .map_err(|_| CellError::InvalidCoordinate(value.to_string()))
}

/// Errors raised while building cell keys and regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellError {
    /// Key text is not of the form `world:x:z`
    MalformedKey(String),
    /// Coordinate is not a 32-bit integer
    InvalidCoordinate(String),
    /// Region radius is negative
    NegativeRadius(i32),
    /// Region extends past the representable coordinate range
    CoordinateOverflow { x: i32, z: i32, radius: i32 },
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellError::MalformedKey(key) => {
                write!(f, "Invalid cell key: '{}' (expected world:x:z)", key)
            }
            CellError::InvalidCoordinate(value) => {
                write!(f, "Invalid cell coordinate: '{}'", value)
            }
            CellError::NegativeRadius(radius) => {
                write!(f, "Invalid radius: {} (must be 0 or greater)", radius)
            }
            CellError::CoordinateOverflow { x, z, radius } => {
                write!(
                    f,
                    "Region of radius {} around ({}, {}) exceeds the coordinate range",
                    radius, x, z
                )
            }
        }
    }
}

impl std::error::Error for CellError {}
