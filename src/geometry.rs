//! Fundamental geometric types for building response models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a horizontal slab level.
///
/// Stories are numbered `1..=N` upward, level `0` is the base and sub-levels run
/// `-1..=-M` downward.
pub type Level = i32;

/// Identifier of a recorded finite-element node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Global axis along which a response component is recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Horizontal axis, east in ground-motion records.
    X,
    /// Horizontal axis, north in ground-motion records.
    Y,
    /// Vertical axis.
    Z,
}

impl Direction {
    /// All three directions in record order.
    pub const ALL: [Direction; 3] = [Direction::X, Direction::Y, Direction::Z];
    /// The two horizontal directions.
    pub const HORIZONTAL: [Direction; 2] = [Direction::X, Direction::Y];

    /// Position of the component inside `[x, y, z]` arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Direction::X => 0,
            Direction::Y => 1,
            Direction::Z => 2,
        }
    }

    /// Return `true` for `X` and `Y`.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        !matches!(self, Direction::Z)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::X => "x",
            Direction::Y => "y",
            Direction::Z => "z",
        };
        f.write_str(name)
    }
}

/// Position in three dimensional space measured in metres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Distance along the global X axis.
    pub x: f64,
    /// Distance along the global Y axis.
    pub y: f64,
    /// Distance along the global Z axis.
    pub z: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Coordinate along `direction`.
    #[must_use]
    pub const fn coordinate(self, direction: Direction) -> f64 {
        match direction {
            Direction::X => self.x,
            Direction::Y => self.y,
            Direction::Z => self.z,
        }
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use seismic_response::point;
///
/// let corner = point(0.0, 24.0, 3.5);
/// assert_eq!(corner.y, 24.0);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64, z: f64) -> Point {
    Point::new(x, y, z)
}

/// Soil-structure configuration of a simulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Foundation {
    /// Structure clamped at the base; nodal reactions are recorded.
    #[default]
    FixedBase,
    /// Soil box with absorbing boundaries.
    AbsorbingBoundaries,
    /// Soil box driven by the domain reduction method.
    Drm,
}

impl Foundation {
    /// Return `true` when the base can rotate, so drift needs a rotation correction.
    #[must_use]
    pub const fn is_compliant(self) -> bool {
        !matches!(self, Foundation::FixedBase)
    }
}
