//! Location keys identifying discrete cells in space.
//!
//! A location key is the deduplication slot: two keys with identical
//! coordinates always refer to the same slot, no matter where they were
//! constructed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exact integer coordinates of a block-sized cell.
///
/// Equality and hashing are by value, so keys can be rebuilt freely from
/// host positions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct LocationKey {
    /// East-west coordinate
    pub x: i32,
    /// Vertical coordinate
    pub y: i32,
    /// North-south coordinate
    pub z: i32,
}

impl LocationKey {
    /// Create a key from its three coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Coordinates as a tuple.
    pub const fn as_tuple(&self) -> (i32, i32, i32) {
        (self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for LocationKey {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<[i32; 3]> for LocationKey {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}
