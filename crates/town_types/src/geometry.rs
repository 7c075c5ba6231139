//! Map geometry: axis-aligned rectangles and player locations.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in map pixel coordinates.
///
/// `(x, y)` is the top-left corner. Width and height are expected to be
/// positive; the map loader rejects objects that are not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Returns true when the two rectangles share interior area.
    ///
    /// Rectangles that only touch along an edge do not overlap.
    ///
    /// # Arguments
    ///
    /// * `other` - The rectangle to test against
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Returns true when the point lies inside the rectangle.
    ///
    /// The left and top edges are inclusive, the right and bottom edges are not,
    /// so a point on a shared edge belongs to exactly one of two adjacent boxes.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Which way a player sprite is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Front,
    Back,
    Left,
    Right,
}

/// Where a player is standing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLocation {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: Direction,
    #[serde(default)]
    pub moving: bool,
    /// Region the client believes it is standing in. Informational only;
    /// occupancy is computed server-side from `x` and `y`.
    #[serde(default, rename = "interactableID", skip_serializing_if = "Option::is_none")]
    pub interactable_id: Option<String>,
}

impl PlayerLocation {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }
}
