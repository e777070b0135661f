//! Integer and floating-point grid coordinates with quarter-turn rotation.
//!
//! All rotation in the dungeon grid is yaw-only and restricted to 90°
//! increments. A "normalized rotation" is an integer in `0..=3`, counting
//! quarter turns counter-clockwise: 0 faces North (+X), 1 East (+Y),
//! 2 South (−X), 3 West (−Y).

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Address of one cell in the 3D dungeon grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridCoordinate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCoordinate {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Rotate around the Z axis by a normalized rotation.
    ///
    /// Panics on rotations outside `0..=3` — callers must normalize first.
    pub fn rotate_by(self, rotation: u8) -> Self {
        match rotation {
            0 => self,
            1 => Self::new(-self.y, self.x, self.z),
            2 => Self::new(-self.x, -self.y, self.z),
            3 => Self::new(self.y, -self.x, self.z),
            _ => panic!("rotation {rotation} out of range 0..=3"),
        }
    }
}

impl Add for GridCoordinate {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for GridCoordinate {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Continuous grid coordinate, used while snapping world positions to cells.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridCoordinateFloat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl GridCoordinateFloat {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Same 4-case table as [`GridCoordinate::rotate_by`].
    pub fn rotate_by(self, rotation: u8) -> Self {
        match rotation {
            0 => self,
            1 => Self::new(-self.y, self.x, self.z),
            2 => Self::new(-self.x, -self.y, self.z),
            3 => Self::new(self.y, -self.x, self.z),
            _ => panic!("rotation {rotation} out of range 0..=3"),
        }
    }

    /// Truncate to the containing cell (floor on every component).
    pub fn snap_to_grid(self) -> GridCoordinate {
        GridCoordinate::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

impl Add for GridCoordinateFloat {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for GridCoordinateFloat {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// A cell plus a local facing, e.g. a room or exit orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCoordinateWithRotation {
    pub position: GridCoordinate,
    pub rotation: u8,
}

/// Continuous counterpart of [`GridCoordinateWithRotation`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridCoordinateFloatWithRotation {
    pub position: GridCoordinateFloat,
    pub rotation: u8,
}

impl GridCoordinateFloatWithRotation {
    pub fn new(position: GridCoordinateFloat, rotation: u8) -> Self {
        Self { position, rotation }
    }

    /// Express a child-local position in this (parent) coordinate's space.
    pub fn position_in_parent_space(&self, local: GridCoordinateFloat) -> GridCoordinateFloat {
        self.position + local.rotate_by(self.rotation)
    }

    /// Compose a child-local placement with this (parent) placement.
    pub fn compose(&self, local: &GridCoordinateFloatWithRotation) -> Self {
        Self {
            position: self.position_in_parent_space(local.position),
            rotation: normalize_rotation(self.rotation as i32 + local.rotation as i32),
        }
    }

    pub fn snap_to_grid(&self) -> GridCoordinateWithRotation {
        GridCoordinateWithRotation {
            position: self.position.snap_to_grid(),
            rotation: self.rotation,
        }
    }
}

/// Reduce a quarter-turn count (possibly negative) into `0..=3`.
pub fn normalize_rotation(quarter_turns: i32) -> u8 {
    quarter_turns.rem_euclid(4) as u8
}

/// Derive a normalized rotation from a world yaw in degrees.
///
/// Rounds to the nearest 90° first, which absorbs the small negative yaws
/// produced by repeated world↔grid round trips through quaternions.
pub fn rotation_world_to_grid(yaw_degrees: f32) -> u8 {
    normalize_rotation((yaw_degrees / 90.0).round() as i32)
}

/// World yaw in degrees for a normalized rotation.
pub fn rotation_grid_to_world(rotation: u8) -> f32 {
    assert!(rotation < 4, "rotation {rotation} out of range 0..=3");
    rotation as f32 * 90.0
}

/// Unit grid step for a normalized rotation: N=+X, E=+Y, S=−X, W=−Y.
pub fn direction_for_rotation(rotation: u8) -> GridCoordinate {
    GridCoordinate::new(1, 0, 0).rotate_by(rotation)
}

/// Inverse of [`direction_for_rotation`].
///
/// Panics unless `direction` is a horizontal unit step between adjacent
/// cells — anything else is a caller bug.
pub fn rotation_for_direction(direction: GridCoordinate) -> u8 {
    match (direction.x, direction.y, direction.z) {
        (1, 0, 0) => 0,
        (0, 1, 0) => 1,
        (-1, 0, 0) => 2,
        (0, -1, 0) => 3,
        _ => panic!("direction {direction:?} is not a unit horizontal step"),
    }
}

/// The six axis-aligned neighbours of a cell (±X, ±Y, ±Z).
pub fn neighbours_3d(cell: GridCoordinate) -> [GridCoordinate; 6] {
    [
        cell + GridCoordinate::new(1, 0, 0),
        cell + GridCoordinate::new(0, 1, 0),
        cell + GridCoordinate::new(-1, 0, 0),
        cell + GridCoordinate::new(0, -1, 0),
        cell + GridCoordinate::new(0, 0, 1),
        cell + GridCoordinate::new(0, 0, -1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_round_trips() {
        let samples = [
            GridCoordinate::new(0, 0, 0),
            GridCoordinate::new(1, 0, 0),
            GridCoordinate::new(3, -2, 5),
            GridCoordinate::new(-7, 4, -1),
        ];
        for rotation in 0..4u8 {
            let inverse = normalize_rotation(4 - rotation as i32);
            for c in samples {
                assert_eq!(c.rotate_by(rotation).rotate_by(inverse), c);
            }
        }
    }

    #[test]
    fn test_rotation_table() {
        let c = GridCoordinate::new(1, 0, 2);
        assert_eq!(c.rotate_by(0), GridCoordinate::new(1, 0, 2));
        assert_eq!(c.rotate_by(1), GridCoordinate::new(0, 1, 2));
        assert_eq!(c.rotate_by(2), GridCoordinate::new(-1, 0, 2));
        assert_eq!(c.rotate_by(3), GridCoordinate::new(0, -1, 2));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_rotation_out_of_range_panics() {
        GridCoordinate::new(1, 0, 0).rotate_by(4);
    }

    #[test]
    fn test_direction_for_rotation_round_trips() {
        for rotation in 0..4u8 {
            assert_eq!(rotation_for_direction(direction_for_rotation(rotation)), rotation);
        }
    }

    #[test]
    #[should_panic(expected = "unit horizontal step")]
    fn test_rotation_for_vertical_direction_panics() {
        rotation_for_direction(GridCoordinate::new(0, 0, 1));
    }

    #[test]
    #[should_panic(expected = "unit horizontal step")]
    fn test_rotation_for_diagonal_direction_panics() {
        rotation_for_direction(GridCoordinate::new(1, 1, 0));
    }

    #[test]
    fn test_rotation_world_to_grid() {
        assert_eq!(rotation_world_to_grid(0.0), 0);
        assert_eq!(rotation_world_to_grid(90.0), 1);
        assert_eq!(rotation_world_to_grid(180.0), 2);
        assert_eq!(rotation_world_to_grid(270.0), 3);
        assert_eq!(rotation_world_to_grid(360.0), 0);
        // Rounding to nearest 90°
        assert_eq!(rotation_world_to_grid(85.0), 1);
        assert_eq!(rotation_world_to_grid(-90.0), 3);
        // Tiny negative yaw from quaternion round trips snaps back to 0
        assert_eq!(rotation_world_to_grid(-0.001), 0);
    }

    #[test]
    fn test_snap_floors_negative_components() {
        let f = GridCoordinateFloat::new(-0.25, 1.75, -1.0);
        assert_eq!(f.snap_to_grid(), GridCoordinate::new(-1, 1, -1));
    }

    #[test]
    fn test_parent_space_composition() {
        // Parent at (2, 3), facing East: child-local +X maps onto +Y.
        let parent = GridCoordinateFloatWithRotation::new(GridCoordinateFloat::new(2.0, 3.0, 0.0), 1);
        let child = GridCoordinateFloatWithRotation::new(GridCoordinateFloat::new(1.0, 0.0, 0.0), 1);
        let composed = parent.compose(&child);
        assert_eq!(composed.position, GridCoordinateFloat::new(2.0, 4.0, 0.0));
        assert_eq!(composed.rotation, 2);
    }

    #[test]
    fn test_neighbours_3d() {
        let n = neighbours_3d(GridCoordinate::new(0, 0, 0));
        assert_eq!(n.len(), 6);
        assert!(n.contains(&GridCoordinate::new(0, 0, 1)));
        assert!(n.contains(&GridCoordinate::new(0, 0, -1)));
        assert!(n.contains(&GridCoordinate::new(-1, 0, 0)));
    }
}
