//! World↔grid coordinate conversion.
//!
//! A [`GridTransform`] places the dungeon grid in world space: an origin,
//! a normalized quarter-turn rotation, and a per-axis tile size. None of
//! the conversions bounds-check — callers validate range separately when
//! they care.

use crate::grid::{
    normalize_rotation, GridCoordinate, GridCoordinateFloat, GridCoordinateFloatWithRotation,
    GridCoordinateWithRotation, rotation_world_to_grid,
};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Plain 3-component world-space vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPoint {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Quarter-turn yaw rotation, same table as the grid coordinates.
    pub fn rotate_by(self, rotation: u8) -> Self {
        match rotation {
            0 => self,
            1 => Self::new(-self.y, self.x, self.z),
            2 => Self::new(-self.x, -self.y, self.z),
            3 => Self::new(self.y, -self.x, self.z),
            _ => panic!("rotation {rotation} out of range 0..=3"),
        }
    }

    pub fn component_min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn component_max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }
}

impl Add for WorldPoint {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for WorldPoint {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for WorldPoint {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Default tile footprint: 5m × 5m cells, 2.5m per level.
pub const DEFAULT_TILE_SIZE: WorldPoint = WorldPoint::new(500.0, 500.0, 250.0);

/// Placement of the dungeon grid in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridTransform {
    pub origin: WorldPoint,
    pub rotation: u8,
    pub tile_size: WorldPoint,
}

impl Default for GridTransform {
    fn default() -> Self {
        Self {
            origin: WorldPoint::default(),
            rotation: 0,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl GridTransform {
    pub fn new(origin: WorldPoint, rotation: u8, tile_size: WorldPoint) -> Self {
        Self {
            origin,
            rotation: normalize_rotation(rotation as i32),
            tile_size,
        }
    }

    /// Identity transform with the given tile size, for room-local caching.
    pub fn local(tile_size: WorldPoint) -> Self {
        Self {
            origin: WorldPoint::default(),
            rotation: 0,
            tile_size,
        }
    }

    /// Continuous grid coordinate of a world position.
    pub fn world_to_grid_float(&self, position: WorldPoint) -> GridCoordinateFloat {
        let inverse = normalize_rotation(-(self.rotation as i32));
        let relative = (position - self.origin).rotate_by(inverse);
        GridCoordinateFloat::new(
            relative.x / self.tile_size.x,
            relative.y / self.tile_size.y,
            relative.z / self.tile_size.z,
        )
    }

    /// Containing cell of a world position (floors every component).
    pub fn world_to_grid(&self, position: WorldPoint) -> GridCoordinate {
        self.world_to_grid_float(position).snap_to_grid()
    }

    /// Continuous grid placement (position + facing) of a world placement.
    pub fn world_to_grid_float_with_rotation(
        &self,
        position: WorldPoint,
        yaw_degrees: f32,
    ) -> GridCoordinateFloatWithRotation {
        let rotation =
            normalize_rotation(rotation_world_to_grid(yaw_degrees) as i32 - self.rotation as i32);
        GridCoordinateFloatWithRotation::new(self.world_to_grid_float(position), rotation)
    }

    /// Snapped grid placement of a world placement.
    pub fn world_to_grid_with_rotation(
        &self,
        position: WorldPoint,
        yaw_degrees: f32,
    ) -> GridCoordinateWithRotation {
        self.world_to_grid_float_with_rotation(position, yaw_degrees)
            .snap_to_grid()
    }

    /// World position of a continuous grid coordinate, at cell-corner
    /// granularity.
    pub fn grid_to_world_float(&self, coordinate: GridCoordinateFloat) -> WorldPoint {
        let rotated = coordinate.rotate_by(self.rotation);
        self.origin
            + WorldPoint::new(
                rotated.x * self.tile_size.x,
                rotated.y * self.tile_size.y,
                rotated.z * self.tile_size.z,
            )
    }

    /// World position of a cell corner.
    pub fn grid_to_world(&self, cell: GridCoordinate) -> WorldPoint {
        self.grid_to_world_float(GridCoordinateFloat::new(
            cell.x as f32,
            cell.y as f32,
            cell.z as f32,
        ))
    }

    /// World position of a cell centre in X/Y, floor level in Z.
    pub fn grid_to_world_2d_center(&self, cell: GridCoordinate) -> WorldPoint {
        self.grid_to_world_float(
            GridCoordinateFloat::new(cell.x as f32, cell.y as f32, cell.z as f32)
                + GridCoordinateFloat::new(0.5, 0.5, 0.0),
        )
    }

    /// World position of the full 3D cell centre.
    pub fn grid_to_world_3d_center(&self, cell: GridCoordinate) -> WorldPoint {
        self.grid_to_world_float(
            GridCoordinateFloat::new(cell.x as f32, cell.y as f32, cell.z as f32)
                + GridCoordinateFloat::new(0.5, 0.5, 0.5),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid() -> GridTransform {
        GridTransform::default()
    }

    #[test]
    fn test_world_to_grid_floors() {
        let grid = unit_grid();
        assert_eq!(
            grid.world_to_grid(WorldPoint::new(499.0, 0.0, 0.0)),
            GridCoordinate::new(0, 0, 0)
        );
        assert_eq!(
            grid.world_to_grid(WorldPoint::new(500.0, -1.0, 251.0)),
            GridCoordinate::new(1, -1, 1)
        );
    }

    #[test]
    fn test_grid_to_world_round_trip() {
        let grid = GridTransform::new(
            WorldPoint::new(1000.0, -500.0, 250.0),
            3,
            DEFAULT_TILE_SIZE,
        );
        for cell in [
            GridCoordinate::new(0, 0, 0),
            GridCoordinate::new(4, -2, 1),
            GridCoordinate::new(-3, 7, -2),
        ] {
            let corner = grid.grid_to_world(cell);
            assert_eq!(grid.world_to_grid(corner + WorldPoint::new(1.0, 1.0, 1.0)), cell);
        }
    }

    #[test]
    fn test_cell_centers() {
        let grid = unit_grid();
        let cell = GridCoordinate::new(1, 1, 0);
        assert_eq!(
            grid.grid_to_world_2d_center(cell),
            WorldPoint::new(750.0, 750.0, 0.0)
        );
        assert_eq!(
            grid.grid_to_world_3d_center(cell),
            WorldPoint::new(750.0, 750.0, 125.0)
        );
    }

    #[test]
    fn test_rotated_grid() {
        // Grid rotated a quarter turn: grid +X runs along world +Y.
        let grid = GridTransform::new(WorldPoint::default(), 1, DEFAULT_TILE_SIZE);
        assert_eq!(
            grid.grid_to_world(GridCoordinate::new(1, 0, 0)),
            WorldPoint::new(0.0, 500.0, 0.0)
        );
        assert_eq!(
            grid.world_to_grid(WorldPoint::new(0.0, 600.0, 0.0)),
            GridCoordinate::new(1, 0, 0)
        );
    }

    #[test]
    fn test_rotation_relative_to_grid() {
        let grid = GridTransform::new(WorldPoint::default(), 1, DEFAULT_TILE_SIZE);
        // A placement facing world-East is grid-North on a grid itself
        // rotated East.
        let placed = grid.world_to_grid_with_rotation(WorldPoint::new(0.0, 250.0, 0.0), 90.0);
        assert_eq!(placed.rotation, 0);
    }
}
