//! Room placement on the generation grid.
//!
//! A [`RoomTemplate`] describes a room in its own local space: a
//! bounding box and a set of exit markers. Placing a template snaps its
//! origin so the box lands flush on cell boundaries, then caches the
//! grid-space data the router needs: which cells the room occupies and
//! where its exits sit.

use minegen_logic::grid::{
    direction_for_rotation, normalize_rotation, rotation_world_to_grid, GridCoordinate,
    GridCoordinateFloat, GridCoordinateWithRotation,
};
use minegen_logic::transform::{GridTransform, WorldPoint};
use serde::{Deserialize, Serialize};

/// An exit authored on a room template, in room-local space.
///
/// The marker sits inside a boundary cell of the room and faces into
/// the room; the corridor attaches to the cell one step behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitMarker {
    pub position: WorldPoint,
    /// Facing in degrees, quarter-turn aligned.
    pub yaw: f32,
    /// Blocked markers never take a corridor and keep their outside
    /// cell clear so no route grazes a sealed door.
    pub blocked: bool,
}

/// Authoring-time description of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub name: String,
    /// Local-space bounding box, origin-centered by convention.
    pub bounds_min: WorldPoint,
    pub bounds_max: WorldPoint,
    pub exits: Vec<ExitMarker>,
}

/// A resolved exit on a placed room, in grid space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitPoint {
    /// Boundary cell the marker occupies, facing into the room.
    pub marker: GridCoordinateWithRotation,
    /// Corridor-side cell one step outside the room.
    pub door_cell: GridCoordinate,
    pub blocked: bool,
    /// Set once a corridor actually attaches here.
    pub open: bool,
}

/// A template placed in the world, with grid caches resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub template: RoomTemplate,
    /// Snapped world position of the template origin.
    pub origin: WorldPoint,
    /// World yaw in degrees, quarter-turn aligned.
    pub yaw: f32,
    pub exits: Vec<ExitPoint>,
    /// Cells the room's (safe-zone-shrunk) bounding box covers.
    pub occupied: Vec<GridCoordinate>,
}

impl Room {
    /// Place a template at `requested_origin`, snapping it onto the
    /// grid and resolving all grid caches.
    ///
    /// `safe_zone_percent` shrinks the bounding box before occupancy is
    /// computed so a box flush on a cell boundary does not claim the
    /// neighbouring cell.
    pub fn place(
        template: RoomTemplate,
        requested_origin: WorldPoint,
        yaw: f32,
        grid: &GridTransform,
        safe_zone_percent: f32,
    ) -> Self {
        let origin = snap_origin(&template, requested_origin, yaw, grid);
        let mut room = Self {
            template,
            origin,
            yaw,
            exits: Vec::new(),
            occupied: Vec::new(),
        };
        room.update_grid_caches(grid, safe_zone_percent);
        room
    }

    /// Recompute exits and occupied cells from the current placement.
    pub fn update_grid_caches(&mut self, grid: &GridTransform, safe_zone_percent: f32) {
        let turns = rotation_world_to_grid(self.yaw);

        self.exits = self
            .template
            .exits
            .iter()
            .map(|authored| {
                let world = self.origin + authored.position.rotate_by(turns);
                let marker = grid.world_to_grid_with_rotation(world, self.yaw + authored.yaw);
                let door_cell = marker.position - direction_for_rotation(marker.rotation);
                ExitPoint {
                    marker,
                    door_cell,
                    blocked: authored.blocked,
                    open: false,
                }
            })
            .collect();

        self.occupied = self.occupied_cells(grid, safe_zone_percent);
    }

    fn occupied_cells(&self, grid: &GridTransform, safe_zone_percent: f32) -> Vec<GridCoordinate> {
        let bounds_min = self.template.bounds_min;
        let bounds_max = self.template.bounds_max;
        let shrink = (bounds_max - bounds_min) * (safe_zone_percent * 0.5);
        let local_min = bounds_min + shrink;
        let local_max = bounds_max - shrink;

        // Rotate all eight corners and take the world-space extremes.
        let turns = rotation_world_to_grid(self.yaw);
        let mut world_min = WorldPoint::new(f32::MAX, f32::MAX, f32::MAX);
        let mut world_max = WorldPoint::new(f32::MIN, f32::MIN, f32::MIN);
        for &x in &[local_min.x, local_max.x] {
            for &y in &[local_min.y, local_max.y] {
                for &z in &[local_min.z, local_max.z] {
                    let corner = self.origin + WorldPoint::new(x, y, z).rotate_by(turns);
                    world_min = world_min.component_min(corner);
                    world_max = world_max.component_max(corner);
                }
            }
        }

        let lo = grid.world_to_grid_float(world_min);
        let hi = grid.world_to_grid_float(world_max);
        const EPSILON: f32 = 1e-3;
        let min_x = (lo.x.min(hi.x) + EPSILON).floor() as i32;
        let max_x = (lo.x.max(hi.x) - EPSILON).floor() as i32;
        let min_y = (lo.y.min(hi.y) + EPSILON).floor() as i32;
        let max_y = (lo.y.max(hi.y) - EPSILON).floor() as i32;
        let min_z = (lo.z.min(hi.z) + EPSILON).floor() as i32;
        let max_z = (lo.z.max(hi.z) - EPSILON).floor() as i32;

        let mut cells = Vec::new();
        for z in min_z..=max_z {
            for x in min_x..=max_x {
                for y in min_y..=max_y {
                    cells.push(GridCoordinate::new(x, y, z));
                }
            }
        }
        cells
    }

    /// Reset all doors to sealed before a generation run.
    pub fn close_all_doors(&mut self) {
        for exit in &mut self.exits {
            exit.open = false;
        }
    }

    /// Exits a corridor may attach to.
    pub fn usable_exits(&self) -> impl Iterator<Item = (usize, &ExitPoint)> {
        self.exits
            .iter()
            .enumerate()
            .filter(|(_, exit)| !exit.blocked)
    }

    /// Grid rotation of the room placement.
    pub fn grid_rotation(&self, grid: &GridTransform) -> u8 {
        normalize_rotation(rotation_world_to_grid(self.yaw) as i32 - grid.rotation as i32)
    }
}

/// Snap an origin so the template's footprint lands flush on cell
/// boundaries.
///
/// Works in grid space: a footprint spanning an even number of tiles
/// along an axis needs its center on a cell corner; an odd span needs
/// it on a cell center. The half-cell parity offset handles the
/// difference.
fn snap_origin(
    template: &RoomTemplate,
    requested: WorldPoint,
    yaw: f32,
    grid: &GridTransform,
) -> WorldPoint {
    let cells = grid.world_to_grid_float(requested);
    let extent = template.bounds_max - template.bounds_min;
    let relative_turns =
        normalize_rotation(rotation_world_to_grid(yaw) as i32 - grid.rotation as i32);
    // Odd quarter turns swap the horizontal extents.
    let (extent_x, extent_y) = if relative_turns % 2 == 1 {
        (extent.y, extent.x)
    } else {
        (extent.x, extent.y)
    };
    let snapped = GridCoordinateFloat::new(
        snap_axis(cells.x, extent_x / grid.tile_size.x),
        snap_axis(cells.y, extent_y / grid.tile_size.y),
        cells.z.round(),
    );
    grid.grid_to_world_float(snapped)
}

fn snap_axis(cells: f32, extent_tiles: f32) -> f32 {
    let tiles = (extent_tiles.round() as i32).max(1);
    let offset = if tiles % 2 != 0 { 0.5 } else { 0.0 };
    (cells - offset).round() + offset
}
