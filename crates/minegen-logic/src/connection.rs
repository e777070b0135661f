//! Per-cell aggregation of corridor connections.
//!
//! Every cell touched by a computed path accumulates a [`ConnectionState`]:
//! which of the four horizontal directions connect out of the cell, whether
//! the neighbour on each connected side is a room (as opposed to another
//! corridor cell), and whether the cell transitions up or down a level.

use crate::grid::{rotation_for_direction, GridCoordinate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionState {
    pub connect_north: bool,
    pub north_is_room: bool,
    pub connect_east: bool,
    pub east_is_room: bool,
    pub connect_south: bool,
    pub south_is_room: bool,
    pub connect_west: bool,
    pub west_is_room: bool,
    pub connect_up: bool,
    pub connect_down: bool,
}

impl ConnectionState {
    /// Record a connection from `our` toward the adjacent cell `other`.
    ///
    /// Cells on different levels set the matching vertical flag instead of
    /// a horizontal one; vertical connections must come from corridor
    /// cells, never rooms. Non-adjacent coordinates are a caller bug and
    /// panic (via [`rotation_for_direction`]).
    ///
    /// Room flags are monotonic: once a side is marked as a room boundary
    /// it stays one, even if a later corridor-to-corridor connection runs
    /// through the same side.
    pub fn make_connection(&mut self, our: GridCoordinate, other: GridCoordinate, is_room: bool) {
        if our.z != other.z {
            // Stairs / elevator transition.
            assert!(
                !is_room,
                "vertical connection requested from a room cell at {our:?}"
            );
            if other.z > our.z {
                self.connect_up = true;
            } else {
                self.connect_down = true;
            }
            return;
        }

        match rotation_for_direction(other - our) {
            0 => {
                self.connect_north = true;
                self.north_is_room |= is_room;
            }
            1 => {
                self.connect_east = true;
                self.east_is_room |= is_room;
            }
            2 => {
                self.connect_south = true;
                self.south_is_room |= is_room;
            }
            3 => {
                self.connect_west = true;
                self.west_is_room |= is_room;
            }
            _ => unreachable!(),
        }
    }

    /// How many of the four horizontal directions are connected (0–4).
    pub fn horizontal_connection_count(&self) -> u32 {
        self.connect_north as u32
            + self.connect_east as u32
            + self.connect_south as u32
            + self.connect_west as u32
    }

    /// Ordered [North, East, South, West] snapshot.
    pub fn direction_bits(&self) -> [bool; 4] {
        [
            self.connect_north,
            self.connect_east,
            self.connect_south,
            self.connect_west,
        ]
    }

    /// True when the cell transitions to another level in either direction.
    pub fn connects_vertically(&self) -> bool {
        self.connect_up || self.connect_down
    }
}
