//! Classification of accumulated cell connection state into concrete
//! corridor pieces with a grid rotation.
//!
//! After all paths are routed, every touched cell holds a set of open
//! directions. Each combination maps to exactly one piece archetype and
//! a rotation in quarter turns; symmetric pieces (straight, cross) take
//! a random but seed-driven rotation so runs stay reproducible.

use crate::connection::ConnectionState;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The shape of corridor geometry a cell needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorridorKind {
    /// Two opposite horizontal openings.
    Straight,
    /// Two adjacent horizontal openings.
    Corner,
    /// Three horizontal openings.
    TJunction,
    /// All four horizontal openings.
    Cross,
    /// Shaft section open above only.
    Up,
    /// Shaft section open below only.
    Down,
    /// Pass-through shaft section, open above and below.
    UpDown,
}

/// A classified cell: which piece to place and at what grid rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorridorPiece {
    pub kind: CorridorKind,
    /// Quarter turns, normalized to `0..=3`.
    pub rotation: u8,
}

/// Maps a cell's connection state to a corridor piece.
///
/// A cell that connects vertically always becomes a shaft piece; its
/// horizontal bits are ignored because shaft geometry has no side
/// openings. Cells with fewer than two horizontal connections and no
/// vertical one produce `None` and spawn nothing (a lone opening faces
/// a room door and the room's own geometry covers it).
pub fn classify<R: Rng>(state: &ConnectionState, rng: &mut R) -> Option<CorridorPiece> {
    if state.connects_vertically() {
        let kind = match (state.connect_up, state.connect_down) {
            (true, true) => CorridorKind::UpDown,
            (true, false) => CorridorKind::Up,
            (false, true) => CorridorKind::Down,
            (false, false) => unreachable!(),
        };
        return Some(CorridorPiece { kind, rotation: 0 });
    }

    let [north, east, south, west] = state.direction_bits();
    let piece = match state.horizontal_connection_count() {
        4 => CorridorPiece {
            kind: CorridorKind::Cross,
            rotation: rng.gen_range(0..4),
        },
        3 => {
            // Rotation keyed on the one closed side.
            let rotation = if !north {
                1
            } else if !east {
                2
            } else if !south {
                3
            } else {
                0
            };
            CorridorPiece {
                kind: CorridorKind::TJunction,
                rotation,
            }
        }
        2 if north && south => CorridorPiece {
            kind: CorridorKind::Straight,
            rotation: if rng.gen_bool(0.5) { 0 } else { 2 },
        },
        2 if east && west => CorridorPiece {
            kind: CorridorKind::Straight,
            rotation: if rng.gen_bool(0.5) { 1 } else { 3 },
        },
        2 => {
            let rotation = if north && east {
                0
            } else if south && east {
                1
            } else if south && west {
                2
            } else {
                3
            };
            CorridorPiece {
                kind: CorridorKind::Corner,
                rotation,
            }
        }
        _ => return None,
    };
    Some(piece)
}
