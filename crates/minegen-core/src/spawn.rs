//! Materializing classified corridor pieces.
//!
//! The generator stays agnostic of where pieces end up: it hands each
//! classified cell to a [`CorridorSpawner`]. The default spawner stores
//! pieces as `hecs` entities so a host can query and render them; a
//! recording spawner exists for headless runs and tests.

use hecs::World;
use minegen_logic::corridor::{CorridorKind, CorridorPiece};
use minegen_logic::grid::GridCoordinate;
use minegen_logic::transform::WorldPoint;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// World-space placement of a spawned piece.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: WorldPoint,
    /// Yaw in degrees, quarter-turn aligned.
    pub yaw: f32,
}

/// Grid cell a spawned piece belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub cell: GridCoordinate,
}

/// Receives classified pieces in deterministic cell order.
///
/// `spawn_piece` returns false when the spawner has no archetype for
/// the piece; the generator logs it and keeps going.
pub trait CorridorSpawner {
    fn spawn_piece(&mut self, cell: GridCoordinate, piece: CorridorPiece, placement: Placement)
        -> bool;
    /// Remove everything spawned so far.
    fn clear(&mut self);
}

/// Which corridor archetypes a host has geometry for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchetypeSet {
    available: HashSet<CorridorKind>,
}

impl ArchetypeSet {
    /// Every kind available, the common case.
    pub fn all() -> Self {
        Self {
            available: [
                CorridorKind::Straight,
                CorridorKind::Corner,
                CorridorKind::TJunction,
                CorridorKind::Cross,
                CorridorKind::Up,
                CorridorKind::Down,
                CorridorKind::UpDown,
            ]
            .into_iter()
            .collect(),
        }
    }

    pub fn without(mut self, kind: CorridorKind) -> Self {
        self.available.remove(&kind);
        self
    }

    pub fn supports(&self, kind: CorridorKind) -> bool {
        self.available.contains(&kind)
    }
}

impl Default for ArchetypeSet {
    fn default() -> Self {
        Self::all()
    }
}

/// Spawner backed by a `hecs` world. Each piece becomes one entity
/// carrying ([`CellRef`], [`CorridorPiece`], [`Placement`]).
#[derive(Default)]
pub struct WorldSpawner {
    pub world: World,
    archetypes: ArchetypeSet,
}

impl WorldSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_archetypes(archetypes: ArchetypeSet) -> Self {
        Self {
            world: World::new(),
            archetypes,
        }
    }

    pub fn piece_count(&self) -> usize {
        self.world.len() as usize
    }

    /// Snapshot of all spawned pieces.
    pub fn pieces(&self) -> Vec<(GridCoordinate, CorridorPiece, Placement)> {
        self.world
            .query::<(&CellRef, &CorridorPiece, &Placement)>()
            .iter()
            .map(|(_, (cell, piece, placement))| (cell.cell, *piece, *placement))
            .collect()
    }
}

impl CorridorSpawner for WorldSpawner {
    fn spawn_piece(
        &mut self,
        cell: GridCoordinate,
        piece: CorridorPiece,
        placement: Placement,
    ) -> bool {
        if !self.archetypes.supports(piece.kind) {
            return false;
        }
        self.world.spawn((CellRef { cell }, piece, placement));
        true
    }

    fn clear(&mut self) {
        self.world.clear();
    }
}

/// Spawner that only records what it was asked to place.
#[derive(Debug, Default)]
pub struct RecordingSpawner {
    pub pieces: Vec<(GridCoordinate, CorridorPiece, Placement)>,
}

impl CorridorSpawner for RecordingSpawner {
    fn spawn_piece(
        &mut self,
        cell: GridCoordinate,
        piece: CorridorPiece,
        placement: Placement,
    ) -> bool {
        self.pieces.push((cell, piece, placement));
        true
    }

    fn clear(&mut self) {
        self.pieces.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minegen_logic::corridor::CorridorKind;

    fn straight() -> CorridorPiece {
        CorridorPiece {
            kind: CorridorKind::Straight,
            rotation: 0,
        }
    }

    #[test]
    fn test_world_spawner_creates_one_entity_per_piece() {
        let mut spawner = WorldSpawner::new();
        let placement = Placement {
            position: WorldPoint::new(250.0, 250.0, 0.0),
            yaw: 0.0,
        };
        spawner.spawn_piece(GridCoordinate::new(0, 0, 0), straight(), placement);
        spawner.spawn_piece(GridCoordinate::new(1, 0, 0), straight(), placement);
        assert_eq!(spawner.piece_count(), 2);

        spawner.clear();
        assert_eq!(spawner.piece_count(), 0);
    }

    #[test]
    fn test_missing_archetype_rejected() {
        let mut spawner =
            WorldSpawner::with_archetypes(ArchetypeSet::all().without(CorridorKind::Straight));
        let placement = Placement {
            position: WorldPoint::new(250.0, 250.0, 0.0),
            yaw: 0.0,
        };
        assert!(!spawner.spawn_piece(GridCoordinate::new(0, 0, 0), straight(), placement));
        assert_eq!(spawner.piece_count(), 0);
    }

    #[test]
    fn test_world_spawner_pieces_round_trip() {
        let mut spawner = WorldSpawner::new();
        let cell = GridCoordinate::new(3, -1, 2);
        let placement = Placement {
            position: WorldPoint::new(1750.0, -250.0, 500.0),
            yaw: 90.0,
        };
        spawner.spawn_piece(cell, straight(), placement);
        let pieces = spawner.pieces();
        assert_eq!(pieces, vec![(cell, straight(), placement)]);
    }
}
