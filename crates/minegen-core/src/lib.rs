//! MineGen Core - Grid-Based Mine and Dungeon Generator
//!
//! Places authored room templates on a 3D cell grid, routes corridors
//! between them with weighted A*, classifies every routed cell into a
//! concrete corridor piece, and spawns the pieces as `hecs` entities.
//!
//! # Architecture
//!
//! - **Rooms**: templates snapped onto the grid, with resolved exits
//!   and occupied cells ([`room`])
//! - **Routing**: pure logic from `minegen-logic` driven by the
//!   orchestrator ([`generator`])
//! - **Spawning**: classified pieces handed to a [`spawn::CorridorSpawner`]
//!
//! # Example
//!
//! ```rust,no_run
//! use minegen_core::prelude::*;
//!
//! let mut generator = DungeonGenerator::new(GeneratorConfig::default());
//! // ... add rooms ...
//! let mut spawner = WorldSpawner::new();
//! generator.generate(Topology::Linear, &mut spawner);
//! ```

pub mod generator;
pub mod persistence;
pub mod room;
pub mod spawn;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::generator::{DungeonGenerator, GeneratorConfig, Topology};
    pub use crate::room::{ExitMarker, Room, RoomTemplate};
    pub use crate::spawn::{ArchetypeSet, CorridorSpawner, WorldSpawner};
}
