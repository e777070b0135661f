//! Save/Load functionality for generated dungeons.
//!
//! Uses bincode for compact binary serialization. A save captures the
//! generator configuration, every placed room with its resolved grid
//! caches, and the accumulated corridor state in deterministic cell
//! order. Spawned geometry is not stored; it re-derives from the state.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::generator::{DungeonGenerator, GeneratorConfig};
use crate::room::Room;
use minegen_logic::connection::ConnectionState;
use minegen_logic::grid::GridCoordinate;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a generator.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub config: GeneratorConfig,
    pub rooms: Vec<Room>,
    pub obstacles: Vec<Room>,
    /// Per-cell connection state, sorted by (z, x, y).
    pub corridors: Vec<(GridCoordinate, ConnectionState)>,
}

impl SaveData {
    pub fn capture(generator: &DungeonGenerator) -> Self {
        Self {
            version: SAVE_VERSION,
            config: generator.config.clone(),
            rooms: generator.rooms.clone(),
            obstacles: generator.obstacles.clone(),
            corridors: generator.corridor_cells(),
        }
    }
}

/// Serialize a generator snapshot to a writer.
pub fn save_dungeon<W: Write>(generator: &DungeonGenerator, writer: W) -> Result<(), SaveError> {
    bincode::serialize_into(writer, &SaveData::capture(generator))?;
    Ok(())
}

/// Rebuild a generator from a saved snapshot.
pub fn load_dungeon<R: Read>(reader: R) -> Result<DungeonGenerator, SaveError> {
    let data: SaveData = bincode::deserialize_from(reader)?;
    if data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }
    let mut generator = DungeonGenerator::new(data.config);
    generator.rooms = data.rooms;
    generator.obstacles = data.obstacles;
    generator.restore_corridors(data.corridors);
    Ok(generator)
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(f, "Save version mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for SaveError {}
