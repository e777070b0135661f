//! Generation orchestrator: placed rooms in, routed corridors out.
//!
//! A run walks the topology's room pairs, routes each pair between its
//! closest usable exits, accumulates per-cell connection state, then
//! classifies every touched cell and hands the resulting pieces to a
//! spawner. All randomness comes from one seeded stream that is re-armed
//! at the start of every run, so a given room layout and seed always
//! produces the same dungeon.

use crate::room::{Room, RoomTemplate};
use crate::spawn::{CorridorSpawner, Placement};
use minegen_logic::connection::ConnectionState;
use minegen_logic::corridor::classify;
use minegen_logic::grid::{normalize_rotation, rotation_grid_to_world, GridCoordinate};
use minegen_logic::pathfind::{find_path, grid_distance, SearchConfig};
use minegen_logic::topology::{linear_pairs, looping_pairs, star_pairs, RoomId};
use minegen_logic::transform::{GridTransform, WorldPoint, DEFAULT_TILE_SIZE};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Full configuration of a generator instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub seed: u64,
    /// World position of grid cell (0,0,0)'s corner.
    pub grid_origin: WorldPoint,
    /// Grid yaw in quarter turns.
    pub grid_rotation: u8,
    pub tile_size: WorldPoint,
    pub search: SearchConfig,
    /// Fraction of each room's bounding box trimmed before occupancy is
    /// computed, so boxes flush on cell borders do not over-claim.
    pub bound_safe_zone_percent: f32,
    /// When set, sealed exits also reserve their outside cell so no
    /// corridor runs past a door that can never open.
    pub use_blocked_exits: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            grid_origin: WorldPoint::new(0.0, 0.0, 0.0),
            grid_rotation: 0,
            tile_size: DEFAULT_TILE_SIZE,
            search: SearchConfig::default(),
            bound_safe_zone_percent: 0.1,
            use_blocked_exits: true,
        }
    }
}

/// Which rooms get corridors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// Chain in insertion order.
    Linear,
    /// Chain plus a closing corridor back to the first room.
    Looping,
    /// Every room connects to the hub. With no hub set the run places
    /// rooms but no corridors.
    Star { central: Option<RoomId> },
}

/// The generator. Owns room placements and all routing state.
pub struct DungeonGenerator {
    pub config: GeneratorConfig,
    pub grid: GridTransform,
    pub rooms: Vec<Room>,
    /// Room-shaped blockers that never take corridors.
    pub obstacles: Vec<Room>,
    /// Accumulated connection state per touched cell.
    requested: HashMap<GridCoordinate, ConnectionState>,
    /// Cells no route may enter.
    blocked: HashSet<GridCoordinate>,
    rng: StdRng,
}

impl DungeonGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let grid = GridTransform::new(config.grid_origin, config.grid_rotation, config.tile_size);
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            grid,
            rooms: Vec::new(),
            obstacles: Vec::new(),
            requested: HashMap::new(),
            blocked: HashSet::new(),
            rng,
        }
    }

    /// Place a room template in the world. Returns the room's id, which
    /// topologies use to order and pair rooms.
    pub fn add_room(&mut self, template: RoomTemplate, origin: WorldPoint, yaw: f32) -> RoomId {
        let room = Room::place(
            template,
            origin,
            yaw,
            &self.grid,
            self.config.bound_safe_zone_percent,
        );
        let mut seen = HashSet::new();
        for exit in &room.exits {
            if !seen.insert((exit.marker.position, exit.marker.rotation)) {
                log::warn!(
                    "room '{}' has duplicate exits at {:?} rotation {}",
                    room.template.name,
                    exit.marker.position,
                    exit.marker.rotation
                );
            }
        }
        self.rooms.push(room);
        (self.rooms.len() - 1) as RoomId
    }

    /// Place a room-shaped obstacle. Its footprint blocks routing like
    /// any room's, but no topology ever pairs it, so corridors detour
    /// around it instead of attaching to it.
    pub fn add_obstacle(&mut self, template: RoomTemplate, origin: WorldPoint, yaw: f32) {
        let obstacle = Room::place(
            template,
            origin,
            yaw,
            &self.grid,
            self.config.bound_safe_zone_percent,
        );
        self.obstacles.push(obstacle);
    }

    /// Run a full generation pass: reset per-run state, route every
    /// pair the topology demands, resolve door states, and spawn the
    /// classified pieces.
    ///
    /// Returns whether every requested pair was connected. A failed
    /// pair is logged and skipped; the rest of the run still completes.
    pub fn generate<S: CorridorSpawner>(&mut self, topology: Topology, spawner: &mut S) -> bool {
        if !self.requested.is_empty() {
            log::warn!("previous generation state still present, clearing before run");
        }
        self.reset(spawner);

        let room_count = self.rooms.len() as u32;
        if room_count < 2 {
            log::warn!("need at least 2 rooms to connect, have {room_count}");
            return false;
        }
        let pairs = match topology {
            Topology::Linear => linear_pairs(room_count),
            Topology::Looping => looping_pairs(room_count),
            Topology::Star { central: Some(hub) } => star_pairs(room_count, hub),
            Topology::Star { central: None } => {
                log::warn!("star topology without a central room connects nothing");
                Vec::new()
            }
        };

        log::info!(
            "generating: {} rooms, {} pairs, seed {}",
            room_count,
            pairs.len(),
            self.config.seed
        );

        let mut success = true;
        for (from, to) in pairs {
            if !self.connect_pair(from, to) {
                log::warn!("failed to connect rooms {from} and {to}");
                success = false;
            }
        }

        self.update_door_status();
        self.spawn_corridors(spawner) && success
    }

    /// Remove all rooms and routing state.
    pub fn clear<S: CorridorSpawner>(&mut self, spawner: &mut S) {
        self.rooms.clear();
        self.obstacles.clear();
        self.requested.clear();
        self.blocked.clear();
        spawner.clear();
    }

    /// Accumulated connection state, in deterministic cell order.
    pub fn corridor_cells(&self) -> Vec<(GridCoordinate, ConnectionState)> {
        let mut cells: Vec<_> = self
            .requested
            .iter()
            .map(|(cell, state)| (*cell, *state))
            .collect();
        cells.sort_by_key(|(cell, _)| (cell.z, cell.x, cell.y));
        cells
    }

    /// Restore routing state from a saved snapshot.
    pub(crate) fn restore_corridors(&mut self, cells: Vec<(GridCoordinate, ConnectionState)>) {
        self.requested = cells.into_iter().collect();
        self.rebuild_blocked_cells();
    }

    fn reset<S: CorridorSpawner>(&mut self, spawner: &mut S) {
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.requested.clear();
        spawner.clear();
        for room in &mut self.rooms {
            room.close_all_doors();
        }
        self.rebuild_blocked_cells();
    }

    fn rebuild_blocked_cells(&mut self) {
        self.blocked.clear();
        for room in &self.rooms {
            self.blocked.extend(room.occupied.iter().copied());
            if self.config.use_blocked_exits {
                for exit in &room.exits {
                    if exit.blocked {
                        self.blocked.insert(exit.door_cell);
                    }
                }
            }
        }
        for obstacle in &self.obstacles {
            self.blocked.extend(obstacle.occupied.iter().copied());
        }
    }

    /// Connect one pair of rooms between their closest usable exits.
    fn connect_pair(&mut self, from: RoomId, to: RoomId) -> bool {
        let (from, to) = (from as usize, to as usize);
        if from == to || from >= self.rooms.len() || to >= self.rooms.len() {
            log::warn!("invalid room pair ({from}, {to})");
            return false;
        }

        // Touching rooms with facing doors need no corridor at all.
        let mut touching = None;
        'exits: for (fi, fe) in self.rooms[from].usable_exits() {
            for (ti, te) in self.rooms[to].usable_exits() {
                if fe.marker.position == te.door_cell && fe.door_cell == te.marker.position {
                    touching = Some((fi, ti));
                    break 'exits;
                }
            }
        }
        if let Some((fi, ti)) = touching {
            let from_exit = self.rooms[from].exits[fi];
            let to_exit = self.rooms[to].exits[ti];
            self.requested
                .entry(from_exit.door_cell)
                .or_default()
                .make_connection(from_exit.door_cell, from_exit.marker.position, true);
            self.requested
                .entry(to_exit.door_cell)
                .or_default()
                .make_connection(to_exit.door_cell, to_exit.marker.position, true);
            self.rooms[from].exits[fi].open = true;
            self.rooms[to].exits[ti].open = true;
            log::info!("rooms {from} and {to} touch, joined doors directly");
            return true;
        }

        let z_factor = self.config.search.distance_factor_z;
        let mut best: Option<(usize, usize, f32)> = None;
        for (fi, fe) in self.rooms[from].usable_exits() {
            for (ti, te) in self.rooms[to].usable_exits() {
                // A door cell buried under another room's footprint (or
                // a sealed exit's reservation) can never take a corridor.
                if self.blocked.contains(&fe.door_cell) || self.blocked.contains(&te.door_cell) {
                    continue;
                }
                let distance = grid_distance(fe.door_cell, te.door_cell, z_factor);
                if best.map_or(true, |(_, _, best_distance)| distance < best_distance) {
                    best = Some((fi, ti, distance));
                }
            }
        }
        let Some((fi, ti, _)) = best else {
            log::warn!("rooms {from} and {to} have no usable exits");
            return false;
        };

        let from_exit = self.rooms[from].exits[fi];
        let to_exit = self.rooms[to].exits[ti];
        let requested = &self.requested;
        let path = find_path(
            from_exit.door_cell,
            to_exit.door_cell,
            &self.blocked,
            |cell| requested.contains_key(&cell),
            &self.config.search,
        );
        match path {
            Some(path) => {
                self.register_path(&path, from, fi, to, ti);
                true
            }
            None => {
                log::warn!(
                    "no route from {:?} to {:?}",
                    from_exit.door_cell,
                    to_exit.door_cell
                );
                false
            }
        }
    }

    /// Record a routed path: every step opens facing connections in both
    /// cells, and the endpoints get room-flagged joins to their doors.
    fn register_path(&mut self, path: &[GridCoordinate], from: usize, fi: usize, to: usize, ti: usize) {
        for window in path.windows(2) {
            let (a, b) = (window[0], window[1]);
            self.requested.entry(a).or_default().make_connection(a, b, false);
            self.requested.entry(b).or_default().make_connection(b, a, false);
        }

        let from_exit = self.rooms[from].exits[fi];
        let to_exit = self.rooms[to].exits[ti];
        let first = path[0];
        let last = path[path.len() - 1];
        self.requested
            .entry(first)
            .or_default()
            .make_connection(first, from_exit.marker.position, true);
        self.requested
            .entry(last)
            .or_default()
            .make_connection(last, to_exit.marker.position, true);
        self.rooms[from].exits[fi].open = true;
        self.rooms[to].exits[ti].open = true;
        log::info!(
            "routed {} cells between rooms {from} and {to}",
            path.len()
        );
    }

    /// Re-derive every exit's open flag from the accumulated state, so
    /// door geometry matches what was actually routed.
    fn update_door_status(&mut self) {
        for room in &mut self.rooms {
            for exit in &mut room.exits {
                exit.open = self
                    .requested
                    .get(&exit.door_cell)
                    .is_some_and(|state| room_connection_toward(state, exit.marker.rotation));
            }
        }
    }

    /// Rematerialize pieces from already-accumulated connection state,
    /// without re-running any routing. Piece classification draws from a
    /// freshly re-armed random stream, so a generator restored from a
    /// save produces the exact pieces the original run did.
    pub fn respawn<S: CorridorSpawner>(&mut self, spawner: &mut S) -> bool {
        self.rng = StdRng::seed_from_u64(self.config.seed);
        spawner.clear();
        self.spawn_corridors(spawner)
    }

    /// Classify every touched cell and spawn its piece. Cells inside
    /// rooms accumulate door joins but never get corridor geometry.
    /// Returns whether every classified piece was actually placed.
    fn spawn_corridors<S: CorridorSpawner>(&mut self, spawner: &mut S) -> bool {
        let mut cells: Vec<GridCoordinate> = self.requested.keys().copied().collect();
        cells.sort_by_key(|cell| (cell.z, cell.x, cell.y));

        let mut spawned = 0usize;
        let mut all_placed = true;
        for cell in cells {
            if self.blocked.contains(&cell) {
                continue;
            }
            let state = self.requested[&cell];
            if let Some(piece) = classify(&state, &mut self.rng) {
                let yaw_turns =
                    normalize_rotation(piece.rotation as i32 + self.grid.rotation as i32);
                let placement = Placement {
                    position: self.grid.grid_to_world_2d_center(cell),
                    yaw: rotation_grid_to_world(yaw_turns),
                };
                if spawner.spawn_piece(cell, piece, placement) {
                    spawned += 1;
                } else {
                    log::error!("no archetype available for {:?} at {:?}", piece.kind, cell);
                    all_placed = false;
                }
            }
        }
        log::info!("spawned {spawned} corridor pieces");
        all_placed
    }
}

/// Does `state` hold a room-flagged connection facing `rotation`?
fn room_connection_toward(state: &ConnectionState, rotation: u8) -> bool {
    match rotation {
        0 => state.connect_north && state.north_is_room,
        1 => state.connect_east && state.east_is_room,
        2 => state.connect_south && state.south_is_room,
        3 => state.connect_west && state.west_is_room,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::ExitMarker;
    use crate::spawn::RecordingSpawner;

    fn one_tile_template(exit_yaws: &[f32]) -> RoomTemplate {
        RoomTemplate {
            name: "cell-1x1".into(),
            bounds_min: WorldPoint::new(-250.0, -250.0, 0.0),
            bounds_max: WorldPoint::new(250.0, 250.0, 250.0),
            exits: exit_yaws
                .iter()
                .map(|&yaw| ExitMarker {
                    position: WorldPoint::new(0.0, 0.0, 0.0),
                    yaw,
                    blocked: false,
                })
                .collect(),
        }
    }

    /// Cell center world position for cell (x, y), z level 0.
    fn center(x: i32, y: i32) -> WorldPoint {
        WorldPoint::new(x as f32 * 500.0 + 250.0, y as f32 * 500.0 + 250.0, 0.0)
    }

    #[test]
    fn test_two_rooms_connect_linearly() {
        let mut generator = DungeonGenerator::new(GeneratorConfig::default());
        // Exit yaw 180 means the marker faces south (into the room from
        // the north side), putting the door cell at +X.
        generator.add_room(one_tile_template(&[180.0]), center(0, 0), 0.0);
        generator.add_room(one_tile_template(&[0.0]), center(3, 0), 0.0);

        let mut spawner = RecordingSpawner::default();
        assert!(generator.generate(Topology::Linear, &mut spawner));

        // Two corridor cells between door cells (1,0) and (2,0).
        assert_eq!(spawner.pieces.len(), 2);
        assert!(generator.rooms[0].exits[0].open);
        assert!(generator.rooms[1].exits[0].open);
    }

    #[test]
    fn test_corridor_detours_around_obstacle() {
        let mut generator = DungeonGenerator::new(GeneratorConfig::default());
        generator.add_room(one_tile_template(&[180.0]), center(0, 0), 0.0);
        generator.add_room(one_tile_template(&[0.0]), center(4, 0), 0.0);
        // Straight-line route would run through cell (2, 0).
        generator.add_obstacle(one_tile_template(&[]), center(2, 0), 0.0);

        let mut spawner = RecordingSpawner::default();
        assert!(generator.generate(Topology::Linear, &mut spawner));

        let obstacle_cell = GridCoordinate::new(2, 0, 0);
        assert!(spawner.pieces.iter().all(|(cell, _, _)| *cell != obstacle_cell));
        // The direct route takes 3 cells; the detour must be longer.
        assert!(spawner.pieces.len() > 3);
        assert!(generator.rooms[0].exits[0].open);
        assert!(generator.rooms[1].exits[0].open);
    }

    #[test]
    fn test_touching_rooms_join_without_corridor() {
        let mut generator = DungeonGenerator::new(GeneratorConfig::default());
        generator.add_room(one_tile_template(&[180.0]), center(0, 0), 0.0);
        generator.add_room(one_tile_template(&[0.0]), center(1, 0), 0.0);

        let mut spawner = RecordingSpawner::default();
        assert!(generator.generate(Topology::Linear, &mut spawner));
        assert!(spawner.pieces.is_empty());
        assert!(generator.rooms[0].exits[0].open);
        assert!(generator.rooms[1].exits[0].open);
    }

    #[test]
    fn test_unreachable_pair_reports_failure() {
        let mut config = GeneratorConfig::default();
        config.search.max_iterations = 50;
        let mut generator = DungeonGenerator::new(config);
        generator.add_room(one_tile_template(&[180.0]), center(0, 0), 0.0);
        generator.add_room(one_tile_template(&[0.0]), center(200, 0), 0.0);

        let mut spawner = RecordingSpawner::default();
        assert!(!generator.generate(Topology::Linear, &mut spawner));
        assert!(!generator.rooms[0].exits[0].open);
    }

    #[test]
    fn test_star_without_hub_spawns_nothing() {
        let mut generator = DungeonGenerator::new(GeneratorConfig::default());
        generator.add_room(one_tile_template(&[180.0]), center(0, 0), 0.0);
        generator.add_room(one_tile_template(&[0.0]), center(3, 0), 0.0);

        let mut spawner = RecordingSpawner::default();
        assert!(generator.generate(Topology::Star { central: None }, &mut spawner));
        assert!(spawner.pieces.is_empty());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut generator = DungeonGenerator::new(GeneratorConfig::default());
        generator.add_room(one_tile_template(&[180.0]), center(0, 0), 0.0);
        generator.add_room(one_tile_template(&[0.0]), center(4, 0), 0.0);

        let mut spawner = RecordingSpawner::default();
        generator.generate(Topology::Linear, &mut spawner);
        let first = spawner.pieces.clone();
        generator.generate(Topology::Linear, &mut spawner);
        assert_eq!(spawner.pieces, first);
    }

    #[test]
    fn test_missing_archetype_fails_the_run() {
        use crate::spawn::{ArchetypeSet, WorldSpawner};
        use minegen_logic::corridor::CorridorKind;

        let mut generator = DungeonGenerator::new(GeneratorConfig::default());
        generator.add_room(one_tile_template(&[180.0]), center(0, 0), 0.0);
        generator.add_room(one_tile_template(&[0.0]), center(3, 0), 0.0);

        let mut spawner =
            WorldSpawner::with_archetypes(ArchetypeSet::all().without(CorridorKind::Straight));
        assert!(!generator.generate(Topology::Linear, &mut spawner));
        assert_eq!(spawner.piece_count(), 0);
    }

    #[test]
    fn test_single_room_is_a_config_error() {
        let mut generator = DungeonGenerator::new(GeneratorConfig::default());
        generator.add_room(one_tile_template(&[180.0]), center(0, 0), 0.0);
        let mut spawner = RecordingSpawner::default();
        assert!(!generator.generate(Topology::Linear, &mut spawner));
    }

    #[test]
    fn test_sealed_exit_reserves_its_door_cell() {
        let mut generator = DungeonGenerator::new(GeneratorConfig::default());
        let mut template = one_tile_template(&[270.0]);
        template.exits.push(ExitMarker {
            position: WorldPoint::new(0.0, 0.0, 0.0),
            yaw: 180.0,
            blocked: true,
        });
        generator.add_room(template, center(0, 0), 0.0);
        generator.add_room(one_tile_template(&[0.0]), center(3, 0), 0.0);

        let mut spawner = RecordingSpawner::default();
        assert!(generator.generate(Topology::Linear, &mut spawner));
        // The sealed door's outside cell at (1,0,0) stays corridor-free.
        let sealed_cell = GridCoordinate::new(1, 0, 0);
        assert!(spawner.pieces.iter().all(|(cell, _, _)| *cell != sealed_cell));
        assert!(!generator.rooms[0].exits[1].open);
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut generator = DungeonGenerator::new(GeneratorConfig::default());
        generator.add_room(one_tile_template(&[180.0]), center(0, 0), 0.0);
        generator.add_room(one_tile_template(&[0.0]), center(3, 0), 0.0);
        generator.add_obstacle(one_tile_template(&[]), center(0, 3), 0.0);

        let mut spawner = RecordingSpawner::default();
        generator.generate(Topology::Linear, &mut spawner);
        generator.clear(&mut spawner);
        assert!(generator.rooms.is_empty());
        assert!(generator.obstacles.is_empty());
        assert!(generator.corridor_cells().is_empty());
        assert!(spawner.pieces.is_empty());
    }
}
