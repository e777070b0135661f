//! MineGen Headless Generation Harness
//!
//! Validates routing, classification, and spawning end to end without a
//! host engine. Runs entirely in-process — no rendering, no assets.
//!
//! Usage:
//!   cargo run -p minegen-simtest
//!   cargo run -p minegen-simtest -- --verbose

use minegen_core::generator::{DungeonGenerator, GeneratorConfig, Topology};
use minegen_core::persistence::{load_dungeon, save_dungeon, SaveData};
use minegen_core::room::{ExitMarker, RoomTemplate};
use minegen_core::spawn::WorldSpawner;
use minegen_logic::corridor::CorridorKind;
use minegen_logic::grid::{direction_for_rotation, rotation_for_direction, GridCoordinate};
use minegen_logic::pathfind::{find_path, SearchConfig};
use minegen_logic::transform::WorldPoint;
use serde::Serialize;
use std::collections::HashSet;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

/// One spawned piece, flattened for the --verbose JSON dump.
#[derive(Serialize)]
struct PieceReport {
    cell: GridCoordinate,
    kind: CorridorKind,
    rotation: u8,
    yaw: f32,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== MineGen Generation Harness ===\n");

    let mut results = Vec::new();

    // 1. Grid math invariants
    results.extend(validate_grid_math());

    // 2. Pathfinding on synthetic grids
    results.extend(validate_pathfinding());

    // 3. Linear chain end to end
    results.extend(validate_linear_generation(verbose));

    // 4. Looping chain end to end
    results.extend(validate_looping_generation());

    // 5. Star topology end to end
    results.extend(validate_star_generation());

    // 6. Vertical shaft routing
    results.extend(validate_vertical_shafts());

    // 7. Determinism across runs
    results.extend(validate_determinism());

    // 8. Save/load round trip
    results.extend(validate_persistence());

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────

/// One-tile room with exits facing into the room at the given yaws.
/// Yaw 0 puts the door on the -X side, 90 on -Y, 180 on +X, 270 on +Y.
fn one_tile_room(name: &str, exit_yaws: &[f32]) -> RoomTemplate {
    RoomTemplate {
        name: name.into(),
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

/// World-space center of grid cell (x, y, z) with the default tile size.
fn cell_center(x: i32, y: i32, z: i32) -> WorldPoint {
    WorldPoint::new(
        x as f32 * 500.0 + 250.0,
        y as f32 * 500.0 + 250.0,
        z as f32 * 250.0,
    )
}

fn result(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

// ── 1. Grid math ────────────────────────────────────────────────────────

fn validate_grid_math() -> Vec<TestResult> {
    println!("--- Grid Math ---");
    let mut results = Vec::new();

    // Four quarter turns compose back to identity.
    let sample = GridCoordinate::new(3, -2, 1);
    let mut spun = sample;
    for _ in 0..4 {
        spun = spun.rotate_by(1);
    }
    results.push(result(
        "rotation_four_turns_identity",
        spun == sample,
        format!("{sample:?} -> {spun:?}"),
    ));

    // Direction and rotation are inverse lookups.
    let round_trip = (0..4u8).all(|r| rotation_for_direction(direction_for_rotation(r)) == r);
    results.push(result(
        "direction_rotation_round_trip",
        round_trip,
        "all four quarter turns".into(),
    ));

    // Opposite directions cancel.
    let cancel = (0..4u8).all(|r| {
        direction_for_rotation(r) + direction_for_rotation((r + 2) % 4) == GridCoordinate::new(0, 0, 0)
    });
    results.push(result(
        "opposite_directions_cancel",
        cancel,
        "N+S and E+W sum to zero".into(),
    ));

    results
}

// ── 2. Pathfinding ──────────────────────────────────────────────────────

fn validate_pathfinding() -> Vec<TestResult> {
    println!("--- Pathfinding ---");
    let mut results = Vec::new();
    let config = SearchConfig::default();

    let blocked = HashSet::new();
    let path = find_path(
        GridCoordinate::new(0, 0, 0),
        GridCoordinate::new(5, 0, 0),
        &blocked,
        |_| false,
        &config,
    );
    results.push(result(
        "straight_path_minimal",
        path.as_ref().map(|p| p.len()) == Some(6),
        format!("length {:?}", path.map(|p| p.len())),
    ));

    // Wall forcing a detour.
    let mut wall = HashSet::new();
    for y in -3..=3 {
        wall.insert(GridCoordinate::new(2, y, 0));
    }
    let detour = find_path(
        GridCoordinate::new(0, 0, 0),
        GridCoordinate::new(4, 0, 0),
        &wall,
        |_| false,
        &config,
    );
    let detour_ok = detour
        .as_ref()
        .is_some_and(|p| p.len() > 5 && p.iter().all(|c| !wall.contains(c)));
    results.push(result(
        "detour_avoids_wall",
        detour_ok,
        format!("length {:?}", detour.map(|p| p.len())),
    ));

    // Iteration cap turns hopeless searches into clean failures.
    let capped = find_path(
        GridCoordinate::new(0, 0, 0),
        GridCoordinate::new(3000, 0, 0),
        &blocked,
        |_| false,
        &config,
    );
    results.push(result(
        "iteration_cap_fails_cleanly",
        capped.is_none(),
        "3000-cell target rejected".into(),
    ));

    results
}

// ── 3. Linear chain ─────────────────────────────────────────────────────

fn validate_linear_generation(verbose: bool) -> Vec<TestResult> {
    println!("--- Linear Generation ---");
    let mut results = Vec::new();

    let mut generator = DungeonGenerator::new(GeneratorConfig::default());
    generator.add_room(one_tile_room("start", &[180.0]), cell_center(0, 0, 0), 0.0);
    generator.add_room(
        one_tile_room("middle", &[0.0, 270.0]),
        cell_center(3, 0, 0),
        0.0,
    );
    generator.add_room(one_tile_room("end", &[90.0]), cell_center(3, 3, 0), 0.0);

    let mut spawner = WorldSpawner::new();
    let success = generator.generate(Topology::Linear, &mut spawner);
    results.push(result(
        "linear_all_pairs_connected",
        success,
        "3 rooms, 2 corridors".into(),
    ));

    // Doors between rooms 0-1 and 1-2 sit two cells apart, so each
    // corridor is exactly two straight cells.
    results.push(result(
        "linear_piece_count",
        spawner.piece_count() == 4,
        format!("{} pieces", spawner.piece_count()),
    ));

    let pieces = spawner.pieces();
    let all_straight = pieces.iter().all(|(_, p, _)| p.kind == CorridorKind::Straight);
    results.push(result(
        "linear_pieces_straight",
        all_straight,
        "colinear doors produce straight sections".into(),
    ));

    let doors_open = generator
        .rooms
        .iter()
        .all(|room| room.exits.iter().any(|exit| exit.open));
    results.push(result(
        "linear_every_room_has_open_door",
        doors_open,
        "door states follow routed corridors".into(),
    ));

    if verbose {
        let report: Vec<PieceReport> = pieces
            .iter()
            .map(|(cell, piece, placement)| PieceReport {
                cell: *cell,
                kind: piece.kind,
                rotation: piece.rotation,
                yaw: placement.yaw,
            })
            .collect();
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => println!("  (piece dump failed: {e})"),
        }
    }

    results
}

// ── 4. Looping chain ────────────────────────────────────────────────────

fn validate_looping_generation() -> Vec<TestResult> {
    println!("--- Looping Generation ---");
    let mut results = Vec::new();

    let mut generator = DungeonGenerator::new(GeneratorConfig::default());
    let compass = [0.0, 90.0, 180.0, 270.0];
    generator.add_room(one_tile_room("a", &compass), cell_center(0, 0, 0), 0.0);
    generator.add_room(one_tile_room("b", &compass), cell_center(4, 0, 0), 0.0);
    generator.add_room(one_tile_room("c", &compass), cell_center(0, 4, 0), 0.0);

    let mut spawner = WorldSpawner::new();
    let success = generator.generate(Topology::Looping, &mut spawner);
    results.push(result(
        "looping_all_pairs_connected",
        success,
        "triangle with wrap edge".into(),
    ));

    let doors_open = generator
        .rooms
        .iter()
        .all(|room| room.exits.iter().any(|exit| exit.open));
    results.push(result(
        "looping_every_room_reachable",
        doors_open,
        "each room took at least one corridor".into(),
    ));

    // The diagonal leg has to turn somewhere.
    let pieces = spawner.pieces();
    let has_turn = pieces
        .iter()
        .any(|(_, p, _)| p.kind != CorridorKind::Straight);
    results.push(result(
        "looping_contains_turn",
        has_turn,
        format!("{} pieces total", pieces.len()),
    ));

    results
}

// ── 5. Star topology ────────────────────────────────────────────────────

fn validate_star_generation() -> Vec<TestResult> {
    println!("--- Star Generation ---");
    let mut results = Vec::new();

    let mut generator = DungeonGenerator::new(GeneratorConfig::default());
    let hub = generator.add_room(
        one_tile_room("hub", &[0.0, 90.0, 180.0, 270.0]),
        cell_center(0, 0, 0),
        0.0,
    );
    generator.add_room(one_tile_room("east", &[0.0]), cell_center(3, 0, 0), 0.0);
    generator.add_room(one_tile_room("west", &[180.0]), cell_center(-3, 0, 0), 0.0);
    generator.add_room(one_tile_room("north", &[90.0]), cell_center(0, 3, 0), 0.0);

    let mut spawner = WorldSpawner::new();
    let success = generator.generate(Topology::Star { central: Some(hub) }, &mut spawner);
    results.push(result(
        "star_all_spokes_connected",
        success,
        "3 spokes around one hub".into(),
    ));

    let spoke_doors_open = generator.rooms[1..]
        .iter()
        .all(|room| room.exits.iter().any(|exit| exit.open));
    results.push(result(
        "star_spoke_doors_open",
        spoke_doors_open,
        "every spoke attached".into(),
    ));

    let hub_open = generator.rooms[0]
        .exits
        .iter()
        .filter(|exit| exit.open)
        .count();
    results.push(result(
        "star_hub_uses_three_doors",
        hub_open == 3,
        format!("{hub_open} hub doors open"),
    ));

    // No hub means nothing to route.
    let mut no_hub = WorldSpawner::new();
    let idle = generator.generate(Topology::Star { central: None }, &mut no_hub);
    results.push(result(
        "star_without_hub_is_empty",
        idle && no_hub.piece_count() == 0,
        format!("{} pieces", no_hub.piece_count()),
    ));

    results
}

// ── 6. Vertical shafts ──────────────────────────────────────────────────

fn validate_vertical_shafts() -> Vec<TestResult> {
    println!("--- Vertical Shafts ---");
    let mut results = Vec::new();

    // Same column, two levels apart: the only route is straight up.
    let mut generator = DungeonGenerator::new(GeneratorConfig::default());
    generator.add_room(one_tile_room("lower", &[180.0]), cell_center(0, 0, 0), 0.0);
    generator.add_room(one_tile_room("upper", &[180.0]), cell_center(0, 0, 2), 0.0);

    let mut spawner = WorldSpawner::new();
    let success = generator.generate(Topology::Linear, &mut spawner);
    results.push(result(
        "shaft_rooms_connected",
        success,
        "two levels apart".into(),
    ));

    let kinds: Vec<CorridorKind> = spawner.pieces().iter().map(|(_, p, _)| p.kind).collect();
    let has_shaft = kinds.contains(&CorridorKind::Up)
        && kinds.contains(&CorridorKind::UpDown)
        && kinds.contains(&CorridorKind::Down);
    results.push(result(
        "shaft_piece_kinds",
        has_shaft,
        format!("{kinds:?}"),
    ));

    results
}

// ── 7. Determinism ──────────────────────────────────────────────────────

fn build_reference_dungeon() -> (DungeonGenerator, WorldSpawner) {
    let mut generator = DungeonGenerator::new(GeneratorConfig::default());
    let compass = [0.0, 90.0, 180.0, 270.0];
    generator.add_room(one_tile_room("a", &compass), cell_center(0, 0, 0), 0.0);
    generator.add_room(one_tile_room("b", &compass), cell_center(5, 1, 0), 0.0);
    generator.add_room(one_tile_room("c", &compass), cell_center(2, 5, 1), 0.0);

    let mut spawner = WorldSpawner::new();
    generator.generate(Topology::Looping, &mut spawner);
    (generator, spawner)
}

fn validate_determinism() -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut results = Vec::new();

    let (first_generator, first_spawner) = build_reference_dungeon();
    let (second_generator, second_spawner) = build_reference_dungeon();

    let states_match =
        SaveData::capture(&first_generator) == SaveData::capture(&second_generator);
    results.push(result(
        "same_seed_same_state",
        states_match,
        "corridor maps and door states identical".into(),
    ));

    let mut first_pieces = first_spawner.pieces();
    let mut second_pieces = second_spawner.pieces();
    first_pieces.sort_by_key(|(c, _, _)| (c.z, c.x, c.y));
    second_pieces.sort_by_key(|(c, _, _)| (c.z, c.x, c.y));
    results.push(result(
        "same_seed_same_pieces",
        first_pieces == second_pieces,
        format!("{} pieces compared", first_pieces.len()),
    ));

    results
}

// ── 8. Persistence ──────────────────────────────────────────────────────

fn validate_persistence() -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let (generator, _) = build_reference_dungeon();

    let mut buffer = Vec::new();
    if let Err(e) = save_dungeon(&generator, &mut buffer) {
        results.push(result("save_round_trip", false, format!("save failed: {e}")));
        return results;
    }

    match load_dungeon(buffer.as_slice()) {
        Ok(loaded) => {
            let round_trip = SaveData::capture(&loaded) == SaveData::capture(&generator);
            results.push(result(
                "save_round_trip",
                round_trip,
                format!("{} bytes", buffer.len()),
            ));
        }
        Err(e) => {
            results.push(result("save_round_trip", false, format!("load failed: {e}")));
        }
    }

    results
}
