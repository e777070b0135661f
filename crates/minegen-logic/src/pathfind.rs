//! A* search over the 3D cell grid used to route corridors between doors.
//!
//! The search walks axis-aligned neighbours only. Vertical steps are
//! weighted by a configurable factor so corridors change level only when
//! a flat route costs more, and stepping into a cell that already carries
//! corridor state from an earlier path is discounted so overlapping
//! routes merge instead of tunnelling in parallel.

use crate::grid::{neighbours_3d, GridCoordinate};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Tuning knobs for one generation run's searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Weight applied to the Z component of the grid distance. Values
    /// above 1 discourage gratuitous level changes.
    pub distance_factor_z: i32,
    /// Hard ceiling on popped nodes, protecting against disconnected or
    /// misconfigured grids. Exceeding it is a recoverable "no path".
    pub max_iterations: u32,
    /// Step-cost multiplier for cells already part of another path.
    pub reuse_cost_factor: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            distance_factor_z: 5,
            max_iterations: 800,
            reuse_cost_factor: 0.5,
        }
    }
}

/// Manhattan distance with the vertical axis weighted by `z_factor`.
pub fn grid_distance(a: GridCoordinate, b: GridCoordinate, z_factor: i32) -> f32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let dz = (a.z - b.z).abs();
    (dx + dy + dz * z_factor) as f32
}

#[derive(Debug, Clone, Copy)]
struct PathNode {
    g_cost: f32,
    h_cost: f32,
    parent: GridCoordinate,
    has_parent: bool,
}

impl PathNode {
    fn f_cost(&self) -> f32 {
        self.g_cost + self.h_cost
    }
}

/// Shortest weighted path from `start_door` to `end_door`, inclusive.
///
/// `blocked` cells are never entered. `has_corridor` reports whether a
/// cell already carries accumulated corridor state, which halves (by
/// `reuse_cost_factor`) the cost of stepping into it.
///
/// Determinism: the frontier is kept in insertion order and the minimum
/// scan takes the first entry with the strictly lowest f-cost, so equal
/// cost ties always resolve to the earliest-discovered cell.
///
/// Returns `None` when the frontier empties or the iteration cap is hit.
pub fn find_path<F>(
    start_door: GridCoordinate,
    end_door: GridCoordinate,
    blocked: &HashSet<GridCoordinate>,
    has_corridor: F,
    config: &SearchConfig,
) -> Option<Vec<GridCoordinate>>
where
    F: Fn(GridCoordinate) -> bool,
{
    let mut open_order: Vec<GridCoordinate> = Vec::new();
    let mut open: HashMap<GridCoordinate, PathNode> = HashMap::new();
    let mut closed: HashMap<GridCoordinate, PathNode> = HashMap::new();

    open_order.push(start_door);
    open.insert(
        start_door,
        PathNode {
            g_cost: 0.0,
            h_cost: grid_distance(start_door, end_door, config.distance_factor_z),
            parent: start_door,
            has_parent: false,
        },
    );

    let mut iterations = 0u32;
    while !open_order.is_empty() {
        iterations += 1;
        if iterations > config.max_iterations {
            return None;
        }

        // First-encountered strict minimum f-cost wins ties.
        let mut best_index = 0;
        let mut best_f = open[&open_order[0]].f_cost();
        for (index, coordinate) in open_order.iter().enumerate().skip(1) {
            let f = open[coordinate].f_cost();
            if f < best_f {
                best_f = f;
                best_index = index;
            }
        }
        let current = open_order.remove(best_index);
        let current_node = open
            .remove(&current)
            .expect("open order and open map out of sync");
        closed.insert(current, current_node);

        if current == end_door {
            return Some(retrace(start_door, end_door, &closed));
        }

        for neighbour in neighbours_3d(current) {
            if blocked.contains(&neighbour) {
                continue;
            }

            let mut step_cost = grid_distance(current, neighbour, config.distance_factor_z);
            if has_corridor(neighbour) {
                step_cost *= config.reuse_cost_factor;
            }

            let g_cost = current_node.g_cost + step_cost;
            let h_cost = grid_distance(neighbour, end_door, config.distance_factor_z);
            let f_cost = g_cost + h_cost;

            if let Some(finished) = closed.get(&neighbour) {
                if finished.f_cost() <= f_cost {
                    continue;
                }
            }

            if let Some(entry) = open.get_mut(&neighbour) {
                if entry.f_cost() <= f_cost {
                    continue;
                }
                entry.g_cost = g_cost;
                entry.h_cost = h_cost;
                entry.parent = current;
                entry.has_parent = true;
            } else {
                open.insert(
                    neighbour,
                    PathNode {
                        g_cost,
                        h_cost,
                        parent: current,
                        has_parent: true,
                    },
                );
                open_order.push(neighbour);
            }
        }
    }

    None
}

fn retrace(
    start: GridCoordinate,
    end: GridCoordinate,
    closed: &HashMap<GridCoordinate, PathNode>,
) -> Vec<GridCoordinate> {
    let mut chain = vec![end];
    let mut current = end;
    while closed[&current].has_parent {
        current = closed[&current].parent;
        chain.push(current);
    }
    debug_assert_eq!(*chain.last().expect("chain never empty"), start);
    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_corridors(_: GridCoordinate) -> bool {
        false
    }

    fn cell(x: i32, y: i32, z: i32) -> GridCoordinate {
        GridCoordinate::new(x, y, z)
    }

    #[test]
    fn test_straight_line_on_empty_grid() {
        let blocked = HashSet::new();
        let path = find_path(
            cell(0, 0, 0),
            cell(4, 0, 0),
            &blocked,
            no_corridors,
            &SearchConfig::default(),
        )
        .expect("open grid must have a path");
        // Cells on a shortest path = Manhattan distance + 1 endpoints.
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], cell(0, 0, 0));
        assert_eq!(path[4], cell(4, 0, 0));
    }

    #[test]
    fn test_l_shaped_route_has_manhattan_length() {
        let blocked = HashSet::new();
        let path = find_path(
            cell(0, 0, 0),
            cell(3, 2, 0),
            &blocked,
            no_corridors,
            &SearchConfig::default(),
        )
        .expect("open grid must have a path");
        assert_eq!(path.len(), 6); // 3 + 2 + endpoints
    }

    #[test]
    fn test_trivial_same_cell_path() {
        let blocked = HashSet::new();
        let path = find_path(
            cell(1, 1, 0),
            cell(1, 1, 0),
            &blocked,
            no_corridors,
            &SearchConfig::default(),
        )
        .expect("start == end is a one-cell path");
        assert_eq!(path, vec![cell(1, 1, 0)]);
    }

    #[test]
    fn test_detour_around_wall() {
        // Wall across x=1 for y in -2..=2, gap required around it.
        let mut blocked = HashSet::new();
        for y in -2..=2 {
            blocked.insert(cell(1, y, 0));
        }
        let path = find_path(
            cell(0, 0, 0),
            cell(2, 0, 0),
            &blocked,
            no_corridors,
            &SearchConfig::default(),
        )
        .expect("a detour exists");
        assert!(path.len() > 3, "detour must be longer than the direct route");
        for step in &path {
            assert!(!blocked.contains(step));
        }
    }

    #[test]
    fn test_fully_enclosed_target_fails() {
        let mut blocked = HashSet::new();
        for neighbour in crate::grid::neighbours_3d(cell(5, 5, 0)) {
            blocked.insert(neighbour);
        }
        let result = find_path(
            cell(0, 0, 0),
            cell(5, 5, 0),
            &blocked,
            no_corridors,
            &SearchConfig::default(),
        );
        assert_eq!(result, None);
    }

    #[test]
    fn test_iteration_cap_reports_no_path() {
        // Far beyond what 800 popped nodes can reach.
        let blocked = HashSet::new();
        let result = find_path(
            cell(0, 0, 0),
            cell(2000, 0, 0),
            &blocked,
            no_corridors,
            &SearchConfig::default(),
        );
        assert_eq!(result, None);
    }

    #[test]
    fn test_vertical_steps_avoided_on_flat_grid() {
        let blocked = HashSet::new();
        let path = find_path(
            cell(0, 0, 0),
            cell(6, 0, 0),
            &blocked,
            no_corridors,
            &SearchConfig::default(),
        )
        .expect("open grid must have a path");
        assert!(path.iter().all(|c| c.z == 0), "no reason to change level");
    }

    #[test]
    fn test_existing_corridor_attracts_path() {
        // Two equal-cost shortest routes from (0,0) to (2,2); the one
        // through (1,0)/(2,0)/(2,1) already carries corridor state and
        // must win.
        let blocked = HashSet::new();
        let corridor: HashSet<GridCoordinate> =
            [cell(1, 0, 0), cell(2, 0, 0), cell(2, 1, 0)].into_iter().collect();
        let path = find_path(
            cell(0, 0, 0),
            cell(2, 2, 0),
            &blocked,
            |c| corridor.contains(&c),
            &SearchConfig::default(),
        )
        .expect("open grid must have a path");
        for c in &corridor {
            assert!(path.contains(c), "path should reuse corridor cell {c:?}");
        }
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        let blocked = HashSet::new();
        let config = SearchConfig::default();
        let first = find_path(cell(0, 0, 0), cell(3, 3, 0), &blocked, no_corridors, &config);
        let second = find_path(cell(0, 0, 0), cell(3, 3, 0), &blocked, no_corridors, &config);
        assert_eq!(first, second);
        assert!(first.is_some());
    }
}
