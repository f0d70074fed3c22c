//! Hazard-weighted A* over the navigation grid
//!
//! Cost of entering a cell is its static cost plus the live hazard sample
//! scaled by `hazard_weight`. Tie-breaking is a strict total order on
//! (f-score, x, y) so the returned route is fully deterministic for a
//! fixed grid and hazard snapshot.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::core::config::AiConfig;
use crate::core::types::Vec2;
use crate::hazard::HazardField;
use crate::nav::grid::NavigationGrid;
use crate::nav::path::Path;

const SQRT_2: f32 = std::f32::consts::SQRT_2;

type Cell = (usize, usize);

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode {
    cell: Cell,
    f_cost: OrderedFloat<f32>,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.f_cost == other.f_cost && self.cell == other.cell
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; coordinates break f-score ties so
        // expansion order (and therefore the route) is deterministic
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.cell.0.cmp(&self.cell.0))
            .then_with(|| other.cell.1.cmp(&self.cell.1))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Octile-distance heuristic in units of the cheapest possible step
fn heuristic(a: Cell, b: Cell, base_cost: f32) -> f32 {
    let dx = (a.0 as f32 - b.0 as f32).abs();
    let dy = (a.1 as f32 - b.1 as f32).abs();
    let diagonal = dx.min(dy);
    let straight = (dx - dy).abs();
    (straight + SQRT_2 * diagonal) * base_cost
}

/// Find a hazard-aware route between two world points
///
/// Returns None when start or goal resolve outside the map or to a
/// blocked cell, or when the open set exhausts. Callers treat None as
/// "hold position or steer directly," never as a fatal error.
pub fn find_path(
    grid: &NavigationGrid,
    hazard: &HazardField,
    start: Vec2,
    goal: Vec2,
    config: &AiConfig,
) -> Option<Path> {
    let start_cell = grid.world_to_cell(start)?;
    let goal_cell = grid.world_to_cell(goal)?;

    if grid.is_blocked(start_cell.0, start_cell.1) || grid.is_blocked(goal_cell.0, goal_cell.1) {
        return None;
    }
    if start_cell == goal_cell {
        return Some(Path::new(vec![goal]));
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<Cell, Cell> = AHashMap::new();
    let mut g_scores: AHashMap<Cell, f32> = AHashMap::new();

    g_scores.insert(start_cell, 0.0);
    open_set.push(PathNode {
        cell: start_cell,
        f_cost: OrderedFloat(heuristic(start_cell, goal_cell, config.base_move_cost)),
    });

    while let Some(current) = open_set.pop() {
        if current.cell == goal_cell {
            let cells = reconstruct_path(&came_from, current.cell);
            return Some(cells_to_path(grid, &cells, goal));
        }

        let current_g = *g_scores.get(&current.cell).unwrap_or(&f32::INFINITY);

        for (neighbor, diagonal) in neighbors(grid, current.cell) {
            let static_cost = grid.cost(neighbor.0, neighbor.1);
            if static_cost.is_infinite() {
                continue;
            }

            let center = grid.cell_center(neighbor.0, neighbor.1);
            let enter_cost = static_cost + hazard.sample(center) * config.hazard_weight;
            let step_scale = if diagonal { SQRT_2 } else { 1.0 };
            let tentative_g = current_g + enter_cost * step_scale;

            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&f32::INFINITY);
            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.cell);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    cell: neighbor,
                    f_cost: OrderedFloat(
                        tentative_g + heuristic(neighbor, goal_cell, config.base_move_cost),
                    ),
                });
            }
        }
    }

    None // No path found
}

/// 8-connected neighbors with a diagonal flag
///
/// A diagonal step whose two adjacent orthogonal cells are both blocked
/// is rejected: the move would thread the geometric corner between two
/// obstacles, which the steering layer cannot actually sail through.
fn neighbors(grid: &NavigationGrid, cell: Cell) -> Vec<(Cell, bool)> {
    let mut result = Vec::with_capacity(8);
    for dy in -1i32..=1 {
        for dx in -1i32..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = cell.0 as i32 + dx;
            let ny = cell.1 as i32 + dy;
            if nx < 0 || ny < 0 || nx >= grid.width as i32 || ny >= grid.height as i32 {
                continue;
            }
            let diagonal = dx != 0 && dy != 0;
            if diagonal
                && grid.is_blocked(nx as usize, cell.1)
                && grid.is_blocked(cell.0, ny as usize)
            {
                continue;
            }
            result.push(((nx as usize, ny as usize), diagonal));
        }
    }
    result
}

/// Reconstruct cell sequence from came_from map, start first
fn reconstruct_path(came_from: &AHashMap<Cell, Cell>, mut current: Cell) -> Vec<Cell> {
    let mut cells = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        cells.push(prev);
        current = prev;
    }
    cells.reverse();
    cells
}

/// Convert a cell route into waypoints: insert axis-aligned checkpoints
/// at diagonal/orthogonal transitions, then compress collinear runs into
/// corner waypoints only. The exact requested goal replaces the final
/// cell center so arrival checks use the caller's point.
fn cells_to_path(grid: &NavigationGrid, cells: &[Cell], goal: Vec2) -> Path {
    let aligned = insert_axis_checkpoints(cells);
    let corners = compress_collinear(&aligned);

    let mut waypoints: Vec<Vec2> = corners
        .iter()
        .map(|&(x, y)| grid.cell_center(x, y))
        .collect();
    if let Some(last) = waypoints.last_mut() {
        *last = goal;
    }
    Path::new(waypoints)
}

#[derive(Clone, Copy, PartialEq)]
struct Step(i32, i32);

impl Step {
    fn between(a: Cell, b: Cell) -> Step {
        Step(b.0 as i32 - a.0 as i32, b.1 as i32 - a.1 as i32)
    }

    fn is_diagonal(&self) -> bool {
        self.0 != 0 && self.1 != 0
    }
}

/// Where a diagonal step meets an orthogonal one, split the diagonal into
/// its two axis components so the route reads as grid-aligned. The
/// inserted corner shares an axis with the following orthogonal step.
fn insert_axis_checkpoints(cells: &[Cell]) -> Vec<Cell> {
    if cells.len() < 3 {
        return cells.to_vec();
    }

    let mut result = vec![cells[0]];
    for i in 1..cells.len() {
        let step = Step::between(cells[i - 1], cells[i]);
        let next_step = if i + 1 < cells.len() {
            Some(Step::between(cells[i], cells[i + 1]))
        } else {
            None
        };

        if step.is_diagonal() {
            if let Some(next) = next_step {
                if !next.is_diagonal() {
                    // Checkpoint first along the axis the route continues on
                    let prev = cells[i - 1];
                    let checkpoint = if next.0 != 0 {
                        (
                            (prev.0 as i32 + step.0) as usize,
                            prev.1,
                        )
                    } else {
                        (
                            prev.0,
                            (prev.1 as i32 + step.1) as usize,
                        )
                    };
                    if checkpoint != cells[i] {
                        result.push(checkpoint);
                    }
                }
            }
        }
        result.push(cells[i]);
    }
    result
}

/// Keep only the endpoints of straight runs
fn compress_collinear(cells: &[Cell]) -> Vec<Cell> {
    if cells.len() < 3 {
        return cells.to_vec();
    }

    let mut result = vec![cells[0]];
    for i in 1..cells.len() - 1 {
        let incoming = Step::between(cells[i - 1], cells[i]);
        let outgoing = Step::between(cells[i], cells[i + 1]);
        if incoming != outgoing {
            result.push(cells[i]);
        }
    }
    result.push(cells[cells.len() - 1]);
    result
}
