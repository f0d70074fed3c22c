//! Static sub-tile traversal cost grid
//!
//! Built once per map from terrain. Islands and mines are infinite-cost
//! across their footprint plus a dilation radius (keeps routes off
//! obstacle corners); a margin band outside any infinite region carries a
//! high-but-finite surcharge so the search is discouraged from hugging
//! edges even where technically passable.

use crate::core::config::AiConfig;
use crate::core::types::Vec2;
use crate::world::terrain::{TerrainGrid, TileKind};

/// Immutable per-sub-tile cost grid at `resolution` sub-tiles per tile
pub struct NavigationGrid {
    pub width: usize,
    pub height: usize,
    /// World units per sub-tile edge
    pub cell_size: f32,
    costs: Vec<f32>,
}

impl NavigationGrid {
    /// Expand the coarse terrain grid into sub-tile costs
    pub fn build(terrain: &TerrainGrid, config: &AiConfig) -> Self {
        let resolution = config.nav_resolution.max(1) as usize;
        let width = terrain.width * resolution;
        let height = terrain.height * resolution;
        let cell_size = terrain.tile_size / resolution as f32;

        // Pass 1: raw terrain cost per sub-tile
        let mut costs = vec![config.base_move_cost; width * height];
        for y in 0..height {
            for x in 0..width {
                let kind = terrain
                    .get(x / resolution, y / resolution)
                    .unwrap_or(TileKind::Water);
                costs[y * width + x] = match kind {
                    TileKind::Water => config.base_move_cost,
                    TileKind::Cloud => config.base_move_cost + config.cloud_cost,
                    TileKind::Island | TileKind::Mine => f32::INFINITY,
                };
            }
        }

        // Pass 2: dilate infinite regions outward
        let dilated = dilate_blocked(&costs, width, height, config.obstacle_dilation as usize);

        // Pass 3: finite surcharge band around every blocked cell
        let mut final_costs = dilated.clone();
        if config.margin_width > 0 {
            let near_blocked =
                blocked_distance_mask(&dilated, width, height, config.margin_width as usize);
            for (cost, in_margin) in final_costs.iter_mut().zip(near_blocked.iter()) {
                if cost.is_finite() && *in_margin {
                    *cost += config.margin_cost;
                }
            }
        }

        Self {
            width,
            height,
            cell_size,
            costs: final_costs,
        }
    }

    #[inline]
    pub fn cost(&self, x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            self.costs[y * self.width + x]
        } else {
            f32::INFINITY
        }
    }

    #[inline]
    pub fn is_blocked(&self, x: usize, y: usize) -> bool {
        self.cost(x, y).is_infinite()
    }

    /// Convert world position to sub-tile coordinates; None outside the map
    pub fn world_to_cell(&self, pos: Vec2) -> Option<(usize, usize)> {
        let x = (pos.x / self.cell_size).floor() as i32;
        let y = (pos.y / self.cell_size).floor() as i32;
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((x as usize, y as usize))
    }

    /// Sub-tile center in world coordinates
    pub fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) * self.cell_size,
            (y as f32 + 0.5) * self.cell_size,
        )
    }
}

/// Chebyshev dilation: any cell within `radius` of an infinite cell
/// becomes infinite. Iterated one ring at a time so cost stays O(radius).
fn dilate_blocked(costs: &[f32], width: usize, height: usize, radius: usize) -> Vec<f32> {
    let mut current = costs.to_vec();
    for _ in 0..radius {
        let mut next = current.clone();
        for y in 0..height {
            for x in 0..width {
                if current[y * width + x].is_infinite() {
                    continue;
                }
                'ring: for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        let nx = x as i32 + dx;
                        let ny = y as i32 + dy;
                        if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                            continue;
                        }
                        if current[ny as usize * width + nx as usize].is_infinite() {
                            next[y * width + x] = f32::INFINITY;
                            break 'ring;
                        }
                    }
                }
            }
        }
        current = next;
    }
    current
}

/// Mask of finite cells within `width_cells` (Chebyshev) of a blocked cell
fn blocked_distance_mask(
    costs: &[f32],
    width: usize,
    height: usize,
    width_cells: usize,
) -> Vec<bool> {
    let mut mask = vec![false; width * height];
    let reach = width_cells as i32;
    for y in 0..height {
        for x in 0..width {
            if costs[y * width + x].is_infinite() {
                continue;
            }
            'scan: for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                        continue;
                    }
                    if costs[ny as usize * width + nx as usize].is_infinite() {
                        mask[y * width + x] = true;
                        break 'scan;
                    }
                }
            }
        }
    }
    mask
}
