//! Sparse hash grid for efficient neighbor queries

use crate::core::types::Vec2;
use crate::world::arena::{AgentArena, AgentHandle};
use ahash::AHashMap;

/// Sparse hash grid for O(1) agent neighbor queries
pub struct SparseHashGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<AgentHandle>>,
}

impl SparseHashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, handle: AgentHandle, pos: Vec2) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push(handle);
    }

    /// Query live agents within radius, excluding the querying agent
    ///
    /// Scans as many cell rings as the radius spans, so radii larger
    /// than the cell size stay correct.
    pub fn query_radius(
        &self,
        arena: &AgentArena,
        center: Vec2,
        radius: f32,
        exclude: AgentHandle,
    ) -> Vec<AgentHandle> {
        let span = (radius / self.cell_size).ceil().max(1.0) as i32;
        let (cx, cy) = self.cell_coord(center);

        let mut found = Vec::new();
        for dx in -span..=span {
            for dy in -span..=span {
                let Some(handles) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &handle in handles {
                    if handle == exclude {
                        continue;
                    }
                    let in_range = arena
                        .get(handle)
                        .map(|agent| center.distance(&agent.position) <= radius)
                        .unwrap_or(false);
                    if in_range {
                        found.push(handle);
                    }
                }
            }
        }
        found
    }

    /// Rebuild grid from current agent positions
    pub fn rebuild(&mut self, arena: &AgentArena) {
        self.clear();
        for agent in arena.iter() {
            self.insert(agent.handle, agent.position);
        }
    }
}
