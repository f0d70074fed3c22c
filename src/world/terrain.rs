//! Terrain tile grid
//!
//! The coarse tile map the navigation grid is derived from. Owned by the
//! excluded world-state layer in the full game; here it is the read-only
//! input to grid construction.

use crate::core::types::Vec2;

/// Terrain classification per tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileKind {
    /// Open water, freely traversable
    #[default]
    Water,
    /// Passable but slow/obscuring
    Cloud,
    /// Solid obstacle, never traversable
    Island,
    /// Static mine: hard-blocked for navigation and a permanent hazard
    Mine,
}

impl TileKind {
    pub fn is_blocked(&self) -> bool {
        matches!(self, TileKind::Island | TileKind::Mine)
    }
}

/// Coarse terrain grid, one `TileKind` per tile
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    pub width: usize,
    pub height: usize,
    /// World units per tile edge
    pub tile_size: f32,
    tiles: Vec<TileKind>,
}

impl TerrainGrid {
    pub fn new(width: usize, height: usize, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
            tiles: vec![TileKind::default(); width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<TileKind> {
        if x < self.width && y < self.height {
            Some(self.tiles[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, kind: TileKind) {
        if x < self.width && y < self.height {
            self.tiles[y * self.width + x] = kind;
        }
    }

    /// Fill a rectangle of tiles (clipped to bounds)
    pub fn fill_rect(&mut self, x0: usize, y0: usize, w: usize, h: usize, kind: TileKind) {
        for y in y0..(y0 + h).min(self.height) {
            for x in x0..(x0 + w).min(self.width) {
                self.tiles[y * self.width + x] = kind;
            }
        }
    }

    /// Convert world position to tile coordinates, clamped to bounds
    #[inline]
    pub fn world_to_tile(&self, pos: Vec2) -> (usize, usize) {
        let x = (pos.x / self.tile_size).floor() as i32;
        let y = (pos.y / self.tile_size).floor() as i32;
        (
            x.clamp(0, self.width as i32 - 1) as usize,
            y.clamp(0, self.height as i32 - 1) as usize,
        )
    }

    pub fn in_bounds(&self, pos: Vec2) -> bool {
        pos.x >= 0.0
            && pos.y >= 0.0
            && pos.x < self.width as f32 * self.tile_size
            && pos.y < self.height as f32 * self.tile_size
    }

    /// Tile center in world coordinates
    pub fn tile_center(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) * self.tile_size,
            (y as f32 + 0.5) * self.tile_size,
        )
    }

    pub fn sample(&self, pos: Vec2) -> Option<TileKind> {
        if !self.in_bounds(pos) {
            return None;
        }
        let (x, y) = self.world_to_tile(pos);
        self.get(x, y)
    }

    /// Center of the nearest tile of `kind` within `radius` of `center`
    ///
    /// Scans the bounded tile window row-major, so ties resolve to the
    /// first match in scan order and the result is deterministic.
    pub fn nearest_tile_of(&self, center: Vec2, radius: f32, kind: TileKind) -> Option<Vec2> {
        if radius <= 0.0 {
            return None;
        }
        let span = (radius / self.tile_size).ceil() as i32;
        let (cx, cy) = self.world_to_tile(center);

        let min_x = (cx as i32 - span).max(0) as usize;
        let max_x = ((cx as i32 + span) as usize).min(self.width - 1);
        let min_y = (cy as i32 - span).max(0) as usize;
        let max_y = ((cy as i32 + span) as usize).min(self.height - 1);

        let mut best: Option<(f32, Vec2)> = None;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if self.get(x, y) != Some(kind) {
                    continue;
                }
                let point = self.tile_center(x, y);
                let distance = center.distance(&point);
                if distance > radius {
                    continue;
                }
                if best.map(|(d, _)| distance < d).unwrap_or(true) {
                    best = Some((distance, point));
                }
            }
        }
        best.map(|(_, point)| point)
    }
}
