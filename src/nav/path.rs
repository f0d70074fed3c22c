//! Planned route: waypoints plus a monotone cursor

use crate::core::types::Vec2;

/// Ordered world-space waypoints owned by one agent
///
/// The cursor only ever advances; a replan replaces the whole path.
#[derive(Debug, Clone)]
pub struct Path {
    waypoints: Vec<Vec2>,
    cursor: usize,
}

impl Path {
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self {
            waypoints,
            cursor: 0,
        }
    }

    /// Current waypoint, None when exhausted
    pub fn current(&self) -> Option<Vec2> {
        self.waypoints.get(self.cursor).copied()
    }

    /// Final destination of the route
    pub fn goal(&self) -> Option<Vec2> {
        self.waypoints.last().copied()
    }

    pub fn advance(&mut self) {
        if self.cursor < self.waypoints.len() {
            self.cursor += 1;
        }
    }

    /// Advance the cursor while the agent is within `radius` of the
    /// current waypoint; returns the waypoint to steer toward.
    pub fn advance_if_reached(&mut self, position: Vec2, radius: f32) -> Option<Vec2> {
        while let Some(waypoint) = self.current() {
            if position.distance(&waypoint) <= radius {
                self.advance();
            } else {
                return Some(waypoint);
            }
        }
        None
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.waypoints.len()
    }

    /// Waypoints not yet consumed, current first
    pub fn remaining(&self) -> &[Vec2] {
        &self.waypoints[self.cursor.min(self.waypoints.len())..]
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Total polyline length of the full route
    pub fn total_length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum()
    }
}
