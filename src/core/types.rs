//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Team identifier (0 is reserved for the neutral/world team)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(pub u8);

impl TeamId {
    pub const NEUTRAL: TeamId = TeamId(0);

    pub fn is_hostile_to(&self, other: TeamId) -> bool {
        *self != other && *self != TeamId::NEUTRAL && other != TeamId::NEUTRAL
    }
}

/// Unique identifier for transient threat sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreatId(pub u32);

/// 2D position / direction vector in world units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians, atan2 convention)
    pub fn from_angle(angle: f32) -> Self {
        Self {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0001 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::default()
        }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Heading angle in radians (atan2 convention)
    pub fn angle(&self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Counter-clockwise perpendicular
    pub fn perpendicular(&self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Bearing from self toward target, normalized
    pub fn bearing_to(&self, target: &Self) -> Self {
        (*target - *self).normalize()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_hostility() {
        assert!(TeamId(1).is_hostile_to(TeamId(2)));
        assert!(!TeamId(1).is_hostile_to(TeamId(1)));
        assert!(!TeamId::NEUTRAL.is_hostile_to(TeamId(2)));
        assert!(!TeamId(2).is_hostile_to(TeamId::NEUTRAL));
    }

    #[test]
    fn test_vec2_normalize_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    }

    #[test]
    fn test_vec2_angle_round_trip() {
        let v = Vec2::from_angle(1.2);
        assert!((v.angle() - 1.2).abs() < 1e-5);
        assert!((v.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_vec2_perpendicular_is_orthogonal() {
        let v = Vec2::new(3.0, -2.0);
        assert!(v.dot(&v.perpendicular()).abs() < 1e-6);
    }

    #[test]
    fn test_bearing_to_is_unit_length() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 10.0);
        let bearing = a.bearing_to(&b);
        assert!((bearing.length() - 1.0).abs() < 1e-5);
        assert!(bearing.x > 0.0 && bearing.y > 0.0);
    }
}
