//! Live threat sources
//!
//! Everything that injects danger into the hazard field: projectiles,
//! storms, raiders, enemy units, static mines. Each exposes a world
//! position plus an effective radius and intensity; the hazard field does
//! not care which kind produced them.

use crate::core::types::{TeamId, ThreatId, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatKind {
    Projectile,
    Storm,
    Raider,
    EnemyUnit,
    Mine,
}

impl ThreatKind {
    /// Mines never move and never expire; they feed the baseline layer
    /// instead of the per-tick injection pass.
    pub fn is_static(&self) -> bool {
        matches!(self, ThreatKind::Mine)
    }
}

/// One active danger source
#[derive(Debug, Clone)]
pub struct Threat {
    pub id: ThreatId,
    pub kind: ThreatKind,
    pub position: Vec2,
    /// Falloff disk radius in world units; zero-radius threats are inert
    pub radius: f32,
    /// Hazard added at the disk center
    pub intensity: f32,
    /// Owning team, `TeamId::NEUTRAL` for weather
    pub team: TeamId,
}

impl Threat {
    pub fn new(id: u32, kind: ThreatKind, position: Vec2, radius: f32, intensity: f32) -> Self {
        Self {
            id: ThreatId(id),
            kind,
            position,
            radius,
            intensity,
            team: TeamId::NEUTRAL,
        }
    }

    pub fn with_team(mut self, team: TeamId) -> Self {
        self.team = team;
        self
    }

    /// Is this threat dangerous to the given team?
    pub fn threatens(&self, team: TeamId) -> bool {
        match self.kind {
            // Weather and mines are indiscriminate
            ThreatKind::Storm | ThreatKind::Mine => true,
            _ => self.team != team,
        }
    }
}
