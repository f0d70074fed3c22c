//! Sensed-world snapshot for one decision cycle
//!
//! An immutable, read-only summary of everything the strategic layer is
//! allowed to see. Built fresh each decision cycle and discarded after
//! the decision is made; nothing in here outlives the tick it was
//! sensed on.

use crate::core::config::AiConfig;
use crate::core::types::{TeamId, Vec2};
use crate::world::arena::{Agent, AgentBehaviorKind};
use crate::world::terrain::TileKind;
use crate::world::WorldState;

/// Distance and bearing to a sensed point of interest
#[derive(Debug, Clone, Copy)]
pub struct SensedPoint {
    pub position: Vec2,
    pub distance: f32,
    pub bearing: Vec2,
}

impl SensedPoint {
    pub fn toward(from: Vec2, to: Vec2) -> Self {
        Self {
            position: to,
            distance: from.distance(&to),
            bearing: from.bearing_to(&to),
        }
    }
}

/// Immutable per-decision view of self plus nearby world
#[derive(Debug, Clone)]
pub struct GameStateSnapshot {
    pub position: Vec2,
    pub heading: f32,
    pub health_ratio: f32,
    pub team: TeamId,
    pub behavior: AgentBehaviorKind,
    pub gold: u32,
    pub max_speed: f32,
    /// World units per terrain tile, for tile-denominated range checks
    pub tile_size: f32,

    pub nearest_foe: Option<SensedPoint>,
    pub foes_nearby: usize,
    pub nearest_ally: Option<SensedPoint>,
    pub allies_nearby: usize,
    /// Any nearby ally below full health
    pub allies_damaged: bool,

    pub nearest_resource: Option<SensedPoint>,
    pub nearest_build_site: Option<SensedPoint>,
    /// Standing on an unoccupied buildable tile right now
    pub on_build_site: bool,

    /// Closest island tile in sensor range; fighting with terrain at
    /// your back is worth knowing about
    pub nearest_island: Option<SensedPoint>,
    /// Closest mine tile in sensor range
    pub nearest_mine: Option<SensedPoint>,

    pub ability_ready: bool,
    pub unit_count: usize,
    /// Short-horizon position history shows no real displacement
    pub is_stuck: bool,
}

/// Assemble a snapshot for one agent from the injected world state
pub fn build_snapshot(agent: &Agent, world: &WorldState, config: &AiConfig) -> GameStateSnapshot {
    let tile = world.terrain.tile_size;
    let sense_radius = config.neighbor_radius_tiles * tile * 2.0;

    let nearest_foe = world
        .nearest_foe(agent)
        .map(|foe| SensedPoint::toward(agent.position, foe.position));
    let foes_nearby = world.foes_within(agent, sense_radius);

    let allies = world.allies_within(agent, sense_radius);
    let allies_nearby = allies.len();
    let allies_damaged = allies.iter().any(|ally| ally.health_ratio() < 1.0);
    let nearest_ally = allies
        .iter()
        .min_by(|a, b| {
            let da = agent.position.distance_squared(&a.position);
            let db = agent.position.distance_squared(&b.position);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|ally| SensedPoint::toward(agent.position, ally.position));

    let nearest_resource = world
        .nearest_resource(agent.position)
        .map(|res| SensedPoint::toward(agent.position, res.position));

    let nearest_build_site = world
        .nearest_open_build_site(agent.position)
        .map(|site| SensedPoint::toward(agent.position, site.position));
    let on_build_site = nearest_build_site
        .map(|site| site.distance < tile * 0.5)
        .unwrap_or(false);

    let nearest_island = world
        .terrain
        .nearest_tile_of(agent.position, sense_radius, TileKind::Island)
        .map(|point| SensedPoint::toward(agent.position, point));
    let nearest_mine = world
        .terrain
        .nearest_tile_of(agent.position, sense_radius, TileKind::Mine)
        .map(|point| SensedPoint::toward(agent.position, point));

    GameStateSnapshot {
        position: agent.position,
        heading: agent.heading,
        health_ratio: agent.health_ratio(),
        team: agent.team,
        behavior: agent.behavior,
        gold: world.gold(agent.team),
        max_speed: agent.max_speed,
        tile_size: tile,
        nearest_foe,
        foes_nearby,
        nearest_ally,
        allies_nearby,
        allies_damaged,
        nearest_resource,
        nearest_build_site,
        on_build_site,
        nearest_island,
        nearest_mine,
        ability_ready: agent.ability_cooldown == 0,
        unit_count: world.unit_count(agent.team),
        is_stuck: is_stuck(agent, config),
    }
}

/// Stuck when the history window is full and the agent has not moved
/// farther than `stuck_distance` from the oldest sample
fn is_stuck(agent: &Agent, config: &AiConfig) -> bool {
    if agent.position_history.len() < config.stuck_history_len {
        return false;
    }
    let oldest = match agent.position_history.front() {
        Some(pos) => *pos,
        None => return false,
    };
    agent
        .position_history
        .iter()
        .all(|pos| oldest.distance(pos) < config.stuck_distance)
}
