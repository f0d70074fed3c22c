//! Sensed world state and typed query accessors
//!
//! `WorldState` is the explicit query service handed to every AI
//! component at construction time. It replaces ambient global registries:
//! anything the core wants to know about the world goes through these
//! typed accessors, so tests can substitute a fixed fixture world.

pub mod arena;
pub mod spatial;
pub mod terrain;
pub mod threats;

use ahash::AHashMap;

use crate::core::types::{TeamId, Tick, Vec2};
use arena::{Agent, AgentArena, AgentBehaviorKind, AgentHandle};
use spatial::SparseHashGrid;
use terrain::TerrainGrid;
use threats::Threat;

/// A collectible resource drop (floating gold, salvage)
#[derive(Debug, Clone)]
pub struct ResourceNode {
    pub position: Vec2,
    pub value: u32,
}

/// A place where an architect may erect a structure
#[derive(Debug, Clone)]
pub struct BuildSite {
    pub position: Vec2,
    pub occupied: bool,
}

/// The sensed world: terrain, live entities, threats, economy
pub struct WorldState {
    pub current_tick: Tick,
    pub terrain: TerrainGrid,
    pub agents: AgentArena,
    pub threats: Vec<Threat>,
    pub resources: Vec<ResourceNode>,
    pub build_sites: Vec<BuildSite>,
    gold: AHashMap<TeamId, u32>,
    spatial: SparseHashGrid,
}

impl WorldState {
    pub fn new(terrain: TerrainGrid) -> Self {
        let cell_size = terrain.tile_size * 2.0;
        Self {
            current_tick: 0,
            terrain,
            agents: AgentArena::new(),
            threats: Vec::new(),
            resources: Vec::new(),
            build_sites: Vec::new(),
            gold: AHashMap::new(),
            spatial: SparseHashGrid::new(cell_size),
        }
    }

    /// Refresh tick-scoped indices; called once at the top of each tick
    pub fn begin_tick(&mut self) {
        self.current_tick += 1;
        self.spatial.rebuild(&self.agents);
    }

    // === economy ===

    pub fn gold(&self, team: TeamId) -> u32 {
        self.gold.get(&team).copied().unwrap_or(0)
    }

    pub fn add_gold(&mut self, team: TeamId, amount: u32) {
        *self.gold.entry(team).or_insert(0) += amount;
    }

    /// Synchronous spend; false means insufficient funds
    pub fn try_spend_gold(&mut self, team: TeamId, amount: u32) -> bool {
        match self.gold.get_mut(&team) {
            Some(balance) if *balance >= amount => {
                *balance -= amount;
                true
            }
            _ => false,
        }
    }

    // === typed queries ===

    /// Threats dangerous to the given team
    pub fn threats_to(&self, team: TeamId) -> impl Iterator<Item = &Threat> {
        self.threats.iter().filter(move |t| t.threatens(team))
    }

    /// Nearest hostile agent to the given agent
    pub fn nearest_foe(&self, agent: &Agent) -> Option<&Agent> {
        self.agents
            .iter()
            .filter(|other| other.team.is_hostile_to(agent.team))
            .min_by(|a, b| {
                let da = agent.position.distance_squared(&a.position);
                let db = agent.position.distance_squared(&b.position);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Count of hostile agents within radius
    pub fn foes_within(&self, agent: &Agent, radius: f32) -> usize {
        let r2 = radius * radius;
        self.agents
            .iter()
            .filter(|other| other.team.is_hostile_to(agent.team))
            .filter(|other| agent.position.distance_squared(&other.position) <= r2)
            .count()
    }

    /// Same-team, same-behavior neighbors within radius (flockmates)
    pub fn flockmates_within(&self, agent: &Agent, radius: f32) -> Vec<&Agent> {
        self.spatial
            .query_radius(&self.agents, agent.position, radius, agent.handle)
            .into_iter()
            .filter_map(|handle| self.agents.get(handle))
            .filter(|other| other.team == agent.team && other.behavior == agent.behavior)
            .collect()
    }

    /// Allies (any behavior) within radius
    pub fn allies_within(&self, agent: &Agent, radius: f32) -> Vec<&Agent> {
        self.spatial
            .query_radius(&self.agents, agent.position, radius, agent.handle)
            .into_iter()
            .filter_map(|handle| self.agents.get(handle))
            .filter(|other| other.team == agent.team)
            .collect()
    }

    pub fn nearest_resource(&self, from: Vec2) -> Option<&ResourceNode> {
        self.resources.iter().min_by(|a, b| {
            let da = from.distance_squared(&a.position);
            let db = from.distance_squared(&b.position);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Nearest unoccupied build site
    pub fn nearest_open_build_site(&self, from: Vec2) -> Option<&BuildSite> {
        self.build_sites
            .iter()
            .filter(|site| !site.occupied)
            .min_by(|a, b| {
                let da = from.distance_squared(&a.position);
                let db = from.distance_squared(&b.position);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Count live units per team (base producers excluded)
    pub fn unit_count(&self, team: TeamId) -> usize {
        self.agents
            .iter()
            .filter(|a| a.team == team && a.behavior != AgentBehaviorKind::BaseProducer)
            .count()
    }

    /// Remove stale threats by id
    pub fn remove_threat(&mut self, id: crate::core::types::ThreatId) {
        self.threats.retain(|t| t.id != id);
    }

    pub fn spawn_agent(&mut self, agent: Agent) -> AgentHandle {
        self.agents.spawn(agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::threats::ThreatKind;

    fn fixture_world() -> WorldState {
        let mut world = WorldState::new(TerrainGrid::new(32, 32, 32.0));
        world.add_gold(TeamId(1), 100);
        world
    }

    fn spawn(world: &mut WorldState, x: f32, y: f32, team: TeamId) -> AgentHandle {
        world.spawn_agent(Agent::new(
            Vec2::new(x, y),
            team,
            AgentBehaviorKind::Kamikaze,
        ))
    }

    #[test]
    fn test_gold_spend() {
        let mut world = fixture_world();
        assert!(world.try_spend_gold(TeamId(1), 60));
        assert_eq!(world.gold(TeamId(1)), 40);
        assert!(!world.try_spend_gold(TeamId(1), 60));
        assert!(!world.try_spend_gold(TeamId(2), 1));
    }

    #[test]
    fn test_nearest_foe_ignores_allies() {
        let mut world = fixture_world();
        let me = spawn(&mut world, 10.0, 10.0, TeamId(1));
        spawn(&mut world, 12.0, 10.0, TeamId(1)); // ally, closer
        let foe = spawn(&mut world, 30.0, 10.0, TeamId(2));
        spawn(&mut world, 200.0, 10.0, TeamId(2)); // farther foe

        let agent = world.agents.get(me).unwrap();
        let nearest = world.nearest_foe(agent).unwrap();
        assert_eq!(nearest.handle, foe);
    }

    #[test]
    fn test_flockmates_require_same_behavior() {
        let mut world = fixture_world();
        world.spawn_agent(Agent::new(
            Vec2::new(10.0, 10.0),
            TeamId(1),
            AgentBehaviorKind::Kamikaze,
        ));
        world.spawn_agent(Agent::new(
            Vec2::new(12.0, 10.0),
            TeamId(1),
            AgentBehaviorKind::Architect,
        ));
        let mate = world.spawn_agent(Agent::new(
            Vec2::new(11.0, 10.0),
            TeamId(1),
            AgentBehaviorKind::Kamikaze,
        ));
        world.begin_tick();

        let handles = world.agents.handles();
        let agent = world.agents.get(handles[0]).unwrap();
        let mates = world.flockmates_within(agent, 10.0);
        assert_eq!(mates.len(), 1);
        assert_eq!(mates[0].handle, mate);
    }

    #[test]
    fn test_open_build_site_filter() {
        let mut world = fixture_world();
        world.build_sites.push(BuildSite {
            position: Vec2::new(5.0, 5.0),
            occupied: true,
        });
        world.build_sites.push(BuildSite {
            position: Vec2::new(50.0, 50.0),
            occupied: false,
        });

        let site = world.nearest_open_build_site(Vec2::new(0.0, 0.0)).unwrap();
        assert_eq!(site.position.x, 50.0);
    }

    #[test]
    fn test_threats_to_filters_by_team() {
        let mut world = fixture_world();
        world.threats.push(
            Threat::new(1, ThreatKind::EnemyUnit, Vec2::ZERO, 2.0, 3.0).with_team(TeamId(1)),
        );
        world
            .threats
            .push(Threat::new(2, ThreatKind::Storm, Vec2::ZERO, 4.0, 5.0));

        assert_eq!(world.threats_to(TeamId(1)).count(), 1); // storm only
        assert_eq!(world.threats_to(TeamId(2)).count(), 2);
    }
}
