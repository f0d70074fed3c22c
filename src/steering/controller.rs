//! Per-agent steering controller
//!
//! Converts a planned path plus local sensing into a smooth per-frame
//! motion command. Owns all hysteresis state for one agent: the current
//! path, the target lock, the smoothed steering vector and the replan
//! rate limiter. Steering only changes direction, never throttle, except
//! to stop on arrival.

use crate::core::config::AiConfig;
use crate::core::types::{Tick, Vec2};
use crate::hazard::HazardField;
use crate::nav::grid::NavigationGrid;
use crate::nav::path::Path;
use crate::nav::pathfinding::find_path;
use crate::steering::flocking;
use crate::steering::target::TargetLock;
use crate::world::arena::{Agent, AgentBehaviorKind};
use crate::world::WorldState;

/// Desired motion for one frame, consumed by the physics integrator
#[derive(Debug, Clone, Copy)]
pub struct MotionCommand {
    /// Radians, atan2 convention
    pub heading: f32,
    pub speed: f32,
}

/// Steering state machine mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SteerMode {
    /// No goal: waiting for the strategy layer or an exploration point
    #[default]
    Acquire,
    /// Following waypoints toward a goal
    Pathing,
    /// Avoidance dominating; a nearby threat breached the forward cone
    Evading,
}

/// Steering and pathing state exclusively owned by one agent
pub struct SteeringController {
    pub mode: SteerMode,
    pub target: TargetLock,
    path: Option<Path>,
    goal: Option<Vec2>,
    smoothed: Vec2,
    last_replan: Option<Tick>,
    idle_since: Option<Tick>,
}

impl SteeringController {
    pub fn new() -> Self {
        Self {
            mode: SteerMode::Acquire,
            target: TargetLock::new(),
            path: None,
            goal: None,
            smoothed: Vec2::ZERO,
            last_replan: None,
            idle_since: None,
        }
    }

    /// Install a new navigation goal, dropping any existing path
    pub fn set_goal(&mut self, goal: Vec2) {
        self.goal = Some(goal);
        self.path = None;
    }

    pub fn goal(&self) -> Option<Vec2> {
        self.goal
    }

    pub fn has_path(&self) -> bool {
        self.path.as_ref().map(|p| !p.is_exhausted()).unwrap_or(false)
    }

    /// Synchronous cancellation: drop goal, path and lock
    pub fn clear(&mut self) {
        self.goal = None;
        self.path = None;
        self.target.invalidate();
        self.mode = SteerMode::Acquire;
    }

    fn replan_allowed(&self, current_tick: Tick, cooldown: Tick) -> bool {
        match self.last_replan {
            None => true,
            Some(last) => current_tick >= last + cooldown,
        }
    }

    /// Replan toward the current goal if due; planning failure leaves the
    /// path empty and the agent falls back to direct steering.
    fn ensure_path(
        &mut self,
        agent: &Agent,
        grid: &NavigationGrid,
        hazard: &HazardField,
        config: &AiConfig,
        current_tick: Tick,
    ) {
        let Some(goal) = self.goal else {
            return;
        };
        if self.has_path() || !self.replan_allowed(current_tick, config.replan_cooldown) {
            return;
        }

        self.last_replan = Some(current_tick);
        match find_path(grid, hazard, agent.position, goal, config) {
            Some(path) => self.path = Some(path),
            None => {
                tracing::debug!(
                    agent = agent.handle.index,
                    "no route to goal, steering directly"
                );
                self.path = None;
            }
        }
    }

    /// Invalidate the path when a newly detected danger sits on the
    /// route ahead. Waypoints are corner-compressed, so the check samples
    /// the hazard field along the upcoming segments at tile granularity
    /// rather than only at the waypoints themselves. Rate-limited through
    /// the replan cooldown so a lingering hazard does not force a replan
    /// every frame.
    fn check_path_danger(
        &mut self,
        position: Vec2,
        tile_size: f32,
        hazard: &HazardField,
        config: &AiConfig,
        current_tick: Tick,
    ) {
        let Some(path) = &self.path else {
            return;
        };

        let lookahead = 6.0 * tile_size;
        let mut travelled = 0.0;
        let mut cursor = position;
        let mut endangered = false;

        'segments: for &waypoint in path.remaining() {
            let segment = waypoint - cursor;
            let length = segment.length();
            if length < 1e-4 {
                continue;
            }
            let direction = segment * (1.0 / length);
            let mut step = 0.0;
            while step < length {
                let sample_point = cursor + direction * step;
                if hazard.sample(sample_point) > config.path_danger_threshold {
                    endangered = true;
                    break 'segments;
                }
                step += tile_size;
                travelled += tile_size;
                if travelled > lookahead {
                    break 'segments;
                }
            }
            cursor = waypoint;
        }

        if endangered && self.replan_allowed(current_tick, config.replan_cooldown) {
            tracing::debug!("path crosses fresh danger, requesting replan");
            self.path = None;
        }
    }

    /// Produce this frame's motion command
    pub fn steer(
        &mut self,
        agent: &Agent,
        world: &WorldState,
        grid: &NavigationGrid,
        hazard: &HazardField,
        config: &AiConfig,
    ) -> MotionCommand {
        let tile = world.terrain.tile_size;
        let current_tick = world.current_tick;

        // Stale lock: the entity is gone, clear and force a recompute
        if let Some(target) = self.target.target() {
            if !world.agents.contains(target) {
                tracing::debug!(agent = agent.handle.index, "locked target gone, clearing");
                self.target.invalidate();
            }
        }

        self.update_target(agent, world, config, current_tick);
        self.maybe_explore(agent, grid, hazard, config, tile, current_tick);
        self.check_path_danger(agent.position, tile, hazard, config, current_tick);
        self.ensure_path(agent, grid, hazard, config, current_tick);

        // (1) desired direction: current waypoint, or the goal directly
        // when planning failed; attack units with no goal pursue their
        // locked target instead
        let waypoint_radius = config.waypoint_radius_tiles * tile;
        let steer_point = match &mut self.path {
            Some(path) => path.advance_if_reached(agent.position, waypoint_radius),
            None => None,
        };
        let pursuit = if self.goal.is_none() && self.target.target().is_some() {
            Some(self.target.last_position)
        } else {
            None
        };
        let arrive_point = steer_point.or(self.goal).or(pursuit);

        if let Some(goal) = self.goal {
            if agent.position.distance(&goal) <= waypoint_radius {
                // Arrived: stop and hand back to Acquire
                self.goal = None;
                self.path = None;
                self.mode = SteerMode::Acquire;
                return MotionCommand {
                    heading: agent.heading,
                    speed: 0.0,
                };
            }
        }

        let desired = match arrive_point {
            Some(point) => agent.position.bearing_to(&point),
            None => Vec2::ZERO,
        };

        // (2) avoidance away from threats and obstacles in the forward cone
        let (avoid, avoid_weight) = self.avoidance(agent, world, config, tile);

        // (3) flocking with same-team, same-class neighbors
        let neighbors = world.flockmates_within(agent, config.neighbor_radius_tiles * tile);
        let flock = flocking::flocking_force(agent, &neighbors, config, tile);

        // (4) panic blend: avoidance takes over as total threat weight
        // approaches the panic threshold
        let panic = (avoid_weight / config.panic_threshold).clamp(0.0, 1.0);
        let calm = (desired + flock).normalize();
        let blended = calm * (1.0 - panic) + avoid.normalize() * panic;

        // (5) exponential smoothing, faster under high panic
        let smoothing = config.steer_smoothing * (1.0 - 0.5 * panic);
        self.smoothed = self.smoothed * smoothing + blended * (1.0 - smoothing);

        self.mode = if panic >= 0.5 {
            SteerMode::Evading
        } else if self.goal.is_some() {
            SteerMode::Pathing
        } else {
            SteerMode::Acquire
        };

        let heading = if self.smoothed.length() > 1e-4 {
            self.smoothed.angle()
        } else {
            agent.heading
        };
        let speed = if arrive_point.is_some() || panic > 0.0 {
            agent.max_speed
        } else {
            0.0
        };

        MotionCommand { heading, speed }
    }

    /// Idle fallback: a controller left without a goal or target for
    /// `explore_idle_ticks` picks a deterministic exploration point
    /// instead of drifting at anchor until the next strategic decision.
    /// Candidates that land out of bounds, on blocked cells, or inside
    /// known danger are skipped.
    fn maybe_explore(
        &mut self,
        agent: &Agent,
        grid: &NavigationGrid,
        hazard: &HazardField,
        config: &AiConfig,
        tile: f32,
        current_tick: Tick,
    ) {
        if self.goal.is_some() || self.target.target().is_some() {
            self.idle_since = None;
            return;
        }
        let since = *self.idle_since.get_or_insert(current_tick);
        if current_tick.saturating_sub(since) < config.explore_idle_ticks {
            return;
        }

        // Golden-angle sweep keyed on the handle so a fleet of idle
        // agents fans out instead of converging on one point
        const GOLDEN_ANGLE: f32 = 2.399_963;
        let spin = agent.handle.index as f32
            + (current_tick / config.explore_idle_ticks.max(1)) as f32;
        let reach = config.explore_radius_tiles * tile;

        for attempt in 0..8 {
            let angle = (spin + attempt as f32) * GOLDEN_ANGLE;
            let candidate = agent.position + Vec2::from_angle(angle) * reach;
            let Some((cx, cy)) = grid.world_to_cell(candidate) else {
                continue;
            };
            if grid.is_blocked(cx, cy)
                || hazard.sample(candidate) > config.path_danger_threshold
            {
                continue;
            }
            tracing::debug!(agent = agent.handle.index, "idle, picking exploration point");
            self.set_goal(candidate);
            self.idle_since = None;
            return;
        }
    }

    /// Score nearby foes and feed the best one through the lock's
    /// hysteresis. Only attack units hunt; other classes keep their lock
    /// empty and rely purely on goals. Closer and weaker foes score
    /// higher, but a rival only steals the lock when it clears the
    /// stickiness margin.
    fn update_target(
        &mut self,
        agent: &Agent,
        world: &WorldState,
        config: &AiConfig,
        current_tick: Tick,
    ) {
        if agent.behavior != AgentBehaviorKind::Kamikaze {
            return;
        }

        // Keep tracking the locked foe even between recomputes
        if let Some(target) = self.target.target() {
            if let Some(foe) = world.agents.get(target) {
                self.target.observe_position(foe.position);
            }
        }

        if !self.target.recompute_due(current_tick, config.target_recompute_cooldown) {
            return;
        }

        let tile = world.terrain.tile_size;
        let sense_radius = config.neighbor_radius_tiles * tile * 2.0;
        let best = world
            .agents
            .iter()
            .filter(|other| other.team.is_hostile_to(agent.team))
            .filter(|other| agent.position.distance(&other.position) <= sense_radius)
            .map(|other| {
                let distance = agent.position.distance(&other.position);
                let score = 100.0 / (1.0 + distance / tile)
                    + (1.0 - other.health_ratio()) * 20.0;
                (other, score)
            })
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        match best {
            Some((foe, score)) => {
                self.target.offer(
                    foe.handle,
                    score,
                    foe.position,
                    config.target_stickiness_margin,
                    current_tick,
                );
            }
            None => self.target.mark_recomputed(current_tick),
        }
    }

    /// Repulsion from threats and blocked terrain within the forward
    /// cone, weighted inversely by distance. Obstacles and head-on
    /// threats get a tangential component so the agent slides around
    /// instead of stalling against a pure reversal.
    fn avoidance(
        &self,
        agent: &Agent,
        world: &WorldState,
        config: &AiConfig,
        tile: f32,
    ) -> (Vec2, f32) {
        let avoid_distance = config.avoid_distance_tiles * tile;
        let cone_cos = config.avoid_cone_half_angle.cos();
        let forward = Vec2::from_angle(agent.heading);

        let mut force = Vec2::ZERO;
        let mut total_weight = 0.0;

        for threat in world.threats_to(agent.team) {
            let offset = threat.position - agent.position;
            let distance = offset.length();
            if distance > avoid_distance + threat.radius || distance < 1e-4 {
                continue;
            }
            let bearing = offset.normalize();
            if forward.dot(&bearing) < cone_cos {
                continue; // behind or outside the cone
            }

            let weight = (avoid_distance / distance.max(0.1 * tile)).min(10.0);
            let away = bearing * -1.0;
            // How head-on is it? 1.0 = dead ahead. Dead-ahead repulsion
            // just reverses the desired vector, so deflect sideways.
            let head_on = forward.dot(&bearing).max(0.0);
            let side = side_sign(forward, bearing);
            let tangent = away.perpendicular() * side;
            force += (away + tangent * head_on).normalize() * weight;
            total_weight += weight;
        }

        // Probe ahead for blocked terrain; tangential slide dominates
        for probe_angle in [-0.6f32, 0.0, 0.6] {
            let direction = Vec2::from_angle(agent.heading + probe_angle);
            let probe = agent.position + direction * avoid_distance;
            let blocked = world
                .terrain
                .sample(probe)
                .map(|kind| kind.is_blocked())
                .unwrap_or(true); // map edge counts as an obstacle
            if !blocked {
                continue;
            }

            let weight = 1.5;
            let away = direction * -1.0;
            let side = side_sign(forward, direction);
            let tangent = direction.perpendicular() * (-side);
            force += (away * 0.3 + tangent).normalize() * weight;
            total_weight += weight;
        }

        (force, total_weight)
    }
}

/// Which side of `forward` the bearing falls on: +1 left, -1 right.
/// Dead-on ties break to the left so the dodge direction is stable.
fn side_sign(forward: Vec2, bearing: Vec2) -> f32 {
    let cross = forward.x * bearing.y - forward.y * bearing.x;
    if cross > 1e-5 {
        -1.0
    } else {
        1.0
    }
}

impl Default for SteeringController {
    fn default() -> Self {
        Self::new()
    }
}
