//! AI tuning configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Values load from TOML when a
//! config file is present and fall back to the tuned defaults otherwise.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{CoreError, Result};

/// Tuning constants for the agent intelligence core
///
/// These values have been tuned to produce good emergent behavior.
/// Changing them will affect unit movement feel and decision pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    // === HAZARD FIELD ===
    /// Per-second multiplicative decay applied to every hazard cell
    ///
    /// At 0.5, a cell loses half its value each second with no sources
    /// nearby. Lower values make danger memories fade faster.
    pub hazard_decay_rate: f32,

    /// Hard cap on any single hazard cell
    ///
    /// Overlapping sources add and then clamp to this, so stacked threats
    /// never produce runaway values.
    pub hazard_max_value: f32,

    /// Intensity of a queued impulse ("this location just got dangerous")
    pub impulse_intensity: f32,

    /// Radius of a queued impulse, in tiles
    pub impulse_radius: f32,

    /// Value reported for samples outside the map
    ///
    /// Deliberately high: the map edge should read as unattractive, not
    /// safe, so retreat searches stay in bounds.
    pub out_of_bounds_hazard: f32,

    /// Permanent hazard floor installed around each mine tile at map load
    pub mine_hazard_value: f32,

    /// Radius of the mine hazard floor, in tiles
    pub mine_hazard_radius: f32,

    // === NAVIGATION GRID ===
    /// Sub-tiles per terrain tile along each axis
    ///
    /// 2 doubles the planning resolution relative to terrain. Higher values
    /// give smoother routes around obstacle corners at quadratic memory
    /// cost.
    pub nav_resolution: u32,

    /// Base cost of entering a free water sub-tile
    pub base_move_cost: f32,

    /// Extra cost for cloud tiles (passable but slow/obscured)
    pub cloud_cost: f32,

    /// Keep-out dilation around islands and mines, in sub-tiles
    ///
    /// Prevents planned routes from clipping obstacle corners that the
    /// steering layer would then have to fight.
    pub obstacle_dilation: u32,

    /// Width of the high-but-finite surcharge band outside any keep-out
    /// region, in sub-tiles
    pub margin_width: u32,

    /// Surcharge added inside the margin band
    ///
    /// High enough that the search hugs obstacles only when every
    /// alternative is worse.
    pub margin_cost: f32,

    /// Multiplier converting a hazard sample into path cost
    pub hazard_weight: f32,

    // === STEERING ===
    /// Waypoint arrival radius as a fraction of one tile
    pub waypoint_radius_tiles: f32,

    /// Distance within which threats and obstacles trigger avoidance, in
    /// tiles
    pub avoid_distance_tiles: f32,

    /// Half-angle of the forward threat cone, radians
    ///
    /// Threats behind the agent are ignored; it cannot outrun what it
    /// cannot see, and turning toward a rear threat makes things worse.
    pub avoid_cone_half_angle: f32,

    /// Radius for separation forces between flockmates, in tiles
    pub separation_radius_tiles: f32,

    /// Radius for alignment/cohesion neighbor sensing, in tiles
    pub neighbor_radius_tiles: f32,

    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,

    /// Total avoidance weight at which avoidance fully dominates steering
    pub panic_threshold: f32,

    /// Exponential smoothing factor for the steering vector (0..1)
    ///
    /// Closer to 1 means heavier smoothing. Under high panic the effective
    /// factor is reduced so agents react faster when danger is acute.
    pub steer_smoothing: f32,

    /// Minimum ticks between target recomputes for one agent
    pub target_recompute_cooldown: Tick,

    /// Fractional score improvement a rival target must show before it can
    /// steal the lock
    ///
    /// 0.15 means a candidate must beat the locked target by >15%. This is
    /// the hysteresis that stops agents flip-flopping between two
    /// similarly-ranked targets every frame.
    pub target_stickiness_margin: f32,

    /// Minimum ticks between replans for one agent
    pub replan_cooldown: Tick,

    /// Hazard level along upcoming waypoints that invalidates a path
    pub path_danger_threshold: f32,

    /// Ticks without a goal or target before an agent picks an
    /// exploration point on its own
    pub explore_idle_ticks: Tick,

    /// How far out exploration points are placed, in tiles
    pub explore_radius_tiles: f32,

    // === STRATEGY ===
    /// Minimax search depth (plies of own-action / opponent-response pairs)
    pub search_depth: u32,

    /// Hard cap on node evaluations per decision
    ///
    /// Depth alone does not bound cost if the action set grows; this
    /// counter does.
    pub node_budget: u32,

    /// Ticks an agent must wait between committed decisions
    pub decision_veto_ticks: Tick,

    /// Simulated opponent closing speed (world units per projected step)
    pub opponent_sim_speed: f32,

    /// Positions sampled for the stuck check and the window length
    pub stuck_history_len: usize,

    /// Total displacement (world units) under which the history window
    /// flags the agent as stuck
    pub stuck_distance: f32,
}

use crate::core::types::Tick;

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            hazard_decay_rate: 0.5,
            hazard_max_value: 10.0,
            impulse_intensity: 6.0,
            impulse_radius: 2.0,
            out_of_bounds_hazard: 10.0,
            mine_hazard_value: 5.0,
            mine_hazard_radius: 2.5,

            nav_resolution: 2,
            base_move_cost: 1.0,
            cloud_cost: 3.0,
            obstacle_dilation: 2,
            margin_width: 2,
            margin_cost: 8.0,
            hazard_weight: 4.0,

            waypoint_radius_tiles: 0.4,
            avoid_distance_tiles: 3.0,
            avoid_cone_half_angle: std::f32::consts::FRAC_PI_2,
            separation_radius_tiles: 1.2,
            neighbor_radius_tiles: 4.0,
            separation_weight: 1.5,
            alignment_weight: 0.6,
            cohesion_weight: 0.4,
            panic_threshold: 3.0,
            steer_smoothing: 0.7,
            target_recompute_cooldown: 15,
            target_stickiness_margin: 0.15,
            replan_cooldown: 10,
            path_danger_threshold: 4.0,
            explore_idle_ticks: 40,
            explore_radius_tiles: 6.0,

            search_depth: 3,
            node_budget: 512,
            decision_veto_ticks: 30,
            opponent_sim_speed: 2.0,
            stuck_history_len: 20,
            stuck_distance: 1.0,
        }
    }
}

impl AiConfig {
    /// The strict cost model: wide keep-out, heavy hazard weighting
    ///
    /// Historically used for combat-phase agents; survives as a preset of
    /// the unified service.
    pub fn strict() -> Self {
        Self {
            obstacle_dilation: 3,
            margin_cost: 12.0,
            hazard_weight: 6.0,
            ..Self::default()
        }
    }

    /// The loose cost model: tighter keep-out, cheaper hazard
    ///
    /// Historically used for exploration-phase agents.
    pub fn loose() -> Self {
        Self {
            obstacle_dilation: 1,
            margin_cost: 4.0,
            hazard_weight: 2.0,
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CoreError::ConfigError(format!("failed to parse AI config: {}", e)))
    }

    /// Load from a TOML file; a missing file yields the tuned defaults
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
