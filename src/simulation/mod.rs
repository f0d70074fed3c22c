//! Per-tick orchestration of the AI pipeline
//!
//! The host game owns the world; this layer owns the per-agent AI state
//! (steering controllers, planners, base producers) and runs the whole
//! pipeline in a fixed order each tick. Output is a batch of commands
//! for the host to apply, never direct mutation of agent kinematics.

pub mod tick;

use ahash::AHashMap;

use crate::core::config::AiConfig;
use crate::hazard::field::HazardField;
use crate::nav::grid::NavigationGrid;
use crate::steering::controller::{MotionCommand, SteeringController};
use crate::strategy::actions::StrategicAction;
use crate::strategy::minimax::StrategicPlanner;
use crate::strategy::value_table::{BaseProducer, ProductionAction, ValueTable};
use crate::world::arena::AgentHandle;
use crate::world::terrain::{TerrainGrid, TileKind};

pub use tick::run_ai_tick;

/// This tick's output for one agent
#[derive(Debug, Clone, Copy)]
pub struct AgentCommand {
    pub handle: AgentHandle,
    pub motion: MotionCommand,
    /// Freshly committed strategic action, if the veto timer allowed one
    pub action: Option<StrategicAction>,
    /// Base production order, only emitted by base agents
    pub production: Option<ProductionAction>,
}

/// All AI subsystem state for one side
pub struct AiSystems {
    pub config: AiConfig,
    pub nav: NavigationGrid,
    pub hazard: HazardField,
    pub(crate) controllers: AHashMap<AgentHandle, SteeringController>,
    pub(crate) planners: AHashMap<AgentHandle, StrategicPlanner>,
    pub(crate) producers: AHashMap<AgentHandle, BaseProducer>,
    pub(crate) production_table: Option<ValueTable>,
    pub(crate) seed: u64,
}

impl AiSystems {
    pub fn new(terrain: &TerrainGrid, config: AiConfig, seed: u64) -> Self {
        let nav = NavigationGrid::build(terrain, &config);
        let mut hazard =
            HazardField::new(terrain.width, terrain.height, terrain.tile_size, &config);

        // Mines are permanently dangerous, not just impassable: floor the
        // field around each one so routes and retreats keep clear
        let mine_radius = config.mine_hazard_radius * terrain.tile_size;
        for y in 0..terrain.height {
            for x in 0..terrain.width {
                if terrain.get(x, y) == Some(TileKind::Mine) {
                    hazard.set_baseline_disk(
                        terrain.tile_center(x, y),
                        mine_radius,
                        config.mine_hazard_value,
                    );
                }
            }
        }

        Self {
            config,
            nav,
            hazard,
            controllers: AHashMap::new(),
            planners: AHashMap::new(),
            producers: AHashMap::new(),
            production_table: None,
            seed,
        }
    }

    /// Install the learned production table. Bases whose producers were
    /// already created keep their old (possibly absent) table.
    pub fn with_production_table(mut self, table: ValueTable) -> Self {
        self.production_table = Some(table);
        self
    }

    /// Static terrain changed (tower built, island razed): rebuild the
    /// cost grid so future plans see it
    pub fn rebuild_nav(&mut self, terrain: &TerrainGrid) {
        self.nav = NavigationGrid::build(terrain, &self.config);
    }

    /// Drop AI state for agents that no longer exist
    pub(crate) fn retain_live(&mut self, live: impl Fn(AgentHandle) -> bool) {
        self.controllers.retain(|handle, _| live(*handle));
        self.planners.retain(|handle, _| live(*handle));
        self.producers.retain(|handle, _| live(*handle));
    }
}
