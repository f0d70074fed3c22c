//! The fixed per-tick pipeline
//!
//! Order matters: hazard decay and injection run before any agent reads
//! the field, agent bookkeeping (position history, cooldowns) runs
//! before snapshots are taken, and steering runs last so it sees this
//! tick's goals.

use std::f32::consts::FRAC_PI_4;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::AiConfig;
use crate::core::types::Vec2;
use crate::hazard::field::HazardField;
use crate::simulation::{AgentCommand, AiSystems};
use crate::steering::controller::{MotionCommand, SteeringController};
use crate::strategy::actions::StrategicAction;
use crate::strategy::minimax::StrategicPlanner;
use crate::strategy::snapshot::{build_snapshot, GameStateSnapshot};
use crate::strategy::value_table::BaseProducer;
use crate::world::arena::{Agent, AgentBehaviorKind};
use crate::world::WorldState;

/// Run one AI tick for every live agent
///
/// `dt` is simulation seconds since the previous call. Ability effects
/// are the host's business: when it executes an `ActivateAbility`
/// command it must set the agent's cooldown, otherwise the planner will
/// keep re-committing the action every veto period.
pub fn run_ai_tick(world: &mut WorldState, systems: &mut AiSystems, dt: f32) -> Vec<AgentCommand> {
    world.begin_tick();
    systems.hazard.update(dt, &world.threats);

    let handles = world.agents.handles();
    let window = systems.config.stuck_history_len;
    for &handle in &handles {
        if let Some(agent) = world.agents.get_mut(handle) {
            agent.record_position(window);
            agent.ability_cooldown = agent.ability_cooldown.saturating_sub(1);
        }
    }

    let world = &*world;
    systems.retain_live(|handle| world.agents.contains(handle));

    let AiSystems {
        config,
        nav,
        hazard,
        controllers,
        planners,
        producers,
        production_table,
        seed,
    } = systems;

    let mut commands = Vec::with_capacity(handles.len());
    for handle in handles {
        let agent = match world.agents.get(handle) {
            Some(agent) => agent.clone(),
            None => continue,
        };

        if agent.behavior == AgentBehaviorKind::BaseProducer {
            let snapshot = build_snapshot(&agent, world, config);
            let producer = producers.entry(handle).or_insert_with(|| {
                let table = production_table.clone();
                BaseProducer::new(table, ChaCha8Rng::seed_from_u64(*seed ^ u64::from(handle.index)))
            });
            commands.push(AgentCommand {
                handle,
                motion: MotionCommand {
                    heading: agent.heading,
                    speed: 0.0,
                },
                action: None,
                production: Some(producer.decide(&snapshot)),
            });
            continue;
        }

        let controller = controllers.entry(handle).or_insert_with(SteeringController::new);
        let planner = planners.entry(handle).or_insert_with(StrategicPlanner::new);

        let snapshot = build_snapshot(&agent, world, config);
        let decided = planner.decide_if_due(&snapshot, config, world.current_tick);
        if let Some(action) = decided {
            apply_action_as_goal(action, &agent, &snapshot, controller, hazard, config);
        }

        let motion = controller.steer(&agent, world, nav, hazard, config);
        commands.push(AgentCommand {
            handle,
            motion,
            action: decided,
            production: None,
        });
    }

    commands
}

/// Translate a committed strategic action into a steering goal
fn apply_action_as_goal(
    action: StrategicAction,
    agent: &Agent,
    snapshot: &GameStateSnapshot,
    controller: &mut SteeringController,
    hazard: &HazardField,
    config: &AiConfig,
) {
    let tile = snapshot.tile_size;
    match action {
        StrategicAction::Hold => controller.clear(),
        StrategicAction::NavigateToResource => {
            if let Some(resource) = snapshot.nearest_resource {
                controller.set_goal(resource.position);
            }
        }
        StrategicAction::Retreat => {
            let search_radius = config.neighbor_radius_tiles * tile * 2.0;
            let refuge = hazard.find_safest_point(agent.position, search_radius);
            controller.set_goal(refuge);
        }
        StrategicAction::BuildTower => {
            if let Some(site) = snapshot.nearest_build_site {
                controller.set_goal(site.position);
            }
        }
        StrategicAction::ActivateAbility => {}
        StrategicAction::GetUnstuck => {
            // Deterministic sidestep: directly away from pinning terrain
            // when there is some, otherwise swing well off the current
            // heading. Either way commit to a short fixed-length leg.
            let bearing = match snapshot.nearest_island {
                Some(island) if island.distance < 2.0 * tile => island.bearing * -1.0,
                _ => Vec2::from_angle(agent.heading + 3.0 * FRAC_PI_4),
            };
            let escape = agent.position + bearing * (4.0 * tile);
            controller.clear();
            controller.set_goal(escape);
        }
    }
}
