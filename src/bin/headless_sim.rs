//! Headless Simulation Runner
//!
//! Runs the full AI pipeline on a generated map with no renderer and
//! prints a JSON summary, for profiling and for eyeballing behavior
//! changes after tuning.

use clap::Parser;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use stormwake::core::config::AiConfig;
use stormwake::core::types::{TeamId, Vec2};
use stormwake::simulation::{run_ai_tick, AiSystems};
use stormwake::strategy::value_table::ValueTable;
use stormwake::world::arena::{Agent, AgentBehaviorKind};
use stormwake::world::terrain::{TerrainGrid, TileKind};
use stormwake::world::threats::{Threat, ThreatKind};
use stormwake::world::{BuildSite, ResourceNode, WorldState};

/// Headless Simulation Runner - full AI pipeline, no renderer
#[derive(Parser, Debug)]
#[command(name = "headless_sim")]
#[command(about = "Run the AI pipeline on a generated map and print a JSON summary")]
struct Args {
    /// Map width and height in tiles
    #[arg(long, default_value_t = 48)]
    map_size: usize,

    /// Number of friendly mobile agents to spawn
    #[arg(long, default_value_t = 8)]
    agents: usize,

    /// Number of hostile raiders to spawn
    #[arg(long, default_value_t = 3)]
    raiders: usize,

    /// Ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Fixed timestep in seconds
    #[arg(long, default_value_t = 0.05)]
    dt: f32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Optional production value table (JSON)
    #[arg(long)]
    table: Option<String>,

    /// Config TOML path; defaults apply when omitted
    #[arg(long)]
    config: Option<String>,

    /// Log each agent's motion every tick
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    agents_spawned: usize,
    decisions_committed: u64,
    production_orders: u64,
    total_distance: f32,
    mean_hazard_at_agents: f32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stormwake=info".into()),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(|| rand::random());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let config = match &args.config {
        Some(path) => match AiConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: failed to load config '{}': {}", path, e);
                eprintln!("Using default config");
                AiConfig::default()
            }
        },
        None => AiConfig::default(),
    };

    let terrain = generate_terrain(args.map_size, &mut rng);
    let mut world = WorldState::new(terrain);
    let mut systems = AiSystems::new(&world.terrain, config, seed);

    if let Some(path) = &args.table {
        match ValueTable::load_from_file(path) {
            Ok(table) => systems = systems.with_production_table(table),
            Err(e) => eprintln!("Warning: failed to load value table '{}': {}", path, e),
        }
    }

    populate(&mut world, &args, &mut rng);

    let mut decisions_committed = 0u64;
    let mut production_orders = 0u64;
    let mut total_distance = 0.0f32;

    for _ in 0..args.ticks {
        let commands = run_ai_tick(&mut world, &mut systems, args.dt);

        for command in &commands {
            if command.action.is_some() {
                decisions_committed += 1;
            }
            if command.production.is_some() {
                production_orders += 1;
            }
            if let Some(agent) = world.agents.get_mut(command.handle) {
                let step = command.motion.speed * args.dt;
                agent.heading = command.motion.heading;
                agent.position += Vec2::from_angle(agent.heading) * step;
                total_distance += step;

                if args.verbose {
                    eprintln!(
                        "  [{}] agent {} at ({:.1},{:.1}) heading {:.2} speed {:.2}",
                        world.current_tick,
                        command.handle.index,
                        agent.position.x,
                        agent.position.y,
                        command.motion.heading,
                        command.motion.speed,
                    );
                }
            }
        }
    }

    let mut hazard_sum = 0.0f32;
    let mut sampled = 0usize;
    for agent in world.agents.iter() {
        hazard_sum += systems.hazard.sample(agent.position);
        sampled += 1;
    }

    let summary = RunSummary {
        seed,
        ticks: args.ticks,
        agents_spawned: args.agents + args.raiders + 1,
        decisions_committed,
        production_orders,
        total_distance,
        mean_hazard_at_agents: if sampled > 0 {
            hazard_sum / sampled as f32
        } else {
            0.0
        },
    };
    println!("{}", serde_json::to_string_pretty(&summary).unwrap());
}

/// Scatter islands, cloud banks, and a few mines across open water
fn generate_terrain(size: usize, rng: &mut ChaCha8Rng) -> TerrainGrid {
    let mut terrain = TerrainGrid::new(size, size, 1.0);

    let island_count = size / 8;
    for _ in 0..island_count {
        let x = rng.gen_range(2..size - 4);
        let y = rng.gen_range(2..size - 4);
        let w = rng.gen_range(2..4);
        let h = rng.gen_range(2..4);
        terrain.fill_rect(x, y, w, h, TileKind::Island);
    }

    let cloud_count = size / 6;
    for _ in 0..cloud_count {
        let x = rng.gen_range(1..size - 5);
        let y = rng.gen_range(1..size - 5);
        let w = rng.gen_range(3..6);
        let h = rng.gen_range(2..4);
        terrain.fill_rect(x, y, w, h, TileKind::Cloud);
    }

    for _ in 0..3 {
        let x = rng.gen_range(4..size - 4);
        let y = rng.gen_range(4..size - 4);
        if terrain.get(x, y) == Some(TileKind::Water) {
            terrain.set(x, y, TileKind::Mine);
        }
    }

    terrain
}

fn open_spot(terrain: &TerrainGrid, rng: &mut ChaCha8Rng) -> Vec2 {
    // Rejection-sample an unblocked tile; maps are mostly water so this
    // terminates fast
    loop {
        let x = rng.gen_range(1..terrain.width - 1);
        let y = rng.gen_range(1..terrain.height - 1);
        if let Some(kind) = terrain.get(x, y) {
            if !kind.is_blocked() {
                return terrain.tile_center(x, y);
            }
        }
    }
}

fn populate(world: &mut WorldState, args: &Args, rng: &mut ChaCha8Rng) {
    let friendly = TeamId(1);
    let hostile = TeamId(2);

    let base_pos = open_spot(&world.terrain, rng);
    world.spawn_agent(Agent::new(base_pos, friendly, AgentBehaviorKind::BaseProducer));
    world.add_gold(friendly, 300);

    for i in 0..args.agents {
        let behavior = match i % 3 {
            0 => AgentBehaviorKind::Kamikaze,
            1 => AgentBehaviorKind::Architect,
            _ => AgentBehaviorKind::Harvester,
        };
        let pos = open_spot(&world.terrain, rng);
        world.spawn_agent(Agent::new(pos, friendly, behavior));
    }

    let mut threat_id = 0u32;
    for _ in 0..args.raiders {
        let pos = open_spot(&world.terrain, rng);
        world.spawn_agent(Agent::new(pos, hostile, AgentBehaviorKind::Kamikaze));
        // The host would refresh these as raiders move; here they just
        // mark the spawn area hot
        world.threats.push(
            Threat::new(threat_id, ThreatKind::Raider, pos, 4.0, 5.0).with_team(hostile),
        );
        threat_id += 1;
    }

    for _ in 0..4 {
        let pos = open_spot(&world.terrain, rng);
        world.resources.push(ResourceNode {
            position: pos,
            value: rng.gen_range(50..200),
        });
    }

    for _ in 0..3 {
        let pos = open_spot(&world.terrain, rng);
        world.build_sites.push(BuildSite {
            position: pos,
            occupied: false,
        });
    }

    // One roaming storm to keep the hazard field busy
    let storm_pos = open_spot(&world.terrain, rng);
    world
        .threats
        .push(Threat::new(threat_id, ThreatKind::Storm, storm_pos, 5.0, 7.0));
}
