//! Stormwake - RTS agent intelligence core
//!
//! Sense -> decide -> plan -> act pipeline for non-player units and bases:
//! a decaying hazard field, hazard-weighted pathfinding over a sub-tile
//! cost grid, boid-style steering, and a throttled adversarial planner.

pub mod core;
pub mod hazard;
pub mod nav;
pub mod simulation;
pub mod steering;
pub mod strategy;
pub mod world;
