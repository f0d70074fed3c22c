pub mod controller;
pub mod flocking;
pub mod target;

pub use controller::{MotionCommand, SteeringController};
pub use target::TargetLock;
