pub mod actions;
pub mod minimax;
pub mod snapshot;
pub mod value_table;

pub use actions::StrategicAction;
pub use minimax::StrategicPlanner;
pub use snapshot::GameStateSnapshot;
pub use value_table::{BaseProducer, ProductionAction, ValueTable};
