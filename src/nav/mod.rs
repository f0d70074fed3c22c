pub mod grid;
pub mod path;
pub mod pathfinding;

pub use grid::NavigationGrid;
pub use path::Path;
pub use pathfinding::find_path;
