pub mod field;

pub use field::HazardField;
