// Application layer - Widget state and the host loop that drives it
pub mod driver;
pub mod graph;
pub mod registry;
pub mod sample_source;
