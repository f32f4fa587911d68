// Domain layer - Chart data model and pure geometry
pub mod axis;
pub mod error;
pub mod interaction;
pub mod sample;
pub mod viewport;
