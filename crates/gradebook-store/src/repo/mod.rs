//! Repository layer: typed entity access over the connection manager

pub mod entity_manager;

pub use entity_manager::{EntityManager, Outcome};
