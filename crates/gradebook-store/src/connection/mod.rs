//! Connection manager: pending queue, flushes and the result buffer

mod manager;
pub mod params;

pub use manager::{ConnectionManager, FlushMode};
