//! Statement building
//!
//! Pure functions from an entity type (or instance) plus keyword conditions
//! to a [`Statement`](crate::statement::Statement). Nothing here touches the
//! storage engine.

pub mod arguments;
pub mod builder;
pub mod ident;

pub use arguments::{Argument, Kwargs, EXECUTION};
pub use builder::{
    build_create, build_delete, build_fetch_all, build_fetch_filtered, build_fetch_one,
    build_save,
};
pub use ident::{qualified, quote_ident};
