//! Configuration loading and management.

mod loader;
mod plan;
mod schema;

pub use loader::*;
pub use plan::*;
pub use schema::*;
