//! Read-through caching of entities fetched over the network

mod entity;
mod source;

pub use entity::EntityCache;
pub use source::{Entity, EntitySource};
