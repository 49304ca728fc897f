//! REST client for the chess stats backend

mod client;
mod types;

pub use client::{ApiClient, DEFAULT_API_BASE, DEFAULT_TIMEOUT};
pub use types::*;
