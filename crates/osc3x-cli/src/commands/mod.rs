//! CLI command implementations.

pub mod batch;
pub mod common;
pub mod devices;
pub mod events;
pub mod preset;
pub mod render;
