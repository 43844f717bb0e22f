//! Adapters that connect the flows to the outside world.

pub mod json;
