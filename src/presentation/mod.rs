//! View models rendered by the HTTP layer.

pub mod views;
