//! CLI command implementations

pub mod check;
pub mod detect;
pub mod render;

mod inputs;
