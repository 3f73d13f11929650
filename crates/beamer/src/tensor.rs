//! Backend-agnostic helpers for moving batch rows around.

pub mod constant;
pub mod operations;
