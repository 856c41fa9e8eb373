//! Core types and constants for the photo triangulation system

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
