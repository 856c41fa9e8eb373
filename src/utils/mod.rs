//! Shared utilities for the triangulation system

pub mod directory;

pub use directory::*;
