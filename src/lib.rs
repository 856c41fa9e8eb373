//! Photo Position Triangulation
//!
//! Estimates where a photograph was taken from markers tying image pixels to
//! mountains with known positions on the Swiss CH1903 grid, and converts the
//! estimate between the grid and WGS84.

pub mod core;
pub mod algorithms;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    CameraModel, EstimationDiagnostics, EstimationResult, GeodeticCoordinate, Landmark,
    Observation, PlanarCoordinate, DEFAULT_MAGNETIC_DECLINATION_DEG,
};
pub use crate::algorithms::projection;
pub use crate::algorithms::simplex::{NelderMead, SimplexResult};
pub use crate::algorithms::triangulation::{
    BearingTriangulation, EstimationError, TriangulationResult,
};
pub use crate::utils::directory::{
    DirectoryError, DirectoryResult, KeyStyle, LandmarkDirectory, LandmarkRecord,
};
