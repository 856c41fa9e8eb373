//! Core data types for the triangulation system

use crate::core::constants::{FULL_FRAME_SENSOR_WIDTH_MM, FULL_FRAME_SENSOR_WIDTH_PX};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position on the CH1903/LV03 military grid (meters east/north of the false origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarCoordinate {
    pub east: f64,
    pub north: f64,
}

impl PlanarCoordinate {
    pub fn new(east: f64, north: f64) -> Self {
        Self { east, north }
    }

    pub(crate) fn from_vector(v: &Vector2<f64>) -> Self {
        Self { east: v.x, north: v.y }
    }

    pub(crate) fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.east, self.north)
    }

    /// Euclidean grid distance to another position (meters)
    pub fn distance_to(&self, other: &Self) -> f64 {
        let de = self.east - other.east;
        let dn = self.north - other.north;
        (de * de + dn * dn).sqrt()
    }

    /// Magnetic azimuth towards a target position (degrees).
    ///
    /// The magnetic declination is place and time dependent and must be
    /// supplied by the caller; see
    /// [`DEFAULT_MAGNETIC_DECLINATION_DEG`](crate::core::constants::DEFAULT_MAGNETIC_DECLINATION_DEG)
    /// for a value usable over Switzerland.
    pub fn azimuth_to(&self, target: &Self, magnetic_declination_deg: f64) -> f64 {
        let de = self.east - target.east;
        let dn = self.north - target.north;
        magnetic_declination_deg + dn.atan2(de).to_degrees()
    }
}

impl fmt::Display for PlanarCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.east, self.north)
    }
}

/// Position on the WGS84 ellipsoid in decimal degrees, with optional
/// ellipsoidal height (meters)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub height: Option<f64>,
}

impl GeodeticCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, height: None }
    }

    pub fn with_height(latitude: f64, longitude: f64, height: f64) -> Self {
        Self { latitude, longitude, height: Some(height) }
    }
}

/// A named summit with its grid position and summit elevation (meters)
#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    pub name: String,
    pub height: f64,
    pub position: PlanarCoordinate,
}

impl Landmark {
    pub fn new(name: impl Into<String>, height: f64, position: PlanarCoordinate) -> Self {
        Self { name: name.into(), height, position }
    }

    /// Directory key of the form `"<name> <height>m"`
    pub fn labeled_key(&self) -> String {
        format!("{} {}m", self.name, self.height)
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}m @{}", self.name, self.height, self.position)
    }
}

/// A marker placed on the photograph, tying an image x coordinate to a
/// landmark key. The y coordinate is part of the persisted marker shape but
/// plays no role in estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "Key")]
    pub landmark_key: String,
    #[serde(rename = "X")]
    pub pixel_x: f64,
    #[serde(rename = "Y")]
    pub pixel_y: f64,
}

impl Observation {
    pub fn new(landmark_key: impl Into<String>, pixel_x: f64, pixel_y: f64) -> Self {
        Self { landmark_key: landmark_key.into(), pixel_x, pixel_y }
    }
}

/// Capture geometry of one photograph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraModel {
    /// Focal length (mm)
    pub focal_length_mm: f64,
    /// Physical sensor width (mm)
    pub sensor_width_mm: f64,
    /// Sensor width (pixels)
    pub sensor_width_px: f64,
}

impl CameraModel {
    pub fn new(focal_length_mm: f64, sensor_width_mm: f64, sensor_width_px: f64) -> Self {
        Self { focal_length_mm, sensor_width_mm, sensor_width_px }
    }

    /// Camera model for a full-frame body at the given focal length
    pub fn full_frame(focal_length_mm: f64) -> Self {
        Self {
            focal_length_mm,
            sensor_width_mm: FULL_FRAME_SENSOR_WIDTH_MM,
            sensor_width_px: FULL_FRAME_SENSOR_WIDTH_PX,
        }
    }

    /// Sensor-plane offset (mm) corresponding to a pixel offset
    pub fn pixels_to_mm(&self, pixels: f64) -> f64 {
        self.sensor_width_mm * pixels / self.sensor_width_px
    }
}

/// Estimated camera position with solver diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationResult {
    /// Recovered camera position on the grid
    pub position: PlanarCoordinate,
    /// Solver diagnostics for this estimate
    pub diagnostics: EstimationDiagnostics,
}

/// Diagnostics reported alongside an estimated position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimationDiagnostics {
    /// Whether the optimizer met its tolerances before hitting its caps
    pub converged: bool,
    /// Final sum-of-squared bearing residuals (radians squared)
    pub residual: f64,
    /// Optimizer iterations spent
    pub iterations: usize,
    /// Objective evaluations spent
    pub evaluations: usize,
    /// Number of observations used
    pub observation_count: usize,
    /// True when fewer than three observations constrain the solution
    pub under_determined: bool,
}
