//! Camera position estimation from bearings to known landmarks
//!
//! Markers on the photograph tie pixel x coordinates to landmarks with known
//! grid positions. The pinhole model turns pixel offsets into angular
//! separations between the marked summits, and a downhill simplex recovers
//! the grid position whose sight lines best reproduce those separations.

use crate::algorithms::simplex::NelderMead;
use crate::core::types::{
    CameraModel, EstimationDiagnostics, EstimationResult, Observation, PlanarCoordinate,
};
use crate::utils::directory::LandmarkDirectory;
use nalgebra::Vector2;
use std::f64::consts::TAU;
use std::fmt;

/// Fewest observations the solver accepts
const MIN_OBSERVATIONS: usize = 2;
/// Observations needed before the solution is fully determined
const WELL_DETERMINED_OBSERVATIONS: usize = 3;

/// Residual above which additional starting points are probed
const RESTART_THRESHOLD: f64 = 1e-12;
/// Number of probe directions around the landmark centroid
const RESTART_DIRECTIONS: usize = 8;
/// Probe ring radius as a multiple of the landmark spread
const RESTART_RADIUS_SCALE: f64 = 2.0;

/// Result type for estimation operations
pub type TriangulationResult<T> = Result<T, EstimationError>;

/// Estimation error types
#[derive(Debug, Clone, PartialEq)]
pub enum EstimationError {
    /// An observation references a key absent from the landmark directory
    UnknownLandmark { key: String },
    /// Two observations share a pixel x coordinate, leaving their angular
    /// offset undefined
    DegenerateObservation { key: String, pixel_x: f64 },
    /// Too few observations to estimate anything
    InsufficientObservations { available: usize, required: usize },
}

impl fmt::Display for EstimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimationError::UnknownLandmark { key } => {
                write!(f, "Observation references unknown landmark '{}'", key)
            }
            EstimationError::DegenerateObservation { key, pixel_x } => {
                write!(
                    f,
                    "Observation '{}' duplicates pixel x = {}, angular offset undefined",
                    key, pixel_x
                )
            }
            EstimationError::InsufficientObservations { available, required } => {
                write!(
                    f,
                    "{} observations supplied, at least {} required",
                    available, required
                )
            }
        }
    }
}

impl std::error::Error for EstimationError {}

/// Bearing-triangulation solver for one photograph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BearingTriangulation {
    /// Capture geometry of the photograph
    pub camera: CameraModel,
    /// Simplex optimizer settings
    pub optimizer: NelderMead,
}

impl BearingTriangulation {
    pub fn new(camera: CameraModel) -> Self {
        Self {
            camera,
            optimizer: NelderMead::default(),
        }
    }

    /// Estimate the camera position from marker observations.
    ///
    /// Observations are processed leftmost-first (sorted by pixel x); angular
    /// separations are measured against the leftmost marker. The solution is
    /// the best objective over the centroid start and, when that start
    /// stalls, a deterministic ring of additional starts around the
    /// centroid, so repeated calls and reordered inputs agree exactly.
    pub fn estimate_position(
        &self,
        observations: &[Observation],
        directory: &LandmarkDirectory,
    ) -> TriangulationResult<EstimationResult> {
        if observations.len() < MIN_OBSERVATIONS {
            return Err(EstimationError::InsufficientObservations {
                available: observations.len(),
                required: MIN_OBSERVATIONS,
            });
        }

        // Resolve every key before any numeric work
        let mut resolved: Vec<(f64, &str, Vector2<f64>)> = Vec::with_capacity(observations.len());
        for obs in observations {
            let landmark = directory.get(&obs.landmark_key).ok_or_else(|| {
                EstimationError::UnknownLandmark {
                    key: obs.landmark_key.clone(),
                }
            })?;
            resolved.push((obs.pixel_x, obs.landmark_key.as_str(), landmark.position.to_vector()));
        }

        resolved.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in resolved.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(EstimationError::DegenerateObservation {
                    key: pair[1].1.to_string(),
                    pixel_x: pair[1].0,
                });
            }
        }

        let landmarks: Vec<Vector2<f64>> = resolved.iter().map(|r| r.2).collect();
        let targets = self.target_bearings(&resolved);
        let centroid = landmarks
            .iter()
            .fold(Vector2::zeros(), |acc, l| acc + l)
            / landmarks.len() as f64;

        let mut best = self
            .optimizer
            .minimize(|p| bearing_objective(p, &landmarks, &targets), centroid);
        if best.value > RESTART_THRESHOLD {
            let spread = landmarks
                .iter()
                .map(|l| (l - centroid).norm())
                .fold(0.0, f64::max);
            let radius = RESTART_RADIUS_SCALE * spread;
            for step in 0..RESTART_DIRECTIONS {
                let angle = step as f64 * TAU / RESTART_DIRECTIONS as f64;
                let start = centroid + radius * Vector2::new(angle.cos(), angle.sin());
                let candidate = self
                    .optimizer
                    .minimize(|p| bearing_objective(p, &landmarks, &targets), start);
                if candidate.value < best.value {
                    best = candidate;
                }
            }
        }

        Ok(EstimationResult {
            position: PlanarCoordinate::from_vector(&best.minimizer),
            diagnostics: EstimationDiagnostics {
                converged: best.converged,
                residual: best.value,
                iterations: best.iterations,
                evaluations: best.evaluations,
                observation_count: resolved.len(),
                under_determined: resolved.len() < WELL_DETERMINED_OBSERVATIONS,
            },
        })
    }

    /// Angular separations the solution must reproduce, one per sorted
    /// observation, measured against the leftmost marker
    fn target_bearings(&self, sorted: &[(f64, &str, Vector2<f64>)]) -> Vec<f64> {
        let leftmost_px = sorted[0].0;
        let reference = self.subtended_angle(0.0);
        sorted
            .iter()
            .map(|(px, _, _)| (self.subtended_angle(px - leftmost_px) - reference).abs())
            .collect()
    }

    /// Half-angle pinhole formula for the angle subtended by a pixel offset
    fn subtended_angle(&self, pixel_offset: f64) -> f64 {
        let mm = self.camera.pixels_to_mm(pixel_offset);
        2.0 * self.camera.focal_length_mm.atan2(mm / 2.0)
    }
}

/// Sum of squared differences between the angular separations seen from
/// `candidate` and the target separations. Pure in all of its inputs; the
/// optimizer drives repeated calls.
fn bearing_objective(candidate: &Vector2<f64>, landmarks: &[Vector2<f64>], targets: &[f64]) -> f64 {
    let first = landmarks[0] - candidate;
    let reference = first.y.atan2(first.x);
    landmarks
        .iter()
        .zip(targets)
        .map(|(landmark, target)| {
            let delta = landmark - candidate;
            let model = (delta.y.atan2(delta.x) - reference).abs();
            (model - target).powi(2)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Landmark;
    use crate::utils::directory::KeyStyle;

    fn directory_of(entries: &[(&str, f64, f64)]) -> LandmarkDirectory {
        let mut directory = LandmarkDirectory::new(KeyStyle::Name);
        for (name, east, north) in entries {
            directory.insert(Landmark::new(*name, 1000.0, PlanarCoordinate::new(*east, *north)));
        }
        directory
    }

    /// Noiseless pixel positions for landmarks seen from `observer`, with the
    /// first entry as the leftmost marker. Inverts the half-angle formula:
    /// a separation b corresponds to a sensor offset of 2 f tan(b / 2).
    fn synthesize_observations(
        camera: &CameraModel,
        observer: (f64, f64),
        landmarks: &[(&str, f64, f64)],
    ) -> Vec<Observation> {
        let angles: Vec<f64> = landmarks
            .iter()
            .map(|(_, east, north)| (north - observer.1).atan2(east - observer.0))
            .collect();
        landmarks
            .iter()
            .zip(&angles)
            .map(|((name, _, _), angle)| {
                let bearing = (angle - angles[0]).abs();
                let mm = 2.0 * camera.focal_length_mm * (bearing / 2.0).tan();
                let px = 100.0 + mm * camera.sensor_width_px / camera.sensor_width_mm;
                Observation::new(*name, px, 50.0)
            })
            .collect()
    }

    #[test]
    fn test_recovers_position_from_equilateral_arrangement() {
        let landmarks = [("A", 0.0, 0.0), ("C", 500.0, 866.0), ("B", 1000.0, 0.0)];
        let directory = directory_of(&landmarks);
        let camera = CameraModel::full_frame(24.0);
        let observations = synthesize_observations(&camera, (500.0, -500.0), &landmarks);

        let solver = BearingTriangulation::new(camera);
        let result = solver.estimate_position(&observations, &directory).unwrap();

        let truth = PlanarCoordinate::new(500.0, -500.0);
        assert!(
            result.position.distance_to(&truth) < 10.0,
            "estimate {} too far from truth",
            result.position
        );
        assert!(result.diagnostics.converged);
        assert!(!result.diagnostics.under_determined);
        assert_eq!(result.diagnostics.observation_count, 3);
        assert!(result.diagnostics.residual < 1e-10);
    }

    #[test]
    fn test_recovers_position_at_grid_scale() {
        // Summits north of the observer, spread over 35 km of the grid
        let landmarks = [
            ("Wildhorn", 695_000.0, 186_000.0),
            ("Schilt", 685_000.0, 178_000.0),
            ("Tierberg", 672_000.0, 190_000.0),
            ("Rottal", 660_000.0, 180_000.0),
        ];
        let directory = directory_of(&landmarks);
        let camera = CameraModel::full_frame(24.0);
        let observations = synthesize_observations(&camera, (676_000.0, 150_000.0), &landmarks);

        let solver = BearingTriangulation::new(camera);
        let result = solver.estimate_position(&observations, &directory).unwrap();

        let truth = PlanarCoordinate::new(676_000.0, 150_000.0);
        assert!(result.position.distance_to(&truth) < 10.0);
        assert!(result.diagnostics.converged);
    }

    #[test]
    fn test_order_independent_after_sorting() {
        let landmarks = [("A", 0.0, 0.0), ("C", 500.0, 866.0), ("B", 1000.0, 0.0)];
        let directory = directory_of(&landmarks);
        let camera = CameraModel::full_frame(24.0);
        let observations = synthesize_observations(&camera, (500.0, -500.0), &landmarks);

        let mut shuffled = observations.clone();
        shuffled.reverse();
        shuffled.swap(0, 1);

        let solver = BearingTriangulation::new(camera);
        let sorted_run = solver.estimate_position(&observations, &directory).unwrap();
        let shuffled_run = solver.estimate_position(&shuffled, &directory).unwrap();
        assert_eq!(sorted_run.position, shuffled_run.position);
        assert_eq!(sorted_run.diagnostics, shuffled_run.diagnostics);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let landmarks = [("A", 0.0, 0.0), ("C", 500.0, 866.0), ("B", 1000.0, 0.0)];
        let directory = directory_of(&landmarks);
        let camera = CameraModel::full_frame(24.0);
        let observations = synthesize_observations(&camera, (500.0, -500.0), &landmarks);

        let solver = BearingTriangulation::new(camera);
        let first = solver.estimate_position(&observations, &directory).unwrap();
        let second = solver.estimate_position(&observations, &directory).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_key_fails_before_optimization() {
        let directory = directory_of(&[("A", 0.0, 0.0), ("B", 1000.0, 0.0)]);
        let observations = vec![
            Observation::new("A", 100.0, 50.0),
            Observation::new("Z", 900.0, 50.0),
        ];
        let solver = BearingTriangulation::new(CameraModel::full_frame(24.0));
        let err = solver.estimate_position(&observations, &directory).unwrap_err();
        assert_eq!(err, EstimationError::UnknownLandmark { key: "Z".to_string() });
    }

    #[test]
    fn test_duplicate_pixel_is_degenerate() {
        let directory = directory_of(&[("A", 0.0, 0.0), ("B", 1000.0, 0.0), ("C", 500.0, 866.0)]);
        let observations = vec![
            Observation::new("A", 100.0, 50.0),
            Observation::new("B", 700.0, 40.0),
            Observation::new("C", 700.0, 60.0),
        ];
        let solver = BearingTriangulation::new(CameraModel::full_frame(24.0));
        let err = solver.estimate_position(&observations, &directory).unwrap_err();
        assert_eq!(
            err,
            EstimationError::DegenerateObservation { key: "C".to_string(), pixel_x: 700.0 }
        );
    }

    #[test]
    fn test_rejects_single_observation() {
        let directory = directory_of(&[("A", 0.0, 0.0)]);
        let observations = vec![Observation::new("A", 100.0, 50.0)];
        let solver = BearingTriangulation::new(CameraModel::full_frame(24.0));
        let err = solver.estimate_position(&observations, &directory).unwrap_err();
        assert_eq!(
            err,
            EstimationError::InsufficientObservations { available: 1, required: 2 }
        );
    }

    #[test]
    fn test_two_observations_flagged_under_determined() {
        let landmarks = [("A", 0.0, 0.0), ("B", 1000.0, 0.0)];
        let directory = directory_of(&landmarks);
        let camera = CameraModel::full_frame(24.0);
        let observations = synthesize_observations(&camera, (500.0, -500.0), &landmarks);

        let solver = BearingTriangulation::new(camera);
        let result = solver.estimate_position(&observations, &directory).unwrap();
        // A single angular separation constrains a locus, not a point; the
        // returned position is some point on it
        assert!(result.diagnostics.under_determined);
        assert!(result.diagnostics.residual < 1e-6);
    }

    #[test]
    fn test_coincident_landmarks_surface_large_residual() {
        let directory = directory_of(&[
            ("A", 650_000.0, 180_000.0),
            ("B", 650_000.0, 180_000.0),
            ("C", 650_000.0, 180_000.0),
        ]);
        let observations = vec![
            Observation::new("A", 100.0, 50.0),
            Observation::new("B", 2_000.0, 50.0),
            Observation::new("C", 4_000.0, 50.0),
        ];
        let solver = BearingTriangulation::new(CameraModel::full_frame(24.0));
        let result = solver.estimate_position(&observations, &directory).unwrap();
        assert!(result.position.east.is_finite() && result.position.north.is_finite());
        assert!(result.diagnostics.residual > 1e-3);
    }
}
