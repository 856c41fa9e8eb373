//! Derivative-free Nelder-Mead minimization over the grid plane
//!
//! The bearing objective is cheap to evaluate but not smooth at degenerate
//! geometries, so the solver uses a downhill simplex rather than anything
//! gradient-based. Iteration and evaluation caps are generous safety limits,
//! not deadlines; the simplex converges slowly near-degenerate
//! configurations.

use nalgebra::Vector2;

/// Reflection coefficient of the simplex step
const REFLECTION: f64 = 1.0;
/// Expansion coefficient of the simplex step
const EXPANSION: f64 = 2.0;
/// Contraction coefficient of the simplex step
const CONTRACTION: f64 = 0.5;
/// Shrink factor applied when a contraction fails
const SHRINK: f64 = 0.5;

/// Relative perturbation used to seed the initial simplex
const INITIAL_STEP_SCALE: f64 = 0.05;
/// Absolute perturbation used where a start coordinate is zero
const INITIAL_STEP_ZERO: f64 = 0.00025;

/// Downhill simplex minimizer for two-parameter objectives
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMead {
    /// Convergence tolerance on the objective spread across the simplex
    pub function_tolerance: f64,
    /// Convergence tolerance on the vertex spread of the simplex
    pub parameter_tolerance: f64,
    /// Maximum number of simplex iterations
    pub max_iterations: usize,
    /// Maximum number of objective evaluations
    pub max_evaluations: usize,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            function_tolerance: 1e-8,
            parameter_tolerance: 1e-8,
            max_iterations: 1_000_000,
            max_evaluations: 1_000_000,
        }
    }
}

/// Outcome of one minimization run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexResult {
    /// Best vertex found
    pub minimizer: Vector2<f64>,
    /// Objective value at the best vertex
    pub value: f64,
    /// Iterations spent
    pub iterations: usize,
    /// Objective evaluations spent
    pub evaluations: usize,
    /// Whether both tolerances were met before a cap was hit
    pub converged: bool,
}

impl NelderMead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimize `objective` starting from `start`.
    pub fn minimize<F>(&self, mut objective: F, start: Vector2<f64>) -> SimplexResult
    where
        F: FnMut(&Vector2<f64>) -> f64,
    {
        let mut vertices = [start; 3];
        for axis in 0..2 {
            if vertices[axis + 1][axis] != 0.0 {
                vertices[axis + 1][axis] *= 1.0 + INITIAL_STEP_SCALE;
            } else {
                vertices[axis + 1][axis] = INITIAL_STEP_ZERO;
            }
        }
        let mut values = [
            objective(&vertices[0]),
            objective(&vertices[1]),
            objective(&vertices[2]),
        ];
        let mut evaluations = 3usize;
        let mut iterations = 0usize;
        let mut converged = false;

        while iterations < self.max_iterations && evaluations < self.max_evaluations {
            // Order the simplex best-first
            let mut order = [0usize, 1, 2];
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            vertices = [vertices[order[0]], vertices[order[1]], vertices[order[2]]];
            values = [values[order[0]], values[order[1]], values[order[2]]];

            let value_spread = (values[2] - values[0]).abs();
            let vertex_spread = (vertices[1] - vertices[0])
                .amax()
                .max((vertices[2] - vertices[0]).amax());
            if value_spread <= self.function_tolerance
                && vertex_spread <= self.parameter_tolerance
            {
                converged = true;
                break;
            }
            iterations += 1;

            // Centroid of all vertices but the worst
            let centroid = (vertices[0] + vertices[1]) / 2.0;

            let reflected = centroid + REFLECTION * (centroid - vertices[2]);
            let reflected_value = objective(&reflected);
            evaluations += 1;

            if reflected_value < values[0] {
                let expanded = centroid + EXPANSION * (centroid - vertices[2]);
                let expanded_value = objective(&expanded);
                evaluations += 1;
                if expanded_value < reflected_value {
                    vertices[2] = expanded;
                    values[2] = expanded_value;
                } else {
                    vertices[2] = reflected;
                    values[2] = reflected_value;
                }
            } else if reflected_value < values[1] {
                vertices[2] = reflected;
                values[2] = reflected_value;
            } else {
                // Contract towards the better of the worst vertex and the
                // reflected point; shrink the whole simplex if that fails
                let (base, base_value) = if reflected_value < values[2] {
                    (reflected, reflected_value)
                } else {
                    (vertices[2], values[2])
                };
                let contracted = centroid + CONTRACTION * (base - centroid);
                let contracted_value = objective(&contracted);
                evaluations += 1;
                if contracted_value < base_value {
                    vertices[2] = contracted;
                    values[2] = contracted_value;
                } else {
                    for i in 1..3 {
                        vertices[i] = vertices[0] + SHRINK * (vertices[i] - vertices[0]);
                        values[i] = objective(&vertices[i]);
                    }
                    evaluations += 2;
                }
            }
        }

        let mut best = 0;
        for i in 1..3 {
            if values[i] < values[best] {
                best = i;
            }
        }
        SimplexResult {
            minimizer: vertices[best],
            value: values[best],
            iterations,
            evaluations,
            converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimizes_shifted_quadratic() {
        let solver = NelderMead::new();
        let result = solver.minimize(
            |p| (p.x - 3.0).powi(2) + (p.y + 1.0).powi(2),
            Vector2::new(0.0, 0.0),
        );
        assert!(result.converged);
        assert!((result.minimizer.x - 3.0).abs() < 1e-6);
        assert!((result.minimizer.y + 1.0).abs() < 1e-6);
        assert!(result.value < 1e-12);
        assert!(result.evaluations >= result.iterations);
    }

    #[test]
    fn test_minimizes_rosenbrock() {
        let solver = NelderMead::new();
        let result = solver.minimize(
            |p| 100.0 * (p.y - p.x * p.x).powi(2) + (1.0 - p.x).powi(2),
            Vector2::new(-1.2, 1.0),
        );
        assert!(result.converged);
        assert!((result.minimizer.x - 1.0).abs() < 1e-4);
        assert!((result.minimizer.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_reports_cap_exhaustion() {
        let solver = NelderMead {
            max_iterations: 5,
            ..NelderMead::default()
        };
        let result = solver.minimize(
            |p| (p.x - 3.0).powi(2) + (p.y + 1.0).powi(2),
            Vector2::new(0.0, 0.0),
        );
        assert!(!result.converged);
        assert_eq!(result.iterations, 5);
    }

    #[test]
    fn test_deterministic_runs() {
        let solver = NelderMead::new();
        let objective = |p: &Vector2<f64>| (p.x * p.x - p.y).powi(2) + p.x.sin().powi(2);
        let first = solver.minimize(objective, Vector2::new(0.7, 0.3));
        let second = solver.minimize(objective, Vector2::new(0.7, 0.3));
        assert_eq!(first, second);
    }
}
