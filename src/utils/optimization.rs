//! Derivative-free minimisation used for conditional sum of squares fits.
//!
//! Objective values that are NaN are treated as `+inf`, so a parameter
//! vector for which the residual recursion diverges is simply never
//! preferred over a finite one.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// The optimal point found.
    pub optimal_point: Vec<f64>,
    /// The objective function value at the optimal point.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged before the iteration limit.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on both objective spread and simplex size.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrinkage coefficient.
    pub sigma: f64,
    /// Initial simplex step, absolute for zero coordinates and relative otherwise.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

impl NelderMeadConfig {
    /// Set the iteration limit.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the initial simplex step.
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }
}

/// Simplex vertices with their objective values, kept sorted best-first.
struct Simplex<'a> {
    vertices: Vec<Vec<f64>>,
    values: Vec<f64>,
    bounds: Option<&'a [(f64, f64)]>,
}

impl<'a> Simplex<'a> {
    fn new<F>(objective: &F, initial: &[f64], bounds: Option<&'a [(f64, f64)]>, step: f64) -> Self
    where
        F: Fn(&[f64]) -> f64,
    {
        let start = clamp_to_bounds(initial, bounds);
        let mut vertices = Vec::with_capacity(start.len() + 1);
        vertices.push(start.clone());
        for i in 0..start.len() {
            let mut vertex = start.clone();
            vertex[i] += if start[i].abs() > 1e-10 {
                step * start[i].abs()
            } else {
                step
            };
            vertices.push(clamp_to_bounds(&vertex, bounds));
        }

        let values = vertices.iter().map(|v| evaluate(objective, v)).collect();
        let mut simplex = Self {
            vertices,
            values,
            bounds,
        };
        simplex.sort();
        simplex
    }

    fn dim(&self) -> usize {
        self.vertices.len() - 1
    }

    fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| {
            self.values[a]
                .partial_cmp(&self.values[b])
                .unwrap_or(Ordering::Equal)
        });
        self.vertices = order.iter().map(|&i| self.vertices[i].clone()).collect();
        self.values = order.iter().map(|&i| self.values[i]).collect();
    }

    fn best_value(&self) -> f64 {
        self.values[0]
    }

    fn worst_value(&self) -> f64 {
        self.values[self.dim()]
    }

    fn second_worst_value(&self) -> f64 {
        self.values[self.dim() - 1]
    }

    /// Centroid of every vertex except the worst.
    fn centroid(&self) -> Vec<f64> {
        let n = self.dim();
        let mut centroid = vec![0.0; n];
        for vertex in &self.vertices[..n] {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x;
            }
        }
        centroid.iter_mut().for_each(|c| *c /= n as f64);
        centroid
    }

    fn diameter(&self, centroid: &[f64]) -> f64 {
        self.vertices
            .iter()
            .map(|v| euclidean_distance(v, centroid))
            .fold(0.0, f64::max)
    }

    /// Point `centroid + coef * (towards - centroid)`, clamped to bounds.
    fn along(&self, centroid: &[f64], towards: &[f64], coef: f64) -> Vec<f64> {
        let point: Vec<f64> = centroid
            .iter()
            .zip(towards)
            .map(|(c, t)| c + coef * (t - c))
            .collect();
        clamp_to_bounds(&point, self.bounds)
    }

    fn replace_worst(&mut self, vertex: Vec<f64>, value: f64) {
        let n = self.dim();
        self.vertices[n] = vertex;
        self.values[n] = value;
    }

    fn shrink<F>(&mut self, objective: &F, sigma: f64)
    where
        F: Fn(&[f64]) -> f64,
    {
        let best = self.vertices[0].clone();
        for i in 1..self.vertices.len() {
            let shrunk: Vec<f64> = best
                .iter()
                .zip(&self.vertices[i])
                .map(|(b, x)| b + sigma * (x - b))
                .collect();
            self.vertices[i] = clamp_to_bounds(&shrunk, self.bounds);
            self.values[i] = evaluate(objective, &self.vertices[i]);
        }
    }
}

/// Perform Nelder-Mead simplex optimization.
///
/// # Arguments
/// * `objective` - The objective function to minimize
/// * `initial` - Initial guess for the optimal point
/// * `bounds` - Optional bounds for each dimension as (min, max) pairs
/// * `config` - Configuration parameters
///
/// # Returns
/// `NelderMeadResult` containing the optimal point and convergence information.
///
/// # Example
/// ```
/// use realty_forecast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// // Minimize (x-2)^2 + (y-3)^2
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     NelderMeadConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 0.01);
/// assert!((result.optimal_point[1] - 3.0).abs() < 0.01);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    if initial.is_empty() {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let mut simplex = Simplex::new(&objective, initial, bounds, config.initial_step);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let spread = simplex.worst_value() - simplex.best_value();
        let centroid = simplex.centroid();
        if spread < config.tolerance && simplex.diameter(&centroid) < config.tolerance {
            converged = true;
            break;
        }

        let worst = simplex.vertices[simplex.dim()].clone();
        let reflected = simplex.along(&centroid, &worst, -config.alpha);
        let reflected_value = evaluate(&objective, &reflected);

        if reflected_value < simplex.best_value() {
            let expanded = simplex.along(&centroid, &reflected, config.gamma);
            let expanded_value = evaluate(&objective, &expanded);
            if expanded_value < reflected_value {
                simplex.replace_worst(expanded, expanded_value);
            } else {
                simplex.replace_worst(reflected, reflected_value);
            }
        } else if reflected_value < simplex.second_worst_value() {
            simplex.replace_worst(reflected, reflected_value);
        } else {
            let outside = reflected_value < simplex.worst_value();
            let target = if outside { &reflected } else { &worst };
            let contracted = simplex.along(&centroid, target, config.rho);
            let contracted_value = evaluate(&objective, &contracted);
            let threshold = if outside {
                reflected_value
            } else {
                simplex.worst_value()
            };

            if contracted_value < threshold || (outside && contracted_value == threshold) {
                simplex.replace_worst(contracted, contracted_value);
            } else {
                simplex.shrink(&objective, config.sigma);
            }
        }

        simplex.sort();
    }

    NelderMeadResult {
        optimal_point: simplex.vertices[0].clone(),
        optimal_value: simplex.values[0],
        iterations,
        converged,
    }
}

fn evaluate<F>(objective: &F, point: &[f64]) -> f64
where
    F: Fn(&[f64]) -> f64,
{
    let value = objective(point);
    if value.is_nan() {
        f64::INFINITY
    } else {
        value
    }
}

fn clamp_to_bounds(point: &[f64], bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    match bounds {
        None => point.to_vec(),
        Some(b) => point
            .iter()
            .enumerate()
            .map(|(i, &x)| match b.get(i) {
                Some(&(lo, hi)) => x.clamp(lo, hi),
                None => x,
            })
            .collect(),
    }
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn nelder_mead_quadratic_2d() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
            &[0.0, 0.0],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point[1], 3.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_value, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn nelder_mead_rosenbrock() {
        let config = NelderMeadConfig::default()
            .with_max_iter(5000)
            .with_tolerance(1e-12);

        let result = nelder_mead(
            |x| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0].powi(2)).powi(2),
            &[0.0, 0.0],
            None,
            config,
        );

        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-2);
        assert_relative_eq!(result.optimal_point[1], 1.0, epsilon = 1e-2);
    }

    #[test]
    fn nelder_mead_with_bounds() {
        // Unconstrained minimum at 5 lies outside [0, 3]
        let result = nelder_mead(
            |x| (x[0] - 5.0).powi(2),
            &[1.0],
            Some(&[(0.0, 3.0)]),
            NelderMeadConfig::default(),
        );

        assert_relative_eq!(result.optimal_point[0], 3.0, epsilon = 1e-4);
    }

    #[test]
    fn nelder_mead_ar1_conditional_sum_of_squares() {
        // x_t = 0.6 x_{t-1} + e_t with a fixed shock sequence
        let shocks = [0.5, -0.3, 0.8, -0.1, 0.2, -0.6, 0.4, 0.1, -0.2, 0.3, -0.4, 0.6];
        let mut x = vec![1.0];
        for e in shocks {
            let prev = x[x.len() - 1];
            x.push(0.6 * prev + e);
        }

        let css = |params: &[f64]| {
            x.windows(2)
                .map(|w| (w[1] - params[0] * w[0]).powi(2))
                .sum::<f64>()
        };

        // Least squares solution in closed form
        let num: f64 = x.windows(2).map(|w| w[0] * w[1]).sum();
        let den: f64 = x[..x.len() - 1].iter().map(|v| v * v).sum();

        let result = nelder_mead(css, &[0.1], None, NelderMeadConfig::default());
        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], num / den, epsilon = 1e-3);
    }

    #[test]
    fn nelder_mead_ignores_nan_region() {
        // Objective undefined for x < 0
        let result = nelder_mead(
            |x| {
                if x[0] < 0.0 {
                    f64::NAN
                } else {
                    (x[0] - 0.5).powi(2)
                }
            },
            &[2.0],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.optimal_value.is_finite());
        assert_relative_eq!(result.optimal_point[0], 0.5, epsilon = 1e-3);
    }

    #[test]
    fn nelder_mead_does_not_stop_on_level_bracket() {
        // Both starting vertices have f = 0.01 on either side of the minimum
        let config = NelderMeadConfig::default().with_initial_step(0.5);
        let result = nelder_mead(|x| (x[0] - 0.5).powi(2), &[0.4], None, config);

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 0.5, epsilon = 1e-4);
        assert!(result.optimal_value < 1e-8);
    }

    #[test]
    fn nelder_mead_quadratic_1d() {
        let result = nelder_mead(
            |x| (x[0] - 0.5).powi(2),
            &[2.0],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 0.5, epsilon = 1e-4);
    }

    #[test]
    fn nelder_mead_respects_iteration_limit() {
        let config = NelderMeadConfig::default().with_max_iter(3);
        let result = nelder_mead(
            |x| x[0].powi(2) + x[1].powi(2),
            &[10.0, -10.0],
            None,
            config,
        );

        assert_eq!(result.iterations, 3);
        assert!(!result.converged);
    }

    #[test]
    fn nelder_mead_empty_initial() {
        let result = nelder_mead(|_| 0.0, &[], None, NelderMeadConfig::default());

        assert!(!result.converged);
        assert!(result.optimal_value.is_nan());
    }

    #[test]
    fn nelder_mead_3d() {
        let result = nelder_mead(
            |x| x[0].powi(2) + x[1].powi(2) + x[2].powi(2),
            &[1.0, 2.0, 3.0],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.converged);
        for v in &result.optimal_point {
            assert_relative_eq!(*v, 0.0, epsilon = 1e-3);
        }
    }
}
