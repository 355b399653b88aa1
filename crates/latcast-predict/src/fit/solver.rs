//! Normal-equation least squares solved by fixed-budget Gauss-Seidel iteration.
//!
//! `XᵀX` is symmetric positive semi-definite, so the sweeps move toward the
//! least-squares solution, but there is no convergence check: after
//! `max_iterations` sweeps the current estimate is returned as-is. Badly
//! conditioned systems (collinear or large-magnitude token features) can stop
//! well short of the exact solution.

use super::{FeatureBasis, Surface};
use latcast_core::config::SolverConfig;

/// Fixed-iteration Gauss-Seidel solver for `A·x = b`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussSeidel {
    pub max_iterations: usize,
    pub pivot_epsilon: f64,
}

impl GaussSeidel {
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            pivot_epsilon: config.pivot_epsilon,
        }
    }

    /// Solve starting from zero; rows with a near-zero diagonal keep their value
    pub fn solve(&self, a: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
        let n = b.len();
        let mut x = vec![0.0; n];

        for _ in 0..self.max_iterations {
            for i in 0..n {
                let diagonal = a[i][i];
                if diagonal.abs() < self.pivot_epsilon {
                    continue;
                }
                let off_diagonal: f64 = (0..n)
                    .filter(|&j| j != i)
                    .map(|j| a[i][j] * x[j])
                    .sum();
                x[i] = (b[i] - off_diagonal) / diagonal;
            }
        }

        x
    }
}

impl Default for GaussSeidel {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

/// Expanded design matrix with its Gram matrix `XᵀX`.
///
/// The Gram matrix depends only on the points, so it is built once and reused
/// for every statistic fitted over the same observations.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    basis: FeatureBasis,
    rows: Vec<Vec<f64>>,
    gram: Vec<Vec<f64>>,
}

impl DesignMatrix {
    pub fn new(basis: FeatureBasis, points: &[[f64; 3]]) -> Self {
        let width = basis.width();
        let rows: Vec<Vec<f64>> = points.iter().map(|p| basis.expand(p)).collect();

        let mut gram = vec![vec![0.0; width]; width];
        for row in &rows {
            for i in 0..width {
                for j in 0..width {
                    gram[i][j] += row[i] * row[j];
                }
            }
        }

        Self { basis, rows, gram }
    }

    /// `Xᵀy` for one response column
    fn moment(&self, ys: &[f64]) -> Vec<f64> {
        let mut xty = vec![0.0; self.basis.width()];
        for (row, y) in self.rows.iter().zip(ys) {
            for (acc, feature) in xty.iter_mut().zip(row) {
                *acc += feature * y;
            }
        }
        xty
    }

    /// Fit `ys` against the expanded features
    pub fn fit(&self, ys: &[f64], solver: &GaussSeidel) -> Surface {
        let coefficients = solver.solve(&self.gram, &self.moment(ys));
        Surface::Basis {
            basis: self.basis,
            coefficients,
        }
    }
}
