//! Bounded local minimization.
//!
//! The outer search over lifetimes is delegated to a pluggable bounded
//! minimizer so that different local methods can be swapped in without
//! touching the decay model or the linear solver. The crate ships a
//! derivative-free Nelder–Mead simplex with box constraints enforced by
//! clipping candidate points into the feasible region.
//!
//! Contract notes:
//! - malformed bounds or an out-of-bounds initial guess are rejected before
//!   the objective is ever called
//! - objective errors abort the minimization and propagate
//! - exhausting the iteration budget is *not* an error: the best-found point
//!   is returned together with a [`ConvergenceWarning`]

use rayon::prelude::*;

use crate::domain::ConvergenceWarning;
use crate::error::FitError;

/// A scalar objective over a parameter vector.
///
/// Implementations must be pure: evaluations are independent and may be run
/// in parallel by a minimizer.
pub trait Objective: Sync {
    fn evaluate(&self, x: &[f64]) -> Result<f64, FitError>;
}

/// Result of a bounded minimization.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Best parameter vector found.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub value: f64,
    /// Total objective evaluations performed.
    pub evaluations: usize,
    /// Set when the iteration budget ran out before tolerance was met.
    pub warning: Option<ConvergenceWarning>,
}

/// A bounded local minimizer.
pub trait BoundedMinimizer {
    /// Minimize `f` starting from `x0` subject to per-parameter
    /// `(lower, upper)` bounds. Local optimality only.
    fn minimize(
        &self,
        f: &dyn Objective,
        x0: &[f64],
        bounds: &[(f64, f64)],
    ) -> Result<Minimum, FitError>;
}

/// Nelder–Mead simplex with box constraints.
///
/// Candidate points that leave the box are clipped onto it, which keeps the
/// simplex feasible at all times. Deterministic: the initial simplex is built
/// by perturbing one coordinate at a time (5% relative, small absolute step
/// for zero coordinates).
#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Iteration budget. One iteration is one reflect/expand/contract/shrink
    /// cycle.
    pub max_iters: usize,
    /// Convergence threshold on the objective spread across the simplex.
    pub f_tol: f64,
    /// Convergence threshold on the simplex extent (inf-norm around the best
    /// vertex).
    pub x_tol: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iters: 2000,
            f_tol: 1e-12,
            x_tol: 1e-10,
        }
    }
}

// Standard simplex coefficients: reflection, expansion, contraction, shrink.
const RHO: f64 = 1.0;
const CHI: f64 = 2.0;
const GAMMA: f64 = 0.5;
const SIGMA: f64 = 0.5;

impl BoundedMinimizer for NelderMead {
    fn minimize(
        &self,
        f: &dyn Objective,
        x0: &[f64],
        bounds: &[(f64, f64)],
    ) -> Result<Minimum, FitError> {
        validate_bounds(x0, bounds)?;
        let n = x0.len();

        let mut simplex = initial_simplex(x0, bounds);
        let mut evaluations = simplex.len();
        // The vertices are independent points of a pure objective, so the
        // initial sweep may run in parallel.
        let mut values: Vec<f64> = simplex
            .par_iter()
            .map(|x| f.evaluate(x))
            .collect::<Result<_, _>>()?;

        let mut converged = false;
        let mut iterations = 0;
        for _ in 0..self.max_iters {
            iterations += 1;
            sort_simplex(&mut simplex, &mut values);

            if self.has_converged(&simplex, &values) {
                converged = true;
                break;
            }

            // Centroid of all vertices except the worst.
            let mut centroid = vec![0.0; n];
            for x in &simplex[..n] {
                for (c, &xi) in centroid.iter_mut().zip(x) {
                    *c += xi;
                }
            }
            for c in &mut centroid {
                *c /= n as f64;
            }

            let worst = simplex[n].clone();
            let f_worst = values[n];
            let f_best = values[0];
            let f_second_worst = values[n - 1];

            let reflected = step(&centroid, &worst, RHO, bounds);
            let f_reflected = f.evaluate(&reflected)?;
            evaluations += 1;

            if f_reflected < f_best {
                let expanded = step(&centroid, &worst, RHO * CHI, bounds);
                let f_expanded = f.evaluate(&expanded)?;
                evaluations += 1;
                if f_expanded < f_reflected {
                    simplex[n] = expanded;
                    values[n] = f_expanded;
                } else {
                    simplex[n] = reflected;
                    values[n] = f_reflected;
                }
            } else if f_reflected < f_second_worst {
                simplex[n] = reflected;
                values[n] = f_reflected;
            } else {
                // Contract towards the better of worst/reflected; shrink the
                // whole simplex if even that fails to improve.
                let (contracted, threshold) = if f_reflected < f_worst {
                    (step(&centroid, &worst, RHO * GAMMA, bounds), f_reflected)
                } else {
                    (step(&centroid, &worst, -GAMMA, bounds), f_worst)
                };
                let f_contracted = f.evaluate(&contracted)?;
                evaluations += 1;

                if f_contracted <= threshold {
                    simplex[n] = contracted;
                    values[n] = f_contracted;
                } else {
                    let best = simplex[0].clone();
                    for x in simplex.iter_mut().skip(1) {
                        for (xi, &bi) in x.iter_mut().zip(&best) {
                            *xi = bi + SIGMA * (*xi - bi);
                        }
                        clip(x, bounds);
                    }
                    let shrunk: Vec<f64> = simplex[1..]
                        .par_iter()
                        .map(|x| f.evaluate(x))
                        .collect::<Result<_, _>>()?;
                    evaluations += shrunk.len();
                    values[1..].copy_from_slice(&shrunk);
                }
            }
        }

        sort_simplex(&mut simplex, &mut values);
        let warning = if converged {
            None
        } else {
            Some(ConvergenceWarning {
                iterations,
                f_spread: values[values.len() - 1] - values[0],
            })
        };

        Ok(Minimum {
            x: simplex[0].clone(),
            value: values[0],
            evaluations,
            warning,
        })
    }
}

impl NelderMead {
    fn has_converged(&self, simplex: &[Vec<f64>], values: &[f64]) -> bool {
        let f_spread = values[values.len() - 1] - values[0];
        if f_spread > self.f_tol {
            return false;
        }
        let best = &simplex[0];
        simplex[1..].iter().all(|x| {
            x.iter()
                .zip(best)
                .all(|(xi, bi)| (xi - bi).abs() <= self.x_tol)
        })
    }
}

fn validate_bounds(x0: &[f64], bounds: &[(f64, f64)]) -> Result<(), FitError> {
    if x0.is_empty() {
        return Err(FitError::BoundsViolation("Empty initial guess.".into()));
    }
    if bounds.len() != x0.len() {
        return Err(FitError::BoundsViolation(format!(
            "{} bounds for {} parameters.",
            bounds.len(),
            x0.len()
        )));
    }
    for (i, &(lo, hi)) in bounds.iter().enumerate() {
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(FitError::BoundsViolation(format!(
                "Bound {i} is malformed: ({lo}, {hi})."
            )));
        }
        let xi = x0[i];
        if !xi.is_finite() || xi < lo || xi > hi {
            return Err(FitError::BoundsViolation(format!(
                "Initial guess x0[{i}] = {xi} outside ({lo}, {hi})."
            )));
        }
    }
    Ok(())
}

/// Build the initial simplex: `x0` plus one perturbed vertex per coordinate.
fn initial_simplex(x0: &[f64], bounds: &[(f64, f64)]) -> Vec<Vec<f64>> {
    const REL_STEP: f64 = 0.05;
    const ABS_STEP: f64 = 0.00025;

    let n = x0.len();
    let mut simplex = Vec::with_capacity(n + 1);
    simplex.push(x0.to_vec());
    for i in 0..n {
        let mut v = x0.to_vec();
        let step = if v[i] != 0.0 {
            REL_STEP * v[i].abs()
        } else {
            ABS_STEP
        };
        // Perturb away from the nearer bound so clipping cannot collapse the
        // vertex back onto x0.
        let (lo, hi) = bounds[i];
        v[i] = if v[i] + step <= hi { v[i] + step } else { v[i] - step };
        clip(&mut v, bounds);
        simplex.push(v);
    }
    simplex
}

/// Move from the worst vertex through the centroid by `coeff`, clipped into
/// the feasible box.
fn step(centroid: &[f64], worst: &[f64], coeff: f64, bounds: &[(f64, f64)]) -> Vec<f64> {
    let mut out: Vec<f64> = centroid
        .iter()
        .zip(worst)
        .map(|(&c, &w)| c + coeff * (c - w))
        .collect();
    clip(&mut out, bounds);
    out
}

fn clip(x: &mut [f64], bounds: &[(f64, f64)]) {
    for (xi, &(lo, hi)) in x.iter_mut().zip(bounds) {
        *xi = xi.clamp(lo, hi);
    }
}

fn sort_simplex(simplex: &mut [Vec<f64>], values: &mut [f64]) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(std::cmp::Ordering::Equal));

    let sorted_x: Vec<Vec<f64>> = order.iter().map(|&i| simplex[i].clone()).collect();
    let sorted_f: Vec<f64> = order.iter().map(|&i| values[i]).collect();
    for (dst, src) in simplex.iter_mut().zip(sorted_x) {
        *dst = src;
    }
    values.copy_from_slice(&sorted_f);
}
