//! Polynomial root finding by Durand-Kerner (Weierstrass) iteration
//!
//! All roots of the monic LPC polynomial are refined simultaneously: each
//! sweep applies a Newton step to every root, corrected by the current
//! positions of all the other roots. Seeds are drawn from an injected random
//! source, so a solver seeded the same way always lands on the same roots.
//!
//! The iteration always runs in `f64`, whatever the sample type. Seeds reach
//! out to `1 + max|c_i|`, and at LPC orders around 18 the derivative there
//! already exceeds what `f32` complex division can square.

use std::f64::consts::PI;

use log::{debug, trace, warn};
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::utils::resize_filled;
use crate::{FormantError, Result, Sample};

/// Seed used by [`RootSolver::new`]
pub const DEFAULT_SEED: u64 = 0x5eed_f0a7;

/// Stopping rules for the root solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig<T> {
    /// Sweeps allowed before giving up with [`FormantError::NonConvergence`]
    pub max_sweeps: usize,
    /// A root has converged when both parts of its offset are below this
    pub tolerance: T,
}

impl<T: Sample> Default for SolverConfig<T> {
    fn default() -> Self {
        Self {
            max_sweeps: 1000,
            tolerance: T::from_f64(1e-4),
        }
    }
}

/// Durand-Kerner root solver owning its roots buffer and random source
#[derive(Debug, Clone)]
pub struct RootSolver<T, R = StdRng> {
    roots: Vec<Complex<T>>,
    /// Double-precision iterates, same length as `roots`
    work: Vec<Complex<f64>>,
    config: SolverConfig<T>,
    rng: R,
}

impl<T: Sample> RootSolver<T, StdRng> {
    /// Create a solver for polynomials of `degree`, seeded with [`DEFAULT_SEED`]
    pub fn new(degree: usize) -> Result<Self> {
        Self::with_rng(degree, StdRng::seed_from_u64(DEFAULT_SEED))
    }

    /// Restart the random source from `seed`
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

impl<T: Sample, R: Rng> RootSolver<T, R> {
    /// Create a solver drawing its initial guesses from `rng`
    pub fn with_rng(degree: usize, rng: R) -> Result<Self> {
        let mut solver = Self {
            roots: Vec::new(),
            work: Vec::new(),
            config: SolverConfig::default(),
            rng,
        };
        solver.resize(degree)?;
        Ok(solver)
    }

    /// Resize the roots buffer; a no-op returning `Ok(false)` when `degree` is unchanged
    pub fn resize(&mut self, degree: usize) -> Result<bool> {
        if degree == 0 {
            return Err(FormantError::InvalidParameter(
                "polynomial degree must be positive".to_string(),
            ));
        }
        if degree == self.roots.len() && degree == self.work.len() {
            return Ok(false);
        }
        debug!("reallocating root buffer: degree {} -> {}", self.roots.len(), degree);
        resize_filled(&mut self.roots, degree, Complex::new(T::zero(), T::zero()))?;
        resize_filled(&mut self.work, degree, Complex::new(0.0, 0.0))?;
        Ok(true)
    }

    /// Degree the roots buffer is sized for
    pub fn degree(&self) -> usize {
        self.roots.len()
    }

    /// Roots written by the last [`solve`](Self::solve)
    ///
    /// Only meaningful after `solve` returned `Ok`. After an error the buffer
    /// holds the iterates of the failing sweep, which are not roots.
    pub fn roots(&self) -> &[Complex<T>] {
        &self.roots
    }

    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SolverConfig<T> {
        &mut self.config
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Find all roots of the monic polynomial
    /// z^m + coefficients[0]*z^(m-1) + ... + coefficients[m-1]
    ///
    /// Trailing zero coefficients are exact roots at the origin; they are
    /// written directly and the iteration runs on the reduced polynomial.
    ///
    /// # Returns
    /// The number of sweeps used.
    ///
    /// # Errors
    /// - [`FormantError::NonConvergence`] when `max_sweeps` is exhausted
    /// - [`FormantError::NumericalBreakdown`] when an offset is NaN or infinite
    pub fn solve(&mut self, coefficients: &[T]) -> Result<usize> {
        let degree = self.roots.len();
        if coefficients.len() != degree {
            return Err(FormantError::InvalidParameter(format!(
                "expected {degree} coefficients, got {}",
                coefficients.len()
            )));
        }

        let zeros = coefficients
            .iter()
            .rev()
            .take_while(|&&c| c == T::zero())
            .count();
        let active = degree - zeros;
        self.roots[active..].fill(Complex::new(T::zero(), T::zero()));
        if active == 0 {
            trace!("all {degree} roots at the origin");
            return Ok(0);
        }

        let coefficients = &coefficients[..active];
        let work = &mut self.work[..active];
        seed_roots(work, coefficients, &mut self.rng);

        let result = iterate(work, coefficients, &self.config);
        for (root, z) in self.roots.iter_mut().zip(work.iter()) {
            *root = Complex::new(T::from_f64(z.re), T::from_f64(z.im));
        }

        match &result {
            Ok(sweeps) => trace!("roots of degree {active} converged after {sweeps} sweeps"),
            Err(FormantError::NumericalBreakdown { sweeps, root }) => {
                warn!("root solver breakdown at root {root} in sweep {sweeps}")
            }
            Err(_) => warn!(
                "root solver did not converge within {} sweeps (degree {active})",
                self.config.max_sweeps
            ),
        }
        result
    }
}

/// Durand-Kerner sweeps over `roots` until every offset is below tolerance
fn iterate<T: Sample>(
    roots: &mut [Complex<f64>],
    coefficients: &[T],
    config: &SolverConfig<T>,
) -> Result<usize> {
    let tolerance = config.tolerance.to_f64();
    let one = Complex::new(1.0, 0.0);

    for sweep in 1..=config.max_sweeps {
        let mut converged = 0;

        for k in 0..roots.len() {
            let root = roots[k];
            let (y, dy) = evaluate_monic_with_derivative(coefficients, root);
            let ratio = y / dy;

            let mut sum = Complex::new(0.0, 0.0);
            for (j, &other) in roots.iter().enumerate() {
                if j != k {
                    sum += one / (root - other);
                }
            }

            let offset = ratio / (one - ratio * sum);
            if !offset.re.is_finite() || !offset.im.is_finite() {
                return Err(FormantError::NumericalBreakdown { sweeps: sweep, root: k });
            }
            if offset.re.abs() < tolerance && offset.im.abs() < tolerance {
                converged += 1;
            }
            roots[k] = root - offset;
        }

        if converged == roots.len() {
            return Ok(sweep);
        }
    }

    Err(FormantError::NonConvergence {
        sweeps: config.max_sweeps,
    })
}

/// Place initial guesses uniformly in the annulus that must contain every root
///
/// Cauchy bounds: |z| < 1 + max|c_i| and |z| >= |c_m| / (|c_m| + max(1, max_{i<m} |c_i|)).
fn seed_roots<T: Sample, R: Rng>(roots: &mut [Complex<f64>], coefficients: &[T], rng: &mut R) {
    let degree = coefficients.len();
    let trailing = coefficients[degree - 1].to_f64().abs();
    let max_all = coefficients
        .iter()
        .fold(0.0_f64, |acc, &c| acc.max(c.to_f64().abs()));
    let max_interior = coefficients[..degree - 1]
        .iter()
        .fold(1.0_f64, |acc, &c| acc.max(c.to_f64().abs()));

    let upper = 1.0 + max_all;
    let lower = trailing / (trailing + max_interior);

    for root in roots.iter_mut() {
        let r = lower + (upper - lower) * rng.random::<f64>();
        let theta = 2.0 * PI * rng.random::<f64>();
        *root = Complex::from_polar(r, theta);
    }
}

/// Evaluate the monic polynomial and its derivative at `z` using Horner's method
fn evaluate_monic_with_derivative<T: Sample>(
    coefficients: &[T],
    z: Complex<f64>,
) -> (Complex<f64>, Complex<f64>) {
    let mut y = Complex::new(1.0, 0.0);
    let mut dy = Complex::new(0.0, 0.0);
    for &c in coefficients {
        dy = dy * z + y;
        y = y * z + c.to_f64();
    }
    (y, dy)
}
