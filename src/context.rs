//! Long-lived analyzer state for repeated formant analysis
//!
//! A [`WorkContext`] owns the LPC scratch buffers, the coefficient vector and
//! the root solver. Analysing a stream block by block through one context
//! only allocates when the block length or LPC order changes:
//! - LPC scratch and coefficients are resized when either dimension changes
//! - the roots buffer is resized only when the order changes
//!
//! A context is not meant to be shared between threads while analysing; use
//! one context per channel.

use log::debug;
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::formant::{extract_formants, sort_by_frequency, Formant, FormantPair};
use crate::utils::lpc::{burg, LpcScratch, LpcStatus};
use crate::utils::resize_filled;
use crate::utils::roots::{RootSolver, SolverConfig, DEFAULT_SEED};
use crate::{check_dimensions, FormantError, Result, Sample};

/// Diagnostics for one analysed block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisInfo {
    /// How far the Burg recursion got
    pub lpc: LpcStatus,
    /// Root solver sweeps used (0 when every root was at the origin)
    pub sweeps: usize,
}

/// Formants of one block, sorted by ascending frequency
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis<T> {
    pub formants: Vec<Formant<T>>,
    pub info: AnalysisInfo,
}

impl<T: Sample> Analysis<T> {
    /// Number of formants found
    pub fn count(&self) -> usize {
        self.formants.len()
    }

    /// True when the block gave no usable prediction (silent or truncated LPC)
    pub fn is_degenerate(&self) -> bool {
        self.info.lpc.is_degenerate()
    }

    /// The lowest two formants above `floor`, zero-filled when missing
    pub fn leading_pair(&self, floor: T) -> FormantPair<T> {
        FormantPair::from_sorted(&self.formants, floor)
    }
}

/// Reusable buffers and solver for analysing blocks of (length, order)
#[derive(Debug, Clone)]
pub struct WorkContext<T, R = StdRng> {
    scratch: LpcScratch<T>,
    coefficients: Vec<T>,
    solver: RootSolver<T, R>,
}

impl<T: Sample> WorkContext<T, StdRng> {
    /// Create a context for blocks of `length` samples and LPC `order`
    ///
    /// Root seeding starts from [`DEFAULT_SEED`], so two fresh contexts fed
    /// the same blocks give identical results.
    pub fn new(length: usize, order: usize) -> Result<Self> {
        Self::with_seed(length, order, DEFAULT_SEED)
    }

    /// Create a context whose root seeding starts from `seed`
    pub fn with_seed(length: usize, order: usize, seed: u64) -> Result<Self> {
        Self::with_rng(length, order, StdRng::seed_from_u64(seed))
    }

    /// Restart root seeding from `seed`, e.g. before each block for per-block reproducibility
    pub fn reseed(&mut self, seed: u64) {
        self.solver.reseed(seed);
    }
}

impl<T: Sample, R: Rng> WorkContext<T, R> {
    /// Create a context drawing root seeds from `rng`
    pub fn with_rng(length: usize, order: usize, rng: R) -> Result<Self> {
        check_dimensions(length, order)?;
        let scratch = LpcScratch::new(length, order)?;
        let mut coefficients = Vec::new();
        resize_filled(&mut coefficients, order, T::zero())?;
        let solver = RootSolver::with_rng(order, rng)?;
        Ok(Self {
            scratch,
            coefficients,
            solver,
        })
    }

    /// Replace the root solver's stopping rules
    pub fn with_config(mut self, config: SolverConfig<T>) -> Self {
        *self.solver.config_mut() = config;
        self
    }

    pub fn solver_config(&self) -> &SolverConfig<T> {
        self.solver.config()
    }

    pub fn solver_config_mut(&mut self) -> &mut SolverConfig<T> {
        self.solver.config_mut()
    }

    /// Block length of the most recent analysis (or of construction)
    pub fn length(&self) -> usize {
        self.scratch.length()
    }

    /// LPC order of the most recent analysis (or of construction)
    pub fn order(&self) -> usize {
        self.scratch.order()
    }

    /// LPC coefficients of the most recent analysis
    pub fn coefficients(&self) -> &[T] {
        &self.coefficients
    }

    /// Polynomial roots of the most recent analysis
    ///
    /// Not valid after an analysis that failed with
    /// [`FormantError::NonConvergence`] or [`FormantError::NumericalBreakdown`].
    pub fn roots(&self) -> &[Complex<T>] {
        self.solver.roots()
    }

    /// Tapering window for the current block length (not applied to the input)
    pub fn window(&self) -> &[T] {
        self.scratch.window()
    }

    /// Analyse one block of samples
    ///
    /// # Arguments
    /// * `samples` - Exactly `length` samples
    /// * `length` - Block length; may differ from the previous call
    /// * `order` - LPC order, `0 < order < length`; may differ from the previous call
    /// * `sample_rate` - Sample rate in Hz
    /// * `margin` - Guard band in Hz at 0 Hz and at Nyquist
    ///
    /// # Returns
    /// Formants sorted by ascending frequency, at most `order / 2` of them.
    /// A silent block is not an error: it yields no formants and
    /// [`LpcStatus::Silent`].
    ///
    /// # Errors
    /// - [`FormantError::InvalidParameter`] on a violated precondition; the
    ///   context is left untouched
    /// - [`FormantError::NonConvergence`] / [`FormantError::NumericalBreakdown`]
    ///   from the root solver
    /// - [`FormantError::Allocation`] when resizing fails
    pub fn analyze(
        &mut self,
        samples: &[T],
        length: usize,
        order: usize,
        sample_rate: T,
        margin: T,
    ) -> Result<Analysis<T>> {
        let mut formants = Vec::new();
        let info = self.analyze_into(samples, length, order, sample_rate, margin, &mut formants)?;
        Ok(Analysis { formants, info })
    }

    /// Like [`analyze`](Self::analyze), writing the formants into `formants`
    ///
    /// `formants` is cleared first; its allocation is reused across calls.
    pub fn analyze_into(
        &mut self,
        samples: &[T],
        length: usize,
        order: usize,
        sample_rate: T,
        margin: T,
        formants: &mut Vec<Formant<T>>,
    ) -> Result<AnalysisInfo> {
        check_dimensions(length, order)?;
        if samples.len() != length {
            return Err(FormantError::InvalidParameter(format!(
                "block length is {length} but {} samples were given",
                samples.len()
            )));
        }
        if !sample_rate.is_finite() || sample_rate <= T::zero() {
            return Err(FormantError::InvalidParameter(format!(
                "sample rate must be positive and finite, got {sample_rate:?}"
            )));
        }
        if !margin.is_finite() || margin < T::zero() {
            return Err(FormantError::InvalidParameter(format!(
                "safety margin must be non-negative and finite, got {margin:?}"
            )));
        }

        self.resize(length, order)?;

        let estimate = burg(&mut self.scratch, samples, &mut self.coefficients)?;
        if estimate.status == LpcStatus::Silent {
            debug!("silent block of {length} samples");
        }

        let sweeps = self.solver.solve(&self.coefficients)?;

        extract_formants(self.solver.roots(), sample_rate, margin, formants)?;
        sort_by_frequency(formants);

        Ok(AnalysisInfo {
            lpc: estimate.status,
            sweeps,
        })
    }

    /// Release all buffers; equivalent to dropping the context
    pub fn destroy(self) {}

    fn resize(&mut self, length: usize, order: usize) -> Result<()> {
        if length != self.scratch.length() || order != self.scratch.order() {
            // Mark the coefficients stale first so a failed scratch resize retries next call
            self.coefficients.clear();
            self.scratch.resize(length, order)?;
            resize_filled(&mut self.coefficients, order, T::zero())?;
        } else if self.coefficients.len() != order {
            resize_filled(&mut self.coefficients, order, T::zero())?;
        }
        self.solver.resize(order)?;
        Ok(())
    }
}
