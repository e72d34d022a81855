//! Linear Predictive Coding (LPC) using Burg's method
//!
//! The estimator runs on caller-owned scratch buffers so that repeated
//! analysis of a stream does not allocate per block. Formulas index samples
//! and coefficients from 1, so the prediction-error buffers carry one unused
//! slot at index 0 and coefficient `a[i]` lives at `coefficients[i - 1]`.

use log::debug;

use crate::utils::resize_filled;
use crate::window::fill_formant_window;
use crate::{check_dimensions, FormantError, Result, Sample};

/// How far the Burg recursion got for a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpcStatus {
    /// All requested prediction stages were computed
    Complete,
    /// The block has no energy; every coefficient is zero
    Silent,
    /// The recursion stopped on a non-positive denominator after `stages` stages;
    /// the remaining coefficients are zero
    Truncated { stages: usize },
}

impl LpcStatus {
    /// True when the block gave no usable prediction at some order
    pub fn is_degenerate(self) -> bool {
        !matches!(self, LpcStatus::Complete)
    }
}

/// Result of one Burg estimation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LpcEstimate<T> {
    pub status: LpcStatus,
    /// Residual prediction error (xms); zero for degenerate blocks
    pub gain: T,
}

/// Scratch buffers for the Burg recursion, sized to (length, order)
#[derive(Debug, Clone)]
pub struct LpcScratch<T> {
    /// Forward prediction error, indices 1..=length
    b1: Vec<T>,
    /// Backward prediction error, indices 1..=length
    b2: Vec<T>,
    /// Coefficients of the previous stage, indices 1..=order
    aa: Vec<T>,
    window: Vec<T>,
    length: usize,
    order: usize,
}

impl<T: Sample> LpcScratch<T> {
    /// Allocate scratch buffers for blocks of `length` samples and `order` coefficients
    pub fn new(length: usize, order: usize) -> Result<Self> {
        let mut scratch = Self {
            b1: Vec::new(),
            b2: Vec::new(),
            aa: Vec::new(),
            window: Vec::new(),
            length: 0,
            order: 0,
        };
        scratch.resize(length, order)?;
        Ok(scratch)
    }

    /// Resize the buffers for new dimensions
    ///
    /// Returns `Ok(false)` without touching anything when the dimensions are
    /// unchanged. On allocation failure the scratch is left in an unsized
    /// state, so the next resize to any valid dimensions rebuilds it.
    pub fn resize(&mut self, length: usize, order: usize) -> Result<bool> {
        check_dimensions(length, order)?;
        if length == self.length && order == self.order {
            return Ok(false);
        }

        debug!(
            "reallocating LPC scratch: length {} -> {}, order {} -> {}",
            self.length, length, self.order, order
        );

        self.length = 0;
        self.order = 0;
        resize_filled(&mut self.b1, length + 1, T::zero())?;
        resize_filled(&mut self.b2, length + 1, T::zero())?;
        resize_filled(&mut self.aa, order + 1, T::zero())?;
        self.window.clear();
        self.window.try_reserve_exact(length)?;
        fill_formant_window(&mut self.window, length);
        self.length = length;
        self.order = order;
        Ok(true)
    }

    /// Block length these buffers are sized for
    pub fn length(&self) -> usize {
        self.length
    }

    /// LPC order these buffers are sized for
    pub fn order(&self) -> usize {
        self.order
    }

    /// Tapering window for the current block length
    ///
    /// Regenerated on every reallocation. [`burg`] does not multiply it into
    /// the input; callers that want a tapered block apply it themselves.
    pub fn window(&self) -> &[T] {
        &self.window
    }
}

/// Compute LPC coefficients using Burg's method
///
/// Writes `order` coefficients into `coefficients`, where the prediction
/// polynomial is monic:
/// z^m + c[0]*z^(m-1) + c[1]*z^(m-2) + ... + c[m-1]
///
/// # Arguments
/// * `scratch` - Working buffers sized to (input.len(), coefficients.len())
/// * `input` - One block of samples
/// * `coefficients` - Output, overwritten in place
///
/// # Returns
/// The recursion status and residual error. Silent input and a vanishing
/// denominator are reported through [`LpcStatus`], not as errors.
pub fn burg<T: Sample>(
    scratch: &mut LpcScratch<T>,
    input: &[T],
    coefficients: &mut [T],
) -> Result<LpcEstimate<T>> {
    let n = scratch.length;
    let m = scratch.order;

    if n == 0 {
        return Err(FormantError::InvalidParameter(
            "LPC scratch is not sized".to_string(),
        ));
    }
    if input.len() != n {
        return Err(FormantError::InvalidParameter(format!(
            "expected {n} samples, got {}",
            input.len()
        )));
    }
    if coefficients.len() != m {
        return Err(FormantError::InvalidParameter(format!(
            "expected {m} coefficients, got {}",
            coefficients.len()
        )));
    }

    let b1 = &mut scratch.b1;
    let b2 = &mut scratch.b2;
    let aa = &mut scratch.aa;

    b1.fill(T::zero());
    b2.fill(T::zero());
    aa.fill(T::zero());
    coefficients.fill(T::zero());

    // x[j] for j in 1..=n
    let x = |j: usize| input[j - 1];

    let energy = input.iter().fold(T::zero(), |acc, &s| acc + s * s);
    let mut xms = energy / T::from_f64(n as f64);
    if xms <= T::zero() {
        return Ok(LpcEstimate {
            status: LpcStatus::Silent,
            gain: T::zero(),
        });
    }

    b1[1] = x(1);
    b2[n - 1] = x(n);
    for j in 2..n {
        b1[j] = x(j);
        b2[j - 1] = x(j);
    }

    let two = T::from_f64(2.0);
    let mut status = LpcStatus::Complete;

    for i in 1..=m {
        let mut num = T::zero();
        let mut denum = T::zero();
        for j in 1..=n - i {
            num = num + b1[j] * b2[j];
            denum = denum + b1[j] * b1[j] + b2[j] * b2[j];
        }

        if denum <= T::zero() {
            xms = T::zero();
            status = LpcStatus::Truncated { stages: i - 1 };
            break;
        }

        // Reflection coefficient of this stage
        let k = two * num / denum;
        coefficients[i - 1] = k;
        xms = xms * (T::one() - k * k);

        for j in 1..i {
            coefficients[j - 1] = aa[j] - k * aa[i - j];
        }

        if i < m {
            for j in 1..=i {
                aa[j] = coefficients[j - 1];
            }
            for j in 1..n - i {
                b1[j] = b1[j] - aa[i] * b2[j];
                b2[j] = b2[j + 1] - aa[i] * b1[j + 1];
            }
        }
    }

    // Sign convention of the prediction polynomial
    for c in coefficients.iter_mut() {
        *c = -*c;
    }

    Ok(LpcEstimate { status, gain: xms })
}
