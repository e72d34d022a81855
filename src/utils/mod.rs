//! Numeric kernels behind the analysis
//!
//! This module contains the Burg LPC estimator and the polynomial root
//! solver, plus the buffer helper both use to resize without panicking on
//! allocation failure.

pub mod lpc;
pub mod roots;

pub use lpc::{burg, LpcEstimate, LpcScratch, LpcStatus};
pub use roots::{RootSolver, SolverConfig};

use crate::Result;

/// Resize `buffer` to exactly `len` copies of `fill`, reporting allocation failure
pub(crate) fn resize_filled<T: Clone>(buffer: &mut Vec<T>, len: usize, fill: T) -> Result<()> {
    buffer.clear();
    buffer.try_reserve_exact(len)?;
    buffer.resize(len, fill);
    Ok(())
}
