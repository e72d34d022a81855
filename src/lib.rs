//! formants-core: LPC formant extraction for short audio blocks
//!
//! This library estimates vocal-tract resonances (formants) from one block of
//! samples. It fits a linear-prediction polynomial with Burg's method, finds
//! all of the polynomial's roots with a Durand-Kerner iteration, and keeps
//! the stable, audible roots as frequency/bandwidth pairs.
//!
//! # Core Types
//!
//! - [`WorkContext`] - Long-lived analyzer state reused across blocks
//! - [`Formant`] - One resonance (frequency and bandwidth in Hz)
//! - [`FormantPair`] - Fixed-size F1/F2 record with validity flags
//! - [`LpcScratch`] - Burg recursion buffers sized to (length, order)
//! - [`RootSolver`] - Durand-Kerner solver with an injected random source
//!
//! # Example
//!
//! ```
//! use formants_core::WorkContext;
//!
//! let samples: Vec<f64> = (0..512)
//!     .map(|i| (0.3 * i as f64).sin() * 0.98_f64.powi(i % 64))
//!     .collect();
//!
//! let mut context = WorkContext::<f64>::new(512, 8).unwrap();
//! let analysis = context.analyze(&samples, 512, 8, 16000.0, 50.0).unwrap();
//! for pair in analysis.formants.windows(2) {
//!     assert!(pair[0].frequency <= pair[1].frequency);
//! }
//! ```

pub mod sample;
pub mod window;
pub mod formant;
pub mod context;

pub mod utils;

// Re-export main types at crate root
pub use context::{Analysis, AnalysisInfo, WorkContext};
pub use formant::{
    extract_formants, sort_by_frequency, suggested_order, Formant, FormantPair,
    DEFAULT_SAFETY_MARGIN, FORMANT_COUNT,
};
pub use sample::Sample;
pub use utils::lpc::{burg, LpcEstimate, LpcScratch, LpcStatus};
pub use utils::roots::{RootSolver, SolverConfig, DEFAULT_SEED};
pub use window::formant_window;

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that can occur in formant analysis
#[derive(Error, Debug)]
pub enum FormantError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Root solver did not converge after {sweeps} sweeps")]
    NonConvergence { sweeps: usize },

    #[error("Root solver broke down at root {root} during sweep {sweeps}: offset is not finite")]
    NumericalBreakdown { sweeps: usize, root: usize },

    #[error("Buffer allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

pub type Result<T> = std::result::Result<T, FormantError>;

/// Check the preconditions shared by every (length, order) pair
pub(crate) fn check_dimensions(length: usize, order: usize) -> Result<()> {
    if length == 0 {
        return Err(FormantError::InvalidParameter(
            "block length must be positive".to_string(),
        ));
    }
    if order == 0 {
        return Err(FormantError::InvalidParameter(
            "LPC order must be positive".to_string(),
        ));
    }
    if order >= length {
        return Err(FormantError::InvalidParameter(format!(
            "LPC order {order} must be smaller than block length {length}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_dimensions() {
        assert!(check_dimensions(10, 4).is_ok());
        assert!(check_dimensions(2, 1).is_ok());
        assert!(matches!(
            check_dimensions(0, 0),
            Err(FormantError::InvalidParameter(_))
        ));
        assert!(matches!(
            check_dimensions(10, 0),
            Err(FormantError::InvalidParameter(_))
        ));
        assert!(matches!(
            check_dimensions(8, 8),
            Err(FormantError::InvalidParameter(_))
        ));
        assert!(matches!(
            check_dimensions(8, 9),
            Err(FormantError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_error_messages() {
        let err = FormantError::NonConvergence { sweeps: 12 };
        assert_eq!(
            err.to_string(),
            "Root solver did not converge after 12 sweeps"
        );
        let err = FormantError::NumericalBreakdown { sweeps: 3, root: 1 };
        assert!(err.to_string().contains("root 1"));
    }
}
