//! Gaussian tapering window for LPC blocks
//!
//! The window is regenerated whenever an LPC scratch area is allocated for a
//! new block length. It is kept alongside the scratch buffers but the Burg
//! recursion runs on the raw input; see [`crate::utils::lpc::LpcScratch::window`].

use crate::Sample;

/// Generate the formant analysis window for a block of `length` samples
///
/// Formula, for `i` in `0..length`:
/// window[i] = exp(-48.0 * (i - imid)² / (length + 1)²) - edge
/// where imid = (length + 1) / 2 and edge = exp(-12.0)
///
/// Unlike Praat's variant the curve is not rescaled by `1 - edge`, so the
/// endpoints sit slightly above zero and the peak slightly below one.
pub fn formant_window<T: Sample>(length: usize) -> Vec<T> {
    let mut window = Vec::with_capacity(length);
    fill_formant_window(&mut window, length);
    window
}

/// Write the formant window into `window`, reusing its allocation
pub(crate) fn fill_formant_window<T: Sample>(window: &mut Vec<T>, length: usize) {
    window.clear();
    if length == 0 {
        return;
    }

    let edge = T::from_f64((-12.0_f64).exp());
    let imid = T::from_f64(0.5 * (length as f64 + 1.0));
    let denom = T::from_f64(length as f64 + 1.0);
    let scale = T::from_f64(-48.0);

    window.extend((0..length).map(|i| {
        let diff = T::from_f64(i as f64) - imid;
        (scale * diff * diff / (denom * denom)).exp() - edge
    }));
}
