//! Formants from the roots of the LPC polynomial
//!
//! Each complex-conjugate pair of roots inside the unit circle is a candidate
//! resonance. Only the upper half-plane member of a pair is used:
//! - frequency = |arg(z)| * sample_rate / 2π
//! - bandwidth = -ln|z| * sample_rate / π
//!
//! Roots with |z| < 0.7 are too damped to count as formants and roots on or
//! outside the unit circle are unstable; both are discarded, as are
//! frequencies within `margin` of 0 Hz or of the Nyquist frequency. Roots on
//! the real axis are never formants, even with a zero margin.

use std::cmp::Ordering;

use num_complex::Complex;

use crate::{Result, Sample};

/// Guard band (Hz) kept clear at both ends of the spectrum by default
pub const DEFAULT_SAFETY_MARGIN: f64 = 50.0;

/// Smallest root magnitude accepted as a formant
pub const MIN_ROOT_RADIUS: f64 = 0.7;

/// Number of formants in a [`FormantPair`]
pub const FORMANT_COUNT: usize = 2;

/// A single resonance: frequency and bandwidth in Hz
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Formant<T> {
    pub frequency: T,
    pub bandwidth: T,
}

impl<T: Sample> Formant<T> {
    pub fn new(frequency: T, bandwidth: T) -> Self {
        Self { frequency, bandwidth }
    }

    /// Formant described by one polynomial root, if the root qualifies
    pub fn from_root(root: Complex<T>, sample_rate: T, margin: T) -> Option<Self> {
        // Real roots have no conjugate partner and sit at 0 Hz or Nyquist
        if root.im <= T::zero() {
            return None;
        }

        let r = root.norm();
        if r < T::from_f64(MIN_ROOT_RADIUS) || r >= T::one() {
            return None;
        }

        let frequency = root.arg().abs() * sample_rate / (T::PI() + T::PI());
        let nyquist = sample_rate / T::from_f64(2.0);
        if frequency <= margin || frequency >= nyquist - margin {
            return None;
        }

        let bandwidth = -r.ln() * sample_rate / T::PI();
        Some(Self { frequency, bandwidth })
    }
}

/// Convert polynomial roots into formants, in root order
///
/// `formants` is cleared first. At most `roots.len() / 2` formants are
/// written, since real polynomials have their complex roots in conjugate pairs.
pub fn extract_formants<T: Sample>(
    roots: &[Complex<T>],
    sample_rate: T,
    margin: T,
    formants: &mut Vec<Formant<T>>,
) -> Result<()> {
    let capacity = roots.len() / 2;
    formants.clear();
    formants.try_reserve(capacity)?;

    formants.extend(
        roots
            .iter()
            .filter_map(|&root| Formant::from_root(root, sample_rate, margin))
            .take(capacity),
    );
    Ok(())
}

/// Sort formants by ascending frequency (stable)
pub fn sort_by_frequency<T: Sample>(formants: &mut [Formant<T>]) {
    formants.sort_by(|a, b| {
        a.frequency
            .partial_cmp(&b.frequency)
            .unwrap_or(Ordering::Equal)
    });
}

/// LPC order suited to general speech at `sample_rate`: 2.5 + sample_rate / 1000
///
/// `sample_rate` must be positive and finite.
pub fn suggested_order<T: Sample>(sample_rate: T) -> usize {
    let rate = sample_rate.to_f64();
    debug_assert!(
        rate.is_finite() && rate > 0.0,
        "sample rate must be positive and finite, got {rate}"
    );
    (2.5 + rate / 1000.0) as usize
}

/// The first two formants of a block, with a validity flag per slot
///
/// Slots without a formant hold `Formant::default()` (zero frequency and
/// bandwidth) and report `false` from [`is_valid`](Self::is_valid).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FormantPair<T> {
    formants: [Formant<T>; FORMANT_COUNT],
    valid: [bool; FORMANT_COUNT],
}

impl<T: Sample> FormantPair<T> {
    /// Take the lowest two formants above `floor` from a frequency-sorted list
    ///
    /// Formants whose frequency is not a normal float (zero, subnormal,
    /// NaN or infinite) are skipped. Embedders typically pass 1.5 times the
    /// pitch estimate as `floor` so the fundamental is not reported as F1.
    pub fn from_sorted(formants: &[Formant<T>], floor: T) -> Self {
        let mut pair = Self::default();
        let accepted = formants
            .iter()
            .filter(|f| f.frequency.is_normal() && f.frequency > floor);
        for (slot, formant) in accepted.take(FORMANT_COUNT).enumerate() {
            pair.formants[slot] = *formant;
            pair.valid[slot] = true;
        }
        pair
    }

    /// Formant in `slot` (0 = F1, 1 = F2), if one was found
    pub fn get(&self, slot: usize) -> Option<&Formant<T>> {
        if self.is_valid(slot) {
            self.formants.get(slot)
        } else {
            None
        }
    }

    pub fn is_valid(&self, slot: usize) -> bool {
        self.valid.get(slot).copied().unwrap_or(false)
    }

    /// Number of valid slots
    pub fn count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }

    /// Raw slots, zero-filled where invalid
    pub fn formants(&self) -> &[Formant<T>; FORMANT_COUNT] {
        &self.formants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const RATE: f64 = 16000.0;

    fn pole(frequency: f64, radius: f64) -> Complex<f64> {
        Complex::from_polar(radius, 2.0 * PI * frequency / RATE)
    }

    #[test]
    fn test_from_root_values() {
        let formant = Formant::from_root(pole(1000.0, 0.9), RATE, 50.0).unwrap();
        assert_relative_eq!(formant.frequency, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(formant.bandwidth, -(0.9_f64.ln()) * RATE / PI, epsilon = 1e-9);
    }

    #[test]
    fn test_from_root_rejections() {
        // Lower half-plane
        assert!(Formant::from_root(pole(1000.0, 0.9).conj(), RATE, 50.0).is_none());
        // Too damped, on the circle, outside the circle
        assert!(Formant::from_root(pole(1000.0, 0.69), RATE, 50.0).is_none());
        assert!(Formant::from_root(Complex::new(0.0, 1.0), RATE, 50.0).is_none());
        assert!(Formant::from_root(pole(1000.0, 1.2), RATE, 50.0).is_none());
        // Inside the guard bands
        assert!(Formant::from_root(pole(40.0, 0.9), RATE, 50.0).is_none());
        assert!(Formant::from_root(pole(7960.0, 0.9), RATE, 50.0).is_none());
        // Radius boundary is inclusive at 0.7 (a quarter turn is 4000 Hz)
        assert!(Formant::from_root(Complex::new(0.0, 0.7), RATE, 50.0).is_some());
    }

    #[test]
    fn test_real_roots_rejected_without_margin() {
        // arg(-0.8) * RATE / 2π rounds to just under Nyquist
        assert!(Formant::from_root(Complex::new(0.8, 0.0), RATE, 0.0).is_none());
        assert!(Formant::from_root(Complex::new(-0.8, 0.0), RATE, 0.0).is_none());
        assert!(Formant::from_root(Complex::new(-0.8_f32, 0.0), 16000.0, 0.0).is_none());

        let mut formants = Vec::new();
        let roots = [Complex::new(-0.8, 0.0), Complex::new(-0.9, 0.0), pole(1000.0, 0.9)];
        extract_formants(&roots, RATE, 0.0, &mut formants).unwrap();
        assert_eq!(formants.len(), 1);
        assert_relative_eq!(formants[0].frequency, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_extract_keeps_root_order() {
        let roots = [
            pole(2500.0, 0.95),
            pole(2500.0, 0.95).conj(),
            pole(600.0, 0.9),
            pole(600.0, 0.9).conj(),
            Complex::new(0.3, 0.0),
            Complex::new(-0.5, 0.0),
        ];
        let mut formants = Vec::new();
        extract_formants(&roots, RATE, 50.0, &mut formants).unwrap();
        assert_eq!(formants.len(), 2);
        assert_relative_eq!(formants[0].frequency, 2500.0, epsilon = 1e-9);
        assert_relative_eq!(formants[1].frequency, 600.0, epsilon = 1e-9);

        sort_by_frequency(&mut formants);
        assert_relative_eq!(formants[0].frequency, 600.0, epsilon = 1e-9);
        assert_relative_eq!(formants[1].frequency, 2500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_extract_caps_at_half_the_roots() {
        // Three upper half-plane roots among four: only two formants fit
        let roots = [
            pole(500.0, 0.9),
            pole(1500.0, 0.9),
            pole(2500.0, 0.9),
            pole(2500.0, 0.9).conj(),
        ];
        let mut formants = vec![Formant::new(1.0, 1.0); 5];
        extract_formants(&roots, RATE, 50.0, &mut formants).unwrap();
        assert_eq!(formants.len(), 2);
        assert_relative_eq!(formants[1].frequency, 1500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut formants = vec![
            Formant::new(900.0, 1.0),
            Formant::new(300.0, 2.0),
            Formant::new(900.0, 3.0),
            Formant::new(300.0, 4.0),
        ];
        sort_by_frequency(&mut formants);
        let bandwidths: Vec<f64> = formants.iter().map(|f| f.bandwidth).collect();
        assert_eq!(bandwidths, vec![2.0, 4.0, 1.0, 3.0]);
    }

    #[test]
    fn test_suggested_order() {
        assert_eq!(suggested_order(12000.0), 14);
        assert_eq!(suggested_order(16000.0), 18);
        assert_eq!(suggested_order(8000.0), 10);
        assert_eq!(suggested_order(44100.0_f32), 46);
        assert_eq!(suggested_order(22050.0_f32), 24);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "sample rate must be positive")]
    fn test_suggested_order_rejects_nan() {
        suggested_order(f64::NAN);
    }

    #[test]
    fn test_pair_from_sorted() {
        let formants = [
            Formant::new(150.0, 40.0),
            Formant::new(700.0, 80.0),
            Formant::new(1200.0, 90.0),
            Formant::new(2600.0, 120.0),
        ];
        let pair = FormantPair::from_sorted(&formants, 200.0);
        assert_eq!(pair.count(), 2);
        assert_eq!(pair.get(0), Some(&Formant::new(700.0, 80.0)));
        assert_eq!(pair.get(1), Some(&Formant::new(1200.0, 90.0)));
        assert!(!pair.is_valid(2));
    }

    #[test]
    fn test_pair_zero_filled() {
        let pair = FormantPair::from_sorted(&[Formant::new(800.0, 60.0)], 0.0);
        assert_eq!(pair.count(), 1);
        assert!(pair.is_valid(0));
        assert!(!pair.is_valid(1));
        assert!(pair.get(1).is_none());
        assert_eq!(pair.formants()[1], Formant::default());

        let empty = FormantPair::<f32>::from_sorted(&[], 0.0);
        assert_eq!(empty.count(), 0);
        assert_eq!(empty.formants(), &[Formant::default(); FORMANT_COUNT]);
    }

    #[test]
    fn test_pair_skips_non_normal() {
        let formants = [
            Formant::new(f64::NAN, 10.0),
            Formant::new(0.0, 10.0),
            Formant::new(500.0, 10.0),
        ];
        let pair = FormantPair::from_sorted(&formants, 0.0);
        assert_eq!(pair.count(), 1);
        assert_relative_eq!(pair.get(0).unwrap().frequency, 500.0);
    }
}
