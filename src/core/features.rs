//! Feature extraction from a sample window.
//!
//! A window of N samples maps to a real vector laid out as
//!
//! ```text
//! [mean, std, re(X0), im(X0), re(X1), im(X1), ..., re(X(N/2-1)), im(X(N/2-1))]
//! ```
//!
//! where `X` is the forward, unnormalized DFT (`X[k] = sum x[n] e^(-2πi·kn/N)`).
//! Only the first `N/2` bins are kept, so for even N the Nyquist bin is
//! dropped. The downstream models were fitted on exactly this layout.

use crate::core::windowing::SampleWindow;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::sync::Arc;

/// Number of leading scalar statistics (mean, std).
pub const SCALAR_FEATURES: usize = 2;

/// Fixed-length real feature vector derived from one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn mean(&self) -> f64 {
        self.0[0]
    }

    pub fn std_dev(&self) -> f64 {
        self.0[1]
    }

    /// Kept spectral bins as `(re, im)` pairs.
    pub fn spectrum(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.0[SCALAR_FEATURES..]
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
    }
}

/// Length of the feature vector produced for a window of `window_len` samples.
pub fn feature_len(window_len: usize) -> usize {
    SCALAR_FEATURES + 2 * (window_len / 2)
}

/// Positional column names (`"0"`, `"1"`, ...) for a feature table.
pub fn column_names(feature_len: usize) -> Vec<String> {
    (0..feature_len).map(|i| i.to_string()).collect()
}

/// Feature extractor holding a pre-planned transform for one window length.
pub struct FeatureExtractor {
    window_len: usize,
    fft: Arc<dyn Fft<f64>>,
}

impl FeatureExtractor {
    pub fn new(window_len: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            window_len,
            fft: planner.plan_fft_forward(window_len),
        }
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    pub fn feature_len(&self) -> usize {
        feature_len(self.window_len)
    }

    /// Compute the feature vector of `window`.
    ///
    /// The window must hold exactly `window_len` samples.
    pub fn extract(&self, window: &SampleWindow) -> FeatureVector {
        let samples = window.to_vec();
        debug_assert_eq!(
            samples.len(),
            self.window_len,
            "window length does not match extractor"
        );
        compute(&samples, self.fft.as_ref())
    }
}

/// Compute the feature vector of `window` with a freshly planned transform.
pub fn extract_features(window: &SampleWindow) -> FeatureVector {
    FeatureExtractor::new(window.len()).extract(window)
}

fn compute(samples: &[f64], fft: &dyn Fft<f64>) -> FeatureVector {
    let mean = samples.iter().mean();
    let std = samples.iter().population_std_dev();

    // Transform the centred signal; only the DC bin depends on the offset.
    let mut spectrum: Vec<Complex<f64>> = samples
        .iter()
        .map(|&x| Complex::new(x - mean, 0.0))
        .collect();
    fft.process(&mut spectrum);
    if let Some(dc) = spectrum.first_mut() {
        *dc = Complex::new(samples.iter().sum::<f64>(), 0.0);
    }

    let kept = samples.len() / 2;
    let mut values = Vec::with_capacity(feature_len(samples.len()));
    values.push(mean);
    values.push(std);
    for bin in &spectrum[..kept] {
        // Adding zero folds -0.0 into 0.0.
        values.push(bin.re + 0.0);
        values.push(bin.im + 0.0);
    }

    FeatureVector(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_from(samples: &[f64]) -> SampleWindow {
        let mut window = SampleWindow::new(samples.len(), 0.0);
        for &s in samples {
            window.push(s);
        }
        window
    }

    /// Direct O(N²) DFT used as a reference.
    fn naive_dft(samples: &[f64]) -> Vec<(f64, f64)> {
        let n = samples.len() as f64;
        (0..samples.len())
            .map(|k| {
                samples.iter().enumerate().fold((0.0, 0.0), |(re, im), (t, &x)| {
                    let angle = -2.0 * std::f64::consts::PI * k as f64 * t as f64 / n;
                    (re + x * angle.cos(), im + x * angle.sin())
                })
            })
            .collect()
    }

    #[test]
    fn test_feature_len() {
        assert_eq!(feature_len(10), 12);
        assert_eq!(feature_len(8), 10);
        assert_eq!(feature_len(7), 8);
        assert_eq!(feature_len(1), 2);
    }

    #[test]
    fn test_constant_window_has_zero_spread_and_flat_spectrum() {
        let window = SampleWindow::new(10, 177.0);
        let features = extract_features(&window);

        assert_eq!(features.len(), 12);
        assert_eq!(features.mean(), 177.0);
        assert_eq!(features.std_dev(), 0.0);

        let bins: Vec<(f64, f64)> = features.spectrum().collect();
        assert_eq!(bins.len(), 5);
        assert_eq!(bins[0], (1770.0, 0.0));
        for &(re, im) in &bins[1..] {
            assert_eq!(re, 0.0);
            assert_eq!(im, 0.0);
        }
    }

    #[test]
    fn test_population_std_divides_by_n() {
        let window = window_from(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let features = extract_features(&window);
        assert!((features.mean() - 5.0).abs() < 1e-12);
        assert!((features.std_dev() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_spectrum_matches_reference_dft() {
        let samples = [170.0, 181.0, 176.0, 190.0, 165.0, 172.0, 177.0, 200.0, 150.0, 179.0];
        let features = extract_features(&window_from(&samples));
        let reference = naive_dft(&samples);

        for (k, (re, im)) in features.spectrum().enumerate() {
            assert!((re - reference[k].0).abs() < 1e-9, "re mismatch at bin {k}");
            assert!((im - reference[k].1).abs() < 1e-9, "im mismatch at bin {k}");
        }
    }

    #[test]
    fn test_nyquist_bin_is_dropped() {
        // Alternating signal puts all its non-DC energy in the Nyquist bin.
        let samples = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let features = extract_features(&window_from(&samples));
        assert_eq!(features.len(), 8);
        for (re, im) in features.spectrum() {
            assert!(re.abs() < 1e-12);
            assert!(im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_extractor_is_deterministic() {
        let window = window_from(&[10.0, 12.0, 9.0, 11.0, 30.0, 8.0, 10.0, 10.0, 12.0, 11.0]);
        let extractor = FeatureExtractor::new(10);
        assert_eq!(extractor.extract(&window), extractor.extract(&window));
        assert_eq!(extractor.extract(&window), extract_features(&window));
    }

    #[test]
    #[should_panic(expected = "window length does not match extractor")]
    fn test_extractor_rejects_other_window_length() {
        let extractor = FeatureExtractor::new(10);
        extractor.extract(&SampleWindow::new(8, 177.0));
    }

    #[test]
    fn test_column_names_are_positional() {
        assert_eq!(column_names(3), vec!["0", "1", "2"]);
    }
}
