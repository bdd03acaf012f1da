//! Core signal pipeline.
//!
//! This module contains:
//! - The fixed-depth sample window
//! - Feature extraction (statistics plus truncated spectrum)
//! - The debounced signal state machine

pub mod features;
pub mod signal;
pub mod windowing;

// Re-export commonly used types
pub use features::{
    column_names, extract_features, feature_len, FeatureExtractor, FeatureVector,
};
pub use signal::{
    ClassLabel, ClassificationResult, Indicator, OutlierFlag, SignalState, SignalStateMachine,
};
pub use windowing::{SampleWindow, DEFAULT_BASELINE, DEFAULT_WINDOW_LEN};
