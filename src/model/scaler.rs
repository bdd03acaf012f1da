//! Pre-fitted per-feature standardization.

use super::{read_artifact, ModelError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `(x - mean) / scale`, parameters fixed at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Build a scaler, replacing zero scales with 1.0.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ModelError> {
        let mut scaler = Self { mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Identity transform of the given width.
    pub fn identity(dim: usize) -> Self {
        Self {
            mean: vec![0.0; dim],
            scale: vec![1.0; dim],
        }
    }

    /// Load a scaler artifact from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let mut scaler: StandardScaler = read_artifact(path)?;
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, features: &[f64]) -> Vec<f64> {
        debug_assert_eq!(
            features.len(),
            self.dim(),
            "feature width does not match scaler"
        );
        features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(&x, (&mean, &scale))| (x - mean) / scale)
            .collect()
    }

    fn validate(&mut self) -> Result<(), ModelError> {
        if self.mean.len() != self.scale.len() {
            return Err(ModelError::Invalid(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(ModelError::Invalid(
                "scaler parameters must be finite".to_string(),
            ));
        }
        for scale in &mut self.scale {
            if *scale == 0.0 {
                *scale = 1.0;
            }
        }
        Ok(())
    }
}
