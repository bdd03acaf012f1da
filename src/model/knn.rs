//! k-nearest-neighbours classifier with uniform weights.

use super::neighbors::{check_fit_points, nearest};
use super::{read_artifact, ModelError, Predictor};
use crate::core::ClassLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNeighborsClassifier {
    pub n_neighbors: usize,
    pub fit_points: Vec<Vec<f64>>,
    pub labels: Vec<i64>,
}

impl KNeighborsClassifier {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let model: KNeighborsClassifier = read_artifact(path)?;
        model.validate()?;
        Ok(model)
    }

    pub fn dim(&self) -> usize {
        self.fit_points.first().map_or(0, Vec::len)
    }

    /// Majority label among the nearest fit points.
    ///
    /// Ties go to the smallest label.
    pub fn vote(&self, features: &[f64]) -> i64 {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for (i, _) in nearest(&self.fit_points, features, self.n_neighbors) {
            *counts.entry(self.labels[i]).or_default() += 1;
        }

        let mut best: Option<(i64, usize)> = None;
        for (label, count) in counts {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((label, count));
            }
        }
        best.map_or(0, |(label, _)| label)
    }

    fn validate(&self) -> Result<(), ModelError> {
        let n = self.fit_points.len();
        check_fit_points(&self.fit_points, "class model")?;
        if self.labels.len() != n {
            return Err(ModelError::Invalid(format!(
                "class model has {n} fit points but {} labels",
                self.labels.len()
            )));
        }
        if self.n_neighbors == 0 || self.n_neighbors > n {
            return Err(ModelError::Invalid(format!(
                "class model n_neighbors {} outside 1..={n}",
                self.n_neighbors
            )));
        }
        Ok(())
    }
}

impl Predictor for KNeighborsClassifier {
    type Label = ClassLabel;

    fn predict(&self, features: &[f64]) -> ClassLabel {
        ClassLabel::from_raw(self.vote(features))
    }

    fn input_dim(&self) -> Option<usize> {
        Some(self.dim())
    }
}
