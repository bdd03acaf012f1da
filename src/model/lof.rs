//! Local outlier factor in novelty mode.
//!
//! The artifact carries everything computed at fit time: the fit points,
//! each point's k-distance and local reachability density, and the
//! decision offset. Scoring a new point only needs a neighbour search.

use super::neighbors::{check_fit_points, nearest};
use super::{read_artifact, ModelError, Predictor};
use crate::core::OutlierFlag;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Guards the reachability density against a zero mean distance.
const LRD_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalOutlierFactor {
    pub n_neighbors: usize,
    pub fit_points: Vec<Vec<f64>>,
    /// Distance from each fit point to its k-th neighbour
    pub k_distances: Vec<f64>,
    /// Local reachability density of each fit point
    pub lrd: Vec<f64>,
    /// Decision threshold subtracted from the score
    pub offset: f64,
}

impl LocalOutlierFactor {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let model: LocalOutlierFactor = read_artifact(path)?;
        model.validate()?;
        Ok(model)
    }

    /// Width of the vectors this model accepts.
    pub fn dim(&self) -> usize {
        self.fit_points.first().map_or(0, Vec::len)
    }

    /// Negated local outlier factor; lower means more abnormal.
    pub fn score(&self, features: &[f64]) -> f64 {
        let neighbors = nearest(&self.fit_points, features, self.n_neighbors);
        let k = neighbors.len() as f64;

        let mean_reach = neighbors
            .iter()
            .map(|&(i, dist)| dist.max(self.k_distances[i]))
            .sum::<f64>()
            / k;
        let lrd = 1.0 / (mean_reach + LRD_EPSILON);

        let ratio_sum: f64 = neighbors.iter().map(|&(i, _)| self.lrd[i] / lrd).sum();
        -(ratio_sum / k)
    }

    /// Score shifted by the fitted offset; negative means outlier.
    pub fn decision(&self, features: &[f64]) -> f64 {
        self.score(features) - self.offset
    }

    fn validate(&self) -> Result<(), ModelError> {
        let n = self.fit_points.len();
        check_fit_points(&self.fit_points, "outlier model")?;
        if self.n_neighbors == 0 || self.n_neighbors > n {
            return Err(ModelError::Invalid(format!(
                "outlier model n_neighbors {} outside 1..={n}",
                self.n_neighbors
            )));
        }
        if self.k_distances.len() != n || self.lrd.len() != n {
            return Err(ModelError::Invalid(format!(
                "outlier model has {n} fit points but {} k-distances and {} densities",
                self.k_distances.len(),
                self.lrd.len()
            )));
        }
        Ok(())
    }
}

impl Predictor for LocalOutlierFactor {
    type Label = OutlierFlag;

    fn predict(&self, features: &[f64]) -> OutlierFlag {
        if self.decision(features) < 0.0 {
            OutlierFlag::Outlier
        } else {
            OutlierFlag::Inlier
        }
    }

    fn input_dim(&self) -> Option<usize> {
        Some(self.dim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Four points on a unit square, k = 2.
    ///
    /// Every point's two nearest neighbours sit at distance 1, so all
    /// k-distances are 1 and all densities are 1 / (1 + eps).
    fn square_model() -> LocalOutlierFactor {
        let lrd = 1.0 / (1.0 + LRD_EPSILON);
        LocalOutlierFactor {
            n_neighbors: 2,
            fit_points: vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, 1.0],
            ],
            k_distances: vec![1.0; 4],
            lrd: vec![lrd; 4],
            offset: -1.5,
        }
    }

    #[test]
    fn test_point_inside_cluster_is_inlier() {
        let model = square_model();
        let score = model.score(&[0.5, 0.5]);
        assert!((score + 1.0).abs() < 1e-6);
        assert_eq!(model.predict(&[0.5, 0.5]), OutlierFlag::Inlier);
    }

    #[test]
    fn test_far_point_is_outlier() {
        let model = square_model();
        assert!(model.score(&[10.0, 10.0]) < -5.0);
        assert_eq!(model.predict(&[10.0, 10.0]), OutlierFlag::Outlier);
    }

    #[test]
    fn test_invalid_neighbor_count_rejected() {
        let mut model = square_model();
        model.n_neighbors = 9;
        assert!(model.validate().is_err());
        model.n_neighbors = 0;
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_density_length_checked() {
        let mut model = square_model();
        model.lrd.pop();
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_input_dim() {
        assert_eq!(square_model().input_dim(), Some(2));
    }
}
