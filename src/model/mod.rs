//! Pre-trained models consumed by the indicator loop.
//!
//! The loop only depends on the [`Predictor`] capability. Concrete models
//! are loaded once at startup from JSON artifacts and never change after.

pub mod knn;
pub mod lof;
pub mod neighbors;
pub mod scaler;

pub use knn::KNeighborsClassifier;
pub use lof::LocalOutlierFactor;
pub use scaler::StandardScaler;

use crate::core::{ClassLabel, ClassificationResult, FeatureVector, OutlierFlag};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Anything that maps a standardized feature vector to a label.
pub trait Predictor {
    type Label;

    fn predict(&self, features: &[f64]) -> Self::Label;

    /// Expected input width, when the model knows it.
    fn input_dim(&self) -> Option<usize> {
        None
    }
}

/// Locations of the three model artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPaths {
    pub scaler: PathBuf,
    pub outlier: PathBuf,
    pub classifier: PathBuf,
}

impl ModelPaths {
    /// Standard artifact names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            scaler: dir.join("scaler.json"),
            outlier: dir.join("outlier_model.json"),
            classifier: dir.join("class_model.json"),
        }
    }
}

/// Scaler followed by the outlier model and the class model.
pub struct ClassifierEnsemble<O, C> {
    scaler: StandardScaler,
    outlier: O,
    classifier: C,
}

/// Ensemble built from the JSON artifacts.
pub type FittedEnsemble = ClassifierEnsemble<LocalOutlierFactor, KNeighborsClassifier>;

impl<O, C> ClassifierEnsemble<O, C>
where
    O: Predictor<Label = OutlierFlag>,
    C: Predictor<Label = ClassLabel>,
{
    pub fn new(scaler: StandardScaler, outlier: O, classifier: C) -> Self {
        Self {
            scaler,
            outlier,
            classifier,
        }
    }

    /// Standardize once, then ask both models.
    pub fn classify(&self, features: &FeatureVector) -> ClassificationResult {
        let scaled = self.scaler.transform(features.as_slice());
        ClassificationResult::new(self.outlier.predict(&scaled), self.classifier.predict(&scaled))
    }

    /// Fail unless every component accepts vectors of `feature_len`.
    pub fn check_dimensions(&self, feature_len: usize) -> Result<(), ModelError> {
        let dims = [
            ("scaler", Some(self.scaler.dim())),
            ("outlier model", self.outlier.input_dim()),
            ("class model", self.classifier.input_dim()),
        ];
        for (artifact, dim) in dims {
            if let Some(actual) = dim {
                if actual != feature_len {
                    return Err(ModelError::DimensionMismatch {
                        artifact: artifact.to_string(),
                        expected: feature_len,
                        actual,
                    });
                }
            }
        }
        Ok(())
    }
}

impl FittedEnsemble {
    /// Load all three artifacts and check they fit `feature_len`.
    pub fn load(paths: &ModelPaths, feature_len: usize) -> Result<Self, ModelError> {
        let scaler = StandardScaler::load(&paths.scaler)?;
        let outlier = LocalOutlierFactor::load(&paths.outlier)?;
        let classifier = KNeighborsClassifier::load(&paths.classifier)?;

        let ensemble = Self::new(scaler, outlier, classifier);
        ensemble.check_dimensions(feature_len)?;
        Ok(ensemble)
    }
}

/// Read and parse one JSON artifact.
pub(crate) fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ModelError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&content).map_err(|e| ModelError::Parse(format!("{}: {e}", path.display())))
}

/// Model loading errors.
#[derive(Debug)]
pub enum ModelError {
    Io(String),
    Parse(String),
    Invalid(String),
    DimensionMismatch {
        artifact: String,
        expected: usize,
        actual: usize,
    },
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::Io(e) => write!(f, "Could not read model artifact: {e}"),
            ModelError::Parse(e) => write!(f, "Corrupt model artifact: {e}"),
            ModelError::Invalid(e) => write!(f, "Invalid model artifact: {e}"),
            ModelError::DimensionMismatch {
                artifact,
                expected,
                actual,
            } => write!(
                f,
                "{artifact} expects {actual} features but the window produces {expected}"
            ),
        }
    }
}

impl std::error::Error for ModelError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{extract_features, SampleWindow};

    struct Always<L>(L);

    impl<L: Copy> Predictor for Always<L> {
        type Label = L;

        fn predict(&self, _features: &[f64]) -> L {
            self.0
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("anomaly-indicator-{name}-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_ensemble_combines_predictions() {
        let ensemble = ClassifierEnsemble::new(
            StandardScaler::identity(12),
            Always(OutlierFlag::Outlier),
            Always(ClassLabel::Class1),
        );
        let features = extract_features(&SampleWindow::default());
        let result = ensemble.classify(&features);
        assert_eq!(result.outlier, OutlierFlag::Outlier);
        assert_eq!(result.class, ClassLabel::Class1);
    }

    #[test]
    fn test_dimension_mismatch_detected() {
        let ensemble = ClassifierEnsemble::new(
            StandardScaler::identity(8),
            Always(OutlierFlag::Inlier),
            Always(ClassLabel::Class0),
        );
        let err = ensemble.check_dimensions(12).unwrap_err();
        assert!(matches!(
            err,
            ModelError::DimensionMismatch {
                expected: 12,
                actual: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_artifact_is_io_error() {
        let dir = temp_dir("missing");
        let err = FittedEnsemble::load(&ModelPaths::in_dir(&dir), 12).err().unwrap();
        assert!(matches!(err, ModelError::Io(_)));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_corrupt_artifact_is_parse_error() {
        let dir = temp_dir("corrupt");
        let paths = ModelPaths::in_dir(&dir);
        std::fs::write(&paths.scaler, "not json").unwrap();
        let err = FittedEnsemble::load(&paths, 12).err().unwrap();
        assert!(matches!(err, ModelError::Parse(_)));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_load_fitted_artifacts() {
        let dir = temp_dir("fitted");
        let paths = ModelPaths::in_dir(&dir);

        // A two-sample window yields four features: mean, std and one bin.
        let scaler = StandardScaler::identity(4);
        let outlier = serde_json::json!({
            "n_neighbors": 1,
            "fit_points": [[0.0, 0.0, 0.0, 0.0], [1.0, 1.0, 1.0, 1.0]],
            "k_distances": [2.0, 2.0],
            "lrd": [0.5, 0.5],
            "offset": -1.5
        });
        let classifier = serde_json::json!({
            "n_neighbors": 1,
            "fit_points": [[0.0, 0.0, 0.0, 0.0], [1.0, 1.0, 1.0, 1.0]],
            "labels": [0, 1]
        });
        std::fs::write(&paths.scaler, serde_json::to_string(&scaler).unwrap()).unwrap();
        std::fs::write(&paths.outlier, outlier.to_string()).unwrap();
        std::fs::write(&paths.classifier, classifier.to_string()).unwrap();

        let ensemble = FittedEnsemble::load(&paths, 4).unwrap();
        let features = extract_features(&SampleWindow::new(2, 0.0));
        let result = ensemble.classify(&features);
        assert_eq!(result.class, ClassLabel::Class0);
        assert_eq!(result.outlier, OutlierFlag::Inlier);

        assert!(matches!(
            FittedEnsemble::load(&paths, 12),
            Err(ModelError::DimensionMismatch { .. })
        ));
        let _ = std::fs::remove_dir_all(dir);
    }
}
