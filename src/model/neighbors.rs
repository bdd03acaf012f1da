//! Brute-force nearest neighbour search shared by the fitted models.

use super::ModelError;

/// Euclidean distance between two equally sized points.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// The `k` fit points closest to `query` as `(index, distance)`.
///
/// Equal distances keep fit order.
pub fn nearest(points: &[Vec<f64>], query: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut distances: Vec<(usize, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, euclidean(p, query)))
        .collect();
    distances.sort_by(|a, b| a.1.total_cmp(&b.1));
    distances.truncate(k);
    distances
}

/// Check that a fit set is non-empty and rectangular; returns its width.
pub fn check_fit_points(points: &[Vec<f64>], model: &str) -> Result<usize, ModelError> {
    let dim = match points.first() {
        Some(first) => first.len(),
        None => return Err(ModelError::Invalid(format!("{model} has no fit points"))),
    };
    if let Some(bad) = points.iter().position(|p| p.len() != dim) {
        return Err(ModelError::Invalid(format!(
            "{model} fit point {bad} has {} values, expected {dim}",
            points[bad].len()
        )));
    }
    Ok(dim)
}
