// Aggregation Logic
// Per-participant cohort scores and their distribution

use crate::models::{DistributionStats, Entity, ScoreOutlier};
use super::matrix::SimilarityMatrix;

/// Tukey fence multiplier for outlier detection.
const IQR_FENCE: f64 = 1.5;
const SCORE_FLOOR: f64 = 0.0;
const SCORE_CEIL: f64 = 100.0;

/// Mean similarity of each participant against every peer (diagonal excluded).
/// A lone participant has no peers and scores 0.
pub fn aggregate_scores(matrix: &SimilarityMatrix) -> Vec<f64> {
    let n = matrix.size();
    if n <= 1 {
        return vec![0.0; n];
    }

    matrix
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let total: f64 = row
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, score)| score)
                .sum();
            total / (n - 1) as f64
        })
        .collect()
}

/// Box-plot summary of aggregate scores.
///
/// Quartiles are picked by floor index on the sorted scores; whiskers are
/// capped to the fences, which are themselves clamped to the 0..100 range.
pub fn score_distribution(entities: &[Entity], scores: &[f64]) -> Option<DistributionStats> {
    if scores.is_empty() {
        return None;
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();

    let q1 = sorted[quantile_index(n, 0.25)];
    let median = sorted[quantile_index(n, 0.5)];
    let q3 = sorted[quantile_index(n, 0.75)];
    let iqr = q3 - q1;

    let lower_fence = (q1 - IQR_FENCE * iqr).max(SCORE_FLOOR);
    let upper_fence = (q3 + IQR_FENCE * iqr).min(SCORE_CEIL);

    let outliers = scores
        .iter()
        .enumerate()
        .filter(|(_, score)| **score < lower_fence || **score > upper_fence)
        .map(|(index, &score)| ScoreOutlier {
            index,
            name: entities
                .get(index)
                .map(|e| e.name.clone())
                .unwrap_or_default(),
            score,
        })
        .collect();

    Some(DistributionStats {
        min: sorted[0].max(lower_fence),
        q1,
        median,
        q3,
        max: sorted[n - 1].min(upper_fence),
        lower_fence,
        upper_fence,
        outliers,
    })
}

fn quantile_index(n: usize, q: f64) -> usize {
    ((n as f64 * q).floor() as usize).min(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComparisonRecord;
    use crate::services::analytics::matrix::build_matrix;
    use crate::services::analytics::registry::EntityRegistry;

    fn record(a: &str, b: &str, score: f64) -> ComparisonRecord {
        ComparisonRecord {
            participant_a: a.to_string(),
            participant_b: b.to_string(),
            similarity_score: score,
            matching_segments: vec![],
        }
    }

    fn entities(n: usize) -> Vec<Entity> {
        (0..n)
            .map(|index| Entity {
                name: format!("s{}", index),
                index,
            })
            .collect()
    }

    #[test]
    fn test_aggregate_excludes_diagonal() {
        let comparisons = vec![record("a", "b", 80.0), record("a", "c", 40.0)];
        let registry = EntityRegistry::from_comparisons(&comparisons);
        let matrix = build_matrix(&comparisons, &registry).unwrap();
        let scores = aggregate_scores(&matrix);
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0], 60.0);
        assert_eq!(scores[1], 40.0); // (80 + 0) / 2
        assert_eq!(scores[2], 20.0);
    }

    #[test]
    fn test_aggregate_single_and_empty() {
        assert!(aggregate_scores(&SimilarityMatrix::empty()).is_empty());

        let comparisons = vec![record("solo", "solo", 100.0)];
        let registry = EntityRegistry::from_comparisons(&comparisons);
        let matrix = build_matrix(&comparisons, &registry).unwrap();
        assert_eq!(aggregate_scores(&matrix), vec![0.0]);
    }

    #[test]
    fn test_distribution_quartiles() {
        let scores = vec![40.0, 10.0, 30.0, 20.0];
        let stats = score_distribution(&entities(4), &scores).unwrap();
        // sorted: 10 20 30 40 -> q1 = s[1], median = s[2], q3 = s[3]
        assert_eq!(stats.q1, 20.0);
        assert_eq!(stats.median, 30.0);
        assert_eq!(stats.q3, 40.0);
        assert_eq!(stats.lower_fence, 0.0);
        assert_eq!(stats.upper_fence, 70.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 40.0);
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_distribution_flags_outlier() {
        let scores = vec![10.0, 11.0, 12.0, 13.0, 95.0];
        let stats = score_distribution(&entities(5), &scores).unwrap();
        // q1 = 11, q3 = 13, iqr = 2 -> fences 8..16
        assert_eq!(stats.outliers.len(), 1);
        assert_eq!(stats.outliers[0].index, 4);
        assert_eq!(stats.outliers[0].name, "s4");
        assert_eq!(stats.max, 16.0);
    }

    #[test]
    fn test_distribution_empty() {
        assert!(score_distribution(&[], &[]).is_none());
    }
}
