// Pair Ranking
// Most-similar pair listing, unordered pair lookup and heat-map cell resolution

use crate::models::{ComparisonRecord, RankedPair, SeverityThresholds};
use super::registry::EntityRegistry;

/// The `limit` most similar comparisons, highest score first.
/// Equal scores keep their report order.
pub fn top_pairs(
    comparisons: &[ComparisonRecord],
    limit: usize,
    thresholds: &SeverityThresholds,
) -> Vec<RankedPair> {
    let mut ranked: Vec<&ComparisonRecord> = comparisons.iter().collect();
    ranked.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|record| RankedPair {
            participant_a: record.participant_a.clone(),
            participant_b: record.participant_b.clone(),
            similarity_score: record.similarity_score,
            severity: thresholds.classify(record.similarity_score),
            segment_count: record.matching_segments.len(),
        })
        .collect()
}

/// First comparison covering `{a, b}` in either orientation.
pub fn find_comparison<'a>(
    comparisons: &'a [ComparisonRecord],
    a: &str,
    b: &str,
) -> Option<&'a ComparisonRecord> {
    comparisons.iter().find(|record| record.is_pair(a, b))
}

/// Comparison behind heat-map cell `(i, j)`. Diagonal cells have none.
pub fn pair_for_cell<'a>(
    comparisons: &'a [ComparisonRecord],
    registry: &EntityRegistry,
    i: usize,
    j: usize,
) -> Option<&'a ComparisonRecord> {
    if i == j {
        return None;
    }
    let a = registry.name_of(i)?;
    let b = registry.name_of(j)?;
    find_comparison(comparisons, a, b)
}
