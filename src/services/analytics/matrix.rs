// Matrix Builder
// Dense symmetric similarity matrix from a sparse comparison list

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::models::ComparisonRecord;
use super::error::AnalyticsError;
use super::registry::EntityRegistry;

/// Score on the diagonal: every participant is identical to itself.
pub const SELF_SIMILARITY: f64 = 100.0;

/// N x N similarity table, serialized as a plain array of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.rows.get(i).and_then(|row| row.get(j)).copied()
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        self.rows.get(i).map(|row| row.as_slice())
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.size();
        (0..n).all(|i| (i + 1..n).all(|j| self.rows[i][j] == self.rows[j][i]))
    }
}

/// Build the matrix for a fully populated registry.
///
/// Every participant index is resolved before anything is allocated, so an
/// unknown name fails the whole build. A pair listed twice keeps the later score.
pub fn build_matrix(
    comparisons: &[ComparisonRecord],
    registry: &EntityRegistry,
) -> Result<SimilarityMatrix, AnalyticsError> {
    let mut cells: Vec<(usize, usize, f64)> = Vec::with_capacity(comparisons.len());
    for record in comparisons {
        let i = resolve(registry, &record.participant_a)?;
        let j = resolve(registry, &record.participant_b)?;
        cells.push((i, j, record.similarity_score));
    }

    let n = registry.len();
    let mut rows = vec![vec![0.0; n]; n];
    let mut written = vec![vec![false; n]; n];

    for (i, j, score) in cells {
        if written[i][j] {
            debug!(
                "[MATRIX] duplicate comparison {} <-> {}: {} overwritten by {}",
                i, j, rows[i][j], score
            );
        }
        rows[i][j] = score;
        rows[j][i] = score;
        written[i][j] = true;
        written[j][i] = true;
    }

    for (i, row) in rows.iter_mut().enumerate() {
        row[i] = SELF_SIMILARITY;
    }

    debug!(size = n, comparisons = comparisons.len(), "[MATRIX] built");
    Ok(SimilarityMatrix { rows })
}

fn resolve(registry: &EntityRegistry, name: &str) -> Result<usize, AnalyticsError> {
    registry.index_of(name).ok_or_else(|| {
        error!("[MATRIX] comparison references unregistered participant '{}'", name);
        AnalyticsError::unknown_entity(name)
    })
}
