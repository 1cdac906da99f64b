// Analytics Module
// Plagiarism report analytics organized into specialized submodules:
// - registry: participant name -> stable index
// - matrix: dense symmetric similarity matrix
// - aggregation: per-participant cohort scores and their distribution
// - highlighter: matching spans -> ordered highlight runs over a document
// - navigator: cyclic current-match state shared by both documents
// - ranking: most similar pairs, pair lookup, heat-map cell resolution
// - pipeline: report -> analytics view, pair -> comparison detail

pub mod error;
pub mod registry;
pub mod matrix;
pub mod aggregation;
pub mod highlighter;
pub mod navigator;
pub mod ranking;
pub mod pipeline;

pub use error::AnalyticsError;
pub use registry::EntityRegistry;
pub use matrix::{build_matrix, SimilarityMatrix, SELF_SIMILARITY};
pub use aggregation::{aggregate_scores, score_distribution};
pub use highlighter::{highlight, highlight_document, HighlightedDocument, DEFAULT_PLACEHOLDER};
pub use navigator::MatchNavigator;
pub use ranking::{find_comparison, pair_for_cell, top_pairs};
pub use pipeline::{
    analyze_fetch_result,
    analyze_report,
    load_comparison,
    open_comparison,
    AnalyticsView,
    ComparisonDetail,
};
