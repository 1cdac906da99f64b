// PlagiView Core Services

pub mod text_processor;
pub mod config_store;
pub mod report_client;
pub mod analytics;
pub mod session;

pub use text_processor::*;
pub use config_store::*;
pub use report_client::*;
pub use session::*;

pub use analytics::{
    analyze_fetch_result,
    analyze_report,
    build_matrix,
    aggregate_scores,
    highlight,
    highlight_document,
    load_comparison,
    open_comparison,
    score_distribution,
    top_pairs,
    AnalyticsError,
    AnalyticsView,
    ComparisonDetail,
    EntityRegistry,
    HighlightedDocument,
    MatchNavigator,
    SimilarityMatrix,
};
