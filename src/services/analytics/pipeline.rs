// Analytics Pipeline
// Report -> registry -> matrix -> scores -> view; selected pair + documents -> comparison detail
//
// Everything here is synchronous except `load_comparison`, which only awaits
// the document fetch before handing off to the pure functions.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::models::{
    ComparisonRecord, DistributionStats, DocumentPair, Emphasis, Entity, MatchingSegment,
    PlagiarismReport, RankedPair, ReportSummary, SegmentSpan, Severity,
};
use crate::services::config_store::AnalyticsConfig;
use crate::services::report_client::{ClientError, ReportClient};

use super::aggregation::{aggregate_scores, score_distribution};
use super::error::AnalyticsError;
use super::highlighter::{highlight_document, HighlightedDocument};
use super::matrix::{build_matrix, SimilarityMatrix};
use super::navigator::MatchNavigator;
use super::ranking::{find_comparison, pair_for_cell, top_pairs};
use super::registry::EntityRegistry;

/// Everything the heat-map, distribution and ranking views need for one report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsView {
    pub summary: ReportSummary,
    pub entities: Vec<Entity>,
    pub matrix: SimilarityMatrix,
    /// Aggregate score per entity index.
    pub scores: Vec<f64>,
    pub top_pairs: Vec<RankedPair>,
    pub distribution: Option<DistributionStats>,
    pub data_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<String>,
    #[serde(skip)]
    comparisons: Vec<ComparisonRecord>,
    #[serde(skip)]
    registry: EntityRegistry,
}

impl AnalyticsView {
    /// Empty-state view: zero entities, 0 x 0 matrix.
    pub fn unavailable(summary: ReportSummary, reason: &AnalyticsError) -> Self {
        Self {
            summary,
            entities: Vec::new(),
            matrix: SimilarityMatrix::empty(),
            scores: Vec::new(),
            top_pairs: Vec::new(),
            distribution: None,
            data_available: false,
            unavailable_reason: Some(reason.to_string()),
            comparisons: Vec::new(),
            registry: EntityRegistry::new(),
        }
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn comparisons(&self) -> &[ComparisonRecord] {
        &self.comparisons
    }

    pub fn score_of(&self, name: &str) -> Option<f64> {
        self.registry
            .index_of(name)
            .and_then(|i| self.scores.get(i))
            .copied()
    }

    /// Entities with their aggregate score, most similar to the cohort first.
    pub fn ranked_entities(&self) -> Vec<(&Entity, f64)> {
        let mut ranked: Vec<(&Entity, f64)> = self
            .entities
            .iter()
            .zip(self.scores.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    /// Comparison behind a heat-map cell click.
    pub fn comparison_for_cell(&self, i: usize, j: usize) -> Option<&ComparisonRecord> {
        pair_for_cell(&self.comparisons, &self.registry, i, j)
    }

    pub fn comparison_for_pair(&self, a: &str, b: &str) -> Option<&ComparisonRecord> {
        find_comparison(&self.comparisons, a, b)
    }
}

/// Build the analytics view for one report.
///
/// A report without comparisons is the empty state, not an error. An
/// inconsistent report (unknown participant) fails without a partial view.
pub fn analyze_report(
    report: &PlagiarismReport,
    config: &AnalyticsConfig,
) -> Result<AnalyticsView, AnalyticsError> {
    let summary = ReportSummary::from(report);
    if report.comparisons.is_empty() {
        let reason = AnalyticsError::DataUnavailable("report has no comparisons".to_string());
        info!("[PIPELINE] {}", reason);
        return Ok(AnalyticsView::unavailable(summary, &reason));
    }

    let registry = EntityRegistry::from_comparisons(&report.comparisons);
    let matrix = build_matrix(&report.comparisons, &registry).map_err(|e| {
        error!("[PIPELINE] matrix construction failed: {}", e);
        e
    })?;
    let scores = aggregate_scores(&matrix);
    let entities = registry.entities().to_vec();
    let distribution = score_distribution(&entities, &scores);
    let top = top_pairs(&report.comparisons, config.top_pairs, &config.severity);

    info!(
        "[PIPELINE] '{}': {} entities, {} comparisons",
        summary.assignment_title,
        entities.len(),
        report.comparisons.len()
    );

    Ok(AnalyticsView {
        summary,
        entities,
        matrix,
        scores,
        top_pairs: top,
        distribution,
        data_available: true,
        unavailable_reason: None,
        comparisons: report.comparisons.clone(),
        registry,
    })
}

/// Like [`analyze_report`], with a failed fetch degraded to the empty state.
pub fn analyze_fetch_result(
    fetched: Result<PlagiarismReport, ClientError>,
    config: &AnalyticsConfig,
) -> Result<AnalyticsView, AnalyticsError> {
    match fetched {
        Ok(report) => analyze_report(&report, config),
        Err(e) => {
            let reason = AnalyticsError::DataUnavailable(e.to_string());
            warn!("[PIPELINE] {}", reason);
            Ok(AnalyticsView::unavailable(ReportSummary::default(), &reason))
        }
    }
}

/// Side-by-side inspection state for one selected pair.
///
/// `source` is participant A's document, `target` participant B's; one
/// navigator drives emphasis in both.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonDetail {
    pub participant_a: String,
    pub participant_b: String,
    pub similarity_score: f64,
    pub severity: Severity,
    pub segments: Vec<MatchingSegment>,
    pub source: HighlightedDocument,
    pub target: HighlightedDocument,
    pub navigator: MatchNavigator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_error: Option<String>,
}

impl ComparisonDetail {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn current_segment(&self) -> Option<&MatchingSegment> {
        self.navigator.current().and_then(|i| self.segments.get(i))
    }

    pub fn next(&mut self) -> Option<usize> {
        self.navigator.next()
    }

    pub fn previous(&mut self) -> Option<usize> {
        self.navigator.previous()
    }

    pub fn select(&mut self, segment_index: usize) -> Option<usize> {
        self.navigator.select_explicit(segment_index)
    }

    /// Click on run `run_index` of the source (`true`) or target document.
    pub fn select_run(&mut self, in_source: bool, run_index: usize) -> Option<usize> {
        let document = if in_source { &self.source } else { &self.target };
        match document.runs.get(run_index) {
            Some(run) => self.navigator.select_run(run),
            None => self.navigator.current(),
        }
    }

    pub fn source_emphasis(&self) -> Vec<Emphasis> {
        self.navigator.emphasis_for(&self.source)
    }

    pub fn target_emphasis(&self) -> Vec<Emphasis> {
        self.navigator.emphasis_for(&self.target)
    }
}

/// Highlight both documents of `record` and start a navigator over its segments.
///
/// A failed or partial document fetch degrades to the placeholder text for
/// the missing side; it never fails the detail view.
pub fn open_comparison(
    record: &ComparisonRecord,
    documents: Result<DocumentPair, ClientError>,
    config: &AnalyticsConfig,
) -> ComparisonDetail {
    let (documents, mut document_error) = match documents {
        Ok(docs) => (docs, None),
        Err(e) => {
            let reason = AnalyticsError::DocumentUnavailable(e.to_string());
            warn!("[PIPELINE] {}", reason);
            (DocumentPair::default(), Some(reason.to_string()))
        }
    };

    for (name, text) in [
        (&record.participant_a, &documents.document1),
        (&record.participant_b, &documents.document2),
    ] {
        if document_error.is_none() && text.as_deref().map_or(true, str::is_empty) {
            let reason = AnalyticsError::DocumentUnavailable(format!("no text for '{}'", name));
            warn!("[PIPELINE] {}", reason);
            document_error = Some(reason.to_string());
        }
    }

    let source_spans: Vec<SegmentSpan> = record
        .matching_segments
        .iter()
        .map(MatchingSegment::source_span)
        .collect();
    let target_spans: Vec<SegmentSpan> = record
        .matching_segments
        .iter()
        .map(MatchingSegment::target_span)
        .collect();

    let placeholder = config.placeholder_text.as_str();
    let source = highlight_document(documents.document1.as_deref(), &source_spans, placeholder);
    let target = highlight_document(documents.document2.as_deref(), &target_spans, placeholder);

    ComparisonDetail {
        participant_a: record.participant_a.clone(),
        participant_b: record.participant_b.clone(),
        similarity_score: record.similarity_score,
        severity: config.severity.classify(record.similarity_score),
        segments: record.matching_segments.clone(),
        source,
        target,
        navigator: MatchNavigator::initialize(record.matching_segments.len()),
        document_error,
    }
}

/// Fetch both texts in the record's own orientation, then open the comparison.
pub async fn load_comparison(
    client: &ReportClient,
    assignment_id: &str,
    record: &ComparisonRecord,
    config: &AnalyticsConfig,
) -> ComparisonDetail {
    let documents = client
        .fetch_documents(assignment_id, &record.participant_a, &record.participant_b)
        .await;
    open_comparison(record, documents, config)
}
