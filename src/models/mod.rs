// PlagiView Data Models
// Wire formats consumed from the report service, and the plain values handed to visualization

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============ Report Wire Format ============

/// Plagiarism report as returned by `/api/assignments/{id}/plagiarism-report/`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlagiarismReport {
    #[serde(default)]
    pub assignment_title: String,
    #[serde(default)]
    pub total_submissions: i64,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub check_date: Option<String>,
    #[serde(default)]
    pub comparisons: Vec<ComparisonRecord>,
}

impl PlagiarismReport {
    pub fn deadline_utc(&self) -> Option<DateTime<Utc>> {
        self.deadline.as_deref().and_then(parse_timestamp)
    }

    pub fn check_date_utc(&self) -> Option<DateTime<Utc>> {
        self.check_date.as_deref().and_then(parse_timestamp)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// One computed similarity result between two participants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonRecord {
    #[serde(rename = "student1")]
    pub participant_a: String,
    #[serde(rename = "student2")]
    pub participant_b: String,
    pub similarity_score: f64,
    #[serde(default)]
    pub matching_segments: Vec<MatchingSegment>,
}

impl ComparisonRecord {
    /// True when this record covers the unordered pair `{a, b}`.
    pub fn is_pair(&self, a: &str, b: &str) -> bool {
        (self.participant_a == a && self.participant_b == b)
            || (self.participant_a == b && self.participant_b == a)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchingSegment {
    /// `[start, length]` in participant A's document, in chars.
    pub source_position: (i64, i64),
    /// `[start, length]` in participant B's document, in chars.
    pub target_position: (i64, i64),
    #[serde(default)]
    pub text: String,
}

impl MatchingSegment {
    pub fn source_span(&self) -> SegmentSpan {
        SegmentSpan::from_position(self.source_position)
    }

    pub fn target_span(&self) -> SegmentSpan {
        SegmentSpan::from_position(self.target_position)
    }
}

/// Char-offset span into a raw document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SegmentSpan {
    pub start: usize,
    pub length: usize,
}

impl SegmentSpan {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Negative wire values are clamped to zero.
    pub fn from_position((start, length): (i64, i64)) -> Self {
        Self {
            start: start.max(0) as usize,
            length: length.max(0) as usize,
        }
    }

    pub fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }
}

/// Full document texts as returned by `/api/assignments/{id}/document-comparison/`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocumentPair {
    #[serde(default)]
    pub document1: Option<String>,
    #[serde(default)]
    pub document2: Option<String>,
}

// ============ Analytics Output ============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRun {
    pub text: String,
    pub is_match: bool,
    /// Index into the comparison's original (unsorted) segment list.
    pub segment_index: Option<usize>,
}

impl HighlightRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_match: false,
            segment_index: None,
        }
    }

    pub fn matched(text: impl Into<String>, segment_index: usize) -> Self {
        Self {
            text: text.into(),
            is_match: true,
            segment_index: Some(segment_index),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NavigatorState {
    pub current_match_index: usize,
    pub total_matches: usize,
}

/// How a run should be styled given the navigator's current match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    None,
    Match,
    Current,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

/// Scores strictly above `high` are high severity, strictly above `moderate` moderate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeverityThresholds {
    #[serde(default = "default_high")]
    pub high: f64,
    #[serde(default = "default_moderate")]
    pub moderate: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            high: 70.0,
            moderate: 40.0,
        }
    }
}

impl SeverityThresholds {
    pub fn classify(&self, score: f64) -> Severity {
        if score > self.high {
            Severity::High
        } else if score > self.moderate {
            Severity::Moderate
        } else {
            Severity::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedPair {
    pub participant_a: String,
    pub participant_b: String,
    pub similarity_score: f64,
    pub severity: Severity,
    pub segment_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOutlier {
    pub index: usize,
    pub name: String,
    pub score: f64,
}

/// Five-number summary of aggregate scores, whiskers capped to the IQR fences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistributionStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    pub outliers: Vec<ScoreOutlier>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub assignment_title: String,
    pub total_submissions: i64,
    pub deadline: Option<DateTime<Utc>>,
    pub check_date: Option<DateTime<Utc>>,
}

impl From<&PlagiarismReport> for ReportSummary {
    fn from(report: &PlagiarismReport) -> Self {
        Self {
            assignment_title: report.assignment_title.clone(),
            total_submissions: report.total_submissions,
            deadline: report.deadline_utc(),
            check_date: report.check_date_utc(),
        }
    }
}

fn default_high() -> f64 { 70.0 }
fn default_moderate() -> f64 { 40.0 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_wire_format() {
        let json = r#"{
            "assignment_title": "Essay 1",
            "total_submissions": 3,
            "deadline": "2024-03-01T23:59:00Z",
            "check_date": "2024-03-02T10:15:30.123456+02:00",
            "comparisons": [
                {
                    "student1": "Ana Diaz",
                    "student2": "Ben Ode",
                    "similarity_score": 42.5,
                    "matching_segments": [
                        {"source_position": [4, 10], "target_position": [0, 10], "text": "quick fox"}
                    ]
                },
                {"student1": "Ana Diaz", "student2": "Cy Poe", "similarity_score": 3.0}
            ]
        }"#;

        let report: PlagiarismReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.comparisons.len(), 2);
        assert_eq!(report.comparisons[0].participant_a, "Ana Diaz");
        assert_eq!(report.comparisons[0].matching_segments[0].source_span(), SegmentSpan::new(4, 10));
        assert!(report.comparisons[1].matching_segments.is_empty());
        assert!(report.deadline_utc().is_some());
        assert_eq!(
            report.check_date_utc().unwrap().to_rfc3339(),
            "2024-03-02T08:15:30.123456+00:00"
        );
    }

    #[test]
    fn test_negative_positions_clamp() {
        let span = SegmentSpan::from_position((-3, -1));
        assert_eq!(span, SegmentSpan::new(0, 0));
    }

    #[test]
    fn test_unparseable_timestamp_is_none() {
        let report = PlagiarismReport {
            deadline: Some("next tuesday".to_string()),
            ..Default::default()
        };
        assert!(report.deadline_utc().is_none());
    }

    #[test]
    fn test_severity_bands() {
        let thresholds = SeverityThresholds::default();
        assert_eq!(thresholds.classify(71.0), Severity::High);
        assert_eq!(thresholds.classify(70.0), Severity::Moderate);
        assert_eq!(thresholds.classify(41.0), Severity::Moderate);
        assert_eq!(thresholds.classify(40.0), Severity::Low);
    }

    #[test]
    fn test_is_pair_unordered() {
        let record = ComparisonRecord {
            participant_a: "a".to_string(),
            participant_b: "b".to_string(),
            similarity_score: 1.0,
            matching_segments: vec![],
        };
        assert!(record.is_pair("b", "a"));
        assert!(!record.is_pair("a", "c"));
    }
}
