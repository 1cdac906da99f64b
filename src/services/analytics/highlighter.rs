// Segment Highlighter
// Overlays char-position spans onto a raw document as ordered, non-overlapping runs
//
// Overlap policy: spans are walked in (start, length) order behind a cursor.
// A span starting before the cursor is clipped to begin at the cursor; a span
// left with nothing after clipping emits no run but stays navigable through
// the run that subsumes it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{HighlightRun, SegmentSpan};
use crate::services::text_processor::CharIndex;

/// Shown in place of a document whose text is missing or empty.
pub const DEFAULT_PLACEHOLDER: &str = "Content not available";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HighlightedDocument {
    pub runs: Vec<HighlightRun>,
    /// `anchors[segment_index]` is the run a click or navigation step should land on.
    pub anchors: Vec<Option<usize>>,
    /// True when `runs` holds the informational placeholder instead of document text.
    pub placeholder: bool,
}

impl HighlightedDocument {
    fn placeholder(text: &str, segment_count: usize) -> Self {
        Self {
            runs: vec![HighlightRun::plain(text)],
            anchors: vec![None; segment_count],
            placeholder: true,
        }
    }

    /// Run index that displays `segment_index`, if it is visible at all.
    pub fn run_for_segment(&self, segment_index: usize) -> Option<usize> {
        self.anchors.get(segment_index).copied().flatten()
    }

    pub fn match_run_count(&self) -> usize {
        self.runs.iter().filter(|r| r.is_match).count()
    }

    /// Concatenated run texts.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Highlight runs for `full_text`, using the default placeholder when it is missing.
pub fn highlight(full_text: Option<&str>, spans: &[SegmentSpan]) -> Vec<HighlightRun> {
    highlight_document(full_text, spans, DEFAULT_PLACEHOLDER).runs
}

/// Highlight runs plus the per-segment anchor table.
pub fn highlight_document(
    full_text: Option<&str>,
    spans: &[SegmentSpan],
    placeholder: &str,
) -> HighlightedDocument {
    let text = match full_text {
        Some(t) if !t.is_empty() => t,
        _ => return HighlightedDocument::placeholder(placeholder, spans.len()),
    };

    let mut anchors: Vec<Option<usize>> = vec![None; spans.len()];
    if spans.is_empty() {
        return HighlightedDocument {
            runs: vec![HighlightRun::plain(text)],
            anchors,
            placeholder: false,
        };
    }

    let index = CharIndex::new(text);
    let len = index.len_chars();

    // Stable sort: equal (start, length) keeps the original segment order.
    let mut order: Vec<usize> = (0..spans.len()).collect();
    order.sort_by(|&a, &b| {
        spans[a]
            .start
            .cmp(&spans[b].start)
            .then(spans[a].length.cmp(&spans[b].length))
    });

    let mut runs: Vec<HighlightRun> = Vec::new();
    // (char start, char end, run index) of every emitted match run, in text order.
    let mut emitted: Vec<(usize, usize, usize)> = Vec::new();
    let mut cursor = 0usize;
    let mut clipped = 0usize;
    let mut subsumed = 0usize;

    for segment_index in order {
        let span = spans[segment_index];
        let start = span.start.min(len);
        let end = span.end().min(len);
        let run_start = start.max(cursor);

        if end <= run_start {
            if start < cursor {
                anchors[segment_index] = emitted
                    .iter()
                    .rev()
                    .find(|(s, e, _)| *s <= start && start < *e)
                    .map(|(_, _, run)| *run);
                subsumed += 1;
            }
            continue;
        }

        if start > cursor {
            runs.push(HighlightRun::plain(index.slice(text, cursor, start)));
        } else if start < cursor {
            clipped += 1;
        }

        let run = runs.len();
        runs.push(HighlightRun::matched(index.slice(text, run_start, end), segment_index));
        emitted.push((run_start, end, run));
        anchors[segment_index] = Some(run);
        cursor = end;
    }

    if cursor < len {
        runs.push(HighlightRun::plain(index.slice(text, cursor, len)));
    }

    debug!(
        spans = spans.len(),
        runs = runs.len(),
        clipped,
        subsumed,
        "[HIGHLIGHT] document highlighted"
    );

    HighlightedDocument {
        runs,
        anchors,
        placeholder: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(raw: &[(usize, usize)]) -> Vec<SegmentSpan> {
        raw.iter().map(|&(s, l)| SegmentSpan::new(s, l)).collect()
    }

    fn concat(runs: &[HighlightRun]) -> String {
        runs.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_overlap_is_clipped() {
        let runs = highlight(Some("ABCDEFGHIJ"), &spans(&[(0, 5), (3, 4)]));
        assert_eq!(
            runs,
            vec![
                HighlightRun::matched("ABCDE", 0),
                HighlightRun::matched("FG", 1),
                HighlightRun::plain("HIJ"),
            ]
        );
    }

    #[test]
    fn test_gaps_and_out_of_order_spans() {
        let text = "the quick brown fox jumps";
        let runs = highlight(Some(text), &spans(&[(16, 3), (4, 5)]));
        assert_eq!(
            runs,
            vec![
                HighlightRun::plain("the "),
                HighlightRun::matched("quick", 1),
                HighlightRun::plain(" brown "),
                HighlightRun::matched("fox", 0),
                HighlightRun::plain(" jumps"),
            ]
        );
    }

    #[test]
    fn test_tie_breaks_shorter_first() {
        let doc = highlight_document(Some("ABCDEFGHIJ"), &spans(&[(2, 6), (2, 3)]), DEFAULT_PLACEHOLDER);
        assert_eq!(doc.runs[1], HighlightRun::matched("CDE", 1));
        assert_eq!(doc.runs[2], HighlightRun::matched("FGH", 0));
    }

    #[test]
    fn test_subsumed_span_maps_to_enclosing_run() {
        let doc = highlight_document(Some("ABCDEFGHIJ"), &spans(&[(1, 8), (3, 2)]), DEFAULT_PLACEHOLDER);
        assert_eq!(doc.match_run_count(), 1);
        assert_eq!(doc.run_for_segment(0), Some(1));
        assert_eq!(doc.run_for_segment(1), Some(1));
        assert_eq!(doc.text(), "ABCDEFGHIJ");
    }

    #[test]
    fn test_zero_length_span_emits_nothing() {
        let doc = highlight_document(Some("ABCDEFGHIJ"), &spans(&[(4, 0)]), DEFAULT_PLACEHOLDER);
        assert_eq!(doc.runs, vec![HighlightRun::plain("ABCDEFGHIJ")]);
        assert_eq!(doc.run_for_segment(0), None);
    }

    #[test]
    fn test_span_past_end_is_clamped() {
        let runs = highlight(Some("ABCDE"), &spans(&[(3, 50), (9, 2)]));
        assert_eq!(
            runs,
            vec![HighlightRun::plain("ABC"), HighlightRun::matched("DE", 0)]
        );
    }

    #[test]
    fn test_no_spans_is_single_plain_run() {
        let runs = highlight(Some("plain text"), &[]);
        assert_eq!(runs, vec![HighlightRun::plain("plain text")]);
    }

    #[test]
    fn test_missing_text_yields_placeholder() {
        let doc = highlight_document(None, &spans(&[(0, 3)]), DEFAULT_PLACEHOLDER);
        assert!(doc.placeholder);
        assert_eq!(doc.runs, vec![HighlightRun::plain(DEFAULT_PLACEHOLDER)]);
        assert_eq!(doc.anchors, vec![None]);

        let runs = highlight(Some(""), &[]);
        assert_eq!(runs, vec![HighlightRun::plain(DEFAULT_PLACEHOLDER)]);
    }

    #[test]
    fn test_multibyte_text_uses_char_positions() {
        let text = "学生作业：抄袭检测";
        let runs = highlight(Some(text), &spans(&[(5, 2)]));
        assert_eq!(runs[1], HighlightRun::matched("抄袭", 0));
        assert_eq!(concat(&runs), text);
    }

    #[test]
    fn test_concatenation_invariant_over_span_sets() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.";
        let cases: Vec<Vec<(usize, usize)>> = vec![
            vec![],
            vec![(0, 56)],
            vec![(0, 100)],
            vec![(6, 5), (6, 5), (0, 3)],
            vec![(50, 10), (2, 30), (10, 4), (31, 0), (29, 3)],
            vec![(55, 1), (0, 1), (27, 1)],
            vec![(70, 4)],
        ];
        for case in cases {
            let runs = highlight(Some(text), &spans(&case));
            assert_eq!(concat(&runs), text, "spans {:?}", case);
            assert!(runs.iter().all(|r| !r.text.is_empty()), "empty run for {:?}", case);
        }
    }
}
