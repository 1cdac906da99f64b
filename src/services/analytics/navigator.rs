// Match Navigator
// Cyclic "current match" state shared by the source and target highlighted views

use serde::{Deserialize, Serialize};

use crate::models::{Emphasis, HighlightRun, NavigatorState};
use super::highlighter::HighlightedDocument;

/// Which matching segment is current. Inert when there are no matches:
/// every transition is then a no-op and `current()` is `None`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MatchNavigator {
    #[serde(rename = "currentMatchIndex")]
    current: Option<usize>,
    #[serde(rename = "totalMatches")]
    total: usize,
}

impl MatchNavigator {
    pub fn initialize(total_matches: usize) -> Self {
        Self {
            current: (total_matches > 0).then_some(0),
            total: total_matches,
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn state(&self) -> Option<NavigatorState> {
        self.current.map(|current_match_index| NavigatorState {
            current_match_index,
            total_matches: self.total,
        })
    }

    pub fn next(&mut self) -> Option<usize> {
        if let Some(current) = self.current {
            self.current = Some((current + 1) % self.total);
        }
        self.current
    }

    pub fn previous(&mut self) -> Option<usize> {
        if let Some(current) = self.current {
            self.current = Some((current + self.total - 1) % self.total);
        }
        self.current
    }

    /// Jump straight to `index`. Out-of-range requests are ignored.
    pub fn select_explicit(&mut self, index: usize) -> Option<usize> {
        if self.is_active() && index < self.total {
            self.current = Some(index);
        }
        self.current
    }

    /// Select the segment behind a clicked run; plain runs are ignored.
    pub fn select_run(&mut self, run: &HighlightRun) -> Option<usize> {
        match run.segment_index {
            Some(index) if run.is_match => self.select_explicit(index),
            _ => self.current,
        }
    }

    pub fn emphasis(&self, run: &HighlightRun) -> Emphasis {
        if !run.is_match {
            return Emphasis::None;
        }
        match (run.segment_index, self.current) {
            (Some(index), Some(current)) if index == current => Emphasis::Current,
            _ => Emphasis::Match,
        }
    }

    /// Emphasis for every run of `document`. A run that swallowed the current
    /// segment during overlap clipping is emphasized as current too.
    pub fn emphasis_for(&self, document: &HighlightedDocument) -> Vec<Emphasis> {
        let anchored = self.current.and_then(|c| document.run_for_segment(c));
        document
            .runs
            .iter()
            .enumerate()
            .map(|(i, run)| {
                if run.is_match && anchored == Some(i) {
                    Emphasis::Current
                } else {
                    self.emphasis(run)
                }
            })
            .collect()
    }
}
