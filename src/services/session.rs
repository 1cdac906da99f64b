// Report Session
// Holds the current analytics view and enforces last-fetch-wins across overlapping loads

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::models::PlagiarismReport;
use super::analytics::{analyze_fetch_result, AnalyticsError, AnalyticsView};
use super::config_store::AnalyticsConfig;
use super::report_client::{ClientError, ReportClient};

/// Generation number of one report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetched report replaced the current view.
    Committed,
    /// A newer request was issued while this one was in flight; its result was dropped.
    Stale,
}

pub struct ReportSession {
    config: AnalyticsConfig,
    latest: AtomicU64,
    current: RwLock<Option<(FetchTicket, AnalyticsView)>>,
}

impl ReportSession {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            latest: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    /// Issue a ticket; every earlier ticket becomes stale.
    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, ticket: FetchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Build and store the view for `ticket` unless a newer fetch has been issued.
    ///
    /// Construction errors (unknown entities) are surfaced without touching the
    /// current view.
    pub async fn commit(
        &self,
        ticket: FetchTicket,
        fetched: Result<PlagiarismReport, ClientError>,
    ) -> Result<LoadOutcome, AnalyticsError> {
        if !self.is_latest(ticket) {
            warn!(ticket = ticket.0, "[SESSION] discarding stale report fetch");
            return Ok(LoadOutcome::Stale);
        }

        let view = analyze_fetch_result(fetched, &self.config)?;

        let mut current = self.current.write().await;
        // A newer fetch may have been issued while the view was being built.
        if !self.is_latest(ticket) {
            warn!(ticket = ticket.0, "[SESSION] discarding stale report fetch");
            return Ok(LoadOutcome::Stale);
        }
        info!(
            ticket = ticket.0,
            entities = view.entities.len(),
            data_available = view.data_available,
            "[SESSION] report committed"
        );
        *current = Some((ticket, view));
        Ok(LoadOutcome::Committed)
    }

    /// Ticket, await `fetch`, commit.
    pub async fn load_with<F, Fut>(&self, fetch: F) -> Result<LoadOutcome, AnalyticsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PlagiarismReport, ClientError>>,
    {
        let ticket = self.begin_fetch();
        let fetched = fetch().await;
        self.commit(ticket, fetched).await
    }

    pub async fn load(
        &self,
        client: &ReportClient,
        assignment_id: &str,
    ) -> Result<LoadOutcome, AnalyticsError> {
        self.load_with(|| client.fetch_report(assignment_id)).await
    }

    /// Snapshot of the committed view.
    pub async fn view(&self) -> Option<AnalyticsView> {
        self.current.read().await.as_ref().map(|(_, view)| view.clone())
    }

    /// Drop the committed view and invalidate any fetch still in flight.
    pub async fn reset(&self) {
        self.begin_fetch();
        *self.current.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComparisonRecord;

    fn report(title: &str, pairs: &[(&str, &str, f64)]) -> PlagiarismReport {
        PlagiarismReport {
            assignment_title: title.to_string(),
            total_submissions: 0,
            deadline: None,
            check_date: None,
            comparisons: pairs
                .iter()
                .map(|&(a, b, s)| ComparisonRecord {
                    participant_a: a.to_string(),
                    participant_b: b.to_string(),
                    similarity_score: s,
                    matching_segments: vec![],
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_stale_fetch_is_discarded() {
        let session = ReportSession::new(AnalyticsConfig::default());
        let first = session.begin_fetch();
        let second = session.begin_fetch();

        let outcome = session
            .commit(second, Ok(report("new", &[("a", "b", 10.0)])))
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Committed);

        let outcome = session
            .commit(first, Ok(report("old", &[("x", "y", 99.0), ("y", "z", 1.0)])))
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Stale);

        let view = session.view().await.unwrap();
        assert_eq!(view.summary.assignment_title, "new");
        assert_eq!(view.entities.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_commits_empty_view() {
        let session = ReportSession::new(AnalyticsConfig::default());
        let outcome = session
            .load_with(|| async {
                Err(ClientError::Api {
                    status: 404,
                    message: "Assignment not found".to_string(),
                })
            })
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Committed);

        let view = session.view().await.unwrap();
        assert!(!view.data_available);
        assert!(view.matrix.is_empty());
        assert!(view.scores.is_empty());
    }

    #[tokio::test]
    async fn test_load_with_commits_latest() {
        let session = ReportSession::new(AnalyticsConfig::default());
        session
            .load_with(|| async { Ok(report("r1", &[("a", "b", 50.0)])) })
            .await
            .unwrap();
        let view = session.view().await.unwrap();
        assert_eq!(view.scores, vec![50.0, 50.0]);

        session.reset().await;
        assert!(session.view().await.is_none());
    }
}
