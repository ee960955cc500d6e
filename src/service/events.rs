// Event service: ingest and recency queries.
//
// Responsibilities
// - Assign `created` at ingestion time, persist the event, then advance the
//   subject counter.
// - Resolve the trailing time window for queries.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::core::event::Event;
use crate::core::ports::{EventStore, StoreError};

/// Window applied when the caller does not name one.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("subject must not be empty")]
    EmptySubject,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct EventService {
    store: Arc<dyn EventStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Stores one event and advances the subject counter.
    ///
    /// The two writes are sequential and independent. A failed increment
    /// after a successful insert is propagated but not rolled back: the
    /// event is already durable and visible to queries, and the counter
    /// stays behind.
    pub async fn ingest(&self, subject: &str, content: Value) -> Result<Event, IngestError> {
        if subject.is_empty() {
            return Err(IngestError::EmptySubject);
        }
        let event = self
            .store
            .insert_event(subject, Utc::now(), content)
            .await?;
        self.store.increment_counter(subject).await?;
        Ok(event)
    }

    /// Events for `subject` created within the trailing window, most recent
    /// first. `window_days` defaults to 30; a `limit` of 1 gives "latest
    /// single event" semantics.
    pub async fn list_recent(
        &self,
        subject: &str,
        window_days: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Event>, StoreError> {
        let days = window_days.unwrap_or(DEFAULT_WINDOW_DAYS);
        // A window too large to subtract means "everything ever stored".
        let not_before = Duration::try_days(days)
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.store.query_events(subject, not_before, limit).await
    }
}

#[cfg(test)]
mod event_service_tests {
    use super::*;
    use crate::adapters::in_memory::InMemoryEventStore;
    use rstest::rstest;
    use serde_json::json;

    fn service_with(store: InMemoryEventStore) -> (EventService, Arc<InMemoryEventStore>) {
        let store = Arc::new(store);
        (EventService::new(store.clone()), store)
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        Utc::now() - Duration::days(days)
    }

    #[tokio::test]
    async fn it_should_round_trip_content_through_ingest_and_query() {
        let (service, _) = service_with(InMemoryEventStore::new());
        let content = json!({"spam": "egg", "count": 3});

        let ingested = service.ingest("test", content.clone()).await.unwrap();
        assert_eq!(ingested.subject, "test");
        assert_eq!(ingested.content, content);

        let events = service.list_recent("test", None, None).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].content, content);
        assert_eq!(events[0].subject, "test");
    }

    #[tokio::test]
    async fn it_should_count_one_per_successful_ingestion() {
        let (service, store) = service_with(InMemoryEventStore::new());
        assert_eq!(store.get_counter("test").await.unwrap(), None);

        for idx in 0..3 {
            service.ingest("test", json!({"idx": idx})).await.unwrap();
        }

        assert_eq!(store.get_counter("test").await.unwrap().unwrap().count, 3);
    }

    #[tokio::test]
    async fn it_should_reject_an_empty_subject() {
        let (service, _) = service_with(InMemoryEventStore::new());
        let result = service.ingest("", json!({})).await;
        assert!(matches!(result, Err(IngestError::EmptySubject)));
    }

    #[tokio::test]
    async fn it_should_keep_the_event_when_the_counter_increment_fails() {
        let mut store = InMemoryEventStore::new();
        store.toggle_counters_offline();
        let (service, store) = service_with(store);

        let result = service.ingest("test", json!({})).await;
        assert!(matches!(result, Err(IngestError::Store(_))));

        // No rollback: the insert already happened and stays visible.
        let events = service.list_recent("test", None, None).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(store.get_counter("test").await.unwrap(), None);
    }

    #[rstest]
    #[case(4, 4)]
    #[case(7, 5)]
    #[tokio::test]
    async fn it_should_filter_events_by_the_requested_window(
        #[case] window_days: i64,
        #[case] expected: usize,
    ) {
        let (service, store) = service_with(InMemoryEventStore::new());
        for days in [1, 1, 2, 3, 5, 8] {
            store
                .insert_event("test", days_ago(days), json!({}))
                .await
                .unwrap();
        }

        let events = service
            .list_recent("test", Some(window_days), None)
            .await
            .unwrap();
        assert_eq!(events.len(), expected);
    }

    #[tokio::test]
    async fn it_should_apply_the_default_30_day_window() {
        let (service, store) = service_with(InMemoryEventStore::new());
        store
            .insert_event("test", Utc::now(), json!({"age": "today"}))
            .await
            .unwrap();
        store
            .insert_event("test", days_ago(31), json!({"age": "stale"}))
            .await
            .unwrap();

        let events = service.list_recent("test", None, None).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].content, json!({"age": "today"}));
    }

    #[tokio::test]
    async fn it_should_treat_an_oversized_window_as_unbounded() {
        let (service, store) = service_with(InMemoryEventStore::new());
        store
            .insert_event("test", days_ago(31), json!({}))
            .await
            .unwrap();

        let events = service
            .list_recent("test", Some(100_000_000), None)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);

        let events = service
            .list_recent("test", Some(i64::MAX), None)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn it_should_return_only_the_most_recent_event_with_limit_one() {
        let (service, _) = service_with(InMemoryEventStore::new());
        for idx in 0..3 {
            service
                .ingest("test", json!({"spam": format!("egg_{idx}")}))
                .await
                .unwrap();
        }

        let events = service.list_recent("test", None, Some(1)).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].content, json!({"spam": "egg_2"}));
    }
}
