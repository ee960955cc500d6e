// In memory implementation of the EventStore port.
//
// Purpose
// - Support handler and service tests and local development without a
//   database.
//
// Responsibilities
// - Store events per subject in memory.
// - Emulate retention by hiding expired events from queries; counters keep
//   their tally regardless.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::event::{Counter, Event};
use crate::core::ports::{EventStore, StoreError};

#[derive(Default)]
struct Inner {
    events: HashMap<String, Vec<Event>>,
    counters: HashMap<String, i64>,
}

pub struct InMemoryEventStore {
    retention: Option<Duration>,
    offline: bool,
    counters_offline: bool,
    inner: RwLock<Inner>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::with_retention(0)
    }

    /// Retention of 0 disables expiry, matching the real adapter.
    pub fn with_retention(seconds: i64) -> Self {
        Self {
            retention: (seconds > 0).then(|| Duration::seconds(seconds)),
            offline: false,
            counters_offline: false,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Makes every storage call fail, to exercise error paths in tests.
    pub fn toggle_offline(&mut self) {
        self.offline = !self.offline;
    }

    /// Makes only counter increments fail, to exercise the partial
    /// ingestion path (event inserted, counter behind).
    pub fn toggle_counters_offline(&mut self) {
        self.counters_offline = !self.counters_offline;
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Backend("store offline".into()));
        }
        Ok(())
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn configure_indexes(&self) -> Result<(), StoreError> {
        // Nothing to build; retention is applied at query time.
        self.ensure_online()
    }

    async fn insert_event(
        &self,
        subject: &str,
        created: DateTime<Utc>,
        content: Value,
    ) -> Result<Event, StoreError> {
        self.ensure_online()?;
        let event = Event {
            id: Uuid::now_v7().to_string(),
            subject: subject.to_string(),
            created,
            content,
        };
        let mut guard = self.inner.write().await;
        guard
            .events
            .entry(subject.to_string())
            .or_default()
            .push(event.clone());
        Ok(event)
    }

    async fn increment_counter(&self, subject: &str) -> Result<(), StoreError> {
        self.ensure_online()?;
        if self.counters_offline {
            return Err(StoreError::Backend("counters offline".into()));
        }
        let mut guard = self.inner.write().await;
        *guard.counters.entry(subject.to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn query_events(
        &self,
        subject: &str,
        not_before: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<Vec<Event>, StoreError> {
        self.ensure_online()?;
        let now = Utc::now();
        let guard = self.inner.read().await;
        let mut events: Vec<Event> = guard
            .events
            .get(subject)
            .map(|stored| {
                stored
                    .iter()
                    .filter(|event| event.created >= not_before)
                    .filter(|event| {
                        self.retention
                            .is_none_or(|retention| event.created + retention > now)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        events.sort_by(|a, b| b.created.cmp(&a.created));
        if let Some(limit) = limit {
            events.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(events)
    }

    async fn get_counter(&self, subject: &str) -> Result<Option<Counter>, StoreError> {
        self.ensure_online()?;
        let guard = self.inner.read().await;
        Ok(guard.counters.get(subject).map(|&count| Counter {
            subject: subject.to_string(),
            count,
        }))
    }
}
