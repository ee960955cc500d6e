// Ports define what the services need from storage, without implementing it.
//
// Responsibilities
// - Keep the services independent of any database by coding against a trait.
//
// Boundaries
// - No concrete I/O here. Adapters implement this trait in the adapters layer.
//
// Testing guidance
// - Use the in-memory implementation for tests and local development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::core::event::{Counter, Event};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
}

/// Storage seam for events and their per-subject counters.
///
/// Implementations must make `increment_counter` atomic at the storage
/// layer; the services never serialize concurrent ingestions themselves.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Ensures indexes and the expiry rule exist. Called once at startup;
    /// idempotent.
    async fn configure_indexes(&self) -> Result<(), StoreError>;

    /// Persists one event and returns it with the assigned identifier.
    async fn insert_event(
        &self,
        subject: &str,
        created: DateTime<Utc>,
        content: Value,
    ) -> Result<Event, StoreError>;

    /// Creates the counter for `subject` with count 1, or adds 1 to it.
    async fn increment_counter(&self, subject: &str) -> Result<(), StoreError>;

    /// Events for `subject` with `created >= not_before`, most recent first;
    /// `limit` truncates to the most recent N.
    async fn query_events(
        &self,
        subject: &str,
        not_before: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<Vec<Event>, StoreError>;

    /// The counter for `subject`, or `None` when the subject has never
    /// received an event.
    async fn get_counter(&self, subject: &str) -> Result<Option<Counter>, StoreError>;
}
