// MongoDB implementation of the EventStore port.
//
// Responsibilities
// - Own the collection layout and the index/expiry policy.
// - Translate between BSON documents and domain types.
//
// Boundaries
// - No retries: every storage call is attempted exactly once per request.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use bson::{Bson, DateTime as BsonDateTime, doc, oid::ObjectId};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AppConfig;
use crate::core::event::{Counter, Event};
use crate::core::ports::{EventStore, StoreError};

const FALLBACK_DB_NAME: &str = "tidelog";

#[derive(Debug, Serialize, Deserialize)]
struct EventDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    subject: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created: DateTime<Utc>,
    content: Value,
}

impl From<EventDocument> for Event {
    fn from(document: EventDocument) -> Self {
        Self {
            id: document.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            subject: document.subject,
            created: document.created,
            content: document.content,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CounterDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    subject: String,
    count: i64,
}

pub struct MongoEventStore {
    events: Collection<EventDocument>,
    counters: Collection<CounterDocument>,
    retention_seconds: u64,
}

impl MongoEventStore {
    /// Connects and resolves the database from the URI path, falling back
    /// to `tidelog` when the URI does not name one.
    pub async fn connect(config: &AppConfig) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(&config.mongo_uri)
            .await
            .map_err(backend)?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(FALLBACK_DB_NAME));
        tracing::info!(
            database = %database.name(),
            retention_seconds = config.events_expire,
            "connected to mongodb"
        );
        Ok(Self::with_database(&database, config.events_expire))
    }

    pub fn with_database(database: &Database, retention_seconds: u64) -> Self {
        Self {
            events: database.collection("events"),
            counters: database.collection("counters"),
            retention_seconds,
        }
    }
}

fn backend(err: mongodb::error::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl EventStore for MongoEventStore {
    async fn configure_indexes(&self) -> Result<(), StoreError> {
        if self.retention_seconds > 0 {
            let expiry = IndexOptions::builder()
                .expire_after(Duration::from_secs(self.retention_seconds))
                .build();
            self.events
                .create_index(
                    IndexModel::builder()
                        .keys(doc! { "created": 1 })
                        .options(expiry)
                        .build(),
                )
                .await
                .map_err(backend)?;
        }
        self.events
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "subject": 1, "created": -1 })
                    .build(),
            )
            .await
            .map_err(backend)?;
        let unique = IndexOptions::builder().unique(true).build();
        self.counters
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "subject": 1 })
                    .options(unique)
                    .build(),
            )
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn insert_event(
        &self,
        subject: &str,
        created: DateTime<Utc>,
        content: Value,
    ) -> Result<Event, StoreError> {
        let document = EventDocument {
            id: None,
            subject: subject.to_string(),
            created,
            content,
        };
        let inserted = self.events.insert_one(&document).await.map_err(backend)?;
        let id = match inserted.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        };
        Ok(Event {
            id,
            subject: document.subject,
            created,
            content: document.content,
        })
    }

    async fn increment_counter(&self, subject: &str) -> Result<(), StoreError> {
        // The upsert-with-$inc is the atomicity guarantee under concurrent
        // ingestions for the same subject.
        self.counters
            .update_one(
                doc! { "subject": subject },
                doc! { "$inc": { "count": 1 } },
            )
            .upsert(true)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn query_events(
        &self,
        subject: &str,
        not_before: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<Vec<Event>, StoreError> {
        let filter = doc! {
            "subject": subject,
            "created": { "$gte": BsonDateTime::from_chrono(not_before) },
        };
        let mut find = self.events.find(filter).sort(doc! { "created": -1 });
        if let Some(limit) = limit {
            find = find.limit(limit);
        }
        let documents: Vec<EventDocument> = find
            .await
            .map_err(backend)?
            .try_collect()
            .await
            .map_err(backend)?;
        Ok(documents.into_iter().map(Event::from).collect())
    }

    async fn get_counter(&self, subject: &str) -> Result<Option<Counter>, StoreError> {
        let found = self
            .counters
            .find_one(doc! { "subject": subject })
            .await
            .map_err(backend)?;
        Ok(found.map(|counter| Counter {
            subject: counter.subject,
            count: counter.count,
        }))
    }
}
