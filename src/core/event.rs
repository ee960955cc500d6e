// Domain types for the event log.
//
// Purpose
// - Describe what an event and its per-subject counter look like.
//
// Boundaries
// - Payloads stay opaque: `content` is any JSON value and is stored verbatim.
// - `created` is assigned server-side at ingestion time, never by the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recorded event. The id is the storage layer's identifier in its
/// canonical string form; timestamps serialize as ISO-8601 UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub subject: String,
    pub created: DateTime<Utc>,
    pub content: Value,
}

/// Running tally of events ever sent for a subject. Counters only grow:
/// they are not decremented when stored events expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub subject: String,
    pub count: i64,
}
