// Request layer: maps routes and parameters onto the services and turns
// every outcome into an envelope.
//
// Responsibilities
// - Extract the subject from the path and the content from query parameters
//   (GET) or the JSON body (POST).
// - Report validation failures in-band with HTTP 200; storage failures get
//   HTTP 500 but still carry a failed envelope body.

use std::fmt::Display;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

use crate::http::envelope::{Action, Envelope};
use crate::http::state::AppState;
use crate::service::events::IngestError;

/// GET ingestion: every query parameter becomes a content field; a parameter
/// given once is a scalar, a repeated one becomes an array.
pub async fn send_event_query(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    ingest(&state, &subject, content_from_pairs(params)).await
}

/// POST ingestion: the body must decode as JSON; a decode failure is
/// reported in-band, never as a transport-level error.
pub async fn send_event_body(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    body: Bytes,
) -> Response {
    match serde_json::from_slice::<Value>(&body) {
        Ok(content) => ingest(&state, &subject, content).await,
        Err(err) => Json(Envelope::failed(Action::Sending, state.resource(), err)).into_response(),
    }
}

pub async fn latest_event(State(state): State<AppState>, Path(subject): Path<String>) -> Response {
    list(&state, &subject, None, Some(1)).await
}

pub async fn recent_events(State(state): State<AppState>, Path(subject): Path<String>) -> Response {
    list(&state, &subject, None, None).await
}

pub async fn events_in_window(
    State(state): State<AppState>,
    Path((subject, window)): Path<(String, String)>,
) -> Response {
    match parse_window(&window) {
        Some(days) => list(&state, &subject, Some(days), None).await,
        None => Json(Envelope::failed(
            Action::Getting,
            state.resource(),
            format!("invalid window: {window:?}"),
        ))
        .into_response(),
    }
}

pub async fn count_events(State(state): State<AppState>, Path(subject): Path<String>) -> Response {
    match state.counts.get_count(&subject).await {
        Ok(counter) => respond(Action::Counting, &state, serde_json::to_value(counter)),
        Err(err) => storage_failure(Action::Counting, &state, err),
    }
}

async fn ingest(state: &AppState, subject: &str, content: Value) -> Response {
    match state.events.ingest(subject, content).await {
        Ok(event) => respond(Action::Sending, state, serde_json::to_value(event)),
        Err(IngestError::EmptySubject) => {
            Json(Envelope::failed(Action::Sending, state.resource(), IngestError::EmptySubject))
                .into_response()
        }
        Err(IngestError::Store(err)) => storage_failure(Action::Sending, state, err),
    }
}

async fn list(
    state: &AppState,
    subject: &str,
    window_days: Option<i64>,
    limit: Option<i64>,
) -> Response {
    match state.events.list_recent(subject, window_days, limit).await {
        Ok(events) => respond(Action::Getting, state, serde_json::to_value(events)),
        Err(err) => storage_failure(Action::Getting, state, err),
    }
}

fn respond(by: Action, state: &AppState, with: Result<Value, serde_json::Error>) -> Response {
    match with {
        Ok(with) => Json(Envelope::succeeded(by, state.resource(), with)).into_response(),
        Err(err) => storage_failure(by, state, err),
    }
}

fn storage_failure(by: Action, state: &AppState, err: impl Display) -> Response {
    tracing::error!(error = %err, "storage call failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope::failed(by, state.resource(), err)),
    )
        .into_response()
}

/// The `{window}` path segment is `N-day` or `N-days`.
fn parse_window(raw: &str) -> Option<i64> {
    let days = raw
        .strip_suffix("-days")
        .or_else(|| raw.strip_suffix("-day"))?;
    days.parse().ok().filter(|days| *days >= 0)
}

fn content_from_pairs(pairs: Vec<(String, String)>) -> Value {
    let mut fields: Map<String, Value> = Map::new();
    for (name, value) in pairs {
        match fields.get_mut(&name) {
            None => {
                fields.insert(name, Value::String(value));
            }
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
        }
    }
    Value::Object(fields)
}
