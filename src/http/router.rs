// Route table, CORS policy and request tracing.

use axum::routing::{MethodRouter, get};
use axum::{Router, http::HeaderValue};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::http::state::AppState;

pub fn router(state: AppState) -> Router {
    let routes: [(&str, MethodRouter<AppState>); 5] = [
        (
            "/send/event/for/{subject}",
            get(handlers::send_event_query).post(handlers::send_event_body),
        ),
        ("/get/latest/event/for/{subject}", get(handlers::latest_event)),
        ("/get/events/for/{subject}", get(handlers::recent_events)),
        (
            "/get/events/for/{subject}/past/{window}",
            get(handlers::events_in_window),
        ),
        ("/count/events/for/{subject}", get(handlers::count_events)),
    ];

    let mut app = Router::new();
    for (path, method_router) in routes {
        // Every route also accepts a trailing slash.
        app = app
            .route(path, method_router.clone())
            .route(&format!("{path}/"), method_router);
    }

    if let Some(origin) = allowed_origin(&state.config.cors_origin) {
        app = app.layer(CorsLayer::new().allow_origin(origin));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Responses carry `Access-Control-Allow-Origin` set to the configured
/// value; an empty value disables the header entirely.
fn allowed_origin(configured: &str) -> Option<AllowOrigin> {
    if configured.is_empty() {
        return None;
    }
    match configured.parse::<HeaderValue>() {
        Ok(value) => Some(AllowOrigin::exact(value)),
        Err(_) => {
            tracing::warn!(configured, "unusable cors origin value, header disabled");
            None
        }
    }
}

#[cfg(test)]
mod router_tests {
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::adapters::in_memory::InMemoryEventStore;
    use crate::config::AppConfig;
    use crate::http::state::AppState;

    use super::router;

    fn make_state(cors_origin: &str) -> AppState {
        let config = AppConfig {
            cors_origin: cors_origin.to_string(),
            ..AppConfig::default()
        };
        AppState::new(Arc::new(InMemoryEventStore::new()), config)
    }

    #[tokio::test]
    async fn it_should_echo_the_configured_wildcard_origin() {
        let response = router(make_state("*"))
            .oneshot(
                Request::get("/send/event/for/test")
                    .header("Origin", "example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let header = response
            .headers()
            .get("access-control-allow-origin")
            .expect("expected the cors header");
        assert_eq!(header, "*");
    }

    #[tokio::test]
    async fn it_should_send_a_specific_configured_origin() {
        let response = router(make_state("https://spam.example"))
            .oneshot(
                Request::get("/count/events/for/test")
                    .header("Origin", "https://spam.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let header = response
            .headers()
            .get("access-control-allow-origin")
            .expect("expected the cors header");
        assert_eq!(header, "https://spam.example");
    }

    #[tokio::test]
    async fn it_should_omit_the_header_when_cors_is_disabled() {
        let response = router(make_state(""))
            .oneshot(
                Request::get("/count/events/for/test")
                    .header("Origin", "example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(
            response
                .headers()
                .get("access-control-allow-origin")
                .is_none()
        );
    }

    #[tokio::test]
    async fn it_should_accept_a_trailing_slash_on_every_route() {
        let state = make_state("*");
        for uri in [
            "/send/event/for/test/",
            "/get/latest/event/for/test/",
            "/get/events/for/test/",
            "/get/events/for/test/past/7-days/",
            "/count/events/for/test/",
        ] {
            let response = router(state.clone())
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), 200, "{uri}");
        }
    }

    #[tokio::test]
    async fn it_should_404_unknown_routes() {
        let response = router(make_state("*"))
            .oneshot(Request::get("/unknown").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }
}
