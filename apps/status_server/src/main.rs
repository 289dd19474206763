use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use clap::Parser;
use shared::{
    domain::{LaunchStatus, Stats},
    error::{ApiError, ErrorCode},
    protocol::{LaunchEventPayload, LaunchFeed, NewLaunchStatus},
};
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_BIND: &str = "127.0.0.1:8787";
const MAX_EVENTS: usize = 256;

#[derive(Parser, Debug)]
#[command(about = "Development launch status feed")]
struct Args {
    #[arg(long)]
    bind: Option<String>,
}

#[derive(Debug, Default)]
struct Feed {
    events: Vec<LaunchEventPayload>,
    stats: Stats,
}

struct AppState {
    feed: RwLock<Feed>,
}

impl AppState {
    fn new(feed: Feed) -> Self {
        Self {
            feed: RwLock::new(feed),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();

    let bind = args.bind.unwrap_or_else(load_bind_addr);
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address '{bind}'"))?;

    let feed = Feed {
        events: vec![LaunchEventPayload {
            status: LaunchStatus::Pending,
            status_at: Utc::now(),
        }],
        stats: Stats::default(),
    };
    let app = build_router(Arc::new(AppState::new(feed)));

    info!(%addr, "status feed listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

fn load_bind_addr() -> String {
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        return v;
    }
    if let Ok(v) = std::env::var("STATUS_SERVER_BIND") {
        return v;
    }
    DEFAULT_BIND.to_string()
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/launches", get(list_launches).post(record_launch))
        .route("/stats", get(get_stats).put(put_stats))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_launches(State(state): State<Arc<AppState>>) -> Json<LaunchFeed> {
    let feed = state.feed.read().await;
    Json(LaunchFeed {
        events: feed.events.clone(),
    })
}

async fn record_launch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewLaunchStatus>,
) -> Result<Json<LaunchEventPayload>, (StatusCode, Json<ApiError>)> {
    if req.status.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(ErrorCode::Validation, "status must not be empty")),
        ));
    }

    let event = LaunchEventPayload {
        status: LaunchStatus::parse(&req.status),
        status_at: Utc::now(),
    };
    let mut feed = state.feed.write().await;
    feed.events.push(event.clone());
    if feed.events.len() > MAX_EVENTS {
        let overflow = feed.events.len() - MAX_EVENTS;
        feed.events.drain(..overflow);
    }
    info!(status = %event.status, events = feed.events.len(), "launch status recorded");
    Ok(Json(event))
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Json<Stats> {
    Json(state.feed.read().await.stats)
}

async fn put_stats(State(state): State<Arc<AppState>>, Json(stats): Json<Stats>) -> Json<Stats> {
    state.feed.write().await.stats = stats;
    info!(
        success = stats.success,
        failure = stats.failure,
        "launch stats replaced"
    );
    Json(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use tower::ServiceExt;

    fn test_app() -> Router {
        build_router(Arc::new(AppState::new(Feed::default())))
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn recorded_statuses_show_up_in_feed() {
        let app = test_app();

        for status in ["PENDING", "SUCCESS"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/launches",
                    &format!(r#"{{"status":"{status}"}}"#),
                ))
                .await
                .expect("post response");
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(Request::get("/launches").body(Body::empty()).expect("request"))
            .await
            .expect("get response");
        assert_eq!(response.status(), StatusCode::OK);
        let feed: LaunchFeed = body_json(response).await;
        let statuses: Vec<_> = feed.events.iter().map(|e| e.status.clone()).collect();
        assert_eq!(statuses, vec![LaunchStatus::Pending, LaunchStatus::Success]);
        assert!(feed.events[0].status_at <= feed.events[1].status_at);
    }

    #[tokio::test]
    async fn empty_status_is_rejected() {
        let response = test_app()
            .oneshot(json_request("POST", "/launches", r#"{"status":"  "}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let err: ApiError = body_json(response).await;
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn stats_can_be_replaced_and_read_back() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(json_request("PUT", "/stats", r#"{"success":5,"failure":1}"#))
            .await
            .expect("put response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/stats").body(Body::empty()).expect("request"))
            .await
            .expect("get response");
        let stats: Stats = body_json(response).await;
        assert_eq!(
            stats,
            Stats {
                success: 5,
                failure: 1
            }
        );
    }

    #[tokio::test]
    async fn feed_keeps_only_recent_events() {
        let state = Arc::new(AppState::new(Feed::default()));
        let app = build_router(state.clone());
        for _ in 0..MAX_EVENTS + 3 {
            app.clone()
                .oneshot(json_request("POST", "/launches", r#"{"status":"PENDING"}"#))
                .await
                .expect("post response");
        }
        assert_eq!(state.feed.read().await.events.len(), MAX_EVENTS);
    }
}
