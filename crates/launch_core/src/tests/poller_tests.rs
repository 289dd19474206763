use super::*;
use axum::{http::StatusCode as HttpStatus, routing::get, Json, Router};
use serde_json::{json, Value};
use shared::domain::LaunchStatus;
use tokio::net::TcpListener;

async fn spawn_feed(app: Router) -> anyhow::Result<Url> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(Url::parse(&format!("http://{addr}/"))?)
}

fn feed_router() -> Router {
    Router::new()
        .route(
            "/launches",
            get(|| async {
                Json(json!({
                    "events": [
                        { "status": "PENDING", "statusAt": "2024-05-01T10:00:00Z" },
                        { "status": "SUCCESS", "statusAt": 1714557660000i64 }
                    ]
                }))
            }),
        )
        .route(
            "/stats",
            get(|| async { Json(json!({ "success": 12, "failure": 3 })) }),
        )
        .route(
            "/broken",
            get(|| async { (HttpStatus::SERVICE_UNAVAILABLE, "try later") }),
        )
        .route("/garbage", get(|| async { "not json" }))
}

fn poller(status_url: Url, stats_url: Option<Url>) -> HttpStatusPoller {
    let mut config = PollerConfig::new(status_url);
    config.stats_url = stats_url;
    config.request_timeout = Duration::from_secs(2);
    HttpStatusPoller::new(config).expect("client")
}

#[tokio::test]
async fn fetches_events_and_stats_from_feed() -> anyhow::Result<()> {
    let base = spawn_feed(feed_router()).await?;
    let poller = poller(base.join("launches")?, Some(base.join("stats")?));

    let records = poller.fetch_events().await?;
    assert_eq!(records.len(), 2);
    let latest = records[1].to_event()?;
    assert_eq!(latest.status, LaunchStatus::Success);

    let stats = poller.fetch_stats().await?;
    assert_eq!(
        stats,
        Some(Stats {
            success: 12,
            failure: 3
        })
    );
    Ok(())
}

#[tokio::test]
async fn missing_stats_url_yields_no_stats() -> anyhow::Result<()> {
    let base = spawn_feed(feed_router()).await?;
    let poller = poller(base.join("launches")?, None);

    assert_eq!(poller.fetch_stats().await?, None);
    Ok(())
}

#[tokio::test]
async fn non_success_status_is_reported() -> anyhow::Result<()> {
    let base = spawn_feed(feed_router()).await?;
    let poller = poller(base.join("broken")?, None);

    let err = poller.fetch_events().await.expect_err("503 must fail");
    match err {
        PollError::Status { status, .. } => assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE),
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() -> anyhow::Result<()> {
    let base = spawn_feed(feed_router()).await?;
    let poller = poller(base.join("garbage")?, None);

    let err = poller.fetch_events().await.expect_err("text body must fail");
    assert!(matches!(err, PollError::Decode { .. }), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn records_with_missing_fields_still_decode() -> anyhow::Result<()> {
    let app = Router::new().route(
        "/launches",
        get(|| async { Json(json!({ "events": [ { "statusAt": 1 }, {} ] })) }),
    );
    let base = spawn_feed(app).await?;
    let poller = poller(base.join("launches")?, None);

    let records = poller.fetch_events().await?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].status, None);
    assert_eq!(records[0].status_at, Some(Value::from(1)));
    Ok(())
}

#[tokio::test]
async fn unreachable_feed_is_a_transport_error() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let poller = poller(Url::parse(&format!("http://{addr}/launches"))?, None);
    let err = poller.fetch_events().await.expect_err("closed port must fail");
    assert!(matches!(err, PollError::Transport { .. }), "got {err:?}");
    Ok(())
}
