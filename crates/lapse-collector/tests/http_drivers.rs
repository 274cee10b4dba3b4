//! HTTP drivers against an in-process capture server.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use tokio::task::JoinHandle;

use lapse_collector::drivers::{NewRelicDriver, PushGatewayDriver, StreamDriver};
use lapse_core::{InstanceIdentity, Report, Stats, Summary};

#[derive(Debug, Clone)]
struct Captured {
    path: String,
    headers: HeaderMap,
    body: String,
}

#[derive(Clone, Default)]
struct Capture {
    requests: Arc<Mutex<Vec<Captured>>>,
    status: Arc<Mutex<Option<StatusCode>>>,
}

impl Capture {
    fn take(&self) -> Vec<Captured> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}

async fn record(
    State(cap): State<Capture>,
    path: String,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    cap.requests.lock().unwrap().push(Captured { path, headers, body });
    cap.status.lock().unwrap().unwrap_or(StatusCode::OK)
}

async fn spawn_capture_server() -> (String, Capture, JoinHandle<()>) {
    let cap = Capture::default();
    let app = Router::new()
        .route(
            "/metrics/job/:job",
            post(
                |State(cap): State<Capture>,
                 Path(job): Path<String>,
                 headers: HeaderMap,
                 body: String| async move {
                    record(State(cap), format!("/metrics/job/{job}"), headers, body).await
                },
            ),
        )
        .route(
            "/platform/v1/metrics",
            post(|State(cap): State<Capture>, headers: HeaderMap, body: String| async move {
                record(State(cap), "/platform/v1/metrics".into(), headers, body).await
            }),
        )
        .with_state(cap.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), cap, handle)
}

fn report() -> Report {
    let mut traces = Stats::new();
    traces.insert("app:fetch".into(), Summary { count: 2, min: 100.0, max: 300.0, avg: 200.0 });
    Report {
        instance: InstanceIdentity { id: "i-1".into(), hostname: "web-1".into() },
        traces,
    }
}

#[tokio::test]
async fn pushgateway_posts_gauges() {
    let (base, cap, server) = spawn_capture_server().await;
    let driver = PushGatewayDriver::new("orders", &base, Duration::from_secs(5)).unwrap();

    driver.push(&report()).await.expect("push ok");

    let reqs = cap.take();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].path, "/metrics/job/orders");
    let lines: Vec<&str> = reqs[0].body.lines().collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "# TYPE orders:app:fetch_count gauge");
    assert_eq!(lines[1], "orders:app:fetch_count 2.00");
    assert_eq!(lines[7], "orders:app:fetch_avg 200.00");
    assert!(reqs[0].body.ends_with('\n'));

    server.abort();
}

#[tokio::test]
async fn newrelic_posts_payload_with_license_header() {
    let (base, cap, server) = spawn_capture_server().await;
    let driver = NewRelicDriver::new(
        "orders",
        "secret-key",
        Some(format!("{base}/platform/v1/metrics")),
        Duration::from_secs(5),
    )
    .unwrap();

    driver.push(&report()).await.expect("push ok");

    let reqs = cap.take();
    assert_eq!(reqs.len(), 1);
    let r = &reqs[0];
    assert_eq!(r.headers["x-license-key"], "secret-key");
    assert_eq!(r.headers["content-type"], "application/json");
    assert_eq!(r.headers["accept"], "application/json");

    let v: serde_json::Value = serde_json::from_str(&r.body).unwrap();
    assert_eq!(v["agent"]["host"], "web-1");
    let m = &v["components"][0]["metrics"]["Component/app:fetch"];
    assert_eq!(m["total"].as_f64().unwrap(), 400.0);
    assert_eq!(m["sum_of_squares"].as_f64().unwrap(), 100_000.0);

    server.abort();
}

#[tokio::test]
async fn error_status_is_contained_by_stream() {
    let (base, cap, server) = spawn_capture_server().await;
    *cap.status.lock().unwrap() = Some(StatusCode::SERVICE_UNAVAILABLE);
    let driver = PushGatewayDriver::new("orders", &base, Duration::from_secs(5)).unwrap();

    let err = driver.push(&report()).await.expect_err("503 must fail");
    assert_eq!(err.kind().as_str(), "SINK");

    // The trait call swallows it.
    driver.stream(&report()).await;
    assert_eq!(cap.take().len(), 2);

    server.abort();
}

#[tokio::test]
async fn unreachable_endpoint_is_contained() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let driver =
        PushGatewayDriver::new("orders", &format!("http://{addr}"), Duration::from_millis(500))
            .unwrap();
    assert!(driver.push(&report()).await.is_err());
    driver.stream(&report()).await;
}
