//! The default reqwest transport against local mock backends.

use std::sync::Arc;

use waymark::config::{parse_config, AppConfig};
use waymark::http::Method;
use waymark::App;

mod common;
use common::{start_mock_backend, Journal, Recorder};

fn config_for(base_url: &str) -> AppConfig {
    parse_config(&format!(
        r#"
[transport]
base_url = "{base_url}"
timeout_secs = 5

[transport.default_headers]
accept = "application/json"
"#
    ))
    .unwrap()
}

#[tokio::test]
async fn test_success_status_completes() {
    let addr = start_mock_backend(200, r#"{"ok":true}"#).await;
    let app = App::from_config(&config_for(&format!("http://{addr}"))).unwrap();

    let completion = app.http_get("/status").send().await.unwrap();

    assert!(completion.is_completed());
    assert_eq!(completion.response().status, 200);
    assert_eq!(completion.response().payload.as_deref(), Some(r#"{"ok":true}"#));
}

#[tokio::test]
async fn test_error_status_runs_failed_phase() {
    let addr = start_mock_backend(503, "down").await;
    let journal = Journal::default();
    let app = App::from_config(&config_for(&format!("http://{addr}"))).unwrap();
    app.post("/orders", Recorder::new("orders", &journal).into_middleware())
        .unwrap();

    let completion = app.http_post("/orders").send().await.unwrap();

    assert!(!completion.is_completed());
    assert_eq!(completion.response().status, 503);
    assert_eq!(completion.response().payload.as_deref(), Some("down"));
    assert_eq!(journal.take(), ["orders:entered:/orders", "orders:failed:/orders"]);
    assert!(app.registry().visited_routes().is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_reports_status_zero() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let app = App::from_config(&config_for(&format!("http://{addr}"))).unwrap();
    let failures = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = failures.clone();

    let completion = app
        .submission(Method::Delete, "/items/1".into())
        .on_failure(move |req, res| sink.lock().unwrap().push((req.uri.clone(), res.status)))
        .send()
        .await
        .unwrap();

    assert_eq!(completion.response().status, 0);
    assert!(completion.response().errors.is_some());
    assert_eq!(*failures.lock().unwrap(), [("/items/1".to_string(), 0)]);
}

#[tokio::test]
async fn test_relative_uri_without_base_fails() {
    let app = App::from_config(&AppConfig::default()).unwrap();

    let completion = app.http_get("/nowhere").send().await.unwrap();

    assert_eq!(completion.response().status, 0);
    assert!(completion
        .response()
        .errors
        .as_deref()
        .is_some_and(|e| e.contains("/nowhere")));
}
