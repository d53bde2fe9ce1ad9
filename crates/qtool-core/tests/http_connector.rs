#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use qtool_core::{
    ClusterTarget, Connector, Credentials, Error, HttpConnector, QueryRequest, Session, Timeouts,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn target_for(server: &MockServer) -> ClusterTarget {
    let port = server.address().port();
    ClusterTarget::parse(&format!("127.0.0.1:{port}"))
        .unwrap()
        .with_query_port(port)
}

fn fast_timeouts() -> Timeouts {
    Timeouts {
        operation: Duration::from_secs(2),
        query: Duration::from_secs(3),
    }
}

async fn mount_pools_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/pools/default"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "default"})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn connect_and_query_returns_rows_and_metrics() {
    let server = MockServer::start().await;
    mount_pools_ok(&server).await;

    Mock::given(method("POST"))
        .and(path("/query/service"))
        .and(body_string_contains("statement=SELECT"))
        .and(body_string_contains("metrics=true"))
        .and(body_string_contains("timeout=3000ms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"airport": {"name": "Heathrow", "geo": {"lat": 51.47}}},
                {"airport": {"name": "Gatwick", "geo": {"lat": 51.15}}}
            ],
            "status": "success",
            "metrics": {"elapsedTime": "12.1ms", "executionTime": "11.9ms", "resultCount": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = HttpConnector::new()
        .connect(
            &target_for(&server),
            &Credentials::new("Administrator", "password"),
            fast_timeouts(),
        )
        .await
        .expect("connect");

    let result = session
        .query(&QueryRequest::new("SELECT airport FROM `travel-sample` LIMIT 2"))
        .await
        .expect("query");

    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0]["airport"]["name"], "Heathrow");
    assert_eq!(result.execution_time(), Some("11.9ms"));
}

#[tokio::test]
async fn scope_is_sent_as_query_context() {
    let server = MockServer::start().await;
    mount_pools_ok(&server).await;

    Mock::given(method("POST"))
        .and(path("/query/service"))
        .and(body_string_contains("query_context=default%3A%60travel-sample%60.%60inventory%60"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"results": [], "status": "success"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = HttpConnector::new()
        .connect(
            &target_for(&server),
            &Credentials::new("Administrator", "password"),
            fast_timeouts(),
        )
        .await
        .unwrap();

    let request = QueryRequest::new("SELECT * FROM airline LIMIT 1")
        .with_scope(Some("travel-sample.inventory".to_string()));
    let result = session.query(&request).await.unwrap();
    assert!(result.rows.is_empty());
    assert_eq!(result.execution_time(), None);
}

#[tokio::test]
async fn rejected_credentials_are_a_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pools/default"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = HttpConnector::new()
        .connect(
            &target_for(&server),
            &Credentials::new("Administrator", "wrong"),
            fast_timeouts(),
        )
        .await;

    match result {
        Err(Error::Connection(msg)) => {
            assert!(msg.contains("authentication failed"));
            assert!(!msg.contains("wrong"), "password must not leak: {msg}");
        },
        Err(other) => panic!("expected connection error, got {other:?}"),
        Ok(_) => panic!("expected connection error, got a session"),
    }
}

#[tokio::test]
async fn unreachable_cluster_is_a_connection_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let target = ClusterTarget::parse(&format!("127.0.0.1:{port}")).unwrap();

    let result = HttpConnector::new()
        .connect(&target, &Credentials::new("u", "p"), fast_timeouts())
        .await;

    assert!(matches!(
        result,
        Err(Error::Connection(_) | Error::Timeout(_))
    ));
}

#[tokio::test]
async fn slow_management_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pools/default"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1500)))
        .mount(&server)
        .await;

    let timeouts = Timeouts {
        operation: Duration::from_millis(200),
        query: Duration::from_secs(1),
    };
    let result = HttpConnector::new()
        .connect(&target_for(&server), &Credentials::new("u", "p"), timeouts)
        .await;

    assert!(matches!(result, Err(Error::Timeout(_))));
}

#[tokio::test]
async fn syntax_errors_surface_as_query_errors() {
    let server = MockServer::start().await;
    mount_pools_ok(&server).await;

    Mock::given(method("POST"))
        .and(path("/query/service"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{"code": 3000, "msg": "syntax error - line 1, column 1, near 'SELEC', at: *"}],
            "status": "fatal"
        })))
        .mount(&server)
        .await;

    let session = HttpConnector::new()
        .connect(
            &target_for(&server),
            &Credentials::new("Administrator", "password"),
            fast_timeouts(),
        )
        .await
        .unwrap();

    let err = session
        .query(&QueryRequest::new("SELEC *"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Query(ref msg) if msg.contains("[3000] syntax error")));
}
