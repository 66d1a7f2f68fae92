//! HTTP surface tests
//!
//! Exercises the router end to end with `tower::ServiceExt::oneshot`:
//! session middleware, status mapping, the `{code, data}` success envelope
//! and the `{code, message}` error shape, and the multipart publish intake.

use async_trait::async_trait;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt; // for `oneshot`

use quarterdeck_core::application::apps::AppOps;
use quarterdeck_core::domain::audit::{AuditEntry, AuditSink};
use quarterdeck_core::domain::cluster::{ClusterConfig, ClusterRegistry};
use quarterdeck_core::domain::console_config::{ConsoleConfig, UserEntry};
use quarterdeck_core::domain::error::OpError;
use quarterdeck_core::domain::remote::{
    RemoteCallError, RemoteCaller, RemoteRequest, RemoteResult,
};
use quarterdeck_core::domain::session::ClusterAcl;
use quarterdeck_core::infrastructure::directory::UserDirectory;
use quarterdeck_core::presentation::api::{app, AppState, USER_HEADER};

struct StaticRegistry {
    clusters: HashMap<String, ClusterConfig>,
}

impl ClusterRegistry for StaticRegistry {
    fn resolve(&self, code: &str) -> Result<ClusterConfig, OpError> {
        self.clusters.get(code).cloned().ok_or_else(|| OpError::ClusterNotFound {
            cluster: code.to_string(),
        })
    }
}

struct ScriptedRemote {
    outcome: Result<RemoteResult, RemoteCallError>,
    calls: Mutex<Vec<RemoteRequest>>,
}

#[async_trait]
impl RemoteCaller for ScriptedRemote {
    async fn call(
        &self,
        _cluster: &ClusterConfig,
        request: RemoteRequest,
    ) -> Result<RemoteResult, RemoteCallError> {
        self.calls.lock().unwrap().push(request);
        self.outcome.clone()
    }
}

struct RecordingSink {
    entries: Mutex<Vec<AuditEntry>>,
}

#[async_trait]
impl AuditSink for RecordingSink {
    async fn record(&self, entry: AuditEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

fn remote_success(data: Value) -> Result<RemoteResult, RemoteCallError> {
    Ok(RemoteResult {
        code: "SUCCESS".to_string(),
        message: None,
        data,
    })
}

/// Router wired to fakes: cluster `c1`, superuser `admin`, and `omar` who
/// may only touch `app1` on `c1`.
fn test_app(
    outcome: Result<RemoteResult, RemoteCallError>,
) -> (axum::Router, Arc<ScriptedRemote>, Arc<RecordingSink>) {
    let registry = Arc::new(StaticRegistry {
        clusters: HashMap::from([(
            "c1".to_string(),
            ClusterConfig {
                code: "c1".to_string(),
                endpoint: "http://10.0.3.21:9999".to_string(),
                token: None,
                timeout_ms: 15_000,
            },
        )]),
    });
    let remote = Arc::new(ScriptedRemote {
        outcome,
        calls: Mutex::new(Vec::new()),
    });
    let audit = Arc::new(RecordingSink {
        entries: Mutex::new(Vec::new()),
    });
    let ops = AppOps::new(registry, remote.clone(), audit.clone());

    let mut config = ConsoleConfig::default();
    config.spec.users.push(UserEntry {
        name: "admin".to_string(),
        superuser: true,
        cluster_acl: HashMap::new(),
    });
    config.spec.users.push(UserEntry {
        name: "omar".to_string(),
        superuser: false,
        cluster_acl: HashMap::from([(
            "c1".to_string(),
            ClusterAcl { is_admin: false, apps: vec!["app1".to_string()] },
        )]),
    });
    let directory = UserDirectory::from_config(&config);

    let state = Arc::new(AppState {
        ops,
        directory,
        start_time: std::time::Instant::now(),
    });
    (app(state), remote, audit)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_needs_no_session() {
    let (app, _, _) = test_app(remote_success(Value::Null));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn missing_principal_header_is_unauthenticated() {
    let (app, _, _) = test_app(remote_success(Value::Null));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/apps?clusterCode=c1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["code"], "ERROR");
    assert_eq!(body["message"], "user not authenticated");
}

#[tokio::test]
async fn unknown_principal_is_unauthenticated() {
    let (app, _, _) = test_app(remote_success(Value::Null));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/apps?clusterCode=c1")
                .header(USER_HEADER, "nobody")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_returns_success_envelope() {
    let listing = json!({
        "success": [
            {"ip": "10.0.3.21", "apps": [
                {"name": "app1", "version": "1.0.0", "status": "online",
                 "workerNum": 2, "expectWorkerNum": 2}
            ]}
        ],
        "error": []
    });
    let (app, remote, _) = test_app(remote_success(listing));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/apps?clusterCode=c1")
                .header(USER_HEADER, "admin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["code"], "SUCCESS");
    assert_eq!(body["data"]["success"][0]["name"], "app1");
    assert_eq!(body["data"]["success"][0]["ips"], json!(["10.0.3.21"]));

    assert_eq!(remote.calls.lock().unwrap()[0].path, "/api/apps");
}

#[tokio::test]
async fn restricted_user_sees_only_granted_apps() {
    let listing = json!({
        "success": [
            {"ip": "10.0.3.21", "apps": [
                {"name": "app1", "workerNum": 1, "expectWorkerNum": 1},
                {"name": "secret-app", "workerNum": 1, "expectWorkerNum": 1}
            ]}
        ],
        "error": []
    });
    let (app, _, _) = test_app(remote_success(listing));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/apps?clusterCode=c1")
                .header(USER_HEADER, "omar")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = json_body(response).await;
    let names: Vec<&str> = body["data"]["success"]
        .as_array()
        .unwrap()
        .iter()
        .map(|app| app["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["app1"]);
}

#[tokio::test]
async fn cluster_the_user_lacks_is_forbidden() {
    let (app, remote, _) = test_app(remote_success(Value::Null));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/stop/app1")
                .header(USER_HEADER, "omar")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"clusterCode":"c2"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["code"], "ERROR");
    assert_eq!(body["message"], "Cluster unauthorized");
    assert!(remote.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn restart_round_trips_remote_data() {
    let (app, remote, audit) = test_app(remote_success(json!({"status": "ok"})));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/restart/app1")
                .header(USER_HEADER, "admin")
                .header("x-forwarded-for", "10.1.1.1, 10.2.2.2")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"clusterCode":"c1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["code"], "SUCCESS");
    assert_eq!(body["data"], json!({"status": "ok"}));

    assert_eq!(remote.calls.lock().unwrap()[0].path, "/api/restart/app1");
    let entries = audit.entries.lock().unwrap();
    assert_eq!(entries[0].client_id, "10.1.1.1,10.2.2.2");
}

#[tokio::test]
async fn missing_body_flows_to_cluster_resolution() {
    let (app, _, _) = test_app(remote_success(Value::Null));

    // No JSON body at all: clusterCode defaults to empty and the resolver
    // rejects it.
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/restart/app1")
                .header(USER_HEADER, "admin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["code"], "ERROR");
    assert_eq!(body["message"], "no cluster config for code ");
}

#[tokio::test]
async fn clean_exit_record_uses_delete_route() {
    let (app, remote, _) = test_app(remote_success(Value::Null));

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/clean_exit_record/__PROXY___0.0.0_0")
                .header(USER_HEADER, "admin")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"clusterCode":"c1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        remote.calls.lock().unwrap()[0].path,
        "/api/clean_exit_record/__PROXY__"
    );
}

#[tokio::test]
async fn remote_failures_map_to_bad_gateway() {
    let (app, _, _) = test_app(Ok(RemoteResult {
        code: "FAIL".to_string(),
        message: Some("disk full".to_string()),
        data: Value::Null,
    }));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/stop/app1")
                .header(USER_HEADER, "admin")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"clusterCode":"c1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["code"], "FAIL");
    assert_eq!(body["message"], "disk full");
}

fn multipart_request(uri: &str, body: String, boundary: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(USER_HEADER, "admin")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn publish_forwards_the_package_field() {
    let (app, remote, _) = test_app(remote_success(json!({"published": true})));

    let boundary = "qdtestboundary";
    let body = format!(
        "--{boundary}\r\n\
         content-disposition: form-data; name=\"pkg\"; filename=\"demo_1.0.0_1.tgz\"\r\n\
         content-type: application/octet-stream\r\n\r\n\
         tarball-bytes\r\n\
         --{boundary}--\r\n"
    );

    let response = app
        .oneshot(multipart_request("/api/publish?clusterCode=c1", body, boundary))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["code"], "SUCCESS");
    assert_eq!(body["data"], json!({"published": true}));

    let calls = remote.calls.lock().unwrap();
    let package = calls[0].package.as_ref().unwrap();
    assert_eq!(package.file_name, "demo_1.0.0_1.tgz");
    assert_eq!(&package.bytes[..], b"tarball-bytes");
}

#[tokio::test]
async fn publish_without_package_field_is_a_bad_request() {
    let (app, remote, audit) = test_app(remote_success(Value::Null));

    let boundary = "qdtestboundary";
    let body = format!(
        "--{boundary}\r\n\
         content-disposition: form-data; name=\"note\"\r\n\r\n\
         not-a-package\r\n\
         --{boundary}--\r\n"
    );

    let response = app
        .oneshot(multipart_request("/api/publish?clusterCode=c1", body, boundary))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "ERROR_APP_PACKAGE_EMPTY");
    assert_eq!(body["message"], "app package empty");

    assert!(remote.calls.lock().unwrap().is_empty());
    // The attempt is still on the audit trail.
    assert_eq!(audit.entries.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn publish_with_wrong_content_type_is_an_upload_failure() {
    let (app, remote, _) = test_app(remote_success(Value::Null));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/publish?clusterCode=c1")
                .header(USER_HEADER, "admin")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "ERROR_UPLOAD_APP_PACKAGE_FAILED");
    assert!(remote.calls.lock().unwrap().is_empty());
}
