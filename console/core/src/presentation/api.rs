// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Console HTTP Surface
//
// Translates requests into application-service calls; no business logic
// lives here. Sessions come from the fronting SSO proxy via the
// `x-console-user` header and are resolved against the user directory in
// one middleware; everything under /api requires a known principal.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::apps::{AppOps, LifecycleOp, PublishIntake, UNKNOWN_PACKAGE_NAME};
use crate::domain::error::OpError;
use crate::domain::remote::{PackageUpload, PACKAGE_FIELD, REMOTE_SUCCESS};
use crate::domain::session::UserSession;
use crate::infrastructure::directory::UserDirectory;

/// Header the fronting SSO proxy sets to name the authenticated principal.
pub const USER_HEADER: &str = "x-console-user";

const PUBLISH_BODY_LIMIT: usize = 200 * 1024 * 1024;

pub struct AppState {
    pub ops: AppOps,
    pub directory: UserDirectory,
    pub start_time: std::time::Instant,
}

pub fn app(state: Arc<AppState>) -> Router {
    let authed = Router::new()
        .route("/api/apps", get(list_apps))
        .route("/api/delete/{appid}", post(delete_app))
        .route("/api/restart/{appid}", post(restart_app))
        .route("/api/reload/{appid}", post(reload_app))
        .route("/api/start/{appid}", post(start_app))
        .route("/api/stop/{appid}", post(stop_app))
        .route(
            "/api/publish",
            post(publish_app).layer(DefaultBodyLimit::max(PUBLISH_BODY_LIMIT)),
        )
        .route("/api/clean_exit_record/{appid}", delete(clean_exit_record))
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(authed)
        .with_state(state)
}

/// Resolve the trusted principal header into a session, or end the request
/// with 401 before any handler runs.
async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = request
        .headers()
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .and_then(|name| state.directory.lookup(name));

    match session {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => OpError::Unauthenticated.into_response(),
    }
}

impl IntoResponse for OpError {
    fn into_response(self) -> Response {
        let status = match &self {
            OpError::Unauthenticated => StatusCode::UNAUTHORIZED,
            OpError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            OpError::ClusterNotFound { .. } => StatusCode::NOT_FOUND,
            OpError::UploadFailed { .. } | OpError::PackageEmpty => StatusCode::BAD_REQUEST,
            OpError::RemoteCall { .. } | OpError::RemoteOp { .. } => StatusCode::BAD_GATEWAY,
        };
        let body = Json(json!({
            "code": self.code(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    code: &'static str,
    data: T,
}

fn success<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        code: REMOTE_SUCCESS,
        data,
    })
}

/// `clusterCode` travels as a query parameter on list/publish and as a JSON
/// body field on the per-app operations. Absent means empty, which then
/// fails authorization or resolution downstream rather than here.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClusterQuery {
    #[serde(default)]
    cluster_code: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpBody {
    #[serde(default)]
    cluster_code: String,
}

fn client_id_from(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(",")
        })
        .filter(|joined| !joined.is_empty())
        .unwrap_or_else(|| "-".to_string())
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}

async fn list_apps(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<UserSession>,
    Query(query): Query<ClusterQuery>,
) -> Result<impl IntoResponse, OpError> {
    let listing = state.ops.list_apps(&session, &query.cluster_code).await?;
    Ok(success(listing))
}

async fn lifecycle_handler(
    state: Arc<AppState>,
    session: UserSession,
    headers: HeaderMap,
    op: LifecycleOp,
    appid: String,
    body: Option<Json<OpBody>>,
) -> Result<Json<Envelope<Value>>, OpError> {
    let cluster_code = body.map(|Json(b)| b.cluster_code).unwrap_or_default();
    let client_id = client_id_from(&headers);
    let data = state
        .ops
        .lifecycle(&session, &client_id, &cluster_code, op, &appid)
        .await?;
    Ok(success(data))
}

async fn delete_app(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<UserSession>,
    headers: HeaderMap,
    Path(appid): Path<String>,
    body: Option<Json<OpBody>>,
) -> Result<impl IntoResponse, OpError> {
    lifecycle_handler(state, session, headers, LifecycleOp::Delete, appid, body).await
}

async fn restart_app(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<UserSession>,
    headers: HeaderMap,
    Path(appid): Path<String>,
    body: Option<Json<OpBody>>,
) -> Result<impl IntoResponse, OpError> {
    lifecycle_handler(state, session, headers, LifecycleOp::Restart, appid, body).await
}

async fn reload_app(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<UserSession>,
    headers: HeaderMap,
    Path(appid): Path<String>,
    body: Option<Json<OpBody>>,
) -> Result<impl IntoResponse, OpError> {
    lifecycle_handler(state, session, headers, LifecycleOp::Reload, appid, body).await
}

async fn start_app(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<UserSession>,
    headers: HeaderMap,
    Path(appid): Path<String>,
    body: Option<Json<OpBody>>,
) -> Result<impl IntoResponse, OpError> {
    lifecycle_handler(state, session, headers, LifecycleOp::Start, appid, body).await
}

async fn stop_app(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<UserSession>,
    headers: HeaderMap,
    Path(appid): Path<String>,
    body: Option<Json<OpBody>>,
) -> Result<impl IntoResponse, OpError> {
    lifecycle_handler(state, session, headers, LifecycleOp::Stop, appid, body).await
}

async fn clean_exit_record(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<UserSession>,
    headers: HeaderMap,
    Path(appid): Path<String>,
    body: Option<Json<OpBody>>,
) -> Result<impl IntoResponse, OpError> {
    lifecycle_handler(
        state,
        session,
        headers,
        LifecycleOp::CleanExitRecord,
        appid,
        body,
    )
    .await
}

async fn publish_app(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<UserSession>,
    headers: HeaderMap,
    Query(query): Query<ClusterQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, OpError> {
    let client_id = client_id_from(&headers);
    let intake = match multipart {
        Ok(multipart) => read_package(multipart).await,
        Err(rejection) => PublishIntake::Failed {
            message: rejection.to_string(),
        },
    };

    let data = state
        .ops
        .publish(&session, &client_id, &query.cluster_code, intake)
        .await?;
    Ok(success(data))
}

/// Pull the `pkg` file field out of the upload. Any other fields are
/// skipped; a body without the field is the "package empty" case, a parse
/// failure mid-stream is the "upload failed" case.
async fn read_package(mut multipart: Multipart) -> PublishIntake {
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some(PACKAGE_FIELD) {
                    continue;
                }
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| UNKNOWN_PACKAGE_NAME.to_string());
                return match field.bytes().await {
                    Ok(bytes) => PublishIntake::Package(PackageUpload { file_name, bytes }),
                    Err(e) => PublishIntake::Failed {
                        message: e.to_string(),
                    },
                };
            }
            Ok(None) => return PublishIntake::Empty,
            Err(e) => {
                return PublishIntake::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}
