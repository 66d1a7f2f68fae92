// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// App Operations Service
//
// One pipeline per console operation, all shaped the same way:
// authorize → resolve cluster → audit (mutating ops) → remote call →
// normalize. The per-operation differences (name, method, timeout, risk,
// remote path) live in the `LifecycleOp` table so the pipeline itself is
// written once.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::app::{merge_app_list, AppListing, AppRecord, ListPayload};
use crate::domain::audit::{AuditEntry, AuditSink, RiskLevel};
use crate::domain::cluster::ClusterRegistry;
use crate::domain::error::{OpError, GENERIC_ERROR_CODE};
use crate::domain::remote::{
    normalize_remote, PackageUpload, RemoteCaller, RemoteMethod, RemoteRequest,
};
use crate::domain::session::UserSession;

/// Well-known ids whose 8-character version suffix is stripped before the
/// exit-record path is built. The audit entry keeps the full id.
pub const SENTINEL_APP_IDS: [&str; 2] = ["__PROXY___0.0.0_0", "__ADMIN___0.0.0_0"];
const SENTINEL_SUFFIX_LEN: usize = 8;

/// Audit item id for publish uploads that never produced a file name.
pub const UNKNOWN_PACKAGE_NAME: &str = "UNKNOWN_FILE_NAME";

const LIST_PATH: &str = "/api/apps";
const PUBLISH_PATH: &str = "/api/publish";
const PUBLISH_OP_NAME: &str = "PUBLISH_APP";
const PUBLISH_TIMEOUT: Duration = Duration::from_millis(120_000);

/// The six table-driven mutating operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    Delete,
    Restart,
    Reload,
    Start,
    Stop,
    CleanExitRecord,
}

impl LifecycleOp {
    /// Audit operation name, wire casing.
    pub fn op_name(&self) -> &'static str {
        match self {
            LifecycleOp::Delete => "DELETE_APP",
            LifecycleOp::Restart => "RESTART_APP",
            LifecycleOp::Reload => "RELOAD_APP",
            LifecycleOp::Start => "START_APP",
            LifecycleOp::Stop => "STOP_APP",
            LifecycleOp::CleanExitRecord => "CLEAN_APP_EXIT_RECORD",
        }
    }

    pub fn risk(&self) -> RiskLevel {
        match self {
            LifecycleOp::Delete | LifecycleOp::Stop => RiskLevel::Risky,
            LifecycleOp::Restart | LifecycleOp::Reload | LifecycleOp::Start => RiskLevel::Limit,
            LifecycleOp::CleanExitRecord => RiskLevel::Normal,
        }
    }

    pub fn method(&self) -> RemoteMethod {
        match self {
            LifecycleOp::CleanExitRecord => RemoteMethod::Delete,
            _ => RemoteMethod::Post,
        }
    }

    /// Operation-specific timeout; `None` falls back to the cluster default.
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            LifecycleOp::Restart | LifecycleOp::Stop => Some(Duration::from_millis(30_000)),
            LifecycleOp::Reload => Some(Duration::from_millis(60_000)),
            _ => None,
        }
    }

    /// Remote path on the cluster-management API. Exit-record cleanup strips
    /// the sentinel version suffix here and only here.
    pub fn remote_path(&self, appid: &str) -> String {
        match self {
            LifecycleOp::Delete => format!("/api/delete/{appid}"),
            LifecycleOp::Restart => format!("/api/restart/{appid}"),
            LifecycleOp::Reload => format!("/api/reload/{appid}"),
            LifecycleOp::Start => format!("/api/start/{appid}"),
            LifecycleOp::Stop => format!("/api/stop/{appid}"),
            LifecycleOp::CleanExitRecord => {
                format!("/api/clean_exit_record/{}", strip_sentinel_suffix(appid))
            }
        }
    }

    /// Human fragment for log lines, e.g. `delete app app1`.
    fn describe(&self, appid: &str) -> String {
        match self {
            LifecycleOp::Delete => format!("delete app {appid}"),
            LifecycleOp::Restart => format!("restart app {appid}"),
            LifecycleOp::Reload => format!("reload app {appid}"),
            LifecycleOp::Start => format!("start app {appid}"),
            LifecycleOp::Stop => format!("stop app {appid}"),
            LifecycleOp::CleanExitRecord => format!("clean appExitRecord of {appid}"),
        }
    }
}

fn strip_sentinel_suffix(appid: &str) -> &str {
    if SENTINEL_APP_IDS.contains(&appid) {
        &appid[..appid.len() - SENTINEL_SUFFIX_LEN]
    } else {
        appid
    }
}

/// Upload outcome handed over by the web layer's multipart parse.
///
/// The parse happens in the extractor, before the service runs, but its
/// failure still belongs to the publish pipeline (the audit entry is
/// written either way), so the outcome travels as a value.
#[derive(Debug, Clone)]
pub enum PublishIntake {
    Package(PackageUpload),
    /// Multipart body parsed but carried no package file field.
    Empty,
    /// Multipart body could not be parsed.
    Failed { message: String },
}

/// Application service proxying app-lifecycle operations to cluster agents.
pub struct AppOps {
    registry: Arc<dyn ClusterRegistry>,
    remote: Arc<dyn RemoteCaller>,
    audit: Arc<dyn AuditSink>,
}

impl AppOps {
    pub fn new(
        registry: Arc<dyn ClusterRegistry>,
        remote: Arc<dyn RemoteCaller>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            registry,
            remote,
            audit,
        }
    }

    /// List apps across the cluster, filtered to the session's scope and
    /// merged into one entry per logical app.
    pub async fn list_apps(
        &self,
        session: &UserSession,
        cluster_code: &str,
    ) -> Result<AppListing, OpError> {
        let result = self.list_apps_inner(session, cluster_code).await;
        note_outcome("LIST_APPS", result.is_ok());
        result
    }

    async fn list_apps_inner(
        &self,
        session: &UserSession,
        cluster_code: &str,
    ) -> Result<AppListing, OpError> {
        let scope = session.cluster_access(cluster_code)?;
        let cluster = self.registry.resolve(cluster_code)?;

        let request = RemoteRequest::new(LIST_PATH, RemoteMethod::Get);
        let outcome = self.remote.call(&cluster, request).await;
        let data = normalize_remote(outcome).map_err(|err| {
            tracing::error!("get apps from servers failed: {}", err);
            err
        })?;

        let payload: ListPayload = serde_json::from_value(data).map_err(|e| {
            tracing::error!("get apps from servers failed: {}", e);
            OpError::RemoteCall {
                code: GENERIC_ERROR_CODE.to_string(),
                message: format!("unexpected listing payload: {e}"),
            }
        })?;

        // Flatten per-host slices, stamping each record with its host.
        let mut hosts = Vec::with_capacity(payload.success.len());
        let mut records: Vec<AppRecord> = Vec::new();
        for host in payload.success {
            for mut app in host.apps {
                app.ip = Some(host.ip.clone());
                records.push(app);
            }
            hosts.push(host.ip);
        }

        records.retain(|app| scope.allows(&app.name));

        Ok(AppListing {
            success: merge_app_list(&hosts, records),
            error: payload.error,
        })
    }

    /// Run one table-driven mutating operation end to end.
    pub async fn lifecycle(
        &self,
        session: &UserSession,
        client_id: &str,
        cluster_code: &str,
        op: LifecycleOp,
        appid: &str,
    ) -> Result<Value, OpError> {
        let result = self
            .lifecycle_inner(session, client_id, cluster_code, op, appid)
            .await;
        note_outcome(op.op_name(), result.is_ok());
        result
    }

    async fn lifecycle_inner(
        &self,
        session: &UserSession,
        client_id: &str,
        cluster_code: &str,
        op: LifecycleOp,
        appid: &str,
    ) -> Result<Value, OpError> {
        session.cluster_access(cluster_code)?;
        let cluster = self.registry.resolve(cluster_code)?;

        // Audited only once the cluster resolved; the entry keeps the
        // caller's appid even when the remote path strips a suffix.
        self.audit
            .record(AuditEntry::app_op(client_id, op.op_name(), op.risk(), appid))
            .await;

        let mut request = RemoteRequest::new(op.remote_path(appid), op.method());
        if let Some(timeout) = op.timeout() {
            request = request.with_timeout(timeout);
        }

        let outcome = self.remote.call(&cluster, request).await;
        match normalize_remote(outcome) {
            Ok(data) => {
                tracing::debug!("{} results: {}", op.describe(appid), data);
                Ok(data)
            }
            Err(err) => {
                tracing::error!("{} failed: {}", op.describe(appid), err);
                Err(err)
            }
        }
    }

    /// Publish an app package to the cluster.
    ///
    /// The audit entry is written before anything else, whatever the upload
    /// outcome was; a failed or empty upload is then surfaced without any
    /// remote call.
    pub async fn publish(
        &self,
        session: &UserSession,
        client_id: &str,
        cluster_code: &str,
        intake: PublishIntake,
    ) -> Result<Value, OpError> {
        let result = self
            .publish_inner(session, client_id, cluster_code, intake)
            .await;
        note_outcome(PUBLISH_OP_NAME, result.is_ok());
        result
    }

    async fn publish_inner(
        &self,
        session: &UserSession,
        client_id: &str,
        cluster_code: &str,
        intake: PublishIntake,
    ) -> Result<Value, OpError> {
        let item_id = match &intake {
            PublishIntake::Package(pkg) => pkg.file_name.clone(),
            PublishIntake::Empty | PublishIntake::Failed { .. } => {
                UNKNOWN_PACKAGE_NAME.to_string()
            }
        };
        self.audit
            .record(AuditEntry::app_op(
                client_id,
                PUBLISH_OP_NAME,
                RiskLevel::Normal,
                item_id,
            ))
            .await;

        let package = match intake {
            PublishIntake::Package(pkg) => pkg,
            PublishIntake::Empty => {
                tracing::error!("publish app failed: {}", OpError::PackageEmpty);
                return Err(OpError::PackageEmpty);
            }
            PublishIntake::Failed { message } => {
                tracing::error!("publish app failed: {}", message);
                return Err(OpError::UploadFailed { message });
            }
        };

        session.cluster_access(cluster_code)?;
        let cluster = self.registry.resolve(cluster_code)?;
        tracing::info!(
            "publish \"{}\" to server: {}",
            package.file_name,
            cluster.endpoint
        );

        let request = RemoteRequest::new(PUBLISH_PATH, RemoteMethod::Post)
            .with_timeout(PUBLISH_TIMEOUT)
            .with_package(package);

        let outcome = self.remote.call(&cluster, request).await;
        normalize_remote(outcome).map_err(|err| {
            tracing::error!("publish app failed: {}", err);
            err
        })
    }
}

fn note_outcome(op: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("console_ops_total", "op" => op, "outcome" => outcome).increment(1);
}
