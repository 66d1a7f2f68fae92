// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! The remote-call seam and the one shared result normalization.
//!
//! Every console operation funnels through [`RemoteCaller`] and collapses
//! the outcome with [`normalize_remote`]. The fallback order there is part
//! of the public API contract and must not drift per handler:
//! message = explicit transport-error message, else result message;
//! code = explicit transport-error code, else result code, else `ERROR`.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::domain::cluster::ClusterConfig;
use crate::domain::error::{OpError, GENERIC_ERROR_CODE};

/// Result code the cluster API uses for a successful operation.
pub const REMOTE_SUCCESS: &str = "SUCCESS";

/// HTTP method of a proxied call. Small enum so the domain layer stays off
/// the http crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteMethod {
    Get,
    Post,
    Delete,
}

impl RemoteMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteMethod::Get => "GET",
            RemoteMethod::Post => "POST",
            RemoteMethod::Delete => "DELETE",
        }
    }
}

/// Multipart field name carrying the package, on both sides of the proxy.
pub const PACKAGE_FIELD: &str = "pkg";

/// Package file forwarded to the cluster as a streamed multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// One proxied call to a cluster endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub path: String,
    pub method: RemoteMethod,
    /// Operation-specific override; `None` uses the cluster default.
    pub timeout: Option<Duration>,
    /// Multipart body for publish; `None` for everything else.
    pub package: Option<PackageUpload>,
}

impl RemoteRequest {
    pub fn new(path: impl Into<String>, method: RemoteMethod) -> Self {
        Self {
            path: path.into(),
            method,
            timeout: None,
            package: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_package(mut self, package: PackageUpload) -> Self {
        self.package = Some(package);
        self
    }
}

/// Raw result envelope returned by the cluster-management API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteResult {
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Transport-level failure raised by the adapter (connect, timeout, decode).
///
/// `code` is set only when the transport can name a specific failure; the
/// normalization falls back to `ERROR` otherwise.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteCallError {
    pub code: Option<String>,
    pub message: String,
}

impl RemoteCallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { code: None, message: message.into() }
    }
}

/// Performs one HTTP call against a resolved cluster endpoint.
#[async_trait]
pub trait RemoteCaller: Send + Sync {
    async fn call(
        &self,
        cluster: &ClusterConfig,
        request: RemoteRequest,
    ) -> Result<RemoteResult, RemoteCallError>;
}

/// Collapse an adapter outcome into data-or-uniform-error.
///
/// This is the single place the three-way code/message fallback lives;
/// every handler reuses it so the API behaves identically everywhere.
pub fn normalize_remote(outcome: Result<RemoteResult, RemoteCallError>) -> Result<Value, OpError> {
    match outcome {
        Err(err) => Err(OpError::RemoteCall {
            code: err.code.unwrap_or_else(|| GENERIC_ERROR_CODE.to_string()),
            message: err.message,
        }),
        Ok(result) if result.code == REMOTE_SUCCESS => Ok(result.data),
        Ok(result) => {
            let code = if result.code.is_empty() {
                GENERIC_ERROR_CODE.to_string()
            } else {
                result.code
            };
            Err(OpError::RemoteOp {
                code,
                message: result.message.unwrap_or_default(),
            })
        }
    }
}
