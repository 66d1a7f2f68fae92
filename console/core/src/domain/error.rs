// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Uniform operation errors surfaced by every console handler.
//!
//! The web contract is a `{code, message}` pair. Variants preserve the wire
//! `code` strings verbatim; `Display` carries the `message` half.

use thiserror::Error;

/// Wire code used for authorization, cluster-lookup and unclassified failures.
pub const GENERIC_ERROR_CODE: &str = "ERROR";

/// Terminal failure of one console operation.
///
/// Nothing here is retried or recovered; the presentation layer maps each
/// variant to an HTTP status and serializes `{code, message}` unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    /// No authenticated principal on the request (missing or unknown user).
    #[error("user not authenticated")]
    Unauthenticated,

    /// The session has neither the superuser flag nor an ACL entry for the
    /// requested cluster. No remote call is made.
    #[error("{message}")]
    Unauthorized { message: String },

    /// The cluster code is not present in the registry.
    #[error("no cluster config for code {cluster}")]
    ClusterNotFound { cluster: String },

    /// The multipart upload could not be parsed.
    #[error("{message}")]
    UploadFailed { message: String },

    /// The upload carried no package file field.
    #[error("app package empty")]
    PackageEmpty,

    /// The remote adapter failed at the transport level (network, timeout,
    /// undecodable body). `code` is already normalized.
    #[error("{message}")]
    RemoteCall { code: String, message: String },

    /// The remote cluster API answered, but with a non-`SUCCESS` code.
    #[error("{message}")]
    RemoteOp { code: String, message: String },
}

impl OpError {
    /// The wire `code` half of the uniform `{code, message}` shape.
    pub fn code(&self) -> &str {
        match self {
            OpError::Unauthenticated
            | OpError::Unauthorized { .. }
            | OpError::ClusterNotFound { .. } => GENERIC_ERROR_CODE,
            OpError::UploadFailed { .. } => "ERROR_UPLOAD_APP_PACKAGE_FAILED",
            OpError::PackageEmpty => "ERROR_APP_PACKAGE_EMPTY",
            OpError::RemoteCall { code, .. } | OpError::RemoteOp { code, .. } => code,
        }
    }

    pub fn unauthorized_cluster() -> Self {
        OpError::Unauthorized {
            message: "Cluster unauthorized".to_string(),
        }
    }
}
