// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Cluster connection configuration and its lookup seam.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::error::OpError;

/// Fallback remote-call timeout when neither the cluster nor the operation
/// names one.
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 15_000;

/// Connection options for one managed cluster, resolved from its code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub code: String,

    /// Base URL of the cluster-management API, e.g. `http://10.0.3.21:9999`.
    pub endpoint: String,

    /// Bearer token forwarded on every proxied call, when the cluster
    /// requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Default per-call timeout; operations may override it.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_REMOTE_TIMEOUT_MS
}

impl ClusterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Maps a cluster code to its connection options.
///
/// Resolution is a read-only lookup; an unknown code is the uniform
/// `ERROR`-coded failure every pipeline checks before doing anything else.
pub trait ClusterRegistry: Send + Sync {
    fn resolve(&self, code: &str) -> Result<ClusterConfig, OpError>;
}
