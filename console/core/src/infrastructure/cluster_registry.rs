// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::collections::HashMap;

use crate::domain::cluster::{ClusterConfig, ClusterRegistry};
use crate::domain::console_config::ConsoleConfig;
use crate::domain::error::OpError;

/// Registry backed by the loaded manifest. Built once at startup and shared
/// read-only; config changes require a restart.
pub struct StaticClusterRegistry {
    clusters: HashMap<String, ClusterConfig>,
}

impl StaticClusterRegistry {
    pub fn from_config(config: &ConsoleConfig) -> Self {
        let clusters = config
            .spec
            .clusters
            .iter()
            .map(|entry| (entry.code.clone(), entry.materialize(&config.spec.defaults)))
            .collect();
        Self { clusters }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

impl ClusterRegistry for StaticClusterRegistry {
    fn resolve(&self, code: &str) -> Result<ClusterConfig, OpError> {
        self.clusters.get(code).cloned().ok_or_else(|| OpError::ClusterNotFound {
            cluster: code.to_string(),
        })
    }
}
