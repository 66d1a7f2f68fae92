// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Tracing Audit Sink
//!
//! Writes one structured `tracing` event per audit entry, target `audit`,
//! so any subscriber (stdout, JSON collector) captures the operation trail.
//! The persistence format behind the subscriber is deliberately out of
//! scope here; the sink's contract is only "never fail the audited op".

use async_trait::async_trait;
use tracing::info;

use crate::domain::audit::{AuditEntry, AuditSink};

pub struct TracingAuditSink {}

impl TracingAuditSink {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for TracingAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, entry: AuditEntry) {
        info!(
            target: "audit",
            id = %entry.id,
            client_id = %entry.client_id,
            op_name = %entry.op_name,
            op_type = %entry.op_type,
            op_log_level = entry.op_log_level.as_str(),
            op_item = %entry.op_item,
            op_item_id = %entry.op_item_id,
            "audit"
        );
    }
}
