// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Audit records for mutating operations.
//!
//! Every mutating handler writes exactly one entry before its remote call
//! goes out. Entries carry a fixed risk level per operation; where they end
//! up (log pipeline, SIEM export) is the sink's business, not this layer's.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operation category recorded on console-originated entries.
pub const OP_TYPE_PAGE_MODEL: &str = "PAGE_MODEL";

/// Target kind for app-lifecycle entries.
pub const OP_ITEM_APP: &str = "APP";

/// Risk classification of a mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    HighRisk,
    Risky,
    Limit,
    Normal,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::HighRisk => "HIGH_RISK",
            RiskLevel::Risky => "RISKY",
            RiskLevel::Limit => "LIMIT",
            RiskLevel::Normal => "NORMAL",
        }
    }
}

/// One audit record. Field names keep the wire casing of the upstream
/// oplog consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    /// Requesting client address(es), `-` when unknown.
    pub client_id: String,
    pub op_name: String,
    pub op_type: String,
    pub op_log_level: RiskLevel,
    pub op_item: String,
    pub op_item_id: String,
}

impl AuditEntry {
    /// Entry for one app-lifecycle operation.
    pub fn app_op(
        client_id: impl Into<String>,
        op_name: impl Into<String>,
        risk: RiskLevel,
        item_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            at: Utc::now(),
            client_id: client_id.into(),
            op_name: op_name.into(),
            op_type: OP_TYPE_PAGE_MODEL.to_string(),
            op_log_level: risk,
            op_item: OP_ITEM_APP.to_string(),
            op_item_id: item_id.into(),
        }
    }
}

/// Receives audit entries. Sinks must not fail the operation being audited.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: AuditEntry);
}
