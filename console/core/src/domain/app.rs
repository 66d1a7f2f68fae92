// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! App listing payloads and the multi-host merge.
//!
//! The cluster API answers `GET /api/apps` with one slice per reachable
//! host. Hosts that answered land in `success`, hosts that failed land in
//! `error`; the console flattens the slices, filters them through the
//! session's app scope, and merges records of the same logical app (merge
//! key: `name`) into a single entry describing its multi-host presence.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One app as reported by a single host.
///
/// Only the fields the console reasons about are typed; everything else the
/// cluster reports rides along in `extra` and is returned untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRecord {
    pub name: String,

    /// Host the record came from. Filled in while flattening per-host slices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_num: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect_worker_num: Option<u32>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One host's slice of the cluster listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostApps {
    pub ip: String,
    #[serde(default)]
    pub apps: Vec<AppRecord>,
}

/// Raw `data` payload of the remote listing call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPayload {
    #[serde(default)]
    pub success: Vec<HostApps>,
    /// Per-host failures, passed through untouched.
    #[serde(default)]
    pub error: Vec<Value>,
}

/// One logical app merged across every host that reported it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedApp {
    pub name: String,

    /// Hosts the app was seen on, ordered like the responding-host list.
    pub ips: Vec<String>,

    /// Newest scalar metadata wins (last record in host order).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Running workers summed across hosts.
    pub worker_num: u32,

    /// Expected workers summed across hosts.
    pub expect_worker_num: u32,

    /// The unmodified per-host records behind this entry.
    pub instances: Vec<AppRecord>,
}

/// The merged listing handed back to the web layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppListing {
    pub success: Vec<MergedApp>,
    pub error: Vec<Value>,
}

/// Combine per-host records into one entry per logical app.
///
/// `hosts` is the responding-host list in answer order; it fixes the order
/// of each entry's `ips` (hosts the listing never named sort last).
/// Entries keep the first-seen order of their app names.
pub fn merge_app_list(hosts: &[String], records: Vec<AppRecord>) -> Vec<MergedApp> {
    let host_rank: HashMap<&str, usize> = hosts
        .iter()
        .enumerate()
        .map(|(rank, ip)| (ip.as_str(), rank))
        .collect();

    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, MergedApp> = HashMap::new();

    for record in records {
        let entry = merged.entry(record.name.clone()).or_insert_with(|| {
            order.push(record.name.clone());
            MergedApp {
                name: record.name.clone(),
                ips: Vec::new(),
                version: None,
                status: None,
                worker_num: 0,
                expect_worker_num: 0,
                instances: Vec::new(),
            }
        });

        if let Some(ip) = &record.ip {
            if !entry.ips.contains(ip) {
                entry.ips.push(ip.clone());
            }
        }
        if record.version.is_some() {
            entry.version = record.version.clone();
        }
        if record.status.is_some() {
            entry.status = record.status.clone();
        }
        // Counts come from the remote; never let a bogus reply overflow.
        entry.worker_num = entry.worker_num.saturating_add(record.worker_num.unwrap_or(0));
        entry.expect_worker_num = entry
            .expect_worker_num
            .saturating_add(record.expect_worker_num.unwrap_or(0));
        entry.instances.push(record);
    }

    let mut result: Vec<MergedApp> = order
        .into_iter()
        .filter_map(|name| merged.remove(&name))
        .collect();
    for app in &mut result {
        app.ips
            .sort_by_key(|ip| host_rank.get(ip.as_str()).copied().unwrap_or(usize::MAX));
    }
    result
}
