// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Quarterdeck Console Core
//!
//! Cluster-facing application operations console. Proxies app lifecycle
//! commands (list, start, stop, restart, reload, delete, publish, exit-record
//! cleanup) to remote cluster agents, gated by per-user per-cluster ACLs with
//! an audit record written ahead of every mutating call.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model, application services, adapters, HTTP surface

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
