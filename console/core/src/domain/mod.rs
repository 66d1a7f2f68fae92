// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod app;
pub mod audit;
pub mod cluster;
pub mod console_config;
pub mod error;
pub mod remote;
pub mod session;
