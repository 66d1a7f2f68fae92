// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Quarterdeck CLI

pub mod apps;
pub mod config;

pub use self::apps::AppsCommand;
pub use self::config::ConfigCommand;
