// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod audit;
pub mod cluster_registry;
pub mod directory;
pub mod remote;
