// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Types
//!
//! Provides types functionality for the system.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Implements types

use serde::Deserialize;

/// Wire envelope every console endpoint answers with: `{code, data}` on
/// success, `{code, message}` on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum ConsoleApiError {
    /// The console answered with a non-`SUCCESS` code.
    #[error("{message} ({code})")]
    Api { code: String, message: String },

    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("undecodable response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiEnvelope {
    /// Split the envelope into data-or-error.
    pub fn into_data(self) -> Result<serde_json::Value, ConsoleApiError> {
        if self.code == "SUCCESS" {
            Ok(self.data)
        } else {
            Err(ConsoleApiError::Api {
                code: if self.code.is_empty() {
                    "ERROR".to_string()
                } else {
                    self.code
                },
                message: self.message.unwrap_or_default(),
            })
        }
    }
}
