// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::collections::HashMap;

use crate::domain::console_config::ConsoleConfig;
use crate::domain::session::UserSession;

/// Config-backed user directory. The console trusts the fronting SSO proxy
/// for authentication and only looks the principal up here; an unknown name
/// yields no session and the request stays anonymous.
pub struct UserDirectory {
    users: HashMap<String, UserSession>,
}

impl UserDirectory {
    pub fn from_config(config: &ConsoleConfig) -> Self {
        let users = config
            .spec
            .users
            .iter()
            .cloned()
            .map(|entry| (entry.name.clone(), entry.into_session()))
            .collect();
        Self { users }
    }

    pub fn lookup(&self, name: &str) -> Option<UserSession> {
        self.users.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
