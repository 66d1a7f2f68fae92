// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Per-user, per-cluster access control.
//!
//! Sessions are resolved upstream (SSO proxy → user directory); this module
//! only decides what an already-identified user may touch. The decision is
//! written as one table rather than nested conditionals so it stays
//! independently testable:
//!
//! | superuser | acl entry | is_admin | outcome                 |
//! |-----------|-----------|----------|-------------------------|
//! | yes       | any       | any      | full access             |
//! | no        | yes       | yes      | full access             |
//! | no        | yes       | no       | filtered by `acl.apps`  |
//! | no        | no        | —        | unauthorized            |
//!
//! Within a filtered scope, an app passes iff its name equals an ACL entry
//! or an entry is the `*` wildcard; an empty list passes nothing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::error::OpError;

/// ACL entry matching every app name.
pub const APP_WILDCARD: &str = "*";

/// Per-cluster grant carried by a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterAcl {
    /// Cluster-level admin: sees and touches every app on the cluster.
    #[serde(default)]
    pub is_admin: bool,

    /// Ordered app-name-or-wildcard entries. Empty means no apps at all.
    #[serde(default)]
    pub apps: Vec<String>,
}

/// The authenticated principal as seen by every handler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub name: String,

    /// Global operator flag (the console-wide role). Bypasses all ACLs.
    #[serde(default)]
    pub superuser: bool,

    /// Cluster code → grant.
    #[serde(default)]
    pub cluster_acl: HashMap<String, ClusterAcl>,
}

/// How much of one cluster's app population a session may see.
#[derive(Debug, Clone, PartialEq)]
pub enum AppScope {
    /// Superuser or cluster admin: everything passes.
    All,
    /// Only apps matching one of these ACL entries pass.
    Named(Vec<String>),
}

impl AppScope {
    pub fn allows(&self, app_name: &str) -> bool {
        match self {
            AppScope::All => true,
            AppScope::Named(entries) => entries
                .iter()
                .any(|entry| entry == APP_WILDCARD || entry == app_name),
        }
    }
}

impl UserSession {
    /// Evaluate the access table for one cluster.
    ///
    /// `Err(Unauthorized)` means the caller must not issue any remote call.
    pub fn cluster_access(&self, cluster_code: &str) -> Result<AppScope, OpError> {
        match (self.superuser, self.cluster_acl.get(cluster_code)) {
            (true, _) => Ok(AppScope::All),
            (false, Some(acl)) if acl.is_admin => Ok(AppScope::All),
            (false, Some(acl)) => Ok(AppScope::Named(acl.apps.clone())),
            (false, None) => Err(OpError::unauthorized_cluster()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(cluster: &str, acl: ClusterAcl) -> UserSession {
        UserSession {
            name: "omar".into(),
            superuser: false,
            cluster_acl: HashMap::from([(cluster.to_string(), acl)]),
        }
    }

    #[test]
    fn superuser_sees_everything() {
        let session = UserSession {
            name: "root".into(),
            superuser: true,
            cluster_acl: HashMap::new(),
        };
        assert_eq!(session.cluster_access("any"), Ok(AppScope::All));
    }

    #[test]
    fn cluster_admin_sees_everything() {
        let session = session_with("c1", ClusterAcl { is_admin: true, apps: vec![] });
        assert_eq!(session.cluster_access("c1"), Ok(AppScope::All));
    }

    #[test]
    fn plain_entry_yields_filtered_scope() {
        let session = session_with(
            "c1",
            ClusterAcl { is_admin: false, apps: vec!["app1".into()] },
        );
        let scope = session.cluster_access("c1").unwrap();
        assert!(scope.allows("app1"));
        assert!(!scope.allows("app2"));
    }

    #[test]
    fn no_entry_is_unauthorized() {
        let session = session_with("c1", ClusterAcl::default());
        assert_eq!(
            session.cluster_access("c2"),
            Err(OpError::unauthorized_cluster())
        );
    }

    #[test]
    fn empty_acl_list_fails_closed() {
        let scope = AppScope::Named(vec![]);
        assert!(!scope.allows("app1"));
        assert!(!scope.allows("*"));
    }

    #[test]
    fn wildcard_entry_passes_every_app() {
        let scope = AppScope::Named(vec!["other".into(), APP_WILDCARD.into()]);
        assert!(scope.allows("app1"));
        assert!(scope.allows("anything-at-all"));
    }
}
