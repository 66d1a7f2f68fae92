// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Console Configuration Types
//
// Defines the configuration schema for Quarterdeck console deployments:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Managed cluster registry (code → endpoint/token/timeout)
// - User directory (principal → superuser flag + per-cluster ACLs)

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::domain::cluster::{ClusterConfig, DEFAULT_REMOTE_TIMEOUT_MS};
use crate::domain::session::{ClusterAcl, UserSession};

pub const CONFIG_API_VERSION: &str = "100monkeys.ai/v1";
pub const CONFIG_KIND: &str = "ConsoleConfig";

/// Top-level console configuration manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// API version (must be "100monkeys.ai/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "ConsoleConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: ConsoleSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable deployment name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleSpec {
    #[serde(default)]
    pub defaults: ConsoleDefaults,

    /// Managed clusters, one entry per cluster code.
    #[serde(default)]
    pub clusters: Vec<ClusterEntry>,

    /// Console users as fed by the fronting SSO proxy.
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleDefaults {
    /// Remote-call timeout applied when a cluster does not set its own.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_REMOTE_TIMEOUT_MS
}

impl Default for ConsoleDefaults {
    fn default() -> Self {
        Self { timeout_ms: DEFAULT_REMOTE_TIMEOUT_MS }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterEntry {
    pub code: String,
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Overrides `spec.defaults.timeout_ms` for this cluster only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ClusterEntry {
    /// Resolve into the runtime config, filling in the deployment default.
    pub fn materialize(&self, defaults: &ConsoleDefaults) -> ClusterConfig {
        ClusterConfig {
            code: self.code.clone(),
            endpoint: self.endpoint.clone(),
            token: self.token.clone(),
            timeout_ms: self.timeout_ms.unwrap_or(defaults.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    pub name: String,

    #[serde(default)]
    pub superuser: bool,

    #[serde(default)]
    pub cluster_acl: HashMap<String, ClusterAcl>,
}

impl UserEntry {
    pub fn into_session(self) -> UserSession {
        UserSession {
            name: self.name,
            superuser: self.superuser,
            cluster_acl: self.cluster_acl,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_version: CONFIG_API_VERSION.to_string(),
            kind: CONFIG_KIND.to_string(),
            metadata: ManifestMetadata {
                name: "quarterdeck".to_string(),
                version: None,
                labels: None,
            },
            spec: ConsoleSpec::default(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. QUARTERDECK_CONFIG_PATH environment variable
    /// 2. ./quarterdeck-config.yaml (working directory)
    /// 3. ~/.quarterdeck/config.yaml (user home)
    /// 4. /etc/quarterdeck/config.yaml (system, Unix) or
    ///    C:\ProgramData\Quarterdeck\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("QUARTERDECK_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./quarterdeck-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".quarterdeck").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/quarterdeck/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Quarterdeck\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!(
                "No configuration file found in standard locations. Using empty defaults."
            );
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    /// This allows container deployments to override config via env vars
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("QUARTERDECK_REMOTE_TIMEOUT_MS") {
            match val.parse::<u64>() {
                Ok(ms) if ms > 0 => {
                    tracing::info!("Environment override: QUARTERDECK_REMOTE_TIMEOUT_MS={}", ms);
                    self.spec.defaults.timeout_ms = ms;
                }
                _ => {
                    tracing::warn!(
                        "Invalid value for QUARTERDECK_REMOTE_TIMEOUT_MS: '{}'. \
                         Expected a positive integer. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != CONFIG_API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                CONFIG_API_VERSION
            );
        }

        if self.kind != CONFIG_KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, CONFIG_KIND);
        }

        let mut codes = HashSet::new();
        for cluster in &self.spec.clusters {
            if cluster.code.is_empty() {
                anyhow::bail!("Cluster with empty code");
            }
            if !codes.insert(cluster.code.as_str()) {
                anyhow::bail!("Duplicate cluster code: '{}'", cluster.code);
            }
            url::Url::parse(&cluster.endpoint).map_err(|e| {
                anyhow::anyhow!("Cluster '{}' endpoint '{}' is not a valid URL: {}",
                    cluster.code, cluster.endpoint, e)
            })?;
        }

        let mut names = HashSet::new();
        for user in &self.spec.users {
            if user.name.is_empty() {
                anyhow::bail!("User with empty name");
            }
            if !names.insert(user.name.as_str()) {
                anyhow::bail!("Duplicate user: '{}'", user.name);
            }
            for code in user.cluster_acl.keys() {
                if !codes.contains(code.as_str()) {
                    anyhow::bail!(
                        "User '{}' has an ACL for unknown cluster '{}'",
                        user.name,
                        code
                    );
                }
            }
        }

        Ok(())
    }

    /// Populated manifest for `quarterdeck config generate`.
    pub fn sample() -> Self {
        Self {
            api_version: CONFIG_API_VERSION.to_string(),
            kind: CONFIG_KIND.to_string(),
            metadata: ManifestMetadata {
                name: "quarterdeck-dev".to_string(),
                version: Some("1".to_string()),
                labels: None,
            },
            spec: ConsoleSpec {
                defaults: ConsoleDefaults::default(),
                clusters: vec![ClusterEntry {
                    code: "dev".to_string(),
                    endpoint: "http://127.0.0.1:9999".to_string(),
                    token: None,
                    timeout_ms: None,
                }],
                users: vec![
                    UserEntry {
                        name: "admin".to_string(),
                        superuser: true,
                        cluster_acl: HashMap::new(),
                    },
                    UserEntry {
                        name: "operator".to_string(),
                        superuser: false,
                        cluster_acl: HashMap::from([(
                            "dev".to_string(),
                            ClusterAcl { is_admin: false, apps: vec!["example".to_string()] },
                        )]),
                    },
                ],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
apiVersion: 100monkeys.ai/v1
kind: ConsoleConfig
metadata:
  name: quarterdeck-test
spec:
  defaults:
    timeout_ms: 12000
  clusters:
    - code: c1
      endpoint: http://10.0.3.21:9999
      token: sekrit
    - code: c2
      endpoint: http://10.0.3.22:9999
      timeout_ms: 45000
  users:
    - name: admin
      superuser: true
    - name: omar
      cluster_acl:
        c1:
          is_admin: false
          apps: ["app1", "*"]
"#;

    #[test]
    fn parses_and_validates_manifest() {
        let config = ConsoleConfig::from_yaml_str(MANIFEST).unwrap();
        config.validate().unwrap();

        assert_eq!(config.metadata.name, "quarterdeck-test");
        assert_eq!(config.spec.clusters.len(), 2);
        assert_eq!(config.spec.users[1].cluster_acl["c1"].apps, vec!["app1", "*"]);
    }

    #[test]
    fn materialize_applies_deployment_default_timeout() {
        let config = ConsoleConfig::from_yaml_str(MANIFEST).unwrap();
        let c1 = config.spec.clusters[0].materialize(&config.spec.defaults);
        let c2 = config.spec.clusters[1].materialize(&config.spec.defaults);
        assert_eq!(c1.timeout_ms, 12_000);
        assert_eq!(c2.timeout_ms, 45_000);
        assert_eq!(c1.token.as_deref(), Some("sekrit"));
    }

    #[test]
    fn validate_rejects_wrong_kind() {
        let mut config = ConsoleConfig::from_yaml_str(MANIFEST).unwrap();
        config.kind = "NodeConfig".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_cluster_codes() {
        let mut config = ConsoleConfig::from_yaml_str(MANIFEST).unwrap();
        let dup = config.spec.clusters[0].clone();
        config.spec.clusters.push(dup);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_acl_for_unknown_cluster() {
        let mut config = ConsoleConfig::from_yaml_str(MANIFEST).unwrap();
        config.spec.users[1]
            .cluster_acl
            .insert("ghost".to_string(), ClusterAcl::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_endpoint() {
        let mut config = ConsoleConfig::from_yaml_str(MANIFEST).unwrap();
        config.spec.clusters[0].endpoint = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn sample_round_trips_through_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarterdeck-config.yaml");

        let sample = ConsoleConfig::sample();
        sample.validate().unwrap();
        sample.to_yaml_file(&path).unwrap();

        let loaded = ConsoleConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded.metadata.name, sample.metadata.name);
        assert_eq!(loaded.spec.clusters.len(), 1);
        assert_eq!(loaded.spec.users.len(), 2);
    }
}
