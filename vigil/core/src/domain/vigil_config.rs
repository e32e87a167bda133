// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Vigil Configuration Types
//
// Defines the configuration schema for a Phish-Vigil node:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - HTTP bind settings
// - Interaction token signing (secret, issuer, audience, TTL)
// - Storage backend selection (in-memory or PostgreSQL)
// - Logging and metrics settings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::repository::{PostgresConfig, StorageBackend};

pub const API_VERSION: &str = "100monkeys.ai/v1";
pub const KIND: &str = "VigilConfig";

/// Development signing key. Accepted so `vigil serve` works out of the box, but warned about.
pub const DEV_SECRET_KEY: &str = "AEGIS_DEV_KEY_CHANGE_IN_PROD";

/// Top-level Kubernetes-style configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VigilConfigManifest {
    /// API version (must be "100monkeys.ai/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "VigilConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: VigilConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VigilConfigSpec {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_api_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// HMAC key for interaction tokens (supports "env:VAR_NAME")
    #[serde(default = "default_secret_key")]
    pub secret_key: String,

    #[serde(default = "default_token_issuer")]
    pub token_issuer: String,

    /// Audience claim, scopes tokens to the simulation surface
    #[serde(default = "default_token_audience")]
    pub token_audience: String,

    /// Lifetime of issued interaction tokens
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            token_issuer: default_token_issuer(),
            token_audience: default_token_audience(),
            token_ttl_seconds: default_token_ttl(),
        }
    }
}

impl SecurityConfig {
    /// Resolve the signing key, following an "env:VAR_NAME" indirection if present.
    pub fn resolve_secret(&self) -> anyhow::Result<String> {
        let secret = match self.secret_key.strip_prefix("env:") {
            Some(var) => std::env::var(var)
                .map_err(|_| anyhow::anyhow!("Secret key variable '{}' is not set", var))?,
            None => self.secret_key.clone(),
        };
        if secret.is_empty() {
            anyhow::bail!("spec.security.secret_key resolves to an empty value");
        }
        Ok(secret)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackendKind {
    #[default]
    InMemory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackendKind,

    /// PostgreSQL connection string (supports "env:VAR_NAME")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::InMemory,
            connection_string: None,
            max_connections: default_max_connections(),
        }
    }
}

impl StorageConfig {
    pub fn to_backend(&self) -> anyhow::Result<StorageBackend> {
        match self.backend {
            StorageBackendKind::InMemory => Ok(StorageBackend::InMemory),
            StorageBackendKind::Postgres => {
                let raw = self
                    .connection_string
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("spec.storage.connection_string is required for the postgres backend"))?;
                let connection_string = match raw.strip_prefix("env:") {
                    Some(var) => std::env::var(var)
                        .map_err(|_| anyhow::anyhow!("Connection string variable '{}' is not set", var))?,
                    None => raw.to_string(),
                };
                Ok(StorageBackend::PostgreSQL(PostgresConfig {
                    connection_string,
                    max_connections: self.max_connections,
                }))
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prometheus exporter port
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    5000
}

fn default_secret_key() -> String {
    DEV_SECRET_KEY.to_string()
}

fn default_token_issuer() -> String {
    "phish-vigil".to_string()
}

fn default_token_audience() -> String {
    "aegis-sim".to_string()
}

fn default_token_ttl() -> u64 {
    7 * 24 * 3600
}

fn default_max_connections() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for VigilConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "phish-vigil".to_string(),
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: VigilConfigSpec::default(),
        }
    }
}

impl VigilConfigManifest {
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

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. VIGIL_CONFIG_PATH environment variable
    /// 2. ./vigil-config.yaml (working directory)
    /// 3. ~/.vigil/config.yaml (user home)
    /// 4. /etc/vigil/config.yaml (system, Unix) or C:\ProgramData\Vigil\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("VIGIL_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./vigil-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".vigil").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/vigil/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Vigil\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path (fail if missing/invalid)
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
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup("PV_SECRET_KEY").filter(|v| !v.is_empty()) {
            tracing::info!("Environment override: PV_SECRET_KEY");
            self.spec.security.secret_key = secret;
        }

        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            tracing::info!("Environment override: DATABASE_URL (postgres backend)");
            self.spec.storage.backend = StorageBackendKind::Postgres;
            self.spec.storage.connection_string = Some(url);
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        self.spec
            .observability
            .as_ref()
            .and_then(|o| o.logging.clone())
            .unwrap_or_else(|| LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            })
    }

    pub fn metrics(&self) -> Option<&MetricsConfig> {
        self.spec
            .observability
            .as_ref()
            .and_then(|o| o.metrics.as_ref())
            .filter(|m| m.enabled)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.server.port == 0 {
            anyhow::bail!("spec.server.port must be non-zero");
        }

        let secret = self.spec.security.resolve_secret()?;
        if secret == DEV_SECRET_KEY {
            tracing::warn!("Using the development secret key; set PV_SECRET_KEY before production use");
        }

        if self.spec.security.token_audience.is_empty() {
            anyhow::bail!("spec.security.token_audience cannot be empty");
        }

        if self.spec.security.token_issuer.is_empty() {
            anyhow::bail!("spec.security.token_issuer cannot be empty");
        }

        if self.spec.storage.backend == StorageBackendKind::Postgres
            && self.spec.storage.connection_string.as_deref().map_or(true, str::is_empty)
        {
            anyhow::bail!("spec.storage.connection_string is required for the postgres backend");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest() {
        let manifest = VigilConfigManifest::default();
        assert_eq!(manifest.api_version, API_VERSION);
        assert_eq!(manifest.kind, KIND);
        assert_eq!(manifest.spec.server.port, 5000);
        assert_eq!(manifest.spec.security.token_audience, "aegis-sim");
        assert_eq!(manifest.spec.storage.backend, StorageBackendKind::InMemory);
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_minimal_yaml_fills_defaults() {
        let yaml = r#"
apiVersion: 100monkeys.ai/v1
kind: VigilConfig
metadata:
  name: vigil-staging
spec:
  storage:
    backend: postgres
    connection_string: postgres://vigil@localhost/vigil
"#;
        let manifest = VigilConfigManifest::from_yaml_str(yaml).unwrap();
        assert_eq!(manifest.metadata.name, "vigil-staging");
        assert_eq!(manifest.spec.server.bind_address, "127.0.0.1");
        assert_eq!(manifest.spec.storage.max_connections, 5);
        assert!(manifest.validate().is_ok());
        match manifest.spec.storage.to_backend().unwrap() {
            StorageBackend::PostgreSQL(cfg) => {
                assert_eq!(cfg.connection_string, "postgres://vigil@localhost/vigil")
            }
            other => panic!("expected postgres backend, got {:?}", other),
        }
    }

    #[test]
    fn test_validation() {
        let mut manifest = VigilConfigManifest::default();

        manifest.api_version = "wrong/v1".to_string();
        assert!(manifest.validate().is_err());
        manifest.api_version = API_VERSION.to_string();

        manifest.kind = "NodeConfig".to_string();
        assert!(manifest.validate().is_err());
        manifest.kind = KIND.to_string();

        manifest.metadata.name = "".to_string();
        assert!(manifest.validate().is_err());
        manifest.metadata.name = "vigil".to_string();

        manifest.spec.security.secret_key = "".to_string();
        assert!(manifest.validate().is_err());
        manifest.spec.security.secret_key = "s3cr3t".to_string();

        manifest.spec.storage.backend = StorageBackendKind::Postgres;
        assert!(manifest.validate().is_err());
        manifest.spec.storage.connection_string = Some("postgres://localhost/vigil".to_string());
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut manifest = VigilConfigManifest::default();
        manifest.apply_overrides_from(|key| match key {
            "PV_SECRET_KEY" => Some("rotated".to_string()),
            "DATABASE_URL" => Some("postgres://db/vigil".to_string()),
            _ => None,
        });
        assert_eq!(manifest.spec.security.secret_key, "rotated");
        assert_eq!(manifest.spec.storage.backend, StorageBackendKind::Postgres);
        assert_eq!(
            manifest.spec.storage.connection_string.as_deref(),
            Some("postgres://db/vigil")
        );
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vigil-config.yaml");
        let mut manifest = VigilConfigManifest::default();
        manifest.spec.server.port = 8088;
        manifest.to_yaml_file(&path).unwrap();

        let loaded = VigilConfigManifest::load_or_default(Some(path)).unwrap();
        assert_eq!(loaded.spec.server.port, 8088);
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let missing = PathBuf::from("/nonexistent/vigil-config.yaml");
        assert!(VigilConfigManifest::load_or_default(Some(missing)).is_err());
    }
}
