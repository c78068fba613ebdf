use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::archiver::ArchiverConfig;
use crate::notifier::NotifierConfig;
use crate::pipeline::ProcessorConfig;
use crate::scratch::ScratchConfig;
use crate::storage::StorageConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub scratch: ScratchConfig,
    #[serde(default)]
    pub pipeline: ProcessorConfig,
    #[serde(default)]
    pub archiver: ArchiverConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Server configuration (serve mode only)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Invocation authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Expected shared-secret token. Also read from `SECRET_TOKEN`.
    #[serde(default)]
    pub secret_token: Option<String>,
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub scratch: ScratchConfig,
    pub pipeline: ProcessorConfig,
    pub archiver: ArchiverConfig,
    pub storage: StorageConfig,
    pub notifier: NotifierConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub secret_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: "shared_secret".to_string(),
                secret_configured: config
                    .auth
                    .secret_token
                    .as_deref()
                    .is_some_and(|s| !s.is_empty()),
            },
            scratch: config.scratch.clone(),
            pipeline: config.pipeline.clone(),
            archiver: config.archiver.clone(),
            storage: config.storage.clone(),
            notifier: config.notifier.clone(),
            server: config.server.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scratch::CleanupPolicy;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.auth.secret_token.is_none());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.pipeline.download_concurrency, 50);
        assert_eq!(config.pipeline.notification_concurrency, 10);
        assert_eq!(config.scratch.cleanup, CleanupPolicy::Never);
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[auth]
secret_token = "s3cr3t"

[scratch]
root = "/var/lib/archivist"
cleanup = "on_success"

[pipeline]
download_concurrency = 1
validate_sources = true
max_total_bytes = 1048576

[archiver]
program = "/usr/bin/zip"
search_paths = ["/opt/task"]

[storage]
endpoint = "http://localhost:9000"
force_path_style = true

[notifier]
timeout_secs = 5

[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.auth.secret_token.as_deref(), Some("s3cr3t"));
        assert_eq!(config.scratch.cleanup, CleanupPolicy::OnSuccess);
        assert_eq!(config.pipeline.download_concurrency, 1);
        assert!(config.pipeline.validate_sources);
        assert_eq!(config.pipeline.max_total_bytes, Some(1_048_576));
        assert_eq!(config.pipeline.max_file_bytes, None);
        assert_eq!(config.archiver.search_paths.len(), 1);
        assert_eq!(
            config.storage.endpoint.as_deref(),
            Some("http://localhost:9000")
        );
        assert!(config.storage.force_path_style);
        assert_eq!(config.notifier.timeout_secs, 5);
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_sanitized_config_hides_secret() {
        let config = Config {
            auth: AuthConfig {
                secret_token: Some("s3cr3t".to_string()),
            },
            ..Default::default()
        };
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.auth.secret_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("s3cr3t"));
    }

    #[test]
    fn test_sanitized_config_without_secret() {
        let sanitized = SanitizedConfig::from(&Config::default());
        assert!(!sanitized.auth.secret_configured);
        assert_eq!(sanitized.auth.method, "shared_secret");
    }
}
