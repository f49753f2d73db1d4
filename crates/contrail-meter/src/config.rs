//! Poller configuration

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix, e.g. `CONTRAIL_METER__ANALYTICS__DEBUG=true`.
pub const ENV_PREFIX: &str = "CONTRAIL_METER";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollerConfig {
    #[serde(default)]
    pub analytics: AnalyticsSettings,

    #[serde(default)]
    pub directory: DirectorySettings,
}

/// Settings for the analytics REST client
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsSettings {
    /// Per-request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Dump every request and response at debug level
    #[serde(default)]
    pub debug: bool,

    /// Token sent as `X-Auth-Token` by drivers that authenticate
    #[serde(default)]
    pub auth_token: Option<String>,
}

/// Settings for the resource directory (Neutron) client
#[derive(Debug, Clone, Deserialize)]
pub struct DirectorySettings {
    #[serde(default = "default_directory_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub auth_token: Option<String>,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

fn default_http_timeout() -> u64 {
    600
}

fn default_directory_endpoint() -> String {
    "http://localhost:9696".to_string()
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            debug: false,
            auth_token: None,
        }
    }
}

impl AnalyticsSettings {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            endpoint: default_directory_endpoint(),
            auth_token: None,
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl DirectorySettings {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl PollerConfig {
    /// Load configuration from an optional file and the environment.
    ///
    /// A missing file is not an error; environment variables win over file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let config = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PollerConfig::default();
        assert_eq!(config.analytics.http_timeout(), Duration::from_secs(600));
        assert!(!config.analytics.debug);
        assert!(config.analytics.auth_token.is_none());
        assert_eq!(config.directory.endpoint, "http://localhost:9696");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PollerConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.analytics.http_timeout_secs, 600);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meter.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[analytics]
http_timeout_secs = 5
debug = true
auth_token = "secret"

[directory]
endpoint = "http://neutron:9696"
"#
        )
        .unwrap();

        let config = PollerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.analytics.http_timeout(), Duration::from_secs(5));
        assert!(config.analytics.debug);
        assert_eq!(config.analytics.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.directory.endpoint, "http://neutron:9696");
        assert_eq!(config.directory.http_timeout_secs, 600);
    }
}
