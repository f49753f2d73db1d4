//! Configuration loading for the CLI

use anyhow::{Context, Result};
use contrail_meter::PollerConfig;
use std::path::{Path, PathBuf};

/// Overrides given on the command line
#[derive(Debug, Default)]
pub struct Overrides {
    pub auth_token: Option<String>,
    pub directory_url: Option<String>,
    pub debug_http: bool,
}

/// Load the poller configuration from `path` (or the default location),
/// then apply command line overrides.
pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<PollerConfig> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let mut config = PollerConfig::load(path.as_deref()).with_context(|| match &path {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Failed to load config from environment".to_string(),
    })?;

    if let Some(token) = overrides.auth_token {
        config.analytics.auth_token = Some(token.clone());
        config.directory.auth_token = Some(token);
    }
    if let Some(url) = overrides.directory_url {
        config.directory.endpoint = url;
    }
    if overrides.debug_http {
        config.analytics.debug = true;
    }

    Ok(config)
}

/// `~/.config/contrail-meter/config.toml`
fn default_config_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| {
        home.join(".config")
            .join("contrail-meter")
            .join("config.toml")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[directory]\nendpoint = \"http://neutron:9696\"\n[analytics]\ndebug = false\n",
        )
        .unwrap();

        let config = load(
            Some(&path),
            Overrides {
                auth_token: Some("tok".to_string()),
                directory_url: None,
                debug_http: true,
            },
        )
        .unwrap();

        assert_eq!(config.directory.endpoint, "http://neutron:9696");
        assert_eq!(config.analytics.auth_token.as_deref(), Some("tok"));
        assert_eq!(config.directory.auth_token.as_deref(), Some("tok"));
        assert!(config.analytics.debug);
    }

    #[test]
    fn test_directory_url_override() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(
            Some(&dir.path().join("missing.toml")),
            Overrides {
                directory_url: Some("http://other:9696".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(config.directory.endpoint, "http://other:9696");
    }
}
