// ABOUTME: Config file loading and connection settings resolution for the CLI.
// ABOUTME: Precedence is flag > environment > ~/.config/analytics/config.toml > default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use analytics_client::AnalyticsClientBuilder;
use analytics_grpc::DEFAULT_TARGET;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Contents of `~/.config/analytics/config.toml`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Server address (e.g., "analytics.example.com:10234")
    #[serde(default)]
    pub target: Option<String>,

    /// Base64 service token issued by the instance
    #[serde(default)]
    pub service_token: Option<String>,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// Seconds to wait for the connection before giving up
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

impl AnalyticsConfig {
    /// Returns the path to the config file (~/.config/analytics/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        // Use XDG-style path on all platforms for consistency
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("analytics").join("config.toml"))
    }

    /// Loads the config file, falling back to defaults if it is missing or unreadable.
    pub fn load() -> Self {
        let Ok(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring config file");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Self = toml::from_str(&content).context("Failed to parse config")?;
        Ok(config)
    }
}

/// Connection settings after merging flags, environment and the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub target: String,
    pub port: Option<u16>,
    pub service_token: Option<String>,
    pub user_agent: Option<String>,
    pub connect_timeout: Duration,
}

impl Settings {
    /// Merge values from the command line (already including environment
    /// variables) with the config file.
    pub fn resolve(
        target: Option<String>,
        port: Option<u16>,
        service_token: Option<String>,
        config: AnalyticsConfig,
    ) -> Self {
        Self {
            target: target
                .or(config.target)
                .unwrap_or_else(|| DEFAULT_TARGET.to_string()),
            port,
            service_token: service_token.or(config.service_token),
            user_agent: config.user_agent,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs.unwrap_or(10)),
        }
    }

    /// Client builder for these settings.
    pub fn builder(&self) -> AnalyticsClientBuilder {
        let builder = match self.port {
            Some(port) => AnalyticsClientBuilder::for_address(&self.target, port),
            None => AnalyticsClientBuilder::new(&self.target),
        };

        let timeout = self.connect_timeout;
        let mut builder =
            builder.with_channel(|c| c.without_keep_alive().with_connect_timeout(timeout));

        if let Some(user_agent) = &self.user_agent {
            builder = builder.with_user_agent(user_agent.clone());
        }
        if let Some(token) = &self.service_token {
            builder = builder.with_service_token(token.clone());
        }

        builder
    }
}
