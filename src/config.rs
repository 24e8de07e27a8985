//! Runtime configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `RABBITWATCH_*` environment variables (nested keys joined with `__`, for
//! example `RABBITWATCH_THRESHOLDS__QUEUE__READY_ERROR=500`), then command
//! line flags.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use rabbitwatch_adapters::rabbitmq::ManagementClient;
use serde::{Deserialize, Deserializer};

use crate::duration::parse_duration;
use crate::health::{Thresholds, AT_RISK_LIMIT};

/// Complete application settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub management: ManagementSettings,
    /// How often the management API is polled.
    #[serde(deserialize_with = "duration_str")]
    pub refresh: Duration,
    pub thresholds: Thresholds,
    /// How many queues the overview lists as most at risk.
    pub at_risk_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            management: ManagementSettings::default(),
            refresh: Duration::from_secs(5),
            thresholds: Thresholds::default(),
            at_risk_limit: AT_RISK_LIMIT,
        }
    }
}

/// Connection settings for the management HTTP API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ManagementSettings {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    #[serde(deserialize_with = "duration_str")]
    pub timeout: Duration,
}

impl Default for ManagementSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:15672".to_string(),
            username: "guest".to_string(),
            password: "guest".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl ManagementSettings {
    /// Build an API client from these settings.
    pub fn client(&self) -> Result<ManagementClient> {
        ManagementClient::builder()
            .endpoint(&self.endpoint)
            .credentials(&self.username, &self.password)
            .timeout(self.timeout)
            .build()
            .with_context(|| format!("invalid management endpoint {}", self.endpoint))
    }
}

/// Values given on the command line, applied over every other layer.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Option<Duration>,
    pub refresh: Option<Duration>,
}

impl CliOverrides {
    pub fn apply(self, settings: &mut Settings) {
        if let Some(endpoint) = self.endpoint {
            settings.management.endpoint = endpoint;
        }
        if let Some(username) = self.username {
            settings.management.username = username;
        }
        if let Some(password) = self.password {
            settings.management.password = password;
        }
        if let Some(timeout) = self.timeout {
            settings.management.timeout = timeout;
        }
        if let Some(refresh) = self.refresh {
            settings.refresh = refresh;
        }
    }
}

impl Settings {
    /// Load settings from an optional config file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings: Settings = builder
            .add_source(env)
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the classifiers or the poller cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.refresh.is_zero() {
            bail!("refresh interval must be greater than zero");
        }
        if self.management.timeout.is_zero() {
            bail!("management timeout must be greater than zero");
        }
        if self.at_risk_limit == 0 {
            bail!("at_risk_limit must be at least 1");
        }

        let node = &self.thresholds.node;
        for (name, warn, error) in [
            ("fd", node.fd_warn_pct, node.fd_error_pct),
            ("erl", node.erl_warn_pct, node.erl_error_pct),
            ("mem", node.mem_warn_pct, node.mem_error_pct),
            ("disk", node.disk_warn_pct, node.disk_error_pct),
            ("sock", node.sock_warn_pct, node.sock_error_pct),
        ] {
            if warn > error {
                bail!("thresholds.node.{name}_warn_pct ({warn}) is above {name}_error_pct ({error})");
            }
        }

        let queue = &self.thresholds.queue;
        if queue.ready_warn > queue.ready_error {
            bail!("thresholds.queue.ready_warn is above ready_error");
        }
        // Utilisation alerts below the threshold, so the error bound is the lower one
        if queue.utilisation_error_pct > queue.utilisation_warn_pct {
            bail!("thresholds.queue.utilisation_error_pct is above utilisation_warn_pct");
        }

        let vhost = &self.thresholds.vhost;
        if vhost.ready_warn > vhost.ready_error {
            bail!("thresholds.vhost.ready_warn is above ready_error");
        }
        if vhost.consumption_lag_warn > vhost.consumption_lag_error {
            bail!("thresholds.vhost.consumption_lag_warn is above consumption_lag_error");
        }

        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix("RABBITWATCH")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn duration_str<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_duration(&value).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn no_env() -> Environment {
        environment().source(Some(config::Map::new()))
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::load_with(None, no_env()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.refresh, Duration::from_secs(5));
        assert_eq!(settings.at_risk_limit, 10);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rabbitwatch.toml");
        fs::write(
            &path,
            r#"
refresh = "2s"
at_risk_limit = 5

[management]
endpoint = "http://broker:15672"
timeout = "1500ms"

[thresholds.queue]
ready_error = 500

[thresholds.node]
mem_warn_pct = 75.0
"#,
        )
        .unwrap();

        let settings = Settings::load_with(Some(&path), no_env()).unwrap();

        assert_eq!(settings.refresh, Duration::from_secs(2));
        assert_eq!(settings.at_risk_limit, 5);
        assert_eq!(settings.management.endpoint, "http://broker:15672");
        assert_eq!(settings.management.username, "guest");
        assert_eq!(settings.management.timeout, Duration::from_millis(1500));
        assert_eq!(settings.thresholds.queue.ready_error, 500);
        assert_eq!(settings.thresholds.queue.ready_warn, 0);
        assert_eq!(settings.thresholds.node.mem_warn_pct, 75.0);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rabbitwatch.toml");
        fs::write(&path, "[management]\nusername = \"file-user\"\n").unwrap();

        let vars = env(&[
            ("RABBITWATCH_MANAGEMENT__USERNAME", "env-user"),
            ("RABBITWATCH_REFRESH", "1m"),
            ("RABBITWATCH_THRESHOLDS__VHOST__READY_ERROR", "50"),
        ]);
        let settings = Settings::load_with(Some(&path), vars).unwrap();

        assert_eq!(settings.management.username, "env-user");
        assert_eq!(settings.refresh, Duration::from_secs(60));
        assert_eq!(settings.thresholds.vhost.ready_error, 50);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(Settings::load_with(Some(&path), no_env()).is_err());
    }

    #[test]
    fn test_bad_duration_is_an_error() {
        let vars = env(&[("RABBITWATCH_REFRESH", "soon")]);
        assert!(Settings::load_with(None, vars).is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut settings = Settings::default();
        settings.thresholds.node.fd_warn_pct = 95.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.thresholds.queue.utilisation_error_pct = 80.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.refresh = Duration::ZERO;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut settings = Settings::default();
        CliOverrides {
            endpoint: Some("https://rabbit.example:15671".into()),
            password: Some("secret".into()),
            refresh: Some(Duration::from_secs(30)),
            ..Default::default()
        }
        .apply(&mut settings);

        assert_eq!(settings.management.endpoint, "https://rabbit.example:15671");
        assert_eq!(settings.management.username, "guest");
        assert_eq!(settings.management.password, "secret");
        assert_eq!(settings.refresh, Duration::from_secs(30));
    }

    #[test]
    fn test_management_client_from_settings() {
        let settings = ManagementSettings::default();
        let client = settings.client().unwrap();
        assert_eq!(client.endpoint(), "http://localhost:15672");
    }
}
