//! Configuration loading and types

use std::path::{Path, PathBuf};
use std::time::Duration;

use assetport_client::http::{DEFAULT_SERVER_URL, DEFAULT_TIMEOUT};
use assetport_client::{Credentials, HttpClient};
use eyre::{WrapErr, eyre};
use serde::{Deserialize, Serialize};

/// Settings for talking to the console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Console base URL
    pub server_url: String,
    /// Account API key (`CT...`)
    pub account_key: Option<String>,
    /// Organization API key (`OT...`)
    pub org_key: Option<String>,
    /// Pre-issued bearer token
    pub token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Verify the server's TLS certificate
    pub validate_certificate: bool,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// File the settings were read from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            account_key: None,
            org_key: None,
            token: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            validate_certificate: true,
            log_level: "warn".to_string(),
            source: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .wrap_err_with(|| format!("invalid config {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load the explicit path if given, else the first file found in the
    /// default locations, else defaults; then apply environment overrides
    ///
    /// # Errors
    /// Returns error if a config file exists but cannot be read or parsed
    pub fn load_default(explicit: Option<&Path>) -> eyre::Result<Self> {
        let config = match explicit {
            Some(path) => Self::load(path)?,
            None => Self::load_first(&default_paths())?,
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    fn load_first(paths: &[PathBuf]) -> eyre::Result<Self> {
        match paths.iter().find(|path| path.is_file()) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Override keys from `ASSETPORT_ACCOUNT_KEY` and `ASSETPORT_ORG_KEY`
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = lookup("ASSETPORT_ACCOUNT_KEY") {
            self.account_key = Some(key);
        }
        if let Some(key) = lookup("ASSETPORT_ORG_KEY") {
            self.org_key = Some(key);
        }
        self
    }

    /// Credential to authenticate with: organization key, then account key,
    /// then bearer token
    ///
    /// # Errors
    /// Returns error if none is configured
    pub fn credentials(&self) -> eyre::Result<Credentials> {
        let present = |v: &Option<String>| v.clone().filter(|v| !v.trim().is_empty());
        present(&self.org_key)
            .map(Credentials::OrgKey)
            .or_else(|| present(&self.account_key).map(Credentials::AccountKey))
            .or_else(|| present(&self.token).map(Credentials::Bearer))
            .ok_or_else(|| {
                eyre!(
                    "no API credentials configured; \
                     set org_key in the config file or ASSETPORT_ORG_KEY"
                )
            })
    }

    /// Account-level credential, required for custom integration management
    ///
    /// # Errors
    /// Returns error if no account key or token is configured
    pub fn account_credentials(&self) -> eyre::Result<Credentials> {
        let present = |v: &Option<String>| v.clone().filter(|v| !v.trim().is_empty());
        present(&self.account_key)
            .map(Credentials::AccountKey)
            .or_else(|| present(&self.token).map(Credentials::Bearer))
            .ok_or_else(|| {
                eyre!(
                    "an account key is required; \
                     set account_key in the config file or ASSETPORT_ACCOUNT_KEY"
                )
            })
    }

    /// Build an HTTP client from these settings
    ///
    /// # Errors
    /// Returns error if the server URL or timeout is invalid
    pub fn http_client(&self, credentials: Credentials) -> eyre::Result<HttpClient> {
        let client = HttpClient::builder(credentials)
            .server_url(&self.server_url)
            .timeout(Duration::from_secs(self.timeout_secs))
            .validate_certificate(self.validate_certificate)
            .build()?;
        Ok(client)
    }
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("assetport.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("assetport/assetport.toml"));
    }
    paths
}
