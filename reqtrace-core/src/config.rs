use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::api::ApiClient;
use crate::models::ProjectId;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "REQTRACE_CONFIG";
pub const URL_ENV: &str = "REQTRACE_URL";
pub const PROJECT_ENV: &str = "REQTRACE_PROJECT";

/// Client settings stored in `config.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend root, without the `/api` prefix
    pub base_url: String,
    /// Project whose requirements are shown
    pub project_id: Option<ProjectId>,
    /// Request timeout; none by default
    pub timeout_secs: Option<u64>,
    /// Prefilled author in new requirement forms
    pub author: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: None,
            timeout_secs: None,
            author: None,
        }
    }
}

impl ClientConfig {
    /// Loads the config from `path`; a missing file yields the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from the default location and applies environment overrides
    pub fn load_default() -> Result<Self> {
        let mut config = Self::load(config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Save the config to the specified path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(&self)?;

        // Ensure parent directories exist
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply `REQTRACE_URL` and `REQTRACE_PROJECT` as returned by `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(project) = lookup(PROJECT_ENV).filter(|p| !p.trim().is_empty()) {
            let id = project
                .trim()
                .parse::<ProjectId>()
                .with_context(|| format!("{} is not a project id: {:?}", PROJECT_ENV, project))?;
            self.project_id = Some(id);
        }
        self.validate()
    }

    /// Check that the base URL parses
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .with_context(|| format!("Invalid backend URL: {:?}", self.base_url))?;
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Client scoped to the configured project
    pub fn api_client(&self) -> Result<ApiClient> {
        let client = ApiClient::new(&self.base_url, self.timeout())
            .with_context(|| format!("Cannot connect to {}", self.base_url))?;
        Ok(client.for_project(self.project_id))
    }
}

/// Gets the path to the config file
pub fn config_path() -> Result<PathBuf> {
    // Check if REQTRACE_CONFIG environment variable is set
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    let config_dir = dirs::config_dir().context("Failed to determine config directory")?;

    Ok(config_dir.join("reqtrace").join("config.yaml"))
}
