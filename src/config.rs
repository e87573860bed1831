use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::github::{self, GitHubError, RepoRef};

pub const DEFAULT_CONFIG_PATH: &str = ".stubs-clippy.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No target repository: pass --repo, set github.repository, or set GITHUB_REPOSITORY")]
    MissingRepository,

    #[error(transparent)]
    Repository(#[from] GitHubError),
}

/// Top-level configuration loaded from .stubs-clippy.toml.
/// All fields are optional; inside GitHub Actions the environment
/// supplies everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// API token. If None, falls back to GITHUB_TOKEN.
    pub token: Option<String>,
    /// Target repository as owner/repo. If None, falls back to GITHUB_REPOSITORY.
    pub repository: Option<String>,
    /// REST API base URL. If None, falls back to GITHUB_API_URL, then api.github.com.
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration from `path`, or from .stubs-clippy.toml in the
    /// current directory when no path is given.
    /// A missing default file yields the default config; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::load_from(path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Config file value takes precedence, falls back to GITHUB_TOKEN.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }

    pub fn api_url(&self) -> String {
        self.github
            .api_url
            .clone()
            .or_else(|| std::env::var("GITHUB_API_URL").ok())
            .unwrap_or_else(|| github::DEFAULT_API_URL.to_string())
    }

    /// An explicit `owner/repo` (from `--repo`) wins over [`Config::repository`].
    pub fn resolve_repository(&self, explicit: Option<&str>) -> Result<RepoRef, ConfigError> {
        match explicit {
            Some(raw) => Ok(github::parse_repository(raw)?),
            None => self.repository(),
        }
    }

    pub fn repository(&self) -> Result<RepoRef, ConfigError> {
        let raw = self
            .github
            .repository
            .clone()
            .or_else(|| std::env::var("GITHUB_REPOSITORY").ok())
            .ok_or(ConfigError::MissingRepository)?;
        Ok(github::parse_repository(&raw)?)
    }
}
