use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = ".review-apps.toml";
pub const DEFAULT_HEROKU_API_URL: &str = "https://api.heroku.com";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .review-apps.toml.
/// Every field is optional; in CI the environment usually supplies everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Deployment platform settings
    #[serde(default)]
    pub heroku: HerokuConfig,

    /// Source-control settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Exit non-zero when the run ends in a reported failure
    #[serde(default)]
    pub fail_on_error: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HerokuConfig {
    /// Platform API token. HEROKU_API_TOKEN overrides it.
    pub api_token: Option<String>,
    /// Pipeline the review apps live under. HEROKU_PIPELINE_ID overrides it.
    pub pipeline_id: Option<String>,
    /// HEROKU_API_URL overrides it; defaults to https://api.heroku.com.
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. GITHUB_TOKEN overrides it.
    pub token: Option<String>,
    /// GITHUB_API_URL overrides it; defaults to https://api.github.com.
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration from `path`, or from .review-apps.toml in the current
    /// directory when no path is given. A missing default file yields the
    /// default config; a missing explicit file is an error.
    ///
    /// Environment variables take precedence over the file.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path)?
                } else {
                    Config::default()
                }
            }
        };

        config.merge_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Override file values with whatever the environment sets. Empty values
    /// count as unset, which is what Actions passes for undefined secrets.
    fn merge_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        override_with(&mut self.heroku.api_token, get("HEROKU_API_TOKEN"));
        override_with(&mut self.heroku.pipeline_id, get("HEROKU_PIPELINE_ID"));
        override_with(&mut self.heroku.api_url, get("HEROKU_API_URL"));
        override_with(&mut self.github.token, get("GITHUB_TOKEN"));
        override_with(&mut self.github.api_url, get("GITHUB_API_URL"));

        if let Some(flag) = get("INPUT_FAIL_ON_ERROR").and_then(|v| parse_bool(&v)) {
            self.fail_on_error = Some(flag);
        }
    }

    pub fn heroku_token(&self) -> Option<&str> {
        self.heroku.api_token.as_deref()
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github.token.as_deref()
    }

    pub fn heroku_api_url(&self) -> &str {
        self.heroku
            .api_url
            .as_deref()
            .unwrap_or(DEFAULT_HEROKU_API_URL)
    }

    pub fn github_api_url(&self) -> &str {
        self.github
            .api_url
            .as_deref()
            .unwrap_or(DEFAULT_GITHUB_API_URL)
    }

    pub fn fail_on_error(&self) -> bool {
        self.fail_on_error.unwrap_or(false)
    }
}

fn override_with(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Actions inputs arrive as strings; accept the spellings YAML users reach for.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}
