use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "wordcount.toml";
pub const CONFIG_PATH_ENV: &str = "WORDCOUNT_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct RedditConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// 0 disables the per-post timeout.
    #[serde(default)]
    pub task_timeout_secs: u64,
}

impl SearchConfig {
    pub fn task_timeout(&self) -> Option<Duration> {
        (self.task_timeout_secs > 0).then(|| Duration::from_secs(self.task_timeout_secs))
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            max_pages: default_max_pages(),
            workers: default_workers(),
            task_timeout_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub reddit: RedditConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

fn default_user_agent() -> String {
    format!("wordcount/{}", env!("CARGO_PKG_VERSION"))
}

fn default_page_limit() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    10
}

fn default_workers() -> usize {
    10
}

impl AppConfig {
    /// Loads the config file named by `WORDCOUNT_CONFIG`, or `wordcount.toml`
    /// in the working directory, then applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(client_id) = lookup("WORDCOUNT_CLIENT_ID") {
            self.reddit.client_id = client_id;
        }
        if let Some(client_secret) = lookup("WORDCOUNT_CLIENT_SECRET") {
            self.reddit.client_secret = client_secret;
        }
        if let Some(user_agent) = lookup("WORDCOUNT_USER_AGENT") {
            self.reddit.user_agent = user_agent;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reddit.client_id.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "reddit.client_id".to_string(),
            });
        }
        if self.reddit.client_secret.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "reddit.client_secret".to_string(),
            });
        }
        if self.search.page_limit == 0 || self.search.page_limit > 100 {
            return Err(ConfigError::InvalidValue {
                field: "search.page_limit".to_string(),
                value: self.search.page_limit.to_string(),
            });
        }
        if self.search.max_pages == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.max_pages".to_string(),
                value: self.search.max_pages.to_string(),
            });
        }
        if self.search.workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.workers".to_string(),
                value: self.search.workers.to_string(),
            });
        }
        Ok(())
    }
}
