use std::{fs::File, str::FromStr, time::Duration};

use anyhow::{anyhow, Context, Result};
use camino::Utf8PathBuf;
use log::LevelFilter;
use masjid_cms_client::ApiToken;
use serde::{Deserialize, Serialize};
use xdg::BaseDirectories;

const APP_PREFIX: &str = "masjid-seed";

/// Importer settings. Every field has a default, so the config file is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cms_url: String,
    pub api_token: Option<ApiToken>,
    pub seed_dir: Utf8PathBuf,
    /// Import into an in-memory store instead of the CMS
    pub dry_run: bool,
    pub log_level: String,
    pub log_file: Option<Utf8PathBuf>,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cms_url: "http://localhost:1337".to_string(),
            api_token: None,
            seed_dir: Utf8PathBuf::from("data/seed"),
            dry_run: false,
            log_level: "info".to_string(),
            log_file: None,
            timeout_secs: masjid_cms_client::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Load from the XDG config dir if a config file exists, then apply env overrides
    pub fn load() -> Result<Self> {
        let path = BaseDirectories::with_prefix(APP_PREFIX)?.find_config_file("config.json");
        let mut config = match path {
            Some(path) => {
                let file = File::open(&path).context("error opening config file")?;
                serde_json::from_reader(&file).context("error deserialising config file")?
            }
            None => Config::default(),
        };
        config.apply_env(|k| std::env::var(k).ok());

        Ok(config)
    }

    /// Connection settings for the CMS may come from the environment
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("CMS_URL").filter(|s| !s.is_empty()) {
            self.cms_url = url;
        }
        if let Some(token) = var("CMS_API_TOKEN").filter(|s| !s.is_empty()) {
            self.api_token = Some(ApiToken::from(token));
        }
    }

    pub fn level(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| anyhow!("invalid log level {:?}", self.log_level))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"seed_dir": "seeds", "dry_run": true}"#).unwrap();

        assert_eq!(config.seed_dir, Utf8PathBuf::from("seeds"));
        assert!(config.dry_run);
        assert_eq!(config.cms_url, "http://localhost:1337");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|k| match k {
            "CMS_URL" => Some("https://cms.example.org".to_string()),
            "CMS_API_TOKEN" => Some("abc".to_string()),
            _ => None,
        });

        assert_eq!(config.cms_url, "https://cms.example.org");
        assert_eq!(config.api_token.map(String::from).as_deref(), Some("abc"));
    }

    #[test]
    fn test_empty_env_ignored() {
        let mut config = Config::default();
        config.apply_env(|_| Some(String::new()));

        assert_eq!(config.cms_url, "http://localhost:1337");
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_level() {
        let mut config = Config::default();
        assert_eq!(config.level().unwrap(), LevelFilter::Info);

        config.log_level = "DEBUG".to_string();
        assert_eq!(config.level().unwrap(), LevelFilter::Debug);

        config.log_level = "loud".to_string();
        assert!(config.level().is_err());
    }
}
