use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sanity: SanityConfig,
    pub site: SiteConfig,
    pub server: ServerConfig,
    /// Shared secret of the revalidation webhook. Unset means every call is rejected.
    pub revalidate_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            project_id: "r96cmfio".to_string(),
            dataset: "production".to_string(),
            api_version: "2023-05-03".to_string(),
            use_cdn: true,
            token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub whatsapp_number: String,
    pub revalidate_seconds: u64,
    pub static_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.tu-sitio.com".to_string(),
            whatsapp_number: "549XXXXXXXXX".to_string(),
            revalidate_seconds: 60,
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000, log_dir: None }
    }
}

impl Config {
    /// Reads `path` when it exists (defaults otherwise), then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("SANITY_PROJECT_ID") {
            self.sanity.project_id = v;
        }
        if let Some(v) = get("SANITY_DATASET") {
            self.sanity.dataset = v;
        }
        if let Some(v) = get("SANITY_API_VERSION") {
            self.sanity.api_version = v;
        }
        if let Some(v) = get("SANITY_USE_CDN") {
            self.sanity.use_cdn = parse_env("SANITY_USE_CDN", &v)?;
        }
        if let Some(v) = get("SANITY_TOKEN") {
            self.sanity.token = Some(v);
        }
        if let Some(v) = get("SITE_URL") {
            self.site.base_url = v;
        }
        if let Some(v) = get("WHATSAPP_NUMBER") {
            self.site.whatsapp_number = v;
        }
        if let Some(v) = get("REVALIDATE_SECONDS") {
            self.site.revalidate_seconds = parse_env("REVALIDATE_SECONDS", &v)?;
        }
        if let Some(v) = get("PORT") {
            self.server.port = parse_env("PORT", &v)?;
        }
        if let Some(v) = get("LOG_DIR") {
            self.server.log_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get("REVALIDATE_SECRET") {
            self.revalidate_secret = Some(v);
        }

        self.site.base_url = self.site.base_url.trim_end_matches('/').to_string();
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CatalogError::Config(format!("invalid value for {}: '{}'", key, value)))
}
