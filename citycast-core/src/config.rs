use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::{Path, PathBuf}};

use crate::{model::CityQuery, provider::weatherapi::DEFAULT_BASE_URL};

/// Environment variable that takes precedence over the key stored on disk.
pub const API_KEY_ENV: &str = "CITYCAST_API_KEY";

pub const DEFAULT_FORECAST_DAYS: u8 = 4;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// days = 4
///
/// [[cities]]
/// city = "London"
/// latitude = "51.52"
/// longitude = "-0.11"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Forecast horizon in days, at least 1.
    #[serde(default = "default_days")]
    pub days: u8,

    #[serde(default = "default_cities")]
    pub cities: Vec<CityQuery>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_days() -> u8 {
    DEFAULT_FORECAST_DAYS
}

fn default_cities() -> Vec<CityQuery> {
    vec![
        CityQuery::new("New York", "40.71", "-74.01"),
        CityQuery::new("London", "51.52", "-0.11"),
        CityQuery::new("Sydney", "-33.88", "151.22"),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            days: default_days(),
            cities: default_cities(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "citycast", "citycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key from the environment if set, otherwise from the file.
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    pub fn validate(&self) -> Result<()> {
        if self.days == 0 {
            bail!("`days` must be at least 1");
        }
        if self.base_url.trim().is_empty() {
            bail!("`base_url` must not be empty");
        }

        let mut seen = HashSet::new();
        for city in &self.cities {
            if city.city.trim().is_empty() {
                bail!("City names must not be empty");
            }
            if city.latitude.trim().is_empty() || city.longitude.trim().is_empty() {
                bail!("City '{}' is missing latitude or longitude", city.city);
            }
            if !seen.insert(city_key(&city.city)) {
                bail!("City '{}' is configured more than once", city.city);
            }
        }

        Ok(())
    }

    /// Add a city, or replace the coordinates of one with the same name.
    pub fn upsert_city(&mut self, query: CityQuery) {
        match self.cities.iter_mut().find(|c| same_city(&c.city, &query.city)) {
            Some(existing) => *existing = query,
            None => self.cities.push(query),
        }
    }

    /// Returns `true` if a city was removed.
    pub fn remove_city(&mut self, name: &str) -> bool {
        let before = self.cities.len();
        self.cities.retain(|c| !same_city(&c.city, name));
        self.cities.len() != before
    }
}

/// City names compare case-insensitively, Unicode-aware.
fn city_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn same_city(a: &str, b: &str) -> bool {
    city_key(a) == city_key(b)
}

fn resolve_api_key(env: Option<String>, stored: Option<&str>) -> Option<String> {
    env.filter(|k| !k.trim().is_empty())
        .or_else(|| stored.filter(|k| !k.trim().is_empty()).map(str::to_owned))
}
