use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_START_DATE: &str = "2025-01-01T00:00:00Z";
pub const DEFAULT_SHEET_NAME: &str = "Tickets";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 900;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub freshdesk: Option<FreshdeskConfig>,
    pub google_sheets: Option<GoogleSheetsConfig>,
    pub local_sheet: Option<LocalSheetConfig>,
    pub sync: Option<SyncConfig>,
    /// Extra agent names keyed by Freshdesk responder id.
    pub agents: Option<HashMap<String, String>>,
    /// Per-profile sheet targets, keyed by profile name.
    pub profiles: Option<HashMap<String, ProfileTarget>>,
}

#[derive(Debug, Deserialize)]
pub struct FreshdeskConfig {
    pub domain: String,
    pub api_key: String,
    pub start_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleSheetsConfig {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub access_token: Option<String>,
    pub sheet_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LocalSheetConfig {
    pub path: PathBuf,
    pub sheet_name: Option<String>,
}

/// Overrides the spreadsheet (or local file) and sheet one profile writes to.
#[derive(Debug, Deserialize, Default)]
pub struct ProfileTarget {
    pub spreadsheet_id: Option<String>,
    pub sheet_name: Option<String>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SyncConfig {
    pub poll_interval_secs: Option<u64>,
}

impl FreshdeskConfig {
    pub fn start_date(&self) -> &str {
        self.start_date.as_deref().unwrap_or(DEFAULT_START_DATE)
    }
}

impl GoogleSheetsConfig {
    /// `GOOGLE_ACCESS_TOKEN` wins over the token stored in the config file.
    pub fn resolved_token(&self) -> Option<String> {
        std::env::var("GOOGLE_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.access_token.clone())
    }
}

impl AppConfig {
    pub fn poll_interval_secs(&self) -> u64 {
        self.sync
            .as_ref()
            .and_then(|s| s.poll_interval_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
    }

    pub fn profile_target(&self, profile: &str) -> Option<&ProfileTarget> {
        self.profiles.as_ref()?.get(profile)
    }
}

fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("TICKETSYNC_CONFIG") {
        return PathBuf::from(path);
    }
    data_dir().join("config.toml")
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ticketsync")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig =
        toml::from_str(contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}
