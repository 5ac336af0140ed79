use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Run configuration, injected into every command. No module-level ids:
/// the spreadsheet, calendar, and time placement all come from here.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Spreadsheet holding the scheduled-events table
    pub sheet_id: String,

    /// Calendar that gets fully replaced on every sync
    pub calendar_id: String,

    /// IANA time zone name stamped onto every event
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Fixed UTC offset (hours) used to place the 09:00-17:00 window
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    /// OAuth credentials
    pub google: GoogleConfig,
}

/// OAuth client credentials for the Google APIs
#[derive(Debug, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
}

fn default_time_zone() -> String {
    "America/New_York".to_string()
}

fn default_utc_offset_hours() -> i32 {
    -4
}

impl Config {
    pub fn utc_offset(&self) -> chrono::FixedOffset {
        chrono::FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| chrono::FixedOffset::east_opt(0).unwrap())
    }
}

/// Stored OAuth tokens for the single authenticated account
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Tokens {
    #[serde(default)]
    pub google: Option<AccountTokens>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Get the config directory path (~/.config/runcal)
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("runcal");
    Ok(config_dir)
}

/// Get the config file path (~/.config/runcal/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the tokens file path (~/.config/runcal/tokens.json)
pub fn tokens_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("tokens.json"))
}

/// Load config from ~/.config/runcal/config.toml
pub fn load_config() -> Result<Config> {
    let path = config_path()?;

    if !path.exists() {
        anyhow::bail!(
            "Config file not found at {}\n\n\
            Create it with your spreadsheet, calendar, and OAuth credentials:\n\n\
            sheet_id = \"your-spreadsheet-id\"\n\
            calendar_id = \"your-calendar-id@group.calendar.google.com\"\n\
            time_zone = \"America/New_York\"\n\
            utc_offset_hours = -4\n\n\
            [google]\n\
            client_id = \"your-client-id.apps.googleusercontent.com\"\n\
            client_secret = \"your-client-secret\"",
            path.display()
        );
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

    Ok(config)
}

/// Load tokens from ~/.config/runcal/tokens.json
pub fn load_tokens() -> Result<Tokens> {
    let path = tokens_path()?;

    if !path.exists() {
        return Ok(Tokens::default());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read tokens file at {}", path.display()))?;

    let tokens: Tokens = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse tokens file at {}", path.display()))?;

    Ok(tokens)
}

/// Save tokens to ~/.config/runcal/tokens.json
pub fn save_tokens(tokens: &Tokens) -> Result<()> {
    let path = tokens_path()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory at {}", parent.display())
        })?;
    }

    let contents = serde_json::to_string_pretty(tokens).context("Failed to serialize tokens")?;

    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write tokens file at {}", path.display()))?;

    Ok(())
}
