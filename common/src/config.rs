use std::fmt;
use std::path::Path;

use serde::Deserialize;

/// Style used when the secrets document does not name one.
pub const DEFAULT_STYLE_ID: &str = "mapbox/streets-v12";

/// Errors raised while loading the secrets document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read secrets file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed secrets document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Credentials loaded once at startup.
///
/// All keys except `STYLE_ID` are required; a missing key is a fatal startup
/// error surfaced as [`ConfigError::Parse`].
#[derive(Clone, Deserialize)]
pub struct Secrets {
    #[serde(rename = "WIFI_SSID")]
    pub wifi_ssid: String,
    #[serde(rename = "WIFI_PASS")]
    pub wifi_pass: String,
    #[serde(rename = "MAPBOX_TOKEN")]
    pub mapbox_token: String,
    #[serde(rename = "STYLE_ID")]
    style_id: Option<String>,
}

impl Secrets {
    /// Loads secrets from a JSON key-value document on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&text)?)
    }

    /// Parses secrets from a JSON string.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn style_id(&self) -> &str {
        self.style_id.as_deref().unwrap_or(DEFAULT_STYLE_ID)
    }
}

// The password and token must never end up in a log line in full.
impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("wifi_ssid", &self.wifi_ssid)
            .field("wifi_pass", &format_args!("<{} chars>", self.wifi_pass.len()))
            .field(
                "mapbox_token",
                &format_args!("<{} chars>", self.mapbox_token.len()),
            )
            .field("style_id", &self.style_id())
            .finish()
    }
}
