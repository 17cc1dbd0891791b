use std::{collections::HashMap, fs, path::Path, time::Duration};

use tracing::warn;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_API_BASE_URL: &str = "/api";
/// Origin a relative base path is resolved against.
pub const DEFAULT_API_ORIGIN: &str = "http://localhost:8011";
pub const DEFAULT_SETTINGS_FILE: &str = "tarot.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub draw_timeout_secs: u64,
    pub save_readings: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: 45,
            draw_timeout_secs: 30,
            save_readings: true,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn draw_timeout(&self) -> Duration {
        Duration::from_secs(self.draw_timeout_secs)
    }

    pub fn resolved_base_url(&self) -> Result<String, ClientError> {
        resolve_api_base_url(&self.api_base_url)
    }
}

/// Defaults, then the optional settings file, then environment variables.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, env);

    settings
}

pub fn apply_file_overrides(settings: &mut ClientSettings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, toml::Value>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(error = %err, "config: ignoring unparseable settings file");
            return;
        }
    };

    if let Some(v) = file_cfg.get("api_base_url").and_then(toml::Value::as_str) {
        settings.api_base_url = v.to_string();
    }
    if let Some(v) = file_cfg
        .get("request_timeout_secs")
        .and_then(toml::Value::as_integer)
    {
        if let Ok(v) = u64::try_from(v) {
            settings.request_timeout_secs = v;
        }
    }
    if let Some(v) = file_cfg
        .get("draw_timeout_secs")
        .and_then(toml::Value::as_integer)
    {
        if let Ok(v) = u64::try_from(v) {
            settings.draw_timeout_secs = v;
        }
    }
    if let Some(v) = file_cfg.get("save_readings").and_then(toml::Value::as_bool) {
        settings.save_readings = v;
    }
}

pub fn apply_env_overrides(settings: &mut ClientSettings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("TAROT_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
    if let Some(v) = env("APP__DRAW_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.draw_timeout_secs = parsed;
        }
    }
    if let Some(v) = env("APP__SAVE_READINGS") {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => settings.save_readings = true,
            "0" | "false" | "no" => settings.save_readings = false,
            _ => {}
        }
    }
}

/// Turns the configured base into an absolute http(s) URL without a
/// trailing slash. A bare path such as `/api` is joined onto
/// [`DEFAULT_API_ORIGIN`].
pub fn resolve_api_base_url(raw: &str) -> Result<String, ClientError> {
    let raw = raw.trim();
    let raw = if raw.is_empty() {
        DEFAULT_API_BASE_URL
    } else {
        raw
    };

    let url = if raw.starts_with('/') {
        Url::parse(DEFAULT_API_ORIGIN).and_then(|origin| origin.join(raw))
    } else {
        Url::parse(raw)
    }
    .map_err(|err| ClientError::InvalidInput(format!("invalid api base url '{raw}': {err}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ClientError::InvalidInput(format!(
            "api base url must use http:// or https://, got '{raw}'"
        )));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
