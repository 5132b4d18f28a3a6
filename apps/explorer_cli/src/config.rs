use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::bail;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub token: Option<String>,
    pub page_size: u32,
    pub debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub preferences_url: String,
    pub prefers_dark: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".into(),
            token: None,
            page_size: 10,
            debounce_ms: 300,
            request_timeout_secs: 10,
            preferences_url: default_preferences_url(),
            prefers_dark: false,
        }
    }
}

fn default_preferences_url() -> String {
    let path = dirs::config_dir()
        .map(|dir| dir.join("account-explorer").join("preferences.db"))
        .unwrap_or_else(|| PathBuf::from("./data/preferences.db"));
    format!("sqlite://{}", path.to_string_lossy().replace('\\', "/"))
}

/// Defaults, then the optional TOML file, then environment overrides.
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => apply_file_values(&mut settings, &file_cfg),
            Err(err) => tracing::warn!(
                path = %config_path.display(),
                error = %err,
                "ignoring unparseable settings file"
            ),
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn toml_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

fn apply_file_values(settings: &mut Settings, file_cfg: &HashMap<String, toml::Value>) {
    let get = |key: &str| file_cfg.get(key).and_then(toml_string);

    if let Some(v) = get("api_url") {
        settings.api_url = v;
    }
    if let Some(v) = get("token") {
        settings.token = Some(v);
    }
    if let Some(v) = get("page_size").and_then(|v| v.parse().ok()) {
        settings.page_size = v;
    }
    if let Some(v) = get("debounce_ms").and_then(|v| v.parse().ok()) {
        settings.debounce_ms = v;
    }
    if let Some(v) = get("request_timeout_secs").and_then(|v| v.parse().ok()) {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = get("preferences_url") {
        settings.preferences_url = v;
    }
    if let Some(v) = get("prefers_dark").and_then(|v| parse_flag(&v)) {
        settings.prefers_dark = v;
    }
}

pub(crate) fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("EXPLORER_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("EXPLORER_TOKEN") {
        settings.token = Some(v);
    }
    if let Some(v) = env("APP__TOKEN") {
        settings.token = Some(v);
    }

    if let Some(v) = env("APP__PAGE_SIZE").and_then(|v| v.parse().ok()) {
        settings.page_size = v;
    }
    if let Some(v) = env("APP__DEBOUNCE_MS").and_then(|v| v.parse().ok()) {
        settings.debounce_ms = v;
    }
    if let Some(v) = env("APP__TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        settings.request_timeout_secs = v;
    }

    if let Some(v) = env("PREFERENCES_URL") {
        settings.preferences_url = v;
    }
    if let Some(v) = env("APP__PREFERENCES_URL") {
        settings.preferences_url = v;
    }

    if let Some(v) = env("APP__PREFERS_DARK").and_then(|v| parse_flag(&v)) {
        settings.prefers_dark = v;
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "dark" => Some(true),
        "0" | "false" | "no" | "off" | "light" => Some(false),
        _ => None,
    }
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=100).contains(&self.page_size) {
            bail!("page_size must be between 1 and 100, got {}", self.page_size);
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be positive");
        }
        if self.api_url.trim().is_empty() {
            bail!("api_url must not be empty");
        }
        Ok(())
    }
}

/// Turns a bare file path into a `sqlite://` url; the store creates missing directories.
pub fn prepare_preferences_url(raw_url: &str) -> String {
    let raw_url = raw_url.trim();

    if raw_url.is_empty() {
        return default_preferences_url();
    }

    if raw_url.starts_with("sqlite::memory:")
        || raw_url.starts_with("sqlite://")
        || raw_url.contains("://")
    {
        return raw_url.to_string();
    }

    if let Some(path) = raw_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
