use crate::infrastructure::error::InfraError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const APP_JSON: &str = "app.json";
const SETTINGS_JSON: &str = "settings.json";

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_COUNTDOWN_POLL_MS: u64 = 250;
pub const DEFAULT_CUE_POLL_MS: u64 = 1_000;

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigBundle {
    pub app: serde_json::Value,
    pub settings: serde_json::Value,
}

/// Timer settings resolved from `settings.json`, falling back to defaults
/// field by field when the file is missing, unreadable or partial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub sounds_enabled: bool,
    pub countdown_poll_ms: u64,
    pub cue_poll_ms: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            sounds_enabled: true,
            countdown_poll_ms: DEFAULT_COUNTDOWN_POLL_MS,
            cue_poll_ms: DEFAULT_CUE_POLL_MS,
        }
    }
}

fn default_files() -> HashMap<&'static str, serde_json::Value> {
    HashMap::from([
        (
            APP_JSON,
            serde_json::json!({
                "schema": 1,
                "appName": "PomoDay",
                "timezone": "UTC"
            }),
        ),
        (
            SETTINGS_JSON,
            serde_json::json!({
                "schema": 1,
                "workMinutes": DEFAULT_WORK_MINUTES,
                "breakMinutes": DEFAULT_BREAK_MINUTES,
                "soundsEnabled": true,
                "countdownPollMs": DEFAULT_COUNTDOWN_POLL_MS,
                "cuePollMs": DEFAULT_CUE_POLL_MS
            }),
        ),
    ])
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    for (name, value) in default_files() {
        let path = config_dir.join(name);
        if !path.exists() {
            let formatted = serde_json::to_string_pretty(&value)?;
            fs::write(path, format!("{formatted}\n"))?;
        }
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != 1 {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn load_configs(config_dir: &Path) -> Result<ConfigBundle, InfraError> {
    Ok(ConfigBundle {
        app: read_config(&config_dir.join(APP_JSON))?,
        settings: read_config(&config_dir.join(SETTINGS_JSON))?,
    })
}

/// Tolerant settings read: a broken or partial file degrades to defaults
/// rather than failing schedule generation.
pub fn load_runtime_settings(config_dir: &Path) -> RuntimeSettings {
    let mut settings = RuntimeSettings::default();
    let path = config_dir.join(SETTINGS_JSON);
    let Ok(raw) = fs::read_to_string(path) else {
        return settings;
    };
    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&raw) else {
        return settings;
    };

    if let Some(value) = parsed.get("workMinutes").and_then(serde_json::Value::as_u64) {
        settings.work_minutes = (value as u32).max(1);
    }
    if let Some(value) = parsed.get("breakMinutes").and_then(serde_json::Value::as_u64) {
        settings.break_minutes = value as u32;
    }
    if let Some(value) = parsed.get("soundsEnabled").and_then(serde_json::Value::as_bool) {
        settings.sounds_enabled = value;
    }
    if let Some(value) = parsed.get("countdownPollMs").and_then(serde_json::Value::as_u64) {
        settings.countdown_poll_ms = value.max(1);
    }
    if let Some(value) = parsed.get("cuePollMs").and_then(serde_json::Value::as_u64) {
        settings.cue_poll_ms = value.max(1);
    }

    settings
}

pub fn read_sounds_enabled(config_dir: &Path) -> Result<bool, InfraError> {
    let settings = read_config(&config_dir.join(SETTINGS_JSON))?;
    Ok(settings
        .get("soundsEnabled")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(true))
}

pub fn save_sounds_enabled(config_dir: &Path, enabled: bool) -> Result<(), InfraError> {
    let path = config_dir.join(SETTINGS_JSON);
    let mut settings = read_config(&path)?;
    let object = settings.as_object_mut().ok_or_else(|| {
        InfraError::InvalidConfig(format!("invalid object structure in {}", path.display()))
    })?;
    object.insert(
        "soundsEnabled".to_string(),
        serde_json::Value::Bool(enabled),
    );

    let formatted = serde_json::to_string_pretty(&settings)?;
    fs::write(path, format!("{formatted}\n"))?;
    Ok(())
}
