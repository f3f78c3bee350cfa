use crate::model::Theme;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "bossa";
const SETTINGS_FILE: &str = "settings.json";

/// Presentation settings only. Library state is deliberately not persisted
/// between sessions.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
    /// host:port of the optional track insight service.
    #[serde(default)]
    pub insight_addr: Option<String>,
}

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("BOSSA_CONFIG_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(config_root()?.join(SETTINGS_FILE))
}

pub fn ensure_config_dir() -> Result<PathBuf> {
    let root = config_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}

pub fn load_settings() -> Result<Settings> {
    let path = settings_path()?;
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse settings file {}", path.display()))?;
    Ok(settings)
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    ensure_config_dir()?;
    let path = settings_path()?;
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Single test: the env override is process-wide, so missing-file and
    // round-trip behavior are checked against the same directory.
    #[test]
    fn missing_file_defaults_then_round_trips() {
        let dir = tempdir().expect("tempdir");
        unsafe {
            env::set_var("BOSSA_CONFIG_DIR", dir.path().to_string_lossy().as_ref());
        }

        let loaded = load_settings().expect("load");
        assert_eq!(loaded, Settings::default());

        let settings = Settings {
            theme: Theme::Ocean,
            insight_addr: Some(String::from("127.0.0.1:7979")),
        };
        save_settings(&settings).expect("save");
        let loaded = load_settings().expect("load");
        assert_eq!(loaded, settings);
    }
}
