use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::Result;

pub const APP_FOLDER_NAME: &str = "StudyMentor";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MentorConfig {
    pub strategy: String,
    pub reply_delay_ms: u64,
    pub group_search_delay_ms: u64,
    pub meeting_link_prefix: String,
}

impl Default for MentorConfig {
    fn default() -> Self {
        Self {
            strategy: "canned".to_string(),
            reply_delay_ms: 1000,
            group_search_delay_ms: 2000,
            meeting_link_prefix: "https://meet.google.com/".to_string(),
        }
    }
}

impl MentorConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn group_search_delay(&self) -> Duration {
        Duration::from_millis(self.group_search_delay_ms)
    }
}

fn default_panels() -> Vec<String> {
    ["plan", "resources", "group", "chat"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_theme() -> String {
    "mentor_light".to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UiSettings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub window_size: Option<(f32, f32)>,
    #[serde(default = "default_panels")]
    pub dashboard_panels: Vec<String>,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            window_size: None,
            dashboard_panels: default_panels(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Settings {
    pub version: String,
    pub base_path: String,
    pub mode: String,
    #[serde(default)]
    pub mentor: MentorConfig,
    #[serde(default)]
    pub ui: UiSettings,
}

impl Settings {
    pub fn defaults_for(base: &Path) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            base_path: base.to_string_lossy().to_string(),
            mode: "gui".to_string(),
            mentor: MentorConfig::default(),
            ui: UiSettings::default(),
        }
    }
}

pub fn default_base_path() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()));

    if let Some(dir) = exe_dir {
        return dir.join("data");
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_FOLDER_NAME)
}

pub fn ensure_base_folders(base: &Path) -> Result<()> {
    let config_dir = base.join("config");
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
        debug!(path = %config_dir.display(), "created config folder");
    }
    Ok(())
}

pub fn settings_path(base: &Path) -> PathBuf {
    base.join("config").join("settings.json")
}

/// Reads `config/settings.json`, writing the defaults first if it does not exist.
pub fn load_or_init_settings(base: &Path) -> Result<Settings> {
    let config_path = settings_path(base);

    if config_path.exists() {
        let contents = fs::read_to_string(&config_path)?;
        let mut settings: Settings = serde_json::from_str(&contents)?;

        if settings.base_path != base.to_string_lossy() {
            settings.base_path = base.to_string_lossy().to_string();
        }
        return Ok(settings);
    }

    let settings = Settings::defaults_for(base);
    save_settings(&settings, base)?;
    info!(path = %config_path.display(), "wrote default settings");
    Ok(settings)
}

pub fn save_settings(settings: &Settings, base: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(settings_path(base), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MentorError;

    fn base() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        ensure_base_folders(dir.path()).unwrap();
        dir
    }

    #[test]
    fn first_run_writes_defaults() {
        let dir = base();
        let settings = load_or_init_settings(dir.path()).unwrap();
        assert!(settings_path(dir.path()).exists());
        assert_eq!(settings.mentor, MentorConfig::default());
        assert_eq!(settings.ui.dashboard_panels, default_panels());
        assert_eq!(settings.mentor.reply_delay(), Duration::from_millis(1000));
        assert_eq!(settings.mentor.group_search_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn saved_changes_survive_reload() {
        let dir = base();
        let mut settings = load_or_init_settings(dir.path()).unwrap();
        settings.ui.theme = "mentor_night".to_string();
        settings.mentor.reply_delay_ms = 10;
        save_settings(&settings, dir.path()).unwrap();

        let reloaded = load_or_init_settings(dir.path()).unwrap();
        pretty_assertions::assert_eq!(reloaded, settings);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let dir = base();
        fs::write(
            settings_path(dir.path()),
            r#"{"version":"0.1.0","base_path":"elsewhere","mode":"cli"}"#,
        )
        .unwrap();
        let settings = load_or_init_settings(dir.path()).unwrap();
        assert_eq!(settings.mode, "cli");
        assert_eq!(settings.base_path, dir.path().to_string_lossy());
        assert_eq!(settings.mentor.strategy, "canned");
        assert_eq!(settings.ui.theme, "mentor_light");
    }

    #[test]
    fn broken_file_is_a_json_error() {
        let dir = base();
        fs::write(settings_path(dir.path()), "{ not json").unwrap();
        let err = load_or_init_settings(dir.path()).unwrap_err();
        assert!(matches!(err, MentorError::Json(_)));
    }
}
