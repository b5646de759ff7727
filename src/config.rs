use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::repository::{self, DEFAULT_REPO_URL};

pub const APP_NAME: &str = "pwr";

/// How often the tick event fires (ms).
pub const TICK_RATE_MS: u64 = 250;

pub const DEFAULT_THEME: &str = "Ocean Breeze";

/// Home directory; `.` when neither variable is set.
pub fn dirs_base() -> PathBuf {
    let vars: &[&str] = if cfg!(windows) {
        &["USERPROFILE", "HOME"]
    } else {
        &["HOME", "USERPROFILE"]
    };
    vars.iter()
        .filter_map(|v| std::env::var(v).ok())
        .find(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `$XDG_CONFIG_HOME/pwr`, else `~/.config/pwr`.
pub fn config_dir() -> PathBuf {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join(APP_NAME),
        _ => dirs_base().join(".config").join(APP_NAME),
    }
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn log_dir() -> PathBuf {
    config_dir().join("logs")
}

// ---------------------------------------------------------------------------
// User config (config.toml)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Custom scriptbin remote. Unset means the default repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch: Option<LaunchConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Emulator tried before the built-in list.
    pub terminal: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub tick_rate: Option<u64>,
}

impl UserConfig {
    pub fn theme(&self) -> &str {
        self.theme
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_THEME)
    }

    pub fn repo_url(&self) -> &str {
        self.repo_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(DEFAULT_REPO_URL)
    }

    pub fn is_default_repo(&self) -> bool {
        self.repo_url() == DEFAULT_REPO_URL
    }

    pub fn terminal(&self) -> Option<&str> {
        self.launch
            .as_ref()
            .and_then(|l| l.terminal.as_deref())
            .filter(|t| !t.is_empty())
    }

    pub fn tick_rate(&self) -> u64 {
        self.display
            .as_ref()
            .and_then(|d| d.tick_rate)
            .filter(|t| *t > 0)
            .unwrap_or(TICK_RATE_MS)
    }

    /// Local checkout of the configured repository.
    pub fn checkout_dir(&self, home: &Path) -> PathBuf {
        repository::checkout_dir(home, self.repo_url())
    }

    pub fn with_theme(mut self, name: &str) -> Self {
        self.theme = Some(name.to_string());
        self
    }

    /// `None` goes back to the default repository.
    pub fn with_repo_url(mut self, url: Option<&str>) -> Self {
        self.repo_url = url
            .map(str::trim)
            .filter(|u| !u.is_empty() && *u != DEFAULT_REPO_URL)
            .map(str::to_string);
        self
    }
}

/// Load user config from `path`.
/// Returns default config if the file doesn't exist or can't be parsed.
pub fn load_user_config(path: &Path) -> UserConfig {
    if !path.exists() {
        return UserConfig::default();
    }
    let content = std::fs::read_to_string(path).unwrap_or_default();
    match toml::from_str(&content) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "ignoring unreadable config");
            UserConfig::default()
        }
    }
}

pub fn save_user_config(path: &Path, cfg: &UserConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let text = toml::to_string_pretty(cfg).context("failed to serialize config")?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_missing_or_broken() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(load_user_config(&path), UserConfig::default());

        std::fs::write(&path, "theme = [not toml").unwrap();
        let cfg = load_user_config(&path);
        assert_eq!(cfg.theme(), DEFAULT_THEME);
        assert_eq!(cfg.repo_url(), DEFAULT_REPO_URL);
        assert_eq!(cfg.tick_rate(), TICK_RATE_MS);
        assert!(cfg.terminal().is_none());
        assert!(cfg.is_default_repo());
    }

    #[test]
    fn reads_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
theme = "Forest Night"
repo_url = "https://github.com/me/tools.git"

[launch]
terminal = "wezterm"

[display]
tick_rate = 100
"#,
        )
        .unwrap();

        let cfg = load_user_config(&path);
        assert_eq!(cfg.theme(), "Forest Night");
        assert_eq!(cfg.repo_url(), "https://github.com/me/tools.git");
        assert!(!cfg.is_default_repo());
        assert_eq!(cfg.terminal(), Some("wezterm"));
        assert_eq!(cfg.tick_rate(), 100);
        assert_eq!(
            cfg.checkout_dir(Path::new("/h")),
            PathBuf::from("/h/Downloads/Temp/custom-tools")
        );
    }

    #[test]
    fn save_creates_directory_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = UserConfig::default()
            .with_theme("Rocket Pink")
            .with_repo_url(Some("git@github.com:me/bin.git"));

        save_user_config(&path, &cfg).unwrap();
        assert_eq!(load_user_config(&path), cfg);
    }

    #[test]
    fn default_url_is_not_stored() {
        let cfg = UserConfig::default().with_repo_url(Some(DEFAULT_REPO_URL));
        assert!(cfg.repo_url.is_none());
        let cfg = UserConfig::default()
            .with_repo_url(Some("https://github.com/a/b.git"))
            .with_repo_url(None);
        assert!(cfg.is_default_repo());
    }
}
