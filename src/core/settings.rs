//! Persistent application settings with change notification
//!
//! Settings are one JSON blob under the platform config directory. The blob
//! is written by every version of the app that ever ran, so loading goes
//! through a migration step: legacy `darkMode` becomes `theme`, the old
//! `showApp` global hotkey aliases `toggleApp` (back-filled both ways), and
//! missing sections get defaults injected.

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Default auto-save debounce in seconds
pub const DEFAULT_AUTO_SAVE_SECS: u64 = 5;

/// UI theme selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// In-window keyboard shortcuts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Hotkeys {
    pub new_note: String,
    pub save_note: String,
    pub close_window: String,
    pub open_settings: String,
}

impl Default for Hotkeys {
    fn default() -> Self {
        Self {
            new_note: "CmdOrCtrl+N".to_string(),
            save_note: "CmdOrCtrl+S".to_string(),
            close_window: "CmdOrCtrl+W".to_string(),
            open_settings: "CmdOrCtrl+,".to_string(),
        }
    }
}

/// System-wide shortcuts; OS registration happens outside the core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalHotkeys {
    pub toggle_app: String,
    pub new_note: String,
    /// Legacy alias for `toggle_app`, kept in the blob for older builds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_app: Option<String>,
}

impl Default for GlobalHotkeys {
    fn default() -> Self {
        Self {
            toggle_app: "CmdOrCtrl+Shift+S".to_string(),
            new_note: "CmdOrCtrl+Shift+N".to_string(),
            show_app: None,
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Directory notes are stored in; resolved to the default location at
    /// startup when unset
    pub save_directory: Option<PathBuf>,
    pub auto_save: bool,
    pub auto_save_interval_secs: u64,
    pub theme: Theme,
    pub hotkeys: Hotkeys,
    pub global_hotkeys: GlobalHotkeys,
    pub auto_launch: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            save_directory: None,
            auto_save: true,
            auto_save_interval_secs: DEFAULT_AUTO_SAVE_SECS,
            theme: Theme::default(),
            hotkeys: Hotkeys::default(),
            global_hotkeys: GlobalHotkeys::default(),
            auto_launch: false,
        }
    }
}

/// The blob as older versions may have written it
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSettings {
    save_directory: Option<PathBuf>,
    auto_save: Option<bool>,
    auto_save_interval_secs: Option<u64>,
    theme: Option<Theme>,
    dark_mode: Option<bool>,
    hotkeys: Option<Hotkeys>,
    global_hotkeys: Option<RawGlobalHotkeys>,
    auto_launch: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawGlobalHotkeys {
    toggle_app: Option<String>,
    new_note: Option<String>,
    show_app: Option<String>,
}

/// Reconcile legacy field names and inject defaults
fn migrate(raw: RawSettings) -> Settings {
    let theme = raw.theme.unwrap_or(match raw.dark_mode {
        Some(true) => Theme::Dark,
        Some(false) => Theme::Light,
        None => Theme::System,
    });

    let raw_global = raw.global_hotkeys.unwrap_or_default();
    let defaults = GlobalHotkeys::default();
    // Prefer the canonical field, fall back to the legacy alias, then
    // back-fill the alias so older builds keep working
    let toggle_app = raw_global
        .toggle_app
        .or(raw_global.show_app)
        .unwrap_or(defaults.toggle_app);
    let global_hotkeys = GlobalHotkeys {
        show_app: Some(toggle_app.clone()),
        toggle_app,
        new_note: raw_global.new_note.unwrap_or(defaults.new_note),
    };

    Settings {
        save_directory: raw.save_directory,
        auto_save: raw.auto_save.unwrap_or(true),
        auto_save_interval_secs: raw.auto_save_interval_secs.unwrap_or(DEFAULT_AUTO_SAVE_SECS),
        theme,
        hotkeys: raw.hotkeys.unwrap_or_default(),
        global_hotkeys,
        auto_launch: raw.auto_launch.unwrap_or(false),
    }
}

/// Owner of the settings blob; the single source of truth in the process
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
    subscribers: Vec<Sender<Settings>>,
}

impl SettingsStore {
    /// Load from the platform config directory, or start from defaults
    pub fn load() -> Self {
        let path = Self::default_path().unwrap_or_else(|| PathBuf::from("settings.json"));
        Self::with_path(path)
    }

    /// Load from an explicit path (tests point this at a scratch file)
    pub fn with_path(path: PathBuf) -> Self {
        let settings = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<RawSettings>(&text) {
                Ok(raw) => migrate(raw),
                Err(e) => {
                    tracing::warn!("Settings blob unreadable, using defaults: {e}");
                    Settings::default()
                }
            },
            Err(_) => Settings::default(),
        };
        Self {
            path,
            settings,
            subscribers: Vec::new(),
        }
    }

    fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "scribble", "Scribble")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings, persist them, and notify subscribers
    pub fn update(&mut self, settings: Settings) -> Result<()> {
        self.settings = settings;
        self.save()
    }

    /// Persist the blob and broadcast the new state
    pub fn save(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&self.settings)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("Failed to write settings: {}", self.path.display()))?;
        tracing::info!("Saved settings to {}", self.path.display());

        // Fire-and-forget; dead subscribers are dropped
        let snapshot = self.settings.clone();
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
        Ok(())
    }

    /// Receive a copy of the settings after every save
    pub fn subscribe(&mut self) -> Receiver<Settings> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_blob_gets_full_defaults() {
        let migrated = migrate(serde_json::from_str::<RawSettings>("{}").unwrap());
        assert_eq!(migrated.auto_save_interval_secs, DEFAULT_AUTO_SAVE_SECS);
        assert!(migrated.auto_save);
        assert_eq!(migrated.theme, Theme::System);
        assert_eq!(migrated.hotkeys, Hotkeys::default());
    }

    #[test]
    fn legacy_dark_mode_becomes_theme() {
        let raw: RawSettings = serde_json::from_str(r#"{"darkMode": true}"#).unwrap();
        assert_eq!(migrate(raw).theme, Theme::Dark);

        let raw: RawSettings = serde_json::from_str(r#"{"darkMode": false}"#).unwrap();
        assert_eq!(migrate(raw).theme, Theme::Light);

        // Canonical field wins over the legacy one
        let raw: RawSettings =
            serde_json::from_str(r#"{"darkMode": true, "theme": "light"}"#).unwrap();
        assert_eq!(migrate(raw).theme, Theme::Light);
    }

    #[test]
    fn legacy_show_app_aliases_toggle_app() {
        let raw: RawSettings =
            serde_json::from_str(r#"{"globalHotkeys": {"showApp": "Alt+Space"}}"#).unwrap();
        let migrated = migrate(raw);
        assert_eq!(migrated.global_hotkeys.toggle_app, "Alt+Space");
        assert_eq!(migrated.global_hotkeys.show_app.as_deref(), Some("Alt+Space"));
    }

    #[test]
    fn toggle_app_back_fills_show_app() {
        let raw: RawSettings =
            serde_json::from_str(r#"{"globalHotkeys": {"toggleApp": "F12"}}"#).unwrap();
        let migrated = migrate(raw);
        assert_eq!(migrated.global_hotkeys.toggle_app, "F12");
        assert_eq!(migrated.global_hotkeys.show_app.as_deref(), Some("F12"));
    }

    #[test]
    fn save_and_reload_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");

        let mut store = SettingsStore::with_path(path.clone());
        let mut settings = store.get().clone();
        settings.theme = Theme::Dark;
        settings.auto_save_interval_secs = 12;
        store.update(settings).unwrap();

        let reloaded = SettingsStore::with_path(path);
        assert_eq!(reloaded.get().theme, Theme::Dark);
        assert_eq!(reloaded.get().auto_save_interval_secs, 12);
    }

    #[test]
    fn subscribers_hear_about_saves() {
        let tmp = TempDir::new().unwrap();
        let mut store = SettingsStore::with_path(tmp.path().join("settings.json"));
        let rx = store.subscribe();

        let mut settings = store.get().clone();
        settings.auto_save = false;
        store.update(settings).unwrap();

        let heard = rx.try_recv().unwrap();
        assert!(!heard.auto_save);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let tmp = TempDir::new().unwrap();
        let mut store = SettingsStore::with_path(tmp.path().join("settings.json"));
        drop(store.subscribe());
        store.save().unwrap();
        assert!(store.subscribers.is_empty());
    }
}
