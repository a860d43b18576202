use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::arbiter::ArbiterConfig;
use crate::capture::CaptureSettings;
use crate::telemetry::MovementConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigatorSettings {
    pub arbiter: ArbiterConfig,
    /// Ask the instruction generator for per-hop advice instead of a summary.
    pub verbose_instructions: bool,
    pub speech_enabled: bool,
    pub capture: CaptureSettings,
    pub movement: MovementConfig,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self {
            arbiter: ArbiterConfig::default(),
            verbose_instructions: false,
            speech_enabled: true,
            capture: CaptureSettings::default(),
            movement: MovementConfig::default(),
        }
    }
}

/// JSON-backed settings file. Unreadable contents fall back to defaults.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<NavigatorSettings>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring malformed settings in {}: {}", path.display(), err);
                NavigatorSettings::default()
            })
        } else {
            NavigatorSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> NavigatorSettings {
        self.read().clone()
    }

    pub fn update(&self, settings: NavigatorSettings) -> Result<()> {
        let mut guard = self.write();
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: NavigatorSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed settings in {}", self.path.display()))?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &NavigatorSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    // Writers swap the whole value, so a poisoned lock still holds consistent data.
    fn read(&self) -> RwLockReadGuard<'_, NavigatorSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, NavigatorSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("campus-nav-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let store = SettingsStore::new(temp_path("settings.json")).unwrap();
        let settings = store.current();
        assert_eq!(settings.arbiter.locate_threshold, 0.85);
        assert_eq!(settings.arbiter.destination_threshold, 0.80);
        assert_eq!(settings.arbiter.arrival_threshold, 0.70);
        assert_eq!(settings.capture.jpeg_quality, 80);
    }

    #[test]
    fn test_update_persists_and_reloads() {
        let path = temp_path("settings.json");
        let store = SettingsStore::new(&path).unwrap();
        let mut settings = store.current();
        settings.verbose_instructions = true;
        settings.arbiter.locate_threshold = 0.6;
        store.update(settings.clone()).unwrap();

        let reopened = SettingsStore::new(&path).unwrap();
        assert_eq!(reopened.current(), settings);

        fs::write(&path, "{ not json").unwrap();
        assert!(store.reload().is_err());
        assert_eq!(store.current(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_path("settings.json");
        fs::write(&path, r#"{"speechEnabled": false, "arbiter": {"arrivalThreshold": 0.9}}"#).unwrap();
        let settings = SettingsStore::new(&path).unwrap().current();
        assert!(!settings.speech_enabled);
        assert_eq!(settings.arbiter.arrival_threshold, 0.9);
        assert_eq!(settings.arbiter.locate_threshold, 0.85);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let path = temp_path("settings.json");
        fs::write(&path, "garbage").unwrap();
        let settings = SettingsStore::new(&path).unwrap().current();
        assert_eq!(settings, NavigatorSettings::default());
    }
}
