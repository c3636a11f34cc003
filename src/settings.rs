use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

use crate::generation::simulated::{DEFAULT_EXPLAIN_DELAY, DEFAULT_REPLY_DELAY};
use crate::generation::SimulatedGenerator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorMode {
    #[default]
    Simulated,
    Gemini,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorSettings {
    pub mode: GeneratorMode,
    pub explain_delay_ms: u64,
    pub reply_delay_ms: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            mode: GeneratorMode::default(),
            explain_delay_ms: DEFAULT_EXPLAIN_DELAY.as_millis() as u64,
            reply_delay_ms: DEFAULT_REPLY_DELAY.as_millis() as u64,
        }
    }
}

impl GeneratorSettings {
    pub fn simulated(&self) -> SimulatedGenerator {
        SimulatedGenerator::new(
            Duration::from_millis(self.explain_delay_ms),
            Duration::from_millis(self.reply_delay_ms),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSettings {
    #[serde(default)]
    generator: GeneratorSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring unreadable settings file {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn generator(&self) -> Result<GeneratorSettings> {
        let guard = self
            .data
            .read()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        Ok(guard.generator.clone())
    }

    /// Takes effect on the next launch; running controllers keep the
    /// generator they were built with.
    pub fn update_generator(&self, settings: GeneratorSettings) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        guard.generator = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let settings = store.generator().unwrap();
        assert_eq!(settings, GeneratorSettings::default());
        assert_eq!(settings.mode, GeneratorMode::Simulated);
        assert_eq!(settings.reply_delay_ms, 1200);
    }

    #[test]
    fn updates_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update_generator(GeneratorSettings {
                mode: GeneratorMode::Gemini,
                explain_delay_ms: 0,
                reply_delay_ms: 5,
            })
            .unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"gemini\""));

        let reopened = SettingsStore::new(path).unwrap();
        let settings = reopened.generator().unwrap();
        assert_eq!(settings.mode, GeneratorMode::Gemini);
        assert_eq!(settings.reply_delay_ms, 5);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.generator().unwrap(), GeneratorSettings::default());
    }
}
