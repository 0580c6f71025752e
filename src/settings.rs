use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{PoisonError, RwLock},
};

use crate::error::TrackError;

/// Minimum movement, in metres, before the position source reports a new fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct MinimumDistance(u32);

impl MinimumDistance {
    pub const CHOICES: [u32; 6] = [1, 3, 5, 10, 20, 50];

    pub fn metres(&self) -> u32 {
        self.0
    }
}

impl Default for MinimumDistance {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u32> for MinimumDistance {
    type Error = TrackError;

    fn try_from(metres: u32) -> Result<Self, Self::Error> {
        if Self::CHOICES.contains(&metres) {
            Ok(Self(metres))
        } else {
            Err(TrackError::InvalidSetting(metres))
        }
    }
}

impl From<MinimumDistance> for u32 {
    fn from(distance: MinimumDistance) -> Self {
        distance.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserSettings {
    #[serde(default)]
    minimum_distance: MinimumDistance,
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
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn minimum_distance(&self) -> MinimumDistance {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .minimum_distance
    }

    pub fn update_minimum_distance(&self, distance: MinimumDistance) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        guard.minimum_distance = distance;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn settings_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("altitrack-settings-{}", Uuid::new_v4()))
            .join("settings.json")
    }

    #[test]
    fn only_listed_choices_are_valid() {
        for metres in MinimumDistance::CHOICES {
            assert_eq!(MinimumDistance::try_from(metres).unwrap().metres(), metres);
        }
        for metres in [0, 2, 4, 15, 100] {
            assert!(matches!(
                MinimumDistance::try_from(metres),
                Err(TrackError::InvalidSetting(m)) if m == metres
            ));
        }
        assert_eq!(MinimumDistance::default().metres(), 5);
    }

    #[test]
    fn missing_file_uses_default() {
        let store = SettingsStore::new(settings_path()).unwrap();
        assert_eq!(store.minimum_distance(), MinimumDistance::default());
    }

    #[test]
    fn update_persists_across_reload() {
        let path = settings_path();
        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update_minimum_distance(MinimumDistance::try_from(20).unwrap())
            .unwrap();

        let reloaded = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(reloaded.minimum_distance().metres(), 20);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn out_of_range_value_on_disk_falls_back_to_default() {
        let path = settings_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{ "minimumDistance": 7 }"#).unwrap();

        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.minimum_distance().metres(), 5);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
