//! Panel settings and the per-tracker configuration boundary.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::body::{MountingRotation, TrackerPosition};

/// Default minimum interval between two refresh dispatches.
pub const DEFAULT_UPDATE_DELAY_MS: u64 = 50;

/// Panel-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Refresh throttle in milliseconds.
    pub update_delay_ms: u64,
    /// Show the IMU and correction debug fields.
    pub debug: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            update_delay_ms: DEFAULT_UPDATE_DELAY_MS,
            debug: false,
        }
    }
}

impl PanelConfig {
    /// Refresh throttle as a [`Duration`].
    pub fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay_ms)
    }

    /// Load settings from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse settings from JSON text.
    pub fn from_json(raw: &str) -> std::io::Result<Self> {
        serde_json::from_str::<Self>(raw).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("failed to parse panel config JSON: {e}"),
            )
        })
    }
}

/// Stored configuration of one tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Designation string (e.g. `"body:chest"`).
    pub designation: Option<String>,
    pub mounting: Option<MountingRotation>,
}

/// A user edit reported to the configuration subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackerUpdate {
    Designation(TrackerPosition),
    Mounting(MountingRotation),
}

impl TrackerUpdate {
    /// Apply the edit to a stored configuration.
    pub fn apply(&self, config: &mut TrackerConfig) {
        match *self {
            Self::Designation(p) => config.designation = Some(p.designation().to_string()),
            Self::Mounting(m) => config.mounting = Some(m),
        }
    }
}

/// Configuration persistence boundary, keyed by tracker name.
pub trait ConfigStore: Send {
    /// Stored configuration for a tracker, if any.
    fn tracker_config(&self, name: &str) -> Option<TrackerConfig>;

    /// Synchronous notification that the user edited a tracker.
    fn tracker_updated(&self, name: &str, update: &TrackerUpdate);
}

/// In-process [`ConfigStore`].
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    trackers: Mutex<HashMap<String, TrackerConfig>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the stored configuration of a tracker.
    pub fn insert(&self, name: impl Into<String>, config: TrackerConfig) {
        self.lock().insert(name.into(), config);
    }

    /// Number of trackers with stored configuration.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, TrackerConfig>> {
        match self.trackers.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn tracker_config(&self, name: &str) -> Option<TrackerConfig> {
        self.lock().get(name).cloned()
    }

    fn tracker_updated(&self, name: &str, update: &TrackerUpdate) {
        let mut trackers = self.lock();
        update.apply(trackers.entry(name.to_string()).or_default());
    }
}

impl<T: ConfigStore + Sync> ConfigStore for std::sync::Arc<T> {
    fn tracker_config(&self, name: &str) -> Option<TrackerConfig> {
        (**self).tracker_config(name)
    }

    fn tracker_updated(&self, name: &str, update: &TrackerUpdate) {
        (**self).tracker_updated(name, update);
    }
}
