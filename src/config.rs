use crate::error::ConfigError;
use log::LevelFilter;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Settings for the tracker bridge binaries, read from a JSON file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    pub client_id: String,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub topic: String,
    pub reconnect_secs: u64,
    /// Host polling cadence
    pub poll_interval_ms: u64,
    pub log_level: LevelFilter,
    /// Upstream tracker id is the index into this list
    pub trackers: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            client_id: String::from("body_tracker_emulator"),
            mqtt_host: String::from("mqtt.local"),
            mqtt_port: 1883,
            topic: String::from("tracking/body"),
            reconnect_secs: 5,
            poll_interval_ms: 11,
            log_level: LevelFilter::Info,
            trackers: [
                "chest",
                "waist",
                "left_elbow",
                "right_elbow",
                "left_knee",
                "right_knee",
                "left_foot",
                "right_foot",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
        }
    }
}

impl BridgeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
