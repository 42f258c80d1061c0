use crate::error::TrackingDataError;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion {
            x: 0.,
            y: 0.,
            z: 0.,
            w: 1.,
        }
    }
}

/// One body tracker reading as produced by the upstream tracking source.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyTracker {
    pub tracker_id: u32,
    pub position: Vector,
    pub orientation: Quaternion,
    #[serde(default)]
    pub tracking: bool,
}

/// All body trackers captured for a single target timestamp.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BodyTrackingPacket {
    pub target_timestamp_ns: u64,
    #[serde(default)]
    pub trackers: Vec<BodyTracker>,
}

impl BodyTrackingPacket {
    pub fn deserialize(data: &[u8]) -> Result<BodyTrackingPacket, TrackingDataError> {
        Ok(serde_json::from_slice::<BodyTrackingPacket>(data)?)
    }
}
