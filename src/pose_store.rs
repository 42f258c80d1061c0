use crate::pose::{DriverPose, PoseSample};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Single slot holding the latest pose of one device.
///
/// Writers replace the whole snapshot and readers copy it out, so neither
/// side ever waits on the other and a reader never sees a partial update.
pub struct PoseStore {
    current: ArcSwap<DriverPose>,
}

impl PoseStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(DriverPose::default()),
        }
    }

    /// Replaces the snapshot; the most recent write wins.
    pub fn update(&self, sample: &PoseSample) {
        self.current.store(Arc::new(DriverPose::from(sample)));
    }

    pub fn read(&self) -> DriverPose {
        **self.current.load()
    }
}

impl Default for PoseStore {
    fn default() -> Self {
        Self::new()
    }
}
