use crate::driver::{DeviceHandle, DriverHost};
use crate::pose::DriverPose;
use crate::tracker::DeviceProperties;
use log::*;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stand-in for the tracking runtime that logs everything it receives.
#[derive(Default)]
pub struct LoggingHost {
    pose_updates: AtomicU64,
}

impl LoggingHost {
    pub fn pose_updates(&self) -> u64 {
        self.pose_updates.load(Ordering::Relaxed)
    }
}

impl DriverHost for LoggingHost {
    fn tracked_device_pose_updated(&self, handle: DeviceHandle, pose: &DriverPose) {
        self.pose_updates.fetch_add(1, Ordering::Relaxed);
        trace!(
            "device {} pose valid: {} position: {:.3} {:.3} {:.3}",
            handle,
            pose.pose_is_valid,
            pose.position.x,
            pose.position.y,
            pose.position.z
        );
    }

    fn set_device_properties(&self, handle: DeviceHandle, properties: &DeviceProperties) {
        info!(
            "device {} serial: {} controller type: {}",
            handle, properties.serial_number, properties.controller_type
        );
    }
}
