pub mod bridge;
pub mod config;
pub mod data;
pub mod driver;
pub mod error;
pub mod host;
pub mod pose;
pub mod pose_store;
pub mod tracker;

pub use driver::{DeviceComponent, DeviceHandle, DriverHost, TrackedDeviceDriver};
pub use error::InitError;
pub use pose::{DriverPose, PoseSample, TrackingResult};
pub use pose_store::PoseStore;
pub use tracker::{DeviceState, TrackerRole, VirtualTracker};
