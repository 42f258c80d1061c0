use crate::data::BodyTracker;
use crate::driver::{DeviceHandle, DriverHost, TrackedDeviceDriver};
use crate::error::InitError;
use crate::pose::{DriverPose, PoseSample};
use crate::pose_store::PoseStore;
use log::*;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

pub const SERIAL_NUMBER_PREFIX: &str = "ALVR Tracker ";
pub const DEVICE_NAME_PREFIX: &str = "ALVR/tracker/";

const TRACKING_SYSTEM_NAME: &str = "ALVR Tracker";
const MODEL_NUMBER: &str = "ALVR Virtual Tracker";
const RENDER_MODEL_NAME: &str = "{htc}vr_tracker_vive_1_0";
const INPUT_PROFILE_PATH: &str = "{htc}/input/vive_tracker_profile.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerRole {
    Chest,
    Waist,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftKnee,
    RightKnee,
    LeftFoot,
    RightFoot,
    Camera,
    Keyboard,
    Unknown,
}

impl TrackerRole {
    /// Matches ignoring case and separators, so `LeftFoot` and `left_foot` agree.
    pub fn from_name(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "chest" => TrackerRole::Chest,
            "waist" | "hip" | "hips" => TrackerRole::Waist,
            "leftshoulder" => TrackerRole::LeftShoulder,
            "rightshoulder" => TrackerRole::RightShoulder,
            "leftelbow" => TrackerRole::LeftElbow,
            "rightelbow" => TrackerRole::RightElbow,
            "leftknee" => TrackerRole::LeftKnee,
            "rightknee" => TrackerRole::RightKnee,
            "leftfoot" => TrackerRole::LeftFoot,
            "rightfoot" => TrackerRole::RightFoot,
            "camera" => TrackerRole::Camera,
            "keyboard" => TrackerRole::Keyboard,
            _ => TrackerRole::Unknown,
        }
    }

    pub fn as_str(self) -> Option<&'static str> {
        match self {
            TrackerRole::Chest => Some("chest"),
            TrackerRole::Waist => Some("waist"),
            TrackerRole::LeftShoulder => Some("left_shoulder"),
            TrackerRole::RightShoulder => Some("right_shoulder"),
            TrackerRole::LeftElbow => Some("left_elbow"),
            TrackerRole::RightElbow => Some("right_elbow"),
            TrackerRole::LeftKnee => Some("left_knee"),
            TrackerRole::RightKnee => Some("right_knee"),
            TrackerRole::LeftFoot => Some("left_foot"),
            TrackerRole::RightFoot => Some("right_foot"),
            TrackerRole::Camera => Some("camera"),
            TrackerRole::Keyboard => Some("keyboard"),
            TrackerRole::Unknown => None,
        }
    }

    pub fn controller_type(self) -> String {
        match self.as_str() {
            Some(role) => format!("vive_tracker_{}", role),
            None => String::from("vive_tracker"),
        }
    }
}

/// Properties published to the host when a tracker is activated.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProperties {
    pub tracking_system_name: &'static str,
    pub model_number: &'static str,
    pub serial_number: String,
    pub role: TrackerRole,
    pub controller_type: String,
    pub render_model_name: &'static str,
    pub input_profile_path: &'static str,
}

/// Identity strings, built once and kept for the lifetime of the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerIdentity {
    logical_name: String,
    name: String,
    serial_number: String,
}

impl TrackerIdentity {
    pub fn new(logical_name: &str) -> Self {
        Self {
            logical_name: logical_name.to_owned(),
            name: format!("{}{}", DEVICE_NAME_PREFIX, logical_name),
            serial_number: format!("{}{}", SERIAL_NUMBER_PREFIX, logical_name),
        }
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Inactive,
    Active,
    Deactivated,
}

/// Emulated body tracker puck.
///
/// The host drives the lifecycle and polls [`TrackedDeviceDriver::pose`], while the
/// tracking source pushes samples through [`VirtualTracker::on_pose_updated`]
/// from its own thread. The pose store is the only point where the two meet.
pub struct VirtualTracker {
    identity: TrackerIdentity,
    role: TrackerRole,
    handle: AtomicU32,
    was_deactivated: AtomicBool,
    store: PoseStore,
    host: Arc<dyn DriverHost>,
}

impl VirtualTracker {
    pub fn new(logical_name: &str, host: Arc<dyn DriverHost>) -> Self {
        Self {
            identity: TrackerIdentity::new(logical_name),
            role: TrackerRole::from_name(logical_name),
            handle: AtomicU32::new(DeviceHandle::INVALID.0),
            was_deactivated: AtomicBool::new(false),
            store: PoseStore::new(),
            host,
        }
    }

    pub fn identity(&self) -> &TrackerIdentity {
        &self.identity
    }

    pub fn role(&self) -> TrackerRole {
        self.role
    }

    pub fn handle(&self) -> DeviceHandle {
        DeviceHandle(self.handle.load(Ordering::SeqCst))
    }

    pub fn state(&self) -> DeviceState {
        if self.handle().is_valid() {
            DeviceState::Active
        } else if self.was_deactivated.load(Ordering::SeqCst) {
            DeviceState::Deactivated
        } else {
            DeviceState::Inactive
        }
    }

    pub fn properties(&self) -> DeviceProperties {
        DeviceProperties {
            tracking_system_name: TRACKING_SYSTEM_NAME,
            model_number: MODEL_NUMBER,
            serial_number: self.identity.serial_number.clone(),
            role: self.role,
            controller_type: self.role.controller_type(),
            render_model_name: RENDER_MODEL_NAME,
            input_profile_path: INPUT_PROFILE_PATH,
        }
    }

    /// Ingests a sample from the tracking source.
    ///
    /// The store is always updated. The host is only notified while a valid
    /// handle is held. The handle is read once before notifying, so a
    /// notification already in flight when `deactivate` runs on another thread
    /// can still arrive tagged with the old handle after `deactivate` returns.
    pub fn on_pose_updated(&self, target_timestamp_ns: u64, tracker: BodyTracker) {
        let sample = PoseSample::from_body_tracker(target_timestamp_ns, &tracker);
        self.store.update(&sample);
        trace!(
            "{} pose at {}ns tracking: {}",
            self.identity.name,
            target_timestamp_ns,
            sample.tracking
        );

        let handle = self.handle();
        if handle.is_valid() {
            self.host
                .tracked_device_pose_updated(handle, &DriverPose::from(&sample));
        }
    }
}

impl TrackedDeviceDriver for VirtualTracker {
    fn activate(&self, handle: DeviceHandle) -> Result<(), InitError> {
        if !handle.is_valid() {
            warn!("Refusing to activate {} with invalid handle", self.identity.name);
            return Err(InitError::InvalidHandle(handle.0));
        }
        let properties = self.properties();
        debug!(
            "Publishing properties for {}: {:?}",
            self.identity.name, properties
        );
        self.host.set_device_properties(handle, &properties);
        self.handle.store(handle.0, Ordering::SeqCst);
        info!("Activated {} as device {}", self.identity.name, handle);
        Ok(())
    }

    fn deactivate(&self) {
        // flag goes first so `state` never reports Inactive mid-deactivation
        if self.handle().is_valid() {
            self.was_deactivated.store(true, Ordering::SeqCst);
        }
        let previous = DeviceHandle(self.handle.swap(DeviceHandle::INVALID.0, Ordering::SeqCst));
        if previous.is_valid() {
            info!("Deactivated {} (was device {})", self.identity.name, previous);
        }
    }

    fn enter_standby(&self) {
        debug!("{} entering standby", self.identity.name);
    }

    fn pose(&self) -> DriverPose {
        self.store.read()
    }

    fn serial_number(&self) -> &str {
        &self.identity.serial_number
    }

    fn name(&self) -> &str {
        &self.identity.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Quaternion, Vector};
    use crate::pose::TrackingResult;
    use std::sync::Mutex;
    use std::thread;

    #[derive(Default)]
    struct RecordingHost {
        poses: Mutex<Vec<(DeviceHandle, DriverPose)>>,
        properties: Mutex<Vec<(DeviceHandle, DeviceProperties)>>,
    }

    impl DriverHost for RecordingHost {
        fn tracked_device_pose_updated(&self, handle: DeviceHandle, pose: &DriverPose) {
            self.poses.lock().unwrap().push((handle, *pose));
        }

        fn set_device_properties(&self, handle: DeviceHandle, properties: &DeviceProperties) {
            self.properties
                .lock()
                .unwrap()
                .push((handle, properties.clone()));
        }
    }

    fn body_tracker(x: f32) -> BodyTracker {
        BodyTracker {
            tracker_id: 0,
            position: Vector { x, y: x, z: x },
            orientation: Quaternion::default(),
            tracking: true,
        }
    }

    fn new_tracker(name: &str) -> (Arc<RecordingHost>, VirtualTracker) {
        let host = Arc::new(RecordingHost::default());
        let tracker = VirtualTracker::new(name, host.clone());
        (host, tracker)
    }

    #[test]
    fn test_identity_is_stable() {
        let (_, tracker) = new_tracker("LeftFoot");
        let first = tracker.name().to_owned();
        for _ in 0..100 {
            assert_eq!(tracker.name(), first);
        }
        assert_eq!(tracker.name(), "ALVR/tracker/LeftFoot");
        assert_eq!(tracker.serial_number(), "ALVR Tracker LeftFoot");
        assert_eq!(tracker.identity().logical_name(), "LeftFoot");
    }

    #[test]
    fn test_pose_before_any_sample_is_not_tracking() {
        let (_, tracker) = new_tracker("chest");
        let pose = tracker.pose();
        assert!(!pose.pose_is_valid);
        assert_eq!(pose.result, TrackingResult::Uninitialized);
    }

    #[test]
    fn test_samples_are_stored_in_every_state() {
        let (_, tracker) = new_tracker("waist");
        tracker.on_pose_updated(1, body_tracker(1.));
        assert_eq!(tracker.state(), DeviceState::Inactive);
        assert_eq!(tracker.pose().position.x, 1.);

        tracker.activate(DeviceHandle(3)).unwrap();
        tracker.on_pose_updated(2, body_tracker(2.));
        assert_eq!(tracker.pose().position.x, 2.);

        tracker.deactivate();
        tracker.on_pose_updated(3, body_tracker(3.));
        assert_eq!(tracker.state(), DeviceState::Deactivated);
        assert_eq!(tracker.pose().position.x, 3.);
    }

    #[test]
    fn test_latest_sample_wins() {
        let (_, tracker) = new_tracker("chest");
        tracker.on_pose_updated(100, body_tracker(1.));
        tracker.on_pose_updated(200, body_tracker(2.));
        let pose = tracker.pose();
        assert_eq!(pose.timestamp_ns, 200);
        assert_eq!(pose.position.x, 2.);
    }

    #[test]
    fn test_notifications_follow_handle() {
        let (host, tracker) = new_tracker("LeftFoot");
        tracker.on_pose_updated(1, body_tracker(1.));
        assert!(host.poses.lock().unwrap().is_empty());

        assert_eq!(tracker.activate(DeviceHandle(42)), Ok(()));
        assert_eq!(tracker.state(), DeviceState::Active);
        assert_eq!(tracker.handle(), DeviceHandle(42));
        tracker.on_pose_updated(2, body_tracker(2.));

        tracker.deactivate();
        assert_eq!(tracker.handle(), DeviceHandle::INVALID);
        tracker.on_pose_updated(3, body_tracker(3.));

        let poses = host.poses.lock().unwrap();
        assert_eq!(poses.len(), 1);
        assert_eq!(poses[0].0, DeviceHandle(42));
        assert_eq!(poses[0].1.timestamp_ns, 2);
    }

    #[test]
    fn test_activation_publishes_properties() {
        let (host, tracker) = new_tracker("LeftFoot");
        tracker.activate(DeviceHandle(7)).unwrap();
        let properties = host.properties.lock().unwrap();
        assert_eq!(properties.len(), 1);
        let (handle, props) = &properties[0];
        assert_eq!(*handle, DeviceHandle(7));
        assert_eq!(props.serial_number, "ALVR Tracker LeftFoot");
        assert_eq!(props.role, TrackerRole::LeftFoot);
        assert_eq!(props.controller_type, "vive_tracker_left_foot");
    }

    #[test]
    fn test_invalid_handle_leaves_tracker_inactive() {
        let (host, tracker) = new_tracker("chest");
        assert_eq!(
            tracker.activate(DeviceHandle::INVALID),
            Err(InitError::InvalidHandle(u32::MAX))
        );
        assert_eq!(tracker.state(), DeviceState::Inactive);
        assert!(host.properties.lock().unwrap().is_empty());
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let (_, tracker) = new_tracker("chest");
        tracker.deactivate();
        assert_eq!(tracker.state(), DeviceState::Inactive);
        tracker.activate(DeviceHandle(1)).unwrap();
        tracker.deactivate();
        tracker.deactivate();
        assert_eq!(tracker.state(), DeviceState::Deactivated);
        assert_eq!(tracker.handle(), DeviceHandle::INVALID);
    }

    #[test]
    fn test_reactivation_after_deactivate() {
        let (host, tracker) = new_tracker("LeftFoot");
        tracker.activate(DeviceHandle(1)).unwrap();
        tracker.deactivate();
        assert_eq!(tracker.state(), DeviceState::Deactivated);

        assert_eq!(tracker.activate(DeviceHandle(9)), Ok(()));
        assert_eq!(tracker.state(), DeviceState::Active);
        assert_eq!(tracker.handle(), DeviceHandle(9));
        tracker.on_pose_updated(5, body_tracker(1.));

        let properties = host.properties.lock().unwrap();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[1].0, DeviceHandle(9));
        assert_eq!(properties[1].1, tracker.properties());
        let poses = host.poses.lock().unwrap();
        assert_eq!(poses.len(), 1);
        assert_eq!(poses[0].0, DeviceHandle(9));
        assert_eq!(poses[0].1.timestamp_ns, 5);
    }

    #[test]
    fn test_state_after_concurrent_deactivate() {
        let (_, tracker) = new_tracker("chest");
        let tracker = Arc::new(tracker);
        tracker.activate(DeviceHandle(2)).unwrap();
        let deactivator = {
            let tracker = tracker.clone();
            thread::spawn(move || tracker.deactivate())
        };
        for _ in 0..1000 {
            assert_ne!(tracker.state(), DeviceState::Inactive);
        }
        deactivator.join().unwrap();
        assert_eq!(tracker.state(), DeviceState::Deactivated);
    }

    #[test]
    fn test_debug_request_respects_buffer() {
        let (_, tracker) = new_tracker("chest");
        let mut empty: [u8; 0] = [];
        tracker.debug_request("status", &mut empty);

        let mut buffer = [0xffu8; 4];
        tracker.debug_request("status", &mut buffer[..0]);
        assert_eq!(buffer, [0xff; 4]);
        tracker.debug_request("status", &mut buffer);
        assert_eq!(buffer, [0, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_no_components_and_standby_is_noop() {
        let (_, tracker) = new_tracker("chest");
        assert!(tracker.component("IVRCameraComponent_003").is_none());
        tracker.enter_standby();
        assert_eq!(tracker.state(), DeviceState::Inactive);
    }

    #[test]
    fn test_role_names() {
        assert_eq!(TrackerRole::from_name("LeftFoot"), TrackerRole::LeftFoot);
        assert_eq!(TrackerRole::from_name("left_foot"), TrackerRole::LeftFoot);
        assert_eq!(TrackerRole::from_name("right-knee"), TrackerRole::RightKnee);
        assert_eq!(TrackerRole::from_name("Hips"), TrackerRole::Waist);
        assert_eq!(TrackerRole::from_name("tail"), TrackerRole::Unknown);
        assert_eq!(TrackerRole::Unknown.controller_type(), "vive_tracker");
    }

    #[test]
    fn test_concurrent_producer_and_host() {
        let (_, tracker) = new_tracker("chest");
        let tracker = Arc::new(tracker);
        tracker.activate(DeviceHandle(1)).unwrap();
        let producer = {
            let tracker = tracker.clone();
            thread::spawn(move || {
                for i in 1..=1000u32 {
                    tracker.on_pose_updated(i as u64, body_tracker(i as f32));
                }
            })
        };
        for _ in 0..1000 {
            let pose = tracker.pose();
            let x = pose.position.x;
            assert_eq!(pose.position.y, x);
            assert_eq!(pose.position.z, x);
            assert_eq!(pose.timestamp_ns as f64, x);
        }
        producer.join().unwrap();
        assert_eq!(tracker.pose().timestamp_ns, 1000);
    }

    #[test]
    fn test_left_foot_scenario() {
        let (_, tracker) = new_tracker("LeftFoot");
        assert_eq!(tracker.name(), "ALVR/tracker/LeftFoot");
        assert_eq!(tracker.serial_number(), "ALVR Tracker LeftFoot");
        assert!(tracker.activate(DeviceHandle(42)).is_ok());
        assert_eq!(tracker.state(), DeviceState::Active);

        let sample = body_tracker(0.5);
        tracker.on_pose_updated(1000, sample);
        let pose = tracker.pose();
        assert_eq!(pose.timestamp_ns, 1000);
        assert_eq!(pose.position.x, 0.5);
        assert!(pose.pose_is_valid);

        tracker.deactivate();
        assert_eq!(tracker.state(), DeviceState::Deactivated);
        assert_eq!(tracker.pose(), pose);
    }
}
