use crate::data::BodyTracker;
use nalgebra as na;

/// Tracking quality reported alongside every pose handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingResult {
    Uninitialized,
    CalibratingInProgress,
    CalibratingOutOfRange,
    RunningOk,
    RunningOutOfRange,
    FallbackRotationOnly,
}

impl Default for TrackingResult {
    fn default() -> Self {
        TrackingResult::Uninitialized
    }
}

/// A single timestamped observation from the tracking source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSample {
    /// Monotonic capture time at which the pose was valid.
    pub timestamp_ns: u64,
    pub position: na::Vector3<f64>,
    pub orientation: na::UnitQuaternion<f64>,
    pub tracking: bool,
}

impl PoseSample {
    pub fn from_body_tracker(timestamp_ns: u64, tracker: &BodyTracker) -> Self {
        let position = na::Vector3::new(
            tracker.position.x as f64,
            tracker.position.y as f64,
            tracker.position.z as f64,
        );
        let q = na::Quaternion::new(
            tracker.orientation.w as f64,
            tracker.orientation.x as f64,
            tracker.orientation.y as f64,
            tracker.orientation.z as f64,
        );
        // a zero quaternion carries no orientation, so the sample can't be trusted
        let (orientation, tracking) = if q.norm() > f64::EPSILON {
            (na::UnitQuaternion::from_quaternion(q), tracker.tracking)
        } else {
            (na::UnitQuaternion::identity(), false)
        };
        PoseSample {
            timestamp_ns,
            position,
            orientation,
            tracking,
        }
    }
}

/// Pose in the form the host runtime consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverPose {
    /// Extrapolation hint for the host in seconds. Always zero, samples are
    /// served as captured.
    pub pose_time_offset: f64,
    pub world_from_driver: na::Isometry3<f64>,
    pub driver_from_head: na::Isometry3<f64>,
    pub position: na::Vector3<f64>,
    pub rotation: na::UnitQuaternion<f64>,
    pub velocity: na::Vector3<f64>,
    pub angular_velocity: na::Vector3<f64>,
    pub result: TrackingResult,
    pub pose_is_valid: bool,
    pub will_drift_in_yaw: bool,
    pub should_apply_head_model: bool,
    pub device_is_connected: bool,
    pub timestamp_ns: u64,
}

impl Default for DriverPose {
    fn default() -> Self {
        DriverPose {
            pose_time_offset: 0.,
            world_from_driver: na::Isometry3::identity(),
            driver_from_head: na::Isometry3::identity(),
            position: na::Vector3::zeros(),
            rotation: na::UnitQuaternion::identity(),
            velocity: na::Vector3::zeros(),
            angular_velocity: na::Vector3::zeros(),
            result: TrackingResult::Uninitialized,
            pose_is_valid: false,
            will_drift_in_yaw: false,
            should_apply_head_model: false,
            device_is_connected: false,
            timestamp_ns: 0,
        }
    }
}

impl From<&PoseSample> for DriverPose {
    fn from(sample: &PoseSample) -> Self {
        DriverPose {
            position: sample.position,
            rotation: sample.orientation,
            result: if sample.tracking {
                TrackingResult::RunningOk
            } else {
                TrackingResult::Uninitialized
            },
            pose_is_valid: sample.tracking,
            device_is_connected: sample.tracking,
            timestamp_ns: sample.timestamp_ns,
            ..DriverPose::default()
        }
    }
}

impl DriverPose {
    /// Device pose in world space.
    pub fn absolute(&self) -> na::Isometry3<f64> {
        self.world_from_driver
            * na::Isometry3::from_parts(na::Translation3::from(self.position), self.rotation)
    }

    /// Row-major 3x4 device-to-absolute-tracking matrix.
    pub fn to_matrix34(&self) -> [[f32; 4]; 3] {
        let m = self.absolute().to_homogeneous();
        let mut out = [[0_f32; 4]; 3];
        for (row, out_row) in out.iter_mut().enumerate() {
            for (col, value) in out_row.iter_mut().enumerate() {
                *value = m[(row, col)] as f32;
            }
        }
        out
    }
}

/// Reads a row-major 3x4 rigid transform back into position and rotation.
pub trait PoseMatrix {
    fn to_position(&self) -> na::Vector3<f64>;
    fn to_rotation(&self) -> na::UnitQuaternion<f64>;
}

impl PoseMatrix for [[f32; 4]; 3] {
    /// Translation is the last column.
    fn to_position(&self) -> na::Vector3<f64> {
        na::Vector3::new(self[0][3] as f64, self[1][3] as f64, self[2][3] as f64)
    }

    /// Quaternion from the upper 3x3 block, component signs taken from the
    /// antisymmetric part.
    #[allow(clippy::many_single_char_names)]
    fn to_rotation(&self) -> na::UnitQuaternion<f64> {
        let m = self;
        let half_sqrt = |v: f32| 0_f32.max(v).sqrt() / 2.0;
        let w = half_sqrt(1. + m[0][0] + m[1][1] + m[2][2]);
        let i = half_sqrt(1. + m[0][0] - m[1][1] - m[2][2]).copysign(m[2][1] - m[1][2]);
        let j = half_sqrt(1. - m[0][0] + m[1][1] - m[2][2]).copysign(m[0][2] - m[2][0]);
        let k = half_sqrt(1. - m[0][0] - m[1][1] + m[2][2]).copysign(m[1][0] - m[0][1]);
        na::UnitQuaternion::from_quaternion(na::Quaternion::new(
            w as f64, i as f64, j as f64, k as f64,
        ))
    }
}
