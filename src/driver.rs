use crate::error::InitError;
use crate::pose::DriverPose;
use crate::tracker::DeviceProperties;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Host-assigned identifier of an activated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle(pub u32);

impl DeviceHandle {
    /// Reserved value meaning "not activated".
    pub const INVALID: DeviceHandle = DeviceHandle(u32::MAX);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "invalid")
        }
    }
}

/// Optional sub-interface a device can expose by name, such as an extra sensor.
pub trait DeviceComponent: Any + Send + Sync {
    fn name(&self) -> &str;

    /// Lets callers downcast to the concrete component.
    fn as_any(&self) -> &dyn Any;
}

/// Calls the device makes back into the host runtime.
pub trait DriverHost: Send + Sync {
    fn tracked_device_pose_updated(&self, handle: DeviceHandle, pose: &DriverPose);

    fn set_device_properties(&self, handle: DeviceHandle, properties: &DeviceProperties);
}

/// Contract every emulated device fulfils towards the host runtime.
///
/// All methods are safe to call in any order from any thread, including
/// before `activate` and after `deactivate`, and none of them block.
pub trait TrackedDeviceDriver: Send + Sync {
    /// Binds the device to a host handle.
    fn activate(&self, handle: DeviceHandle) -> Result<(), InitError>;

    /// Releases the host handle. Idempotent.
    fn deactivate(&self);

    fn enter_standby(&self) {}

    /// Looks up an optional capability by name.
    /// Devices that expose none keep the default.
    fn component(&self, _name_and_version: &str) -> Option<Arc<dyn DeviceComponent>> {
        None
    }

    /// Answers a host debug request into `response`.
    /// Nothing is written when `response` is empty.
    fn debug_request(&self, _request: &str, response: &mut [u8]) {
        if let Some(first) = response.first_mut() {
            *first = 0;
        }
    }

    /// Current pose, copied out.
    fn pose(&self) -> DriverPose;

    fn serial_number(&self) -> &str;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BatteryComponent {
        level: f32,
    }

    impl DeviceComponent for BatteryComponent {
        fn name(&self) -> &str {
            "battery"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_component_downcast() {
        let component: Arc<dyn DeviceComponent> = Arc::new(BatteryComponent { level: 0.5 });
        assert_eq!(component.name(), "battery");
        let battery = component
            .as_any()
            .downcast_ref::<BatteryComponent>()
            .unwrap();
        assert_eq!(battery.level, 0.5);
    }

    #[test]
    fn test_invalid_handle() {
        assert!(!DeviceHandle::INVALID.is_valid());
        assert!(DeviceHandle(0).is_valid());
        assert_eq!(DeviceHandle::INVALID.to_string(), "invalid");
        assert_eq!(DeviceHandle(42).to_string(), "42");
    }
}
