use crate::data::BodyTrackingPacket;
use crate::tracker::VirtualTracker;
use log::*;
use std::sync::Arc;

/// Routes one tracking payload to the trackers, indexed by `tracker_id`.
///
/// Malformed payloads and unknown ids are logged and dropped. Returns the
/// number of samples delivered.
pub fn dispatch(trackers: &[Arc<VirtualTracker>], payload: &[u8]) -> usize {
    let packet = match BodyTrackingPacket::deserialize(payload) {
        Ok(packet) => packet,
        Err(error) => {
            error!("Dropping tracking packet: {}", error);
            return 0;
        }
    };
    let mut delivered = 0;
    for body_tracker in packet.trackers {
        match trackers.get(body_tracker.tracker_id as usize) {
            Some(tracker) => {
                tracker.on_pose_updated(packet.target_timestamp_ns, body_tracker);
                delivered += 1;
            }
            None => warn!("Unknown tracker id {}", body_tracker.tracker_id),
        }
    }
    delivered
}
