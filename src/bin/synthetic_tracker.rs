use body_tracker_emulator::config::BridgeConfig;
use body_tracker_emulator::data::{BodyTracker, Quaternion, Vector};
use body_tracker_emulator::pose::PoseMatrix;
use body_tracker_emulator::host::LoggingHost;
use body_tracker_emulator::{DeviceHandle, TrackedDeviceDriver, VirtualTracker};

use anyhow::{anyhow, Result};
use log::*;
use nalgebra as na;
use simplelog::{Config, TermLogger, TerminalMode};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const SAMPLE_INTERVAL: Duration = Duration::from_millis(8);
const RUN_TIME: Duration = Duration::from_secs(5);

/// Walks every tracker around a circle at its own height.
fn generate(tracker_id: u32, t: f32) -> BodyTracker {
    let phase = t + tracker_id as f32 * 0.4;
    let heading = na::UnitQuaternion::from_euler_angles(0.0, -phase, 0.0);
    let q = heading.quaternion();
    BodyTracker {
        tracker_id,
        position: Vector {
            x: 0.5 * phase.cos(),
            y: 0.1 + 0.15 * tracker_id as f32,
            z: 0.5 * phase.sin(),
        },
        orientation: Quaternion {
            x: q.i,
            y: q.j,
            z: q.k,
            w: q.w,
        },
        tracking: true,
    }
}

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => BridgeConfig::load(Path::new(&path))?,
        None => BridgeConfig::default(),
    };
    TermLogger::init(config.log_level, Config::default(), TerminalMode::Mixed)?;

    let host = Arc::new(LoggingHost::default());
    let trackers: Vec<Arc<VirtualTracker>> = config
        .trackers
        .iter()
        .map(|name| Arc::new(VirtualTracker::new(name, host.clone())))
        .collect();
    for (index, tracker) in trackers.iter().enumerate() {
        tracker.activate(DeviceHandle(index as u32))?;
    }

    let start = Instant::now();
    let running = Arc::new(AtomicBool::new(true));
    let producer = {
        let trackers = trackers.clone();
        let running = running.clone();
        thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                let elapsed = start.elapsed();
                for (id, tracker) in trackers.iter().enumerate() {
                    tracker.on_pose_updated(
                        elapsed.as_nanos() as u64,
                        generate(id as u32, elapsed.as_secs_f32()),
                    );
                }
                thread::sleep(SAMPLE_INTERVAL);
            }
        })
    };

    while start.elapsed() < RUN_TIME {
        thread::sleep(config.poll_interval());
        for tracker in &trackers {
            let matrix = tracker.pose().to_matrix34();
            let position = matrix.to_position();
            let (roll, pitch, yaw) = matrix.to_rotation().euler_angles();
            debug!(
                "{} position: {:.3} {:.3} {:.3} rotation: {:.2} {:.2} {:.2}",
                tracker.name(),
                position.x,
                position.y,
                position.z,
                roll,
                pitch,
                yaw
            );
        }
    }

    running.store(false, Ordering::SeqCst);
    producer
        .join()
        .map_err(|_| anyhow!("Producer thread panicked"))?;
    for tracker in &trackers {
        tracker.deactivate();
        info!("{} last pose at {}ns", tracker.name(), tracker.pose().timestamp_ns);
    }
    info!("Host received {} pose updates", host.pose_updates());
    Ok(())
}
