use body_tracker_emulator::bridge;
use body_tracker_emulator::config::BridgeConfig;
use body_tracker_emulator::host::LoggingHost;
use body_tracker_emulator::{DeviceHandle, TrackedDeviceDriver, VirtualTracker};

use anyhow::{anyhow, Result};
use log::*;
use rumqtt::{MqttClient, MqttOptions, Notification, QoS, ReconnectOptions};
use simplelog::{Config, TermLogger, TerminalMode};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn subscribe(
    config: &BridgeConfig,
    trackers: Arc<Vec<Arc<VirtualTracker>>>,
    running: Arc<AtomicBool>,
) -> Result<(MqttClient, thread::JoinHandle<()>)> {
    let mqtt_options =
        MqttOptions::new(config.client_id.clone(), config.mqtt_host.clone(), config.mqtt_port)
            .set_reconnect_opts(ReconnectOptions::Always(config.reconnect_secs));
    let (mut mqtt_client, notifications) = MqttClient::start(mqtt_options)
        .map_err(|e| anyhow!("Failed to connect to MQTT host: {:?}", e))?;
    info!("Connected to MQTT");

    mqtt_client
        .subscribe(config.topic.clone(), QoS::AtMostOnce)
        .map_err(|e| anyhow!("Failed to subscribe to topic {}: {:?}", config.topic, e))?;
    trace!("Subscribing to {}", config.topic);

    let topic = config.topic.clone();
    let handle = thread::spawn(move || {
        for notification in notifications {
            if let Notification::Publish(message) = notification {
                if message.topic_name != topic {
                    continue;
                }
                bridge::dispatch(&trackers, &message.payload);
            }
        }
        warn!("MQTT notification stream closed");
        running.store(false, Ordering::SeqCst);
    });
    Ok((mqtt_client, handle))
}

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => BridgeConfig::load(Path::new(&path))?,
        None => BridgeConfig::default(),
    };
    TermLogger::init(config.log_level, Config::default(), TerminalMode::Mixed)?;

    let host = Arc::new(LoggingHost::default());
    let trackers: Arc<Vec<Arc<VirtualTracker>>> = Arc::new(
        config
            .trackers
            .iter()
            .map(|name| Arc::new(VirtualTracker::new(name, host.clone())))
            .collect(),
    );
    for (index, tracker) in trackers.iter().enumerate() {
        tracker.activate(DeviceHandle(index as u32))?;
    }

    let running = Arc::new(AtomicBool::new(true));
    // client has to outlive the notification stream
    let (_mqtt_client, subscriber) = subscribe(&config, trackers.clone(), running.clone())?;

    // host side polling loop
    while running.load(Ordering::SeqCst) {
        thread::sleep(config.poll_interval());
        for tracker in trackers.iter() {
            let pose = tracker.pose();
            debug!(
                "{} valid: {} at {}ns",
                tracker.name(),
                pose.pose_is_valid,
                pose.timestamp_ns
            );
        }
    }

    for tracker in trackers.iter() {
        tracker.deactivate();
    }
    subscriber
        .join()
        .map_err(|_| anyhow!("MQTT subscriber thread panicked"))?;
    info!("Host received {} pose updates", host.pose_updates());
    Ok(())
}
