//! SensorLink demo.
//!
//! Wires a producer and a consumer over an in-memory link, toggles a few
//! simulated feeds and takes some pictures. An optional JSON `LinkConfig`
//! path may be given as the first argument.

mod sim;

use std::time::Duration;

use anyhow::{Context, Result};
use sensorlink_engine::{BatteryReading, Consumer, LinkConfig, Producer, BATTERY, GYRO, THERMAL};
use sensorlink_ipc::{
    BatteryState, CameraPosition, CaptureRequest, ChannelId, GyroData, Json, ThermalLevel,
    ThreeAxis,
};
use sensorlink_transport::link_pair;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::sim::{DelayedGrant, SimulatedCamera, TickerSource};

fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "sensorlink_demo=debug,sensorlink_engine=debug,sensorlink_capture=debug,sensorlink_transport=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config() -> Result<LinkConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(LinkConfig::default());
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {path}"))?;
    LinkConfig::from_json(&text).with_context(|| format!("invalid config file {path}"))
}

fn battery_sample(tick: u64) -> BatteryReading {
    BatteryReading {
        level: (1.0 - tick as f32 * 0.01).max(0.0),
        state: BatteryState::Unplugged,
    }
}

fn thermal_sample(tick: u64) -> ThermalLevel {
    ThermalLevel::from_raw((tick / 10).min(3) as i8).unwrap_or_default()
}

fn gyro_sample(tick: u64) -> GyroData {
    let t = tick as f64 * 0.1;
    GyroData {
        rotation_rate: ThreeAxis::new(t.sin(), t.cos(), 0.0),
    }
}

fn main() -> Result<()> {
    init_logging();
    let config = load_config()?;
    info!(?config, "SensorLink demo starting");

    let (producer_end, consumer_end, control) = link_pair();
    let mut producer = Producer::from_link(producer_end, &config)?;
    let consumer = Consumer::from_link(consumer_end, &config)?;

    producer.add_feed(TickerSource::new("battery", Duration::from_millis(200), battery_sample))?;
    producer.add_feed(TickerSource::new("thermal", Duration::from_millis(500), thermal_sample))?;
    producer.add_feed(TickerSource::new("gyro", Duration::from_millis(100), gyro_sample))?;
    let camera = producer.add_camera(
        SimulatedCamera {
            exposure: Duration::from_millis(50),
            has_back_camera: false,
        },
        DelayedGrant::new(Duration::from_millis(300), true),
    )?;
    camera.on_capture(|response| {
        info!(request_id = response.request_id, bytes = response.data.len(), "Photo taken")
    });

    consumer.on_peer_error(|event| warn!(message = %event.message, "Producer reported an error"));

    let battery = consumer.feed(BATTERY)?;
    battery.on_data::<f32, _>(ChannelId::BatteryLevel, |level| {
        info!(battery = level, "Battery level")
    })?;
    battery.on_data::<i8, _>(ChannelId::BatteryState, |state| {
        info!(state = ?BatteryState::from_raw(state), "Battery state")
    })?;

    let thermal = consumer.feed(THERMAL)?;
    thermal.on_data::<i8, _>(ChannelId::ThermalState, |level| {
        info!(thermal = ?ThermalLevel::from_raw(level), "Thermal state")
    })?;

    let gyro = consumer.feed(GYRO)?;
    gyro.on_data::<Json<GyroData>, _>(ChannelId::GyroData, |Json(sample)| {
        info!(x = sample.rotation_rate.x, y = sample.rotation_rate.y, "Rotation rate")
    })?;

    let (image_tx, image_rx) = crossbeam_channel::unbounded();
    let camera = consumer.camera()?;
    camera.on_image(move |response| {
        let _ = image_tx.send(response);
    });

    battery.start()?;
    thermal.start()?;
    gyro.set_interval(0.25)?;

    let mut requests = vec![CaptureRequest::still(1), CaptureRequest::still(2)];
    requests.push(CaptureRequest {
        camera: CameraPosition::Back,
        ..CaptureRequest::still(3)
    });
    requests.push(CaptureRequest::still(4));
    for request in &requests {
        camera.request_capture(request)?;
    }

    // Request 3 fails on the back camera, so three images come back.
    for _ in 0..3 {
        let response = image_rx
            .recv_timeout(Duration::from_secs(5))
            .context("timed out waiting for an image")?;
        info!(
            request_id = response.request_id,
            image = %String::from_utf8_lossy(&response.data),
            "Image received"
        );
    }

    std::thread::sleep(Duration::from_secs(1));
    gyro.stop()?;
    thermal.stop()?;
    std::thread::sleep(Duration::from_millis(300));

    for (name, metrics) in producer.feed_metrics() {
        let metrics = serde_json::to_string(&metrics)?;
        info!(feed = name, %metrics, "Feed metrics");
    }
    if let Some(camera) = producer.camera() {
        info!(stats = ?camera.stats(), "Camera queue");
    }

    control.disconnect();
    std::thread::sleep(Duration::from_millis(200));
    for (name, state) in producer.feed_states() {
        info!(feed = name, %state, "Feed after disconnect");
    }

    info!(
        reported = producer.errors().reported(),
        dropped = producer.errors().dropped(),
        "SensorLink demo finished"
    );
    Ok(())
}
