//! Telemetry publication: message formatting and the channel-backed sink.

use crate::data_point::DataPoint;
use crate::measurement::MeasurementKind;
use tokio::sync::mpsc::Sender;
use tracing::warn;

/// Topic prefix shared by every message.
const TOPIC_PREFIX: &str = "energymeters";

/// Accepts an opaque text message for the telemetry channel.
///
/// Fire and forget: implementations never report delivery, and a failed
/// publish must not stall the polling loop.
pub trait Publish: Send {
    fn publish(&mut self, message: &str);
}

/// Formats one refreshed data point as
/// `energymeters/<meter>/<kind>:<total> <phaseA> <phaseB> <phaseC>`.
pub fn data_point_message(meter_name: &str, kind: MeasurementKind, point: &DataPoint) -> String {
    let values = point.values();
    format!(
        "{TOPIC_PREFIX}/{meter_name}/{kind}:{:.2} {:.2} {:.2} {:.2}",
        values[0], values[1], values[2], values[3]
    )
}

/// Formats the session-boundary notification carrying the energy total of
/// the session that just ended.
pub fn new_session_message(meter_name: &str, session_energy: f32) -> String {
    format!("{TOPIC_PREFIX}/{meter_name}/newsession:{session_energy:.2}")
}

/// Publisher pushing messages into a bounded channel; the consumer side is
/// typically a drain task feeding the broker link.
pub struct ChannelPublisher {
    sender: Sender<String>,
}

impl ChannelPublisher {
    pub fn new(sender: Sender<String>) -> Self {
        Self { sender }
    }
}

impl Publish for ChannelPublisher {
    fn publish(&mut self, message: &str) {
        // A full channel drops the message instead of stalling the tick
        if let Err(err) = self.sender.try_send(message.to_owned()) {
            warn!("telemetry message dropped: {err}");
        }
    }
}
