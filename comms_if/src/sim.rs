//! # Simulator messages
//!
//! The driving simulator talks in socket.io style text frames. A frame carrying an event starts
//! with the `42` marker (`4` for a message, `2` for an event), followed by a JSON array holding
//! the event name and its data object:
//!
//! ```text
//! 42["telemetry",{"cte":"0.7598","speed":"0.4380","steering_angle":"0.0000", ...}]
//! ```
//!
//! Replies use the same envelope, either `42["steer",{"steering_angle":..,"throttle":..}]` or the
//! manual driving no-op `42["manual",{}]`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Marker at the start of every event frame.
pub const EVENT_MARKER: &str = "42";

/// Name of the telemetry event sent by the simulator.
pub const TELEMETRY_EVENT: &str = "telemetry";

/// Name of the command event sent back to the simulator.
pub const STEER_EVENT: &str = "steer";

/// Name of the manual driving event sent back to the simulator.
pub const MANUAL_EVENT: &str = "manual";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One telemetry sample reported by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetrySample {
    /// Cross track error, the signed lateral distance to the centre of the lane.
    pub cte: f64,

    /// Vehicle speed, in the simulator's units.
    pub speed: f64,

    /// Steering angle currently applied by the vehicle.
    pub steering_angle: f64
}

/// The actuator commands sent back to the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandPair {
    /// Normalised steering angle demand.
    pub steering_angle: f64,

    /// Throttle demand, negative values brake/reverse.
    pub throttle: f64
}

/// Raw telemetry data object, fields are usually strings on the wire.
#[derive(Debug, Deserialize)]
struct RawTelemetry {
    cte: RawNumber,
    speed: RawNumber,
    steering_angle: RawNumber
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An event decoded from a simulator frame.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// New telemetry is available.
    Telemetry(TelemetrySample),

    /// The frame carried no data, the simulator is being driven manually.
    Manual,

    /// Some other event which the controller does not handle.
    Other(String)
}

/// A reply to be sent back to the simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimReply {
    /// Drive the vehicle with the given commands.
    Steer(CommandPair),

    /// No-op reply leaving the simulator in manual mode.
    Manual
}

/// Errors which can occur while decoding a simulator frame.
///
/// These are not recoverable by the controller, a frame which produces one of these shall not be
/// answered.
#[derive(Debug, Error)]
pub enum SimFrameError {
    #[error("Frame payload contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Frame payload is not an [event, data] array: {0}")]
    InvalidEnvelope(String),

    #[error("Telemetry data is malformed: {0}")]
    InvalidTelemetry(serde_json::Error),

    #[error("Telemetry field `{field}` is not a number (found {value:?})")]
    InvalidNumber {
        field: &'static str,
        value: String
    },

    #[error("Could not serialize the reply: {0}")]
    SerializationError(serde_json::Error)
}

/// A number which may be encoded as a JSON string or a JSON number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Num(f64),
    Str(String)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RawNumber {
    fn parse(self, field: &'static str) -> Result<f64, SimFrameError> {
        match self {
            RawNumber::Num(n) => Ok(n),
            RawNumber::Str(s) => s.trim()
                .parse()
                .map_err(|_| SimFrameError::InvalidNumber { field, value: s })
        }
    }
}

impl SimReply {
    /// Encode the reply into a text frame ready to be sent to the simulator.
    pub fn to_frame(&self) -> Result<String, SimFrameError> {
        let payload = match self {
            SimReply::Steer(cmd) => serde_json::to_string(&(STEER_EVENT, cmd)),
            SimReply::Manual => serde_json::to_string(&(MANUAL_EVENT, serde_json::Map::new()))
        }.map_err(SimFrameError::SerializationError)?;

        Ok(format!("{}{}", EVENT_MARKER, payload))
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Decode a text frame received from the simulator.
///
/// Returns:
/// - `Ok(None)` if the frame is not an event frame (handshakes, pings, etc.), these shall be
///   ignored.
/// - `Ok(Some(SimEvent::Manual))` if the frame contains `null` or has no JSON array in it.
/// - `Ok(Some(event))` for any other event.
/// - `Err(_)` if the payload is present but can't be decoded.
pub fn parse_frame(frame: &str) -> Result<Option<SimEvent>, SimFrameError> {
    if frame.len() <= EVENT_MARKER.len() || !frame.starts_with(EVENT_MARKER) {
        return Ok(None)
    }

    let payload = match event_payload(frame) {
        Some(p) => p,
        None => return Ok(Some(SimEvent::Manual))
    };

    let json: Value = serde_json::from_str(payload)
        .map_err(SimFrameError::InvalidJson)?;

    let (name, data) = match json {
        Value::Array(mut items) if !items.is_empty() => {
            let data = if items.len() > 1 { items.swap_remove(1) } else { Value::Null };
            match items.swap_remove(0) {
                Value::String(s) => (s, data),
                v => return Err(SimFrameError::InvalidEnvelope(
                    format!("event name must be a string, found {}", v)
                ))
            }
        },
        v => return Err(SimFrameError::InvalidEnvelope(v.to_string()))
    };

    if name != TELEMETRY_EVENT {
        return Ok(Some(SimEvent::Other(name)))
    }

    let raw: RawTelemetry = serde_json::from_value(data)
        .map_err(SimFrameError::InvalidTelemetry)?;

    Ok(Some(SimEvent::Telemetry(TelemetrySample {
        cte: raw.cte.parse("cte")?,
        speed: raw.speed.parse("speed")?,
        steering_angle: raw.steering_angle.parse("steering_angle")?
    })))
}

/// Encode a telemetry sample as a frame, as the simulator would send it.
///
/// Numbers are sent as strings, matching the simulator.
pub fn telemetry_frame(sample: &TelemetrySample) -> Result<String, SimFrameError> {
    let data = serde_json::json!({
        "cte": sample.cte.to_string(),
        "speed": sample.speed.to_string(),
        "steering_angle": sample.steering_angle.to_string()
    });

    let payload = serde_json::to_string(&(TELEMETRY_EVENT, data))
        .map_err(SimFrameError::SerializationError)?;

    Ok(format!("{}{}", EVENT_MARKER, payload))
}

/// Extract the JSON array from a frame.
///
/// `None` means the frame carries no data: it contains `null` or lacks array delimiters.
fn event_payload(frame: &str) -> Option<&str> {
    if frame.contains("null") {
        return None
    }

    let start = frame.find('[')?;
    let end = frame.rfind(']')?;

    if end < start {
        return None
    }

    Some(&frame[start..=end])
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
