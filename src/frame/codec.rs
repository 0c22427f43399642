// Frame codec
//
// Decodes one inbound text message into a Frame. The wire format is a JSON
// object; see `WireFrame` for the accepted shape. Decoding never panics and
// never yields a partial frame.

use super::{Frame, ImageSet};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::error::Category;
use serde_json::{Map, Value};
use thiserror::Error;

/// Why an inbound payload was rejected
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload is not valid JSON
    #[error("malformed frame payload: {0}")]
    Syntax(#[source] serde_json::Error),

    /// Payload is JSON but not shaped like a frame
    #[error("unexpected frame shape: {0}")]
    Shape(#[source] serde_json::Error),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => DecodeError::Shape(err),
            Category::Syntax | Category::Eof | Category::Io => DecodeError::Syntax(err),
        }
    }
}

/// Wire representation; unknown top-level fields are ignored
#[derive(Debug, Deserialize)]
struct WireFrame {
    #[serde(deserialize_with = "deserialize_timestamp")]
    timestamp: i64,
    metadata: Map<String, Value>,
    #[serde(default)]
    query_image: Option<String>,
    #[serde(default)]
    observation_images: Option<ImageSet>,
    #[serde(default)]
    icl_images: Option<Vec<ImageSet>>,
}

impl From<WireFrame> for Frame {
    fn from(wire: WireFrame) -> Self {
        Frame {
            timestamp: wire.timestamp,
            metadata: wire.metadata,
            query_image: wire.query_image,
            observation_images: wire.observation_images,
            icl_images: wire.icl_images,
        }
    }
}

/// Producers may send fractional milliseconds; they are truncated
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(ms) = number.as_i64() {
        return Ok(ms);
    }
    match number.as_f64() {
        Some(ms) if ms.is_finite() && ms.abs() < i64::MAX as f64 => Ok(ms.trunc() as i64),
        _ => Err(D::Error::custom(format!("timestamp {} out of range", number))),
    }
}

/// Decode a raw text message into a Frame
pub fn decode(raw: &str) -> Result<Frame, DecodeError> {
    let wire: WireFrame = serde_json::from_str(raw)?;
    Ok(wire.into())
}
